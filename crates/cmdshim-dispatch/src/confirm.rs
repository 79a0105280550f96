//! Confirmation for mutating operations.
//!
//! A [`ConfirmationGate`] is created for each mutating invocation and decided
//! exactly once: `--force` opens it without asking, otherwise the
//! [`Confirmer`] asks the operator.

use cmdshim_input::{ConfirmPromptSource, InputError, RealTerminal, TerminalIO};

use crate::error::DispatchError;

/// Asks the operator a yes/no question.
pub trait Confirmer: Send + Sync {
    /// `Ok(None)` means nobody can be asked (no interactive terminal).
    fn confirm(&self, prompt: &str) -> Result<Option<bool>, InputError>;
}

/// Prompts on a terminal, defaulting to "no".
///
/// Closing the prompt (EOF) counts as "no".
#[derive(Debug, Clone, Default)]
pub struct TerminalConfirmer<T: TerminalIO + Clone = RealTerminal> {
    terminal: T,
}

impl TerminalConfirmer<RealTerminal> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: TerminalIO + Clone> TerminalConfirmer<T> {
    pub fn with_terminal(terminal: T) -> Self {
        Self { terminal }
    }
}

impl<T: TerminalIO + Clone> Confirmer for TerminalConfirmer<T> {
    fn confirm(&self, prompt: &str) -> Result<Option<bool>, InputError> {
        match ConfirmPromptSource::with_terminal(prompt, self.terminal.clone())
            .default(false)
            .ask()
        {
            Err(InputError::PromptCancelled) => Ok(Some(false)),
            other => other,
        }
    }
}

/// Where a gate stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Confirmed,
    Declined,
}

/// One confirmation decision for one invocation.
#[derive(Debug)]
pub struct ConfirmationGate {
    label: String,
    target: String,
    state: GateState,
}

impl ConfirmationGate {
    /// `target` is the identifier summary, e.g. `ApiId=abc`.
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
            state: GateState::Pending,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// The question put to the operator.
    pub fn prompt(&self) -> String {
        format!(
            "Performing the operation \"{}\" on target \"{}\". Continue?",
            self.label, self.target
        )
    }

    /// Decides the gate. Consumes it, so a decision cannot be replayed.
    ///
    /// Returns [`GateState::Confirmed`], or fails with
    /// [`DispatchError::Declined`] or
    /// [`DispatchError::ConfirmationUnavailable`].
    pub fn decide(
        mut self,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> Result<GateState, DispatchError> {
        if force {
            tracing::debug!(label = %self.label, target = %self.target, "confirmation bypassed by --force");
            self.state = GateState::Confirmed;
            return Ok(self.state);
        }

        match confirmer.confirm(&self.prompt()) {
            Ok(Some(true)) => {
                self.state = GateState::Confirmed;
                Ok(self.state)
            }
            Ok(Some(false)) => {
                self.state = GateState::Declined;
                Err(DispatchError::Declined {
                    label: self.label,
                    target: self.target,
                })
            }
            Ok(None) => Err(DispatchError::ConfirmationUnavailable {
                label: self.label,
                target: self.target,
            }),
            Err(err) => Err(DispatchError::Prompt(err)),
        }
    }
}
