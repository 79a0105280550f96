//! A confirmer with canned answers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use cmdshim_dispatch::Confirmer;
use cmdshim_input::InputError;

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<Option<bool>>,
    prompts: Vec<String>,
}

/// Answers prompts from a script, in order, and records what was asked.
///
/// `None` answers "no terminal". Once the script runs out every prompt gets
/// `None`. Clones share the script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirmer {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConfirmer {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        Self {
            script: Arc::new(Mutex::new(Script {
                answers: answers.into_iter().collect(),
                prompts: Vec::new(),
            })),
        }
    }

    pub fn yes() -> Self {
        Self::new([Some(true)])
    }

    pub fn no() -> Self {
        Self::new([Some(false)])
    }

    /// Behaves as if no terminal is attached.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prompts
            .clone()
    }

    pub fn asked(&self) -> usize {
        self.prompts().len()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> Result<Option<bool>, InputError> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        script.prompts.push(prompt.to_string());
        Ok(script.answers.pop_front().flatten())
    }
}
