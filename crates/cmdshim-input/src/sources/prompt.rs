//! Yes/no terminal prompts.
//!
//! Plain line-based prompts over stdin and stderr. The confirmation gate in the
//! dispatch layer uses [`ConfirmPromptSource::ask`] directly; the
//! [`InputCollector`] impl lets the same prompt sit behind a `--force` flag in
//! an [`InputChain`](crate::InputChain).

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clap::ArgMatches;

use crate::collector::InputCollector;
use crate::InputError;

/// Re-asks allowed for an unrecognized answer inside [`ConfirmPromptSource::ask`].
const MAX_ATTEMPTS: usize = 3;

/// Abstraction over terminal I/O for testability.
pub trait TerminalIO: Send + Sync {
    /// Check if stdin is a terminal.
    fn is_terminal(&self) -> bool;

    /// Write a prompt. Prompts go to stderr so stdout stays clean for results.
    fn write_prompt(&self, prompt: &str) -> io::Result<()>;

    /// Read a line from stdin. An empty string means EOF.
    fn read_line(&self) -> io::Result<String>;
}

/// Real terminal I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTerminal;

impl TerminalIO for RealTerminal {
    fn is_terminal(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn write_prompt(&self, prompt: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        write!(err, "{}", prompt)?;
        err.flush()
    }

    fn read_line(&self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Yes/no confirmation prompt.
///
/// Accepts y/yes/n/no in any case. An empty answer takes the default when one
/// is set.
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputChain, FlagSource, ConfirmPromptSource};
///
/// let proceed = InputChain::<bool>::new()
///     .try_source(FlagSource::new("force"))
///     .try_source(ConfirmPromptSource::new("Delete api abc?").default(false))
///     .resolve(&matches)?;
/// ```
#[derive(Clone)]
pub struct ConfirmPromptSource<T: TerminalIO = RealTerminal> {
    terminal: Arc<T>,
    prompt: String,
    default: Option<bool>,
}

impl ConfirmPromptSource<RealTerminal> {
    /// Create a confirmation prompt on the real terminal.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_terminal(prompt, RealTerminal)
    }
}

impl<T: TerminalIO> ConfirmPromptSource<T> {
    /// Create a confirm prompt over a custom terminal.
    pub fn with_terminal(prompt: impl Into<String>, terminal: T) -> Self {
        Self {
            terminal: Arc::new(terminal),
            prompt: prompt.into(),
            default: None,
        }
    }

    /// Answer used when the operator just presses Enter.
    ///
    /// The suffix shows it: `[y/n]`, `[Y/n]` or `[y/N]`.
    pub fn default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    /// The full line written to the terminal.
    pub fn rendered_prompt(&self) -> String {
        let suffix = match self.default {
            None => "[y/n]",
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
        };
        format!("{} {} ", self.prompt, suffix)
    }

    /// Ask until a recognizable answer arrives.
    ///
    /// Returns `Ok(None)` without prompting when stdin is not a terminal.
    /// EOF yields [`InputError::PromptCancelled`]. After three unrecognized
    /// answers the last [`InputError::ValidationFailed`] is returned.
    pub fn ask(&self) -> Result<Option<bool>, InputError> {
        if !self.terminal.is_terminal() {
            return Ok(None);
        }

        let mut last = None;
        for _ in 0..MAX_ATTEMPTS {
            match self.ask_once() {
                Ok(Some(answer)) => return Ok(Some(answer)),
                Ok(None) => {
                    last = Some(InputError::validation("Please enter 'y' or 'n'"));
                }
                Err(InputError::ValidationFailed(msg)) => {
                    last = Some(InputError::ValidationFailed(msg));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last.unwrap_or(InputError::NoInput))
    }

    fn ask_once(&self) -> Result<Option<bool>, InputError> {
        self.terminal
            .write_prompt(&self.rendered_prompt())
            .map_err(|e| InputError::PromptFailed(e.to_string()))?;

        let line = self
            .terminal
            .read_line()
            .map_err(|e| InputError::PromptFailed(e.to_string()))?;

        if line.is_empty() {
            return Err(InputError::PromptCancelled);
        }

        match line.trim().to_lowercase().as_str() {
            "" => Ok(self.default),
            "y" | "yes" => Ok(Some(true)),
            "n" | "no" => Ok(Some(false)),
            _ => Err(InputError::validation("Please enter 'y' or 'n'")),
        }
    }
}

impl<T: TerminalIO + 'static> InputCollector<bool> for ConfirmPromptSource<T> {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn is_available(&self, _matches: &ArgMatches) -> bool {
        self.terminal.is_terminal()
    }

    fn collect(&self, _matches: &ArgMatches) -> Result<Option<bool>, InputError> {
        self.ask()
    }

    fn can_retry(&self) -> bool {
        true
    }
}

/// Scripted terminal for tests.
///
/// Clones share the response cursor and the transcript, so a test can keep a
/// handle while the code under test owns another.
#[derive(Debug, Clone)]
pub struct MockTerminal {
    is_terminal: bool,
    responses: Arc<Vec<String>>,
    next: Arc<AtomicUsize>,
    written: Arc<Mutex<Vec<String>>>,
}

impl MockTerminal {
    fn scripted(is_terminal: bool, responses: Vec<String>) -> Self {
        Self {
            is_terminal,
            responses: Arc::new(responses),
            next: Arc::new(AtomicUsize::new(0)),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Simulates stdin that is not a terminal.
    pub fn non_terminal() -> Self {
        Self::scripted(false, Vec::new())
    }

    /// A terminal that answers once.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::scripted(true, vec![response.into()])
    }

    /// A terminal that answers in sequence, then hits EOF.
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::scripted(true, responses.into_iter().map(Into::into).collect())
    }

    /// A terminal whose first read is EOF (Ctrl+D).
    pub fn eof() -> Self {
        Self::scripted(true, Vec::new())
    }

    /// Every prompt written so far.
    pub fn prompts(&self) -> Vec<String> {
        self.written.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of lines read so far, EOF reads included.
    pub fn reads(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl TerminalIO for MockTerminal {
    fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    fn write_prompt(&self, prompt: &str) -> io::Result<()> {
        if let Ok(mut written) = self.written.lock() {
            written.push(prompt.to_string());
        }
        Ok(())
    }

    fn read_line(&self) -> io::Result<String> {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .responses
            .get(idx)
            .map(|r| format!("{}\n", r))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    fn empty_matches() -> ArgMatches {
        Command::new("test").try_get_matches_from(["test"]).unwrap()
    }

    #[test]
    fn unavailable_when_not_terminal() {
        let source = ConfirmPromptSource::with_terminal("Proceed?", MockTerminal::non_terminal());
        assert!(!source.is_available(&empty_matches()));
        assert_eq!(source.ask().unwrap(), None);
    }

    #[test]
    fn non_terminal_is_never_prompted() {
        let terminal = MockTerminal::non_terminal();
        let source = ConfirmPromptSource::with_terminal("Proceed?", terminal.clone());
        let _ = source.ask();
        assert!(terminal.prompts().is_empty());
        assert_eq!(terminal.reads(), 0);
    }

    #[test]
    fn yes_answers() {
        for response in ["y", "Y", "yes", "YES", " Yes "] {
            let source =
                ConfirmPromptSource::with_terminal("Proceed?", MockTerminal::with_response(response));
            assert_eq!(source.ask().unwrap(), Some(true), "'{}' should be yes", response);
        }
    }

    #[test]
    fn no_answers() {
        for response in ["n", "N", "no", "NO"] {
            let source =
                ConfirmPromptSource::with_terminal("Proceed?", MockTerminal::with_response(response));
            assert_eq!(source.ask().unwrap(), Some(false), "'{}' should be no", response);
        }
    }

    #[test]
    fn prompt_suffix_shows_default() {
        let terminal = MockTerminal::with_response("");
        let source = ConfirmPromptSource::with_terminal("Delete api abc?", terminal.clone())
            .default(false);

        assert_eq!(source.ask().unwrap(), Some(false));
        assert_eq!(terminal.prompts(), vec!["Delete api abc? [y/N] ".to_string()]);
    }

    #[test]
    fn empty_answer_without_default_reasks() {
        let terminal = MockTerminal::with_responses(["", "y"]);
        let source = ConfirmPromptSource::with_terminal("Proceed?", terminal.clone());

        assert_eq!(source.ask().unwrap(), Some(true));
        assert_eq!(terminal.reads(), 2);
    }

    #[test]
    fn invalid_answer_reasks_then_accepts() {
        let terminal = MockTerminal::with_responses(["maybe", "later", "no"]);
        let source = ConfirmPromptSource::with_terminal("Proceed?", terminal.clone());

        assert_eq!(source.ask().unwrap(), Some(false));
        assert_eq!(terminal.prompts().len(), 3);
    }

    #[test]
    fn invalid_answers_exhaust_attempts() {
        let terminal = MockTerminal::with_responses(["a", "b", "c", "y"]);
        let source = ConfirmPromptSource::with_terminal("Proceed?", terminal.clone());

        assert!(matches!(source.ask(), Err(InputError::ValidationFailed(_))));
        assert_eq!(terminal.reads(), 3);
    }

    #[test]
    fn eof_cancels() {
        let source = ConfirmPromptSource::with_terminal("Proceed?", MockTerminal::eof());
        assert!(matches!(source.ask(), Err(InputError::PromptCancelled)));
    }

    #[test]
    fn eof_after_invalid_answer_cancels() {
        let source =
            ConfirmPromptSource::with_terminal("Proceed?", MockTerminal::with_response("what"));
        assert!(matches!(source.ask(), Err(InputError::PromptCancelled)));
    }

    #[test]
    fn collector_delegates_to_ask() {
        let terminal = MockTerminal::with_responses(["maybe", "y"]);
        let source = ConfirmPromptSource::with_terminal("Proceed?", terminal.clone());
        assert_eq!(source.collect(&empty_matches()).unwrap(), Some(true));
        assert_eq!(terminal.reads(), 2);
        assert!(source.can_retry());
    }
}
