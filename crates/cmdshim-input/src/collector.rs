//! Core input collector trait.
//!
//! The [`InputCollector`] trait is implemented by every input source.
//! Collectors are composed into an [`InputChain`](crate::InputChain).

use clap::ArgMatches;

use crate::InputError;

/// A source that can collect input of type T.
///
/// # Implementation Guidelines
///
/// - [`is_available`](Self::is_available) returns `false` when the source
///   cannot answer in the current environment (no TTY for a prompt, stdin not
///   piped, flag not defined on the command).
///
/// - [`collect`](Self::collect) returns `Ok(None)` for "ask the next source"
///   and `Ok(Some(value))` once it has an answer. `Err` is reserved for real
///   failures.
///
/// - Interactive collectors return `true` from [`can_retry`](Self::can_retry)
///   so a rejected answer re-prompts instead of failing the chain.
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputCollector, InputError};
/// use clap::ArgMatches;
///
/// struct ProfileFromFile(Option<String>);
///
/// impl InputCollector<String> for ProfileFromFile {
///     fn name(&self) -> &'static str { "default" }
///
///     fn is_available(&self, _: &ArgMatches) -> bool { self.0.is_some() }
///
///     fn collect(&self, _: &ArgMatches) -> Result<Option<String>, InputError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait InputCollector<T>: Send + Sync {
    /// Human-readable name for this collector ("argument", "flag", "stdin", ...).
    fn name(&self) -> &'static str;

    /// Check if this collector can provide input right now.
    fn is_available(&self, matches: &ArgMatches) -> bool;

    /// Attempt to collect input from this source.
    fn collect(&self, matches: &ArgMatches) -> Result<Option<T>, InputError>;

    /// Source-specific validation of a collected value.
    ///
    /// Default implementation accepts all values.
    fn validate(&self, _value: &T) -> Result<(), String> {
        Ok(())
    }

    /// Whether a rejected value should re-run [`collect`](Self::collect).
    fn can_retry(&self) -> bool {
        false
    }
}

/// A resolved value together with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput<T> {
    /// The resolved value.
    pub value: T,
    /// Which source provided the value.
    pub source: InputSourceKind,
}

/// The kind of source that provided input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSourceKind {
    /// From a CLI argument.
    Arg,
    /// From a CLI flag.
    Flag,
    /// From piped stdin.
    Stdin,
    /// From an environment variable.
    Env,
    /// From an interactive prompt.
    Prompt,
    /// From a default value.
    Default,
}

impl InputSourceKind {
    /// Maps a collector's [`name`](InputCollector::name) to its kind.
    ///
    /// Unrecognized names are treated as defaults.
    pub fn from_collector_name(name: &str) -> Self {
        match name {
            "argument" => Self::Arg,
            "flag" => Self::Flag,
            "stdin" => Self::Stdin,
            "environment variable" => Self::Env,
            "prompt" => Self::Prompt,
            _ => Self::Default,
        }
    }
}

impl std::fmt::Display for InputSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arg => write!(f, "argument"),
            Self::Flag => write!(f, "flag"),
            Self::Stdin => write!(f, "stdin"),
            Self::Env => write!(f, "environment variable"),
            Self::Prompt => write!(f, "prompt"),
            Self::Default => write!(f, "default"),
        }
    }
}
