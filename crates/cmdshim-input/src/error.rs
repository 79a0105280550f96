//! Error types for input collection.

use std::io;

/// Errors that can occur while collecting input.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Failed to read from stdin.
    #[error("Failed to read stdin: {0}")]
    StdinFailed(#[source] io::Error),

    /// The operator closed the prompt (EOF) instead of answering.
    #[error("Prompt cancelled by user.")]
    PromptCancelled,

    /// Writing the prompt or reading the answer failed.
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    /// The collected value was rejected.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// No source produced a value and no default was configured.
    #[error("No input provided and no default available.")]
    NoInput,

    /// A value could not be parsed into the expected shape.
    #[error("Failed to parse '{name}': {reason}")]
    ParseError { name: String, reason: String },
}

impl InputError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    /// Create a parse error.
    pub fn parse(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the operator backed out of an interactive prompt.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::PromptCancelled)
    }
}
