//! Built-in input sources.
//!
//! - [`ArgSource`] / [`FlagSource`]: values and switches from clap matches
//! - [`EnvSource`]: environment variables
//! - [`StdinSource`]: piped stdin
//! - [`DefaultSource`]: a fixed fallback
//! - [`ConfirmPromptSource`]: an interactive yes/no question

mod arg;
mod default;
mod env;
mod prompt;
mod stdin;

pub use arg::{ArgSource, FlagSource};
pub use default::DefaultSource;
pub use env::EnvSource;
pub use prompt::{ConfirmPromptSource, MockTerminal, RealTerminal, TerminalIO};
pub use stdin::{read_if_piped, StdinSource};
