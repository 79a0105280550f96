//! Input sources for cmdshim commands.
//!
//! `cmdshim-input` answers the small questions a command has to settle before
//! the dispatch engine runs: was `--force` passed, which region applies when the
//! flag is absent but `CMDSHIM_REGION` is set, did the operator confirm a
//! destructive call, and what parameter sets were piped on stdin.
//!
//! # Quick Start
//!
//! ```ignore
//! use cmdshim_input::{InputChain, ArgSource, EnvSource};
//!
//! // --region wins over CMDSHIM_REGION, which wins over the built-in default
//! let region = InputChain::<String>::new()
//!     .try_source(ArgSource::new("region"))
//!     .try_source(EnvSource::new("CMDSHIM_REGION"))
//!     .default("us-east-1".to_string())
//!     .resolve(&matches)?;
//! ```
//!
//! # Architecture
//!
//! Every source implements [`InputCollector`]. Sources are stacked into an
//! [`InputChain`], which asks each one in turn until one answers.
//!
//! ```text
//! InputChain<bool>  (confirmation)
//! ├── FlagSource("force")   → None (flag absent)
//! ├── ConfirmPromptSource   → Some(true) ← operator typed "y"
//! └── default(false)        → (not reached)
//! ```
//!
//! # Testing
//!
//! The terminal, stdin and the process environment are all behind traits, so
//! tests never touch real OS state:
//!
//! ```
//! use cmdshim_input::{ConfirmPromptSource, MockTerminal};
//!
//! let prompt = ConfirmPromptSource::with_terminal("Delete api abc?", MockTerminal::with_response("y"));
//! assert_eq!(prompt.ask().unwrap(), Some(true));
//! ```

mod chain;
mod collector;
pub mod env;
mod error;
pub mod sources;

pub use chain::InputChain;
pub use collector::{InputCollector, InputSourceKind, ResolvedInput};
pub use error::InputError;

pub use sources::{
    read_if_piped, ArgSource, ConfirmPromptSource, DefaultSource, EnvSource, FlagSource,
    MockTerminal, RealTerminal, StdinSource, TerminalIO,
};

pub use env::{EnvReader, MockEnv, MockStdin, RealEnv, RealStdin, StdinReader};
