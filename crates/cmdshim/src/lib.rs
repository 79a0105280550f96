//! # cmdshim - Command-Line Shims Over Service APIs
//!
//! cmdshim turns a list of [`OperationDescriptor`]s into a command-line tool.
//! Each descriptor becomes `<bin> <service> <command>`, its parameters become
//! flags, and running the command sends one request to a service client and
//! prints the selected part of the response.
//!
//! The work per invocation happens in [`cmdshim_dispatch`]:
//!
//! - client factory: a [`ClientProvider`] hands out service clients
//! - context builder: bindings are checked against the descriptor
//! - request mapper: bindings become the request body
//! - invoker: the call runs, cancellable with Ctrl-C
//! - result projector: `--select` picks what is printed
//! - confirmation gate: mutating operations ask first unless `--force`
//!
//! This crate adds the outer layer: clap command generation, layered
//! configuration ([`config`]), diagnostics ([`logging`]), pipeline input
//! ([`pipeline`]) and exit codes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cmdshim::App;
//! use cmdshim::dispatch::{FieldSpec, FactoryProvider, OperationDescriptor};
//!
//! let app = App::builder("shimdemo", FactoryProvider::new(connect))
//!     .operation(
//!         OperationDescriptor::new("graph", "CreateApi")
//!             .field(FieldSpec::string("Name").required())
//!             .field(FieldSpec::map("Tags").alias("Tag"))
//!             .response_fields(["ApiId", "Name", "Tags"])
//!             .mutating(),
//!     )
//!     .build()?;
//!
//! std::process::exit(app.run());
//! ```
//!
//! ```text
//! $ shimdemo graph create-api --name demo --tag env=test --select '*' --force
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod params;
pub mod pipeline;
mod registry;
mod setup;

pub use cmdshim_dispatch as dispatch;
pub use cmdshim_input as input;

pub use cli::{exit_code, App, AppBuilder};
pub use config::{Config, Settings};
pub use logging::{init_tracing, LogFormat, LogSettings};
pub use pipeline::{PipelineError, PipelineItem};
pub use registry::{
    operation_command, OperationRegistry, ARG_DRY_RUN, ARG_FORCE, ARG_SELECT, OPERATIONS_COMMAND,
};
pub use setup::SetupError;

pub use cmdshim_dispatch::{
    ClientConfig, ClientProvider, DispatchError, ErrorKind, FieldSpec, Hooks, OperationDescriptor,
    OutputMode, Select,
};
