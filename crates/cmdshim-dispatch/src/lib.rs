//! Descriptor-driven dispatch of commands to remote API calls.
//!
//! `cmdshim-dispatch` is the engine behind every generated command. An
//! operation is described once as data ([`OperationDescriptor`]) and a single
//! generic [`Engine`] turns bound parameters into a service request, calls the
//! service, and projects the response.
//!
//! # Components
//!
//! - **Client factory**: [`ClientProvider`] hands out [`ClientHandle`]s;
//!   [`CachedClientProvider`] reuses them across a pipeline
//! - **Context builder**: [`ContextBuilder`] validates bindings into an
//!   [`ExecutionContext`]
//! - **Request mapper**: [`RequestMapper`] places each parameter at its target
//!   path, omitting empty composites
//! - **Invoker**: [`Invoker`] runs the call, honours a [`CancellationToken`]
//!   and separates connectivity failures from service errors
//! - **Result projector**: [`Projection`] applies `--select`
//! - **Confirmation gate**: [`ConfirmationGate`] asks before mutating calls
//!
//! Output rendering ([`OutputMode`], [`render_value`]) and the clap helpers
//! in [`extract_command_path`] and friends are shared with the front end.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdshim_dispatch::{
//!     CancellationToken, Engine, FieldSpec, Invocation, OperationDescriptor, StaticClientProvider,
//! };
//!
//! let create_api = OperationDescriptor::new("graph", "CreateApi")
//!     .field(FieldSpec::string("Name").required())
//!     .field(FieldSpec::map("Tags").alias("Tag"))
//!     .response_fields(["ApiId", "Name", "Tags"])
//!     .mutating();
//!
//! let engine = Engine::builder(StaticClientProvider::new(handle)).build();
//! let outcome = engine.invoke_blocking(
//!     &create_api,
//!     Invocation::new().bind("Name", "demo").force(),
//!     &CancellationToken::new(),
//! )?;
//! ```

mod client;
mod confirm;
mod context;
mod descriptor;
mod dispatch;
mod engine;
mod error;
mod hooks;
mod invoke;
mod output;
mod projection;
mod request;
mod serialize;

pub use client::{
    CachedClientProvider, ClientConfig, ClientError, ClientFactoryFn, ClientHandle,
    ClientProvider, ConnectivityError, FactoryProvider, ServiceClient, StaticClientProvider,
};

pub use confirm::{ConfirmationGate, Confirmer, GateState, TerminalConfirmer};

pub use context::{ContextBuilder, ContextWarning, ExecutionContext};

pub use descriptor::{
    json_type_name, kebab_case, Bindings, DescriptorError, FieldKind, FieldSpec,
    OperationDescriptor, RESERVED_NAMES,
};

pub use dispatch::{extract_command_path, get_deepest_matches, path_to_string};

pub use engine::{Engine, EngineBuilder, Invocation, Outcome};

pub use error::{DispatchError, ErrorKind};

pub use hooks::{HookError, HookPhase, Hooks, PostInvokeFn, PostProjectFn, PreInvokeFn};

pub use invoke::{is_connectivity, normalize_error, CancellationToken, Invoker};

pub use output::OutputMode;

pub use projection::{Projection, ProjectionError, Select};

pub use request::{Request, RequestMapper};

pub use serialize::{render_value, to_csv, to_json, to_text, to_xml, to_yaml, SerializeError};

// For implementing [`ServiceClient`].
pub use async_trait::async_trait;
