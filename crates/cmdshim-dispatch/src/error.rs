//! Error taxonomy for the dispatch engine.
//!
//! Every stage of an invocation fails with a [`DispatchError`]. The front end
//! only needs [`DispatchError::kind`] to pick an exit code; the variants carry
//! enough detail for a useful message.

use cmdshim_input::InputError;
use thiserror::Error;

use crate::client::ClientError;
use crate::descriptor::DescriptorError;
use crate::hooks::HookError;
use crate::projection::ProjectionError;

/// Errors produced while binding, confirming, invoking or projecting.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A binding named no parameter or alias of the operation.
    #[error("{operation} has no parameter named '{name}'")]
    UnknownParameter { operation: String, name: String },

    /// A bound value does not fit the parameter's kind.
    #[error("parameter '{field}' of {operation} expects {expected}, got {found}")]
    InvalidParameter {
        operation: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The same parameter was bound twice, possibly through an alias.
    #[error("parameter '{field}' of {operation} was bound twice (as '{first}' and '{second}')")]
    DuplicateParameter {
        operation: String,
        field: String,
        first: String,
        second: String,
    },

    /// The `--select` directive does not resolve against the operation.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The operator answered no (or closed the prompt).
    #[error("operation \"{label}\" on target \"{target}\" was declined")]
    Declined { label: String, target: String },

    /// Confirmation was required but nobody can be asked.
    #[error(
        "operation \"{label}\" on target \"{target}\" needs confirmation but no terminal is \
         available; pass --force to proceed"
    )]
    ConfirmationUnavailable { label: String, target: String },

    /// Writing the prompt or reading the answer failed.
    #[error("confirmation prompt failed: {0}")]
    Prompt(#[source] InputError),

    /// The client provider could not produce a client.
    #[error("failed to create client for service '{service}': {source}")]
    Client {
        service: String,
        #[source]
        source: ClientError,
    },

    /// The endpoint could not be reached.
    #[error("could not connect to the endpoint {endpoint}: {source}")]
    Connectivity {
        endpoint: String,
        #[source]
        source: ClientError,
    },

    /// The service answered with an error; passed through unchanged.
    #[error(transparent)]
    Service(ClientError),

    /// The invocation was cancelled before the service answered.
    #[error("operation cancelled")]
    Cancelled,

    /// A hook rejected the invocation.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The blocking adapter could not start its runtime.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// An operation descriptor is malformed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Coarse classification used for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters or projection.
    Usage,
    /// The operator did not confirm.
    Declined,
    /// The endpoint was unreachable.
    Connectivity,
    /// The service returned an error.
    Service,
    /// Cancelled by the operator.
    Cancelled,
    /// Everything else.
    Other,
}

impl ErrorKind {
    /// Process exit code for this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Declined => 3,
            ErrorKind::Connectivity => 4,
            ErrorKind::Service => 5,
            ErrorKind::Cancelled => 130,
            ErrorKind::Other => 1,
        }
    }
}

impl DispatchError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownParameter { .. }
            | DispatchError::InvalidParameter { .. }
            | DispatchError::DuplicateParameter { .. }
            | DispatchError::Projection(_) => ErrorKind::Usage,
            DispatchError::Declined { .. } | DispatchError::ConfirmationUnavailable { .. } => {
                ErrorKind::Declined
            }
            DispatchError::Connectivity { .. } => ErrorKind::Connectivity,
            DispatchError::Service(_) => ErrorKind::Service,
            DispatchError::Cancelled => ErrorKind::Cancelled,
            DispatchError::Prompt(_)
            | DispatchError::Client { .. }
            | DispatchError::Hook(_)
            | DispatchError::Runtime(_)
            | DispatchError::Descriptor(_) => ErrorKind::Other,
        }
    }

    /// Returns true if the operator cancelled the invocation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled)
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}
