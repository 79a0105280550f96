//! Errors the demo services answer with.

use thiserror::Error;

/// A service-side failure, printed the way a remote API would report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("BadRequestException: {0}")]
    BadRequest(String),

    #[error("NotFoundException: {0}")]
    NotFound(String),

    #[error("ConflictException: {0}")]
    Conflict(String),

    #[error("UnknownOperationException: {service} has no operation {operation}")]
    UnknownOperation { service: String, operation: String },
}

impl ServiceError {
    pub fn missing(field: &str) -> Self {
        ServiceError::BadRequest(format!("{} is required", field))
    }
}
