//! Error types for application setup.

use cmdshim_dispatch::DescriptorError;

/// Error type for building an [`App`](crate::App) or its registry.
#[derive(Debug)]
pub enum SetupError {
    /// A descriptor failed validation.
    Descriptor(DescriptorError),
    /// Two operations generate the same command.
    DuplicateCommand { service: String, command: String },
    /// Two parameters of one operation map to the same command-line flag.
    FlagCollision {
        operation: String,
        flag: String,
        first: String,
        second: String,
    },
    /// A service or command name clashes with a built-in subcommand.
    ReservedCommand(String),
    /// Hooks were registered for an operation that does not exist.
    UnknownOperation { service: String, operation: String },
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Descriptor(err) => write!(f, "invalid descriptor: {}", err),
            SetupError::DuplicateCommand { service, command } => {
                write!(f, "duplicate command: {} {}", service, command)
            }
            SetupError::FlagCollision {
                operation,
                flag,
                first,
                second,
            } => write!(
                f,
                "{}: parameters '{}' and '{}' both map to --{}",
                operation, first, second, flag
            ),
            SetupError::ReservedCommand(name) => {
                write!(f, "'{}' is reserved for a built-in subcommand", name)
            }
            SetupError::UnknownOperation { service, operation } => {
                write!(f, "hooks registered for unknown operation {} {}", service, operation)
            }
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Descriptor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DescriptorError> for SetupError {
    fn from(e: DescriptorError) -> Self {
        SetupError::Descriptor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::DuplicateCommand {
            service: "graph".into(),
            command: "create-api".into(),
        };
        assert_eq!(err.to_string(), "duplicate command: graph create-api");

        let err = SetupError::ReservedCommand("operations".into());
        assert_eq!(
            err.to_string(),
            "'operations' is reserved for a built-in subcommand"
        );
    }
}
