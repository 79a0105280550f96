//! The set of operations an application exposes.
//!
//! Descriptors are validated as they are registered, then turned into a
//! two-level clap tree: one subcommand per service, one per operation below
//! it.
//!
//! # Example
//!
//! ```rust
//! use cmdshim::OperationRegistry;
//! use cmdshim_dispatch::{FieldSpec, OperationDescriptor};
//!
//! let mut registry = OperationRegistry::new();
//! registry
//!     .register(
//!         OperationDescriptor::new("graph", "GetApi")
//!             .field(FieldSpec::string("ApiId").required()),
//!     )
//!     .unwrap();
//!
//! assert!(registry.get("graph", "get-api").is_some());
//! ```

use std::collections::HashMap;

use clap::{Arg, ArgAction, Command};
use cmdshim_dispatch::OperationDescriptor;
use serde_json::{json, Value};

use crate::params::{field_arg, flag_names};
use crate::setup::SetupError;

/// Name of the built-in catalog subcommand.
pub const OPERATIONS_COMMAND: &str = "operations";

/// Argument ids of the per-operation flags.
pub const ARG_SELECT: &str = "select";
pub const ARG_FORCE: &str = "force";
pub const ARG_DRY_RUN: &str = "dry-run";

/// Registered operations, in registration order.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: Vec<OperationDescriptor>,
    by_command: HashMap<(String, String), usize>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and adds an operation.
    pub fn register(&mut self, op: OperationDescriptor) -> Result<(), SetupError> {
        op.validate()?;

        for name in [&op.service, &op.command] {
            if name == OPERATIONS_COMMAND || name == "help" {
                return Err(SetupError::ReservedCommand(name.clone()));
            }
        }

        let mut owners: HashMap<String, &str> = HashMap::new();
        for field in &op.fields {
            for flag in flag_names(field) {
                if let Some(first) = owners.insert(flag.clone(), &field.name) {
                    if first != field.name {
                        return Err(SetupError::FlagCollision {
                            operation: op.name.clone(),
                            flag,
                            first: first.to_string(),
                            second: field.name.clone(),
                        });
                    }
                }
            }
        }

        let key = (op.service.clone(), op.command.clone());
        if self.by_command.contains_key(&key) {
            return Err(SetupError::DuplicateCommand {
                service: key.0,
                command: key.1,
            });
        }

        tracing::debug!(service = %op.service, command = %op.command, "registered operation");
        self.by_command.insert(key, self.operations.len());
        self.operations.push(op);
        Ok(())
    }

    /// Looks up an operation by service and command name.
    pub fn get(&self, service: &str, command: &str) -> Option<&OperationDescriptor> {
        self.by_command
            .get(&(service.to_string(), command.to_string()))
            .map(|&i| &self.operations[i])
    }

    /// Looks up an operation by service and operation name (`CreateApi`).
    pub fn find_operation(&self, service: &str, name: &str) -> Option<&OperationDescriptor> {
        self.operations
            .iter()
            .find(|op| op.service == service && op.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Service names in first-registration order.
    pub fn services(&self) -> Vec<&str> {
        let mut services: Vec<&str> = Vec::new();
        for op in &self.operations {
            if !services.contains(&op.service.as_str()) {
                services.push(&op.service);
            }
        }
        services
    }

    // =========================================================================
    // Command generation
    // =========================================================================

    /// Adds the service subcommands and the `operations` catalog to `cmd`.
    pub fn augment_command(&self, mut cmd: Command) -> Command {
        cmd = cmd.subcommand(
            Command::new(OPERATIONS_COMMAND).about("List the available operations"),
        );

        for service in self.services() {
            let mut service_cmd = Command::new(service.to_string())
                .about(format!("Operations of the {} service", service))
                .subcommand_required(true)
                .arg_required_else_help(true);

            for op in self.operations.iter().filter(|op| op.service == service) {
                service_cmd = service_cmd.subcommand(operation_command(op));
            }
            cmd = cmd.subcommand(service_cmd);
        }

        cmd
    }

    /// One row per operation, for the catalog subcommand.
    pub fn catalog(&self) -> Value {
        Value::Array(
            self.operations
                .iter()
                .map(|op| {
                    json!({
                        "Service": op.service,
                        "Command": op.command,
                        "Operation": op.name,
                        "Mutating": op.mutating,
                    })
                })
                .collect(),
        )
    }
}

/// The clap command for one operation.
pub fn operation_command(op: &OperationDescriptor) -> Command {
    let about = op.about.clone().unwrap_or_else(|| op.label.clone());
    let mut cmd = Command::new(op.command.clone()).about(about);

    for field in &op.fields {
        cmd = cmd.arg(field_arg(field));
    }

    cmd.arg(
        Arg::new(ARG_SELECT)
            .long("select")
            .value_name("SELECT")
            .help(format!(
                "What to return: '*' for the whole response, a response field, or '^Param' to echo a parameter [default: {}]",
                op.default_select
            )),
    )
    .arg(
        Arg::new(ARG_FORCE)
            .long("force")
            .action(ArgAction::SetTrue)
            .help("Skip the confirmation prompt"),
    )
    .arg(
        Arg::new(ARG_DRY_RUN)
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Show the request that would be sent without calling the service"),
    )
}
