//! Operation descriptors.
//!
//! An [`OperationDescriptor`] is the data value that parameterizes the
//! generic engine for one remote call: its parameters, where each one lands
//! in the request, which response fields `--select` may name, and whether the
//! call mutates anything.
//!
//! # Example
//!
//! ```rust
//! use cmdshim_dispatch::{FieldSpec, OperationDescriptor, Select};
//!
//! let op = OperationDescriptor::new("graph", "UpdateApi")
//!     .label("Update-GraphApi (UpdateApi)")
//!     .field(FieldSpec::string("ApiId").required().identifier())
//!     .field(FieldSpec::string("Name"))
//!     .field(FieldSpec::map("Tags").alias("Tag"))
//!     .response_fields(["ApiId", "Name", "Tags"])
//!     .mutating();
//!
//! assert_eq!(op.command, "update-api");
//! assert!(op.validate().is_ok());
//! assert_eq!(op.default_select, Select::All);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::projection::{Projection, ProjectionError, Select};

/// Parameters as bound by the caller, in binding order.
///
/// Names may be canonical names or aliases, in any ASCII case.
pub type Bindings = Vec<(String, Value)>;

/// Command-line flags every generated command already owns.
pub const RESERVED_NAMES: &[&str] = &[
    "select",
    "force",
    "dry-run",
    "region",
    "endpoint-url",
    "profile",
    "output",
    "config",
    "verbose",
    "pipeline",
    "help",
];

/// The value shape a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// A list of scalars or documents. A lone scalar is wrapped.
    List,
    /// A string-keyed object, given as `key=value` pairs on the command line.
    Map,
    /// Any JSON value.
    Document,
}

impl FieldKind {
    /// Human-readable kind name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Float => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::List => "a list",
            FieldKind::Map => "a map",
            FieldKind::Document => "a document",
        }
    }

    /// Checks `value` against this kind, wrapping scalars bound to lists.
    ///
    /// Returns `None` when the value does not fit.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (FieldKind::String, v @ Value::String(_)) => Some(v),
            (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(Value::Number(n))
            }
            (FieldKind::Float, v @ Value::Number(_)) => Some(v),
            (FieldKind::Boolean, v @ Value::Bool(_)) => Some(v),
            (FieldKind::List, v @ Value::Array(_)) => Some(v),
            (FieldKind::List, v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                Some(Value::Array(vec![v]))
            }
            (FieldKind::Map, v @ Value::Object(_)) => Some(v),
            (FieldKind::Document, v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::List => "list",
            FieldKind::Map => "map",
            FieldKind::Document => "document",
        };
        f.write_str(name)
    }
}

/// JSON type name of a value, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// One parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Canonical name, as the service spells it (`ApiId`).
    pub name: String,
    /// Alternative names accepted when binding.
    pub aliases: Vec<String>,
    pub kind: FieldKind,
    /// Missing required fields are reported but do not fail binding.
    pub required: bool,
    /// Included in the confirmation summary.
    pub identifier: bool,
    /// Used when the field is not bound.
    pub default: Option<Value>,
    /// Path of the value inside the request body.
    pub target: Vec<String>,
    pub help: Option<String>,
}

impl FieldSpec {
    /// A field of the given kind that lands at the top level of the request.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            target: vec![name.clone()],
            name,
            aliases: Vec::new(),
            kind,
            required: false,
            identifier: false,
            default: None,
            help: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Map)
    }

    pub fn document(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Document)
    }

    /// Adds an alternative binding name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Places the value at a dotted path inside the request.
    ///
    /// `"LoggingConfiguration.DagProcessingLogs.Enabled"` puts the value under
    /// two nested composites. Empty segments are dropped.
    pub fn at(mut self, path: &str) -> Self {
        let target: Vec<String> = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !target.is_empty() {
            self.target = target;
        }
        self
    }

    /// The long flag for this field (`ApiId` becomes `api-id`).
    pub fn flag_name(&self) -> String {
        kebab_case(&self.name)
    }

    /// The target path joined with dots.
    pub fn target_path(&self) -> String {
        self.target.join(".")
    }

    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Everything the engine needs to know about one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    /// Service the operation belongs to (`graph`).
    pub service: String,
    /// Operation name sent to the client (`CreateApi`).
    pub name: String,
    /// Subcommand name (`create-api`).
    pub command: String,
    /// Shown in the confirmation prompt.
    pub label: String,
    pub about: Option<String>,
    pub fields: Vec<FieldSpec>,
    /// Top-level response fields `--select` may name.
    pub response_fields: Vec<String>,
    pub default_select: Select,
    pub mutating: bool,
}

impl OperationDescriptor {
    /// A read-only operation with no parameters that returns the whole response.
    pub fn new(service: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            service: service.into(),
            command: kebab_case(&name),
            label: name.clone(),
            name,
            about: None,
            fields: Vec::new(),
            response_fields: Vec::new(),
            default_select: Select::All,
            mutating: false,
        }
    }

    /// Overrides the generated subcommand name.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn response_field(mut self, name: impl Into<String>) -> Self {
        self.response_fields.push(name.into());
        self
    }

    pub fn response_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_fields.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn default_select(mut self, select: Select) -> Self {
        self.default_select = select;
        self
    }

    /// Marks the operation as changing server state, which turns on confirmation.
    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    /// Finds a field by canonical name, then by alias, ignoring ASCII case.
    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    /// Index of the field [`find_field`](Self::find_field) would return.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.is_named(name))
            .or_else(|| self.fields.iter().position(|f| f.has_alias(name)))
    }

    /// Declared response field matching `name`, ignoring ASCII case.
    pub fn find_response_field(&self, name: &str) -> Option<&str> {
        self.response_fields
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Target description for the confirmation prompt.
    ///
    /// Built from the bound identifier fields (`ApiId=abc`). Falls back to the
    /// operation name when none is bound.
    pub fn identifier_summary(&self, bindings: &Bindings) -> String {
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.identifier)
            .filter_map(|f| {
                bindings
                    .iter()
                    .find(|(name, value)| {
                        !value.is_null() && (f.is_named(name) || f.has_alias(name))
                    })
                    .map(|(_, value)| format!("{}={}", f.name, display_value(value)))
            })
            .collect();

        if parts.is_empty() {
            self.name.clone()
        } else {
            parts.join(", ")
        }
    }

    /// Checks the descriptor for internal consistency.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.service.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DescriptorError::MissingName {
                service: self.service.clone(),
                operation: self.name.clone(),
            });
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        for field in &self.fields {
            for name in std::iter::once(&field.name).chain(&field.aliases) {
                let flag = kebab_case(name);
                if RESERVED_NAMES.contains(&flag.as_str()) {
                    return Err(DescriptorError::ReservedName {
                        operation: self.name.clone(),
                        name: name.clone(),
                    });
                }
                if let Some(owner) = seen.insert(name.to_ascii_lowercase(), &field.name) {
                    return Err(DescriptorError::DuplicateName {
                        operation: self.name.clone(),
                        name: name.clone(),
                        first: owner.to_string(),
                    });
                }
            }
        }

        for (i, a) in self.fields.iter().enumerate() {
            for b in &self.fields[i + 1..] {
                let shorter = a.target.len().min(b.target.len());
                if a.target[..shorter] == b.target[..shorter] {
                    return Err(DescriptorError::TargetConflict {
                        operation: self.name.clone(),
                        first: a.target_path(),
                        second: b.target_path(),
                    });
                }
            }
        }

        Projection::resolve(&self.default_select, self).map_err(|source| {
            DescriptorError::InvalidDefaultSelect {
                operation: self.name.clone(),
                source,
            }
        })?;

        Ok(())
    }
}

/// Problems found by [`OperationDescriptor::validate`].
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("operation descriptor needs a service and an operation name (got '{service}' / '{operation}')")]
    MissingName { service: String, operation: String },

    #[error("{operation}: the name '{name}' is already used by parameter '{first}'")]
    DuplicateName {
        operation: String,
        name: String,
        first: String,
    },

    #[error("{operation}: '{name}' collides with a built-in flag")]
    ReservedName { operation: String, name: String },

    #[error("{operation}: request paths '{first}' and '{second}' overlap")]
    TargetConflict {
        operation: String,
        first: String,
        second: String,
    },

    #[error("{operation}: invalid default selection: {source}")]
    InvalidDefaultSelect {
        operation: String,
        #[source]
        source: ProjectionError,
    },
}

/// Converts `CamelCase` and `snake_case` names to `kebab-case`.
///
/// Acronyms stay together: `EndpointURL` becomes `endpoint-url`.
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out.trim_end_matches('-').to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
