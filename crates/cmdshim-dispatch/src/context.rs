//! Execution context construction.
//!
//! The [`ContextBuilder`] turns caller bindings into an [`ExecutionContext`]:
//! names are resolved to canonical fields, values are checked against their
//! kind, defaults fill the gaps, and the projection is attached.
//!
//! Missing required fields do not fail here. They are logged and recorded as
//! [`ContextWarning`]s, and the request goes out without them so the service
//! gives the authoritative answer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{json_type_name, Bindings, OperationDescriptor};
use crate::error::DispatchError;
use crate::projection::{Projection, Select};

/// An issue noticed while binding that is left for the service to judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextWarning {
    MissingRequired { field: String },
}

impl fmt::Display for ContextWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextWarning::MissingRequired { field } => {
                write!(f, "required parameter '{}' was not supplied", field)
            }
        }
    }
}

/// Where a field's value lands in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSlot {
    pub(crate) name: String,
    pub(crate) target: Vec<String>,
}

/// The bound parameter set for one invocation.
///
/// Immutable once built. Serializes as the operation, the bound values by
/// canonical name, the projection and any warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionContext {
    service: String,
    operation: String,
    parameters: BTreeMap<String, Value>,
    projection: Projection,
    warnings: Vec<ContextWarning>,
    #[serde(skip)]
    layout: Vec<FieldSlot>,
}

impl ExecutionContext {
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The value bound to a canonical parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Bound values by canonical name.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn warnings(&self) -> &[ContextWarning] {
        &self.warnings
    }

    /// Every field of the operation in declaration order, bound or not.
    pub(crate) fn layout(&self) -> &[FieldSlot] {
        &self.layout
    }
}

/// Builds an [`ExecutionContext`] for one operation.
///
/// # Example
///
/// ```rust
/// use cmdshim_dispatch::{ContextBuilder, FieldSpec, OperationDescriptor, Projection};
/// use serde_json::json;
///
/// let op = OperationDescriptor::new("graph", "CreateApi")
///     .field(FieldSpec::string("Name").required())
///     .field(FieldSpec::map("Tags").alias("Tag"));
///
/// let ctx = ContextBuilder::new(&op)
///     .build(&vec![("tag".into(), json!({"env": "test"}))], Projection::Identity)
///     .unwrap();
///
/// assert_eq!(ctx.get("Tags"), Some(&json!({"env": "test"})));
/// assert_eq!(ctx.warnings().len(), 1); // Name is required but missing
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder<'a> {
    op: &'a OperationDescriptor,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(op: &'a OperationDescriptor) -> Self {
        Self { op }
    }

    /// Binds parameters with an already resolved projection.
    pub fn build(
        &self,
        bindings: &Bindings,
        projection: Projection,
    ) -> Result<ExecutionContext, DispatchError> {
        let op = self.op;
        let mut slots: Vec<Option<(String, Value)>> = vec![None; op.fields.len()];

        for (name, value) in bindings {
            let index = op
                .field_index(name)
                .ok_or_else(|| DispatchError::UnknownParameter {
                    operation: op.name.clone(),
                    name: name.clone(),
                })?;
            if value.is_null() {
                continue;
            }

            let field = &op.fields[index];
            if let Some((first, _)) = &slots[index] {
                return Err(DispatchError::DuplicateParameter {
                    operation: op.name.clone(),
                    field: field.name.clone(),
                    first: first.clone(),
                    second: name.clone(),
                });
            }

            let found = json_type_name(value);
            let value =
                field
                    .kind
                    .coerce(value.clone())
                    .ok_or_else(|| DispatchError::InvalidParameter {
                        operation: op.name.clone(),
                        field: field.name.clone(),
                        expected: field.kind.name(),
                        found,
                    })?;
            slots[index] = Some((name.clone(), value));
        }

        let mut parameters = BTreeMap::new();
        let mut warnings = Vec::new();
        for (field, slot) in op.fields.iter().zip(slots) {
            match slot.map(|(_, v)| v).or_else(|| field.default.clone()) {
                Some(value) => {
                    parameters.insert(field.name.clone(), value);
                }
                None if field.required => {
                    tracing::warn!(
                        operation = %op.name,
                        field = %field.name,
                        "required parameter not supplied; leaving it to the service"
                    );
                    warnings.push(ContextWarning::MissingRequired {
                        field: field.name.clone(),
                    });
                }
                None => {}
            }
        }

        let layout = op
            .fields
            .iter()
            .map(|f| FieldSlot {
                name: f.name.clone(),
                target: f.target.clone(),
            })
            .collect();

        Ok(ExecutionContext {
            service: op.service.clone(),
            operation: op.name.clone(),
            parameters,
            projection,
            warnings,
            layout,
        })
    }

    /// Resolves `select` (or the operation's default) and binds.
    pub fn build_selected(
        &self,
        bindings: &Bindings,
        select: Option<&Select>,
    ) -> Result<ExecutionContext, DispatchError> {
        let select = select.unwrap_or(&self.op.default_select);
        let projection = Projection::resolve(select, self.op)?;
        self.build(bindings, projection)
    }
}
