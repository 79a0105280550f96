//! Result projection.
//!
//! `--select` takes a tiny language:
//!
//! | directive | result |
//! |-----------|--------|
//! | `*`       | the whole response |
//! | `^Param`  | the value bound to `Param` (the input is echoed back) |
//! | `Field`   | `response.Field` |
//!
//! The directive is parsed into a [`Select`] and resolved against the
//! operation into a [`Projection`] before anything else happens, so a typo
//! fails before the operator is prompted and before any network call.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::descriptor::OperationDescriptor;

/// A parsed `--select` directive, not yet checked against an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Select {
    /// `*`
    #[default]
    All,
    /// A response field name.
    Field(String),
    /// `^Name`: a parameter name or alias.
    Param(String),
}

impl FromStr for Select {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProjectionError::Empty);
        }
        if s == "*" {
            return Ok(Select::All);
        }
        match s.strip_prefix('^') {
            Some("") => Err(ProjectionError::Empty),
            Some(param) => Ok(Select::Param(param.to_string())),
            None => Ok(Select::Field(s.to_string())),
        }
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Select::All => f.write_str("*"),
            Select::Field(name) => f.write_str(name),
            Select::Param(name) => write!(f, "^{}", name),
        }
    }
}

/// A [`Select`] checked against an operation, using canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum Projection {
    Identity,
    FieldSelect(String),
    InputEcho(String),
}

impl Projection {
    /// Resolves `select` against `op`.
    pub fn resolve(select: &Select, op: &OperationDescriptor) -> Result<Self, ProjectionError> {
        match select {
            Select::All => Ok(Projection::Identity),
            Select::Field(name) => op
                .find_response_field(name)
                .map(|f| Projection::FieldSelect(f.to_string()))
                .ok_or_else(|| ProjectionError::UnknownField {
                    operation: op.name.clone(),
                    field: name.clone(),
                    available: op.response_fields.join(", "),
                }),
            Select::Param(name) => op
                .find_field(name)
                .map(|f| Projection::InputEcho(f.name.clone()))
                .ok_or_else(|| ProjectionError::UnknownParameter {
                    operation: op.name.clone(),
                    parameter: name.clone(),
                }),
        }
    }

    /// Derives the invocation's result from the response.
    ///
    /// A field the service left out, or a parameter that was never bound,
    /// projects to `null`.
    pub fn project(&self, response: Value, ctx: &ExecutionContext) -> Value {
        match self {
            Projection::Identity => response,
            Projection::FieldSelect(field) => match response {
                Value::Object(mut map) => map.remove(field).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            Projection::InputEcho(param) => ctx.get(param).cloned().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Identity => f.write_str("*"),
            Projection::FieldSelect(name) => f.write_str(name),
            Projection::InputEcho(name) => write!(f, "^{}", name),
        }
    }
}

/// A `--select` directive that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("empty selection; use '*', a response field, or '^Parameter'")]
    Empty,

    #[error("{operation} returns no field '{field}' (available: {available})")]
    UnknownField {
        operation: String,
        field: String,
        available: String,
    },

    #[error("{operation} has no parameter '{parameter}' to echo")]
    UnknownParameter { operation: String, parameter: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use crate::descriptor::FieldSpec;
    use serde_json::json;

    fn update_api() -> OperationDescriptor {
        OperationDescriptor::new("graph", "UpdateApi")
            .field(FieldSpec::string("ApiId").required().alias("Id"))
            .field(FieldSpec::string("Name"))
            .response_fields(["ApiId", "Name", "ApiEndpoint"])
    }

    #[test]
    fn test_parse_select() {
        assert_eq!("*".parse::<Select>().unwrap(), Select::All);
        assert_eq!(
            "^ApiId".parse::<Select>().unwrap(),
            Select::Param("ApiId".into())
        );
        assert_eq!(
            " Name ".parse::<Select>().unwrap(),
            Select::Field("Name".into())
        );
        assert_eq!("".parse::<Select>(), Err(ProjectionError::Empty));
        assert_eq!("^".parse::<Select>(), Err(ProjectionError::Empty));
    }

    #[test]
    fn test_select_display_round_trips() {
        for text in ["*", "^ApiId", "Name"] {
            assert_eq!(text.parse::<Select>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_resolve_canonicalizes_names() {
        let op = update_api();
        assert_eq!(
            Projection::resolve(&Select::Field("apiendpoint".into()), &op).unwrap(),
            Projection::FieldSelect("ApiEndpoint".into())
        );
        assert_eq!(
            Projection::resolve(&Select::Param("id".into()), &op).unwrap(),
            Projection::InputEcho("ApiId".into())
        );
    }

    #[test]
    fn test_resolve_unknown_field() {
        let err = Projection::resolve(&Select::Field("Nmae".into()), &update_api()).unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownField { .. }));
        assert!(err.to_string().contains("ApiId, Name, ApiEndpoint"));
    }

    #[test]
    fn test_resolve_unknown_parameter() {
        let err = Projection::resolve(&Select::Param("Tags".into()), &update_api()).unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownParameter { .. }));
    }

    #[test]
    fn test_project_each_variant() {
        let op = update_api();
        let ctx = ContextBuilder::new(&op)
            .build(&vec![("ApiId".into(), json!("abc"))], Projection::Identity)
            .unwrap();
        let response = json!({"ApiId": "abc", "Name": "demo"});

        assert_eq!(
            Projection::Identity.project(response.clone(), &ctx),
            response
        );
        assert_eq!(
            Projection::FieldSelect("Name".into()).project(response.clone(), &ctx),
            json!("demo")
        );
        assert_eq!(
            Projection::InputEcho("ApiId".into()).project(json!(null), &ctx),
            json!("abc")
        );
    }

    #[test]
    fn test_project_absent_values_are_null() {
        let op = update_api();
        let ctx = ContextBuilder::new(&op)
            .build(&vec![], Projection::Identity)
            .unwrap();

        assert_eq!(
            Projection::FieldSelect("ApiEndpoint".into()).project(json!({"ApiId": "x"}), &ctx),
            Value::Null
        );
        assert_eq!(
            Projection::FieldSelect("ApiId".into()).project(json!("not an object"), &ctx),
            Value::Null
        );
        assert_eq!(
            Projection::InputEcho("Name".into()).project(json!({}), &ctx),
            Value::Null
        );
    }
}
