//! Rendering projected results.
//!
//! Results are plain `serde_json::Value`s, so every format is a serde
//! serializer away. CSV needs a table, so objects and arrays of objects are
//! flattened first.

use serde_json::Value;
use thiserror::Error;

use crate::OutputMode;

/// Errors that can occur while rendering a result.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

impl From<csv::Error> for SerializeError {
    fn from(err: csv::Error) -> Self {
        SerializeError::Csv(err.to_string())
    }
}

/// Renders `value` in `mode`. `Auto` is resolved against stdout first.
///
/// The result has no trailing newline.
pub fn render_value(value: &Value, mode: OutputMode) -> Result<String, SerializeError> {
    let rendered = match mode.resolve_auto() {
        OutputMode::Auto | OutputMode::Text => to_text(value)?,
        OutputMode::Json => to_json(value)?,
        OutputMode::Yaml => to_yaml(value)?,
        OutputMode::Xml => to_xml(value)?,
        OutputMode::Csv => to_csv(value)?,
    };
    Ok(rendered.trim_end_matches('\n').to_string())
}

/// Strings print bare, `null` prints nothing, anything else as YAML.
pub fn to_text(value: &Value) -> Result<String, SerializeError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        other => to_yaml(other),
    }
}

pub fn to_json(value: &Value) -> Result<String, SerializeError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_yaml(value: &Value) -> Result<String, SerializeError> {
    Ok(serde_yaml::to_string(value)?)
}

/// XML under a `<result>` root element.
pub fn to_xml(value: &Value) -> Result<String, SerializeError> {
    Ok(quick_xml::se::to_string_with_root("result", value)?)
}

/// CSV with one row per object.
///
/// An array of objects gets the union of their keys as the header, in first
/// seen order. A single object becomes `key,value` rows. Nested values are
/// written as compact JSON.
pub fn to_csv(value: &Value) -> Result<String, SerializeError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match value {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            let mut headers: Vec<&str> = Vec::new();
            for item in items.iter().filter_map(Value::as_object) {
                for key in item.keys() {
                    if !headers.contains(&key.as_str()) {
                        headers.push(key);
                    }
                }
            }
            wtr.write_record(&headers)?;
            for item in items.iter().filter_map(Value::as_object) {
                wtr.write_record(
                    headers
                        .iter()
                        .map(|h| item.get(*h).map(cell).unwrap_or_default()),
                )?;
            }
        }
        Value::Array(items) => {
            wtr.write_record(["value"])?;
            for item in items {
                wtr.write_record([cell(item)])?;
            }
        }
        Value::Object(map) => {
            wtr.write_record(["key", "value"])?;
            for (key, v) in map {
                wtr.write_record([key.clone(), cell(v)])?;
            }
        }
        scalar => {
            wtr.write_record(["value"])?;
            wtr.write_record([cell(scalar)])?;
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

fn cell(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
