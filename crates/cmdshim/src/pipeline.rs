//! Pipeline input.
//!
//! With `--pipeline`, stdin carries JSON objects, either one per line or as
//! a single array. Each object is a set of parameter bindings merged over the
//! command-line bindings, and each one becomes its own invocation.
//!
//! ```text
//! $ printf '{"ApiId":"a"}\n{"ApiId":"b"}\n' | shimdemo graph delete-api --pipeline --force
//! ```

use std::sync::Arc;

use clap::ArgMatches;
use cmdshim_dispatch::{Bindings, OperationDescriptor};
use cmdshim_input::env::StdinReader;
use cmdshim_input::{InputChain, InputError, StdinSource};
use serde_json::{Map, Value};
use thiserror::Error;

/// One set of bindings read from stdin.
pub type PipelineItem = Map<String, Value>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("--pipeline expects JSON objects on stdin, but nothing was piped")]
    NoInput,

    #[error("failed to read pipeline input: {0}")]
    Read(#[source] InputError),

    #[error("pipeline item {index} is not valid JSON: {source}")]
    Json {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("pipeline item {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Parses pipeline text. Item indices in errors start at 1.
pub fn parse_pipeline(text: &str) -> Result<Vec<PipelineItem>, PipelineError> {
    let text = text.trim();
    if text.starts_with('[') {
        let items: Vec<Value> =
            serde_json::from_str(text).map_err(|source| PipelineError::Json { index: 1, source })?;
        return items
            .into_iter()
            .enumerate()
            .map(|(i, item)| into_object(i + 1, item))
            .collect();
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let value = serde_json::from_str(line)
                .map_err(|source| PipelineError::Json { index: i + 1, source })?;
            into_object(i + 1, value)
        })
        .collect()
}

fn into_object(index: usize, value: Value) -> Result<PipelineItem, PipelineError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PipelineError::NotAnObject { index }),
    }
}

/// Reads and parses piped stdin.
pub fn read_pipeline(
    reader: Arc<dyn StdinReader>,
    matches: &ArgMatches,
) -> Result<Vec<PipelineItem>, PipelineError> {
    let text = InputChain::<String>::new()
        .try_source(StdinSource::shared(reader))
        .resolve(matches)
        .map_err(|err| match err {
            InputError::NoInput => PipelineError::NoInput,
            other => PipelineError::Read(other),
        })?;
    parse_pipeline(&text)
}

/// Merges `item` over `base`.
///
/// A key in `item` replaces every base binding of the same parameter, even
/// when the two use different aliases. Keys that name no parameter are kept so
/// the context builder can reject them.
pub fn merge_bindings(op: &OperationDescriptor, base: &Bindings, item: PipelineItem) -> Bindings {
    let replaced: Vec<usize> = item.keys().filter_map(|k| op.field_index(k)).collect();

    let mut merged: Bindings = base
        .iter()
        .filter(|(name, _)| match op.field_index(name) {
            Some(i) => !replaced.contains(&i),
            None => !item.keys().any(|k| k.eq_ignore_ascii_case(name)),
        })
        .cloned()
        .collect();

    merged.extend(item);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdshim_dispatch::FieldSpec;
    use cmdshim_input::MockStdin;
    use serde_json::json;

    fn op() -> OperationDescriptor {
        OperationDescriptor::new("graph", "UpdateApi")
            .field(FieldSpec::string("ApiId").required().identifier())
            .field(FieldSpec::string("Name"))
            .field(FieldSpec::map("Tags").alias("Tag"))
            .mutating()
    }

    #[test]
    fn test_json_lines() {
        let items = parse_pipeline("{\"ApiId\": \"a\"}\n\n  {\"ApiId\": \"b\"}\n").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["ApiId"], "b");
    }

    #[test]
    fn test_json_array() {
        let items = parse_pipeline(r#"[{"ApiId": "a"}, {"ApiId": "b", "Name": "x"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["Name"], "x");
    }

    #[test]
    fn test_non_object_reports_index() {
        let err = parse_pipeline("{\"ApiId\": \"a\"}\n42\n").unwrap_err();
        assert!(matches!(err, PipelineError::NotAnObject { index: 2 }));
    }

    #[test]
    fn test_bad_json_reports_index() {
        let err = parse_pipeline("{\"ApiId\": \"a\"}\n{oops\n").unwrap_err();
        assert!(matches!(err, PipelineError::Json { index: 2, .. }));
    }

    fn read(stdin: MockStdin) -> Result<Vec<PipelineItem>, PipelineError> {
        let matches = clap::Command::new("shimdemo")
            .try_get_matches_from(["shimdemo"])
            .unwrap();
        read_pipeline(Arc::new(stdin), &matches)
    }

    #[test]
    fn test_read_requires_piped_input() {
        assert!(matches!(read(MockStdin::terminal()), Err(PipelineError::NoInput)));
        assert!(matches!(read(MockStdin::piped_empty()), Err(PipelineError::NoInput)));
        assert_eq!(read(MockStdin::piped("{\"ApiId\": \"a\"}")).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_replaces_same_parameter_across_aliases() {
        let base = vec![
            ("Name".to_string(), json!("from-cli")),
            ("Tag".to_string(), json!({"env": "cli"})),
        ];
        let item = json!({"tags": {"env": "pipe"}, "ApiId": "a"})
            .as_object()
            .unwrap()
            .clone();

        let merged = merge_bindings(&op(), &base, item);
        assert!(merged.contains(&("Name".to_string(), json!("from-cli"))));
        assert!(merged.contains(&("tags".to_string(), json!({"env": "pipe"}))));
        assert!(!merged.iter().any(|(k, _)| k == "Tag"));
        assert!(merged.contains(&("ApiId".to_string(), json!("a"))));
    }

    proptest::proptest! {
        #[test]
        fn prop_merge_binds_each_parameter_once(
            base_name in proptest::sample::select(vec!["Tags", "tags", "Tag", "TAG"]),
            item_name in proptest::sample::select(vec!["Tags", "tags", "Tag", "TAG"]),
            id in "[a-z]{1,8}",
        ) {
            let base = vec![
                (base_name.to_string(), json!({"from": "cli"})),
                ("ApiId".to_string(), json!(id)),
            ];
            let item = json!({item_name: {"from": "pipe"}}).as_object().unwrap().clone();

            let merged = merge_bindings(&op(), &base, item);
            let tags: Vec<_> = merged
                .iter()
                .filter(|(k, _)| op().field_index(k) == Some(2))
                .collect();

            proptest::prop_assert_eq!(tags.len(), 1);
            proptest::prop_assert_eq!(&tags[0].1, &json!({"from": "pipe"}));
            proptest::prop_assert!(merged.contains(&("ApiId".to_string(), json!(id))));
        }
    }

    #[test]
    fn test_merge_keeps_unknown_keys() {
        let item = json!({"Bogus": 1}).as_object().unwrap().clone();
        let merged = merge_bindings(&op(), &Vec::new(), item);
        assert_eq!(merged, vec![("Bogus".to_string(), json!(1))]);
    }
}
