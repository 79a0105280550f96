//! Command-line flags for operation parameters.
//!
//! Every [`FieldSpec`] becomes one long flag named after the kebab-cased
//! canonical name. The canonical spelling and every declared alias are clap
//! aliases, so `--api-id`, `--ApiId` and `--Id` can all bind the same
//! parameter.
//!
//! | kind       | flag shape                          | bound value |
//! |------------|-------------------------------------|-------------|
//! | `String`   | `--name demo`                       | string |
//! | `Integer`  | `--max-items 10`                    | integer |
//! | `Float`    | `--ratio 0.5`                       | float |
//! | `Boolean`  | `--enabled` or `--enabled false`    | boolean |
//! | `List`     | `--subnet-ids a b` or repeated      | array of strings |
//! | `Map`      | `--tag env=test --tag team=core`    | object of strings |
//! | `Document` | `--policy '{"Version": "1"}'`       | any JSON |
//!
//! Nothing is marked required or given a default at the clap level: missing
//! required parameters are reported by the context builder, and defaults are
//! applied there.

use clap::parser::MatchesError;
use clap::{Arg, ArgAction, ArgMatches};
use cmdshim_dispatch::{kebab_case, Bindings, FieldKind, FieldSpec, OperationDescriptor};
use serde_json::{Map, Value};

/// Every long flag a field answers to, the primary flag first.
pub fn flag_names(field: &FieldSpec) -> Vec<String> {
    let mut names = vec![field.flag_name()];
    let spellings = std::iter::once(&field.name)
        .chain(&field.aliases)
        .flat_map(|name| [name.clone(), kebab_case(name)]);

    for name in spellings {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Builds the clap argument for one field. The argument id is the canonical
/// field name.
pub fn field_arg(field: &FieldSpec) -> Arg {
    let mut names = flag_names(field).into_iter();
    let primary = names.next().unwrap_or_else(|| field.flag_name());

    let mut arg = Arg::new(field.name.clone())
        .long(primary)
        .help(help_text(field));

    for alias in names {
        arg = arg.alias(alias);
    }

    match field.kind {
        FieldKind::String => arg.value_name("TEXT").action(ArgAction::Set),
        FieldKind::Integer => arg
            .value_name("INT")
            .value_parser(clap::value_parser!(i64))
            .allow_negative_numbers(true),
        FieldKind::Float => arg
            .value_name("NUMBER")
            .value_parser(clap::value_parser!(f64))
            .allow_negative_numbers(true),
        FieldKind::Boolean => arg
            .value_name("BOOL")
            .value_parser(clap::value_parser!(bool))
            .num_args(0..=1)
            .default_missing_value("true"),
        FieldKind::List => arg
            .value_name("VALUE")
            .action(ArgAction::Append)
            .num_args(1..),
        FieldKind::Map => arg
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .num_args(1..)
            .value_parser(parse_key_value),
        FieldKind::Document => arg.value_name("JSON").value_parser(parse_document),
    }
}

fn help_text(field: &FieldSpec) -> String {
    let mut help = field
        .help
        .clone()
        .unwrap_or_else(|| format!("{} ({})", field.name, field.kind));
    if field.required {
        help.push_str(" [required]");
    }
    if let Some(default) = &field.default {
        help.push_str(&format!(" [default: {}]", default));
    }
    if field.target.len() > 1 {
        help.push_str(&format!(" [request: {}]", field.target_path()));
    }
    help
}

/// Reads the bound parameters of `op` out of its command's matches.
///
/// Only flags the operator supplied are bound, in field order, under their
/// canonical names.
pub fn bindings_from_matches(
    op: &OperationDescriptor,
    matches: &ArgMatches,
) -> Result<Bindings, MatchesError> {
    let mut bindings = Bindings::new();

    for field in &op.fields {
        let id = field.name.as_str();
        let value = match field.kind {
            FieldKind::String => matches
                .try_get_one::<String>(id)?
                .map(|s| Value::String(s.clone())),
            FieldKind::Integer => matches.try_get_one::<i64>(id)?.map(|n| Value::from(*n)),
            FieldKind::Float => matches.try_get_one::<f64>(id)?.map(|n| Value::from(*n)),
            FieldKind::Boolean => matches.try_get_one::<bool>(id)?.map(|b| Value::Bool(*b)),
            FieldKind::List => matches
                .try_get_many::<String>(id)?
                .map(|items| Value::Array(items.cloned().map(Value::String).collect())),
            FieldKind::Map => matches.try_get_many::<(String, String)>(id)?.map(|pairs| {
                let map: Map<String, Value> = pairs
                    .cloned()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect();
                Value::Object(map)
            }),
            FieldKind::Document => matches.try_get_one::<Value>(id)?.cloned(),
        };

        if let Some(value) = value {
            bindings.push((field.name.clone(), value));
        }
    }

    Ok(bindings)
}

/// Parses `key=value`. The value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Parses an inline JSON document.
pub fn parse_document(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;
    use serde_json::json;

    fn op() -> OperationDescriptor {
        OperationDescriptor::new("workflow", "CreateEnvironment")
            .field(FieldSpec::string("Name").required())
            .field(FieldSpec::integer("MaxWorkers"))
            .field(FieldSpec::float("Ratio"))
            .field(FieldSpec::boolean("Enabled").at("LoggingConfiguration.DagProcessingLogs.Enabled"))
            .field(FieldSpec::list("SubnetIds").at("NetworkConfiguration.SubnetIds"))
            .field(FieldSpec::map("Tags").alias("Tag"))
            .field(FieldSpec::document("Policy"))
    }

    fn parse(args: &[&str]) -> Bindings {
        let op = op();
        let cmd = op
            .fields
            .iter()
            .fold(Command::new("create-environment"), |cmd, f| cmd.arg(field_arg(f)));
        let matches = cmd
            .try_get_matches_from(std::iter::once("create-environment").chain(args.iter().copied()))
            .unwrap();
        bindings_from_matches(&op, &matches).unwrap()
    }

    #[test]
    fn test_flag_names_include_canonical_and_aliases() {
        let field = FieldSpec::map("Tags").alias("Tag");
        assert_eq!(flag_names(&field), vec!["tags", "Tags", "Tag", "tag"]);
    }

    #[test]
    fn test_flag_names_skip_duplicates() {
        assert_eq!(flag_names(&FieldSpec::string("name")), vec!["name"]);
    }

    #[test]
    fn test_unbound_flags_are_absent() {
        assert!(parse(&[]).is_empty());
    }

    #[test]
    fn test_scalars_by_kind() {
        let bindings = parse(&["--name", "env1", "--max-workers", "5", "--ratio", "-0.5"]);
        assert_eq!(
            bindings,
            vec![
                ("Name".to_string(), json!("env1")),
                ("MaxWorkers".to_string(), json!(5)),
                ("Ratio".to_string(), json!(-0.5)),
            ]
        );
    }

    #[test]
    fn test_canonical_spelling_is_an_alias() {
        let bindings = parse(&["--Name", "env1", "--MaxWorkers", "2"]);
        assert_eq!(bindings[0], ("Name".to_string(), json!("env1")));
        assert_eq!(bindings[1], ("MaxWorkers".to_string(), json!(2)));
    }

    #[test]
    fn test_boolean_with_and_without_value() {
        assert_eq!(parse(&["--enabled"])[0].1, json!(true));
        assert_eq!(parse(&["--enabled", "false"])[0].1, json!(false));
    }

    #[test]
    fn test_list_multi_valued_and_repeated() {
        assert_eq!(
            parse(&["--subnet-ids", "a", "b", "--subnet-ids", "c"])[0].1,
            json!(["a", "b", "c"])
        );
    }

    #[test]
    fn test_map_through_alias() {
        let bindings = parse(&["--tag", "env=test", "--Tag", "team=core"]);
        assert_eq!(
            bindings,
            vec![("Tags".to_string(), json!({"env": "test", "team": "core"}))]
        );
    }

    #[test]
    fn test_document_is_json() {
        let bindings = parse(&["--policy", r#"{"Version": "1", "Rules": [1, 2]}"#]);
        assert_eq!(bindings[0].1, json!({"Version": "1", "Rules": [1, 2]}));
    }

    #[test]
    fn test_bad_values_are_rejected_by_clap() {
        let op = op();
        let cmd = op
            .fields
            .iter()
            .fold(Command::new("c"), |cmd, f| cmd.arg(field_arg(f)));
        assert!(cmd.clone().try_get_matches_from(["c", "--max-workers", "many"]).is_err());
        assert!(cmd.clone().try_get_matches_from(["c", "--tag", "novalue"]).is_err());
        assert!(cmd.try_get_matches_from(["c", "--policy", "{oops"]).is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("url=http://x?a=b").unwrap(),
            ("url".to_string(), "http://x?a=b".to_string())
        );
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("x").is_err());
    }

    #[test]
    fn test_help_mentions_required_and_request_path() {
        let op = op();
        assert!(help_text(&op.fields[0]).ends_with("[required]"));
        assert!(help_text(&op.fields[3])
            .contains("[request: LoggingConfiguration.DagProcessingLogs.Enabled]"));
    }
}
