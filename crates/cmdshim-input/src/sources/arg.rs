//! CLI argument input sources.

use clap::ArgMatches;

use crate::collector::{InputCollector, InputSourceKind, ResolvedInput};
use crate::InputError;

/// Reads a string value from a clap argument.
///
/// Available only when the argument is defined on the command and the
/// operator supplied it.
///
/// ```ignore
/// use cmdshim_input::{InputChain, ArgSource};
///
/// // shimdemo graph update-api --api-id abc --select '^ApiId'
/// let select = InputChain::<String>::new()
///     .try_source(ArgSource::new("select"))
///     .resolve(&matches)?;
/// ```
#[derive(Debug, Clone)]
pub struct ArgSource {
    name: String,
}

impl ArgSource {
    /// The `name` must match the clap argument id.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The clap argument id.
    pub fn arg_name(&self) -> &str {
        &self.name
    }
}

impl InputCollector<String> for ArgSource {
    fn name(&self) -> &'static str {
        "argument"
    }

    fn is_available(&self, matches: &ArgMatches) -> bool {
        matches!(matches.try_get_one::<String>(&self.name), Ok(Some(_)))
    }

    fn collect(&self, matches: &ArgMatches) -> Result<Option<String>, InputError> {
        matches
            .try_get_one::<String>(&self.name)
            .map(|v| v.cloned())
            .map_err(|e| InputError::parse(&self.name, e.to_string()))
    }
}

/// Reads a boolean switch such as `--force`.
///
/// The source only answers when the switch was set, so an absent `--force`
/// falls through to the next source (typically the confirmation prompt).
#[derive(Debug, Clone)]
pub struct FlagSource {
    name: String,
    invert: bool,
}

impl FlagSource {
    /// The `name` must match the clap argument id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invert: false,
        }
    }

    /// Report `false` when the switch is set (for `--no-*` style flags).
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// The clap argument id.
    pub fn flag_name(&self) -> &str {
        &self.name
    }

    fn is_set(&self, matches: &ArgMatches) -> bool {
        matches!(matches.try_get_one::<bool>(&self.name), Ok(Some(true)))
    }

    /// Resolve the switch directly, treating "absent" as `false`.
    pub fn resolve(&self, matches: &ArgMatches) -> ResolvedInput<bool> {
        ResolvedInput {
            value: self.is_set(matches) != self.invert,
            source: InputSourceKind::Flag,
        }
    }
}

impl InputCollector<bool> for FlagSource {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn is_available(&self, matches: &ArgMatches) -> bool {
        matches.try_get_one::<bool>(&self.name).is_ok()
    }

    fn collect(&self, matches: &ArgMatches) -> Result<Option<bool>, InputError> {
        if self.is_set(matches) {
            Ok(Some(!self.invert))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn make_matches(args: &[&str]) -> ArgMatches {
        Command::new("test")
            .arg(Arg::new("select").long("select"))
            .arg(Arg::new("force").long("force").action(ArgAction::SetTrue))
            .arg(
                Arg::new("no-pipeline")
                    .long("no-pipeline")
                    .action(ArgAction::SetTrue),
            )
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn arg_source_available_when_provided() {
        let matches = make_matches(&["test", "--select", "^ApiId"]);
        let source = ArgSource::new("select");

        assert!(source.is_available(&matches));
        assert_eq!(source.collect(&matches).unwrap(), Some("^ApiId".to_string()));
    }

    #[test]
    fn arg_source_unavailable_when_missing() {
        let matches = make_matches(&["test"]);
        let source = ArgSource::new("select");

        assert!(!source.is_available(&matches));
        assert_eq!(source.collect(&matches).unwrap(), None);
    }

    #[test]
    fn arg_source_unknown_argument_is_unavailable() {
        let matches = make_matches(&["test"]);
        let source = ArgSource::new("not-defined");

        assert!(!source.is_available(&matches));
        assert!(source.collect(&matches).is_err());
    }

    #[test]
    fn flag_source_answers_when_set() {
        let matches = make_matches(&["test", "--force"]);
        let source = FlagSource::new("force");

        assert!(source.is_available(&matches));
        assert_eq!(source.collect(&matches).unwrap(), Some(true));
    }

    #[test]
    fn flag_source_passes_when_not_set() {
        let matches = make_matches(&["test"]);
        let source = FlagSource::new("force");

        assert!(source.is_available(&matches));
        assert_eq!(source.collect(&matches).unwrap(), None);
        assert!(!source.resolve(&matches).value);
    }

    #[test]
    fn flag_source_inverted() {
        let matches = make_matches(&["test", "--no-pipeline"]);
        let source = FlagSource::new("no-pipeline").inverted();

        assert_eq!(source.collect(&matches).unwrap(), Some(false));
        assert!(!source.resolve(&matches).value);

        let unset = make_matches(&["test"]);
        assert!(source.resolve(&unset).value);
    }
}
