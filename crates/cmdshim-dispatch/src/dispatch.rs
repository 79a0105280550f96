//! Command path helpers.
//!
//! Generated command trees are two levels deep (`<service> <command>`). These
//! helpers walk clap matches down to the leaf.

use clap::ArgMatches;

/// Extracts the command path by following the subcommand chain.
///
/// `shimdemo graph create-api --name demo` produces `["graph", "create-api"]`.
pub fn extract_command_path(matches: &ArgMatches) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = matches;

    while let Some((name, sub)) = current.subcommand() {
        if name == "help" {
            break;
        }
        path.push(name.to_string());
        current = sub;
    }

    path
}

/// Matches of the most deeply nested subcommand.
pub fn get_deepest_matches(matches: &ArgMatches) -> &ArgMatches {
    let mut current = matches;

    while let Some((name, sub)) = current.subcommand() {
        if name == "help" {
            break;
        }
        current = sub;
    }

    current
}

/// `["graph", "create-api"]` becomes `"graph create-api"`.
pub fn path_to_string(path: &[String]) -> String {
    path.join(" ")
}
