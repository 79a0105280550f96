//! The command-line front end.
//!
//! An [`App`] owns an [`OperationRegistry`](crate::OperationRegistry) and a
//! client provider. Running it parses the arguments, layers the settings,
//! invokes the selected operation through the dispatch engine and renders
//! the result.
//!
//! ## Execution Flow
//!
//! ```text
//! clap parsing → config + env + flags → bindings → Engine::invoke → render → stdout
//! ```
//!
//! ## Command Shape
//!
//! ```text
//! <bin> [global flags] <service> <command> [--<param> value ...] [--select S] [--force] [--dry-run]
//! <bin> [global flags] operations
//! ```
//!
//! Global flags: `--output`, `--region`, `--endpoint-url`, `--profile`,
//! `--config`, `-v/--verbose`, `--pipeline`.
//!
//! ## Exit Codes
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | success |
//! | 1    | anything else |
//! | 2    | usage: bad flags, bindings or `--select` |
//! | 3    | declined, or confirmation needed without a terminal |
//! | 4    | endpoint unreachable |
//! | 5    | the service returned an error |
//! | 130  | cancelled with Ctrl-C |

mod app;
mod builder;

pub use app::{exit_code, App};
pub use builder::AppBuilder;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

pub const ARG_OUTPUT: &str = "output";
pub const ARG_REGION: &str = "region";
pub const ARG_ENDPOINT_URL: &str = "endpoint-url";
pub const ARG_PROFILE: &str = "profile";
pub const ARG_CONFIG: &str = "config";
pub const ARG_VERBOSE: &str = "verbose";
pub const ARG_PIPELINE: &str = "pipeline";

/// Output mode names accepted by `--output`.
pub const OUTPUT_MODES: [&str; 6] = ["auto", "text", "json", "yaml", "xml", "csv"];

/// Adds the global flags to `cmd`.
pub fn global_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new(ARG_OUTPUT)
            .long("output")
            .value_name("MODE")
            .global(true)
            .value_parser(PossibleValuesParser::new(OUTPUT_MODES))
            .help("Output mode: auto, text, json, yaml, xml, or csv"),
    )
    .arg(
        Arg::new(ARG_REGION)
            .long("region")
            .value_name("REGION")
            .global(true)
            .help("Region to send requests to"),
    )
    .arg(
        Arg::new(ARG_ENDPOINT_URL)
            .long("endpoint-url")
            .value_name("URL")
            .global(true)
            .help("Override the service endpoint"),
    )
    .arg(
        Arg::new(ARG_PROFILE)
            .long("profile")
            .value_name("NAME")
            .global(true)
            .help("Credentials profile"),
    )
    .arg(
        Arg::new(ARG_CONFIG)
            .long("config")
            .value_name("PATH")
            .global(true)
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .help("Config file to use instead of the default locations"),
    )
    .arg(
        Arg::new(ARG_VERBOSE)
            .short('v')
            .long("verbose")
            .global(true)
            .action(ArgAction::Count)
            .help("Log more: -v for info, -vv for debug"),
    )
    .arg(
        Arg::new(ARG_PIPELINE)
            .long("pipeline")
            .global(true)
            .action(ArgAction::SetTrue)
            .help("Read one set of parameters per JSON object from stdin"),
    )
}
