//! Integration tests for cmdshim-input.
//!
//! Chains are exercised the way the cmdshim front end assembles them: client
//! settings resolve flag over environment over config file over default, and
//! the confirmation decision resolves `--force` over the prompt.

use clap::{Arg, ArgAction, Command};
use cmdshim_input::{
    ArgSource, ConfirmPromptSource, DefaultSource, EnvSource, FlagSource, InputChain, InputError,
    InputSourceKind, MockEnv, MockStdin, MockTerminal, StdinSource,
};
use serial_test::serial;

fn create_test_command() -> Command {
    Command::new("shimdemo")
        .arg(Arg::new("region").long("region"))
        .arg(Arg::new("endpoint-url").long("endpoint-url"))
        .arg(Arg::new("force").long("force").action(ArgAction::SetTrue))
}

fn region_chain(env: MockEnv, file: Option<&str>) -> InputChain<String> {
    InputChain::<String>::new()
        .try_source(ArgSource::new("region"))
        .try_source(EnvSource::with_reader("CMDSHIM_REGION", env))
        .try_source(DefaultSource::optional(file.map(str::to_string)))
        .default("us-east-1".to_string())
}

// ============================================================================
// Client settings precedence
// ============================================================================

#[test]
fn flag_wins_over_everything() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo", "--region", "eu-central-1"])
        .unwrap();
    let env = MockEnv::new().with_var("CMDSHIM_REGION", "eu-west-1");

    let result = region_chain(env, Some("ap-south-1"))
        .resolve_with_source(&matches)
        .unwrap();
    assert_eq!(result.value, "eu-central-1");
    assert_eq!(result.source, InputSourceKind::Arg);
}

#[test]
fn environment_wins_over_file() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();
    let env = MockEnv::new().with_var("CMDSHIM_REGION", "eu-west-1");

    let result = region_chain(env, Some("ap-south-1"))
        .resolve_with_source(&matches)
        .unwrap();
    assert_eq!(result.value, "eu-west-1");
    assert_eq!(result.source, InputSourceKind::Env);
}

#[test]
fn file_wins_over_builtin_default() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let result = region_chain(MockEnv::new(), Some("ap-south-1"))
        .resolve_with_source(&matches)
        .unwrap();
    assert_eq!(result.value, "ap-south-1");
    assert_eq!(result.source, InputSourceKind::Default);
}

#[test]
fn builtin_default_last() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let value = region_chain(MockEnv::new(), None).resolve(&matches).unwrap();
    assert_eq!(value, "us-east-1");
}

#[test]
fn endpoint_validation_rejects_bad_flag() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo", "--endpoint-url", "localhost:4566"])
        .unwrap();

    let result = InputChain::<String>::new()
        .try_source(ArgSource::new("endpoint-url"))
        .validate(
            |s| s.starts_with("http://") || s.starts_with("https://"),
            "endpoint must be an http(s) URL",
        )
        .resolve(&matches);

    assert!(matches!(result, Err(InputError::ValidationFailed(_))));
}

#[test]
#[serial]
fn real_environment_is_read() {
    std::env::set_var("CMDSHIM_TEST_PROFILE", "integration");
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let value = InputChain::<String>::new()
        .try_source(EnvSource::new("CMDSHIM_TEST_PROFILE"))
        .resolve(&matches);
    std::env::remove_var("CMDSHIM_TEST_PROFILE");

    assert_eq!(value.unwrap(), "integration");
}

// ============================================================================
// Force over confirmation
// ============================================================================

fn confirm_chain(terminal: MockTerminal) -> InputChain<bool> {
    InputChain::<bool>::new()
        .try_source(FlagSource::new("force"))
        .try_source(ConfirmPromptSource::with_terminal("Delete api abc?", terminal).default(false))
}

#[test]
fn force_skips_the_prompt() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo", "--force"])
        .unwrap();
    let terminal = MockTerminal::with_response("n");

    let result = confirm_chain(terminal.clone())
        .resolve_with_source(&matches)
        .unwrap();
    assert!(result.value);
    assert_eq!(result.source, InputSourceKind::Flag);
    assert!(terminal.prompts().is_empty());
}

#[test]
fn prompt_answers_without_force() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let result = confirm_chain(MockTerminal::with_response("yes"))
        .resolve_with_source(&matches)
        .unwrap();
    assert!(result.value);
    assert_eq!(result.source, InputSourceKind::Prompt);
}

#[test]
fn prompt_reasks_after_unrecognized_answer() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();
    let terminal = MockTerminal::with_responses(["maybe", "n"]);

    let value = confirm_chain(terminal.clone()).resolve(&matches).unwrap();
    assert!(!value);
    assert_eq!(terminal.reads(), 2);
}

#[test]
fn prompt_eof_is_cancellation() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let err = confirm_chain(MockTerminal::eof())
        .resolve(&matches)
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn no_terminal_and_no_force_means_no_input() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let result = confirm_chain(MockTerminal::non_terminal()).resolve(&matches);
    assert!(matches!(result, Err(InputError::NoInput)));
}

// ============================================================================
// Pipeline input
// ============================================================================

#[test]
fn piped_documents_are_collected_whole() {
    let matches = create_test_command()
        .try_get_matches_from(["shimdemo"])
        .unwrap();

    let text = InputChain::<String>::new()
        .try_source(StdinSource::with_reader(MockStdin::piped(
            "[{\"ApiId\":\"a\"},{\"ApiId\":\"b\"}]\n",
        )))
        .resolve(&matches)
        .unwrap();
    assert_eq!(text, "[{\"ApiId\":\"a\"},{\"ApiId\":\"b\"}]");
}
