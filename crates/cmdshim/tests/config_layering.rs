//! Settings layering through a running app: config file, then env, then
//! flags.

use std::io::Write;
use std::sync::{Arc, Mutex};

use cmdshim::dispatch::{
    async_trait, ClientConfig, ClientError, FactoryProvider, Request, ServiceClient,
};
use cmdshim::input::{MockEnv, MockStdin};
use cmdshim::{App, FieldSpec, OperationDescriptor};
use serde_json::{json, Value};
use serial_test::serial;
use tempfile::NamedTempFile;

struct Describe;

#[async_trait]
impl ServiceClient for Describe {
    async fn call(&self, request: &Request) -> Result<Value, ClientError> {
        Ok(json!({"ApiId": request.body["ApiId"], "Name": "demo"}))
    }
}

fn app_with_env(env: MockEnv, seen: Arc<Mutex<Vec<ClientConfig>>>) -> App {
    let provider = FactoryProvider::new(move |_service, config| {
        seen.lock().unwrap().push(config.clone());
        Ok(Arc::new(Describe) as Arc<dyn ServiceClient>)
    });

    App::builder("shimdemo", provider)
        .operation(
            OperationDescriptor::new("graph", "GetApi")
                .field(FieldSpec::string("ApiId").required())
                .response_fields(["ApiId", "Name"]),
        )
        .env_reader(env)
        .stdin_reader(MockStdin::terminal())
        .without_logging()
        .build()
        .unwrap()
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn get_api(app: &App, extra: &[&str]) -> String {
    let mut argv = vec!["shimdemo", "graph", "get-api", "--api-id", "abc"];
    argv.extend_from_slice(extra);
    app.run_to_string(argv).unwrap()
}

#[test]
fn test_config_file_sets_output_and_client() {
    let file = config_file(
        r#"
[client]
region = "eu-west-1"
endpoint_url = "http://localhost:4566"

[output]
mode = "yaml"
"#,
    );
    let path = file.path().to_str().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = app_with_env(MockEnv::new(), seen.clone());

    let out = get_api(&app, &["--config", path, "--select", "Name"]);

    assert_eq!(out, "demo\n");
    let configs = seen.lock().unwrap();
    assert_eq!(configs[0].region.as_deref(), Some("eu-west-1"));
    assert_eq!(configs[0].endpoint_url.as_deref(), Some("http://localhost:4566"));
}

#[test]
fn test_env_overrides_file_and_flag_overrides_env() {
    let file = config_file("[client]\nregion = \"eu-west-1\"\nprofile = \"file\"\n");
    let path = file.path().to_str().unwrap();
    let env = MockEnv::new()
        .with_var("CMDSHIM_REGION", "us-east-2")
        .with_var("CMDSHIM_PROFILE", "env");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = app_with_env(env, seen.clone());

    get_api(&app, &["--config", path, "--region", "ap-south-1"]);

    let configs = seen.lock().unwrap();
    assert_eq!(configs[0].region.as_deref(), Some("ap-south-1"));
    assert_eq!(configs[0].profile.as_deref(), Some("env"));
}

#[test]
fn test_output_mode_from_env() {
    let env = MockEnv::new().with_var("CMDSHIM_OUTPUT", "json");
    let app = app_with_env(env, Arc::new(Mutex::new(Vec::new())));

    let out = get_api(&app, &[]);
    let printed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(printed, json!({"ApiId": "abc", "Name": "demo"}));
}

#[test]
fn test_invalid_output_mode_in_env_is_rejected() {
    let env = MockEnv::new().with_var("CMDSHIM_OUTPUT", "html");
    let app = app_with_env(env, Arc::new(Mutex::new(Vec::new())));

    let err = app
        .run_to_string(["shimdemo", "graph", "get-api", "--api-id", "abc"])
        .unwrap_err();
    assert_eq!(cmdshim::exit_code(&err), 2);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let app = app_with_env(MockEnv::new(), Arc::new(Mutex::new(Vec::new())));
    let err = app
        .run_to_string([
            "shimdemo",
            "--config",
            "/nonexistent/cmdshim.toml",
            "graph",
            "get-api",
        ])
        .unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/cmdshim.toml"));
}

#[test]
#[serial]
fn test_process_env_is_read_by_default() {
    std::env::set_var("CMDSHIM_OUTPUT", "json");

    let app = App::builder(
        "shimdemo",
        FactoryProvider::new(|_service, _config| Ok(Arc::new(Describe) as Arc<dyn ServiceClient>)),
    )
    .operation(
        OperationDescriptor::new("graph", "GetApi").field(FieldSpec::string("ApiId").required()),
    )
    .stdin_reader(MockStdin::terminal())
    .without_logging()
    .build()
    .unwrap();

    let out = app
        .run_to_string(["shimdemo", "graph", "get-api", "--api-id", "abc"])
        .unwrap();
    std::env::remove_var("CMDSHIM_OUTPUT");

    assert!(out.trim_start().starts_with('{'));
}
