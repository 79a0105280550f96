//! In-process runner for cmdshim apps.

use std::io::Write;
use std::time::Duration;

use cmdshim::{exit_code, AppBuilder};
use cmdshim_dispatch::CancellationToken;
use cmdshim_input::{MockEnv, MockStdin};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Runs an app with a mock environment, mock stdin and an optional config
/// file.
///
/// Stdin defaults to an interactive terminal with nothing piped, and the
/// environment starts empty, so the host machine never leaks into a test.
#[derive(Debug)]
pub struct TestHarness {
    env: MockEnv,
    stdin: MockStdin,
    config: Option<NamedTempFile>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            env: MockEnv::new(),
            stdin: MockStdin::terminal(),
            config: None,
        }
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env = self.env.with_var(name, value);
        self
    }

    /// Pipes `content` to stdin.
    pub fn piped_stdin(mut self, content: impl Into<String>) -> Self {
        self.stdin = MockStdin::piped(content);
        self
    }

    /// Writes `toml` to a temporary file and passes it with `--config`.
    ///
    /// # Panics
    ///
    /// If the temporary file cannot be written.
    pub fn config(mut self, toml: &str) -> Self {
        let mut file = NamedTempFile::new()
            .unwrap_or_else(|err| panic!("failed to create config file: {}", err));
        file.write_all(toml.as_bytes())
            .unwrap_or_else(|err| panic!("failed to write config file: {}", err));
        self.config = Some(file);
        self
    }

    /// Builds the app and runs it with `args` (without the binary name).
    ///
    /// # Panics
    ///
    /// If the app fails to build.
    pub fn run(&self, builder: AppBuilder, args: &[&str]) -> TestResult {
        self.execute(builder, args, None)
    }

    /// Like [`run`](Self::run), cancelling the invocation after `delay`, as
    /// Ctrl-C would.
    pub fn run_cancelled_after(
        &self,
        builder: AppBuilder,
        delay: Duration,
        args: &[&str],
    ) -> TestResult {
        self.execute(builder, args, Some(delay))
    }

    fn execute(&self, builder: AppBuilder, args: &[&str], cancel: Option<Duration>) -> TestResult {
        let app = builder
            .env_reader(self.env.clone())
            .stdin_reader(self.stdin.clone())
            .without_logging()
            .build()
            .unwrap_or_else(|err| panic!("app failed to build: {}", err));

        let mut argv: Vec<String> = vec![app.name().to_string()];
        if let Some(file) = &self.config {
            argv.push("--config".into());
            argv.push(file.path().display().to_string());
        }
        argv.extend(args.iter().map(|s| s.to_string()));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|err| panic!("failed to start runtime: {}", err));

        let token = CancellationToken::new();
        if let Some(delay) = cancel {
            let token = token.clone();
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                token.cancel();
            });
        }

        let mut out = Vec::new();
        let result = runtime.block_on(app.execute(argv, &mut out, &token));
        runtime.shutdown_background();

        TestResult {
            stdout: String::from_utf8_lossy(&out).into_owned(),
            exit_code: result.as_ref().map_or_else(exit_code, |_| 0),
            error: result.err().map(|err| format!("{:#}", err)),
        }
    }
}

/// What a harness run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub stdout: String,
    pub exit_code: i32,
    /// The full error chain, when the run failed.
    pub error: Option<String>,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Parses stdout as JSON.
    ///
    /// # Panics
    ///
    /// If stdout is not valid JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|err| panic!("stdout is not JSON ({}): {}", err, self.stdout))
    }

    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "expected success, got exit code {}: {}",
            self.exit_code,
            self.error.as_deref().unwrap_or("")
        );
        self
    }

    pub fn assert_exit_code(&self, expected: i32) -> &Self {
        assert_eq!(
            self.exit_code,
            expected,
            "unexpected exit code; error: {}",
            self.error.as_deref().unwrap_or("")
        );
        self
    }

    pub fn assert_error_contains(&self, needle: &str) -> &Self {
        let error = self.error.as_deref().unwrap_or("");
        assert!(
            error.contains(needle),
            "expected error containing '{}', got '{}'",
            needle,
            error
        );
        self
    }
}
