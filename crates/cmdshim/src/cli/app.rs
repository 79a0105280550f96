//! App struct and implementation.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{ArgMatches, Command};
use cmdshim_dispatch::{
    extract_command_path, get_deepest_matches, path_to_string, render_value, CachedClientProvider,
    CancellationToken, ClientProvider, Confirmer, DispatchError, Engine, EngineBuilder, ErrorKind,
    Hooks, Invocation, OperationDescriptor, OutputMode, Select,
};
use cmdshim_input::env::{EnvReader, StdinReader};
use cmdshim_input::{FlagSource, InputError};
use serde_json::Value;

use super::{global_args, ARG_CONFIG, ARG_PIPELINE};
use crate::config::{Config, Settings};
use crate::logging::init_tracing;
use crate::params::bindings_from_matches;
use crate::pipeline::{merge_bindings, read_pipeline, PipelineError};
use crate::registry::{OperationRegistry, ARG_DRY_RUN, ARG_FORCE, ARG_SELECT, OPERATIONS_COMMAND};

/// A generated command-line application.
///
/// Build one with [`App::builder`].
pub struct App {
    pub(crate) name: String,
    pub(crate) about: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) registry: OperationRegistry,
    pub(crate) provider: Arc<dyn ClientProvider>,
    pub(crate) confirmer: Option<Arc<dyn Confirmer>>,
    pub(crate) hooks: Vec<(String, String, Hooks)>,
    pub(crate) env: Arc<dyn EnvReader>,
    pub(crate) stdin: Arc<dyn StdinReader>,
    pub(crate) init_logging: bool,
}

impl App {
    /// Creates a builder for an application named `name`.
    pub fn builder<P: ClientProvider + 'static>(
        name: impl Into<String>,
        provider: P,
    ) -> super::AppBuilder {
        super::AppBuilder::new(name, provider)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// The full clap command tree.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        if let Some(version) = &self.version {
            cmd = cmd.version(version.clone());
        }
        self.registry.augment_command(global_args(cmd))
    }

    // =========================================================================
    // Running
    // =========================================================================

    /// Runs with the process arguments and returns the exit code.
    ///
    /// Results go to stdout, errors to stderr. Ctrl-C cancels the call in
    /// flight.
    pub fn run(&self) -> i32 {
        self.run_with(std::env::args_os())
    }

    /// Like [`run`](Self::run), with explicit arguments.
    pub fn run_with<I, T>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                eprintln!("error: failed to start async runtime: {}", err);
                return ErrorKind::Other.exit_code();
            }
        };

        let token = CancellationToken::new();
        let watcher = token.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                watcher.cancel();
            }
        });

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let result = runtime.block_on(self.execute(args, &mut out, &token));
        runtime.shutdown_background();

        match result {
            Ok(()) => 0,
            Err(err) => {
                report(&err);
                exit_code(&err)
            }
        }
    }

    /// Runs and returns what would have been printed.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run_to_string<I, T>(&self, args: I) -> anyhow::Result<String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        let mut out = Vec::new();
        let result = runtime.block_on(self.execute(args, &mut out, &CancellationToken::new()));
        runtime.shutdown_background();
        result?;
        String::from_utf8(out).context("output is not valid UTF-8")
    }

    /// Parses `args`, runs the selected command and writes rendered results
    /// to `out`.
    ///
    /// In pipeline mode each result is written as soon as it is available,
    /// so earlier results survive a later failure.
    pub async fn execute<I, T, W>(
        &self,
        args: I,
        out: &mut W,
        token: &CancellationToken,
    ) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        W: Write,
    {
        let matches = match self.command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) if !err.use_stderr() => {
                write!(out, "{}", err)?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let leaf = get_deepest_matches(&matches);
        let explicit = leaf.get_one::<PathBuf>(ARG_CONFIG).map(PathBuf::as_path);
        let config = Config::load(explicit, self.env.as_ref())?;
        let settings = Settings::resolve(leaf, &config, Arc::clone(&self.env))
            .context("invalid setting")?;
        if self.init_logging {
            init_tracing(&settings.log);
        }

        let path = extract_command_path(&matches);
        tracing::debug!(command = %path_to_string(&path), "dispatching");

        match path.as_slice() {
            [command] if command == OPERATIONS_COMMAND => {
                write_value(out, &self.registry.catalog(), settings.output)
            }
            [service, command] => {
                let op = self
                    .registry
                    .get(service, command)
                    .ok_or_else(|| anyhow!("unknown command: {} {}", service, command))?;
                self.run_operation(op, leaf, &settings, out, token).await
            }
            _ => Err(anyhow!("no command given")),
        }
    }

    async fn run_operation<W: Write>(
        &self,
        op: &OperationDescriptor,
        matches: &ArgMatches,
        settings: &Settings,
        out: &mut W,
        token: &CancellationToken,
    ) -> anyhow::Result<()> {
        let bindings = bindings_from_matches(op, matches)
            .with_context(|| format!("failed to read parameters of {}", op.name))?;
        let select = matches
            .get_one::<String>(ARG_SELECT)
            .map(|s| s.parse::<Select>())
            .transpose()
            .map_err(DispatchError::from)?;

        let base = Invocation {
            bindings,
            select,
            force: FlagSource::new(ARG_FORCE).resolve(matches).value,
            dry_run: matches.get_flag(ARG_DRY_RUN),
            client_config: Some(settings.client.clone()),
        };

        if !matches.get_flag(ARG_PIPELINE) {
            let outcome = self
                .engine(Arc::clone(&self.provider))
                .invoke(op, base, token)
                .await?;
            return write_value(out, &outcome.into_value(), settings.output);
        }

        let items = read_pipeline(Arc::clone(&self.stdin), matches)?;
        let provider: Arc<dyn ClientProvider> =
            Arc::new(CachedClientProvider::wrap(Arc::clone(&self.provider)));
        let engine = self.engine(provider);
        tracing::info!(items = items.len(), "running pipeline");

        for (i, item) in items.into_iter().enumerate() {
            let invocation = Invocation {
                bindings: merge_bindings(op, &base.bindings, item),
                ..base.clone()
            };
            let outcome = engine
                .invoke(op, invocation, token)
                .await
                .with_context(|| format!("pipeline item {} failed", i + 1))?;
            write_value(out, &outcome.into_value(), settings.output)?;
        }
        Ok(())
    }

    fn engine(&self, provider: Arc<dyn ClientProvider>) -> Engine {
        let mut builder = EngineBuilder::new(provider);
        if let Some(confirmer) = &self.confirmer {
            builder = builder.shared_confirmer(Arc::clone(confirmer));
        }
        for (service, operation, hooks) in &self.hooks {
            builder = builder.hooks(service.clone(), operation.clone(), hooks.clone());
        }
        builder.build()
    }
}

fn write_value<W: Write>(out: &mut W, value: &Value, mode: OutputMode) -> anyhow::Result<()> {
    let rendered = render_value(value, mode)?;
    if !rendered.is_empty() {
        writeln!(out, "{}", rendered)?;
    }
    Ok(())
}

/// Exit code for an error returned by [`App::execute`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<DispatchError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<clap::Error>() {
            return err.exit_code();
        }
        if cause.is::<PipelineError>() || cause.is::<InputError>() {
            return ErrorKind::Usage.exit_code();
        }
    }
    ErrorKind::Other.exit_code()
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<clap::Error>() {
        Some(clap_err) => eprint!("{}", clap_err),
        None => eprintln!("error: {:#}", err),
    }
}
