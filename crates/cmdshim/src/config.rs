//! Configuration loading.
//!
//! Settings are layered, lowest priority first:
//!
//! 1. built-in defaults
//! 2. the config file
//! 3. `CMDSHIM_*` environment variables
//! 4. command-line flags
//!
//! The config file is the `--config` path, else `$CMDSHIM_CONFIG`, else
//! `<config dir>/cmdshim/config.toml`, else `./.cmdshim.toml`.
//!
//! ```toml
//! [client]
//! region = "eu-west-1"
//! endpoint_url = "http://localhost:4566"
//! profile = "dev"
//!
//! [output]
//! mode = "json"
//!
//! [log]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use cmdshim_dispatch::{ClientConfig, OutputMode};
use cmdshim_input::env::EnvReader;
use cmdshim_input::{ArgSource, DefaultSource, EnvSource, InputChain, InputError};
use serde::{Deserialize, Serialize};

use crate::cli::{ARG_ENDPOINT_URL, ARG_OUTPUT, ARG_PROFILE, ARG_REGION, ARG_VERBOSE};
use crate::logging::{verbosity_filter, LogFormat, LogSettings, DEFAULT_FILTER};

pub const ENV_CONFIG: &str = "CMDSHIM_CONFIG";
pub const ENV_REGION: &str = "CMDSHIM_REGION";
pub const ENV_ENDPOINT_URL: &str = "CMDSHIM_ENDPOINT_URL";
pub const ENV_PROFILE: &str = "CMDSHIM_PROFILE";
pub const ENV_OUTPUT: &str = "CMDSHIM_OUTPUT";
pub const ENV_LOG: &str = "CMDSHIM_LOG";
pub const ENV_LOG_FORMAT: &str = "CMDSHIM_LOG_FORMAT";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".cmdshim.toml";

/// Contents of a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub client: ClientConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: Option<OutputMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses one file.
    pub fn load_from(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Config::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads the first config file found, or defaults when there is none.
    ///
    /// An explicit or `$CMDSHIM_CONFIG` path must exist.
    pub fn load(explicit: Option<&Path>, env: &dyn EnvReader) -> Result<Config> {
        match locate(explicit, env) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Config::load_from(&path)
            }
            None => Ok(Config::default()),
        }
    }
}

/// Finds the config file to read.
pub fn locate(explicit: Option<&Path>, env: &dyn EnvReader) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env.var(ENV_CONFIG).filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }

    let user = dirs::config_dir().map(|dir| dir.join("cmdshim").join("config.toml"));
    user.into_iter()
        .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG)))
        .find(|path| path.is_file())
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub client: ClientConfig,
    pub output: OutputMode,
    pub log: LogSettings,
}

impl Settings {
    /// Layers flags over env over the config file.
    ///
    /// `matches` must come from a command carrying the global flags.
    pub fn resolve(
        matches: &ArgMatches,
        config: &Config,
        env: Arc<dyn EnvReader>,
    ) -> Result<Settings, InputError> {
        let layer = Layer { matches, env };

        let client = ClientConfig {
            region: layer.resolve(Some(ARG_REGION), ENV_REGION, config.client.region.clone())?,
            endpoint_url: layer.resolve(
                Some(ARG_ENDPOINT_URL),
                ENV_ENDPOINT_URL,
                config.client.endpoint_url.clone(),
            )?,
            profile: layer.resolve(Some(ARG_PROFILE), ENV_PROFILE, config.client.profile.clone())?,
        };

        let output = layer
            .chain(
                Some(ARG_OUTPUT),
                ENV_OUTPUT,
                config.output.mode.map(|m| mode_name(m).to_string()),
            )
            .validate(
                |s| OutputMode::parse(s).is_some(),
                "output mode must be one of auto, text, json, yaml, xml, csv",
            )
            .default(mode_name(OutputMode::Auto).to_string())
            .resolve(matches)
            .map(|name| OutputMode::parse(&name).unwrap_or_default())?;

        let verbosity = matches
            .try_get_one::<u8>(ARG_VERBOSE)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(0);
        let filter = match verbosity_filter(verbosity) {
            Some(filter) => filter.to_string(),
            None => layer
                .resolve(None, ENV_LOG, config.log.level.clone())?
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        };

        let format = layer
            .chain(None, ENV_LOG_FORMAT, config.log.format.map(|f| format_name(f).to_string()))
            .validate(|s| LogFormat::parse(s).is_some(), "log format must be text or json")
            .default(format_name(LogFormat::Text).to_string())
            .resolve(matches)
            .map(|name| LogFormat::parse(&name).unwrap_or_default())?;

        Ok(Settings {
            client,
            output,
            log: LogSettings { filter, format },
        })
    }
}

struct Layer<'a> {
    matches: &'a ArgMatches,
    env: Arc<dyn EnvReader>,
}

impl Layer<'_> {
    fn chain(&self, arg: Option<&str>, var: &str, file: Option<String>) -> InputChain<String> {
        let mut chain = InputChain::<String>::new();
        if let Some(arg) = arg {
            chain = chain.try_source(ArgSource::new(arg));
        }
        chain
            .try_source(EnvSource::shared(var, Arc::clone(&self.env)))
            .try_source(DefaultSource::optional(file))
    }

    fn resolve(
        &self,
        arg: Option<&str>,
        var: &str,
        file: Option<String>,
    ) -> Result<Option<String>, InputError> {
        match self.chain(arg, var, file).resolve(self.matches) {
            Ok(value) => Ok(Some(value)),
            Err(InputError::NoInput) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn mode_name(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Auto => "auto",
        OutputMode::Text => "text",
        OutputMode::Json => "json",
        OutputMode::Yaml => "yaml",
        OutputMode::Xml => "xml",
        OutputMode::Csv => "csv",
    }
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Text => "text",
        LogFormat::Json => "json",
    }
}
