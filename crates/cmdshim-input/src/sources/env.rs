//! Environment variable input source.

use std::sync::Arc;

use clap::ArgMatches;

use crate::collector::InputCollector;
use crate::env::{EnvReader, RealEnv};
use crate::InputError;

/// Reads a setting from an environment variable.
///
/// Unset and empty (or whitespace-only) variables both pass to the next
/// source. Values are trimmed.
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputChain, ArgSource, EnvSource};
///
/// // CMDSHIM_PROFILE=ops shimdemo graph list-apis
/// let profile = InputChain::<String>::new()
///     .try_source(ArgSource::new("profile"))
///     .try_source(EnvSource::new("CMDSHIM_PROFILE"))
///     .resolve(&matches)?;
/// ```
///
/// Tests inject a [`MockEnv`](crate::MockEnv) through
/// [`EnvSource::with_reader`]; several sources can share one reader through
/// [`EnvSource::shared`].
pub struct EnvSource<R: EnvReader + ?Sized = RealEnv> {
    var_name: String,
    reader: Arc<R>,
}

impl<R: EnvReader + ?Sized> Clone for EnvSource<R> {
    fn clone(&self) -> Self {
        Self {
            var_name: self.var_name.clone(),
            reader: Arc::clone(&self.reader),
        }
    }
}

impl EnvSource<RealEnv> {
    /// Read from the process environment.
    pub fn new(var_name: impl Into<String>) -> Self {
        Self::with_reader(var_name, RealEnv)
    }
}

impl<R: EnvReader> EnvSource<R> {
    /// Read through a custom reader.
    pub fn with_reader(var_name: impl Into<String>, reader: R) -> Self {
        Self::shared(var_name, Arc::new(reader))
    }
}

impl<R: EnvReader + ?Sized> EnvSource<R> {
    /// Read through a reader shared with other sources.
    pub fn shared(var_name: impl Into<String>, reader: Arc<R>) -> Self {
        Self {
            var_name: var_name.into(),
            reader,
        }
    }

    /// The variable this source reads.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    fn lookup(&self) -> Option<String> {
        self.reader
            .var(&self.var_name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl<R: EnvReader + ?Sized + 'static> InputCollector<String> for EnvSource<R> {
    fn name(&self) -> &'static str {
        "environment variable"
    }

    fn is_available(&self, _matches: &ArgMatches) -> bool {
        self.lookup().is_some()
    }

    fn collect(&self, _matches: &ArgMatches) -> Result<Option<String>, InputError> {
        Ok(self.lookup())
    }
}
