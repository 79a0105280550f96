//! Fixed and file-provided fallback values.

use clap::ArgMatches;

use crate::collector::InputCollector;
use crate::InputError;

/// A fallback value at the end of a chain.
///
/// [`DefaultSource::new`] always answers. [`DefaultSource::optional`] answers
/// only when a value is present, which is how a config-file layer slots in
/// between the environment and the built-in default.
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputChain, ArgSource, EnvSource, DefaultSource};
///
/// let region = InputChain::<String>::new()
///     .try_source(ArgSource::new("region"))
///     .try_source(EnvSource::new("CMDSHIM_REGION"))
///     .try_source(DefaultSource::optional(file.client.region.clone()))
///     .resolve(&matches)?;
/// ```
#[derive(Debug, Clone)]
pub struct DefaultSource<T: Clone + Send + Sync> {
    value: Option<T>,
}

impl<T: Clone + Send + Sync> DefaultSource<T> {
    /// A source that always yields `value`.
    pub fn new(value: T) -> Self {
        Self { value: Some(value) }
    }

    /// A source that yields `value` only when it is `Some`.
    pub fn optional(value: Option<T>) -> Self {
        Self { value }
    }

    /// The configured value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T: Clone + Send + Sync + 'static> InputCollector<T> for DefaultSource<T> {
    fn name(&self) -> &'static str {
        "default"
    }

    fn is_available(&self, _matches: &ArgMatches) -> bool {
        self.value.is_some()
    }

    fn collect(&self, _matches: &ArgMatches) -> Result<Option<T>, InputError> {
        Ok(self.value.clone())
    }
}
