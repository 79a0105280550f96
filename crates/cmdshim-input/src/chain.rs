//! Fallback chains over input sources.
//!
//! An [`InputChain`] asks its sources in order and stops at the first answer.
//! The application layer uses chains to resolve flag-over-env-over-file
//! settings and the force/confirm decision.

use std::fmt;

use clap::ArgMatches;

use crate::collector::{InputCollector, InputSourceKind, ResolvedInput};
use crate::InputError;

type ValidatorFn<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Upper bound on re-prompts for a single interactive source.
const MAX_RETRIES: usize = 3;

/// Chain multiple input sources with fallback behavior.
///
/// Sources are tried in the order they were added. The first source that
/// returns `Some(value)` wins. If every source passes, the chain returns its
/// default or [`InputError::NoInput`].
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputChain, ArgSource, EnvSource};
///
/// let endpoint = InputChain::<String>::new()
///     .try_source(ArgSource::new("endpoint-url"))
///     .try_source(EnvSource::new("CMDSHIM_ENDPOINT_URL"))
///     .validate(|s| s.starts_with("http"), "endpoint must be an http(s) URL")
///     .resolve(&matches)?;
/// ```
///
/// Interactive sources re-prompt when a value is rejected, up to three
/// times; non-interactive sources fail with [`InputError::ValidationFailed`].
pub struct InputChain<T> {
    sources: Vec<(Box<dyn InputCollector<T>>, InputSourceKind)>,
    validators: Vec<ValidatorFn<T>>,
    default: Option<T>,
}

impl<T: Clone + Send + Sync + 'static> InputChain<T> {
    /// Create a new empty input chain.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            validators: Vec::new(),
            default: None,
        }
    }

    /// Add a source to the chain.
    pub fn try_source<C: InputCollector<T> + 'static>(mut self, source: C) -> Self {
        let kind = InputSourceKind::from_collector_name(source.name());
        self.sources.push((Box::new(source), kind));
        self
    }

    /// Add a source with an explicit kind.
    pub fn try_source_with_kind<C: InputCollector<T> + 'static>(
        mut self,
        source: C,
        kind: InputSourceKind,
    ) -> Self {
        self.sources.push((Box::new(source), kind));
        self
    }

    /// Add a predicate every resolved value must satisfy.
    pub fn validate<F>(mut self, f: F, error_msg: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let msg = error_msg.into();
        self.validators.push(Box::new(move |value| {
            if f(value) {
                Ok(())
            } else {
                Err(msg.clone())
            }
        }));
        self
    }

    /// Add a validator that produces its own error message.
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Box::new(f));
        self
    }

    /// Value returned when no source answers.
    pub fn default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// Resolve the chain and return the value.
    pub fn resolve(&self, matches: &ArgMatches) -> Result<T, InputError> {
        self.resolve_with_source(matches).map(|r| r.value)
    }

    /// Resolve the chain and report which source answered.
    pub fn resolve_with_source(
        &self,
        matches: &ArgMatches,
    ) -> Result<ResolvedInput<T>, InputError> {
        for (source, kind) in &self.sources {
            if !source.is_available(matches) {
                continue;
            }

            let mut attempts = 0;
            loop {
                let Some(value) = source.collect(matches)? else {
                    break;
                };

                match self.check(source.as_ref(), &value) {
                    Ok(()) => {
                        return Ok(ResolvedInput {
                            value,
                            source: *kind,
                        })
                    }
                    Err(msg) if source.can_retry() && attempts + 1 < MAX_RETRIES => {
                        attempts += 1;
                        eprintln!("Invalid: {}", msg);
                    }
                    Err(msg) => return Err(InputError::ValidationFailed(msg)),
                }
            }
        }

        match &self.default {
            Some(value) => Ok(ResolvedInput {
                value: value.clone(),
                source: InputSourceKind::Default,
            }),
            None => Err(InputError::NoInput),
        }
    }

    fn check(&self, source: &dyn InputCollector<T>, value: &T) -> Result<(), String> {
        source.validate(value)?;
        for validator in &self.validators {
            validator(value)?;
        }
        Ok(())
    }

    /// Check if any source (or the default) can answer.
    pub fn has_available_source(&self, matches: &ArgMatches) -> bool {
        self.sources.iter().any(|(s, _)| s.is_available(matches)) || self.default.is_some()
    }

    /// Number of sources in the chain, not counting the default.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for InputChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InputChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputChain")
            .field(
                "sources",
                &self.sources.iter().map(|(_, k)| k).collect::<Vec<_>>(),
            )
            .field("validators", &self.validators.len())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}
