//! AppBuilder for constructing App instances.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdshim::App;
//! use cmdshim_dispatch::{FieldSpec, OperationDescriptor};
//!
//! let app = App::builder("shimdemo", provider)
//!     .about("Talk to the graph service")
//!     .operation(
//!         OperationDescriptor::new("graph", "GetApi")
//!             .field(FieldSpec::string("ApiId").required().identifier()),
//!     )
//!     .build()?;
//!
//! std::process::exit(app.run());
//! ```

use std::sync::Arc;

use cmdshim_dispatch::{ClientProvider, Confirmer, Hooks, OperationDescriptor};
use cmdshim_input::env::{EnvReader, RealEnv, RealStdin, StdinReader};

use super::app::App;
use crate::registry::OperationRegistry;
use crate::setup::SetupError;

/// Builder for an [`App`].
///
/// Operations are validated in [`build`](Self::build), so registration
/// errors surface in one place.
pub struct AppBuilder {
    name: String,
    about: Option<String>,
    version: Option<String>,
    operations: Vec<OperationDescriptor>,
    provider: Arc<dyn ClientProvider>,
    confirmer: Option<Arc<dyn Confirmer>>,
    hooks: Vec<(String, String, Hooks)>,
    env: Arc<dyn EnvReader>,
    stdin: Arc<dyn StdinReader>,
    init_logging: bool,
}

impl AppBuilder {
    pub fn new<P: ClientProvider + 'static>(name: impl Into<String>, provider: P) -> Self {
        Self::shared(name, Arc::new(provider))
    }

    /// Like [`new`](Self::new), with a provider that is already shared.
    pub fn shared(name: impl Into<String>, provider: Arc<dyn ClientProvider>) -> Self {
        Self {
            name: name.into(),
            about: None,
            version: None,
            operations: Vec::new(),
            provider,
            confirmer: None,
            hooks: Vec::new(),
            env: Arc::new(RealEnv),
            stdin: Arc::new(RealStdin),
            init_logging: true,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn operation(mut self, op: OperationDescriptor) -> Self {
        self.operations.push(op);
        self
    }

    pub fn operations<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = OperationDescriptor>,
    {
        self.operations.extend(ops);
        self
    }

    /// Replaces the terminal prompt used to confirm mutating operations.
    pub fn confirmer<C: Confirmer + 'static>(self, confirmer: C) -> Self {
        self.shared_confirmer(Arc::new(confirmer))
    }

    pub fn shared_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    /// Attaches hooks to the operation named `operation` (e.g. `CreateApi`)
    /// of `service`.
    pub fn hooks(
        mut self,
        service: impl Into<String>,
        operation: impl Into<String>,
        hooks: Hooks,
    ) -> Self {
        self.hooks.push((service.into(), operation.into(), hooks));
        self
    }

    /// Replaces the process environment, mostly for tests.
    pub fn env_reader<E: EnvReader + 'static>(mut self, env: E) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replaces stdin, mostly for tests.
    pub fn stdin_reader<S: StdinReader + 'static>(mut self, stdin: S) -> Self {
        self.stdin = Arc::new(stdin);
        self
    }

    /// Leaves the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> Result<App, SetupError> {
        let mut registry = OperationRegistry::new();
        for op in self.operations {
            registry.register(op)?;
        }

        for (service, operation, _) in &self.hooks {
            if registry.find_operation(service, operation).is_none() {
                return Err(SetupError::UnknownOperation {
                    service: service.clone(),
                    operation: operation.clone(),
                });
            }
        }

        Ok(App {
            name: self.name,
            about: self.about,
            version: self.version,
            registry,
            provider: self.provider,
            confirmer: self.confirmer,
            hooks: self.hooks,
            env: self.env,
            stdin: self.stdin,
            init_logging: self.init_logging,
        })
    }
}
