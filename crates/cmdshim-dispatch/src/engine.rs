//! The generic invocation engine.
//!
//! One [`Engine`] runs every operation. Each call walks the same stages:
//!
//! ```text
//! resolve --select → confirmation gate → context → request → pre-invoke hooks
//!   → (dry run stops here) → client → call → post-invoke hooks
//!   → projection → post-project hooks
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cmdshim_dispatch::{CancellationToken, Engine, Invocation, StaticClientProvider};
//!
//! let engine = Engine::builder(StaticClientProvider::new(handle)).build();
//! let outcome = engine.invoke_blocking(
//!     &update_api,
//!     Invocation::new().bind("ApiId", "abc").select("^ApiId".parse()?).force(),
//!     &CancellationToken::new(),
//! )?;
//! assert_eq!(outcome.into_value(), serde_json::json!("abc"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::client::{ClientConfig, ClientProvider};
use crate::confirm::{ConfirmationGate, Confirmer, TerminalConfirmer};
use crate::context::ContextBuilder;
use crate::descriptor::{Bindings, OperationDescriptor};
use crate::error::DispatchError;
use crate::hooks::Hooks;
use crate::invoke::{block_on, CancellationToken, Invoker};
use crate::projection::{Projection, Select};
use crate::request::{Request, RequestMapper};

/// Everything the caller supplies for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub bindings: Bindings,
    /// `None` uses the operation's default projection.
    pub select: Option<Select>,
    pub force: bool,
    pub dry_run: bool,
    /// Merged over the engine's client config for this call only.
    pub client_config: Option<ClientConfig>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: Bindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Appends a binding.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = Some(config);
        self
    }
}

/// What an invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// The projected result.
    Completed(Value),
    /// The request that a dry run would have sent.
    DryRun(Request),
}

impl Outcome {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Outcome::DryRun(_))
    }

    /// The value to render. Dry runs render as `{"Operation", "Request"}`.
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Completed(value) => value,
            Outcome::DryRun(request) => json!({
                "Operation": request.operation,
                "Request": request.body,
            }),
        }
    }
}

/// Runs operations described by [`OperationDescriptor`]s.
pub struct Engine {
    provider: Arc<dyn ClientProvider>,
    confirmer: Arc<dyn Confirmer>,
    client_config: ClientConfig,
    hooks: HashMap<(String, String), Hooks>,
}

impl Engine {
    /// Starts a builder around the provider that supplies clients.
    pub fn builder<P: ClientProvider + 'static>(provider: P) -> EngineBuilder {
        EngineBuilder::new(Arc::new(provider))
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    /// Hooks registered for an operation.
    pub fn hooks_for(&self, op: &OperationDescriptor) -> Option<&Hooks> {
        self.hooks.get(&(op.service.clone(), op.name.clone()))
    }

    /// Runs one invocation of `op`.
    pub async fn invoke(
        &self,
        op: &OperationDescriptor,
        invocation: Invocation,
        token: &CancellationToken,
    ) -> Result<Outcome, DispatchError> {
        let span = tracing::info_span!("invoke", service = %op.service, operation = %op.name);
        self.run(op, invocation, token).instrument(span).await
    }

    /// Blocking form of [`invoke`](Self::invoke).
    ///
    /// Must not be called from inside an async runtime.
    pub fn invoke_blocking(
        &self,
        op: &OperationDescriptor,
        invocation: Invocation,
        token: &CancellationToken,
    ) -> Result<Outcome, DispatchError> {
        block_on(self.invoke(op, invocation, token))?
    }

    async fn run(
        &self,
        op: &OperationDescriptor,
        invocation: Invocation,
        token: &CancellationToken,
    ) -> Result<Outcome, DispatchError> {
        let Invocation {
            bindings,
            select,
            force,
            dry_run,
            client_config,
        } = invocation;

        let select = select.unwrap_or_else(|| op.default_select.clone());
        let projection = Projection::resolve(&select, op)?;
        tracing::info!(%projection, dry_run, "invocation started");

        if op.mutating && !dry_run {
            let gate = ConfirmationGate::new(&op.label, op.identifier_summary(&bindings));
            self.confirm(gate, force, token).await?;
        }

        let ctx = ContextBuilder::new(op).build(&bindings, projection)?;
        let mut request = RequestMapper::map(&ctx);

        let empty = Hooks::new();
        let hooks = self.hooks_for(op).unwrap_or(&empty);
        hooks.run_pre_invoke(&ctx, &mut request)?;
        tracing::debug!(body = %request.body, "mapped request");

        if dry_run {
            tracing::info!("dry run; request not sent");
            return Ok(Outcome::DryRun(request));
        }

        let config = match &client_config {
            Some(over) => self.client_config.merged(over),
            None => self.client_config.clone(),
        };
        let handle = self
            .provider
            .client(&op.service, &config)
            .map_err(|source| DispatchError::Client {
                service: op.service.clone(),
                source,
            })?;

        let response = Invoker::invoke(&handle, &request, token).await?;
        hooks.run_post_invoke(&ctx, &response)?;

        let projected = ctx.projection().project(response, &ctx);
        let projected = hooks.run_post_project(&ctx, projected)?;

        tracing::info!("invocation finished");
        Ok(Outcome::Completed(projected))
    }

    /// Decides the gate off the async thread so Ctrl-C still cancels while
    /// the prompt waits for an answer.
    async fn confirm(
        &self,
        gate: ConfirmationGate,
        force: bool,
        token: &CancellationToken,
    ) -> Result<(), DispatchError> {
        if force {
            gate.decide(true, self.confirmer.as_ref())?;
            return Ok(());
        }

        let confirmer = Arc::clone(&self.confirmer);
        let decision = tokio::task::spawn_blocking(move || gate.decide(false, confirmer.as_ref()));

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(DispatchError::Cancelled),
            joined = decision => match joined {
                Ok(result) => result.map(|_| ()),
                Err(err) => Err(DispatchError::Runtime(std::io::Error::other(err))),
            },
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("client_config", &self.client_config)
            .field("hooked_operations", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    provider: Arc<dyn ClientProvider>,
    confirmer: Option<Arc<dyn Confirmer>>,
    client_config: ClientConfig,
    hooks: HashMap<(String, String), Hooks>,
}

impl EngineBuilder {
    pub fn new(provider: Arc<dyn ClientProvider>) -> Self {
        Self {
            provider,
            confirmer: None,
            client_config: ClientConfig::default(),
            hooks: HashMap::new(),
        }
    }

    /// Replaces the terminal prompt used for confirmation.
    pub fn confirmer<C: Confirmer + 'static>(mut self, confirmer: C) -> Self {
        self.confirmer = Some(Arc::new(confirmer));
        self
    }

    pub fn shared_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    /// Base client settings, before per-invocation overrides.
    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// Registers hooks for one operation. Repeated calls append.
    pub fn hooks(
        mut self,
        service: impl Into<String>,
        operation: impl Into<String>,
        hooks: Hooks,
    ) -> Self {
        let key = (service.into(), operation.into());
        let merged = match self.hooks.remove(&key) {
            Some(existing) => existing.extend(hooks),
            None => hooks,
        };
        self.hooks.insert(key, merged);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            provider: self.provider,
            confirmer: self
                .confirmer
                .unwrap_or_else(|| Arc::new(TerminalConfirmer::new())),
            client_config: self.client_config,
            hooks: self.hooks,
        }
    }
}
