//! Hook system around the remote call.
//!
//! Hooks run custom code at fixed points of an invocation without touching
//! the engine. They are registered per operation.
//!
//! # Pipeline Position
//!
//! ```text
//! bindings
//!   → context → request
//!   → PRE-INVOKE HOOK   ← inspect or rewrite the request, or abort
//!   → client call
//!   → POST-INVOKE HOOK  ← observe the raw response (read-only)
//!   → projection
//!   → POST-PROJECT HOOK ← transform the projected value
//!   → output
//! ```
//!
//! Pre-invoke hooks also run on `--dry-run`, so the request shown is the
//! request that would have been sent.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::request::Request;

/// The phase at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    PreInvoke,
    PostInvoke,
    PostProject,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::PreInvoke => write!(f, "pre-invoke"),
            HookPhase::PostInvoke => write!(f, "post-invoke"),
            HookPhase::PostProject => write!(f, "post-project"),
        }
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    pub message: String,
    pub phase: HookPhase,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    pub fn pre_invoke(message: impl Into<String>) -> Self {
        Self::at(HookPhase::PreInvoke, message)
    }

    pub fn post_invoke(message: impl Into<String>) -> Self {
        Self::at(HookPhase::PostInvoke, message)
    }

    pub fn post_project(message: impl Into<String>) -> Self {
        Self::at(HookPhase::PostProject, message)
    }

    fn at(phase: HookPhase, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
            source: None,
        }
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

pub type PreInvokeFn =
    Arc<dyn Fn(&ExecutionContext, &mut Request) -> Result<(), HookError> + Send + Sync>;

pub type PostInvokeFn =
    Arc<dyn Fn(&ExecutionContext, &Value) -> Result<(), HookError> + Send + Sync>;

pub type PostProjectFn =
    Arc<dyn Fn(&ExecutionContext, Value) -> Result<Value, HookError> + Send + Sync>;

/// Hooks for one operation, run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pre_invoke: Vec<PreInvokeFn>,
    post_invoke: Vec<PostInvokeFn>,
    post_project: Vec<PostProjectFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_invoke.is_empty() && self.post_invoke.is_empty() && self.post_project.is_empty()
    }

    /// Adds a pre-invoke hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmdshim_dispatch::{Hooks, HookError};
    ///
    /// let hooks = Hooks::new().pre_invoke(|_ctx, request| {
    ///     if request.body.get("Name").and_then(|v| v.as_str()) == Some("prod") {
    ///         return Err(HookError::pre_invoke("refusing to touch prod"));
    ///     }
    ///     Ok(())
    /// });
    /// assert!(!hooks.is_empty());
    /// ```
    pub fn pre_invoke<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext, &mut Request) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.pre_invoke.push(Arc::new(f));
        self
    }

    pub fn post_invoke<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext, &Value) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.post_invoke.push(Arc::new(f));
        self
    }

    pub fn post_project<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext, Value) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        self.post_project.push(Arc::new(f));
        self
    }

    /// Appends every hook from `other`.
    pub fn extend(mut self, other: Hooks) -> Self {
        self.pre_invoke.extend(other.pre_invoke);
        self.post_invoke.extend(other.post_invoke);
        self.post_project.extend(other.post_project);
        self
    }

    pub fn run_pre_invoke(
        &self,
        ctx: &ExecutionContext,
        request: &mut Request,
    ) -> Result<(), HookError> {
        for hook in &self.pre_invoke {
            hook(ctx, request)?;
        }
        Ok(())
    }

    pub fn run_post_invoke(&self, ctx: &ExecutionContext, response: &Value) -> Result<(), HookError> {
        for hook in &self.post_invoke {
            hook(ctx, response)?;
        }
        Ok(())
    }

    /// Runs post-project hooks, each receiving the previous one's output.
    pub fn run_post_project(&self, ctx: &ExecutionContext, value: Value) -> Result<Value, HookError> {
        self.post_project
            .iter()
            .try_fold(value, |current, hook| hook(ctx, current))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_invoke_count", &self.pre_invoke.len())
            .field("post_invoke_count", &self.post_invoke.len())
            .field("post_project_count", &self.post_project.len())
            .finish()
    }
}
