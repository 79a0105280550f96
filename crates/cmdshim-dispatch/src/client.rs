//! Service clients and how the engine obtains them.
//!
//! The wrapped client is a black box behind [`ServiceClient`]. The engine asks
//! a [`ClientProvider`] for a [`ClientHandle`] once per invocation:
//!
//! - [`FactoryProvider`] builds a fresh client every time.
//! - [`CachedClientProvider`] wraps another provider and reuses clients per
//!   service and [`ClientConfig`], which is what pipelines use.
//! - [`StaticClientProvider`] always hands out one externally supplied client.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::request::Request;

/// Error type returned by clients and providers.
pub type ClientError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A remote service that executes requests.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Executes one operation and returns the raw response.
    async fn call(&self, request: &Request) -> Result<Value, ClientError>;
}

/// Marker error a client can return (or wrap) to report that the endpoint
/// could not be reached.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConnectivityError {
    pub message: String,
    #[source]
    pub source: Option<ClientError>,
}

impl ConnectivityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<ClientError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Settings used to construct a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// `self` with every setting present in `over` replaced.
    pub fn merged(&self, over: &ClientConfig) -> ClientConfig {
        ClientConfig {
            region: over.region.clone().or_else(|| self.region.clone()),
            endpoint_url: over
                .endpoint_url
                .clone()
                .or_else(|| self.endpoint_url.clone()),
            profile: over.profile.clone().or_else(|| self.profile.clone()),
        }
    }

    /// How the endpoint is named in diagnostics.
    ///
    /// The explicit URL when one is configured, otherwise the service and
    /// region.
    pub fn describe_endpoint(&self, service: &str) -> String {
        match (&self.endpoint_url, &self.region) {
            (Some(url), _) => url.clone(),
            (None, Some(region)) => format!("{} ({})", service, region),
            (None, None) => format!("{} (default region)", service),
        }
    }
}

/// A client plus the endpoint description used in error messages.
#[derive(Clone)]
pub struct ClientHandle {
    client: Arc<dyn ServiceClient>,
    endpoint: String,
}

impl ClientHandle {
    pub fn new(client: Arc<dyn ServiceClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Wraps a concrete client.
    pub fn from_client<C: ServiceClient + 'static>(client: C, endpoint: impl Into<String>) -> Self {
        Self::new(Arc::new(client), endpoint)
    }

    pub fn client(&self) -> &dyn ServiceClient {
        self.client.as_ref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// True if both handles share one client instance.
    pub fn same_client(&self, other: &ClientHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Produces client handles for the engine.
pub trait ClientProvider: Send + Sync {
    fn client(&self, service: &str, config: &ClientConfig) -> Result<ClientHandle, ClientError>;
}

/// Signature of the closure behind a [`FactoryProvider`].
pub type ClientFactoryFn =
    dyn Fn(&str, &ClientConfig) -> Result<Arc<dyn ServiceClient>, ClientError> + Send + Sync;

/// Builds a new client on every request.
pub struct FactoryProvider {
    factory: Box<ClientFactoryFn>,
}

impl FactoryProvider {
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = FactoryProvider::new(|service, config| {
    ///     Ok(Arc::new(HttpGraphClient::connect(service, config)?) as Arc<dyn ServiceClient>)
    /// });
    /// ```
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str, &ClientConfig) -> Result<Arc<dyn ServiceClient>, ClientError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            factory: Box::new(factory),
        }
    }
}

impl ClientProvider for FactoryProvider {
    fn client(&self, service: &str, config: &ClientConfig) -> Result<ClientHandle, ClientError> {
        tracing::debug!(service, ?config, "creating client");
        let client = (self.factory)(service, config)?;
        Ok(ClientHandle::new(client, config.describe_endpoint(service)))
    }
}

impl fmt::Debug for FactoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryProvider").finish_non_exhaustive()
    }
}

/// Reuses handles from an inner provider, keyed by service and config.
pub struct CachedClientProvider {
    inner: Arc<dyn ClientProvider>,
    cache: Mutex<HashMap<(String, ClientConfig), ClientHandle>>,
}

impl CachedClientProvider {
    pub fn new<P: ClientProvider + 'static>(inner: P) -> Self {
        Self::wrap(Arc::new(inner))
    }

    pub fn wrap(inner: Arc<dyn ClientProvider>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientProvider for CachedClientProvider {
    fn client(&self, service: &str, config: &ClientConfig) -> Result<ClientHandle, ClientError> {
        let key = (service.to_string(), config.clone());
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = cache.get(&key) {
            tracing::debug!(service, "reusing cached client");
            return Ok(handle.clone());
        }
        let handle = self.inner.client(service, config)?;
        cache.insert(key, handle.clone());
        Ok(handle)
    }
}

impl fmt::Debug for CachedClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedClientProvider")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}

/// Hands out one externally supplied client for every service.
#[derive(Debug, Clone)]
pub struct StaticClientProvider {
    handle: ClientHandle,
}

impl StaticClientProvider {
    pub fn new(handle: ClientHandle) -> Self {
        Self { handle }
    }
}

impl ClientProvider for StaticClientProvider {
    fn client(&self, _service: &str, _config: &ClientConfig) -> Result<ClientHandle, ClientError> {
        Ok(self.handle.clone())
    }
}
