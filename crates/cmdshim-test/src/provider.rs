//! A client provider that counts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cmdshim_dispatch::{ClientConfig, ClientError, ClientHandle, ClientProvider, ServiceClient};

/// Hands out one client and records every request for it.
///
/// Used to check that a client is never created (declined confirmation,
/// dry runs) or created once (pipelines). Clones share the counters.
#[derive(Clone)]
pub struct CountingProvider {
    client: Arc<dyn ServiceClient>,
    created: Arc<AtomicUsize>,
    configs: Arc<Mutex<Vec<(String, ClientConfig)>>>,
}

impl CountingProvider {
    pub fn new<C: ServiceClient + 'static>(client: C) -> Self {
        Self::shared(Arc::new(client))
    }

    pub fn shared(client: Arc<dyn ServiceClient>) -> Self {
        Self {
            client,
            created: Arc::new(AtomicUsize::new(0)),
            configs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of handles handed out.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Service name and config of every request, oldest first.
    pub fn configs(&self) -> Vec<(String, ClientConfig)> {
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ClientProvider for CountingProvider {
    fn client(&self, service: &str, config: &ClientConfig) -> Result<ClientHandle, ClientError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((service.to_string(), config.clone()));
        Ok(ClientHandle::new(
            Arc::clone(&self.client),
            config.describe_endpoint(service),
        ))
    }
}

impl std::fmt::Debug for CountingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingProvider")
            .field("created", &self.created())
            .finish_non_exhaustive()
    }
}
