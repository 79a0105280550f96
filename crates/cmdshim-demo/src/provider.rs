//! Client construction for the demo services.

use std::sync::Arc;

use cmdshim::dispatch::{
    async_trait, ClientConfig, ClientError, ClientHandle, ClientProvider, ConnectivityError,
    Request, ServiceClient,
};
use serde_json::Value;

use crate::graph::GraphService;
use crate::workflow::WorkflowService;

/// Scheme of the endpoints the demo can serve.
pub const MEMORY_SCHEME: &str = "memory://";

/// Hands out the in-memory services by name.
///
/// An `--endpoint-url` outside `memory://` yields a client whose calls fail
/// as unreachable, which is what a real client would do without a server.
#[derive(Debug, Clone, Default)]
pub struct DemoProvider {
    graph: Arc<GraphService>,
    workflow: Arc<WorkflowService>,
}

impl DemoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &GraphService {
        &self.graph
    }

    pub fn workflow(&self) -> &WorkflowService {
        &self.workflow
    }
}

impl ClientProvider for DemoProvider {
    fn client(&self, service: &str, config: &ClientConfig) -> Result<ClientHandle, ClientError> {
        let endpoint = config
            .endpoint_url
            .clone()
            .unwrap_or_else(|| format!("{}{}", MEMORY_SCHEME, service));

        if !endpoint.starts_with(MEMORY_SCHEME) {
            tracing::debug!(service, endpoint = %endpoint, "no server behind endpoint");
            return Ok(ClientHandle::from_client(Unreachable, endpoint));
        }

        let client: Arc<dyn ServiceClient> = match service {
            "graph" => self.graph.clone(),
            "workflow" => self.workflow.clone(),
            other => return Err(format!("no demo service named '{}'", other).into()),
        };
        Ok(ClientHandle::new(client, endpoint))
    }
}

struct Unreachable;

#[async_trait]
impl ServiceClient for Unreachable {
    async fn call(&self, _request: &Request) -> Result<Value, ClientError> {
        Err(Box::new(ConnectivityError::new("connection refused")))
    }
}
