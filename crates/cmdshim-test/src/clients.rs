//! Service client doubles.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cmdshim_dispatch::{
    async_trait, ClientError, ClientHandle, ConnectivityError, Request, ServiceClient,
    StaticClientProvider,
};
use serde_json::Value;

type Responder = dyn Fn(&Request) -> Value + Send + Sync;

/// Records every request and answers with a responder function.
///
/// Clones share the recorded requests.
#[derive(Clone)]
pub struct RecordingClient {
    requests: Arc<Mutex<Vec<Request>>>,
    respond: Arc<Responder>,
}

impl RecordingClient {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&Request) -> Value + Send + Sync + 'static,
    {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(respond),
        }
    }

    /// Answers with the request body.
    pub fn echo() -> Self {
        Self::new(|request| request.body.clone())
    }

    /// Answers every request with `response`.
    pub fn responding(response: Value) -> Self {
        Self::new(move |_| response.clone())
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// A handle to this client at `memory://recording`.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle::from_client(self.clone(), "memory://recording")
    }

    /// A provider that always hands out this client.
    pub fn provider(&self) -> StaticClientProvider {
        StaticClientProvider::new(self.handle())
    }
}

#[async_trait]
impl ServiceClient for RecordingClient {
    async fn call(&self, request: &Request) -> Result<Value, ClientError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok((self.respond)(request))
    }
}

impl fmt::Debug for RecordingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingClient")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Failures
// =============================================================================

#[derive(Debug, Clone)]
enum Failure {
    Service(String),
    Unreachable(String),
}

/// Fails every call.
#[derive(Debug, Clone)]
pub struct FailingClient {
    failure: Failure,
    calls: Arc<AtomicUsize>,
}

impl FailingClient {
    /// Fails as the service would, with `message` as the error text.
    pub fn service(message: impl Into<String>) -> Self {
        Self::with(Failure::Service(message.into()))
    }

    /// Fails with a [`ConnectivityError`].
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::with(Failure::Unreachable(message.into()))
    }

    fn with(failure: Failure) -> Self {
        Self {
            failure,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn handle(&self, endpoint: impl Into<String>) -> ClientHandle {
        ClientHandle::from_client(self.clone(), endpoint)
    }
}

#[async_trait]
impl ServiceClient for FailingClient {
    async fn call(&self, _request: &Request) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Failure::Service(message) => Err(message.clone().into()),
            Failure::Unreachable(message) => Err(Box::new(ConnectivityError::new(message.clone()))),
        }
    }
}

// =============================================================================
// Latency
// =============================================================================

/// Answers after a delay, so a call can be observed while outstanding.
#[derive(Debug, Clone)]
pub struct SlowClient {
    delay: Duration,
    response: Value,
    started: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl SlowClient {
    pub fn new(delay: Duration, response: Value) -> Self {
        Self {
            delay,
            response,
            started: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once a call has begun.
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// True once a call has run to completion. A cancelled call never does.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> ClientHandle {
        ClientHandle::from_client(self.clone(), "memory://slow")
    }
}

#[async_trait]
impl ServiceClient for SlowClient {
    async fn call(&self, _request: &Request) -> Result<Value, ClientError> {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdshim_dispatch::{is_connectivity, CancellationToken, Invoker};
    use serde_json::json;

    fn request() -> Request {
        Request {
            operation: "GetApi".into(),
            body: json!({"ApiId": "abc"}),
        }
    }

    #[tokio::test]
    async fn test_recording_client_shares_history_across_clones() {
        let client = RecordingClient::responding(json!({"ok": true}));
        let response = client.clone().call(&request()).await.unwrap();

        assert_eq!(response, json!({"ok": true}));
        assert_eq!(client.calls(), 1);
        assert_eq!(client.requests()[0].operation, "GetApi");
    }

    #[tokio::test]
    async fn test_failing_client_kinds() {
        let err = FailingClient::unreachable("refused")
            .call(&request())
            .await
            .unwrap_err();
        assert!(is_connectivity(&*err));

        let err = FailingClient::service("ApiNotFound")
            .call(&request())
            .await
            .unwrap_err();
        assert!(!is_connectivity(&*err));
        assert_eq!(err.to_string(), "ApiNotFound");
    }

    #[tokio::test]
    async fn test_slow_client_completes() {
        let slow = SlowClient::new(Duration::from_millis(5), json!("done"));
        let token = CancellationToken::new();
        let value = Invoker::invoke(&slow.handle(), &request(), &token)
            .await
            .unwrap();

        assert_eq!(value, json!("done"));
        assert!(slow.started() && slow.finished());
    }
}
