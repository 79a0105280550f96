//! Calling the service.
//!
//! [`Invoker::invoke`] is the only async path: it races the client call
//! against a [`CancellationToken`] and normalizes failures into
//! [`DispatchError`]. [`Invoker::invoke_blocking`] drives the same future on a
//! current-thread runtime for synchronous callers.

use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Notify;

use crate::client::{ClientError, ClientHandle, ConnectivityError};
use crate::error::DispatchError;
use crate::request::Request;

/// Cooperative cancellation shared between the caller and an invocation.
///
/// Cancelling stops the engine from waiting on the service. It does not undo
/// anything the service already did.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Executes requests against a client.
pub struct Invoker;

impl Invoker {
    /// Calls the client, unless `token` fires first.
    ///
    /// A token that is already cancelled means the client is never called.
    pub async fn invoke(
        handle: &ClientHandle,
        request: &Request,
        token: &CancellationToken,
    ) -> Result<Value, DispatchError> {
        if token.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!(operation = %request.operation, "invocation cancelled");
                Err(DispatchError::Cancelled)
            }
            result = handle.client().call(request) => {
                result.map_err(|err| normalize_error(err, handle.endpoint()))
            }
        }
    }

    /// Blocking form of [`invoke`](Self::invoke).
    ///
    /// Must not be called from inside an async runtime.
    pub fn invoke_blocking(
        handle: &ClientHandle,
        request: &Request,
        token: &CancellationToken,
    ) -> Result<Value, DispatchError> {
        block_on(Self::invoke(handle, request, token))?
    }
}

/// Drives `future` on a fresh current-thread runtime.
///
/// The runtime is shut down in the background afterwards, so a prompt still
/// running on the blocking pool after a cancellation does not hold up the
/// return.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, DispatchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DispatchError::Runtime)?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

/// Rewraps connectivity failures so they name the endpoint; everything else
/// passes through as a service error.
pub fn normalize_error(err: ClientError, endpoint: &str) -> DispatchError {
    if is_connectivity(&*err) {
        tracing::warn!(endpoint, error = %err, "endpoint unreachable");
        DispatchError::Connectivity {
            endpoint: endpoint.to_string(),
            source: err,
        }
    } else {
        DispatchError::Service(err)
    }
}

/// True if `err` or any of its causes is a connection-level failure.
pub fn is_connectivity(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<ConnectivityError>() {
            return true;
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::AddrNotAvailable
                    | io::ErrorKind::TimedOut
            ) {
                return true;
            }
        }
        let message = e.to_string().to_ascii_lowercase();
        if ["dns error", "failed to lookup address", "name resolution"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServiceClient;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct Wrapped(#[source] io::Error);

    struct Scripted {
        calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
        result: fn() -> Result<Value, ClientError>,
    }

    #[async_trait]
    impl ServiceClient for Scripted {
        async fn call(&self, _request: &Request) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.result)()
        }
    }

    fn scripted_handle(
        delay: Option<Duration>,
        result: fn() -> Result<Value, ClientError>,
    ) -> (ClientHandle, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = Scripted {
            calls: calls.clone(),
            delay,
            result,
        };
        (
            ClientHandle::from_client(client, "http://localhost:4566"),
            calls,
        )
    }

    fn request() -> Request {
        Request {
            operation: "GetApi".into(),
            body: json!({"ApiId": "abc"}),
        }
    }

    #[tokio::test]
    async fn test_invoke_returns_response() {
        let (handle, calls) = scripted_handle(None, || Ok(json!({"ApiId": "abc"})));
        let value = Invoker::invoke(&handle, &request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, json!({"ApiId": "abc"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_call() {
        let (handle, calls) = scripted_handle(None, || Ok(json!({})));
        let token = CancellationToken::new();
        token.cancel();

        let err = Invoker::invoke(&handle, &request(), &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_call() {
        let (handle, calls) = scripted_handle(Some(Duration::from_secs(30)), || Ok(json!({})));
        let token = CancellationToken::new();

        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = Invoker::invoke(&handle, &request(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_error_passes_through() {
        let (handle, _) = scripted_handle(None, || Err("ApiNotFound: abc".into()));
        let err = Invoker::invoke(&handle, &request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Service(_)));
        assert_eq!(err.to_string(), "ApiNotFound: abc");
    }

    #[tokio::test]
    async fn test_connection_refused_is_rewrapped() {
        let (handle, _) = scripted_handle(None, || {
            Err(Box::new(Wrapped(io::Error::from(
                io::ErrorKind::ConnectionRefused,
            ))))
        });
        let err = Invoker::invoke(&handle, &request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, DispatchError::Connectivity { ref endpoint, .. } if endpoint == "http://localhost:4566")
        );
        assert!(err.to_string().contains("http://localhost:4566"));
    }

    #[test]
    fn test_is_connectivity_cases() {
        let marker = ConnectivityError::new("endpoint down");
        assert!(is_connectivity(&marker));

        let dns: ClientError = "error trying to connect: dns error: no record".into();
        assert!(is_connectivity(&*dns));

        let nested = ConnectivityError::new("outer").with_source("inner");
        assert!(is_connectivity(&nested));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(!is_connectivity(&denied));

        let throttled: ClientError = "ThrottlingException: rate exceeded".into();
        assert!(!is_connectivity(&*throttled));
    }

    #[test]
    fn test_token_state_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_invoke_blocking() {
        let (handle, _) = scripted_handle(None, || Ok(json!("done")));
        let value =
            Invoker::invoke_blocking(&handle, &request(), &CancellationToken::new()).unwrap();
        assert_eq!(value, json!("done"));
    }
}
