//! Scripted transport for pipeline tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::{Transport, TransportError, TransportRequest, TransportResponse};

/// One scripted transport outcome.
#[derive(Debug, Clone)]
pub enum Script {
    /// Reply with the given status and body.
    Respond(http::StatusCode, Value),
    /// Fail as a transport-reported error.
    Fail {
        message: &'static str,
        code: Option<&'static str>,
        status: Option<http::StatusCode>,
    },
    /// Fail outside the request itself.
    Other(&'static str),
    /// Report a cancelled call.
    Cancelled,
    /// Wait until the call's signal fires, then report cancellation.
    Hang,
    /// Hold the reply until the gate opens; a fired signal wins.
    Gated(Arc<Notify>, Value),
}

impl Script {
    pub const fn ok(data: Value) -> Self {
        Self::Respond(http::StatusCode::OK, data)
    }

    pub const fn status(status: http::StatusCode) -> Self {
        Self::Fail {
            message: "Request failed with status code",
            code: None,
            status: Some(status),
        }
    }

    pub const fn timeout() -> Self {
        Self::Fail {
            message: "timeout of 1000ms exceeded",
            code: Some(super::TIMEOUT_ERROR_CODE),
            status: None,
        }
    }
}

/// Transport that replays a script and records what it saw.
///
/// Scripts are consumed in order; the last one repeats forever.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
    cancels: AtomicUsize,
}

impl MockTransport {
    pub fn new(script: Vec<Script>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(vec![Script::ok(data)])
    }

    pub fn failing() -> Self {
        Self::new(vec![Script::status(http::StatusCode::INTERNAL_SERVER_ERROR)])
    }

    pub fn hanging() -> Self {
        Self::new(vec![Script::Hang])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("transport was never called")
    }

    /// Yields until the transport has been called `n` times.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    fn next_script(&self) -> Script {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}

impl Transport for MockTransport {
    async fn request(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
        let signal = req.signal.clone();
        self.requests.lock().unwrap().push(req);
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.next_script() {
            Script::Respond(status, data) => {
                Ok(TransportResponse::new(status, http::HeaderMap::new(), data))
            }
            Script::Fail {
                message,
                code,
                status,
            } => Err(TransportError::Request {
                message: message.to_owned(),
                code: code.map(str::to_owned),
                response: status
                    .map(|status| TransportResponse::new(status, http::HeaderMap::new(), Value::Null)),
            }),
            Script::Other(message) => Err(TransportError::other(message)),
            Script::Cancelled => Err(TransportError::Cancelled),
            Script::Hang => {
                signal.cancelled().await;
                Err(TransportError::Cancelled)
            }
            Script::Gated(gate, data) => {
                tokio::select! {
                    () = signal.cancelled() => Err(TransportError::Cancelled),
                    () = gate.notified() => {
                        Ok(TransportResponse::new(http::StatusCode::OK, http::HeaderMap::new(), data))
                    }
                }
            }
        }
    }

    fn cancel(&self, signal: &CancellationToken) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        signal.cancel();
    }
}
