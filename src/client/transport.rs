//! Transport request/response types and the transport trait.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::RequestMethod;
use crate::params::{Headers, Params};

/// A request as handed to a [`Transport`].
///
/// Built by the pipeline from a [`RequestConfig`](super::RequestConfig):
/// placeholders are already substituted, query parameters and headers are
/// private copies, and the payload is shared with the originating config.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: RequestMethod,
    /// Concrete path or absolute URL
    pub url: String,
    /// Query string parameters (null values are skipped by transports)
    pub params: Params,
    /// Payload shared with the originating config
    pub data: Option<Arc<Value>>,
    /// Request headers
    pub headers: Headers,
    /// Timeout in milliseconds, always finite when present
    pub timeout: Option<f64>,
    /// Signal fired when the consumer cancels the call
    pub signal: CancellationToken,
}

/// A reply received by a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Decoded body
    pub data: Value,
}

impl TransportResponse {
    /// Creates a new transport response.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, data: Value) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Error type for transport operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The call was aborted through its cancellation signal.
    ///
    /// Never surfaced to consumers; the pipeline completes without a value.
    #[error("Request cancelled")]
    Cancelled,

    /// The transport issued the request and it failed.
    ///
    /// Covers timeouts, connection failures, and non-2xx replies (with
    /// `response` attached). The pipeline normalizes this into a
    /// [`ClientError`](super::ClientError).
    #[error("{message}")]
    Request {
        /// Human-readable description
        message: String,
        /// Transport-level error code, e.g. `ECONNABORTED`
        code: Option<String>,
        /// The reply, if one was received
        response: Option<TransportResponse>,
    },

    /// A failure outside the request itself, such as an unusable URL.
    ///
    /// Propagated to consumers unmodified.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Returns true if this error reports a cancelled call.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Creates a [`TransportError::Request`] without code or response.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            code: None,
            response: None,
        }
    }

    /// Creates a [`TransportError::Other`] from any error.
    #[must_use]
    pub fn other(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(source.into())
    }
}

/// Trait for performing HTTP requests.
///
/// # Design
///
/// This trait abstracts the HTTP library, enabling:
/// - Dependency injection for testing with mock transports
/// - Swapping HTTP libraries without changing calling code
///
/// Implementations must be safe for concurrent use: independent calls
/// share one transport instance.
///
/// # Example
///
/// ```ignore
/// use reqflow::client::{Transport, TransportError, TransportRequest, TransportResponse};
///
/// struct Canned(TransportResponse);
///
/// impl Transport for Canned {
///     async fn request(&self, _req: TransportRequest) -> Result<TransportResponse, TransportError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Transport: Send + Sync + 'static {
    /// Sends a request and returns the reply.
    ///
    /// Implementations should watch `req.signal` and return
    /// [`TransportError::Cancelled`] once it fires.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when:
    /// - The call was cancelled ([`TransportError::Cancelled`])
    /// - The request failed or the reply was not 2xx ([`TransportError::Request`])
    /// - The request could not be built ([`TransportError::Other`])
    fn request(
        &self,
        req: TransportRequest,
    ) -> impl std::future::Future<Output = Result<TransportResponse, TransportError>> + Send;

    /// Asks the transport to abort the call that owns `signal`.
    ///
    /// Advisory: the transport decides how quickly the call stops.
    fn cancel(&self, signal: &CancellationToken) {
        signal.cancel();
    }
}

impl<T: Transport> Transport for Arc<T> {
    async fn request(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).request(req).await
    }

    fn cancel(&self, signal: &CancellationToken) {
        (**self).cancel(signal);
    }
}
