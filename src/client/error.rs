//! Normalized error types and classification helpers.

use std::error::Error as StdError;
use std::panic::Location;
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

use super::{RequestConfig, Response};
use crate::path::PathError;

/// Error code reported by transports when a request times out.
pub const TIMEOUT_ERROR_CODE: &str = "ECONNABORTED";

/// Uniform error for failures reported by the transport.
///
/// Carries the originating [`RequestConfig`], the reply (when the transport
/// received one) and the transport's error code, so callers can decide how to
/// retry, log or report without inspecting transport internals.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
    code: Option<String>,
    config: Arc<RequestConfig>,
    response: Option<Response>,
    location: &'static Location<'static>,
}

impl ClientError {
    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the transport-level error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the configuration of the failed request.
    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Returns the shared configuration of the failed request.
    #[must_use]
    pub const fn shared_config(&self) -> &Arc<RequestConfig> {
        &self.config
    }

    /// Returns the reply that accompanied the failure, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Returns the reply status, if a reply was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(|response| response.status)
    }

    /// Returns where in the pipeline the error was created.
    #[must_use]
    pub const fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns true if the failure was a timeout.
    ///
    /// Either the transport reported [`TIMEOUT_ERROR_CODE`], or the server
    /// replied with `504 Gateway Timeout`.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.code() == Some(TIMEOUT_ERROR_CODE) || self.status() == Some(StatusCode::GATEWAY_TIMEOUT)
    }
}

/// Fields for [`create_client_error`].
#[derive(Debug, Clone)]
pub struct ClientErrorParts {
    /// Transport-level error code
    pub code: Option<String>,
    /// Error message
    pub message: String,
    /// Configuration of the failed request
    pub config: Arc<RequestConfig>,
    /// Reply that accompanied the failure
    pub response: Option<Response>,
}

/// Builds a [`ClientError`] from its parts.
///
/// Fields are attached exactly as given. The recorded
/// [`location`](ClientError::location) is the caller of this function.
#[track_caller]
#[must_use]
pub fn create_client_error(parts: ClientErrorParts) -> ClientError {
    ClientError {
        message: parts.message,
        code: parts.code,
        config: parts.config,
        response: parts.response,
        location: Location::caller(),
    }
}

/// Error surfaced by a failed call.
///
/// Exactly one of three kinds:
/// - [`RequestError::Path`]: the request could not be built (caller defect)
/// - [`RequestError::Client`]: the transport reported a failure
/// - [`RequestError::Other`]: any other failure, propagated unmodified
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// Path template could not be rendered.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Transport-reported failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Failure outside the transport call.
    #[error(transparent)]
    Other(Arc<dyn StdError + Send + Sync>),
}

impl RequestError {
    /// Wraps an arbitrary error as [`RequestError::Other`].
    #[must_use]
    pub fn other(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Other(Arc::from(source.into()))
    }

    /// Returns the client error, if this is one.
    #[must_use]
    pub const fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(error) => Some(error),
            Self::Path(_) | Self::Other(_) => None,
        }
    }

    /// Returns true if this is a transport-reported failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.as_client_error().is_some()
    }

    /// Returns true if this is a transport-reported failure with a reply.
    #[must_use]
    pub fn is_response_error(&self) -> bool {
        self.as_client_error()
            .is_some_and(|error| error.response().is_some())
    }

    /// Returns the reply status of a client error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.as_client_error().and_then(ClientError::status)
    }

    /// Returns true if this is a client error caused by a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.as_client_error().is_some_and(ClientError::is_timeout)
    }

    /// Returns true if the failure is potentially transient.
    ///
    /// Transport failures without a reply (timeouts, connection errors) are
    /// retryable, as are 5xx, `408 Request Timeout` and `429 Too Many Requests`
    /// replies. Path and other errors are configuration issues and are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let Some(error) = self.as_client_error() else {
            return false;
        };

        match error.status() {
            None => true,
            Some(status) => {
                status.is_server_error()
                    || status == StatusCode::TOO_MANY_REQUESTS
                    || status == StatusCode::REQUEST_TIMEOUT
            }
        }
    }
}

fn client_error_of<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a ClientError> {
    if let Some(client) = error.downcast_ref::<ClientError>() {
        return Some(client);
    }

    error
        .downcast_ref::<RequestError>()
        .and_then(RequestError::as_client_error)
}

/// Returns true if `error` is a [`ClientError`] (bare or inside [`RequestError`]).
#[must_use]
pub fn is_client_error(error: &(dyn StdError + 'static)) -> bool {
    client_error_of(error).is_some()
}

/// Returns true if `error` is a client error that carries a reply.
#[must_use]
pub fn is_response_error(error: &(dyn StdError + 'static)) -> bool {
    client_error_of(error).is_some_and(|client| client.response().is_some())
}

/// Returns the reply status if `error` is a client error with a reply.
#[must_use]
pub fn error_status(error: &(dyn StdError + 'static)) -> Option<StatusCode> {
    client_error_of(error).and_then(ClientError::status)
}

/// Returns true if `error` is a client error caused by a timeout.
///
/// See [`ClientError::is_timeout`].
#[must_use]
pub fn is_timeout_error(error: &(dyn StdError + 'static)) -> bool {
    client_error_of(error).is_some_and(ClientError::is_timeout)
}
