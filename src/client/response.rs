//! Normalized response type.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::TransportResponse;

/// A response as seen by consumers of the pipeline.
///
/// A projection of whatever the transport returned: decoded payload,
/// status code and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Decoded response payload
    pub data: Value,
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(data: Value, status: http::StatusCode, headers: http::HeaderMap) -> Self {
        Self {
            data,
            status,
            headers,
        }
    }

    /// Deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl From<TransportResponse> for Response {
    fn from(reply: TransportResponse) -> Self {
        Self::new(reply.data, reply.status, reply.headers)
    }
}
