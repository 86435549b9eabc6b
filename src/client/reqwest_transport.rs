//! Production transport implementation using reqwest.

use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use super::{TIMEOUT_ERROR_CODE, Transport, TransportError, TransportRequest, TransportResponse};
use crate::params::{Headers, Params};

/// Error code reported when the connection could not be established.
pub(crate) const CONNECTION_ERROR_CODE: &str = "ECONNREFUSED";

/// Production transport using reqwest.
///
/// A thin wrapper around `reqwest::Client` that implements [`Transport`].
/// Relative paths produced by the pipeline are resolved against an optional
/// base URL; absolute URLs are used as-is. Non-2xx replies are reported as
/// failures with the reply attached.
///
/// # Example
///
/// ```no_run
/// use reqflow::client::ReqwestTransport;
/// use url::Url;
///
/// # fn example() -> Result<(), url::ParseError> {
/// let transport = ReqwestTransport::new()
///     .with_base_url(Url::parse("https://api.example.com/v1")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Creates a transport with default reqwest configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Creates a transport from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (default headers, user agent, TLS).
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            base_url: None,
        }
    }

    /// Sets the base URL that relative paths are resolved against.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Returns the base URL, if configured.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolves a generated path into the URL to request.
    ///
    /// Absolute URLs pass through. Relative paths are appended to the base
    /// URL with exactly one `/` between them.
    pub(crate) fn resolve_url(&self, path: &str) -> Result<Url, TransportError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }

        let Some(base) = &self.base_url else {
            return Err(TransportError::other(format!(
                "Relative URL '{path}' requires a base URL"
            )));
        };

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(TransportError::other)
    }

    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut url = self.resolve_url(&req.url)?;
        append_query(&mut url, &req.params);

        let mut builder = self.inner.request(req.method.into(), url);

        for (name, value) in header_pairs(&req.headers)? {
            builder = builder.header(name, value);
        }

        if let Some(data) = &req.data {
            builder = builder.json(data.as_ref());
        }

        if let Some(timeout) = positive_timeout(req.timeout) {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, req.timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, req.timeout))?;

        let reply = TransportResponse::new(status, headers, parse_body(&body));

        if reply.is_success() {
            return Ok(reply);
        }

        Err(TransportError::Request {
            message: format!("Request failed with status code {}", status.as_u16()),
            code: None,
            response: Some(reply),
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    async fn request(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
        let signal = req.signal.clone();

        tokio::select! {
            biased;
            () = signal.cancelled() => Err(TransportError::Cancelled),
            result = self.send(req) => result,
        }
    }
}

/// Appends non-null query parameters to `url`.
pub(super) fn append_query(url: &mut Url, params: &Params) {
    let pairs: Vec<(&String, String)> = params
        .iter()
        .filter_map(|(name, value)| value.as_text().map(|text| (name, text)))
        .collect();

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
}

pub(super) fn header_pairs(headers: &Headers) -> Result<Vec<(HeaderName, HeaderValue)>, TransportError> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(TransportError::other)?;
            let value = HeaderValue::from_str(value).map_err(TransportError::other)?;
            Ok((name, value))
        })
        .collect()
}

/// Converts a millisecond timeout into a duration; zero and negative mean "no timeout".
pub(super) fn positive_timeout(timeout_ms: Option<f64>) -> Option<Duration> {
    timeout_ms
        .filter(|ms| *ms > 0.0)
        .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
}

/// Decodes a body as JSON, falling back to a string; empty bodies become `null`.
pub(super) fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn classify(error: reqwest::Error, timeout_ms: Option<f64>) -> TransportError {
    if error.is_timeout() {
        let message = timeout_ms.map_or_else(
            || "timeout exceeded".to_owned(),
            |ms| format!("timeout of {ms}ms exceeded"),
        );
        return TransportError::Request {
            message,
            code: Some(TIMEOUT_ERROR_CODE.to_owned()),
            response: None,
        };
    }

    if error.is_builder() {
        return TransportError::other(error);
    }

    let code = error.is_connect().then(|| CONNECTION_ERROR_CODE.to_owned());
    TransportError::Request {
        message: error.to_string(),
        code,
        response: None,
    }
}
