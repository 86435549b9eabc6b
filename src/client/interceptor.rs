//! Lifecycle hooks invoked by the pipeline.

use std::fmt;
use std::sync::Arc;

use super::{RequestConfig, RequestError, Response};

/// Hook invoked before every attempt with the request configuration.
pub type RequestInterceptor = Arc<dyn Fn(&RequestConfig) + Send + Sync>;

/// Hook invoked with every successful response before it reaches the consumer.
pub type ResponseInterceptor = Arc<dyn Fn(&RequestConfig, &Response) + Send + Sync>;

/// Hook invoked with every failure (never cancellation) before it reaches the consumer.
pub type ErrorInterceptor = Arc<dyn Fn(&RequestError) + Send + Sync>;

/// Fixed set of optional hooks.
///
/// Hooks run synchronously on the task driving the call. Their return values
/// are ignored, and a panicking hook is not caught: it unwinds through the
/// call as a caller defect rather than an HTTP failure.
///
/// # Example
///
/// ```
/// use reqflow::client::Interceptors;
///
/// let interceptors = Interceptors::new()
///     .on_request(|config| println!("-> {} {}", config.method, config.url))
///     .on_error(|error| eprintln!("!! {error}"));
/// ```
#[derive(Clone, Default)]
pub struct Interceptors {
    request: Option<RequestInterceptor>,
    response: Option<ResponseInterceptor>,
    error: Option<ErrorInterceptor>,
}

impl Interceptors {
    /// Creates an empty set of hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that log every stage through `tracing`.
    ///
    /// Requests and responses are logged at `DEBUG`, failures at `WARN`.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new()
            .on_request(|config| {
                tracing::debug!(method = %config.method, url = %config.url, "Sending request");
            })
            .on_response(|config, response| {
                tracing::debug!(
                    method = %config.method,
                    url = %config.url,
                    status = response.status.as_u16(),
                    "Received response"
                );
            })
            .on_error(|error| {
                let status = error.status().map(|status| status.as_u16());
                tracing::warn!(?status, "Request failed: {error}");
            })
    }

    /// Sets the request hook.
    #[must_use]
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestConfig) + Send + Sync + 'static,
    {
        self.request = Some(Arc::new(hook));
        self
    }

    /// Sets the response hook.
    #[must_use]
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestConfig, &Response) + Send + Sync + 'static,
    {
        self.response = Some(Arc::new(hook));
        self
    }

    /// Sets the error hook.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }

    /// Returns true if no hook is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.request.is_none() && self.response.is_none() && self.error.is_none()
    }

    pub(crate) fn before_request(&self, config: &RequestConfig) {
        if let Some(hook) = &self.request {
            hook(config);
        }
    }

    pub(crate) fn after_response(&self, config: &RequestConfig, response: &Response) {
        if let Some(hook) = &self.response {
            hook(config, response);
        }
    }

    pub(crate) fn after_error(&self, error: &RequestError) {
        if let Some(hook) = &self.error {
            hook(error);
        }
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
