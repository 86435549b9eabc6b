//! Request configuration types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::params::{Headers, ParamValue, Params};

/// HTTP methods supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl RequestMethod {
    /// Every supported method.
    pub const ALL: [Self; 5] = [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete];

    /// Returns the upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported method name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported HTTP method '{0}': expected GET, POST, PUT, PATCH or DELETE")]
pub struct UnknownMethod(pub String);

impl FromStr for RequestMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl From<RequestMethod> for http::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Post => Self::POST,
            RequestMethod::Put => Self::PUT,
            RequestMethod::Patch => Self::PATCH,
            RequestMethod::Delete => Self::DELETE,
        }
    }
}

/// Everything needed to issue one logical request.
///
/// Once handed to [`HttpClient::request`](super::HttpClient::request) the
/// configuration is frozen behind an `Arc` and shared with interceptors,
/// retry predicates and errors; it is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// HTTP method
    pub method: RequestMethod,
    /// URL template, e.g. `/user/:id`
    pub url: String,
    /// Values for the template placeholders
    pub path_params: Option<Params>,
    /// Query string parameters
    pub query_params: Option<Params>,
    /// Request payload, passed through to the transport by reference
    pub data: Option<Arc<Value>>,
    /// Request headers
    pub headers: Option<Headers>,
    /// Timeout in milliseconds; non-finite values are dropped before dispatch
    pub timeout: Option<f64>,
}

impl RequestConfig {
    /// Creates a configuration with only method and URL set.
    #[must_use]
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            path_params: None,
            query_params: None,
            data: None,
            headers: None,
            timeout: None,
        }
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: Params) -> Self {
        self.path_params = Some(params);
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_data(self, data: Value) -> Self {
        self.with_shared_data(Arc::new(data))
    }

    /// Sets a payload that is already shared elsewhere.
    #[must_use]
    pub fn with_shared_data(mut self, data: Arc<Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: f64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }
}

/// Options for requests without a payload (`GET`, `DELETE`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    /// Values for the template placeholders
    pub path_params: Option<Params>,
    /// Query string parameters
    pub query_params: Option<Params>,
    /// Request headers
    pub headers: Option<Headers>,
    /// Timeout in milliseconds
    pub timeout: Option<f64>,
}

impl FetchOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: Params) -> Self {
        self.path_params = Some(params);
        self
    }

    /// Adds one path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.path_params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query_params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Adds one header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: f64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Combines the options with a method and URL into a full configuration.
    #[must_use]
    pub fn into_config(self, method: RequestMethod, url: impl Into<String>) -> RequestConfig {
        RequestConfig {
            method,
            url: url.into(),
            path_params: self.path_params,
            query_params: self.query_params,
            data: None,
            headers: self.headers,
            timeout: self.timeout,
        }
    }
}

/// Options for requests with a payload (`POST`, `PUT`, `PATCH`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// Options shared with fetch requests
    pub fetch: FetchOptions,
    /// Request payload
    pub data: Option<Arc<Value>>,
}

impl UpdateOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Sets a payload that is already shared elsewhere.
    #[must_use]
    pub fn with_shared_data(mut self, data: Arc<Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: Params) -> Self {
        self.fetch = self.fetch.with_path_params(params);
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.fetch = self.fetch.with_query_params(params);
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.fetch = self.fetch.with_headers(headers);
        self
    }

    /// Adds one header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fetch = self.fetch.with_header(name, value);
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: f64) -> Self {
        self.fetch = self.fetch.with_timeout(timeout_ms);
        self
    }

    /// Combines the options with a method and URL into a full configuration.
    #[must_use]
    pub fn into_config(self, method: RequestMethod, url: impl Into<String>) -> RequestConfig {
        RequestConfig {
            data: self.data,
            ..self.fetch.into_config(method, url)
        }
    }
}

impl From<FetchOptions> for UpdateOptions {
    fn from(fetch: FetchOptions) -> Self {
        Self { fetch, data: None }
    }
}
