//! Request pipeline over a pluggable HTTP transport.
//!
//! This module provides types and traits for:
//! - Describing requests ([`RequestConfig`], [`FetchOptions`], [`UpdateOptions`])
//! - Normalized responses and errors ([`Response`], [`ClientError`], [`RequestError`])
//! - Abstracting the transport ([`Transport`]) and its production implementation
//!   ([`ReqwestTransport`])
//! - Lifecycle hooks ([`Interceptors`]) and predicate-driven retries ([`RetryPolicy`])
//! - Issuing cold, cancellable calls ([`HttpClient`], [`Call`], [`Subscription`])
//!
//! # Example
//!
//! ```no_run
//! use reqflow::client::{FetchOptions, HttpClient, ReqwestTransport, RetryPolicy};
//! use reqflow::params::to_params;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new().with_base_url(Url::parse("https://api.example.com")?);
//! let client = HttpClient::new(transport).with_retry_policy(RetryPolicy::max_attempts(3));
//!
//! let call = client.get(
//!     "/user/:userId",
//!     FetchOptions::new().with_path_params(to_params([("userId", 42)])),
//! );
//!
//! // Nothing has been sent yet; awaiting starts the request.
//! if let Some(response) = call.await? {
//!     println!("{}: {}", response.status, response.data);
//! }
//! # Ok(())
//! # }
//! ```

mod cancel;
mod error;
mod interceptor;
mod pipeline;
mod reqwest_transport;
mod request;
mod response;
mod retry;
mod shared;
mod transport;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod reqwest_transport_tests;

pub use cancel::CancelHandle;
pub use error::{
    ClientError, ClientErrorParts, RequestError, TIMEOUT_ERROR_CODE, create_client_error,
    error_status, is_client_error, is_response_error, is_timeout_error,
};
pub use interceptor::{ErrorInterceptor, Interceptors, RequestInterceptor, ResponseInterceptor};
pub use pipeline::{Call, HttpClient, Outcome, Subscription};
pub use reqwest_transport::ReqwestTransport;
pub use request::{FetchOptions, RequestConfig, RequestMethod, UnknownMethod, UpdateOptions};
pub use response::Response;
pub use retry::{Backoff, RetryContext, RetryPolicy};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
