//! The request pipeline: verb sugar, cold calls, cancellation and retries.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    CancelHandle, ClientErrorParts, FetchOptions, Interceptors, RequestConfig, RequestError,
    RequestMethod, ReqwestTransport, Response, RetryContext, RetryPolicy, Transport,
    TransportError, TransportRequest, UpdateOptions, create_client_error,
};
use super::shared::{Joined, Launch, Settlement, SharedRun};
use crate::path::{PathError, generate_path};

/// Settled result of a call.
///
/// `Ok(None)` means the call was cancelled and completed without a value.
pub type Outcome = Result<Option<Response>, RequestError>;

/// HTTP client that turns request descriptions into cold, cancellable calls.
///
/// Cloning is cheap; clones share the transport and hooks.
///
/// # Type Parameters
///
/// - `T`: The transport implementation (defaults to [`ReqwestTransport`])
///
/// # Example
///
/// ```no_run
/// use reqflow::client::{HttpClient, Interceptors, ReqwestTransport, UpdateOptions};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), reqflow::client::RequestError> {
/// let client = HttpClient::new(ReqwestTransport::new())
///     .with_interceptors(Interceptors::tracing());
///
/// let created = client
///     .post(
///         "https://api.example.com/users",
///         UpdateOptions::new().with_data(json!({ "name": "alice" })),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpClient<T = ReqwestTransport> {
    transport: Arc<T>,
    interceptors: Interceptors,
    retry: Option<RetryPolicy>,
}

impl<T> Clone for HttpClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            interceptors: self.interceptors.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl<T: Transport> HttpClient<T> {
    /// Creates a client without hooks or retries.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Creates a client over a transport that is shared elsewhere.
    #[must_use]
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            interceptors: Interceptors::new(),
            retry: None,
        }
    }

    /// Replaces all hooks.
    #[must_use]
    pub fn with_interceptors(mut self, interceptors: Interceptors) -> Self {
        self.interceptors = interceptors;
        self
    }

    /// Sets the request hook.
    #[must_use]
    pub fn with_request_interceptor<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestConfig) + Send + Sync + 'static,
    {
        self.interceptors = self.interceptors.on_request(hook);
        self
    }

    /// Sets the response hook.
    #[must_use]
    pub fn with_response_interceptor<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestConfig, &Response) + Send + Sync + 'static,
    {
        self.interceptors = self.interceptors.on_response(hook);
        self
    }

    /// Sets the error hook.
    #[must_use]
    pub fn with_error_interceptor<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        self.interceptors = self.interceptors.on_error(hook);
        self
    }

    /// Enables retries.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the configured hooks.
    #[must_use]
    pub const fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    /// Returns the retry policy, if any.
    #[must_use]
    pub const fn retry_policy(&self) -> Option<&RetryPolicy> {
        self.retry.as_ref()
    }

    /// Builds a `GET` call.
    pub fn get(&self, url: impl Into<String>, options: FetchOptions) -> Call<T> {
        self.request(options.into_config(RequestMethod::Get, url))
    }

    /// Builds a `POST` call.
    pub fn post(&self, url: impl Into<String>, options: UpdateOptions) -> Call<T> {
        self.request(options.into_config(RequestMethod::Post, url))
    }

    /// Builds a `PUT` call.
    pub fn put(&self, url: impl Into<String>, options: UpdateOptions) -> Call<T> {
        self.request(options.into_config(RequestMethod::Put, url))
    }

    /// Builds a `PATCH` call.
    pub fn patch(&self, url: impl Into<String>, options: UpdateOptions) -> Call<T> {
        self.request(options.into_config(RequestMethod::Patch, url))
    }

    /// Builds a `DELETE` call.
    pub fn delete(&self, url: impl Into<String>, options: FetchOptions) -> Call<T> {
        self.request(options.into_config(RequestMethod::Delete, url))
    }

    /// Builds a call from a full configuration.
    ///
    /// No I/O happens here; the request is issued when the call is awaited,
    /// sent or subscribed.
    pub fn request(&self, config: RequestConfig) -> Call<T> {
        let shared = self.retry.is_some().then(|| Arc::new(SharedRun::new()));

        Call {
            client: self.clone(),
            config: Arc::new(config),
            shared,
        }
    }
}

/// A cold, cancellable request.
///
/// Holds everything needed to run the request but does nothing until
/// consumed:
/// - `.await` (or [`send`](Self::send)) runs it on the current task; dropping
///   the future while in flight cancels the transport call
/// - [`subscribe`](Self::subscribe) spawns it and returns a [`Subscription`]
///
/// Without a retry policy every consumption issues a fresh request. With a
/// retry policy, all clones of a call share one retry sequence: the first
/// consumer launches it on the runtime, later consumers attach to it or
/// replay its settled outcome. A consumer that cancels only detaches itself;
/// the sequence is stopped once no consumer is left.
#[must_use = "calls are cold and do nothing until awaited or subscribed"]
pub struct Call<T: Transport> {
    client: HttpClient<T>,
    config: Arc<RequestConfig>,
    shared: Option<Arc<SharedRun>>,
}

impl<T: Transport> Clone for Call<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            shared: self.shared.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("config", &self.config)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

/// The consumer went away before the call settled.
struct Unsubscribed;

/// How one attempt ended.
enum Settled {
    Success(Response),
    Cancelled,
    Failure(RequestError),
    Unsubscribed,
}

impl<T: Transport> Call<T> {
    /// Returns the request configuration.
    #[must_use]
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Returns true if clones of this call share one outcome.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.shared.is_some()
    }

    #[cfg(test)]
    pub(crate) fn consumers(&self) -> usize {
        self.shared.as_ref().map_or(0, |shared| shared.consumers())
    }

    /// Runs the call on the current task and waits for its outcome.
    ///
    /// A shared call runs on the tokio runtime instead; dropping this future
    /// then only detaches from it.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`RequestError`] of the last attempt.
    ///
    /// # Panics
    ///
    /// Re-raises a hook panic from the shared retry sequence.
    pub async fn send(&self) -> Outcome {
        self.observe(&CancellationToken::new())
            .await
            .unwrap_or(Ok(None))
    }

    /// Spawns the call on the tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        let unsubscribe = CancellationToken::new();
        let call = self.clone();
        let token = unsubscribe.clone();

        let task = tokio::spawn(async move { call.observe(&token).await.unwrap_or(Ok(None)) });

        Subscription { unsubscribe, task }
    }

    async fn observe(&self, unsubscribe: &CancellationToken) -> Result<Outcome, Unsubscribed> {
        let Some(shared) = &self.shared else {
            return self.run(unsubscribe).await;
        };

        let mut consumer = match shared.join(|launch| self.launch(launch)) {
            Joined::Settled(outcome) => return Ok(outcome),
            Joined::Waiting(consumer) => consumer,
        };

        let settlement = tokio::select! {
            biased;
            () = unsubscribe.cancelled() => return Err(Unsubscribed),
            settlement = consumer.settled() => settlement,
        };

        match settlement {
            Settlement::Done(outcome) => Ok(outcome),
            Settlement::Panicked(message) => panic!("{message}"),
            Settlement::Abandoned => Err(Unsubscribed),
        }
    }

    /// Spawns the shared retry sequence, detached from any one consumer.
    fn launch(&self, launch: Launch) {
        let call = self.clone();

        tokio::spawn(async move {
            let stop = launch.stop();
            let run = tokio::spawn(async move { call.run(&stop).await });

            let settlement = match run.await {
                Ok(Ok(outcome)) => Settlement::Done(outcome),
                Ok(Err(Unsubscribed)) => Settlement::Abandoned,
                Err(error) if error.is_panic() => Settlement::from_panic(&*error.into_panic()),
                Err(_) => Settlement::Abandoned,
            };
            launch.finish(settlement);
        });
    }

    /// Drives attempts until one settles without a retryable failure.
    async fn run(&self, unsubscribe: &CancellationToken) -> Result<Outcome, Unsubscribed> {
        let mut attempt: u32 = 1;

        loop {
            let error = match self.attempt(unsubscribe).await {
                Settled::Success(response) => return Ok(Ok(Some(response))),
                Settled::Cancelled => return Ok(Ok(None)),
                Settled::Unsubscribed => return Err(Unsubscribed),
                Settled::Failure(error) => error,
            };

            let Some(policy) = &self.client.retry else {
                return Ok(Err(error));
            };

            let context = RetryContext {
                attempt,
                error: &error,
                config: &self.config,
            };
            if !policy.should_retry(&context) {
                tracing::debug!(attempt, "Giving up on {} {}", self.config.method, self.config.url);
                return Ok(Err(error));
            }

            tracing::debug!(attempt, "Retrying {} {}: {error}", self.config.method, self.config.url);

            if let Some(delay) = policy.delay_after(attempt) {
                tokio::select! {
                    biased;
                    () = unsubscribe.cancelled() => return Err(Unsubscribed),
                    () = tokio::time::sleep(delay) => {}
                }
            }

            attempt = attempt.saturating_add(1);
        }
    }

    /// Runs a single attempt.
    async fn attempt(&self, unsubscribe: &CancellationToken) -> Settled {
        let handle = CancelHandle::new(Arc::clone(&self.client.transport));

        self.client.interceptors.before_request(&self.config);

        let request = match build_transport_request(&self.config, handle.signal()) {
            Ok(request) => request,
            Err(error) => {
                handle.settle();
                return self.fail(error.into());
            }
        };

        let result = tokio::select! {
            biased;
            () = unsubscribe.cancelled() => {
                handle.cancel();
                return Settled::Unsubscribed;
            }
            result = self.client.transport.request(request) => result,
        };
        handle.settle();

        match result {
            Ok(reply) => {
                let response = Response::from(reply);
                self.client
                    .interceptors
                    .after_response(&self.config, &response);
                Settled::Success(response)
            }
            Err(error) if error.is_cancellation() => {
                tracing::trace!("Request cancelled, completing without a value");
                Settled::Cancelled
            }
            Err(error) => self.fail(self.normalize(error)),
        }
    }

    /// Converts a transport failure into the error consumers see.
    fn normalize(&self, error: TransportError) -> RequestError {
        match error {
            TransportError::Request {
                message,
                code,
                response,
            } => create_client_error(ClientErrorParts {
                code,
                message,
                config: Arc::clone(&self.config),
                response: response.map(Response::from),
            })
            .into(),
            TransportError::Other(source) => RequestError::Other(Arc::from(source)),
            TransportError::Cancelled => RequestError::Other(Arc::new(TransportError::Cancelled)),
        }
    }

    fn fail(&self, error: RequestError) -> Settled {
        self.client.interceptors.after_error(&error);
        Settled::Failure(error)
    }
}

impl<T: Transport> IntoFuture for Call<T> {
    type Output = Outcome;
    type IntoFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.send().await })
    }
}

/// Builds the transport-level request for one attempt.
///
/// Query parameters and headers are copied; the payload is shared. A timeout
/// is forwarded only when finite.
pub(crate) fn build_transport_request(
    config: &RequestConfig,
    signal: CancellationToken,
) -> Result<TransportRequest, PathError> {
    Ok(TransportRequest {
        method: config.method,
        url: generate_path(&config.url, config.path_params.as_ref())?,
        params: config.query_params.clone().unwrap_or_default(),
        data: config.data.clone(),
        headers: config.headers.clone().unwrap_or_default(),
        timeout: config.timeout.filter(|timeout| timeout.is_finite()),
        signal,
    })
}

/// Handle to a call running on the tokio runtime.
///
/// Dropping the subscription detaches it; the call keeps running.
#[derive(Debug)]
pub struct Subscription {
    unsubscribe: CancellationToken,
    task: JoinHandle<Outcome>,
}

impl Subscription {
    /// Cancels the call.
    ///
    /// The outcome becomes `Ok(None)`. The in-flight transport call is aborted,
    /// unless other consumers still share it, in which case this subscription
    /// only detaches. A no-op once the call settled.
    pub fn cancel(&self) {
        self.unsubscribe.cancel();
    }

    /// Returns a token that cancels the call when fired.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.unsubscribe.clone()
    }

    /// Returns true once the call settled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the outcome.
    ///
    /// A panic raised by a hook while the call ran is resumed here.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`RequestError`] of the last attempt.
    pub async fn wait(self) -> Outcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(_) => Ok(None),
        }
    }
}
