//! Request execution.
//!
//! Builds the HTTP client from the validated configuration, runs the request
//! until it settles or a shutdown signal arrives, and prints the reply body.

use std::future::Future;
use std::process::ExitCode;

use serde_json::Value;
use thiserror::Error;
use tokio::signal;

use reqflow::client::{
    HttpClient, Interceptors, RequestConfig, RequestError, ReqwestTransport, Response, Transport,
};
use reqflow::config::ValidatedConfig;

use crate::app::exit_code;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the reqwest client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request failed after all attempts.
    #[error("Request failed: {0}")]
    Request(#[source] RequestError),

    /// The request was cancelled before it settled.
    #[error("Request cancelled")]
    Cancelled,
}

/// Maps a runtime error to the process exit code.
///
/// Path template errors are caller mistakes and share the configuration code.
pub fn exit_code_for(error: &RunError) -> ExitCode {
    match error {
        RunError::ClientBuild(_) | RunError::Request(RequestError::Path(_)) => {
            exit_code::CONFIG_ERROR
        }
        RunError::Request(_) => exit_code::request_error(),
        RunError::Cancelled => exit_code::cancelled(),
    }
}

/// Executes the configured request.
///
/// This function:
/// 1. Creates the reqwest transport and pipeline client
/// 2. Runs the request, cancelling it on Ctrl+C or SIGTERM
/// 3. Prints the reply body to stdout
///
/// # Errors
///
/// Returns an error if the client cannot be built, the request fails, or it
/// is cancelled.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let client = build_client(&config)?;

    let response = perform(&client, config.request_config(), shutdown_signal()).await?;
    tracing::info!(
        status = response.status.as_u16(),
        "{} {}",
        config.method,
        config.url
    );

    let body = render_body(&response.data);
    if !body.is_empty() {
        println!("{body}");
    }

    Ok(())
}

/// Creates the pipeline client from configuration.
fn build_client(config: &ValidatedConfig) -> Result<HttpClient<ReqwestTransport>, RunError> {
    let inner = reqwest::Client::builder()
        .default_headers(config.default_headers.clone())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(RunError::ClientBuild)?;

    let mut transport = ReqwestTransport::from_client(inner);
    if let Some(base_url) = &config.base_url {
        transport = transport.with_base_url(base_url.clone());
    }

    let mut client = HttpClient::new(transport).with_interceptors(Interceptors::tracing());
    if let Some(policy) = config.retry.policy() {
        client = client.with_retry_policy(policy);
    }

    Ok(client)
}

/// Runs one request until it settles or `shutdown` completes.
///
/// On shutdown the call is cancelled and [`RunError::Cancelled`] returned.
async fn perform<T: Transport>(
    client: &HttpClient<T>,
    request: RequestConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<Response, RunError> {
    let subscription = client.request(request).subscribe();
    let cancel = subscription.cancellation();

    let waiting = subscription.wait();
    tokio::pin!(waiting);

    let outcome = tokio::select! {
        outcome = &mut waiting => outcome,
        () = shutdown => {
            tracing::info!("Shutdown signal received, cancelling request...");
            cancel.cancel();
            waiting.await
        }
    };

    match outcome {
        Ok(Some(response)) => Ok(response),
        Ok(None) => Err(RunError::Cancelled),
        Err(error) => Err(RunError::Request(error)),
    }
}

/// Formats a reply body for stdout.
///
/// Strings print raw, `null` prints nothing, everything else as pretty JSON.
fn render_body(data: &Value) -> String {
    match data {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
