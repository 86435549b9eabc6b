//! Process-level plumbing for the `reqflow` binary: exit codes, hints
//! printed after configuration errors, and the log subscriber.

use reqflow::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit statuses of the `reqflow` binary.
pub mod exit_code {
    use std::process::ExitCode;

    /// The request succeeded (0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing required fields, bad path params.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Request failure (exit code 2) - network failure, error status, etc.
    pub fn request_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// Cancelled by Ctrl+C (exit code 130, the shell convention for SIGINT).
    pub fn cancelled() -> ExitCode {
        ExitCode::from(130)
    }
}

/// Suggests a fix for the configuration errors users hit most.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: f, .. } if *f == field::URL => {
            eprintln!("\nExample: reqflow GET https://api.example.com/users/:id --param id=42");
        }
        ConfigError::MissingRequired { field: f, .. } if *f == field::BASE_URL => {
            eprintln!("\nPass --base-url, or set [transport].base_url (see 'reqflow init').");
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'reqflow init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Installs the global `tracing` subscriber (`info`, or `debug` when verbose).
///
/// Logs go to stderr so stdout carries only the response body.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
