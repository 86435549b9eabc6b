//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// reqflow: send one HTTP request through the request pipeline
///
/// Fills `:name` placeholders in the URL from `--param`, retries transient
/// failures, and prints the JSON reply to stdout.
#[derive(Debug, Parser)]
#[command(name = "reqflow")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// HTTP method (GET, POST, PUT, PATCH, DELETE). May be omitted when the URL is the only argument
    #[arg(value_name = "METHOD")]
    pub method: Option<String>,

    /// URL or path template, e.g. '/users/:id'
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Base URL that relative paths are resolved against
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Path parameter in 'Key=Value' format (can be specified multiple times)
    #[arg(long = "param", value_name = "K=V")]
    pub params: Vec<String>,

    /// Query parameter in 'Key=Value' format (can be specified multiple times)
    #[arg(long = "query", value_name = "K=V")]
    pub query: Vec<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,

    /// JSON request body
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of attempts, including the first
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Initial retry delay in milliseconds
    #[arg(long = "retry-delay", value_name = "MS")]
    pub retry_delay: Option<u64>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for reqflow
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "reqflow.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
