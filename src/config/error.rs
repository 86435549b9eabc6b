//! Errors raised while turning CLI flags and the TOML file into a request.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong before the first byte is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `--config` file could not be read.
    #[error("Cannot read config '{}': {source}", path.display())]
    FileRead {
        /// File that was requested
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Malformed config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `reqflow init` could not write the template.
    #[error("Cannot write config template '{}': {source}", path.display())]
    FileWrite {
        /// Destination of the template
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A value needed to build the request was given neither on the command
    /// line nor in the config file.
    #[error("No {field} given. {hint}")]
    MissingRequired {
        /// See [`field`]
        field: &'static str,
        /// Where the value can be set
        hint: &'static str,
    },

    /// A request or base URL that does not parse.
    #[error("Bad URL '{url}': {reason}")]
    InvalidUrl {
        /// As given
        url: String,
        /// Parser message
        reason: String,
    },

    /// Retry settings out of range.
    #[error("Bad retry settings: {0}")]
    InvalidRetry(String),

    /// Unsupported HTTP method.
    #[error("Invalid HTTP method '{0}': expected GET, POST, PUT, PATCH or DELETE")]
    InvalidMethod(String),

    /// A `--param` or `--query` entry without `=`.
    #[error("Invalid {kind} parameter '{value}': expected 'Key=Value'")]
    InvalidParam {
        /// `path` or `query`
        kind: &'static str,
        /// As given
        value: String,
    },

    /// A `--header` entry that is neither `K=V` nor `K: V`.
    #[error("Cannot split header '{value}': use 'Name=Value' or 'Name: Value'")]
    InvalidHeader {
        /// As given
        value: String,
    },

    #[error("Header name '{name}' rejected: {reason}")]
    InvalidHeaderName {
        /// As given
        name: String,
        /// Validation message from `http`
        reason: String,
    },

    #[error("Header '{name}' has a value that cannot be sent: {reason}")]
    InvalidHeaderValue {
        /// Header the value belongs to
        name: String,
        /// Validation message from `http`
        reason: String,
    },

    /// `--data` is not valid JSON.
    #[error("Invalid request data: {0}")]
    InvalidData(#[source] serde_json::Error),
}

/// Names reported in [`ConfigError::MissingRequired`].
pub mod field {
    /// The request URL (second positional argument).
    pub const URL: &str = "url";
    /// `--base-url` or `[transport].base_url`.
    pub const BASE_URL: &str = "base_url";
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingRequired`].
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
