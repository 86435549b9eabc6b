//! The optional `reqflow.toml` file.
//!
//! Three sections: `[transport]`, `[request]` and `[retry]`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::params::Params;

/// Contents of a config file.
///
/// Every key is optional; anything left out falls back to flags or defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Transport configuration section
    #[serde(default)]
    pub transport: TransportSection,

    /// Request defaults section
    #[serde(default)]
    pub request: RequestSection,

    /// `[retry]`
    #[serde(default)]
    pub retry: RetrySection,
}

/// Transport configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    /// Base URL that relative paths are resolved against
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    pub timeout: Option<u64>,

    /// `User-Agent` header value
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Request defaults section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    /// HTTP method used when the command line does not name one
    pub method: Option<String>,

    /// Headers for the request (merged under CLI headers)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Query parameters (merged under CLI parameters)
    #[serde(default)]
    pub query: Params,
}

/// `[retry]`: times are in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts, including the first
    pub max_attempts: Option<u32>,

    /// Initial retry delay in milliseconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in milliseconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

impl TomlConfig {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FileRead`] or [`ConfigError::TomlParse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TomlParse`] on syntax errors and unknown keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// The commented template written by `reqflow init`.
#[must_use]
pub fn default_config_template() -> String {
    r#"# reqflow configuration file

[transport]
# Base URL that relative paths such as "/users/:id" are resolved against
# base_url = "https://api.example.com"

# Request timeout in milliseconds (no timeout when unset or 0)
# timeout = 10000

# User-Agent header (default: reqflow/<version>)
# user_agent = "reqflow"

# Headers sent with every request
# [transport.headers]
# Authorization = "Bearer your-token-here"

[request]
# HTTP method used when the command line only names a URL (default: GET)
# method = "GET"

# Request headers (--header flags override these)
# [request.headers]
# Accept = "application/json"

# Query parameters (--query flags override these)
# [request.query]
# page = 1

[retry]
# Maximum number of attempts, including the first (default: 3, 1 disables retries)
# max_attempts = 3

# Initial retry delay in milliseconds (default: 500)
# initial_delay = 500

# Maximum retry delay in milliseconds (default: 10000)
# max_delay = 10000

# Backoff multiplier (default: 2.0)
# multiplier = 2.0
"#
    .to_string()
}
