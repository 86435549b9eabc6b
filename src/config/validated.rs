//! The request the binary will send, merged from flags, the TOML file and
//! built-in defaults (in that order of precedence) and checked up front.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::client::{Backoff, RequestConfig, RequestMethod, RetryPolicy};
use crate::params::{Headers, ParamValue, Params};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// One fully checked request plus the transport and retry settings around it.
///
/// Built by [`ValidatedConfig::from_raw`] or [`ValidatedConfig::load`]; every
/// field is already valid, so [`request_config`](Self::request_config) cannot fail.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// HTTP method
    pub method: RequestMethod,

    /// URL or path template, passed to the pipeline unchanged
    pub url: String,

    /// Base URL for relative paths
    pub base_url: Option<Url>,

    /// Values for the URL template placeholders
    pub path_params: Params,

    /// Query parameters
    pub query_params: Params,

    /// Per-request headers, keyed by lower-case name
    pub headers: Headers,

    /// Headers the transport sends with every request
    pub default_headers: HeaderMap,

    /// `User-Agent` header value
    pub user_agent: String,

    /// JSON payload
    pub data: Option<Value>,

    /// Request timeout; `None` disables it
    pub timeout: Option<Duration>,

    /// Retry settings
    pub retry: RetrySettings,

    /// `--verbose`
    pub verbose: bool,
}

/// Validated retry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delays between attempts
    pub backoff: Backoff,
}

impl RetrySettings {
    /// Builds the pipeline's retry policy.
    ///
    /// Only transient failures are retried. Returns `None` when a single
    /// attempt is configured.
    #[must_use]
    pub fn policy(&self) -> Option<RetryPolicy> {
        (self.max_attempts > 1).then(|| {
            RetryPolicy::max_attempts(self.max_attempts)
                .and_when(|ctx| ctx.error.is_retryable())
                .with_backoff(self.backoff.clone())
        })
    }
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base_url = self
            .base_url
            .as_ref()
            .map_or_else(|| "none".to_string(), Url::to_string);
        let timeout = self
            .timeout
            .map_or_else(|| "none".to_string(), |t| format!("{}ms", t.as_millis()));

        write!(
            f,
            "Config {{ method: {}, url: {}, base_url: {}, timeout: {}, retry: {}x/{}ms, \
             headers: {} }}",
            self.method,
            self.url,
            base_url,
            timeout,
            self.retry.max_attempts,
            self.retry.backoff.initial_delay.as_millis(),
            self.headers.len() + self.default_headers.len(),
        )
    }
}

impl ValidatedConfig {
    /// Merges `cli` over `toml` over defaults and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is missing, or is relative without a base URL
    /// - The method, base URL, a parameter or a header is invalid
    /// - The request data is not valid JSON
    /// - Retry settings are out of range
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let (method, url) = Self::resolve_target(cli, toml)?;

        let base_url = Self::resolve_base_url(cli, toml)?;
        if base_url.is_none() && Url::parse(&url).is_err() {
            return Err(ConfigError::missing(
                field::BASE_URL,
                "Relative URLs need --base-url or transport.base_url in config file",
            ));
        }

        let path_params = parse_params(&cli.params, "path")?;
        let query_params = Self::resolve_query(cli, toml)?;
        let headers = Self::resolve_headers(cli, toml)?;
        let default_headers = Self::resolve_default_headers(toml)?;

        let user_agent = toml
            .and_then(|t| t.transport.user_agent.clone())
            .unwrap_or_else(|| defaults::USER_AGENT.to_string());
        parse_header_value("User-Agent", &user_agent)?;

        let data = cli
            .data
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(ConfigError::InvalidData)?;

        // Priority: CLI explicit > TOML; zero disables the timeout
        let timeout = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.transport.timeout))
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let retry = Self::build_retry_settings(cli, toml)?;

        Ok(Self {
            method,
            url,
            base_url,
            path_params,
            query_params,
            headers,
            default_headers,
            user_agent,
            data,
            timeout,
            retry,
            verbose: cli.verbose,
        })
    }

    /// Like [`from_raw`](Self::from_raw), reading the TOML file named by `--config` first.
    ///
    /// # Errors
    ///
    /// Fails if the file is unreadable or malformed, or if the merged values
    /// do not validate.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Builds the pipeline request described by this configuration.
    ///
    /// Path parameters are attached only when some were given, so URLs
    /// containing a literal `:` (such as a port) pass through untouched.
    #[must_use]
    pub fn request_config(&self) -> RequestConfig {
        let mut config = RequestConfig::new(self.method, self.url.clone());

        if !self.path_params.is_empty() {
            config = config.with_path_params(self.path_params.clone());
        }
        if !self.query_params.is_empty() {
            config = config.with_query_params(self.query_params.clone());
        }
        if !self.headers.is_empty() {
            config = config.with_headers(self.headers.clone());
        }
        if let Some(data) = &self.data {
            config = config.with_data(data.clone());
        }
        if let Some(timeout) = self.timeout {
            // Millisecond timeouts stay far below f64's exact integer range
            #[allow(clippy::cast_precision_loss)]
            let millis = timeout.as_millis() as f64;
            config = config.with_timeout(millis);
        }

        config
    }

    /// Resolves the method and URL from the positional arguments.
    ///
    /// A single positional argument that is not a method name is taken as the
    /// URL; the method then comes from the config file or the default.
    fn resolve_target(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<(RequestMethod, String), ConfigError> {
        let missing_url = || {
            ConfigError::missing(field::URL, "Usage: reqflow [OPTIONS] <METHOD> <URL>")
        };

        match (cli.method.as_deref(), cli.url.as_deref()) {
            (Some(method), Some(url)) => Ok((parse_method(method)?, url.to_string())),
            (Some(only), None) => {
                if only.parse::<RequestMethod>().is_ok() {
                    return Err(missing_url());
                }

                        let method = toml
                    .and_then(|t| t.request.method.as_deref())
                    .unwrap_or(defaults::METHOD);
                Ok((parse_method(method)?, only.to_string()))
            }
            (None, _) => Err(missing_url()),
        }
    }

    fn resolve_base_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Option<Url>, ConfigError> {
        let Some(url_str) = cli
            .base_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.transport.base_url.as_deref()))
        else {
            return Ok(None);
        };

        Url::parse(url_str)
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: e.to_string(),
            })
    }

    fn resolve_query(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Params, ConfigError> {
        // file first, flags overwrite
        let mut query = toml.map(|t| t.request.query.clone()).unwrap_or_default();
        query.extend(parse_params(&cli.query, "query")?);
        Ok(query)
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Headers, ConfigError> {
        let mut headers = Headers::new();

        // file first, flags overwrite
        if let Some(toml) = toml {
            for (name, value) in &toml.request.headers {
                let header_name = parse_header_name(name)?;
                parse_header_value(name, value)?;
                headers.insert(header_name.as_str().to_string(), value.clone());
            }
        }

        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            let header_name = parse_header_name(&name)?;
            parse_header_value(&name, &value)?;
            headers.insert(header_name.as_str().to_string(), value);
        }

        Ok(headers)
    }

    fn resolve_default_headers(toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        if let Some(toml) = toml {
            for (name, value) in &toml.transport.headers {
                let header_name = parse_header_name(name)?;
                let header_value = parse_header_value(name, value)?;
                headers.insert(header_name, header_value);
            }
        }

        Ok(headers)
    }

    fn build_retry_settings(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetrySettings, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_ms = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.initial_delay))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_MS);

        let max_delay_ms = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_MS);

        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts < RetryPolicy::MIN_MAX_ATTEMPTS {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if initial_delay_ms == 0 {
            return Err(ConfigError::InvalidRetry(
                "initial_delay must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_ms < initial_delay_ms {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_ms}ms) must be >= initial_delay ({initial_delay_ms}ms)"
            )));
        }

        Ok(RetrySettings {
            max_attempts,
            backoff: Backoff::new()
                .with_initial_delay(Duration::from_millis(initial_delay_ms))
                .with_max_delay(Duration::from_millis(max_delay_ms))
                .with_multiplier(multiplier),
        })
    }
}

/// Writes [`default_config_template`](super::default_config_template) to `path`.
///
/// # Errors
///
/// [`ConfigError::FileWrite`] when the file cannot be created.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}


fn parse_method(s: &str) -> Result<RequestMethod, ConfigError> {
    s.parse::<RequestMethod>()
        .map_err(|_| ConfigError::InvalidMethod(s.to_string()))
}

fn parse_params(pairs: &[String], kind: &'static str) -> Result<Params, ConfigError> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidParam {
                    kind,
                    value: pair.clone(),
                })?;
            Ok((name.trim().to_string(), ParamValue::from(value)))
        })
        .collect()
}

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // the first separator splits, so `Name: a=b` and `Name=a:b` both work
    s.split_once(['=', ':'])
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| ConfigError::InvalidHeader {
            value: s.to_string(),
        })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
