//! Configuration layer for the `reqflow` command.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Query parameters and request headers are merged key by key: TOML entries
//! are applied first and CLI entries with the same key replace them. Header
//! names are compared case-insensitively.
//!
//! # CLI-Only vs TOML-Only Options
//!
//! Path parameters and the request body are CLI-only. The following are TOML-only:
//! - `transport.user_agent` and `[transport.headers]`
//! - `retry.max_delay` (default: 10s) and `retry.multiplier` (default: 2.0)

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{RetrySettings, ValidatedConfig, write_default_config};
