//! Tests for retry settings.

use std::time::Duration;

use super::*;
use crate::config::defaults;

fn retry_config(args: &[&str], toml_content: Option<&str>) -> Result<ValidatedConfig, ConfigError> {
    let mut full = vec!["GET", "https://example.com"];
    full.extend(args);
    let toml = toml_content.map(toml);
    ValidatedConfig::from_raw(&cli(&full), toml.as_ref())
}

#[test]
fn defaults_apply() {
    let config = retry_config(&[], None).unwrap();

    assert_eq!(config.retry.max_attempts, defaults::RETRY_MAX_ATTEMPTS);
    assert_eq!(config.retry.backoff.initial_delay, defaults::retry_initial_delay());
    assert_eq!(config.retry.backoff.max_delay, defaults::retry_max_delay());
}

#[test]
fn cli_overrides_toml() {
    let config = retry_config(
        &["--retry-max", "7", "--retry-delay", "50"],
        Some("[retry]\nmax_attempts = 2\ninitial_delay = 900"),
    )
    .unwrap();

    assert_eq!(config.retry.max_attempts, 7);
    assert_eq!(config.retry.backoff.initial_delay, Duration::from_millis(50));
}

#[test]
fn toml_only_settings_are_used() {
    let config = retry_config(&[], Some("[retry]\nmax_delay = 4000\nmultiplier = 3.0")).unwrap();

    assert_eq!(config.retry.backoff.max_delay, Duration::from_millis(4000));
    assert!((config.retry.backoff.multiplier - 3.0).abs() < f64::EPSILON);
}

#[test]
fn zero_attempts_is_rejected() {
    let result = retry_config(&["--retry-max", "0"], None);

    assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
}

#[test]
fn zero_delay_is_rejected() {
    let result = retry_config(&["--retry-delay", "0"], None);

    assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
}

#[test]
fn non_positive_multiplier_is_rejected() {
    let result = retry_config(&[], Some("[retry]\nmultiplier = 0.0"));

    assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
}

#[test]
fn max_delay_below_initial_is_rejected() {
    let result = retry_config(&[], Some("[retry]\ninitial_delay = 1000\nmax_delay = 10"));

    assert!(matches!(result, Err(ConfigError::InvalidRetry(msg)) if msg.contains("max_delay")));
}

#[test]
fn single_attempt_builds_no_policy() {
    let config = retry_config(&["--retry-max", "1"], None).unwrap();

    assert!(config.retry.policy().is_none());
}

#[test]
fn multiple_attempts_build_policy_with_backoff() {
    let config = retry_config(&["--retry-max", "4", "--retry-delay", "20"], None).unwrap();

    let policy = config.retry.policy().expect("policy");

    assert_eq!(policy.backoff(), Some(&config.retry.backoff));
    assert_eq!(policy.delay_after(1), Some(Duration::from_millis(20)));
}
