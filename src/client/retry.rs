//! Retry policy configuration for the request pipeline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{RequestConfig, RequestError};

/// What a retry predicate sees after a failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryContext<'a> {
    /// Number of failures so far (1 after the first failure).
    pub attempt: u32,
    /// The normalized error of the attempt that just failed.
    pub error: &'a RequestError,
    /// The configuration of the call; identical for every attempt.
    pub config: &'a RequestConfig,
}

type Predicate = Arc<dyn Fn(&RetryContext<'_>) -> bool + Send + Sync>;

/// Decides whether a failed call is attempted again.
///
/// The predicate is consulted after every failure (never after success or
/// cancellation). Returning `true` re-runs the whole attempt; returning
/// `false` surfaces that attempt's error. There is no cap other than what
/// the predicate enforces.
///
/// # Example
///
/// ```
/// use reqflow::client::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// // Retry only transient failures, at most 4 attempts in total,
/// // waiting 100ms, 200ms, 400ms between them.
/// let policy = RetryPolicy::max_attempts(4)
///     .and_when(|ctx| ctx.error.is_retryable())
///     .with_backoff(Backoff::new().with_initial_delay(Duration::from_millis(100)));
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    predicate: Predicate,
    backoff: Option<Backoff>,
}

impl RetryPolicy {
    /// Minimum value for [`max_attempts`](Self::max_attempts).
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates a policy from a predicate. Retries are immediate.
    #[must_use]
    pub fn new<F>(should_retry: F) -> Self
    where
        F: Fn(&RetryContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(should_retry),
            backoff: None,
        }
    }

    /// Creates a policy that allows `max_attempts` attempts in total.
    ///
    /// `1` sends the request once and never retries.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub fn max_attempts(max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        Self::new(move |ctx| ctx.attempt < max_attempts)
    }

    /// Adds a condition that must also hold for a retry to happen.
    #[must_use]
    pub fn and_when<F>(self, condition: F) -> Self
    where
        F: Fn(&RetryContext<'_>) -> bool + Send + Sync + 'static,
    {
        let predicate = self.predicate;
        Self {
            predicate: Arc::new(move |ctx: &RetryContext<'_>| predicate(ctx) && condition(ctx)),
            backoff: self.backoff,
        }
    }

    /// Waits between attempts according to `backoff`.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Returns the configured backoff, if any.
    #[must_use]
    pub const fn backoff(&self) -> Option<&Backoff> {
        self.backoff.as_ref()
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn should_retry(&self, ctx: &RetryContext<'_>) -> bool {
        (self.predicate)(ctx)
    }

    /// Returns how long to wait after failure number `attempt` (1-indexed).
    ///
    /// `None` means retry immediately.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        self.backoff
            .as_ref()
            .map(|backoff| backoff.delay_for_retry(attempt.saturating_sub(1)))
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

/// Exponential wait between a failed attempt and the next one.
///
/// # Defaults
///
/// - `initial_delay`: 1 second
/// - `max_delay`: 30 seconds
/// - `multiplier`: 2.0
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// Wait after the first failure; each later wait is `multiplier` times longer.
    pub initial_delay: Duration,

    /// Upper bound for any single wait.
    pub max_delay: Duration,

    /// Growth factor per failure.
    pub multiplier: f64,
}

impl Backoff {
    /// Default initial delay (1 second).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

    /// Default maximum delay (30 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

    /// Doubles each time.
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Creates a backoff with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Replaces [`initial_delay`](Self::initial_delay).
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Replaces [`max_delay`](Self::max_delay).
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Replaces [`multiplier`](Self::multiplier).
    ///
    /// # Panics
    ///
    /// Panics unless `multiplier > 0.0`.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Computes the delay for a given retry number (0-indexed), capped at `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        // Retry counts stay far below i32::MAX
        #[allow(clippy::cast_possible_wrap)]
        let multiplier = self.multiplier.powi(retry as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
