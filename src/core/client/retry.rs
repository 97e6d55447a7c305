use std::time::Duration;

use rand::Rng;

use crate::core::{MapsError, NetworkFailure};

/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay is calculated as `base * (factor ^ attempt)`, capped at `max`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries (before jitter).
        max: Duration,
        /// Whether to add up to 25% of random extra delay.
        jitter: bool,
    },
}

impl Backoff {
    /// Delay to wait after the zero-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => backoff_delay(attempt, base, max, factor, jitter),
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// Holds no mutable state, so one value can be shared by every request of a client.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// Whether to retry on request timeouts.
    pub retry_on_timeout: bool,
    /// Whether to retry on connection errors.
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
                factor: 2.0,
                max: Duration::from_secs(60),
                jitter: true,
            },
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    /// Default policy with a different retry budget.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Retries available to one logical call under this policy.
    pub fn retry_budget(&self) -> u32 {
        if self.enabled { self.max_retries } else { 0 }
    }

    /// Whether a failed attempt should be retried, given either the transport failure
    /// or the HTTP status of the classified response.
    pub fn should_retry(&self, failure: Option<&NetworkFailure>, status: Option<u16>) -> bool {
        match failure {
            Some(NetworkFailure::Timeout(_)) => self.retry_on_timeout,
            Some(NetworkFailure::Connect(_)) => self.retry_on_connect,
            Some(_) => false,
            None => should_retry(None, status),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), MapsError> {
        let Backoff::Exponential { base, max, factor, .. } = &self.backoff else {
            return Ok(());
        };
        if base.is_zero() {
            return Err(MapsError::Config("retry base delay must be positive".into()));
        }
        if max.is_zero() {
            return Err(MapsError::Config("retry max delay must be positive".into()));
        }
        if max < base {
            return Err(MapsError::Config("retry max delay must be >= base delay".into()));
        }
        if !factor.is_finite() || *factor < 1.0 {
            return Err(MapsError::Config("retry backoff factor must be >= 1.0".into()));
        }
        Ok(())
    }
}

/// Retry classification shared by every policy.
///
/// Timeouts and connection failures are transient, as is any 5xx status. 429 and the
/// other 4xx statuses are terminal: quota pressure is the rate limiter's business.
pub fn should_retry(failure: Option<&NetworkFailure>, status: Option<u16>) -> bool {
    if failure.is_some_and(NetworkFailure::is_transient) {
        return true;
    }
    matches!(status, Some(s) if (500..600).contains(&s) && s != 429)
}

/// `min(base * factor^attempt, max)`, plus up to 25% extra when `jitter` is set.
/// Jitter is never subtracted.
///
/// Total for any input: the exponential term is clamped into `[0, max]`, so a
/// factor below 1 (or negative) never yields a negative or overflowing delay.
pub fn backoff_delay(
    attempt: u32,
    base: Duration,
    max: Duration,
    factor: f64,
    jitter: bool,
) -> Duration {
    let exp = factor.powi(attempt.min(i32::MAX as u32) as i32);
    let raw = base.as_secs_f64() * exp;
    let delay = if raw.is_finite() && raw < max.as_secs_f64() {
        Duration::try_from_secs_f64(raw.max(0.0)).unwrap_or(max)
    } else {
        max
    };
    if !jitter {
        return delay;
    }
    let extra: f64 = rand::thread_rng().gen_range(0.0..1.0);
    let jitter = Duration::try_from_secs_f64(delay.as_secs_f64() * 0.25 * extra)
        .unwrap_or(Duration::ZERO);
    delay.saturating_add(jitter)
}
