//! Retry policy for external requests.
//!
//! - [`RetryPolicy::None`]: fail on the first error
//! - [`RetryPolicy::Fixed`]: constant delay between attempts
//! - [`RetryPolicy::ExponentialBackoff`]: delay multiplied after each failure

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Default initial delay for exponential backoff (500ms).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;

/// Default maximum delay for exponential backoff (30 seconds).
pub const DEFAULT_MAX_DELAY_SECS: u64 = 30;

/// Default multiplier for exponential backoff.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// How a request handles transient failures.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    #[default]
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between retry attempts.
        delay: Duration,
    },

    /// Exponential backoff with configurable parameters.
    ExponentialBackoff {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Initial delay after the first failure.
        initial_delay: Duration,
        /// Maximum delay cap (delay won't exceed this).
        max_delay: Duration,
        /// Multiplier applied to delay after each failure (typically 2.0).
        multiplier: f64,
    },
}

impl RetryPolicy {
    /// Creates an exponential backoff policy with default delays.
    ///
    /// `retries` is the number of attempts after the first one.
    pub fn exponential(retries: u32) -> Self {
        Self::ExponentialBackoff {
            max_attempts: retries.saturating_add(1),
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Creates a fixed retry policy.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Calculates the delay before retry number `attempt` (1-based).
    ///
    /// Returns `None` when no more retries are allowed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => (attempt < *max_attempts).then_some(*delay),
            Self::ExponentialBackoff {
                max_attempts,
                initial_delay,
                max_delay,
                multiplier,
            } => {
                if attempt >= *max_attempts {
                    return None;
                }
                let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
                let delay_ms = initial_delay.as_millis() as f64 * factor;
                let capped = delay_ms.min(max_delay.as_millis() as f64);
                Some(Duration::from_millis(capped as u64))
            }
        }
    }

    /// Returns the maximum number of attempts for this policy.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => *max_attempts,
            Self::ExponentialBackoff { max_attempts, .. } => *max_attempts,
        }
    }
}

/// Runs `op` until it succeeds, fails permanently, or the policy gives up.
///
/// `is_transient` decides whether an error is worth retrying. The last
/// error is returned when attempts run out.
pub fn with_retry<T, E, F, P>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
    is_transient: P,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                let delay = if is_transient(&e) {
                    policy.delay_for_attempt(attempt)
                } else {
                    None
                };
                let Some(delay) = delay else {
                    return Err(e);
                };
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_none_never_retries() {
        assert_eq!(RetryPolicy::None.delay_for_attempt(1), None);
        assert_eq!(RetryPolicy::None.max_attempts(), 1);
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::ExponentialBackoff {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            multiplier: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(250)));
        assert_eq!(policy.delay_for_attempt(4), None);
    }

    #[test]
    fn test_exponential_counts_retries() {
        assert_eq!(RetryPolicy::exponential(2).max_attempts(), 3);
        assert_eq!(RetryPolicy::exponential(0).max_attempts(), 1);
    }

    #[test]
    fn test_with_retry_recovers() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::fixed(3, Duration::from_millis(1));
        let result: Result<u32, String> = with_retry(
            &policy,
            "test",
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err("flaky".to_string())
                } else {
                    Ok(7)
                }
            },
            |_| true,
        );
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_with_retry_gives_up() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::fixed(2, Duration::from_millis(1));
        let result: Result<(), String> = with_retry(
            &policy,
            "test",
            || {
                calls.set(calls.get() + 1);
                Err(format!("failure {}", calls.get()))
            },
            |_| true,
        );
        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_with_retry_skips_permanent_errors() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::fixed(5, Duration::from_millis(1));
        let result: Result<(), String> = with_retry(
            &policy,
            "test",
            || {
                calls.set(calls.get() + 1);
                Err("bad request".to_string())
            },
            |_| false,
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
