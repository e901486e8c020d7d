//! Minimum-interval request pacing.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Enforces a minimum interval between consecutive requests.
///
/// Callers block in [`acquire`](Self::acquire) until the interval since the
/// previous request has elapsed. The lock is held while waiting, so
/// concurrent callers are serialized in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a limiter from an interval in (possibly fractional) seconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(secs.max(0.0)))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may be sent, then records it.
    pub fn acquire(&self) {
        let mut last = self.last_request.lock();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_consecutive_acquires_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.acquire();
        limiter.acquire();
        limiter.acquire();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_zero_interval() {
        let limiter = RateLimiter::from_secs_f64(-1.0);
        assert_eq!(limiter.min_interval(), Duration::ZERO);
        limiter.acquire();
        limiter.acquire();
    }
}
