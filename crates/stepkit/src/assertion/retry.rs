//! Polling until an assertion holds.
//!
//! Drivers use [`RetryConfig::retry`] to implement `should`: the check is
//! re-run until it passes, the timeout elapses or the attempt budget is
//! spent. Only failed comparisons are retried; usage errors surface at once.

use crate::result::StepResult;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between retry attempts
    pub poll_interval: Duration,
    /// Maximum number of attempts (0 = unlimited within timeout)
    pub max_retries: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(4),
            poll_interval: Duration::from_millis(50),
            max_retries: 0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(50),
            max_retries: 0,
        }
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set maximum attempts
    #[must_use]
    pub const fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// A single attempt, no waiting
    #[must_use]
    pub const fn once() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::ZERO,
            max_retries: 1,
        }
    }

    /// Run `check` until it passes.
    ///
    /// Returns the last assertion error once the budget is spent; any other
    /// error is returned from the attempt that produced it.
    pub fn retry<F>(&self, check: F) -> StepResult<RetryResult>
    where
        F: Fn() -> StepResult<()>,
    {
        let start = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match check() {
                Ok(()) => {
                    trace!(attempts, "check passed");
                    return Ok(RetryResult {
                        attempts,
                        duration: start.elapsed(),
                    });
                }
                Err(e) if !e.is_assertion() => return Err(e),
                Err(e) => e,
            };

            let out_of_time = start.elapsed() >= self.timeout;
            let out_of_attempts = self.max_retries > 0 && attempts >= self.max_retries;
            if out_of_time || out_of_attempts {
                debug!(attempts, elapsed_ms = start.elapsed().as_millis() as u64, "giving up polling");
                return Err(error);
            }

            std::thread::sleep(self.poll_interval);
        }
    }
}

/// Result of a successful retry
#[derive(Debug, Clone, Copy)]
pub struct RetryResult {
    /// Number of attempts before success
    pub attempts: usize,
    /// Total duration of all attempts
    pub duration: Duration,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::StepError;
    use std::cell::Cell;

    fn fast() -> RetryConfig {
        RetryConfig::new(Duration::from_millis(200)).with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn test_passes_after_retries() {
        let calls = Cell::new(0);
        let result = fast()
            .retry(|| {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(StepError::assertion("not yet", "", ""))
                } else {
                    Ok(())
                }
            })
            .unwrap();
        assert_eq!(result.attempts, 3);
    }

    #[test]
    fn test_returns_last_assertion_error() {
        let calls = Cell::new(0);
        let err = fast()
            .with_max_retries(4)
            .retry(|| {
                calls.set(calls.get() + 1);
                Err(StepError::assertion(format!("attempt {}", calls.get()), "", ""))
            })
            .unwrap_err();
        assert_eq!(calls.get(), 4);
        assert_eq!(err.to_string(), "attempt 4");
    }

    #[test]
    fn test_non_assertion_errors_are_not_retried() {
        let calls = Cell::new(0);
        let err = fast()
            .retry(|| {
                calls.set(calls.get() + 1);
                Err(StepError::type_error("x is not a number"))
            })
            .unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(matches!(err, StepError::Type { .. }));
    }

    #[test]
    fn test_once_makes_a_single_attempt() {
        let calls = Cell::new(0);
        let _ = RetryConfig::once().retry(|| {
            calls.set(calls.get() + 1);
            Err(StepError::assertion("no", "", ""))
        });
        assert_eq!(calls.get(), 1);
    }
}
