//! Runtime resilience: retry with backoff and bounded store calls.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};

use propcash_traits::TraitError;

// =============================================================================
// RETRY CONFIGURATION
// =============================================================================

/// Configuration for retry logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first included.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Add random jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Calculates the delay after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = base_delay.min(self.max_delay_ms as f64);

        let final_delay_ms = if self.jitter {
            // up to 25%
            delay_ms * (1.0 + rand_jitter() * 0.25)
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay_ms as u64)
    }

    /// Executes an async operation, retrying failures for which `retryable`
    /// returns true.
    pub async fn execute<F, Fut, T, E, P>(&self, mut f: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Debug,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if !retryable(&e) {
                        return Err(e);
                    }
                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            attempt,
                            max_attempts = self.max_attempts,
                            error = ?e,
                            "All retry attempts exhausted"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for_attempt(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = ?e,
                        "Retrying after delay"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Simple pseudo-random jitter in `[0, 1)`.
fn rand_jitter() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1000) / 1000.0
}

// =============================================================================
// BOUNDED STORE CALLS
// =============================================================================

/// Runs a store call under a deadline. An elapsed deadline is reported as
/// `TraitError::Timeout`, which is transient.
pub async fn with_deadline<T, Fut>(limit: Duration, fut: Fut) -> Result<T, TraitError>
where
    Fut: Future<Output = Result<T, TraitError>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TraitError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(20), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig::default();
        let delay = config.delay_for_attempt(1);
        assert!(delay >= Duration::from_millis(100));
        assert!(delay <= Duration::from_millis(125));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, TraitError> = fast()
            .execute(
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(TraitError::Busy("locked".into()))
                    } else {
                        Ok(n)
                    }
                },
                TraitError::is_transient,
            )
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TraitError> = fast()
            .execute(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TraitError::Timeout)
                },
                TraitError::is_transient,
            )
            .await;
        assert!(matches!(result, Err(TraitError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), TraitError> = fast()
            .execute(
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(TraitError::ParseError("bad row".into()))
                },
                TraitError::is_transient,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_reports_timeout() {
        let result: Result<(), TraitError> = with_deadline(Duration::from_millis(5), async {
            sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(TraitError::Timeout)));
    }

    proptest::proptest! {
        #[test]
        fn prop_delay_capped_by_max(
            attempt in 1u32..64,
            initial in 1u64..1000,
            max in 1u64..20_000,
        ) {
            let config = RetryConfig {
                max_attempts: 3,
                initial_delay_ms: initial,
                max_delay_ms: max,
                backoff_multiplier: 2.0,
                jitter: false,
            };
            proptest::prop_assert!(config.delay_for_attempt(attempt) <= Duration::from_millis(max));
        }
    }
}
