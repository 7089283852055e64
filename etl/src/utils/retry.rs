//! Async retry utilities with exponential backoff

use std::time::Duration;

/// Task-level retry parameters for pipeline stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Double the delay after every failed retry
    pub exponential_backoff: bool,
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
            exponential_backoff: false,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.delay;
        }
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.delay.saturating_mul(factor)
    }
}

/// Retry an async operation according to `policy`.
///
/// `should_retry` decides whether a given error is worth another attempt;
/// permanent errors are returned immediately.
///
/// Returns `Ok((value, attempts))` on success, or `Err((error, attempts))` on failure.
pub async fn retry_with_backoff_async<F, Fut, T, E, R>(
    policy: &RetryPolicy,
    should_retry: R,
    mut operation: F,
) -> Result<(T, u32), (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok((value, attempts)),
            Err(e) => {
                if attempts >= policy.max_attempts() || !should_retry(&e) {
                    return Err((e, attempts));
                }
                let delay = policy.delay_after(attempts);
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Retrying after error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            delay: Duration::from_millis(1),
            exponential_backoff: true,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_try() {
        let result = retry_with_backoff_async(&fast(2), |_: &&str| true, || async {
            Ok::<_, &str>(7)
        })
        .await;
        assert_eq!(result, Ok((7, 1)));
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let calls = Cell::new(0);
        let result = retry_with_backoff_async(&fast(3), |_: &&str| true, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 2 {
                    Err("transient error")
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert_eq!(result, Ok(((), 2)));
    }

    #[tokio::test]
    async fn test_failure_after_max_retries() {
        let result = retry_with_backoff_async(&fast(2), |_: &&str| true, || async {
            Err::<(), _>("persistent error")
        })
        .await;
        let (error, attempts) = result.unwrap_err();
        assert_eq!(error, "persistent error");
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = Cell::new(0);
        let result = retry_with_backoff_async(&fast(5), |_: &&str| false, || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>("bad input") }
        })
        .await;
        assert_eq!(result, Err(("bad input", 1)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_delay_after_exponential() {
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::from_secs(300),
            exponential_backoff: true,
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(300));
        assert_eq!(policy.delay_after(2), Duration::from_secs(600));
        assert_eq!(policy.delay_after(3), Duration::from_secs(1200));
    }

    #[test]
    fn test_delay_after_fixed() {
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::from_secs(5),
            exponential_backoff: false,
        };
        assert_eq!(policy.delay_after(3), Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }
}
