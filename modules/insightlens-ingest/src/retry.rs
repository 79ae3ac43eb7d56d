use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{AdapterError, Result};

pub(crate) const MAX_ATTEMPTS: u32 = 3;
pub(crate) const RETRY_BASE: Duration = Duration::from_secs(1);

/// Retry `op` on rate-limit signals only: up to [`MAX_ATTEMPTS`] total
/// attempts, sleeping `RETRY_BASE * 2^attempt` between them (1s, then 2s).
/// Any other outcome (success or a different error) returns immediately;
/// exhaustion returns the final `RateLimited` for the caller to demote.
pub(crate) async fn with_rate_limit_retry<T, F, Fut>(label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(AdapterError::RateLimited) if attempt + 1 < MAX_ATTEMPTS => {
                let backoff = RETRY_BASE * 2u32.pow(attempt);
                warn!(
                    label,
                    attempt = attempt + 1,
                    backoff_secs = backoff.as_secs(),
                    "Rate limited, backing off"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_three_attempts_with_full_backoff() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<()> = with_rate_limit_retry("test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AdapterError::RateLimited) }
        })
        .await;

        assert!(matches!(result, Err(AdapterError::RateLimited)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3, "exactly three total attempts");
        assert!(
            started.elapsed() >= Duration::from_secs(3),
            "backoff floor is 1s + 2s"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_rate_limit_retry("test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(7u32) }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_when_rate_limit_clears() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_rate_limit_retry("test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AdapterError::RateLimited)
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_do_not_retry() {
        let attempts = AtomicU32::new(0);

        let result: Result<()> = with_rate_limit_retry("test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AdapterError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(AdapterError::Api { status: 500, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
