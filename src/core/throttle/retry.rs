//! Retry with exponential backoff and jitter
//!
//! Every attempt goes through the shared [`RateLimiter`], so a task that
//! retries three times consumes four rate-limiter slots.

use super::rate_limiter::RateLimiter;
use crate::domain::Result;
use crate::log_retry_attempt;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const JITTER_MIN: f64 = 0.7;
const JITTER_MAX: f64 = 1.3;

/// Retry policy for remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Base delay, doubled for every attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Backoff after the given zero-based failed attempt
    ///
    /// `base * 2^attempt * jitter`, jitter drawn from `[0.7, 1.3)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(JITTER_MIN..JITTER_MAX);
        let factor = 2f64.powi(attempt.min(30) as i32) * jitter;
        self.base_delay.mul_f64(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(700))
    }
}

/// Runs fallible remote calls under a [`RetryPolicy`] and a shared [`RateLimiter`]
#[derive(Debug, Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    limiter: Arc<RateLimiter>,
}

impl Retrier {
    /// Creates a new retrier
    pub fn new(policy: RetryPolicy, limiter: Arc<RateLimiter>) -> Self {
        Self { policy, limiter }
    }

    /// The configured policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` until it succeeds or attempts are exhausted
    ///
    /// The last error is returned unchanged.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            self.limiter.acquire().await;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt);
                    attempt += 1;
                    log_retry_attempt!(
                        attempt,
                        self.policy.max_attempts(),
                        delay.as_millis() as u64,
                        &e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeneratorError, TriadError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn fast_retrier(max_retries: u32) -> Retrier {
        Retrier::new(
            RetryPolicy::new(max_retries, Duration::from_millis(1)),
            Arc::new(RateLimiter::new(1000.0)),
        )
    }

    fn failure(n: u32) -> TriadError {
        GeneratorError::ServerError {
            status: 503,
            message: format!("attempt {n}"),
        }
        .into()
    }

    #[test]
    fn test_backoff_bounds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));

        for _ in 0..50 {
            let first = policy.backoff(0);
            assert!(first >= Duration::from_millis(70) && first < Duration::from_millis(130));

            let third = policy.backoff(2);
            assert!(third >= Duration::from_millis(280) && third < Duration::from_millis(520));
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.base_delay, Duration::from_millis(700));
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let retrier = fast_retrier(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = retrier
            .run(move || async move {
                let calls = counter;
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= 3 {
                    Err(failure(n))
                } else {
                    Ok("generated")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "generated");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_return_last_error() {
        let retrier = fast_retrier(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = retrier
            .run(move || async move {
                let calls = counter;
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(failure(n))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(TriadError::Generator(GeneratorError::ServerError { status, message })) => {
                assert_eq!(status, 503);
                assert_eq!(message, "attempt 4");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_makes_one_call() {
        let retrier = fast_retrier(0);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = retrier
            .run(move || async move {
                let calls = counter;
                calls.fetch_add(1, Ordering::SeqCst);
                Err(failure(1))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_attempt_is_rate_limited() {
        let retrier = Retrier::new(
            RetryPolicy::new(2, Duration::from_millis(0)),
            Arc::new(RateLimiter::new(20.0)),
        );
        let start = Instant::now();

        let _: Result<()> = retrier.run(|| async { Err(failure(0)) }).await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
