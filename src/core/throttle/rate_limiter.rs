//! Shared request pacing
//!
//! One [`RateLimiter`] is created per run and shared by every worker. It keeps
//! the instant of the last grant and spaces grants at least `1/rps` apart.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lowest accepted requests-per-second value
pub const MIN_REQUESTS_PER_SECOND: f64 = 0.1;

/// Minimum-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    last_grant: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// Creates a limiter for the given rate
    ///
    /// Rates below [`MIN_REQUESTS_PER_SECOND`] (including zero, negative and
    /// NaN values) are clamped to the floor.
    pub fn new(requests_per_second: f64) -> Self {
        let rps = if requests_per_second.is_nan() {
            MIN_REQUESTS_PER_SECOND
        } else {
            requests_per_second.max(MIN_REQUESTS_PER_SECOND)
        };
        Self {
            last_grant: Mutex::new(None),
            min_interval: Duration::from_secs_f64(1.0 / rps),
        }
    }

    /// Minimum spacing between two grants
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits for the next free slot and returns the grant instant
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind each other.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_grant.lock().await;

        if let Some(previous) = *last {
            let next = previous + self.min_interval;
            if next > Instant::now() {
                tracing::trace!(wait_ms = (next - Instant::now()).as_millis() as u64, "Rate limiting");
                tokio::time::sleep_until(next).await;
            }
        }

        let granted = Instant::now();
        *last = Some(granted);
        granted
    }
}
