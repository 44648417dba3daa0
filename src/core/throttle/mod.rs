//! Request pacing and retry

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateLimiter, MIN_REQUESTS_PER_SECOND};
pub use retry::{Retrier, RetryPolicy};
