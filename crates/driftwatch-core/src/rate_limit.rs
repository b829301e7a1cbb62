//! Token-bucket rate limiting for upstream API calls.
//!
//! Each upstream service gets its own [`RateLimiter`], constructor-injected
//! into the service client. The bucket starts full, so a burst of up to
//! `capacity` requests passes with no delay; after that, callers sleep until
//! the bucket refills at the configured rate.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Token bucket state. Mutated only under the limiter's mutex.
struct TokenBucket {
    /// Available tokens. Never negative after an acquire completes,
    /// never above `capacity`.
    tokens: f64,

    /// Maximum tokens (bucket size).
    capacity: f64,

    /// Refill rate (tokens per second). Must be > 0.
    rate: f64,

    /// Last refill timestamp (monotonic).
    last_refill: Instant,
}

impl TokenBucket {
    fn new(rate: f64, capacity: f64) -> Self {
        Self {
            tokens: capacity,
            capacity,
            rate,
            last_refill: Instant::now(),
        }
    }

    /// Refill tokens based on elapsed time, capped at `capacity`.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Try to consume a token. Returns the wait time until one is available
    /// when the bucket is empty.
    fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let wait_secs = (1.0 - self.tokens) / self.rate;
            Err(Duration::from_secs_f64(wait_secs))
        }
    }
}

/// Token-bucket rate limiter shared by all page-fetch tasks of one service.
///
/// The mutex covers only the refill+decrement arithmetic; the sleep happens
/// with the lock released, so a waiting task does not block other tasks'
/// token bookkeeping.
pub struct RateLimiter {
    /// Service name used in the wait notice (e.g. "Syncro API").
    name: String,

    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Create a limiter with `capacity = rate` (one second worth of burst).
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive (the wait-time computation
    /// divides by it). Because the capacity equals the rate here, rates
    /// below one token per second must use [`with_burst`](Self::with_burst)
    /// with an explicit capacity of at least one.
    pub fn new(rate: f64, name: impl Into<String>) -> Self {
        Self::with_burst(rate, rate, name)
    }

    /// Create a limiter with an explicit burst capacity.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive, or if `capacity` is below
    /// one token. A bucket that can never hold a whole token would make
    /// [`acquire`](Self::acquire) wait forever.
    pub fn with_burst(rate: f64, capacity: f64, name: impl Into<String>) -> Self {
        assert!(rate > 0.0, "rate limiter rate must be > 0");
        assert!(capacity >= 1.0, "rate limiter capacity must be >= 1");
        Self {
            name: name.into(),
            bucket: Mutex::new(TokenBucket::new(rate, capacity)),
        }
    }

    /// Service name this limiter was created for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquire one token, sleeping until the bucket refills if necessary.
    ///
    /// Never rejects a request; callers that need cancellation or a deadline
    /// must wrap the returned future themselves.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                match bucket.try_acquire() {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };

            debug!(
                service = %self.name,
                wait_secs = format!("{:.1}", wait.as_secs_f64()),
                "rate limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
