//! Request pacing
//!
//! The harvester issues one request at a time and sleeps a fixed interval
//! after each one. There is no per-domain state, no concurrency and no
//! backoff: the delay is the whole politeness policy.

use std::time::Duration;

/// Fixed-delay rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    waits: u64,
}

impl RateLimiter {
    /// Creates a limiter that sleeps `delay` after each request
    pub fn new(delay: Duration) -> Self {
        Self { delay, waits: 0 }
    }

    /// Creates a limiter from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// The configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of times `wait` has been called
    pub fn waits(&self) -> u64 {
        self.waits
    }

    /// Sleeps for the configured delay
    ///
    /// A zero delay returns immediately.
    pub async fn wait(&mut self) {
        self.waits += 1;
        if self.delay.is_zero() {
            return;
        }
        tracing::debug!("Rate limiting for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
