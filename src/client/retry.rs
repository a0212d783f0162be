//! When and how long to wait before repeating a failed Arcade request.

use std::time::Duration;

use crate::Error;

/// Retry schedule for idempotent requests.
///
/// Only transient failures ([`Error::is_retryable`]) are repeated. Delays
/// double from `initial` up to `max_delay`, spread by a proportional jitter so
/// concurrent pollers do not retry in lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial: Duration,
    max_delay: Duration,
    jitter: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Fail on the first error.
    pub fn never() -> Self {
        Self::new(0)
    }

    pub fn with_delays(mut self, initial: Duration, max_delay: Duration) -> Self {
        self.initial = initial;
        self.max_delay = max_delay.max(initial);
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the next try after `error`, given how many retries were
    /// already spent; `None` when the error is final.
    pub fn next_delay(&self, retries: u32, error: &Error) -> Option<Duration> {
        if retries >= self.max_retries || !error.is_retryable() {
            return None;
        }
        Some(self.jittered(self.base_delay(retries)))
    }

    fn base_delay(&self, retries: u32) -> Duration {
        self.initial
            .saturating_mul(1u32 << retries.min(16))
            .min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter == 0.0 {
            return delay;
        }
        let spread = delay.mul_f64(self.jitter);
        delay - spread + spread.mul_f64(2.0 * rand::random::<f64>())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: 0.1,
        }
    }
}
