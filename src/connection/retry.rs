//! Reconnect backoff policy
//!
//! Bounded attempt counter with exponential backoff: reset on a successful
//! open, incremented per failed attempt, delay capped, and `None` once the
//! budget is spent.

use std::time::Duration;

use crate::config::RetryConfig;

/// Exponential backoff: `min(max_delay, base_delay * 2^attempt)`
pub fn backoff_delay(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> Duration {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    Duration::from_millis(exponential.min(max_delay_ms))
}

/// Tracks reconnect attempts between successful opens
#[derive(Debug)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Attempts since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Called on a successful open
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Register a failure. Returns how long to wait before the next
    /// attempt, or `None` when the retry budget is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.config.max_retries {
            return None;
        }
        let delay = backoff_delay(self.attempt, self.config.base_delay_ms, self.config.max_delay_ms);
        self.attempt += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
        }
    }

    #[test]
    fn backoff_grows_exponentially() {
        assert_eq!(backoff_delay(0, 1000, 60_000), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1, 1000, 60_000), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2, 1000, 60_000), Duration::from_millis(4000));
        assert_eq!(backoff_delay(3, 1000, 60_000), Duration::from_millis(8000));
    }

    #[test]
    fn backoff_caps_at_max() {
        assert_eq!(backoff_delay(10, 1000, 60_000), Duration::from_millis(60_000));
    }

    #[test]
    fn backoff_high_attempt_no_overflow() {
        let delay = backoff_delay(100, 1000, 60_000);
        assert_eq!(delay, Duration::from_millis(60_000));
    }

    #[test]
    fn policy_counts_and_exhausts() {
        let mut policy = RetryPolicy::new(config(3));
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert_eq!(policy.attempt(), 3);
        assert!(policy.next_delay().is_none());
        // Still exhausted on a repeated ask
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn policy_resets_on_success() {
        let mut policy = RetryPolicy::new(config(2));
        policy.next_delay();
        policy.next_delay();
        assert!(policy.next_delay().is_none());

        policy.reset();
        assert_eq!(policy.attempt(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn zero_budget_never_retries() {
        let mut policy = RetryPolicy::new(config(0));
        assert!(policy.next_delay().is_none());
    }
}
