//! Retry policy for outbound polls.
//!
//! # Design Decisions
//! - Attempts are counted per poll iteration, including the first
//! - `max_attempts = 1` means a failure is final
//! - Only transport errors are retried; any HTTP response counts as an answer

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt may follow failed attempt `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(policy, RetryPolicy { max_attempts: 1, base_delay_ms: 500, max_delay_ms: 5_000 });
        assert!(!policy.should_retry(1));
    }

    #[test]
    fn test_bounded_attempts() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        });
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(policy.backoff(2).as_millis() >= 20);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        });
        assert_eq!(policy.max_attempts(), 1);
    }
}
