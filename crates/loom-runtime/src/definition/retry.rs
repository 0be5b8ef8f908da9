//! Per-node retry policy.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Retry policy for a node that fails during execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first), 1 disables retrying.
    #[builder(default = "3")]
    pub max_attempts: u32,
    /// Backoff strategy between attempts.
    #[builder(default)]
    pub backoff: BackoffPolicy,
}

impl RetryPolicyBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_attempts
            && max == 0
        {
            return Err("max_attempts must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffPolicy::Fixed {
                delay: Duration::from_secs(0),
            },
        }
    }

    /// Returns whether another attempt is permitted after `attempt` failed attempts.
    pub const fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Returns the delay to wait before the next attempt, 1-indexed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.delay_for(attempt)
    }
}

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// A constant delay between attempts.
    Fixed {
        /// Delay applied before every retry.
        delay: Duration,
    },
    /// An exponentially growing delay, capped at `max_delay`.
    Exponential {
        /// Delay before the first retry.
        base_delay: Duration,
        /// Upper bound on the computed delay.
        max_delay: Duration,
    },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::Exponential {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// Returns the delay before the given 1-indexed retry attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
            Self::Exponential {
                base_delay,
                max_delay,
            } => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                base_delay.saturating_mul(factor).min(*max_delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_policy_never_retries() {
        let policy = RetryPolicy::none();
        assert!(!policy.allows_retry(1));
    }

    #[test]
    fn exponential_backoff_grows_and_caps() {
        let backoff = BackoffPolicy::Exponential {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(backoff.delay_for(1), Duration::from_secs(1));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(2));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(4));
        assert_eq!(backoff.delay_for(10), Duration::from_secs(10));
    }

    #[test]
    fn default_policy_allows_three_attempts() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(1));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
    }
}
