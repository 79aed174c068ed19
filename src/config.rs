use std::time::Duration;

use crate::SkillError;

/// Retry behavior for remote calls.
///
/// Values are validated once, at construction, and cannot change afterwards:
/// `max_retries` is positive, `initial_delay` is non-zero and never exceeds
/// `max_delay`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryConfig {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryConfig {
    /// Builds a validated retry configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Config`] when `max_retries` is zero,
    /// `initial_delay` is zero, or `max_delay` is shorter than
    /// `initial_delay`. `max_delay == initial_delay` is accepted.
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, SkillError> {
        if max_retries == 0 {
            return Err(SkillError::Config(
                "max_retries must be positive".to_owned(),
            ));
        }
        if initial_delay.is_zero() {
            return Err(SkillError::Config(
                "initial_delay must be positive".to_owned(),
            ));
        }
        if max_delay < initial_delay {
            return Err(SkillError::Config(
                "max_delay must be >= initial_delay".to_owned(),
            ));
        }
        Ok(Self {
            max_retries,
            initial_delay,
            max_delay,
        })
    }

    /// Total number of attempts for one logical call.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff delay before the second attempt.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Upper bound on any single backoff delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(10_000),
        }
    }
}
