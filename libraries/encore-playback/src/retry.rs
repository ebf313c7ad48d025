//! Bounded retry policy for failed playback attempts
//!
//! Only device failures of a retryable kind are re-attempted. Everything
//! else, and anything past the ceiling, skips to the next queued track.

use crate::config::SessionConfig;
use crate::error::PlaybackError;
use std::time::Duration;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-attempt the same track after `backoff`
    Retry {
        /// Retry number (1-based)
        attempt: u32,
        backoff: Duration,
    },

    /// Give up on this track and advance
    Skip,
}

/// Retry ceiling and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    max_retries: u32,

    /// Linear backoff step
    backoff_step: Duration,

    /// Backoff cap
    backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_step: Duration, backoff_max: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
            backoff_max,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
            Duration::from_millis(config.retry_backoff_max_ms),
        )
    }

    /// Whether `error` is a transient failure worth re-attempting
    pub fn is_retryable(error: &PlaybackError) -> bool {
        matches!(error, PlaybackError::Device(e) if e.is_retryable())
    }

    /// Decide after a failure, given the retries already spent on this track
    pub fn decide(&self, error: &PlaybackError, retries_done: u32) -> RetryDecision {
        if !Self::is_retryable(error) || retries_done >= self.max_retries {
            return RetryDecision::Skip;
        }

        let attempt = retries_done + 1;
        RetryDecision::Retry {
            attempt,
            backoff: self.backoff(attempt),
        }
    }

    /// Backoff before retry number `attempt`, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step
            .saturating_mul(attempt)
            .min(self.backoff_max)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
