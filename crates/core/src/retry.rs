//! Bounded retry policy with linear backoff.

use std::time::Duration;

/// Maximum attempts for session creation under lock contention.
pub const SESSION_CREATE_MAX_ATTEMPTS: u32 = 3;

/// Backoff unit for session creation retries.
pub const SESSION_CREATE_BACKOFF: Duration = Duration::from_millis(100);

/// How many times to try an operation and how long to wait in between.
///
/// Attempt numbers are zero-based. The first attempt runs immediately and
/// attempt `n` waits `base_delay * n` before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// The policy used when creating sessions.
    pub const fn session_create() -> Self {
        Self::new(SESSION_CREATE_MAX_ATTEMPTS, SESSION_CREATE_BACKOFF)
    }

    /// Delay to wait before running `attempt`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::session_create()
    }
}
