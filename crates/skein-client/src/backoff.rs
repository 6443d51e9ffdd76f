//! Backoff delay policies for recovery retries
//!
//! Recovery jobs ask the policy for a delay before each attempt. A policy is
//! a stateless value: the caller passes the 1-based attempt number, so one
//! policy instance can be shared by any number of independent recovery jobs
//! without cross-talk.
//!
//! A policy built with a timeout starts returning [`BackOffDelayPolicy::TIMEOUT`]
//! once the attempt budget is exhausted; callers interpret the sentinel as
//! "stop retrying".

use std::time::Duration;

/// Delay policy for recovery attempts.
///
/// # Example
///
/// ```
/// use skein_client::BackOffDelayPolicy;
/// use std::time::Duration;
///
/// let policy = BackOffDelayPolicy::fixed_with_initial_delay(
///     Duration::from_secs(5),
///     Duration::from_secs(1),
/// );
/// assert_eq!(policy.delay(1), Duration::from_secs(5));
/// assert_eq!(policy.delay(2), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackOffDelayPolicy {
    initial_delay: Duration,
    delay: Duration,
    attempt_limit: Option<u32>,
}

impl BackOffDelayPolicy {
    /// Sentinel returned once a policy with a timeout is exhausted.
    ///
    /// Numerically the maximum representable duration; never slept on.
    pub const TIMEOUT: Duration = Duration::MAX;

    /// Same delay for every attempt
    pub fn fixed(delay: Duration) -> Self {
        Self::fixed_with_initial_delay(delay, delay)
    }

    /// One initial delay, then a fixed delay for every further attempt
    pub fn fixed_with_initial_delay(initial_delay: Duration, delay: Duration) -> Self {
        Self {
            initial_delay,
            delay,
            attempt_limit: None,
        }
    }

    /// Like [`fixed_with_initial_delay`](Self::fixed_with_initial_delay),
    /// but gives up once the cumulative delay would exceed `timeout`: after
    /// `(timeout - initial_delay) / delay + 1` attempts, `delay()` returns
    /// the [`TIMEOUT`](Self::TIMEOUT) sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `timeout < initial_delay` or `delay` is zero.
    pub fn fixed_with_initial_delay_and_timeout(
        initial_delay: Duration,
        delay: Duration,
        timeout: Duration,
    ) -> Self {
        assert!(
            timeout >= initial_delay,
            "timeout must be at least as long as the initial delay"
        );
        assert!(!delay.is_zero(), "delay must be non-zero");
        let budget = timeout - initial_delay;
        let attempt_limit = (budget.as_millis() / delay.as_millis()) as u32 + 1;
        Self {
            initial_delay,
            delay,
            attempt_limit: Some(attempt_limit),
        }
    }

    /// Delay before the given recovery attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.initial_delay;
        }
        match self.attempt_limit {
            Some(limit) if attempt > limit => Self::TIMEOUT,
            _ => self.delay,
        }
    }
}
