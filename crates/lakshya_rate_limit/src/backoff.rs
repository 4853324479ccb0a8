//! Backoff schedule derived from a retry policy.

use lakshya_core::RetryPolicy;
use std::time::Duration;

/// Iterator over the delays between attempts.
///
/// Yields `max_attempts - 1` delays; the k-th is
/// `base_delay_ms × backoff_multiplier^k`. Used as the strategy for
/// `tokio_retry2::Retry`.
///
/// # Examples
///
/// ```
/// use lakshya_core::RetryPolicy;
/// use lakshya_rate_limit::BackoffSchedule;
/// use std::time::Duration;
///
/// let schedule = BackoffSchedule::new(&RetryPolicy::default());
/// let delays: Vec<_> = schedule.collect();
/// assert_eq!(delays, vec![Duration::from_millis(2000), Duration::from_millis(4000)]);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: RetryPolicy,
    next_attempt: u32,
}

impl BackoffSchedule {
    /// Schedule for `policy`, starting before the first retry.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            policy: policy.clone(),
            next_attempt: 0,
        }
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.next_attempt >= self.policy.max_retries() {
            return None;
        }
        let delay = self.policy.delay_for(self.next_attempt);
        self.next_attempt += 1;
        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.policy.max_retries().saturating_sub(self.next_attempt) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BackoffSchedule {}
