//! Retry policy for outbound generation calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 2000;
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Bounded retry with exponential backoff.
///
/// The delay before retry `k` (0-indexed) is
/// `base_delay_ms × backoff_multiplier^k`. Only the attempt index feeds the
/// schedule, never the wall-clock time spent waiting on the backend.
///
/// # Examples
///
/// ```
/// use lakshya_core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_attempts(), 3);
/// assert_eq!(policy.delay_for(0), Duration::from_millis(2000));
/// assert_eq!(policy.delay_for(1), Duration::from_millis(4000));
///
/// let quick = RetryPolicy::builder()
///     .max_attempts(5)
///     .base_delay_ms(100)
///     .build()
///     .unwrap();
/// assert_eq!(*quick.backoff_multiplier(), 2.0);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(default)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first (at least 1).
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,

    /// Factor applied to the delay for every subsequent retry.
    #[serde(default = "default_backoff_multiplier")]
    backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy builder; unset fields keep their defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` or `base_delay_ms` is zero, or if
    /// the multiplier would not make delays strictly increase.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be positive".to_string());
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(format!(
                "backoff_multiplier must be a finite number greater than 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }

    /// Number of retries the policy allows after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }

    /// Delay to wait after attempt `attempt` was rate limited.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let millis = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        // Float to integer casts saturate, so huge schedules clamp to u64::MAX.
        Duration::from_millis(millis.round() as u64)
    }

    /// Every backoff delay the policy can produce, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries()).map(|attempt| self.delay_for(attempt))
    }

    /// Sum of all delays when every attempt is rate limited.
    pub fn worst_case_wait(&self) -> Duration {
        self.delays().sum()
    }
}
