//! Retry policy for the rate-limit retry executor.

use std::time::Duration;

/// Immutable retry configuration.
///
/// `max_retries` counts retries, so an operation is attempted at most
/// `max_retries + 1` times. Before retry `n` (zero-based) the executor sleeps
/// `base_delay * 2^n` plus a uniform jitter in `[0, max_jitter]`.
///
/// # Examples
///
/// ```
/// use cardsmith_core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_retries(), 5);
/// assert_eq!(*policy.base_delay(), Duration::from_secs(2));
/// assert_eq!(policy.backoff(3), Duration::from_secs(16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    max_retries: u32,

    /// Backoff before the first retry.
    base_delay: Duration,

    /// Upper bound of the random jitter added to each backoff.
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(2000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default jitter bound.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Creates a new retry policy builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Exponential backoff before retry `attempt`, without jitter.
    ///
    /// Saturates instead of overflowing for large attempt numbers.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Builder for `RetryPolicy`.
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    max_retries: Option<u32>,
    base_delay: Option<Duration>,
    max_jitter: Option<Duration>,
}

impl RetryPolicyBuilder {
    /// Sets the retry count.
    pub fn max_retries(mut self, value: u32) -> Self {
        self.max_retries = Some(value);
        self
    }

    /// Sets the base backoff.
    pub fn base_delay(mut self, value: Duration) -> Self {
        self.base_delay = Some(value);
        self
    }

    /// Sets the jitter bound. Zero disables jitter.
    pub fn max_jitter(mut self, value: Duration) -> Self {
        self.max_jitter = Some(value);
        self
    }

    /// Builds the `RetryPolicy`, filling unset fields with defaults.
    pub fn build(self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base_delay: self.base_delay.unwrap_or(defaults.base_delay),
            max_jitter: self.max_jitter.unwrap_or(defaults.max_jitter),
        }
    }
}
