//! Bounded retry of rate-limited operations.
//!
//! Each attempt of an operation is tagged as an [`AttemptOutcome`]. Only
//! [`AttemptOutcome::RetryableFailure`] is retried, after an exponential
//! backoff with uniform jitter; the loop is driven by tokio-retry2 with a
//! [`BackoffSchedule`] as its strategy. A retryable failure on the final
//! allowed attempt becomes a [`RetriesExhausted`] error.

use crate::RateLimitSignal;
use cardsmith_core::RetryPolicy;
use cardsmith_error::{GenerationError, GenerationResult, RetriesExhausted};
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The attempt produced a value
    Success(T),
    /// The attempt was rate limited and may be retried
    RetryableFailure(E),
    /// The attempt failed for any other reason
    FatalFailure(E),
}

impl<T, E> AttemptOutcome<T, E> {
    /// Tag a plain result, classifying failures by their status and message.
    pub fn classify(result: Result<T, E>) -> Self
    where
        E: RateLimitSignal,
    {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) if err.is_rate_limited() => AttemptOutcome::RetryableFailure(err),
            Err(err) => AttemptOutcome::FatalFailure(err),
        }
    }

    /// Whether the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

impl<T> AttemptOutcome<T, GenerationError> {
    /// Tag a generation result by its error kind alone.
    ///
    /// Only [`cardsmith_error::GenerationErrorKind::RateLimited`] is retryable.
    pub fn from_generation(result: GenerationResult<T>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) if err.kind.is_rate_limited() => AttemptOutcome::RetryableFailure(err),
            Err(err) => AttemptOutcome::FatalFailure(err),
        }
    }
}

/// Backoff delays between attempts: `base_delay * 2^n + jitter` for
/// `n` in `0..max_retries`.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: RetryPolicy,
    attempt: u32,
}

impl BackoffSchedule {
    /// Schedule for a policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= *self.policy.max_retries() {
            return None;
        }
        let base = self.policy.backoff(self.attempt);
        let delay = base.saturating_add(jitter(*self.policy.max_jitter()));
        self.attempt += 1;
        debug!(
            retry = self.attempt,
            delay_ms = delay.as_millis() as u64,
            "Computed backoff"
        );
        Some(delay)
    }
}

/// Uniform random duration in `[0, max]`.
fn jitter(max: Duration) -> Duration {
    let max_micros = u64::try_from(max.as_micros()).unwrap_or(u64::MAX);
    if max_micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::thread_rng().gen_range(0..=max_micros))
}

/// Drives the bounded retry loop around caller operations.
///
/// # Example
///
/// ```rust,no_run
/// use cardsmith_core::RetryPolicy;
/// use cardsmith_error::{GenerationError, GenerationErrorKind};
/// use cardsmith_rate_limit::RetryExecutor;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), GenerationError> {
/// let executor = RetryExecutor::new(RetryPolicy::default());
///
/// let text = executor
///     .execute(|| async {
///         Err::<String, _>(GenerationError::new(GenerationErrorKind::RateLimited {
///             status_code: 429,
///             message: "slow down".to_string(),
///         }))
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Executor for a policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation`, retrying failures the classifier marks as rate limited.
    ///
    /// # Errors
    ///
    /// Returns the first non-rate-limit failure unchanged, or the
    /// `From<RetriesExhausted>` conversion when every allowed attempt was
    /// rate limited.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RateLimitSignal + From<RetriesExhausted> + Display,
    {
        self.execute_classified(move || {
            let attempt = operation();
            async move { AttemptOutcome::classify(attempt.await) }
        })
        .await
    }

    /// Run an operation that tags its own outcome.
    ///
    /// At most `max_retries + 1` attempts are made. A
    /// [`AttemptOutcome::FatalFailure`] ends the loop immediately.
    ///
    /// # Errors
    ///
    /// Returns the fatal failure unchanged, or the `From<RetriesExhausted>`
    /// conversion when the final allowed attempt was still retryable.
    #[instrument(skip_all, fields(max_retries = *self.policy.max_retries()))]
    pub async fn execute_classified<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome<T, E>>,
        E: From<RetriesExhausted> + Display,
    {
        let max_retries = *self.policy.max_retries();
        let total = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        let action = move || {
            let current = attempt;
            attempt = attempt.saturating_add(1);
            let pending = operation();
            async move {
                match pending.await {
                    AttemptOutcome::Success(value) => {
                        if current > 0 {
                            debug!(attempt = current + 1, total, "Succeeded after retry");
                        }
                        Ok(value)
                    }
                    AttemptOutcome::FatalFailure(err) => {
                        debug!(attempt = current + 1, error = %err, "Non-retryable failure");
                        Err(RetryError::Permanent(err))
                    }
                    AttemptOutcome::RetryableFailure(err) if current >= max_retries => {
                        warn!(attempts = current + 1, error = %err, "Retry budget exhausted");
                        Err(RetryError::Permanent(E::from(RetriesExhausted {
                            attempts: current + 1,
                            last_error: err.to_string(),
                        })))
                    }
                    AttemptOutcome::RetryableFailure(err) => {
                        warn!(
                            attempt = current + 1,
                            total,
                            error = %err,
                            "Rate limited, retrying"
                        );
                        Err(RetryError::Transient {
                            err,
                            retry_after: None,
                        })
                    }
                }
            }
        };

        Retry::spawn(BackoffSchedule::new(self.policy), action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_yields_one_delay_per_retry() {
        let policy = RetryPolicy::builder()
            .max_retries(3)
            .base_delay(Duration::from_millis(100))
            .max_jitter(Duration::ZERO)
            .build();

        let delays: Vec<_> = BackoffSchedule::new(policy).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn jitter_stays_within_bound() {
        let max = Duration::from_millis(1000);
        for _ in 0..1000 {
            assert!(jitter(max) <= max);
        }
        assert_eq!(jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn zero_retries_schedule_is_empty() {
        let policy = RetryPolicy::new(0, Duration::from_secs(2));
        assert_eq!(BackoffSchedule::new(policy).count(), 0);
    }
}
