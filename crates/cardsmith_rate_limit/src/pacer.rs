//! Fixed-interval pacing across all credentials.
//!
//! Uses the governor crate (GCRA) with a burst of one, so at most one request
//! starts per interval process-wide. This complements the adaptive per-key
//! delay of [`crate::RateGovernor`]; it is off unless
//! `governor.global_interval_ms` is configured.

use crate::GovernorConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide minimum interval between request starts.
///
/// # Example
///
/// ```rust,no_run
/// use cardsmith_rate_limit::IntervalPacer;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pacer = IntervalPacer::new(Duration::from_secs(1));
/// pacer.wait().await; // immediate
/// pacer.wait().await; // about one second later
/// # }
/// ```
#[derive(Clone, Default)]
pub struct IntervalPacer {
    limiter: Option<Arc<DirectRateLimiter>>,
    interval: Option<Duration>,
}

impl std::fmt::Debug for IntervalPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalPacer")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl IntervalPacer {
    /// Pace request starts to one per `interval`. A zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(|quota| Arc::new(RateLimiter::direct(quota)));
        debug!(
            interval_ms = interval.as_millis() as u64,
            enabled = limiter.is_some(),
            "Creating interval pacer"
        );
        Self {
            interval: limiter.as_ref().map(|_| interval),
            limiter,
        }
    }

    /// Pacer that never waits.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Pacer for `governor.global_interval_ms`, disabled when unset.
    pub fn from_config(config: &GovernorConfig) -> Self {
        config
            .global_interval()
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Configured interval, if pacing is enabled.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Wait until the next request may start.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
            trace!("Interval pacer released request");
        }
    }

    /// Claim a slot without waiting. Returns false if a request started
    /// less than one interval ago.
    pub fn try_pass(&self) -> bool {
        self.limiter
            .as_ref()
            .is_none_or(|limiter| limiter.check().is_ok())
    }
}
