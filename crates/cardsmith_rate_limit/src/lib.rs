//! Outbound request governing for rate-limited generation APIs.
//!
//! This crate spaces out and retries calls to an API whose rate limit is not
//! known in advance:
//! - [`is_rate_limited`] classifies a failure as rate-limit related or not
//! - [`RateGovernor`] learns a per-credential delay from observed 429s and
//!   suspends callers until it is safe to issue the next request
//! - [`IntervalPacer`] optionally enforces a fixed process-wide interval
//! - [`RetryExecutor`] retries rate-limited attempts with exponential
//!   backoff and jitter, and never retries anything else
//!
//! ## Typical flow
//!
//! ```rust,ignore
//! use cardsmith_rate_limit::{AttemptOutcome, RateGovernor, RetryExecutor};
//!
//! let governor = RateGovernor::default();
//! let executor = RetryExecutor::default();
//!
//! let text = executor
//!     .execute_classified(|| async {
//!         let turn = governor.await_turn(&api_key).await;
//!         let result = client.generate_once(&profile, &prompt, &api_key).await;
//!         turn.record(matches!(&result, Err(e) if e.kind.is_rate_limited()));
//!         AttemptOutcome::from_generation(result)
//!     })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adaptive;
mod classifier;
mod config;
mod executor;
mod pacer;

pub use adaptive::{RateGovernor, Turn, redact_key};
pub use classifier::{FailureReport, RATE_LIMIT_MARKERS, RateLimitSignal, is_rate_limited};
pub use config::{
    AnalyticsConfig, CardsmithConfig, GeminiConfig, GovernorConfig, MAX_INCREASE_FACTOR,
    RetryConfig,
};
pub use executor::{AttemptOutcome, BackoffSchedule, RetryExecutor};
pub use pacer::IntervalPacer;
