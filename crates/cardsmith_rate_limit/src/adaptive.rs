//! Adaptive per-credential request spacing.
//!
//! Each credential key owns a learned delay and the instant its last request
//! started. Observed rate limiting grows the delay multiplicatively, success
//! shrinks it multiplicatively, always within `[min_delay, max_delay]`.
//!
//! A caller's wait-then-request-then-record sequence is one critical section
//! per key: [`RateGovernor::await_turn`] returns a [`Turn`] that holds the
//! key's lock until the outcome is recorded, so two racing callers can never
//! both observe "proceed" within one delay window. Distinct keys never share
//! a lock.

use crate::GovernorConfig;
use cardsmith_error::ConfigError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

/// Learned state for one credential key.
#[derive(Debug)]
struct KeyState {
    /// Start of the last recorded request; `None` until the first outcome.
    last_request: Option<Instant>,
    /// Current spacing between requests.
    current_delay: Duration,
}

impl KeyState {
    fn new(initial_delay: Duration) -> Self {
        Self {
            last_request: None,
            current_delay: initial_delay,
        }
    }

    /// Time left before the next request may start.
    fn remaining_wait(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        self.current_delay.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Whether a fresh state would behave exactly like this one.
    fn is_idle(&self, now: Instant, initial_delay: Duration) -> bool {
        self.current_delay == initial_delay && self.remaining_wait(now).is_none()
    }

    fn apply(&mut self, config: &GovernorConfig, hit_rate_limit: bool) {
        self.last_request = Some(Instant::now());
        let previous = self.current_delay;
        let factor = if hit_rate_limit {
            config.increase_factor
        } else {
            config.decrease_factor
        };
        let scaled = Duration::try_from_secs_f64(previous.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX);
        self.current_delay = scaled.clamp(config.min_delay(), config.max_delay());

        if hit_rate_limit {
            warn!(
                previous_ms = previous.as_millis() as u64,
                delay_ms = self.current_delay.as_millis() as u64,
                "Increased request delay due to rate limiting"
            );
        } else {
            trace!(
                previous_ms = previous.as_millis() as u64,
                delay_ms = self.current_delay.as_millis() as u64,
                "Relaxed request delay"
            );
        }
    }
}

type KeySlot = Arc<AsyncMutex<KeyState>>;

/// Adaptive, per-credential request spacing.
///
/// Construct one governor at process start and share it (it is cheap to
/// clone; clones share state). Every request for a key should go through
/// [`RateGovernor::await_turn`] and finish with [`Turn::record`].
///
/// State is kept per key seen. Keys that have settled back to the initial
/// delay and are not in use are dropped whenever a new key is added, since
/// a fresh state behaves identically; see [`RateGovernor::prune_idle`].
///
/// # Example
///
/// ```rust,no_run
/// use cardsmith_rate_limit::RateGovernor;
///
/// # async fn call_api() -> Result<String, u16> { Ok(String::new()) }
/// # #[tokio::main]
/// # async fn main() {
/// let governor = RateGovernor::default();
///
/// let turn = governor.await_turn("api-key").await;
/// let result = call_api().await;
/// turn.record(matches!(result, Err(429)));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RateGovernor {
    config: GovernorConfig,
    keys: Arc<Mutex<HashMap<String, KeySlot>>>,
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self {
            config: GovernorConfig::default(),
            keys: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl RateGovernor {
    /// Create a governor from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured bounds or factors are invalid.
    #[instrument(skip(config))]
    pub fn new(config: GovernorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            default_delay_ms = config.default_delay_ms,
            min_delay_ms = config.min_delay_ms,
            max_delay_ms = config.max_delay_ms,
            "Creating rate governor"
        );
        Ok(Self {
            config,
            keys: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Configuration in effect.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Get or create the state slot for a key.
    ///
    /// The map lock is held only for the lookup, never across an await.
    fn slot(&self, key: &str) -> KeySlot {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = keys.get(key) {
            return slot.clone();
        }

        Self::retain_active(&mut keys, self.config.initial_delay());
        let slot = Arc::new(AsyncMutex::new(KeyState::new(self.config.initial_delay())));
        keys.insert(key.to_string(), slot.clone());
        slot
    }

    /// Drop idle keys, returning how many were removed.
    fn retain_active(keys: &mut HashMap<String, KeySlot>, initial_delay: Duration) -> usize {
        let before = keys.len();
        let now = Instant::now();
        keys.retain(|_, slot| {
            // Anyone else holding the slot may be about to lock it
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(state) => !state.is_idle(now, initial_delay),
                Err(_) => true,
            }
        });
        let removed = before - keys.len();
        if removed > 0 {
            trace!(removed, "Pruned idle keys");
        }
        removed
    }

    /// Forget keys whose state is indistinguishable from a fresh one.
    ///
    /// A key is idle when nobody holds its turn, its delay is back at the
    /// initial delay, and that delay has fully elapsed since its last
    /// request. Returns the number of keys removed.
    pub fn prune_idle(&self) -> usize {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        Self::retain_active(&mut keys, self.config.initial_delay())
    }

    /// Wait until it is safe to issue the next request for `key`.
    ///
    /// Returns immediately for a key that has never recorded an outcome.
    /// Otherwise suspends for `current_delay - elapsed` when the last
    /// request started less than `current_delay` ago. The returned [`Turn`]
    /// keeps other callers on the same key waiting until it is recorded or
    /// dropped.
    ///
    /// Cancelling this future releases the key without recording anything.
    #[instrument(skip(self, key), fields(key = %redact_key(key)))]
    pub async fn await_turn(&self, key: &str) -> Turn {
        let state = self.slot(key).lock_owned().await;

        if let Some(wait) = state.remaining_wait(Instant::now()) {
            debug!(
                wait_ms = wait.as_millis() as u64,
                "Rate limiting: waiting before next request"
            );
            tokio::time::sleep(wait).await;
        }

        Turn {
            state,
            config: self.config.clone(),
        }
    }

    /// Record the outcome of a request for `key` outside of a [`Turn`].
    ///
    /// Marks now as the last request start and adjusts the learned delay.
    /// Waits for any in-flight turn on the same key to finish first.
    #[instrument(skip(self, key), fields(key = %redact_key(key)))]
    pub async fn record_outcome(&self, key: &str, hit_rate_limit: bool) {
        let mut state = self.slot(key).lock_owned().await;
        state.apply(&self.config, hit_rate_limit);
    }

    /// Snapshot of the learned delay for `key`.
    ///
    /// Keys without state report the initial delay. Waits for any in-flight
    /// turn on the same key.
    pub async fn delay_for(&self, key: &str) -> Duration {
        let slot = {
            let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
            keys.get(key).cloned()
        };
        match slot {
            Some(slot) => slot.lock().await.current_delay,
            None => self.config.initial_delay(),
        }
    }

    /// Number of keys with state.
    pub fn tracked_keys(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Permission to issue one request for a key.
///
/// Holds the key's critical section. Consume it with [`Turn::record`] once
/// the request has completed. Dropping it without recording (e.g. when the
/// caller is cancelled) releases the key and leaves the learned state as
/// it was.
#[derive(Debug)]
#[must_use = "a turn must be recorded once the request completes"]
pub struct Turn {
    state: OwnedMutexGuard<KeyState>,
    config: GovernorConfig,
}

impl Turn {
    /// Record whether the request hit a rate limit and release the key.
    pub fn record(mut self, hit_rate_limit: bool) {
        self.state.apply(&self.config, hit_rate_limit);
    }

    /// Delay in effect for this turn's key.
    pub fn current_delay(&self) -> Duration {
        self.state.current_delay
    }
}

/// Shorten a credential for logging, keeping only its last four characters.
///
/// # Examples
///
/// ```
/// use cardsmith_rate_limit::redact_key;
///
/// assert_eq!(redact_key("AIzaSyExample1234"), "…1234");
/// assert_eq!(redact_key("ab"), "…");
/// ```
pub fn redact_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "…".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("…{}", tail)
}
