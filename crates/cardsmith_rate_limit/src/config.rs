//! Configuration structures for request governing.
//!
//! This module provides TOML-based configuration. The configuration
//! system supports:
//! - Bundled defaults (include_str! from cardsmith.toml)
//! - User overrides (./cardsmith.toml or ~/.config/cardsmith/cardsmith.toml)
//! - Automatic merging with user values taking precedence

use cardsmith_core::{ProfileTable, RetryPolicy};
use cardsmith_error::{CardsmithError, CardsmithResult, ConfigError};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Largest accepted `increase_factor`.
pub const MAX_INCREASE_FACTOR: f64 = 10.0;

/// Adaptive delay controller settings.
///
/// # Example
///
/// ```toml
/// [governor]
/// default_delay_ms = 1000
/// min_delay_ms = 1000
/// max_delay_ms = 10000
/// increase_factor = 1.5
/// decrease_factor = 0.9
/// # Optional process-wide floor between any two requests
/// global_interval_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Delay assigned to a key the first time it is seen
    pub default_delay_ms: u64,

    /// Lower bound of the learned delay
    pub min_delay_ms: u64,

    /// Upper bound of the learned delay
    pub max_delay_ms: u64,

    /// Multiplier applied after a rate-limited request, in (1.0, 10.0]
    pub increase_factor: f64,

    /// Multiplier applied after any other request, in (0.0, 1.0)
    pub decrease_factor: f64,

    /// Fixed interval enforced across all keys; disabled when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_interval_ms: Option<u64>,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 1000,
            min_delay_ms: 1000,
            max_delay_ms: 10_000,
            increase_factor: 1.5,
            decrease_factor: 0.9,
            global_interval_ms: None,
        }
    }
}

impl GovernorConfig {
    /// Lower bound of the learned delay.
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Upper bound of the learned delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Delay for a fresh key, clamped into `[min_delay, max_delay]`.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms).clamp(self.min_delay(), self.max_delay())
    }

    /// Process-wide interval, if enabled.
    pub fn global_interval(&self) -> Option<Duration> {
        self.global_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Check bounds and factors.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_delay_ms` is zero or exceeds `max_delay_ms`,
    /// if `increase_factor` is outside `(1, MAX_INCREASE_FACTOR]`, or if
    /// `decrease_factor` is outside `(0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_ms == 0 {
            return Err(ConfigError::new("min_delay_ms must be greater than zero"));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::new(format!(
                "min_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if !(self.increase_factor > 1.0 && self.increase_factor <= MAX_INCREASE_FACTOR) {
            return Err(ConfigError::new(format!(
                "increase_factor must be in (1.0, {}], got {}",
                MAX_INCREASE_FACTOR, self.increase_factor
            )));
        }
        if !(self.decrease_factor > 0.0 && self.decrease_factor < 1.0) {
            return Err(ConfigError::new(format!(
                "decrease_factor must be in (0.0, 1.0), got {}",
                self.decrease_factor
            )));
        }
        Ok(())
    }
}

/// Retry settings for rate-limited requests.
///
/// ```toml
/// [retry]
/// max_retries = 5
/// base_delay_ms = 2000
/// max_jitter_ms = 1000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff before the first retry
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 2000,
            max_jitter_ms: 1000,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        RetryPolicy::builder()
            .max_retries(config.max_retries)
            .base_delay(Duration::from_millis(config.base_delay_ms))
            .max_jitter(Duration::from_millis(config.max_jitter_ms))
            .build()
    }
}

/// Gemini endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL; requests go to `{base_url}/models/{profile}:generateContent`
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Analytics sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Base URL of the analytics service
    pub base_url: String,
    /// Whether events are sent at all
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5050".to_string(),
            enabled: true,
        }
    }
}

/// Top-level Cardsmith configuration.
///
/// Loads configuration from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from cardsmith.toml)
/// 2. User override (./cardsmith.toml or ~/.config/cardsmith/cardsmith.toml)
///
/// # Example
///
/// ```no_run
/// use cardsmith_rate_limit::CardsmithConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CardsmithConfig::load()?;
/// println!("Max delay: {}ms", config.governor.max_delay_ms);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CardsmithConfig {
    /// Adaptive delay controller
    #[serde(default)]
    pub governor: GovernorConfig,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Task category to profile mapping
    #[serde(default)]
    pub profiles: ProfileTable,

    /// Gemini endpoint
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Analytics sink
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl CardsmithConfig {
    /// Load configuration from a specific file path.
    ///
    /// Sections missing from the file take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CardsmithResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CardsmithError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CardsmithError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.governor.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (cardsmith.toml shipped with library)
    /// 2. User config in home directory (~/.config/cardsmith/cardsmith.toml)
    /// 3. User config in current directory (./cardsmith.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> CardsmithResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../cardsmith.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cardsmith/cardsmith.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("cardsmith").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                CardsmithError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CardsmithError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.governor.validate()?;
        Ok(config)
    }

    /// Retry policy built from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.into()
    }
}
