//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "cardsmith=debug")
    pub log_level: String,
    /// Emit JSON lines instead of human-readable text
    pub json_logs: bool,
}

impl LoggingConfig {
    /// Configuration for the given verbosity.
    ///
    /// `CARDSMITH_LOG_FORMAT=json` switches to JSON output.
    pub fn new(verbose: bool) -> Self {
        Self {
            log_level: if verbose { "debug" } else { "info" }.to_string(),
            json_logs: std::env::var("CARDSMITH_LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Set the fallback filter.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
