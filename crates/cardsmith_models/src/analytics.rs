//! Fire-and-forget analytics sink.
//!
//! Events are POSTed as JSON to `{base_url}/api/activity`, `/api/searches`
//! and `/api/learnings`. Logging never blocks or fails the caller: each
//! event is sent on a spawned task, failures are logged at `warn` and
//! dropped, and nothing is retried.

use cardsmith_error::{CardsmithResult, HttpError, JsonError};
use cardsmith_rate_limit::AnalyticsConfig;
use derive_getters::Getters;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Event collections exposed by the analytics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AnalyticsStream {
    /// User activity events
    Activity,
    /// Resource searches
    Searches,
    /// Saved learnings
    Learnings,
}

impl AnalyticsStream {
    /// Path of the collection relative to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            AnalyticsStream::Activity => "/api/activity",
            AnalyticsStream::Searches => "/api/searches",
            AnalyticsStream::Learnings => "/api/learnings",
        }
    }
}

/// Something the user did.
///
/// # Examples
///
/// ```
/// use cardsmith_models::ActivityEventBuilder;
///
/// let event = ActivityEventBuilder::default()
///     .kind("flashcards_generated")
///     .detail("Rust ownership")
///     .build()
///     .unwrap();
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["type"], "flashcards_generated");
/// assert!(json.get("metadata").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
pub struct ActivityEvent {
    /// Activity type
    #[serde(rename = "type")]
    #[builder(setter(into))]
    kind: String,

    /// Free-form detail
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,

    /// Structured metadata
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

/// A resource search and how many results it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    /// Query text
    #[builder(setter(into))]
    query: String,
    /// Number of results returned
    results_count: u64,
    /// Where the results came from (`youtube`, `articles`, `papers`, ...)
    #[builder(setter(into))]
    source: String,
}

/// A note the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
pub struct LearningEvent {
    /// Title
    #[builder(setter(into))]
    title: String,

    /// Body
    #[builder(setter(into))]
    content: String,

    /// Tags
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
}

/// Client for the analytics service.
///
/// A disabled client accepts every call and does nothing.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    client: Client,
    base_url: String,
    enabled: bool,
}

impl Default for AnalyticsClient {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

impl AnalyticsClient {
    /// Client for the configured service.
    pub fn new(config: &AnalyticsConfig) -> Self {
        let mut client = Self::with_base_url(config.base_url.clone());
        client.enabled = config.enabled;
        client
    }

    /// Enabled client for an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            enabled: true,
        }
    }

    /// Client that drops every event.
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            base_url: String::new(),
            enabled: false,
        }
    }

    /// Whether events are sent.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Base URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, stream: AnalyticsStream) -> String {
        format!("{}{}", self.base_url, stream.path())
    }

    /// Record an activity event in the background.
    ///
    /// Returns the delivery task, or `None` when nothing was sent.
    pub fn log_activity(&self, event: &ActivityEvent) -> Option<JoinHandle<()>> {
        self.post(AnalyticsStream::Activity, event)
    }

    /// Record a search event in the background.
    pub fn log_search(&self, event: &SearchEvent) -> Option<JoinHandle<()>> {
        self.post(AnalyticsStream::Searches, event)
    }

    /// Record a learning in the background.
    pub fn log_learning(&self, event: &LearningEvent) -> Option<JoinHandle<()>> {
        self.post(AnalyticsStream::Learnings, event)
    }

    fn post<E: Serialize>(&self, stream: AnalyticsStream, event: &E) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        let body = match serde_json::to_value(event) {
            Ok(body) => body,
            Err(e) => {
                warn!(stream = %stream, error = %e, "Failed to serialize analytics event");
                return None;
            }
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(stream = %stream, "No async runtime, dropping analytics event");
            return None;
        };

        let client = self.client.clone();
        let url = self.url(stream);
        Some(runtime.spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(stream = %stream, "Analytics event delivered");
                }
                Ok(response) => {
                    warn!(stream = %stream, status = %response.status(), "Failed to log analytics event");
                }
                Err(e) => {
                    warn!(stream = %stream, error = %e, "Failed to log analytics event");
                }
            }
        }))
    }

    /// Stored activity events.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or replies with a
    /// non-JSON body.
    pub async fn activity(&self) -> CardsmithResult<Value> {
        self.fetch(AnalyticsStream::Activity).await
    }

    /// Stored search events.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or replies with a
    /// non-JSON body.
    pub async fn searches(&self) -> CardsmithResult<Value> {
        self.fetch(AnalyticsStream::Searches).await
    }

    /// Stored learnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or replies with a
    /// non-JSON body.
    pub async fn learnings(&self) -> CardsmithResult<Value> {
        self.fetch(AnalyticsStream::Learnings).await
    }

    #[instrument(skip_all, fields(stream = %stream))]
    async fn fetch(&self, stream: AnalyticsStream) -> CardsmithResult<Value> {
        if !self.enabled {
            return Ok(Value::Array(Vec::new()));
        }

        let response = self
            .client
            .get(self.url(stream))
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Failed to fetch {}: {}", stream, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::new(format!("Failed to fetch {}: HTTP {}", stream, status)).into());
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| JsonError::new(format!("Invalid {} payload: {}", stream, e)))?;
        Ok(value)
    }
}
