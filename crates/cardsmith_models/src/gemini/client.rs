//! Single-attempt `generateContent` client.

use super::{GenerateContentRequest, GenerateContentResponse};
use cardsmith_core::ProfileId;
use cardsmith_error::{GenerationError, GenerationErrorKind, GenerationResult};
use cardsmith_rate_limit::{FailureReport, GeminiConfig, is_rate_limited};
use reqwest::Client;
use tracing::{debug, error, instrument, warn};

/// REST client for the Gemini `generateContent` endpoint.
///
/// Issues exactly one HTTP request per call. Spacing and retrying are the
/// caller's job.
///
/// # Example
///
/// ```no_run
/// use cardsmith_core::ProfileId;
/// use cardsmith_models::GeminiClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::default();
/// let profile = ProfileId::new("gemini-2.5-flash");
/// let text = client.generate_once(&profile, "Say hello", "api-key").await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(&GeminiConfig::default())
    }
}

impl GeminiClient {
    /// Client for the configured endpoint.
    pub fn new(config: &GeminiConfig) -> Self {
        Self::with_base_url(config.base_url.clone())
    }

    /// Client for an explicit base URL, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Created Gemini client");
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint for a profile, without the credential.
    pub fn endpoint(&self, profile: &ProfileId) -> String {
        format!("{}/models/{}:generateContent", self.base_url, profile)
    }

    /// Send one prompt and return the trimmed text of the first candidate.
    ///
    /// # Errors
    ///
    /// - [`GenerationErrorKind::RateLimited`] for a non-2xx response whose
    ///   status or body signals rate limiting
    /// - [`GenerationErrorKind::Transport`] for any other non-2xx response or
    ///   when no response was received
    /// - [`GenerationErrorKind::MalformedResponse`] when the body is not JSON
    ///   or carries no text
    #[instrument(skip_all, fields(profile = %profile, prompt_len = prompt.len()))]
    pub async fn generate_once(
        &self,
        profile: &ProfileId,
        prompt: &str,
        api_key: &str,
    ) -> GenerationResult<String> {
        let url = self.endpoint(profile);
        let body = GenerateContentRequest::from_prompt(prompt);

        debug!(url = %url, "Sending request to Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the credential
                let e = e.without_url();
                error!(error = %e, "HTTP request failed");
                GenerationError::new(GenerationErrorKind::Transport {
                    status_code: None,
                    message: format!("Request failed: {}", e),
                })
            })?;

        let status = response.status();
        let payload = response.text().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "Failed to read response");
            GenerationError::new(GenerationErrorKind::Transport {
                status_code: Some(status.as_u16()),
                message: format!("Failed to read response: {}", e),
            })
        })?;

        if !status.is_success() {
            let report = FailureReport::new(status.as_u16(), payload);
            if is_rate_limited(Some(&report)) {
                warn!(status = %status, "Gemini rejected request with rate limit");
                return Err(GenerationError::new(GenerationErrorKind::RateLimited {
                    status_code: status.as_u16(),
                    message: report.message.unwrap_or_default(),
                }));
            }
            error!(status = %status, "Gemini API error");
            return Err(GenerationError::new(GenerationErrorKind::Transport {
                status_code: Some(status.as_u16()),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    report.message.unwrap_or_default()
                ),
            }));
        }

        debug!(response_len = payload.len(), "Received response");

        let parsed: GenerateContentResponse = match serde_json::from_str(&payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e, "Failed to parse response JSON");
                return Err(GenerationError::new(
                    GenerationErrorKind::MalformedResponse {
                        message: format!("Invalid JSON: {}", e),
                        payload,
                    },
                ));
            }
        };

        match parsed.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                error!("Response carried no candidate text");
                Err(GenerationError::new(
                    GenerationErrorKind::MalformedResponse {
                        message: "No text returned from Gemini".to_string(),
                        payload,
                    },
                ))
            }
        }
    }
}
