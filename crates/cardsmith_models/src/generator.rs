//! Governed generation: pacing, per-key spacing and rate-limit retry around
//! single Gemini requests.

use crate::{ActivityEventBuilder, AnalyticsClient, GeminiClient};
use cardsmith_core::{Flashcard, ProfileTable, TaskCategory, parse_flashcards};
use cardsmith_error::{CardsmithResult, GenerationError, GenerationErrorKind, GenerationResult};
use cardsmith_rate_limit::{
    AttemptOutcome, CardsmithConfig, IntervalPacer, RateGovernor, RetryExecutor, redact_key,
};
use tracing::{debug, info, instrument, warn};

/// Number of cards requested per topic.
pub const FLASHCARD_COUNT: usize = 8;

/// Prompt asking for [`FLASHCARD_COUNT`] cards on `topic` as a JSON array.
pub fn flashcard_prompt(topic: &str) -> String {
    format!(
        r#"You are an expert educator. Generate exactly {count} flashcards that together give a comprehensive overview of {topic}. Format your response as a JSON array of flashcards.

For each flashcard:
1. Front side: A clear question or key concept about {topic}
2. Back side: Structure the answer as bullet points, with:
   - Main point or definition
   - 2-3 key supporting details or examples
   - Any important relationships or connections
3. Difficulty: Mark as "easy", "medium", or "hard"

Format as:
[
  {{
    "front": "Clear question or concept",
    "back": "• Main point/definition\n• Supporting detail 1\n• Supporting detail 2\n• Key relationship",
    "difficulty": "easy|medium|hard"
  }}
]

Make sure:
- Cards progress from fundamentals to advanced concepts
- Content is concise but informative
- Each card builds upon previous knowledge
- Include practical applications where relevant"#,
        count = FLASHCARD_COUNT,
        topic = topic,
    )
}

/// Generates text and flashcards through the shared governor.
///
/// Every attempt waits for the key's turn, then for the optional
/// process-wide pacer, issues one request and records whether it was rate
/// limited. The pacer slot is claimed while the turn is held, right before
/// the request starts.
/// Rate-limited attempts are retried by the executor; anything else is
/// returned on the attempt that produced it.
///
/// Clones share governor and pacer state.
///
/// # Example
///
/// ```no_run
/// use cardsmith_models::FlashcardGenerator;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let generator = FlashcardGenerator::default();
/// let cards = generator.generate("Rust ownership", "api-key").await?;
/// for card in cards {
///     println!("{}: {}", card.front, card.back);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlashcardGenerator {
    client: GeminiClient,
    governor: RateGovernor,
    pacer: IntervalPacer,
    executor: RetryExecutor,
    profiles: ProfileTable,
    analytics: Option<AnalyticsClient>,
}

impl FlashcardGenerator {
    /// Generator with an unpaced default setup around `client`.
    pub fn new(client: GeminiClient, governor: RateGovernor, executor: RetryExecutor) -> Self {
        Self {
            client,
            governor,
            executor,
            ..Self::default()
        }
    }

    /// Generator wired from configuration, including the analytics sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the governor settings are invalid.
    pub fn from_config(config: &CardsmithConfig) -> CardsmithResult<Self> {
        let governor = RateGovernor::new(config.governor.clone())?;
        Ok(Self {
            client: GeminiClient::new(&config.gemini),
            governor,
            pacer: IntervalPacer::from_config(&config.governor),
            executor: RetryExecutor::new(config.retry_policy()),
            profiles: config.profiles.clone(),
            analytics: Some(AnalyticsClient::new(&config.analytics)),
        })
    }

    /// Replace the process-wide pacer.
    pub fn with_pacer(mut self, pacer: IntervalPacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Replace the task-to-profile table.
    pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
        self.profiles = profiles;
        self
    }

    /// Report successful generations to an analytics sink.
    pub fn with_analytics(mut self, analytics: AnalyticsClient) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Shared governor.
    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    /// Profiles in effect.
    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Generate flashcards covering `topic`.
    ///
    /// # Errors
    ///
    /// - [`GenerationErrorKind::MissingCredential`] for an empty key, before
    ///   any request is made
    /// - [`GenerationErrorKind::MaxRetriesExceeded`] when every attempt was
    ///   rate limited
    /// - [`GenerationErrorKind::Transport`] or
    ///   [`GenerationErrorKind::MalformedResponse`] from the failing attempt
    #[instrument(skip(self, api_key), fields(key = %redact_key(api_key)))]
    pub async fn generate(&self, topic: &str, api_key: &str) -> GenerationResult<Vec<Flashcard>> {
        let raw = self
            .generate_text(TaskCategory::Flashcard, &flashcard_prompt(topic), api_key)
            .await?;
        let cards = parse_flashcards(&raw)?;

        info!(count = cards.len(), "Generated flashcards");
        if let Some(analytics) = &self.analytics {
            match ActivityEventBuilder::default()
                .kind("flashcards_generated")
                .detail(topic)
                .build()
            {
                Ok(event) => {
                    analytics.log_activity(&event);
                }
                Err(e) => warn!(error = %e, "Failed to build analytics event"),
            }
        }

        Ok(cards)
    }

    /// Generate raw text for `prompt` with the profile selected for `task`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FlashcardGenerator::generate`], minus parsing.
    #[instrument(skip(self, prompt, api_key), fields(key = %redact_key(api_key), prompt_len = prompt.len()))]
    pub async fn generate_text(
        &self,
        task: TaskCategory,
        prompt: &str,
        api_key: &str,
    ) -> GenerationResult<String> {
        if api_key.is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::MissingCredential));
        }

        let profile = self.profiles.select(task);
        debug!(profile = %profile, "Selected profile");

        self.executor
            .execute_classified(|| {
                let profile = &profile;
                async move {
                    let turn = self.governor.await_turn(api_key).await;
                    self.pacer.wait().await;
                    let result = self.client.generate_once(profile, prompt, api_key).await;
                    turn.record(matches!(&result, Err(e) if e.kind.is_rate_limited()));
                    AttemptOutcome::from_generation(result)
                }
            })
            .await
    }
}
