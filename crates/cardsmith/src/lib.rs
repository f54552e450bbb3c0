//! Cardsmith: rate-governed generation against the Gemini API.
//!
//! Cardsmith spaces out and retries requests to an API whose rate limits are
//! unknown in advance, and uses that machinery to generate study flashcards.
//!
//! # Features
//!
//! - **Adaptive spacing**: a per-credential delay that grows on 429s and
//!   decays on success ([`RateGovernor`])
//! - **Bounded retry**: exponential backoff with jitter for rate-limit
//!   failures only ([`RetryExecutor`])
//! - **Profile selection**: task category to model mapping ([`ProfileTable`])
//! - **Flashcards**: prompt, request and parse in one call ([`FlashcardGenerator`])
//! - **Analytics**: fire-and-forget activity reporting ([`AnalyticsClient`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cardsmith::{CardsmithConfig, FlashcardGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CardsmithConfig::load()?;
//!     let generator = FlashcardGenerator::from_config(&config)?;
//!
//!     let api_key = std::env::var("GEMINI_API_KEY")?;
//!     for card in generator.generate("The Krebs cycle", &api_key).await? {
//!         println!("[{}] {}", card.difficulty, card.front);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `cardsmith_error` - Error types
//! - `cardsmith_core` - Task categories, profiles, retry policy, flashcards
//! - `cardsmith_rate_limit` - Classifier, governor, pacer, retry executor, configuration
//! - `cardsmith_models` - Gemini client, flashcard generator, analytics sink
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod logging;

pub use logging::{LoggingConfig, init_logging};

pub use cardsmith_error::{
    CardsmithError, CardsmithErrorKind, CardsmithResult, ConfigError, GenerationError,
    GenerationErrorKind, GenerationResult, HttpError, JsonError, RetriesExhausted,
};

pub use cardsmith_core::{
    Difficulty, Flashcard, ProfileId, ProfileTable, RetryPolicy, RetryPolicyBuilder,
    TaskCategory, parse_flashcards, select_profile, strip_code_fences,
};

pub use cardsmith_rate_limit::{
    AnalyticsConfig, AttemptOutcome, BackoffSchedule, CardsmithConfig, FailureReport,
    GeminiConfig, GovernorConfig, IntervalPacer, RATE_LIMIT_MARKERS, RateGovernor,
    RateLimitSignal, RetryConfig, RetryExecutor, Turn, is_rate_limited, redact_key,
};

pub use cardsmith_models::{
    ActivityEvent, ActivityEventBuilder, AnalyticsClient, AnalyticsStream, FLASHCARD_COUNT,
    FlashcardGenerator, GeminiClient, LearningEvent, LearningEventBuilder, SearchEvent,
    SearchEventBuilder, flashcard_prompt,
};
