//! Generation clients for Cardsmith.
//!
//! - [`GeminiClient`] issues single `generateContent` requests and classifies
//!   their failures
//! - [`FlashcardGenerator`] runs those requests through the shared
//!   [`cardsmith_rate_limit::RateGovernor`] and retry executor
//! - [`AnalyticsClient`] reports activity to the analytics service without
//!   ever blocking generation
//!
//! # Example
//!
//! ```no_run
//! use cardsmith_models::FlashcardGenerator;
//! use cardsmith_rate_limit::CardsmithConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CardsmithConfig::load()?;
//! let generator = FlashcardGenerator::from_config(&config)?;
//! let cards = generator.generate("Photosynthesis", "api-key").await?;
//! println!("{}", serde_json::to_string_pretty(&cards)?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analytics;
mod gemini;
mod generator;

pub use analytics::{
    ActivityEvent, ActivityEventBuilder, AnalyticsClient, AnalyticsStream, LearningEvent,
    LearningEventBuilder, SearchEvent, SearchEventBuilder,
};
pub use gemini::{
    Candidate, Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, Part,
};
pub use generator::{FLASHCARD_COUNT, FlashcardGenerator, flashcard_prompt};
