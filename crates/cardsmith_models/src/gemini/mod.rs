//! Google Gemini REST client.
//!
//! One `generateContent` call per attempt, with no retrying or pacing of its
//! own. Failures are classified into [`cardsmith_error::GenerationErrorKind`]
//! so that callers (normally [`crate::FlashcardGenerator`]) can tell
//! rate-limit rejections from everything else.

mod client;
mod dto;

pub use client::GeminiClient;
pub use dto::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part};
