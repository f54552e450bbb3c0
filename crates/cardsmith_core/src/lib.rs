//! Core data types for the Cardsmith request governor.
//!
//! This crate provides the types shared by the governor, the retry executor
//! and the generation clients: task categories and their request profiles,
//! retry policy, and the flashcard records parsed from generated text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod flashcard;
mod profile;
mod retry_policy;
mod task;

pub use flashcard::{Difficulty, Flashcard, parse_flashcards, strip_code_fences};
pub use profile::{ProfileId, ProfileTable, select_profile};
pub use retry_policy::{RetryPolicy, RetryPolicyBuilder};
pub use task::TaskCategory;
