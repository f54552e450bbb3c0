//! Wire types for `models/{model}:generateContent`.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One text part of a content block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Part {
    /// Text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    /// Text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// A role-tagged block of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Content {
    /// Author role (`user` or `model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Ordered parts
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    /// Single-part user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::from_text(text)],
        }
    }
}

/// Request body.
///
/// # Examples
///
/// ```
/// use cardsmith_models::GenerateContentRequest;
///
/// let body = serde_json::to_value(GenerateContentRequest::from_prompt("Hi")).unwrap();
/// assert_eq!(body["contents"][0]["role"], "user");
/// assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GenerateContentRequest {
    /// Conversation turns
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Request with a single user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
        }
    }
}

/// One response candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content
    #[serde(default)]
    content: Option<Content>,
    /// Why generation stopped
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Response body.
///
/// Every field is optional on the wire; [`GenerateContentResponse::first_text`]
/// walks the path the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Getters)]
pub struct GenerateContentResponse {
    /// Candidates, best first
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Trimmed `candidates[0].content.parts[0].text`, if present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
