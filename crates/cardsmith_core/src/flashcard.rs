//! Flashcard records parsed from generated text.

use cardsmith_error::{GenerationError, GenerationErrorKind, GenerationResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, error};

/// Difficulty label of a flashcard.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Fundamentals
    Easy,
    /// Intermediate material
    #[default]
    Medium,
    /// Advanced material
    Hard,
}

/// A single generated flashcard.
///
/// # Examples
///
/// ```
/// use cardsmith_core::{Difficulty, Flashcard};
///
/// let card = Flashcard {
///     id: "fc-1".to_string(),
///     front: "What is ownership?".to_string(),
///     back: "• Each value has a single owner".to_string(),
///     difficulty: Difficulty::Easy,
/// };
/// let json = serde_json::to_value(&card).unwrap();
/// assert_eq!(json["difficulty"], "easy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Position-derived identifier (`fc-1`, `fc-2`, ...)
    pub id: String,
    /// Question or concept
    pub front: String,
    /// Answer, usually bullet points
    pub back: String,
    /// Difficulty label
    pub difficulty: Difficulty,
}

/// Card record as emitted by the model.
#[derive(Debug, Deserialize)]
struct GeneratedCard {
    front: String,
    back: String,
    #[serde(default)]
    difficulty: Option<String>,
}

/// Remove Markdown code-fence markers (```` ```json ```` and ```` ``` ````) and trim.
///
/// # Examples
///
/// ```
/// use cardsmith_core::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
/// assert_eq!(strip_code_fences("  [] "), "[]");
/// ```
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse generated text into flashcards.
///
/// The text must be a JSON array of `{front, back, difficulty}` records,
/// optionally wrapped in code fences. Text fields are trimmed; a missing or
/// unrecognized difficulty becomes [`Difficulty::Medium`].
///
/// # Errors
///
/// Returns [`GenerationErrorKind::MalformedResponse`] carrying the raw text
/// when it is empty, not valid JSON, or a record lacks `front` or `back`.
pub fn parse_flashcards(raw: &str) -> GenerationResult<Vec<Flashcard>> {
    let json = strip_code_fences(raw);
    if json.is_empty() {
        error!(payload = %raw, "Generated text is empty");
        return Err(GenerationError::new(GenerationErrorKind::MalformedResponse {
            message: "No flashcard data returned".to_string(),
            payload: raw.to_string(),
        }));
    }

    let records: Vec<GeneratedCard> = serde_json::from_str(&json).map_err(|e| {
        error!(error = %e, payload = %raw, "Failed to parse flashcard JSON");
        GenerationError::new(GenerationErrorKind::MalformedResponse {
            message: format!("Invalid flashcard JSON: {}", e),
            payload: raw.to_string(),
        })
    })?;

    let cards: Vec<Flashcard> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Flashcard {
            id: format!("fc-{}", index + 1),
            front: record.front.trim().to_string(),
            back: record.back.trim().to_string(),
            difficulty: record
                .difficulty
                .as_deref()
                .and_then(|d| Difficulty::from_str(d.trim()).ok())
                .unwrap_or_default(),
        })
        .collect();

    debug!(count = cards.len(), "Parsed flashcards");
    Ok(cards)
}
