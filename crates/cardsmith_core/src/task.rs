//! Task categories that drive request profile selection.

use serde::{Deserialize, Serialize};

/// Kind of content a caller is generating.
///
/// Each category trades cost against quality differently and maps to a
/// request profile through [`crate::ProfileTable`].
///
/// # Examples
///
/// ```
/// use cardsmith_core::TaskCategory;
/// use std::str::FromStr;
///
/// assert_eq!(TaskCategory::from_str("Quiz").unwrap(), TaskCategory::Quiz);
/// assert_eq!(format!("{}", TaskCategory::Flashcard), "flashcard");
/// assert!(TaskCategory::from_str("essay").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TaskCategory {
    /// Quiz generation, needs the highest-quality profile
    Quiz,
    /// Flashcard generation
    Flashcard,
    /// Summaries, served by a lightweight profile
    Summary,
    /// Practice tests, served by a lightweight preview profile
    Test,
}
