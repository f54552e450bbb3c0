//! Request profile selection.

use crate::TaskCategory;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Identifier of a backend model/tier, e.g. `gemini-2.5-flash`.
///
/// # Examples
///
/// ```
/// use cardsmith_core::ProfileId;
///
/// let id = ProfileId::new("gemini-2.5-pro");
/// assert_eq!(id.as_str(), "gemini-2.5-pro");
/// assert_eq!(format!("{}", id), "gemini-2.5-pro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Create a profile identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fixed mapping from task category to request profile.
///
/// Loaded from the `[profiles]` configuration section. The identifiers are
/// configuration only; selection itself cannot fail.
///
/// # Example
///
/// ```toml
/// [profiles]
/// quiz = "gemini-2.5-pro"
/// flashcard = "gemini-2.5-flash"
/// summary = "gemini-2.5-flash-lite"
/// test = "gemini-2.5-flash-lite-preview-09-2025"
/// default = "gemini-2.5-flash"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct ProfileTable {
    /// Highest-quality profile
    quiz: ProfileId,
    /// Mid-tier profile
    flashcard: ProfileId,
    /// Lightweight profile
    summary: ProfileId,
    /// Lightweight preview profile
    test: ProfileId,
    /// Profile for any unrecognized category
    #[serde(rename = "default")]
    fallback: ProfileId,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            quiz: ProfileId::new("gemini-2.5-pro"),
            flashcard: ProfileId::new("gemini-2.5-flash"),
            summary: ProfileId::new("gemini-2.5-flash-lite"),
            test: ProfileId::new("gemini-2.5-flash-lite-preview-09-2025"),
            fallback: ProfileId::new("gemini-2.5-flash"),
        }
    }
}

impl ProfileTable {
    /// Select the profile for a task category.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardsmith_core::{ProfileTable, TaskCategory};
    ///
    /// let table = ProfileTable::default();
    /// assert_eq!(table.select(TaskCategory::Quiz).as_str(), "gemini-2.5-pro");
    /// ```
    pub fn select(&self, task: TaskCategory) -> ProfileId {
        let profile = match task {
            TaskCategory::Quiz => &self.quiz,
            TaskCategory::Flashcard => &self.flashcard,
            TaskCategory::Summary => &self.summary,
            TaskCategory::Test => &self.test,
        };
        debug!(%task, %profile, "Selected request profile");
        profile.clone()
    }

    /// Select the profile for a category given by name.
    ///
    /// Names that are not a known [`TaskCategory`] fall back to the default
    /// profile rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardsmith_core::ProfileTable;
    ///
    /// let table = ProfileTable::default();
    /// assert_eq!(table.select_by_name("summary").as_str(), "gemini-2.5-flash-lite");
    /// assert_eq!(table.select_by_name("essay").as_str(), "gemini-2.5-flash");
    /// ```
    pub fn select_by_name(&self, name: &str) -> ProfileId {
        match TaskCategory::from_str(name.trim()) {
            Ok(task) => self.select(task),
            Err(_) => {
                debug!(name, profile = %self.fallback, "Unknown task category, using default profile");
                self.fallback.clone()
            }
        }
    }
}

/// Select a profile from the built-in table.
pub fn select_profile(task: TaskCategory) -> ProfileId {
    ProfileTable::default().select(task)
}
