//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, HttpError, JsonError};

/// Aggregate of every error condition raised by Cardsmith crates.
///
/// # Examples
///
/// ```
/// use cardsmith_error::{CardsmithError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: CardsmithError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CardsmithErrorKind {
    /// HTTP error outside the governed generation path
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Governed generation request error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Cardsmith error with kind discrimination.
///
/// # Examples
///
/// ```
/// use cardsmith_error::{CardsmithResult, ConfigError};
///
/// fn might_fail() -> CardsmithResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cardsmith Error: {}", _0)]
pub struct CardsmithError(Box<CardsmithErrorKind>);

impl CardsmithError {
    /// Create a new error from a kind.
    pub fn new(kind: CardsmithErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CardsmithErrorKind {
        &self.0
    }
}

impl<T> From<T> for CardsmithError
where
    T: Into<CardsmithErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Cardsmith operations.
pub type CardsmithResult<T> = std::result::Result<T, CardsmithError>;
