//! Generation request errors and retry exhaustion.

/// Failure conditions of a governed generation request.
///
/// Only [`GenerationErrorKind::RateLimited`] is transient. Every other kind is
/// surfaced to the caller on the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// No API key was supplied
    #[display("Gemini API key not found")]
    MissingCredential,
    /// The server rejected the request because of rate limiting or quota
    #[display("Rate limited (HTTP {}): {}", status_code, message)]
    RateLimited {
        /// HTTP status code (normally 429)
        status_code: u16,
        /// Error message or response body
        message: String,
    },
    /// Non-429 HTTP error or connectivity failure
    #[display("Gemini API error: {}", message)]
    Transport {
        /// HTTP status code, absent when no response was received
        status_code: Option<u16>,
        /// Error message or response body
        message: String,
    },
    /// Response payload missing expected fields or not valid JSON
    #[display("Malformed response: {}", message)]
    MalformedResponse {
        /// What was wrong with the payload
        message: String,
        /// Raw payload as received
        payload: String,
    },
    /// Every allowed attempt failed with a rate-limit error
    #[display("Max retries exceeded after {} attempts: {}", attempts, last_error)]
    MaxRetriesExceeded {
        /// Total attempts made
        attempts: u32,
        /// Message of the final rate-limit failure
        last_error: String,
    },
}

impl GenerationErrorKind {
    /// HTTP status code carried by this failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GenerationErrorKind::RateLimited { status_code, .. } => Some(*status_code),
            GenerationErrorKind::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether the failure is a rate-limit rejection that may be retried.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GenerationErrorKind::RateLimited { .. })
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use cardsmith_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::RateLimited {
///     status_code: 429,
///     message: "Resource has been exhausted".to_string(),
/// });
/// assert_eq!(err.status_code(), Some(429));
/// assert!(err.kind.is_rate_limited());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// HTTP status code carried by this failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }
}

/// Retry budget exhausted while every attempt was rate limited.
///
/// The retry executor produces this value; caller error types opt in to
/// being driven by the executor by implementing `From<RetriesExhausted>`.
///
/// # Examples
///
/// ```
/// use cardsmith_error::{GenerationError, GenerationErrorKind, RetriesExhausted};
///
/// let exhausted = RetriesExhausted {
///     attempts: 3,
///     last_error: "HTTP 429".to_string(),
/// };
/// let err = GenerationError::from(exhausted);
/// assert!(matches!(
///     err.kind,
///     GenerationErrorKind::MaxRetriesExceeded { attempts: 3, .. }
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Max retries exceeded after {} attempts: {}", attempts, last_error)]
pub struct RetriesExhausted {
    /// Total attempts made
    pub attempts: u32,
    /// Message of the final failure
    pub last_error: String,
}

impl From<RetriesExhausted> for GenerationError {
    #[track_caller]
    fn from(exhausted: RetriesExhausted) -> Self {
        GenerationError::new(GenerationErrorKind::MaxRetriesExceeded {
            attempts: exhausted.attempts,
            last_error: exhausted.last_error,
        })
    }
}

/// Result type for governed generation requests.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
