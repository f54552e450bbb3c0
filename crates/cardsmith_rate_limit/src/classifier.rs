//! Classification of failures as rate-limit related.
//!
//! A failure is rate limited when its status code is 429, or when its
//! lower-cased message contains one of [`RATE_LIMIT_MARKERS`]. Message
//! sniffing is the fallback for opaque failures; typed errors such as
//! [`GenerationError`] carry their status code explicitly.

use cardsmith_error::{CardsmithError, CardsmithErrorKind, GenerationError};

/// HTTP status returned by rate-limited requests.
const TOO_MANY_REQUESTS: u16 = 429;

/// Substrings that mark a failure message as rate-limit related.
pub const RATE_LIMIT_MARKERS: [&str; 5] =
    ["429", "quota", "rate_limit", "rate limit", "quota exceeded"];

/// A failure that can be inspected for rate-limit signals.
///
/// # Example
///
/// ```
/// use cardsmith_rate_limit::RateLimitSignal;
///
/// struct UpstreamFailure(u16);
///
/// impl RateLimitSignal for UpstreamFailure {
///     fn status_code(&self) -> Option<u16> { Some(self.0) }
///     fn message(&self) -> Option<String> { None }
/// }
///
/// assert!(UpstreamFailure(429).is_rate_limited());
/// assert!(!UpstreamFailure(500).is_rate_limited());
/// ```
pub trait RateLimitSignal {
    /// Numeric status/code field, if the failure carries one.
    fn status_code(&self) -> Option<u16>;

    /// Human-readable message, if the failure carries one.
    fn message(&self) -> Option<String>;

    /// Whether this failure indicates rate limiting.
    fn is_rate_limited(&self) -> bool {
        if self.status_code() == Some(TOO_MANY_REQUESTS) {
            return true;
        }
        self.message()
            .map(|message| {
                let message = message.to_lowercase();
                RATE_LIMIT_MARKERS
                    .iter()
                    .any(|marker| message.contains(marker))
            })
            .unwrap_or(false)
    }
}

/// Classify a possibly absent failure.
///
/// Returns `false` when there is no failure to inspect.
///
/// # Examples
///
/// ```
/// use cardsmith_rate_limit::{FailureReport, is_rate_limited};
///
/// assert!(is_rate_limited(Some(&FailureReport::status(429))));
/// assert!(is_rate_limited(Some(&FailureReport::message("Quota exceeded"))));
/// assert!(!is_rate_limited(Some(&FailureReport::message("not found"))));
/// assert!(!is_rate_limited::<FailureReport>(None));
/// ```
pub fn is_rate_limited<S>(error: Option<&S>) -> bool
where
    S: RateLimitSignal + ?Sized,
{
    error.is_some_and(RateLimitSignal::is_rate_limited)
}

/// Loosely structured failure: an optional status and an optional message.
///
/// Used where a failure is only known by what the remote side reported,
/// e.g. an HTTP status plus response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FailureReport {
    /// Status/code field
    pub status: Option<u16>,
    /// Message field
    pub message: Option<String>,
}

impl FailureReport {
    /// Report with only a status code.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            message: None,
        }
    }

    /// Report with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Report with both fields.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: Some(message.into()),
        }
    }
}

impl RateLimitSignal for FailureReport {
    fn status_code(&self) -> Option<u16> {
        self.status
    }

    fn message(&self) -> Option<String> {
        self.message.clone()
    }
}

impl RateLimitSignal for GenerationError {
    fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }

    fn message(&self) -> Option<String> {
        Some(self.kind.to_string())
    }

    fn is_rate_limited(&self) -> bool {
        self.kind.is_rate_limited() || self.status_code() == Some(TOO_MANY_REQUESTS)
    }
}

impl RateLimitSignal for CardsmithError {
    fn status_code(&self) -> Option<u16> {
        match self.kind() {
            CardsmithErrorKind::Generation(err) => err.status_code(),
            _ => None,
        }
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RateLimitSignal for reqwest::Error {
    fn status_code(&self) -> Option<u16> {
        self.status().map(|status| status.as_u16())
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RateLimitSignal for dyn std::error::Error + '_ {
    fn status_code(&self) -> Option<u16> {
        None
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RateLimitSignal for dyn std::error::Error + Send + Sync + '_ {
    fn status_code(&self) -> Option<u16> {
        None
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RateLimitSignal for str {
    fn status_code(&self) -> Option<u16> {
        None
    }

    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl RateLimitSignal for String {
    fn status_code(&self) -> Option<u16> {
        None
    }

    fn message(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl<T: RateLimitSignal + ?Sized> RateLimitSignal for &T {
    fn status_code(&self) -> Option<u16> {
        (**self).status_code()
    }

    fn message(&self) -> Option<String> {
        (**self).message()
    }

    fn is_rate_limited(&self) -> bool {
        (**self).is_rate_limited()
    }
}

impl<T: RateLimitSignal + ?Sized> RateLimitSignal for Box<T> {
    fn status_code(&self) -> Option<u16> {
        (**self).status_code()
    }

    fn message(&self) -> Option<String> {
        (**self).message()
    }

    fn is_rate_limited(&self) -> bool {
        (**self).is_rate_limited()
    }
}
