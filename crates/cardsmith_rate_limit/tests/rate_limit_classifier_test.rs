//! Tests for rate-limit failure classification.

use cardsmith_error::{CardsmithError, GenerationError, GenerationErrorKind};
use cardsmith_rate_limit::{FailureReport, RateLimitSignal, is_rate_limited};

#[test]
fn test_status_429_is_rate_limited() {
    assert!(is_rate_limited(Some(&FailureReport::status(429))));
}

#[test]
fn test_quota_message_is_rate_limited() {
    assert!(is_rate_limited(Some(&FailureReport::message("Quota exceeded"))));
}

#[test]
fn test_marker_match_ignores_case() {
    assert!(is_rate_limited(Some(&FailureReport::message("RATE_LIMIT hit"))));
    assert!(is_rate_limited(Some(&FailureReport::message(
        "Rate Limit reached for requests"
    ))));
    assert!(is_rate_limited(Some(&FailureReport::message(
        "Gemini API error: 429"
    ))));
}

#[test]
fn test_other_failures_are_not_rate_limited() {
    assert!(!is_rate_limited(Some(&FailureReport::status(500))));
    assert!(!is_rate_limited(Some(&FailureReport::message("not found"))));
    assert!(!is_rate_limited(Some(&FailureReport::default())));
}

#[test]
fn test_absent_error_is_not_rate_limited() {
    assert!(!is_rate_limited::<FailureReport>(None));
}

#[test]
fn test_message_markers_apply_when_status_is_not_429() {
    // A 500 whose body mentions quota falls back to its message
    assert!(FailureReport::new(500, "Daily quota reached").is_rate_limited());
    assert!(FailureReport::new(429, "whatever").is_rate_limited());
    assert!(!FailureReport::new(503, "Service unavailable").is_rate_limited());
}

#[test]
fn test_generation_errors_classify_by_kind() {
    let limited = GenerationError::new(GenerationErrorKind::RateLimited {
        status_code: 429,
        message: "Resource exhausted".to_string(),
    });
    assert!(limited.is_rate_limited());

    let server = GenerationError::new(GenerationErrorKind::Transport {
        status_code: Some(500),
        message: "Internal error".to_string(),
    });
    assert!(!server.is_rate_limited());

    let missing = GenerationError::new(GenerationErrorKind::MissingCredential);
    assert!(!missing.is_rate_limited());
}

#[test]
fn test_wrapped_errors_keep_their_status() {
    let err: CardsmithError = GenerationError::new(GenerationErrorKind::RateLimited {
        status_code: 429,
        message: "slow down".to_string(),
    })
    .into();
    assert_eq!(err.status_code(), Some(429));
    assert!(err.is_rate_limited());
}

#[test]
fn test_opaque_errors_fall_back_to_message() {
    let opaque: Box<dyn std::error::Error + Send + Sync> = "upstream said: quota exceeded".into();
    assert!(opaque.is_rate_limited());

    let io = std::io::Error::other("connection reset");
    let as_dyn: &dyn std::error::Error = &io;
    assert!(!is_rate_limited(Some(as_dyn)));
}
