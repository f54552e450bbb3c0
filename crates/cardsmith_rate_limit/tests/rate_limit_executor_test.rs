//! Tests for the bounded retry executor.

use cardsmith_core::RetryPolicy;
use cardsmith_error::{GenerationError, GenerationErrorKind, GenerationResult};
use cardsmith_rate_limit::{AttemptOutcome, RetryExecutor};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn rate_limited() -> GenerationError {
    GenerationError::new(GenerationErrorKind::RateLimited {
        status_code: 429,
        message: "Resource has been exhausted".to_string(),
    })
}

fn server_error() -> GenerationError {
    GenerationError::new(GenerationErrorKind::Transport {
        status_code: Some(500),
        message: "internal error".to_string(),
    })
}

fn policy(max_retries: u32, base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(base_delay_ms))
        .max_jitter(Duration::ZERO)
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_three_rate_limits() {
    let executor = RetryExecutor::new(policy(5, 2000));
    let calls = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let result: GenerationResult<&str> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(rate_limited())
                } else {
                    Ok("cards")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "cards");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Backoff of 2s + 4s + 8s between the four attempts
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(14));
    assert!(elapsed < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_after_every_attempt_is_rate_limited() {
    let executor = RetryExecutor::new(policy(2, 10));
    let calls = Arc::new(AtomicU32::new(0));

    let result: GenerationResult<()> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let err = result.unwrap_err();
    match err.kind {
        GenerationErrorKind::MaxRetriesExceeded {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("Resource has been exhausted"));
        }
        other => panic!("expected MaxRetriesExceeded, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_rate_limit_failure_is_not_retried() {
    let executor = RetryExecutor::new(policy(5, 2000));
    let calls = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let result: GenerationResult<()> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_millis(1));
    assert!(matches!(
        result.unwrap_err().kind,
        GenerationErrorKind::Transport {
            status_code: Some(500),
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_makes_one_call() {
    let executor = RetryExecutor::new(policy(5, 2000));
    let calls = Arc::new(AtomicU32::new(0));

    let result: GenerationResult<u32> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) }
        })
        .await;

    assert_eq!(result.unwrap(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_means_single_attempt() {
    let executor = RetryExecutor::new(policy(0, 2000));
    let calls = Arc::new(AtomicU32::new(0));

    let result: GenerationResult<()> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(
        result.unwrap_err().kind,
        GenerationErrorKind::MaxRetriesExceeded { attempts: 1, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_explicitly_tagged_outcomes() {
    let executor = RetryExecutor::new(policy(3, 100));
    let calls = Arc::new(AtomicU32::new(0));

    // A 500 tagged retryable by the caller is retried regardless of status
    let result: GenerationResult<&str> = executor
        .execute_classified(|| {
            let calls = Arc::clone(&calls);
            async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => AttemptOutcome::RetryableFailure(server_error()),
                    _ => AttemptOutcome::Success("done"),
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_tagged_fatal_stops_immediately() {
    let executor = RetryExecutor::new(policy(3, 100));
    let calls = Arc::new(AtomicU32::new(0));

    // Even a 429 is terminal when the caller tags it fatal
    let result: GenerationResult<()> = executor
        .execute_classified(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                AttemptOutcome::FatalFailure(rate_limited())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(result.unwrap_err().kind.is_rate_limited());
}

#[tokio::test(start_paused = true)]
async fn test_outcome_from_generation_result() {
    let ok: AttemptOutcome<u8, GenerationError> = AttemptOutcome::from_generation(Ok(1));
    assert!(ok.is_success());

    let limited = AttemptOutcome::<u8, _>::from_generation(Err(rate_limited()));
    assert!(matches!(limited, AttemptOutcome::RetryableFailure(_)));

    let fatal = AttemptOutcome::<u8, _>::from_generation(Err(server_error()));
    assert!(matches!(fatal, AttemptOutcome::FatalFailure(_)));
}

#[test]
fn test_classify_uses_message_markers() {
    let outcome: AttemptOutcome<(), String> =
        AttemptOutcome::classify(Err("Quota exceeded for model".to_string()));
    assert!(matches!(outcome, AttemptOutcome::RetryableFailure(_)));

    let outcome: AttemptOutcome<(), String> =
        AttemptOutcome::classify(Err("bad request".to_string()));
    assert!(matches!(outcome, AttemptOutcome::FatalFailure(_)));
}

#[tokio::test(start_paused = true)]
async fn test_jitter_stays_within_bound() {
    let policy = RetryPolicy::builder()
        .max_retries(1)
        .base_delay(Duration::from_millis(100))
        .max_jitter(Duration::from_millis(50))
        .build();
    let executor = RetryExecutor::new(policy);
    let calls = Arc::new(AtomicU32::new(0));

    let start = Instant::now();
    let _: GenerationResult<()> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            }
        })
        .await;

    let elapsed = start.elapsed();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed <= Duration::from_millis(151));
}
