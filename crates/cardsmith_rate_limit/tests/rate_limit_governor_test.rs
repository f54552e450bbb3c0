//! Tests for the adaptive per-key rate governor.

use cardsmith_rate_limit::{GovernorConfig, MAX_INCREASE_FACTOR, RateGovernor};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
const MAX_DELAY: Duration = Duration::from_millis(10_000);
const MIN_DELAY: Duration = Duration::from_millis(1000);

#[tokio::test(start_paused = true)]
async fn test_first_request_proceeds_immediately() {
    let governor = RateGovernor::default();

    let start = Instant::now();
    let turn = governor.await_turn("fresh-key").await;
    assert!(start.elapsed() < Duration::from_millis(1));
    turn.record(false);
}

#[tokio::test(start_paused = true)]
async fn test_second_request_waits_for_delay() {
    let governor = RateGovernor::default();

    governor.await_turn("key").await.record(false);

    let start = Instant::now();
    let _turn = governor.await_turn("key").await;
    assert!(start.elapsed() >= DEFAULT_DELAY.mul_f64(0.9));
}

#[tokio::test(start_paused = true)]
async fn test_no_wait_once_delay_has_elapsed() {
    let governor = RateGovernor::default();

    governor.await_turn("key").await.record(false);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let start = Instant::now();
    let _turn = governor.await_turn("key").await;
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test]
async fn test_single_rate_limit_grows_delay_by_half() {
    let governor = RateGovernor::default();

    governor.record_outcome("key", true).await;

    assert_eq!(
        governor.delay_for("key").await,
        DEFAULT_DELAY.mul_f64(1.5).min(MAX_DELAY)
    );
}

#[tokio::test]
async fn test_growth_is_capped() {
    let governor = RateGovernor::default();

    for _ in 0..25 {
        governor.record_outcome("key", true).await;
        assert!(governor.delay_for("key").await <= MAX_DELAY);
    }
    assert_eq!(governor.delay_for("key").await, MAX_DELAY);
}

#[tokio::test]
async fn test_decay_is_floored() {
    let governor = RateGovernor::default();

    for _ in 0..10 {
        governor.record_outcome("key", true).await;
    }
    for _ in 0..100 {
        governor.record_outcome("key", false).await;
        assert!(governor.delay_for("key").await >= MIN_DELAY);
    }
    assert_eq!(governor.delay_for("key").await, MIN_DELAY);
}

#[tokio::test]
async fn test_decay_is_gradual() {
    let governor = RateGovernor::default();

    for _ in 0..10 {
        governor.record_outcome("key", true).await;
    }
    governor.record_outcome("key", false).await;

    // One success after sustained limiting relaxes by 10%, not to the floor
    let delay = governor.delay_for("key").await;
    assert!(delay > Duration::from_millis(8_900));
    assert!(delay < MAX_DELAY);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_lengthens_next_wait() {
    let governor = RateGovernor::default();

    governor.await_turn("key").await.record(true);

    let start = Instant::now();
    let _turn = governor.await_turn("key").await;
    assert!(start.elapsed() >= Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_racing_callers_on_one_key_are_spaced() {
    let governor = RateGovernor::default();
    let starts = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let governor = governor.clone();
            let starts = Arc::clone(&starts);
            tokio::spawn(async move {
                let turn = governor.await_turn("shared").await;
                starts.lock().unwrap().push(Instant::now());
                turn.record(false);
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let mut starts = starts.lock().unwrap().clone();
    starts.sort();
    assert_eq!(starts.len(), 4);
    for pair in starts.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= DEFAULT_DELAY.mul_f64(0.9));
    }
}

#[tokio::test(start_paused = true)]
async fn test_distinct_keys_do_not_block_each_other() {
    let governor = RateGovernor::default();

    // Hold a turn on one key without recording it
    let held = governor.await_turn("alpha").await;

    let other = tokio::time::timeout(Duration::from_millis(10), governor.await_turn("beta")).await;
    assert!(other.is_ok(), "a turn on another key must not block");
    other.unwrap().record(true);
    held.record(false);

    assert_eq!(governor.delay_for("alpha").await, DEFAULT_DELAY);
    assert_eq!(governor.delay_for("beta").await, Duration::from_millis(1500));
    assert_eq!(governor.tracked_keys(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_distinct_keys_keep_independent_timestamps() {
    let governor = RateGovernor::default();

    governor.await_turn("alpha").await.record(false);

    let start = Instant::now();
    let _turn = governor.await_turn("beta").await;
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_turn_records_nothing() {
    let governor = RateGovernor::default();

    governor.await_turn("key").await.record(false);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let turn = governor.await_turn("key").await;
    drop(turn);

    // Neither the delay nor the timestamp moved, and the key is released
    assert_eq!(governor.delay_for("key").await, DEFAULT_DELAY);
    let start = Instant::now();
    let _turn = governor.await_turn("key").await;
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_releases_key() {
    let governor = RateGovernor::default();

    governor.await_turn("key").await.record(false);

    // Abandon the wait part-way through
    let cancelled =
        tokio::time::timeout(Duration::from_millis(100), governor.await_turn("key")).await;
    assert!(cancelled.is_err());

    assert_eq!(governor.delay_for("key").await, DEFAULT_DELAY);
    let turn = tokio::time::timeout(Duration::from_secs(2), governor.await_turn("key")).await;
    assert!(turn.is_ok(), "cancelled waiter must not hold the key");
}

#[tokio::test]
async fn test_custom_bounds() {
    let governor = RateGovernor::new(GovernorConfig {
        default_delay_ms: 100,
        min_delay_ms: 50,
        max_delay_ms: 200,
        increase_factor: 2.0,
        decrease_factor: 0.5,
        global_interval_ms: None,
    })
    .unwrap();

    governor.record_outcome("key", true).await;
    assert_eq!(governor.delay_for("key").await, Duration::from_millis(200));
    governor.record_outcome("key", true).await;
    assert_eq!(governor.delay_for("key").await, Duration::from_millis(200));

    governor.record_outcome("key", false).await;
    governor.record_outcome("key", false).await;
    governor.record_outcome("key", false).await;
    assert_eq!(governor.delay_for("key").await, Duration::from_millis(50));
}

#[tokio::test]
async fn test_steep_growth_saturates_at_cap() {
    let governor = RateGovernor::new(GovernorConfig {
        max_delay_ms: u64::MAX,
        increase_factor: MAX_INCREASE_FACTOR,
        ..GovernorConfig::default()
    })
    .unwrap();

    for _ in 0..40 {
        governor.record_outcome("key", true).await;
    }
    assert_eq!(
        governor.delay_for("key").await,
        Duration::from_millis(u64::MAX)
    );
}

#[test]
fn test_oversized_increase_factor_is_rejected() {
    let result = RateGovernor::new(GovernorConfig {
        increase_factor: 1e20,
        ..GovernorConfig::default()
    });
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_settled_keys_are_pruned_when_new_keys_arrive() {
    let governor = RateGovernor::default();

    governor.await_turn("settled").await.record(false);
    governor.await_turn("throttled").await.record(true);
    assert_eq!(governor.tracked_keys(), 2);

    tokio::time::advance(Duration::from_secs(2)).await;
    governor.await_turn("newcomer").await.record(false);

    // "settled" is back at the initial delay and its wait has passed
    assert_eq!(governor.tracked_keys(), 2);
    assert_eq!(
        governor.delay_for("throttled").await,
        Duration::from_millis(1500)
    );

    let start = Instant::now();
    governor.await_turn("settled").await.record(false);
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_prune_keeps_keys_in_use_or_waiting() {
    let governor = RateGovernor::default();

    let held = governor.await_turn("held").await;
    governor.await_turn("recent").await.record(false);

    assert_eq!(governor.prune_idle(), 0);
    held.record(false);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(governor.prune_idle(), 2);
    assert_eq!(governor.tracked_keys(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = RateGovernor::new(GovernorConfig {
        min_delay_ms: 20_000,
        ..GovernorConfig::default()
    });
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unseen_key_reports_default_delay() {
    let governor = RateGovernor::default();
    assert_eq!(governor.delay_for("never-used").await, DEFAULT_DELAY);
    assert_eq!(governor.tracked_keys(), 0);
}
