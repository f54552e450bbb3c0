//! Tests for the fixed-interval pacer.

use cardsmith_rate_limit::{GovernorConfig, IntervalPacer};
use std::time::Duration;

#[test]
fn test_second_pass_within_interval_is_refused() {
    let pacer = IntervalPacer::new(Duration::from_secs(60));

    assert!(pacer.try_pass());
    assert!(!pacer.try_pass());
}

#[test]
fn test_disabled_pacer_always_passes() {
    let pacer = IntervalPacer::disabled();

    for _ in 0..100 {
        assert!(pacer.try_pass());
    }
    assert_eq!(pacer.interval(), None);
}

#[test]
fn test_zero_interval_disables_pacing() {
    let pacer = IntervalPacer::new(Duration::ZERO);
    assert_eq!(pacer.interval(), None);
    assert!(pacer.try_pass());
    assert!(pacer.try_pass());
}

#[test]
fn test_from_config() {
    let pacer = IntervalPacer::from_config(&GovernorConfig::default());
    assert_eq!(pacer.interval(), None);

    let pacer = IntervalPacer::from_config(&GovernorConfig {
        global_interval_ms: Some(1000),
        ..GovernorConfig::default()
    });
    assert_eq!(pacer.interval(), Some(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_wait_spaces_requests() {
    let pacer = IntervalPacer::new(Duration::from_millis(50));

    let start = std::time::Instant::now();
    pacer.wait().await;
    pacer.wait().await;
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn test_clones_share_the_interval() {
    let pacer = IntervalPacer::new(Duration::from_secs(60));
    let clone = pacer.clone();

    assert!(pacer.try_pass());
    assert!(!clone.try_pass());
}
