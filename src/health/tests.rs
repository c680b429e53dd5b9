//! Registry and result tests

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio_test::assert_ok;

use crate::error::HealthError;

use super::check::{CheckFailure, Config, CustomCheck};
use super::registry::Registry;
use super::result::CheckResult;

fn passing_check(name: &'static str) -> Arc<CustomCheck> {
    Arc::new(CustomCheck::new(name, || async {
        Ok::<_, CheckFailure>(json!("ok"))
    }))
}

fn failing_check(name: &'static str, message: &'static str) -> Arc<CustomCheck> {
    Arc::new(CustomCheck::new(name, move || async move {
        Err(CheckFailure::new(message))
    }))
}

// ==================== Result / streak tests ====================

#[test]
fn test_healthy_result_carries_no_streak() {
    let result = CheckResult::merge(
        None,
        json!("ok"),
        None,
        Duration::from_millis(5),
        chrono::Utc::now(),
    );

    assert!(result.is_healthy());
    assert_eq!(result.contiguous_failures, 0);
    assert!(result.time_of_first_failure.is_none());
}

#[test]
fn test_first_failure_starts_streak() {
    let now = chrono::Utc::now();
    let result = CheckResult::merge(None, Value::Null, Some("boom".into()), Duration::ZERO, now);

    assert!(!result.is_healthy());
    assert_eq!(result.contiguous_failures, 1);
    assert_eq!(result.time_of_first_failure, Some(now));
}

#[test]
fn test_repeated_failures_extend_streak_and_keep_onset() {
    let onset = chrono::Utc::now();
    let first = CheckResult::merge(None, Value::Null, Some("boom".into()), Duration::ZERO, onset);

    let later = onset + chrono::Duration::seconds(10);
    let second = CheckResult::merge(
        Some(&first),
        Value::Null,
        Some("boom".into()),
        Duration::ZERO,
        later,
    );

    assert_eq!(second.contiguous_failures, 2);
    // the onset marks the start of the streak, not the latest failure
    assert_eq!(second.time_of_first_failure, Some(onset));
    assert_eq!(second.timestamp, later);
}

#[test]
fn test_success_resets_streak() {
    let onset = chrono::Utc::now();
    let failed = CheckResult::merge(None, Value::Null, Some("boom".into()), Duration::ZERO, onset);

    let recovered = CheckResult::merge(
        Some(&failed),
        json!("ok"),
        None,
        Duration::ZERO,
        onset + chrono::Duration::seconds(1),
    );

    assert!(recovered.is_healthy());
    assert_eq!(recovered.contiguous_failures, 0);
    assert!(recovered.time_of_first_failure.is_none());
}

#[test]
fn test_failure_after_recovery_starts_new_streak() {
    let t0 = chrono::Utc::now();
    let failed = CheckResult::merge(None, Value::Null, Some("a".into()), Duration::ZERO, t0);
    let recovered = CheckResult::merge(
        Some(&failed),
        json!("ok"),
        None,
        Duration::ZERO,
        t0 + chrono::Duration::seconds(1),
    );

    let t2 = t0 + chrono::Duration::seconds(2);
    let failed_again =
        CheckResult::merge(Some(&recovered), Value::Null, Some("b".into()), Duration::ZERO, t2);

    assert_eq!(failed_again.contiguous_failures, 1);
    assert_eq!(failed_again.time_of_first_failure, Some(t2));
}

#[test]
fn test_result_serializes_plain_error_and_millis() {
    let result = CheckResult::merge(
        None,
        json!({ "attempt": 1 }),
        Some("boom".to_string()),
        Duration::from_millis(250),
        chrono::Utc::now(),
    );

    let encoded = serde_json::to_value(&result).unwrap();
    assert_eq!(encoded["error"], "boom");
    assert_eq!(encoded["duration_ms"], 250);
    assert_eq!(encoded["contiguous_failures"], 1);
    assert_eq!(encoded["details"]["attempt"], 1);
}

#[test]
fn test_check_failure_display_and_details() {
    let failure = CheckFailure::new("connection refused").with_details(json!({ "port": 5432 }));

    assert_eq!(failure.to_string(), "connection refused");
    assert_eq!(failure.details["port"], 5432);
}

// ==================== Registration tests ====================

#[tokio::test]
async fn test_register_rejects_empty_name() {
    let registry = Registry::new();

    let err = registry
        .register_check(Config::new(passing_check(""), Duration::from_secs(1)))
        .await
        .unwrap_err();

    assert!(matches!(err, HealthError::InvalidConfiguration(_)));
    assert!(registry.results().0.is_empty());
}

#[tokio::test]
async fn test_register_rejects_zero_period() {
    let registry = Registry::new();

    let err = registry
        .register_check(Config::new(passing_check("db"), Duration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, HealthError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn test_initial_result_is_failing_by_default() {
    let registry = Registry::new();

    // long initial delay so the first real execution never happens here
    assert_ok!(
        registry
            .register_check(
                Config::new(failing_check("db", "boom"), Duration::from_secs(60))
                    .with_initial_delay(Duration::from_secs(3600)),
            )
            .await
    );

    let (results, healthy) = registry.results();
    let result = &results["db"];
    assert!(!healthy);
    assert_eq!(result.error.as_deref(), Some("didn't run yet"));
    assert_eq!(result.contiguous_failures, 1);
    assert!(result.time_of_first_failure.is_some());
}

#[tokio::test]
async fn test_initially_passing_records_healthy_result() {
    let registry = Registry::new();

    assert_ok!(
        registry
            .register_check(
                Config::new(failing_check("db", "boom"), Duration::from_secs(60))
                    .with_initial_delay(Duration::from_secs(3600))
                    .initially_passing(true),
            )
            .await
    );

    let (results, healthy) = registry.results();
    assert!(healthy);
    assert!(results["db"].is_healthy());
    assert_eq!(results["db"].contiguous_failures, 0);
}

#[tokio::test]
async fn test_empty_registry_is_vacuously_healthy() {
    let registry = Registry::new();

    let (results, healthy) = registry.results();
    assert!(results.is_empty());
    assert!(healthy);
    assert!(registry.is_healthy());
}

#[tokio::test]
async fn test_deregister_unknown_name_is_noop() {
    let registry = Registry::new();
    registry.deregister("never-registered");
    assert!(registry.is_healthy());
}
