//! Tests for the throttle module

use super::*;
use crate::config::{DelaySetting, ThrottleConfig};
use crate::response::ResponseEnvelope;
use crate::types::{ApiFamily, Headers, ThrottleTier};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_case::test_case;

fn config(normal: f64, priority: f64) -> ThrottleConfig {
    ThrottleConfig {
        normal_threshold: normal,
        priority_threshold: priority,
        normal_delay_ms: Some(DelaySetting::Millis(20)),
        priority_delay_ms: Some(DelaySetting::Millis(10)),
        ..ThrottleConfig::default()
    }
}

fn controller(store: &InMemoryStore, normal: f64, priority: f64) -> ThrottleController {
    ThrottleController::new("demo.myshopify.com", config(normal, priority), Arc::new(store.clone()))
}

// ============================================================================
// Quota Extraction Tests
// ============================================================================

#[test]
fn test_rest_quota_header() {
    let mut headers = Headers::new();
    headers.insert(REST_CALL_LIMIT_HEADER.to_string(), "32/40".to_string());
    let quota = QuotaReport::from_rest_headers(&headers).unwrap();
    assert_eq!(quota.available, 8.0);
    assert_eq!(quota.maximum, 40.0);
    assert_eq!(quota.percent_available(), 20.0);
}

#[test_case("" ; "empty")]
#[test_case("40" ; "no separator")]
#[test_case("a/40" ; "not a number")]
#[test_case("0/0" ; "zero maximum")]
fn test_rest_quota_header_malformed(value: &str) {
    let mut headers = Headers::new();
    headers.insert(REST_CALL_LIMIT_HEADER.to_string(), value.to_string());
    assert!(QuotaReport::from_rest_headers(&headers).is_none());
}

#[test]
fn test_graphql_quota_body() {
    let body = json!({
        "data": {},
        "extensions": {"cost": {"throttleStatus": {
            "maximumAvailable": 1000.0,
            "currentlyAvailable": 250,
            "restoreRate": 50.0
        }}}
    });
    let envelope = ResponseEnvelope::new(Some(200), Headers::new(), Some(body));
    let quota = QuotaReport::from_response(ApiFamily::Graphql, &envelope).unwrap();
    assert_eq!(quota.percent_available(), 25.0);
    assert!(QuotaReport::from_response(ApiFamily::Rest, &envelope).is_none());
}

#[test]
fn test_retry_after() {
    let mut headers = Headers::new();
    assert_eq!(retry_after(&headers), None);
    headers.insert(RETRY_AFTER_HEADER.to_string(), "2.0".to_string());
    assert_eq!(retry_after(&headers), Some(2.0));
}

// ============================================================================
// Flag Computation Tests
// ============================================================================

#[test]
fn test_flags_low_availability() {
    let store = InMemoryStore::new();
    let flags = controller(&store, 30.0, 20.0).flags_for(&QuotaReport::new(10.0, 40.0).unwrap());
    assert_eq!(
        flags,
        ThrottleFlags {
            normal: true,
            priority: true
        }
    );
}

#[test]
fn test_flags_high_availability() {
    let store = InMemoryStore::new();
    let flags = controller(&store, 30.0, 20.0).flags_for(&QuotaReport::new(35.0, 40.0).unwrap());
    assert_eq!(flags, ThrottleFlags::default());
}

#[test]
fn test_tiers_diverge() {
    let store = InMemoryStore::new();
    // 40% consumed: over the normal allowance, under the priority one
    let flags = controller(&store, 30.0, 60.0).flags_for(&QuotaReport::new(24.0, 40.0).unwrap());
    assert!(flags.normal);
    assert!(!flags.priority);
}

// ============================================================================
// Update / Gate Tests
// ============================================================================

#[tokio::test]
async fn test_update_writes_both_flags() {
    let store = InMemoryStore::new();
    let throttle = controller(&store, 30.0, 20.0);

    let flags = throttle
        .update(ApiFamily::Rest, QuotaReport::new(10.0, 40.0))
        .await
        .unwrap();
    assert_eq!(
        flags,
        Some(ThrottleFlags {
            normal: true,
            priority: true
        })
    );

    assert_eq!(
        store
            .get("demo.myshopify.com:rest:should_delay")
            .await
            .unwrap(),
        Some(json!(true))
    );
    assert_eq!(
        store
            .get("demo.myshopify.com:rest:should_delay:priority")
            .await
            .unwrap(),
        Some(json!(true))
    );
    assert!(!throttle
        .is_delayed(ApiFamily::Graphql, ThrottleTier::Normal)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_without_quota_is_skipped() {
    let store = InMemoryStore::new();
    let throttle = controller(&store, 30.0, 20.0);
    throttle
        .update(ApiFamily::Rest, QuotaReport::new(10.0, 40.0))
        .await
        .unwrap();

    let result = throttle.update(ApiFamily::Rest, None).await.unwrap();
    assert_eq!(result, None);
    assert!(throttle
        .is_delayed(ApiFamily::Rest, ThrottleTier::Normal)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_gate_sleeps_for_flagged_tier() {
    let store = InMemoryStore::new();
    let throttle = controller(&store, 30.0, 60.0);
    throttle
        .update(ApiFamily::Rest, QuotaReport::new(24.0, 40.0))
        .await
        .unwrap();

    let start = Instant::now();
    let slept = throttle
        .gate(ApiFamily::Rest, ThrottleTier::Normal)
        .await
        .unwrap();
    assert_eq!(slept, Duration::from_millis(20));
    assert!(start.elapsed() >= Duration::from_millis(20));

    let slept = throttle
        .gate(ApiFamily::Rest, ThrottleTier::Priority)
        .await
        .unwrap();
    assert_eq!(slept, Duration::ZERO);
}

#[tokio::test]
async fn test_gate_default_delay() {
    let store = InMemoryStore::new();
    let throttle = ThrottleController::new(
        "demo",
        ThrottleConfig {
            normal_threshold: 30.0,
            normal_delay_ms: Some(DelaySetting::Text("soon".into())),
            ..ThrottleConfig::default()
        },
        Arc::new(store.clone()),
    );
    throttle
        .update(ApiFamily::Rest, QuotaReport::new(10.0, 40.0))
        .await
        .unwrap();

    let start = Instant::now();
    let slept = throttle
        .gate(ApiFamily::Rest, ThrottleTier::Normal)
        .await
        .unwrap();
    assert_eq!(slept, Duration::from_millis(500));
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_disabled_throttle_is_inert() {
    let store = InMemoryStore::new();
    let throttle = ThrottleController::new(
        "demo",
        ThrottleConfig {
            enabled: false,
            ..config(0.0, 0.0)
        },
        Arc::new(store.clone()),
    );
    assert_eq!(
        throttle
            .update(ApiFamily::Rest, QuotaReport::new(1.0, 40.0))
            .await
            .unwrap(),
        None
    );
    assert!(store.is_empty().await);
    assert_eq!(
        throttle
            .gate(ApiFamily::Rest, ThrottleTier::Normal)
            .await
            .unwrap(),
        Duration::ZERO
    );
}

#[tokio::test]
async fn test_foreign_flag_encodings() {
    let store = InMemoryStore::new();
    let throttle = controller(&store, 30.0, 20.0);
    store
        .put(
            &throttle.flag_key(ApiFamily::Rest, ThrottleTier::Normal),
            json!(1),
            FLAG_TTL,
        )
        .await
        .unwrap();
    store
        .put(
            &throttle.flag_key(ApiFamily::Rest, ThrottleTier::Priority),
            json!("0"),
            FLAG_TTL,
        )
        .await
        .unwrap();

    assert!(throttle
        .is_delayed(ApiFamily::Rest, ThrottleTier::Normal)
        .await
        .unwrap());
    assert!(!throttle
        .is_delayed(ApiFamily::Rest, ThrottleTier::Priority)
        .await
        .unwrap());
}

// ============================================================================
// Store Tests
// ============================================================================

#[tokio::test]
async fn test_in_memory_store_expiry() {
    let store = InMemoryStore::new();
    store
        .put("k", json!(true), Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(json!(true)));

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_in_memory_store_clones_share_entries() {
    let store = InMemoryStore::new();
    let other = store.clone();
    store.put("k", json!("v"), FLAG_TTL).await.unwrap();
    assert_eq!(other.get("k").await.unwrap(), Some(json!("v")));
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    let store = FileStore::new(&path);

    assert_eq!(store.get("missing").await.unwrap(), None);
    store.put("a", json!(true), FLAG_TTL).await.unwrap();
    store.put("b", json!(false), FLAG_TTL).await.unwrap();

    // A second handle on the same file sees the same flags
    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get("a").await.unwrap(), Some(json!(true)));
    assert_eq!(reopened.get("b").await.unwrap(), Some(json!(false)));
}

#[tokio::test]
async fn test_file_store_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("throttle.json"));
    store
        .put("k", json!(true), Duration::from_millis(10))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_file_stores_on_same_path_write_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    let first = FileStore::new(&path);
    let second = FileStore::new(&path);

    let mut writes = tokio::task::JoinSet::new();
    for i in 0..8 {
        let store = if i % 2 == 0 { first.clone() } else { second.clone() };
        writes.spawn(async move { store.put(&format!("key{i}"), json!(i), FLAG_TTL).await });
    }
    while let Some(result) = writes.join_next().await {
        assert!(result.unwrap().is_ok());
    }

    for i in 0..8 {
        assert_eq!(first.get(&format!("key{i}")).await.unwrap(), Some(json!(i)));
    }
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "throttle.json")
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[tokio::test]
async fn test_file_store_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("throttle.json");
    std::fs::write(&path, "not json").unwrap();
    let store = FileStore::new(&path);
    assert!(store.get("k").await.is_err());
}
