#![cfg(feature = "failpoints")]
#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p os-revoke-storage --features failpoints --test failpoint_tests
//! ```

use std::sync::Arc;

use chrono::Utc;
use os_revoke_storage::{
    EventPruner, MemoryEventStore, RetentionPolicy, RevocationCriteria, RevocationEventStore,
};

#[tokio::test]
async fn append_failpoint_returns_transient_error() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("memory-store-append", "return").expect("failed to configure fail point");

    let store = MemoryEventStore::new();
    let result = store.append(RevocationCriteria::for_audit_id("a")).await;

    let err = result.expect_err("append should fail when fail point is active");
    assert!(err.is_transient());

    fail::remove("memory-store-append");
    assert!(store.list(None).await.expect("list").watermark.is_none(), "failed append left no trace");

    scenario.teardown();
}

#[tokio::test]
async fn snapshot_failpoint_fails_listing() {
    let scenario = fail::FailScenario::setup();

    let store = MemoryEventStore::new();
    store.append(RevocationCriteria::for_audit_id("a")).await.expect("append");

    fail::cfg("memory-store-snapshot", "return").expect("failed to configure fail point");
    assert!(store.list(None).await.is_err(), "list goes through snapshot");

    fail::remove("memory-store-snapshot");
    assert_eq!(store.list(None).await.expect("list").events.len(), 1);

    scenario.teardown();
}

#[tokio::test]
async fn prune_failpoint_keeps_events_and_pruner_survives() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("memory-store-prune", "return").expect("failed to configure fail point");

    let store = Arc::new(MemoryEventStore::new());
    store.append(RevocationCriteria::for_audit_id("a")).await.expect("append");

    let policy = RetentionPolicy::builder()
        .max_token_lifetime(std::time::Duration::ZERO)
        .expiration_buffer(std::time::Duration::ZERO)
        .build();
    let pruner = EventPruner::new(store.clone(), policy);

    let later = Utc::now() + chrono::TimeDelta::seconds(1);
    assert!(pruner.run_once(later).await.is_err());
    assert_eq!(store.snapshot().await.expect("snapshot").len(), 1);

    fail::remove("memory-store-prune");
    assert_eq!(pruner.run_once(later).await.expect("prune"), 1);

    scenario.teardown();
}
