//! Concurrent access tests for `MemoryEventStore`.
//!
//! Appends, listings and prune passes run in parallel to detect lost events,
//! duplicated timestamps and readers observing partial writes. The heavier
//! variants are ignored by default:
//!
//! ```bash
//! cargo test -p os-revoke-storage --test concurrent_stress -- --ignored
//! ```

#![allow(clippy::expect_used, clippy::panic)]

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{TimeDelta, Utc};
use os_revoke_storage::{
    MemoryEventStore, RetentionPolicy, RevocationCriteria, RevocationEventStore,
    testutil::make_audit_id,
};
use tokio::task::JoinSet;

/// Number of concurrent tasks for most tests.
const CONCURRENCY: usize = 16;

/// Number of appends each task performs.
const OPS_PER_TASK: usize = 100;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

async fn append_from_tasks(store: &MemoryEventStore, tasks: usize, per_task: usize) {
    let mut set = JoinSet::new();
    for task_id in 0..tasks {
        let store = store.clone();
        set.spawn(async move {
            for i in 0..per_task {
                let criteria = RevocationCriteria::for_audit_id(make_audit_id(task_id * per_task + i));
                store.append(criteria).await.expect("append should succeed");
            }
        });
    }

    while let Some(result) = set.join_next().await {
        result.expect("task should not panic");
    }
}

// ---------------------------------------------------------------------------
// Test: Parallel appends get distinct, strictly increasing timestamps
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_appends_get_distinct_increasing_timestamps() {
    let store = MemoryEventStore::new();
    append_from_tasks(&store, 8, 25).await;

    let listing = store.list(None).await.expect("list should succeed");
    assert_eq!(listing.events.len(), 200);

    for pair in listing.events.windows(2) {
        assert!(
            pair[0].created_at() < pair[1].created_at(),
            "timestamps must be strictly increasing in listing order"
        );
    }

    let ids: HashSet<_> =
        listing.events.iter().filter_map(|e| e.criteria().audit_id.clone()).collect();
    assert_eq!(ids.len(), 200, "no event may be lost or duplicated");
    assert_eq!(listing.watermark, listing.events.last().map(|e| e.created_at()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn parallel_appends_stress() {
    let store = MemoryEventStore::new();
    append_from_tasks(&store, CONCURRENCY, OPS_PER_TASK).await;

    let snapshot = store.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.len(), CONCURRENCY * OPS_PER_TASK);
}

// ---------------------------------------------------------------------------
// Test: Readers polling with `since` never miss an event
// ---------------------------------------------------------------------------

/// A poller repeatedly asks for `since = last watermark` while writers append.
/// Every appended event must be observed at least once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn since_polling_observes_every_event() {
    let store = MemoryEventStore::new();
    let total = 4 * 50;

    let writers = {
        let store = store.clone();
        tokio::spawn(async move { append_from_tasks(&store, 4, 50).await })
    };

    let mut seen = HashSet::new();
    let mut since = None;
    loop {
        let listing = store.list(since).await.expect("list should succeed");
        for event in &listing.events {
            seen.insert(event.criteria().audit_id.clone().expect("audit-scoped"));
        }
        since = listing.watermark;

        if seen.len() == total {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    writers.await.expect("writers should not panic");
    assert_eq!(seen.len(), total);
}

// ---------------------------------------------------------------------------
// Test: Pruning under concurrent readers
// ---------------------------------------------------------------------------

/// Readers hold snapshots while a prune pass removes everything. Each held
/// snapshot stays complete; later snapshots are empty.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pruning_does_not_affect_in_flight_readers() {
    let store = MemoryEventStore::new();
    append_from_tasks(&store, 4, 25).await;

    let mut readers = JoinSet::new();
    for _ in 0..CONCURRENCY {
        let store = store.clone();
        readers.spawn(async move {
            let held = store.snapshot().await.expect("snapshot should succeed");
            tokio::time::sleep(Duration::from_millis(20)).await;
            held.len()
        });
    }

    tokio::time::sleep(Duration::from_millis(5)).await;
    let policy = RetentionPolicy::builder()
        .max_token_lifetime(Duration::ZERO)
        .expiration_buffer(Duration::ZERO)
        .build();
    let removed = store.prune(&policy, Utc::now() + TimeDelta::seconds(1)).await.expect("prune");
    assert_eq!(removed, 100);

    while let Some(result) = readers.join_next().await {
        assert_eq!(result.expect("reader should not panic"), 100);
    }
    assert!(store.snapshot().await.expect("snapshot").is_empty());
}

/// Appends interleaved with prune passes: the watermark never decreases and
/// every listing stays in creation order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn watermark_is_monotonic_under_pruning() {
    let store = Arc::new(MemoryEventStore::new());
    let policy = RetentionPolicy::builder()
        .max_token_lifetime(Duration::ZERO)
        .expiration_buffer(Duration::ZERO)
        .build();

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..200 {
                store.append(RevocationCriteria::for_audit_id(make_audit_id(i))).await.expect("append");
            }
        })
    };
    let pruner = {
        let store = Arc::clone(&store);
        let policy = policy.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                store.prune(&policy, Utc::now()).await.expect("prune");
                tokio::task::yield_now().await;
            }
        })
    };

    let mut last = None;
    for _ in 0..100 {
        let listing = store.list(None).await.expect("list");
        assert!(listing.watermark >= last, "watermark went backwards");
        for pair in listing.events.windows(2) {
            assert!(pair[0].created_at() < pair[1].created_at());
        }
        last = listing.watermark;
        tokio::task::yield_now().await;
    }

    writer.await.expect("writer should not panic");
    pruner.await.expect("pruner should not panic");
}
