//! In-memory revocation event store.
//!
//! [`MemoryEventStore`] keeps the retained events in a single
//! [`EventSnapshot`] behind `RwLock<Arc<_>>`:
//!
//! - **Readers** clone the `Arc` under a momentary read lock and work on that
//!   snapshot without holding any lock.
//! - **Writers** (append, prune) take the write lock and modify the snapshot
//!   through [`Arc::make_mut`]. If a reader still holds the current snapshot it
//!   is copied first, so in-flight listings and matches never see a partial
//!   write and never lose an event to a concurrent prune.
//!
//! The copy is a full clone of the event list and both indexes. A caller that
//! keeps the current snapshot alive between writes, such as a
//! `RevocationChecker` with a last-known fallback, makes every append and
//! prune pay for that clone, which is linear in the number of retained events.
//!
//! The write lock is also the single serialization point for `created_at`
//! assignment.
//!
//! # Example
//!
//! ```
//! use os_revoke_storage::{MemoryEventStore, RevocationCriteria, RevocationEventStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryEventStore::new();
//!
//!     let event = store.append(RevocationCriteria::for_audit_chain("abc")).await?;
//!     let listing = store.list(None).await?;
//!
//!     assert_eq!(listing.events.len(), 1);
//!     assert_eq!(listing.watermark, Some(event.created_at()));
//!     Ok(())
//! }
//! ```
//!
//! # Limitations
//!
//! - Events are not persisted; everything is lost when the process exits
//! - One store per process; there is no replication

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use fail::fail_point;
use parking_lot::RwLock;

use crate::{
    error::StorageResult,
    event::{RevocationCriteria, RevocationEvent},
    health::{HealthMetadata, HealthProbe, HealthStatus},
    retention::RetentionPolicy,
    snapshot::EventSnapshot,
    store::RevocationEventStore,
};

/// How long a health check waits for the store lock before reporting the
/// store as wedged.
const HEALTH_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// In-memory implementation of [`RevocationEventStore`].
///
/// Cheaply cloneable; all clones share the same events.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    state: Arc<RwLock<Arc<EventSnapshot>>>,
    /// Applied inside `append` when `prune_on_append` is set.
    retention: Option<RetentionPolicy>,
}

impl MemoryEventStore {
    /// Creates an empty store that only prunes when asked to.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that applies `policy` on every append when
    /// `policy.prune_on_append` is set.
    #[must_use]
    pub fn with_retention(policy: RetentionPolicy) -> Self {
        Self { state: Arc::default(), retention: Some(policy) }
    }

    fn append_policy(&self) -> Option<&RetentionPolicy> {
        self.retention.as_ref().filter(|p| p.enabled && p.prune_on_append)
    }
}

/// Next `created_at`: the wall clock at microsecond precision, bumped past the
/// watermark when the clock has not advanced.
fn next_created_at(watermark: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match watermark {
        Some(last) if now <= last => last + TimeDelta::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl RevocationEventStore for MemoryEventStore {
    #[tracing::instrument(skip(self, criteria))]
    async fn append(&self, criteria: RevocationCriteria) -> StorageResult<Arc<RevocationEvent>> {
        fail_point!("memory-store-append", |_| {
            Err(crate::StorageError::connection("injected failure before append"))
        });

        let global = criteria.is_global();
        let (event, pruned) = {
            let mut guard = self.state.write();
            let snapshot = Arc::make_mut(&mut *guard);

            let created_at = next_created_at(snapshot.watermark(), Utc::now());
            let seq = snapshot.next_seq();
            let event = snapshot.push(RevocationEvent::new(seq, created_at, criteria));

            let pruned = match self.append_policy() {
                Some(policy) => snapshot.retain(|e| !policy.is_prunable(e, created_at)),
                None => 0,
            };
            (event, pruned)
        };

        if global {
            tracing::warn!(
                created_at = %event.created_at(),
                "global revocation event appended; every token issued so far is revoked"
            );
        }
        tracing::debug!(seq = event.seq, created_at = %event.created_at(), pruned, "event appended");

        Ok(event)
    }

    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> StorageResult<Arc<EventSnapshot>> {
        fail_point!("memory-store-snapshot", |_| {
            Err(crate::StorageError::connection("injected failure before snapshot"))
        });

        Ok(Arc::clone(&self.state.read()))
    }

    #[tracing::instrument(skip(self, policy))]
    async fn prune(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> StorageResult<usize> {
        fail_point!("memory-store-prune", |_| {
            Err(crate::StorageError::connection("injected failure before prune"))
        });

        if !policy.enabled {
            return Ok(0);
        }

        let mut guard = self.state.write();

        // Skip the copy-on-write clone when nothing would be removed.
        if !guard.events().iter().any(|e| policy.is_prunable(e, now)) {
            return Ok(0);
        }

        let removed = Arc::make_mut(&mut *guard).retain(|e| !policy.is_prunable(e, now));
        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self, probe: HealthProbe) -> StorageResult<HealthStatus> {
        let started = Instant::now();
        // Taking the read lock proves the store is not wedged behind a writer.
        let Some(snapshot) = self.state.try_read_for(HEALTH_LOCK_TIMEOUT).map(|g| Arc::clone(&g))
        else {
            let metadata = HealthMetadata::new(started.elapsed(), "memory");
            return Ok(HealthStatus::unhealthy(
                metadata,
                format!("store lock not acquired within {}ms", HEALTH_LOCK_TIMEOUT.as_millis()),
            ));
        };

        let mut metadata = HealthMetadata::new(started.elapsed(), "memory");
        if probe == HealthProbe::Readiness {
            metadata = metadata.with_detail("event_count", snapshot.len().to_string());
            if let Some(watermark) = snapshot.watermark() {
                metadata = metadata.with_detail("watermark", watermark.to_rfc3339());
            }
        }

        Ok(HealthStatus::healthy(metadata))
    }
}
