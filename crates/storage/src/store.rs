//! Storage trait for revocation events.
//!
//! [`RevocationEventStore`] is the seam between the identity system that
//! emits revocations, the token validators that consult them and the listing
//! endpoint that publishes them.
//!
//! # Event Lifecycle
//!
//! ```text
//! revoke(criteria) ──► append ──► retained ──► prunable ──► pruned
//!                       │            │
//!                       │            ├──► list(since)   (polling clients)
//!                       │            └──► snapshot()    (token matching)
//!                       └── assigns created_at, strictly increasing
//! ```
//!
//! # Consistency
//!
//! - Appends are linearizable: each receives a `created_at` greater than every
//!   earlier one, so `since` polling never skips an event.
//! - Reads observe a complete snapshot as of the call; a concurrent prune never
//!   removes an event from a snapshot a reader already holds.
//!
//! # Error Handling
//!
//! An unreachable store surfaces as a transient [`StorageError`]. The store
//! never decides what a caller does with that; token validators choose between
//! failing closed and a last-known snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::StorageResult,
    event::{RevocationCriteria, RevocationEvent},
    health::{HealthProbe, HealthStatus},
    retention::RetentionPolicy,
    snapshot::{EventListing, EventSnapshot},
};

/// Persistence layer for revocation events.
#[async_trait]
pub trait RevocationEventStore: Send + Sync {
    /// Stores a new revocation event and returns its stored form.
    ///
    /// The store assigns `created_at`.
    ///
    /// # Errors
    ///
    /// Returns a transient [`StorageError`](crate::StorageError) if the backing
    /// persistence cannot be reached.
    async fn append(&self, criteria: RevocationCriteria) -> StorageResult<Arc<RevocationEvent>>;

    /// Returns a consistent view of every retained event.
    ///
    /// # Errors
    ///
    /// Returns a transient [`StorageError`](crate::StorageError) if the backing
    /// persistence cannot be reached.
    async fn snapshot(&self) -> StorageResult<Arc<EventSnapshot>>;

    /// Lists events with `created_at >= since` (all events when `None`) in
    /// creation order, plus the watermark of the whole store.
    ///
    /// The default implementation filters a [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying read.
    async fn list(&self, since: Option<DateTime<Utc>>) -> StorageResult<EventListing> {
        Ok(self.snapshot().await?.listing(since))
    }

    /// Removes every event `policy` considers prunable at `now`.
    ///
    /// Returns the number of events removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`](crate::StorageError) if the removal could not
    /// be applied; no event is removed in that case.
    async fn prune(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> StorageResult<usize>;

    /// Reports whether the store can serve traffic.
    ///
    /// # Errors
    ///
    /// Returns an error only if the probe itself could not run.
    async fn health_check(&self, probe: HealthProbe) -> StorageResult<HealthStatus>;
}
