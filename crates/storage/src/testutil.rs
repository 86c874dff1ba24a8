//! Shared test utilities for revocation event stores.
//!
//! Feature-gated behind `testutil` so none of it reaches production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! os-revoke-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use os_revoke_storage::testutil::{make_audit_id, populated_store, UnavailableStore};
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::{StorageError, StorageResult},
    event::{RevocationCriteria, RevocationEvent},
    health::{HealthMetadata, HealthProbe, HealthStatus},
    memory::MemoryEventStore,
    retention::RetentionPolicy,
    snapshot::EventSnapshot,
    store::RevocationEventStore,
};

/// Deterministic audit id, e.g. `"audit-000042"`.
#[must_use]
pub fn make_audit_id(idx: usize) -> String {
    format!("audit-{idx:06}")
}

/// Deterministic audit chain id, e.g. `"chain-000042"`.
#[must_use]
pub fn make_chain_id(idx: usize) -> String {
    format!("chain-{idx:06}")
}

/// A mix of criteria shapes for index `idx`, cycling through audit id, audit
/// chain, user and project-role revocations.
#[must_use]
pub fn make_criteria(idx: usize, issued_before: DateTime<Utc>) -> RevocationCriteria {
    match idx % 4 {
        0 => RevocationCriteria::for_audit_id(make_audit_id(idx)),
        1 => RevocationCriteria::for_audit_chain(make_chain_id(idx)),
        2 => RevocationCriteria::for_user(format!("user-{idx}"), issued_before),
        _ => RevocationCriteria::for_project_role(format!("project-{idx}"), "member", issued_before),
    }
}

/// A [`MemoryEventStore`] holding `count` events built by [`make_criteria`].
///
/// # Panics
///
/// Panics if an append fails (should not happen with `MemoryEventStore`).
pub async fn populated_store(count: usize) -> MemoryEventStore {
    let store = MemoryEventStore::new();
    let issued_before = Utc::now();
    for i in 0..count {
        store.append(make_criteria(i, issued_before)).await.expect("populate append failed");
    }
    store
}

/// A store whose every operation fails with a transient connection error.
///
/// Used to exercise fail-closed and fallback paths.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> StorageError {
        StorageError::connection("revocation store unavailable")
    }
}

#[async_trait]
impl RevocationEventStore for UnavailableStore {
    async fn append(&self, _criteria: RevocationCriteria) -> StorageResult<Arc<RevocationEvent>> {
        Err(Self::error())
    }

    async fn snapshot(&self) -> StorageResult<Arc<EventSnapshot>> {
        Err(Self::error())
    }

    async fn prune(&self, _policy: &RetentionPolicy, _now: DateTime<Utc>) -> StorageResult<usize> {
        Err(Self::error())
    }

    async fn health_check(&self, _probe: HealthProbe) -> StorageResult<HealthStatus> {
        let metadata = HealthMetadata::new(std::time::Duration::ZERO, "unavailable");
        Ok(HealthStatus::unhealthy(metadata, "revocation store unavailable"))
    }
}

/// Helper to verify that a result is a transient error.
pub fn is_transient<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(e) if e.is_transient())
}
