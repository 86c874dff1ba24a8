//! Revocation event storage for OS-REVOKE.
//!
//! A revocation event records *which* issued tokens are no longer valid by
//! describing them through a set of criteria (user, project, audit id, ...)
//! rather than enumerating token identifiers. This crate owns the events:
//! appending them, publishing them to polling clients, and pruning them once
//! no unexpired token could match anymore.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          os-revoke-api (HTTP listing, revoke entry)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │      os-revoke-authn (token matching, RevocationChecker)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    os-revoke-storage                        │
//! │   RevocationEventStore trait │ RetentionPolicy │ Pruner     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   MemoryEventStore                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use os_revoke_storage::{MemoryEventStore, RevocationCriteria, RevocationEventStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryEventStore::new();
//!
//!     // Revoke every token issued to `alice` so far.
//!     store.append(RevocationCriteria::for_user("alice", Utc::now())).await?;
//!
//!     // Polling clients fetch everything, then only what is new.
//!     let listing = store.list(None).await?;
//!     let next = store.list(listing.watermark).await?;
//!     assert_eq!(next.events.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with shared test helpers (criteria generators,
//!   pre-populated stores, an always-unavailable store). Enable this in `[dev-dependencies]` for
//!   integration tests.
//! - **`failpoints`**: Compiles the `memory-store-*` fail points for fault injection tests.

#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod health;
pub mod memory;
pub mod pruner;
pub mod retention;
pub mod snapshot;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

pub use error::{BoxError, StorageError, StorageResult};
pub use event::{RevocationCriteria, RevocationEvent};
pub use health::{HealthMetadata, HealthProbe, HealthStatus};
pub use memory::MemoryEventStore;
pub use pruner::EventPruner;
pub use retention::{
    DEFAULT_EXPIRATION_BUFFER, DEFAULT_MAX_TOKEN_LIFETIME, DEFAULT_PRUNE_INTERVAL, RetentionPolicy,
};
pub use snapshot::{EventListing, EventSnapshot};
pub use store::RevocationEventStore;
