//! # OS-REVOKE token revocation checks
//!
//! Decides whether a token is revoked by matching its claims against the
//! revocation events held in an [`os_revoke_storage::RevocationEventStore`].
//!
//! This crate provides:
//! - **Matching**: the per-field rules that decide whether one event revokes a token
//! - **Checking**: [`RevocationChecker`], which loads events with a bounded timeout and fails
//!   closed, or answers from a staleness-bounded last-known snapshot, when the store is down
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use os_revoke_authn::{RevocationChecker, TokenClaims};
//! use os_revoke_storage::{MemoryEventStore, RevocationCriteria, RevocationEventStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryEventStore::new());
//! store.append(RevocationCriteria::for_audit_chain("abc")).await?;
//!
//! let checker = RevocationChecker::new(store);
//! let claims = TokenClaims::builder().issued_at(Utc::now()).audit_chain_id("abc").build();
//!
//! assert!(checker.is_revoked(&claims).await?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Store-backed revocation checks.
pub mod checker;
/// Token claims.
pub mod claims;
/// Revocation check error types.
pub mod error;
/// Event matching rules.
pub mod matcher;

pub use checker::{DEFAULT_STORE_TIMEOUT, FallbackPolicy, RevocationChecker};
pub use claims::TokenClaims;
pub use error::{AuthError, Result};
pub use matcher::{criteria_match, event_matches, is_revoked, matching_event};
