//! Store-backed revocation checks for token validation.
//!
//! [`RevocationChecker`] loads the current [`EventSnapshot`] from a
//! [`RevocationEventStore`] and matches a token's claims against it.
//!
//! # Architecture
//!
//! ```text
//! token validated → claims extracted
//!                 → snapshot() with store_timeout
//!                 → ok?       remember as last-known, match
//!                 → transient error?
//!                     FailClosed           → StoreUnavailable
//!                     LastKnown (fresh)    → match last-known snapshot
//!                     LastKnown (too old)  → StoreUnavailable
//! ```
//!
//! Treating an unreachable store as "nothing is revoked" is never an option:
//! either the caller fails the request or a bounded-staleness copy answers.
//!
//! # Example
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//! use chrono::Utc;
//! use os_revoke_authn::{FallbackPolicy, RevocationChecker, TokenClaims};
//! use os_revoke_storage::MemoryEventStore;
//!
//! # async fn example() -> Result<(), os_revoke_authn::AuthError> {
//! let checker = RevocationChecker::new(Arc::new(MemoryEventStore::new()))
//!     .with_fallback(FallbackPolicy::LastKnown { max_staleness: Duration::from_secs(300) });
//!
//! let claims = TokenClaims::builder().issued_at(Utc::now()).audit_id("abc").build();
//! checker.ensure_not_revoked(&claims).await?;
//! # Ok(())
//! # }
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use fail::fail_point;
use os_revoke_storage::{EventSnapshot, RevocationEventStore, StorageError};
use parking_lot::Mutex;

use crate::{claims::TokenClaims, error::AuthError, matcher};

/// Default bound on a single snapshot load (5 seconds).
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// What a check does when the store cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fail the check with [`AuthError::StoreUnavailable`].
    #[default]
    FailClosed,
    /// Answer from the last successfully loaded snapshot while it is younger
    /// than `max_staleness`; fail closed afterwards.
    LastKnown {
        /// Oldest last-known snapshot still used.
        max_staleness: Duration,
    },
}

struct LastKnown {
    snapshot: Arc<EventSnapshot>,
    loaded_at: Instant,
}

/// Decides whether tokens are revoked.
pub struct RevocationChecker {
    store: Arc<dyn RevocationEventStore>,
    fallback: FallbackPolicy,
    store_timeout: Duration,
    /// Populated only when `fallback` is `LastKnown`.
    last_known: Mutex<Option<LastKnown>>,
    fallback_hits: AtomicU64,
}

impl RevocationChecker {
    /// Creates a fail-closed checker with [`DEFAULT_STORE_TIMEOUT`].
    pub fn new(store: Arc<dyn RevocationEventStore>) -> Self {
        Self {
            store,
            fallback: FallbackPolicy::FailClosed,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            last_known: Mutex::new(None),
            fallback_hits: AtomicU64::new(0),
        }
    }

    /// Sets the behavior when the store is unreachable.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the bound on a single snapshot load.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// The configured fallback policy.
    #[must_use]
    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Number of checks answered from the last-known snapshot.
    #[must_use]
    pub fn fallback_hits(&self) -> u64 {
        self.fallback_hits.load(Ordering::Relaxed)
    }

    /// Returns `true` if any retained revocation event matches `claims`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::StoreUnavailable`] if the store cannot be read in
    /// time and the fallback policy does not allow answering anyway.
    #[tracing::instrument(skip(self, claims), fields(audit_id = claims.audit_id.as_deref()))]
    pub async fn is_revoked(&self, claims: &TokenClaims) -> Result<bool, AuthError> {
        let snapshot = self.load_snapshot().await?;
        let revoked = matcher::is_revoked(&snapshot, claims);
        tracing::debug!(revoked, events = snapshot.len(), "revocation check");
        Ok(revoked)
    }

    /// Like [`is_revoked`](Self::is_revoked), but a revoked token is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenRevoked`] if a revocation event matches, or
    /// [`AuthError::StoreUnavailable`] as for `is_revoked`.
    pub async fn ensure_not_revoked(&self, claims: &TokenClaims) -> Result<(), AuthError> {
        if self.is_revoked(claims).await? {
            return Err(AuthError::token_revoked(claims.audit_id.clone()));
        }
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Arc<EventSnapshot>, AuthError> {
        fail_point!("checker-before-snapshot", |_| {
            self.on_store_error(StorageError::connection("injected failure before snapshot"))
        });

        let result = tokio::time::timeout(self.store_timeout, self.store.snapshot())
            .await
            .unwrap_or_else(|_| Err(StorageError::timeout()));

        match result {
            Ok(snapshot) => {
                if matches!(self.fallback, FallbackPolicy::LastKnown { .. }) {
                    *self.last_known.lock() =
                        Some(LastKnown { snapshot: Arc::clone(&snapshot), loaded_at: Instant::now() });
                }
                Ok(snapshot)
            },
            Err(err) => self.on_store_error(err),
        }
    }

    fn on_store_error(&self, err: StorageError) -> Result<Arc<EventSnapshot>, AuthError> {
        if err.is_transient()
            && let FallbackPolicy::LastKnown { max_staleness } = self.fallback
            && let Some((snapshot, age)) = self.last_known_within(max_staleness)
        {
            self.fallback_hits.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                fallback_age_secs = age.as_secs(),
                error = %err,
                "revocation store unavailable, using last-known events"
            );
            return Ok(snapshot);
        }

        tracing::warn!(error = %err, "revocation store unavailable, failing closed");
        Err(AuthError::store_unavailable(err))
    }

    fn last_known_within(&self, max_staleness: Duration) -> Option<(Arc<EventSnapshot>, Duration)> {
        let guard = self.last_known.lock();
        let entry = guard.as_ref()?;
        let age = entry.loaded_at.elapsed();
        (age <= max_staleness).then(|| (Arc::clone(&entry.snapshot), age))
    }
}
