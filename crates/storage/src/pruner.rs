//! Background pruning of revocation events.
//!
//! [`EventPruner`] periodically asks a [`RevocationEventStore`] to drop the
//! events its [`RetentionPolicy`] no longer needs, which bounds the number of
//! events every token check has to consider.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use os_revoke_storage::{EventPruner, MemoryEventStore, RetentionPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let store = Arc::new(MemoryEventStore::new());
//! let shutdown = CancellationToken::new();
//!
//! let handle = EventPruner::new(store, RetentionPolicy::default()).spawn(shutdown.clone());
//!
//! // ... serve traffic ...
//!
//! shutdown.cancel();
//! let _ = handle.await;
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{error::StorageResult, retention::RetentionPolicy, store::RevocationEventStore};

/// Shortest period the background loop runs at.
const MIN_PRUNE_INTERVAL: Duration = Duration::from_millis(1);

/// Removes expired revocation events from a store.
pub struct EventPruner {
    store: Arc<dyn RevocationEventStore>,
    policy: RetentionPolicy,
}

impl EventPruner {
    /// Creates a pruner for `store` governed by `policy`.
    pub fn new(store: Arc<dyn RevocationEventStore>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Runs a single prune pass as of `now`.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; nothing is removed in that case.
    pub async fn run_once(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let pruned = self.store.prune(&self.policy, now).await?;
        if pruned > 0 {
            tracing::info!(pruned, "pruned expired revocation events");
        } else {
            tracing::debug!("no revocation events to prune");
        }
        Ok(pruned)
    }

    /// Spawns the pruning loop, one pass every `prune_interval`.
    ///
    /// Failed passes are logged and retried on the next tick. The loop exits
    /// when `token` is cancelled. When the policy is disabled the task returns
    /// immediately.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            if !self.policy.enabled {
                tracing::info!("event pruning disabled");
                return;
            }

            // `interval` panics on a zero period.
            let period = self.policy.prune_interval.max(MIN_PRUNE_INTERVAL);
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; consume it so we start
            // with a full interval wait.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("event pruner shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(error) = self.run_once(Utc::now()).await {
                            tracing::warn!(%error, "prune pass failed");
                        }
                    }
                }
            }
        })
    }
}
