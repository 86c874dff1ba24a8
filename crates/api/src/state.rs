use std::{future::Future, sync::Arc};

use chrono::{DateTime, Utc};
use os_revoke_authn::RevocationChecker;
use os_revoke_storage::{
    EventListing, HealthProbe, HealthStatus, RevocationCriteria, RevocationEvent,
    RevocationEventStore, StorageError, StorageResult,
};

use crate::{config::Config, errors::ApiError};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    store: Arc<dyn RevocationEventStore>,
    checker: Arc<RevocationChecker>,
}

impl AppState {
    pub fn new(cfg: Config, store: Arc<dyn RevocationEventStore>) -> Self {
        let checker = RevocationChecker::new(Arc::clone(&store))
            .with_fallback(cfg.fallback)
            .with_store_timeout(cfg.store_timeout);
        Self { cfg: Arc::new(cfg), store, checker: Arc::new(checker) }
    }

    /// Token checks for services embedding this router.
    pub fn checker(&self) -> &RevocationChecker {
        &self.checker
    }

    /// Entry point for the identity system: records a revocation.
    pub async fn revoke(&self, criteria: RevocationCriteria) -> Result<Arc<RevocationEvent>, ApiError> {
        let event = self.bounded(self.store.append(criteria)).await?;
        tracing::info!(created_at = %event.created_at(), "revocation recorded");
        Ok(event)
    }

    pub async fn list_events(&self, since: Option<DateTime<Utc>>) -> Result<EventListing, ApiError> {
        self.bounded(self.store.list(since)).await
    }

    pub async fn health(&self, probe: HealthProbe) -> Result<HealthStatus, ApiError> {
        self.bounded(self.store.health_check(probe)).await
    }

    async fn bounded<T>(&self, op: impl Future<Output = StorageResult<T>>) -> Result<T, ApiError> {
        match tokio::time::timeout(self.cfg.store_timeout, op).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::StoreUnavailable(StorageError::timeout())),
        }
    }
}
