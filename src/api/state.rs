//! Application state - Dependency injection container.
//!
//! Built once at startup from the selected storage backend and handed to
//! every handler by Axum.

use std::sync::Arc;

use crate::config::{Config, StorageKind};
use crate::errors::AppResult;
use crate::infra::{Storage, StorageBackend};
use crate::services::{InsightsService, PortfolioInsights, ShowcaseCatalog};

#[derive(Clone)]
pub struct AppState {
    /// Persistence for the time-tracking model
    pub storage: Arc<dyn Storage>,
    /// Backend behind `storage`, kept for health checks
    pub backend: StorageBackend,
    /// Showcase portfolio use cases
    pub insights: Arc<dyn InsightsService>,
    /// Whether Firebase credentials were supplied
    pub firebase_enabled: bool,
    /// Identity used when the proxy forwards none
    pub demo_user_id: Option<String>,
}

impl AppState {
    /// Wire the showcase service to the bundled catalog and, when the
    /// document backend is active, its showcase store.
    pub fn from_config(backend: StorageBackend, config: &Config) -> AppResult<Self> {
        let catalog = Arc::new(ShowcaseCatalog::bundled()?);
        let insights = Arc::new(PortfolioInsights::new(catalog, backend.showcase_store()));

        Ok(Self::new(
            backend,
            insights,
            config.firebase.enabled(),
            config.demo_user_id.clone(),
        ))
    }

    pub fn new(
        backend: StorageBackend,
        insights: Arc<dyn InsightsService>,
        firebase_enabled: bool,
        demo_user_id: Option<String>,
    ) -> Self {
        Self {
            storage: backend.shared(),
            backend,
            insights,
            firebase_enabled,
            demo_user_id,
        }
    }

    /// Replace the storage handlers talk to, keeping the rest.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.backend.kind()
    }
}
