//! Storage abstraction shared by every backend.
//!
//! Handlers only ever see `Arc<dyn Storage>`; which implementation sits
//! behind it is decided once at startup by [`StorageBackend::connect`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::analytics::ProjectAnalytics;
use crate::config::{Config, StorageKind};
use crate::domain::{
    Client, ClientChanges, NewClient, NewNotification, NewProject, NewTimeEntry,
    NewTimeOffRequest, Notification, Project, ProjectChanges, ShowcaseProject, TimeEntry,
    TimeEntryChanges, TimeOffChanges, TimeOffRequest, UpsertUser, User, UserStats,
};
use crate::errors::AppResult;

pub mod document;
pub mod memory;
pub mod relational;

pub use document::DocumentStore;
pub use memory::MemoryStore;
pub use relational::RelationalStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Persistence operations for the time-tracking model.
///
/// Lookups by id return `None` for unknown ids; updates, deletes and
/// workflow transitions fail with `NotFound` instead.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: &str) -> AppResult<Option<User>>;

    /// Insert the user or overwrite the profile fields of an existing one
    async fn upsert_user(&self, user: UpsertUser) -> AppResult<User>;

    /// Register a bare user record for `id` unless one exists; profiles are
    /// left untouched
    async fn ensure_user(&self, id: &str) -> AppResult<()>;

    async fn get_clients(&self) -> AppResult<Vec<Client>>;
    async fn get_client(&self, id: &str) -> AppResult<Option<Client>>;
    async fn create_client(&self, client: NewClient) -> AppResult<Client>;
    async fn update_client(&self, id: &str, changes: ClientChanges) -> AppResult<Client>;
    async fn delete_client(&self, id: &str) -> AppResult<()>;

    async fn get_projects(&self) -> AppResult<Vec<Project>>;
    async fn get_project(&self, id: &str) -> AppResult<Option<Project>>;
    async fn create_project(&self, project: NewProject) -> AppResult<Project>;
    async fn update_project(&self, id: &str, changes: ProjectChanges) -> AppResult<Project>;
    async fn delete_project(&self, id: &str) -> AppResult<()>;

    /// Entries owned by `user_id`, newest date first
    async fn get_time_entries(&self, user_id: &str) -> AppResult<Vec<TimeEntry>>;
    async fn get_time_entry(&self, id: &str) -> AppResult<Option<TimeEntry>>;
    async fn create_time_entry(&self, entry: NewTimeEntry) -> AppResult<TimeEntry>;
    async fn update_time_entry(&self, id: &str, changes: TimeEntryChanges) -> AppResult<TimeEntry>;
    async fn delete_time_entry(&self, id: &str) -> AppResult<()>;
    async fn submit_time_entry(&self, id: &str) -> AppResult<TimeEntry>;
    async fn approve_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry>;
    async fn reject_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry>;

    async fn get_time_off_requests(&self, user_id: &str) -> AppResult<Vec<TimeOffRequest>>;
    async fn create_time_off_request(&self, request: NewTimeOffRequest) -> AppResult<TimeOffRequest>;
    /// Edit type, dates and reason; status and approval fields are kept
    async fn update_time_off_request(&self, id: &str, changes: TimeOffChanges) -> AppResult<TimeOffRequest>;
    async fn delete_time_off_request(&self, id: &str) -> AppResult<()>;
    async fn approve_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest>;
    async fn reject_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest>;

    /// Notifications for `user_id`, newest first
    async fn get_notifications(&self, user_id: &str) -> AppResult<Vec<Notification>>;
    async fn create_notification(&self, notification: NewNotification) -> AppResult<Notification>;
    async fn mark_notification_as_read(&self, id: &str) -> AppResult<()>;
    async fn delete_notification(&self, id: &str) -> AppResult<()>;

    /// Hours logged today, this week and billable this week
    async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStats>;
}

/// Durable home of the showcase portfolio.
///
/// Only the document backend provides one; otherwise the bundled catalog
/// is the sole source.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShowcaseStore: Send + Sync {
    async fn list_showcase_projects(&self) -> AppResult<Vec<ShowcaseProject>>;
    async fn add_showcase_project(&self, project: ShowcaseProject) -> AppResult<()>;
    async fn seed_showcase_projects(&self, projects: Vec<ShowcaseProject>) -> AppResult<usize>;
    async fn get_analytics(&self) -> AppResult<ProjectAnalytics>;
}

/// The storage implementation chosen at startup
#[derive(Clone)]
pub enum StorageBackend {
    Relational(Arc<RelationalStore>),
    Document(Arc<DocumentStore>),
    InMemory(Arc<MemoryStore>),
}

impl StorageBackend {
    /// Build the backend selected by `config`.
    ///
    /// The relational backend connects and applies pending migrations; the
    /// document backend only prepares its HTTP client and credentials.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let kind = config.storage_kind();
        tracing::info!(storage = %kind, "Initializing storage backend");

        let backend = match kind {
            StorageKind::Relational => {
                let db = crate::infra::Database::connect(config).await?;
                StorageBackend::Relational(Arc::new(RelationalStore::new(db)))
            }
            StorageKind::Document => {
                StorageBackend::Document(Arc::new(DocumentStore::from_config(&config.firebase)?))
            }
            StorageKind::InMemory => StorageBackend::InMemory(Arc::new(MemoryStore::new())),
        };

        Ok(backend)
    }

    pub fn in_memory() -> Self {
        StorageBackend::InMemory(Arc::new(MemoryStore::new()))
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            StorageBackend::Relational(_) => StorageKind::Relational,
            StorageBackend::Document(_) => StorageKind::Document,
            StorageBackend::InMemory(_) => StorageKind::InMemory,
        }
    }

    pub fn shared(&self) -> Arc<dyn Storage> {
        match self {
            StorageBackend::Relational(store) => store.clone(),
            StorageBackend::Document(store) => store.clone(),
            StorageBackend::InMemory(store) => store.clone(),
        }
    }

    /// The showcase store, when the document backend is active
    pub fn showcase_store(&self) -> Option<Arc<dyn ShowcaseStore>> {
        match self {
            StorageBackend::Document(store) => Some(store.clone()),
            _ => None,
        }
    }

    /// Reachability check for the health endpoint
    pub async fn ping(&self) -> AppResult<()> {
        match self {
            StorageBackend::Relational(store) => store.ping().await,
            StorageBackend::Document(store) => store.ping().await,
            StorageBackend::InMemory(_) => Ok(()),
        }
    }
}
