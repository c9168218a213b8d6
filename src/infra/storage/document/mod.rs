//! Firestore storage backend.
//!
//! Each entity lives in its own collection with the document id as entity
//! id. Read-modify-write operations carry the document's update time as a
//! precondition, so a concurrent writer turns into a `Conflict` instead of a
//! lost update. There are no cross-document transactions.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{ShowcaseStore, Storage};
use crate::analytics::{summarize, ProjectAnalytics};
use crate::config::{
    FirebaseConfig, COLLECTION_CLIENTS, COLLECTION_NOTIFICATIONS, COLLECTION_PROJECTS,
    COLLECTION_SHOWCASE_PROJECTS, COLLECTION_TIME_ENTRIES, COLLECTION_TIME_OFF_REQUESTS,
    COLLECTION_USERS, STORED_ACTUAL_COST_RATIO, STORED_DEFAULT_PROGRESS,
};
use crate::domain::{
    Approval, Client, ClientChanges, Decision, NewClient, NewNotification, NewProject,
    NewTimeEntry, NewTimeOffRequest, Notification, Project, ProjectChanges, ShowcaseProject,
    StatsWindow, TimeEntry, TimeEntryChanges, TimeOffChanges, TimeOffRequest, UpsertUser, User,
    UserStats,
};
use crate::errors::{AppError, AppResult};

pub mod client;
pub mod codec;

use client::{FirestoreClient, Precondition};
use codec::{decode_document, from_document, to_fields};

/// Field holding the owner on per-user collections
const OWNER_FIELD: &str = "userId";

pub struct DocumentStore {
    client: FirestoreClient,
}

impl DocumentStore {
    pub fn from_config(config: &FirebaseConfig) -> AppResult<Self> {
        Ok(Self {
            client: FirestoreClient::from_config(config)?,
        })
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.client.ping().await
    }

    async fn find<T: DeserializeOwned>(&self, collection: &str, id: &str) -> AppResult<Option<T>> {
        match self.client.get(collection, id).await? {
            Some(doc) => from_document(&doc).map(Some),
            None => Ok(None),
        }
    }

    async fn list_all<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        let docs = self.client.list(collection).await?;
        docs.iter().map(from_document).collect()
    }

    async fn list_owned<T: DeserializeOwned>(&self, collection: &str, user_id: &str) -> AppResult<Vec<T>> {
        let docs = self.client.query_equal(collection, OWNER_FIELD, user_id).await?;
        docs.iter().map(from_document).collect()
    }

    /// Store a new entity under a server-assigned id.
    async fn insert<T>(&self, collection: &str, entity: &T) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let doc = self.client.create(collection, to_fields(entity)?).await?;
        from_document(&doc)
    }

    /// Read, change and write back one document guarded by its update time.
    async fn modify<T, F>(&self, collection: &str, id: &str, change: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce(&mut T) -> AppResult<()> + Send,
    {
        let doc = self
            .client
            .get(collection, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let precondition = match doc.get("updateTime").and_then(Value::as_str) {
            Some(t) => Precondition::UpdateTime(t.to_string()),
            None => Precondition::Exists,
        };

        let mut entity: T = from_document(&doc)?;
        change(&mut entity)?;

        let doc = self
            .client
            .patch(collection, id, to_fields(&entity)?, None, precondition)
            .await?;
        from_document(&doc)
    }

    async fn decide_time_entry(
        &self,
        id: &str,
        decision: Decision,
        approver_id: &str,
    ) -> AppResult<TimeEntry> {
        let approval = Approval::now(approver_id);
        self.modify(COLLECTION_TIME_ENTRIES, id, |entry: &mut TimeEntry| {
            entry.decide(decision, &approval)
        })
        .await
    }

    async fn decide_time_off(
        &self,
        id: &str,
        decision: Decision,
        approver_id: &str,
    ) -> AppResult<TimeOffRequest> {
        let approval = Approval::now(approver_id);
        self.modify(COLLECTION_TIME_OFF_REQUESTS, id, |request: &mut TimeOffRequest| {
            request.decide(decision, &approval)
        })
        .await
    }
}

#[async_trait]
impl ShowcaseStore for DocumentStore {
    async fn list_showcase_projects(&self) -> AppResult<Vec<ShowcaseProject>> {
        let docs = self.client.list(COLLECTION_SHOWCASE_PROJECTS).await?;
        docs.iter().map(decode_showcase).collect()
    }

    async fn add_showcase_project(&self, project: ShowcaseProject) -> AppResult<()> {
        self.client
            .patch(
                COLLECTION_SHOWCASE_PROJECTS,
                &project.id,
                to_fields(&project)?,
                None,
                Precondition::Unconditional,
            )
            .await?;
        Ok(())
    }

    /// Write the whole set in one commit; existing ids are overwritten.
    async fn seed_showcase_projects(&self, projects: Vec<ShowcaseProject>) -> AppResult<usize> {
        let writes = projects
            .iter()
            .map(|p| {
                Ok(json!({
                    "update": {
                        "name": self.client.document_name(COLLECTION_SHOWCASE_PROJECTS, &p.id),
                        "fields": to_fields(p)?,
                    }
                }))
            })
            .collect::<AppResult<Vec<_>>>()?;

        self.client.commit(writes).await?;
        tracing::info!(count = projects.len(), "Seeded showcase projects");
        Ok(projects.len())
    }

    async fn get_analytics(&self) -> AppResult<ProjectAnalytics> {
        let projects = self.list_showcase_projects().await?;
        Ok(summarize(&projects))
    }
}

/// Decode a stored showcase project, filling figures older records lack.
fn decode_showcase(doc: &Value) -> AppResult<ShowcaseProject> {
    let mut map = decode_document(doc)?;
    apply_showcase_defaults(&mut map);
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::document_store(format!("Undecodable showcase project: {}", e)))
}

fn apply_showcase_defaults(map: &mut Map<String, Value>) {
    let missing = |map: &Map<String, Value>, key: &str| map.get(key).map_or(true, Value::is_null);

    if missing(map, "actualCost") {
        let budget = map.get("budget").and_then(Value::as_f64).unwrap_or(0.0);
        map.insert("actualCost".into(), json!(budget * STORED_ACTUAL_COST_RATIO));
    }
    if missing(map, "progress") {
        map.insert("progress".into(), json!(STORED_DEFAULT_PROGRESS));
    }
}

#[async_trait]
impl Storage for DocumentStore {
    async fn get_user(&self, id: &str) -> AppResult<Option<User>> {
        self.find(COLLECTION_USERS, id).await
    }

    async fn upsert_user(&self, data: UpsertUser) -> AppResult<User> {
        let now = Utc::now();
        let user = match self.find::<User>(COLLECTION_USERS, &data.id).await? {
            Some(mut user) => {
                user.apply_upsert(data, now);
                user
            }
            None => User::from_upsert(data, now),
        };

        let doc = self
            .client
            .patch(
                COLLECTION_USERS,
                &user.id,
                to_fields(&user)?,
                None,
                Precondition::Unconditional,
            )
            .await?;
        from_document(&doc)
    }

    async fn ensure_user(&self, id: &str) -> AppResult<()> {
        if self.find::<User>(COLLECTION_USERS, id).await?.is_some() {
            return Ok(());
        }

        let data = UpsertUser {
            id: id.to_string(),
            ..Default::default()
        };
        let user = User::from_upsert(data, Utc::now());
        let created = self
            .client
            .patch(COLLECTION_USERS, id, to_fields(&user)?, None, Precondition::Missing)
            .await;

        match created {
            Ok(_) => {
                tracing::info!(user_id = id, "Registered user on first write");
                Ok(())
            }
            // Registered concurrently
            Err(AppError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn get_clients(&self) -> AppResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.list_all(COLLECTION_CLIENTS).await?;
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn get_client(&self, id: &str) -> AppResult<Option<Client>> {
        self.find(COLLECTION_CLIENTS, id).await
    }

    async fn create_client(&self, data: NewClient) -> AppResult<Client> {
        let client = Client::new(String::new(), data, Utc::now());
        self.insert(COLLECTION_CLIENTS, &client).await
    }

    async fn update_client(&self, id: &str, changes: ClientChanges) -> AppResult<Client> {
        self.modify(COLLECTION_CLIENTS, id, |client: &mut Client| {
            client.apply(changes, Utc::now());
            Ok(())
        })
        .await
    }

    async fn delete_client(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(COLLECTION_CLIENTS, id, Precondition::Exists)
            .await
    }

    async fn get_projects(&self) -> AppResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.list_all(COLLECTION_PROJECTS).await?;
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> AppResult<Option<Project>> {
        self.find(COLLECTION_PROJECTS, id).await
    }

    async fn create_project(&self, data: NewProject) -> AppResult<Project> {
        let project = Project::new(String::new(), data, Utc::now());
        self.insert(COLLECTION_PROJECTS, &project).await
    }

    async fn update_project(&self, id: &str, changes: ProjectChanges) -> AppResult<Project> {
        self.modify(COLLECTION_PROJECTS, id, |project: &mut Project| {
            project.apply(changes, Utc::now());
            Ok(())
        })
        .await
    }

    async fn delete_project(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(COLLECTION_PROJECTS, id, Precondition::Exists)
            .await
    }

    async fn get_time_entries(&self, user_id: &str) -> AppResult<Vec<TimeEntry>> {
        let mut entries: Vec<TimeEntry> = self.list_owned(COLLECTION_TIME_ENTRIES, user_id).await?;
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn get_time_entry(&self, id: &str) -> AppResult<Option<TimeEntry>> {
        self.find(COLLECTION_TIME_ENTRIES, id).await
    }

    async fn create_time_entry(&self, data: NewTimeEntry) -> AppResult<TimeEntry> {
        let entry = TimeEntry::new(String::new(), data, Utc::now());
        self.insert(COLLECTION_TIME_ENTRIES, &entry).await
    }

    async fn update_time_entry(&self, id: &str, changes: TimeEntryChanges) -> AppResult<TimeEntry> {
        self.modify(COLLECTION_TIME_ENTRIES, id, |entry: &mut TimeEntry| {
            entry.apply(changes, Utc::now());
            Ok(())
        })
        .await
    }

    async fn delete_time_entry(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(COLLECTION_TIME_ENTRIES, id, Precondition::Exists)
            .await
    }

    async fn submit_time_entry(&self, id: &str) -> AppResult<TimeEntry> {
        self.modify(COLLECTION_TIME_ENTRIES, id, |entry: &mut TimeEntry| {
            entry.submit(Utc::now())
        })
        .await
    }

    async fn approve_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.decide_time_entry(id, Decision::Approve, approver_id).await
    }

    async fn reject_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.decide_time_entry(id, Decision::Reject, approver_id).await
    }

    async fn get_time_off_requests(&self, user_id: &str) -> AppResult<Vec<TimeOffRequest>> {
        let mut requests: Vec<TimeOffRequest> =
            self.list_owned(COLLECTION_TIME_OFF_REQUESTS, user_id).await?;
        requests.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(requests)
    }

    async fn create_time_off_request(&self, data: NewTimeOffRequest) -> AppResult<TimeOffRequest> {
        let request = TimeOffRequest::new(String::new(), data, Utc::now());
        self.insert(COLLECTION_TIME_OFF_REQUESTS, &request).await
    }

    async fn update_time_off_request(&self, id: &str, changes: TimeOffChanges) -> AppResult<TimeOffRequest> {
        self.modify(COLLECTION_TIME_OFF_REQUESTS, id, |request: &mut TimeOffRequest| {
            request.apply(changes, Utc::now())
        })
        .await
    }

    async fn delete_time_off_request(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(COLLECTION_TIME_OFF_REQUESTS, id, Precondition::Exists)
            .await
    }

    async fn approve_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest> {
        self.decide_time_off(id, Decision::Approve, approver_id).await
    }

    async fn reject_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest> {
        self.decide_time_off(id, Decision::Reject, approver_id).await
    }

    async fn get_notifications(&self, user_id: &str) -> AppResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> =
            self.list_owned(COLLECTION_NOTIFICATIONS, user_id).await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn create_notification(&self, data: NewNotification) -> AppResult<Notification> {
        let notification = Notification::new(String::new(), data, Utc::now());
        self.insert(COLLECTION_NOTIFICATIONS, &notification).await
    }

    async fn mark_notification_as_read(&self, id: &str) -> AppResult<()> {
        self.client
            .patch(
                COLLECTION_NOTIFICATIONS,
                id,
                json!({ "isRead": { "booleanValue": true } }),
                Some(&["isRead"]),
                Precondition::Exists,
            )
            .await?;
        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> AppResult<()> {
        self.client
            .delete(COLLECTION_NOTIFICATIONS, id, Precondition::Exists)
            .await
    }

    async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStats> {
        let entries: Vec<TimeEntry> = self.list_owned(COLLECTION_TIME_ENTRIES, user_id).await?;
        Ok(StatsWindow::current().tally(&entries))
    }
}
