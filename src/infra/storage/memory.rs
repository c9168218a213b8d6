//! Process-local storage backend.
//!
//! Everything lives in vectors behind one `RwLock` and disappears with the
//! process. Used for local development and the integration tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Storage;
use crate::domain::{
    Approval, Client, ClientChanges, Decision, NewClient, NewNotification, NewProject,
    NewTimeEntry, NewTimeOffRequest, Notification, Project, ProjectChanges, StatsWindow,
    TimeEntry, TimeEntryChanges, TimeOffChanges, TimeOffRequest, UpsertUser, User, UserStats,
};
use crate::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    clients: Vec<Client>,
    projects: Vec<Project>,
    time_entries: Vec<TimeEntry>,
    time_off_requests: Vec<TimeOffRequest>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn decide_time_entry(
        &self,
        id: &str,
        decision: Decision,
        approver_id: &str,
    ) -> AppResult<TimeEntry> {
        let approval = Approval::now(approver_id);
        let mut tables = self.tables.write().await;
        let entry = tables
            .time_entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;

        entry.decide(decision, &approval)?;
        Ok(entry.clone())
    }

    async fn decide_time_off(
        &self,
        id: &str,
        decision: Decision,
        approver_id: &str,
    ) -> AppResult<TimeOffRequest> {
        let approval = Approval::now(approver_id);
        let mut tables = self.tables.write().await;
        let request = tables
            .time_off_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;

        request.decide(decision, &approval)?;
        Ok(request.clone())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get_user(&self, id: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_user(&self, data: UpsertUser) -> AppResult<User> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;

        if let Some(user) = tables.users.iter_mut().find(|u| u.id == data.id) {
            user.apply_upsert(data, now);
            return Ok(user.clone());
        }

        let user = User::from_upsert(data, now);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn ensure_user(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == id) {
            let data = UpsertUser {
                id: id.to_string(),
                ..Default::default()
            };
            tables.users.push(User::from_upsert(data, Utc::now()));
        }
        Ok(())
    }

    async fn get_clients(&self) -> AppResult<Vec<Client>> {
        let tables = self.tables.read().await;
        let mut clients = tables.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn get_client(&self, id: &str) -> AppResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn create_client(&self, data: NewClient) -> AppResult<Client> {
        let client = Client::new(new_id(), data, Utc::now());
        self.tables.write().await.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: &str, changes: ClientChanges) -> AppResult<Client> {
        let mut tables = self.tables.write().await;
        let client = tables
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        client.apply(changes, Utc::now());
        Ok(client.clone())
    }

    async fn delete_client(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.clients.len();
        tables.clients.retain(|c| c.id != id);
        if tables.clients.len() == before {
            return Err(AppError::NotFound);
        }

        // mirror ON DELETE SET NULL
        for project in tables.projects.iter_mut() {
            if project.client_id.as_deref() == Some(id) {
                project.client_id = None;
            }
        }
        Ok(())
    }

    async fn get_projects(&self) -> AppResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut projects = tables.projects.clone();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> AppResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(&self, data: NewProject) -> AppResult<Project> {
        let project = Project::new(new_id(), data, Utc::now());
        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: &str, changes: ProjectChanges) -> AppResult<Project> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        project.apply(changes, Utc::now());
        Ok(project.clone())
    }

    async fn delete_project(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Err(AppError::NotFound);
        }
        tables.time_entries.retain(|e| e.project_id != id);
        Ok(())
    }

    async fn get_time_entries(&self, user_id: &str) -> AppResult<Vec<TimeEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<TimeEntry> = tables
            .time_entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn get_time_entry(&self, id: &str) -> AppResult<Option<TimeEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.time_entries.iter().find(|e| e.id == id).cloned())
    }

    async fn create_time_entry(&self, data: NewTimeEntry) -> AppResult<TimeEntry> {
        let entry = TimeEntry::new(new_id(), data, Utc::now());
        self.tables.write().await.time_entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_time_entry(&self, id: &str, changes: TimeEntryChanges) -> AppResult<TimeEntry> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .time_entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;
        entry.apply(changes, Utc::now());
        Ok(entry.clone())
    }

    async fn delete_time_entry(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.time_entries.len();
        tables.time_entries.retain(|e| e.id != id);
        if tables.time_entries.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn submit_time_entry(&self, id: &str) -> AppResult<TimeEntry> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .time_entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AppError::NotFound)?;
        entry.submit(Utc::now())?;
        Ok(entry.clone())
    }

    async fn approve_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.decide_time_entry(id, Decision::Approve, approver_id).await
    }

    async fn reject_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.decide_time_entry(id, Decision::Reject, approver_id).await
    }

    async fn get_time_off_requests(&self, user_id: &str) -> AppResult<Vec<TimeOffRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<TimeOffRequest> = tables
            .time_off_requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(requests)
    }

    async fn create_time_off_request(&self, data: NewTimeOffRequest) -> AppResult<TimeOffRequest> {
        let request = TimeOffRequest::new(new_id(), data, Utc::now());
        self.tables
            .write()
            .await
            .time_off_requests
            .push(request.clone());
        Ok(request)
    }

    async fn update_time_off_request(&self, id: &str, changes: TimeOffChanges) -> AppResult<TimeOffRequest> {
        let mut tables = self.tables.write().await;
        let request = tables
            .time_off_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        request.apply(changes, Utc::now())?;
        Ok(request.clone())
    }

    async fn delete_time_off_request(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.time_off_requests.len();
        tables.time_off_requests.retain(|r| r.id != id);
        if tables.time_off_requests.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn approve_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest> {
        self.decide_time_off(id, Decision::Approve, approver_id).await
    }

    async fn reject_time_off_request(&self, id: &str, approver_id: &str) -> AppResult<TimeOffRequest> {
        self.decide_time_off(id, Decision::Reject, approver_id).await
    }

    async fn get_notifications(&self, user_id: &str) -> AppResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn create_notification(&self, data: NewNotification) -> AppResult<Notification> {
        let notification = Notification::new(new_id(), data, Utc::now());
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn mark_notification_as_read(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AppError::NotFound)?;
        notification.is_read = true;
        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.id != id);
        if tables.notifications.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStats> {
        let window = StatsWindow::current();
        let tables = self.tables.read().await;
        Ok(window.tally(tables.time_entries.iter().filter(|e| e.user_id == user_id)))
    }
}
