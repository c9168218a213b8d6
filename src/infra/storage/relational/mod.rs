//! Relational storage backend on SeaORM.
//!
//! Workflow transitions are single guarded `UPDATE` statements so two
//! reviewers racing on the same row cannot both move it.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::Storage;
use crate::domain::time_entry::ensure_entry_transition;
use crate::domain::time_off::ensure_time_off_transition;
use crate::domain::{
    Approval, Client, ClientChanges, Decision, NewClient, NewNotification, NewProject,
    NewTimeEntry, NewTimeOffRequest, Notification, Project, ProjectChanges, StatsWindow,
    TimeEntry, TimeEntryChanges, TimeEntryStatus, TimeOffChanges, TimeOffRequest, TimeOffStatus,
    UpsertUser, User, UserStats,
};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

pub(crate) mod entities;

use entities::client::{self, Entity as ClientEntity};
use entities::notification::{self, Entity as NotificationEntity};
use entities::project::{self, Entity as ProjectEntity};
use entities::time_entry::{self, Entity as TimeEntryEntity};
use entities::time_off_request::{self, Entity as TimeOffEntity};
use entities::user::{self, Entity as UserEntity};

#[derive(Debug, FromQueryResult)]
struct MinutesTotal {
    minutes: i64,
}

pub struct RelationalStore {
    database: Database,
}

impl RelationalStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn db(&self) -> &DatabaseConnection {
        self.database.connection()
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.database.ping().await.map_err(AppError::from)
    }

    /// Move an entry to `next` if its current status allows it.
    async fn transition_time_entry(
        &self,
        id: &str,
        next: TimeEntryStatus,
        approval: Option<Approval>,
    ) -> AppResult<TimeEntry> {
        let sources: Vec<&str> = TimeEntryStatus::sources_for(next)
            .into_iter()
            .map(|s| s.as_str())
            .collect();

        let mut update = TimeEntryEntity::update_many()
            .col_expr(time_entry::Column::Status, Expr::value(next.as_str()))
            .col_expr(time_entry::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(approval) = approval {
            update = update
                .col_expr(time_entry::Column::ApprovedBy, Expr::value(approval.approver_id))
                .col_expr(time_entry::Column::ApprovedAt, Expr::value(approval.decided_at));
        }

        let result = update
            .filter(time_entry::Column::Id.eq(id))
            .filter(time_entry::Column::Status.is_in(sources))
            .exec(self.db())
            .await?;

        let model = TimeEntryEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        if result.rows_affected == 0 {
            ensure_entry_transition(TimeEntryStatus::from(model.status.as_str()), next)?;
            return Err(AppError::conflict("Time entry changed concurrently, please retry"));
        }

        Ok(TimeEntry::from(model))
    }

    async fn decide_time_off(
        &self,
        id: &str,
        decision: Decision,
        approver_id: &str,
    ) -> AppResult<TimeOffRequest> {
        let next = TimeOffStatus::from_decision(decision);
        let approval = Approval::now(approver_id);
        let sources: Vec<&str> = TimeOffStatus::sources_for(next)
            .into_iter()
            .map(|s| s.as_str())
            .collect();

        let result = TimeOffEntity::update_many()
            .col_expr(time_off_request::Column::Status, Expr::value(next.as_str()))
            .col_expr(time_off_request::Column::ApprovedBy, Expr::value(approval.approver_id))
            .col_expr(time_off_request::Column::ApprovedAt, Expr::value(approval.decided_at))
            .col_expr(time_off_request::Column::UpdatedAt, Expr::value(approval.decided_at))
            .filter(time_off_request::Column::Id.eq(id))
            .filter(time_off_request::Column::Status.is_in(sources))
            .exec(self.db())
            .await?;

        let model = TimeOffEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        if result.rows_affected == 0 {
            ensure_time_off_transition(TimeOffStatus::from(model.status.as_str()), next)?;
            return Err(AppError::conflict("Time-off request changed concurrently, please retry"));
        }

        Ok(TimeOffRequest::from(model))
    }

    async fn sum_minutes(&self, condition: Condition) -> AppResult<i64> {
        let total = TimeEntryEntity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(duration), 0)"), "minutes")
            .filter(condition)
            .into_model::<MinutesTotal>()
            .one(self.db())
            .await?;

        Ok(total.map(|t| t.minutes).unwrap_or(0))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Storage for RelationalStore {
    async fn get_user(&self, id: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id.to_string())
            .one(self.db())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn upsert_user(&self, data: UpsertUser) -> AppResult<User> {
        let now = Utc::now();
        let existing = UserEntity::find_by_id(data.id.clone()).one(self.db()).await?;

        let model = match existing {
            Some(model) => {
                let mut user = User::from(model);
                user.apply_upsert(data, now);
                user::ActiveModel::from(user).update(self.db()).await?
            }
            None => {
                let user = User::from_upsert(data, now);
                user::ActiveModel::from(user).insert(self.db()).await?
            }
        };

        Ok(User::from(model))
    }

    async fn ensure_user(&self, id: &str) -> AppResult<()> {
        let data = UpsertUser {
            id: id.to_string(),
            ..Default::default()
        };
        let user = User::from_upsert(data, Utc::now());

        let inserted = UserEntity::insert(user::ActiveModel::from(user))
            .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
            .exec_without_returning(self.db())
            .await?;

        if inserted > 0 {
            tracing::info!(user_id = id, "Registered user on first write");
        }
        Ok(())
    }

    async fn get_clients(&self) -> AppResult<Vec<Client>> {
        let models = ClientEntity::find()
            .order_by_asc(client::Column::Name)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(Client::from).collect())
    }

    async fn get_client(&self, id: &str) -> AppResult<Option<Client>> {
        let result = ClientEntity::find_by_id(id.to_string()).one(self.db()).await?;
        Ok(result.map(Client::from))
    }

    async fn create_client(&self, data: NewClient) -> AppResult<Client> {
        let client = Client::new(new_id(), data, Utc::now());
        let model = client::ActiveModel::from(client).insert(self.db()).await?;
        Ok(Client::from(model))
    }

    async fn update_client(&self, id: &str, changes: ClientChanges) -> AppResult<Client> {
        let model = ClientEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut client = Client::from(model);
        client.apply(changes, Utc::now());

        let model = client::ActiveModel::from(client).update(self.db()).await?;
        Ok(Client::from(model))
    }

    async fn delete_client(&self, id: &str) -> AppResult<()> {
        let result = ClientEntity::delete_by_id(id.to_string())
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn get_projects(&self) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .order_by_asc(project::Column::Name)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &str) -> AppResult<Option<Project>> {
        let result = ProjectEntity::find_by_id(id.to_string()).one(self.db()).await?;
        Ok(result.map(Project::from))
    }

    async fn create_project(&self, data: NewProject) -> AppResult<Project> {
        let project = Project::new(new_id(), data, Utc::now());
        let model = project::ActiveModel::from(project).insert(self.db()).await?;
        Ok(Project::from(model))
    }

    async fn update_project(&self, id: &str, changes: ProjectChanges) -> AppResult<Project> {
        let model = ProjectEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut project = Project::from(model);
        project.apply(changes, Utc::now());

        let model = project::ActiveModel::from(project).update(self.db()).await?;
        Ok(Project::from(model))
    }

    async fn delete_project(&self, id: &str) -> AppResult<()> {
        let result = ProjectEntity::delete_by_id(id.to_string())
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn get_time_entries(&self, user_id: &str) -> AppResult<Vec<TimeEntry>> {
        let models = TimeEntryEntity::find()
            .filter(time_entry::Column::UserId.eq(user_id))
            .order_by_desc(time_entry::Column::Date)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(TimeEntry::from).collect())
    }

    async fn get_time_entry(&self, id: &str) -> AppResult<Option<TimeEntry>> {
        let result = TimeEntryEntity::find_by_id(id.to_string()).one(self.db()).await?;
        Ok(result.map(TimeEntry::from))
    }

    async fn create_time_entry(&self, data: NewTimeEntry) -> AppResult<TimeEntry> {
        let entry = TimeEntry::new(new_id(), data, Utc::now());
        let model = time_entry::ActiveModel::from(entry).insert(self.db()).await?;
        Ok(TimeEntry::from(model))
    }

    async fn update_time_entry(&self, id: &str, changes: TimeEntryChanges) -> AppResult<TimeEntry> {
        let model = TimeEntryEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut entry = TimeEntry::from(model);
        entry.apply(changes, Utc::now());

        let model = time_entry::ActiveModel::from(entry).update(self.db()).await?;
        Ok(TimeEntry::from(model))
    }

    async fn delete_time_entry(&self, id: &str) -> AppResult<()> {
        let result = TimeEntryEntity::delete_by_id(id.to_string())
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn submit_time_entry(&self, id: &str) -> AppResult<TimeEntry> {
        self.transition_time_entry(id, TimeEntryStatus::Submitted, None)
            .await
    }

    async fn approve_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.transition_time_entry(id, TimeEntryStatus::Approved, Some(Approval::now(approver_id)))
            .await
    }

    async fn reject_time_entry(&self, id: &str, approver_id: &str) -> AppResult<TimeEntry> {
        self.transition_time_entry(id, TimeEntryStatus::Rejected, Some(Approval::now(approver_id)))
            .await
    }

    async fn get_time_off_requests(&self, user_id: &str) -> AppResult<Vec<TimeOffRequest>> {
        let models = TimeOffEntity::find()
            .filter(time_off_request::Column::UserId.eq(user_id))
            .order_by_desc(time_off_request::Column::StartDate)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(TimeOffRequest::from).collect())
    }

    async fn create_time_off_request(&self, data: NewTimeOffRequest) -> AppResult<TimeOffRequest> {
        let request = TimeOffRequest::new(new_id(), data, Utc::now());
        let model = time_off_request::ActiveModel::from(request)
            .insert(self.db())
            .await?;
        Ok(TimeOffRequest::from(model))
    }

    async fn update_time_off_request(&self, id: &str, changes: TimeOffChanges) -> AppResult<TimeOffRequest> {
        let model = TimeOffEntity::find_by_id(id.to_string())
            .one(self.db())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut request = TimeOffRequest::from(model);
        request.apply(changes, Utc::now())?;

        // Status and approval columns stay unset so a concurrent decision survives
        let model = time_off_request::ActiveModel {
            id: Set(request.id),
            kind: Set(request.kind.as_str().to_string()),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            reason: Set(request.reason),
            updated_at: Set(request.updated_at),
            ..Default::default()
        }
        .update(self.db())
        .await?;

        Ok(TimeOffRequest::from(model))
    }

    async fn delete_time_off_request(&self, id: &str) -> AppResult<()> {
        let result = TimeOffEntity::delete_by_id(id.to_string())
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
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
        let models = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(Notification::from).collect())
    }

    async fn create_notification(&self, data: NewNotification) -> AppResult<Notification> {
        let notification = Notification::new(new_id(), data, Utc::now());
        let model = notification::ActiveModel::from(notification)
            .insert(self.db())
            .await?;
        Ok(Notification::from(model))
    }

    async fn mark_notification_as_read(&self, id: &str) -> AppResult<()> {
        let result = NotificationEntity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> AppResult<()> {
        let result = NotificationEntity::delete_by_id(id.to_string())
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn get_user_stats(&self, user_id: &str) -> AppResult<UserStats> {
        let window = StatsWindow::current();
        let owner = || Condition::all().add(time_entry::Column::UserId.eq(user_id));

        let (today, week, billable) = futures::try_join!(
            self.sum_minutes(owner().add(time_entry::Column::Date.gte(window.today_start))),
            self.sum_minutes(owner().add(time_entry::Column::Date.gte(window.week_start))),
            self.sum_minutes(
                owner()
                    .add(time_entry::Column::Date.gte(window.week_start))
                    .add(time_entry::Column::IsBillable.eq(true)),
            ),
        )?;

        Ok(UserStats::from_minutes(today, week, billable))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value as DbValue};

    use super::*;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn store(db: DatabaseConnection) -> RelationalStore {
        RelationalStore::new(Database::from_connection(db))
    }

    fn entry_model(status: TimeEntryStatus) -> time_entry::Model {
        let now = Utc::now();
        time_entry::Model {
            id: "e1".into(),
            user_id: "u1".into(),
            project_id: "p1".into(),
            description: None,
            start_time: None,
            end_time: None,
            duration: Some(60),
            date: now,
            is_billable: true,
            status: status.as_str().into(),
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn time_off_model(status: TimeOffStatus) -> time_off_request::Model {
        let now = Utc::now();
        time_off_request::Model {
            id: "r1".into(),
            user_id: "u1".into(),
            kind: "vacation".into(),
            start_date: now,
            end_date: now + Duration::days(2),
            reason: None,
            status: status.as_str().into(),
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn minutes(total: i64) -> BTreeMap<&'static str, DbValue> {
        BTreeMap::from([("minutes", DbValue::BigInt(Some(total)))])
    }

    #[tokio::test]
    async fn test_guarded_approve_returns_updated_row() {
        let mut approved = entry_model(TimeEntryStatus::Approved);
        approved.approved_by = Some("m1".into());
        approved.approved_at = Some(Utc::now());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .append_query_results([vec![approved]])
            .into_connection();

        let entry = store(db).approve_time_entry("e1", "m1").await.unwrap();
        assert_eq!(entry.status, TimeEntryStatus::Approved);
        assert_eq!(entry.approved_by.as_deref(), Some("m1"));
    }

    #[tokio::test]
    async fn test_no_rows_and_no_entry_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([Vec::<time_entry::Model>::new()])
            .into_connection();

        let result = store(db).approve_time_entry("missing", "m1").await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_no_rows_on_decided_entry_is_invalid_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([vec![entry_model(TimeEntryStatus::Approved)]])
            .into_connection();

        let err = store(db).reject_time_entry("e1", "m1").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_no_rows_on_allowed_move_is_conflict() {
        // Row still reads as submitted, so another writer got in between
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([vec![entry_model(TimeEntryStatus::Submitted)]])
            .into_connection();

        let result = store(db).approve_time_entry("e1", "m1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_decided_time_off_cannot_flip() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .append_query_results([vec![time_off_model(TimeOffStatus::Approved)]])
            .into_connection();

        let result = store(db).reject_time_off_request("r1", "m1").await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_stats_from_three_sums() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![minutes(90)], vec![minutes(600)], vec![minutes(480)]])
            .into_connection();

        let stats = store(db).get_user_stats("u1").await.unwrap();
        assert_eq!(stats.today_hours, 1.5);
        assert_eq!(stats.week_hours, 10.0);
        assert_eq!(stats.billable_hours, 8.0);
    }

    #[tokio::test]
    async fn test_ensure_user_tolerates_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();
        let store = store(db.clone());

        store.ensure_user("demo-user").await.unwrap();
        store.ensure_user("demo-user").await.unwrap();

        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn test_time_off_edit_checks_existence_and_range() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<time_off_request::Model>::new()])
            .append_query_results([vec![time_off_model(TimeOffStatus::Pending)]])
            .into_connection();
        let store = store(db);

        let missing = store
            .update_time_off_request("missing", TimeOffChanges::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound)));

        let inverted = store
            .update_time_off_request(
                "r1",
                TimeOffChanges {
                    end_date: Some(Utc::now() - Duration::days(5)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(inverted, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_notification_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let result = store(db).delete_notification("missing").await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
