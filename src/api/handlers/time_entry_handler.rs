//! Time entry handlers.
//!
//! Entries are always owned by the caller. Approve and reject record the
//! caller as approver and notify the entry's owner.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::notify;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::dates::{deserialize_flexible, deserialize_flexible_opt};
use crate::domain::time_entry::resolve_duration;
use crate::domain::{
    Decision, DurationInput, NewTimeEntry, NotificationKind, TimeEntry, TimeEntryChanges,
    TimeEntryStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{Created, NoContent};

/// Time entry creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeEntryRequest {
    #[validate(length(min = 1, message = "Project is required"))]
    pub project_id: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>, example = "2024-03-04T09:00:00Z")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>, example = "2024-03-04T10:30:00Z")]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes, or `H:MM`; derived from start and end when omitted
    #[schema(value_type = Option<String>, example = "1:30")]
    pub duration: Option<DurationInput>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    #[serde(deserialize_with = "deserialize_flexible")]
    #[schema(value_type = String, example = "2024-03-04")]
    pub date: DateTime<Utc>,
    #[serde(default = "default_billable")]
    pub is_billable: bool,
    /// `draft` (default) or `submitted`
    pub status: Option<TimeEntryStatus>,
}

fn default_billable() -> bool {
    true
}

impl CreateTimeEntryRequest {
    fn into_new(self, user_id: String) -> AppResult<NewTimeEntry> {
        let status = match self.status.unwrap_or_default() {
            status @ (TimeEntryStatus::Draft | TimeEntryStatus::Submitted) => status,
            other => {
                return Err(AppError::validation(format!(
                    "New time entries cannot be {}",
                    other
                )))
            }
        };

        Ok(NewTimeEntry {
            duration: resolve_duration(self.duration.as_ref(), self.start_time, self.end_time)?,
            user_id,
            project_id: self.project_id,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            date: self.date,
            is_billable: self.is_billable,
            status,
        })
    }
}

/// Partial time entry update
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryRequest {
    #[validate(length(min = 1, message = "Project cannot be empty"))]
    pub project_id: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, example = "0:45")]
    pub duration: Option<DurationInput>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    pub is_billable: Option<bool>,
}

impl UpdateTimeEntryRequest {
    fn into_changes(self) -> AppResult<TimeEntryChanges> {
        Ok(TimeEntryChanges {
            duration: resolve_duration(self.duration.as_ref(), self.start_time, self.end_time)?,
            project_id: self.project_id,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            date: self.date,
            is_billable: self.is_billable,
        })
    }
}

/// Create time entry routes
pub fn time_entry_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_time_entries).post(create_time_entry))
        .route(
            "/:id",
            get(get_time_entry)
                .put(update_time_entry)
                .delete(delete_time_entry),
        )
        .route("/:id/submit", post(submit_time_entry))
        .route("/:id/approve", post(approve_time_entry))
        .route("/:id/reject", post(reject_time_entry))
}

/// The caller's entries, newest first
#[utoipa::path(
    get,
    path = "/api/time-entries",
    tag = "Time Entries",
    responses((status = 200, description = "Caller's time entries", body = Vec<TimeEntry>))
)]
pub async fn list_time_entries(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TimeEntry>>> {
    Ok(Json(state.storage.get_time_entries(&current_user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/time-entries/{id}",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry found", body = TimeEntry),
        (status = 404, description = "Time entry not found")
    )
)]
pub async fn get_time_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeEntry>> {
    let entry = state.storage.get_time_entry(&id).await?.ok_or_not_found()?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/time-entries",
    tag = "Time Entries",
    request_body = CreateTimeEntryRequest,
    responses(
        (status = 201, description = "Time entry created", body = TimeEntry),
        (status = 400, description = "Validation error or unknown project")
    )
)]
pub async fn create_time_entry(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateTimeEntryRequest>,
) -> AppResult<Created<TimeEntry>> {
    ensure_project_exists(&state, &payload.project_id).await?;
    state.storage.ensure_user(&current_user.id).await?;

    let entry = state
        .storage
        .create_time_entry(payload.into_new(current_user.id)?)
        .await?;

    tracing::info!(entry_id = %entry.id, minutes = ?entry.duration, "Time entry created");
    Ok(Created(entry))
}

#[utoipa::path(
    put,
    path = "/api/time-entries/{id}",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    request_body = UpdateTimeEntryRequest,
    responses(
        (status = 200, description = "Time entry updated", body = TimeEntry),
        (status = 400, description = "Validation error or unknown project"),
        (status = 404, description = "Time entry not found")
    )
)]
pub async fn update_time_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateTimeEntryRequest>,
) -> AppResult<Json<TimeEntry>> {
    if let Some(project_id) = &payload.project_id {
        ensure_project_exists(&state, project_id).await?;
    }

    let changes = payload.into_changes()?;
    Ok(Json(state.storage.update_time_entry(&id, changes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/time-entries/{id}",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    responses(
        (status = 204, description = "Time entry deleted"),
        (status = 404, description = "Time entry not found")
    )
)]
pub async fn delete_time_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.storage.delete_time_entry(&id).await?;
    Ok(NoContent)
}

/// Move a draft entry into review
#[utoipa::path(
    post,
    path = "/api/time-entries/{id}/submit",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry submitted", body = TimeEntry),
        (status = 404, description = "Time entry not found"),
        (status = 409, description = "Entry already decided")
    )
)]
pub async fn submit_time_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeEntry>> {
    Ok(Json(state.storage.submit_time_entry(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/time-entries/{id}/approve",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry approved", body = TimeEntry),
        (status = 404, description = "Time entry not found"),
        (status = 409, description = "Entry was rejected")
    )
)]
pub async fn approve_time_entry(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeEntry>> {
    decide(&state, &current_user, &id, Decision::Approve).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/time-entries/{id}/reject",
    tag = "Time Entries",
    params(("id" = String, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry rejected", body = TimeEntry),
        (status = 404, description = "Time entry not found"),
        (status = 409, description = "Entry was approved")
    )
)]
pub async fn reject_time_entry(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeEntry>> {
    decide(&state, &current_user, &id, Decision::Reject).await.map(Json)
}

async fn ensure_project_exists(state: &AppState, project_id: &str) -> AppResult<()> {
    if state.storage.get_project(project_id).await?.is_none() {
        return Err(AppError::validation(format!("Unknown project: {}", project_id)));
    }
    Ok(())
}

async fn decide(
    state: &AppState,
    approver: &CurrentUser,
    id: &str,
    decision: Decision,
) -> AppResult<TimeEntry> {
    let entry = match decision {
        Decision::Approve => state.storage.approve_time_entry(id, &approver.id).await?,
        Decision::Reject => state.storage.reject_time_entry(id, &approver.id).await?,
    };

    tracing::info!(entry_id = %entry.id, approver = %approver.id, decision = decision.verb(), "Time entry decided");

    let (title, kind) = match decision {
        Decision::Approve => ("Time entry approved", NotificationKind::Success),
        Decision::Reject => ("Time entry rejected", NotificationKind::Warning),
    };
    let message = format!(
        "Your time entry for {} was {}",
        entry.date.format("%Y-%m-%d"),
        entry.status
    );
    notify(state, &entry.user_id, title, message, kind).await;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clock_duration_and_bare_date() {
        let request: CreateTimeEntryRequest = serde_json::from_value(json!({
            "projectId": "p1",
            "date": "2024-03-04",
            "duration": "1:30"
        }))
        .unwrap();

        let new = request.into_new("u1".into()).unwrap();
        assert_eq!(new.duration, Some(90));
        assert!(new.is_billable);
        assert_eq!(new.status, TimeEntryStatus::Draft);
        assert_eq!(new.user_id, "u1");
    }

    #[test]
    fn test_duration_from_span() {
        let request: CreateTimeEntryRequest = serde_json::from_value(json!({
            "projectId": "p1",
            "date": "2024-03-04T00:00:00Z",
            "startTime": "2024-03-04T09:00:00Z",
            "endTime": "2024-03-04T11:15:00Z"
        }))
        .unwrap();

        assert_eq!(request.into_new("u1".into()).unwrap().duration, Some(135));
    }

    #[test]
    fn test_new_entries_cannot_start_decided() {
        let request: CreateTimeEntryRequest = serde_json::from_value(json!({
            "projectId": "p1",
            "date": "2024-03-04",
            "duration": 30,
            "status": "approved"
        }))
        .unwrap();

        assert!(matches!(
            request.into_new("u1".into()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_rejects_bad_clock() {
        let request: UpdateTimeEntryRequest =
            serde_json::from_value(json!({ "duration": "2:75" })).unwrap();
        assert!(request.into_changes().is_err());
    }
}
