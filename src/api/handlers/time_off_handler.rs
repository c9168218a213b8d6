//! Time-off request handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
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
use crate::domain::{
    Decision, NewTimeOffRequest, NotificationKind, TimeOffChanges, TimeOffRequest, TimeOffType,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Leave request submitted by the caller
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeOffRequest {
    #[serde(rename = "type")]
    pub kind: TimeOffType,
    #[serde(deserialize_with = "deserialize_flexible")]
    #[schema(value_type = String, example = "2024-07-01")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible")]
    #[schema(value_type = String, example = "2024-07-05")]
    pub end_date: DateTime<Utc>,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl CreateTimeOffRequest {
    fn into_new(self, user_id: String) -> AppResult<NewTimeOffRequest> {
        let request = NewTimeOffRequest {
            user_id,
            kind: self.kind,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
        };
        request.ensure_valid_range()?;
        Ok(request)
    }
}

/// Edit of a request's type, dates or reason
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeOffRequest {
    #[serde(rename = "type")]
    pub kind: Option<TimeOffType>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>, example = "2024-07-01")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_flexible_opt")]
    #[schema(value_type = Option<String>, example = "2024-07-05")]
    pub end_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl From<UpdateTimeOffRequest> for TimeOffChanges {
    fn from(request: UpdateTimeOffRequest) -> Self {
        Self {
            kind: request.kind,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
        }
    }
}

/// Create time-off routes
pub fn time_off_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_time_off_requests).post(create_time_off_request))
        .route(
            "/:id",
            put(update_time_off_request).delete(delete_time_off_request),
        )
        .route("/:id/approve", post(approve_time_off_request))
        .route("/:id/reject", post(reject_time_off_request))
}

/// The caller's requests, latest start first
#[utoipa::path(
    get,
    path = "/api/time-off-requests",
    tag = "Time Off",
    responses((status = 200, description = "Caller's time-off requests", body = Vec<TimeOffRequest>))
)]
pub async fn list_time_off_requests(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TimeOffRequest>>> {
    Ok(Json(state.storage.get_time_off_requests(&current_user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/time-off-requests",
    tag = "Time Off",
    request_body = CreateTimeOffRequest,
    responses(
        (status = 201, description = "Request created", body = TimeOffRequest),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_time_off_request(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateTimeOffRequest>,
) -> AppResult<Created<TimeOffRequest>> {
    let new = payload.into_new(current_user.id)?;
    state.storage.ensure_user(&new.user_id).await?;
    let request = state.storage.create_time_off_request(new).await?;

    tracing::info!(request_id = %request.id, kind = request.kind.as_str(), "Time-off request created");
    Ok(Created(request))
}

/// Edit a request; its status and approval stay as they are
#[utoipa::path(
    put,
    path = "/api/time-off-requests/{id}",
    tag = "Time Off",
    params(("id" = String, Path, description = "Time-off request ID")),
    request_body = UpdateTimeOffRequest,
    responses(
        (status = 200, description = "Request updated", body = TimeOffRequest),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_time_off_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateTimeOffRequest>,
) -> AppResult<Json<TimeOffRequest>> {
    let request = state
        .storage
        .update_time_off_request(&id, payload.into())
        .await?;
    Ok(Json(request))
}

#[utoipa::path(
    delete,
    path = "/api/time-off-requests/{id}",
    tag = "Time Off",
    params(("id" = String, Path, description = "Time-off request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_time_off_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.storage.delete_time_off_request(&id).await?;
    Ok(NoContent)
}

#[utoipa::path(
    post,
    path = "/api/time-off-requests/{id}/approve",
    tag = "Time Off",
    params(("id" = String, Path, description = "Time-off request ID")),
    responses(
        (status = 200, description = "Request approved", body = TimeOffRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request was rejected")
    )
)]
pub async fn approve_time_off_request(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeOffRequest>> {
    decide(&state, &current_user, &id, Decision::Approve).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/time-off-requests/{id}/reject",
    tag = "Time Off",
    params(("id" = String, Path, description = "Time-off request ID")),
    responses(
        (status = 200, description = "Request rejected", body = TimeOffRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request was approved")
    )
)]
pub async fn reject_time_off_request(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TimeOffRequest>> {
    decide(&state, &current_user, &id, Decision::Reject).await.map(Json)
}

async fn decide(
    state: &AppState,
    approver: &CurrentUser,
    id: &str,
    decision: Decision,
) -> AppResult<TimeOffRequest> {
    let request = match decision {
        Decision::Approve => state.storage.approve_time_off_request(id, &approver.id).await?,
        Decision::Reject => state.storage.reject_time_off_request(id, &approver.id).await?,
    };

    tracing::info!(request_id = %request.id, approver = %approver.id, decision = decision.verb(), "Time-off request decided");

    let (title, kind) = match decision {
        Decision::Approve => ("Time off approved", NotificationKind::Success),
        Decision::Reject => ("Time off rejected", NotificationKind::Warning),
    };
    let message = format!(
        "Your {} leave from {} to {} was {}",
        request.kind.as_str(),
        request.start_date.format("%Y-%m-%d"),
        request.end_date.format("%Y-%m-%d"),
        request.status
    );
    notify(state, &request.user_id, title, message, kind).await;

    Ok(request)
}
