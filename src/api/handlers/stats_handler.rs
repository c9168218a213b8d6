//! Dashboard statistics and storage status handlers.

use axum::{extract::State, response::Json, Extension};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserStats;
use crate::errors::AppResult;

/// Active storage backend as reported to the dashboard
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    #[schema(example = "memory")]
    pub storage_type: &'static str,
    pub firebase_enabled: bool,
    pub message: &'static str,
}

/// Hours logged by the caller today and this week
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Statistics",
    responses((status = 200, description = "Caller's hour totals", body = UserStats))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserStats>> {
    Ok(Json(state.storage.get_user_stats(&current_user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/storage/status",
    tag = "Statistics",
    responses((status = 200, description = "Active storage backend", body = StorageStatus))
)]
pub async fn storage_status(State(state): State<AppState>) -> Json<StorageStatus> {
    let kind = state.storage_kind();
    Json(StorageStatus {
        storage_type: kind.as_str(),
        firebase_enabled: state.firebase_enabled,
        message: kind.describe(),
    })
}
