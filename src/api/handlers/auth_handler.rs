//! Current user handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{UpsertUser, User};
use crate::errors::{AppResult, OptionExt};

/// Create current-user routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_current_user).post(upsert_current_user))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Users",
    responses(
        (status = 200, description = "Current user profile", body = User),
        (status = 401, description = "No identity available"),
        (status = 404, description = "User not registered yet")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<User>> {
    let user = state
        .storage
        .get_user(&current_user.id)
        .await?
        .ok_or_not_found()?;

    Ok(Json(user))
}

/// Register or refresh the caller's profile
///
/// The stored id is always the caller's id; any id in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/auth/user",
    tag = "Users",
    request_body = UpsertUser,
    responses(
        (status = 200, description = "Profile stored", body = User),
        (status = 400, description = "Validation error"),
        (status = 401, description = "No identity available")
    )
)]
pub async fn upsert_current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(mut payload): ValidatedJson<UpsertUser>,
) -> AppResult<Json<User>> {
    payload.id = current_user.id;
    let user = state.storage.upsert_user(payload).await?;

    tracing::info!(user_id = %user.id, "User profile stored");
    Ok(Json(user))
}
