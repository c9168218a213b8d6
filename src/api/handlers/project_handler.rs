//! Project handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{NewProject, Project, ProjectChanges};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{Created, NoContent};

/// Create project routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

/// A project may only point at an existing client
async fn ensure_client_exists(state: &AppState, client_id: Option<&str>) -> AppResult<()> {
    let Some(client_id) = client_id else {
        return Ok(());
    };

    match state.storage.get_client(client_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::validation(format!("Unknown client: {}", client_id))),
    }
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses((status = 200, description = "All projects", body = Vec<Project>))
)]
pub async fn list_projects(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(state.storage.get_projects().await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Project>> {
    let project = state.storage.get_project(&id).await?.ok_or_not_found()?;
    Ok(Json(project))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Validation error or unknown client")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewProject>,
) -> AppResult<Created<Project>> {
    ensure_client_exists(&state, payload.client_id.as_deref()).await?;

    let project = state.storage.create_project(payload).await?;
    tracing::info!(project_id = %project.id, "Project created");
    Ok(Created(project))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ProjectChanges,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 400, description = "Validation error or unknown client"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProjectChanges>,
) -> AppResult<Json<Project>> {
    ensure_client_exists(&state, payload.client_id.as_deref()).await?;
    Ok(Json(state.storage.update_project(&id, payload).await?))
}

/// Delete a project together with its time entries
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.storage.delete_project(&id).await?;
    tracing::info!(project_id = %id, "Project deleted");
    Ok(NoContent)
}
