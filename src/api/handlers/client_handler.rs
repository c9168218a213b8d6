//! Client handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Client, ClientChanges, NewClient};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Created, NoContent};

/// Create client routes
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

/// List all clients by name
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses((status = 200, description = "All clients", body = Vec<Client>))
)]
pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<Vec<Client>>> {
    Ok(Json(state.storage.get_clients().await?))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client found", body = Client),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Client>> {
    let client = state.storage.get_client(&id).await?.ok_or_not_found()?;
    Ok(Json(client))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewClient>,
) -> AppResult<Created<Client>> {
    let client = state.storage.create_client(payload).await?;
    tracing::info!(client_id = %client.id, "Client created");
    Ok(Created(client))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = String, Path, description = "Client ID")),
    request_body = ClientChanges,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ClientChanges>,
) -> AppResult<Json<Client>> {
    Ok(Json(state.storage.update_client(&id, payload).await?))
}

/// Delete a client; its projects are kept without a client
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.storage.delete_client(&id).await?;
    tracing::info!(client_id = %id, "Client deleted");
    Ok(NoContent)
}
