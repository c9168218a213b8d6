//! Showcase portfolio handlers.
//!
//! Read responses carry `X-Data-Source` so callers can tell live data from
//! the bundled fallback.

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::DATA_SOURCE_HEADER;
use crate::domain::NewShowcaseProject;
use crate::errors::AppResult;
use crate::services::{ManualProjectCreated, Sourced};
use crate::types::ApiResponse;

/// Result of pushing the catalog to Firestore
#[derive(Debug, Serialize, ToSchema)]
pub struct SeedSummary {
    pub count: usize,
}

/// JSON body tagged with the source that produced it
struct SourcedJson<T>(Sourced<T>);

impl<T: Serialize> IntoResponse for SourcedJson<T> {
    fn into_response(self) -> Response {
        let Sourced { data, source } = self.0;
        (
            [(
                HeaderName::from_static(DATA_SOURCE_HEADER),
                HeaderValue::from_static(source.as_str()),
            )],
            Json(data),
        )
            .into_response()
    }
}

/// Create showcase routes
pub fn showcase_routes() -> Router<AppState> {
    Router::new()
        .route("/real-data", get(real_data))
        .route("/analytics", get(analytics))
        .route("/manual", post(add_manual_project))
        .route("/seed-firebase", post(seed_firebase))
}

/// Showcase projects with industry benchmarks and status counts
#[utoipa::path(
    get,
    path = "/api/projects/real-data",
    tag = "Showcase",
    responses((status = 200, description = "Portfolio snapshot", body = crate::services::PortfolioSnapshot))
)]
pub async fn real_data(State(state): State<AppState>) -> impl IntoResponse {
    SourcedJson(state.insights.overview().await)
}

/// Aggregated portfolio figures for the charts
#[utoipa::path(
    get,
    path = "/api/projects/analytics",
    tag = "Showcase",
    responses((status = 200, description = "Portfolio analytics", body = crate::analytics::ProjectAnalytics))
)]
pub async fn analytics(State(state): State<AppState>) -> impl IntoResponse {
    SourcedJson(state.insights.analytics().await)
}

#[utoipa::path(
    post,
    path = "/api/projects/manual",
    tag = "Showcase",
    request_body = NewShowcaseProject,
    responses(
        (status = 200, description = "Project added", body = ManualProjectCreated),
        (status = 400, description = "Validation error")
    )
)]
pub async fn add_manual_project(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewShowcaseProject>,
) -> AppResult<Json<ManualProjectCreated>> {
    Ok(Json(state.insights.add_manual(payload).await?))
}

/// Copy the bundled showcase projects into Firestore
#[utoipa::path(
    post,
    path = "/api/projects/seed-firebase",
    tag = "Showcase",
    responses(
        (status = 200, description = "Projects written", body = SeedSummary),
        (status = 400, description = "Firebase is not configured")
    )
)]
pub async fn seed_firebase(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SeedSummary>>> {
    let count = state.insights.seed().await?;
    Ok(Json(ApiResponse::with_message(
        SeedSummary { count },
        format!("Seeded {} projects to Firebase", count),
    )))
}
