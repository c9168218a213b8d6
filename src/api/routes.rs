//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_routes, client_routes, get_stats, notification_routes, project_routes, showcase_routes,
    storage_status, time_entry_routes, time_off_routes,
};
use super::middleware::identity_middleware;
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppResult;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Routes acting on behalf of a user
    let identified = Router::new()
        .nest("/auth", auth_routes())
        .nest("/clients", client_routes())
        .nest("/projects", project_routes())
        .nest("/time-entries", time_entry_routes())
        .nest("/time-off-requests", time_off_routes())
        .nest("/notifications", notification_routes())
        .route("/stats", get(get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    // Public dashboard data
    let public = Router::new()
        .nest("/projects", showcase_routes())
        .route("/storage/status", get(storage_status));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", identified.merge(public))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Timeboard API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    storage: StorageHealth,
}

#[derive(Serialize)]
struct StorageHealth {
    kind: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint reporting the active storage backend
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let kind = state.storage_kind().as_str();
    let (status_code, storage) = storage_health(kind, state.backend.ping().await);

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "healthy" } else { "degraded" },
        storage,
    };

    (status_code, Json(response))
}

/// Backend details stay in the log; callers only see the generic message
fn storage_health(kind: &'static str, ping: AppResult<()>) -> (StatusCode, StorageHealth) {
    match ping {
        Ok(()) => (
            StatusCode::OK,
            StorageHealth {
                kind,
                status: "healthy",
                error: None,
            },
        ),
        Err(e) => {
            tracing::warn!(storage = kind, error = %e, "Storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                StorageHealth {
                    kind,
                    status: "unhealthy",
                    error: Some(e.user_message()),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::analytics::ProjectAnalytics;
    use crate::domain::TimeOffRequest;
    use crate::errors::AppError;
    use crate::infra::{MockStorage, StorageBackend};
    use crate::services::{MockInsightsService, Sourced};

    fn state_with(storage: MockStorage, insights: MockInsightsService) -> AppState {
        AppState::new(
            StorageBackend::in_memory(),
            Arc::new(insights),
            false,
            Some("demo-user".to_string()),
        )
        .with_storage(Arc::new(storage))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_clients()
            .returning(|| Err(AppError::document_store("PERMISSION_DENIED on clients")));

        let app = create_router(state_with(storage, MockInsightsService::new()));
        let (status, _, body) = call(app, "/api/clients").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DOCUMENT_STORE_ERROR");
        assert_eq!(body["error"]["message"], "A storage error occurred");
    }

    #[tokio::test]
    async fn test_stats_are_scoped_to_demo_user() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_user_stats()
            .withf(|user_id| user_id == "demo-user")
            .times(1)
            .returning(|_| Ok(crate::domain::UserStats::from_minutes(90, 120, 60)));

        let app = create_router(state_with(storage, MockInsightsService::new()));
        let (status, _, body) = call(app, "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todayHours"], 1.5);
        assert_eq!(body["weekHours"], 2.0);
        assert_eq!(body["billableHours"], 1.0);
    }

    #[tokio::test]
    async fn test_analytics_reports_fallback_header() {
        let mut insights = MockInsightsService::new();
        insights
            .expect_analytics()
            .returning(|| Sourced::fallback(ProjectAnalytics::default()));

        let app = create_router(state_with(MockStorage::new(), insights));
        let (status, headers, body) = call(app, "/api/projects/analytics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[crate::config::DATA_SOURCE_HEADER], "fallback");
        assert_eq!(body["summary"]["totalBudget"], 0.0);
    }

    #[tokio::test]
    async fn test_first_time_off_request_registers_caller() {
        let mut seq = mockall::Sequence::new();
        let mut storage = MockStorage::new();
        storage
            .expect_ensure_user()
            .withf(|id| id == "demo-user")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        storage
            .expect_create_time_off_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|data| Ok(TimeOffRequest::new("r1".into(), data, chrono::Utc::now())));

        let app = create_router(state_with(storage, MockInsightsService::new()));
        let body = serde_json::json!({
            "type": "vacation",
            "startDate": "2024-07-01",
            "endDate": "2024-07-05"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/time-off-requests")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_unhealthy_storage_hides_backend_body() {
        let ping = Err(AppError::document_store(
            r#"Firestore request failed with 403: {"error":{"status":"PERMISSION_DENIED"}}"#,
        ));

        let (status, storage) = storage_health("firestore", ping);

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(storage.status, "unhealthy");
        assert_eq!(storage.error.as_deref(), Some("A storage error occurred"));
    }

    #[test]
    fn test_healthy_storage_has_no_error() {
        let (status, storage) = storage_health("memory", Ok(()));

        assert_eq!(status, StatusCode::OK);
        assert!(storage.error.is_none());
    }
}
