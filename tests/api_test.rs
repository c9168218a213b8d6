//! Integration tests for API endpoints.
//!
//! The router runs against the in-memory backend, so no database or
//! Firestore is needed. Requests go through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Local, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use timeboard::analytics::ProjectAnalytics;
use timeboard::api::{create_router, AppState};
use timeboard::domain::ShowcaseProject;
use timeboard::errors::{AppError, AppResult};
use timeboard::infra::{ShowcaseStore, StorageBackend};
use timeboard::services::{PortfolioInsights, ShowcaseCatalog};

// =============================================================================
// Test Helpers
// =============================================================================

const BUNDLED_PROJECT_COUNT: usize = 8;

/// Showcase store whose every call fails, as an unreachable Firestore would
struct UnreachableShowcaseStore;

#[async_trait]
impl ShowcaseStore for UnreachableShowcaseStore {
    async fn list_showcase_projects(&self) -> AppResult<Vec<ShowcaseProject>> {
        Err(AppError::document_store("connection refused"))
    }

    async fn add_showcase_project(&self, _project: ShowcaseProject) -> AppResult<()> {
        Err(AppError::document_store("connection refused"))
    }

    async fn seed_showcase_projects(&self, _projects: Vec<ShowcaseProject>) -> AppResult<usize> {
        Err(AppError::document_store("connection refused"))
    }

    async fn get_analytics(&self) -> AppResult<ProjectAnalytics> {
        Err(AppError::document_store("connection refused"))
    }
}

fn build_app(showcase: Option<Arc<dyn ShowcaseStore>>, demo_user: Option<&str>) -> Router {
    let catalog = Arc::new(ShowcaseCatalog::bundled().expect("bundled catalog"));
    let insights = Arc::new(PortfolioInsights::new(catalog, showcase));
    let state = AppState::new(
        StorageBackend::in_memory(),
        insights,
        false,
        demo_user.map(str::to_string),
    );
    create_router(state)
}

fn app() -> Router {
    build_app(None, Some("demo-user"))
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };

    TestResponse { status, headers, body }
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> TestResponse {
    send(app, Method::GET, uri, user, None).await
}

async fn post(app: &Router, uri: &str, user: Option<&str>, body: Value) -> TestResponse {
    send(app, Method::POST, uri, user, Some(body)).await
}

async fn create_project(app: &Router) -> String {
    let client = post(app, "/api/clients", None, json!({ "name": "Acme Corp" })).await;
    assert_eq!(client.status, StatusCode::CREATED);

    let project = post(
        app,
        "/api/projects",
        None,
        json!({ "name": "Website Redesign", "clientId": client.body["id"] }),
    )
    .await;
    assert_eq!(project.status, StatusCode::CREATED);
    project.body["id"].as_str().unwrap().to_string()
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

// =============================================================================
// Service Endpoints
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = app();

    let root = get(&app, "/", None).await;
    assert_eq!(root.status, StatusCode::OK);

    let health = get(&app, "/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");
    assert_eq!(health.body["storage"]["kind"], "memory");
}

#[tokio::test]
async fn test_storage_status_reports_memory() {
    let response = get(&app(), "/api/storage/status", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["storageType"], "memory");
    assert_eq!(response.body["firebaseEnabled"], false);
    assert!(response.body["message"].as_str().unwrap().contains("in-memory"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = get(&app(), "/api-docs/openapi.json", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/time-entries/{id}/approve"].is_object());
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = build_app(None, None);

    let clients = get(&app, "/api/clients", None).await;
    assert_eq!(clients.status, StatusCode::UNAUTHORIZED);
    assert_eq!(clients.body["error"]["code"], "UNAUTHORIZED");

    // Forwarded identity is enough
    let clients = get(&app, "/api/clients", Some("u1")).await;
    assert_eq!(clients.status, StatusCode::OK);

    // Dashboard data stays public
    let showcase = get(&app, "/api/projects/real-data", None).await;
    assert_eq!(showcase.status, StatusCode::OK);
}

#[tokio::test]
async fn test_current_user_upsert_uses_caller_id() {
    let app = app();

    let missing = get(&app, "/api/auth/user", Some("u1")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let stored = post(
        &app,
        "/api/auth/user",
        Some("u1"),
        json!({ "id": "someone-else", "email": "ada@example.com", "firstName": "Ada" }),
    )
    .await;
    assert_eq!(stored.status, StatusCode::OK);
    assert_eq!(stored.body["id"], "u1");
    assert_eq!(stored.body["role"], "employee");

    let fetched = get(&app, "/api/auth/user", Some("u1")).await;
    assert_eq!(fetched.body["email"], "ada@example.com");
}

// =============================================================================
// Clients and Projects
// =============================================================================

#[tokio::test]
async fn test_client_project_round_trip() {
    let app = app();

    let client = post(&app, "/api/clients", None, json!({ "name": "Globex" })).await;
    assert_eq!(client.status, StatusCode::CREATED);
    let client_id = client.body["id"].as_str().unwrap().to_string();

    let project = post(
        &app,
        "/api/projects",
        None,
        json!({ "name": "Data Platform", "clientId": client_id, "budget": "25000.00" }),
    )
    .await;
    assert_eq!(project.status, StatusCode::CREATED);
    assert_eq!(project.body["color"], "#3b82f6");
    assert_eq!(project.body["isActive"], true);

    let projects = get(&app, "/api/projects", None).await;
    let listed = projects.body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["clientId"], client_id.as_str());

    let owner = get(&app, &format!("/api/clients/{}", client_id), None).await;
    assert_eq!(owner.status, StatusCode::OK);
    assert_eq!(owner.body["name"], "Globex");
}

#[tokio::test]
async fn test_project_with_unknown_client_is_rejected() {
    let response = post(
        &app(),
        "/api/projects",
        None,
        json!({ "name": "Orphan", "clientId": "missing" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_validation_error() {
    let response = post(&app(), "/api/clients", None, json!({ "name": "" })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(response.body["error"]["message"], "Client name is required");
}

#[tokio::test]
async fn test_negative_budget_is_rejected() {
    let response = post(
        &app(),
        "/api/projects",
        None,
        json!({ "name": "Refunds", "budget": "-1" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_update_and_delete() {
    let app = app();
    let client = post(&app, "/api/clients", None, json!({ "name": "Initech" })).await;
    let uri = format!("/api/clients/{}", client.body["id"].as_str().unwrap());

    let updated = send(
        &app,
        Method::PUT,
        &uri,
        None,
        Some(json!({ "phone": "+1 555 0100" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Initech");
    assert_eq!(updated.body["phone"], "+1 555 0100");

    let deleted = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = get(&app, &uri, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Time Entries
// =============================================================================

#[tokio::test]
async fn test_clock_duration_is_stored_in_minutes() {
    let app = app();
    let project_id = create_project(&app).await;

    let entry = post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": "2:05" }),
    )
    .await;

    assert_eq!(entry.status, StatusCode::CREATED);
    assert_eq!(entry.body["duration"], 125);
    assert_eq!(entry.body["userId"], "u1");
    assert_eq!(entry.body["status"], "draft");
}

#[tokio::test]
async fn test_invalid_clock_duration_is_rejected() {
    let app = app();
    let project_id = create_project(&app).await;

    let entry = post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": "1:60" }),
    )
    .await;

    assert_eq!(entry.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_for_unknown_project_is_rejected() {
    let entry = post(
        &app(),
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": "missing", "date": today(), "duration": 30 }),
    )
    .await;

    assert_eq!(entry.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_moved_to_unknown_project_is_rejected() {
    let app = app();
    let project_id = create_project(&app).await;

    let entry = post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": 30 }),
    )
    .await;
    let uri = format!("/api/time-entries/{}", entry.body["id"].as_str().unwrap());

    let moved = send(&app, Method::PUT, &uri, Some("u1"), Some(json!({ "projectId": "missing" }))).await;
    assert_eq!(moved.status, StatusCode::BAD_REQUEST);

    let stored = get(&app, &uri, Some("u1")).await;
    assert_eq!(stored.body["projectId"], project_id.as_str());
}

#[tokio::test]
async fn test_first_entry_registers_new_identity() {
    let app = app();
    let project_id = create_project(&app).await;

    let before = get(&app, "/api/auth/user", Some("newcomer")).await;
    assert_eq!(before.status, StatusCode::NOT_FOUND);

    let entry = post(
        &app,
        "/api/time-entries",
        Some("newcomer"),
        json!({ "projectId": project_id, "date": today(), "duration": "1:00" }),
    )
    .await;
    assert_eq!(entry.status, StatusCode::CREATED);

    let user = get(&app, "/api/auth/user", Some("newcomer")).await;
    assert_eq!(user.status, StatusCode::OK);
    assert_eq!(user.body["id"], "newcomer");
    assert_eq!(user.body["role"], "employee");
}

#[tokio::test]
async fn test_entries_are_scoped_to_caller() {
    let app = app();
    let project_id = create_project(&app).await;

    for user in ["u1", "u1", "u2"] {
        post(
            &app,
            "/api/time-entries",
            Some(user),
            json!({ "projectId": project_id, "date": today(), "duration": 15 }),
        )
        .await;
    }

    let mine = get(&app, "/api/time-entries", Some("u1")).await;
    assert_eq!(mine.body.as_array().unwrap().len(), 2);

    let theirs = get(&app, "/api/time-entries", Some("u2")).await;
    assert_eq!(theirs.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stats_for_ninety_minutes_today() {
    let app = app();
    let project_id = create_project(&app).await;

    post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": 90 }),
    )
    .await;
    post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": 30, "isBillable": false }),
    )
    .await;

    let stats = get(&app, "/api/stats", Some("u1")).await;
    assert_eq!(stats.status, StatusCode::OK);

    let today_hours = stats.body["todayHours"].as_f64().unwrap();
    let week_hours = stats.body["weekHours"].as_f64().unwrap();
    assert_eq!(today_hours, 2.0);
    assert!(today_hours <= week_hours);
    assert_eq!(stats.body["billableHours"].as_f64().unwrap(), 1.5);

    let other = get(&app, "/api/stats", Some("u2")).await;
    assert_eq!(other.body["todayHours"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_approval_workflow() {
    let app = app();
    let project_id = create_project(&app).await;

    let entry = post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": "1:30" }),
    )
    .await;
    let id = entry.body["id"].as_str().unwrap().to_string();

    let submitted = post(&app, &format!("/api/time-entries/{}/submit", id), Some("u1"), json!({})).await;
    assert_eq!(submitted.body["status"], "submitted");
    assert!(submitted.body["approvedBy"].is_null());

    let first = post(&app, &format!("/api/time-entries/{}/approve", id), Some("manager-1"), json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["status"], "approved");
    assert_eq!(first.body["approvedBy"], "manager-1");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let second = post(&app, &format!("/api/time-entries/{}/approve", id), Some("manager-2"), json!({})).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["status"], "approved");
    assert_eq!(second.body["approvedBy"], "manager-2");
    assert!(timestamp(&second.body["approvedAt"]) > timestamp(&first.body["approvedAt"]));

    // A decision cannot be reversed
    let reversed = post(&app, &format!("/api/time-entries/{}/reject", id), Some("manager-1"), json!({})).await;
    assert_eq!(reversed.status, StatusCode::CONFLICT);

    // The owner hears about each approval
    let notifications = get(&app, "/api/notifications", Some("u1")).await;
    let notifications = notifications.body.as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0]["type"], "success");
    assert_eq!(notifications[0]["isRead"], false);
}

#[tokio::test]
async fn test_repeated_reject_refreshes_timestamp() {
    let app = app();
    let project_id = create_project(&app).await;

    let entry = post(
        &app,
        "/api/time-entries",
        Some("u1"),
        json!({ "projectId": project_id, "date": today(), "duration": 45, "status": "submitted" }),
    )
    .await;
    let uri = format!("/api/time-entries/{}/reject", entry.body["id"].as_str().unwrap());

    let first = post(&app, &uri, Some("lead"), json!({})).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = post(&app, &uri, Some("lead"), json!({})).await;

    assert_eq!(second.body["status"], "rejected");
    assert!(timestamp(&second.body["approvedAt"]) > timestamp(&first.body["approvedAt"]));
}

#[tokio::test]
async fn test_missing_entry_transitions_are_not_found() {
    let app = app();

    let approve = post(&app, "/api/time-entries/nope/approve", None, json!({})).await;
    assert_eq!(approve.status, StatusCode::NOT_FOUND);

    let fetch = get(&app, "/api/time-entries/nope", None).await;
    assert_eq!(fetch.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Time Off and Notifications
// =============================================================================

#[tokio::test]
async fn test_time_off_request_lifecycle() {
    let app = app();

    let created = post(
        &app,
        "/api/time-off-requests",
        Some("u1"),
        json!({ "type": "vacation", "startDate": "2024-07-01", "endDate": "2024-07-05", "reason": "Family trip" }),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "pending");
    let id = created.body["id"].as_str().unwrap().to_string();

    let approved = post(
        &app,
        &format!("/api/time-off-requests/{}/approve", id),
        Some("hr"),
        json!({}),
    )
    .await;
    assert_eq!(approved.body["status"], "approved");
    assert_eq!(approved.body["approvedBy"], "hr");

    let rejected = post(
        &app,
        &format!("/api/time-off-requests/{}/reject", id),
        Some("hr"),
        json!({}),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::CONFLICT);

    let listed = get(&app, "/api/time-off-requests", Some("u1")).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_time_off_edit_keeps_decision() {
    let app = app();

    let created = post(
        &app,
        "/api/time-off-requests",
        Some("u1"),
        json!({ "type": "vacation", "startDate": "2024-07-01", "endDate": "2024-07-05" }),
    )
    .await;
    let uri = format!("/api/time-off-requests/{}", created.body["id"].as_str().unwrap());
    post(&app, &format!("{}/approve", uri), Some("hr"), json!({})).await;

    let edited = send(
        &app,
        Method::PUT,
        &uri,
        Some("u1"),
        Some(json!({ "type": "personal", "endDate": "2024-07-08", "status": "pending", "approvedBy": null })),
    )
    .await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.body["type"], "personal");
    assert!(edited.body["endDate"].as_str().unwrap().starts_with("2024-07-08"));
    assert_eq!(edited.body["status"], "approved");
    assert_eq!(edited.body["approvedBy"], "hr");

    let inverted = send(&app, Method::PUT, &uri, Some("u1"), Some(json!({ "endDate": "2024-06-01" }))).await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    let deleted = send(&app, Method::DELETE, &uri, Some("u1"), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let again = send(&app, Method::DELETE, &uri, Some("u1"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let missing = send(&app, Method::PUT, "/api/time-off-requests/nope", Some("u1"), Some(json!({}))).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reversed_time_off_range_is_rejected() {
    let response = post(
        &app(),
        "/api/time-off-requests",
        Some("u1"),
        json!({ "type": "personal", "startDate": "2024-07-05", "endDate": "2024-07-01" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mark_notification_as_read() {
    let app = app();

    let request = post(
        &app,
        "/api/time-off-requests",
        Some("u1"),
        json!({ "type": "sick", "startDate": "2024-03-01", "endDate": "2024-03-01" }),
    )
    .await;
    post(
        &app,
        &format!("/api/time-off-requests/{}/reject", request.body["id"].as_str().unwrap()),
        Some("hr"),
        json!({}),
    )
    .await;

    let notifications = get(&app, "/api/notifications", Some("u1")).await;
    let notification = &notifications.body.as_array().unwrap()[0];
    assert_eq!(notification["type"], "warning");

    let read = post(
        &app,
        &format!("/api/notifications/{}/read", notification["id"].as_str().unwrap()),
        Some("u1"),
        json!({}),
    )
    .await;
    assert_eq!(read.status, StatusCode::OK);

    let notifications = get(&app, "/api/notifications", Some("u1")).await;
    assert_eq!(notifications.body[0]["isRead"], true);

    let missing = post(&app, "/api/notifications/nope/read", Some("u1"), json!({})).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_notification() {
    let app = app();

    let request = post(
        &app,
        "/api/time-off-requests",
        Some("u1"),
        json!({ "type": "vacation", "startDate": "2024-08-01", "endDate": "2024-08-02" }),
    )
    .await;
    post(
        &app,
        &format!("/api/time-off-requests/{}/approve", request.body["id"].as_str().unwrap()),
        Some("hr"),
        json!({}),
    )
    .await;

    let notifications = get(&app, "/api/notifications", Some("u1")).await;
    let uri = format!("/api/notifications/{}", notifications.body[0]["id"].as_str().unwrap());

    let deleted = send(&app, Method::DELETE, &uri, Some("u1"), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let notifications = get(&app, "/api/notifications", Some("u1")).await;
    assert!(notifications.body.as_array().unwrap().is_empty());

    let again = send(&app, Method::DELETE, &uri, Some("u1"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Showcase
// =============================================================================

#[tokio::test]
async fn test_real_data_from_catalog() {
    let response = get(&app(), "/api/projects/real-data", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-data-source"], "primary");
    assert_eq!(
        response.body["projects"].as_array().unwrap().len(),
        BUNDLED_PROJECT_COUNT
    );
    assert_eq!(response.body["summary"]["total"], BUNDLED_PROJECT_COUNT);
    assert!(response.body["stats"].as_object().unwrap().contains_key("Construction"));
}

#[tokio::test]
async fn test_analytics_invariants() {
    let app = app();
    let analytics = get(&app, "/api/projects/analytics", None).await;
    let projects = get(&app, "/api/projects/real-data", None).await;

    assert_eq!(analytics.status, StatusCode::OK);
    assert_eq!(analytics.headers["x-data-source"], "primary");

    let breakdown_total: u64 = analytics.body["industryBreakdown"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(breakdown_total as usize, BUNDLED_PROJECT_COUNT);

    let points = analytics.body["budgetAnalysis"].as_array().unwrap();
    let projects = projects.body["projects"].as_array().unwrap();
    for (point, project) in points.iter().zip(projects) {
        let expected = (project["actualCost"].as_f64().unwrap()
            / project["budget"].as_f64().unwrap()
            * 100.0)
            .round() as i64;
        assert_eq!(point["efficiency"].as_i64().unwrap(), expected);
    }

    let total_budget: f64 = projects.iter().map(|p| p["budget"].as_f64().unwrap()).sum();
    assert_eq!(
        analytics.body["summary"]["totalBudget"].as_f64().unwrap(),
        total_budget
    );
}

#[tokio::test]
async fn test_unreachable_store_falls_back_to_catalog() {
    let app = build_app(Some(Arc::new(UnreachableShowcaseStore)), Some("demo-user"));

    let real_data = get(&app, "/api/projects/real-data", None).await;
    assert_eq!(real_data.status, StatusCode::OK);
    assert_eq!(real_data.headers["x-data-source"], "fallback");
    assert_eq!(
        real_data.body["projects"].as_array().unwrap().len(),
        BUNDLED_PROJECT_COUNT
    );

    let analytics = get(&app, "/api/projects/analytics", None).await;
    assert_eq!(analytics.headers["x-data-source"], "fallback");

    // Writes are not masked
    let manual = post(&app, "/api/projects/manual", None, manual_project()).await;
    assert_eq!(manual.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(manual.body["error"]["message"], "A storage error occurred");
}

fn manual_project() -> Value {
    json!({
        "name": "Harbor Bridge Retrofit",
        "industry": "Construction",
        "client": "Port Authority",
        "status": "planning",
        "startDate": "2025-01-01",
        "endDate": "2025-06-30",
        "budget": 1000000,
        "teamSize": 12,
        "priority": "high",
        "riskLevel": "medium",
        "description": "Seismic retrofit of the harbor bridge"
    })
}

#[tokio::test]
async fn test_manual_project_is_added() {
    let app = app();

    let created = post(&app, "/api/projects/manual", None, manual_project()).await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["success"], true);
    assert_eq!(created.body["totalProjects"], BUNDLED_PROJECT_COUNT + 1);
    assert_eq!(created.body["project"]["actualCost"].as_f64().unwrap(), 800000.0);
    assert_eq!(created.body["project"]["progress"], 0);
    assert!(created.body["project"]["id"].as_str().unwrap().starts_with("USER_"));

    let real_data = get(&app, "/api/projects/real-data", None).await;
    assert!(real_data.body["summary"]["planning"].as_u64().unwrap() >= 1);
    assert_eq!(
        real_data.body["projects"].as_array().unwrap().len(),
        BUNDLED_PROJECT_COUNT + 1
    );
}

#[tokio::test]
async fn test_manual_project_validation() {
    let mut body = manual_project();
    body["description"] = json!("short");

    let response = post(&app(), "/api/projects/manual", None, body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seed_requires_firebase() {
    let response = post(&app(), "/api/projects/seed-firebase", None, json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "BAD_REQUEST");
}
