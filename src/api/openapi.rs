//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::analytics::{BudgetPoint, PortfolioOverview, PortfolioSummary, ProjectAnalytics, TimelinePoint};
use crate::api::handlers::{
    auth_handler, client_handler, notification_handler, project_handler, showcase_handler,
    stats_handler, time_entry_handler, time_off_handler,
};
use crate::domain::{
    Client, ClientChanges, IndustryBenchmark, Level, NewClient, NewProject, NewShowcaseProject,
    Notification, NotificationKind, Project, ProjectChanges, ProjectPhase, ShowcaseProject,
    ShowcaseStatus, TimeEntry, TimeEntryStatus, TimeOffRequest, TimeOffStatus, TimeOffType,
    UpsertUser, User, UserRole, UserStats,
};
use crate::services::{DataSource, ManualProjectCreated, PortfolioSnapshot};
use crate::types::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeboard API",
        version = "0.1.0",
        description = "Time tracking, approvals and project portfolio analytics",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Users
        auth_handler::get_current_user,
        auth_handler::upsert_current_user,
        // Clients
        client_handler::list_clients,
        client_handler::get_client,
        client_handler::create_client,
        client_handler::update_client,
        client_handler::delete_client,
        // Projects
        project_handler::list_projects,
        project_handler::get_project,
        project_handler::create_project,
        project_handler::update_project,
        project_handler::delete_project,
        // Time entries
        time_entry_handler::list_time_entries,
        time_entry_handler::get_time_entry,
        time_entry_handler::create_time_entry,
        time_entry_handler::update_time_entry,
        time_entry_handler::delete_time_entry,
        time_entry_handler::submit_time_entry,
        time_entry_handler::approve_time_entry,
        time_entry_handler::reject_time_entry,
        // Time off
        time_off_handler::list_time_off_requests,
        time_off_handler::create_time_off_request,
        time_off_handler::update_time_off_request,
        time_off_handler::delete_time_off_request,
        time_off_handler::approve_time_off_request,
        time_off_handler::reject_time_off_request,
        // Notifications
        notification_handler::list_notifications,
        notification_handler::mark_notification_as_read,
        notification_handler::delete_notification,
        // Statistics
        stats_handler::get_stats,
        stats_handler::storage_status,
        // Showcase
        showcase_handler::real_data,
        showcase_handler::analytics,
        showcase_handler::add_manual_project,
        showcase_handler::seed_firebase,
    ),
    components(
        schemas(
            // Time tracking
            User,
            UserRole,
            UpsertUser,
            Client,
            NewClient,
            ClientChanges,
            Project,
            NewProject,
            ProjectChanges,
            TimeEntry,
            TimeEntryStatus,
            time_entry_handler::CreateTimeEntryRequest,
            time_entry_handler::UpdateTimeEntryRequest,
            TimeOffRequest,
            TimeOffType,
            TimeOffStatus,
            time_off_handler::CreateTimeOffRequest,
            time_off_handler::UpdateTimeOffRequest,
            Notification,
            NotificationKind,
            UserStats,
            stats_handler::StorageStatus,
            MessageResponse,
            // Showcase
            ShowcaseProject,
            ShowcaseStatus,
            Level,
            ProjectPhase,
            NewShowcaseProject,
            IndustryBenchmark,
            ProjectAnalytics,
            BudgetPoint,
            TimelinePoint,
            PortfolioSummary,
            PortfolioOverview,
            PortfolioSnapshot,
            ManualProjectCreated,
            DataSource,
            showcase_handler::SeedSummary,
        )
    ),
    modifiers(&IdentityAddon),
    tags(
        (name = "Users", description = "Current user profile"),
        (name = "Clients", description = "Client management"),
        (name = "Projects", description = "Billable projects"),
        (name = "Time Entries", description = "Time tracking and approvals"),
        (name = "Time Off", description = "Leave requests and approvals"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Statistics", description = "Dashboard totals and storage status"),
        (name = "Showcase", description = "Portfolio demo data and analytics")
    )
)]
pub struct ApiDoc;

/// Documents the identity header forwarded by the auth proxy
struct IdentityAddon;

impl Modify for IdentityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-User-Id",
                    "Subject id forwarded by the authentication proxy",
                ))),
            );
        }
    }
}
