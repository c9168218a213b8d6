//! HTTP request handlers.

pub mod auth_handler;
pub mod client_handler;
pub mod notification_handler;
pub mod project_handler;
pub mod showcase_handler;
pub mod stats_handler;
pub mod time_entry_handler;
pub mod time_off_handler;

pub use auth_handler::auth_routes;
pub use client_handler::client_routes;
pub use notification_handler::notification_routes;
pub use project_handler::project_routes;
pub use showcase_handler::showcase_routes;
pub use stats_handler::{get_stats, storage_status};
pub use time_entry_handler::time_entry_routes;
pub use time_off_handler::time_off_routes;

use crate::api::AppState;
use crate::domain::{NewNotification, NotificationKind};

/// Best-effort notification; a failure is logged and does not undo the
/// change that triggered it.
pub(crate) async fn notify(
    state: &AppState,
    user_id: &str,
    title: &str,
    message: String,
    kind: NotificationKind,
) {
    let notification = NewNotification {
        user_id: user_id.to_string(),
        title: title.to_string(),
        message,
        kind,
    };

    if let Err(e) = state.storage.create_notification(notification).await {
        tracing::warn!(user_id, error = %e, "Failed to store notification");
    }
}
