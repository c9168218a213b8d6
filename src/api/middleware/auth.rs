//! Identity middleware.
//!
//! Authentication happens in the OIDC proxy in front of the service; it
//! forwards the subject id in `X-User-Id`. Without that header the
//! configured demo user is assumed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::USER_ID_HEADER;
use crate::errors::AppError;

/// Caller identity for the current request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

/// Resolve the caller and inject `CurrentUser` into the request extensions.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let id = forwarded
        .or_else(|| state.demo_user_id.clone())
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(user_id = %id, "Resolved caller identity");
    request.extensions_mut().insert(CurrentUser { id });

    Ok(next.run(request).await)
}
