use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::types::{SessionClaims, SessionResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new session
///
/// POST /session
/// Returns a JWT token and the generated username
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.session_service.create_session().await?;

    info!(username = %session.username, "Session created successfully");

    Ok((StatusCode::CREATED, Json(session)))
}

/// DELETE /session
/// Revokes the caller's own session. Requires `jwt_auth`.
#[instrument(name = "revoke_session", skip(state, claims))]
pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<StatusCode, AppError> {
    state
        .session_service
        .revoke_session(&claims.session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
