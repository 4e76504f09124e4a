use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// Extracts the token from an `Authorization: Bearer <token>` header.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Requires a live session on the request and stores its claims in the
/// request extensions.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), session::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<SessionClaims>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        warn!("Missing or malformed Authorization header");
        AppError::Unauthorized("Missing authorization header".to_string())
    })?;

    let claims = match state.session_service.validate_session(token).await {
        Ok(claims) => claims,
        // Bad signatures are an auth failure here, not a malformed request
        Err(AppError::JwtError(e)) => {
            warn!(error = %e, "JWT authentication failed");
            return Err(AppError::Unauthorized("Invalid session token".to_string()));
        }
        Err(e) => {
            warn!(error = %e, "JWT authentication failed");
            return Err(e);
        }
    };

    debug!(session_id = %claims.session_id, "Authentication successful");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
