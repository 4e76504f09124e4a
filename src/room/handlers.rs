use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::RoomSettings,
    service::RoomService,
    types::{GetRoomQuery, RoomDetailResponse, RoomResponse, UserInRoomResponse},
};
use crate::session::bearer_token;
use crate::shared::{AppError, AppState};
use crate::validation::{json_object, ValidationErrors, REQUIRED};

/// Response header carrying a session token issued during the request
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// GET /api/hello
pub async fn hello() -> Html<&'static str> {
    Html("<h1>hello</h1>")
}

/// HTTP handler for creating or updating the caller's room
///
/// POST /api/create-room
/// Body: `{"guest_can_pause": bool, "votes_to_skip": int}`.
/// Responds 201 with the room whether it was created or updated. If the
/// caller had no live session, one is issued and its token returned in
/// the `x-session-token` header.
#[instrument(name = "create_room", skip(state, headers, payload))]
pub async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    // Validate before touching sessions or rooms
    let settings = RoomSettings::from_payload(&json_object(payload)?).inspect_err(|e| {
        warn!(error = %e, "Rejected create-room payload");
    })?;

    let session = state
        .session_service
        .resolve_session(bearer_token(&headers))
        .await?;

    let service = RoomService::new(Arc::clone(&state.room_repository));
    let outcome = service.upsert_room(&session.session_id, settings).await?;

    info!(
        room_code = %outcome.room().code,
        created = outcome.was_created(),
        new_session = session.created,
        "Room upserted"
    );

    let mut response_headers = HeaderMap::new();
    if session.created {
        let token = HeaderValue::from_str(&session.token).map_err(|_| AppError::Internal)?;
        response_headers.insert(SESSION_TOKEN_HEADER, token);
    }

    Ok((
        StatusCode::CREATED,
        response_headers,
        Json(RoomResponse::from(outcome.into_room())),
    )
        .into_response())
}

/// HTTP handler for listing all rooms
///
/// GET /api/rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let service = RoomService::new(Arc::clone(&state.room_repository));
    let rooms = service.list_rooms().await?;

    info!(room_count = rooms.len(), "Rooms listed successfully");

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// GET /api/get-room?code=ABCDEF
#[instrument(name = "get_room", skip(state, headers))]
pub async fn get_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GetRoomQuery>,
) -> Result<Json<RoomDetailResponse>, AppError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::Validation(ValidationErrors::single("code", REQUIRED)))?;

    let service = RoomService::new(Arc::clone(&state.room_repository));
    let room = service.get_room_by_code(&code).await?;

    let caller = state
        .session_service
        .current_session(bearer_token(&headers))
        .await?;
    let is_host = caller.is_some_and(|claims| room.is_hosted_by(&claims.session_id));

    Ok(Json(RoomDetailResponse {
        room: RoomResponse::from(room),
        is_host,
    }))
}

/// GET /api/user-in-room
/// Code of the caller's own room, or null
#[instrument(name = "user_in_room", skip(state, headers))]
pub async fn user_in_room(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserInRoomResponse>, AppError> {
    let caller = state
        .session_service
        .current_session(bearer_token(&headers))
        .await?;

    let code = match caller {
        Some(claims) => {
            RoomService::new(Arc::clone(&state.room_repository))
                .room_code_for_host(&claims.session_id)
                .await?
        }
        None => None,
    };

    Ok(Json(UserInRoomResponse { code }))
}
