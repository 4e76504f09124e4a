use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::models::{RoomModel, RoomSettings};
use crate::shared::AppError;
use crate::validation::{required_bool, required_integer, ValidationErrors};

/// Create-room fields that passed presence and type checks
#[derive(Debug, Validate)]
struct RoomSettingsForm {
    guest_can_pause: Option<bool>,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    votes_to_skip: Option<i32>,
}

impl RoomSettings {
    /// Validates a create-room body: both fields required, `votes_to_skip`
    /// at least one. All field errors are reported together.
    pub fn from_payload(data: &Map<String, Value>) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let form = RoomSettingsForm {
            guest_can_pause: required_bool(data, "guest_can_pause", &mut errors),
            votes_to_skip: required_integer(data, "votes_to_skip", &mut errors),
        };
        errors.extend_from(form.validate());

        match (form.guest_can_pause, form.votes_to_skip) {
            (Some(guest_can_pause), Some(votes_to_skip)) if errors.is_empty() => Ok(Self {
                guest_can_pause,
                votes_to_skip,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Query string for GET /api/get-room
#[derive(Debug, Deserialize)]
pub struct GetRoomQuery {
    pub code: Option<String>,
}

/// Serialized room state
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RoomResponse {
    pub id: i64,
    pub code: String,
    pub host: String,
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
    pub created_at: DateTime<Utc>,
}

impl From<RoomModel> for RoomResponse {
    fn from(room: RoomModel) -> Self {
        Self {
            id: room.id,
            code: room.code,
            host: room.host,
            guest_can_pause: room.guest_can_pause,
            votes_to_skip: room.votes_to_skip,
            created_at: room.created_at,
        }
    }
}

/// Room state plus whether the caller owns it
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomDetailResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub is_host: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserInRoomResponse {
    pub code: Option<String>,
}
