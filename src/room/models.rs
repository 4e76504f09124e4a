use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROOM_CODE_LENGTH: usize = 6;

/// Database model for rooms table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: i64,
    pub code: String, // Short join code, unique across rooms
    pub host: String, // Session id of the owner, unique across rooms
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
    pub created_at: DateTime<Utc>,
}

impl RoomModel {
    pub fn settings(&self) -> RoomSettings {
        RoomSettings {
            guest_can_pause: self.guest_can_pause,
            votes_to_skip: self.votes_to_skip,
        }
    }

    /// Overwrites the caller-controlled fields, leaving identity untouched
    pub fn apply_settings(&mut self, settings: &RoomSettings) {
        self.guest_can_pause = settings.guest_can_pause;
        self.votes_to_skip = settings.votes_to_skip;
    }

    pub fn is_hosted_by(&self, session_id: &str) -> bool {
        self.host == session_id
    }
}

/// The two fields a host may change on their room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    pub guest_can_pause: bool,
    pub votes_to_skip: i32,
}

/// A room that has not been stored yet; the store assigns `id`
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub code: String,
    pub host: String,
    pub settings: RoomSettings,
    pub created_at: DateTime<Utc>,
}

impl NewRoom {
    pub fn new(code: String, host: String, settings: RoomSettings) -> Self {
        Self {
            code,
            host,
            settings,
            created_at: Utc::now(),
        }
    }

    pub fn into_model(self, id: i64) -> RoomModel {
        RoomModel {
            id,
            code: self.code,
            host: self.host,
            guest_can_pause: self.settings.guest_can_pause,
            votes_to_skip: self.settings.votes_to_skip,
            created_at: self.created_at,
        }
    }
}

/// Generates a random join code of upper-case ASCII letters
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect()
}
