use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{NewRoom, RoomModel, RoomSettings};
use crate::shared::AppError;

/// Result of an upsert keyed by host
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// No room existed for the host, a new one was stored
    Created(RoomModel),
    /// The host's existing room had its settings replaced
    Updated(RoomModel),
}

impl UpsertOutcome {
    pub fn room(&self) -> &RoomModel {
        match self {
            UpsertOutcome::Created(room) | UpsertOutcome::Updated(room) => room,
        }
    }

    pub fn into_room(self) -> RoomModel {
        match self {
            UpsertOutcome::Created(room) | UpsertOutcome::Updated(room) => room,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Trait for room repository operations
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<RoomModel>, AppError>;
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError>;

    /// Stores a new room. Fails if the host or code is already taken.
    async fn create_room(&self, room: &NewRoom) -> Result<RoomModel, AppError>;

    /// Replaces only `guest_can_pause` and `votes_to_skip` on a stored room
    async fn update_settings(
        &self,
        room_id: i64,
        settings: &RoomSettings,
    ) -> Result<RoomModel, AppError>;

    /// Creates the host's room or updates its settings in place.
    ///
    /// This default is a plain read-then-write: two concurrent first
    /// requests for one host can both miss and race on `create_room`.
    /// Stores able to do it atomically override it.
    async fn upsert_by_host(&self, room: &NewRoom) -> Result<UpsertOutcome, AppError> {
        match self.find_by_host(&room.host).await? {
            Some(existing) => {
                let updated = self.update_settings(existing.id, &room.settings).await?;
                Ok(UpsertOutcome::Updated(updated))
            }
            None => Ok(UpsertOutcome::Created(self.create_room(room).await?)),
        }
    }
}

#[derive(Default)]
struct RoomTable {
    next_id: i64,
    rooms: HashMap<i64, RoomModel>,
}

impl RoomTable {
    fn find_by<F>(&self, predicate: F) -> Option<&RoomModel>
    where
        F: Fn(&RoomModel) -> bool,
    {
        self.rooms.values().find(|room| predicate(room))
    }

    fn insert(&mut self, room: &NewRoom) -> Result<RoomModel, AppError> {
        if self.find_by(|r| r.host == room.host).is_some() {
            warn!(host = %room.host, "Host already owns a room");
            return Err(AppError::DatabaseError(
                "Room for host already exists".to_string(),
            ));
        }
        if self.find_by(|r| r.code == room.code).is_some() {
            warn!(room_code = %room.code, "Room code already in use");
            return Err(AppError::DatabaseError(
                "Room code already exists".to_string(),
            ));
        }

        self.next_id += 1;
        let stored = room.clone().into_model(self.next_id);
        self.rooms.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

/// In-memory implementation of RoomRepository for development and testing
///
/// Every operation runs under one lock, so `upsert_by_host` is atomic.
pub struct InMemoryRoomRepository {
    table: Mutex<RoomTable>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(RoomTable::default()),
        }
    }

    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RoomTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError> {
        let room = self.lock().find_by(|r| r.host == host).cloned();
        debug!(host = %host, found = room.is_some(), "Looked up room by host in memory");
        Ok(room)
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        Ok(self.lock().find_by(|r| r.code == code).cloned())
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let mut rooms: Vec<RoomModel> = self.lock().rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.id);
        Ok(rooms)
    }

    #[instrument(skip(self, room), fields(host = %room.host))]
    async fn create_room(&self, room: &NewRoom) -> Result<RoomModel, AppError> {
        let stored = self.lock().insert(room)?;
        debug!(room_id = stored.id, room_code = %stored.code, "Room created in memory");
        Ok(stored)
    }

    #[instrument(skip(self, settings))]
    async fn update_settings(
        &self,
        room_id: i64,
        settings: &RoomSettings,
    ) -> Result<RoomModel, AppError> {
        let mut table = self.lock();
        let room = table
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        room.apply_settings(settings);
        Ok(room.clone())
    }

    #[instrument(skip(self, room), fields(host = %room.host))]
    async fn upsert_by_host(&self, room: &NewRoom) -> Result<UpsertOutcome, AppError> {
        let mut table = self.lock();

        let existing_id = table.find_by(|r| r.host == room.host).map(|r| r.id);
        if let Some(existing) = existing_id.and_then(|id| table.rooms.get_mut(&id)) {
            existing.apply_settings(&room.settings);
            return Ok(UpsertOutcome::Updated(existing.clone()));
        }

        Ok(UpsertOutcome::Created(table.insert(room)?))
    }
}

const ROOM_COLUMNS: &str = "id, code, host, guest_can_pause, votes_to_skip, created_at";

/// PostgreSQL implementation of room repository
///
/// Relies on unique constraints on `rooms.host` and `rooms.code`.
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, column = column, "Failed to fetch room from database");
            AppError::DatabaseError(e.to_string())
        })
    }
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_host(&self, host: &str) -> Result<Option<RoomModel>, AppError> {
        self.fetch_one_where("host", host).await
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        self.fetch_one_where("code", code).await
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        sqlx::query_as::<_, RoomModel>(&format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list rooms");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self, room), fields(host = %room.host))]
    async fn create_room(&self, room: &NewRoom) -> Result<RoomModel, AppError> {
        sqlx::query_as::<_, RoomModel>(&format!(
            "INSERT INTO rooms (code, host, guest_can_pause, votes_to_skip, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(&room.code)
        .bind(&room.host)
        .bind(room.settings.guest_can_pause)
        .bind(room.settings.votes_to_skip)
        .bind(room.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create room in database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, settings))]
    async fn update_settings(
        &self,
        room_id: i64,
        settings: &RoomSettings,
    ) -> Result<RoomModel, AppError> {
        sqlx::query_as::<_, RoomModel>(&format!(
            "UPDATE rooms SET guest_can_pause = $2, votes_to_skip = $3 WHERE id = $1 \
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(room_id)
        .bind(settings.guest_can_pause)
        .bind(settings.votes_to_skip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, room_id = room_id, "Failed to update room settings");
            AppError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
    }

    #[instrument(skip(self, room), fields(host = %room.host))]
    async fn upsert_by_host(&self, room: &NewRoom) -> Result<UpsertOutcome, AppError> {
        // xmax is zero only for a row this statement inserted
        let row = sqlx::query(&format!(
            "INSERT INTO rooms (code, host, guest_can_pause, votes_to_skip, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (host) DO UPDATE SET \
                 guest_can_pause = EXCLUDED.guest_can_pause, \
                 votes_to_skip = EXCLUDED.votes_to_skip \
             RETURNING {ROOM_COLUMNS}, (xmax = 0) AS inserted"
        ))
        .bind(&room.code)
        .bind(&room.host)
        .bind(room.settings.guest_can_pause)
        .bind(room.settings.votes_to_skip)
        .bind(room.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to upsert room in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let inserted: bool = row
            .try_get("inserted")
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let stored =
            RoomModel::from_row(&row).map_err(|e| AppError::DatabaseError(e.to_string()))?;

        info!(room_id = stored.id, inserted = inserted, "Room upserted in database");

        Ok(if inserted {
            UpsertOutcome::Created(stored)
        } else {
            UpsertOutcome::Updated(stored)
        })
    }
}
