use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{generate_room_code, NewRoom, RoomModel, RoomSettings},
    repository::{RoomRepository, UpsertOutcome},
};
use crate::shared::AppError;

const MAX_CODE_ATTEMPTS: usize = 16;

/// Service for handling room business logic
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Ensures `host` owns exactly one room carrying `settings`.
    ///
    /// An existing room keeps its id, code and creation time; only the two
    /// settings fields change. Otherwise a room is created with a fresh code.
    #[instrument(skip(self))]
    pub async fn upsert_room(
        &self,
        host: &str,
        settings: RoomSettings,
    ) -> Result<UpsertOutcome, AppError> {
        let code = self.generate_unique_code().await?;
        let candidate = NewRoom::new(code, host.to_string(), settings);

        let outcome = self.repository.upsert_by_host(&candidate).await?;

        match &outcome {
            UpsertOutcome::Created(room) => {
                info!(room_id = room.id, room_code = %room.code, "Room created")
            }
            UpsertOutcome::Updated(room) => {
                info!(room_id = room.id, room_code = %room.code, "Room settings updated")
            }
        }

        Ok(outcome)
    }

    /// Picks a code not used by any stored room
    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            if self.repository.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!(room_code = %code, "Room code collision, retrying");
        }

        warn!(attempts = MAX_CODE_ATTEMPTS, "Could not find a free room code");
        Err(AppError::Internal)
    }

    #[instrument(skip(self))]
    pub async fn get_room_by_code(&self, code: &str) -> Result<RoomModel, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found: invalid room code".to_string()))
    }

    /// Code of the room owned by `host`, if any
    #[instrument(skip(self))]
    pub async fn room_code_for_host(&self, host: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .repository
            .find_by_host(host)
            .await?
            .map(|room| room.code))
    }

    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Result<Vec<RoomModel>, AppError> {
        let rooms = self.repository.list_rooms().await?;
        debug!(room_count = rooms.len(), "Rooms retrieved");
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::repository::InMemoryRoomRepository;

    fn service() -> (RoomService, Arc<InMemoryRoomRepository>) {
        let repo = Arc::new(InMemoryRoomRepository::new());
        (RoomService::new(repo.clone()), repo)
    }

    fn settings(guest_can_pause: bool, votes_to_skip: i32) -> RoomSettings {
        RoomSettings {
            guest_can_pause,
            votes_to_skip,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_room_for_new_host() {
        let (service, repo) = service();

        let outcome = service.upsert_room("host-1", settings(true, 3)).await.unwrap();

        assert!(outcome.was_created());
        let room = outcome.into_room();
        assert_eq!(room.host, "host-1");
        assert_eq!(room.settings(), settings(true, 3));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_room_in_place() {
        let (service, repo) = service();
        let original = service
            .upsert_room("host-1", settings(false, 2))
            .await
            .unwrap()
            .into_room();

        let outcome = service.upsert_room("host-1", settings(true, 5)).await.unwrap();

        assert!(!outcome.was_created());
        let room = outcome.into_room();
        assert_eq!(room.id, original.id);
        assert_eq!(room.code, original.code);
        assert_eq!(room.settings(), settings(true, 5));
        assert_eq!(repo.room_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_update_is_idempotent() {
        let (service, _repo) = service();
        service.upsert_room("host-1", settings(false, 2)).await.unwrap();

        let once = service
            .upsert_room("host-1", settings(true, 4))
            .await
            .unwrap()
            .into_room();
        let twice = service
            .upsert_room("host-1", settings(true, 4))
            .await
            .unwrap()
            .into_room();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_hosts_are_isolated() {
        let (service, _repo) = service();
        let first = service
            .upsert_room("host-1", settings(true, 1))
            .await
            .unwrap()
            .into_room();
        let second = service
            .upsert_room("host-2", settings(false, 7))
            .await
            .unwrap()
            .into_room();

        assert_ne!(first.id, second.id);
        assert_ne!(first.code, second.code);
        assert_eq!(
            service.room_code_for_host("host-1").await.unwrap(),
            Some(first.code)
        );
        assert_eq!(
            service.room_code_for_host("host-2").await.unwrap(),
            Some(second.code)
        );
        assert_eq!(service.room_code_for_host("host-3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_room_by_code() {
        let (service, _repo) = service();
        let room = service
            .upsert_room("host-1", settings(true, 2))
            .await
            .unwrap()
            .into_room();

        let found = service.get_room_by_code(&room.code).await.unwrap();
        assert_eq!(found, room);

        let missing = service.get_room_by_code("NOPE").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_rooms() {
        let (service, _repo) = service();
        assert!(service.list_rooms().await.unwrap().is_empty());

        service.upsert_room("host-1", settings(true, 2)).await.unwrap();
        service.upsert_room("host-2", settings(true, 2)).await.unwrap();

        assert_eq!(service.list_rooms().await.unwrap().len(), 2);
    }
}
