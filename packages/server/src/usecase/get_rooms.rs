//! UseCases: read-only views for the HTTP API.

use std::sync::Arc;

use crate::domain::{Room, RoomError, RoomId, RoomRepository};

pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }
}

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: String) -> Result<Room, RoomError> {
        let room_id =
            RoomId::new(room_id.clone()).map_err(|_| RoomError::RoomNotFound(room_id))?;
        self.repository.snapshot(&room_id).await
    }
}
