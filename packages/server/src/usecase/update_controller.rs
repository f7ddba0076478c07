//! UseCase: replace a user's controller state.

use std::sync::Arc;

use crate::domain::{
    ControllerState, MessagePusher, Room, RoomError, RoomId, RoomRepository, UserId,
};

use super::notify::broadcast_room;

pub struct UpdateControllerUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UpdateControllerUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        state: ControllerState,
    ) -> Result<Room, RoomError> {
        let room = self
            .repository
            .update_controller(room_id, user_id, state)
            .await?;
        broadcast_room(self.message_pusher.as_ref(), room.clone()).await;
        Ok(room)
    }
}
