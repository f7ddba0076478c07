//! UseCase: pass the mic from its holder to another user.
//!
//! Exclusivity is enforced by the registry; this use case only adds the
//! notifications: the new holder hears about it first, then the whole room
//! gets the updated snapshot.

use std::sync::Arc;

use crate::{
    domain::{MessagePusher, MicTransfer, RoomError, RoomId, RoomRepository, UserId},
    infrastructure::dto::websocket::{MicReceivedMessage, ServerEvent},
};

use super::notify::{broadcast_room, push_event};

pub struct TransferMicUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TransferMicUseCase {
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
        from: &UserId,
        to: &UserId,
    ) -> Result<MicTransfer, RoomError> {
        let transfer = self.repository.transfer_mic(room_id, from, to).await?;
        tracing::info!("Mic in room '{}' passed from '{}' to '{}'", room_id, from, to);

        let notice = ServerEvent::MicReceived(MicReceivedMessage {
            room_id: room_id.to_string(),
            from: from.to_string(),
        });
        push_event(
            self.message_pusher.as_ref(),
            &transfer.new_holder.connection_id,
            &notice,
        )
        .await;
        broadcast_room(self.message_pusher.as_ref(), transfer.room.clone()).await;

        Ok(transfer)
    }
}
