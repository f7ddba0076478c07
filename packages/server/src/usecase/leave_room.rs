//! UseCase: leave a room and go back to the room list.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Departure, MessagePusher, RoomId, RoomRepository, Subscription, UserId,
};

use super::{broadcast_scheduler::BroadcastScheduler, notify::broadcast_room};

pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<BroadcastScheduler>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<BroadcastScheduler>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            scheduler,
        }
    }

    /// Best-effort: a missing room or user is logged by the registry and the
    /// connection is still moved back to the room list.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Option<Departure> {
        let departure = self
            .repository
            .leave_room(room_id, user_id, &connection_id)
            .await;
        self.message_pusher.leave_group(room_id, &connection_id).await;

        if let Some(departure) = &departure {
            tracing::info!("User '{}' left room '{}'", user_id, room_id);
            if !departure.room_deleted
                && let Ok(room) = self.repository.snapshot(room_id).await
            {
                broadcast_room(self.message_pusher.as_ref(), room).await;
            }
        }

        self.scheduler
            .subscribe(connection_id, Subscription::RoomList)
            .await;
        departure
    }
}
