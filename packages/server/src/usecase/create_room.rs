//! UseCase: create a room and move the creator into it.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Room, RoomError, RoomId, RoomName, RoomRepository, Subscription,
    User, UserId,
};

use super::{broadcast_scheduler::BroadcastScheduler, liveness_monitor::HeartbeatTracker};

pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<BroadcastScheduler>,
    tracker: Arc<HeartbeatTracker>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<BroadcastScheduler>,
        tracker: Arc<HeartbeatTracker>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            scheduler,
            tracker,
        }
    }

    /// Create the room, join the creator's connection to the room group, start
    /// liveness tracking and switch the connection to the room's snapshot.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        name: RoomName,
        host_id: UserId,
        creator: User,
    ) -> Result<Room, RoomError> {
        let room = self
            .repository
            .create_room(room_id, name, host_id, creator)
            .await?;
        tracing::info!("Room '{}' ({}) created by '{}'", room.id, room.name, connection_id);

        self.message_pusher.join_group(&room.id, &connection_id).await;
        self.tracker.track(connection_id).await;
        self.scheduler
            .subscribe(connection_id, Subscription::RoomSnapshot(room.id.clone()))
            .await;
        Ok(room)
    }
}
