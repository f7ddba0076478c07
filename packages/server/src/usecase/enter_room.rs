//! UseCase: enter an existing room.

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, Room, RoomError, RoomId, RoomRepository, Subscription, User,
};

use super::{
    broadcast_scheduler::BroadcastScheduler, liveness_monitor::HeartbeatTracker,
    notify::broadcast_room,
};

pub struct EnterRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<BroadcastScheduler>,
    tracker: Arc<HeartbeatTracker>,
}

impl EnterRoomUseCase {
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

    /// Append the user, show the members already present the new roster, then
    /// join the group and switch the connection to the room's snapshot.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        user: User,
    ) -> Result<Room, RoomError> {
        let user_id = user.id.clone();
        let room = self.repository.enter_room(room_id, user).await?;
        tracing::info!("User '{}' entered room '{}'", user_id, room_id);

        broadcast_room(self.message_pusher.as_ref(), room.clone()).await;
        self.message_pusher.join_group(room_id, &connection_id).await;
        self.tracker.track(connection_id).await;
        self.scheduler
            .subscribe(connection_id, Subscription::RoomSnapshot(room_id.clone()))
            .await;
        Ok(room)
    }
}
