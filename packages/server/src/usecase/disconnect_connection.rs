//! UseCase: full teardown of a connection.
//!
//! Both a socket closing and a liveness eviction end up here, so the cleanup
//! is written once. Running it twice for the same connection is harmless.

use std::{collections::HashSet, sync::Arc};

use crate::domain::{ConnectionId, Departure, MessagePusher, RoomRepository};

use super::{
    broadcast_scheduler::BroadcastScheduler, liveness_monitor::HeartbeatTracker,
    notify::broadcast_room,
};

pub struct DisconnectConnectionUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<BroadcastScheduler>,
    tracker: Arc<HeartbeatTracker>,
}

impl DisconnectConnectionUseCase {
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

    /// Stop deliveries, forget liveness, remove the connection's users from
    /// every room and tell the remaining participants.
    ///
    /// Returns the departures caused by this call (empty on a repeat).
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<Departure> {
        self.scheduler.unsubscribe(connection_id).await;
        self.tracker.untrack(connection_id).await;
        let departures = self.repository.remove_connection(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;

        let mut notified = HashSet::new();
        for departure in &departures {
            tracing::info!(
                "User '{}' removed from room '{}' (connection '{}')",
                departure.user.id,
                departure.room_id,
                connection_id
            );
            if departure.room_deleted || !notified.insert(departure.room_id.clone()) {
                continue;
            }
            match self.repository.snapshot(&departure.room_id).await {
                Ok(room) => broadcast_room(self.message_pusher.as_ref(), room).await,
                Err(e) => tracing::debug!("No snapshot to broadcast: {}", e),
            }
        }

        departures
    }
}
