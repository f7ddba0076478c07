//! Pushes shared by several use cases.

use crate::{
    domain::{ConnectionId, MessagePusher, Room},
    infrastructure::dto::websocket::{ErrorMessage, ServerEvent},
};

/// Push the room's snapshot to every connection in the room's group.
pub(crate) async fn broadcast_room(message_pusher: &dyn MessagePusher, room: Room) {
    let room_id = room.id.clone();
    let json = match ServerEvent::RoomSnapshot(room.into()).to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize snapshot of room '{}': {}", room_id, e);
            return;
        }
    };
    if let Err(e) = message_pusher.push_to_group(&room_id, &json).await {
        tracing::warn!("Failed to broadcast snapshot of room '{}': {}", room_id, e);
    }
}

/// Push a single event to one connection, logging failures.
pub(crate) async fn push_event(
    message_pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
    event: &ServerEvent,
) {
    match event.to_json() {
        Ok(json) => {
            if let Err(e) = message_pusher.push_to(connection_id, &json).await {
                tracing::warn!("Failed to push to '{}': {}", connection_id, e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize event for '{}': {}", connection_id, e),
    }
}

/// Report a failed request to the connection that sent it.
pub async fn report_error(
    message_pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
    error: ErrorMessage,
) {
    push_event(message_pusher, connection_id, &ServerEvent::Error(error)).await;
}
