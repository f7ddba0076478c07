//! Event dispatcher: turns one inbound websocket frame into a use case call.
//!
//! Frames are parsed into [`ClientEvent`] and every field is converted into
//! domain values before anything touches the registry. Failures go back to
//! the sending connection only.

use crate::{
    domain::{
        ConnectionId, ControllerState, MessageContent, RoomId, RoomName, Subscription, UserId,
        UserName,
    },
    infrastructure::dto::{conversion::chat_color, websocket::ClientEvent},
    ui::state::AppState,
    usecase::notify::report_error,
};

use super::error::EventError;

pub async fn dispatch(state: &AppState, connection_id: ConnectionId, frame: &str) {
    let result = match serde_json::from_str::<ClientEvent>(frame) {
        Ok(event) => {
            let name = event.name();
            tracing::debug!("'{}' from '{}'", name, connection_id);
            handle_event(state, connection_id, event)
                .await
                .inspect_err(|e| tracing::warn!("'{}' from '{}' rejected: {}", name, connection_id, e))
        }
        Err(e) => {
            tracing::warn!("Unparseable frame from '{}': {}", connection_id, e);
            Err(EventError::from(e))
        }
    };

    if let Err(error) = result {
        report_error(state.message_pusher.as_ref(), &connection_id, error.into()).await;
    }
}

async fn handle_event(
    state: &AppState,
    connection_id: ConnectionId,
    event: ClientEvent,
) -> Result<(), EventError> {
    match event {
        ClientEvent::GetRoomList => {
            state
                .scheduler
                .subscribe(connection_id, Subscription::RoomList)
                .await;
        }
        ClientEvent::CreateRoom(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let name = RoomName::new(payload.name)?;
            let host_id = UserId::new(payload.host_id)?;
            let creator = payload.user.into_user(connection_id)?;
            if host_id != creator.id {
                return Err(EventError::Validation(format!(
                    "hostId '{}' must be the creating user '{}'",
                    host_id, creator.id
                )));
            }
            state
                .create_room_usecase
                .execute(connection_id, room_id, name, host_id, creator)
                .await?;
        }
        ClientEvent::EnterRoom(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let user = payload.user.into_user(connection_id)?;
            state
                .enter_room_usecase
                .execute(connection_id, &room_id, user)
                .await?;
        }
        ClientEvent::LeaveRoom(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let user_id = UserId::new(payload.user_id)?;
            state
                .leave_room_usecase
                .execute(connection_id, &room_id, &user_id)
                .await;
        }
        ClientEvent::Chat(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let author = UserName::new(payload.user)?;
            let message = MessageContent::new(payload.message)?;
            let color = chat_color(payload.color)?;
            state
                .send_chat_usecase
                .execute(&room_id, author, message, color)
                .await?;
        }
        ClientEvent::ControllerUpdate(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let user_id = UserId::new(payload.user.id)?;
            let controller = ControllerState::try_from(payload.user.controller)?;
            state
                .update_controller_usecase
                .execute(&room_id, &user_id, controller)
                .await?;
        }
        ClientEvent::PassMic(payload) => {
            let room_id = RoomId::new(payload.room_id)?;
            let from = UserId::new(payload.from)?;
            let to = UserId::new(payload.to)?;
            state
                .transfer_mic_usecase
                .execute(&room_id, &from, &to)
                .await?;
        }
        ClientEvent::HeartbeatAck => {
            if !state.heartbeat_tracker.record_ack(&connection_id).await {
                tracing::debug!("Heartbeat ack from untracked '{}' ignored", connection_id);
            }
        }
    }
    Ok(())
}
