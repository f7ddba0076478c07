//! UseCase: append a chat line and broadcast the room.

use std::sync::Arc;

use utage_shared::time::{Clock, SystemClock};

use crate::domain::{
    ChatEntry, MessageContent, MessagePusher, Room, RoomError, RoomId, RoomRepository, Timestamp,
    UserName,
};

use super::notify::broadcast_room;

pub struct SendChatUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self::with_clock(repository, message_pusher, Arc::new(SystemClock))
    }

    /// Stamp chat lines with `clock` instead of the system time.
    pub fn with_clock(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
        author: UserName,
        message: MessageContent,
        color: Option<String>,
    ) -> Result<Room, RoomError> {
        let sent_at = Timestamp::new(self.clock.now_millis());
        let entry = ChatEntry::new(author, message, color, sent_at);
        let room = self.repository.append_chat(room_id, entry).await?;
        tracing::debug!("Chat appended to room '{}' ({} lines)", room_id, room.chat.len());

        broadcast_room(self.message_pusher.as_ref(), room.clone()).await;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, Outbound, RoomName, User, UserId},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use tokio::sync::mpsc;
    use utage_shared::time::FixedClock;

    #[tokio::test]
    async fn test_chat_is_appended_in_order_and_broadcast() {
        // given:
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendChatUseCase::with_clock(
            repository.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1_700_000_123_456)),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let alice = ConnectionId::generate();
        pusher.register_client(alice, tx).await;
        let room_id = RoomId::new("r1".to_string()).unwrap();
        repository
            .create_room(
                room_id.clone(),
                RoomName::new("Lobby".to_string()).unwrap(),
                UserId::new("u1".to_string()).unwrap(),
                User::new(
                    UserId::new("u1".to_string()).unwrap(),
                    UserName::new("Alice".to_string()).unwrap(),
                    alice,
                ),
            )
            .await
            .unwrap();
        pusher.join_group(&room_id, &alice).await;

        // when:
        for text in ["first", "second"] {
            usecase
                .execute(
                    &room_id,
                    UserName::new("Alice".to_string()).unwrap(),
                    MessageContent::new(text.to_string()).unwrap(),
                    Some("#123456".to_string()),
                )
                .await
                .unwrap();
        }

        // then:
        let room = repository.snapshot(&room_id).await.unwrap();
        let lines: Vec<&str> = room.chat.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(lines, vec!["first", "second"]);
        assert!(room.chat.iter().all(|c| c.sent_at == Timestamp::new(1_700_000_123_456)));
        assert!(matches!(rx.recv().await, Some(Outbound::Text(_))));
        assert!(matches!(rx.recv().await, Some(Outbound::Text(_))));
    }

    #[tokio::test]
    async fn test_chat_to_unknown_room_is_not_found() {
        // given:
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase =
            SendChatUseCase::new(repository.clone(), Arc::new(WebSocketMessagePusher::new()));

        // when:
        let result = usecase
            .execute(
                &RoomId::new("ghost".to_string()).unwrap(),
                UserName::new("Alice".to_string()).unwrap(),
                MessageContent::new("anyone?".to_string()).unwrap(),
                None,
            )
            .await;

        // then:
        assert_eq!(result, Err(RoomError::RoomNotFound("ghost".to_string())));
        assert!(repository.list_rooms().await.is_empty());
    }
}
