//! In-memory Room Registry.
//!
//! A single `tokio::sync::Mutex` guards the whole map. Rooms are small and
//! events arrive at human speed, so one critical section per operation is
//! enough, and it makes "a room with zero users does not exist" trivially
//! atomic: the removal that empties a room deletes it before the lock is
//! released.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use utage_shared::time::{Clock, SystemClock};

use crate::domain::{
    ChatEntry, ConnectionId, ControllerState, Departure, MicTransfer, Room, RoomError, RoomId,
    RoomName, RoomRepository, Timestamp, User, UserId,
};

pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

fn room_not_found(room_id: &RoomId) -> RoomError {
    RoomError::RoomNotFound(room_id.to_string())
}

/// Remove a room from the map when its last user has gone.
fn reap_if_empty(rooms: &mut HashMap<RoomId, Room>, room_id: &RoomId) -> bool {
    if rooms.get(room_id).is_some_and(Room::is_empty) {
        rooms.remove(room_id);
        tracing::info!("Room '{}' is empty and was deleted", room_id);
        true
    } else {
        false
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        room_id: RoomId,
        name: RoomName,
        host_id: UserId,
        first_user: User,
    ) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::RoomAlreadyExists(room_id.into_string()));
        }
        if rooms.values().any(|room| room.name == name) {
            return Err(RoomError::RoomAlreadyExists(name.into_string()));
        }

        let created_at = Timestamp::new(self.clock.now_millis());
        let room = Room::new(room_id.clone(), name, host_id, first_user, created_at);
        rooms.insert(room_id, room.clone());
        Ok(room)
    }

    async fn enter_room(&self, room_id: &RoomId, user: User) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        if room.user(&user.id).is_some() {
            tracing::warn!(
                "User '{}' entered room '{}' again; keeping both entries",
                user.id,
                room_id
            );
        }
        room.add_user(user);
        Ok(room.clone())
    }

    async fn leave_room(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Departure> {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            tracing::warn!("leave_room: room '{}' not found", room_id);
            return None;
        };
        let Some(user) = room.remove_user(user_id, connection_id) else {
            tracing::warn!("leave_room: user '{}' not in room '{}'", user_id, room_id);
            return None;
        };
        let room_deleted = reap_if_empty(&mut rooms, room_id);
        Some(Departure {
            room_id: room_id.clone(),
            user,
            room_deleted,
        })
    }

    async fn update_controller(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        state: ControllerState,
    ) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        room.update_controller(user_id, state)?;
        Ok(room.clone())
    }

    async fn append_chat(&self, room_id: &RoomId, entry: ChatEntry) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        room.append_chat(entry);
        Ok(room.clone())
    }

    async fn transfer_mic(
        &self,
        room_id: &RoomId,
        from: &UserId,
        to: &UserId,
    ) -> Result<MicTransfer, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or_else(|| room_not_found(room_id))?;
        let new_holder = room.transfer_mic(from, to)?.clone();
        Ok(MicTransfer {
            room: room.clone(),
            new_holder,
        })
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<Departure> {
        let mut rooms = self.rooms.lock().await;
        let mut departures = Vec::new();
        let mut emptied = Vec::new();

        for room in rooms.values_mut() {
            for user in room.remove_connection(connection_id) {
                departures.push(Departure {
                    room_id: room.id.clone(),
                    user,
                    room_deleted: room.is_empty(),
                });
            }
            if room.is_empty() {
                emptied.push(room.id.clone());
            }
        }
        for room_id in &emptied {
            reap_if_empty(&mut rooms, room_id);
        }

        departures
    }

    async fn snapshot(&self, room_id: &RoomId) -> Result<Room, RoomError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| room_not_found(room_id))
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.rooms.lock().await.values().cloned().collect();
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, UserName};
    use utage_shared::time::FixedClock;

    // The registry is exercised through the scenarios that matter to clients:
    // - membership arithmetic and deletion of empty rooms
    // - uniqueness of room id and name
    // - mic exclusivity across transfer and leave
    // - connection cleanup being idempotent
    // - NotFound paths leaving every room untouched

    fn repo() -> InMemoryRoomRepository {
        InMemoryRoomRepository::with_clock(Arc::new(FixedClock::new(1_700_000_000_000)))
    }

    fn rid(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn user_on(id: &str, connection_id: ConnectionId) -> User {
        User::new(uid(id), UserName::new(id.to_string()).unwrap(), connection_id)
    }

    fn user(id: &str) -> User {
        user_on(id, ConnectionId::generate())
    }

    async fn create_lobby(repo: &InMemoryRoomRepository) -> Room {
        repo.create_room(
            rid("r1"),
            RoomName::new("Lobby".to_string()).unwrap(),
            uid("u1"),
            user("u1"),
        )
        .await
        .unwrap()
    }

    fn holders(room: &Room) -> usize {
        room.users.iter().filter(|u| u.controller.mic_held).count()
    }

    #[tokio::test]
    async fn test_lobby_lifecycle() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;

        // when:
        let room = repo.enter_room(&rid("r1"), user("u2")).await.unwrap();

        // then:
        let ids: Vec<&str> = room.users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert_eq!(room.created_at, Timestamp::new(1_700_000_000_000));

        // when: both users leave
        let nobody = ConnectionId::generate();
        let first = repo.leave_room(&rid("r1"), &uid("u1"), &nobody).await.unwrap();
        let second = repo.leave_room(&rid("r1"), &uid("u2"), &nobody).await.unwrap();

        // then: the room is gone with its last user
        assert!(!first.room_deleted);
        assert!(second.room_deleted);
        assert!(repo.list_rooms().await.is_empty());
        assert_eq!(
            repo.snapshot(&rid("r1")).await,
            Err(RoomError::RoomNotFound("r1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_user_count_tracks_entries_minus_departures() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;
        for i in 2..=6 {
            repo.enter_room(&rid("r1"), user(&format!("u{i}")))
                .await
                .unwrap();
        }

        // when:
        for i in [2, 4, 6] {
            repo.leave_room(&rid("r1"), &uid(&format!("u{i}")), &ConnectionId::generate())
                .await;
        }

        // then: 6 entries - 3 departures
        let room = repo.snapshot(&rid("r1")).await.unwrap();
        assert_eq!(room.users.len(), 3);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id_or_name() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;

        // when:
        let same_id = repo
            .create_room(
                rid("r1"),
                RoomName::new("Other".to_string()).unwrap(),
                uid("u9"),
                user("u9"),
            )
            .await;
        let same_name = repo
            .create_room(
                rid("r2"),
                RoomName::new("Lobby".to_string()).unwrap(),
                uid("u9"),
                user("u9"),
            )
            .await;

        // then:
        assert_eq!(same_id, Err(RoomError::RoomAlreadyExists("r1".to_string())));
        assert_eq!(
            same_name,
            Err(RoomError::RoomAlreadyExists("Lobby".to_string()))
        );
        assert_eq!(repo.list_rooms().await.len(), 1);
    }

    #[tokio::test]
    async fn test_enter_unknown_room_is_not_found() {
        // given:
        let repo = repo();

        // when:
        let result = repo.enter_room(&rid("nowhere"), user("u1")).await;

        // then:
        assert_eq!(result, Err(RoomError::RoomNotFound("nowhere".to_string())));
    }

    #[tokio::test]
    async fn test_chat_to_unknown_room_leaves_rooms_unchanged() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;
        let before = repo.list_rooms().await;
        let entry = ChatEntry::new(
            UserName::new("u1".to_string()).unwrap(),
            MessageContent::new("hello?".to_string()).unwrap(),
            None,
            Timestamp::new(1),
        );

        // when:
        let result = repo.append_chat(&rid("ghost"), entry).await;

        // then:
        assert_eq!(result, Err(RoomError::RoomNotFound("ghost".to_string())));
        assert_eq!(repo.list_rooms().await, before);
    }

    #[tokio::test]
    async fn test_mic_transfer_then_stale_repeat() {
        // given: u1 holds the mic in r1
        let repo = repo();
        create_lobby(&repo).await;
        repo.enter_room(&rid("r1"), user("u2")).await.unwrap();

        // when:
        let transfer = repo
            .transfer_mic(&rid("r1"), &uid("u1"), &uid("u2"))
            .await
            .unwrap();
        let repeated = repo.transfer_mic(&rid("r1"), &uid("u1"), &uid("u2")).await;

        // then:
        assert_eq!(transfer.new_holder.id.as_str(), "u2");
        assert!(!transfer.room.user(&uid("u1")).unwrap().controller.mic_held);
        assert!(transfer.new_holder.controller.mic_held);
        assert!(!transfer.new_holder.controller.hand_raised);
        assert_eq!(repeated, Err(RoomError::NotHolder("u1".to_string())));
        let room = repo.snapshot(&rid("r1")).await.unwrap();
        assert_eq!(room.mic_holder().map(|u| u.id.as_str()), Some("u2"));
    }

    #[tokio::test]
    async fn test_concurrent_transfers_keep_a_single_holder() {
        // given: five users, u1 holds the mic
        let repo = Arc::new(repo());
        create_lobby(&repo).await;
        for i in 2..=5 {
            repo.enter_room(&rid("r1"), user(&format!("u{i}")))
                .await
                .unwrap();
        }

        // when: every user tries to pass the mic to every other user at once
        let mut handles = Vec::new();
        for from in 1..=5 {
            for to in 1..=5 {
                let repo = repo.clone();
                handles.push(tokio::spawn(async move {
                    let _ = repo
                        .transfer_mic(&rid("r1"), &uid(&format!("u{from}")), &uid(&format!("u{to}")))
                        .await;
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then:
        let room = repo.snapshot(&rid("r1")).await.unwrap();
        assert_eq!(holders(&room), 1);
    }

    #[tokio::test]
    async fn test_leave_unknown_user_is_silent() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;

        // when:
        let nobody = ConnectionId::generate();
        let missing_user = repo.leave_room(&rid("r1"), &uid("ghost"), &nobody).await;
        let missing_room = repo.leave_room(&rid("nope"), &uid("u1"), &nobody).await;

        // then:
        assert!(missing_user.is_none());
        assert!(missing_room.is_none());
        assert_eq!(repo.snapshot(&rid("r1")).await.unwrap().users.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_connection_is_idempotent_across_rooms() {
        // given: one connection sits in two rooms, sharing r2 with someone else
        let repo = repo();
        let connection_id = ConnectionId::generate();
        repo.create_room(
            rid("r1"),
            RoomName::new("Solo".to_string()).unwrap(),
            uid("u1"),
            user_on("u1", connection_id),
        )
        .await
        .unwrap();
        repo.create_room(
            rid("r2"),
            RoomName::new("Shared".to_string()).unwrap(),
            uid("u2"),
            user("u2"),
        )
        .await
        .unwrap();
        repo.enter_room(&rid("r2"), user_on("u1", connection_id))
            .await
            .unwrap();

        // when:
        let mut first = repo.remove_connection(&connection_id).await;
        let second = repo.remove_connection(&connection_id).await;

        // then:
        first.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].room_id.as_str(), "r1");
        assert!(first[0].room_deleted);
        assert_eq!(first[1].room_id.as_str(), "r2");
        assert!(!first[1].room_deleted);
        assert!(second.is_empty());

        let rooms = repo.list_rooms().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].users.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;
        let snapshot = repo.snapshot(&rid("r1")).await.unwrap();

        // when:
        repo.enter_room(&rid("r1"), user("u2")).await.unwrap();

        // then:
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(repo.snapshot(&rid("r1")).await.unwrap().users.len(), 2);
    }

    #[tokio::test]
    async fn test_leave_after_reconnect_removes_the_leaving_connection_entry() {
        // given: u2 entered on a connection that died, then entered again
        let repo = repo();
        create_lobby(&repo).await;
        let stale = ConnectionId::generate();
        let fresh = ConnectionId::generate();
        repo.enter_room(&rid("r1"), user_on("u2", stale)).await.unwrap();
        repo.enter_room(&rid("r1"), user_on("u2", fresh)).await.unwrap();

        // when:
        let departure = repo
            .leave_room(&rid("r1"), &uid("u2"), &fresh)
            .await
            .unwrap();

        // then:
        assert_eq!(departure.user.connection_id, fresh);
        let room = repo.snapshot(&rid("r1")).await.unwrap();
        let owners: Vec<ConnectionId> = room.users.iter().map(|u| u.connection_id).collect();
        assert_eq!(owners.len(), 2);
        assert!(!owners.contains(&fresh));
        assert!(owners.contains(&stale));
    }

    #[tokio::test]
    async fn test_controller_update_is_stored_and_keeps_mic_exclusive() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;
        repo.enter_room(&rid("r1"), user("u2")).await.unwrap();

        // when: u2 raises a hand and tries to grab the held mic
        let room = repo
            .update_controller(
                &rid("r1"),
                &uid("u2"),
                ControllerState {
                    hand_raised: true,
                    comment: Some("me next".to_string()),
                    mic_held: true,
                    ..ControllerState::default()
                },
            )
            .await
            .unwrap();

        // then:
        let u2 = room.user(&uid("u2")).unwrap();
        assert!(u2.controller.hand_raised);
        assert_eq!(u2.controller.comment.as_deref(), Some("me next"));
        assert!(!u2.controller.mic_held);
        assert_eq!(holders(&room), 1);
        assert_eq!(repo.snapshot(&rid("r1")).await.unwrap(), room);
    }

    #[tokio::test]
    async fn test_controller_update_for_unknown_room_or_user_is_not_found() {
        // given:
        let repo = repo();
        create_lobby(&repo).await;
        let before = repo.snapshot(&rid("r1")).await.unwrap();

        // when:
        let missing_room = repo
            .update_controller(&rid("nope"), &uid("u1"), ControllerState::default())
            .await;
        let missing_user = repo
            .update_controller(&rid("r1"), &uid("ghost"), ControllerState::default())
            .await;

        // then:
        assert_eq!(missing_room, Err(RoomError::RoomNotFound("nope".to_string())));
        assert_eq!(
            missing_user,
            Err(RoomError::UserNotFound {
                room_id: "r1".to_string(),
                user_id: "ghost".to_string(),
            })
        );
        assert_eq!(repo.snapshot(&rid("r1")).await.unwrap(), before);
    }
}
