//! Room Registry port.
//!
//! The registry is the single source of truth for rooms and users. Every
//! operation is one critical section: callers never observe a partially applied
//! mutation, and everything returned is a copy that later mutations cannot
//! touch.

use async_trait::async_trait;

use super::{
    ChatEntry, ConnectionId, ControllerState, Departure, MicTransfer, Room, RoomError, RoomId,
    RoomName, User, UserId,
};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a new room holding `first_user`.
    ///
    /// Fails with [`RoomError::RoomAlreadyExists`] when the id or the display
    /// name is already taken.
    async fn create_room(
        &self,
        room_id: RoomId,
        name: RoomName,
        host_id: UserId,
        first_user: User,
    ) -> Result<Room, RoomError>;

    /// Append `user` to the room. Duplicate user ids are appended as well.
    async fn enter_room(&self, room_id: &RoomId, user: User) -> Result<Room, RoomError>;

    /// Best-effort removal; returns `None` (and logs) when room or user is absent.
    ///
    /// With duplicate entries for `user_id`, the one owned by `connection_id`
    /// goes first.
    async fn leave_room(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Departure>;

    async fn update_controller(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        state: ControllerState,
    ) -> Result<Room, RoomError>;

    async fn append_chat(&self, room_id: &RoomId, entry: ChatEntry) -> Result<Room, RoomError>;

    async fn transfer_mic(
        &self,
        room_id: &RoomId,
        from: &UserId,
        to: &UserId,
    ) -> Result<MicTransfer, RoomError>;

    /// Remove every user owned by the connection in every room. Idempotent.
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<Departure>;

    async fn snapshot(&self, room_id: &RoomId) -> Result<Room, RoomError>;

    /// All rooms, oldest first.
    async fn list_rooms(&self) -> Vec<Room>;
}
