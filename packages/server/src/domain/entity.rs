//! Entities: rooms, their users and the chat log.
//!
//! `Room` enforces two invariants on its own: at most one user holds the mic,
//! and the host is always a present user (or the room is empty and about to be
//! deleted by the registry).

use super::{
    error::RoomError,
    value_object::{ConnectionId, MessageContent, RoomId, RoomName, Timestamp, UserId, UserName},
};

/// Per-user controller flags shown to everyone in the room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub away: bool,
    pub hand_raised: bool,
    pub comment: Option<String>,
    pub mic_held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    /// Connection that owns this entry; used for disconnect cleanup.
    pub connection_id: ConnectionId,
    pub controller: ControllerState,
}

impl User {
    pub fn new(id: UserId, name: UserName, connection_id: ConnectionId) -> Self {
        Self {
            id,
            name,
            connection_id,
            controller: ControllerState::default(),
        }
    }

    pub fn with_controller(mut self, controller: ControllerState) -> Self {
        self.controller = controller;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub author: UserName,
    pub message: MessageContent,
    pub color: Option<String>,
    pub sent_at: Timestamp,
}

impl ChatEntry {
    pub fn new(
        author: UserName,
        message: MessageContent,
        color: Option<String>,
        sent_at: Timestamp,
    ) -> Self {
        Self {
            author,
            message,
            color,
            sent_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub host_id: UserId,
    /// Join order; the first entry is the implicit owner.
    pub users: Vec<User>,
    pub chat: Vec<ChatEntry>,
    pub created_at: Timestamp,
}

/// A user removed from a room, as reported by leave and disconnect cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    pub user: User,
    /// The room became empty and was deleted.
    pub room_deleted: bool,
}

/// Result of a successful mic transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicTransfer {
    pub room: Room,
    pub new_holder: User,
}

impl Room {
    /// Create a room whose first user holds the mic.
    pub fn new(
        id: RoomId,
        name: RoomName,
        host_id: UserId,
        mut first_user: User,
        created_at: Timestamp,
    ) -> Self {
        first_user.controller.mic_held = true;
        Self {
            id,
            name,
            host_id,
            users: vec![first_user],
            chat: Vec::new(),
            created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    fn position(&self, user_id: &UserId) -> Result<usize, RoomError> {
        self.users
            .iter()
            .position(|u| &u.id == user_id)
            .ok_or_else(|| RoomError::UserNotFound {
                room_id: self.id.to_string(),
                user_id: user_id.to_string(),
            })
    }

    pub fn mic_holder(&self) -> Option<&User> {
        self.users.iter().find(|u| u.controller.mic_held)
    }

    /// Append a user. Entering never grants the mic.
    pub fn add_user(&mut self, mut user: User) {
        user.controller.mic_held = false;
        self.users.push(user);
    }

    /// Remove the entry of `user_id` owned by `connection_id`, or the first
    /// entry with that id when the connection owns none. The removed user's
    /// mic is released.
    pub fn remove_user(
        &mut self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<User> {
        let index = self
            .users
            .iter()
            .position(|u| &u.id == user_id && &u.connection_id == connection_id)
            .or_else(|| self.position(user_id).ok())?;
        Some(self.remove_at(index))
    }

    /// Remove every user owned by `connection_id`.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Vec<User> {
        let mut removed = Vec::new();
        while let Some(index) = self
            .users
            .iter()
            .position(|u| &u.connection_id == connection_id)
        {
            removed.push(self.remove_at(index));
        }
        removed
    }

    fn remove_at(&mut self, index: usize) -> User {
        let mut user = self.users.remove(index);
        user.controller.mic_held = false;
        if user.id == self.host_id
            && !self.users.iter().any(|u| u.id == self.host_id)
            && let Some(next) = self.users.first()
        {
            self.host_id = next.id.clone();
        }
        user
    }

    /// Replace a user's controller state.
    ///
    /// The mic flag is reconciled: the holder may release it, a user may claim
    /// it while nobody holds it, and any other change to the flag is ignored.
    pub fn update_controller(
        &mut self,
        user_id: &UserId,
        mut state: ControllerState,
    ) -> Result<(), RoomError> {
        let index = self.position(user_id)?;
        let held = self.users[index].controller.mic_held;
        let free = self.mic_holder().is_none();
        state.mic_held = match (held, state.mic_held) {
            (true, wants) => wants,
            (false, true) => free,
            (false, false) => false,
        };
        self.users[index].controller = state;
        Ok(())
    }

    pub fn append_chat(&mut self, entry: ChatEntry) {
        self.chat.push(entry);
    }

    /// Hand the mic from `from` to `to`, clearing the new holder's raised hand.
    pub fn transfer_mic(&mut self, from: &UserId, to: &UserId) -> Result<&User, RoomError> {
        let from_index = self.position(from)?;
        let to_index = self.position(to)?;
        if !self.users[from_index].controller.mic_held {
            return Err(RoomError::NotHolder(from.to_string()));
        }

        self.users[from_index].controller.mic_held = false;
        let holder = &mut self.users[to_index].controller;
        holder.mic_held = true;
        holder.hand_raised = false;
        Ok(&self.users[to_index])
    }
}
