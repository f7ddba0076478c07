//! Conversion between DTOs and domain entities.
//!
//! Inbound conversions are where field-level validation happens: a payload
//! that survives them only carries well-formed domain values.

use utage_shared::time::millis_to_rfc3339;

use crate::domain::{
    ChatEntry, ConnectionId, ControllerState, Room, User, UserId, UserName, ValueObjectError,
};
use crate::infrastructure::dto::{
    http::{RoomDetailDto, RoomSummaryDto},
    websocket::{
        ChatEntryMessage, ControllerDto, RoomSnapshotMessage, RoomSummaryMessage, UserDto,
        UserMessage,
    },
};

/// Maximum length (in characters) of a controller comment.
pub const MAX_COMMENT_LENGTH: usize = 200;

/// Maximum length (in characters) of a chat line's color.
pub const MAX_COLOR_LENGTH: usize = 32;

/// Blank optional text is dropped; anything longer than `max` is rejected.
fn optional_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValueObjectError> {
    let value = value.filter(|v| !v.trim().is_empty());
    if let Some(length) = value.as_ref().map(|v| v.chars().count())
        && length > max
    {
        return Err(ValueObjectError::TooLong { field, max, length });
    }
    Ok(value)
}

/// Validate the optional color of a chat line.
pub fn chat_color(color: Option<String>) -> Result<Option<String>, ValueObjectError> {
    optional_text(color, "color", MAX_COLOR_LENGTH)
}

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<ControllerDto> for ControllerState {
    type Error = ValueObjectError;

    fn try_from(dto: ControllerDto) -> Result<Self, Self::Error> {
        let comment = optional_text(dto.comment, "comment", MAX_COMMENT_LENGTH)?;
        Ok(Self {
            away: dto.away,
            hand_raised: dto.hand_raised,
            comment,
            mic_held: dto.mic,
        })
    }
}

impl UserDto {
    /// Build the domain user owned by `connection_id`.
    pub fn into_user(self, connection_id: ConnectionId) -> Result<User, ValueObjectError> {
        let controller = ControllerState::try_from(self.controller)?;
        Ok(User::new(
            UserId::new(self.id)?,
            UserName::new(self.name)?,
            connection_id,
        )
        .with_controller(controller))
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<ControllerState> for ControllerDto {
    fn from(state: ControllerState) -> Self {
        Self {
            away: state.away,
            hand_raised: state.hand_raised,
            comment: state.comment,
            mic: state.mic_held,
        }
    }
}

impl From<User> for UserMessage {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_string(),
            name: user.name.into_string(),
            controller: user.controller.into(),
        }
    }
}

impl From<ChatEntry> for ChatEntryMessage {
    fn from(entry: ChatEntry) -> Self {
        Self {
            user: entry.author.into_string(),
            message: entry.message.into_string(),
            color: entry.color,
            sent_at: entry.sent_at.value(),
        }
    }
}

impl From<&Room> for RoomSummaryMessage {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.to_string(),
            name: room.name.to_string(),
            host_id: room.host_id.to_string(),
            user_count: room.users.len(),
        }
    }
}

impl From<Room> for RoomSnapshotMessage {
    fn from(room: Room) -> Self {
        Self {
            room_id: room.id.into_string(),
            name: room.name.into_string(),
            host_id: room.host_id.into_string(),
            users: room.users.into_iter().map(Into::into).collect(),
            chat: room.chat.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Room> for RoomSummaryDto {
    fn from(room: Room) -> Self {
        Self {
            created_at: millis_to_rfc3339(room.created_at.value()),
            id: room.id.into_string(),
            name: room.name.into_string(),
            host_id: room.host_id.into_string(),
            users: room.users.into_iter().map(|u| u.id.into_string()).collect(),
        }
    }
}

impl From<Room> for RoomDetailDto {
    fn from(room: Room) -> Self {
        Self {
            created_at: millis_to_rfc3339(room.created_at.value()),
            id: room.id.into_string(),
            name: room.name.into_string(),
            host_id: room.host_id.into_string(),
            users: room.users.into_iter().map(Into::into).collect(),
            chat: room.chat.into_iter().map(Into::into).collect(),
        }
    }
}
