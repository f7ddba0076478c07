//! Domain errors.

use thiserror::Error;

/// Rejected construction of a value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("`{field}` must be at most {max} characters (got {length})")]
    TooLong {
        field: &'static str,
        max: usize,
        length: usize,
    },
}

/// Failure of a Room Registry operation. The registry is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("user '{user_id}' not found in room '{room_id}'")]
    UserNotFound { room_id: String, user_id: String },

    #[error("a room with id or name '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("user '{0}' does not hold the mic")]
    NotHolder(String),
}

/// Failure to hand a frame to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
