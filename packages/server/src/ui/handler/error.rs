//! Errors reported back to the connection that sent an event.

use thiserror::Error;

use crate::{
    domain::{RoomError, ValueObjectError},
    infrastructure::dto::websocket::{ErrorCode, ErrorMessage},
};

#[derive(Debug, Error)]
pub enum EventError {
    /// Malformed frame or field; nothing was mutated.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}

impl EventError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Room(RoomError::RoomNotFound(_) | RoomError::UserNotFound { .. }) => {
                ErrorCode::NotFound
            }
            Self::Room(RoomError::RoomAlreadyExists(_)) => ErrorCode::AlreadyExists,
            Self::Room(RoomError::NotHolder(_)) => ErrorCode::NotHolder,
        }
    }
}

impl From<ValueObjectError> for EventError {
    fn from(e: ValueObjectError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<serde_json::Error> for EventError {
    fn from(e: serde_json::Error) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<EventError> for ErrorMessage {
    fn from(e: EventError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}
