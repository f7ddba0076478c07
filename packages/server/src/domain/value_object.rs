//! Value objects.
//!
//! Every identifier and piece of user-supplied text is validated once, when it
//! is constructed; past that point the core can rely on it being non-empty and
//! within its length limit.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length (in characters) of identifiers and display names.
pub const MAX_NAME_LENGTH: usize = 64;
/// Maximum length (in characters) of a chat message.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

fn validate(field: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let length = value.chars().count();
    if length > max {
        return Err(ValueObjectError::TooLong { field, max, length });
    }
    Ok(())
}

macro_rules! text_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate($field, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_value_object!(
    /// Room identifier, unique and immutable for the room's lifetime.
    RoomId,
    "roomId",
    MAX_NAME_LENGTH
);
text_value_object!(
    /// Room display name, unique among live rooms at creation time.
    RoomName,
    "name",
    MAX_NAME_LENGTH
);
text_value_object!(
    /// Caller-supplied user identifier.
    UserId,
    "userId",
    MAX_NAME_LENGTH
);
text_value_object!(
    /// User display name.
    UserName,
    "userName",
    MAX_NAME_LENGTH
);
text_value_object!(
    /// Chat message body.
    MessageContent,
    "message",
    MAX_MESSAGE_LENGTH
);

/// Opaque identifier of one live client link, assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
