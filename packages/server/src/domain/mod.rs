//! Domain layer: rooms, users, the mic token and the ports the core depends on.
//!
//! Nothing in here knows about websockets or JSON. The infrastructure layer
//! implements [`RoomRepository`] and [`MessagePusher`].

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod subscription;
pub mod value_object;

pub use entity::{ChatEntry, ControllerState, Departure, MicTransfer, Room, User};
pub use error::{MessagePushError, RoomError, ValueObjectError};
pub use message_pusher::{MessagePusher, Outbound, PusherChannel};
pub use repository::RoomRepository;
pub use subscription::Subscription;
pub use value_object::{ConnectionId, MessageContent, RoomId, RoomName, Timestamp, UserId, UserName};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
