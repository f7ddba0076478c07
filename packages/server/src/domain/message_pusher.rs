//! Transport port: what the core needs from the connection layer.
//!
//! The core never owns a socket. It addresses connections by [`ConnectionId`]
//! and rooms by group (one group per [`RoomId`]), and the implementation turns
//! that into frames on the right sockets.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomId};

/// Frame handed to a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    /// Close the socket and stop writing.
    Close,
}

pub type PusherChannel = mpsc::UnboundedSender<Outbound>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget the connection and drop it from every group.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    async fn is_connected(&self, connection_id: &ConnectionId) -> bool;

    async fn join_group(&self, group: &RoomId, connection_id: &ConnectionId);

    async fn leave_group(&self, group: &RoomId, connection_id: &ConnectionId);

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Push to every member of the group. Individual failures are logged, not returned.
    async fn push_to_group(&self, group: &RoomId, content: &str) -> Result<(), MessagePushError>;

    /// Ask the connection's socket to close, then unregister it.
    async fn disconnect(&self, connection_id: &ConnectionId);
}
