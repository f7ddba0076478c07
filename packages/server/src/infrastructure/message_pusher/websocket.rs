//! `MessagePusher` backed by websocket writer channels.
//!
//! The websocket handler owns the socket and creates the channel; this type
//! only keeps the sending half plus the group membership table, so pushing a
//! frame never awaits network I/O.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, Outbound, PusherChannel, RoomId};

#[derive(Default)]
struct Tables {
    clients: HashMap<ConnectionId, PusherChannel>,
    groups: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Tables {
    fn drop_client(&mut self, connection_id: &ConnectionId) -> Option<PusherChannel> {
        self.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
        self.clients.remove(connection_id)
    }
}

#[derive(Default)]
pub struct WebSocketMessagePusher {
    tables: Mutex<Tables>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members currently in `group`.
    pub async fn group_size(&self, group: &RoomId) -> usize {
        self.tables
            .lock()
            .await
            .groups
            .get(group)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.tables.lock().await.clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        if self.tables.lock().await.drop_client(connection_id).is_some() {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
    }

    async fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.tables
            .lock()
            .await
            .clients
            .get(connection_id)
            .is_some_and(|sender| !sender.is_closed())
    }

    async fn join_group(&self, group: &RoomId, connection_id: &ConnectionId) {
        let mut tables = self.tables.lock().await;
        if !tables.clients.contains_key(connection_id) {
            tracing::warn!(
                "Connection '{}' is not registered; not joining group '{}'",
                connection_id,
                group
            );
            return;
        }
        tables
            .groups
            .entry(group.clone())
            .or_default()
            .insert(*connection_id);
    }

    async fn leave_group(&self, group: &RoomId, connection_id: &ConnectionId) {
        let mut tables = self.tables.lock().await;
        if let Some(members) = tables.groups.get_mut(group) {
            members.remove(connection_id);
            if members.is_empty() {
                tables.groups.remove(group);
            }
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let tables = self.tables.lock().await;
        let sender = tables
            .clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(Outbound::Text(content.to_string()))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }

    async fn push_to_group(&self, group: &RoomId, content: &str) -> Result<(), MessagePushError> {
        let tables = self.tables.lock().await;
        let Some(members) = tables.groups.get(group) else {
            tracing::debug!("Group '{}' has no members, nothing to push", group);
            return Ok(());
        };

        for member in members {
            match tables.clients.get(member) {
                // a closed channel only means that socket is going away
                Some(sender) => {
                    if let Err(e) = sender.send(Outbound::Text(content.to_string())) {
                        tracing::warn!("Failed to push to '{}' in group '{}': {}", member, group, e);
                    }
                }
                None => tracing::warn!("Group '{}' lists unknown connection '{}'", group, member),
            }
        }
        Ok(())
    }

    async fn disconnect(&self, connection_id: &ConnectionId) {
        let sender = self.tables.lock().await.drop_client(connection_id);
        match sender {
            Some(sender) => {
                let _ = sender.send(Outbound::Close);
                tracing::info!("Connection '{}' disconnected by server", connection_id);
            }
            None => tracing::debug!("Connection '{}' already gone", connection_id),
        }
    }
}
