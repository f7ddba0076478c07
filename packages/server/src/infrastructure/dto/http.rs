//! HTTP API response bodies.

use serde::Serialize;

use super::websocket::{ChatEntryMessage, UserMessage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub users: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub users: Vec<UserMessage>,
    pub chat: Vec<ChatEntryMessage>,
    pub created_at: String,
}
