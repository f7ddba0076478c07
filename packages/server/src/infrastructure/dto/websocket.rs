//! Websocket frames.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`; events
//! without a payload omit `data`.

use serde::{Deserialize, Serialize};

// ========================================
// Inbound
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    GetRoomList,
    CreateRoom(CreateRoomPayload),
    EnterRoom(EnterRoomPayload),
    LeaveRoom(LeaveRoomPayload),
    Chat(ChatPayload),
    ControllerUpdate(ControllerUpdatePayload),
    #[serde(alias = "transferMic")]
    PassMic(PassMicPayload),
    HeartbeatAck,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetRoomList => "getRoomList",
            Self::CreateRoom(_) => "createRoom",
            Self::EnterRoom(_) => "enterRoom",
            Self::LeaveRoom(_) => "leaveRoom",
            Self::Chat(_) => "chat",
            Self::ControllerUpdate(_) => "controllerUpdate",
            Self::PassMic(_) => "passMic",
            Self::HeartbeatAck => "heartbeatAck",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerDto {
    pub away: bool,
    pub hand_raised: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub mic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub controller: ControllerDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub room_id: String,
    pub name: String,
    pub host_id: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomPayload {
    pub room_id: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomPayload {
    pub room_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub room_id: String,
    /// Author display name.
    pub user: String,
    pub message: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerUpdatePayload {
    pub room_id: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassMicPayload {
    pub room_id: String,
    pub from: String,
    pub to: String,
}

// ========================================
// Outbound
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    RoomList(Vec<RoomSummaryMessage>),
    RoomSnapshot(RoomSnapshotMessage),
    MicReceived(MicReceivedMessage),
    Heartbeat,
    Error(ErrorMessage),
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryMessage {
    pub room_id: String,
    pub name: String,
    pub host_id: String,
    pub user_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    pub id: String,
    pub name: String,
    pub controller: ControllerDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntryMessage {
    pub user: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub sent_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotMessage {
    pub room_id: String,
    pub name: String,
    pub host_id: String,
    pub users: Vec<UserMessage>,
    pub chat: Vec<ChatEntryMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicReceivedMessage {
    pub room_id: String,
    pub from: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Validation,
    NotFound,
    AlreadyExists,
    NotHolder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: String,
}
