//! UseCase layer.
//!
//! Each use case mutates the registry through [`RoomRepository`] and then
//! performs its pushes through [`MessagePusher`], never while the registry
//! lock is held.
//!
//! [`RoomRepository`]: crate::domain::RoomRepository
//! [`MessagePusher`]: crate::domain::MessagePusher

pub mod broadcast_scheduler;
pub mod create_room;
pub mod disconnect_connection;
pub mod enter_room;
pub mod get_rooms;
pub mod leave_room;
pub mod liveness_monitor;
pub mod notify;
pub mod send_chat;
pub mod transfer_mic;
pub mod update_controller;

pub use broadcast_scheduler::BroadcastScheduler;
pub use create_room::CreateRoomUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use enter_room::EnterRoomUseCase;
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use liveness_monitor::{HeartbeatTracker, LivenessMonitor, SweepReport};
pub use send_chat::SendChatUseCase;
pub use transfer_mic::TransferMicUseCase;
pub use update_controller::UpdateControllerUseCase;
