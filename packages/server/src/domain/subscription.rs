//! What the Broadcast Scheduler pushes to a connection on every tick.

use super::RoomId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Subscription {
    #[default]
    None,
    RoomList,
    RoomSnapshot(RoomId),
}

impl Subscription {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
