//! Infrastructure layer: concrete implementations of the domain ports and the
//! wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
