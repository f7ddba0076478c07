//! Data Transfer Objects.
//!
//! - `websocket`: inbound client events and outbound server events
//! - `http`: HTTP API response bodies
//! - `conversion`: validation of inbound DTOs into domain values, and domain → DTO

pub mod conversion;
pub mod http;
pub mod websocket;
