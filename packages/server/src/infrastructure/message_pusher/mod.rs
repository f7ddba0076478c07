//! Message delivery implementations.
//!
//! - `websocket`: per-connection unbounded channels drained by each socket's writer task

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
