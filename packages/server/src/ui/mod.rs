//! UI layer: the axum server, its websocket event dispatcher and HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
