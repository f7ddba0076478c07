//! Room presence and broadcast server.
//!
//! Users gather in named rooms, chat, raise hands and pass a single mic
//! between them. Every connection receives the view it is subscribed to
//! (the room list or one room's snapshot) once per tick.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
