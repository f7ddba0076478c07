//! Utilities shared by the Utage packages.

pub mod logger;
pub mod time;
