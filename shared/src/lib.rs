//! Shared types for the bingo hall
//!
//! Types used by hall-server and its clients: error codes and the API
//! envelope, catalog/bet models, game session types and the real-time
//! protocol.

pub mod error;
pub mod game;
pub mod models;
pub mod realtime;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use game::{CommandResponse, GameCommand, GameEvent, GameSession};
