//! Data models
//!
//! Shared between hall-server and its clients (via API).
//! Timestamps are Unix millis (`i64`); money is `f64` rounded to cents.

pub mod bet;
pub mod cartela;
pub mod cashier;
pub mod config;
pub mod win_pattern;

// Re-exports
pub use bet::*;
pub use cartela::*;
pub use cashier::*;
pub use config::*;
pub use win_pattern::*;
