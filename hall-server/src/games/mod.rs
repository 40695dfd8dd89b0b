//! Game engine
//!
//! - [`allocator`] - per-cashier daily game ids (4000-4999)
//! - [`machine`] - lifecycle transitions
//! - [`ledger`] - ticket status rules
//! - [`verification`] - pattern matching against called numbers
//! - [`money`] - decimal aggregates and prize split
//! - [`manager`] - transactional command processing over redb

pub mod allocator;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod manager;
pub mod money;
pub mod verification;

pub use error::{GameError, GameResult};
pub use manager::{GameManager, ManagerError, ManagerResult};
