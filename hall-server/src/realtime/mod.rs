//! 实时同步
//!
//! - [`hub`] - 会话频道 / 管理员频道 / 在线状态
//! - [`forwarder`] - GameManager 事件 → hub
//! - [`snapshot`] - 全量快照构建
//! - [`ws`] - WebSocket 端点

pub mod forwarder;
pub mod hub;
pub mod snapshot;
pub mod ws;

pub use hub::{HubMessage, RealtimeHub};
