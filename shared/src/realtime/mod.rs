//! Real-time protocol (WebSocket)
//!
//! Every connection carries a role and a session key. On connect and on every
//! resync the server sends a full snapshot, then streams events.

use crate::game::{CommandResponse, GameCommandPayload, GameEvent, GameSession};
use serde::{Deserialize, Serialize};

/// Connection role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Runs the game, may send commands
    Cashier,
    /// Public screen, read-only
    Display,
    /// Back office, read-only, sees every session
    Admin,
}

impl ClientRole {
    pub fn can_command(&self) -> bool {
        matches!(self, Self::Cashier)
    }
}

impl std::fmt::Display for ClientRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cashier => "cashier",
            Self::Display => "display",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Connection status of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPresence {
    pub session_id: String,
    pub cashier_connected: bool,
    pub display_connected: bool,
    pub cashier_last_activity: Option<i64>,
    pub display_last_activity: Option<i64>,
}

/// Full state of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Changes on every server restart; clients drop cached state when it differs
    pub epoch: String,
    pub session_id: String,
    pub cashier_id: String,
    /// Live game, if any
    pub game: Option<GameSession>,
    pub presence: SessionPresence,
    /// Highest event sequence issued so far
    pub last_sequence: u64,
    pub server_time: i64,
}

/// Admin dashboard aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSnapshot {
    pub epoch: String,
    pub live_games: Vec<GameSession>,
    pub sessions: Vec<SessionPresence>,
    pub last_sequence: u64,
    pub server_time: i64,
}

/// Which part of a cashier's catalog changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Cartelas,
    WinPatterns,
}

/// Server → client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot(Box<SessionSnapshot>),
    AdminSnapshot(Box<AdminSnapshot>),
    Event(Box<GameEvent>),
    CommandResult(Box<CommandResponse>),
    ConnectionStatus(SessionPresence),
    /// Catalog was edited; clients refetch the named list
    CatalogChanged { kind: CatalogKind },
    Error { code: u16, message: String },
    Pong { server_time: i64 },
}

/// Client → server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Cashier only
    Command {
        command_id: String,
        payload: GameCommandPayload,
    },
    /// Ask for a fresh snapshot
    Resync,
    Ping,
}
