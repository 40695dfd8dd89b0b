//! Game events - facts published after a command commits

use super::archive::CompletedGame;
use super::session::{DrawRecord, GameFinancials, GameSession, GameStatus};
use super::verification::VerificationResult;
use crate::models::Bet;
use serde::{Deserialize, Serialize};

/// Game event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_id: String,
    /// Global sequence number (monotonic across restarts)
    pub sequence: u64,
    /// Real-time channel key
    pub session_id: String,
    pub cashier_id: String,
    pub game_id: String,
    pub instance_id: String,
    /// Server timestamp (Unix millis)
    pub timestamp: i64,
    /// Command that produced this event
    pub command_id: String,
    pub payload: GameEventPayload,
}

impl GameEvent {
    pub fn new(
        sequence: u64,
        session: &GameSession,
        command_id: impl Into<String>,
        payload: GameEventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            session_id: session.session_id.clone(),
            cashier_id: session.cashier_id.clone(),
            game_id: session.game_id.clone(),
            instance_id: session.instance_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            command_id: command_id.into(),
            payload,
        }
    }

    /// Event about a ticket whose game may already be archived
    pub fn for_bet(
        sequence: u64,
        bet: &Bet,
        session_id: impl Into<String>,
        command_id: impl Into<String>,
        payload: GameEventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            session_id: session_id.into(),
            cashier_id: bet.cashier_id.clone(),
            game_id: bet.game_id.clone(),
            instance_id: bet.instance_id.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            command_id: command_id.into(),
            payload,
        }
    }

    pub fn audience(&self) -> Audience {
        self.payload.audience()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEventPayload {
    // ========== Lifecycle ==========
    GameStarted {
        session: Box<GameSession>,
    },
    GameStatusChanged {
        status: GameStatus,
        previous: GameStatus,
    },
    NumberDrawn {
        draw: DrawRecord,
        called_numbers: Vec<u8>,
        progress: u32,
    },
    GameEnded {
        archive: Box<CompletedGame>,
    },
    GameReset,

    // ========== Cartelas & bets ==========
    CartelasSelected {
        cartela_ids: Vec<u32>,
    },
    BetPlaced {
        bet: Box<Bet>,
        financials: GameFinancials,
        placed_bet_cartelas: Vec<u32>,
    },
    BetCancelled {
        bet: Box<Bet>,
        financials: GameFinancials,
    },
    BetRedeemed {
        bet: Box<Bet>,
    },

    // ========== Verification ==========
    VerificationResult {
        result: Box<VerificationResult>,
    },
    VerificationLocked {
        cartela_id: u32,
        locked_by: String,
        locked_at: i64,
    },
}

/// Which roles receive an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audience {
    pub cashier: bool,
    pub display: bool,
    pub admin: bool,
}

impl GameEventPayload {
    pub fn audience(&self) -> Audience {
        // 显示屏只看公开信息, 兑付与锁定仅收银员/管理员可见
        let display = !matches!(
            self,
            Self::BetRedeemed { .. } | Self::VerificationLocked { .. }
        );
        Audience {
            cashier: true,
            display,
            admin: true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "GAME_STARTED",
            Self::GameStatusChanged { .. } => "GAME_STATUS_CHANGED",
            Self::NumberDrawn { .. } => "NUMBER_DRAWN",
            Self::GameEnded { .. } => "GAME_ENDED",
            Self::GameReset => "GAME_RESET",
            Self::CartelasSelected { .. } => "CARTELAS_SELECTED",
            Self::BetPlaced { .. } => "BET_PLACED",
            Self::BetCancelled { .. } => "BET_CANCELLED",
            Self::BetRedeemed { .. } => "BET_REDEEMED",
            Self::VerificationResult { .. } => "VERIFICATION_RESULT",
            Self::VerificationLocked { .. } => "VERIFICATION_LOCKED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_audience() {
        let drawn = GameEventPayload::GameStatusChanged {
            status: GameStatus::Paused,
            previous: GameStatus::Active,
        };
        assert!(drawn.audience().display);

        let locked = GameEventPayload::VerificationLocked {
            cartela_id: 1,
            locked_by: "c1".into(),
            locked_at: 0,
        };
        assert!(!locked.audience().display);
        assert!(locked.audience().admin);
    }

    #[test]
    fn test_payload_tag() {
        let json = serde_json::to_string(&GameEventPayload::GameReset).unwrap();
        assert_eq!(json, r#"{"type":"GAME_RESET"}"#);
    }
}
