//! Game commands - requests to mutate a cashier's live game

use serde::{Deserialize, Serialize};

/// Game command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCommand {
    /// Client-generated, used for idempotency
    pub command_id: String,
    /// Owner of the live game (set by the server from the principal)
    pub cashier_id: String,
    /// Operator name (snapshot for audit)
    #[serde(default)]
    pub operator_name: String,
    /// Client timestamp (Unix millis)
    #[serde(default)]
    pub timestamp: i64,
    pub payload: GameCommandPayload,
}

impl GameCommand {
    pub fn new(cashier_id: impl Into<String>, payload: GameCommandPayload) -> Self {
        let cashier_id = cashier_id.into();
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_name: cashier_id.clone(),
            cashier_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameCommandPayload {
    // ========== Lifecycle ==========
    StartGame,
    ActivateGame,
    DrawNumber {
        number: u8,
    },
    DrawAuto,
    PauseGame,
    ResumeGame,
    EndGame,
    ResetGame,

    // ========== Cartelas & bets ==========
    SelectCartelas {
        cartela_ids: Vec<u32>,
    },
    PlaceBet {
        cartela_id: u32,
        stake: f64,
        #[serde(default)]
        bet_type: Option<String>,
        #[serde(default)]
        selected_numbers: Vec<u8>,
    },
    CancelBet {
        ticket_number: String,
    },
    RedeemBet {
        ticket_number: String,
    },

    // ========== Verification ==========
    VerifyCartela {
        cartela_id: u32,
    },
    LockVerification {
        cartela_id: u32,
    },
    BatchVerify {
        cartela_ids: Vec<u32>,
    },
}

impl GameCommandPayload {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartGame => "START_GAME",
            Self::ActivateGame => "ACTIVATE_GAME",
            Self::DrawNumber { .. } => "DRAW_NUMBER",
            Self::DrawAuto => "DRAW_AUTO",
            Self::PauseGame => "PAUSE_GAME",
            Self::ResumeGame => "RESUME_GAME",
            Self::EndGame => "END_GAME",
            Self::ResetGame => "RESET_GAME",
            Self::SelectCartelas { .. } => "SELECT_CARTELAS",
            Self::PlaceBet { .. } => "PLACE_BET",
            Self::CancelBet { .. } => "CANCEL_BET",
            Self::RedeemBet { .. } => "REDEEM_BET",
            Self::VerifyCartela { .. } => "VERIFY_CARTELA",
            Self::LockVerification { .. } => "LOCK_VERIFICATION",
            Self::BatchVerify { .. } => "BATCH_VERIFY",
        }
    }
}
