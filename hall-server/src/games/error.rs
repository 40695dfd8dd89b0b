//! Game rule violations
//!
//! Raised by the pure engine modules (allocator, machine, ledger,
//! verification); the manager wraps them together with storage failures.

use chrono::NaiveDate;
use shared::error::ErrorCode;
use shared::game::GameStatus;
use shared::models::BetStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    // ========== Cashier / allocator ==========
    #[error("Cashier not found: {0}")]
    CashierNotFound(String),

    #[error("Cashier already registered: {0}")]
    CashierExists(String),

    #[error("Game id range exhausted for cashier {cashier_id} on {date}")]
    RangeExhausted { cashier_id: String, date: NaiveDate },

    #[error("Game {0} is still in progress")]
    GameInProgress(String),

    // ========== Lifecycle ==========
    #[error("No live game for cashier {0}")]
    NoLiveGame(String),

    #[error("Cannot {requested} a game that is {current}")]
    InvalidTransition {
        current: GameStatus,
        requested: &'static str,
    },

    #[error("Number {0} has already been drawn")]
    DuplicateDraw(u8),

    #[error("Number {0} is outside 1-75")]
    InvalidDrawNumber(u8),

    #[error("All 75 numbers have been drawn")]
    AllNumbersDrawn,

    #[error("Game has {0} bet(s) and cannot be reset")]
    GameHasBets(usize),

    #[error("Game {0} is already completed")]
    GameCompleted(String),

    // ========== Bets ==========
    #[error("Cartela {cartela_id} already has ticket {ticket_number} in this game")]
    DuplicateCartela {
        cartela_id: u32,
        ticket_number: String,
    },

    #[error("Stake {stake} is below the minimum {min}")]
    StakeTooLow { stake: f64, min: f64 },

    #[error("Cartela {0} not found")]
    CartelaNotFound(u32),

    #[error("Cartela {0} is inactive")]
    CartelaInactive(u32),

    #[error("Ticket {0} not found")]
    BetNotFound(String),

    #[error("Ticket {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Ticket {0} is already redeemed")]
    AlreadyRedeemed(String),

    #[error("Ticket {ticket_number} cannot be {action} while {status}")]
    InvalidBetStatus {
        ticket_number: String,
        status: BetStatus,
        action: &'static str,
    },

    #[error("Ticket {0} is verification-locked")]
    BetLocked(String),

    #[error("Game of ticket {0} is not completed yet")]
    GameNotCompleted(String),

    // ========== Verification ==========
    #[error("No bet placed for cartela {0}")]
    NoBetForCartela(u32),

    #[error("Cartela {0} has not been verified")]
    NotVerified(u32),

    #[error("Verification of cartela {0} is locked")]
    AlreadyLocked(u32),

    #[error("{0}")]
    Validation(String),
}

impl GameError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CashierNotFound(_) => ErrorCode::CashierNotFound,
            Self::CashierExists(_) => ErrorCode::CashierAlreadyExists,
            Self::RangeExhausted { .. } => ErrorCode::GameIdRangeExhausted,
            Self::GameInProgress(_) => ErrorCode::GameInProgress,
            Self::NoLiveGame(_) => ErrorCode::GameNotFound,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::DuplicateDraw(_) => ErrorCode::DuplicateDraw,
            Self::InvalidDrawNumber(_) => ErrorCode::InvalidDrawNumber,
            Self::AllNumbersDrawn => ErrorCode::AllNumbersDrawn,
            Self::GameHasBets(_) => ErrorCode::GameHasBets,
            Self::GameCompleted(_) => ErrorCode::GameAlreadyCompleted,
            Self::DuplicateCartela { .. } => ErrorCode::DuplicateCartela,
            Self::StakeTooLow { .. } => ErrorCode::StakeTooLow,
            Self::CartelaNotFound(_) => ErrorCode::CartelaNotFound,
            Self::CartelaInactive(_) => ErrorCode::CartelaInactive,
            Self::BetNotFound(_) => ErrorCode::BetNotFound,
            Self::AlreadyCancelled(_) => ErrorCode::BetAlreadyCancelled,
            Self::AlreadyRedeemed(_) => ErrorCode::BetAlreadyRedeemed,
            Self::InvalidBetStatus { .. } => ErrorCode::InvalidBetStatus,
            Self::BetLocked(_) => ErrorCode::BetLocked,
            Self::GameNotCompleted(_) => ErrorCode::GameNotCompleted,
            Self::NoBetForCartela(_) => ErrorCode::NoBetForCartela,
            Self::NotVerified(_) => ErrorCode::NotVerified,
            Self::AlreadyLocked(_) => ErrorCode::AlreadyLocked,
            Self::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
