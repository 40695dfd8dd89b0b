//! Error kind: the coarse taxonomy clients branch on
//!
//! Codes tell a client *what* went wrong; the kind tells it how to react.

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, correctable by the client
    Validation,
    /// Business rule violation (already handled, wrong state, duplicate)
    StateConflict,
    /// Game id space exhausted until the next business day
    RangeExhausted,
    /// Unknown ticket, game, cartela or pattern
    NotFound,
    /// Store unavailable or failing
    PersistenceFailure,
    /// Missing or invalid identity
    Unauthorized,
    /// Identity present but not allowed
    Forbidden,
    /// Bug or misconfiguration
    Internal,
}

impl ErrorKind {
    /// Whether the client may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::PersistenceFailure)
    }
}

impl ErrorCode {
    /// Map the code onto the error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::InvalidDrawNumber
            | Self::StakeTooLow
            | Self::InvalidCartelaGrid
            | Self::InvalidWinPattern => ErrorKind::Validation,

            Self::AlreadyExists
            | Self::CashierAlreadyExists
            | Self::GameInProgress
            | Self::GameAlreadyCompleted
            | Self::InvalidTransition
            | Self::DuplicateDraw
            | Self::GameHasBets
            | Self::AllNumbersDrawn
            | Self::DuplicateCartela
            | Self::BetAlreadyCancelled
            | Self::BetAlreadyRedeemed
            | Self::InvalidBetStatus
            | Self::BetLocked
            | Self::GameNotCompleted
            | Self::NotVerified
            | Self::AlreadyLocked
            | Self::CartelaExists
            | Self::CartelaInactive
            | Self::CartelaInUse
            | Self::WinPatternNameExists => ErrorKind::StateConflict,

            Self::GameIdRangeExhausted => ErrorKind::RangeExhausted,

            Self::NotFound
            | Self::CashierNotFound
            | Self::GameNotFound
            | Self::BetNotFound
            | Self::NoBetForCartela
            | Self::CartelaNotFound
            | Self::WinPatternNotFound => ErrorKind::NotFound,

            Self::DatabaseError
            | Self::StorageFull
            | Self::OutOfMemory
            | Self::StorageCorrupted
            | Self::SystemBusy => ErrorKind::PersistenceFailure,

            Self::NotAuthenticated | Self::TokenInvalid | Self::SessionKeyInvalid => {
                ErrorKind::Unauthorized
            }

            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::ReadOnlyConnection => ErrorKind::Forbidden,

            Self::Success | Self::Unknown | Self::InternalError | Self::ConfigError => {
                ErrorKind::Internal
            }
        }
    }
}
