//! Unified error codes for the bingo hall
//!
//! Error codes are shared by hall-server, cashier terminals, displays and the
//! admin back-office. They are organized by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cashier / game id allocation errors
//! - 4xxx: Game session errors
//! - 5xxx: Bet ledger errors
//! - 6xxx: Verification errors
//! - 7xxx: Catalog (cartela / win pattern) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session key or display token does not match
    SessionKeyInvalid = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Connection role is read-only
    ReadOnlyConnection = 2004,

    // ==================== 3xxx: Cashier ====================
    /// Cashier not found
    CashierNotFound = 3001,
    /// Cashier already registered
    CashierAlreadyExists = 3002,
    /// Daily game id range 4000-4999 exhausted
    GameIdRangeExhausted = 3003,
    /// A game is still live for this cashier
    GameInProgress = 3004,

    // ==================== 4xxx: Game ====================
    /// Game not found
    GameNotFound = 4001,
    /// Game has already been completed
    GameAlreadyCompleted = 4002,
    /// Transition not allowed from the current state
    InvalidTransition = 4003,
    /// Number already drawn in this game
    DuplicateDraw = 4004,
    /// Drawn number outside 1-75
    InvalidDrawNumber = 4005,
    /// Game has bets and cannot be reset
    GameHasBets = 4006,
    /// All 75 numbers have been drawn
    AllNumbersDrawn = 4007,

    // ==================== 5xxx: Bet ====================
    /// Bet not found
    BetNotFound = 5001,
    /// Cartela already has a bet in this game
    DuplicateCartela = 5002,
    /// Stake below configured minimum
    StakeTooLow = 5003,
    /// Bet has already been cancelled
    BetAlreadyCancelled = 5004,
    /// Bet has already been redeemed
    BetAlreadyRedeemed = 5005,
    /// Bet status does not allow this operation
    InvalidBetStatus = 5006,
    /// Bet is verification-locked
    BetLocked = 5007,
    /// Game is not completed yet
    GameNotCompleted = 5008,

    // ==================== 6xxx: Verification ====================
    /// Cartela has not been verified
    NotVerified = 6001,
    /// Verification is already locked
    AlreadyLocked = 6002,
    /// No bet placed for this cartela
    NoBetForCartela = 6003,

    // ==================== 7xxx: Catalog ====================
    /// Cartela not found
    CartelaNotFound = 7001,
    /// Cartela id already exists for this cashier
    CartelaExists = 7002,
    /// Cartela is inactive
    CartelaInactive = 7003,
    /// Cartela grid violates column bands or free space rule
    InvalidCartelaGrid = 7004,
    /// Cartela is referenced by a live game
    CartelaInUse = 7005,
    /// Win pattern not found
    WinPatternNotFound = 7101,
    /// Win pattern name already exists for this cashier
    WinPatternNameExists = 7102,
    /// Win pattern mask is malformed
    InvalidWinPattern = 7103,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,

    // ==================== 94xx: Storage ====================
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Out of memory
    OutOfMemory = 9402,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
    /// System busy (IO error, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::SessionKeyInvalid => "Session key or display token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Required role missing",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::ReadOnlyConnection => "Connection is read-only",

            // Cashier
            ErrorCode::CashierNotFound => "Cashier not found",
            ErrorCode::CashierAlreadyExists => "Cashier already exists",
            ErrorCode::GameIdRangeExhausted => "Game id range exhausted for today",
            ErrorCode::GameInProgress => "A game is still in progress",

            // Game
            ErrorCode::GameNotFound => "Game not found",
            ErrorCode::GameAlreadyCompleted => "Game already completed",
            ErrorCode::InvalidTransition => "Invalid game state transition",
            ErrorCode::DuplicateDraw => "Number already drawn",
            ErrorCode::InvalidDrawNumber => "Draw number must be between 1 and 75",
            ErrorCode::GameHasBets => "Game has bets and cannot be reset",
            ErrorCode::AllNumbersDrawn => "All numbers have been drawn",

            // Bet
            ErrorCode::BetNotFound => "Bet not found",
            ErrorCode::DuplicateCartela => "Cartela already has a bet in this game",
            ErrorCode::StakeTooLow => "Stake is below the minimum",
            ErrorCode::BetAlreadyCancelled => "Bet already cancelled",
            ErrorCode::BetAlreadyRedeemed => "Bet already redeemed",
            ErrorCode::InvalidBetStatus => "Bet status does not allow this operation",
            ErrorCode::BetLocked => "Bet is verification-locked",
            ErrorCode::GameNotCompleted => "Game is not completed",

            // Verification
            ErrorCode::NotVerified => "Cartela has not been verified",
            ErrorCode::AlreadyLocked => "Verification already locked",
            ErrorCode::NoBetForCartela => "No bet placed for this cartela",

            // Catalog
            ErrorCode::CartelaNotFound => "Cartela not found",
            ErrorCode::CartelaExists => "Cartela already exists",
            ErrorCode::CartelaInactive => "Cartela is inactive",
            ErrorCode::InvalidCartelaGrid => "Cartela grid is invalid",
            ErrorCode::CartelaInUse => "Cartela is in use by a live game",
            ErrorCode::WinPatternNotFound => "Win pattern not found",
            ErrorCode::WinPatternNameExists => "Win pattern name already exists",
            ErrorCode::InvalidWinPattern => "Win pattern is invalid",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::SessionKeyInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::ReadOnlyConnection),

            // Cashier
            3001 => Ok(ErrorCode::CashierNotFound),
            3002 => Ok(ErrorCode::CashierAlreadyExists),
            3003 => Ok(ErrorCode::GameIdRangeExhausted),
            3004 => Ok(ErrorCode::GameInProgress),

            // Game
            4001 => Ok(ErrorCode::GameNotFound),
            4002 => Ok(ErrorCode::GameAlreadyCompleted),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::DuplicateDraw),
            4005 => Ok(ErrorCode::InvalidDrawNumber),
            4006 => Ok(ErrorCode::GameHasBets),
            4007 => Ok(ErrorCode::AllNumbersDrawn),

            // Bet
            5001 => Ok(ErrorCode::BetNotFound),
            5002 => Ok(ErrorCode::DuplicateCartela),
            5003 => Ok(ErrorCode::StakeTooLow),
            5004 => Ok(ErrorCode::BetAlreadyCancelled),
            5005 => Ok(ErrorCode::BetAlreadyRedeemed),
            5006 => Ok(ErrorCode::InvalidBetStatus),
            5007 => Ok(ErrorCode::BetLocked),
            5008 => Ok(ErrorCode::GameNotCompleted),

            // Verification
            6001 => Ok(ErrorCode::NotVerified),
            6002 => Ok(ErrorCode::AlreadyLocked),
            6003 => Ok(ErrorCode::NoBetForCartela),

            // Catalog
            7001 => Ok(ErrorCode::CartelaNotFound),
            7002 => Ok(ErrorCode::CartelaExists),
            7003 => Ok(ErrorCode::CartelaInactive),
            7004 => Ok(ErrorCode::InvalidCartelaGrid),
            7005 => Ok(ErrorCode::CartelaInUse),
            7101 => Ok(ErrorCode::WinPatternNotFound),
            7102 => Ok(ErrorCode::WinPatternNameExists),
            7103 => Ok(ErrorCode::InvalidWinPattern),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::StorageFull),
            9402 => Ok(ErrorCode::OutOfMemory),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
