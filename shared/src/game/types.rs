//! Command responses

use super::archive::CompletedGame;
use super::session::GameSession;
use super::verification::VerificationResult;
use crate::error::{AppError, ErrorCode, ErrorKind};
use crate::models::Bet;
use serde::{Deserialize, Serialize};

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    pub success: bool,
    /// Game id the command acted on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CommandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
    /// Repeated command id, not re-executed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl CommandResponse {
    pub fn success(command_id: String, game_id: Option<String>, outcome: CommandOutcome) -> Self {
        Self {
            command_id,
            success: true,
            game_id,
            outcome: Some(outcome),
            error: None,
            duplicate: false,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            game_id: None,
            outcome: None,
            error: Some(error),
            duplicate: false,
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            game_id: None,
            outcome: None,
            error: None,
            duplicate: true,
        }
    }
}

/// Data produced by a successful command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Game(Box<GameSession>),
    Bet(Box<Bet>),
    Verification(Box<VerificationResult>),
    BatchVerification(Vec<BatchVerifyEntry>),
    Completed(Box<CompletedGame>),
    Reset { game_id: String },
}

/// Command error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: code.kind(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        AppError::with_message(err.code, err.message)
    }
}

/// Per-cartela outcome of a batch verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchVerifyEntry {
    pub cartela_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_kind() {
        let err = CommandError::new(ErrorCode::AlreadyLocked, "Cartela 3 is locked");
        assert_eq!(err.kind, ErrorKind::StateConflict);

        let resp = CommandResponse::error("cmd-1".into(), err);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"]["code"], 6002);
        assert_eq!(json["error"]["kind"], "state_conflict");
        assert!(json.get("duplicate").is_none());
    }

    #[test]
    fn test_duplicate_flag() {
        let resp = CommandResponse::duplicate("cmd-1".into());
        assert!(resp.success);
        assert!(resp.duplicate);
    }
}
