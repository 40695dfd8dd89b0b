//! Live game session - the authoritative state of one in-progress game

use super::verification::VerificationState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Game lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created, no numbers drawn
    Waiting,
    /// Draws in progress
    Active,
    /// Draws suspended
    Paused,
    /// Terminal
    Completed,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a number was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawSource {
    Manual,
    Auto,
}

/// One entry of the draw history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub number: u8,
    pub timestamp: i64,
    pub source: DrawSource,
}

/// Aggregated financials (all derived from total stake)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameFinancials {
    pub total_stake: f64,
    pub total_shop_margin: f64,
    pub total_system_fee: f64,
    pub net_prize_pool: f64,
}

/// Live game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Unique per game instance (game ids are reused daily)
    pub instance_id: String,
    /// 4-digit game id, "4000" ..= "4999"
    pub game_id: String,
    pub cashier_id: String,
    pub session_id: String,
    pub display_token: String,
    pub status: GameStatus,
    pub draw_history: Vec<DrawRecord>,
    pub called_numbers: BTreeSet<u8>,
    pub financials: GameFinancials,
    /// Percentages snapshotted at start
    pub shop_margin_percent: f64,
    pub system_fee_percent: f64,

    // ========== Per-cartela tracking ==========
    #[serde(default)]
    pub selected_cartelas: Vec<u32>,
    #[serde(default)]
    pub placed_bet_cartelas: Vec<u32>,
    #[serde(default)]
    pub winning_cartelas: Vec<u32>,
    #[serde(default)]
    pub verified_cartelas: Vec<u32>,
    /// Only Verified / Locked entries are stored
    #[serde(default)]
    pub verifications: BTreeMap<u32, VerificationState>,

    pub created_at: i64,
    pub started_at: Option<i64>,
    pub paused_at: Option<i64>,
    pub updated_at: i64,
}

impl GameSession {
    /// Count of numbers drawn so far
    pub fn progress(&self) -> u32 {
        self.draw_history.len() as u32
    }

    pub fn is_called(&self, number: u8) -> bool {
        self.called_numbers.contains(&number)
    }

    /// Verification state of a cartela (Unverified when absent)
    pub fn state_of(&self, cartela_id: u32) -> VerificationState {
        self.verifications
            .get(&cartela_id)
            .cloned()
            .unwrap_or(VerificationState::Unverified)
    }

    pub fn has_bets(&self) -> bool {
        !self.placed_bet_cartelas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Paused).unwrap(),
            "\"paused\""
        );
        assert!(GameStatus::Completed.is_terminal());
        assert!(!GameStatus::Waiting.is_terminal());
    }

    #[test]
    fn test_verifications_survive_integer_keys() {
        use crate::game::verification::{VerificationResult, VerificationStatus};

        let result = VerificationResult {
            cartela_id: 7,
            ticket_number: None,
            status: VerificationStatus::Lost,
            patterns: vec![],
            pattern_names: vec![],
            all_matched_patterns: vec![],
            matched_numbers: vec![],
            drawn_numbers: vec![3, 9],
            draws_at_verification: 2,
            verified_at: 1,
        };
        let mut verifications = BTreeMap::new();
        verifications.insert(
            7u32,
            VerificationState::Locked {
                result,
                locked_by: "c1".into(),
                locked_at: 5,
            },
        );
        let json = serde_json::to_string(&verifications).unwrap();
        let back: BTreeMap<u32, VerificationState> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verifications);
    }
}
