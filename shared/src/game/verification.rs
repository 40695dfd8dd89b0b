//! Verification results and the per-cartela lock state

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Won,
    Lost,
}

/// A win pattern that fully matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPattern {
    pub id: String,
    pub name: String,
}

/// Outcome of verifying one cartela against the called numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub cartela_id: u32,
    pub ticket_number: Option<String>,
    pub status: VerificationStatus,
    /// Matched pattern ids
    pub patterns: Vec<String>,
    /// Matched pattern names (same order as `patterns`)
    pub pattern_names: Vec<String>,
    pub all_matched_patterns: Vec<MatchedPattern>,
    /// Card numbers that have been called
    pub matched_numbers: Vec<u8>,
    /// Called numbers at verification time, in draw order
    pub drawn_numbers: Vec<u8>,
    pub draws_at_verification: u32,
    pub verified_at: i64,
}

impl VerificationResult {
    pub fn is_won(&self) -> bool {
        self.status == VerificationStatus::Won
    }
}

/// Per-cartela verification state.
///
/// Locking is one-way: a `Locked` entry never goes back to `Verified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Verified {
        result: VerificationResult,
    },
    Locked {
        result: VerificationResult,
        locked_by: String,
        locked_at: i64,
    },
}

impl VerificationState {
    pub fn result(&self) -> Option<&VerificationResult> {
        match self {
            Self::Unverified => None,
            Self::Verified { result } | Self::Locked { result, .. } => Some(result),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}
