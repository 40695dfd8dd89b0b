//! Bet Model (投注)

use serde::{Deserialize, Serialize};

/// Width of a ticket number
pub const TICKET_WIDTH: usize = 13;

/// Bet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    /// Placed while the game was waiting
    Pending,
    /// Placed (or promoted) while the game is running
    Active,
    Won,
    Lost,
    Cancelled,
    WonRedeemed,
    LostRedeemed,
}

impl BetStatus {
    /// Still open for settlement
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    /// Settled by `end` but not yet redeemed
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub fn is_redeemed(&self) -> bool {
        matches!(self, Self::WonRedeemed | Self::LostRedeemed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Cancelled => "cancelled",
            Self::WonRedeemed => "won_redeemed",
            Self::LostRedeemed => "lost_redeemed",
        }
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manual settlement lock carried on the bet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationLock {
    pub locked_by: String,
    pub locked_at: i64,
}

/// One ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// 13-digit zero-padded, globally unique
    pub ticket_number: String,
    pub bet_id: String,
    /// 4-digit game id (reused daily)
    pub game_id: String,
    /// Unique game instance
    pub instance_id: String,
    pub cashier_id: String,
    pub session_id: String,
    pub cartela_id: u32,
    pub stake: f64,
    pub bet_type: String,
    pub bet_status: BetStatus,
    /// Numbers drawn when the bet was placed
    pub game_progress: u32,
    #[serde(default)]
    pub selected_numbers: Vec<u8>,
    /// First matched pattern name, set at settlement
    pub win_pattern: Option<String>,
    /// Payout, 0 until redeemed
    pub win: f64,
    pub lock: Option<VerificationLock>,
    pub created_at: i64,
    pub updated_at: i64,
    pub cancelled_at: Option<i64>,
    pub redeemed_at: Option<i64>,
}

impl Bet {
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// Place bet payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetInput {
    pub cartela_id: u32,
    pub stake: f64,
    #[serde(default = "default_bet_type")]
    pub bet_type: String,
    #[serde(default)]
    pub selected_numbers: Vec<u8>,
}

fn default_bet_type() -> String {
    "standard".to_string()
}

/// Recall filter (any historical game)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetFilter {
    pub game_id: Option<String>,
    pub instance_id: Option<String>,
    pub cartela_id: Option<u32>,
    pub status: Option<BetStatus>,
    /// Inclusive lower bound on `created_at` (millis)
    pub from: Option<i64>,
    /// Exclusive upper bound on `created_at` (millis)
    pub to: Option<i64>,
    pub limit: Option<usize>,
}

impl BetFilter {
    pub fn matches(&self, bet: &Bet) -> bool {
        self.game_id.as_ref().is_none_or(|g| *g == bet.game_id)
            && self
                .instance_id
                .as_ref()
                .is_none_or(|i| *i == bet.instance_id)
            && self.cartela_id.is_none_or(|c| c == bet.cartela_id)
            && self.status.is_none_or(|s| s == bet.bet_status)
            && self.from.is_none_or(|f| bet.created_at >= f)
            && self.to.is_none_or(|t| bet.created_at < t)
    }
}

/// Format a ticket sequence value as a fixed-width ticket number
pub fn format_ticket(seq: u64) -> String {
    format!("{:0width$}", seq, width = TICKET_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_format() {
        assert_eq!(format_ticket(1), "0000000000001");
        assert_eq!(format_ticket(1234567890123), "1234567890123");
        assert_eq!(format_ticket(42).len(), TICKET_WIDTH);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&BetStatus::WonRedeemed).unwrap();
        assert_eq!(json, "\"won_redeemed\"");
        let back: BetStatus = serde_json::from_str("\"lost_redeemed\"").unwrap();
        assert_eq!(back, BetStatus::LostRedeemed);
    }

    #[test]
    fn test_status_groups() {
        assert!(BetStatus::Pending.is_open());
        assert!(BetStatus::Active.is_open());
        assert!(BetStatus::Won.is_settled());
        assert!(!BetStatus::Cancelled.is_open());
        assert!(BetStatus::LostRedeemed.is_redeemed());
    }
}
