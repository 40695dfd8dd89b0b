//! Completed game archive - immutable once written

use super::session::{DrawRecord, GameFinancials};
use super::verification::VerificationState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedGame {
    pub instance_id: String,
    pub game_id: String,
    pub cashier_id: String,
    pub session_id: String,
    pub draw_history: Vec<DrawRecord>,
    pub called_numbers: BTreeSet<u8>,
    pub financials: GameFinancials,
    pub shop_margin_percent: f64,
    pub system_fee_percent: f64,
    /// Non-cancelled bets settled at end
    pub bet_count: u32,
    pub winner_count: u32,
    /// Net prize pool split equally among winners
    pub prize_per_winner: f64,
    pub winning_cartelas: Vec<u32>,
    pub verifications: BTreeMap<u32, VerificationState>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: i64,
}

/// List view for history endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedGameSummary {
    pub instance_id: String,
    pub game_id: String,
    pub cashier_id: String,
    pub total_stake: f64,
    pub net_prize_pool: f64,
    pub bet_count: u32,
    pub winner_count: u32,
    pub draws: u32,
    pub completed_at: i64,
}

impl From<&CompletedGame> for CompletedGameSummary {
    fn from(g: &CompletedGame) -> Self {
        Self {
            instance_id: g.instance_id.clone(),
            game_id: g.game_id.clone(),
            cashier_id: g.cashier_id.clone(),
            total_stake: g.financials.total_stake,
            net_prize_pool: g.financials.net_prize_pool,
            bet_count: g.bet_count,
            winner_count: g.winner_count,
            draws: g.draw_history.len() as u32,
            completed_at: g.completed_at,
        }
    }
}
