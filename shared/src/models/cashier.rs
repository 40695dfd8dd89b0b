//! Cashier Model (收银员)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First game id of a business day
pub const GAME_ID_MIN: u16 = 4000;
/// Last assignable game id of a business day
pub const GAME_ID_MAX: u16 = 4999;

/// Cashier record - operator identity and allocator state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cashier {
    pub id: String,
    pub name: String,
    /// Real-time channel key, shared with the display
    pub session_id: String,
    /// Read-only credential for the public display
    pub display_token: String,
    /// Last issued (or pre-provisioned) game id
    pub current_game_id: u16,
    /// Business day `current_game_id` belongs to
    pub last_game_date: Option<NaiveDate>,
    /// `current_game_id` was provisioned by `end` and has not been used yet
    #[serde(default)]
    pub next_game_provisioned: bool,
    /// Per-shop override of the global margin
    pub shop_margin_percent: Option<f64>,
    /// Per-shop override of the global system fee
    pub system_fee_percent: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Register cashier payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierCreate {
    pub id: String,
    pub name: String,
    pub shop_margin_percent: Option<f64>,
    pub system_fee_percent: Option<f64>,
}

/// Public view returned to the cashier itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierSession {
    pub cashier_id: String,
    pub name: String,
    pub session_id: String,
    pub display_token: String,
    pub current_game_id: String,
    pub last_game_date: Option<NaiveDate>,
}

impl From<&Cashier> for CashierSession {
    fn from(c: &Cashier) -> Self {
        Self {
            cashier_id: c.id.clone(),
            name: c.name.clone(),
            session_id: c.session_id.clone(),
            display_token: c.display_token.clone(),
            current_game_id: format_game_id(c.current_game_id),
            last_game_date: c.last_game_date,
        }
    }
}

/// Fixed-width 4-digit game id string
pub fn format_game_id(id: u16) -> String {
    format!("{:04}", id)
}
