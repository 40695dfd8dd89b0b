//! Global Config Model (全局配置)

use serde::{Deserialize, Serialize};

pub const DEFAULT_SHOP_MARGIN_PERCENT: f64 = 20.0;
pub const DEFAULT_SYSTEM_FEE_PERCENT: f64 = 2.0;
pub const DEFAULT_MIN_STAKE: f64 = 10.0;

/// Singleton hall configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub shop_margin_percent: f64,
    pub system_fee_percent: f64,
    pub min_stake: f64,
    pub display_template: String,
    pub bat_template: String,
    pub updated_at: i64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            shop_margin_percent: DEFAULT_SHOP_MARGIN_PERCENT,
            system_fee_percent: DEFAULT_SYSTEM_FEE_PERCENT,
            min_stake: DEFAULT_MIN_STAKE,
            display_template: "Game {game_id}".to_string(),
            bat_template: "Ticket {ticket_number} - Cartela {cartela_id}".to_string(),
            updated_at: 0,
        }
    }
}

/// Update payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfigUpdate {
    pub shop_margin_percent: Option<f64>,
    pub system_fee_percent: Option<f64>,
    pub min_stake: Option<f64>,
    pub display_template: Option<String>,
    pub bat_template: Option<String>,
}

impl GlobalConfig {
    /// Apply an update, returning the merged config or a reason it is invalid
    pub fn merged(&self, update: GlobalConfigUpdate, now: i64) -> Result<Self, String> {
        let merged = Self {
            shop_margin_percent: update
                .shop_margin_percent
                .unwrap_or(self.shop_margin_percent),
            system_fee_percent: update.system_fee_percent.unwrap_or(self.system_fee_percent),
            min_stake: update.min_stake.unwrap_or(self.min_stake),
            display_template: update
                .display_template
                .unwrap_or_else(|| self.display_template.clone()),
            bat_template: update
                .bat_template
                .unwrap_or_else(|| self.bat_template.clone()),
            updated_at: now,
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_percents(self.shop_margin_percent, self.system_fee_percent)?;
        if !self.min_stake.is_finite() || self.min_stake <= 0.0 {
            return Err(format!("min_stake must be positive, got {}", self.min_stake));
        }
        Ok(())
    }

    /// Render the display title for a game
    pub fn display_title(&self, game_id: &str) -> String {
        self.display_template.replace("{game_id}", game_id)
    }

    /// Render the BAT line printed on a ticket
    pub fn bat_line(&self, ticket_number: &str, cartela_id: u32) -> String {
        self.bat_template
            .replace("{ticket_number}", ticket_number)
            .replace("{cartela_id}", &cartela_id.to_string())
    }
}

/// Margin and fee must each lie in [0, 100] and together not exceed 100
pub fn validate_percents(shop_margin: f64, system_fee: f64) -> Result<(), String> {
    for (name, v) in [("shop_margin_percent", shop_margin), ("system_fee_percent", system_fee)] {
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(format!("{} must be within 0-100, got {}", name, v));
        }
    }
    if shop_margin + system_fee > 100.0 {
        return Err(format!(
            "shop margin + system fee must not exceed 100, got {}",
            shop_margin + system_fee
        ));
    }
    Ok(())
}
