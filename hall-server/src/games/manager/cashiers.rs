//! Cashier registration, session keys and the global config singleton

use super::{GameManager, ManagerResult};
use crate::games::error::GameError;
use crate::storage::StorageError;
use shared::models::{
    Cashier, CashierCreate, GAME_ID_MIN, GlobalConfig, GlobalConfigUpdate, validate_percents,
};

impl GameManager {
    // ========== Cashiers ==========

    pub fn cashier(&self, cashier_id: &str) -> ManagerResult<Option<Cashier>> {
        Ok(self
            .storage
            .read_with_retry(|s| s.get_cashier(cashier_id))?)
    }

    pub fn cashiers(&self) -> ManagerResult<Vec<Cashier>> {
        Ok(self.storage.read_with_retry(|s| s.list_cashiers())?)
    }

    /// Resolve a real-time channel key to its cashier
    pub fn cashier_for_session(&self, session_id: &str) -> ManagerResult<Option<Cashier>> {
        let Some(cashier_id) = self
            .storage
            .read_with_retry(|s| s.cashier_for_session(session_id))?
        else {
            return Ok(None);
        };
        self.cashier(&cashier_id)
    }

    /// Register a cashier with a fresh session key and display token
    pub fn register_cashier(&self, input: CashierCreate) -> ManagerResult<Cashier> {
        let id = input.id.trim().to_string();
        let name = input.name.trim().to_string();
        if id.is_empty() || name.is_empty() {
            return Err(GameError::Validation("cashier id and name are required".into()).into());
        }

        let txn = self.storage.begin_write()?;
        if self.storage.get_cashier_txn(&txn, &id)?.is_some() {
            return Err(GameError::CashierExists(id).into());
        }

        let config = self.storage.get_config_txn(&txn)?;
        validate_percents(
            input
                .shop_margin_percent
                .unwrap_or(config.shop_margin_percent),
            input
                .system_fee_percent
                .unwrap_or(config.system_fee_percent),
        )
        .map_err(GameError::Validation)?;

        let now = self.now_millis();
        let cashier = Cashier {
            id: id.clone(),
            name,
            session_id: shared::util::short_token(),
            display_token: shared::util::short_token(),
            current_game_id: GAME_ID_MIN,
            last_game_date: None,
            next_game_provisioned: false,
            shop_margin_percent: input.shop_margin_percent,
            system_fee_percent: input.system_fee_percent,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_cashier(&txn, &cashier)?;
        self.storage
            .bind_session(&txn, &cashier.session_id, &cashier.id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier.id, session_id = %cashier.session_id, "Cashier registered");
        Ok(cashier)
    }

    /// Issue a new session key and display token.
    ///
    /// Refused while a game is live, since the game is bound to the old key.
    /// Returns the updated cashier and the retired session key.
    pub fn regenerate_session(&self, cashier_id: &str) -> ManagerResult<(Cashier, String)> {
        let txn = self.storage.begin_write()?;
        let mut cashier = self
            .storage
            .get_cashier_txn(&txn, cashier_id)?
            .ok_or_else(|| GameError::CashierNotFound(cashier_id.to_string()))?;
        if let Some(live) = self.storage.get_live_game_txn(&txn, cashier_id)? {
            return Err(GameError::GameInProgress(live.game_id).into());
        }

        let old_session = std::mem::replace(&mut cashier.session_id, shared::util::short_token());
        cashier.display_token = shared::util::short_token();
        cashier.updated_at = self.now_millis();

        self.storage.unbind_session(&txn, &old_session)?;
        self.storage
            .bind_session(&txn, &cashier.session_id, &cashier.id)?;
        self.storage.put_cashier(&txn, &cashier)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier.id, "Session key regenerated");
        Ok((cashier, old_session))
    }

    // ========== Global config ==========

    pub fn config(&self) -> ManagerResult<GlobalConfig> {
        Ok(self.storage.read_with_retry(|s| s.get_config())?)
    }

    pub fn update_config(&self, update: GlobalConfigUpdate) -> ManagerResult<GlobalConfig> {
        let txn = self.storage.begin_write()?;
        let current = self.storage.get_config_txn(&txn)?;
        let next = current
            .merged(update, self.now_millis())
            .map_err(GameError::Validation)?;
        self.storage.put_config(&txn, &next)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            shop_margin_percent = next.shop_margin_percent,
            system_fee_percent = next.system_fee_percent,
            min_stake = next.min_stake,
            "Global config updated"
        );
        Ok(next)
    }
}
