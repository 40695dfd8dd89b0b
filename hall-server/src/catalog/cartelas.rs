//! Cartela registry

use super::{CatalogError, CatalogResult, CatalogService};
use crate::storage::StorageError;
use shared::models::{Cartela, CartelaCreate, CartelaUpdate, validate_grid};
use shared::util::now_millis;

impl CatalogService {
    /// All cartelas of a cashier, inactive included
    pub fn list_cartelas(&self, cashier_id: &str) -> CatalogResult<Vec<Cartela>> {
        Ok(self
            .storage
            .read_with_retry(|s| s.list_cartelas(cashier_id))?)
    }

    /// Cartelas that can take bets
    pub fn list_active_cartelas(&self, cashier_id: &str) -> CatalogResult<Vec<Cartela>> {
        let mut cartelas = self.list_cartelas(cashier_id)?;
        cartelas.retain(|c| c.is_active);
        Ok(cartelas)
    }

    pub fn get_cartela(&self, cashier_id: &str, cartela_id: u32) -> CatalogResult<Cartela> {
        self.storage
            .read_with_retry(|s| s.get_cartela(cashier_id, cartela_id))?
            .ok_or(CatalogError::CartelaNotFound(cartela_id))
    }

    pub fn create_cartela(&self, cashier_id: &str, data: CartelaCreate) -> CatalogResult<Cartela> {
        if data.cartela_id == 0 {
            return Err(CatalogError::Validation(
                "cartela_id must be positive".to_string(),
            ));
        }
        let grid = validate_grid(&data.pattern)?;

        let txn = self.storage.begin_write()?;
        if self
            .storage
            .get_cartela_txn(&txn, cashier_id, data.cartela_id)?
            .is_some()
        {
            return Err(CatalogError::CartelaExists(data.cartela_id));
        }

        let now = now_millis();
        let cartela = Cartela {
            cashier_id: cashier_id.to_string(),
            cartela_id: data.cartela_id,
            pattern: grid,
            is_active: data.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.storage.put_cartela(&txn, &cartela)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier_id, cartela_id = cartela.cartela_id, "Cartela created");
        Ok(cartela)
    }

    /// Replace the grid and/or active flag.
    ///
    /// A grid change is refused while the live game references the cartela.
    pub fn update_cartela(
        &self,
        cashier_id: &str,
        cartela_id: u32,
        data: CartelaUpdate,
    ) -> CatalogResult<Cartela> {
        let grid = data.pattern.as_deref().map(validate_grid).transpose()?;

        let txn = self.storage.begin_write()?;
        let mut cartela = self
            .storage
            .get_cartela_txn(&txn, cashier_id, cartela_id)?
            .ok_or(CatalogError::CartelaNotFound(cartela_id))?;

        if let Some(grid) = grid
            && grid != cartela.pattern
        {
            self.ensure_not_in_use(&txn, cashier_id, cartela_id)?;
            cartela.pattern = grid;
        }
        if let Some(active) = data.is_active {
            cartela.is_active = active;
        }
        cartela.updated_at = now_millis();

        self.storage.put_cartela(&txn, &cartela)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier_id, cartela_id, "Cartela updated");
        Ok(cartela)
    }

    /// Flip the active flag
    pub fn toggle_cartela(&self, cashier_id: &str, cartela_id: u32) -> CatalogResult<Cartela> {
        let txn = self.storage.begin_write()?;
        let mut cartela = self
            .storage
            .get_cartela_txn(&txn, cashier_id, cartela_id)?
            .ok_or(CatalogError::CartelaNotFound(cartela_id))?;
        cartela.is_active = !cartela.is_active;
        cartela.updated_at = now_millis();
        self.storage.put_cartela(&txn, &cartela)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            cashier_id = %cashier_id,
            cartela_id,
            is_active = cartela.is_active,
            "Cartela toggled"
        );
        Ok(cartela)
    }

    /// Delete a cartela that the live game does not reference.
    /// Archived bets keep their cartela id.
    pub fn delete_cartela(&self, cashier_id: &str, cartela_id: u32) -> CatalogResult<()> {
        let txn = self.storage.begin_write()?;
        self.ensure_not_in_use(&txn, cashier_id, cartela_id)?;
        if !self.storage.delete_cartela(&txn, cashier_id, cartela_id)? {
            return Err(CatalogError::CartelaNotFound(cartela_id));
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier_id, cartela_id, "Cartela deleted");
        Ok(())
    }
}
