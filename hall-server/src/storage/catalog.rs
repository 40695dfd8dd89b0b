//! Cartela and win-pattern catalogs (per cashier)

use super::{CARTELAS_TABLE, HallStorage, StorageResult, WIN_PATTERNS_TABLE};
use redb::{ReadableTable, WriteTransaction};
use shared::models::{Cartela, WinPattern};

impl HallStorage {
    // ========== Cartelas ==========

    pub fn get_cartela(&self, cashier_id: &str, cartela_id: u32) -> StorageResult<Option<Cartela>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CARTELAS_TABLE)?;
        match table.get((cashier_id, cartela_id))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_cartela_txn(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        cartela_id: u32,
    ) -> StorageResult<Option<Cartela>> {
        let table = txn.open_table(CARTELAS_TABLE)?;
        match table.get((cashier_id, cartela_id))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_cartela(&self, txn: &WriteTransaction, cartela: &Cartela) -> StorageResult<()> {
        let mut table = txn.open_table(CARTELAS_TABLE)?;
        let value = serde_json::to_vec(cartela)?;
        table.insert((cartela.cashier_id.as_str(), cartela.cartela_id), value.as_slice())?;
        Ok(())
    }

    /// Returns whether a cartela was removed
    pub fn delete_cartela(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        cartela_id: u32,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(CARTELAS_TABLE)?;
        let removed = table.remove((cashier_id, cartela_id))?.is_some();
        Ok(removed)
    }

    /// All cartelas of a cashier, ordered by id
    pub fn list_cartelas(&self, cashier_id: &str) -> StorageResult<Vec<Cartela>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CARTELAS_TABLE)?;

        let mut cartelas = Vec::new();
        for result in table.range((cashier_id, 0u32)..=(cashier_id, u32::MAX))? {
            let (_key, value) = result?;
            cartelas.push(serde_json::from_slice(value.value())?);
        }
        Ok(cartelas)
    }

    // ========== Win Patterns ==========

    pub fn get_win_pattern(
        &self,
        cashier_id: &str,
        pattern_id: &str,
    ) -> StorageResult<Option<WinPattern>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(WIN_PATTERNS_TABLE)?;
        match table.get((cashier_id, pattern_id))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_win_pattern_txn(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        pattern_id: &str,
    ) -> StorageResult<Option<WinPattern>> {
        let table = txn.open_table(WIN_PATTERNS_TABLE)?;
        match table.get((cashier_id, pattern_id))? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_win_pattern(&self, txn: &WriteTransaction, pattern: &WinPattern) -> StorageResult<()> {
        let mut table = txn.open_table(WIN_PATTERNS_TABLE)?;
        let value = serde_json::to_vec(pattern)?;
        table.insert(
            (pattern.cashier_id.as_str(), pattern.id.as_str()),
            value.as_slice(),
        )?;
        Ok(())
    }

    pub fn delete_win_pattern(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        pattern_id: &str,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(WIN_PATTERNS_TABLE)?;
        let removed = table.remove((cashier_id, pattern_id))?.is_some();
        Ok(removed)
    }

    pub fn list_win_patterns(&self, cashier_id: &str) -> StorageResult<Vec<WinPattern>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(WIN_PATTERNS_TABLE)?;

        let mut patterns = Vec::new();
        for result in table.range((cashier_id, "")..)? {
            let (key, value) = result?;
            if key.value().0 != cashier_id {
                break;
            }
            patterns.push(serde_json::from_slice(value.value())?);
        }
        Ok(patterns)
    }

    /// Patterns as seen by the current write transaction
    pub fn list_win_patterns_txn(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
    ) -> StorageResult<Vec<WinPattern>> {
        let table = txn.open_table(WIN_PATTERNS_TABLE)?;

        let mut patterns = Vec::new();
        for result in table.range((cashier_id, "")..)? {
            let (key, value) = result?;
            if key.value().0 != cashier_id {
                break;
            }
            patterns.push(serde_json::from_slice(value.value())?);
        }
        Ok(patterns)
    }
}
