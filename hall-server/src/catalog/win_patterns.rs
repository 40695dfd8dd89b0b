//! Win pattern registry

use super::{CatalogError, CatalogResult, CatalogService};
use crate::storage::StorageError;
use redb::WriteTransaction;
use shared::models::{WinPattern, WinPatternCreate, WinPatternUpdate, validate_mask};
use shared::util::{new_id, now_millis};

fn normalize_name(name: &str) -> CatalogResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation(
            "win pattern name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl CatalogService {
    pub fn list_win_patterns(&self, cashier_id: &str) -> CatalogResult<Vec<WinPattern>> {
        Ok(self
            .storage
            .read_with_retry(|s| s.list_win_patterns(cashier_id))?)
    }

    /// Patterns used by verification
    pub fn list_active_win_patterns(&self, cashier_id: &str) -> CatalogResult<Vec<WinPattern>> {
        let mut patterns = self.list_win_patterns(cashier_id)?;
        patterns.retain(|p| p.is_active);
        Ok(patterns)
    }

    pub fn get_win_pattern(&self, cashier_id: &str, pattern_id: &str) -> CatalogResult<WinPattern> {
        self.storage
            .read_with_retry(|s| s.get_win_pattern(cashier_id, pattern_id))?
            .ok_or_else(|| CatalogError::PatternNotFound(pattern_id.to_string()))
    }

    /// 名称按收银员唯一
    fn ensure_name_free(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        name: &str,
        except_id: Option<&str>,
    ) -> CatalogResult<()> {
        let taken = self
            .storage
            .list_win_patterns_txn(txn, cashier_id)?
            .into_iter()
            .any(|p| p.name == name && Some(p.id.as_str()) != except_id);
        if taken {
            return Err(CatalogError::PatternNameExists(name.to_string()));
        }
        Ok(())
    }

    pub fn create_win_pattern(
        &self,
        cashier_id: &str,
        data: WinPatternCreate,
    ) -> CatalogResult<WinPattern> {
        let name = normalize_name(&data.name)?;
        let mask = validate_mask(&data.pattern)?;

        let txn = self.storage.begin_write()?;
        self.ensure_name_free(&txn, cashier_id, &name, None)?;

        let now = now_millis();
        let pattern = WinPattern {
            id: new_id(),
            cashier_id: cashier_id.to_string(),
            name,
            pattern: mask,
            is_active: data.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.storage.put_win_pattern(&txn, &pattern)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            cashier_id = %cashier_id,
            pattern_id = %pattern.id,
            name = %pattern.name,
            "Win pattern created"
        );
        Ok(pattern)
    }

    pub fn update_win_pattern(
        &self,
        cashier_id: &str,
        pattern_id: &str,
        data: WinPatternUpdate,
    ) -> CatalogResult<WinPattern> {
        let name = data.name.as_deref().map(normalize_name).transpose()?;
        let mask = data.pattern.as_deref().map(validate_mask).transpose()?;

        let txn = self.storage.begin_write()?;
        let mut pattern = self
            .storage
            .get_win_pattern_txn(&txn, cashier_id, pattern_id)?
            .ok_or_else(|| CatalogError::PatternNotFound(pattern_id.to_string()))?;

        if let Some(name) = name
            && name != pattern.name
        {
            self.ensure_name_free(&txn, cashier_id, &name, Some(pattern_id))?;
            pattern.name = name;
        }
        if let Some(mask) = mask {
            pattern.pattern = mask;
        }
        if let Some(active) = data.is_active {
            pattern.is_active = active;
        }
        pattern.updated_at = now_millis();

        self.storage.put_win_pattern(&txn, &pattern)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier_id, pattern_id = %pattern_id, "Win pattern updated");
        Ok(pattern)
    }

    pub fn toggle_win_pattern(&self, cashier_id: &str, pattern_id: &str) -> CatalogResult<WinPattern> {
        let txn = self.storage.begin_write()?;
        let mut pattern = self
            .storage
            .get_win_pattern_txn(&txn, cashier_id, pattern_id)?
            .ok_or_else(|| CatalogError::PatternNotFound(pattern_id.to_string()))?;
        pattern.is_active = !pattern.is_active;
        pattern.updated_at = now_millis();
        self.storage.put_win_pattern(&txn, &pattern)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            cashier_id = %cashier_id,
            pattern_id = %pattern_id,
            is_active = pattern.is_active,
            "Win pattern toggled"
        );
        Ok(pattern)
    }

    pub fn delete_win_pattern(&self, cashier_id: &str, pattern_id: &str) -> CatalogResult<()> {
        let txn = self.storage.begin_write()?;
        if !self.storage.delete_win_pattern(&txn, cashier_id, pattern_id)? {
            return Err(CatalogError::PatternNotFound(pattern_id.to_string()));
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(cashier_id = %cashier_id, pattern_id = %pattern_id, "Win pattern deleted");
        Ok(())
    }
}
