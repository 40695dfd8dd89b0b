//! Cashier records and the session-key index

use super::{CASHIERS_TABLE, HallStorage, SESSION_INDEX_TABLE, StorageResult};
use redb::{ReadableTable, WriteTransaction};
use shared::models::Cashier;

impl HallStorage {
    pub fn get_cashier(&self, cashier_id: &str) -> StorageResult<Option<Cashier>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CASHIERS_TABLE)?;
        match table.get(cashier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_cashier_txn(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
    ) -> StorageResult<Option<Cashier>> {
        let table = txn.open_table(CASHIERS_TABLE)?;
        match table.get(cashier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_cashier(&self, txn: &WriteTransaction, cashier: &Cashier) -> StorageResult<()> {
        let mut table = txn.open_table(CASHIERS_TABLE)?;
        let value = serde_json::to_vec(cashier)?;
        table.insert(cashier.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn list_cashiers(&self) -> StorageResult<Vec<Cashier>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CASHIERS_TABLE)?;

        let mut cashiers = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            cashiers.push(serde_json::from_slice(value.value())?);
        }
        Ok(cashiers)
    }

    // ========== Session Index ==========

    /// Cashier bound to a session key
    pub fn cashier_for_session(&self, session_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSION_INDEX_TABLE)?;
        Ok(table.get(session_id)?.map(|guard| guard.value().to_string()))
    }

    pub fn bind_session(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        cashier_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_INDEX_TABLE)?;
        table.insert(session_id, cashier_id)?;
        Ok(())
    }

    pub fn unbind_session(&self, txn: &WriteTransaction, session_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_INDEX_TABLE)?;
        table.remove(session_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cashier(id: &str) -> Cashier {
        Cashier {
            id: id.to_string(),
            name: "Front desk".to_string(),
            session_id: format!("s-{id}"),
            display_token: "tok".to_string(),
            current_game_id: 4000,
            last_game_date: None,
            next_game_provisioned: false,
            shop_margin_percent: None,
            system_fee_percent: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_cashier_and_session_index() {
        let storage = HallStorage::open_in_memory().unwrap();
        let c = cashier("c1");

        let txn = storage.begin_write().unwrap();
        storage.put_cashier(&txn, &c).unwrap();
        storage.bind_session(&txn, &c.session_id, &c.id).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_cashier("c1").unwrap(), Some(c.clone()));
        assert_eq!(
            storage.cashier_for_session("s-c1").unwrap().as_deref(),
            Some("c1")
        );
        assert_eq!(storage.list_cashiers().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        storage.unbind_session(&txn, "s-c1").unwrap();
        txn.commit().unwrap();
        assert!(storage.cashier_for_session("s-c1").unwrap().is_none());
    }
}
