//! Bet ledger tables

use super::{
    BETS_TABLE, CASHIER_TICKETS_TABLE, GAME_CARTELAS_TABLE, HallStorage, StorageResult,
};
use redb::{ReadableTable, WriteTransaction};
use shared::models::{Bet, BetFilter};

/// Default recall page size
const DEFAULT_RECALL_LIMIT: usize = 100;

impl HallStorage {
    pub fn get_bet(&self, ticket_number: &str) -> StorageResult<Option<Bet>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(BETS_TABLE)?;
        match table.get(ticket_number)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_bet_txn(
        &self,
        txn: &WriteTransaction,
        ticket_number: &str,
    ) -> StorageResult<Option<Bet>> {
        let table = txn.open_table(BETS_TABLE)?;
        match table.get(ticket_number)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or update a bet, keeping the recall index current
    pub fn put_bet(&self, txn: &WriteTransaction, bet: &Bet) -> StorageResult<()> {
        let mut table = txn.open_table(BETS_TABLE)?;
        let value = serde_json::to_vec(bet)?;
        table.insert(bet.ticket_number.as_str(), value.as_slice())?;

        let mut index = txn.open_table(CASHIER_TICKETS_TABLE)?;
        index.insert((bet.cashier_id.as_str(), bet.ticket_number.as_str()), ())?;
        Ok(())
    }

    /// Ticket holding a cartela in a game, cancelled tickets included
    pub fn cartela_ticket_txn(
        &self,
        txn: &WriteTransaction,
        instance_id: &str,
        cartela_id: u32,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(GAME_CARTELAS_TABLE)?;
        Ok(table
            .get((instance_id, cartela_id))?
            .map(|guard| guard.value().to_string()))
    }

    /// Retire a cartela slot for a game. The entry is never removed.
    pub fn claim_cartela(
        &self,
        txn: &WriteTransaction,
        instance_id: &str,
        cartela_id: u32,
        ticket_number: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(GAME_CARTELAS_TABLE)?;
        table.insert((instance_id, cartela_id), ticket_number)?;
        Ok(())
    }

    /// Every bet placed against a game instance, cancelled included
    pub fn bets_for_game_txn(
        &self,
        txn: &WriteTransaction,
        instance_id: &str,
    ) -> StorageResult<Vec<Bet>> {
        let index = txn.open_table(GAME_CARTELAS_TABLE)?;
        let table = txn.open_table(BETS_TABLE)?;

        let mut bets = Vec::new();
        for result in index.range((instance_id, 0u32)..=(instance_id, u32::MAX))? {
            let (_key, ticket) = result?;
            if let Some(value) = table.get(ticket.value())? {
                bets.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(bets)
    }

    pub fn bets_for_game(&self, instance_id: &str) -> StorageResult<Vec<Bet>> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(GAME_CARTELAS_TABLE)?;
        let table = read_txn.open_table(BETS_TABLE)?;

        let mut bets = Vec::new();
        for result in index.range((instance_id, 0u32)..=(instance_id, u32::MAX))? {
            let (_key, ticket) = result?;
            if let Some(value) = table.get(ticket.value())? {
                bets.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(bets)
    }

    /// Recall across every historical game of a cashier, newest ticket first
    pub fn recall_bets(&self, cashier_id: &str, filter: &BetFilter) -> StorageResult<Vec<Bet>> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(CASHIER_TICKETS_TABLE)?;
        let table = read_txn.open_table(BETS_TABLE)?;
        let limit = filter.limit.unwrap_or(DEFAULT_RECALL_LIMIT);

        let mut tickets = Vec::new();
        for result in index.range((cashier_id, "")..)? {
            let (key, _) = result?;
            let (owner, ticket) = key.value();
            if owner != cashier_id {
                break;
            }
            tickets.push(ticket.to_string());
        }

        // 票号定宽补零, 字典序即数值序
        let mut bets = Vec::new();
        for ticket in tickets.iter().rev() {
            if bets.len() >= limit {
                break;
            }
            if let Some(value) = table.get(ticket.as_str())? {
                let bet: Bet = serde_json::from_slice(value.value())?;
                if filter.matches(&bet) {
                    bets.push(bet);
                }
            }
        }
        Ok(bets)
    }
}
