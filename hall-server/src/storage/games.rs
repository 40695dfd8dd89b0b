//! Live game sessions and the completed-game archive

use super::{
    CASHIER_GAMES_TABLE, COMPLETED_GAMES_TABLE, COUNTERS_TABLE, EVENT_SEQ_KEY, HallStorage,
    LIVE_GAMES_TABLE, StorageResult,
};
use redb::{ReadableTable, WriteTransaction};
use shared::game::{CompletedGame, GameSession};
use std::collections::BTreeSet;

impl HallStorage {
    // ========== Live Games ==========

    pub fn get_live_game(&self, cashier_id: &str) -> StorageResult<Option<GameSession>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LIVE_GAMES_TABLE)?;
        match table.get(cashier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_live_game_txn(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
    ) -> StorageResult<Option<GameSession>> {
        let table = txn.open_table(LIVE_GAMES_TABLE)?;
        match table.get(cashier_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_live_game(&self, txn: &WriteTransaction, game: &GameSession) -> StorageResult<()> {
        let mut table = txn.open_table(LIVE_GAMES_TABLE)?;
        let value = serde_json::to_vec(game)?;
        table.insert(game.cashier_id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn remove_live_game(&self, txn: &WriteTransaction, cashier_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(LIVE_GAMES_TABLE)?;
        table.remove(cashier_id)?;
        Ok(())
    }

    pub fn list_live_games(&self) -> StorageResult<Vec<GameSession>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LIVE_GAMES_TABLE)?;

        let mut games = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            games.push(serde_json::from_slice(value.value())?);
        }
        Ok(games)
    }

    /// Game ids held by live games of other cashiers
    pub fn live_game_ids_txn(
        &self,
        txn: &WriteTransaction,
        except_cashier: &str,
    ) -> StorageResult<BTreeSet<u16>> {
        let table = txn.open_table(LIVE_GAMES_TABLE)?;
        let mut ids = BTreeSet::new();
        for result in table.iter()? {
            let (key, value) = result?;
            if key.value() == except_cashier {
                continue;
            }
            let game: GameSession = serde_json::from_slice(value.value())?;
            if let Ok(id) = game.game_id.parse::<u16>() {
                ids.insert(id);
            }
        }
        Ok(ids)
    }

    /// Read-only variant of [`Self::live_game_ids_txn`]
    pub fn live_game_ids(&self, except_cashier: &str) -> StorageResult<BTreeSet<u16>> {
        Ok(self
            .list_live_games()?
            .into_iter()
            .filter(|g| g.cashier_id != except_cashier)
            .filter_map(|g| g.game_id.parse::<u16>().ok())
            .collect())
    }

    /// Live game plus the event sequence it reflects, read in one snapshot
    pub fn live_game_with_sequence(
        &self,
        cashier_id: &str,
    ) -> StorageResult<(Option<GameSession>, u64)> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LIVE_GAMES_TABLE)?;
        let game = match table.get(cashier_id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        let counters = read_txn.open_table(COUNTERS_TABLE)?;
        let sequence = counters.get(EVENT_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
        Ok((game, sequence))
    }

    /// Every live game plus the event sequence they reflect
    pub fn live_games_with_sequence(&self) -> StorageResult<(Vec<GameSession>, u64)> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LIVE_GAMES_TABLE)?;
        let mut games = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            games.push(serde_json::from_slice(value.value())?);
        }
        let counters = read_txn.open_table(COUNTERS_TABLE)?;
        let sequence = counters.get(EVENT_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
        Ok((games, sequence))
    }

    // ========== Archive ==========

    /// Insert the archive record (never overwritten afterwards)
    pub fn put_completed_game(
        &self,
        txn: &WriteTransaction,
        game: &CompletedGame,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(COMPLETED_GAMES_TABLE)?;
        let value = serde_json::to_vec(game)?;
        table.insert(game.instance_id.as_str(), value.as_slice())?;

        let mut index = txn.open_table(CASHIER_GAMES_TABLE)?;
        index.insert((game.cashier_id.as_str(), game.instance_id.as_str()), ())?;
        Ok(())
    }

    pub fn get_completed_game(&self, instance_id: &str) -> StorageResult<Option<CompletedGame>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COMPLETED_GAMES_TABLE)?;
        match table.get(instance_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_completed_game_txn(
        &self,
        txn: &WriteTransaction,
        instance_id: &str,
    ) -> StorageResult<Option<CompletedGame>> {
        let table = txn.open_table(COMPLETED_GAMES_TABLE)?;
        match table.get(instance_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Archives of one cashier, newest first
    pub fn list_completed_games(&self, cashier_id: &str) -> StorageResult<Vec<CompletedGame>> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(CASHIER_GAMES_TABLE)?;
        let table = read_txn.open_table(COMPLETED_GAMES_TABLE)?;

        let mut games: Vec<CompletedGame> = Vec::new();
        for result in index.range((cashier_id, "")..)? {
            let (key, _) = result?;
            let (owner, instance_id) = key.value();
            if owner != cashier_id {
                break;
            }
            if let Some(value) = table.get(instance_id)? {
                games.push(serde_json::from_slice(value.value())?);
            }
        }
        games.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(games)
    }
}
