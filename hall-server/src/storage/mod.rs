//! redb-based storage for the hall
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `cashiers` | `cashier_id` | `Cashier` | Operator + allocator state |
//! | `session_index` | `session_id` | `cashier_id` | Channel key lookup |
//! | `cartelas` | `(cashier_id, cartela_id)` | `Cartela` | Card catalog |
//! | `win_patterns` | `(cashier_id, pattern_id)` | `WinPattern` | Pattern catalog |
//! | `live_games` | `cashier_id` | `GameSession` | At most one per cashier |
//! | `bets` | `ticket_number` | `Bet` | Ledger (never deleted) |
//! | `cashier_tickets` | `(cashier_id, ticket_number)` | `()` | Recall index |
//! | `game_cartelas` | `(instance_id, cartela_id)` | `ticket_number` | One bet per cartela per game |
//! | `completed_games` | `instance_id` | `CompletedGame` | Archive (immutable) |
//! | `cashier_games` | `(cashier_id, instance_id)` | `()` | History index |
//! | `processed_commands` | `command_id` | `()` | Idempotency |
//! | `game_commands` | `(instance_id, command_id)` | `()` | Command ids to drop when the game is archived |
//! | `counters` | name | `u64` | Ticket / event sequence |
//! | `settings` | name | JSON | `GlobalConfig` |
//!
//! Write helpers take the caller's `WriteTransaction`; the caller commits.
//! Read helpers open their own read transaction.

mod bets;
mod cashiers;
mod catalog;
mod games;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use shared::error::ErrorCode;
use shared::models::GlobalConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const CASHIERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cashiers");

const SESSION_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("session_index");

const CARTELAS_TABLE: TableDefinition<(&str, u32), &[u8]> = TableDefinition::new("cartelas");

const WIN_PATTERNS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("win_patterns");

/// Keyed by cashier: the key itself enforces one live game per cashier
const LIVE_GAMES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("live_games");

const BETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("bets");

const CASHIER_TICKETS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("cashier_tickets");

/// Entries are never removed, so a cancelled slot stays retired
const GAME_CARTELAS_TABLE: TableDefinition<(&str, u32), &str> =
    TableDefinition::new("game_cartelas");

const COMPLETED_GAMES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("completed_games");

const CASHIER_GAMES_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("cashier_games");

const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Pruned together with `processed_commands` at end / reset
const GAME_COMMANDS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("game_commands");

const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

const TICKET_SEQ_KEY: &str = "ticket_seq";
const EVENT_SEQ_KEY: &str = "event_seq";
const GLOBAL_CONFIG_KEY: &str = "global_config";

/// Read retry attempts for transient failures
const READ_RETRY_ATTEMPTS: u32 = 3;
const READ_RETRY_BASE_DELAY: Duration = Duration::from_millis(5);

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Worth retrying on a read path
    pub fn is_transient(&self) -> bool {
        !matches!(self, StorageError::Serialization(_) | StorageError::Table(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// 将存储错误转换为错误码
pub fn classify_storage_error(e: &StorageError) -> ErrorCode {
    if let StorageError::Serialization(_) = e {
        return ErrorCode::StorageCorrupted;
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }
    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return ErrorCode::OutOfMemory;
    }
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::SystemBusy
}

/// Hall storage backed by redb
#[derive(Clone)]
pub struct HallStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for HallStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HallStorage").finish_non_exhaustive()
    }
}

impl HallStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CASHIERS_TABLE)?;
            let _ = write_txn.open_table(SESSION_INDEX_TABLE)?;
            let _ = write_txn.open_table(CARTELAS_TABLE)?;
            let _ = write_txn.open_table(WIN_PATTERNS_TABLE)?;
            let _ = write_txn.open_table(LIVE_GAMES_TABLE)?;
            let _ = write_txn.open_table(BETS_TABLE)?;
            let _ = write_txn.open_table(CASHIER_TICKETS_TABLE)?;
            let _ = write_txn.open_table(GAME_CARTELAS_TABLE)?;
            let _ = write_txn.open_table(COMPLETED_GAMES_TABLE)?;
            let _ = write_txn.open_table(CASHIER_GAMES_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(GAME_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(SETTINGS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            for key in [TICKET_SEQ_KEY, EVENT_SEQ_KEY] {
                if counters.get(key)?.is_none() {
                    counters.insert(key, 0u64)?;
                }
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Run a read with a short exponential backoff on transient failures.
    ///
    /// Only for read paths: writes surface failures immediately.
    pub fn read_with_retry<T>(&self, op: impl Fn(&Self) -> StorageResult<T>) -> StorageResult<T> {
        let mut attempt = 0;
        loop {
            match op(self) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt + 1 < READ_RETRY_ATTEMPTS => {
                    let delay = READ_RETRY_BASE_DELAY * 2u32.pow(attempt);
                    tracing::warn!(error = %e, attempt, "Transient storage read failure, retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ========== Counters ==========

    fn increment_counter(&self, txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    fn read_counter(&self, key: &str) -> StorageResult<u64> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value()).unwrap_or(0))
    }

    /// Next ticket sequence value (committed with the bet)
    pub fn next_ticket_seq(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.increment_counter(txn, TICKET_SEQ_KEY)
    }

    /// Next event sequence value (committed with the mutation)
    pub fn next_event_seq(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.increment_counter(txn, EVENT_SEQ_KEY)
    }

    pub fn current_event_seq(&self) -> StorageResult<u64> {
        self.read_counter(EVENT_SEQ_KEY)
    }

    pub fn current_ticket_seq(&self) -> StorageResult<u64> {
        self.read_counter(TICKET_SEQ_KEY)
    }

    // ========== Command Idempotency ==========

    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed, remembering the live game it belongs to
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
        instance_id: Option<&str>,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        if let Some(instance_id) = instance_id {
            let mut index = txn.open_table(GAME_COMMANDS_TABLE)?;
            index.insert((instance_id, command_id), ())?;
        }
        Ok(())
    }

    /// Drop the processed command ids of an archived (or reset) game.
    ///
    /// Returns how many ids were removed.
    pub fn cleanup_command_ids(
        &self,
        txn: &WriteTransaction,
        instance_id: &str,
    ) -> StorageResult<usize> {
        let mut index = txn.open_table(GAME_COMMANDS_TABLE)?;
        let mut command_ids = Vec::new();
        for result in index.range((instance_id, "")..)? {
            let (key, _) = result?;
            let (owner, command_id) = key.value();
            if owner != instance_id {
                break;
            }
            command_ids.push(command_id.to_string());
        }

        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        for command_id in &command_ids {
            table.remove(command_id.as_str())?;
            index.remove((instance_id, command_id.as_str()))?;
        }
        Ok(command_ids.len())
    }

    // ========== Settings ==========

    /// Global config, defaults when never written
    pub fn get_config(&self) -> StorageResult<GlobalConfig> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        match table.get(GLOBAL_CONFIG_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(GlobalConfig::default()),
        }
    }

    pub fn get_config_txn(&self, txn: &WriteTransaction) -> StorageResult<GlobalConfig> {
        let table = txn.open_table(SETTINGS_TABLE)?;
        match table.get(GLOBAL_CONFIG_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(GlobalConfig::default()),
        }
    }

    pub fn put_config(&self, txn: &WriteTransaction, config: &GlobalConfig) -> StorageResult<()> {
        let mut table = txn.open_table(SETTINGS_TABLE)?;
        let value = serde_json::to_vec(config)?;
        table.insert(GLOBAL_CONFIG_KEY, value.as_slice())?;
        Ok(())
    }

    // ========== Statistics ==========

    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.begin_read()?;

        let cashiers = read_txn.open_table(CASHIERS_TABLE)?;
        let live = read_txn.open_table(LIVE_GAMES_TABLE)?;
        let bets = read_txn.open_table(BETS_TABLE)?;
        let completed = read_txn.open_table(COMPLETED_GAMES_TABLE)?;
        let commands = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let counters = read_txn.open_table(COUNTERS_TABLE)?;

        Ok(StorageStats {
            cashier_count: cashiers.len()?,
            live_game_count: live.len()?,
            bet_count: bets.len()?,
            completed_game_count: completed.len()?,
            processed_command_count: commands.len()?,
            ticket_sequence: counters
                .get(TICKET_SEQ_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
            event_sequence: counters
                .get(EVENT_SEQ_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub cashier_count: u64,
    pub live_game_count: u64,
    pub bet_count: u64,
    pub completed_game_count: u64,
    pub processed_command_count: u64,
    pub ticket_sequence: u64,
    pub event_sequence: u64,
}
