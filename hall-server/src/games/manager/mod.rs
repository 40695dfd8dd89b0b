//! GameManager - command processing and event generation
//!
//! Every mutation of a live game goes through `execute_command`:
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Double-check idempotency inside the transaction
//!     ├─ 4. Dispatch to lifecycle / bets / verification / settlement
//!     ├─ 5. Assign event sequence numbers
//!     ├─ 6. Mark command processed
//!     ├─ 7. Commit transaction
//!     ├─ 8. Broadcast event(s)
//!     └─ 9. Return response
//! ```
//!
//! redb admits one write transaction at a time, so every read-check-write
//! below is serialized: ticket numbers, draws and game ids cannot race.

mod bets;
mod cashiers;
mod error;
mod lifecycle;
mod settlement;
mod verify;

#[cfg(test)]
mod tests;

pub use error::*;

use crate::games::allocator;
use crate::games::error::GameError;
use crate::storage::HallStorage;
use crate::utils::time::{Clock, SystemClock};
use chrono::NaiveDate;
use chrono_tz::Tz;
use redb::WriteTransaction;
use shared::game::{
    CommandOutcome, CommandResponse, CompletedGame, CompletedGameSummary, GameCommand,
    GameCommandPayload, GameEvent, GameEventPayload, GameSession, VerificationState,
};
use shared::models::{Bet, BetFilter, Cashier, format_game_id};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Game manager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct GameManager {
    storage: HallStorage,
    event_tx: broadcast::Sender<GameEvent>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    /// 业务时区
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for GameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameManager")
            .field("storage", &"<HallStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("tz", &self.tz)
            .finish()
    }
}

/// Working set of one command: the open transaction plus the events it emits
pub(crate) struct CommandContext<'a> {
    pub txn: &'a WriteTransaction,
    pub storage: &'a HallStorage,
    pub command_id: &'a str,
    pub cashier_id: &'a str,
    pub operator: &'a str,
    pub now: i64,
    pub today: NaiveDate,
    events: Vec<GameEvent>,
}

impl<'a> CommandContext<'a> {
    /// Queue an event about `session`; the sequence is drawn inside the transaction
    pub fn emit(&mut self, session: &GameSession, payload: GameEventPayload) -> ManagerResult<()> {
        let sequence = self.storage.next_event_seq(self.txn)?;
        self.events
            .push(GameEvent::new(sequence, session, self.command_id, payload));
        Ok(())
    }

    pub fn emit_for_bet(
        &mut self,
        bet: &Bet,
        session_id: &str,
        payload: GameEventPayload,
    ) -> ManagerResult<()> {
        let sequence = self.storage.next_event_seq(self.txn)?;
        self.events.push(GameEvent::for_bet(
            sequence,
            bet,
            session_id,
            self.command_id,
            payload,
        ));
        Ok(())
    }

    /// The cashier's live game, or `NoLiveGame`
    pub fn live_game(&self) -> ManagerResult<GameSession> {
        self.storage
            .get_live_game_txn(self.txn, self.cashier_id)?
            .ok_or_else(|| GameError::NoLiveGame(self.cashier_id.to_string()).into())
    }

    pub fn cashier(&self) -> ManagerResult<Cashier> {
        self.storage
            .get_cashier_txn(self.txn, self.cashier_id)?
            .ok_or_else(|| GameError::CashierNotFound(self.cashier_id.to_string()).into())
    }
}

impl GameManager {
    /// Open the hall database at `db_path`
    pub fn new(db_path: impl AsRef<Path>, tz: Tz) -> ManagerResult<Self> {
        let storage = HallStorage::open(db_path)?;
        Ok(Self::with_clock(storage, tz, Arc::new(SystemClock)))
    }

    /// Build on existing storage with an explicit clock
    pub fn with_clock(storage: HallStorage, tz: Tz, clock: Arc<dyn Clock>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, timezone = %tz, "GameManager started with new epoch");
        Self {
            storage,
            event_tx,
            epoch,
            tz,
            clock,
        }
    }

    /// Create a GameManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: HallStorage) -> Self {
        Self::with_clock(storage, chrono_tz::UTC, Arc::new(SystemClock))
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &HallStorage {
        &self.storage
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    fn today(&self) -> NaiveDate {
        self.clock.today(self.tz)
    }

    // ========== Commands ==========

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: GameCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => CommandResponse::error(command_id, err.into()),
        }
    }

    fn process_command(
        &self,
        cmd: GameCommand,
    ) -> ManagerResult<(CommandResponse, Vec<GameEvent>)> {
        tracing::debug!(
            command_id = %cmd.command_id,
            cashier_id = %cmd.cashier_id,
            command = cmd.payload.name(),
            "Processing command"
        );

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        let mut ctx = CommandContext {
            txn: &txn,
            storage: &self.storage,
            command_id: &cmd.command_id,
            cashier_id: &cmd.cashier_id,
            operator: if cmd.operator_name.is_empty() {
                &cmd.cashier_id
            } else {
                &cmd.operator_name
            },
            now: self.clock.now_millis(),
            today: self.today(),
            events: Vec::new(),
        };

        // 3. Dispatch
        let (game_id, outcome) = match &cmd.payload {
            GameCommandPayload::StartGame => lifecycle::start(&mut ctx)?,
            GameCommandPayload::ActivateGame => lifecycle::activate(&mut ctx)?,
            GameCommandPayload::DrawNumber { number } => lifecycle::draw(&mut ctx, *number)?,
            GameCommandPayload::DrawAuto => lifecycle::draw_auto(&mut ctx)?,
            GameCommandPayload::PauseGame => lifecycle::pause(&mut ctx)?,
            GameCommandPayload::ResumeGame => lifecycle::resume(&mut ctx)?,
            GameCommandPayload::EndGame => settlement::end(&mut ctx)?,
            GameCommandPayload::ResetGame => lifecycle::reset(&mut ctx)?,
            GameCommandPayload::SelectCartelas { cartela_ids } => {
                lifecycle::select_cartelas(&mut ctx, cartela_ids)?
            }
            GameCommandPayload::PlaceBet {
                cartela_id,
                stake,
                bet_type,
                selected_numbers,
            } => bets::place(
                &mut ctx,
                *cartela_id,
                *stake,
                bet_type.clone(),
                selected_numbers.clone(),
            )?,
            GameCommandPayload::CancelBet { ticket_number } => bets::cancel(&mut ctx, ticket_number)?,
            GameCommandPayload::RedeemBet { ticket_number } => bets::redeem(&mut ctx, ticket_number)?,
            GameCommandPayload::VerifyCartela { cartela_id } => verify::verify(&mut ctx, *cartela_id)?,
            GameCommandPayload::LockVerification { cartela_id } => {
                verify::lock(&mut ctx, *cartela_id)?
            }
            GameCommandPayload::BatchVerify { cartela_ids } => {
                verify::batch_verify(&mut ctx, cartela_ids)?
            }
        };
        let events = std::mem::take(&mut ctx.events);
        drop(ctx);

        // 4. Mark processed and commit
        let live_instance = self
            .storage
            .get_live_game_txn(&txn, &cmd.cashier_id)?
            .map(|g| g.instance_id);
        self.storage
            .mark_command_processed(&txn, &cmd.command_id, live_instance.as_deref())?;
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(
            command_id = %cmd.command_id,
            cashier_id = %cmd.cashier_id,
            game_id = %game_id,
            command = cmd.payload.name(),
            events = events.len(),
            "Command committed"
        );

        Ok((
            CommandResponse::success(cmd.command_id, Some(game_id), outcome),
            events,
        ))
    }

    // ========== Queries ==========

    /// The cashier's live game, if any
    pub fn current_game(&self, cashier_id: &str) -> ManagerResult<Option<GameSession>> {
        Ok(self
            .storage
            .read_with_retry(|s| s.get_live_game(cashier_id))?)
    }

    /// Game id the next `start` would receive
    pub fn next_game_id(&self, cashier_id: &str) -> ManagerResult<String> {
        let cashier = self
            .storage
            .read_with_retry(|s| s.get_cashier(cashier_id))?
            .ok_or_else(|| GameError::CashierNotFound(cashier_id.to_string()))?;
        let taken = self
            .storage
            .read_with_retry(|s| s.live_game_ids(cashier_id))?;
        let id = allocator::peek(&cashier, self.today(), &taken)?;
        Ok(format_game_id(id))
    }

    pub fn live_games(&self) -> ManagerResult<Vec<GameSession>> {
        Ok(self.storage.read_with_retry(|s| s.list_live_games())?)
    }

    /// Completed games of a cashier, newest first
    pub fn completed_games(&self, cashier_id: &str) -> ManagerResult<Vec<CompletedGameSummary>> {
        let games = self
            .storage
            .read_with_retry(|s| s.list_completed_games(cashier_id))?;
        Ok(games.iter().map(CompletedGameSummary::from).collect())
    }

    /// One archived game, visible only to its cashier
    pub fn completed_game(
        &self,
        cashier_id: &str,
        instance_id: &str,
    ) -> ManagerResult<Option<CompletedGame>> {
        let game = self
            .storage
            .read_with_retry(|s| s.get_completed_game(instance_id))?;
        Ok(game.filter(|g| g.cashier_id == cashier_id))
    }

    /// Recall tickets across every historical game of the cashier
    pub fn recall(&self, cashier_id: &str, filter: &BetFilter) -> ManagerResult<Vec<Bet>> {
        Ok(self
            .storage
            .read_with_retry(|s| s.recall_bets(cashier_id, filter))?)
    }

    /// Look up one ticket; other cashiers' tickets are reported as not found
    pub fn search(&self, cashier_id: &str, ticket_number: &str) -> ManagerResult<Bet> {
        self.storage
            .read_with_retry(|s| s.get_bet(ticket_number))?
            .filter(|b| b.cashier_id == cashier_id)
            .ok_or_else(|| GameError::BetNotFound(ticket_number.to_string()).into())
    }

    /// Cartelas holding a live (non-cancelled) bet in the current game
    pub fn placed_cartelas(&self, cashier_id: &str) -> ManagerResult<Vec<u32>> {
        Ok(self
            .current_game(cashier_id)?
            .map(|g| g.placed_bet_cartelas)
            .unwrap_or_default())
    }

    /// Verification map of a game by its 4-digit id: the live game first,
    /// then the most recent archive with that id
    pub fn verification_status(
        &self,
        cashier_id: &str,
        game_id: &str,
    ) -> ManagerResult<BTreeMap<u32, VerificationState>> {
        if let Some(live) = self.current_game(cashier_id)?
            && live.game_id == game_id
        {
            return Ok(live.verifications);
        }

        let archived = self
            .storage
            .read_with_retry(|s| s.list_completed_games(cashier_id))?
            .into_iter()
            .find(|g| g.game_id == game_id)
            .ok_or_else(|| GameError::NoLiveGame(cashier_id.to_string()))?;
        Ok(archived.verifications)
    }

    // ========== Recovery ==========

    /// Retire live games that already have an archive.
    ///
    /// `end` commits the archive and the removal together, so this only finds
    /// something after an external restore or a manual repair.
    pub fn recover(&self) -> ManagerResult<usize> {
        let live = self.storage.list_live_games()?;
        let mut stale = Vec::new();
        for game in live {
            if self.storage.get_completed_game(&game.instance_id)?.is_some() {
                stale.push(game);
            }
        }
        if stale.is_empty() {
            return Ok(0);
        }

        let txn = self.storage.begin_write()?;
        for game in &stale {
            tracing::warn!(
                cashier_id = %game.cashier_id,
                game_id = %game.game_id,
                instance_id = %game.instance_id,
                "Retiring live game that was already archived"
            );
            self.storage.remove_live_game(&txn, &game.cashier_id)?;
        }
        txn.commit().map_err(crate::storage::StorageError::from)?;
        Ok(stale.len())
    }
}

/// Shorthand for handlers that act on a session
pub(crate) fn game_outcome(session: GameSession) -> (String, CommandOutcome) {
    (session.game_id.clone(), CommandOutcome::Game(Box::new(session)))
}
