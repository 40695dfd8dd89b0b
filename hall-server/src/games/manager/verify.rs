//! Verification commands: verify, lock, batch verify

use super::{CommandContext, ManagerError, ManagerResult};
use crate::games::error::GameError;
use crate::games::machine::{self, Transition};
use crate::games::{ledger, verification};
use shared::game::{
    BatchVerifyEntry, CommandError, CommandOutcome, GameEventPayload, GameSession,
    VerificationResult, VerificationState,
};
use shared::models::{BetStatus, WinPattern};

/// Verify one cartela against `session`, recording the result on it.
///
/// The caller persists the session.
fn verify_one(
    ctx: &mut CommandContext,
    session: &mut GameSession,
    patterns: &[WinPattern],
    cartela_id: u32,
) -> ManagerResult<VerificationResult> {
    if session.state_of(cartela_id).is_locked() {
        return Err(GameError::AlreadyLocked(cartela_id).into());
    }

    let ticket_number = ctx
        .storage
        .cartela_ticket_txn(ctx.txn, &session.instance_id, cartela_id)?
        .ok_or(GameError::NoBetForCartela(cartela_id))?;
    let bet = ctx
        .storage
        .get_bet_txn(ctx.txn, &ticket_number)?
        .filter(|b| b.bet_status != BetStatus::Cancelled)
        .ok_or(GameError::NoBetForCartela(cartela_id))?;

    let cartela = ctx
        .storage
        .get_cartela_txn(ctx.txn, ctx.cashier_id, cartela_id)?
        .ok_or(GameError::CartelaNotFound(cartela_id))?;
    if !cartela.is_active {
        return Err(GameError::CartelaInactive(cartela_id).into());
    }

    let result = verification::verify(
        &cartela,
        patterns,
        session,
        Some(bet.ticket_number),
        ctx.now,
    );

    session.verifications.insert(
        cartela_id,
        VerificationState::Verified {
            result: result.clone(),
        },
    );
    if !session.verified_cartelas.contains(&cartela_id) {
        session.verified_cartelas.push(cartela_id);
    }
    session.winning_cartelas.retain(|&c| c != cartela_id);
    if result.is_won() {
        session.winning_cartelas.push(cartela_id);
    }
    session.updated_at = ctx.now;

    ctx.emit(
        session,
        GameEventPayload::VerificationResult {
            result: Box::new(result.clone()),
        },
    )?;

    tracing::info!(
        game_id = %session.game_id,
        cartela_id,
        status = ?result.status,
        patterns = ?result.pattern_names,
        "Cartela verified"
    );
    Ok(result)
}

pub(super) fn verify(
    ctx: &mut CommandContext,
    cartela_id: u32,
) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Verify)?;
    let patterns = ctx.storage.list_win_patterns_txn(ctx.txn, ctx.cashier_id)?;

    let result = verify_one(ctx, &mut session, &patterns, cartela_id)?;
    ctx.storage.put_live_game(ctx.txn, &session)?;
    Ok((
        session.game_id,
        CommandOutcome::Verification(Box::new(result)),
    ))
}

/// One-way: Verified becomes Locked and never goes back
pub(super) fn lock(
    ctx: &mut CommandContext,
    cartela_id: u32,
) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Verify)?;

    let mut bet = ctx
        .storage
        .cartela_ticket_txn(ctx.txn, &session.instance_id, cartela_id)?
        .map(|ticket_number| ctx.storage.get_bet_txn(ctx.txn, &ticket_number))
        .transpose()?
        .flatten()
        .filter(|b| b.bet_status != BetStatus::Cancelled)
        .ok_or(GameError::NoBetForCartela(cartela_id))?;

    let result = match session.state_of(cartela_id) {
        VerificationState::Unverified => return Err(GameError::NotVerified(cartela_id).into()),
        VerificationState::Locked { .. } => return Err(GameError::AlreadyLocked(cartela_id).into()),
        VerificationState::Verified { result } => result,
    };

    let locked_by = ctx.operator.to_string();
    session.verifications.insert(
        cartela_id,
        VerificationState::Locked {
            result: result.clone(),
            locked_by: locked_by.clone(),
            locked_at: ctx.now,
        },
    );
    session.updated_at = ctx.now;

    ledger::lock(&mut bet, &locked_by, ctx.now);
    ctx.storage.put_bet(ctx.txn, &bet)?;

    ctx.storage.put_live_game(ctx.txn, &session)?;
    ctx.emit(
        &session,
        GameEventPayload::VerificationLocked {
            cartela_id,
            locked_by: locked_by.clone(),
            locked_at: ctx.now,
        },
    )?;

    tracing::info!(game_id = %session.game_id, cartela_id, locked_by = %locked_by, "Verification locked");
    Ok((
        session.game_id,
        CommandOutcome::Verification(Box::new(result)),
    ))
}

/// Every requested cartela gets an entry: a result or the rule it broke.
///
/// Storage failures abort the whole batch.
pub(super) fn batch_verify(
    ctx: &mut CommandContext,
    cartela_ids: &[u32],
) -> ManagerResult<(String, CommandOutcome)> {
    if cartela_ids.is_empty() {
        return Err(GameError::Validation("cartela_ids must not be empty".to_string()).into());
    }

    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Verify)?;
    let patterns = ctx.storage.list_win_patterns_txn(ctx.txn, ctx.cashier_id)?;

    let mut entries: Vec<BatchVerifyEntry> = Vec::with_capacity(cartela_ids.len());
    for &cartela_id in cartela_ids {
        if entries.iter().any(|e| e.cartela_id == cartela_id) {
            continue;
        }
        let entry = match verify_one(ctx, &mut session, &patterns, cartela_id) {
            Ok(result) => BatchVerifyEntry {
                cartela_id,
                result: Some(result),
                error: None,
            },
            Err(ManagerError::Game(e)) => BatchVerifyEntry {
                cartela_id,
                result: None,
                error: Some(CommandError::new(e.code(), e.to_string())),
            },
            Err(other) => return Err(other),
        };
        entries.push(entry);
    }

    ctx.storage.put_live_game(ctx.txn, &session)?;
    Ok((session.game_id, CommandOutcome::BatchVerification(entries)))
}
