//! Lifecycle commands: start, activate, draw, pause, resume, reset, select

use super::{CommandContext, ManagerResult, game_outcome};
use crate::games::error::GameError;
use crate::games::machine::{self, Transition};
use crate::games::{allocator, ledger};
use rand::seq::SliceRandom;
use shared::game::{
    CommandOutcome, DrawRecord, DrawSource, GameEventPayload, GameFinancials, GameSession,
    GameStatus,
};
use shared::models::{MAX_NUMBER, format_game_id};
use std::collections::{BTreeMap, BTreeSet};

pub(super) fn start(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    if let Some(live) = ctx.storage.get_live_game_txn(ctx.txn, ctx.cashier_id)? {
        return Err(GameError::GameInProgress(live.game_id).into());
    }

    let mut cashier = ctx.cashier()?;
    let config = ctx.storage.get_config_txn(ctx.txn)?;
    // 其他收银台进行中的编号不可重复
    let taken = ctx.storage.live_game_ids_txn(ctx.txn, ctx.cashier_id)?;
    let id = allocator::allocate(&mut cashier, ctx.today, &taken)?;
    cashier.updated_at = ctx.now;

    let session = GameSession {
        instance_id: shared::util::new_id(),
        game_id: format_game_id(id),
        cashier_id: cashier.id.clone(),
        session_id: cashier.session_id.clone(),
        display_token: cashier.display_token.clone(),
        status: GameStatus::Waiting,
        draw_history: Vec::new(),
        called_numbers: BTreeSet::new(),
        financials: GameFinancials::default(),
        shop_margin_percent: cashier
            .shop_margin_percent
            .unwrap_or(config.shop_margin_percent),
        system_fee_percent: cashier
            .system_fee_percent
            .unwrap_or(config.system_fee_percent),
        selected_cartelas: Vec::new(),
        placed_bet_cartelas: Vec::new(),
        winning_cartelas: Vec::new(),
        verified_cartelas: Vec::new(),
        verifications: BTreeMap::new(),
        created_at: ctx.now,
        started_at: None,
        paused_at: None,
        updated_at: ctx.now,
    };

    ctx.storage.put_cashier(ctx.txn, &cashier)?;
    ctx.storage.put_live_game(ctx.txn, &session)?;
    ctx.emit(
        &session,
        GameEventPayload::GameStarted {
            session: Box::new(session.clone()),
        },
    )?;

    tracing::info!(
        cashier_id = %session.cashier_id,
        game_id = %session.game_id,
        instance_id = %session.instance_id,
        "Game started"
    );
    Ok(game_outcome(session))
}

/// Apply a pure status change and broadcast it
fn change_status(
    ctx: &mut CommandContext,
    session: &mut GameSession,
    transition: Transition,
) -> ManagerResult<()> {
    let previous = session.status;
    session.status = machine::apply(previous, transition)?;
    session.updated_at = ctx.now;
    ctx.storage.put_live_game(ctx.txn, session)?;
    ctx.emit(
        session,
        GameEventPayload::GameStatusChanged {
            status: session.status,
            previous,
        },
    )
}

pub(super) fn activate(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Activate)?;
    session.started_at = Some(ctx.now);

    // 等待期下注的票在开局时转为 active
    let mut promoted = 0;
    for mut bet in ctx.storage.bets_for_game_txn(ctx.txn, &session.instance_id)? {
        if ledger::activate(&mut bet, ctx.now) {
            ctx.storage.put_bet(ctx.txn, &bet)?;
            promoted += 1;
        }
    }

    change_status(ctx, &mut session, Transition::Activate)?;
    tracing::info!(game_id = %session.game_id, promoted, "Game activated");
    Ok(game_outcome(session))
}

pub(super) fn draw(ctx: &mut CommandContext, number: u8) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Draw)?;

    if !(1..=MAX_NUMBER).contains(&number) {
        return Err(GameError::InvalidDrawNumber(number).into());
    }
    if session.called_numbers.len() >= MAX_NUMBER as usize {
        return Err(GameError::AllNumbersDrawn.into());
    }
    if session.is_called(number) {
        return Err(GameError::DuplicateDraw(number).into());
    }

    record_draw(ctx, &mut session, number, DrawSource::Manual)?;
    Ok(game_outcome(session))
}

pub(super) fn draw_auto(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::Draw)?;

    let remaining: Vec<u8> = (1..=MAX_NUMBER)
        .filter(|n| !session.is_called(*n))
        .collect();
    let number = *remaining
        .choose(&mut rand::thread_rng())
        .ok_or(GameError::AllNumbersDrawn)?;

    record_draw(ctx, &mut session, number, DrawSource::Auto)?;
    Ok(game_outcome(session))
}

fn record_draw(
    ctx: &mut CommandContext,
    session: &mut GameSession,
    number: u8,
    source: DrawSource,
) -> ManagerResult<()> {
    let draw = DrawRecord {
        number,
        timestamp: ctx.now,
        source,
    };
    session.draw_history.push(draw.clone());
    session.called_numbers.insert(number);
    session.updated_at = ctx.now;

    ctx.storage.put_live_game(ctx.txn, session)?;
    ctx.emit(
        session,
        GameEventPayload::NumberDrawn {
            draw,
            called_numbers: session.draw_history.iter().map(|d| d.number).collect(),
            progress: session.progress(),
        },
    )?;

    tracing::debug!(game_id = %session.game_id, number, progress = session.progress(), "Number drawn");
    Ok(())
}

pub(super) fn pause(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    session.paused_at = Some(ctx.now);
    change_status(ctx, &mut session, Transition::Pause)?;
    Ok(game_outcome(session))
}

pub(super) fn resume(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    session.paused_at = None;
    change_status(ctx, &mut session, Transition::Resume)?;
    Ok(game_outcome(session))
}

/// Discard a waiting/active game that never took a bet. Nothing is archived.
pub(super) fn reset(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let session = ctx.live_game()?;
    machine::apply(session.status, Transition::Reset)?;

    // 取消的票也算: 一旦下注就不能重置
    let bets = ctx.storage.bets_for_game_txn(ctx.txn, &session.instance_id)?;
    if !bets.is_empty() {
        return Err(GameError::GameHasBets(bets.len()).into());
    }

    let mut cashier = ctx.cashier()?;
    allocator::release(&mut cashier);
    cashier.updated_at = ctx.now;
    ctx.storage.put_cashier(ctx.txn, &cashier)?;
    ctx.storage.remove_live_game(ctx.txn, ctx.cashier_id)?;
    ctx.storage.cleanup_command_ids(ctx.txn, &session.instance_id)?;
    ctx.emit(&session, GameEventPayload::GameReset)?;

    tracing::warn!(
        cashier_id = %session.cashier_id,
        game_id = %session.game_id,
        instance_id = %session.instance_id,
        "Game reset without archive"
    );
    Ok((
        session.game_id.clone(),
        CommandOutcome::Reset {
            game_id: session.game_id,
        },
    ))
}

pub(super) fn select_cartelas(
    ctx: &mut CommandContext,
    cartela_ids: &[u32],
) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::SelectCartelas)?;

    let mut selected = Vec::with_capacity(cartela_ids.len());
    for &id in cartela_ids {
        if selected.contains(&id) {
            continue;
        }
        let cartela = ctx
            .storage
            .get_cartela_txn(ctx.txn, ctx.cashier_id, id)?
            .ok_or(GameError::CartelaNotFound(id))?;
        if !cartela.is_active {
            return Err(GameError::CartelaInactive(id).into());
        }
        selected.push(id);
    }

    session.selected_cartelas = selected.clone();
    session.updated_at = ctx.now;
    ctx.storage.put_live_game(ctx.txn, &session)?;
    ctx.emit(
        &session,
        GameEventPayload::CartelasSelected {
            cartela_ids: selected,
        },
    )?;
    Ok(game_outcome(session))
}
