//! Bet ledger commands: place, cancel, redeem

use super::{CommandContext, ManagerError, ManagerResult};
use crate::games::error::GameError;
use crate::games::machine::{self, Transition};
use crate::games::{ledger, money};
use shared::game::{CommandOutcome, GameEventPayload};
use shared::models::{Bet, MAX_NUMBER};

const DEFAULT_BET_TYPE: &str = "standard";

pub(super) fn place(
    ctx: &mut CommandContext,
    cartela_id: u32,
    stake: f64,
    bet_type: Option<String>,
    selected_numbers: Vec<u8>,
) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    machine::apply(session.status, Transition::PlaceBet)?;

    let cartela = ctx
        .storage
        .get_cartela_txn(ctx.txn, ctx.cashier_id, cartela_id)?
        .ok_or(GameError::CartelaNotFound(cartela_id))?;
    if !cartela.is_active {
        return Err(GameError::CartelaInactive(cartela_id).into());
    }

    // 每局每张卡只能有一张票, 取消后也不释放
    if let Some(ticket_number) =
        ctx.storage
            .cartela_ticket_txn(ctx.txn, &session.instance_id, cartela_id)?
    {
        return Err(GameError::DuplicateCartela {
            cartela_id,
            ticket_number,
        }
        .into());
    }

    let config = ctx.storage.get_config_txn(ctx.txn)?;
    money::validate_stake(stake, config.min_stake)?;
    if let Some(&bad) = selected_numbers
        .iter()
        .find(|n| !(1..=MAX_NUMBER).contains(*n))
    {
        return Err(GameError::Validation(format!(
            "selected number {} is outside 1-{}",
            bad, MAX_NUMBER
        ))
        .into());
    }

    let stake = money::to_f64(money::to_decimal(stake));
    let seq = ctx.storage.next_ticket_seq(ctx.txn)?;
    let bet = ledger::open_ticket(
        &session,
        ledger::NewBet {
            cartela_id,
            stake,
            bet_type: bet_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BET_TYPE.to_string()),
            selected_numbers,
        },
        seq,
        ctx.now,
    );

    ctx.storage
        .claim_cartela(ctx.txn, &session.instance_id, cartela_id, &bet.ticket_number)?;
    ctx.storage.put_bet(ctx.txn, &bet)?;

    session.financials = money::adjust_financials(
        &session.financials,
        stake,
        session.shop_margin_percent,
        session.system_fee_percent,
    );
    session.placed_bet_cartelas.push(cartela_id);
    session.updated_at = ctx.now;
    ctx.storage.put_live_game(ctx.txn, &session)?;

    ctx.emit(
        &session,
        GameEventPayload::BetPlaced {
            bet: Box::new(bet.clone()),
            financials: session.financials.clone(),
            placed_bet_cartelas: session.placed_bet_cartelas.clone(),
        },
    )?;

    tracing::info!(
        cashier_id = %bet.cashier_id,
        game_id = %bet.game_id,
        ticket_number = %bet.ticket_number,
        cartela_id,
        stake,
        "Bet placed"
    );
    Ok((bet.game_id.clone(), CommandOutcome::Bet(Box::new(bet))))
}

/// Ticket owned by the command's cashier
fn owned_bet(ctx: &CommandContext, ticket_number: &str) -> ManagerResult<Bet> {
    ctx.storage
        .get_bet_txn(ctx.txn, ticket_number)?
        .filter(|b| b.cashier_id == ctx.cashier_id)
        .ok_or_else(|| GameError::BetNotFound(ticket_number.to_string()).into())
}

pub(super) fn cancel(
    ctx: &mut CommandContext,
    ticket_number: &str,
) -> ManagerResult<(String, CommandOutcome)> {
    let mut bet = owned_bet(ctx, ticket_number)?;
    ledger::cancel(&mut bet, ctx.now)?;

    let mut session = ctx
        .storage
        .get_live_game_txn(ctx.txn, ctx.cashier_id)?
        .filter(|s| s.instance_id == bet.instance_id)
        .ok_or_else(|| GameError::GameCompleted(bet.game_id.clone()))?;
    machine::apply(session.status, Transition::CancelBet)?;
    if session.state_of(bet.cartela_id).is_locked() {
        return Err(GameError::BetLocked(bet.ticket_number.clone()).into());
    }

    ctx.storage.put_bet(ctx.txn, &bet)?;

    session.financials = money::adjust_financials(
        &session.financials,
        -bet.stake,
        session.shop_margin_percent,
        session.system_fee_percent,
    );
    session.placed_bet_cartelas.retain(|&c| c != bet.cartela_id);
    session.winning_cartelas.retain(|&c| c != bet.cartela_id);
    // 作废票不保留验证结果
    session.verifications.remove(&bet.cartela_id);
    session.verified_cartelas.retain(|&c| c != bet.cartela_id);
    session.updated_at = ctx.now;
    ctx.storage.put_live_game(ctx.txn, &session)?;

    ctx.emit(
        &session,
        GameEventPayload::BetCancelled {
            bet: Box::new(bet.clone()),
            financials: session.financials.clone(),
        },
    )?;

    tracing::info!(
        game_id = %bet.game_id,
        ticket_number = %bet.ticket_number,
        cartela_id = bet.cartela_id,
        "Bet cancelled"
    );
    Ok((bet.game_id.clone(), CommandOutcome::Bet(Box::new(bet))))
}

pub(super) fn redeem(
    ctx: &mut CommandContext,
    ticket_number: &str,
) -> ManagerResult<(String, CommandOutcome)> {
    let mut bet = owned_bet(ctx, ticket_number)?;

    // 只有已结算的票才有归档
    let prize = if bet.bet_status.is_settled() {
        let archive = ctx
            .storage
            .get_completed_game_txn(ctx.txn, &bet.instance_id)?
            .ok_or_else(|| {
                ManagerError::Internal(format!(
                    "settled ticket {} has no archived game {}",
                    bet.ticket_number, bet.instance_id
                ))
            })?;
        archive.prize_per_winner
    } else {
        0.0
    };

    let payout = ledger::redeem(&mut bet, prize, ctx.now)?;
    ctx.storage.put_bet(ctx.txn, &bet)?;

    let session_id = ctx.cashier()?.session_id;
    ctx.emit_for_bet(
        &bet,
        &session_id,
        GameEventPayload::BetRedeemed {
            bet: Box::new(bet.clone()),
        },
    )?;

    tracing::info!(
        game_id = %bet.game_id,
        ticket_number = %bet.ticket_number,
        status = %bet.bet_status,
        payout,
        "Bet redeemed"
    );
    Ok((bet.game_id.clone(), CommandOutcome::Bet(Box::new(bet))))
}
