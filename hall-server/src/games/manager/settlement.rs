//! End of game: settle tickets, archive, retire the live session and
//! pre-provision the cashier's next game id, all in the caller's transaction.

use super::{CommandContext, ManagerResult};
use crate::games::machine::{self, Transition};
use crate::games::{allocator, ledger, money, verification};
use shared::game::{CommandOutcome, CompletedGame, GameEventPayload, VerificationState};
use shared::models::BetStatus;

pub(super) fn end(ctx: &mut CommandContext) -> ManagerResult<(String, CommandOutcome)> {
    let mut session = ctx.live_game()?;
    session.status = machine::apply(session.status, Transition::End)?;

    let patterns = ctx.storage.list_win_patterns_txn(ctx.txn, ctx.cashier_id)?;
    let bets = ctx.storage.bets_for_game_txn(ctx.txn, &session.instance_id)?;

    // ========== Settle open tickets ==========
    let mut stakes = Vec::with_capacity(bets.len());
    let mut winner_count: u32 = 0;
    for mut bet in bets {
        if bet.bet_status == BetStatus::Cancelled {
            continue;
        }
        stakes.push(bet.stake);

        if bet.bet_status.is_open() {
            let result = match session.state_of(bet.cartela_id) {
                // 锁定的结果原样保留
                VerificationState::Locked { result, .. } => result,
                _ => {
                    let result = match ctx
                        .storage
                        .get_cartela_txn(ctx.txn, ctx.cashier_id, bet.cartela_id)?
                    {
                        Some(cartela) if cartela.is_active => verification::verify(
                            &cartela,
                            &patterns,
                            &session,
                            Some(bet.ticket_number.clone()),
                            ctx.now,
                        ),
                        other => {
                            tracing::warn!(
                                game_id = %session.game_id,
                                cartela_id = bet.cartela_id,
                                ticket_number = %bet.ticket_number,
                                missing = other.is_none(),
                                "Cartela missing or inactive at settlement, ticket settles as lost"
                            );
                            verification::unverifiable(
                                bet.cartela_id,
                                &session,
                                Some(bet.ticket_number.clone()),
                                ctx.now,
                            )
                        }
                    };
                    session.verifications.insert(
                        bet.cartela_id,
                        VerificationState::Verified {
                            result: result.clone(),
                        },
                    );
                    if !session.verified_cartelas.contains(&bet.cartela_id) {
                        session.verified_cartelas.push(bet.cartela_id);
                    }
                    result
                }
            };

            session.winning_cartelas.retain(|&c| c != bet.cartela_id);
            if result.is_won() {
                session.winning_cartelas.push(bet.cartela_id);
            }
            ledger::settle(&mut bet, &result, ctx.now);
            ctx.storage.put_bet(ctx.txn, &bet)?;
        }

        if matches!(bet.bet_status, BetStatus::Won | BetStatus::WonRedeemed) {
            winner_count += 1;
        }
    }

    // ========== Final aggregates ==========
    session.financials = money::financials_from_stakes(
        stakes.iter().copied(),
        session.shop_margin_percent,
        session.system_fee_percent,
    );
    let prize_per_winner = money::prize_per_winner(session.financials.net_prize_pool, winner_count);
    session.updated_at = ctx.now;

    let archive = CompletedGame {
        instance_id: session.instance_id.clone(),
        game_id: session.game_id.clone(),
        cashier_id: session.cashier_id.clone(),
        session_id: session.session_id.clone(),
        draw_history: session.draw_history.clone(),
        called_numbers: session.called_numbers.clone(),
        financials: session.financials.clone(),
        shop_margin_percent: session.shop_margin_percent,
        system_fee_percent: session.system_fee_percent,
        bet_count: stakes.len() as u32,
        winner_count,
        prize_per_winner,
        winning_cartelas: session.winning_cartelas.clone(),
        verifications: session.verifications.clone(),
        created_at: session.created_at,
        started_at: session.started_at,
        completed_at: ctx.now,
    };

    ctx.storage.put_completed_game(ctx.txn, &archive)?;
    ctx.storage.remove_live_game(ctx.txn, ctx.cashier_id)?;
    let pruned = ctx.storage.cleanup_command_ids(ctx.txn, &session.instance_id)?;
    tracing::debug!(instance_id = %session.instance_id, pruned, "Processed command ids pruned");

    // ========== Next game id ==========
    let mut cashier = ctx.cashier()?;
    match allocator::provision_next(&mut cashier, ctx.today) {
        Ok(next) => {
            cashier.updated_at = ctx.now;
            ctx.storage.put_cashier(ctx.txn, &cashier)?;
            tracing::debug!(cashier_id = %cashier.id, next_game_id = next, "Next game id provisioned");
        }
        Err(e) => {
            // 当日号段用尽: 结束照常提交, 需人工处理
            tracing::error!(
                cashier_id = %cashier.id,
                game_id = %archive.game_id,
                error = %e,
                "Game id range exhausted, cashier cannot start another game today"
            );
        }
    }

    ctx.emit(
        &session,
        GameEventPayload::GameEnded {
            archive: Box::new(archive.clone()),
        },
    )?;

    tracing::info!(
        cashier_id = %archive.cashier_id,
        game_id = %archive.game_id,
        instance_id = %archive.instance_id,
        bet_count = archive.bet_count,
        winner_count,
        total_stake = archive.financials.total_stake,
        prize_per_winner,
        "Game ended and archived"
    );
    Ok((
        archive.game_id.clone(),
        CommandOutcome::Completed(Box::new(archive)),
    ))
}
