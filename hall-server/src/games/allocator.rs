//! Game id allocation
//!
//! Ids run 4000..=4999 per cashier per business day. A new day resets to
//! 4000; within a day ids only increase and never wrap, so running past 4999
//! fails with `RangeExhausted` instead of reusing an id issued earlier that day.
//!
//! Live game ids are unique across cashiers: `allocate` skips forward past
//! ids currently held by another cashier's live game.
//!
//! The caller mutates the cashier inside the same write transaction that
//! creates (or archives) the game, so the read-increment-write is atomic.

use super::error::{GameError, GameResult};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use shared::models::{Cashier, GAME_ID_MAX, GAME_ID_MIN};

/// Id that follows the cashier's current one on `today`
fn successor(cashier: &Cashier, today: NaiveDate) -> GameResult<u16> {
    match cashier.last_game_date {
        Some(date) if date == today => {
            let next = cashier.current_game_id.saturating_add(1);
            if next > GAME_ID_MAX {
                return Err(GameError::RangeExhausted {
                    cashier_id: cashier.id.clone(),
                    date: today,
                });
            }
            Ok(next)
        }
        _ => Ok(GAME_ID_MIN),
    }
}

/// Allocate the id for a game starting now.
///
/// Uses the id pre-provisioned by the previous `end` when it belongs to today.
///
/// `taken` holds the ids of other cashiers' live games; the cashier is left
/// untouched when no free id remains today.
pub fn allocate(
    cashier: &mut Cashier,
    today: NaiveDate,
    taken: &BTreeSet<u16>,
) -> GameResult<u16> {
    let mut next = cashier.clone();
    let mut id = if next.next_game_provisioned && next.last_game_date == Some(today) {
        next.current_game_id
    } else {
        successor(&next, today)?
    };
    next.last_game_date = Some(today);
    next.next_game_provisioned = false;

    while taken.contains(&id) {
        next.current_game_id = id;
        id = successor(&next, today)?;
    }

    next.current_game_id = id;
    *cashier = next;
    Ok(id)
}

/// Pre-provision the next id after a game ends
pub fn provision_next(cashier: &mut Cashier, today: NaiveDate) -> GameResult<u16> {
    let id = successor(cashier, today)?;
    cashier.current_game_id = id;
    cashier.last_game_date = Some(today);
    cashier.next_game_provisioned = true;
    Ok(id)
}

/// Give back an allocated but unused id (game reset)
pub fn release(cashier: &mut Cashier) {
    cashier.next_game_provisioned = true;
}

/// Id the next `start` would receive, without mutating anything
pub fn peek(cashier: &Cashier, today: NaiveDate, taken: &BTreeSet<u16>) -> GameResult<u16> {
    let mut preview = cashier.clone();
    allocate(&mut preview, today, taken)
}
