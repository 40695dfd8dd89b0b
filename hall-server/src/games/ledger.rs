//! Bet ledger rules
//!
//! Pure status transitions for tickets. Persistence, ticket sequencing and
//! the per-game cartela index live in the manager.

use super::error::{GameError, GameResult};
use shared::game::{GameSession, GameStatus, VerificationResult};
use shared::models::{Bet, BetStatus, VerificationLock, format_ticket};

/// Inputs for a new ticket
#[derive(Debug, Clone)]
pub struct NewBet {
    pub cartela_id: u32,
    pub stake: f64,
    pub bet_type: String,
    pub selected_numbers: Vec<u8>,
}

/// Status of a freshly placed bet
pub fn initial_status(game: GameStatus) -> BetStatus {
    match game {
        GameStatus::Waiting => BetStatus::Pending,
        _ => BetStatus::Active,
    }
}

/// Build the ticket for `session`
pub fn open_ticket(session: &GameSession, input: NewBet, ticket_seq: u64, now: i64) -> Bet {
    Bet {
        ticket_number: format_ticket(ticket_seq),
        bet_id: shared::util::new_id(),
        game_id: session.game_id.clone(),
        instance_id: session.instance_id.clone(),
        cashier_id: session.cashier_id.clone(),
        session_id: session.session_id.clone(),
        cartela_id: input.cartela_id,
        stake: input.stake,
        bet_type: input.bet_type,
        bet_status: initial_status(session.status),
        game_progress: session.progress(),
        selected_numbers: input.selected_numbers,
        win_pattern: None,
        win: 0.0,
        lock: None,
        created_at: now,
        updated_at: now,
        cancelled_at: None,
        redeemed_at: None,
    }
}

/// Cancel a ticket whose game is still live
pub fn cancel(bet: &mut Bet, now: i64) -> GameResult<()> {
    match bet.bet_status {
        BetStatus::Cancelled => return Err(GameError::AlreadyCancelled(bet.ticket_number.clone())),
        BetStatus::Pending | BetStatus::Active => {}
        // settled or redeemed: the game is over
        _ => return Err(GameError::GameCompleted(bet.game_id.clone())),
    }
    if bet.is_locked() {
        return Err(GameError::BetLocked(bet.ticket_number.clone()));
    }

    bet.bet_status = BetStatus::Cancelled;
    bet.cancelled_at = Some(now);
    bet.updated_at = now;
    Ok(())
}

/// Redeem a settled ticket. Won pays `prize`, lost closes out at 0.
///
/// A second call is an error, not a no-op.
pub fn redeem(bet: &mut Bet, prize: f64, now: i64) -> GameResult<f64> {
    let (next, payout) = match bet.bet_status {
        BetStatus::Won => (BetStatus::WonRedeemed, prize),
        BetStatus::Lost => (BetStatus::LostRedeemed, 0.0),
        BetStatus::WonRedeemed | BetStatus::LostRedeemed => {
            return Err(GameError::AlreadyRedeemed(bet.ticket_number.clone()));
        }
        BetStatus::Pending | BetStatus::Active => {
            return Err(GameError::GameNotCompleted(bet.ticket_number.clone()));
        }
        BetStatus::Cancelled => {
            return Err(GameError::InvalidBetStatus {
                ticket_number: bet.ticket_number.clone(),
                status: bet.bet_status,
                action: "redeemed",
            });
        }
    };

    bet.bet_status = next;
    bet.win = payout;
    bet.redeemed_at = Some(now);
    bet.updated_at = now;
    Ok(payout)
}

/// Promote pending tickets once the game is running
pub fn activate(bet: &mut Bet, now: i64) -> bool {
    if bet.bet_status == BetStatus::Pending {
        bet.bet_status = BetStatus::Active;
        bet.updated_at = now;
        return true;
    }
    false
}

/// Terminal status from the final verification at end of game
pub fn settle(bet: &mut Bet, result: &VerificationResult, now: i64) {
    if !bet.bet_status.is_open() {
        return;
    }
    if result.is_won() {
        bet.bet_status = BetStatus::Won;
        bet.win_pattern = result.pattern_names.first().cloned();
    } else {
        bet.bet_status = BetStatus::Lost;
        bet.win_pattern = None;
    }
    bet.updated_at = now;
}

/// Mirror the session's settlement lock on the ticket
pub fn lock(bet: &mut Bet, locked_by: &str, now: i64) {
    bet.lock = Some(VerificationLock {
        locked_by: locked_by.to_string(),
        locked_at: now,
    });
    bet.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::game::VerificationStatus;

    fn bet(status: BetStatus) -> Bet {
        Bet {
            ticket_number: format_ticket(1),
            bet_id: "b1".into(),
            game_id: "4000".into(),
            instance_id: "i1".into(),
            cashier_id: "c1".into(),
            session_id: "s1".into(),
            cartela_id: 3,
            stake: 10.0,
            bet_type: "standard".into(),
            bet_status: status,
            game_progress: 0,
            selected_numbers: vec![],
            win_pattern: None,
            win: 0.0,
            lock: None,
            created_at: 0,
            updated_at: 0,
            cancelled_at: None,
            redeemed_at: None,
        }
    }

    fn result(status: VerificationStatus) -> VerificationResult {
        VerificationResult {
            cartela_id: 3,
            ticket_number: None,
            status,
            patterns: vec!["p1".into()],
            pattern_names: vec!["Line".into()],
            all_matched_patterns: vec![],
            matched_numbers: vec![],
            drawn_numbers: vec![],
            draws_at_verification: 0,
            verified_at: 0,
        }
    }

    #[test]
    fn test_initial_status_follows_game() {
        assert_eq!(initial_status(GameStatus::Waiting), BetStatus::Pending);
        assert_eq!(initial_status(GameStatus::Active), BetStatus::Active);
        assert_eq!(initial_status(GameStatus::Paused), BetStatus::Active);
    }

    #[test]
    fn test_cancel_rules() {
        let mut b = bet(BetStatus::Active);
        cancel(&mut b, 5).unwrap();
        assert_eq!(b.bet_status, BetStatus::Cancelled);
        assert_eq!(b.cancelled_at, Some(5));
        assert!(matches!(cancel(&mut b, 6), Err(GameError::AlreadyCancelled(_))));

        let mut b = bet(BetStatus::Won);
        assert!(matches!(cancel(&mut b, 5), Err(GameError::GameCompleted(_))));

        let mut b = bet(BetStatus::Pending);
        lock(&mut b, "c1", 1);
        assert!(matches!(cancel(&mut b, 5), Err(GameError::BetLocked(_))));
    }

    #[test]
    fn test_redeem_twice_fails() {
        let mut b = bet(BetStatus::Won);
        assert_eq!(redeem(&mut b, 23.4, 9).unwrap(), 23.4);
        assert_eq!(b.bet_status, BetStatus::WonRedeemed);
        assert_eq!(b.win, 23.4);

        let err = redeem(&mut b, 23.4, 10).unwrap_err();
        assert!(matches!(err, GameError::AlreadyRedeemed(_)));
        assert_eq!(b.redeemed_at, Some(9));
    }

    #[test]
    fn test_redeem_lost_pays_nothing() {
        let mut b = bet(BetStatus::Lost);
        assert_eq!(redeem(&mut b, 50.0, 9).unwrap(), 0.0);
        assert_eq!(b.bet_status, BetStatus::LostRedeemed);
        assert_eq!(b.win, 0.0);
    }

    #[test]
    fn test_redeem_requires_completed_game() {
        let mut b = bet(BetStatus::Active);
        assert!(matches!(redeem(&mut b, 1.0, 1), Err(GameError::GameNotCompleted(_))));
        let mut b = bet(BetStatus::Cancelled);
        assert!(matches!(
            redeem(&mut b, 1.0, 1),
            Err(GameError::InvalidBetStatus { .. })
        ));
    }

    #[test]
    fn test_settle_only_open_bets() {
        let mut b = bet(BetStatus::Pending);
        settle(&mut b, &result(VerificationStatus::Won), 1);
        assert_eq!(b.bet_status, BetStatus::Won);
        assert_eq!(b.win_pattern.as_deref(), Some("Line"));

        let mut b = bet(BetStatus::Cancelled);
        settle(&mut b, &result(VerificationStatus::Won), 1);
        assert_eq!(b.bet_status, BetStatus::Cancelled);
    }
}
