use super::*;
use shared::models::BetStatus;

#[test]
fn test_place_bet_while_waiting_is_pending() {
    let hall = create_test_manager();
    start(&hall);

    let ticket = place(&hall, 1, 10.0);
    assert_eq!(ticket.bet_status, BetStatus::Pending);
    assert_eq!(ticket.ticket_number, "0000000000001");
    assert_eq!(ticket.game_id, "4000");
    assert_eq!(ticket.bet_type, "standard");
    assert_eq!(ticket.game_progress, 0);

    ok(&hall, GameCommandPayload::ActivateGame);
    assert_eq!(bet(&hall, &ticket.ticket_number).bet_status, BetStatus::Active);
}

#[test]
fn test_place_bet_while_active_records_progress() {
    let hall = create_test_manager();
    start_active(&hall);
    draw_all(&hall, &[40, 41]);

    let ticket = place(&hall, 2, 15.0);
    assert_eq!(ticket.bet_status, BetStatus::Active);
    assert_eq!(ticket.game_progress, 2);

    let game = hall.manager.current_game(CASHIER).unwrap().unwrap();
    assert_eq!(game.placed_bet_cartelas, vec![2]);
    assert_eq!(game.financials.total_stake, 15.0);
    assert_eq!(game.financials.total_shop_margin, 3.0);
    assert_eq!(game.financials.total_system_fee, 0.3);
    assert_eq!(game.financials.net_prize_pool, 11.7);
}

#[test]
fn test_ticket_numbers_are_sequential() {
    let hall = create_test_manager();
    start(&hall);

    let tickets: Vec<String> = (1..=3).map(|c| place(&hall, c, 10.0).ticket_number).collect();
    assert_eq!(
        tickets,
        vec!["0000000000001", "0000000000002", "0000000000003"]
    );
    assert!(tickets.iter().all(|t| t.len() == 13));

    // 序号跨局递增, 不重置
    end(&hall);
    start(&hall);
    assert_eq!(place(&hall, 1, 10.0).ticket_number, "0000000000004");
}

#[test]
fn test_duplicate_cartela_and_slot_stays_retired() {
    let hall = create_test_manager();
    start(&hall);

    let first = place(&hall, 1, 10.0);
    let dup = GameCommandPayload::PlaceBet {
        cartela_id: 1,
        stake: 20.0,
        bet_type: None,
        selected_numbers: vec![],
    };
    assert_eq!(fail(&hall, dup.clone()), ErrorCode::DuplicateCartela);

    ok(
        &hall,
        GameCommandPayload::CancelBet {
            ticket_number: first.ticket_number,
        },
    );
    assert_eq!(fail(&hall, dup), ErrorCode::DuplicateCartela);
}

#[test]
fn test_same_cartela_in_next_game() {
    let hall = create_test_manager();
    start(&hall);
    place(&hall, 1, 10.0);
    end(&hall);

    start(&hall);
    assert_eq!(place(&hall, 1, 10.0).bet_status, BetStatus::Pending);
}

#[test]
fn test_stake_rules() {
    let hall = create_test_manager();
    start(&hall);

    let low = GameCommandPayload::PlaceBet {
        cartela_id: 1,
        stake: 9.99,
        bet_type: None,
        selected_numbers: vec![],
    };
    assert_eq!(fail(&hall, low), ErrorCode::StakeTooLow);

    let negative = GameCommandPayload::PlaceBet {
        cartela_id: 1,
        stake: -10.0,
        bet_type: None,
        selected_numbers: vec![],
    };
    assert_eq!(fail(&hall, negative), ErrorCode::ValidationFailed);

    // a rejected stake does not burn the cartela slot
    assert_eq!(place(&hall, 1, 10.0).cartela_id, 1);
}

#[test]
fn test_min_stake_follows_config() {
    let hall = create_test_manager();
    hall.manager
        .update_config(shared::models::GlobalConfigUpdate {
            min_stake: Some(25.0),
            ..Default::default()
        })
        .unwrap();
    start(&hall);

    let resp = exec(
        &hall,
        GameCommandPayload::PlaceBet {
            cartela_id: 1,
            stake: 20.0,
            bet_type: None,
            selected_numbers: vec![],
        },
    );
    assert_eq!(resp.error.unwrap().code, ErrorCode::StakeTooLow);
}

#[test]
fn test_unknown_and_inactive_cartelas() {
    let hall = create_test_manager();
    start(&hall);

    let unknown = GameCommandPayload::PlaceBet {
        cartela_id: 77,
        stake: 10.0,
        bet_type: None,
        selected_numbers: vec![],
    };
    assert_eq!(fail(&hall, unknown), ErrorCode::CartelaNotFound);

    let inactive = GameCommandPayload::PlaceBet {
        cartela_id: 10,
        stake: 10.0,
        bet_type: None,
        selected_numbers: vec![],
    };
    assert_eq!(fail(&hall, inactive), ErrorCode::CartelaInactive);
}

#[test]
fn test_selected_numbers_validated() {
    let hall = create_test_manager();
    start(&hall);

    let bad = GameCommandPayload::PlaceBet {
        cartela_id: 1,
        stake: 10.0,
        bet_type: Some("lucky".to_string()),
        selected_numbers: vec![4, 80],
    };
    assert_eq!(fail(&hall, bad), ErrorCode::ValidationFailed);

    let good = as_bet(ok(
        &hall,
        GameCommandPayload::PlaceBet {
            cartela_id: 1,
            stake: 10.0,
            bet_type: Some("lucky".to_string()),
            selected_numbers: vec![4, 75],
        },
    ));
    assert_eq!(good.bet_type, "lucky");
    assert_eq!(good.selected_numbers, vec![4, 75]);
}

#[test]
fn test_cancel_restores_financials() {
    let hall = create_test_manager();
    start(&hall);
    place(&hall, 1, 10.0);
    let second = place(&hall, 2, 30.0);

    let cancelled = as_bet(ok(
        &hall,
        GameCommandPayload::CancelBet {
            ticket_number: second.ticket_number.clone(),
        },
    ));
    assert_eq!(cancelled.bet_status, BetStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    let game = hall.manager.current_game(CASHIER).unwrap().unwrap();
    assert_eq!(game.financials.total_stake, 10.0);
    assert_eq!(game.placed_bet_cartelas, vec![1]);
    assert_eq!(hall.manager.placed_cartelas(CASHIER).unwrap(), vec![1]);

    assert_eq!(
        fail(
            &hall,
            GameCommandPayload::CancelBet {
                ticket_number: second.ticket_number
            }
        ),
        ErrorCode::BetAlreadyCancelled
    );
}

#[test]
fn test_cancel_after_lock_is_refused() {
    let hall = create_test_manager();
    start_active(&hall);
    let ticket = place(&hall, 1, 10.0);
    ok(&hall, GameCommandPayload::VerifyCartela { cartela_id: 1 });
    ok(&hall, GameCommandPayload::LockVerification { cartela_id: 1 });

    assert_eq!(
        fail(
            &hall,
            GameCommandPayload::CancelBet {
                ticket_number: ticket.ticket_number.clone()
            }
        ),
        ErrorCode::BetLocked
    );
    let stored = bet(&hall, &ticket.ticket_number);
    assert!(stored.is_locked());
    assert_eq!(stored.bet_status, BetStatus::Active);
}

#[test]
fn test_cancel_after_end_is_refused() {
    let hall = create_test_manager();
    start_active(&hall);
    let ticket = place(&hall, 9, 10.0);
    end(&hall);

    assert_eq!(
        fail(
            &hall,
            GameCommandPayload::CancelBet {
                ticket_number: ticket.ticket_number
            }
        ),
        ErrorCode::GameAlreadyCompleted
    );
}

#[test]
fn test_redeem_requires_completed_game() {
    let hall = create_test_manager();
    start(&hall);
    let ticket = place(&hall, 1, 10.0);

    assert_eq!(
        fail(
            &hall,
            GameCommandPayload::RedeemBet {
                ticket_number: ticket.ticket_number
            }
        ),
        ErrorCode::GameNotCompleted
    );
}

#[test]
fn test_redeem_twice_fails() {
    let hall = create_test_manager();
    start_active(&hall);
    let winner = place(&hall, 1, 50.0);
    draw_all(&hall, &DIAGONAL_DRAW);
    let archive = end(&hall);
    assert_eq!(archive.winner_count, 1);
    assert_eq!(archive.prize_per_winner, 39.0);

    let redeem = GameCommandPayload::RedeemBet {
        ticket_number: winner.ticket_number.clone(),
    };
    let paid = as_bet(ok(&hall, redeem.clone()));
    assert_eq!(paid.bet_status, BetStatus::WonRedeemed);
    assert_eq!(paid.win, 39.0);
    assert!(paid.redeemed_at.is_some());

    assert_eq!(fail(&hall, redeem), ErrorCode::BetAlreadyRedeemed);
    let stored = bet(&hall, &winner.ticket_number);
    assert_eq!(stored.bet_status, BetStatus::WonRedeemed);
    assert_eq!(stored.win, 39.0);
}

#[test]
fn test_redeem_lost_ticket_closes_out() {
    let hall = create_test_manager();
    start_active(&hall);
    let loser = place(&hall, 9, 10.0);
    draw_all(&hall, &DIAGONAL_DRAW);
    end(&hall);

    let closed = as_bet(ok(
        &hall,
        GameCommandPayload::RedeemBet {
            ticket_number: loser.ticket_number,
        },
    ));
    assert_eq!(closed.bet_status, BetStatus::LostRedeemed);
    assert_eq!(closed.win, 0.0);
}

#[test]
fn test_redeem_cancelled_ticket() {
    let hall = create_test_manager();
    start(&hall);
    let ticket = place(&hall, 1, 10.0);
    ok(
        &hall,
        GameCommandPayload::CancelBet {
            ticket_number: ticket.ticket_number.clone(),
        },
    );
    end(&hall);

    assert_eq!(
        fail(
            &hall,
            GameCommandPayload::RedeemBet {
                ticket_number: ticket.ticket_number
            }
        ),
        ErrorCode::InvalidBetStatus
    );
}

#[test]
fn test_tickets_are_private_to_their_cashier() {
    let hall = create_test_manager();
    register(&hall.manager, "cashier-2");
    start(&hall);
    let ticket = place(&hall, 1, 10.0);

    assert!(hall.manager.search("cashier-2", &ticket.ticket_number).is_err());
    let resp = exec_as(
        &hall,
        "cashier-2",
        GameCommandPayload::CancelBet {
            ticket_number: ticket.ticket_number.clone(),
        },
    );
    assert_eq!(resp.error.unwrap().code, ErrorCode::BetNotFound);
    assert_eq!(bet(&hall, &ticket.ticket_number).bet_status, BetStatus::Pending);
}

#[test]
fn test_recall_across_games() {
    let hall = create_test_manager();
    start(&hall);
    let first_game = place(&hall, 1, 10.0);
    end(&hall);
    start(&hall);
    let second_game = place(&hall, 2, 10.0);

    let all = hall.manager.recall(CASHIER, &BetFilter::default()).unwrap();
    let numbers: Vec<&str> = all.iter().map(|b| b.ticket_number.as_str()).collect();
    assert_eq!(
        numbers,
        vec![
            second_game.ticket_number.as_str(),
            first_game.ticket_number.as_str()
        ]
    );

    let old = hall
        .manager
        .recall(
            CASHIER,
            &BetFilter {
                game_id: Some("4000".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(old.len(), 1);
    assert_eq!(old[0].ticket_number, first_game.ticket_number);
}

#[test]
fn test_concurrent_bets_get_unique_sequential_tickets() {
    let hall = Arc::new(create_test_manager());
    start_active(&hall);

    let handles: Vec<_> = (1..=5u32)
        .map(|cartela_id| {
            let hall = Arc::clone(&hall);
            std::thread::spawn(move || place(&hall, cartela_id, 10.0))
        })
        .collect();
    let mut tickets: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().ticket_number)
        .collect();
    tickets.sort();

    let expected: Vec<String> = (1..=5u64).map(|n| format!("{:013}", n)).collect();
    assert_eq!(tickets, expected);

    let game = hall.manager.current_game(CASHIER).unwrap().unwrap();
    assert_eq!(game.financials.total_stake, 50.0);
    assert_eq!(game.placed_bet_cartelas.len(), 5);
}
