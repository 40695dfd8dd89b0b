use super::*;
use shared::models::BetStatus;

#[test]
fn test_end_settles_pending_bets() {
    let hall = create_test_manager();
    start(&hall);
    let a = place(&hall, 1, 10.0);
    let b = place(&hall, 2, 20.0);
    let c = place(&hall, 9, 30.5);
    for t in [&a, &b, &c] {
        assert_eq!(t.bet_status, BetStatus::Pending);
    }

    // 等待状态直接结束: 没有号码被叫出, 全部判负
    let archive = end(&hall);
    assert_eq!(archive.bet_count, 3);
    assert_eq!(archive.winner_count, 0);
    assert_eq!(archive.financials.total_stake, 60.5);
    assert_eq!(archive.financials.total_shop_margin, 12.1);
    assert_eq!(archive.financials.total_system_fee, 1.21);
    assert_eq!(archive.financials.net_prize_pool, 47.19);

    for t in [&a, &b, &c] {
        let settled = bet(&hall, &t.ticket_number);
        assert_eq!(settled.bet_status, BetStatus::Lost);
    }
    assert!(hall.manager.current_game(CASHIER).unwrap().is_none());
}

#[test]
fn test_end_outcomes_follow_called_numbers() {
    let hall = create_test_manager();
    start(&hall);
    let a = place(&hall, 1, 10.0);
    let b = place(&hall, 2, 20.0);
    let c = place(&hall, 9, 30.0);
    ok(&hall, GameCommandPayload::ActivateGame);
    draw_all(&hall, &DIAGONAL_DRAW);

    let archive = end(&hall);
    assert_eq!(archive.bet_count, 3);
    assert_eq!(archive.financials.total_stake, 60.0);
    assert_eq!(archive.financials.net_prize_pool, 46.8);
    assert_eq!(archive.winner_count, 2);
    assert_eq!(archive.prize_per_winner, 23.4);
    assert_eq!(archive.winning_cartelas, vec![1, 2]);

    assert_eq!(bet(&hall, &a.ticket_number).bet_status, BetStatus::Won);
    assert_eq!(
        bet(&hall, &a.ticket_number).win_pattern.as_deref(),
        Some("Diagonal")
    );
    assert_eq!(bet(&hall, &b.ticket_number).bet_status, BetStatus::Won);
    assert_eq!(bet(&hall, &c.ticket_number).bet_status, BetStatus::Lost);

    // every settled cartela has a stored result
    assert_eq!(archive.verifications.len(), 3);
    assert_eq!(archive.draw_history.len(), archive.called_numbers.len());
}

#[test]
fn test_cancelled_bets_excluded_from_aggregates() {
    let hall = create_test_manager();
    start_active(&hall);
    place(&hall, 1, 10.0);
    let cancelled = place(&hall, 2, 40.0);
    ok(
        &hall,
        GameCommandPayload::CancelBet {
            ticket_number: cancelled.ticket_number.clone(),
        },
    );

    let archive = end(&hall);
    assert_eq!(archive.bet_count, 1);
    assert_eq!(archive.financials.total_stake, 10.0);
    assert_eq!(
        bet(&hall, &cancelled.ticket_number).bet_status,
        BetStatus::Cancelled
    );
}

#[test]
fn test_locked_result_honoured_at_end() {
    let hall = create_test_manager();
    start_active(&hall);
    let ticket = place(&hall, 1, 10.0);
    draw_all(&hall, &[5, 20]);
    ok(&hall, GameCommandPayload::VerifyCartela { cartela_id: 1 });
    ok(&hall, GameCommandPayload::LockVerification { cartela_id: 1 });

    // diagonal completes after the lock, the locked loss stands
    draw_all(&hall, &[50, 65]);
    let archive = end(&hall);
    assert_eq!(archive.winner_count, 0);
    assert!(archive.verifications.get(&1).unwrap().is_locked());
    assert_eq!(bet(&hall, &ticket.ticket_number).bet_status, BetStatus::Lost);
}

#[test]
fn test_end_uses_cashier_overrides() {
    let hall = create_test_manager();
    hall.manager
        .register_cashier(CashierCreate {
            id: "shop-b".to_string(),
            name: "Shop B".to_string(),
            shop_margin_percent: Some(10.0),
            system_fee_percent: Some(5.0),
        })
        .unwrap();
    seed_catalog(&hall.manager, "shop-b");

    assert!(exec_as(&hall, "shop-b", GameCommandPayload::StartGame).success);
    let placed = exec_as(
        &hall,
        "shop-b",
        GameCommandPayload::PlaceBet {
            cartela_id: 1,
            stake: 100.0,
            bet_type: None,
            selected_numbers: vec![],
        },
    );
    assert!(placed.success);

    let resp = exec_as(&hall, "shop-b", GameCommandPayload::EndGame);
    let archive = as_completed(resp.outcome.unwrap());
    assert_eq!(archive.financials.total_shop_margin, 10.0);
    assert_eq!(archive.financials.total_system_fee, 5.0);
    assert_eq!(archive.financials.net_prize_pool, 85.0);
}

#[test]
fn test_archive_and_history() {
    let hall = create_test_manager();
    start_active(&hall);
    place(&hall, 1, 10.0);
    let first = end(&hall);
    start(&hall);
    let second = end(&hall);

    let history = hall.manager.completed_games(CASHIER).unwrap();
    assert_eq!(history.len(), 2);
    let ids: Vec<&str> = history.iter().map(|g| g.instance_id.as_str()).collect();
    assert!(ids.contains(&first.instance_id.as_str()));
    assert!(ids.contains(&second.instance_id.as_str()));

    let fetched = hall
        .manager
        .completed_game(CASHIER, &first.instance_id)
        .unwrap()
        .unwrap();
    assert_eq!(fetched, first);

    // other cashiers cannot read it
    assert!(
        hall.manager
            .completed_game("cashier-2", &first.instance_id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_end_broadcasts_archive() {
    let hall = create_test_manager();
    start_active(&hall);
    let mut rx = hall.manager.subscribe();

    let archive = end(&hall);
    let event = rx.try_recv().unwrap();
    match event.payload {
        GameEventPayload::GameEnded { archive: published } => {
            assert_eq!(*published, archive);
        }
        other => panic!("expected GameEnded, got {:?}", other.name()),
    }
}

#[test]
fn test_inactive_cartela_settles_lost() {
    let hall = create_test_manager();
    start_active(&hall);
    let kept = place(&hall, 1, 30.0);
    let retired = place(&hall, 2, 30.0);
    draw_all(&hall, &DIAGONAL_DRAW);
    deactivate(&hall, 2);

    let archive = end(&hall);
    assert_eq!(archive.winner_count, 1);
    assert_eq!(archive.prize_per_winner, archive.financials.net_prize_pool);
    assert_eq!(archive.winning_cartelas, vec![1]);
    assert!(!archive.verifications.get(&2).unwrap().result().unwrap().is_won());

    assert_eq!(bet(&hall, &kept.ticket_number).bet_status, BetStatus::Won);
    assert_eq!(bet(&hall, &retired.ticket_number).bet_status, BetStatus::Lost);
}
