use super::*;
use crate::games::verification::fixtures;
use crate::utils::time::ManualClock;
use chrono::{TimeZone, Utc};
use shared::error::ErrorCode;
use shared::game::{CommandOutcome, GameCommandPayload, GameStatus};
use shared::models::{Cartela, CashierCreate, WinPattern};

const CASHIER: &str = "cashier-1";

struct TestHall {
    manager: GameManager,
    clock: Arc<ManualClock>,
}

fn create_test_manager() -> TestHall {
    let storage = HallStorage::open_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    ));
    let manager = GameManager::with_clock(storage, chrono_tz::UTC, clock.clone());
    register(&manager, CASHIER);
    TestHall { manager, clock }
}

fn register(manager: &GameManager, cashier_id: &str) {
    manager
        .register_cashier(CashierCreate {
            id: cashier_id.to_string(),
            name: format!("Desk {}", cashier_id),
            shop_margin_percent: None,
            system_fee_percent: None,
        })
        .unwrap();
    seed_catalog(manager, cashier_id);
}

/// Main diagonal 6, 22, free, 54, 70: shares nothing with `fixtures::cartela`
fn other_cartela(cashier_id: &str, cartela_id: u32) -> Cartela {
    Cartela {
        cashier_id: cashier_id.to_string(),
        cartela_id,
        pattern: [
            [6, 21, 36, 51, 66],
            [7, 22, 37, 52, 67],
            [8, 23, 0, 53, 68],
            [9, 24, 38, 54, 69],
            [10, 25, 39, 55, 70],
        ],
        is_active: true,
        created_at: 0,
        updated_at: 0,
    }
}

/// Cartelas 1-5 share the fixture grid, 9 is `other_cartela`, 10 is inactive.
/// Patterns: diagonal and anti-diagonal.
fn seed_catalog(manager: &GameManager, cashier_id: &str) {
    let storage = manager.storage();
    let txn = storage.begin_write().unwrap();
    for id in 1..=5 {
        storage
            .put_cartela(&txn, &fixtures::cartela(cashier_id, id))
            .unwrap();
    }
    storage
        .put_cartela(&txn, &other_cartela(cashier_id, 9))
        .unwrap();
    let mut inactive = fixtures::cartela(cashier_id, 10);
    inactive.is_active = false;
    storage.put_cartela(&txn, &inactive).unwrap();

    let patterns: [WinPattern; 2] = [
        fixtures::diagonal(cashier_id),
        fixtures::anti_diagonal(cashier_id),
    ];
    for p in &patterns {
        storage.put_win_pattern(&txn, p).unwrap();
    }
    txn.commit().unwrap();
}

fn exec(hall: &TestHall, payload: GameCommandPayload) -> CommandResponse {
    exec_as(hall, CASHIER, payload)
}

fn exec_as(hall: &TestHall, cashier_id: &str, payload: GameCommandPayload) -> CommandResponse {
    hall.manager
        .execute_command(GameCommand::new(cashier_id, payload))
}

/// Run a command that must succeed
fn ok(hall: &TestHall, payload: GameCommandPayload) -> CommandOutcome {
    let name = payload.name();
    let resp = exec(hall, payload);
    assert!(resp.success, "{} failed: {:?}", name, resp.error);
    resp.outcome.unwrap()
}

/// Run a command that must fail, returning its code
fn fail(hall: &TestHall, payload: GameCommandPayload) -> ErrorCode {
    let name = payload.name();
    let resp = exec(hall, payload);
    assert!(!resp.success, "{} unexpectedly succeeded", name);
    resp.error.unwrap().code
}

fn as_game(outcome: CommandOutcome) -> GameSession {
    match outcome {
        CommandOutcome::Game(g) => *g,
        other => panic!("expected game outcome, got {:?}", other),
    }
}

fn as_bet(outcome: CommandOutcome) -> Bet {
    match outcome {
        CommandOutcome::Bet(b) => *b,
        other => panic!("expected bet outcome, got {:?}", other),
    }
}

fn as_completed(outcome: CommandOutcome) -> CompletedGame {
    match outcome {
        CommandOutcome::Completed(g) => *g,
        other => panic!("expected completed outcome, got {:?}", other),
    }
}

fn start(hall: &TestHall) -> GameSession {
    as_game(ok(hall, GameCommandPayload::StartGame))
}

fn start_active(hall: &TestHall) -> GameSession {
    start(hall);
    as_game(ok(hall, GameCommandPayload::ActivateGame))
}

fn place(hall: &TestHall, cartela_id: u32, stake: f64) -> Bet {
    as_bet(ok(
        hall,
        GameCommandPayload::PlaceBet {
            cartela_id,
            stake,
            bet_type: None,
            selected_numbers: vec![],
        },
    ))
}

fn draw_all(hall: &TestHall, numbers: &[u8]) {
    for &number in numbers {
        ok(hall, GameCommandPayload::DrawNumber { number });
    }
}

fn end(hall: &TestHall) -> CompletedGame {
    as_completed(ok(hall, GameCommandPayload::EndGame))
}

/// Flip a cartela inactive through the catalog, as the REST toggle does
fn deactivate(hall: &TestHall, cartela_id: u32) {
    let catalog = crate::catalog::CatalogService::new(hall.manager.storage().clone());
    let cartela = catalog.toggle_cartela(CASHIER, cartela_id).unwrap();
    assert!(!cartela.is_active);
}

fn bet(hall: &TestHall, ticket_number: &str) -> Bet {
    hall.manager.search(CASHIER, ticket_number).unwrap()
}

/// Numbers completing the diagonal of `fixtures::cartela` (35 is not on the card)
const DIAGONAL_DRAW: [u8; 5] = [5, 20, 35, 50, 65];

mod test_bets;
mod test_settlement;
