//! Bet API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::api::execute;
use crate::auth::CashierPrincipal;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::game::{CommandResponse, GameCommandPayload};
use shared::models::{Bet, BetFilter};

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub cartela_id: u32,
    pub stake: f64,
    #[serde(default)]
    pub bet_type: Option<String>,
    #[serde(default)]
    pub selected_numbers: Vec<u8>,
}

/// POST /api/bets - 在当前游戏下注
pub async fn place(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<PlaceBetRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::PlaceBet {
        cartela_id: payload.cartela_id,
        stake: payload.stake,
        bet_type: payload.bet_type,
        selected_numbers: payload.selected_numbers,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}

/// POST /api/bets/cancel/:ticket_number
pub async fn cancel(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Path(ticket_number): Path<String>,
) -> AppResult<Json<CommandResponse>> {
    execute(
        &state,
        &cashier,
        &headers,
        GameCommandPayload::CancelBet { ticket_number },
    )
    .map(Json)
}

/// POST /api/bets/redeem/:ticket_number - 兑奖 (仅已结束的游戏)
pub async fn redeem(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Path(ticket_number): Path<String>,
) -> AppResult<Json<CommandResponse>> {
    execute(
        &state,
        &cashier,
        &headers,
        GameCommandPayload::RedeemBet { ticket_number },
    )
    .map(Json)
}

/// GET /api/bets/recall - 历史下注查询 (跨游戏)
pub async fn recall(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Query(filter): Query<BetFilter>,
) -> AppResult<Json<Vec<Bet>>> {
    let bets = state.manager.recall(cashier.cashier_id(), &filter)?;
    Ok(Json(bets))
}

/// GET /api/bets/search/:ticket_number
pub async fn search(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(ticket_number): Path<String>,
) -> AppResult<Json<Bet>> {
    let bet = state.manager.search(cashier.cashier_id(), &ticket_number)?;
    Ok(Json(bet))
}

/// GET /api/bets/placed-cartelas - 当前游戏已下注的卡片
pub async fn placed_cartelas(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<u32>>> {
    let cartelas = state.manager.placed_cartelas(cashier.cashier_id())?;
    Ok(Json(cartelas))
}
