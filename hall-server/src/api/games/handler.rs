//! Game API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::api::execute;
use crate::auth::CashierPrincipal;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::game::{
    CommandResponse, CompletedGame, CompletedGameSummary, GameCommandPayload, GameSession,
};

#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub number: u8,
}

#[derive(Debug, Deserialize)]
pub struct SelectCartelasRequest {
    pub cartela_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct NextGameResponse {
    pub game_id: String,
}

// ========== Queries ==========

/// GET /api/games/current - 当前进行中的游戏 (无则 null)
pub async fn current(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Option<GameSession>>> {
    let game = state.manager.current_game(cashier.cashier_id())?;
    Ok(Json(game))
}

/// GET /api/games/next - 下一局将分配的编号
pub async fn next(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<NextGameResponse>> {
    let game_id = state.manager.next_game_id(cashier.cashier_id())?;
    Ok(Json(NextGameResponse { game_id }))
}

/// GET /api/games/history - 已完成游戏 (新→旧)
pub async fn history(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<CompletedGameSummary>>> {
    let games = state.manager.completed_games(cashier.cashier_id())?;
    Ok(Json(games))
}

/// GET /api/games/history/:instance_id - 单局归档
pub async fn history_detail(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(instance_id): Path<String>,
) -> AppResult<Json<CompletedGame>> {
    let game = state
        .manager
        .completed_game(cashier.cashier_id(), &instance_id)?
        .ok_or_else(|| AppError::not_found(format!("Game {}", instance_id)))?;
    Ok(Json(game))
}

// ========== Commands ==========

/// POST /api/games/start - 开始新一局 (waiting)
pub async fn start(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::StartGame).map(Json)
}

/// POST /api/games/activate - waiting → active
pub async fn activate(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::ActivateGame).map(Json)
}

/// POST /api/games/draw - 手动叫号
pub async fn draw(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<DrawRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::DrawNumber {
        number: payload.number,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}

/// POST /api/games/draw-auto - 随机叫号
pub async fn draw_auto(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::DrawAuto).map(Json)
}

/// POST /api/games/pause
pub async fn pause(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::PauseGame).map(Json)
}

/// POST /api/games/resume
pub async fn resume(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::ResumeGame).map(Json)
}

/// POST /api/games/end - 结算并归档
pub async fn end(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::EndGame).map(Json)
}

/// POST /api/games/reset - 丢弃未下注的一局, 编号复用
pub async fn reset(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
) -> AppResult<Json<CommandResponse>> {
    execute(&state, &cashier, &headers, GameCommandPayload::ResetGame).map(Json)
}

/// POST /api/games/select-cartelas - 记录当前选中的卡片
pub async fn select_cartelas(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<SelectCartelasRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::SelectCartelas {
        cartela_ids: payload.cartela_ids,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}
