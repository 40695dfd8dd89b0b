//! Win pattern API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::notify_catalog;
use crate::auth::CashierPrincipal;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{WinPattern, WinPatternCreate, WinPatternUpdate};
use shared::realtime::CatalogKind;

/// GET /api/win-patterns - 获取所有中奖图案
pub async fn list(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<WinPattern>>> {
    let patterns = state.catalog.list_win_patterns(cashier.cashier_id())?;
    Ok(Json(patterns))
}

/// GET /api/win-patterns/active - 参与验证的图案
pub async fn list_active(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<WinPattern>>> {
    let patterns = state
        .catalog
        .list_active_win_patterns(cashier.cashier_id())?;
    Ok(Json(patterns))
}

/// GET /api/win-patterns/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<String>,
) -> AppResult<Json<WinPattern>> {
    let pattern = state.catalog.get_win_pattern(cashier.cashier_id(), &id)?;
    Ok(Json(pattern))
}

/// POST /api/win-patterns - 创建图案 (名称按收银员唯一)
pub async fn create(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Json(payload): Json<WinPatternCreate>,
) -> AppResult<Json<WinPattern>> {
    let pattern = state
        .catalog
        .create_win_pattern(cashier.cashier_id(), payload)?;
    notify_catalog(&state, &cashier, CatalogKind::WinPatterns);
    Ok(Json(pattern))
}

/// PUT /api/win-patterns/:id
pub async fn update(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<String>,
    Json(payload): Json<WinPatternUpdate>,
) -> AppResult<Json<WinPattern>> {
    let pattern = state
        .catalog
        .update_win_pattern(cashier.cashier_id(), &id, payload)?;
    notify_catalog(&state, &cashier, CatalogKind::WinPatterns);
    Ok(Json(pattern))
}

/// POST /api/win-patterns/:id/toggle
pub async fn toggle(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<String>,
) -> AppResult<Json<WinPattern>> {
    let pattern = state.catalog.toggle_win_pattern(cashier.cashier_id(), &id)?;
    notify_catalog(&state, &cashier, CatalogKind::WinPatterns);
    Ok(Json(pattern))
}

/// DELETE /api/win-patterns/:id
pub async fn delete(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_win_pattern(cashier.cashier_id(), &id)?;
    notify_catalog(&state, &cashier, CatalogKind::WinPatterns);
    Ok(Json(ApiResponse::ok()))
}
