//! Cartela API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::notify_catalog;
use crate::auth::CashierPrincipal;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{Cartela, CartelaCreate, CartelaUpdate};
use shared::realtime::CatalogKind;

/// GET /api/cartelas - 获取所有卡片
pub async fn list(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<Cartela>>> {
    let cartelas = state.catalog.list_cartelas(cashier.cashier_id())?;
    Ok(Json(cartelas))
}

/// GET /api/cartelas/active - 仅启用的卡片
pub async fn list_active(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<Vec<Cartela>>> {
    let cartelas = state.catalog.list_active_cartelas(cashier.cashier_id())?;
    Ok(Json(cartelas))
}

/// GET /api/cartelas/:id - 获取单张卡片
pub async fn get_by_id(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<u32>,
) -> AppResult<Json<Cartela>> {
    let cartela = state.catalog.get_cartela(cashier.cashier_id(), id)?;
    Ok(Json(cartela))
}

/// POST /api/cartelas - 创建卡片
pub async fn create(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Json(payload): Json<CartelaCreate>,
) -> AppResult<Json<Cartela>> {
    let cartela = state.catalog.create_cartela(cashier.cashier_id(), payload)?;
    notify_catalog(&state, &cashier, CatalogKind::Cartelas);
    Ok(Json(cartela))
}

/// PUT /api/cartelas/:id - 更新卡片
pub async fn update(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<u32>,
    Json(payload): Json<CartelaUpdate>,
) -> AppResult<Json<Cartela>> {
    let cartela = state
        .catalog
        .update_cartela(cashier.cashier_id(), id, payload)?;
    notify_catalog(&state, &cashier, CatalogKind::Cartelas);
    Ok(Json(cartela))
}

/// POST /api/cartelas/:id/toggle - 切换启用状态
pub async fn toggle(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<u32>,
) -> AppResult<Json<Cartela>> {
    let cartela = state.catalog.toggle_cartela(cashier.cashier_id(), id)?;
    notify_catalog(&state, &cashier, CatalogKind::Cartelas);
    Ok(Json(cartela))
}

/// DELETE /api/cartelas/:id - 删除卡片
pub async fn delete(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(id): Path<u32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_cartela(cashier.cashier_id(), id)?;
    notify_catalog(&state, &cashier, CatalogKind::Cartelas);
    Ok(Json(ApiResponse::ok()))
}
