//! Verification API Handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::api::execute;
use crate::auth::CashierPrincipal;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::game::{CommandResponse, GameCommandPayload, VerificationState};

#[derive(Debug, Deserialize)]
pub struct CartelaRequest {
    pub cartela_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct BatchVerifyRequest {
    pub cartela_ids: Vec<u32>,
}

/// POST /api/verification/verify-cartela - 按已叫号码验证一张卡片
pub async fn verify_cartela(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<CartelaRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::VerifyCartela {
        cartela_id: payload.cartela_id,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}

/// POST /api/verification/lock-verification - 锁定验证结果
pub async fn lock_verification(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<CartelaRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::LockVerification {
        cartela_id: payload.cartela_id,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}

/// POST /api/verification/batch-verify - 逐张验证, 单张失败不影响其他
pub async fn batch_verify(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    headers: HeaderMap,
    Json(payload): Json<BatchVerifyRequest>,
) -> AppResult<Json<CommandResponse>> {
    let payload = GameCommandPayload::BatchVerify {
        cartela_ids: payload.cartela_ids,
    };
    execute(&state, &cashier, &headers, payload).map(Json)
}

/// GET /api/verification/game/:game_id/verification-status
pub async fn verification_status(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
    Path(game_id): Path<String>,
) -> AppResult<Json<BTreeMap<u32, VerificationState>>> {
    let status = state
        .manager
        .verification_status(cashier.cashier_id(), &game_id)?;
    Ok(Json(status))
}
