//! 显示屏只读接口
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/display/{session}/snapshot?token= | GET | 当前会话快照 |
//! | /api/display/{session}/placed-cartelas?token= | GET | 已下注卡片 |
//! | /api/display/{session}/cartelas?token= | GET | 启用的卡片 |
//!
//! 无需 Principal: session key + display token 即凭证。

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::realtime::snapshot;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Cartela, Cashier};
use shared::realtime::SessionSnapshot;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/display", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{session}/snapshot", get(snapshot_handler))
        .route("/{session}/placed-cartelas", get(placed_cartelas))
        .route("/{session}/cartelas", get(cartelas))
}

#[derive(Debug, Deserialize)]
pub struct DisplayQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Resolve the cashier behind a display credential.
///
/// Unknown session and wrong token are reported identically.
pub fn display_cashier(
    state: &ServerState,
    session_id: &str,
    token: Option<&str>,
) -> AppResult<Cashier> {
    let cashier = state
        .manager
        .cashier_for_session(session_id.trim())?
        .filter(|c| token.is_some_and(|t| t == c.display_token));
    cashier.ok_or_else(|| {
        tracing::debug!(session_id = %session_id, "Display credential rejected");
        AppError::new(ErrorCode::SessionKeyInvalid)
    })
}

/// GET /api/display/:session/snapshot - 当前游戏与在线状态
pub async fn snapshot_handler(
    State(state): State<ServerState>,
    Path(session): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> AppResult<Json<SessionSnapshot>> {
    let cashier = display_cashier(&state, &session, query.token.as_deref())?;
    let snap = snapshot::session_snapshot(&state.manager, &state.hub, &cashier)?;
    Ok(Json(snap))
}

/// GET /api/display/:session/placed-cartelas
pub async fn placed_cartelas(
    State(state): State<ServerState>,
    Path(session): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> AppResult<Json<Vec<u32>>> {
    let cashier = display_cashier(&state, &session, query.token.as_deref())?;
    let placed = state.manager.placed_cartelas(&cashier.id)?;
    Ok(Json(placed))
}

/// GET /api/display/:session/cartelas - 启用的卡片
pub async fn cartelas(
    State(state): State<ServerState>,
    Path(session): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> AppResult<Json<Vec<Cartela>>> {
    let cashier = display_cashier(&state, &session, query.token.as_deref())?;
    let cartelas = state.catalog.list_active_cartelas(&cashier.id)?;
    Ok(Json(cartelas))
}
