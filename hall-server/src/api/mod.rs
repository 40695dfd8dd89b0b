//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`games`] - 游戏生命周期 / 历史
//! - [`bets`] - 下注 / 取消 / 兑奖 / 查询
//! - [`verification`] - 卡片验证 / 锁定
//! - [`cartelas`] - 卡片目录
//! - [`win_patterns`] - 中奖图案目录
//! - [`display`] - 显示屏只读接口 (session key + display token)
//! - [`cashiers`] - 收银员注册 / 会话密钥
//! - [`config`] - 全局配置
//!
//! 实时通道: `GET /ws` ([`crate::realtime::ws`])

pub mod bets;
pub mod cartelas;
pub mod cashiers;
pub mod config;
pub mod display;
pub mod games;
pub mod health;
pub mod verification;
pub mod win_patterns;

use axum::http::HeaderMap;
use axum::{Router, middleware, routing::get};
use shared::game::{CommandResponse, GameCommand, GameCommandPayload};
use shared::realtime::CatalogKind;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CashierPrincipal, trusted_identity};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Optional idempotency key on REST commands
pub const COMMAND_ID_HEADER: &str = "x-command-id";

/// Build the Axum router (without state)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(games::router())
        .merge(bets::router())
        .merge(verification::router())
        .merge(cartelas::router())
        .merge(win_patterns::router())
        .merge(display::router())
        .merge(cashiers::router())
        .merge(config::router())
        .route("/ws", get(crate::realtime::ws::handle_ws))
}

/// Full application: routes, identity middleware and tower-http layers
pub fn build_app(state: &ServerState) -> Router {
    routes()
        // 网关身份头 → Principal (TRUST_IDENTITY_HEADERS)
        .layer(middleware::from_fn_with_state(state.clone(), trusted_identity))
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run a game command for the calling cashier.
///
/// Business failures come back as [`AppError`] carrying the command's error
/// code, so the HTTP status and `kind` match the real-time channel.
pub(crate) fn execute(
    state: &ServerState,
    cashier: &CashierPrincipal,
    headers: &HeaderMap,
    payload: GameCommandPayload,
) -> AppResult<CommandResponse> {
    let mut cmd = GameCommand::new(cashier.cashier_id(), payload);
    if let Some(command_id) = headers
        .get(COMMAND_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        cmd.command_id = command_id.to_string();
    }
    cmd.timestamp = state.manager.now_millis();

    let command_name = cmd.payload.name();
    let response = state.manager.execute_command(cmd);
    match response.error {
        Some(err) => {
            tracing::debug!(
                cashier_id = %cashier.cashier_id(),
                command = command_name,
                code = %err.code,
                "Command rejected"
            );
            Err(AppError::from(err))
        }
        None => Ok(response),
    }
}

/// Publish a catalog edit on the calling cashier's session topic
pub(crate) fn notify_catalog(state: &ServerState, cashier: &CashierPrincipal, kind: CatalogKind) {
    match state.manager.cashier(cashier.cashier_id()) {
        Ok(Some(c)) => state.hub.catalog_changed(&c.session_id, kind),
        Ok(None) => {}
        Err(e) => tracing::warn!(
            cashier_id = %cashier.cashier_id(),
            error = %e,
            "Catalog change not published"
        ),
    }
}
