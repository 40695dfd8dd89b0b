//! 收银员接口
//!
//! | 路径 | 方法 | 说明 | 角色 |
//! |------|------|------|------|
//! | /api/cashiers | GET | 所有收银员 | admin |
//! | /api/cashiers | POST | 注册收银员 | admin |
//! | /api/cashiers/me | GET | 当前收银员会话信息 | cashier |
//! | /api/cashiers/me/regenerate-session | POST | 重新生成 session key / display token | cashier |

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::auth::{AdminPrincipal, CashierPrincipal};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{Cashier, CashierCreate, CashierSession};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cashiers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/me", get(me))
        .route("/me/regenerate-session", post(regenerate_session))
}

/// GET /api/cashiers - 获取所有收银员
pub async fn list(
    State(state): State<ServerState>,
    _admin: AdminPrincipal,
) -> AppResult<Json<Vec<Cashier>>> {
    let cashiers = state.manager.cashiers()?;
    Ok(Json(cashiers))
}

/// POST /api/cashiers - 注册收银员
pub async fn register(
    State(state): State<ServerState>,
    admin: AdminPrincipal,
    Json(payload): Json<CashierCreate>,
) -> AppResult<Json<Cashier>> {
    let cashier = state.manager.register_cashier(payload)?;
    tracing::info!(cashier_id = %cashier.id, admin = %admin.0.subject, "Cashier registered via API");
    Ok(Json(cashier))
}

/// GET /api/cashiers/me
pub async fn me(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<CashierSession>> {
    let record = state
        .manager
        .cashier(cashier.cashier_id())?
        .ok_or_else(|| AppError::not_found(format!("Cashier {}", cashier.cashier_id())))?;
    Ok(Json(CashierSession::from(&record)))
}

/// POST /api/cashiers/me/regenerate-session - 旧 session 上的连接会被关闭
pub async fn regenerate_session(
    State(state): State<ServerState>,
    cashier: CashierPrincipal,
) -> AppResult<Json<CashierSession>> {
    let (record, old_session) = state.manager.regenerate_session(cashier.cashier_id())?;
    state.hub.revoke_session(&old_session);
    Ok(Json(CashierSession::from(&record)))
}
