//! 全局配置接口
//!
//! | 路径 | 方法 | 说明 | 角色 |
//! |------|------|------|------|
//! | /api/config | GET | 当前配置 | 任意已认证 |
//! | /api/config | PUT | 更新配置 | admin |

use axum::{Json, Router, extract::State, routing::get};

use crate::auth::{AdminPrincipal, Principal};
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{GlobalConfig, GlobalConfigUpdate};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/config", get(get_config).put(update_config))
}

/// GET /api/config
pub async fn get_config(
    State(state): State<ServerState>,
    _principal: Principal,
) -> AppResult<Json<GlobalConfig>> {
    let config = state.manager.config()?;
    Ok(Json(config))
}

/// PUT /api/config - 更新抽成比例 / 最低下注等
pub async fn update_config(
    State(state): State<ServerState>,
    admin: AdminPrincipal,
    Json(payload): Json<GlobalConfigUpdate>,
) -> AppResult<Json<GlobalConfig>> {
    let config = state.manager.update_config(payload)?;
    tracing::info!(admin = %admin.0.subject, "Global config updated via API");
    Ok(Json(config))
}
