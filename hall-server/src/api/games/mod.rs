//! Game API 模块
//!
//! 生命周期命令走 GameManager, 历史查询读归档。所有接口仅限收银员。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/games", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/current", get(handler::current))
        .route("/next", get(handler::next))
        .route("/history", get(handler::history))
        .route("/history/{instance_id}", get(handler::history_detail));

    let command_routes = Router::new()
        .route("/start", post(handler::start))
        .route("/activate", post(handler::activate))
        .route("/draw", post(handler::draw))
        .route("/draw-auto", post(handler::draw_auto))
        .route("/pause", post(handler::pause))
        .route("/resume", post(handler::resume))
        .route("/end", post(handler::end))
        .route("/reset", post(handler::reset))
        .route("/select-cartelas", post(handler::select_cartelas));

    read_routes.merge(command_routes)
}
