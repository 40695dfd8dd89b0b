//! Bet API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bets", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/recall", get(handler::recall))
        .route("/search/{ticket_number}", get(handler::search))
        .route("/placed-cartelas", get(handler::placed_cartelas));

    let command_routes = Router::new()
        .route("/", post(handler::place))
        .route("/cancel/{ticket_number}", post(handler::cancel))
        .route("/redeem/{ticket_number}", post(handler::redeem));

    read_routes.merge(command_routes)
}
