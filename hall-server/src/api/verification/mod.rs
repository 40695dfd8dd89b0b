//! Verification API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/verification", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/verify-cartela", post(handler::verify_cartela))
        .route("/lock-verification", post(handler::lock_verification))
        .route("/batch-verify", post(handler::batch_verify))
        .route(
            "/game/{game_id}/verification-status",
            get(handler::verification_status),
        )
}
