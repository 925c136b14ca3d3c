//! Statistics API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/statistics", get(handler::get_stats))
        .route("/api/statistics/recompute", post(handler::recompute))
}
