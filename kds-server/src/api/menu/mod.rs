//! Menu / Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/menu", get(handler::get_menu))
        .route("/api/products", post(handler::create_product))
}
