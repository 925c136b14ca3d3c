//! Order API Module
//!
//! Order placement from the cash register and order detail lookup.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::parse_items;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::place_order))
        .route("/{id}", get(handler::get_by_id))
}
