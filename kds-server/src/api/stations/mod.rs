//! Station dashboard API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{station}", get(handler::get_view))
        .route("/{station}/orders/{id}/advance", post(handler::advance))
}
