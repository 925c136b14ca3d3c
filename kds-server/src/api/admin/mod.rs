//! Admin API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/admin/reset | POST | 清空订单、恢复库存、重算统计 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/reset", post(handler::reset))
}
