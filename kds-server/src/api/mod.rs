//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menu`] - 菜单与商品目录
//! - [`orders`] - 下单与订单详情
//! - [`stations`] - 工作站看板与状态推进
//! - [`statistics`] - 统计快照与手动重算
//! - [`admin`] - 数据重置

pub mod admin;
pub mod health;
pub mod menu;
pub mod orders;
pub mod stations;
pub mod statistics;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok};

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(stations::router())
        .merge(statistics::router())
        .merge(admin::router())
}
