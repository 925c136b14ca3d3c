//! Transport 传输层抽象
//!
//! 每个传输实现负责把刷新信号送达某一类看板订阅者。

mod memory;
mod socketio;

pub use memory::MemoryTransport;
pub use socketio::SocketIoTransport;

use async_trait::async_trait;
use shared::message::DashboardEvent;

use crate::utils::AppError;

/// 看板传输层特征
///
/// 投递失败返回错误，由 [`NotificationBus`](super::NotificationBus) 记录日志后吞掉。
#[async_trait]
pub trait DashboardTransport: Send + Sync + std::fmt::Debug {
    /// 向事件所属工位的订阅者投递刷新信号
    async fn deliver(&self, event: &DashboardEvent) -> Result<(), AppError>;

    /// 传输名称 (用于日志)
    fn name(&self) -> &'static str;
}
