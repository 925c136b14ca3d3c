//! 通知总线核心实现
//!
//! # 消息流
//!
//! ```text
//! OrderWorkflowService ──▶ publish(station) ──┬──▶ MemoryTransport   ──▶ subscribe(station)
//!                                             └──▶ SocketIoTransport ──▶ 工位房间
//! ```
//!
//! 投递是尽力而为：任一传输失败只记录 warn 日志，不影响其他传输，
//! 也不会把错误返回给调用方。

use std::sync::Arc;

use shared::message::DashboardEvent;
use shared::models::Station;
use tokio::sync::broadcast;

use super::transport::{DashboardTransport, MemoryTransport};

/// 通知总线 - 按工位主题扇出刷新信号
#[derive(Debug, Clone)]
pub struct NotificationBus {
    /// 进程内订阅 (总是存在)
    memory: Arc<MemoryTransport>,
    /// 全部传输层 (含 memory)
    transports: Vec<Arc<dyn DashboardTransport>>,
}

impl NotificationBus {
    /// 创建只有进程内传输的总线
    pub fn new(channel_capacity: usize) -> Self {
        let memory = Arc::new(MemoryTransport::new(channel_capacity));
        let transports: Vec<Arc<dyn DashboardTransport>> = vec![memory.clone()];
        Self { memory, transports }
    }

    /// 追加一个传输层
    pub fn with_transport(mut self, transport: Arc<dyn DashboardTransport>) -> Self {
        tracing::debug!(transport = transport.name(), "Dashboard transport registered");
        self.transports.push(transport);
        self
    }

    /// 订阅工位主题 (进程内)
    pub fn subscribe(&self, station: &Station) -> broadcast::Receiver<DashboardEvent> {
        self.memory.subscribe(station.as_str())
    }

    /// 当前工位主题的进程内订阅者数量
    pub fn subscriber_count(&self, station: &Station) -> usize {
        self.memory.subscriber_count(station.as_str())
    }

    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    /// 发布刷新信号 (服务器 -> 工位看板)
    pub async fn publish(&self, station: &Station) {
        let event = DashboardEvent::refresh(station.clone());
        for transport in &self.transports {
            if let Err(e) = transport.deliver(&event).await {
                tracing::warn!(
                    transport = transport.name(),
                    station = %station,
                    error = %e,
                    "Dashboard notification failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FailingTransport {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl DashboardTransport for FailingTransport {
        async fn deliver(&self, _event: &DashboardEvent) -> Result<(), AppError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::internal("socket closed"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn bar() -> Station {
        Station::new("Bar").unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_topic_subscribers_only() {
        let bus = NotificationBus::new(8);
        let mut bar_rx = bus.subscribe(&bar());
        let mut kitchen_rx = bus.subscribe(&Station::new("Cucina").unwrap());

        bus.publish(&bar()).await;

        assert_eq!(bar_rx.recv().await.unwrap().station, bar());
        assert!(kitchen_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_transport_is_swallowed() {
        let failing = Arc::new(FailingTransport::default());
        let bus = NotificationBus::new(8).with_transport(failing.clone());
        let mut rx = bus.subscribe(&bar());
        assert_eq!(bus.transport_count(), 2);

        bus.publish(&bar()).await;
        bus.publish(&bar()).await;

        assert_eq!(failing.attempts.load(Ordering::SeqCst), 2);
        assert!(rx.recv().await.is_ok());
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = NotificationBus::new(8);
        bus.publish(&bar()).await;
        assert_eq!(bus.subscriber_count(&bar()), 0);
    }
}
