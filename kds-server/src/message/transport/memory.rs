//! Memory 传输层实现 (同进程订阅)

use async_trait::async_trait;
use dashmap::DashMap;
use shared::message::DashboardEvent;
use tokio::sync::broadcast;

use super::DashboardTransport;
use crate::utils::AppError;

/// In-process transport: one broadcast channel per station topic
///
/// Topics are created on first subscription; events for topics nobody
/// subscribed to are dropped.
#[derive(Debug)]
pub struct MemoryTransport {
    topics: DashMap<String, broadcast::Sender<DashboardEvent>>,
    capacity: usize,
}

impl MemoryTransport {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<DashboardEvent> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live receivers on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DashboardTransport for MemoryTransport {
    async fn deliver(&self, event: &DashboardEvent) -> Result<(), AppError> {
        if let Some(tx) = self.topics.get(event.topic()) {
            // No live receivers is not a delivery failure
            let _ = tx.send(event.clone());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
