//! 自动完成计时器
//!
//! 每个 (订单, 工位) 最多一个有效计时器。计时器以 UUID 标识代次：
//! 新计时器替换旧计时器时旧令牌被取消；到期时只有注册表中仍是自己
//! 且未被取消的计时器才能认领条目并执行回调。

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use shared::models::Station;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Registry key: one order at one station
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub order_id: i64,
    pub station: Station,
}

impl TimerKey {
    pub fn new(order_id: i64, station: Station) -> Self {
        Self { order_id, station }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.order_id, self.station)
    }
}

#[derive(Debug)]
struct TimerEntry {
    id: Uuid,
    token: CancellationToken,
}

/// 计时器注册表
#[derive(Debug, Clone)]
pub struct TimerRegistry {
    entries: Arc<DashMap<TimerKey, TimerEntry>>,
    grace: Duration,
}

impl TimerRegistry {
    pub fn new(grace: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// 启动计时器 (替换该 key 上已有的计时器)
    ///
    /// `on_expire` 仅在计时器自然到期且成功认领条目后执行一次。
    pub fn start<F, Fut>(&self, key: TimerKey, on_expire: F) -> Uuid
    where
        F: FnOnce(TimerKey) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();

        let previous = self.entries.insert(
            key.clone(),
            TimerEntry {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
            tracing::debug!(key = %key, replaced = %previous.id, timer_id = %id, "Auto-complete timer replaced");
        }

        let log_key = key.clone();
        let entries = self.entries.clone();
        let grace = self.grace;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(key = %key, timer_id = %id, "Auto-complete timer cancelled");
                    return;
                }
                _ = tokio::time::sleep(grace) => {}
            }

            // 认领：条目仍属于本代次且未被取消
            let claimed = entries
                .remove_if(&key, |_, entry| entry.id == id && !entry.token.is_cancelled())
                .is_some();
            if !claimed {
                tracing::debug!(key = %key, timer_id = %id, "Auto-complete timer superseded, expiry dropped");
                return;
            }

            tracing::debug!(key = %key, timer_id = %id, "Auto-complete timer expired");
            on_expire(key).await;
        });

        tracing::debug!(key = %log_key, timer_id = %id, grace = ?grace, "Auto-complete timer started");
        id
    }

    /// 取消计时器 (幂等)
    pub fn cancel(&self, key: &TimerKey) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                entry.token.cancel();
                tracing::debug!(key = %key, timer_id = %entry.id, "Auto-complete timer cancel requested");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, key: &TimerKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// 取消全部计时器 (关机或数据重置)
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        self.entries.retain(|_, entry| {
            entry.token.cancel();
            cancelled += 1;
            false
        });
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const GRACE: Duration = Duration::from_secs(10);

    fn key(order_id: i64) -> TimerKey {
        TimerKey::new(order_id, Station::new("Bar").unwrap())
    }

    fn start_reporting(
        registry: &TimerRegistry,
        key: TimerKey,
        label: &'static str,
        tx: &mpsc::UnboundedSender<&'static str>,
    ) -> Uuid {
        let tx = tx.clone();
        registry.start(key, move |_| async move {
            let _ = tx.send(label);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_grace() {
        let registry = TimerRegistry::new(GRACE);
        let (tx, mut rx) = mpsc::unbounded_channel();

        start_reporting(&registry, key(1), "a", &tx);
        assert!(registry.is_active(&key(1)));

        tokio::time::sleep(GRACE / 2).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(GRACE).await;
        assert_eq!(rx.try_recv().unwrap(), "a");
        assert!(!registry.is_active(&key(1)));
        assert_eq!(registry.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_timer_never_fires() {
        let registry = TimerRegistry::new(GRACE);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = start_reporting(&registry, key(1), "a", &tx);
        tokio::time::sleep(GRACE / 2).await;
        let second = start_reporting(&registry, key(1), "b", &tx);
        assert_ne!(first, second);

        tokio::time::sleep(GRACE * 2).await;
        assert_eq!(rx.try_recv().unwrap(), "b");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_without_restart() {
        let registry = TimerRegistry::new(GRACE);
        let (tx, mut rx) = mpsc::unbounded_channel();

        start_reporting(&registry, key(1), "a", &tx);
        assert!(registry.cancel(&key(1)));
        assert!(!registry.cancel(&key(1)));

        tokio::time::sleep(GRACE * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let registry = TimerRegistry::new(GRACE);
        let (tx, mut rx) = mpsc::unbounded_channel();

        start_reporting(&registry, key(1), "one", &tx);
        start_reporting(
            &registry,
            TimerKey::new(1, Station::new("Cucina").unwrap()),
            "kitchen",
            &tx,
        );
        registry.cancel(&key(1));

        tokio::time::sleep(GRACE * 2).await;
        assert_eq!(rx.try_recv().unwrap(), "kitchen");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let registry = TimerRegistry::new(GRACE);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for order_id in 1..=3 {
            start_reporting(&registry, key(order_id), "x", &tx);
        }
        assert_eq!(registry.active_count(), 3);
        assert_eq!(registry.cancel_all(), 3);
        assert_eq!(registry.active_count(), 0);

        tokio::time::sleep(GRACE * 2).await;
        assert!(rx.try_recv().is_err());
    }
}
