//! Stats Worker - 后台统计重算
//!
//! 请求通过有界 mpsc 队列 (默认容量 1) 投递：队列已满说明已有一次重算在排队，
//! 新请求会被它覆盖，因此突发的状态变更只会触发有限次重算。

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::StatsAggregator;

/// 重算请求句柄 (可克隆，发送即返回)
#[derive(Debug, Clone)]
pub struct StatsHandle {
    tx: mpsc::Sender<()>,
}

impl StatsHandle {
    /// 请求一次重算 (fire-and-forget)
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => tracing::trace!("Stats recompute queued"),
            Err(TrySendError::Full(())) => {
                tracing::trace!("Stats recompute already pending, request coalesced")
            }
            Err(TrySendError::Closed(())) => {
                tracing::warn!("Stats worker stopped, recompute request dropped")
            }
        }
    }
}

/// 统计重算工作者 (串行执行)
pub struct StatsWorker {
    aggregator: StatsAggregator,
    rx: mpsc::Receiver<()>,
}

impl StatsWorker {
    pub fn new(aggregator: StatsAggregator, queue_capacity: usize) -> (Self, StatsHandle) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        (Self { aggregator, rx }, StatsHandle { tx })
    }

    /// 运行直到关闭信号或所有句柄被丢弃
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Stats worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Stats worker received shutdown signal");
                    break;
                }
                request = self.rx.recv() => {
                    if request.is_none() {
                        tracing::info!("Stats channel closed, shutting down stats worker");
                        break;
                    }
                    // 失败不回滚，下一次成功重算自愈
                    if let Err(e) = self.aggregator.recompute().await {
                        tracing::error!(error = %e, "Statistics recompute failed");
                    }
                }
            }
        }
    }
}
