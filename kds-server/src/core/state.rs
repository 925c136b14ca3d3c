use std::sync::Arc;

use socketioxide::SocketIo;
use socketioxide::layer::SocketIoLayer;

use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::message::{NotificationBus, SocketIoTransport};
use crate::stations::{OrderWorkflowService, TimerRegistry};
use crate::statistics::{StatsAggregator, StatsWorker};
use crate::utils::AppResult;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 所有字段都是浅拷贝 (内部 Arc / 连接池)，可直接作为 axum State 使用。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | bus | NotificationBus | 看板刷新通知 |
/// | workflow | OrderWorkflowService | 订单工作流 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub bus: NotificationBus,
    pub workflow: OrderWorkflowService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (迁移)
    /// 2. Socket.IO 层与通知总线
    /// 3. 统计后台工作者、计时器、订单工作流
    pub async fn initialize(
        config: &Config,
        tasks: &mut BackgroundTasks,
    ) -> AppResult<(Self, SocketIoLayer)> {
        let db = DbService::new(&config.database_path).await?;

        let (layer, io) = SocketIo::new_layer();
        let bus = NotificationBus::new(config.notify_channel_capacity)
            .with_transport(Arc::new(SocketIoTransport::new(io)));

        let state = Self::assemble(config.clone(), db, bus, tasks);
        Ok((state, layer))
    }

    /// 用现成的数据库与总线组装状态 (测试也走这里)
    ///
    /// 统计工作者注册到 `tasks`，并立即请求一次重算以同步持久化的聚合表。
    pub fn assemble(
        config: Config,
        db: DbService,
        bus: NotificationBus,
        tasks: &mut BackgroundTasks,
    ) -> Self {
        let aggregator = StatsAggregator::new(db.pool.clone(), config.known_stations.clone());
        let (worker, stats) = StatsWorker::new(aggregator.clone(), config.stats_queue_capacity);
        let shutdown = tasks.shutdown_token();
        tasks.spawn("stats_worker", TaskKind::Worker, worker.run(shutdown));

        let timers = TimerRegistry::new(config.auto_complete);
        let workflow = OrderWorkflowService::new(
            db.pool.clone(),
            bus.clone(),
            timers,
            aggregator,
            stats.clone(),
        );

        stats.request();

        Self {
            config,
            db,
            bus,
            workflow,
        }
    }
}
