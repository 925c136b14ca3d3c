//! KDS Server - 餐厅工作站出餐看板
//!
//! # 架构概述
//!
//! 收银台下单后，订单按商品所属工作站 (Bar / Cucina / Griglia ...) 拆分，
//! 每个工作站在看板上独立推进 `waiting → preparing → ready → completed`。
//!
//! - **工作流** (`stations`): 状态机、自动完成计时器、订单工作流服务
//! - **通知** (`message`): 看板刷新推送 (进程内广播 + Socket.IO 房间)
//! - **统计** (`statistics`): 后台合并式重算，结果持久化
//! - **数据库** (`db`): SQLite (sqlx) 存储与迁移
//! - **HTTP API** (`api`): JSON 接口
//!
//! # 模块结构
//!
//! ```text
//! kds-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池与仓储函数
//! ├── message/       # 看板通知总线
//! ├── stations/      # 状态机、计时器、工作流
//! ├── statistics/    # 统计聚合与后台工作者
//! └── utils/         # 错误包装、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod message;
pub mod stations;
pub mod statistics;
pub mod utils;

// Re-export 公共类型
pub use core::{BackgroundTasks, Config, Server, ServerState};
pub use message::NotificationBus;
pub use stations::{OrderWorkflowService, TimerRegistry};
pub use statistics::StatsAggregator;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`、读取配置、初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let log_dir = config.log_dir();
    let log_dir = if config.is_development() {
        None
    } else {
        Some(log_dir.as_str())
    };
    init_logger_with_file(&config.log_level, config.log_json || config.is_production(), log_dir)?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __ __ ____  _____
   / //_// __ \/ ___/
  / ,<  / / / /\__ \
 / /| |/ /_/ /___/ /
/_/ |_/_____//____/
    "#
    );
}
