use std::time::Duration;

use shared::models::Station;

/// 默认工位 (统计表中始终保留的行)
const DEFAULT_STATIONS: &str = "Bar,Cucina,Griglia,Gnoccheria";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 |
/// | DATABASE_PATH | <WORK_DIR>/database/kds.db | SQLite 文件 |
/// | HTTP_PORT | 5001 | HTTP / Socket.IO 端口 |
/// | AUTO_COMPLETE_SECS | 10 | 出餐后自动完成的宽限时间(秒) |
/// | KNOWN_STATIONS | Bar,Cucina,Griglia,Gnoccheria | 统计表预置工位 |
/// | STATS_QUEUE_CAPACITY | 1 | 统计重算排队上限 |
/// | NOTIFY_CHANNEL_CAPACITY | 64 | 进程内订阅通道容量 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// AUTO_COMPLETE_SECS=30 HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP 服务端口
    pub http_port: u16,
    /// 自动完成宽限时间
    pub auto_complete: Duration,
    /// 预置工位
    pub known_stations: Vec<Station>,
    /// 统计重算排队上限
    pub stats_queue_capacity: usize,
    /// 进程内订阅通道容量
    pub notify_channel_capacity: usize,
    /// 日志级别
    pub log_level: String,
    /// JSON 日志
    pub log_json: bool,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{work_dir}/database/kds.db"));

        Self {
            database_path,
            http_port: env_parse("HTTP_PORT", 5001),
            auto_complete: Duration::from_secs(env_parse("AUTO_COMPLETE_SECS", 10)),
            known_stations: parse_stations(
                &std::env::var("KNOWN_STATIONS").unwrap_or_else(|_| DEFAULT_STATIONS.into()),
            ),
            stats_queue_capacity: env_parse("STATS_QUEUE_CAPACITY", 1usize).max(1),
            notify_channel_capacity: env_parse("NOTIFY_CHANNEL_CAPACITY", 64usize).max(1),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// 测试配置 (不读取环境变量)
    pub fn for_tests(auto_complete: Duration) -> Self {
        Self {
            work_dir: "./work_dir".into(),
            database_path: ":memory:".into(),
            http_port: 0,
            auto_complete,
            known_stations: parse_stations(DEFAULT_STATIONS),
            stats_queue_capacity: 1,
            notify_channel_capacity: 64,
            log_level: "debug".into(),
            log_json: false,
            environment: "test".into(),
        }
    }

    /// 日志目录 (<WORK_DIR>/logs)
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 解析逗号分隔的工位列表 (忽略空项，去重)
fn parse_stations(raw: &str) -> Vec<Station> {
    let mut stations: Vec<Station> = Vec::new();
    for station in raw.split(',').filter_map(|s| Station::new(s).ok()) {
        if !stations.contains(&station) {
            stations.push(station);
        }
    }
    stations
}
