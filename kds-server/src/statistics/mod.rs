//! 统计
//!
//! - [`aggregator`] - 全量重算统计并原子替换聚合表
//! - [`worker`] - 有界、合并请求的后台重算工作者

pub mod aggregator;
pub mod worker;

pub use aggregator::StatsAggregator;
pub use worker::{StatsHandle, StatsWorker};
