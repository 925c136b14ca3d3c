//! 工位订单流转
//!
//! - [`lifecycle`] - 状态机 (纯逻辑，不访问存储)
//! - [`timers`] - 出餐后自动完成计时器
//! - [`workflow`] - 编排：状态机 → 存储 → 计时器 → 通知 → 统计

pub mod lifecycle;
pub mod timers;
pub mod workflow;

pub use lifecycle::{LifecycleError, TimerAction, Transition};
pub use timers::{TimerKey, TimerRegistry};
pub use workflow::OrderWorkflowService;
