//! 看板通知总线
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │          NotificationBus             │
//! │   publish(station) ── 尽力而为 ──┐    │
//! └──────────────────────────────────┼───┘
//!                                    │
//!                  ┌─────────────────┴───┐
//!                  │ DashboardTransport  │  ◄── 可插拔
//!                  └─────────┬───────────┘
//!                 ┌──────────┴──────────┐
//!                 ▼                     ▼
//!          MemoryTransport       SocketIoTransport
//!          (进程内订阅)           (工位房间推送)
//! ```

pub mod bus;
pub mod transport;

pub use bus::NotificationBus;
pub use shared::message::{DASHBOARD_REFRESH_EVENT, DashboardEvent, JOIN_EVENT, JoinRequest};
pub use transport::{DashboardTransport, MemoryTransport, SocketIoTransport};
