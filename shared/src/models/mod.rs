//! Data models
//!
//! Shared between the station server and dashboard clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod order;
pub mod product;
pub mod station;
pub mod stats;

// Re-exports
pub use order::*;
pub use product::*;
pub use station::*;
pub use stats::*;
