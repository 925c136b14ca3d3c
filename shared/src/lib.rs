//! Shared types for the station order tracker
//!
//! Common types used by the server and dashboard clients: error codes and
//! API responses, domain models, and dashboard notification payloads.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::DashboardEvent;
