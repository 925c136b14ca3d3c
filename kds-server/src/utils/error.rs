//! 统一错误处理
//!
//! 错误类型统一来自 `shared::error`，本模块只提供处理器常用的响应包装。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::new(ErrorCode::OrderNotFound))
//!
//! // 返回成功响应
//! Ok(ok(detail))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 包装成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// 包装带消息的成功响应
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
