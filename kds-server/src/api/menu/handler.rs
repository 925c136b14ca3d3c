//! Menu API Handlers

use axum::{Json, extract::State};

use shared::models::{MenuSection, Product, ProductCreate};

use crate::api::{AppResult, ok};
use crate::core::ServerState;
use crate::utils::ApiResponse;

/// GET /api/menu - 按菜单分类分组的商品
pub async fn get_menu(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<MenuSection>>>> {
    let menu = state.workflow.get_menu().await?;
    Ok(ok(menu))
}

/// POST /api/products - 创建商品
pub async fn create_product(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.workflow.create_product(payload).await?;
    Ok(ok(product))
}
