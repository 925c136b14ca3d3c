//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, Station};
use sqlx::SqlitePool;

/// Stock assigned to new products and restored by a data reset
pub const DEFAULT_STOCK: i64 = 100;

const PRODUCT_COLUMNS: &str = "id, name, price, stock, sold, menu_category, station";

/// All products in catalog (insertion) order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product =
        sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: &ProductCreate) -> RepoResult<Product> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, price, stock, sold, menu_category, station) \
         VALUES (?, ?, ?, 0, ?, ?) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.price)
    .bind(data.stock.unwrap_or(DEFAULT_STOCK))
    .bind(data.menu_category.trim())
    .bind(&data.station)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Distinct stations owning at least one product
pub async fn stations(pool: &SqlitePool) -> RepoResult<Vec<Station>> {
    let stations = sqlx::query_scalar::<_, Station>("SELECT DISTINCT station FROM product ORDER BY station")
        .fetch_all(pool)
        .await?;
    Ok(stations)
}

/// Restore every product to `stock` on hand and zero sold
pub async fn reset_inventory(pool: &SqlitePool, stock: i64) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE product SET stock = ?, sold = 0")
        .bind(stock)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows)
}
