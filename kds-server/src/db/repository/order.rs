//! Order Repository
//!
//! Orders, their line-items and the per-station status projection.

use super::{RepoError, RepoResult};
use shared::models::{
    ItemStatus, Order, OrderDetailItem, OrderItemInput, PlaceOrder, Station, StationItemRow,
};
use sqlx::SqlitePool;

const ORDER_COLUMNS: &str = "id, customer_name, table_number, party_size, takeaway, payment_method, created_at, completed";

/// Created order and the stations its items belong to
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub stations: Vec<Station>,
}

/// Insert an order with its line-items and move stock to sold, in one transaction
///
/// Every item starts `waiting`. An order without items is vacuously completed.
pub async fn create(pool: &SqlitePool, cmd: &PlaceOrder, created_at: i64) -> RepoResult<CreatedOrder> {
    let mut tx = pool.begin().await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (customer_name, table_number, party_size, takeaway, payment_method, created_at, completed) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&cmd.customer_name)
    .bind(cmd.table_number)
    .bind(cmd.party_size)
    .bind(cmd.takeaway)
    .bind(cmd.payment_method)
    .bind(created_at)
    .bind(cmd.items.is_empty())
    .fetch_one(&mut *tx)
    .await?;

    let mut stations: Vec<Station> = Vec::new();
    for OrderItemInput { product_id, quantity } in &cmd.items {
        if *quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "Quantity for product {product_id} must be positive, got {quantity}"
            )));
        }

        let station: Station = sqlx::query_scalar(
            "UPDATE product SET stock = stock - ?1, sold = sold + ?1 WHERE id = ?2 RETURNING station",
        )
        .bind(quantity)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepoError::ProductNotFound(*product_id))?;

        sqlx::query("INSERT INTO order_item (order_id, product_id, quantity, status) VALUES (?, ?, ?, ?)")
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .bind(ItemStatus::Waiting)
            .execute(&mut *tx)
            .await?;

        if !stations.contains(&station) {
            stations.push(station);
        }
    }

    tx.commit().await?;
    Ok(CreatedOrder { order_id, stations })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Line-items of an order with product name, price and station
pub async fn find_detail_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderDetailItem>> {
    let items = sqlx::query_as::<_, OrderDetailItem>(
        "SELECT p.name, oi.quantity, p.price, p.station, oi.status \
         FROM order_item oi JOIN product p ON p.id = oi.product_id \
         WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Current status of an order's items at a station (first item wins)
pub async fn station_status(
    pool: &SqlitePool,
    order_id: i64,
    station: &Station,
) -> RepoResult<Option<ItemStatus>> {
    let status = sqlx::query_scalar::<_, ItemStatus>(
        "SELECT oi.status FROM order_item oi JOIN product p ON p.id = oi.product_id \
         WHERE oi.order_id = ? AND p.station = ? ORDER BY oi.id LIMIT 1",
    )
    .bind(order_id)
    .bind(station)
    .fetch_optional(pool)
    .await?;
    Ok(status)
}

/// Set the status of every item of an order at a station and recompute `completed`
///
/// With `expected` set, only items currently in that status are moved. Returns the
/// recomputed `completed` flag, or `None` when no item was updated.
pub async fn update_station_status(
    pool: &SqlitePool,
    order_id: i64,
    station: &Station,
    status: ItemStatus,
    expected: Option<ItemStatus>,
) -> RepoResult<Option<bool>> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE order_item SET status = ?1 \
         WHERE order_id = ?2 \
           AND product_id IN (SELECT id FROM product WHERE station = ?3) \
           AND (?4 IS NULL OR status = ?4)",
    )
    .bind(status)
    .bind(order_id)
    .bind(station)
    .bind(expected)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let completed: bool = sqlx::query_scalar(
        "UPDATE orders SET completed = \
            (SELECT COUNT(*) FROM order_item WHERE order_id = ?1 AND status != ?2) = 0 \
         WHERE id = ?1 RETURNING completed",
    )
    .bind(order_id)
    .bind(ItemStatus::Completed)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(completed))
}

/// Flat station projection rows, oldest order first
pub async fn station_rows(pool: &SqlitePool, station: &Station) -> RepoResult<Vec<StationItemRow>> {
    let rows = sqlx::query_as::<_, StationItemRow>(
        "SELECT o.id AS order_id, o.customer_name, o.table_number, o.party_size, o.created_at, \
                oi.status, p.name AS product_name, oi.quantity \
         FROM order_item oi \
         JOIN orders o ON o.id = oi.order_id \
         JOIN product p ON p.id = oi.product_id \
         WHERE p.station = ? \
         ORDER BY o.created_at ASC, o.id ASC, oi.id ASC",
    )
    .bind(station)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Delete every order and line-item
pub async fn delete_all(pool: &SqlitePool) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM order_item").execute(&mut *tx).await?;
    let deleted = sqlx::query("DELETE FROM orders")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::product;
    use shared::models::{PaymentMethod, ProductCreate};

    async fn setup() -> (SqlitePool, i64, i64) {
        let db = DbService::open_in_memory().await.unwrap();
        let spritz = product::create(&db.pool, &new_product("Spritz", "Bar")).await.unwrap();
        let pasta = product::create(&db.pool, &new_product("Gnocchi", "Cucina")).await.unwrap();
        (db.pool, spritz.id, pasta.id)
    }

    fn new_product(name: &str, station: &str) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            price: 5.0,
            stock: Some(10),
            menu_category: "Menu".into(),
            station: Station::new(station).unwrap(),
        }
    }

    fn place(items: Vec<(i64, i64)>) -> PlaceOrder {
        PlaceOrder {
            customer_name: Some("Marco".into()),
            table_number: Some(4),
            party_size: Some(2),
            payment_method: PaymentMethod::Cash,
            takeaway: false,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| OrderItemInput { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_moves_stock_and_collects_stations() {
        let (pool, spritz, pasta) = setup().await;

        let created = create(&pool, &place(vec![(spritz, 2), (pasta, 1), (spritz, 1)]), 1_000)
            .await
            .unwrap();

        let names: Vec<&str> = created.stations.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["Bar", "Cucina"]);

        let p = product::find_by_id(&pool, spritz).await.unwrap().unwrap();
        assert_eq!(p.stock, 7);
        assert_eq!(p.sold, 3);

        let order = find_by_id(&pool, created.order_id).await.unwrap().unwrap();
        assert!(!order.completed);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_create_unknown_product_rolls_back() {
        let (pool, spritz, _) = setup().await;

        let err = create(&pool, &place(vec![(spritz, 1), (999, 1)]), 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::ProductNotFound(999)));

        let p = product::find_by_id(&pool, spritz).await.unwrap().unwrap();
        assert_eq!(p.sold, 0);
        assert!(find_by_id(&pool, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_station_status_recomputes_completed() {
        let (pool, spritz, pasta) = setup().await;
        let bar = Station::new("Bar").unwrap();
        let cucina = Station::new("Cucina").unwrap();
        let id = create(&pool, &place(vec![(spritz, 1), (pasta, 1)]), 1_000)
            .await
            .unwrap()
            .order_id;

        let completed = update_station_status(&pool, id, &bar, ItemStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(completed, Some(false));

        let completed = update_station_status(&pool, id, &cucina, ItemStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(completed, Some(true));
        assert!(find_by_id(&pool, id).await.unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn test_conditional_update_skips_moved_items() {
        let (pool, spritz, _) = setup().await;
        let bar = Station::new("Bar").unwrap();
        let id = create(&pool, &place(vec![(spritz, 1)]), 1_000)
            .await
            .unwrap()
            .order_id;

        update_station_status(&pool, id, &bar, ItemStatus::Preparing, None)
            .await
            .unwrap();
        let result = update_station_status(
            &pool,
            id,
            &bar,
            ItemStatus::Completed,
            Some(ItemStatus::Ready),
        )
        .await
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(
            station_status(&pool, id, &bar).await.unwrap(),
            Some(ItemStatus::Preparing)
        );
    }

    #[tokio::test]
    async fn test_station_rows_are_scoped_to_station() {
        let (pool, spritz, pasta) = setup().await;
        create(&pool, &place(vec![(spritz, 1), (pasta, 2)]), 1_000).await.unwrap();
        create(&pool, &place(vec![(pasta, 1)]), 2_000).await.unwrap();

        let rows = station_rows(&pool, &Station::new("cucina").unwrap()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.product_name == "Gnocchi"));
        assert!(rows[0].created_at <= rows[1].created_at);

        assert_eq!(delete_all(&pool).await.unwrap(), 2);
        assert!(station_rows(&pool, &Station::new("Bar").unwrap()).await.unwrap().is_empty());
    }
}
