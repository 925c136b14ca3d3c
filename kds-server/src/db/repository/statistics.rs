//! Statistics Repository
//!
//! Raw inputs for recomputation and the persisted aggregate tables
//! (`stats_totals`, `stats_station`, `stats_hour`, `stats_top_product`).

use super::RepoResult;
use shared::models::{
    HourTotal, PaymentMethod, Station, StationTotal, StatsSnapshot, StatsTotals, TopProduct,
};
use sqlx::SqlitePool;

/// Number of products in the best-seller list
const TOP_PRODUCTS_LIMIT: i64 = 10;

/// Order fields relevant to statistics
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderStatsRow {
    pub id: i64,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
    pub completed: bool,
}

/// Line-item joined with its product's price and station
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemStatsRow {
    pub order_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub station: Station,
}

/// Full replacement content of the aggregate tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTables {
    pub totals: StatsTotals,
    pub per_station: Vec<StationTotal>,
    pub per_hour: Vec<HourTotal>,
    pub top_products: Vec<TopProduct>,
}

pub async fn load_orders(pool: &SqlitePool) -> RepoResult<Vec<OrderStatsRow>> {
    let rows = sqlx::query_as::<_, OrderStatsRow>(
        "SELECT id, payment_method, created_at, completed FROM orders ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn load_items(pool: &SqlitePool) -> RepoResult<Vec<ItemStatsRow>> {
    let rows = sqlx::query_as::<_, ItemStatsRow>(
        "SELECT oi.order_id, oi.quantity, p.price, p.station \
         FROM order_item oi JOIN product p ON p.id = oi.product_id ORDER BY oi.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current best sellers by cumulative sold count
pub async fn load_top_products(pool: &SqlitePool) -> RepoResult<Vec<TopProduct>> {
    let rows = sqlx::query_as::<_, TopProduct>(
        "SELECT name, sold FROM product ORDER BY sold DESC, id ASC LIMIT ?",
    )
    .bind(TOP_PRODUCTS_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace all aggregate tables in one transaction
pub async fn replace(pool: &SqlitePool, tables: &AggregateTables, updated_at: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM stats_totals").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM stats_station").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM stats_hour").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM stats_top_product").execute(&mut *tx).await?;

    let totals = &tables.totals;
    sqlx::query(
        "INSERT INTO stats_totals (id, total_orders, completed_orders, total_revenue, cash_revenue, card_revenue, updated_at) \
         VALUES (1, ?, ?, ?, ?, ?, ?)",
    )
    .bind(totals.total_orders)
    .bind(totals.completed_orders)
    .bind(totals.total_revenue)
    .bind(totals.cash_revenue)
    .bind(totals.card_revenue)
    .bind(updated_at)
    .execute(&mut *tx)
    .await?;

    for row in &tables.per_station {
        sqlx::query("INSERT INTO stats_station (station, total) VALUES (?, ?)")
            .bind(&row.station)
            .bind(row.total)
            .execute(&mut *tx)
            .await?;
    }

    for row in &tables.per_hour {
        sqlx::query("INSERT INTO stats_hour (hour, total) VALUES (?, ?)")
            .bind(row.hour)
            .bind(row.total)
            .execute(&mut *tx)
            .await?;
    }

    for (position, row) in tables.top_products.iter().enumerate() {
        sqlx::query("INSERT INTO stats_top_product (position, name, sold) VALUES (?, ?, ?)")
            .bind(position as i64)
            .bind(&row.name)
            .bind(row.sold)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Read the persisted aggregates of the last recomputation
///
/// Before the first recomputation the totals read as zero and the tables are empty.
pub async fn load_snapshot(pool: &SqlitePool) -> RepoResult<StatsSnapshot> {
    let totals = sqlx::query_as::<_, StatsTotals>(
        "SELECT total_orders, completed_orders, total_revenue, cash_revenue, card_revenue \
         FROM stats_totals WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?
    .unwrap_or_default();

    let per_station = sqlx::query_as::<_, StationTotal>(
        "SELECT station, total FROM stats_station ORDER BY station",
    )
    .fetch_all(pool)
    .await?;

    let per_hour = sqlx::query_as::<_, HourTotal>("SELECT hour, total FROM stats_hour ORDER BY hour")
        .fetch_all(pool)
        .await?;

    let top_products = sqlx::query_as::<_, TopProduct>(
        "SELECT name, sold FROM stats_top_product ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    Ok(StatsSnapshot {
        totals,
        per_station,
        per_hour,
        top_products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::product;
    use shared::models::ProductCreate;

    fn tables(total_orders: i64) -> AggregateTables {
        AggregateTables {
            totals: StatsTotals {
                total_orders,
                completed_orders: 0,
                total_revenue: 12.5,
                cash_revenue: 12.5,
                card_revenue: 0.0,
            },
            per_station: vec![StationTotal {
                station: Station::new("Bar").unwrap(),
                total: 3,
            }],
            per_hour: (0..24).map(|hour| HourTotal { hour, total: 0 }).collect(),
            top_products: vec![TopProduct {
                name: "Spritz".into(),
                sold: total_orders,
            }],
        }
    }

    #[tokio::test]
    async fn test_snapshot_defaults_before_first_run() {
        let db = DbService::open_in_memory().await.unwrap();
        let snapshot = load_snapshot(&db.pool).await.unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_aggregate() {
        let db = DbService::open_in_memory().await.unwrap();
        replace(&db.pool, &tables(1), 10).await.unwrap();
        replace(&db.pool, &tables(2), 20).await.unwrap();

        let snapshot = load_snapshot(&db.pool).await.unwrap();
        assert_eq!(snapshot.totals.total_orders, 2);
        assert_eq!(snapshot.per_station.len(), 1);
        assert_eq!(snapshot.per_hour.len(), 24);
    }

    #[tokio::test]
    async fn test_snapshot_top_products_come_from_last_recompute() {
        let db = DbService::open_in_memory().await.unwrap();
        let spritz = product::create(
            &db.pool,
            &ProductCreate {
                name: "Spritz".into(),
                price: 5.0,
                stock: None,
                menu_category: "Bevande".into(),
                station: Station::new("Bar").unwrap(),
            },
        )
        .await
        .unwrap();
        sqlx::query("UPDATE product SET sold = 2 WHERE id = ?")
            .bind(spritz.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let mut captured = tables(1);
        captured.top_products = load_top_products(&db.pool).await.unwrap();
        replace(&db.pool, &captured, 10).await.unwrap();

        // Sales after the recompute stay out of the snapshot until the next one
        sqlx::query("UPDATE product SET sold = 9 WHERE id = ?")
            .bind(spritz.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let snapshot = load_snapshot(&db.pool).await.unwrap();
        assert_eq!(snapshot.top_products.len(), 1);
        assert_eq!(snapshot.top_products[0].name, "Spritz");
        assert_eq!(snapshot.top_products[0].sold, 2);
    }
}
