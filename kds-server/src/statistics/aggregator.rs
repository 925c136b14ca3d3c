//! Statistics recomputation
//!
//! Aggregates are rebuilt from the order store on every run: hour rows and the
//! known stations are reseeded at zero, every order is folded in, and the result
//! replaces the previous tables inside one transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Timelike};
use rust_decimal::prelude::*;
use shared::models::{HourTotal, Station, StationTotal, StatsTotals};
use sqlx::SqlitePool;

use crate::db::repository::statistics::{self, AggregateTables, ItemStatsRow, OrderStatsRow};
use crate::utils::AppResult;

/// Monetary rounding (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    pool: SqlitePool,
    known_stations: Arc<Vec<Station>>,
}

impl StatsAggregator {
    pub fn new(pool: SqlitePool, known_stations: Vec<Station>) -> Self {
        Self {
            pool,
            known_stations: Arc::new(known_stations),
        }
    }

    /// Rebuild all aggregate tables from the current orders
    pub async fn recompute(&self) -> AppResult<AggregateTables> {
        let orders = statistics::load_orders(&self.pool).await?;
        let items = statistics::load_items(&self.pool).await?;

        let top_products = statistics::load_top_products(&self.pool).await?;

        let tables = AggregateTables {
            top_products,
            ..aggregate(&orders, &items, &self.known_stations)
        };
        statistics::replace(&self.pool, &tables, shared::util::now_millis()).await?;

        tracing::debug!(
            orders = tables.totals.total_orders,
            revenue = tables.totals.total_revenue,
            "Statistics recomputed"
        );
        Ok(tables)
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Hour of day (UTC) of a millisecond timestamp
fn hour_of(created_at: i64) -> usize {
    DateTime::from_timestamp_millis(created_at)
        .map(|t| t.hour() as usize)
        .unwrap_or(0)
}

/// Fold orders and their items into fresh aggregate tables
pub fn aggregate(
    orders: &[OrderStatsRow],
    items: &[ItemStatsRow],
    known_stations: &[Station],
) -> AggregateTables {
    let mut per_hour = [0i64; 24];
    let mut per_station: BTreeMap<Station, i64> =
        known_stations.iter().map(|s| (s.clone(), 0)).collect();

    let mut revenue_by_order: BTreeMap<i64, Decimal> = BTreeMap::new();
    for item in items {
        *revenue_by_order.entry(item.order_id).or_default() +=
            to_decimal(item.price) * Decimal::from(item.quantity);
        *per_station.entry(item.station.clone()).or_default() += item.quantity;
    }

    let mut total = Decimal::ZERO;
    let mut cash = Decimal::ZERO;
    let mut card = Decimal::ZERO;
    let mut completed_orders = 0;

    for order in orders {
        let revenue = revenue_by_order.get(&order.id).copied().unwrap_or_default();
        total += revenue;
        if order.payment_method.is_cash() {
            cash += revenue;
        } else {
            card += revenue;
        }
        if order.completed {
            completed_orders += 1;
        }
        per_hour[hour_of(order.created_at)] += 1;
    }

    AggregateTables {
        totals: StatsTotals {
            total_orders: orders.len() as i64,
            completed_orders,
            total_revenue: to_f64(total),
            cash_revenue: to_f64(cash),
            card_revenue: to_f64(card),
        },
        per_station: per_station
            .into_iter()
            .map(|(station, total)| StationTotal { station, total })
            .collect(),
        per_hour: per_hour
            .into_iter()
            .enumerate()
            .map(|(hour, total)| HourTotal {
                hour: hour as i64,
                total,
            })
            .collect(),
        top_products: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentMethod;

    // 2024-05-01T13:15:00Z
    const ONE_PM: i64 = 1_714_569_300_000;

    fn station(name: &str) -> Station {
        Station::new(name).unwrap()
    }

    fn order(id: i64, payment_method: PaymentMethod, completed: bool) -> OrderStatsRow {
        OrderStatsRow {
            id,
            payment_method,
            created_at: ONE_PM,
            completed,
        }
    }

    fn item(order_id: i64, quantity: i64, price: f64, name: &str) -> ItemStatsRow {
        ItemStatsRow {
            order_id,
            quantity,
            price,
            station: station(name),
        }
    }

    #[test]
    fn test_cash_card_split() {
        let orders = vec![
            order(1, PaymentMethod::Cash, true),
            order(2, PaymentMethod::Card, false),
        ];
        let items = vec![
            item(1, 2, 10.0, "Bar"),
            item(2, 1, 15.0, "Cucina"),
        ];

        let tables = aggregate(&orders, &items, &[station("Bar"), station("Cucina")]);

        assert_eq!(tables.totals.total_orders, 2);
        assert_eq!(tables.totals.completed_orders, 1);
        assert_eq!(tables.totals.total_revenue, 35.0);
        assert_eq!(tables.totals.cash_revenue, 20.0);
        assert_eq!(tables.totals.card_revenue, 15.0);
    }

    #[test]
    fn test_decimal_sum_has_no_float_drift() {
        let orders = vec![order(1, PaymentMethod::Card, false)];
        let items = vec![item(1, 3, 0.1, "Bar"), item(1, 1, 0.2, "Bar")];

        let tables = aggregate(&orders, &items, &[]);
        assert_eq!(tables.totals.total_revenue, 0.5);
    }

    #[test]
    fn test_reseeds_hours_and_known_stations() {
        let tables = aggregate(&[order(1, PaymentMethod::Cash, false)], &[], &[station("Bar"), station("Griglia")]);

        assert_eq!(tables.per_hour.len(), 24);
        assert_eq!(tables.per_hour[13].total, 1);
        assert_eq!(tables.per_hour.iter().map(|h| h.total).sum::<i64>(), 1);
        assert_eq!(tables.per_station.len(), 2);
        assert!(tables.per_station.iter().all(|s| s.total == 0));
    }

    #[test]
    fn test_unknown_station_gets_a_row() {
        let orders = vec![order(1, PaymentMethod::Cash, false)];
        let items = vec![item(1, 4, 2.0, "Pizzeria"), item(1, 1, 2.0, "Bar")];

        let tables = aggregate(&orders, &items, &[station("Bar")]);
        let pizzeria = tables
            .per_station
            .iter()
            .find(|s| s.station.as_str() == "Pizzeria")
            .unwrap();
        assert_eq!(pizzeria.total, 4);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let orders = vec![order(1, PaymentMethod::Cash, false), order(2, PaymentMethod::Card, true)];
        let items = vec![item(1, 1, 4.5, "Bar"), item(2, 2, 7.25, "Cucina")];
        let known = [station("Bar")];

        assert_eq!(aggregate(&orders, &items, &known), aggregate(&orders, &items, &known));
    }
}
