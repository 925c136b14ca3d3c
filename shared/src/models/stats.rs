//! Statistics Model
//!
//! Aggregates are rebuilt wholesale on every recomputation; nothing here is
//! updated incrementally.

use serde::{Deserialize, Serialize};

use super::station::Station;

/// Summary row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatsTotals {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub total_revenue: f64,
    pub cash_revenue: f64,
    pub card_revenue: f64,
}

/// Quantity prepared per station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StationTotal {
    pub station: Station,
    pub total: i64,
}

/// Orders placed per hour of day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HourTotal {
    pub hour: i64,
    pub total: i64,
}

/// Best-selling product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub name: String,
    pub sold: i64,
}

/// Latest statistics projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub totals: StatsTotals,
    pub per_station: Vec<StationTotal>,
    pub per_hour: Vec<HourTotal>,
    pub top_products: Vec<TopProduct>,
}
