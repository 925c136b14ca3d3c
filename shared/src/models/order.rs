//! Order Model

use serde::{Deserialize, Serialize};

use super::station::{ItemStatus, PaymentMethod, Station};

/// Order header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_name: Option<String>,
    /// Null iff takeaway
    pub table_number: Option<i64>,
    /// Null iff takeaway
    pub party_size: Option<i64>,
    pub takeaway: bool,
    pub payment_method: PaymentMethod,
    /// Unix millis (UTC)
    pub created_at: i64,
    pub completed: bool,
}

/// Item entry of an order placement
///
/// Accepts the legacy cash-register field names (`id`, `quantita`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    #[serde(alias = "id")]
    pub product_id: i64,
    #[serde(alias = "quantita")]
    pub quantity: i64,
}

/// Order placement command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub customer_name: Option<String>,
    pub table_number: Option<i64>,
    pub party_size: Option<i64>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub takeaway: bool,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

impl PlaceOrder {
    /// Takeaway orders never carry table or party size
    pub fn normalized(mut self) -> Self {
        if self.takeaway {
            self.table_number = None;
            self.party_size = None;
        }
        self
    }
}

/// Line of an order detail lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderDetailItem {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub station: Station,
    pub status: ItemStatus,
}

/// Order detail: header fields plus line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub customer_name: Option<String>,
    pub table_number: Option<i64>,
    pub party_size: Option<i64>,
    pub takeaway: bool,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
    pub completed: bool,
    pub items: Vec<OrderDetailItem>,
}

impl OrderDetail {
    pub fn from_parts(order: Order, items: Vec<OrderDetailItem>) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            table_number: order.table_number,
            party_size: order.party_size,
            takeaway: order.takeaway,
            payment_method: order.payment_method,
            created_at: order.created_at,
            completed: order.completed,
            items,
        }
    }
}

/// Flat row of the station projection (one per line-item)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StationItemRow {
    pub order_id: i64,
    pub customer_name: Option<String>,
    pub table_number: Option<i64>,
    pub party_size: Option<i64>,
    pub created_at: i64,
    pub status: ItemStatus,
    pub product_name: String,
    pub quantity: i64,
}

/// Product line shown on a station card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationOrderItem {
    pub name: String,
    pub quantity: i64,
}

/// One order as seen by a station dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationOrder {
    pub id: i64,
    pub customer_name: Option<String>,
    pub table_number: Option<i64>,
    pub party_size: Option<i64>,
    pub created_at: i64,
    pub status: ItemStatus,
    pub items: Vec<StationOrderItem>,
}

/// Station dashboard projection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationView {
    pub station: Option<Station>,
    /// Non-terminal orders, oldest first
    pub pending: Vec<StationOrder>,
    /// Terminal orders, newest first
    pub completed: Vec<StationOrder>,
}

impl StationView {
    /// Group flat rows by order (rows must be sorted by creation time ascending)
    ///
    /// The status of an order card is the status of its first row; all items of
    /// one order at one station move together.
    pub fn from_rows(station: Station, rows: Vec<StationItemRow>) -> Self {
        let mut orders: Vec<StationOrder> = Vec::new();
        for row in rows {
            let item = StationOrderItem {
                name: row.product_name,
                quantity: row.quantity,
            };
            match orders.iter_mut().find(|o| o.id == row.order_id) {
                Some(order) => order.items.push(item),
                None => orders.push(StationOrder {
                    id: row.order_id,
                    customer_name: row.customer_name,
                    table_number: row.table_number,
                    party_size: row.party_size,
                    created_at: row.created_at,
                    status: row.status,
                    items: vec![item],
                }),
            }
        }

        let (mut completed, pending): (Vec<_>, Vec<_>) =
            orders.into_iter().partition(|o| o.status.is_terminal());
        completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            station: Some(station),
            pending,
            completed,
        }
    }
}

/// Result of a station status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: i64,
    pub station: Station,
    pub new_status: ItemStatus,
    pub pending: Vec<StationOrder>,
    pub completed: Vec<StationOrder>,
}
