//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared::models::{OrderDetail, OrderItemInput, PaymentMethod, PlaceOrder};

use crate::api::{AppResult, ok};
use crate::core::ServerState;
use crate::utils::ApiResponse;

/// Order placement body
///
/// `items` comes either as a JSON array or as a JSON-encoded string of one.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default, alias = "nome_cliente")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "numero_tavolo")]
    pub table_number: Option<i64>,
    #[serde(default, alias = "numero_persone")]
    pub party_size: Option<i64>,
    #[serde(alias = "metodo_pagamento")]
    pub payment_method: PaymentMethod,
    #[serde(default, alias = "asporto")]
    pub takeaway: bool,
    #[serde(default, alias = "ordine")]
    pub items: Value,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order_id: i64,
}

/// Lenient item list parsing; anything unparseable becomes an empty list
pub fn parse_items(raw: Value) -> Vec<OrderItemInput> {
    let parsed = match raw {
        Value::Null => return Vec::new(),
        Value::String(text) => serde_json::from_str::<Vec<OrderItemInput>>(&text),
        other => serde_json::from_value::<Vec<OrderItemInput>>(other),
    };
    parsed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Malformed order items, treating as empty");
        Vec::new()
    })
}

/// POST /api/orders - 下单
pub async fn place_order(
    State(state): State<ServerState>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let cmd = PlaceOrder {
        customer_name: req.customer_name.filter(|name| !name.trim().is_empty()),
        table_number: req.table_number,
        party_size: req.party_size,
        payment_method: req.payment_method,
        takeaway: req.takeaway,
        items: parse_items(req.items),
    };
    let order_id = state.workflow.place_order(cmd).await?;
    Ok(ok(OrderCreated { order_id }))
}

/// GET /api/orders/:id - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.workflow.get_order_detail(id).await?;
    Ok(ok(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_items_array() {
        let items = parse_items(json!([{"id": 1, "quantita": 2}]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_parse_items_encoded_string() {
        let items = parse_items(json!(r#"[{"product_id": 4, "quantity": 1}]"#));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, 4);
    }

    #[test]
    fn test_parse_items_garbage_is_empty() {
        assert!(parse_items(json!("not json")).is_empty());
        assert!(parse_items(json!({"id": 1})).is_empty());
        assert!(parse_items(Value::Null).is_empty());
    }

    #[test]
    fn test_request_accepts_register_field_names() {
        let req: PlaceOrderRequest = serde_json::from_value(json!({
            "nome_cliente": "Marco",
            "numero_tavolo": 4,
            "numero_persone": 3,
            "metodo_pagamento": "contanti",
            "ordine": "[]"
        }))
        .unwrap();
        assert_eq!(req.table_number, Some(4));
        assert!(req.payment_method.is_cash());
        assert!(!req.takeaway);
    }
}
