//! Station API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{Station, StationView, StatusChange};

use crate::api::{AppResult, ok};
use crate::core::ServerState;
use crate::utils::ApiResponse;

/// GET /api/stations/:station - 工作站看板
pub async fn get_view(
    State(state): State<ServerState>,
    Path(station): Path<String>,
) -> AppResult<Json<ApiResponse<StationView>>> {
    let station = Station::new(&station)?;
    let view = state.workflow.get_station_view(station).await?;
    Ok(ok(view))
}

/// POST /api/stations/:station/orders/:id/advance - 推进该工作站的订单状态
pub async fn advance(
    State(state): State<ServerState>,
    Path((station, order_id)): Path<(String, i64)>,
) -> AppResult<Json<ApiResponse<StatusChange>>> {
    let station = Station::new(&station)?;
    let change = state.workflow.change_status(order_id, station).await?;
    Ok(ok(change))
}
