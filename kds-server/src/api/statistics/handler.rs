//! Statistics API Handlers

use axum::{Json, extract::State};

use shared::models::StatsSnapshot;

use crate::api::{AppResult, ok};
use crate::core::ServerState;
use crate::utils::{ApiResponse, ok_with_message};

/// GET /api/statistics - 最近一次持久化的统计快照
pub async fn get_stats(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<StatsSnapshot>>> {
    let snapshot = state.workflow.get_stats().await?;
    Ok(ok(snapshot))
}

/// POST /api/statistics/recompute - 同步重算统计
pub async fn recompute(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<StatsSnapshot>>> {
    let snapshot = state.workflow.recompute_stats_now().await?;
    Ok(ok_with_message(snapshot, "Statistics recomputed"))
}
