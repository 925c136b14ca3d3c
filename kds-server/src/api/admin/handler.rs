use axum::{Json, extract::State};

use shared::models::StatsSnapshot;

use crate::api::AppResult;
use crate::core::ServerState;
use crate::utils::{ApiResponse, ok_with_message};

/// POST /api/admin/reset
pub async fn reset(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<StatsSnapshot>>> {
    let snapshot = state.workflow.reset_data().await?;
    Ok(ok_with_message(snapshot, "All order data reset"))
}
