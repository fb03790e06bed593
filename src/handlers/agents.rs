use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    services::agents::{AgentDetails, AgentSummary},
    ApiResponse, ApiResult, AppState,
};

/// Agents free to take a new assignment
#[utoipa::path(
    get,
    path = "/api/dealer/get-available-delivery-boys",
    tag = "Delivery agents",
    responses(
        (status = 200, description = "Agents holding no accepted or in-progress order", body = ApiResponse<Vec<AgentSummary>>),
        (status = 403, description = "Not a dealer", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn available_agents(State(state): State<AppState>) -> ApiResult<Vec<AgentSummary>> {
    let agents = state.services.agents.available_agents().await?;
    Ok(Json(ApiResponse::success(agents)))
}

pub async fn agent_details(State(state): State<AppState>) -> ApiResult<Vec<AgentDetails>> {
    let agents = state.services.agents.agent_details().await?;
    Ok(Json(ApiResponse::success(agents)))
}

pub async fn agent_detail(
    State(state): State<AppState>,
    Path(agent_id): Path<i32>,
) -> ApiResult<AgentDetails> {
    let agent = state.services.agents.agent_detail(agent_id).await?;
    Ok(Json(ApiResponse::success(agent)))
}
