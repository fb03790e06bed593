use axum::{extract::State, Json};

use crate::{auth::AuthSession, services::analytics::SalesSummary, ApiResponse, ApiResult, AppState};

/// Delivered revenue of the dealer's stations for today, the last 7 days and the last 30 days
#[utoipa::path(
    get,
    path = "/api/dealer/get-analytics",
    tag = "Analytics",
    responses(
        (status = 200, description = "Sales windows", body = ApiResponse<SalesSummary>),
        (status = 403, description = "Not a dealer", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn dealer_analytics(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<SalesSummary> {
    let summary = state.services.analytics.dealer_sales(session.user_id).await?;
    Ok(Json(ApiResponse::success(summary)))
}
