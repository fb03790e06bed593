use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::AuthSession,
    errors::ServiceError,
    handlers::ApiJson,
    repositories::feedback_repository::FeedbackRow,
    services::feedback::SubmitFeedbackRequest,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReceipt {
    pub id: i32,
    pub created_at: DateTime<Utc>,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackReceipt>>), ServiceError> {
    let entry = state
        .services
        .feedback
        .submit(session.user_id, request)
        .await?;
    let receipt = FeedbackReceipt {
        id: entry.id,
        created_at: entry.created_at,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(receipt, "Feedback submitted")),
    ))
}

pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Vec<FeedbackRow>> {
    let feedback = state.services.feedback.list().await?;
    Ok(Json(ApiResponse::success(feedback)))
}
