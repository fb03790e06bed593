//! Profile endpoints shared by the three roles; the session's kind selects the table.

use axum::{extract::State, Json};

use crate::{
    auth::AuthSession,
    handlers::ApiJson,
    repositories::actor_repository::ActorProfile,
    services::accounts::UpdateProfileRequest,
    ApiResponse, ApiResult, AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<ActorProfile> {
    let profile = state
        .services
        .accounts
        .profile(session.kind, session.user_id)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ActorProfile> {
    let profile = state
        .services
        .accounts
        .update_profile(session.kind, session.user_id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(profile, "Profile updated")))
}
