use axum::{extract::State, http::header, http::StatusCode, Json};
use tracing::info;

use crate::{
    auth::{clear_session_cookie, session_cookie, AuthSession},
    errors::ServiceError,
    handlers::ApiJson,
    services::accounts::{LoginRequest, RegisterRequest, SessionGrant},
    ApiResponse, AppState,
};

type CookieHeader = [(header::HeaderName, String); 1];

/// Sign in as a dealer, customer or delivery agent
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = ApiResponse<SessionGrant>),
        (status = 400, description = "Malformed request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieHeader, Json<ApiResponse<SessionGrant>>), ServiceError> {
    let grant = state.services.accounts.login(request).await?;
    let cookie = session_cookie(&grant.token, state.auth.session_ttl());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::with_message(grant, "Login successful")),
    ))
}

/// Create an account and sign in
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; the session cookie is set", body = ApiResponse<SessionGrant>),
        (status = 400, description = "Validation failed or email already registered", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, CookieHeader, Json<ApiResponse<SessionGrant>>), ServiceError> {
    let grant = state.services.accounts.register(request).await?;
    let cookie = session_cookie(&grant.token, state.auth.session_ttl());

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::with_message(grant, "Registration successful")),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    session: AuthSession,
) -> (CookieHeader, Json<ApiResponse<()>>) {
    state.auth.revoke(&session);
    info!(user_id = session.user_id, kind = %session.kind, "session revoked");

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::with_message((), "Logged out")),
    )
}
