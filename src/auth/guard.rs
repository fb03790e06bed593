use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};

use super::{ActorKind, AuthError};
use crate::errors::ServiceError;

/// Request-scoped session context, inserted by `auth_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: i32,
    pub kind: ActorKind,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Fails with `Forbidden` when the session belongs to another role.
    pub fn require_role(&self, expected: ActorKind) -> Result<&Self, ServiceError> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(ServiceError::Forbidden(format!(
                "Access denied: {} role required",
                expected.as_str()
            )))
        }
    }
}

/// Fails with `Unauthorized` when no session could be established for the request.
pub fn require_authenticated(session: Option<AuthSession>) -> Result<AuthSession, ServiceError> {
    session.ok_or_else(|| ServiceError::Unauthorized("Not authenticated".to_string()))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}
