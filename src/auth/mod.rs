/*!
 * # Session authentication
 *
 * Sessions are HS256 JWTs carrying the account id and its [`ActorKind`]. A token is
 * accepted from `Authorization: Bearer <token>` or from the `session` cookie set at
 * login. Logout records the token id in an in-memory revocation list until the token
 * would have expired anyway.
 *
 * Route groups opt in with [`AuthRouterExt::with_auth`] / [`AuthRouterExt::with_role`];
 * handlers then extract the [`AuthSession`] context.
 */

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::AppConfig, errors::ServiceError};

mod guard;
pub mod password;
mod types;

pub use guard::*;
pub use types::*;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Claim structure for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // Account id
    pub user_type: ActorKind,  // Which table `sub` refers to
    pub jti: String,           // Token id, used for revocation
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub session_ttl: Duration,
}

impl From<&AppConfig> for AuthConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            jwt_audience: config.auth_audience.clone(),
            session_ttl: Duration::from_secs(config.session_ttl_secs),
        }
    }
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, validates and revokes session tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
    revoked: Arc<DashMap<String, i64>>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            revoked: Arc::new(DashMap::new()),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.config.session_ttl
    }

    /// Signs a session token for `user_id` of the given kind.
    pub fn issue_token(&self, user_id: i32, kind: ActorKind) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.config.session_ttl)
            .map_err(|_| AuthError::InternalError("Invalid session duration".to_string()))?;
        let expires_at = now + ttl;
        let token_id = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            user_type: kind,
            jti: token_id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(IssuedToken {
            token,
            token_id,
            expires_at,
        })
    }

    /// Validate a token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_revoked(&claims.jti) {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Validates a token and turns it into the request-scoped session.
    pub fn authenticate(&self, token: &str) -> Result<AuthSession, AuthError> {
        let claims = self.validate_token(token)?;
        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthSession {
            user_id,
            kind: claims.user_type,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Revokes the token behind `session` until its natural expiry.
    pub fn revoke(&self, session: &AuthSession) {
        let now = Utc::now().timestamp();
        self.revoked
            .insert(session.token_id.clone(), session.expires_at.timestamp());
        self.revoked.retain(|_, exp| *exp > now);
        debug!(token_id = %session.token_id, "session revoked");
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked.contains_key(token_id)
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::RevokedToken => ServiceError::Unauthorized(err.to_string()),
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) | AuthError::InternalError(msg) => {
                ServiceError::InternalError(msg)
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// Role middleware to check that the session belongs to the required role
pub async fn role_middleware(
    State(required): State<ActorKind>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let session = request
        .extensions()
        .get::<AuthSession>()
        .ok_or(AuthError::MissingAuth)?;

    if session.kind != required {
        warn!(
            user_id = session.user_id,
            held = %session.kind,
            required = %required,
            "role check failed"
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates the session token
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    let session = match extract_token(request.headers()) {
        Some(token) => match auth_service.authenticate(&token) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "rejected session token");
                return e.into_response();
            }
        },
        None => None,
    };

    match require_authenticated(session) {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Reads the session token from the bearer header, falling back to the cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string())
    })
}

/// `Set-Cookie` value that stores `token` for `ttl`.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: ActorKind) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: ActorKind) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "k3Y9vQ2mT8xL4pZ7rW1nB6cF0hJ5sD3gA9eU2iO8yR4tE7wQ1zX6vC0bN5mK8jH2"
                .to_string(),
            jwt_issuer: "fuelhub-api".to_string(),
            jwt_audience: "fuelhub-session".to_string(),
            session_ttl: Duration::from_secs(3600),
        })
    }

    #[test]
    fn issued_token_authenticates_as_same_actor() {
        let auth = service();
        let issued = auth.issue_token(42, ActorKind::DeliveryAgent).unwrap();
        let session = auth.authenticate(&issued.token).unwrap();
        assert_eq!(session.user_id, 42);
        assert_eq!(session.kind, ActorKind::DeliveryAgent);
        assert_eq!(session.token_id, issued.token_id);
    }

    #[test]
    fn revoked_token_is_rejected() {
        let auth = service();
        let issued = auth.issue_token(1, ActorKind::Customer).unwrap();
        let session = auth.authenticate(&issued.token).unwrap();
        auth.revoke(&session);
        assert_matches!(auth.authenticate(&issued.token), Err(AuthError::RevokedToken));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issued = service().issue_token(1, ActorKind::Dealer).unwrap();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "Z".repeat(32) + &"y7".repeat(16),
            ..service().config
        });
        assert_matches!(other.authenticate(&issued.token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_for_other_audience_is_invalid() {
        let issued = service().issue_token(1, ActorKind::Dealer).unwrap();
        let other = AuthService::new(AuthConfig {
            jwt_audience: "someone-else".to_string(),
            ..service().config
        });
        assert_matches!(other.authenticate(&issued.token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok123; lang=en"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("tok123"));

        let mut cleared = HeaderMap::new();
        cleared.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(extract_token(&cleared), None);
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        use axum::http::StatusCode;
        assert_eq!(
            ServiceError::from(AuthError::RevokedToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::from(AuthError::InsufficientPermissions).status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
