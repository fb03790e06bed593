use crate::{
    auth::{
        password::{hash_password, verify_password},
        ActorKind, AuthService, IssuedToken,
    },
    errors::ServiceError,
    repositories::{
        actor_repository::{ActorProfile, NewActor, PostalAddress, ProfileUpdate},
        ActorDirectory,
    },
    services::db_error,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub user_type: ActorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub user_type: ActorKind,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub user: ActorProfile,
    pub user_type: ActorKind,
    pub token: String,
    #[serde(skip)]
    pub token_id: String,
}

impl SessionGrant {
    fn new(user: ActorProfile, user_type: ActorKind, issued: IssuedToken) -> Self {
        Self {
            user,
            user_type,
            token: issued.token,
            token_id: issued.token_id,
        }
    }
}

/// Collects the four address parts of a customer; any blank part is a validation error.
fn postal_address(
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    pincode: Option<String>,
) -> Result<PostalAddress, ServiceError> {
    let part = |value: Option<String>, name: &str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("{} is required for customers", name))
            })
    };

    Ok(PostalAddress {
        address: part(address, "address")?,
        city: part(city, "city")?,
        state: part(state, "state")?,
        pincode: part(pincode, "pincode")?,
    })
}

/// Registration, login and profile management for all three account kinds.
#[derive(Clone)]
pub struct AccountService {
    directory: ActorDirectory,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self {
            directory: ActorDirectory::new(db),
            auth,
        }
    }

    #[instrument(skip(self, request), fields(user_type = %request.user_type))]
    pub async fn login(&self, request: LoginRequest) -> Result<SessionGrant, ServiceError> {
        request.validate()?;
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());

        let repo = self.directory.get(request.user_type);
        let Some(credentials) = repo
            .find_credentials(&request.email)
            .await
            .map_err(db_error("Failed to look up credentials"))?
        else {
            warn!("login for unknown email");
            return Err(invalid());
        };

        if !verify_password(&credentials.password_hash, &request.password)? {
            warn!(user_id = credentials.id, "login with wrong password");
            return Err(invalid());
        }

        let profile = repo
            .profile(credentials.id)
            .await
            .map_err(db_error("Failed to load profile"))?
            .ok_or_else(invalid)?;

        let issued = self.auth.issue_token(profile.id, request.user_type)?;
        info!(user_id = profile.id, "login succeeded");
        Ok(SessionGrant::new(profile, request.user_type, issued))
    }

    /// Creates the account and signs the caller in straight away.
    #[instrument(skip(self, request), fields(user_type = %request.user_type))]
    pub async fn register(&self, request: RegisterRequest) -> Result<SessionGrant, ServiceError> {
        request.validate()?;

        let postal = match request.user_type {
            ActorKind::Customer => Some(postal_address(
                request.address,
                request.city,
                request.state,
                request.pincode,
            )?),
            ActorKind::Dealer | ActorKind::DeliveryAgent => None,
        };

        let password_hash = hash_password(&request.password)?;
        let profile = self
            .directory
            .get(request.user_type)
            .insert(NewActor {
                name: request.name,
                email: request.email.trim().to_string(),
                password_hash,
                phone: request.phone,
                postal,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "account insert failed");
                ServiceError::from_write(e, "Email already registered")
            })?;

        let issued = self.auth.issue_token(profile.id, request.user_type)?;
        info!(user_id = profile.id, "account registered");
        Ok(SessionGrant::new(profile, request.user_type, issued))
    }

    pub async fn profile(&self, kind: ActorKind, id: i32) -> Result<ActorProfile, ServiceError> {
        self.directory
            .get(kind)
            .profile(id)
            .await
            .map_err(db_error("Failed to load profile"))?
            .ok_or_else(|| ServiceError::NotFound(format!("{} {} not found", kind, id)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        kind: ActorKind,
        id: i32,
        request: UpdateProfileRequest,
    ) -> Result<ActorProfile, ServiceError> {
        request.validate()?;

        let postal = match kind {
            ActorKind::Customer => Some(postal_address(
                request.address,
                request.city,
                request.state,
                request.pincode,
            )?),
            ActorKind::Dealer | ActorKind::DeliveryAgent => None,
        };

        self.directory
            .get(kind)
            .update_profile(
                id,
                ProfileUpdate {
                    name: request.name,
                    phone: request.phone,
                    postal,
                },
            )
            .await
            .map_err(db_error("Failed to update profile"))?
            .ok_or_else(|| ServiceError::NotFound(format!("{} {} not found", kind, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn customer_address_requires_every_part() {
        let ok = postal_address(
            Some("4 Lake View".into()),
            Some("Nagpur".into()),
            Some("MH".into()),
            Some("440001".into()),
        )
        .unwrap();
        assert_eq!(ok.city, "Nagpur");

        assert_matches!(
            postal_address(Some("4 Lake View".into()), None, Some("MH".into()), Some("440001".into())),
            Err(ServiceError::ValidationError(msg)) if msg.contains("city")
        );
        assert_matches!(
            postal_address(Some(" ".into()), Some("Nagpur".into()), Some("MH".into()), Some("1".into())),
            Err(ServiceError::ValidationError(msg)) if msg.contains("address")
        );
    }

    #[test]
    fn register_body_reads_user_type() {
        let body = serde_json::json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "secret-pass",
            "phone": "9000000001",
            "userType": "delivery_boy"
        });
        let parsed: RegisterRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.user_type, ActorKind::DeliveryAgent);
        assert!(parsed.address.is_none());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn login_rejects_malformed_email() {
        let request = LoginRequest {
            email: "not-an-email".into(),
            password: "x".into(),
            user_type: ActorKind::Dealer,
        };
        assert!(request.validate().is_err());
    }
}
