pub mod agents;
pub mod analytics;
pub mod auth;
pub mod feedback;
pub mod orders;
pub mod profiles;
pub mod stations;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    auth::AuthService,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    services::{
        accounts::AccountService, agents::AgentService, analytics::AnalyticsService,
        feedback::FeedbackService, orders::OrderService, stations::StationService,
    },
};

/// Container for the services used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub orders: Arc<OrderService>,
    pub stations: Arc<StationService>,
    pub agents: Arc<AgentService>,
    pub analytics: Arc<AnalyticsService>,
    pub feedback: Arc<FeedbackService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(db_pool.clone(), auth_service)),
            orders: Arc::new(OrderService::new(db_pool.clone(), event_sender.clone())),
            stations: Arc::new(StationService::new(db_pool.clone(), event_sender.clone())),
            agents: Arc::new(AgentService::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(db_pool.clone())),
            feedback: Arc::new(FeedbackService::new(db_pool, event_sender)),
        }
    }
}

/// JSON body extractor whose rejections use the service error envelope.
///
/// A missing or malformed body becomes a 400 `ValidationError` instead of axum's plain-text
/// rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ServiceError {
    debug!(reason = %rejection.body_text(), "rejected request body");
    ServiceError::ValidationError(rejection.body_text())
}
