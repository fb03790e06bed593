//! FuelHub API Library
//!
//! Order management backend for a fuel-delivery marketplace: dealers own stations and set
//! prices, customers order fuel, and delivery agents carry orders to completion.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{ActorKind, AuthRouterExt, AuthService};
use crate::handlers::{agents, analytics, auth as auth_handlers, feedback, orders, profiles, stations};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every route of the service, grouped by the role allowed to call it.
pub fn api_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/register", post(auth_handlers::register))
        .route("/api/get-all-stations", get(stations::all_stations))
        .route("/api/get-stations-by-address", get(stations::stations_by_address))
        .route("/api/get-prices", get(stations::get_prices));

    let session = Router::new()
        .route("/logout", post(auth_handlers::logout))
        .with_auth();

    let customer = Router::new()
        .route("/api/place-order", post(orders::place_order))
        .route("/api/customer/cancel-order", post(orders::customer_cancel_order))
        .route("/api/customer/get-orders", get(orders::customer_orders))
        .route("/api/customer/submit-feedback", post(feedback::submit_feedback))
        .route("/api/customer/profile", get(profiles::get_profile))
        .route("/api/customer/update-profile", put(profiles::update_profile))
        .with_role(ActorKind::Customer);

    let dealer = Router::new()
        .route("/api/dealer/accept-order", post(orders::dealer_accept_order))
        .route("/api/dealer/reject-order", post(orders::dealer_reject_order))
        .route(
            "/api/dealer/assign-delivery-boy",
            post(orders::assign_delivery_agent),
        )
        .route("/api/dealer/get-orders", get(orders::dealer_orders))
        .route("/api/dealer/register-station", post(stations::register_station))
        .route("/api/dealer/update-prices", post(stations::update_prices))
        .route("/api/dealer/get-stations", get(stations::dealer_stations))
        .route(
            "/api/dealer/get-available-delivery-boys",
            get(agents::available_agents),
        )
        .route(
            "/api/dealer/get-delivery-boy-details",
            get(agents::agent_details),
        )
        .route(
            "/api/dealer/get-delivery-boy-details/:id",
            get(agents::agent_detail),
        )
        .route("/api/dealer/get-analytics", get(analytics::dealer_analytics))
        .route("/api/dealer/get-feedback", get(feedback::list_feedback))
        .route("/api/dealer/profile", get(profiles::get_profile))
        .route("/api/dealer/update-profile", put(profiles::update_profile))
        .with_role(ActorKind::Dealer);

    let delivery_agent = Router::new()
        .route("/api/delivery-boy/accept-order", post(orders::agent_accept_order))
        .route("/api/delivery-boy/reject-order", post(orders::agent_reject_order))
        .route(
            "/api/delivery-boy/update-order-status",
            post(orders::agent_update_order_status),
        )
        .route("/api/delivery-boy/get-orders", get(orders::agent_orders))
        .route("/api/delivery-boy/profile", get(profiles::get_profile))
        .route("/api/delivery-boy/update-profile", put(profiles::update_profile))
        .with_role(ActorKind::DeliveryAgent);

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .merge(public)
        .merge(session)
        .merge(customer)
        .merge(dealer)
        .merge(delivery_agent)
}

/// Full application: routes, swagger UI and the cross-cutting layers.
///
/// `main` adds CORS and compression on top; tests drive this router directly.
pub fn build_router(state: AppState) -> Router {
    let auth = state.auth.clone();

    api_routes()
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth,
            |State(auth): State<Arc<AuthService>>,
             mut req: axum::extract::Request,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "fuelhub-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
