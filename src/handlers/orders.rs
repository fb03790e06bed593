use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::{ActorKind, AuthSession},
    entities::order::{self, FuelType, OrderStatus},
    errors::ServiceError,
    handlers::ApiJson,
    repositories::order_repository::{AgentOrderRow, CustomerOrderRow, DealerOrderRow},
    services::orders::{
        AssignAgentRequest, OrderActionRequest, PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    ApiResponse, ApiResult, AppState,
};

/// Order as returned by placement and lifecycle endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i32,
    pub customer_id: i32,
    pub station_id: i32,
    pub delivery_agent_id: Option<i32>,
    pub fuel_type: FuelType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order::Model> for OrderView {
    fn from(m: order::Model) -> Self {
        Self {
            id: m.id,
            customer_id: m.customer_id,
            station_id: m.station_id,
            delivery_agent_id: m.delivery_agent_id,
            fuel_type: m.fuel_type,
            quantity: m.quantity,
            unit_price: m.unit_price,
            total_amount: m.total_amount,
            delivery_address: m.delivery_address,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn order_response(order: order::Model, message: &str) -> Json<ApiResponse<OrderView>> {
    Json(ApiResponse::with_message(order.into(), message))
}

/// Place a fuel order priced from the station's current sheet
#[utoipa::path(
    post,
    path = "/api/place-order",
    tag = "Orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderView>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No price listed for the station", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn place_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderView>>), ServiceError> {
    let session = session.require_role(ActorKind::Customer)?;
    let order = state
        .services
        .orders
        .place_order(session.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, order_response(order, "Order placed successfully")))
}

/// Accept a pending order of one of the dealer's stations
#[utoipa::path(
    post,
    path = "/api/dealer/accept-order",
    tag = "Orders",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Order accepted", body = ApiResponse<OrderView>),
        (status = 400, description = "Order is not pending", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order belongs to another dealer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn dealer_accept_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<OrderActionRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::Dealer)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .dealer_accept(session.user_id, request.order_id)
        .await?;
    Ok(order_response(order, "Order accepted"))
}

/// Reject a pending or accepted order
#[utoipa::path(
    post,
    path = "/api/dealer/reject-order",
    tag = "Orders",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderView>),
        (status = 400, description = "Order can no longer be rejected", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order belongs to another dealer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn dealer_reject_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<OrderActionRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::Dealer)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .dealer_reject(session.user_id, request.order_id)
        .await?;
    Ok(order_response(order, "Order rejected"))
}

/// Assign a delivery agent to an accepted order
#[utoipa::path(
    post,
    path = "/api/dealer/assign-delivery-boy",
    tag = "Orders",
    request_body = AssignAgentRequest,
    responses(
        (status = 200, description = "Agent assigned", body = ApiResponse<OrderView>),
        (status = 400, description = "Order is not accepted", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order belongs to another dealer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or agent not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn assign_delivery_agent(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<AssignAgentRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::Dealer)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .assign_agent(session.user_id, request.order_id, request.delivery_boy_id)
        .await?;
    Ok(order_response(order, "Delivery agent assigned"))
}

/// Take an assigned order on the road
#[utoipa::path(
    post,
    path = "/api/delivery-boy/accept-order",
    tag = "Orders",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Order in progress", body = ApiResponse<OrderView>),
        (status = 400, description = "Order is not awaiting the agent", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order is assigned to another agent", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn agent_accept_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<OrderActionRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::DeliveryAgent)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .agent_accept(session.user_id, request.order_id)
        .await?;
    Ok(order_response(order, "Order accepted for delivery"))
}

/// Hand an in-progress order back to the dealer
#[utoipa::path(
    post,
    path = "/api/delivery-boy/reject-order",
    tag = "Orders",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Order returned to accepted with no agent", body = ApiResponse<OrderView>),
        (status = 400, description = "Order is not in progress", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order is assigned to another agent", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn agent_reject_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<OrderActionRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::DeliveryAgent)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .agent_reject(session.user_id, request.order_id)
        .await?;
    Ok(order_response(order, "Order returned to dealer"))
}

/// Mark an in-progress order delivered
#[utoipa::path(
    post,
    path = "/api/delivery-boy/update-order-status",
    tag = "Orders",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order delivered", body = ApiResponse<OrderView>),
        (status = 400, description = "Unsupported target status or order not in progress", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order is assigned to another agent", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn agent_update_order_status(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<UpdateOrderStatusRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::DeliveryAgent)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .agent_update_status(session.user_id, request.order_id, &request.status)
        .await?;
    Ok(order_response(order, "Order status updated"))
}

/// Cancel one of the customer's pending orders
#[utoipa::path(
    post,
    path = "/api/customer/cancel-order",
    tag = "Orders",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderView>),
        (status = 400, description = "Order is no longer pending", body = crate::errors::ErrorResponse),
        (status = 403, description = "Order belongs to another customer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn customer_cancel_order(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<OrderActionRequest>,
) -> ApiResult<OrderView> {
    let session = session.require_role(ActorKind::Customer)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .customer_cancel(session.user_id, request.order_id)
        .await?;
    Ok(order_response(order, "Order cancelled"))
}

pub async fn customer_orders(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Vec<CustomerOrderRow>> {
    let orders = state
        .services
        .orders
        .customer_orders(session.user_id)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

pub async fn dealer_orders(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Vec<DealerOrderRow>> {
    let orders = state.services.orders.dealer_orders(session.user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

pub async fn agent_orders(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Vec<AgentOrderRow>> {
    let orders = state.services.orders.agent_orders(session.user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}
