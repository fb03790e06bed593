use crate::{
    entities::order::{self, FuelType, Model as OrderModel, OrderStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{
        actor_repository::DeliveryAgentRepository,
        order_repository::{AgentOrderRow, CustomerOrderRow, DealerOrderRow},
        OrderRepository, StationRepository,
    },
    services::{
        db_error, QUANTITY_COLUMN, TOTAL_COLUMN,
        order_status::{agent_status_target, OrderTransition, TransitionError},
    },
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn validate_quantity(quantity: &Decimal) -> Result<(), ValidationError> {
    if *quantity <= Decimal::ZERO {
        return Err(ValidationError::new("quantity_must_be_positive"));
    }
    if !QUANTITY_COLUMN.holds(quantity) {
        // At most 3 decimal places and 9 integer digits.
        return Err(ValidationError::new("quantity_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub fuel_type: FuelType,
    /// Litres, or kg for CNG
    #[validate(custom = "validate_quantity")]
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(range(min = 1))]
    pub station_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderActionRequest {
    #[validate(range(min = 1))]
    pub order_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAgentRequest {
    #[validate(range(min = 1))]
    pub order_id: i32,
    #[validate(range(min = 1))]
    pub delivery_boy_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[validate(range(min = 1))]
    pub order_id: i32,
    /// Only `delivered` is accepted
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Order placement, lifecycle transitions and per-role order listings.
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    stations: StationRepository,
    agents: DeliveryAgentRepository,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            stations: StationRepository::new(db.clone()),
            agents: DeliveryAgentRepository::new(db),
            event_sender,
        }
    }

    async fn publish(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.publish(event).await;
        }
    }

    /// Creates a `pending` order priced from the station's current price sheet.
    #[instrument(skip(self, request), fields(station_id = request.station_id, fuel_type = %request.fuel_type))]
    pub async fn place_order(
        &self,
        customer_id: i32,
        request: PlaceOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let prices = self
            .stations
            .find_prices(request.station_id)
            .await
            .map_err(db_error("Failed to look up station prices"))?
            .ok_or_else(|| {
                warn!("no price row for station");
                ServiceError::NotFound(format!(
                    "No {} price listed for station {}",
                    request.fuel_type, request.station_id
                ))
            })?;

        let unit_price = prices.price_for(request.fuel_type);
        let total_amount = unit_price
            .checked_mul(request.quantity)
            .map(|total| total.normalize())
            .filter(|total| TOTAL_COLUMN.holds(total))
            .ok_or_else(|| {
                warn!(quantity = %request.quantity, %unit_price, "order total out of range");
                ServiceError::ValidationError("Order total is too large".to_string())
            })?;
        let now = Utc::now();

        let order = self
            .orders
            .create(order::ActiveModel {
                customer_id: Set(customer_id),
                station_id: Set(request.station_id),
                delivery_agent_id: Set(None),
                fuel_type: Set(request.fuel_type),
                quantity: Set(request.quantity),
                unit_price: Set(unit_price),
                total_amount: Set(total_amount),
                delivery_address: Set(request.delivery_address),
                status: Set(OrderStatus::Pending),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .await
            .map_err(db_error("Failed to create order"))?;

        counter!("fuelhub.orders.placed", 1, "fuel_type" => order.fuel_type.to_string());
        info!(order_id = order.id, total_amount = %order.total_amount, "order placed");

        self.publish(Event::OrderPlaced {
            order_id: order.id,
            customer_id,
            station_id: order.station_id,
            fuel_type: order.fuel_type,
            total_amount: order.total_amount,
            at: now,
        })
        .await;

        Ok(order)
    }

    #[instrument(skip(self), fields(transition = %transition))]
    async fn apply(
        &self,
        transition: OrderTransition,
        actor_id: i32,
        order_id: i32,
        assignee: Option<i32>,
    ) -> Result<OrderModel, ServiceError> {
        let request = transition.request(order_id, actor_id, assignee);

        match self.orders.transition(&request).await {
            Ok(order) => {
                info!(order_id, status = %order.status, "order transition applied");
                counter!(
                    "fuelhub.orders.transition", 1,
                    "op" => transition.to_string(),
                    "outcome" => "applied"
                );
                self.publish(Event::OrderTransitioned {
                    order_id,
                    transition,
                    actor: transition.actor(),
                    actor_id,
                    status: order.status,
                    delivery_agent_id: order.delivery_agent_id,
                    at: order.updated_at,
                })
                .await;
                Ok(order)
            }
            Err(err) => {
                let outcome = match &err {
                    TransitionError::NotFound { .. } => "not_found",
                    TransitionError::NotOwner { .. } => "not_owner",
                    TransitionError::InvalidState { .. } => "invalid_state",
                    TransitionError::InvalidStatusTarget(_) => "invalid_target",
                    TransitionError::Store(e) => {
                        error!(error = %e, order_id, "order transition failed in store");
                        "store_error"
                    }
                };
                warn!(order_id, error = %err, "order transition rejected");
                counter!(
                    "fuelhub.orders.transition", 1,
                    "op" => transition.to_string(),
                    "outcome" => outcome
                );
                Err(err.into())
            }
        }
    }

    pub async fn dealer_accept(&self, dealer_id: i32, order_id: i32) -> Result<OrderModel, ServiceError> {
        self.apply(OrderTransition::DealerAccept, dealer_id, order_id, None)
            .await
    }

    pub async fn dealer_reject(&self, dealer_id: i32, order_id: i32) -> Result<OrderModel, ServiceError> {
        self.apply(OrderTransition::DealerReject, dealer_id, order_id, None)
            .await
    }

    /// Assigns (or reassigns) a delivery agent to an `accepted` order.
    pub async fn assign_agent(
        &self,
        dealer_id: i32,
        order_id: i32,
        agent_id: i32,
    ) -> Result<OrderModel, ServiceError> {
        self.agents
            .find_by_id(agent_id)
            .await
            .map_err(db_error("Failed to look up delivery agent"))?
            .ok_or_else(|| ServiceError::NotFound(format!("Delivery agent {} not found", agent_id)))?;

        self.apply(OrderTransition::AssignAgent, dealer_id, order_id, Some(agent_id))
            .await
    }

    pub async fn agent_accept(&self, agent_id: i32, order_id: i32) -> Result<OrderModel, ServiceError> {
        self.apply(OrderTransition::AgentAccept, agent_id, order_id, None)
            .await
    }

    /// Hands an `in-progress` order back to the dealer and clears the assignment.
    pub async fn agent_reject(&self, agent_id: i32, order_id: i32) -> Result<OrderModel, ServiceError> {
        self.apply(OrderTransition::AgentReject, agent_id, order_id, None)
            .await
    }

    pub async fn agent_update_status(
        &self,
        agent_id: i32,
        order_id: i32,
        status: &str,
    ) -> Result<OrderModel, ServiceError> {
        let transition = agent_status_target(status).map_err(|e| {
            warn!(order_id, requested = status, "rejected agent status target");
            ServiceError::from(e)
        })?;
        self.apply(transition, agent_id, order_id, None).await
    }

    pub async fn customer_cancel(
        &self,
        customer_id: i32,
        order_id: i32,
    ) -> Result<OrderModel, ServiceError> {
        self.apply(OrderTransition::CustomerCancel, customer_id, order_id, None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn customer_orders(&self, customer_id: i32) -> Result<Vec<CustomerOrderRow>, ServiceError> {
        self.orders
            .list_for_customer(customer_id)
            .await
            .map_err(db_error("Failed to list customer orders"))
    }

    #[instrument(skip(self))]
    pub async fn dealer_orders(&self, dealer_id: i32) -> Result<Vec<DealerOrderRow>, ServiceError> {
        self.orders
            .list_for_dealer(dealer_id)
            .await
            .map_err(db_error("Failed to list dealer orders"))
    }

    #[instrument(skip(self))]
    pub async fn agent_orders(&self, agent_id: i32) -> Result<Vec<AgentOrderRow>, ServiceError> {
        self.orders
            .list_for_agent(agent_id)
            .await
            .map_err(db_error("Failed to list delivery agent orders"))
    }
}
