use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::entities::{
    customer, delivery_agent, fuel_station,
    order::{
        self, ActiveModel as OrderActiveModel, Column, Entity as Order, FuelType,
        Model as OrderModel, OrderStatus, Relation,
    },
};
use crate::repositories::Repository;
use crate::services::order_status::{AgentChange, Ownership, TransitionError, TransitionRequest};

use super::BaseRepository;

/// Order as listed to its customer.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrderRow {
    pub id: i32,
    pub station_id: i32,
    pub delivery_agent_id: Option<i32>,
    pub fuel_type: FuelType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub station_name: String,
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
}

/// Order as listed to the dealer owning its station.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealerOrderRow {
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
    pub customer_name: String,
    pub station_name: String,
    pub delivery_agent_name: Option<String>,
}

/// Order as listed to its assigned delivery agent.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentOrderRow {
    pub id: i32,
    pub customer_id: i32,
    pub station_id: i32,
    pub fuel_type: FuelType,
    pub quantity: Decimal,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub station_name: String,
    pub station_address: String,
}

/// A delivered order's contribution to dealer revenue.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct SaleRow {
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One order as seen by the delivery statistics.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct AssignmentRow {
    pub delivery_agent_id: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

fn status_values(statuses: &[OrderStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.into_value()).collect()
}

/// Repository for order operations
#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, DbErr> {
        Order::find_by_id(id).one(self.base.get_db()).await
    }

    /// Create a new order
    pub async fn create(&self, order: OrderActiveModel) -> Result<OrderModel, DbErr> {
        order.insert(self.base.get_db()).await
    }

    /// Compare-and-swap on the order's status.
    ///
    /// Issues a single conditional UPDATE whose predicate carries both the allowed current
    /// statuses and the ownership check. When nothing matched, the row is re-read so the
    /// caller learns whether the order is missing, owned by someone else, or in the wrong
    /// state.
    pub async fn transition(&self, req: &TransitionRequest) -> Result<OrderModel, TransitionError> {
        let db = self.base.get_db();

        let mut update = Order::update_many()
            .col_expr(Column::Status, Expr::value(req.to.into_value()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()));

        update = match req.agent {
            AgentChange::Keep => update,
            AgentChange::Set(agent_id) => {
                update.col_expr(Column::DeliveryAgentId, Expr::value(Some(agent_id)))
            }
            AgentChange::Clear => {
                update.col_expr(Column::DeliveryAgentId, Expr::value(Option::<i32>::None))
            }
        };

        let update = update
            .filter(Column::Id.eq(req.order_id))
            .filter(Column::Status.is_in(status_values(&req.from)));

        let update = match req.owner {
            Ownership::Customer(customer_id) => update.filter(Column::CustomerId.eq(customer_id)),
            Ownership::AssignedAgent(agent_id) => {
                update.filter(Column::DeliveryAgentId.eq(agent_id))
            }
            Ownership::StationDealer(dealer_id) => update.filter(
                Column::StationId.in_subquery(
                    Query::select()
                        .column(fuel_station::Column::Id)
                        .from(fuel_station::Entity)
                        .and_where(fuel_station::Column::DealerId.eq(dealer_id))
                        .to_owned(),
                ),
            ),
        };

        // SQLite and Postgres both support RETURNING, so the applied row comes back with the update.
        match update.exec_with_returning(db).await?.into_iter().next() {
            Some(order) => Ok(order),
            None => Err(self.explain_rejection(req).await?),
        }
    }

    /// Works out why a guarded update matched no rows.
    async fn explain_rejection(&self, req: &TransitionRequest) -> Result<TransitionError, DbErr> {
        let Some(order) = self.find_by_id(req.order_id).await? else {
            return Ok(TransitionError::NotFound {
                order_id: req.order_id,
            });
        };

        let owned = match req.owner {
            Ownership::Customer(customer_id) => order.customer_id == customer_id,
            Ownership::AssignedAgent(agent_id) => order.delivery_agent_id == Some(agent_id),
            Ownership::StationDealer(dealer_id) => fuel_station::Entity::find_by_id(order.station_id)
                .one(self.base.get_db())
                .await?
                .is_some_and(|station| station.dealer_id == dealer_id),
        };

        if !owned {
            return Ok(TransitionError::NotOwner {
                order_id: req.order_id,
            });
        }

        Ok(TransitionError::InvalidState {
            order_id: req.order_id,
            current: order.status,
            expected: req.from.clone(),
        })
    }

    /// Orders placed by a customer, newest first.
    pub async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<CustomerOrderRow>, DbErr> {
        Order::find()
            .column_as(fuel_station::Column::Name, "station_name")
            .column_as(delivery_agent::Column::Name, "delivery_agent_name")
            .column_as(delivery_agent::Column::Phone, "delivery_agent_phone")
            .join(JoinType::InnerJoin, Relation::FuelStation.def())
            .join(JoinType::LeftJoin, Relation::DeliveryAgent.def())
            .filter(Column::CustomerId.eq(customer_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .into_model::<CustomerOrderRow>()
            .all(self.base.get_db())
            .await
    }

    /// Orders placed at any station of the dealer, newest first.
    pub async fn list_for_dealer(&self, dealer_id: i32) -> Result<Vec<DealerOrderRow>, DbErr> {
        Order::find()
            .column_as(customer::Column::Name, "customer_name")
            .column_as(fuel_station::Column::Name, "station_name")
            .column_as(delivery_agent::Column::Name, "delivery_agent_name")
            .join(JoinType::InnerJoin, Relation::Customer.def())
            .join(JoinType::InnerJoin, Relation::FuelStation.def())
            .join(JoinType::LeftJoin, Relation::DeliveryAgent.def())
            .filter(fuel_station::Column::DealerId.eq(dealer_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .into_model::<DealerOrderRow>()
            .all(self.base.get_db())
            .await
    }

    /// Orders currently or formerly assigned to an agent, newest first.
    pub async fn list_for_agent(&self, agent_id: i32) -> Result<Vec<AgentOrderRow>, DbErr> {
        let visible = [
            OrderStatus::Accepted,
            OrderStatus::InProgress,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];

        Order::find()
            .column_as(customer::Column::Name, "customer_name")
            .column_as(customer::Column::Phone, "customer_phone")
            .column_as(fuel_station::Column::Name, "station_name")
            .column_as(fuel_station::Column::Address, "station_address")
            .join(JoinType::InnerJoin, Relation::Customer.def())
            .join(JoinType::InnerJoin, Relation::FuelStation.def())
            .filter(Column::DeliveryAgentId.eq(agent_id))
            .filter(Column::Status.is_in(status_values(&visible)))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .into_model::<AgentOrderRow>()
            .all(self.base.get_db())
            .await
    }

    /// Delivered orders of the dealer's stations created at or after `since`.
    pub async fn delivered_sales_for_dealer(
        &self,
        dealer_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<SaleRow>, DbErr> {
        Order::find()
            .select_only()
            .column(Column::TotalAmount)
            .column(Column::CreatedAt)
            .join(JoinType::InnerJoin, Relation::FuelStation.def())
            .filter(fuel_station::Column::DealerId.eq(dealer_id))
            .filter(Column::Status.eq(OrderStatus::Delivered.into_value()))
            .filter(Column::CreatedAt.gte(since))
            .into_model::<SaleRow>()
            .all(self.base.get_db())
            .await
    }

    /// Every order that currently references a delivery agent.
    ///
    /// Pass `Some(id)` to restrict the scan to one agent.
    pub async fn assignments(&self, agent_id: Option<i32>) -> Result<Vec<AssignmentRow>, DbErr> {
        let mut query = Order::find()
            .select_only()
            .column(Column::DeliveryAgentId)
            .column(Column::Status)
            .column(Column::CreatedAt)
            .filter(Column::DeliveryAgentId.is_not_null());

        if let Some(agent_id) = agent_id {
            query = query.filter(Column::DeliveryAgentId.eq(agent_id));
        }

        query
            .into_model::<AssignmentRow>()
            .all(self.base.get_db())
            .await
    }

    /// Subquery yielding the ids of agents holding an `accepted` or `in-progress` order.
    pub fn busy_agent_ids() -> sea_orm::sea_query::SelectStatement {
        Query::select()
            .column(order::Column::DeliveryAgentId)
            .from(order::Entity)
            .and_where(order::Column::DeliveryAgentId.is_not_null())
            .and_where(order::Column::Status.is_in(status_values(&OrderStatus::active())))
            .to_owned()
    }
}

impl Repository for OrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
