use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a fuel order.
///
/// `pending -> accepted -> in-progress -> delivered`, with `cancelled` reachable from
/// `pending` (customer) and `accepted` (dealer). Agent rejection moves `in-progress`
/// back to `accepted`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses during which the assigned agent counts as busy.
    pub fn active() -> [OrderStatus; 2] {
        [OrderStatus::Accepted, OrderStatus::InProgress]
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FuelType {
    #[sea_orm(string_value = "petrol")]
    Petrol,
    #[sea_orm(string_value = "diesel")]
    Diesel,
    #[sea_orm(string_value = "cng")]
    Cng,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: i32,
    pub station_id: i32,
    pub delivery_agent_id: Option<i32>,
    pub fuel_type: FuelType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Fixed at creation as `unit_price * quantity`.
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub delivery_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::fuel_station::Entity",
        from = "Column::StationId",
        to = "super::fuel_station::Column::Id"
    )]
    FuelStation,
    #[sea_orm(
        belongs_to = "super::delivery_agent::Entity",
        from = "Column::DeliveryAgentId",
        to = "super::delivery_agent::Column::Id"
    )]
    DeliveryAgent,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::fuel_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FuelStation.def()
    }
}

impl Related<super::delivery_agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryAgent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
