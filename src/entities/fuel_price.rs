use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::order::FuelType;

/// Current per-unit prices of one station.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fuel_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub station_id: i32,
    pub petrol_price: Decimal,
    pub diesel_price: Decimal,
    pub cng_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn price_for(&self, fuel_type: FuelType) -> Decimal {
        match fuel_type {
            FuelType::Petrol => self.petrol_price,
            FuelType::Diesel => self.diesel_price,
            FuelType::Cng => self.cng_price,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fuel_station::Entity",
        from = "Column::StationId",
        to = "super::fuel_station::Column::Id"
    )]
    FuelStation,
}

impl Related<super::fuel_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FuelStation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
