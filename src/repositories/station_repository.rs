use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::entities::{dealer, fuel_price, fuel_station};
use crate::repositories::Repository;

use super::BaseRepository;

/// Station joined with its current prices and the owning dealer's phone.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationListing {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub contact_number: Option<String>,
    pub petrol_price: Decimal,
    pub diesel_price: Decimal,
    pub cng_price: Decimal,
    pub dealer_phone: String,
}

/// `(id, name)` pair for a dealer's station picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult, ToSchema)]
pub struct StationSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSheet {
    pub petrol: Decimal,
    pub diesel: Decimal,
    pub cng: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewStation {
    pub dealer_id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub contact_number: Option<String>,
}

/// Repository for stations and their price rows
#[derive(Debug, Clone)]
pub struct StationRepository {
    base: BaseRepository,
}

impl StationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn insert_station(&self, station: NewStation) -> Result<fuel_station::Model, DbErr> {
        fuel_station::ActiveModel {
            dealer_id: Set(station.dealer_id),
            name: Set(station.name),
            address: Set(station.address),
            city: Set(station.city),
            state: Set(station.state),
            pincode: Set(station.pincode),
            contact_number: Set(station.contact_number),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await
    }

    /// Creates the all-zero price row of a new station.
    pub async fn insert_zero_prices(&self, station_id: i32) -> Result<fuel_price::Model, DbErr> {
        fuel_price::ActiveModel {
            station_id: Set(station_id),
            petrol_price: Set(Decimal::ZERO),
            diesel_price: Set(Decimal::ZERO),
            cng_price: Set(Decimal::ZERO),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await
    }

    /// Overwrites the prices of `station_id` if it belongs to `dealer_id`.
    ///
    /// Returns the number of rows changed; zero means no such station for this dealer.
    pub async fn update_prices(
        &self,
        dealer_id: i32,
        station_id: i32,
        prices: PriceSheet,
    ) -> Result<u64, DbErr> {
        let result = fuel_price::Entity::update_many()
            .col_expr(fuel_price::Column::PetrolPrice, Expr::value(prices.petrol))
            .col_expr(fuel_price::Column::DieselPrice, Expr::value(prices.diesel))
            .col_expr(fuel_price::Column::CngPrice, Expr::value(prices.cng))
            .col_expr(fuel_price::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(fuel_price::Column::StationId.eq(station_id))
            .filter(
                fuel_price::Column::StationId.in_subquery(
                    Query::select()
                        .column(fuel_station::Column::Id)
                        .from(fuel_station::Entity)
                        .and_where(fuel_station::Column::DealerId.eq(dealer_id))
                        .to_owned(),
                ),
            )
            .exec(self.base.get_db())
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn find_prices(&self, station_id: i32) -> Result<Option<fuel_price::Model>, DbErr> {
        fuel_price::Entity::find()
            .filter(fuel_price::Column::StationId.eq(station_id))
            .one(self.base.get_db())
            .await
    }

    pub async fn find_station(&self, station_id: i32) -> Result<Option<fuel_station::Model>, DbErr> {
        fuel_station::Entity::find_by_id(station_id)
            .one(self.base.get_db())
            .await
    }

    pub async fn stations_for_dealer(&self, dealer_id: i32) -> Result<Vec<StationSummary>, DbErr> {
        fuel_station::Entity::find()
            .select_only()
            .column(fuel_station::Column::Id)
            .column(fuel_station::Column::Name)
            .filter(fuel_station::Column::DealerId.eq(dealer_id))
            .order_by_asc(fuel_station::Column::Id)
            .into_model::<StationSummary>()
            .all(self.base.get_db())
            .await
    }

    /// Stations that have a price row, optionally narrowed to one exact location.
    pub async fn listings(
        &self,
        location: Option<(&str, &str, &str)>,
    ) -> Result<Vec<StationListing>, DbErr> {
        let mut query = fuel_station::Entity::find()
            .select_only()
            .column(fuel_station::Column::Id)
            .column(fuel_station::Column::Name)
            .column(fuel_station::Column::Address)
            .column(fuel_station::Column::City)
            .column(fuel_station::Column::State)
            .column(fuel_station::Column::Pincode)
            .column(fuel_station::Column::ContactNumber)
            .column(fuel_price::Column::PetrolPrice)
            .column(fuel_price::Column::DieselPrice)
            .column(fuel_price::Column::CngPrice)
            .column_as(dealer::Column::Phone, "dealer_phone")
            .join(JoinType::InnerJoin, fuel_station::Relation::FuelPrice.def())
            .join(JoinType::InnerJoin, fuel_station::Relation::Dealer.def());

        if let Some((city, state, pincode)) = location {
            query = query
                .filter(fuel_station::Column::City.eq(city))
                .filter(fuel_station::Column::State.eq(state))
                .filter(fuel_station::Column::Pincode.eq(pincode));
        }

        query
            .order_by_asc(fuel_station::Column::Id)
            .into_model::<StationListing>()
            .all(self.base.get_db())
            .await
    }
}

impl Repository for StationRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
