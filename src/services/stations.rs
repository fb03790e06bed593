use crate::{
    entities::{fuel_price, fuel_station},
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{
        station_repository::{NewStation, PriceSheet, StationListing, StationSummary},
        StationRepository,
    },
    services::{db_error, PRICE_COLUMN},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("price_must_not_be_negative"));
    }
    if !PRICE_COLUMN.holds(price) {
        // At most 2 decimal places and 10 integer digits.
        return Err(ValidationError::new("price_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStationRequest {
    #[validate(length(min = 1, message = "Station name is required"))]
    pub station_name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Pincode is required"))]
    pub pincode: String,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricesRequest {
    #[validate(range(min = 1))]
    pub station_id: i32,
    #[validate(custom = "validate_price")]
    pub petrol_price: Decimal,
    #[validate(custom = "validate_price")]
    pub diesel_price: Decimal,
    #[validate(custom = "validate_price")]
    pub cng_price: Decimal,
}

/// Query string of `get-stations-by-address`; all three parts are required.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StationLocationQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct StationPricesQuery {
    pub station_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationPrices {
    pub station_id: i32,
    pub petrol_price: Decimal,
    pub diesel_price: Decimal,
    pub cng_price: Decimal,
}

impl From<fuel_price::Model> for StationPrices {
    fn from(m: fuel_price::Model) -> Self {
        Self {
            station_id: m.station_id,
            petrol_price: m.petrol_price,
            diesel_price: m.diesel_price,
            cng_price: m.cng_price,
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ServiceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::ValidationError(format!("{} is required", name)))
}

/// Station registration, pricing and public station lookups.
#[derive(Clone)]
pub struct StationService {
    stations: StationRepository,
    event_sender: Option<Arc<EventSender>>,
}

impl StationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            stations: StationRepository::new(db),
            event_sender,
        }
    }

    /// Inserts the station, then its zero price row.
    ///
    /// The two writes are not wrapped in a transaction: if the price row fails the
    /// station stays behind without prices and the call reports a store failure.
    #[instrument(skip(self, request))]
    pub async fn register_station(
        &self,
        dealer_id: i32,
        request: RegisterStationRequest,
    ) -> Result<fuel_station::Model, ServiceError> {
        request.validate()?;

        let station = self
            .stations
            .insert_station(NewStation {
                dealer_id,
                name: request.station_name,
                address: request.address,
                city: request.city,
                state: request.state,
                pincode: request.pincode,
                contact_number: request.contact_number.filter(|c| !c.trim().is_empty()),
            })
            .await
            .map_err(db_error("Failed to register station"))?;

        if let Err(e) = self.stations.insert_zero_prices(station.id).await {
            error!(
                error = %e,
                station_id = station.id,
                "Failed to initialize prices; station left without a price row"
            );
            return Err(ServiceError::DatabaseError(e));
        }

        info!(station_id = station.id, "station registered");
        if let Some(sender) = &self.event_sender {
            sender
                .publish(Event::StationRegistered {
                    station_id: station.id,
                    dealer_id,
                    at: station.created_at,
                })
                .await;
        }

        Ok(station)
    }

    #[instrument(skip(self, request), fields(station_id = request.station_id))]
    pub async fn update_prices(
        &self,
        dealer_id: i32,
        request: UpdatePricesRequest,
    ) -> Result<StationPrices, ServiceError> {
        request.validate()?;

        let changed = self
            .stations
            .update_prices(
                dealer_id,
                request.station_id,
                PriceSheet {
                    petrol: request.petrol_price,
                    diesel: request.diesel_price,
                    cng: request.cng_price,
                },
            )
            .await
            .map_err(db_error("Failed to update prices"))?;

        if changed == 0 {
            warn!("price update matched no station owned by dealer");
            return Err(ServiceError::NotFound(format!(
                "Station {} not found for this dealer",
                request.station_id
            )));
        }

        if let Some(sender) = &self.event_sender {
            sender
                .publish(Event::PricesUpdated {
                    station_id: request.station_id,
                    dealer_id,
                    at: Utc::now(),
                })
                .await;
        }

        Ok(StationPrices {
            station_id: request.station_id,
            petrol_price: request.petrol_price,
            diesel_price: request.diesel_price,
            cng_price: request.cng_price,
        })
    }

    pub async fn get_prices(&self, query: StationPricesQuery) -> Result<StationPrices, ServiceError> {
        let raw = required(query.station_id, "stationId")?;
        let station_id = raw
            .parse::<i32>()
            .map_err(|_| ServiceError::ValidationError("stationId must be an integer".to_string()))?;

        self.stations
            .find_prices(station_id)
            .await
            .map_err(db_error("Failed to fetch prices"))?
            .map(Into::into)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Prices not found for station {}", station_id))
            })
    }

    pub async fn dealer_stations(&self, dealer_id: i32) -> Result<Vec<StationSummary>, ServiceError> {
        self.stations
            .stations_for_dealer(dealer_id)
            .await
            .map_err(db_error("Failed to list dealer stations"))
    }

    pub async fn all_stations(&self) -> Result<Vec<StationListing>, ServiceError> {
        self.stations
            .listings(None)
            .await
            .map_err(db_error("Failed to list stations"))
    }

    pub async fn stations_by_address(
        &self,
        query: StationLocationQuery,
    ) -> Result<Vec<StationListing>, ServiceError> {
        let city = required(query.city, "city")?;
        let state = required(query.state, "state")?;
        let pincode = required(query.pincode, "pincode")?;

        self.stations
            .listings(Some((&city, &state, &pincode)))
            .await
            .map_err(db_error("Failed to search stations"))
    }
}
