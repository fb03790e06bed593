use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{ActorKind, AuthSession},
    entities::fuel_station,
    errors::ServiceError,
    handlers::ApiJson,
    repositories::station_repository::{StationListing, StationSummary},
    services::stations::{
        RegisterStationRequest, StationLocationQuery, StationPrices, StationPricesQuery,
        UpdatePricesRequest,
    },
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    pub id: i32,
    pub dealer_id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<fuel_station::Model> for StationView {
    fn from(m: fuel_station::Model) -> Self {
        Self {
            id: m.id,
            dealer_id: m.dealer_id,
            name: m.name,
            address: m.address,
            city: m.city,
            state: m.state,
            pincode: m.pincode,
            contact_number: m.contact_number,
            created_at: m.created_at,
        }
    }
}

/// Every station that has a price sheet
#[utoipa::path(
    get,
    path = "/api/get-all-stations",
    tag = "Stations",
    responses(
        (status = 200, description = "Stations with current prices", body = ApiResponse<Vec<StationListing>>),
    )
)]
pub async fn all_stations(State(state): State<AppState>) -> ApiResult<Vec<StationListing>> {
    let stations = state.services.stations.all_stations().await?;
    Ok(Json(ApiResponse::success(stations)))
}

/// Stations at one exact city, state and pincode
#[utoipa::path(
    get,
    path = "/api/get-stations-by-address",
    tag = "Stations",
    params(StationLocationQuery),
    responses(
        (status = 200, description = "Matching stations with prices and dealer phone", body = ApiResponse<Vec<StationListing>>),
        (status = 400, description = "city, state or pincode missing", body = crate::errors::ErrorResponse),
    )
)]
pub async fn stations_by_address(
    State(state): State<AppState>,
    Query(query): Query<StationLocationQuery>,
) -> ApiResult<Vec<StationListing>> {
    let stations = state.services.stations.stations_by_address(query).await?;
    Ok(Json(ApiResponse::success(stations)))
}

/// Current price sheet of one station
#[utoipa::path(
    get,
    path = "/api/get-prices",
    tag = "Stations",
    params(StationPricesQuery),
    responses(
        (status = 200, description = "Price sheet", body = ApiResponse<StationPrices>),
        (status = 400, description = "stationId missing or malformed", body = crate::errors::ErrorResponse),
        (status = 404, description = "No price sheet for the station", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Query(query): Query<StationPricesQuery>,
) -> ApiResult<StationPrices> {
    let prices = state.services.stations.get_prices(query).await?;
    Ok(Json(ApiResponse::success(prices)))
}

/// Register a station; its prices start at zero
#[utoipa::path(
    post,
    path = "/api/dealer/register-station",
    tag = "Stations",
    request_body = RegisterStationRequest,
    responses(
        (status = 201, description = "Station registered", body = ApiResponse<StationView>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not a dealer", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn register_station(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<RegisterStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StationView>>), ServiceError> {
    let session = session.require_role(ActorKind::Dealer)?;
    let station = state
        .services
        .stations
        .register_station(session.user_id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            station.into(),
            "Station registered successfully",
        )),
    ))
}

/// Overwrite the price sheet of one of the dealer's stations
#[utoipa::path(
    post,
    path = "/api/dealer/update-prices",
    tag = "Stations",
    request_body = UpdatePricesRequest,
    responses(
        (status = 200, description = "Prices updated", body = ApiResponse<StationPrices>),
        (status = 400, description = "Negative or malformed price", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such station for this dealer", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_prices(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(request): ApiJson<UpdatePricesRequest>,
) -> ApiResult<StationPrices> {
    let session = session.require_role(ActorKind::Dealer)?;
    let prices = state
        .services
        .stations
        .update_prices(session.user_id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(prices, "Prices updated successfully")))
}

pub async fn dealer_stations(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Vec<StationSummary>> {
    let stations = state
        .services
        .stations
        .dealer_stations(session.user_id)
        .await?;
    Ok(Json(ApiResponse::success(stations)))
}
