use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FuelHub API",
        version = "0.1.0",
        description = r#"
# FuelHub Fuel Delivery API

Dealers register stations and publish fuel prices, customers order fuel for delivery, and
delivery agents carry accepted orders to the customer.

## Authentication

`POST /login` and `POST /register` return a session token and also set it as the `session`
cookie. Send it back either as the cookie or in the Authorization header:

```
Authorization: Bearer <session-token>
```

Every `/api/dealer/*`, `/api/customer/*` and `/api/delivery-boy/*` route requires a session of
that role.

## Order lifecycle

`pending -> accepted -> in-progress -> delivered`. Dealers may cancel `pending` or `accepted`
orders, customers may cancel their `pending` orders, and an agent may hand an `in-progress`
order back to the dealer.

## Error Handling

```json
{
  "success": false,
  "error": "Bad Request",
  "message": "Invalid state: Order 7 is delivered; expected one of: pending",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Registration and sessions"),
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Stations", description = "Stations and fuel prices"),
        (name = "Delivery agents", description = "Delivery agent availability"),
        (name = "Analytics", description = "Dealer sales analytics")
    ),
    paths(
        // Auth
        crate::handlers::auth::login,
        crate::handlers::auth::register,

        // Orders
        crate::handlers::orders::place_order,
        crate::handlers::orders::dealer_accept_order,
        crate::handlers::orders::dealer_reject_order,
        crate::handlers::orders::assign_delivery_agent,
        crate::handlers::orders::agent_accept_order,
        crate::handlers::orders::agent_reject_order,
        crate::handlers::orders::agent_update_order_status,
        crate::handlers::orders::customer_cancel_order,

        // Stations
        crate::handlers::stations::all_stations,
        crate::handlers::stations::stations_by_address,
        crate::handlers::stations::get_prices,
        crate::handlers::stations::register_station,
        crate::handlers::stations::update_prices,

        // Agents & analytics
        crate::handlers::agents::available_agents,
        crate::handlers::analytics::dealer_analytics,
    ),
    components(
        schemas(
            crate::entities::order::OrderStatus,
            crate::entities::order::FuelType,
            crate::auth::ActorKind,
            crate::handlers::orders::OrderView,
            crate::handlers::stations::StationView,
            crate::handlers::feedback::FeedbackReceipt,
            crate::repositories::order_repository::CustomerOrderRow,
            crate::repositories::order_repository::DealerOrderRow,
            crate::repositories::order_repository::AgentOrderRow,
            crate::repositories::feedback_repository::FeedbackRow,
            crate::services::agents::AgentDetails,
            crate::services::feedback::SubmitFeedbackRequest,
            crate::services::accounts::UpdateProfileRequest,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SessionAuth)
)]
pub struct ApiDocV1;

struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
