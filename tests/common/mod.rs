#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use fuelhub_api::{
    auth::{ActorKind, AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "k3Y9vQ2mT8xL4pZ7rW1nB6cF0hJ5sD3gA9eU2iO8yR4tE7wQ1zX6vC0bN5mK8jH2";

/// A registered account and the session token it received.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub token: String,
}

/// Full router over a fresh SQLite file with migrations applied.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("fuelhub_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // One connection keeps SQLite writers from tripping over the file lock.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
        let services = AppServices::new(db_arc.clone(), Some(event_sender), auth_service.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
            auth: auth_service,
        };

        Self {
            router: fuelhub_api::build_router(state.clone()),
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Same as [`request`](Self::request) but returns the status and parsed body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn register(&self, kind: ActorKind, email: &str) -> Actor {
        let mut body = json!({
            "name": format!("{} {}", kind.as_str(), email),
            "email": email,
            "password": "correct-horse-battery",
            "phone": "9000000000",
            "userType": kind.as_str(),
        });
        if kind == ActorKind::Customer {
            body["address"] = json!("12 Ring Road");
            body["city"] = json!("Pune");
            body["state"] = json!("MH");
            body["pincode"] = json!("411001");
        }

        let (status, payload) = self.call(Method::POST, "/register", Some(body), None).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {payload}");
        Actor {
            id: payload["data"]["user"]["id"].as_i64().expect("user id"),
            token: payload["data"]["token"]
                .as_str()
                .expect("session token")
                .to_string(),
        }
    }

    /// Registers a station for `dealer` in Pune and publishes the given prices.
    pub async fn station_with_prices(
        &self,
        dealer: &Actor,
        name: &str,
        petrol: &str,
        diesel: &str,
        cng: &str,
    ) -> i64 {
        let (status, payload) = self
            .call(
                Method::POST,
                "/api/dealer/register-station",
                Some(json!({
                    "stationName": name,
                    "address": "NH 48",
                    "city": "Pune",
                    "state": "MH",
                    "pincode": "411001",
                    "contactNumber": "020-5550100"
                })),
                Some(&dealer.token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register station failed: {payload}");
        let station_id = payload["data"]["id"].as_i64().expect("station id");

        let (status, payload) = self
            .call(
                Method::POST,
                "/api/dealer/update-prices",
                Some(json!({
                    "stationId": station_id,
                    "petrolPrice": petrol,
                    "dieselPrice": diesel,
                    "cngPrice": cng
                })),
                Some(&dealer.token),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "update prices failed: {payload}");
        station_id
    }

    pub async fn place_order(
        &self,
        customer: &Actor,
        station_id: i64,
        fuel_type: &str,
        quantity: &str,
    ) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/place-order",
            Some(json!({
                "fuelType": fuel_type,
                "quantity": quantity,
                "deliveryAddress": "Flat 4, Lake View",
                "stationId": station_id
            })),
            Some(&customer.token),
        )
        .await
    }

    /// POSTs `{orderId}` to one of the lifecycle endpoints.
    pub async fn order_action(&self, uri: &str, order_id: i64, actor: &Actor) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            uri,
            Some(json!({ "orderId": order_id })),
            Some(&actor.token),
        )
        .await
    }

    pub async fn assign(&self, dealer: &Actor, order_id: i64, agent: &Actor) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/dealer/assign-delivery-boy",
            Some(json!({ "orderId": order_id, "deliveryBoyId": agent.id })),
            Some(&dealer.token),
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

/// Reads a decimal that the API serialized as a string.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("decimal encoded as string")
        .parse()
        .expect("valid decimal")
}
