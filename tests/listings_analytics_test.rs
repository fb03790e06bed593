mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{decimal, Actor, TestApp};
use fuelhub_api::{
    auth::ActorKind,
    entities::order,
    repositories::OrderRepository,
    services::analytics::month_window_start,
};
use rust_decimal_macros::dec;
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};

async fn deliver(app: &TestApp, dealer: &Actor, agent: &Actor, order_id: i64) {
    let (status, body) = app
        .order_action("/api/dealer/accept-order", order_id, dealer)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = app.assign(dealer, order_id, agent).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = app
        .order_action("/api/delivery-boy/accept-order", order_id, agent)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, body) = app
        .call(
            Method::POST,
            "/api/delivery-boy/update-order-status",
            Some(json!({ "orderId": order_id, "status": "delivered" })),
            Some(&agent.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

fn order_id(body: &Value) -> i64 {
    body["data"]["id"].as_i64().expect("order id")
}

#[tokio::test]
async fn each_role_sees_only_its_orders() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "d1@fuelhub.test").await;
    let other_dealer = app.register(ActorKind::Dealer, "d2@fuelhub.test").await;
    let customer = app.register(ActorKind::Customer, "c1@fuelhub.test").await;
    let other_customer = app.register(ActorKind::Customer, "c2@fuelhub.test").await;
    let agent = app.register(ActorKind::DeliveryAgent, "a1@fuelhub.test").await;

    let station = app.station_with_prices(&dealer, "Mine", "100", "90", "80").await;
    let other_station = app
        .station_with_prices(&other_dealer, "Theirs", "100", "90", "80")
        .await;

    let (_, mine) = app.place_order(&customer, station, "diesel", "20").await;
    app.place_order(&other_customer, other_station, "cng", "5")
        .await;
    app.order_action("/api/dealer/accept-order", order_id(&mine), &dealer)
        .await;
    app.assign(&dealer, order_id(&mine), &agent).await;

    let (status, body) = app
        .call(Method::GET, "/api/dealer/get-orders", None, Some(&dealer.token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rows = body["data"].as_array().expect("dealer orders");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"].as_i64(), Some(order_id(&mine)));
    assert_eq!(rows[0]["customerName"], "customer c1@fuelhub.test");
    assert_eq!(rows[0]["deliveryAgentName"], "delivery_boy a1@fuelhub.test");
    assert_eq!(rows[0]["fuelType"], "diesel");
    assert_eq!(decimal(&rows[0]["totalAmount"]), dec!(1800));

    let (_, body) = app
        .call(Method::GET, "/api/customer/get-orders", None, Some(&customer.token))
        .await;
    let rows = body["data"].as_array().expect("customer orders");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stationName"], "Mine");
    assert_eq!(rows[0]["deliveryAgentPhone"], "9000000000");

    let (_, body) = app
        .call(Method::GET, "/api/delivery-boy/get-orders", None, Some(&agent.token))
        .await;
    let rows = body["data"].as_array().expect("agent orders");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["stationAddress"], "NH 48");
    assert_eq!(rows[0]["customerPhone"], "9000000000");
}

#[tokio::test]
async fn analytics_count_only_delivered_sales() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "sales@fuelhub.test").await;
    let customer = app.register(ActorKind::Customer, "buyer@fuelhub.test").await;
    let agent = app.register(ActorKind::DeliveryAgent, "rider@fuelhub.test").await;
    let station = app
        .station_with_prices(&dealer, "Sales Fuels", "100.50", "90", "80")
        .await;

    let (_, delivered) = app.place_order(&customer, station, "petrol", "10").await;
    deliver(&app, &dealer, &agent, order_id(&delivered)).await;
    // Left pending; must not count.
    app.place_order(&customer, station, "diesel", "3").await;

    let (status, body) = app
        .call(Method::GET, "/api/dealer/get-analytics", None, Some(&dealer.token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(decimal(&body["data"]["today"]), dec!(1005));
    assert_eq!(decimal(&body["data"]["week"]), dec!(1005));
    assert_eq!(decimal(&body["data"]["month"]), dec!(1005));

    let rival = app.register(ActorKind::Dealer, "nosales@fuelhub.test").await;
    let (_, body) = app
        .call(Method::GET, "/api/dealer/get-analytics", None, Some(&rival.token))
        .await;
    assert_eq!(decimal(&body["data"]["month"]), dec!(0));
}

#[tokio::test]
async fn sales_older_than_a_month_are_not_loaded() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "old@fuelhub.test").await;
    let customer = app.register(ActorKind::Customer, "old-c@fuelhub.test").await;
    let agent = app.register(ActorKind::DeliveryAgent, "old-a@fuelhub.test").await;
    let station = app.station_with_prices(&dealer, "Old", "100", "90", "80").await;

    let (_, recent) = app.place_order(&customer, station, "petrol", "2").await;
    deliver(&app, &dealer, &agent, order_id(&recent)).await;
    let (_, stale) = app.place_order(&customer, station, "petrol", "5").await;
    deliver(&app, &dealer, &agent, order_id(&stale)).await;

    order::Entity::update_many()
        .col_expr(
            order::Column::CreatedAt,
            Expr::value(Utc::now() - Duration::days(45)),
        )
        .filter(order::Column::Id.eq(order_id(&stale) as i32))
        .exec(app.state.db.as_ref())
        .await
        .expect("backdate order");

    let repo = OrderRepository::new(app.state.db.clone());
    let rows = repo
        .delivered_sales_for_dealer(dealer.id as i32, month_window_start(Utc::now().date_naive()))
        .await
        .expect("sales rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_amount, dec!(200));

    let (_, body) = app
        .call(Method::GET, "/api/dealer/get-analytics", None, Some(&dealer.token))
        .await;
    assert_eq!(decimal(&body["data"]["month"]), dec!(200));
}

#[tokio::test]
async fn busy_agents_drop_out_of_availability_until_delivery() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "avail@fuelhub.test").await;
    let customer = app.register(ActorKind::Customer, "avail-c@fuelhub.test").await;
    let busy = app.register(ActorKind::DeliveryAgent, "busy@fuelhub.test").await;
    let idle = app.register(ActorKind::DeliveryAgent, "idle@fuelhub.test").await;
    let station = app.station_with_prices(&dealer, "Avail", "100", "90", "80").await;

    let available = |body: &Value| -> Vec<i64> {
        let mut ids: Vec<i64> = body["data"]
            .as_array()
            .expect("agents")
            .iter()
            .filter_map(|a| a["id"].as_i64())
            .collect();
        ids.sort_unstable();
        ids
    };

    let (_, body) = app
        .call(
            Method::GET,
            "/api/dealer/get-available-delivery-boys",
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(available(&body), vec![busy.id, idle.id]);

    let (_, placed) = app.place_order(&customer, station, "petrol", "1").await;
    let id = order_id(&placed);
    app.order_action("/api/dealer/accept-order", id, &dealer).await;
    app.assign(&dealer, id, &busy).await;

    let (_, body) = app
        .call(
            Method::GET,
            "/api/dealer/get-available-delivery-boys",
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(available(&body), vec![idle.id]);

    app.order_action("/api/delivery-boy/accept-order", id, &busy)
        .await;
    app.call(
        Method::POST,
        "/api/delivery-boy/update-order-status",
        Some(json!({ "orderId": id, "status": "delivered" })),
        Some(&busy.token),
    )
    .await;

    let (_, body) = app
        .call(
            Method::GET,
            "/api/dealer/get-available-delivery-boys",
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(available(&body), vec![busy.id, idle.id]);
}

#[tokio::test]
async fn agent_details_report_delivery_stats() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "stats@fuelhub.test").await;
    let customer = app.register(ActorKind::Customer, "stats-c@fuelhub.test").await;
    let agent = app.register(ActorKind::DeliveryAgent, "stats-a@fuelhub.test").await;
    let station = app.station_with_prices(&dealer, "Stats", "100", "90", "80").await;

    let (_, first) = app.place_order(&customer, station, "petrol", "2").await;
    deliver(&app, &dealer, &agent, order_id(&first)).await;

    let (_, second) = app.place_order(&customer, station, "petrol", "2").await;
    app.order_action("/api/dealer/accept-order", order_id(&second), &dealer)
        .await;
    app.assign(&dealer, order_id(&second), &agent).await;

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/dealer/get-delivery-boy-details/{}", agent.id),
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let details = &body["data"];
    assert_eq!(details["email"], "stats-a@fuelhub.test");
    assert_eq!(details["totalDeliveries"], 2);
    assert_eq!(details["completedDeliveries"], 1);
    assert_eq!(details["successRate"], 50);
    assert_eq!(details["activeOrders"], 1);
    assert!(details["lastDelivery"].is_string());

    let (status, body) = app
        .call(
            Method::GET,
            "/api/dealer/get-delivery-boy-details",
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let all = body["data"].as_array().expect("agent details");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["id"].as_i64(), Some(agent.id));

    let (status, _) = app
        .call(
            Method::GET,
            "/api/dealer/get-delivery-boy-details/9999",
            None,
            Some(&dealer.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feedback_is_stored_and_listed_for_dealers() {
    let app = TestApp::new().await;
    let customer = app.register(ActorKind::Customer, "fb@fuelhub.test").await;
    let dealer = app.register(ActorKind::Dealer, "fb-d@fuelhub.test").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/customer/submit-feedback",
            Some(json!({ "feedbackMessage": "  Quick delivery, thanks!  " })),
            Some(&customer.token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["id"].is_i64());

    let (status, _) = app
        .call(
            Method::POST,
            "/api/customer/submit-feedback",
            Some(json!({ "feedbackMessage": "" })),
            Some(&customer.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(Method::GET, "/api/dealer/get-feedback", None, Some(&dealer.token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rows = body["data"].as_array().expect("feedback rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["message"], "Quick delivery, thanks!");
    assert_eq!(rows[0]["customerId"].as_i64(), Some(customer.id));
    assert_eq!(rows[0]["customerName"], "customer fb@fuelhub.test");
}
