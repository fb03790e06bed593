mod common;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{response_json, TestApp};
use fuelhub_api::auth::ActorKind;
use rstest::rstest;
use serde_json::json;

fn login_body(email: &str, password: &str, kind: ActorKind) -> serde_json::Value {
    json!({ "email": email, "password": password, "userType": kind.as_str() })
}

#[rstest]
#[case(ActorKind::Customer)]
#[case(ActorKind::Dealer)]
#[case(ActorKind::DeliveryAgent)]
#[tokio::test]
async fn register_then_login_each_role(#[case] kind: ActorKind) {
    let app = TestApp::new().await;
    let actor = app.register(kind, "role@fuelhub.test").await;

    let response = app
        .request(
            Method::POST,
            "/login",
            Some(login_body("role@fuelhub.test", "correct-horse-battery", kind)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_matches!(cookie, Some(c) if c.starts_with("session=") && c.contains("HttpOnly"));

    let body = response_json(response).await;
    assert_eq!(body["data"]["user"]["id"].as_i64(), Some(actor.id));
    assert_eq!(body["data"]["userType"], kind.as_str());
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    app.register(ActorKind::Dealer, "dup@fuelhub.test").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/register",
            Some(json!({
                "name": "Second",
                "email": "dup@fuelhub.test",
                "password": "another-pass",
                "phone": "9111111111",
                "userType": "dealer"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Email already registered"));
}

#[tokio::test]
async fn same_email_may_exist_under_different_roles() {
    let app = TestApp::new().await;
    app.register(ActorKind::Dealer, "shared@fuelhub.test").await;
    app.register(ActorKind::DeliveryAgent, "shared@fuelhub.test")
        .await;
}

#[tokio::test]
async fn customer_registration_requires_address() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/register",
            Some(json!({
                "name": "Homeless",
                "email": "noaddr@fuelhub.test",
                "password": "secret-pass",
                "phone": "9222222222",
                "userType": "customer",
                "city": "Pune"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[rstest]
#[case("short", "5-char password")]
#[case("", "empty password")]
#[tokio::test]
async fn weak_passwords_are_rejected(#[case] password: &str, #[case] _label: &str) {
    let app = TestApp::new().await;
    let (status, _) = app
        .call(
            Method::POST,
            "/register",
            Some(json!({
                "name": "Weak",
                "email": "weak@fuelhub.test",
                "password": password,
                "phone": "9333333333",
                "userType": "dealer"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    app.register(ActorKind::Customer, "login@fuelhub.test").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/login",
            Some(login_body("login@fuelhub.test", "wrong-password", ActorKind::Customer)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Invalid credentials");

    // Right password, wrong account table.
    let (status, _) = app
        .call(
            Method::POST,
            "/login",
            Some(login_body(
                "login@fuelhub.test",
                "correct-horse-battery",
                ActorKind::Dealer,
            )),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_authenticates_requests() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "cookie@fuelhub.test").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/dealer/get-stations")
        .header(header::COOKIE, format!("theme=dark; session={}", dealer.token))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = TestApp::new().await;
    let dealer = app.register(ActorKind::Dealer, "bye@fuelhub.test").await;

    let response = app
        .request(Method::POST, "/logout", None, Some(&dealer.token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));

    let (status, _) = app
        .call(Method::GET, "/api/dealer/get-stations", None, Some(&dealer.token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_routes_require_a_token() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::POST, "/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Not authenticated");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::GET,
            "/api/customer/get-orders",
            None,
            Some("not-a-session-token"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = TestApp::new().await;
    let customer = app.register(ActorKind::Customer, "me@fuelhub.test").await;

    let (status, body) = app
        .call(Method::GET, "/api/customer/profile", None, Some(&customer.token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["email"], "me@fuelhub.test");
    assert_eq!(body["data"]["city"], "Pune");

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/customer/update-profile",
            Some(json!({
                "name": "Renamed",
                "phone": "9444444444",
                "address": "7 Hill Road",
                "city": "Nashik",
                "state": "MH",
                "pincode": "422001"
            })),
            Some(&customer.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["city"], "Nashik");

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/customer/update-profile",
            Some(json!({ "name": "Renamed", "phone": "9444444444" })),
            Some(&customer.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let agent = app
        .register(ActorKind::DeliveryAgent, "rider@fuelhub.test")
        .await;
    let (status, body) = app
        .call(Method::GET, "/api/delivery-boy/profile", None, Some(&agent.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("city").is_none());
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");

    let response = app
        .request(Method::GET, "/api/does-not-exist", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/health", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));
}
