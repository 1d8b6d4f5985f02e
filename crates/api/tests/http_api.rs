//! HTTP-level tests for behaviour decided before any query runs: routing,
//! authentication, role gates, the admin IP allow-list, input validation and
//! the static pages.
//!
//! The pool is lazy and points at a closed port, so these run without a
//! database.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, body_text, build_test_app, build_test_app_with, get, get_auth, lazy_pool,
    post_json, post_json_auth, send, test_config, token_for,
};
use estate_api::middleware::admin_ip::ADMIN_IP_DENIED_MESSAGE;
use estate_core::access::AdminAccessConfig;
use serde_json::json;

// ---------------------------------------------------------------------------
// Health and routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let response = get(build_test_app(lazy_pool()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = get(build_test_app(lazy_pool()), "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_page_renders_html_404() {
    let response = get(build_test_app(lazy_pool()), "/no-such-page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page not found"));
}

#[tokio::test]
async fn plans_page_lists_catalog() {
    let response = get(build_test_app(lazy_pool()), "/premium/plans").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Basic Premium"));
    assert!(html.contains("esewa"));
}

// ---------------------------------------------------------------------------
// Premium catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plans_endpoint_is_public() {
    let response = get(build_test_app(lazy_pool()), "/api/v1/premium/plans").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let plans = json["data"]["plans"].as_array().expect("plans array");
    assert_eq!(plans.len(), 3);
    assert!(json["data"]["payment_methods"]
        .as_array()
        .expect("methods array")
        .iter()
        .any(|m| m == "khalti"));
}

// ---------------------------------------------------------------------------
// Authentication and roles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_requires_token() {
    let body = json!({ "property_id": 1, "plan_type": "basic", "payment_method": "esewa" });
    let response = post_json(build_test_app(lazy_pool()), "/api/v1/premium/checkout", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let response = get_auth(
        build_test_app(lazy_pool()),
        "/api/v1/account/profile",
        "not-a-jwt",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn buyers_cannot_create_properties() {
    let token = token_for(10, "buyer");
    let response = post_json_auth(
        build_test_app(lazy_pool()),
        "/api/v1/properties",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Only brokers can list properties"
    );
}

#[tokio::test]
async fn broker_property_input_is_validated() {
    let token = token_for(11, "broker");
    let body = json!({
        "title": "",
        "description": "Corner office",
        "property_type": "office",
        "address": "1 Main St",
        "city": "Kathmandu",
        "state": "Bagmati",
        "zip_code": "44600",
        "price": "250000",
        "broker_email": "not-an-email"
    });
    let response =
        post_json_auth(build_test_app(lazy_pool()), "/api/v1/properties", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["title"].is_array());
    assert!(json["fields"]["broker_email"].is_array());
}

#[tokio::test]
async fn non_admins_are_forbidden_from_admin_routes() {
    let token = token_for(12, "broker");
    let response = get_auth(build_test_app(lazy_pool()), "/api/v1/admin/actions", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_can_read_action_table() {
    let token = token_for(1, "admin");
    let response = get_auth(build_test_app(lazy_pool()), "/api/v1/admin/actions", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .expect("actions array")
        .iter()
        .map(|a| a["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert!(names.contains(&"create_bulk_premium".to_string()));
    assert!(names.contains(&"restore_images".to_string()));
}

#[tokio::test]
async fn unknown_admin_action_is_rejected() {
    let token = token_for(1, "admin");
    let response = post_json_auth(
        build_test_app(lazy_pool()),
        "/api/v1/admin/actions",
        json!({ "action": "drop_everything", "ids": [1] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_status_requires_status_value() {
    let token = token_for(1, "admin");
    let response = post_json_auth(
        build_test_app(lazy_pool()),
        "/api/v1/admin/actions",
        json!({ "action": "bulk_update_status", "ids": [1, 2] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap_or_default()
        .contains("requires a status"));
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let token = token_for(1, "admin");
    let response = post_json_auth(
        build_test_app(lazy_pool()),
        "/api/v1/admin/actions",
        json!({ "action": "mark_verified", "ids": [] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Admin IP allow-list
// ---------------------------------------------------------------------------

fn restricted_app() -> axum::Router {
    let mut config = test_config();
    config.admin_access = AdminAccessConfig::from_list(true, "10.0.0.0/8");
    build_test_app_with(lazy_pool(), config)
}

fn admin_request(forwarded_for: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri("/api/v1/admin/actions")
        .header("x-forwarded-for", forwarded_for)
        .header("authorization", format!("Bearer {}", token_for(1, "admin")))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn unlisted_address_is_blocked_even_for_admins() {
    let response = send(restricted_app(), admin_request("203.0.113.9")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], ADMIN_IP_DENIED_MESSAGE);
}

#[tokio::test]
async fn listed_address_reaches_admin_handlers() {
    let response = send(restricted_app(), admin_request("10.20.30.40")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn allow_list_does_not_guard_public_routes() {
    let response = get(restricted_app(), "/api/v1/premium/plans").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Registration validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registration_reports_field_errors() {
    let body = json!({
        "username": "ab",
        "email": "nobody",
        "password": "longenough1",
        "password_confirm": "different1",
        "agree_terms": true
    });
    let response = post_json(build_test_app(lazy_pool()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["fields"]["username"].is_array());
    assert!(json["fields"]["email"].is_array());
    assert_eq!(json["fields"]["password_confirm"][0], "Passwords do not match");
}

#[tokio::test]
async fn registration_requires_terms() {
    let body = json!({
        "username": "newbroker",
        "email": "broker@example.com",
        "password": "longenough1",
        "password_confirm": "longenough1",
        "user_type": "broker"
    });
    let response = post_json(build_test_app(lazy_pool()), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "You must agree to the terms of service"
    );
}
