//! Public and protected routes of the fully bootstrapped service.
//!
//! Requires Docker:
//!
//! ```bash
//! cargo test -p inventory-service --test public_endpoints_test -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;

async fn server() -> TestServer {
    TestServer::new(common::bootstrapped_app().await.router()).expect("servable")
}

#[tokio::test]
#[ignore]
async fn test_ping_is_public() {
    let response = server().await.get("/ping").await;

    response.assert_status_ok();
    response.assert_text("pong");
}

#[tokio::test]
#[ignore]
async fn test_actuator_health_is_public() {
    let response = server().await.get("/actuator/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "UP");
    assert_eq!(body["components"]["db"]["status"], "UP");
}

#[tokio::test]
#[ignore]
async fn test_other_paths_require_the_api_token() {
    let server = server().await;

    server
        .get("/actuator/env")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/actuator/env")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", common::API_TOKEN)).unwrap(),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
