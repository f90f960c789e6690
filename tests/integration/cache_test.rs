//! Behaviour with the principal cache or revocation store down.

use axum::http::StatusCode;
use serde_json::json;

use gatehouse_core::config::{AppConfig, RevocationFailurePolicy};

use crate::helpers::{FailingCacheProvider, TestApp, memory_provider};

fn app_with_cache_down() -> TestApp {
    TestApp::build(
        AppConfig::default(),
        std::sync::Arc::new(FailingCacheProvider),
        memory_provider(),
    )
}

#[tokio::test]
async fn test_requests_succeed_with_cache_down() {
    let app = app_with_cache_down();
    let (access, _) = app.signup("c@x.com").await;

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(me.status, StatusCode::OK);

    let update = app
        .request(
            "PUT",
            "/api/v1/users/me",
            Some(json!({ "firstName": "Still" })),
            Some(&access),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);

    let read = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(read.body["data"]["firstName"], "Still");
}

#[tokio::test]
async fn test_health_reports_degraded_cache() {
    let app = app_with_cache_down();

    let response = app.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["cache"], "down");
    assert_eq!(response.body["data"]["revocation"], "up");
}

#[tokio::test]
async fn test_health_ok() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_revocation_outage_fails_open_by_default() {
    let app = TestApp::build(
        AppConfig::default(),
        memory_provider(),
        std::sync::Arc::new(FailingCacheProvider),
    );
    let (access, _) = app.signup("open@x.com").await;

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(me.status, StatusCode::OK);

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revocation_outage_fails_closed_when_configured() {
    let mut config = AppConfig::default();
    config.revocation.failure_policy = RevocationFailurePolicy::FailClosed;
    let app = TestApp::build(
        config,
        memory_provider(),
        std::sync::Arc::new(FailingCacheProvider),
    );
    let (access, _) = app.signup("closed@x.com").await;

    let me = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
}
