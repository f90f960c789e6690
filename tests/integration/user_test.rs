//! Profile reads and writes through the principal cache.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_profile_update_is_visible_on_next_read() {
    let app = TestApp::new();
    let (access, _) = app.signup("p@x.com").await;

    // Warm the cache.
    let first = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(first.body["data"]["firstName"], "Test");

    let update = app
        .request(
            "PUT",
            "/api/v1/users/me",
            Some(json!({ "firstName": "Grace", "lastName": "Hopper" })),
            Some(&access),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body["data"]["name"], "Grace Hopper");

    let read = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(read.body["data"]["firstName"], "Grace");
    assert_eq!(read.body["data"]["lastName"], "Hopper");
}

#[tokio::test]
async fn test_profile_email_conflict_is_409() {
    let app = TestApp::new();
    let (access, _) = app.signup("one@x.com").await;
    app.signup("two@x.com").await;

    let response = app
        .request(
            "PUT",
            "/api/v1/users/me",
            Some(json!({ "email": "two@x.com" })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (access, _) = app.signup("pw@x.com").await;

    let wrong = app
        .request(
            "PUT",
            "/api/v1/users/me/password",
            Some(json!({ "currentPassword": "nope", "newPassword": "newsecret1" })),
            Some(&access),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["message"], "Current password is incorrect");

    let changed = app
        .request(
            "PUT",
            "/api/v1/users/me/password",
            Some(json!({ "currentPassword": "secret12", "newPassword": "newsecret1" })),
            Some(&access),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let (fresh, _) = app.login("pw@x.com", "newsecret1").await;
    assert!(!fresh.is_empty());

    let old = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "pw@x.com", "password": "secret12" })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_email_availability() {
    let app = TestApp::new();
    app.signup("taken@x.com").await;

    let taken = app
        .request("GET", "/api/v1/users/check-email?email=taken%40x.com", None, None)
        .await;
    assert_eq!(taken.status, StatusCode::OK);
    assert_eq!(taken.body["data"]["available"], false);

    let free = app
        .request("GET", "/api/v1/users/check-email?email=free%40x.com", None, None)
        .await;
    assert_eq!(free.body["data"]["available"], true);
}
