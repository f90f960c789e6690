//! Bearer-token middleware, logout revocation, and admin token controls.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_missing_or_malformed_header_is_401() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/v1/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["success"], false);

    let basic = Request::builder()
        .method("GET")
        .uri("/api/v1/users/me")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(basic).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_403() {
    let app = TestApp::new();
    let (_, refresh) = app.signup("m@x.com").await;

    for token in ["garbage", refresh.as_str()] {
        let response = app
            .request("GET", "/api/v1/users/me", None, Some(token))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let app = TestApp::new();
    let (access, _) = app.signup("out@x.com").await;

    let before = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_never_fails() {
    let app = TestApp::new();

    let no_header = app.request("POST", "/api/v1/auth/logout", None, None).await;
    assert_eq!(no_header.status, StatusCode::OK);

    let garbage = app
        .request("POST", "/api/v1/auth/logout", None, Some("not-a-jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::OK);

    let bad_body = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/logout")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    assert_eq!(app.send(bad_body).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_with_refresh_token_body_revokes_both() {
    let app = TestApp::new();
    let (access, refresh) = app.signup("both@x.com").await;

    let logout = app
        .request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refreshToken": refresh })),
            Some(&access),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_revoke_and_restore_tokens() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let (access, _) = app.signup("victim@x.com").await;

    let revoke = app
        .request(
            "POST",
            "/api/v1/admin/tokens/revoke",
            Some(json!({ "token": access })),
            Some(&admin),
        )
        .await;
    assert_eq!(revoke.status, StatusCode::OK);

    let blocked = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);

    let restore = app
        .request(
            "POST",
            "/api/v1/admin/tokens/restore",
            Some(json!({ "token": access })),
            Some(&admin),
        )
        .await;
    assert_eq!(restore.status, StatusCode::OK);

    let allowed = app
        .request("GET", "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_rejects_undecodable_token() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let response = app
        .request(
            "POST",
            "/api/v1/admin/tokens/revoke",
            Some(json!({ "token": "garbage" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_controls_require_admin() {
    let app = TestApp::new();
    let (access, _) = app.signup("plain@x.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/admin/tokens/revoke",
            Some(json!({ "token": access })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Insufficient permissions");
}
