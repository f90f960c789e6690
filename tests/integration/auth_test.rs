//! Register, login, refresh, and logout flows.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use gatehouse_auth::{TokenType, TokenVerifier};
use gatehouse_core::config::AppConfig;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_login_logout_refresh_scenario() {
    let app = TestApp::new();

    let registered = app.register("A B", "a@x.com", "secret12").await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["message"], "User registered successfully");

    let user_id = registered.str_at("/data/user/id").to_string();
    assert_eq!(registered.body["data"]["user"]["name"], "A B");
    assert_eq!(registered.body["data"]["user"]["role"], "user");
    assert!(registered.body["data"]["user"].get("passwordHash").is_none());

    let claims = TokenVerifier::peek_claims(registered.str_at("/data/token")).unwrap();
    assert_eq!(claims.principal_id.to_string(), user_id);
    assert_eq!(claims.token_type, TokenType::Access);

    let wrong = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["message"], "Invalid email or password");

    let (access, refresh) = app.login("a@x.com", "secret12").await;
    assert_ne!(access, registered.str_at("/data/token"));

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert!(logout.raw.is_empty());

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(!refreshed.str_at("/data/accessToken").is_empty());
    assert!(refreshed.body["data"].get("refreshToken").is_none());

    let again = app
        .request("POST", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_does_not_reveal_which_emails_exist() {
    let app = TestApp::new();
    app.signup("exists@x.com").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "exists@x.com", "password": "wrong" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "nouser@x.com", "password": "anything" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, unknown_email.status);
    assert_eq!(wrong_password.body, unknown_email.body);
}

#[tokio::test]
async fn test_login_normalizes_email_case() {
    let app = TestApp::new();
    app.signup("mixed@x.com").await;

    let (access, _) = app.login("MIXED@X.com", "secret12").await;
    assert!(!access.is_empty());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = TestApp::new();
    app.signup("dup@x.com").await;

    let response = app.register("Other Person", "DUP@x.com", "secret12").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "User with this email already exists");
}

#[tokio::test]
async fn test_register_validates_input() {
    let app = TestApp::new();

    let bad_email = app.register("A B", "not-an-email", "secret12").await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let short_password = app.register("A B", "short@x.com", "abc").await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_password.body["success"], false);
}

#[tokio::test]
async fn test_refresh_rejects_bad_tokens_with_401() {
    let app = TestApp::new();
    let (access, _) = app.signup("r@x.com").await;

    for token in [access.as_str(), "garbage", "a.b.c"] {
        let response = app
            .request(
                "POST",
                "/api/v1/auth/refresh",
                Some(json!({ "refreshToken": token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "token {token}");
        assert_eq!(response.body["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/v1/auth/refresh", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_without_password_gets_error_envelope() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "name": "A B", "email": "nopass@x.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.raw);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_login_with_malformed_json_gets_error_envelope() {
    let app = TestApp::new();

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"email": "a@x.com", "password": "#))
        .expect("Failed to build request");
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.raw);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "VALIDATION");
    assert_eq!(
        response.body["message"],
        "Invalid request body: Request body is not valid JSON"
    );
}

#[tokio::test]
async fn test_refresh_rotation_rejects_reuse() {
    let mut config = AppConfig::default();
    config.auth.rotate_refresh_tokens = true;
    let app = TestApp::with_config(config);
    let (_, refresh) = app.signup("rot@x.com").await;

    let first = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let rotated = first.str_at("/data/refreshToken").to_string();
    assert_ne!(rotated, refresh);

    let reuse = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(reuse.status, StatusCode::UNAUTHORIZED);

    let next = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refreshToken": rotated })),
            None,
        )
        .await;
    assert_eq!(next.status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::new();
    let (access, _) = app.signup("me@x.com").await;

    let response = app
        .request("GET", "/api/v1/auth/me", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], "me@x.com");
    assert_eq!(response.body["data"]["firstName"], "Test");
    assert_eq!(response.body["data"]["lastName"], "User");
}
