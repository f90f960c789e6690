//! Admin user management and the role guard.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_user_list_requires_admin() {
    let app = TestApp::new();
    let (access, _) = app.signup("u@x.com").await;

    let response = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_list_reflects_new_registrations() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let before = app.request("GET", "/api/v1/users", None, Some(&admin)).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["data"]["total"], 1);

    app.signup("new@x.com").await;

    let after = app.request("GET", "/api/v1/users", None, Some(&admin)).await;
    assert_eq!(after.body["data"]["total"], 2);
}

#[tokio::test]
async fn test_user_list_filters() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.signup("alice@x.com").await;
    app.signup("bob@x.com").await;

    let search = app
        .request("GET", "/api/v1/users?search=ALICE", None, Some(&admin))
        .await;
    assert_eq!(search.body["data"]["total"], 1);
    assert_eq!(search.body["data"]["users"][0]["email"], "alice@x.com");

    let admins = app
        .request("GET", "/api/v1/users?role=admin&limit=5", None, Some(&admin))
        .await;
    assert_eq!(admins.body["data"]["total"], 1);
    assert_eq!(admins.body["data"]["limit"], 5);
}

#[tokio::test]
async fn test_deactivated_user_cannot_login_or_refresh() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let registered = app.register("Gone User", "gone@x.com", "secret12").await;
    let user_id = registered.str_at("/data/user/id").to_string();
    let refresh = registered.str_at("/data/refreshToken").to_string();

    let deactivate = app
        .request("DELETE", &format!("/api/v1/users/{user_id}"), None, Some(&admin))
        .await;
    assert_eq!(deactivate.status, StatusCode::OK);
    assert_eq!(deactivate.body["data"]["isActive"], false);

    let fetched = app
        .request("GET", &format!("/api/v1/users/{user_id}"), None, Some(&admin))
        .await;
    assert_eq!(fetched.body["data"]["isActive"], false);

    let login = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "gone@x.com", "password": "secret12" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
    assert_eq!(login.body["message"], "Account is deactivated");

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
async fn test_deactivated_user_wrong_password_is_generic() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let registered = app.register("Gone User", "quiet@x.com", "secret12").await;
    let user_id = registered.str_at("/data/user/id").to_string();

    app.request("DELETE", &format!("/api/v1/users/{user_id}"), None, Some(&admin))
        .await;

    let login = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "quiet@x.com", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(login.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_unknown_and_invalid_ids() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let missing = app
        .request(
            "GET",
            "/api/v1/users/00000000-0000-0000-0000-000000000000",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let invalid = app
        .request("GET", "/api/v1/users/not-a-uuid", None, Some(&admin))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}
