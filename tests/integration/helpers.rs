//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use gatehouse_api::AppState;
use gatehouse_auth::PasswordHasher;
use gatehouse_cache::CacheManager;
use gatehouse_cache::memory::MemoryCacheProvider;
use gatehouse_core::AppError;
use gatehouse_core::config::{AppConfig, MemoryCacheConfig};
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::cache::CacheProvider;
use gatehouse_database::{MemoryUserRepository, UserRepository};
use gatehouse_entity::user::{CreateUser, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing user store for direct setup
    pub users: Arc<MemoryUserRepository>,
}

/// A cache backend that is always down.
#[derive(Debug)]
pub struct FailingCacheProvider;

#[async_trait]
impl CacheProvider for FailingCacheProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn delete_pattern(&self, _pattern: &str) -> AppResult<u64> {
        Err(AppError::cache("cache unavailable"))
    }
    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::cache("cache unavailable"))
    }
}

pub fn memory_provider() -> Arc<dyn CacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()))
}

impl TestApp {
    /// Default configuration, in-memory everything.
    pub fn new() -> Self {
        Self::build(AppConfig::default(), memory_provider(), memory_provider())
    }

    /// Custom configuration, in-memory everything.
    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, memory_provider(), memory_provider())
    }

    /// Custom principal-cache and revocation backends.
    pub fn build(
        config: AppConfig,
        cache: Arc<dyn CacheProvider>,
        revocation: Arc<dyn CacheProvider>,
    ) -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let ttl = Duration::from_secs(config.cache.default_ttl_seconds);

        let state = AppState::new(
            config,
            None,
            users.clone(),
            CacheManager::from_provider(cache, ttl),
            CacheManager::from_provider(revocation, ttl),
        );

        Self {
            router: gatehouse_api::build_router(state),
            users,
        }
    }

    /// Register through the API and return the response body.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "name": name, "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Login and return the access and refresh tokens.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        (
            response.str_at("/data/token").to_string(),
            response.str_at("/data/refreshToken").to_string(),
        )
    }

    /// Register a user and return their access and refresh tokens.
    pub async fn signup(&self, email: &str) -> (String, String) {
        let response = self.register("Test User", email, "secret12").await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        (
            response.str_at("/data/token").to_string(),
            response.str_at("/data/refreshToken").to_string(),
        )
    }

    /// Insert an admin directly into the store and log them in.
    pub async fn admin(&self) -> String {
        let hash = PasswordHasher::new()
            .hash_password("adminpass1")
            .expect("Failed to hash password");
        self.users
            .create(&CreateUser {
                email: "admin@x.com".into(),
                password_hash: hash,
                first_name: "Root".into(),
                last_name: String::new(),
                role: UserRole::Admin,
            })
            .await
            .expect("Failed to create admin");

        self.login("admin@x.com", "adminpass1").await.0
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&body).expect("Failed to serialize body"),
                )),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let raw = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body, raw }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` if empty or not JSON)
    pub body: Value,
    /// Raw body text
    pub raw: String,
}

impl TestResponse {
    /// String at a JSON pointer, panicking if absent.
    pub fn str_at(&self, pointer: &str) -> &str {
        self.body
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("No string at {pointer} in {:?}", self.body))
    }
}
