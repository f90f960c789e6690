//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use gatehouse_auth::{RevocationStore, SessionManager};
use gatehouse_cache::{CacheManager, PrincipalCache};
use gatehouse_core::config::AppConfig;
use gatehouse_database::{DatabasePool, UserRepository};
use gatehouse_service::{AdminUserService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool (absent with the in-memory store)
    pub db_pool: Option<DatabasePool>,
    /// Principal cache
    pub principal_cache: PrincipalCache,

    // ── Auth ─────────────────────────────────────────────────
    /// Register, login, refresh, logout
    pub session_manager: Arc<SessionManager>,

    // ── Services ─────────────────────────────────────────────
    /// User self-service
    pub user_service: Arc<UserService>,
    /// Admin user management
    pub admin_user_service: Arc<AdminUserService>,
}

impl AppState {
    /// Wires the services on top of already-connected infrastructure.
    ///
    /// `cache` backs the principal cache and `revocation` the token
    /// denylist. They may share a backend but are configured separately.
    pub fn new(
        config: AppConfig,
        db_pool: Option<DatabasePool>,
        users: Arc<dyn UserRepository>,
        cache: CacheManager,
        revocation: CacheManager,
    ) -> Self {
        let principal_cache = PrincipalCache::new(cache);
        let revocation = RevocationStore::new(revocation, config.revocation.failure_policy);

        let session_manager = SessionManager::new(
            &config.auth,
            Arc::clone(&users),
            revocation,
            principal_cache.clone(),
        );
        let user_service = UserService::new(Arc::clone(&users), principal_cache.clone(), &config.auth);
        let admin_user_service = AdminUserService::new(users, principal_cache.clone());

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            db_pool,
            principal_cache,
            session_manager: Arc::new(session_manager),
            user_service: Arc::new(user_service),
            admin_user_service: Arc::new(admin_user_service),
        }
    }
}
