//! PostgreSQL pool lifecycle: connect, migrate, ping, close.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use gatehouse_core::config::{DatabaseConfig, redact_url};
use gatehouse_core::error::{AppError, ErrorKind};

/// Upper bound on a health ping.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Owned handle on the primary store's connection pool.
///
/// Built once by the binary and closed explicitly on shutdown.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Connecting to primary store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| database_error("Primary store connection failed", e))?;

        info!(size = pool.size(), "Primary store pool ready");
        Ok(Self { pool })
    }

    /// Apply the embedded `migrations/` directory.
    pub async fn migrate(&self) -> Result<(), AppError> {
        let migrator = sqlx::migrate!("../../migrations");
        info!(available = migrator.iter().count(), "Applying migrations");
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| database_error("Migration failed", e))
    }

    /// The underlying sqlx pool, for repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `SELECT 1` bounded by a short timeout. Never errors.
    pub async fn ping(&self) -> bool {
        let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        match tokio::time::timeout(PING_TIMEOUT, query).await {
            Ok(Ok(1)) => true,
            Ok(Ok(_)) => false,
            Ok(Err(e)) => {
                warn!(error = %e, "Primary store ping failed");
                false
            }
            Err(_) => {
                warn!("Primary store ping timed out");
                false
            }
        }
    }

    /// Wait for checked-out connections and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Primary store pool closed");
    }
}

fn database_error<E>(context: &str, e: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::with_source(ErrorKind::Database, format!("{context}: {e}"), e)
}
