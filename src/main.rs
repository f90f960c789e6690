//! Gatehouse Server: credential, token and principal-cache service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_api::AppState;
use gatehouse_cache::CacheManager;
use gatehouse_core::config::{AppConfig, LogFormat};
use gatehouse_core::error::AppError;
use gatehouse_database::{DatabasePool, MemoryUserRepository, PgUserRepository, UserRepository};

#[tokio::main]
async fn main() {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Install the global subscriber.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_placeholder_secrets() {
        tracing::warn!("Token secrets are still the shipped placeholders; set GATEHOUSE__AUTH__* before deploying");
    }

    // ── Step 1: Primary store ────────────────────────────────────
    let (db_pool, users) = connect_user_store(&config).await?;

    // ── Step 2: Principal cache ──────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing principal cache");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Revocation store ─────────────────────────────────
    tracing::info!(
        provider = %config.revocation.provider,
        failure_policy = ?config.revocation.failure_policy,
        "Initializing revocation store"
    );
    let revocation = CacheManager::new(&config.revocation.as_cache_config()).await?;

    // ── Step 4: Services and router ──────────────────────────────
    let server_config = config.server.clone();
    let state = AppState::new(config, db_pool.clone(), users, cache, revocation);
    let app = gatehouse_api::build_router(state);

    // ── Step 5: Bind and serve ───────────────────────────────────
    let addr = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "Gatehouse listening");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });

    let grace = Duration::from_secs(server_config.shutdown_grace_seconds);
    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, dropping open connections");
        }
    }

    // ── Step 7: Disconnect ───────────────────────────────────────
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Gatehouse shut down gracefully");
    Ok(())
}

/// Connect the configured user store, running migrations for PostgreSQL.
async fn connect_user_store(
    config: &AppConfig,
) -> Result<(Option<DatabasePool>, Arc<dyn UserRepository>), AppError> {
    match config.database.provider.as_str() {
        "postgres" => {
            let pool = DatabasePool::connect(&config.database).await?;

            if config.database.run_migrations {
                pool.migrate().await?;
            }

            let users: Arc<dyn UserRepository> =
                Arc::new(PgUserRepository::new(pool.pool().clone()));
            Ok((Some(pool), users))
        }
        "memory" => {
            tracing::warn!("Using the in-memory user store; accounts are lost on restart");
            let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
            Ok((None, users))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider: '{other}'. Supported: postgres, memory"
        ))),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
