//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

fn label(healthy: bool) -> String {
    if healthy { "up" } else { "down" }.to_string()
}

/// GET /api/v1/health
///
/// 503 only when the primary store is unreachable. Cache and revocation
/// outages degrade the service but do not stop it.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match &state.db_pool {
        Some(pool) => pool.ping().await,
        None => true,
    };
    let cache = state.principal_cache.is_healthy().await;
    let revocation = state
        .session_manager
        .verifier()
        .revocation()
        .is_healthy()
        .await;

    let (status, code) = match (database, cache && revocation) {
        (false, _) => ("unavailable", StatusCode::SERVICE_UNAVAILABLE),
        (true, false) => ("degraded", StatusCode::OK),
        (true, true) => ("ok", StatusCode::OK),
    };

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: label(database),
        cache: label(cache),
        revocation: label(revocation),
    };

    (code, Json(ApiResponse::ok(body)))
}
