//! Access log middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error, info, warn};

/// One log line per request, levelled by outcome.
///
/// Only the path is recorded; query strings can carry emails.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => error!(%method, %path, status, elapsed_ms, "Request failed"),
        400..=499 => warn!(%method, %path, status, elapsed_ms, "Request rejected"),
        _ if path.ends_with("/health") => debug!(%method, %path, status, elapsed_ms, "Health probe"),
        _ => info!(%method, %path, status, elapsed_ms, "Request served"),
    }

    response
}
