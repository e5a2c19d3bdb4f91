use super::compute::compute_band;
use super::protocol::*;

use axum::{
    Extension, Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::Notify;

/// Builds the worker's HTTP surface. `shutdown` is notified by `POST /shutdown`;
/// `/compute` bodies above `max_body_bytes` are refused with 413.
pub fn router(shutdown: Arc<Notify>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_COMPUTE, post(handle_compute))
        .route(ENDPOINT_SHUTDOWN, post(handle_shutdown))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(Extension(shutdown))
}

pub async fn handle_health() -> StatusCode {
    StatusCode::OK
}

pub async fn handle_compute(
    Json(req): Json<ComputeRequest>,
) -> Result<Json<ComputeResponse>, (StatusCode, String)> {
    tracing::debug!(
        "Computing band of {} rows (halos: {})",
        req.band.len(),
        req.includes_halos
    );

    // Keep the CPU-bound loop off the async executor threads
    let result =
        tokio::task::spawn_blocking(move || compute_band(&req.band, req.includes_halos)).await;

    match result {
        Ok(Ok(next_interior)) => Ok(Json(ComputeResponse { next_interior })),
        Ok(Err(e)) => {
            tracing::warn!("Rejected band: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Band computation panicked: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "band computation failed".to_string(),
            ))
        }
    }
}

pub async fn handle_shutdown(Extension(shutdown): Extension<Arc<Notify>>) -> StatusCode {
    tracing::info!("Shutdown requested by broker");
    shutdown.notify_one();
    StatusCode::OK
}
