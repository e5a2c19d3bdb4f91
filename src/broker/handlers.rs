use super::protocol::*;
use super::service::Broker;
use crate::error::LifeError;

use axum::{
    Extension, Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Builds the broker's HTTP surface.
pub fn router(broker: Arc<Broker>) -> Router {
    let max_body_bytes = broker.config().max_body_bytes;
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(ENDPOINT_RUN, post(handle_run))
        .route(ENDPOINT_PAUSE, post(handle_toggle_pause))
        .route(ENDPOINT_SNAPSHOT, get(handle_snapshot))
        .route(ENDPOINT_ALIVE, get(handle_alive_count))
        .route(ENDPOINT_KILL, post(handle_kill))
        .route(ENDPOINT_DISCONNECT, post(handle_disconnect))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(Extension(broker))
}

pub fn status_for(error: &LifeError) -> StatusCode {
    match error {
        LifeError::Config(_) => StatusCode::BAD_REQUEST,
        LifeError::PoolExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        LifeError::Reassembly { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        LifeError::RunInProgress | LifeError::NoActiveRun | LifeError::RunEnded => {
            StatusCode::CONFLICT
        }
    }
}

fn reject(error: LifeError) -> HandlerError {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    } else {
        tracing::debug!("Request rejected: {}", error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub async fn handle_register(
    Extension(broker): Extension<Arc<Broker>>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<RegisterResponse>) {
    tracing::info!("Received subscription request from worker on {}", req.address);
    let registered = broker.register_worker(&req.address);

    (
        StatusCode::OK,
        Json(RegisterResponse {
            registered,
            workers: broker.registry.len(),
        }),
    )
}

pub async fn handle_run(
    Extension(broker): Extension<Arc<Broker>>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, HandlerError> {
    let outcome = broker.run(req.board, req.turns).await.map_err(reject)?;

    Ok(Json(RunResponse {
        final_board: outcome.final_board,
        alive_cells: outcome.alive_cells,
        completed_turns: outcome.completed_turns,
    }))
}

pub async fn handle_toggle_pause(
    Extension(broker): Extension<Arc<Broker>>,
) -> Result<Json<PauseResponse>, HandlerError> {
    let control = broker.control().await.map_err(reject)?;
    let resp = control.toggle_pause().await.map_err(reject)?;
    Ok(Json(resp))
}

pub async fn handle_snapshot(
    Extension(broker): Extension<Arc<Broker>>,
) -> Result<Json<SnapshotResponse>, HandlerError> {
    let control = broker.control().await.map_err(reject)?;
    let resp = control.snapshot().await.map_err(reject)?;
    Ok(Json(resp))
}

pub async fn handle_alive_count(
    Extension(broker): Extension<Arc<Broker>>,
) -> Result<Json<AliveCountResponse>, HandlerError> {
    let control = broker.control().await.map_err(reject)?;
    let resp = control.alive_count().await.map_err(reject)?;
    Ok(Json(resp))
}

pub async fn handle_kill(
    Extension(broker): Extension<Arc<Broker>>,
) -> Result<Json<Ack>, HandlerError> {
    let control = broker.control().await.map_err(reject)?;
    control.kill().await.map_err(reject)?;
    Ok(Json(Ack {}))
}

pub async fn handle_disconnect(
    Extension(broker): Extension<Arc<Broker>>,
) -> Result<Json<Ack>, HandlerError> {
    let control = broker.control().await.map_err(reject)?;
    control.disconnect().await.map_err(reject)?;
    Ok(Json(Ack {}))
}
