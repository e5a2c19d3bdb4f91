//! Compute Service Protocol
//!
//! Endpoints and Data Transfer Objects exchanged between the broker and a worker.

use crate::board::Row;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Liveness probe, used by the broker as its "connect" step.
pub const ENDPOINT_HEALTH: &str = "/health";
/// Advance one band by a generation.
pub const ENDPOINT_COMPUTE: &str = "/compute";
/// Ask the worker process to stop serving.
pub const ENDPOINT_SHUTDOWN: &str = "/shutdown";

// --- Data Transfer Objects ---

/// A band to advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// Interior rows, padded with a halo row on each side when `includes_halos` is set.
    pub band: Vec<Row>,
    pub includes_halos: bool,
}

/// The next generation of the request's interior rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub next_interior: Vec<Row>,
}
