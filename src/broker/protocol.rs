//! Broker Network Protocol
//!
//! Endpoints and Data Transfer Objects for the orchestration call, the control
//! plane and worker registration. All bodies are JSON.

use crate::board::{Board, Cell};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Workers announce themselves here on startup.
pub const ENDPOINT_REGISTER: &str = "/register";
/// Submit a board and a turn count; answers when the run ends.
pub const ENDPOINT_RUN: &str = "/run";
pub const ENDPOINT_PAUSE: &str = "/control/pause";
pub const ENDPOINT_SNAPSHOT: &str = "/control/snapshot";
pub const ENDPOINT_ALIVE: &str = "/control/alive";
pub const ENDPOINT_KILL: &str = "/control/kill";
pub const ENDPOINT_DISCONNECT: &str = "/control/disconnect";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// `host:port` the broker should dial.
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// `false` when the address was already known.
    pub registered: bool,
    /// Size of the registry after this call.
    pub workers: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunRequest {
    pub board: Board,
    pub turns: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub final_board: Board,
    pub alive_cells: Vec<Cell>,
    /// Fewer than requested when the run was killed or disconnected.
    pub completed_turns: u32,
}

/// Reply to a pause toggle. `turn` is the number of completed turns at service time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PauseResponse {
    pub resuming: bool,
    pub turn: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub board: Board,
    pub turn: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliveCountResponse {
    pub count: usize,
    pub turn: u32,
}

/// Body of Kill and Disconnect replies.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ack {}

/// Body returned alongside any non-success status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
