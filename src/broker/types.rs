use super::transport::WorkerLink;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of one orchestration call, used to correlate log lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not dialed yet, or closed.
    Unconnected,
    /// Passed its health probe and is eligible for bands.
    Connected,
    /// Failed to connect, or failed a compute call this attempt.
    Failed,
}

/// A live (or dead) connection to one worker process.
pub struct WorkerHandle {
    pub address: String,
    pub state: ConnectionState,
    pub(crate) link: Option<Arc<dyn WorkerLink>>,
}

impl WorkerHandle {
    pub fn unconnected(address: String) -> Self {
        Self {
            address,
            state: ConnectionState::Unconnected,
            link: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.link.is_some()
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("address", &self.address)
            .field("state", &self.state)
            .finish()
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// All requested turns were computed.
    Completed,
    Killed,
    Disconnected,
}
