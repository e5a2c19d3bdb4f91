//! Control-Plane Inbox
//!
//! External callers talk to a running turn loop through one bounded queue of
//! tagged requests. Each request carries a `oneshot` sender: the caller blocks on
//! it until the loop services the request at a turn boundary, so the turn number
//! it receives reflects when the request was actually handled.
//!
//! At most one request of each kind should be in flight at a time. Concurrent
//! same-kind requests are queued and answered in turn, but interleaved pause
//! toggles from several callers have no meaningful ordering.

use super::protocol::{AliveCountResponse, PauseResponse, SnapshotResponse};
use crate::error::{LifeError, Result};

use tokio::sync::{mpsc, oneshot};

/// A control-plane request waiting for the next turn boundary.
#[derive(Debug)]
pub enum ControlRequest {
    TogglePause {
        reply: oneshot::Sender<PauseResponse>,
    },
    Snapshot {
        reply: oneshot::Sender<SnapshotResponse>,
    },
    AliveCount {
        reply: oneshot::Sender<AliveCountResponse>,
    },
    /// Stop after this turn, flush a final snapshot and shut the workers down.
    Kill { reply: oneshot::Sender<()> },
    /// Stop after this turn, leaving the workers running.
    Disconnect { reply: oneshot::Sender<()> },
}

impl ControlRequest {
    /// Lower is serviced first within one drain.
    pub fn priority(&self) -> u8 {
        match self {
            ControlRequest::Kill { .. } => 0,
            ControlRequest::Disconnect { .. } => 1,
            ControlRequest::Snapshot { .. } => 2,
            ControlRequest::AliveCount { .. } => 3,
            ControlRequest::TogglePause { .. } => 4,
        }
    }
}

/// Creates a fresh inbox for one run.
pub fn inbox(capacity: usize) -> (ControlHandle, ControlInbox) {
    let (tx, rx) = mpsc::channel(capacity);
    (ControlHandle { tx }, ControlInbox { rx, capacity })
}

/// Caller side of the inbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlRequest>,
}

impl ControlHandle {
    /// Pauses a running loop, or resumes a paused one.
    pub async fn toggle_pause(&self) -> Result<PauseResponse> {
        self.request(|reply| ControlRequest::TogglePause { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SnapshotResponse> {
        self.request(|reply| ControlRequest::Snapshot { reply }).await
    }

    pub async fn alive_count(&self) -> Result<AliveCountResponse> {
        self.request(|reply| ControlRequest::AliveCount { reply }).await
    }

    /// Returns once the loop has computed its last turn and flushed the final generation.
    pub async fn kill(&self) -> Result<()> {
        self.request(|reply| ControlRequest::Kill { reply }).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| ControlRequest::Disconnect { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ControlRequest,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| LifeError::RunEnded)?;
        response.await.map_err(|_| LifeError::RunEnded)
    }
}

/// Turn-loop side of the inbox.
pub struct ControlInbox {
    rx: mpsc::Receiver<ControlRequest>,
    capacity: usize,
}

impl ControlInbox {
    /// Takes whatever is queued right now, up to one queue's worth, ordered by priority.
    /// Never waits.
    pub fn drain(&mut self) -> Vec<ControlRequest> {
        let mut batch = Vec::new();
        while batch.len() < self.capacity {
            match self.rx.try_recv() {
                Ok(request) => batch.push(request),
                Err(_) => break,
            }
        }
        // Stable: same-kind requests keep their arrival order
        batch.sort_by_key(ControlRequest::priority);
        batch
    }

    /// Waits for the next request. `None` once every caller handle is gone.
    pub async fn recv(&mut self) -> Option<ControlRequest> {
        self.rx.recv().await
    }
}
