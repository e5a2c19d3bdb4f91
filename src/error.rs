//! Error taxonomy for the orchestrator.
//!
//! Worker faults never appear here: they are absorbed by the turn loop and only
//! surface as [`LifeError::PoolExhausted`] once recovery gives up.

#[derive(Debug, thiserror::Error)]
pub enum LifeError {
    /// Zero workers, empty board, ragged rows, bad cell bytes.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker pool exhausted after {attempts} consecutive failed attempts")]
    PoolExhausted { attempts: u32 },

    /// Reconstructed board does not match the board it was computed from.
    #[error("reassembly mismatch: expected {expected} rows, got {actual}")]
    Reassembly { expected: usize, actual: usize },

    #[error("another run is already in progress")]
    RunInProgress,

    #[error("no run is currently active")]
    NoActiveRun,

    #[error("run ended before the request was serviced")]
    RunEnded,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, LifeError>;
