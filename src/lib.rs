//! Distributed Game of Life
//!
//! A broker partitions a toroidal Game of Life board into row bands, fans the
//! bands out to a pool of remote workers over HTTP, and reassembles the next
//! generation every turn. Between turns it services a small control plane
//! (pause/resume, snapshots, alive-cell counts, kill, disconnect).
//!
//! ## Modules
//! - **`board`**: The board representation, cell encoding and alive-cell scans.
//! - **`partition`**: Splits a board into contiguous bands with toroidal halo rows,
//!   and stitches worker results back together.
//! - **`worker`**: The stateless compute service. Evaluates the transition rule over
//!   one band per call.
//! - **`broker`**: The orchestrator. Owns the worker registry and pool, runs the turn
//!   loop with fault recovery, and exposes the orchestration and control endpoints.
//! - **`config`**: Process tunables with environment overrides.
//! - **`error`**: The error taxonomy reported to orchestration callers.

pub mod board;
pub mod broker;
pub mod config;
pub mod error;
pub mod partition;
pub mod worker;
