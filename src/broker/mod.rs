//! Broker (Orchestrator) Module
//!
//! Coordinates a run of the automaton across a pool of remote compute workers.
//!
//! ## Architecture Overview
//! 1. **Registration**: Workers subscribe via `POST /register`; addresses land in the
//!    `WorkerRegistry`.
//! 2. **Orchestration**: `POST /run` hands a board to the `Orchestrator`, whose turn loop
//!    owns the board and the `WorkerPool` for the whole run.
//! 3. **Recovery**: any failed band invalidates the turn; the pool is rebuilt and the
//!    turn retried from the pre-turn board, up to a bounded number of attempts.
//! 4. **Control plane**: pause/resume, snapshots, alive counts, kill and disconnect reach
//!    the loop through a single prioritized inbox, serviced once per turn boundary.
//!
//! ## Submodules
//! - **`registry`**: Ordered, de-duplicated worker address registry.
//! - **`transport`**: `WorkerConnector`/`WorkerLink` traits and their HTTP implementation.
//! - **`pool`**: Connection lifecycle, concurrent dispatch and ordered fan-in.
//! - **`control`**: Control requests, the inbox and the caller-side handle.
//! - **`turn_loop`**: The per-turn state machine.
//! - **`service`**: Shared broker state and the server entry point.
//! - **`handlers`** / **`protocol`**: The HTTP API.
//! - **`client`**: Typed HTTP client for the broker API.

pub mod client;
pub mod control;
pub mod handlers;
pub mod pool;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod transport;
pub mod turn_loop;
pub mod types;
