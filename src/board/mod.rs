//! Board Module
//!
//! The board is a rectangular grid of single-byte cells stored row by row.
//! `0xFF` marks a live cell and `0x00` a dead one, matching the PGM-style
//! snapshots produced by the image I/O tooling.
//!
//! The board is treated as a torus: row wrap-around is handled by the halo rows
//! attached during partitioning, column wrap-around inside the worker.

pub mod types;


pub use types::{ALIVE, Board, Cell, DEAD, Row};
