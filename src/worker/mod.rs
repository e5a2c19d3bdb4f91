//! Compute Worker Module
//!
//! A worker is a stateless HTTP service that advances one band of the board by a
//! single generation. It remembers nothing between calls, so the broker can
//! resend the same band to any worker (at-least-once delivery) without harm.
//!
//! ## Submodules
//! - **`compute`**: The transition rule and the band evaluation loop.
//! - **`protocol`**: Endpoints and DTOs of the compute service.
//! - **`handlers`**: Axum handlers and router construction.
//! - **`service`**: Process lifecycle: registration with the broker and serving.

pub mod compute;
pub mod handlers;
pub mod protocol;
pub mod service;
