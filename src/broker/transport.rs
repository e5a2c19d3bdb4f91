//! Worker Transport
//!
//! The seam between the pool and the network. The pool only knows how to
//! `connect` to an address and then `compute` bands or `shutdown` through the
//! resulting link; [`HttpConnector`] implements that over the worker's HTTP API.

use crate::board::Row;
use crate::worker::protocol::{
    ComputeRequest, ComputeResponse, ENDPOINT_COMPUTE, ENDPOINT_HEALTH, ENDPOINT_SHUTDOWN,
};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The worker answered but refused the band with a 4xx status. Resending the
/// same band cannot succeed, so the turn loop fails the run instead of retrying.
#[derive(Debug, thiserror::Error)]
#[error("worker refused band with status {status}: {detail}")]
pub struct BandRejected {
    pub status: u16,
    pub detail: String,
}

/// An established connection to one worker.
#[async_trait]
pub trait WorkerLink: Send + Sync {
    /// Sends a halo-padded band and returns the next generation of its interior.
    async fn compute(&self, band: Vec<Row>) -> Result<Vec<Row>>;

    /// Asks the worker process to stop serving.
    async fn shutdown(&self) -> Result<()>;
}

/// Opens links to worker addresses.
#[async_trait]
pub trait WorkerConnector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Arc<dyn WorkerLink>>;
}

/// Connects to workers over HTTP. A connection is "open" once `GET /health` succeeds.
pub struct HttpConnector {
    http_client: reqwest::Client,
    connect_timeout: Duration,
}

impl HttpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl WorkerConnector for HttpConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn WorkerLink>> {
        let base_url = format!("http://{}", address);

        let response = self
            .http_client
            .get(format!("{}{}", base_url, ENDPOINT_HEALTH))
            .timeout(self.connect_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Health probe on {} failed: {}",
                address,
                response.status()
            ));
        }

        Ok(Arc::new(HttpWorkerLink {
            http_client: self.http_client.clone(),
            base_url,
            shutdown_timeout: self.connect_timeout,
        }))
    }
}

/// A worker reachable at `base_url`. Call deadlines are enforced by the pool.
pub struct HttpWorkerLink {
    http_client: reqwest::Client,
    base_url: String,
    shutdown_timeout: Duration,
}

#[async_trait]
impl WorkerLink for HttpWorkerLink {
    async fn compute(&self, band: Vec<Row>) -> Result<Vec<Row>> {
        let payload = ComputeRequest {
            band,
            includes_halos: true,
        };

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, ENDPOINT_COMPUTE))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BandRejected {
                status: status.as_u16(),
                detail,
            }
            .into());
        }
        if !status.is_success() {
            return Err(anyhow::anyhow!("Compute call failed: {}", status));
        }

        let body: ComputeResponse = response.json().await?;
        Ok(body.next_interior)
    }

    async fn shutdown(&self) -> Result<()> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, ENDPOINT_SHUTDOWN))
            .timeout(self.shutdown_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Shutdown call failed: {}", response.status()));
        }

        Ok(())
    }
}
