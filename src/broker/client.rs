//! Broker Client
//!
//! Typed wrapper over the broker's HTTP API, used by workers to register and by
//! controllers to submit runs and drive the control plane.

use super::protocol::*;
use crate::board::Board;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct BrokerClient {
    broker: SocketAddr,
    base_url: String,
    http_client: reqwest::Client,
}

impl BrokerClient {
    pub fn new(broker: SocketAddr) -> Self {
        Self {
            broker,
            base_url: format!("http://{}", broker),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn broker(&self) -> SocketAddr {
        self.broker
    }

    pub async fn register(&self, address: &str) -> Result<RegisterResponse> {
        self.post(
            ENDPOINT_REGISTER,
            &RegisterRequest {
                address: address.to_string(),
            },
        )
        .await
    }

    /// Submits a board and blocks until the run ends.
    pub async fn run(&self, board: Board, turns: u32) -> Result<RunResponse> {
        self.post(ENDPOINT_RUN, &RunRequest { board, turns }).await
    }

    pub async fn toggle_pause(&self) -> Result<PauseResponse> {
        self.post(ENDPOINT_PAUSE, &()).await
    }

    pub async fn snapshot(&self) -> Result<SnapshotResponse> {
        self.get(ENDPOINT_SNAPSHOT).await
    }

    pub async fn alive_count(&self) -> Result<AliveCountResponse> {
        self.get(ENDPOINT_ALIVE).await
    }

    pub async fn kill(&self) -> Result<()> {
        let _: Ack = self.post(ENDPOINT_KILL, &()).await?;
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        let _: Ack = self.post(ENDPOINT_DISCONNECT, &()).await?;
        Ok(())
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, endpoint))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, endpoint))
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let detail = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => String::from("no details"),
        };
        return Err(anyhow::anyhow!("Broker returned {}: {}", status, detail));
    }
    Ok(response.json().await?)
}
