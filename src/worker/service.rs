//! Worker Process Lifecycle
//!
//! Binds the compute service, subscribes to the broker, and serves until the
//! broker (or the operator) asks it to stop.

use super::handlers::router;
use crate::broker::client::BrokerClient;
use crate::config::WorkerConfig;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

const REGISTRATION_ATTEMPTS: usize = 10;

/// Runs a worker until `POST /shutdown` or Ctrl+C.
pub async fn run_worker(config: WorkerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Worker listening on {}", local_addr);

    let shutdown = Arc::new(Notify::new());
    let app = router(shutdown.clone(), config.max_body_bytes);

    // Serve before registering so the broker's first health probe succeeds
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await
    });

    let client = BrokerClient::new(config.broker);
    register_with_broker(&client, config.advertise, REGISTRATION_ATTEMPTS).await?;

    server.await??;
    tracing::info!("Worker on {} stopped", local_addr);

    Ok(())
}

/// Announces `advertise` to the broker, retrying with exponential backoff and jitter.
pub async fn register_with_broker(
    client: &BrokerClient,
    advertise: SocketAddr,
    attempts: usize,
) -> Result<()> {
    let mut delay_ms = 150u64;

    for attempt in 0..attempts {
        match client.register(&advertise.to_string()).await {
            Ok(resp) => {
                tracing::info!(
                    "Registered with broker {} as {} ({} workers known)",
                    client.broker(),
                    advertise,
                    resp.workers
                );
                return Ok(());
            }
            Err(e) => {
                if attempt + 1 == attempts {
                    return Err(e.context(format!(
                        "failed to register with broker {}",
                        client.broker()
                    )));
                }
                tracing::warn!("Registration attempt {} failed: {}", attempt + 1, e);
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }
    }

    Err(anyhow::anyhow!("Registration attempts exhausted"))
}

async fn wait_for_shutdown(shutdown: Arc<Notify>) {
    tokio::select! {
        _ = shutdown.notified() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C");
        }
    }
}
