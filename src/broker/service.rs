//! Broker Service
//!
//! Shared state behind the broker's HTTP surface. Holds the worker registry and
//! the orchestrator, admits one run at a time, and publishes the active run's
//! control handle so control-plane calls can reach its turn loop.

use super::control::{self, ControlHandle};
use super::handlers::router;
use super::registry::WorkerRegistry;
use super::transport::{HttpConnector, WorkerConnector};
use super::turn_loop::{Orchestrator, RunOutcome};
use super::types::StopReason;
use crate::board::Board;
use crate::config::BrokerConfig;
use crate::error::{LifeError, Result};

use std::sync::{Arc, PoisonError, RwLock};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};

pub struct Broker {
    pub registry: Arc<WorkerRegistry>,
    orchestrator: Orchestrator,
    /// Held for the duration of a run.
    run_lock: Mutex<()>,
    /// Control handle of the active run, if any.
    active: RwLock<Option<ControlHandle>>,
    /// Notified when a kill asks the broker itself to stop serving.
    shutdown: Arc<Notify>,
}

impl Broker {
    pub fn new(config: BrokerConfig, connector: Arc<dyn WorkerConnector>) -> Arc<Self> {
        let registry = WorkerRegistry::new();
        Arc::new(Self {
            registry: registry.clone(),
            orchestrator: Orchestrator::new(config, registry, connector),
            run_lock: Mutex::new(()),
            active: RwLock::new(None),
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// A broker that reaches its workers over HTTP.
    pub fn with_http(config: BrokerConfig) -> Arc<Self> {
        let connector = Arc::new(HttpConnector::new(config.connect_timeout));
        Self::new(config, connector)
    }

    pub fn register_worker(&self, address: &str) -> bool {
        self.registry.register(address)
    }

    pub fn config(&self) -> &BrokerConfig {
        self.orchestrator.config()
    }

    /// Executes one orchestration call. Fails with `RunInProgress` if another is active.
    ///
    /// Dropping the returned future cancels the run and withdraws its control handle.
    pub async fn run(&self, board: Board, turns: u32) -> Result<RunOutcome> {
        let _guard = self.run_lock.try_lock().map_err(|_| LifeError::RunInProgress)?;

        let (handle, inbox) = control::inbox(self.orchestrator.config().inbox_capacity);
        let _published = PublishedHandle::new(&self.active, handle);

        let result = self.orchestrator.run(board, turns, inbox).await;

        if let Ok(outcome) = &result {
            if outcome.stop == StopReason::Killed {
                tracing::info!("Broker shutting down after kill");
                self.shutdown.notify_one();
            }
        }

        result
    }

    /// Control handle of the active run.
    pub async fn control(&self) -> Result<ControlHandle> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(LifeError::NoActiveRun)
    }

    pub fn shutdown_signal(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }
}

/// Keeps a run's control handle published until dropped, including on cancellation.
struct PublishedHandle<'a> {
    slot: &'a RwLock<Option<ControlHandle>>,
}

impl<'a> PublishedHandle<'a> {
    fn new(slot: &'a RwLock<Option<ControlHandle>>, handle: ControlHandle) -> Self {
        *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Self { slot }
    }
}

impl Drop for PublishedHandle<'_> {
    fn drop(&mut self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Runs a broker until killed or Ctrl+C.
pub async fn run_broker(config: BrokerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("Broker listening on {}", listener.local_addr()?);

    let broker = Broker::with_http(config);
    let shutdown = broker.shutdown_signal();
    let app = router(broker);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown.notified() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl+C");
                }
            }
        })
        .await?;

    tracing::info!("Broker stopped");
    Ok(())
}
