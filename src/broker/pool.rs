//! Worker Pool Manager
//!
//! Owns the set of worker connections for one run. Only the turn loop calls
//! into it, so none of its state needs locking.
//!
//! ## Responsibilities
//! - **Establishment**: dial every registered address independently; failures shrink
//!   the pool instead of aborting it.
//! - **Assignment**: keep an explicit `band index -> handle index` table, rebuilt on
//!   every reconnect, so a smaller pool can never misalign bands.
//! - **Fan-out/fan-in**: one task per band, results collected in band order.

use super::transport::{BandRejected, WorkerConnector, WorkerLink};
use super::types::{ConnectionState, WorkerHandle};
use crate::board::Row;
use crate::partition::Band;

use std::sync::Arc;
use std::time::Duration;

/// Result of one dispatch round.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Next-generation interiors, indexed by band. `None` where the band failed.
    pub interiors: Vec<Option<Vec<Row>>>,
    /// Band indices whose call failed.
    pub failed: Vec<usize>,
    /// Bands a healthy worker refused outright, with the worker's reason.
    pub rejected: Vec<(usize, String)>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.rejected.is_empty()
    }
}

pub struct WorkerPool {
    connector: Arc<dyn WorkerConnector>,
    handles: Vec<WorkerHandle>,
    /// `assignment[band_index]` is the index into `handles` serving that band.
    assignment: Vec<usize>,
    call_timeout: Duration,
}

impl WorkerPool {
    pub fn new(connector: Arc<dyn WorkerConnector>, call_timeout: Duration) -> Self {
        Self {
            connector,
            handles: Vec::new(),
            assignment: Vec::new(),
            call_timeout,
        }
    }

    /// Closes every open handle, then opens one connection per address.
    ///
    /// Returns the number of workers that connected.
    pub async fn reconnect(&mut self, addresses: &[String]) -> usize {
        self.close_all(false).await;

        // Dial concurrently; a slow or dead address must not hold up the others
        let attempts: Vec<_> = addresses
            .iter()
            .map(|address| {
                let connector = self.connector.clone();
                let address = address.clone();
                tokio::spawn(async move { connector.connect(&address).await })
            })
            .collect();

        let mut handles = Vec::with_capacity(addresses.len());
        for (address, attempt) in addresses.iter().zip(attempts) {
            let mut handle = WorkerHandle::unconnected(address.clone());
            match attempt.await {
                Ok(Ok(link)) => {
                    tracing::info!("Broker connected to worker on {}", address);
                    handle.state = ConnectionState::Connected;
                    handle.link = Some(link);
                }
                Ok(Err(e)) => {
                    tracing::warn!("Broker dialing error on {}: {}", address, e);
                    handle.state = ConnectionState::Failed;
                }
                Err(e) => {
                    tracing::error!("Connect task for {} aborted: {}", address, e);
                    handle.state = ConnectionState::Failed;
                }
            }
            handles.push(handle);
        }

        self.handles = handles;
        self.assignment = self
            .handles
            .iter()
            .enumerate()
            .filter(|(_, handle)| handle.is_connected())
            .map(|(index, _)| index)
            .collect();

        if self.assignment.len() < addresses.len() {
            tracing::warn!(
                "Worker pool reduced to {} of {} registered workers",
                self.assignment.len(),
                addresses.len()
            );
        }

        self.assignment.len()
    }

    /// Number of workers eligible for bands.
    pub fn connected(&self) -> usize {
        self.assignment.len()
    }

    pub fn handles(&self) -> &[WorkerHandle] {
        &self.handles
    }

    /// Sends every band to its assigned worker concurrently and waits for all of them.
    ///
    /// A band fails on transport error, timeout, task panic, a missing worker, or a
    /// result whose shape does not match the band's interior. Failed workers are
    /// marked [`ConnectionState::Failed`]. A [`BandRejected`] reply is reported
    /// separately and leaves the worker connected.
    pub async fn dispatch(&mut self, bands: Vec<Band>) -> DispatchOutcome {
        let mut calls = Vec::with_capacity(bands.len());

        for band in bands {
            let index = band.index;
            let expected_rows = band.interior_len();
            let expected_width = band.rows.first().map(|row| row.len()).unwrap_or(0);
            let rows = band.rows;

            let link: Option<Arc<dyn WorkerLink>> = self
                .assignment
                .get(index)
                .and_then(|&h| self.handles[h].link.clone());

            let call_timeout = self.call_timeout;
            let task = link.map(|link| {
                tokio::spawn(async move {
                    match tokio::time::timeout(call_timeout, link.compute(rows)).await {
                        Ok(Ok(rows)) => {
                            if rows.len() != expected_rows
                                || rows.iter().any(|row| row.len() != expected_width)
                            {
                                Err(anyhow::anyhow!(
                                    "worker returned {} rows, expected {}x{}",
                                    rows.len(),
                                    expected_rows,
                                    expected_width
                                ))
                            } else {
                                Ok(rows)
                            }
                        }
                        Ok(Err(e)) => Err(e),
                        Err(_) => Err(anyhow::anyhow!("timed out after {:?}", call_timeout)),
                    }
                })
            });
            calls.push((index, task));
        }

        // Fan-in in band order, regardless of completion order
        let mut interiors = Vec::with_capacity(calls.len());
        let mut failed = Vec::new();
        let mut rejected = Vec::new();

        for (index, task) in calls {
            let result = match task {
                Some(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow::anyhow!("compute task aborted: {}", e)),
                },
                None => Err(anyhow::anyhow!("no worker assigned")),
            };

            match result {
                Ok(rows) => interiors.push(Some(rows)),
                Err(e) if e.is::<BandRejected>() => {
                    tracing::warn!("Band {} refused: {}", index, e);
                    interiors.push(None);
                    rejected.push((index, e.to_string()));
                }
                Err(e) => {
                    let address = self.mark_failed(index);
                    tracing::warn!(
                        "Band {} failed on worker {}: {}",
                        index,
                        address.as_deref().unwrap_or("<none>"),
                        e
                    );
                    interiors.push(None);
                    failed.push(index);
                }
            }
        }

        DispatchOutcome {
            interiors,
            failed,
            rejected,
        }
    }

    /// Drops every connection. With `notify_workers`, first asks each connected
    /// worker to shut down (best effort).
    pub async fn close_all(&mut self, notify_workers: bool) {
        if notify_workers {
            let calls: Vec<_> = self
                .handles
                .iter()
                .filter_map(|handle| {
                    let link = handle.link.clone()?;
                    let address = handle.address.clone();
                    Some(tokio::spawn(async move { (address, link.shutdown().await) }))
                })
                .collect();

            for call in calls {
                match call.await {
                    Ok((address, Ok(()))) => {
                        tracing::info!("Worker on {} acknowledged shutdown", address)
                    }
                    Ok((address, Err(e))) => {
                        tracing::warn!("Failed to shut down worker on {}: {}", address, e)
                    }
                    Err(e) => tracing::warn!("Shutdown task aborted: {}", e),
                }
            }
        }

        for handle in self.handles.iter_mut() {
            handle.link = None;
            handle.state = ConnectionState::Unconnected;
        }
        self.handles.clear();
        self.assignment.clear();
    }

    fn mark_failed(&mut self, band_index: usize) -> Option<String> {
        let &handle_index = self.assignment.get(band_index)?;
        let handle = self.handles.get_mut(handle_index)?;
        handle.state = ConnectionState::Failed;
        Some(handle.address.clone())
    }
}
