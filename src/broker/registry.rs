//! Worker Address Registry
//!
//! The static list of worker addresses consulted whenever the pool is
//! (re)established. Registration order is preserved so that pool rebuilds, and
//! therefore band assignment, are reproducible.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of worker addresses, shared between the HTTP surface and the turn loop.
pub struct WorkerRegistry {
    /// `address -> registration sequence number`.
    workers: DashMap<String, u64>,
    next_seq: AtomicU64,
    /// Bumped on every new registration; the turn loop compares it at turn boundaries.
    generation: AtomicU64,
}

impl WorkerRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds `address` if it is not known yet. Returns whether it was added.
    pub fn register(&self, address: &str) -> bool {
        let address = address.trim();
        if address.is_empty() {
            tracing::warn!("Ignoring empty worker address");
            return false;
        }

        let mut added = false;
        self.workers.entry(address.to_string()).or_insert_with(|| {
            added = true;
            self.next_seq.fetch_add(1, Ordering::SeqCst)
        });

        if added {
            self.generation.fetch_add(1, Ordering::SeqCst);
            tracing::info!("Registered worker on {}", address);
        } else {
            tracing::debug!("Worker on {} already registered", address);
        }

        added
    }

    /// All addresses, in registration order.
    pub fn addresses(&self) -> Vec<String> {
        let mut entries: Vec<(u64, String)> = self
            .workers
            .iter()
            .map(|entry| (*entry.value(), entry.key().clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, address)| address).collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self {
            workers: DashMap::new(),
            next_seq: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }
}
