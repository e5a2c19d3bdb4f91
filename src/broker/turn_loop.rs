//! Orchestrator Turn Loop
//!
//! Drives one run from the submitted board to the final generation. Each turn:
//!
//! 1. **Partition** the current board across the connected workers.
//! 2. **Dispatch** the bands concurrently.
//! 3. **Recover**: if any band failed, rebuild the pool and retry the whole turn from
//!    the pre-turn board, with bounded attempts and backoff.
//! 4. **Reassemble** the interiors in band order.
//! 5. **Service** the control plane against the pre-turn board, which is a complete,
//!    consistent generation.
//! 6. **Advance** to the new board, then stop early if a kill or disconnect was seen.

use super::control::{ControlInbox, ControlRequest};
use super::pool::WorkerPool;
use super::protocol::{AliveCountResponse, PauseResponse, SnapshotResponse};
use super::registry::WorkerRegistry;
use super::transport::WorkerConnector;
use super::types::{RunId, StopReason};
use crate::board::{Board, Cell};
use crate::config::BrokerConfig;
use crate::error::{LifeError, Result};
use crate::partition::{partition, reassemble};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// What a run hands back to the orchestration caller.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub final_board: Board,
    /// Row-major scan of `final_board`.
    pub alive_cells: Vec<Cell>,
    pub completed_turns: u32,
    pub stop: StopReason,
}

impl RunOutcome {
    fn new(final_board: Board, completed_turns: u32, stop: StopReason) -> Self {
        let alive_cells = final_board.alive_cells();
        Self {
            final_board,
            alive_cells,
            completed_turns,
            stop,
        }
    }
}

/// Result of servicing the control plane at one turn boundary.
enum Boundary {
    Continue,
    Stop {
        reason: StopReason,
        /// Kill callers, answered once the final generation exists.
        kill_replies: Vec<oneshot::Sender<()>>,
    },
}

/// Runs turn loops against the shared worker registry.
pub struct Orchestrator {
    config: BrokerConfig,
    registry: Arc<WorkerRegistry>,
    connector: Arc<dyn WorkerConnector>,
}

impl Orchestrator {
    pub fn new(
        config: BrokerConfig,
        registry: Arc<WorkerRegistry>,
        connector: Arc<dyn WorkerConnector>,
    ) -> Self {
        Self {
            config,
            registry,
            connector,
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Computes up to `turns` generations of `board`, servicing `inbox` between turns.
    ///
    /// Returns a configuration error before any work is done, `PoolExhausted` when a
    /// turn cannot be completed within `max_attempts`, or the final board.
    pub async fn run(
        &self,
        board: Board,
        turns: u32,
        mut inbox: ControlInbox,
    ) -> Result<RunOutcome> {
        board.validate()?;

        let run_id = RunId::new();

        if turns == 0 {
            tracing::info!("Run {}: zero turns requested, returning input board", run_id);
            return Ok(RunOutcome::new(board, 0, StopReason::Completed));
        }

        if self.registry.is_empty() {
            return Err(LifeError::Config("no workers registered".to_string()));
        }

        tracing::info!(
            "Run {}: {}x{} board for {} turns",
            run_id,
            board.width(),
            board.height(),
            turns
        );

        let mut pool = WorkerPool::new(self.connector.clone(), self.config.call_timeout);
        let mut seen_generation = self.registry.generation();
        pool.reconnect(&self.registry.addresses()).await;

        let mut current = board;
        let mut turn: u32 = 0;
        let mut paused = false;
        let mut stop = StopReason::Completed;
        let mut kill_replies = Vec::new();

        while turn < turns {
            // New registrations join at the next partitioning
            let generation = self.registry.generation();
            if generation != seen_generation {
                tracing::info!("Run {}: worker registry changed, rebuilding pool", run_id);
                seen_generation = generation;
                pool.reconnect(&self.registry.addresses()).await;
            }

            let next = match self
                .compute_turn(&run_id, &mut pool, &current, turn, &mut seen_generation)
                .await
            {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!("Run {} aborted at turn {}: {}", run_id, turn, e);
                    pool.close_all(false).await;
                    return Err(e);
                }
            };

            let boundary = self
                .service_control(&mut inbox, &current, turn, &mut paused)
                .await;

            current = next;
            turn += 1;
            tracing::debug!("Run {}: completed turn {}", run_id, turn);

            if let Boundary::Stop {
                reason,
                kill_replies: replies,
            } = boundary
            {
                stop = reason;
                kill_replies = replies;
                break;
            }
        }

        match stop {
            StopReason::Killed => {
                tracing::info!(
                    "Run {} killed: final snapshot flushed at turn {} ({} alive)",
                    run_id,
                    turn,
                    current.alive_count()
                );
                for reply in kill_replies {
                    let _ = reply.send(());
                }
                pool.close_all(true).await;
            }
            StopReason::Disconnected => {
                tracing::info!("Run {}: controller disconnected at turn {}", run_id, turn);
                pool.close_all(false).await;
            }
            StopReason::Completed => {
                tracing::info!("Run {}: completed {} turns", run_id, turn);
                pool.close_all(false).await;
            }
        }

        Ok(RunOutcome::new(current, turn, stop))
    }

    /// Produces the next generation, retrying the whole turn until every band succeeds
    /// or `max_attempts` consecutive attempts have failed. A band refused by its worker
    /// fails the run at once as a configuration error.
    async fn compute_turn(
        &self,
        run_id: &RunId,
        pool: &mut WorkerPool,
        current: &Board,
        turn: u32,
        seen_generation: &mut u64,
    ) -> Result<Board> {
        let mut failures: u32 = 0;

        loop {
            let workers = pool.connected().min(current.height());

            if workers == 0 {
                tracing::warn!("Run {}: no reachable workers for turn {}", run_id, turn);
            } else {
                let bands = partition(current, workers)?;
                let outcome = pool.dispatch(bands).await;

                if let Some((band, reason)) = outcome.rejected.first() {
                    return Err(LifeError::Config(format!(
                        "band {} was refused by its worker: {}",
                        band, reason
                    )));
                }

                if outcome.is_complete() {
                    let interiors = outcome.interiors.into_iter().flatten();
                    return reassemble(current.height(), interiors);
                }

                tracing::warn!(
                    "Run {}: fault detected on bands {:?} at turn {}, retrying turn",
                    run_id,
                    outcome.failed,
                    turn
                );
            }

            failures += 1;
            if failures >= self.config.max_attempts {
                return Err(LifeError::PoolExhausted { attempts: failures });
            }

            let jitter = Duration::from_millis(rand::random::<u64>() % 50);
            tokio::time::sleep(self.config.backoff(failures) + jitter).await;

            *seen_generation = self.registry.generation();
            pool.reconnect(&self.registry.addresses()).await;
        }
    }

    /// Services queued control requests against `board`, the generation after `turn`
    /// completed turns. Blocks only while paused.
    async fn service_control(
        &self,
        inbox: &mut ControlInbox,
        board: &Board,
        turn: u32,
        paused: &mut bool,
    ) -> Boundary {
        let mut stop: Option<StopReason> = None;
        let mut kill_replies = Vec::new();

        for request in inbox.drain() {
            handle_request(request, board, turn, paused, &mut stop, &mut kill_replies);
        }

        while *paused && stop.is_none() {
            match inbox.recv().await {
                Some(request) => {
                    handle_request(request, board, turn, paused, &mut stop, &mut kill_replies)
                }
                None => {
                    tracing::warn!("Control inbox closed while paused, resuming");
                    *paused = false;
                }
            }
        }

        match stop {
            Some(reason) => Boundary::Stop {
                reason,
                kill_replies,
            },
            None => Boundary::Continue,
        }
    }
}

fn handle_request(
    request: ControlRequest,
    board: &Board,
    turn: u32,
    paused: &mut bool,
    stop: &mut Option<StopReason>,
    kill_replies: &mut Vec<oneshot::Sender<()>>,
) {
    match request {
        ControlRequest::Kill { reply } => {
            tracing::info!("Kill requested at turn {}", turn);
            *stop = Some(StopReason::Killed);
            kill_replies.push(reply);
        }
        ControlRequest::Disconnect { reply } => {
            tracing::info!("Disconnect requested at turn {}", turn);
            if stop.is_none() {
                *stop = Some(StopReason::Disconnected);
            }
            let _ = reply.send(());
        }
        ControlRequest::Snapshot { reply } => {
            tracing::debug!("Snapshot requested at turn {}", turn);
            let _ = reply.send(SnapshotResponse {
                board: board.clone(),
                turn,
            });
        }
        ControlRequest::AliveCount { reply } => {
            let _ = reply.send(AliveCountResponse {
                count: board.alive_count(),
                turn,
            });
        }
        ControlRequest::TogglePause { reply } => {
            *paused = !*paused;
            if *paused {
                tracing::info!("Paused at turn {}", turn);
            } else {
                tracing::info!("Resuming from turn {}", turn);
            }
            let _ = reply.send(PauseResponse {
                resuming: !*paused,
                turn,
            });
        }
    }
}
