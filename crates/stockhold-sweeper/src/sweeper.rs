//! # Expiry Sweeper
//!
//! Persists `expired` for reservations whose window has passed.
//!
//! ## Sweep Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ExpirySweeper::run                               │
//! │                                                                         │
//! │   ┌──────────────┐  tick (every interval_secs, first one immediate)    │
//! │   │   interval   │────────────────────┐                                │
//! │   └──────────────┘                    ▼                                │
//! │                         manager.sweep_expired()                         │
//! │                           │                  │                          │
//! │                        Ok(n)               Err(e)                       │
//! │                   info! if n > 0      error!, keep looping              │
//! │                                                                         │
//! │   ┌──────────────┐                                                     │
//! │   │ SweeperHandle│── shutdown() ──► loop exits, returns SweepStats     │
//! │   └──────────────┘                                                     │
//! │                                                                         │
//! │  A slow sweep delays the next tick instead of bunching ticks up.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads never depend on the sweep: a lapsed reservation already reads as
//! expired. The sweep only makes the stored status catch up.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use stockhold_db::{ReservationManager, TransactionSource};

use crate::error::{SweepError, SweepResult};

// =============================================================================
// Stats
// =============================================================================

/// Totals for one sweeper lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Sweeps attempted.
    pub runs: u64,
    /// Reservations flipped to `expired`.
    pub expired: u64,
    /// Sweeps that returned an error.
    pub failures: u64,
}

// =============================================================================
// Sweeper
// =============================================================================

/// Periodic expiry sweep over a [`ReservationManager`].
pub struct ExpirySweeper<S> {
    manager: Arc<ReservationManager<S>>,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running sweeper.
#[derive(Clone)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    /// Triggers graceful shutdown. The current sweep, if any, finishes first.
    pub async fn shutdown(&self) -> SweepResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SweepError::ChannelError("Shutdown channel closed".into()))
    }
}

impl<S: TransactionSource> ExpirySweeper<S> {
    /// Creates a sweeper and the handle that stops it.
    pub fn new(manager: Arc<ReservationManager<S>>, interval: Duration) -> (Self, SweeperHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let sweeper = ExpirySweeper {
            manager,
            interval,
            shutdown_rx,
        };

        (sweeper, SweeperHandle { shutdown_tx })
    }

    /// Runs a single sweep.
    pub async fn run_once(&self) -> SweepResult<u64> {
        Ok(self.manager.sweep_expired().await?)
    }

    /// Runs the sweep loop until shutdown.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) -> SweepStats {
        info!(interval_secs = self.interval.as_secs(), "Expiry sweeper starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut stats = SweepStats::default();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    stats.runs += 1;
                    match self.run_once().await {
                        Ok(n) => {
                            stats.expired += n;
                            debug!(expired = n, run = stats.runs, "Sweep finished");
                        }
                        Err(e) => {
                            stats.failures += 1;
                            error!(error = %e, "Expiry sweep failed");
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Expiry sweeper shutting down");
                    break;
                }
            }
        }

        info!(
            runs = stats.runs,
            expired = stats.expired,
            failures = stats.failures,
            "Expiry sweeper stopped"
        );
        stats
    }
}

// =============================================================================
// Tests
// =============================================================================
