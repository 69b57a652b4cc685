//! Periodic expiry sweep
//!
//! Runs [`TileStore::sweep`] on a fixed interval, independent of request
//! traffic. A failed sweep is logged and the next tick still fires.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::errors::AppResult;
use crate::models::SweepOutcome;
use crate::services::TileStore;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

pub fn create_shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel(1)
}

pub struct SweepScheduler {
    store: TileStore,
    period: Duration,
    shutdown_rx: ShutdownReceiver,
}

impl SweepScheduler {
    pub fn new(store: TileStore, period: Duration, shutdown_rx: ShutdownReceiver) -> Self {
        Self {
            store,
            period,
            shutdown_rx,
        }
    }

    /// Sweep every `period` until a shutdown signal arrives or the sender is dropped
    ///
    /// The first sweep happens one full period after start.
    pub async fn start(mut self) {
        info!("Starting sweep scheduler (every {}s)", self.period.as_secs());

        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Auto-cleanup error: {}", e);
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Sweep scheduler stopping");
                    break;
                }
            }
        }
    }

    /// Run a single sweep now
    pub async fn tick(&self) -> AppResult<SweepOutcome> {
        debug!("Sweep scheduler tick");
        self.store.sweep().await
    }
}
