//! Recurring mirror cycles with an explicit start/stop lifecycle.
//!
//! [`MirrorScheduler::start`] spawns the loop and returns a [`MirrorHandle`];
//! the server keeps the handle for its whole lifetime and calls
//! [`MirrorHandle::shutdown`] after it stops accepting connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::pipeline::MatchMirror;

/// Default interval between cycles.
pub const DEFAULT_MIRROR_INTERVAL: Duration = Duration::from_secs(30);

/// Background service that runs [`MatchMirror::run_cycle`] periodically.
pub struct MirrorScheduler {
    mirror: Arc<MatchMirror>,
    interval: Duration,
}

impl MirrorScheduler {
    pub fn new(mirror: Arc<MatchMirror>, interval: Duration) -> Self {
        Self { mirror, interval }
    }

    /// Spawn the scheduler loop.
    pub fn start(self) -> MirrorHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        MirrorHandle { cancel, task }
    }

    /// Run cycles until `cancel` fires. The first cycle runs immediately.
    ///
    /// A failed cycle is logged and skipped.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        // A slow fetch should not trigger a burst of catch-up cycles.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "Match mirror started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Match mirror stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.mirror.run_cycle().await {
                        tracing::error!(error = %e, "Match mirror cycle failed, skipping");
                    }
                }
            }
        }
    }
}

/// Owner of a running scheduler.
pub struct MirrorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MirrorHandle {
    /// Cancel the loop and wait up to `within` for it to exit.
    pub async fn shutdown(self, within: Duration) {
        self.cancel.cancel();
        let abort = self.task.abort_handle();
        if tokio::time::timeout(within, self.task).await.is_err() {
            tracing::warn!("Match mirror did not stop in time, aborting");
            abort.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
