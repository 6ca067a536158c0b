//! ---
//! ops_section: "04-polling-runtime"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Cancellable fixed-cadence polling runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::metrics::PollerMetrics;

/// One unit of periodic work: a single fetch-and-aggregate cycle producing
/// the next snapshot.
#[async_trait]
pub trait PollTask: Send + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    /// Name used in diagnostics and metrics labels.
    fn name(&self) -> &str;

    async fn tick(&mut self) -> Result<Self::Snapshot>;
}

/// Handle to a running poll loop.
///
/// The loop fires immediately, then on every interval tick. Slow cycles run
/// back-to-back rather than overlapping. Stopping is terminal; a fresh
/// poller is created on restart. The stop signal doubles as the liveness
/// flag: it is re-checked after every in-flight tick, so a poller stopped
/// mid-flight never publishes a late result.
#[derive(Debug)]
pub struct Poller<S> {
    snapshots: watch::Receiver<Option<S>>,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<S: Clone + Send + Sync + 'static> Poller<S> {
    pub fn spawn<T>(task: T, interval: Duration) -> Self
    where
        T: PollTask<Snapshot = S>,
    {
        Self::spawn_with_metrics(task, interval, None)
    }

    pub fn spawn_with_metrics<T>(
        mut task: T,
        interval: Duration,
        metrics: Option<PollerMetrics>,
    ) -> Self
    where
        T: PollTask<Snapshot = S>,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let name = task.name().to_owned();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let result = task.tick().await;
                        // Liveness check: discard results that resolved
                        // after teardown was signalled.
                        if *stop_rx.borrow() {
                            break;
                        }
                        match result {
                            Ok(snapshot) => {
                                if let Some(metrics) = &metrics {
                                    metrics.record_cycle(&name);
                                }
                                let _ = snapshot_tx.send(Some(snapshot));
                            }
                            Err(err) => {
                                if let Some(metrics) = &metrics {
                                    metrics.record_failure(&name);
                                }
                                warn!(poller = %name, error = %err, "poll cycle failed; holding previous snapshot");
                            }
                        }
                    }
                }
            }
            debug!(poller = %name, "poller stopped");
        });

        Self {
            snapshots: snapshot_rx,
            stop: stop_tx,
            task: Some(handle),
        }
    }

    /// Receiver observing the latest published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<S>> {
        self.snapshots.clone()
    }

    /// Latest published snapshot, if any cycle has completed yet.
    pub fn latest(&self) -> Option<S> {
        self.snapshots.borrow().clone()
    }

    /// Signal teardown. In-flight work is not aborted; its result is
    /// discarded once it resolves.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Stop and wait for the loop to wind down.
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<S> Drop for Poller<S> {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
