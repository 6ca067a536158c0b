//! ---
//! ops_section: "04-polling-runtime"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Cancellable fixed-cadence polling runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::sync::Arc;

use anyhow::Result;
use prometheus::{IntCounterVec, Opts, Registry};

/// Shared registry type used across the console.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Poll-cycle counters labelled by poller name. The console exposes no
/// scrape endpoint; the registry is gathered on demand for diagnostics.
#[derive(Debug, Clone)]
pub struct PollerMetrics {
    cycles: IntCounterVec,
    failures: IntCounterVec,
}

impl PollerMetrics {
    pub fn new(registry: &SharedRegistry) -> Result<Self> {
        let cycles = IntCounterVec::new(
            Opts::new("poll_cycles_total", "Completed poll cycles"),
            &["poller"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("poll_cycle_failures_total", "Poll cycles abandoned on error"),
            &["poller"],
        )?;
        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        Ok(Self { cycles, failures })
    }

    pub fn record_cycle(&self, poller: &str) {
        self.cycles.with_label_values(&[poller]).inc();
    }

    pub fn record_failure(&self, poller: &str) {
        self.failures.with_label_values(&[poller]).inc();
    }
}
