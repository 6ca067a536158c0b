//! ---
//! ops_section: "04-polling-runtime"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Cancellable fixed-cadence polling runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
//! Fixed-cadence polling over the plant gateway.
//!
//! A [`Poller`] owns one spawned loop, a cooperative teardown signal, and a
//! watch slot carrying the latest snapshot. The concrete poll cycles — fleet
//! telemetry, per-reactor telemetry, activity logs — live in [`tasks`].

pub mod metrics;
pub mod poller;
pub mod tasks;

pub use metrics::{new_registry, PollerMetrics, SharedRegistry};
pub use poller::{PollTask, Poller};
pub use tasks::{FleetSnapshot, FleetTelemetryTask, LogsTask, ReactorSnapshot, ReactorTelemetryTask};
