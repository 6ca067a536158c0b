//! ---
//! ops_section: "02-telemetry-aggregation"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Fleet telemetry aggregation and bounded history."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
//! Fleet-level summary statistics over independent per-reactor reads, and
//! the bounded rolling history backing the temperature charts.

pub mod aggregate;
pub mod history;

pub use aggregate::{
    coerce_finite, fleet_average_temperature, fleet_total_output, TelemetrySample,
};
pub use history::{TimeSeries, TimeSeriesPoint, HISTORY_CAP};
