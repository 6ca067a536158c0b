//! ---
//! ops_section: "01-core-functionality"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Shared primitives and utilities for the console runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use chrono::Local;

/// Wall-clock label attached to time-series points, local `HH:MM:SS`.
pub fn clock_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
