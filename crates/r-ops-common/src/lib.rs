//! ---
//! ops_section: "01-core-functionality"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Shared primitives and utilities for the console runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
//! Core shared primitives for the R-OPS console workspace.
//! This crate exposes configuration loading, logging, the persisted
//! operator settings store, and version metadata utilities consumed
//! across the workspace.

pub mod config;
pub mod logging;
pub mod settings;
pub mod time;
pub mod version;

pub use config::{ApiConfig, AppConfig, LoggingConfig, PollConfig, SettingsConfig};
pub use logging::{init_tracing, LogFormat};
pub use settings::{OperatorSettings, SettingsStore, TempUnit};
pub use version::VersionInfo;
