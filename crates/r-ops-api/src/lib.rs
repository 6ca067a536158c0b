//! ---
//! ops_section: "05-networking-external-interfaces"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "HTTP client and typed operations for the plant API."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
//! Client-side surface of the upstream reactor-control REST API.
//!
//! The upstream service is an external collaborator with a fixed contract;
//! nothing here reimplements its behaviour. [`client`] carries the raw
//! request plumbing, [`types`] the wire DTOs, and [`reactors`] one typed
//! wrapper per endpoint behind the [`ReactorGateway`] seam.

pub mod client;
pub mod reactors;
pub mod types;

pub use client::{ApiClient, ApiError, ApiResult};
pub use reactors::{emergency_shutdown_all, set_all_coolant, ReactorGateway};
pub use types::{
    CoolantDto, CoolantState, FuelDto, OutputDto, ReactorListDto, ReactorRef, ReactorStateDto,
    RodStateDto, TemperatureDto,
};
