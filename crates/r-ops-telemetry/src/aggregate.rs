//! ---
//! ops_section: "02-telemetry-aggregation"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Fleet telemetry aggregation and bounded history."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use r_ops_api::types::{
    CoolantDto, CoolantState, FuelDto, OutputDto, ReactorStateDto, RodStateDto, TemperatureDto,
};

/// One consistent-as-possible telemetry snapshot per reactor per poll.
///
/// Missing or garbled upstream values arrive here already coerced to
/// `0.0`/`unknown` by the wire layer; aggregation re-applies the finite
/// guard so no path produces `NaN`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    pub temperature: f64,
    pub output_mw: f64,
    pub fuel_percent: f64,
    pub state: String,
    pub coolant: CoolantState,
    pub rod_state: String,
}

impl TelemetrySample {
    /// Assemble a sample from the six per-reactor reads of one poll cycle.
    pub fn from_readings(
        temperature: &TemperatureDto,
        coolant: &CoolantDto,
        output: &OutputDto,
        fuel: &FuelDto,
        state: &ReactorStateDto,
        rods: &RodStateDto,
    ) -> Self {
        Self {
            temperature: coerce_finite(temperature.temperature.amount),
            output_mw: coerce_finite(output.output.amount),
            fuel_percent: coerce_finite(fuel.fuel.percentage),
            state: state.state.clone(),
            coolant: coolant.coolant,
            rod_state: rods.control_rods.summary(),
        }
    }

    /// Assemble the reduced sample used by the fleet summary cycle, which
    /// reads only temperature and output.
    pub fn from_summary_readings(temperature: &TemperatureDto, output: &OutputDto) -> Self {
        Self {
            temperature: coerce_finite(temperature.temperature.amount),
            output_mw: coerce_finite(output.output.amount),
            fuel_percent: 0.0,
            state: "unknown".to_owned(),
            coolant: CoolantState::Unknown,
            rod_state: "unknown".to_owned(),
        }
    }
}

/// Fail-soft numeric guard: anything non-finite contributes zero.
pub fn coerce_finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Arithmetic mean of sample temperatures.
///
/// The empty fleet reports no data rather than a silent zero; callers hold
/// the previous displayed value.
pub fn fleet_average_temperature(samples: &[TelemetrySample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples
        .iter()
        .map(|sample| coerce_finite(sample.temperature))
        .sum();
    Some(sum / samples.len() as f64)
}

/// Total fleet output in megawatts.
pub fn fleet_total_output(samples: &[TelemetrySample]) -> f64 {
    samples
        .iter()
        .map(|sample| coerce_finite(sample.output_mw))
        .sum()
}
