//! ---
//! ops_section: "05-networking-external-interfaces"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "HTTP client and typed operations for the plant API."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lenient numeric decode: the upstream occasionally emits strings or drops
/// fields entirely. Anything that is not a finite number decodes to `0.0`
/// so `NaN` never reaches aggregation or display.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn default_unknown() -> String {
    "unknown".to_owned()
}

/// Fleet listing returned by `GET /reactors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactorListDto {
    #[serde(default)]
    pub plant_name: String,
    #[serde(default)]
    pub reactors: Vec<ReactorRef>,
}

/// Reactor identity as listed by the fleet endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactorRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureDto {
    pub temperature: TemperatureReading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureReading {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_unknown")]
    pub status: String,
}

/// Coolant circuit state. Anything the upstream sends outside `on`/`off`
/// decodes to `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoolantState {
    On,
    Off,
    #[serde(other)]
    #[default]
    Unknown,
}

impl std::fmt::Display for CoolantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoolantState::On => write!(f, "on"),
            CoolantState::Off => write!(f, "off"),
            CoolantState::Unknown => write!(f, "unknown"),
        }
    }
}

impl CoolantState {
    pub fn toggled(&self) -> CoolantState {
        match self {
            CoolantState::On => CoolantState::Off,
            // An unknown circuit is commanded on, matching the operator
            // expectation that the toggle always produces a definite state.
            CoolantState::Off | CoolantState::Unknown => CoolantState::On,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoolantDto {
    #[serde(default)]
    pub coolant: CoolantState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDto {
    pub output: OutputReading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputReading {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelDto {
    pub fuel: FuelReading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelReading {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactorStateDto {
    #[serde(default = "default_unknown")]
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RodStateDto {
    pub control_rods: RodCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RodCounts {
    #[serde(rename = "in", default, deserialize_with = "lenient_f64")]
    pub rods_in: f64,
    #[serde(rename = "out", default, deserialize_with = "lenient_f64")]
    pub rods_out: f64,
}

impl RodCounts {
    /// Operator-facing rendering, e.g. `"12 in / 3 out"`.
    pub fn summary(&self) -> String {
        format!("{} in / {} out", self.rods_in, self.rods_out)
    }
}
