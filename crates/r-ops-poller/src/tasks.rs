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
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::try_join;
use tracing::debug;

use r_ops_api::types::ReactorRef;
use r_ops_api::ReactorGateway;
use r_ops_logs::{normalize, reactor_feed, LogEvent};
use r_ops_telemetry::{
    fleet_average_temperature, fleet_total_output, TelemetrySample, TimeSeries,
};

use crate::poller::PollTask;

/// Snapshot published by one successful fleet telemetry cycle.
#[derive(Debug, Clone)]
pub struct FleetSnapshot {
    pub plant_name: String,
    pub reactors: Vec<ReactorRef>,
    /// `None` when the fleet listing was empty; consumers keep showing the
    /// previous value rather than a fabricated zero.
    pub average_temperature: Option<f64>,
    pub total_output_mw: f64,
    pub temperature_history: TimeSeries,
}

/// Fleet-wide summary cycle: listing, then temperature and output for every
/// reactor, aggregated into averages, totals, and the rolling history.
pub struct FleetTelemetryTask {
    gateway: Arc<dyn ReactorGateway>,
    history: TimeSeries,
}

impl FleetTelemetryTask {
    pub fn new(gateway: Arc<dyn ReactorGateway>) -> Self {
        Self {
            gateway,
            history: TimeSeries::default(),
        }
    }
}

#[async_trait]
impl PollTask for FleetTelemetryTask {
    type Snapshot = FleetSnapshot;

    fn name(&self) -> &str {
        "fleet-telemetry"
    }

    async fn tick(&mut self) -> Result<FleetSnapshot> {
        let listing = self.gateway.list_reactors().await?;

        // Fan out every read before awaiting any; a single failure abandons
        // the whole cycle so no partial average is computed.
        let temperatures = try_join_all(
            listing
                .reactors
                .iter()
                .map(|reactor| self.gateway.temperature(&reactor.id)),
        );
        let outputs = try_join_all(
            listing
                .reactors
                .iter()
                .map(|reactor| self.gateway.output(&reactor.id)),
        );
        let (temperatures, outputs) = try_join!(temperatures, outputs)?;

        let samples: Vec<TelemetrySample> = temperatures
            .iter()
            .zip(outputs.iter())
            .map(|(temperature, output)| {
                TelemetrySample::from_summary_readings(temperature, output)
            })
            .collect();

        let average_temperature = fleet_average_temperature(&samples);
        match average_temperature {
            Some(average) => self.history.record(average),
            None => debug!("fleet listing empty; no history point recorded"),
        }

        Ok(FleetSnapshot {
            plant_name: listing.plant_name,
            reactors: listing.reactors,
            average_temperature,
            total_output_mw: fleet_total_output(&samples),
            temperature_history: self.history.clone(),
        })
    }
}

/// Snapshot published by one successful per-reactor cycle.
#[derive(Debug, Clone)]
pub struct ReactorSnapshot {
    pub reactor_id: String,
    pub sample: TelemetrySample,
    pub temperature_history: TimeSeries,
}

/// Single-reactor cycle: the six detail reads fanned out together.
pub struct ReactorTelemetryTask {
    gateway: Arc<dyn ReactorGateway>,
    reactor_id: String,
    history: TimeSeries,
}

impl ReactorTelemetryTask {
    pub fn new(gateway: Arc<dyn ReactorGateway>, reactor_id: impl Into<String>) -> Self {
        Self {
            gateway,
            reactor_id: reactor_id.into(),
            history: TimeSeries::default(),
        }
    }
}

#[async_trait]
impl PollTask for ReactorTelemetryTask {
    type Snapshot = ReactorSnapshot;

    fn name(&self) -> &str {
        "reactor-telemetry"
    }

    async fn tick(&mut self) -> Result<ReactorSnapshot> {
        let id = self.reactor_id.as_str();
        let (temperature, coolant, output, fuel, state, rods) = try_join!(
            self.gateway.temperature(id),
            self.gateway.coolant(id),
            self.gateway.output(id),
            self.gateway.fuel_level(id),
            self.gateway.reactor_state(id),
            self.gateway.rod_state(id),
        )?;

        let sample =
            TelemetrySample::from_readings(&temperature, &coolant, &output, &fuel, &state, &rods);
        self.history.record(sample.temperature);

        Ok(ReactorSnapshot {
            reactor_id: self.reactor_id.clone(),
            sample,
            temperature_history: self.history.clone(),
        })
    }
}

/// Activity log cycle. Unscoped it yields the fleet-wide normalized feed;
/// scoped to a reactor id it yields that reactor's latest-first feed.
pub struct LogsTask {
    gateway: Arc<dyn ReactorGateway>,
    scope: Option<String>,
}

impl LogsTask {
    pub fn new(gateway: Arc<dyn ReactorGateway>) -> Self {
        Self {
            gateway,
            scope: None,
        }
    }

    pub fn scoped(gateway: Arc<dyn ReactorGateway>, reactor_id: impl Into<String>) -> Self {
        Self {
            gateway,
            scope: Some(reactor_id.into()),
        }
    }
}

#[async_trait]
impl PollTask for LogsTask {
    type Snapshot = Vec<LogEvent>;

    fn name(&self) -> &str {
        "logs"
    }

    async fn tick(&mut self) -> Result<Vec<LogEvent>> {
        let payload = self.gateway.logs().await?;
        Ok(match &self.scope {
            Some(reactor_id) => reactor_feed(&payload, reactor_id),
            None => normalize(&payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r_ops_api::types::{
        CoolantDto, CoolantState, FuelDto, OutputDto, ReactorListDto, ReactorStateDto,
        RodStateDto, TemperatureDto,
    };
    use r_ops_api::{ApiError, ApiResult};
    use r_ops_common::settings::TempUnit;
    use r_ops_logs::LogPayload;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn injected_failure() -> ApiError {
        use serde::de::Error as _;
        ApiError::Parse(serde_json::Error::custom("injected read failure"))
    }

    /// Gateway double serving fixed readings, with an optional reactor whose
    /// temperature read fails.
    struct ScriptedGateway {
        reactors: Vec<ReactorRef>,
        temperatures: HashMap<String, f64>,
        outputs: HashMap<String, f64>,
        fail_temperature_for: Mutex<Option<String>>,
        logs: LogPayload,
    }

    impl ScriptedGateway {
        fn new(entries: &[(&str, f64, f64)]) -> Self {
            Self {
                reactors: entries
                    .iter()
                    .map(|(id, _, _)| ReactorRef {
                        id: (*id).to_owned(),
                        name: format!("Reactor {}", id),
                    })
                    .collect(),
                temperatures: entries
                    .iter()
                    .map(|(id, t, _)| ((*id).to_owned(), *t))
                    .collect(),
                outputs: entries
                    .iter()
                    .map(|(id, _, o)| ((*id).to_owned(), *o))
                    .collect(),
                fail_temperature_for: Mutex::new(None),
                logs: LogPayload::PerReactorBatches(Vec::new()),
            }
        }

        fn fail_temperature_for(&self, id: &str) {
            *self.fail_temperature_for.lock().unwrap() = Some(id.to_owned());
        }

        fn heal(&self) {
            *self.fail_temperature_for.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl ReactorGateway for ScriptedGateway {
        async fn list_reactors(&self) -> ApiResult<ReactorListDto> {
            Ok(ReactorListDto {
                plant_name: "Test Plant".to_owned(),
                reactors: self.reactors.clone(),
            })
        }

        async fn temperature(&self, id: &str) -> ApiResult<TemperatureDto> {
            if self.fail_temperature_for.lock().unwrap().as_deref() == Some(id) {
                return Err(injected_failure());
            }
            Ok(serde_json::from_value(serde_json::json!({
                "temperature": {
                    "amount": self.temperatures.get(id).copied().unwrap_or(0.0),
                    "unit": "fahrenheit",
                    "status": "normal"
                }
            }))
            .unwrap())
        }

        async fn set_temperature_unit(&self, _unit: TempUnit) -> ApiResult<TemperatureDto> {
            unimplemented!("not exercised")
        }

        async fn coolant(&self, _id: &str) -> ApiResult<CoolantDto> {
            Ok(CoolantDto {
                coolant: CoolantState::On,
            })
        }

        async fn set_coolant(&self, _id: &str, _state: CoolantState) -> ApiResult<CoolantDto> {
            unimplemented!("not exercised")
        }

        async fn output(&self, id: &str) -> ApiResult<OutputDto> {
            Ok(serde_json::from_value(serde_json::json!({
                "output": {"amount": self.outputs.get(id).copied().unwrap_or(0.0), "unit": "MW"}
            }))
            .unwrap())
        }

        async fn fuel_level(&self, _id: &str) -> ApiResult<FuelDto> {
            Ok(serde_json::from_value(serde_json::json!({"fuel": {"percentage": 92}})).unwrap())
        }

        async fn reactor_state(&self, _id: &str) -> ApiResult<ReactorStateDto> {
            Ok(ReactorStateDto {
                state: "active".to_owned(),
            })
        }

        async fn rod_state(&self, _id: &str) -> ApiResult<RodStateDto> {
            Ok(serde_json::from_value(serde_json::json!({
                "control_rods": {"in": 4, "out": 1}
            }))
            .unwrap())
        }

        async fn logs(&self) -> ApiResult<LogPayload> {
            Ok(self.logs.clone())
        }

        async fn rename_reactor(&self, _id: &str, _name: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn raise_rod(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn drop_rod(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn emergency_shutdown(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn controlled_shutdown(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn maintenance(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn refuel(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn start_reactor(&self, _id: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn reset_all(&self) -> ApiResult<()> {
            unimplemented!("not exercised")
        }

        async fn set_plant_name(&self, _name: &str) -> ApiResult<()> {
            unimplemented!("not exercised")
        }
    }

    #[tokio::test]
    async fn fleet_cycle_aggregates_all_reactors() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            ("r-1", 300.0, 500.0),
            ("r-2", 320.0, 600.0),
            ("r-3", 310.0, 700.0),
        ]));
        let mut task = FleetTelemetryTask::new(gateway);

        let snapshot = task.tick().await.unwrap();
        assert_eq!(snapshot.plant_name, "Test Plant");
        assert_eq!(snapshot.average_temperature, Some(310.0));
        assert_eq!(snapshot.total_output_mw, 1800.0);
        assert_eq!(snapshot.temperature_history.len(), 1);
    }

    #[tokio::test]
    async fn failed_read_abandons_the_cycle_without_touching_history() {
        let gateway = Arc::new(ScriptedGateway::new(&[
            ("r-1", 300.0, 500.0),
            ("r-2", 320.0, 600.0),
        ]));
        let mut task = FleetTelemetryTask::new(gateway.clone());

        task.tick().await.unwrap();
        gateway.fail_temperature_for("r-2");
        task.tick().await.unwrap_err();
        gateway.heal();
        let snapshot = task.tick().await.unwrap();

        // The failed cycle recorded nothing: two successes, two points.
        assert_eq!(snapshot.temperature_history.len(), 2);
        assert_eq!(snapshot.average_temperature, Some(310.0));
    }

    #[tokio::test]
    async fn empty_fleet_reports_no_data() {
        let gateway = Arc::new(ScriptedGateway::new(&[]));
        let mut task = FleetTelemetryTask::new(gateway);

        let snapshot = task.tick().await.unwrap();
        assert_eq!(snapshot.average_temperature, None);
        assert_eq!(snapshot.total_output_mw, 0.0);
        assert!(snapshot.temperature_history.is_empty());
    }

    #[tokio::test]
    async fn reactor_cycle_builds_full_sample() {
        let gateway = Arc::new(ScriptedGateway::new(&[("r-1", 305.5, 480.0)]));
        let mut task = ReactorTelemetryTask::new(gateway, "r-1");

        let snapshot = task.tick().await.unwrap();
        assert_eq!(snapshot.reactor_id, "r-1");
        assert_eq!(snapshot.sample.temperature, 305.5);
        assert_eq!(snapshot.sample.output_mw, 480.0);
        assert_eq!(snapshot.sample.fuel_percent, 92.0);
        assert_eq!(snapshot.sample.state, "active");
        assert_eq!(snapshot.sample.coolant, CoolantState::On);
        assert_eq!(snapshot.sample.rod_state, "4 in / 1 out");
        assert_eq!(snapshot.temperature_history.len(), 1);
    }

    #[tokio::test]
    async fn logs_task_normalizes_and_scopes() {
        let mut gateway = ScriptedGateway::new(&[("r-1", 0.0, 0.0)]);
        gateway.logs = serde_json::from_value(serde_json::json!([
            {"r-1": [
                "2025-12-18T02:00:00.000Z: older",
                "2025-12-18T02:01:00.000Z: newer"
            ]},
            {"r-2": ["2025-12-18T02:02:00.000Z: elsewhere"]}
        ]))
        .unwrap();
        let gateway = Arc::new(gateway);

        let mut fleet_task = LogsTask::new(gateway.clone());
        let feed = fleet_task.tick().await.unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].message, "elsewhere");

        let mut scoped_task = LogsTask::scoped(gateway, "r-1");
        let feed = scoped_task.tick().await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message, "newer");
        assert_eq!(feed[1].message, "older");
    }
}
