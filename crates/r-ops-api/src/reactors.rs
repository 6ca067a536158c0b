//! ---
//! ops_section: "05-networking-external-interfaces"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "HTTP client and typed operations for the plant API."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Method;
use serde_json::json;

use r_ops_common::settings::TempUnit;
use r_ops_logs::LogPayload;

use crate::client::{ApiClient, ApiResult};
use crate::types::{
    CoolantDto, CoolantState, FuelDto, OutputDto, ReactorListDto, ReactorRef, ReactorStateDto,
    RodStateDto, TemperatureDto,
};

/// Typed operations of the upstream reactor-control API.
///
/// Pollers and binaries depend on this seam rather than on the transport,
/// so read cycles and command paths can be exercised without a live
/// upstream.
#[async_trait]
pub trait ReactorGateway: Send + Sync {
    async fn list_reactors(&self) -> ApiResult<ReactorListDto>;
    async fn temperature(&self, id: &str) -> ApiResult<TemperatureDto>;
    /// Switches the reporting unit plant-wide, not per reactor.
    async fn set_temperature_unit(&self, unit: TempUnit) -> ApiResult<TemperatureDto>;
    async fn coolant(&self, id: &str) -> ApiResult<CoolantDto>;
    async fn set_coolant(&self, id: &str, state: CoolantState) -> ApiResult<CoolantDto>;
    async fn output(&self, id: &str) -> ApiResult<OutputDto>;
    async fn fuel_level(&self, id: &str) -> ApiResult<FuelDto>;
    async fn reactor_state(&self, id: &str) -> ApiResult<ReactorStateDto>;
    async fn rod_state(&self, id: &str) -> ApiResult<RodStateDto>;
    async fn logs(&self) -> ApiResult<LogPayload>;
    async fn rename_reactor(&self, id: &str, name: &str) -> ApiResult<()>;
    async fn raise_rod(&self, id: &str) -> ApiResult<()>;
    async fn drop_rod(&self, id: &str) -> ApiResult<()>;
    async fn emergency_shutdown(&self, id: &str) -> ApiResult<()>;
    async fn controlled_shutdown(&self, id: &str) -> ApiResult<()>;
    async fn maintenance(&self, id: &str) -> ApiResult<()>;
    async fn refuel(&self, id: &str) -> ApiResult<()>;
    async fn start_reactor(&self, id: &str) -> ApiResult<()>;
    async fn reset_all(&self) -> ApiResult<()>;
    async fn set_plant_name(&self, name: &str) -> ApiResult<()>;
}

#[async_trait]
impl ReactorGateway for ApiClient {
    async fn list_reactors(&self) -> ApiResult<ReactorListDto> {
        self.get("/reactors").await
    }

    async fn temperature(&self, id: &str) -> ApiResult<TemperatureDto> {
        self.get(&format!("/reactors/temperature/{}", id)).await
    }

    async fn set_temperature_unit(&self, unit: TempUnit) -> ApiResult<TemperatureDto> {
        self.send(
            "/reactors/temperature",
            Method::POST,
            &json!({ "unit": unit.api_name() }),
        )
        .await
    }

    async fn coolant(&self, id: &str) -> ApiResult<CoolantDto> {
        self.get(&format!("/reactors/coolant/{}", id)).await
    }

    async fn set_coolant(&self, id: &str, state: CoolantState) -> ApiResult<CoolantDto> {
        self.send(
            &format!("/reactors/coolant/{}", id),
            Method::POST,
            &json!({ "coolant": state }),
        )
        .await
    }

    async fn output(&self, id: &str) -> ApiResult<OutputDto> {
        self.get(&format!("/reactors/output/{}", id)).await
    }

    async fn fuel_level(&self, id: &str) -> ApiResult<FuelDto> {
        self.get(&format!("/reactors/fuel-level/{}", id)).await
    }

    async fn reactor_state(&self, id: &str) -> ApiResult<ReactorStateDto> {
        self.get(&format!("/reactors/reactor-state/{}", id)).await
    }

    async fn rod_state(&self, id: &str) -> ApiResult<RodStateDto> {
        self.get(&format!("/reactors/rod-state/{}", id)).await
    }

    async fn logs(&self) -> ApiResult<LogPayload> {
        self.get("/reactors/logs").await
    }

    async fn rename_reactor(&self, id: &str, name: &str) -> ApiResult<()> {
        self.command_with_body(
            &format!("/reactors/set-reactor-name/{}", id),
            Method::PUT,
            &json!({ "name": name }),
        )
        .await
    }

    async fn raise_rod(&self, id: &str) -> ApiResult<()> {
        self.command(&format!("/reactors/raise-rod/{}", id), Method::POST)
            .await
    }

    async fn drop_rod(&self, id: &str) -> ApiResult<()> {
        self.command(&format!("/reactors/drop-rod/{}", id), Method::POST)
            .await
    }

    async fn emergency_shutdown(&self, id: &str) -> ApiResult<()> {
        self.command(
            &format!("/reactors/emergency-shutdown/{}", id),
            Method::POST,
        )
        .await
    }

    async fn controlled_shutdown(&self, id: &str) -> ApiResult<()> {
        self.command(
            &format!("/reactors/controlled-shutdown/{}", id),
            Method::POST,
        )
        .await
    }

    async fn maintenance(&self, id: &str) -> ApiResult<()> {
        self.command(&format!("/reactors/maintenance/{}", id), Method::POST)
            .await
    }

    async fn refuel(&self, id: &str) -> ApiResult<()> {
        self.command(&format!("/reactors/refuel/{}", id), Method::POST)
            .await
    }

    async fn start_reactor(&self, id: &str) -> ApiResult<()> {
        self.command(&format!("/reactors/start-reactor/{}", id), Method::POST)
            .await
    }

    async fn reset_all(&self) -> ApiResult<()> {
        self.command("/reactors/reset", Method::POST).await
    }

    async fn set_plant_name(&self, name: &str) -> ApiResult<()> {
        self.command_with_body("/reactors/plant-name", Method::PUT, &json!({ "name": name }))
            .await
    }
}

/// Command every reactor's coolant circuit at once. Any individual failure
/// rejects the whole action.
pub async fn set_all_coolant(
    gateway: &dyn ReactorGateway,
    reactors: &[ReactorRef],
    state: CoolantState,
) -> ApiResult<()> {
    try_join_all(
        reactors
            .iter()
            .map(|reactor| gateway.set_coolant(&reactor.id, state)),
    )
    .await?;
    Ok(())
}

/// Emergency-shutdown the entire fleet. Any individual failure rejects the
/// whole action.
pub async fn emergency_shutdown_all(
    gateway: &dyn ReactorGateway,
    reactors: &[ReactorRef],
) -> ApiResult<()> {
    try_join_all(
        reactors
            .iter()
            .map(|reactor| gateway.emergency_shutdown(&reactor.id)),
    )
    .await?;
    Ok(())
}
