//! ---
//! ops_section: "15-testing-qa-runbook"
//! ops_subsection: "integration-tests"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Integration tests driving the console stack against a mock plant."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::time::timeout;

use r_ops_api::{ApiClient, ReactorGateway};
use r_ops_common::settings::TempUnit;
use r_ops_logs::{normalize, LogPayload};
use r_ops_poller::{FleetTelemetryTask, LogsTask, Poller};

/// Mutable behaviour of the mock plant, shared with the test body.
#[derive(Default)]
struct PlantState {
    fail_temperature_for: Option<String>,
    serve_flat_logs: bool,
    commands: Vec<String>,
}

type SharedPlant = Arc<Mutex<PlantState>>;

fn temperature_of(id: &str) -> f64 {
    match id {
        "r-1" => 300.0,
        "r-2" => 320.0,
        _ => 310.0,
    }
}

fn output_of(id: &str) -> f64 {
    match id {
        "r-1" => 500.0,
        "r-2" => 600.0,
        _ => 700.0,
    }
}

async fn spawn_mock_plant(state: SharedPlant) -> SocketAddr {
    async fn list_reactors() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "plant_name": "Integration Plant",
            "reactors": [
                {"id": "r-1", "name": "Alpha"},
                {"id": "r-2", "name": "Bravo"},
                {"id": "r-3", "name": "Charlie"}
            ]
        }))
    }

    async fn temperature(
        State(state): State<SharedPlant>,
        Path(id): Path<String>,
    ) -> axum::response::Response {
        if state.lock().unwrap().fail_temperature_for.as_deref() == Some(id.as_str()) {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Json(serde_json::json!({
            "temperature": {"amount": temperature_of(&id), "unit": "fahrenheit", "status": "normal"}
        }))
        .into_response()
    }

    async fn output(Path(id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({"output": {"amount": output_of(&id), "unit": "MW"}}))
    }

    async fn coolant(Path(_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({"coolant": "on"}))
    }

    async fn set_coolant(
        Path(_id): Path<String>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        Json(body)
    }

    async fn fuel(Path(_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({"fuel": {"percentage": 92}}))
    }

    async fn reactor_state(Path(_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({"state": "active"}))
    }

    async fn rod_state(Path(_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({"control_rods": {"in": 4, "out": 1}}))
    }

    async fn logs(State(state): State<SharedPlant>) -> Json<serde_json::Value> {
        if state.lock().unwrap().serve_flat_logs {
            Json(serde_json::json!({
                "logs": {
                    "2025-12-18T02:00:00.000Z": "Plant reset",
                    "2025-12-18T02:05:00.000Z": "Coolant enabled"
                }
            }))
        } else {
            Json(serde_json::json!([
                {"r-1": [
                    "2025-12-18T02:00:00.000Z: Reactor started",
                    "garbled line",
                    "2025-12-18T02:01:00.000Z: Rod raised"
                ]},
                {"r-2": ["2025-12-18T02:02:00.000Z: Coolant disabled"]}
            ]))
        }
    }

    async fn command(
        State(state): State<SharedPlant>,
        method: axum::http::Method,
        uri: axum::http::Uri,
    ) -> StatusCode {
        state
            .lock()
            .unwrap()
            .commands
            .push(format!("{} {}", method, uri.path()));
        StatusCode::OK
    }

    async fn set_unit(
        State(state): State<SharedPlant>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        state.lock().unwrap().commands.push(format!(
            "POST /reactors/temperature {}",
            body["unit"].as_str().unwrap_or("?")
        ));
        Json(serde_json::json!({
            "temperature": {"amount": 310.0, "unit": body["unit"], "status": "normal"}
        }))
    }

    let router = Router::new()
        .route("/reactors", get(list_reactors))
        .route("/reactors/temperature/:id", get(temperature))
        .route("/reactors/temperature", post(set_unit))
        .route("/reactors/output/:id", get(output))
        .route("/reactors/coolant/:id", get(coolant).post(set_coolant))
        .route("/reactors/fuel-level/:id", get(fuel))
        .route("/reactors/reactor-state/:id", get(reactor_state))
        .route("/reactors/rod-state/:id", get(rod_state))
        .route("/reactors/logs", get(logs))
        .route("/reactors/set-reactor-name/:id", put(command))
        .route("/reactors/raise-rod/:id", post(command))
        .route("/reactors/drop-rod/:id", post(command))
        .route("/reactors/emergency-shutdown/:id", post(command))
        .route("/reactors/controlled-shutdown/:id", post(command))
        .route("/reactors/maintenance/:id", post(command))
        .route("/reactors/refuel/:id", post(command))
        .route("/reactors/start-reactor/:id", post(command))
        .route("/reactors/reset", post(command))
        .route("/reactors/plant-name", put(command))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&format!("http://{}", addr), "integration-key").unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fleet_poller_aggregates_and_holds_through_failures() {
    let state: SharedPlant = Arc::default();
    let addr = spawn_mock_plant(state.clone()).await;
    let gateway = Arc::new(client_for(addr));

    let poller = Poller::spawn(FleetTelemetryTask::new(gateway), Duration::from_millis(50));
    let mut rx = poller.subscribe();

    timeout(Duration::from_secs(2), rx.changed())
        .await
        .unwrap()
        .unwrap();
    let first = rx.borrow().clone().unwrap();
    assert_eq!(first.plant_name, "Integration Plant");
    assert_eq!(first.average_temperature, Some(310.0));
    assert_eq!(first.total_output_mw, 1800.0);
    assert_eq!(first.reactors.len(), 3);

    // Break one reactor's temperature read: whole cycles abandon, nothing
    // new is published, the last snapshot stays available.
    state.lock().unwrap().fail_temperature_for = Some("r-2".to_owned());
    let _ = timeout(Duration::from_millis(150), rx.changed()).await;
    let _ = rx.borrow_and_update();
    assert!(
        timeout(Duration::from_millis(400), rx.changed()).await.is_err(),
        "no snapshot may be published while a read keeps failing"
    );
    let held = rx.borrow().clone().unwrap();
    assert_eq!(held.average_temperature, Some(310.0));

    // Self-healing: the next successful cycle publishes again.
    state.lock().unwrap().fail_temperature_for = None;
    timeout(Duration::from_secs(2), rx.changed())
        .await
        .unwrap()
        .unwrap();
    let healed = rx.borrow().clone().unwrap();
    assert_eq!(healed.average_temperature, Some(310.0));
    assert!(healed.temperature_history.len() >= held.temperature_history.len());

    poller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn log_poller_normalizes_both_shapes() {
    let state: SharedPlant = Arc::default();
    let addr = spawn_mock_plant(state.clone()).await;
    let gateway = Arc::new(client_for(addr));

    let poller = Poller::spawn(LogsTask::new(gateway.clone()), Duration::from_millis(50));
    let mut rx = poller.subscribe();

    timeout(Duration::from_secs(2), rx.changed())
        .await
        .unwrap()
        .unwrap();
    let feed = rx.borrow().clone().unwrap();
    // Three parsable lines survive; the garbled one is dropped; newest first.
    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0].message, "Coolant disabled");
    assert_eq!(feed[2].message, "Reactor started");

    poller.shutdown().await;

    // Flat-map shape through the same gateway path.
    state.lock().unwrap().serve_flat_logs = true;
    let payload: LogPayload = gateway.logs().await.unwrap();
    let feed = normalize(&payload);
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].message, "Coolant enabled");
    assert_eq!(feed[1].message, "Plant reset");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn command_operations_hit_expected_routes() {
    let state: SharedPlant = Arc::default();
    let addr = spawn_mock_plant(state.clone()).await;
    let client = client_for(addr);

    client.start_reactor("r-1").await.unwrap();
    client.raise_rod("r-1").await.unwrap();
    client.controlled_shutdown("r-2").await.unwrap();
    client.refuel("r-3").await.unwrap();
    client.rename_reactor("r-1", "Alpha Prime").await.unwrap();
    client.set_plant_name("Renamed Plant").await.unwrap();
    client.reset_all().await.unwrap();
    let dto = client.set_temperature_unit(TempUnit::C).await.unwrap();
    assert_eq!(dto.temperature.unit, "celsius");

    let commands = state.lock().unwrap().commands.clone();
    assert_eq!(
        commands,
        vec![
            "POST /reactors/start-reactor/r-1",
            "POST /reactors/raise-rod/r-1",
            "POST /reactors/controlled-shutdown/r-2",
            "POST /reactors/refuel/r-3",
            "PUT /reactors/set-reactor-name/r-1",
            "PUT /reactors/plant-name",
            "POST /reactors/reset",
            "POST /reactors/temperature celsius",
        ]
    );
}
