//! ---
//! ops_section: "05-networking-external-interfaces"
//! ops_subsection: "binary"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Control CLI for operators interacting with the plant API."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use r_ops_api::{
    emergency_shutdown_all, set_all_coolant, ApiClient, CoolantState, ReactorGateway,
};
use r_ops_common::config::AppConfig;
use r_ops_common::logging::init_tracing;
use r_ops_common::settings::{SettingsStore, TempUnit};
use r_ops_common::version::VersionInfo;
use r_ops_logs::{normalize, reactor_feed};

const CONFIG_CANDIDATES: &[&str] = &["r-ops.toml", "configs/r-ops.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "R-OPS operator control utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to r-ops.toml, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the upstream API base URL
    #[arg(long)]
    base_url: Option<String>,
    /// Override the upstream API key
    #[arg(long)]
    api_key: Option<String>,

    /// Print extended version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the fleet with local name overrides applied
    List,
    /// Print the full telemetry readout for one reactor
    Status { id: String },
    /// Start a reactor
    Start { id: String },
    /// Controlled shutdown of a reactor
    Stop { id: String },
    /// Emergency shutdown of one reactor, or the whole fleet with --all
    Estop {
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Put a reactor into maintenance mode
    Maintenance { id: String },
    /// Refuel a reactor
    Refuel { id: String },
    /// Move a control rod
    Rod {
        #[command(subcommand)]
        direction: RodDirection,
    },
    /// Switch a coolant circuit, or every circuit with --all
    Coolant {
        #[arg(value_parser = parse_coolant)]
        state: CoolantState,
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Rename a reactor upstream and in the local settings store
    Rename { id: String, name: String },
    /// Rename the plant upstream and in the local settings store
    PlantName { name: String },
    /// Switch the plant-wide temperature unit (f or c)
    Unit { unit: TempUnit },
    /// Reset all reactors
    Reset,
    /// Print the activity log feed, optionally scoped to one reactor
    Logs {
        #[arg(long)]
        reactor: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum RodDirection {
    Raise { id: String },
    Drop { id: String },
}

fn parse_coolant(value: &str) -> Result<CoolantState, String> {
    match value.to_lowercase().as_str() {
        "on" => Ok(CoolantState::On),
        "off" => Ok(CoolantState::Off),
        other => Err(format!("coolant state must be on or off, got '{}'", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    let Some(command) = cli.command else {
        anyhow::bail!("no command given; see --help");
    };

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(&[path])?,
        None => AppConfig::load(CONFIG_CANDIDATES)?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(api_key) = cli.api_key {
        config.api.api_key = api_key;
    }
    config.validate()?;
    init_tracing("r-opsctl", &config.logging)?;

    let client = ApiClient::from_config(&config.api)?;
    let settings = SettingsStore::load(&config.settings.path)?;

    run(command, &client, &settings).await
}

async fn run(command: Commands, client: &ApiClient, settings: &SettingsStore) -> Result<()> {
    match command {
        Commands::List => {
            let listing = client.list_reactors().await?;
            println!("plant: {}", settings.plant_name());
            for reactor in &listing.reactors {
                println!(
                    "  {}  {}",
                    reactor.id,
                    settings.display_name(&reactor.id, &reactor.name)
                );
            }
        }
        Commands::Status { id } => {
            let (temperature, coolant, output, fuel, state, rods) = tokio::try_join!(
                client.temperature(&id),
                client.coolant(&id),
                client.output(&id),
                client.fuel_level(&id),
                client.reactor_state(&id),
                client.rod_state(&id),
            )?;
            println!("reactor:     {}", id);
            println!(
                "temperature: {:.1} ({})",
                temperature.temperature.amount, temperature.temperature.status
            );
            println!("output:      {:.1} MW", output.output.amount);
            println!("fuel:        {:.1}%", fuel.fuel.percentage);
            println!("state:       {}", state.state);
            println!("rods:        {}", rods.control_rods.summary());
            println!("coolant:     {}", coolant.coolant);
        }
        Commands::Start { id } => {
            client.start_reactor(&id).await?;
            println!("reactor {} started", id);
        }
        Commands::Stop { id } => {
            client.controlled_shutdown(&id).await?;
            println!("controlled shutdown initiated for {}", id);
        }
        Commands::Estop { id, all } => {
            if all {
                let listing = client.list_reactors().await?;
                emergency_shutdown_all(client, &listing.reactors).await?;
                println!("emergency shutdown issued for {} reactors", listing.reactors.len());
            } else {
                let id = id.ok_or_else(|| anyhow::anyhow!("estop requires an id or --all"))?;
                client.emergency_shutdown(&id).await?;
                println!("emergency shutdown issued for {}", id);
            }
        }
        Commands::Maintenance { id } => {
            client.maintenance(&id).await?;
            println!("maintenance mode requested for {}", id);
        }
        Commands::Refuel { id } => {
            client.refuel(&id).await?;
            println!("refueling {}", id);
        }
        Commands::Rod { direction } => match direction {
            RodDirection::Raise { id } => {
                client.raise_rod(&id).await?;
                println!("rod raised on {}", id);
            }
            RodDirection::Drop { id } => {
                client.drop_rod(&id).await?;
                println!("rod dropped on {}", id);
            }
        },
        Commands::Coolant { state, id, all } => {
            if all {
                let listing = client.list_reactors().await?;
                set_all_coolant(client, &listing.reactors, state).await?;
                println!("coolant {} for {} reactors", state, listing.reactors.len());
            } else {
                let id = id.ok_or_else(|| anyhow::anyhow!("coolant requires an id or --all"))?;
                let dto = client.set_coolant(&id, state).await?;
                println!("coolant on {} is now {}", id, dto.coolant);
            }
        }
        Commands::Rename { id, name } => {
            client.rename_reactor(&id, &name).await?;
            settings.set_reactor_name(&id, &name)?;
            println!("reactor {} renamed to {}", id, name);
        }
        Commands::PlantName { name } => {
            client.set_plant_name(&name).await?;
            settings.set_plant_name(&name)?;
            println!("plant renamed to {}", name);
        }
        Commands::Unit { unit } => {
            client.set_temperature_unit(unit).await?;
            settings.set_temp_unit(unit)?;
            println!("temperature unit set to {}", unit);
        }
        Commands::Reset => {
            client.reset_all().await?;
            println!("reset issued for all systems");
        }
        Commands::Logs { reactor } => {
            let payload = client.logs().await?;
            let feed = match &reactor {
                Some(id) => reactor_feed(&payload, id),
                None => normalize(&payload),
            };
            if feed.is_empty() {
                println!("no logs available");
            }
            for event in feed {
                println!("{}  {}", event.time, event.message);
            }
        }
    }
    Ok(())
}
