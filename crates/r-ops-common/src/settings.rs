//! ---
//! ops_section: "01-core-functionality"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Shared primitives and utilities for the console runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_plant_name() -> String {
    "Nuclear Power Simulator".to_owned()
}

/// Operator preference for displayed temperature unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TempUnit {
    #[default]
    F,
    C,
}

impl TempUnit {
    /// Name used by the upstream set-unit operation.
    pub fn api_name(&self) -> &'static str {
        match self {
            TempUnit::F => "fahrenheit",
            TempUnit::C => "celsius",
        }
    }

    pub fn toggled(&self) -> TempUnit {
        match self {
            TempUnit::F => TempUnit::C,
            TempUnit::C => TempUnit::F,
        }
    }
}

impl std::str::FromStr for TempUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f" | "fahrenheit" => Ok(TempUnit::F),
            "c" | "celsius" => Ok(TempUnit::C),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

impl std::fmt::Display for TempUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TempUnit::F => write!(f, "F"),
            TempUnit::C => write!(f, "C"),
        }
    }
}

/// Operator-local preferences persisted across console sessions.
///
/// There is no schema version and no migration; unknown fields are ignored
/// and missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperatorSettings {
    #[serde(default = "default_plant_name")]
    pub plant_name: String,
    #[serde(default)]
    pub temp_unit: TempUnit,
    #[serde(default)]
    pub reactor_names: IndexMap<String, String>,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            plant_name: default_plant_name(),
            temp_unit: TempUnit::default(),
            reactor_names: IndexMap::new(),
        }
    }
}

/// File-backed key/value store for [`OperatorSettings`].
///
/// Loaded once at startup and written synchronously on every successful
/// mutation. All access goes through this store so the presentation layer
/// never reaches for ambient global state.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    inner: Mutex<OperatorSettings>,
}

impl SettingsStore {
    /// Open the store at `path`, falling back to defaults when the file does
    /// not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("unable to read settings file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse settings file {}", path.display()))?
        } else {
            debug!(path = %path.display(), "settings file missing; using defaults");
            OperatorSettings::default()
        };
        Ok(Self {
            path,
            inner: Mutex::new(settings),
        })
    }

    /// Current settings snapshot.
    pub fn snapshot(&self) -> OperatorSettings {
        self.inner.lock().clone()
    }

    pub fn plant_name(&self) -> String {
        self.inner.lock().plant_name.clone()
    }

    pub fn temp_unit(&self) -> TempUnit {
        self.inner.lock().temp_unit
    }

    /// Display name for a reactor: the local override when present, the
    /// upstream name otherwise.
    pub fn display_name(&self, reactor_id: &str, upstream_name: &str) -> String {
        self.inner
            .lock()
            .reactor_names
            .get(reactor_id)
            .cloned()
            .unwrap_or_else(|| upstream_name.to_owned())
    }

    pub fn set_plant_name(&self, name: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.plant_name = name.into();
        self.persist(&inner)
    }

    pub fn set_temp_unit(&self, unit: TempUnit) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.temp_unit = unit;
        self.persist(&inner)
    }

    pub fn set_reactor_name(
        &self,
        reactor_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.reactor_names.insert(reactor_id.into(), name.into());
        self.persist(&inner)
    }

    fn persist(&self, settings: &OperatorSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("unable to create settings directory {}", parent.display())
            })?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to persist settings {}", self.path.display()))?;
        debug!(path = %self.path.display(), "settings persisted");
        Ok(())
    }
}
