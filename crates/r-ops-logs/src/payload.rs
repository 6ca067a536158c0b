//! ---
//! ops_section: "03-log-normalization"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Activity log payload normalization."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Wire payload of `GET /reactors/logs`.
///
/// The upstream emits two shapes and gives no discriminator, so decoding is
/// untagged: an array decodes as per-reactor batches, an object as the flat
/// time map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LogPayload {
    /// Shape A: an ordered sequence of maps from reactor id to raw
    /// `"<timestamp>: <message>"` lines, oldest-first per reactor.
    PerReactorBatches(Vec<IndexMap<String, Vec<String>>>),
    /// Shape B: a flat map from time token to message. Time tokens are not
    /// guaranteed to be ISO-8601.
    FlatTimeMap {
        #[serde(default)]
        logs: IndexMap<String, String>,
    },
}

/// One normalized log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    /// ISO-8601 timestamp for parsed batch lines, or the raw time token of
    /// the flat-map shape.
    pub time: String,
    pub message: String,
}
