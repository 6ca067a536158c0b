//! ---
//! ops_section: "02-telemetry-aggregation"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Fleet telemetry aggregation and bounded history."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use r_ops_common::time::clock_label;

/// Retained window per series. Invariant: a series never holds more points.
pub const HISTORY_CAP: usize = 20;

/// One charted observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    /// Wall-clock label captured at append time, local `HH:MM:SS`.
    pub time: String,
    pub value: f64,
}

/// Insertion-ordered rolling window over the most recent [`HISTORY_CAP`]
/// observations, oldest evicted first.
///
/// Each series is owned by exactly one poll cycle; nothing else mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries {
    points: VecDeque<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn push(&mut self, point: TimeSeriesPoint) {
        while self.points.len() >= HISTORY_CAP {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Append `value` stamped with the current wall-clock label.
    pub fn record(&mut self, value: f64) {
        self.push(TimeSeriesPoint {
            time: clock_label(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&TimeSeriesPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesPoint> {
        self.points.iter()
    }

    /// Values in insertion order, for chart widgets.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }
}
