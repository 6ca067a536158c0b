//! ---
//! ops_section: "03-log-normalization"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Activity log payload normalization."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::payload::{LogEvent, LogPayload};

/// Leading ISO-8601 timestamp, a `": "` separator, then the message.
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z): (.+)$")
        .expect("log line pattern compiles")
});

/// Parse one raw batch line. Lines that do not carry the timestamp prefix
/// yield `None`; dropping them is deliberate, the parse is lossy-tolerant
/// rather than strict.
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let captures = LINE_PATTERN.captures(line)?;
    Some(LogEvent {
        time: captures[1].to_owned(),
        message: captures[2].to_owned(),
    })
}

/// Flatten either payload shape into a uniform feed sorted by `time`
/// descending.
///
/// Ordering is plain string comparison of the time tokens; it equals
/// chronological order only while the upstream keeps emitting zero-padded
/// ISO-8601 timestamps of uniform precision. Mixed formats degrade to
/// string order, an accepted upstream contract assumption.
pub fn normalize(payload: &LogPayload) -> Vec<LogEvent> {
    let mut events = match payload {
        LogPayload::PerReactorBatches(batches) => batches
            .iter()
            .flat_map(|batch| batch.values())
            .flatten()
            .filter_map(|line| {
                let event = parse_line(line);
                if event.is_none() {
                    debug!(line, "dropping unparsable log line");
                }
                event
            })
            .collect::<Vec<_>>(),
        LogPayload::FlatTimeMap { logs } => logs
            .iter()
            .map(|(time, message)| LogEvent {
                time: time.clone(),
                message: message.clone(),
            })
            .collect(),
    };
    events.sort_by(|a, b| b.time.cmp(&a.time));
    events
}

/// Scope the per-reactor batch shape to a single reactor.
///
/// Storage order within a batch is oldest-first, so the returned feed is
/// the reversal of storage order (latest-first), parsed with the same lossy
/// rule as [`normalize`]. The flat-map shape carries no reactor attribution
/// and scopes to nothing.
pub fn reactor_feed(payload: &LogPayload, reactor_id: &str) -> Vec<LogEvent> {
    let LogPayload::PerReactorBatches(batches) = payload else {
        return Vec::new();
    };
    let mut lines: Vec<&String> = batches
        .iter()
        .filter_map(|batch| batch.get(reactor_id))
        .flatten()
        .collect();
    lines.reverse();
    lines
        .into_iter()
        .filter_map(|line| {
            let event = parse_line(line);
            if event.is_none() {
                debug!(reactor_id, line, "dropping unparsable log line");
            }
            event
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn batch(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(id, lines)| {
                (
                    (*id).to_owned(),
                    lines.iter().map(|l| (*l).to_owned()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn parses_timestamped_line() {
        let event = parse_line("2025-12-18T02:02:21.075Z: Coolant enabled").unwrap();
        assert_eq!(event.time, "2025-12-18T02:02:21.075Z");
        assert_eq!(event.message, "Coolant enabled");
    }

    #[test]
    fn parses_line_without_fractional_seconds() {
        let event = parse_line("2025-12-18T02:02:21Z: Rod raised").unwrap();
        assert_eq!(event.time, "2025-12-18T02:02:21Z");
        assert_eq!(event.message, "Rod raised");
    }

    #[test]
    fn drops_line_without_timestamp_prefix() {
        assert!(parse_line("garbled").is_none());
        assert!(parse_line("12:30: short time prefix").is_none());
        assert!(parse_line("2025-12-18T02:02:21.075Z:missing space").is_none());
    }

    #[test]
    fn normalize_orders_batches_newest_first() {
        let payload = LogPayload::PerReactorBatches(vec![
            batch(&[("r-1", &["2025-12-18T02:00:00.000Z: first"])]),
            batch(&[("r-2", &["2025-12-18T02:05:00.000Z: second"])]),
        ]);
        let feed = normalize(&payload);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message, "second");
        assert_eq!(feed[1].message, "first");
    }

    #[test]
    fn normalize_drops_unparsable_batch_lines() {
        let payload = LogPayload::PerReactorBatches(vec![batch(&[(
            "r-1",
            &[
                "2025-12-18T02:00:00.000Z: kept",
                "garbled",
                "2025-12-18T02:01:00.000Z: also kept",
            ],
        )])]);
        let feed = normalize(&payload);
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|event| event.message.contains("kept")));
    }

    #[test]
    fn normalize_flat_map_is_verbatim() {
        let mut logs = IndexMap::new();
        logs.insert("10:00".to_owned(), "older".to_owned());
        logs.insert("10:05".to_owned(), "newer".to_owned());
        let feed = normalize(&LogPayload::FlatTimeMap { logs });
        assert_eq!(feed.len(), 2);
        // Non-ISO tokens still sort by plain string comparison.
        assert_eq!(feed[0].time, "10:05");
        assert_eq!(feed[1].time, "10:00");
    }

    #[test]
    fn reactor_feed_reverses_storage_order() {
        let payload = LogPayload::PerReactorBatches(vec![
            batch(&[
                ("r-1", &["2025-12-18T02:00:00.000Z: oldest"]),
                ("r-2", &["2025-12-18T02:00:30.000Z: other reactor"]),
            ]),
            batch(&[("r-1", &["2025-12-18T02:01:00.000Z: newest"])]),
        ]);
        let feed = reactor_feed(&payload, "r-1");
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message, "newest");
        assert_eq!(feed[1].message, "oldest");
    }

    #[test]
    fn reactor_feed_on_flat_map_is_empty() {
        let feed = reactor_feed(
            &LogPayload::FlatTimeMap {
                logs: IndexMap::new(),
            },
            "r-1",
        );
        assert!(feed.is_empty());
    }
}
