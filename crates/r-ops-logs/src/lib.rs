//! ---
//! ops_section: "03-log-normalization"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Activity log payload normalization."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---
//! Normalization of the two activity-log payload shapes emitted by the
//! upstream logs endpoint into a uniform, time-sorted event feed.

pub mod normalize;
pub mod payload;

pub use normalize::{normalize, parse_line, reactor_feed};
pub use payload::{LogEvent, LogPayload};
