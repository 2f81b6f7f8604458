//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for poll and authentication bookkeeping.
pub type Timestamp = DateTime<Utc>;

/// Literal reported in place of a timestamp that was never recorded.
pub const NEVER: &str = "Never";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render an optional timestamp as ISO-8601, or [`NEVER`] when absent.
#[must_use]
pub fn iso_or_never(ts: Option<Timestamp>) -> String {
    ts.map_or_else(
        || NEVER.to_string(),
        |ts| ts.to_rfc3339_opts(SecondsFormat::Micros, false),
    )
}
