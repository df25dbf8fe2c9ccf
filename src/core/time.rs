//! Shared timestamp/identifier helpers for trace records.

use chrono::{SecondsFormat, Utc};
use ulid::Ulid;

/// Returns the current instant as RFC 3339 UTC (e.g. `2026-08-02T09:14:03.201Z`).
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_record_id() -> String {
    Ulid::new().to_string()
}
