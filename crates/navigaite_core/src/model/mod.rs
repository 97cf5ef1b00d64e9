//! Planner domain model.
//!
//! # Responsibility
//! - Define user, task and resource records shared by repositories and callers.
//! - Own input validation for caller-supplied payloads.
//!
//! # Invariants
//! - Every task belongs to exactly one user and carries one provenance tag.
//! - Resources only exist attached to a task.

pub mod task;
pub mod user;
pub mod validation;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Canonical timestamp text written to storage (`2026-10-19T12:00:00.000Z`).
pub fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored ISO-8601 timestamp back to UTC. Values without an offset
/// are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
        })
        .ok()
}

/// Current time truncated to the precision that survives a storage round trip.
pub fn now_timestamp() -> DateTime<Utc> {
    let now = timestamp_to_db(Utc::now());
    parse_timestamp(&now).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::{now_timestamp, parse_timestamp, timestamp_to_db};

    #[test]
    fn stored_timestamp_is_millisecond_utc() {
        let now = now_timestamp();
        let text = timestamp_to_db(now);
        assert!(text.ends_with('Z'));
        assert_eq!(parse_timestamp(&text), Some(now));
    }

    #[test]
    fn offsetless_timestamp_reads_as_utc() {
        let parsed = parse_timestamp("2025-01-01T12:00:00.123456").unwrap();
        assert_eq!(timestamp_to_db(parsed), "2025-01-01T12:00:00.123Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
