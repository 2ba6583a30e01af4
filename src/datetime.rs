//! Timestamp helpers.
//!
//! Every timestamp is stored and returned as an RFC 3339 UTC string with
//! microsecond precision and a `Z` suffix. The fixed width keeps them
//! lexicographically sortable inside SQLite.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC instant in the storage format.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current time in the storage format.
pub fn now_iso() -> String {
    format(&Utc::now())
}

/// Parse a stored timestamp. Returns `None` for anything malformed.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether a stored expiry lies strictly before `now`.
///
/// An unparseable expiry counts as expired.
pub fn is_expired(expiry: &str, now: &DateTime<Utc>) -> bool {
    match parse(expiry) {
        Some(at) => at < *now,
        None => true,
    }
}
