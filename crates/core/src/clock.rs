//! Conversions between filesystem times and local wall-clock timestamps
//!
//! Backup names embed local wall-clock time, so every comparison in the
//! retention engine happens on `NaiveDateTime` values in the local zone.

use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::time::SystemTime;

/// Accepted formats for user-supplied instants
const INSTANT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Convert a filesystem time to local wall-clock time
pub fn from_system_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

/// Convert local wall-clock time to a filesystem time
///
/// Times that fall in a DST gap are interpreted as UTC.
pub fn to_system_time(local: NaiveDateTime) -> SystemTime {
    match Local.from_local_datetime(&local).earliest() {
        Some(dt) => dt.into(),
        None => Utc.from_utc_datetime(&local).into(),
    }
}

/// Parse a user-supplied instant such as `2024-03-15` or `2024-03-15 08:30:00`
///
/// A bare date means midnight at the start of that day.
pub fn parse_instant(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();

    for format in INSTANT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| Error::InvalidInstant(input.to_string()))
}
