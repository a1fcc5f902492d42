//! Timestamp parsing for request input

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValidationError;

/// Canonical wire format for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of a range a bare date stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// First instant of the day
    Start,
    /// Last instant of the day
    End,
}

/// Parse a timestamp; a bare date means midnight
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ValidationError> {
    parse_bound(raw, Bound::Start)
}

/// Parse one end of an inclusive date range
pub fn parse_bound(raw: &str, bound: Bound) -> Result<NaiveDateTime, ValidationError> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat(format!("'{raw}' is not a date (expected YYYY-MM-DD HH:MM:SS)"))
    })?;

    let instant = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
    };
    instant.ok_or_else(|| ValidationError::InvalidFormat(format!("'{raw}' is out of range")))
}
