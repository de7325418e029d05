//! Timestamp normalisation for tags 0 and 1.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{CborError, Result};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Rounds to the nearest microsecond, halfway values rounding up.
pub fn round_to_micros(t: DateTime<Utc>) -> DateTime<Utc> {
    let rem = (t.timestamp_subsec_nanos() % 1_000) as i64;
    let delta = if rem >= 500 { 1_000 - rem } else { -rem };
    t.checked_add_signed(TimeDelta::nanoseconds(delta))
        .unwrap_or(t)
}

/// RFC3339 with up to nine fractional digits, trailing zeros trimmed, `Z`
/// offset.
pub fn format_rfc3339_nano(t: &DateTime<Utc>) -> String {
    let mut s = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = t.timestamp_subsec_nanos() % NANOS_PER_SEC;
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        s.push('.');
        s.push_str(frac.trim_end_matches('0'));
    }
    s.push('Z');
    s
}

pub fn parse_rfc3339(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CborError::InvalidTimestamp(format!("{text:?}: {e}")))
}

/// Whole seconds since the epoch plus the sub-second remainder in
/// nanoseconds.
pub fn epoch_parts(t: &DateTime<Utc>) -> (i64, u32) {
    (t.timestamp(), t.timestamp_subsec_nanos())
}

/// Interprets a (possibly fractional) count of seconds since the epoch.
/// The fraction is truncated to nanoseconds.
pub fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() || secs.abs() >= i64::MAX as f64 {
        return Err(CborError::InvalidTimestamp(format!(
            "{secs} seconds is out of range"
        )));
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9) as i64;
    DateTime::from_timestamp(whole as i64, 0)
        .and_then(|t| t.checked_add_signed(TimeDelta::nanoseconds(nanos)))
        .ok_or_else(|| CborError::InvalidTimestamp(format!("{secs} seconds is out of range")))
}
