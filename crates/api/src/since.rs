//! Parsing of the `since` query parameter.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::ApiError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses `since`. Empty or absent means "no filter".
///
/// Accepts RFC 3339 and zone-less ISO 8601, the latter read as UTC. Date and
/// time may be separated by `T` or a space. A `+` offset sent unencoded
/// arrives as a space and is restored.
pub fn parse_since(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Some(at) = parse_timestamp(raw) {
        return Ok(Some(at));
    }
    if let Some(at) = restore_offset(raw).as_deref().and_then(parse_timestamp) {
        return Ok(Some(at));
    }

    Err(ApiError::InvalidParameter(format!(
        "Invalid value for 'since': {raw:?} is not an ISO 8601 timestamp."
    )))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// `2024-05-01T12:00:00 02:00` -> `2024-05-01T12:00:00+02:00`.
///
/// Only the last space is considered, and only when it follows the time and
/// is followed by nothing but an `HH:MM` offset.
fn restore_offset(raw: &str) -> Option<String> {
    let (head, tail) = raw.rsplit_once(' ')?;
    let is_offset = tail.len() >= 4 && tail.bytes().all(|b| b.is_ascii_digit() || b == b':');
    (head.contains(':') && is_offset).then(|| format!("{head}+{tail}"))
}
