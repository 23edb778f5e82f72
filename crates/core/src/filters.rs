//! Parsing of user-supplied listing filters.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Parse a date-range bound from a query string.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp. A bare date used as an
/// upper bound (`end_of_day = true`) covers the whole day, so `from=to=D`
/// selects everything created on `D`.
pub fn parse_date_bound(raw: &str, end_of_day: bool) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!(
            "Invalid date '{raw}'. Expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| CoreError::Internal("invalid time of day".into()))?;
    Ok(date.and_time(time).and_utc())
}

/// Parse an optional `from`/`to` pair and reject inverted ranges.
pub fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<Timestamp>, Option<Timestamp>), CoreError> {
    let from = from
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date_bound(s, false))
        .transpose()?;
    let to = to
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date_bound(s, true))
        .transpose()?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(CoreError::Validation(
                "'from' must not be later than 'to'".into(),
            ));
        }
    }
    Ok((from, to))
}

/// Case-insensitive substring match used by in-memory filtering.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
