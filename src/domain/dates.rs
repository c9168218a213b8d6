//! Date parsing and calendar boundaries.
//!
//! Forms submit bare `YYYY-MM-DD` dates while API clients send RFC 3339
//! timestamps; both are accepted and normalised to UTC.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// UTC instant of local midnight on `date`.
///
/// Falls back to UTC midnight when the local midnight does not exist
/// (DST gap).
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Start of the local calendar day containing `now`.
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Utc> {
    local_midnight(now.date_naive())
}

/// Start of the local week (Sunday midnight) containing `now`.
pub fn start_of_week(now: DateTime<Local>) -> DateTime<Utc> {
    let today = now.date_naive();
    let days_since_sunday = i64::from(today.weekday().num_days_from_sunday());
    local_midnight(today - Duration::days(days_since_sunday))
}

/// Parse an RFC 3339 timestamp, a naive local timestamp or a bare date.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(local_midnight)
}

/// Serde helper for required flexible timestamps.
pub fn deserialize_flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date or timestamp: {}", raw)))
}

/// Serde helper for optional flexible timestamps.
pub fn deserialize_flexible_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_datetime(&raw).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid date or timestamp: {}", raw))
        }),
    }
}
