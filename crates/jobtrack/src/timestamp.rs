//! ISO-8601 instants as stored in the database.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Current time as an ISO instant with millisecond precision.
pub fn now_iso() -> String {
    to_iso(Utc::now())
}

pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC of `date` as an ISO instant.
pub fn date_to_iso(date: NaiveDate) -> String {
    to_iso(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parses a calendar date given either as `YYYY-MM-DD` or as an RFC 3339
/// instant (whose UTC date is used).
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}
