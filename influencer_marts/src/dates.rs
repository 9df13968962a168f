//! Date parsing and weekly bucketing helpers.
//!
//! The raw tables store dates as text. The upstream generator writes
//! `YYYY-MM-DD`, but loaders in the wild also produce `YYYY-MM-DD HH:MM:SS`
//! or full RFC-3339 timestamps; all three resolve to the calendar date.
//!
//! Weekly buckets follow the pandas `W` convention the reporting layer was
//! built against: a bucket is labelled by the Sunday that closes it.
//!
//! Examples
//! - "2025-03-04" -> 2025-03-04
//! - "2025-03-04T23:10:00+05:30" -> 2025-03-04 (local calendar date is kept)
//! - week_ending(2025-01-01, a Wednesday) -> 2025-01-05

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

/// Parse a stored date. Returns `None` when no supported layout matches.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Storage form of a date (`YYYY-MM-DD`).
pub fn to_db_string(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Sunday closing the week that contains `d` (Monday..=Sunday).
pub fn week_ending(d: NaiveDate) -> NaiveDate {
    let to_sunday = 6 - u64::from(d.weekday().num_days_from_monday());
    d.checked_add_days(Days::new(to_sunday)).unwrap_or(d)
}

/// Every week-ending Sunday from the bucket of `first` to the bucket of `last`, inclusive.
pub fn week_endings(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let end = week_ending(last);
    let mut cur = week_ending(first);
    while cur <= end {
        out.push(cur);
        match cur.checked_add_days(Days::new(7)) {
            Some(next) => cur = next,
            None => break,
        }
    }
    out
}
