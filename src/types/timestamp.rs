use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::errors::TimestampError;

type ParseStrategy = fn(&str) -> Option<NaiveDateTime>;

/// Accepted timestamp formats in documented precedence order.
/// The list is order-sensitive: the first strategy to succeed wins.
const STRATEGIES: &[ParseStrategy] = &[iso_date_time, iso_with_offset, date_only, us_clock];

/// Parses a raw timestamp string by trying each accepted format in order.
///
/// Offset-carrying values are converted so equivalent representations of the
/// same instant compare equal; date-only values default to midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = value.trim();

    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(value))
        .ok_or(TimestampError)
}

fn iso_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn iso_with_offset(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value).ok().map(|instant| instant.naive_utc())
}

fn date_only(value: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn us_clock(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%m/%d/%Y %I:%M %p").ok()
}
