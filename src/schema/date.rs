//! Calendar date normalization.
//!
//! Every date that enters the engine goes through [`normalize_date`], so all
//! comparisons happen on UTC calendar days.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Canonical output format (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Naive timestamp formats, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date normalization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Date value is empty")]
    Empty,
    #[error("Cannot parse date '{input}'")]
    Unparsable { input: String },
}

/// Normalize a date string to a UTC calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (converted to UTC before the
/// time of day is dropped) and naive `YYYY-MM-DDTHH:MM:SS` timestamps, which
/// are taken to already be UTC.
pub fn normalize_date(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc().date());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| DateError::Unparsable {
            input: trimmed.to_string(),
        })
}

/// Format a date in the canonical `YYYY-MM-DD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serde adapter that normalizes on input and writes `YYYY-MM-DD` on output.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::normalize_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Locale-aware display of dates.
///
/// Used for presentation only. Nothing in the engine compares formatted
/// strings.
pub trait DateFormatter {
    fn format(&self, date: NaiveDate) -> String;
}

/// Plain `YYYY-MM-DD` formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateFormatter;

impl DateFormatter for IsoDateFormatter {
    fn format(&self, date: NaiveDate) -> String {
        format_date(date)
    }
}

/// Formatter backed by a `strftime` pattern, e.g. `"%d %b %Y"`.
#[derive(Debug, Clone)]
pub struct PatternDateFormatter {
    pub pattern: String,
}

impl DateFormatter for PatternDateFormatter {
    fn format(&self, date: NaiveDate) -> String {
        date.format(&self.pattern).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_date() {
        assert_eq!(normalize_date("2024-06-01"), Ok(ymd(2024, 6, 1)));
        assert_eq!(normalize_date("  2024-06-01\n"), Ok(ymd(2024, 6, 1)));
    }

    #[test]
    fn test_rfc3339_converts_to_utc_day() {
        // 23:30 at UTC-05:00 is already the next day in UTC
        assert_eq!(
            normalize_date("2024-01-31T23:30:00-05:00"),
            Ok(ymd(2024, 2, 1))
        );
        assert_eq!(normalize_date("2024-01-31T00:30:00+02:00"), Ok(ymd(2024, 1, 30)));
        assert_eq!(normalize_date("2024-01-31T12:00:00Z"), Ok(ymd(2024, 1, 31)));
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        assert_eq!(normalize_date("2024-03-05T23:59:59"), Ok(ymd(2024, 3, 5)));
        assert_eq!(normalize_date("2024-03-05 08:00:00.250"), Ok(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(normalize_date(""), Err(DateError::Empty));
        assert_eq!(normalize_date("   "), Err(DateError::Empty));
        assert_eq!(
            normalize_date("not-a-date"),
            Err(DateError::Unparsable {
                input: "not-a-date".to_string()
            })
        );
        assert!(normalize_date("2024-02-30").is_err());
    }

    #[test]
    fn test_formatters() {
        let date = ymd(2024, 6, 1);
        assert_eq!(IsoDateFormatter.format(date), "2024-06-01");

        let long = PatternDateFormatter {
            pattern: "%d %b %Y".to_string(),
        };
        assert_eq!(long.format(date), "01 Jun 2024");
    }
}
