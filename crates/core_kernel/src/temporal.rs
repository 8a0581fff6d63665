//! Calendar date handling for claim evidence
//!
//! Dates arrive as free-form strings pulled from narratives and scanned
//! documents. [`DateInput`] keeps the raw text and resolves it on demand;
//! resolution refuses to guess when the day/month order is ambiguous.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for the claim's jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name such as `Europe/Paris`
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(name.to_string()))
    }

    /// Returns the calendar date of a UTC instant in this timezone
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to date resolution
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TemporalError {
    #[error("Unparseable date: {0:?}")]
    Unparseable(String),

    #[error("Ambiguous date {0:?}: day and month order cannot be determined")]
    Ambiguous(String),

    #[error("Conflicting dates for {fact}: {first} vs {second}")]
    Conflicting {
        fact: String,
        first: NaiveDate,
        second: NaiveDate,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Formats that identify day, month and year without ambiguity
const UNAMBIGUOUS_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

/// A date as asserted by a claimant or extracted from a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateInput(String);

impl DateInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Creates an input from an already-known calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Resolves the raw text to a calendar date
    pub fn resolve(&self) -> Result<NaiveDate, TemporalError> {
        parse_date(&self.0)
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// Parses a date string, rejecting day/month-ambiguous slash dates
///
/// `03/04/2024` is ambiguous and yields [`TemporalError::Ambiguous`];
/// `13/04/2024` and `04/13/2024` resolve because one component exceeds 12.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TemporalError::Unparseable(raw.to_string()));
    }

    for format in UNAMBIGUOUS_FORMATS {
        match NaiveDate::parse_from_str(trimmed, format) {
            // two-digit years would otherwise land in the first century
            Ok(date) if date.year() >= 1000 => return Ok(date),
            _ => continue,
        }
    }

    parse_slash_date(trimmed).ok_or_else(|| TemporalError::Unparseable(raw.to_string()))?
}

fn parse_slash_date(s: &str) -> Option<Result<NaiveDate, TemporalError>> {
    let parts: Vec<&str> = s.split('/').map(str::trim).collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (day, month) = match (first > 12, second > 12) {
        (true, false) => (first, second),
        (false, true) => (second, first),
        (false, false) if first == second => (first, second),
        (false, false) => return Some(Err(TemporalError::Ambiguous(s.to_string()))),
        (true, true) => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day).map(Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unambiguous_formats() {
        assert_eq!(parse_date("2024-03-14").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("14.03.2024").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("14 March 2024").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("March 14, 2024").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("  2024/03/14 ").unwrap(), ymd(2024, 3, 14));
    }

    #[test]
    fn test_slash_dates_resolve_only_when_unique() {
        assert_eq!(parse_date("14/03/2024").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("03/14/2024").unwrap(), ymd(2024, 3, 14));
        assert_eq!(parse_date("05/05/2024").unwrap(), ymd(2024, 5, 5));
        assert!(matches!(
            parse_date("03/04/2024"),
            Err(TemporalError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_garbage_is_unparseable() {
        assert!(matches!(parse_date(""), Err(TemporalError::Unparseable(_))));
        assert!(matches!(parse_date("last tuesday"), Err(TemporalError::Unparseable(_))));
        assert!(matches!(parse_date("31/31/2024"), Err(TemporalError::Unparseable(_))));
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tz = Timezone::parse("Asia/Tokyo").unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 3, 14, 20, 0, 0).unwrap();
        assert_eq!(tz.local_date(instant), ymd(2024, 3, 15));
        assert_eq!(Timezone::default().local_date(instant), ymd(2024, 3, 14));
    }

    #[test]
    fn test_timezone_serde() {
        let tz = Timezone::parse("Europe/Paris").unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/Paris\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
        assert!(Timezone::parse("Mars/Olympus").is_err());
    }
}
