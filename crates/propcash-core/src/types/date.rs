//! Calendar date type used for ledger versions, cashflow dates and run dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A calendar date.
///
/// Newtype over `chrono::NaiveDate`; serializes as `YYYY-MM-DD`.
///
/// # Example
///
/// ```rust
/// use propcash_core::types::Date;
///
/// let as_at = Date::parse("2025-06-30").unwrap();
/// let flow = Date::from_ymd(2026, 6, 30).unwrap();
/// assert_eq!(as_at.days_until(flow), 365);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Parses a strict ISO calendar date (`YYYY-MM-DD`, zero padded).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` for anything else, including
    /// timestamps and unpadded components.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(CoreError::invalid_date(format!("Cannot parse: {s}")));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Parses the date forms found in stored ledger tables.
    ///
    /// Accepts ISO dates, ISO timestamps (time part discarded) and
    /// day-first `DD/MM/YYYY` dates.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if no accepted form matches.
    pub fn parse_lenient(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let head = trimmed
            .split(|c| c == 'T' || c == ' ')
            .next()
            .unwrap_or(trimmed);
        if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Ok(Date(date));
        }
        NaiveDate::parse_from_str(head, "%d/%m/%Y")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Signed number of days from `self` to `other`.
    #[must_use]
    pub fn days_until(&self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying chrono date.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl std::str::FromStr for Date {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}
