use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
    #[error("invalid time of day: {0}")]
    TimeOfDay(String),
    #[error("start must be before end")]
    EmptyRange,
}

/// A half-open `[start, end)` span on the UTC calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ParseError> {
        if start >= end {
            return Err(ParseError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    /// Intervals that merely touch (one ends when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Standard daily working hours of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkHours {
    /// Parses `HH:MM` or `HH:MM:SS`. Seconds are dropped since hours are stored
    /// as `HH:MM`; the remaining time of day is compared, so `09:30`-`09:15`
    /// is rejected even though the hours match.
    pub fn parse(start: &str, end: &str) -> Result<Self, ParseError> {
        let start = parse_time_of_day(start)?;
        let end = parse_time_of_day(end)?;
        if start >= end {
            return Err(ParseError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    pub fn start_text(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    pub fn end_text(&self) -> String {
        self.end.format("%H:%M").to_string()
    }
}

impl fmt::Display for WorkHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_text(), self.end_text())
    }
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, ParseError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .ok_or_else(|| ParseError::TimeOfDay(s.to_string()))
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an API timestamp into naive UTC, truncated to whole seconds.
///
/// RFC 3339 input keeps its offset and is converted; naive input is taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(truncate_to_seconds(dt.with_timezone(&Utc).naive_utc()));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(truncate_to_seconds)
        .ok_or_else(|| ParseError::Timestamp(s.to_string()))
}

/// Like [`parse_timestamp`], but a bare `YYYY-MM-DD` means the last second of
/// that day: a task due today is not overdue until the day is over.
pub fn parse_due_date(s: &str) -> Result<NaiveDateTime, ParseError> {
    let trimmed = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return day
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| ParseError::Timestamp(trimmed.to_string()));
    }
    parse_timestamp(trimmed)
}

fn truncate_to_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Naive UTC timestamp as RFC 3339 for the wire.
pub fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}
