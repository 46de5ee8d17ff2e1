//! Inclusive business-date ranges for accounting periods.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// An inclusive [start, end] range of business dates.
///
/// Period bounds are business dates, not instants: an effective timestamp
/// belongs to the range when its UTC date falls on or between the bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        self.contains_date(at.date_naive())
    }

    /// True when the two ranges share at least one date.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Exclusive upper instant of the range: midnight UTC of the day after
    /// `end`. Entries with `effective_at < end_exclusive()` are inside the
    /// period, which makes the period-end boundary end-of-day inclusive.
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        let next = self
            .end
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN))
    }

    /// Inclusive lower instant of the range: midnight UTC of `start`.
    pub fn start_inclusive(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
    }
}

impl core::fmt::Display for DateRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}..{}]", self.start, self.end)
    }
}
