//! Date sentinels and half-open date spans.
//!
//! All temporal values in Juris are step functions over `chrono::NaiveDate`.
//! Two sentinel dates bound the timeline: [`beginning_of_time`] (where
//! eternal values start) and [`end_of_time`] (meaning "ongoing"). Interval
//! arithmetic is half-open `[start, end)` throughout, so boundary days are
//! never double-counted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The earliest representable date; an "eternal" value has its single
/// breakpoint here.
#[must_use]
pub const fn beginning_of_time() -> NaiveDate {
    NaiveDate::MIN
}

/// The latest representable date, meaning "end of time / ongoing".
///
/// Aggregation logic never synthesizes a breakpoint exactly at this
/// sentinel.
#[must_use]
pub const fn end_of_time() -> NaiveDate {
    NaiveDate::MAX
}

/// Whole days from `from` to `to` (negative if `to` precedes `from`).
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// A half-open span of dates `[start, end)`.
///
/// # Examples
///
/// ```
/// use juris::time::DateSpan;
/// use chrono::NaiveDate;
///
/// let jan = DateSpan::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
/// );
/// assert_eq!(jan.days(), 31);
/// assert!(jan.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
/// assert!(!jan.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    /// Start of the span (inclusive).
    pub start: NaiveDate,
    /// End of the span (exclusive).
    pub end: NaiveDate,
}

impl DateSpan {
    /// Creates a span. An inverted span (`end <= start`) is permitted and
    /// simply empty; clipping produces such spans routinely.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The span covering all of time.
    #[must_use]
    pub const fn eternal() -> Self {
        Self {
            start: beginning_of_time(),
            end: end_of_time(),
        }
    }

    /// Returns true if the span contains no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Number of whole days in the span; zero when empty.
    #[must_use]
    pub fn days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            days_between(self.start, self.end)
        }
    }

    /// Returns true if `date` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Clips this span to another, returning the (possibly empty)
    /// intersection.
    #[must_use]
    pub fn clip_to(&self, other: &Self) -> Self {
        Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }

    /// Returns true if the spans share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.clip_to(other).is_empty()
    }
}

impl std::fmt::Display for DateSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.end == end_of_time() {
            write!(f, "[{} → ∞)", self.start)
        } else {
            write!(f, "[{} → {})", self.start, self.end)
        }
    }
}
