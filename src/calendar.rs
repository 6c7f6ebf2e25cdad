//! Calendar arithmetic for date-sensitive rules.
//!
//! Holiday schedules vary by jurisdiction, so the holiday test lives
//! behind a trait and rule authors pick the implementation. Business-day
//! logic is derived from it.

use chrono::{Datelike, NaiveDate, Weekday};

/// A jurisdiction's working calendar.
pub trait Calendar {
    /// Returns true if `date` is a legal holiday in this jurisdiction.
    fn is_legal_holiday(&self, date: NaiveDate) -> bool;

    /// Returns true if `date` is a business day: a weekday that is not a
    /// legal holiday.
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_legal_holiday(date)
    }

    /// The first business day on or after `date`.
    ///
    /// Returns `None` only if the search runs off the end of the
    /// representable date range.
    fn next_business_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut day = date;
        loop {
            if self.is_business_day(day) {
                return Some(day);
            }
            day = day.succ_opt()?;
        }
    }
}

/// The minimal calendar: weekends off, no holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn is_legal_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// The `n`th occurrence (1-based) of `weekday` in the given month, e.g.
/// the third Monday of January. `None` when the month has no such day or
/// the year/month is invalid.
#[must_use]
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}
