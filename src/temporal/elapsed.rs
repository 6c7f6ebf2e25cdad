//! Elapsed-time-per-partition aggregation.
//!
//! Given a temporal boolean and a partition (a timeline whose breakpoints
//! mark the boundaries of named intervals, e.g. calendar years), compute
//! the total days the boolean was true within each partition interval.
//! This supports statutory "N days within period Y" eligibility tests
//! without materializing a day-by-day calendar. All interval arithmetic is
//! half-open `[start, end)`.

use chrono::NaiveDate;

use crate::error::ArithmeticError;
use crate::knowledge::KnowledgeState;
use crate::time::{end_of_time, DateSpan};
use crate::value::Value;

use super::{Breakpoint, Temporal, TemporalValue};

/// Per-partition elapsed true-days.
///
/// The output holds one breakpoint per partition interval, dated at the
/// interval's start and valued with the total days `condition` was true in
/// `[start, next-partition-start)`. The final interval runs to the end of
/// time. A partition breakpoint sitting exactly at the end-of-time sentinel
/// marks an unbounded, undefined final interval and is never emitted.
///
/// If either input carries a blocking knowledge state, the result is that
/// state with no timeline, as with every other operator.
#[must_use]
pub fn elapsed_days_per<P>(condition: &Temporal<bool>, partition: &Temporal<P>) -> Temporal<i64>
where
    P: Clone + PartialEq + Default,
{
    let state = condition.state().combine(partition.state());
    if state.is_blocking() {
        return Temporal::with_state(state);
    }

    let bounds = partition.breakpoints();
    let mut out = Temporal::with_state(KnowledgeState::Known);
    for (i, boundary) in bounds.iter().enumerate() {
        if boundary.date == end_of_time() {
            continue;
        }
        let span = DateSpan::new(
            boundary.date,
            bounds.get(i + 1).map_or(end_of_time(), |next| next.date),
        );
        out.breakpoints.push(Breakpoint {
            date: span.start,
            value: true_days_within(condition, &span),
        });
    }
    out.lean();
    out
}

/// Total days `condition` is true across all of time.
#[must_use]
pub fn elapsed_days(condition: &Temporal<bool>) -> Temporal<i64> {
    elapsed_days_per(condition, &Temporal::constant(()))
}

/// Sums the true sub-intervals of `condition` clipped to `span`.
fn true_days_within(condition: &Temporal<bool>, span: &DateSpan) -> i64 {
    let points = condition.breakpoints();
    let mut total = 0;
    for (i, bp) in points.iter().enumerate() {
        if !bp.value {
            continue;
        }
        let segment_end = points.get(i + 1).map_or(end_of_time(), |next| next.date);
        total += DateSpan::new(bp.date, segment_end).clip_to(span).days();
    }
    total
}

/// The yearly partition from `first` to `last` inclusive: one breakpoint at
/// January 1 of each year, valued with the year number.
///
/// # Panics
///
/// Panics if a January 1 in the range is unrepresentable (never for
/// ordinary years).
#[must_use]
pub fn calendar_years(first: i32, last: i32) -> Temporal<i32> {
    let mut out = Temporal::with_state(KnowledgeState::Known);
    for year in first..=last {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1 is always valid");
        out.breakpoints.push(Breakpoint {
            date: jan1,
            value: year,
        });
    }
    out
}

impl TemporalValue {
    /// Per-partition elapsed true-days over dynamically-typed timelines;
    /// the result holds `Value::Int` day counts.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if this timeline holds non-boolean breakpoints.
    pub fn elapsed_days_per(&self, partition: &Self) -> Result<Self, ArithmeticError> {
        let state = self.state().combine(partition.state());
        if state.is_blocking() {
            return Ok(Self::with_state(state));
        }
        let condition = self.to_bool()?;
        Ok(elapsed_days_per(&condition, partition).map(|days| Value::Int(*days)))
    }
}

#[cfg(test)]
mod tests {
    use crate::time::beginning_of_time;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn flag(points: &[(NaiveDate, bool)]) -> Temporal<bool> {
        Temporal::from_breakpoints(points.iter().copied())
    }

    #[test]
    fn test_single_day_attributed_to_its_year() {
        // True exactly on 2011-12-31.
        let condition = flag(&[
            (beginning_of_time(), false),
            (d(2011, 12, 31), true),
            (d(2012, 1, 1), false),
        ]);
        let years = calendar_years(2010, 2013);
        let per_year = elapsed_days_per(&condition, &years);

        assert_eq!(per_year.at(d(2010, 6, 1)), 0);
        assert_eq!(per_year.at(d(2011, 6, 1)), 1);
        assert_eq!(per_year.at(d(2012, 6, 1)), 0);
        assert_eq!(per_year.at(d(2013, 6, 1)), 0);
    }

    #[test]
    fn test_spans_are_half_open() {
        // True for all of 2011 exactly: [2011-01-01, 2012-01-01).
        let condition = flag(&[
            (beginning_of_time(), false),
            (d(2011, 1, 1), true),
            (d(2012, 1, 1), false),
        ]);
        let per_year = elapsed_days_per(&condition, &calendar_years(2010, 2012));

        assert_eq!(per_year.at(d(2011, 6, 1)), 365);
        assert_eq!(per_year.at(d(2010, 6, 1)), 0);
        assert_eq!(per_year.at(d(2012, 6, 1)), 0);
    }

    #[test]
    fn test_interval_straddling_partition_boundary() {
        // True from 2011-12-01 through 2012-01-30 (end exclusive on 01-31).
        let condition = flag(&[
            (beginning_of_time(), false),
            (d(2011, 12, 1), true),
            (d(2012, 1, 31), false),
        ]);
        let per_year = elapsed_days_per(&condition, &calendar_years(2011, 2012));

        assert_eq!(per_year.at(d(2011, 6, 1)), 31); // all of December
        assert_eq!(per_year.at(d(2012, 6, 1)), 30); // January 1..=30
    }

    #[test]
    fn test_partition_sum_equals_whole_range_total() {
        let condition = flag(&[
            (beginning_of_time(), false),
            (d(2010, 3, 10), true),
            (d(2010, 9, 2), false),
            (d(2011, 11, 20), true),
            (d(2012, 2, 5), false),
        ]);

        let per_year = elapsed_days_per(&condition, &calendar_years(2009, 2013));
        let sum: i64 = per_year.breakpoints().iter().map(|bp| bp.value).sum();

        let total = elapsed_days(&condition);
        assert_eq!(total.breakpoints().len(), 1);
        assert_eq!(sum, total.breakpoints()[0].value);
    }

    #[test]
    fn test_blocking_state_short_circuits() {
        let condition: Temporal<bool> = Temporal::with_state(KnowledgeState::Unstated);
        let result = elapsed_days_per(&condition, &calendar_years(2010, 2012));
        assert_eq!(result.state(), KnowledgeState::Unstated);
        assert!(result.breakpoints().is_empty());

        let blocked_partition: Temporal<i32> = Temporal::with_state(KnowledgeState::Stub);
        let result = elapsed_days_per(&flag(&[(beginning_of_time(), true)]), &blocked_partition);
        assert_eq!(result.state(), KnowledgeState::Stub);
    }

    #[test]
    fn test_end_of_time_partition_start_is_skipped() {
        let mut partition: Temporal<i32> = calendar_years(2020, 2020);
        partition.set_at(end_of_time(), 9999);
        let condition = flag(&[(beginning_of_time(), false), (d(2020, 2, 1), true)]);

        let result = elapsed_days_per(&condition, &partition);
        assert!(result
            .breakpoints()
            .iter()
            .all(|bp| bp.date != end_of_time()));
    }

    #[test]
    fn test_empty_partition_yields_empty_output() {
        let condition = flag(&[(beginning_of_time(), true)]);
        let partition: Temporal<i32> = Temporal::with_state(KnowledgeState::Known);
        let result = elapsed_days_per(&condition, &partition);
        assert!(result.is_known());
        assert!(result.breakpoints().is_empty());
    }

    #[test]
    fn test_value_level_wrapper() {
        let condition = TemporalValue::from_breakpoints([
            (beginning_of_time(), Value::Bool(false)),
            (d(2011, 12, 31), Value::Bool(true)),
            (d(2012, 1, 1), Value::Bool(false)),
        ]);
        let years: TemporalValue = calendar_years(2011, 2012).map(|y| Value::Int(i64::from(*y)));

        let per_year = condition.elapsed_days_per(&years).unwrap();
        assert_eq!(per_year.at(d(2011, 6, 1)), Value::Int(1));
        assert_eq!(per_year.at(d(2012, 6, 1)), Value::Int(0));

        let non_bool = TemporalValue::constant(Value::Int(3));
        assert!(non_bool.elapsed_days_per(&years).is_err());
    }
}
