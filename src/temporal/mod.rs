//! The temporal value kernel.
//!
//! A [`Temporal<T>`] is a step function from dates to values of `T`,
//! represented as a strictly-increasing sequence of `(date, value)`
//! breakpoints plus a [`KnowledgeState`]. The value at any queried date is
//! the value of the latest breakpoint at or before that date; before the
//! first breakpoint the value is `T::default()`.
//!
//! Timelines are kept in canonical "lean" form: no two adjacent breakpoints
//! hold equal values. Every binary operator first joins the operands'
//! knowledge states; if the join is blocking the result carries only that
//! state and no timeline, which is what lets missing facts short-circuit
//! upward through arbitrarily deep rule trees.

mod ops;

pub mod elapsed;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ArithmeticError;
use crate::knowledge::KnowledgeState;
use crate::time::beginning_of_time;
use crate::value::Value;

/// A `(date, value)` pair marking where a temporal value changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint<T> {
    /// The date this value takes effect (inclusive).
    pub date: NaiveDate,
    /// The value in effect from `date` until the next breakpoint.
    pub value: T,
}

/// A time-indexed value with three-state knowledge tracking.
///
/// # Examples
///
/// ```
/// use juris::Temporal;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
/// let mut flag = Temporal::constant(false);
/// flag.set_at(d, true);
///
/// assert!(!flag.at(d.pred_opt().unwrap()));
/// assert!(flag.at(d));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temporal<T> {
    state: KnowledgeState,
    breakpoints: Vec<Breakpoint<T>>,
}

/// The dynamically-typed timeline stored in facts.
pub type TemporalValue = Temporal<Value>;

impl<T: Clone + PartialEq + Default> Temporal<T> {
    /// A single eternal breakpoint holding `value`, state `Known`.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            state: KnowledgeState::Known,
            breakpoints: vec![Breakpoint {
                date: beginning_of_time(),
                value,
            }],
        }
    }

    /// A timeline carrying only a knowledge state and no breakpoints.
    ///
    /// This is how `Stub`/`Unstated`/`Uncertain` results are represented.
    #[must_use]
    pub const fn with_state(state: KnowledgeState) -> Self {
        Self {
            state,
            breakpoints: Vec::new(),
        }
    }

    /// Builds a Known timeline from `(date, value)` pairs in any order.
    #[must_use]
    pub fn from_breakpoints(points: impl IntoIterator<Item = (NaiveDate, T)>) -> Self {
        let mut out = Self::with_state(KnowledgeState::Known);
        for (date, value) in points {
            out.set_at(date, value);
        }
        out
    }

    /// The knowledge state of this timeline.
    #[must_use]
    pub const fn state(&self) -> KnowledgeState {
        self.state
    }

    /// Returns true if the state is `Known`.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.state == KnowledgeState::Known
    }

    /// The canonical breakpoint sequence (strictly increasing dates).
    #[must_use]
    pub fn breakpoints(&self) -> &[Breakpoint<T>] {
        &self.breakpoints
    }

    /// Returns true if this is a single breakpoint at the beginning of time.
    #[must_use]
    pub fn is_eternal(&self) -> bool {
        self.breakpoints.len() == 1 && self.breakpoints[0].date == beginning_of_time()
    }

    /// Inserts or overwrites a breakpoint, then re-canonicalizes.
    ///
    /// Insertion order is arbitrary: the breakpoint is placed into its
    /// sorted position, so asserting history out of causal order is
    /// supported and never an error.
    pub fn set_at(&mut self, date: NaiveDate, value: T) {
        match self
            .breakpoints
            .binary_search_by(|bp| bp.date.cmp(&date))
        {
            Ok(i) => self.breakpoints[i].value = value,
            Err(i) => self.breakpoints.insert(i, Breakpoint { date, value }),
        }
        self.lean();
    }

    /// The value in effect at `date`: the latest breakpoint at or before
    /// it, or `T::default()` before the first breakpoint.
    #[must_use]
    pub fn at(&self, date: NaiveDate) -> T {
        self.at_ref(date).cloned().unwrap_or_default()
    }

    /// Non-cloning variant of [`at`](Self::at); `None` means the
    /// pre-history default applies.
    #[must_use]
    pub fn at_ref(&self, date: NaiveDate) -> Option<&T> {
        let idx = self
            .breakpoints
            .partition_point(|bp| bp.date <= date);
        idx.checked_sub(1).map(|i| &self.breakpoints[i].value)
    }

    /// Idempotent canonicalization: drops every breakpoint whose value
    /// equals its immediate predecessor's.
    ///
    /// Exposed publicly because callers build timelines incrementally and
    /// must normalize before comparison or aggregation.
    pub fn lean(&mut self) {
        self.breakpoints
            .dedup_by(|next, prev| next.value == prev.value);
    }

    /// Consuming variant of [`lean`](Self::lean), for chaining.
    #[must_use]
    pub fn leaned(mut self) -> Self {
        self.lean();
        self
    }

    /// Applies `op` to every breakpoint value, preserving dates and state.
    #[must_use]
    pub fn map<U, F>(&self, op: F) -> Temporal<U>
    where
        U: Clone + PartialEq + Default,
        F: Fn(&T) -> U,
    {
        let mut out = Temporal {
            state: self.state,
            breakpoints: self
                .breakpoints
                .iter()
                .map(|bp| Breakpoint {
                    date: bp.date,
                    value: op(&bp.value),
                })
                .collect(),
        };
        out.lean();
        out
    }

    /// State-aware pointwise combination.
    ///
    /// The result state is the lattice join of both operands' states. If
    /// that join is blocking the result carries only the state; otherwise
    /// the result's breakpoints are the union of both operands' breakpoint
    /// dates with `op` evaluated at each, canonicalized.
    #[must_use]
    pub fn pointwise<U, R, F>(&self, other: &Temporal<U>, op: F) -> Temporal<R>
    where
        U: Clone + PartialEq + Default,
        R: Clone + PartialEq + Default,
        F: Fn(&T, &U) -> R,
    {
        let result: Result<Temporal<R>, std::convert::Infallible> =
            self.try_pointwise(other, |a, b| Ok(op(a, b)));
        match result {
            Ok(combined) => combined,
            Err(never) => match never {},
        }
    }

    /// Fallible pointwise combination; used by arithmetic operators whose
    /// `op` can fail (division by zero, overflow).
    ///
    /// # Errors
    ///
    /// Propagates the first error `op` returns at any breakpoint date.
    pub fn try_pointwise<U, R, E, F>(
        &self,
        other: &Temporal<U>,
        op: F,
    ) -> Result<Temporal<R>, E>
    where
        U: Clone + PartialEq + Default,
        R: Clone + PartialEq + Default,
        F: Fn(&T, &U) -> Result<R, E>,
    {
        let state = self.state.combine(other.state);
        if state.is_blocking() {
            return Ok(Temporal::with_state(state));
        }

        let mut breakpoints = Vec::with_capacity(self.breakpoints.len() + other.breakpoints.len());
        for date in union_dates(&self.breakpoints, &other.breakpoints) {
            let left = self.at(date);
            let right = other.at(date);
            breakpoints.push(Breakpoint {
                date,
                value: op(&left, &right)?,
            });
        }

        let mut out = Temporal {
            state,
            breakpoints,
        };
        out.lean();
        Ok(out)
    }
}

/// Merges two sorted breakpoint date sequences, deduplicated.
fn union_dates<A, B>(a: &[Breakpoint<A>], b: &[Breakpoint<B>]) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(x), Some(y)) => {
                if x.date <= y.date {
                    if x.date == y.date {
                        j += 1;
                    }
                    i += 1;
                    x.date
                } else {
                    j += 1;
                    y.date
                }
            }
            (Some(x), None) => {
                i += 1;
                x.date
            }
            (None, Some(y)) => {
                j += 1;
                y.date
            }
            (None, None) => break,
        };
        out.push(next);
    }
    out
}

impl TemporalValue {
    /// Converts a boolean-valued timeline into a `Temporal<bool>` for the
    /// aggregation layer.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::TypeMismatch`] if any breakpoint holds a
    /// non-boolean value.
    pub fn to_bool(&self) -> Result<Temporal<bool>, ArithmeticError> {
        let mut out = Temporal::with_state(self.state);
        for bp in &self.breakpoints {
            let flag = bp.value.as_bool().ok_or(ArithmeticError::TypeMismatch {
                op: "to_bool",
                left: bp.value.type_name(),
                right: "bool",
            })?;
            out.breakpoints.push(Breakpoint {
                date: bp.date,
                value: flag,
            });
        }
        out.lean();
        Ok(out)
    }
}

impl From<Temporal<bool>> for TemporalValue {
    fn from(source: Temporal<bool>) -> Self {
        source.map(|flag| Value::Bool(*flag))
    }
}

impl<T: Clone + PartialEq + Default> Default for Temporal<T> {
    /// An empty Known timeline: `T::default()` everywhere.
    fn default() -> Self {
        Self::with_state(KnowledgeState::Known)
    }
}
