//! Typed pointwise operators over [`TemporalValue`].
//!
//! Each operator joins the operands' knowledge states first (so blocking
//! states short-circuit without touching any timeline), then applies the
//! ordinary boolean/numeric/string/set operation at every breakpoint date.
//! Type mismatches and arithmetic domain errors are typed failures, never
//! silent defaults.
//!
//! The pre-history default `Null` propagates pointwise: where either
//! operand is `Null` (i.e. before its first breakpoint) the result is
//! `Null`, since the question is undefined there rather than wrong.

use std::collections::BTreeSet;

use crate::error::ArithmeticError;
use crate::value::Value;

use super::TemporalValue;

fn mismatch(op: &'static str, left: &Value, right: &Value) -> ArithmeticError {
    ArithmeticError::TypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}

/// Applies `op` unless either operand is the pre-history `Null`.
fn null_prop(
    left: &Value,
    right: &Value,
    op: impl FnOnce(&Value, &Value) -> Result<Value, ArithmeticError>,
) -> Result<Value, ArithmeticError> {
    if left.is_null() || right.is_null() {
        Ok(Value::Null)
    } else {
        op(left, right)
    }
}

fn bool_pair(
    op: &'static str,
    left: &Value,
    right: &Value,
) -> Result<(bool, bool), ArithmeticError> {
    match (left.as_bool(), right.as_bool()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, left, right)),
    }
}

fn set_pair<'v>(
    op: &'static str,
    left: &'v Value,
    right: &'v Value,
) -> Result<(&'v BTreeSet<String>, &'v BTreeSet<String>), ArithmeticError> {
    match (left.as_set(), right.as_set()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, left, right)),
    }
}

/// Numeric comparison over `Int`/`Float` (mixed widths widen to `f64`) or
/// over two dates.
fn compare(
    op: &'static str,
    left: &Value,
    right: &Value,
) -> Result<std::cmp::Ordering, ArithmeticError> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    if let (Value::Date(a), Value::Date(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
        return a.partial_cmp(&b).ok_or(ArithmeticError::TypeMismatch {
            op,
            left: "nan",
            right: "nan",
        });
    }
    Err(mismatch(op, left, right))
}

fn arith(
    op: &'static str,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, ArithmeticError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
            .map(Value::Int)
            .ok_or(ArithmeticError::Overflow { op }),
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
            _ => Err(mismatch(op, left, right)),
        },
    }
}

impl TemporalValue {
    /// Pointwise boolean conjunction.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if either operand holds a non-boolean breakpoint.
    pub fn and(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| {
                let (a, b) = bool_pair("and", l, r)?;
                Ok(Value::Bool(a && b))
            })
        })
    }

    /// Pointwise boolean disjunction.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if either operand holds a non-boolean breakpoint.
    pub fn or(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| {
                let (a, b) = bool_pair("or", l, r)?;
                Ok(Value::Bool(a || b))
            })
        })
    }

    /// Pointwise boolean negation.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on non-boolean breakpoints.
    pub fn not(&self) -> Result<Self, ArithmeticError> {
        let flags = self.to_bool()?;
        Ok(flags.map(|flag| Value::Bool(!flag)))
    }

    /// Pointwise addition. `Int + Int` stays integral (checked); any float
    /// operand widens the result to `Float`.
    ///
    /// # Errors
    ///
    /// `Overflow` on integer overflow, `TypeMismatch` on non-numeric
    /// operands.
    pub fn add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| arith("add", l, r, i64::checked_add, |a, b| a + b))
        })
    }

    /// Pointwise subtraction; same typing rules as [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// `Overflow` on integer overflow, `TypeMismatch` on non-numeric
    /// operands.
    pub fn sub(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| arith("sub", l, r, i64::checked_sub, |a, b| a - b))
        })
    }

    /// Pointwise multiplication; same typing rules as [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// `Overflow` on integer overflow, `TypeMismatch` on non-numeric
    /// operands.
    pub fn mul(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| arith("mul", l, r, i64::checked_mul, |a, b| a * b))
        })
    }

    /// Pointwise division. The result is always `Float`; dividing by an
    /// exact zero is a typed error.
    ///
    /// # Errors
    ///
    /// `DivisionByZero` or `TypeMismatch`.
    pub fn div(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| {
                let (a, b) = match (l.as_float(), r.as_float()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return Err(mismatch("div", l, r)),
                };
                if b == 0.0 {
                    return Err(ArithmeticError::DivisionByZero);
                }
                Ok(Value::Float(a / b))
            })
        })
    }

    /// Pointwise `<` over numbers or dates.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on incomparable operands.
    pub fn lt(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| Ok(Value::Bool(compare("lt", l, r)?.is_lt())))
        })
    }

    /// Pointwise `<=` over numbers or dates.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on incomparable operands.
    pub fn lte(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| Ok(Value::Bool(compare("lte", l, r)?.is_le())))
        })
    }

    /// Pointwise `>` over numbers or dates.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on incomparable operands.
    pub fn gt(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| Ok(Value::Bool(compare("gt", l, r)?.is_gt())))
        })
    }

    /// Pointwise `>=` over numbers or dates.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on incomparable operands.
    pub fn gte(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| Ok(Value::Bool(compare("gte", l, r)?.is_ge())))
        })
    }

    /// Pointwise structural equality over same-typed values.
    #[must_use]
    pub fn equals(&self, other: &Self) -> Self {
        self.pointwise(other, |l, r| {
            if l.is_null() || r.is_null() {
                Value::Null
            } else {
                Value::Bool(l == r)
            }
        })
    }

    /// Pointwise set union.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on non-set operands.
    pub fn union(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| {
                let (a, b) = set_pair("union", l, r)?;
                Ok(Value::Set(a.union(b).cloned().collect()))
            })
        })
    }

    /// Pointwise set intersection.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on non-set operands.
    pub fn intersection(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.try_pointwise(other, |l, r| {
            null_prop(l, r, |l, r| {
                let (a, b) = set_pair("intersection", l, r)?;
                Ok(Value::Set(a.intersection(b).cloned().collect()))
            })
        })
    }

    /// Pointwise membership test: true where the set contains `member`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on non-set breakpoints.
    pub fn includes(&self, member: &str) -> Result<Self, ArithmeticError> {
        let mut out = Self::with_state(self.state());
        for bp in self.breakpoints() {
            let result = match &bp.value {
                Value::Null => Value::Null,
                Value::Set(set) => Value::Bool(set.contains(member)),
                other => {
                    return Err(ArithmeticError::TypeMismatch {
                        op: "includes",
                        left: other.type_name(),
                        right: "set",
                    })
                }
            };
            out.set_at(bp.date, result);
        }
        Ok(out)
    }
}
