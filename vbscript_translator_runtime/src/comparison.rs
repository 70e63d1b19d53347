//! Comparison operators
//!
//! Comparisons yield Boolean or Null. Empty stands in for the zero value of
//! the other operand's kind, Booleans compare against numbers as -1/0, and
//! kinds that cannot be compared (a string against a number) compare unequal.

use std::cmp::Ordering;

use crate::convert;
use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

/// Outcome of comparing two values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
    /// At least one operand was Null
    Null,
    /// The operand kinds do not compare
    Incomparable,
}

impl From<Ordering> for Comparison {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Comparison::Less,
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::Greater,
        }
    }
}

enum Comparable {
    Number(f64),
    Text(String),
}

fn comparable(value: &Value) -> RuntimeResult<Option<Comparable>> {
    let c = match value {
        Value::Empty => return Ok(None),
        Value::Str(s) => Comparable::Text(s.clone()),
        other => Comparable::Number(convert::to_f64(other)?),
    };
    Ok(Some(c))
}

/// The value Empty takes when compared against `other`
fn empty_counterpart(other: &Value) -> Comparable {
    match other {
        Value::Str(_) => Comparable::Text(String::new()),
        _ => Comparable::Number(0.0),
    }
}

/// Compare two values after default-member resolution
pub fn compare(left: &Value, right: &Value) -> RuntimeResult<Comparison> {
    let l = convert::resolve(left)?;
    let r = convert::resolve(right)?;
    if l.is_null() || r.is_null() {
        return Ok(Comparison::Null);
    }
    if l.is_array() || r.is_array() {
        return Err(VbsError::type_mismatch("array in comparison"));
    }
    let lc = comparable(&l)?.unwrap_or_else(|| empty_counterpart(&r));
    let rc = comparable(&r)?.unwrap_or_else(|| empty_counterpart(&l));
    let outcome = match (lc, rc) {
        (Comparable::Number(a), Comparable::Number(b)) => a
            .partial_cmp(&b)
            .map(Comparison::from)
            .unwrap_or(Comparison::Incomparable),
        (Comparable::Text(a), Comparable::Text(b)) => Comparison::from(a.cmp(&b)),
        _ => Comparison::Incomparable,
    };
    Ok(outcome)
}

fn decide(
    left: &Value,
    right: &Value,
    incomparable: bool,
    test: impl FnOnce(Comparison) -> bool,
) -> RuntimeResult<Value> {
    Ok(match compare(left, right)? {
        Comparison::Null => Value::Null,
        Comparison::Incomparable => Value::Bool(incomparable),
        outcome => Value::Bool(test(outcome)),
    })
}

/// `=`
pub fn eq(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, false, |c| c == Comparison::Equal)
}

/// `<>`
pub fn noteq(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, true, |c| c != Comparison::Equal)
}

/// `<`
pub fn lt(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, false, |c| c == Comparison::Less)
}

/// `<=`
pub fn lte(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, false, |c| c != Comparison::Greater)
}

/// `>`
pub fn gt(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, false, |c| c == Comparison::Greater)
}

/// `>=`
pub fn gte(left: &Value, right: &Value) -> RuntimeResult<Value> {
    decide(left, right, false, |c| c != Comparison::Less)
}

/// `Is`: reference identity; both operands must be object references
pub fn is(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let l = convert::obj(left)?;
    let r = convert::obj(right)?;
    Ok(Value::Bool(l.same_reference(&r)))
}
