//! Arithmetic operators
//!
//! Operands are promoted to a common numeric subtype. Integer results that
//! overflow widen (Byte → Integer → Long → Double) instead of failing;
//! floating-point and Currency overflow raise `Overflow`. Null propagates.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::convert;
use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

/// Width order for promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Width {
    Byte,
    Integer,
    Long,
    Single,
    Double,
}

/// An operand after Empty/Boolean/String normalization
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Byte(u8),
    Integer(i16),
    Long(i32),
    Single(f32),
    Double(f64),
    Currency(Decimal),
    Date(f64),
}

impl Numeric {
    fn width(self) -> Width {
        match self {
            Numeric::Byte(_) => Width::Byte,
            Numeric::Integer(_) => Width::Integer,
            Numeric::Long(_) => Width::Long,
            Numeric::Single(_) => Width::Single,
            Numeric::Double(_) | Numeric::Currency(_) | Numeric::Date(_) => Width::Double,
        }
    }

    fn as_i64(self) -> Option<i64> {
        match self {
            Numeric::Byte(v) => Some(i64::from(v)),
            Numeric::Integer(v) => Some(i64::from(v)),
            Numeric::Long(v) => Some(i64::from(v)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Numeric::Byte(v) => f64::from(v),
            Numeric::Integer(v) => f64::from(v),
            Numeric::Long(v) => f64::from(v),
            Numeric::Single(v) => f64::from(v),
            Numeric::Double(v) | Numeric::Date(v) => v,
            Numeric::Currency(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    fn as_decimal(self) -> RuntimeResult<Decimal> {
        match self {
            Numeric::Currency(d) => Ok(d),
            other => Decimal::from_f64(other.as_f64())
                .ok_or_else(|| VbsError::overflow("value out of Currency range")),
        }
    }
}

/// Normalize an operand; `None` means Null
fn numeric(value: &Value) -> RuntimeResult<Option<Numeric>> {
    let n = match convert::resolve(value)? {
        Value::Null => return Ok(None),
        Value::Empty => Numeric::Integer(0),
        Value::Bool(b) => Numeric::Integer(if b { -1 } else { 0 }),
        Value::Byte(v) => Numeric::Byte(v),
        Value::Integer(v) => Numeric::Integer(v),
        Value::Long(v) => Numeric::Long(v),
        Value::Single(v) => Numeric::Single(v),
        Value::Double(v) => Numeric::Double(v),
        Value::Currency(d) => Numeric::Currency(d),
        Value::Date(d) => Numeric::Date(d),
        Value::Str(s) => Numeric::Double(
            convert::parse_number(&s).ok_or_else(|| VbsError::type_mismatch(format!("'{}'", s)))?,
        ),
        other => {
            return Err(VbsError::type_mismatch(format!(
                "'{}' in arithmetic",
                other.type_name()
            )))
        }
    };
    Ok(Some(n))
}

fn both(left: &Value, right: &Value) -> RuntimeResult<Option<(Numeric, Numeric)>> {
    let l = numeric(left)?;
    let r = numeric(right)?;
    Ok(l.zip(r))
}

/// Fit an integer result, widening on overflow
fn widen_integer(result: i64, width: Width) -> Value {
    if width == Width::Byte {
        if let Ok(v) = u8::try_from(result) {
            return Value::Byte(v);
        }
    }
    if width <= Width::Integer {
        if let Ok(v) = i16::try_from(result) {
            return Value::Integer(v);
        }
    }
    match i32::try_from(result) {
        Ok(v) => Value::Long(v),
        Err(_) => Value::Double(result as f64),
    }
}

/// Fit an integer result without widening past Long
fn fit_integer(result: i64, width: Width) -> RuntimeResult<Value> {
    match widen_integer(result, width) {
        Value::Double(_) => Err(VbsError::overflow(format!("{} as a Long", result))),
        fitted => Ok(fitted),
    }
}

fn finite_double(v: f64) -> RuntimeResult<Value> {
    if v.is_finite() {
        Ok(Value::Double(v))
    } else {
        Err(VbsError::overflow(v.to_string()))
    }
}

fn single_or_double(v: f64) -> RuntimeResult<Value> {
    let narrowed = v as f32;
    if narrowed.is_finite() {
        Ok(Value::Single(narrowed))
    } else {
        finite_double(v)
    }
}

#[derive(Debug, Clone, Copy)]
enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
}

impl ArithmeticOp {
    fn integer(self, l: i64, r: i64) -> i64 {
        // i64 cannot overflow for operands that fit in i32
        match self {
            ArithmeticOp::Add => l + r,
            ArithmeticOp::Subtract => l - r,
            ArithmeticOp::Multiply => l * r,
        }
    }

    fn float(self, l: f64, r: f64) -> f64 {
        match self {
            ArithmeticOp::Add => l + r,
            ArithmeticOp::Subtract => l - r,
            ArithmeticOp::Multiply => l * r,
        }
    }

    fn decimal(self, l: Decimal, r: Decimal) -> Option<Decimal> {
        match self {
            ArithmeticOp::Add => l.checked_add(r),
            ArithmeticOp::Subtract => l.checked_sub(r),
            ArithmeticOp::Multiply => l.checked_mul(r),
        }
    }
}

fn arithmetic(l: Numeric, r: Numeric, op: ArithmeticOp) -> RuntimeResult<Value> {
    match (l, r) {
        (Numeric::Date(a), Numeric::Date(b)) => match op {
            ArithmeticOp::Subtract => finite_double(a - b),
            _ => date_result(op.float(a, b)),
        },
        (Numeric::Date(_), _) | (_, Numeric::Date(_)) => match op {
            ArithmeticOp::Multiply => finite_double(op.float(l.as_f64(), r.as_f64())),
            _ => date_result(op.float(l.as_f64(), r.as_f64())),
        },
        (Numeric::Currency(_), other) | (other, Numeric::Currency(_))
            if other.width() < Width::Single || matches!(other, Numeric::Currency(_)) =>
        {
            op.decimal(l.as_decimal()?, r.as_decimal()?)
                .map(Value::Currency)
                .ok_or_else(|| VbsError::overflow("Currency arithmetic"))
        }
        _ => {
            let width = l.width().max(r.width());
            match (l.as_i64(), r.as_i64()) {
                (Some(a), Some(b)) => Ok(widen_integer(op.integer(a, b), width)),
                _ => {
                    let result = op.float(l.as_f64(), r.as_f64());
                    let single_operands = l.width() <= Width::Single
                        && r.width() <= Width::Single
                        && l.width().min(r.width()) != Width::Long;
                    if width == Width::Single && single_operands {
                        single_or_double(result)
                    } else {
                        finite_double(result)
                    }
                }
            }
        }
    }
}

fn date_result(v: f64) -> RuntimeResult<Value> {
    if v.is_finite() && convert::ole_to_datetime(v).is_some() {
        Ok(Value::Date(v))
    } else {
        Err(VbsError::overflow("date out of range"))
    }
}

/// `+`: numeric addition, or concatenation when both sides are strings
pub fn add(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let l = convert::resolve(left)?;
    let r = convert::resolve(right)?;
    match (&l, &r) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Value::Str(s), Value::Empty) | (Value::Empty, Value::Str(s)) => Ok(Value::Str(s.clone())),
        _ => match both(&l, &r)? {
            Some((a, b)) => arithmetic(a, b, ArithmeticOp::Add),
            None => Ok(Value::Null),
        },
    }
}

/// `-`
pub fn subt(left: &Value, right: &Value) -> RuntimeResult<Value> {
    match both(left, right)? {
        Some((a, b)) => arithmetic(a, b, ArithmeticOp::Subtract),
        None => Ok(Value::Null),
    }
}

/// `*`
pub fn mult(left: &Value, right: &Value) -> RuntimeResult<Value> {
    match both(left, right)? {
        Some((a, b)) => arithmetic(a, b, ArithmeticOp::Multiply),
        None => Ok(Value::Null),
    }
}

/// `/`: always floating point
pub fn div(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let Some((a, b)) = both(left, right)? else {
        return Ok(Value::Null);
    };
    let (dividend, divisor) = (a.as_f64(), b.as_f64());
    if divisor == 0.0 {
        return if dividend == 0.0 {
            Err(VbsError::overflow("0 / 0"))
        } else {
            Err(VbsError::DivisionByZero)
        };
    }
    finite_double(dividend / divisor)
}

/// Operands of `\` and `Mod` are rounded to integers first
fn integer_operands(a: Numeric, b: Numeric) -> RuntimeResult<(i64, i64, Width)> {
    let to_integer = |n: Numeric| -> RuntimeResult<(i64, Width)> {
        match n.as_i64() {
            Some(v) => Ok((v, n.width())),
            None => {
                let long = convert::to_long(&Value::Double(n.as_f64()))?;
                Ok((i64::from(long), Width::Long))
            }
        }
    };
    let (l, lw) = to_integer(a)?;
    let (r, rw) = to_integer(b)?;
    if r == 0 {
        return Err(VbsError::DivisionByZero);
    }
    Ok((l, r, lw.max(rw)))
}

/// `\`
pub fn intdiv(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let Some((a, b)) = both(left, right)? else {
        return Ok(Value::Null);
    };
    let (l, r, width) = integer_operands(a, b)?;
    fit_integer(l / r, width)
}

/// `Mod`
pub fn modulo(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let Some((a, b)) = both(left, right)? else {
        return Ok(Value::Null);
    };
    let (l, r, width) = integer_operands(a, b)?;
    fit_integer(l % r, width)
}

/// `^`
pub fn pow(left: &Value, right: &Value) -> RuntimeResult<Value> {
    let Some((a, b)) = both(left, right)? else {
        return Ok(Value::Null);
    };
    let (base, exponent) = (a.as_f64(), b.as_f64());
    if base == 0.0 && exponent < 0.0 {
        return Err(VbsError::DivisionByZero);
    }
    let result = base.powf(exponent);
    if result.is_nan() {
        return Err(VbsError::invalid_procedure_call(format!(
            "{} ^ {}",
            base, exponent
        )));
    }
    finite_double(result)
}

/// Unary `-`
pub fn neg(operand: &Value) -> RuntimeResult<Value> {
    let Some(n) = numeric(operand)? else {
        return Ok(Value::Null);
    };
    match n {
        Numeric::Byte(v) => Ok(Value::Integer(-i16::from(v))),
        Numeric::Integer(v) => Ok(widen_integer(-i64::from(v), Width::Integer)),
        Numeric::Long(v) => Ok(widen_integer(-i64::from(v), Width::Long)),
        Numeric::Single(v) => Ok(Value::Single(-v)),
        Numeric::Double(v) => Ok(Value::Double(-v)),
        Numeric::Currency(d) => Ok(Value::Currency(-d)),
        Numeric::Date(d) => date_result(-d),
    }
}

// ========== Concatenation ==========

/// `&` over any number of operands; Null counts as "" unless every operand is
/// Null
pub fn concat(operands: &[&Value]) -> RuntimeResult<Value> {
    let mut result = String::new();
    let mut all_null = !operands.is_empty();
    for operand in operands {
        match convert::resolve(operand)? {
            Value::Null => {}
            Value::Array(_) => return Err(VbsError::type_mismatch("array in concatenation")),
            other => {
                all_null = false;
                if let Some(s) = convert::scalar_to_string(&other) {
                    result.push_str(&s);
                }
            }
        }
    }
    if all_null {
        Ok(Value::Null)
    } else {
        Ok(Value::Str(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_promotion_and_widening() {
        assert_eq!(add(&Value::Byte(200), &Value::Byte(55)).unwrap(), Value::Byte(255));
        assert_eq!(add(&Value::Byte(200), &Value::Byte(56)).unwrap(), Value::Integer(256));
        assert_eq!(
            add(&Value::Integer(32767), &Value::Integer(1)).unwrap(),
            Value::Long(32768)
        );
        assert_eq!(
            mult(&Value::Long(i32::MAX), &Value::Integer(2)).unwrap(),
            Value::Double(f64::from(i32::MAX) * 2.0)
        );
        assert_eq!(subt(&Value::Byte(0), &Value::Byte(1)).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_empty_and_boolean_operands() {
        assert_eq!(add(&Value::Empty, &Value::Empty).unwrap(), Value::Integer(0));
        assert_eq!(add(&Value::Bool(true), &Value::Bool(true)).unwrap(), Value::Integer(-2));
        assert_eq!(add(&Value::Empty, &Value::from("a")).unwrap(), Value::from("a"));
    }

    #[test]
    fn test_string_operands() {
        assert_eq!(add(&Value::from("a"), &Value::from("b")).unwrap(), Value::from("ab"));
        assert_eq!(add(&Value::from("2"), &Value::Integer(3)).unwrap(), Value::Double(5.0));
        assert_eq!(add(&Value::from("x"), &Value::Integer(3)).unwrap_err().number(), 13);
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(add(&Value::Null, &Value::Integer(1)).unwrap(), Value::Null);
        assert_eq!(div(&Value::Integer(1), &Value::Null).unwrap(), Value::Null);
        assert_eq!(neg(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_division() {
        assert_eq!(div(&Value::Integer(7), &Value::Integer(2)).unwrap(), Value::Double(3.5));
        assert_eq!(div(&Value::Integer(1), &Value::Integer(0)).unwrap_err().number(), 11);
        assert_eq!(div(&Value::Integer(0), &Value::Integer(0)).unwrap_err().number(), 6);
        assert_eq!(intdiv(&Value::Integer(7), &Value::Integer(2)).unwrap(), Value::Integer(3));
        assert_eq!(intdiv(&Value::Double(7.5), &Value::Integer(2)).unwrap(), Value::Long(4));
        assert_eq!(modulo(&Value::Integer(-7), &Value::Integer(3)).unwrap(), Value::Integer(-1));
        assert_eq!(modulo(&Value::Integer(1), &Value::Empty).unwrap_err().number(), 11);
    }

    #[test]
    fn test_currency() {
        let price = Value::Currency(Decimal::new(1050, 2));
        assert_eq!(
            mult(&price, &Value::Integer(2)).unwrap(),
            Value::Currency(Decimal::new(2100, 2))
        );
        assert!(matches!(add(&price, &Value::Double(0.5)).unwrap(), Value::Double(_)));
    }

    #[test]
    fn test_dates() {
        assert_eq!(add(&Value::Date(10.0), &Value::Integer(1)).unwrap(), Value::Date(11.0));
        assert_eq!(subt(&Value::Date(10.0), &Value::Date(4.0)).unwrap(), Value::Double(6.0));
    }

    #[test]
    fn test_pow_and_neg() {
        assert_eq!(pow(&Value::Integer(2), &Value::Integer(10)).unwrap(), Value::Double(1024.0));
        assert_eq!(pow(&Value::Integer(0), &Value::Integer(-1)).unwrap_err().number(), 11);
        assert_eq!(neg(&Value::Integer(i16::MIN)).unwrap(), Value::Long(32768));
        assert_eq!(neg(&Value::Bool(true)).unwrap(), Value::Integer(1));
        assert_eq!(neg(&Value::from("2")).unwrap(), Value::Double(-2.0));
    }

    #[test]
    fn test_concat() {
        assert_eq!(
            concat(&[&Value::from("a"), &Value::Integer(1), &Value::Empty, &Value::Null]).unwrap(),
            Value::from("a1")
        );
        assert_eq!(concat(&[&Value::Null, &Value::Null]).unwrap(), Value::Null);
        assert_eq!(concat(&[&Value::Bool(true), &Value::Double(0.5)]).unwrap(), Value::from("True0.5"));
    }
}
