//! Logical / bitwise operators
//!
//! `And`, `Or`, `Xor`, `Eqv`, `Imp` and `Not` are bitwise on a common width:
//! the smallest of Boolean, Byte, Integer and Long that covers both operands.
//! Boolean combined with Byte needs Integer. Each operator has its own Null
//! rule.

use crate::convert;
use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Width {
    Boolean,
    Byte,
    Integer,
    Long,
}

#[derive(Debug, Clone, Copy)]
struct Bits {
    value: i32,
    width: Width,
}

impl Bits {
    fn all_set(self) -> bool {
        match self.width {
            Width::Byte => self.value == 0xFF,
            _ => self.value == -1,
        }
    }
}

fn common_width(a: Width, b: Width) -> Width {
    match (a, b) {
        (Width::Boolean, Width::Byte) | (Width::Byte, Width::Boolean) => Width::Integer,
        _ => a.max(b),
    }
}

/// Normalize an operand; `None` means Null
fn bits(value: &Value) -> RuntimeResult<Option<Bits>> {
    let b = match convert::resolve(value)? {
        Value::Null => return Ok(None),
        Value::Bool(b) => Bits {
            value: if b { -1 } else { 0 },
            width: Width::Boolean,
        },
        Value::Byte(v) => Bits {
            value: i32::from(v),
            width: Width::Byte,
        },
        Value::Empty => Bits {
            value: 0,
            width: Width::Integer,
        },
        Value::Integer(v) => Bits {
            value: i32::from(v),
            width: Width::Integer,
        },
        Value::Array(_) => return Err(VbsError::type_mismatch("array in logical operation")),
        other => Bits {
            value: convert::to_long(&other)?,
            width: Width::Long,
        },
    };
    Ok(Some(b))
}

fn to_value(result: i32, width: Width) -> Value {
    match width {
        Width::Boolean => Value::Bool(result != 0),
        Width::Byte => Value::Byte((result & 0xFF) as u8),
        Width::Integer => Value::Integer(result as i16),
        Width::Long => Value::Long(result),
    }
}

fn binary(
    left: &Value,
    right: &Value,
    op: impl Fn(i32, i32) -> i32,
    on_null: impl Fn(Option<Bits>, Option<Bits>) -> Value,
) -> RuntimeResult<Value> {
    let l = bits(left)?;
    let r = bits(right)?;
    match (l, r) {
        (Some(a), Some(b)) => {
            let width = common_width(a.width, b.width);
            Ok(to_value(op(a.value, b.value), width))
        }
        _ => Ok(on_null(l, r)),
    }
}

/// `Not`
pub fn not(operand: &Value) -> RuntimeResult<Value> {
    Ok(match bits(operand)? {
        Some(b) => to_value(!b.value, b.width),
        None => Value::Null,
    })
}

/// `And`: Null unless the other side is zero
pub fn and(left: &Value, right: &Value) -> RuntimeResult<Value> {
    binary(left, right, |a, b| a & b, |l, r| match l.or(r) {
        Some(known) if known.value == 0 => to_value(0, known.width),
        _ => Value::Null,
    })
}

/// `Or`: Null unless the other side has every bit set
pub fn or(left: &Value, right: &Value) -> RuntimeResult<Value> {
    binary(left, right, |a, b| a | b, |l, r| match l.or(r) {
        Some(known) if known.all_set() => to_value(known.value, known.width),
        _ => Value::Null,
    })
}

/// `Xor`
pub fn xor(left: &Value, right: &Value) -> RuntimeResult<Value> {
    binary(left, right, |a, b| a ^ b, |_, _| Value::Null)
}

/// `Eqv`
pub fn eqv(left: &Value, right: &Value) -> RuntimeResult<Value> {
    binary(left, right, |a, b| !(a ^ b), |_, _| Value::Null)
}

/// `Imp`: `Null Imp x` is x when x has every bit set, `x Imp Null` is True
/// when x is zero
pub fn imp(left: &Value, right: &Value) -> RuntimeResult<Value> {
    binary(left, right, |a, b| !a | b, |l, r| match (l, r) {
        (None, Some(known)) if known.all_set() => to_value(known.value, known.width),
        (Some(known), None) if known.value == 0 => to_value(-1, known.width),
        _ => Value::Null,
    })
}
