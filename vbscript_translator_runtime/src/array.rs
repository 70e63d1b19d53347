//! VBScript arrays
//!
//! Arrays are zero-based, possibly multi-dimensional, and stored row-major.
//! Index arguments are coerced with banker's rounding, the way VBScript's own
//! array access does.

// SAFETY: usize casts below follow explicit non-negative bounds checks.
#![allow(clippy::cast_sign_loss)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::convert;
use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

/// Zero-based, row-major array of values
#[derive(Debug, Clone, PartialEq)]
pub struct VbsArray {
    /// Length of each dimension
    dimensions: Vec<usize>,
    elements: Vec<Value>,
}

impl VbsArray {
    /// One-dimensional array with upper bound -1
    pub fn empty() -> Self {
        Self {
            dimensions: vec![0],
            elements: Vec::new(),
        }
    }

    /// One-dimensional array holding `values` (the `Array(...)` function)
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            dimensions: vec![values.len()],
            elements: values,
        }
    }

    /// Array with the given upper bounds, every element Empty
    pub fn with_upper_bounds(upper_bounds: &[i64]) -> RuntimeResult<Self> {
        if upper_bounds.is_empty() {
            return Err(VbsError::subscript_out_of_range("array needs a dimension"));
        }
        let dimensions = upper_bounds
            .iter()
            .map(|&upper| {
                if upper < -1 {
                    Err(VbsError::subscript_out_of_range(format!(
                        "upper bound {}",
                        upper
                    )))
                } else {
                    Ok((upper + 1) as usize)
                }
            })
            .collect::<RuntimeResult<Vec<_>>>()?;
        let count = element_count(&dimensions)?;
        Ok(Self {
            dimensions,
            elements: vec![Value::Empty; count],
        })
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Upper bound of a 1-based dimension
    pub fn upper_bound(&self, dimension: usize) -> RuntimeResult<i64> {
        dimension
            .checked_sub(1)
            .and_then(|d| self.dimensions.get(d))
            .map(|&len| len as i64 - 1)
            .ok_or_else(|| VbsError::subscript_out_of_range(format!("dimension {}", dimension)))
    }

    /// Elements in storage order
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn get(&self, indices: &[Value]) -> RuntimeResult<Value> {
        let offset = self.offset(indices)?;
        Ok(self.elements[offset].clone())
    }

    pub fn set(&mut self, indices: &[Value], value: Value) -> RuntimeResult<()> {
        let offset = self.offset(indices)?;
        self.elements[offset] = value;
        Ok(())
    }

    /// `ReDim` / `ReDim Preserve`
    ///
    /// With `preserve`, only the last dimension may change and existing
    /// elements keep their positions.
    pub fn resize(&mut self, upper_bounds: &[i64], preserve: bool) -> RuntimeResult<()> {
        let mut resized = VbsArray::with_upper_bounds(upper_bounds)?;
        if preserve {
            let rank = self.dimensions.len();
            if resized.dimensions.len() != rank
                || resized.dimensions[..rank - 1] != self.dimensions[..rank - 1]
            {
                return Err(VbsError::subscript_out_of_range(
                    "only the last dimension can be resized when preserving",
                ));
            }
            let old_last = self.dimensions[rank - 1];
            let new_last = resized.dimensions[rank - 1];
            let kept = old_last.min(new_last);
            let rows = if old_last == 0 { 0 } else { self.elements.len() / old_last };
            for row in 0..rows {
                for column in 0..kept {
                    resized.elements[row * new_last + column] =
                        std::mem::take(&mut self.elements[row * old_last + column]);
                }
            }
        }
        *self = resized;
        Ok(())
    }

    /// `Erase`: the array becomes empty with upper bound -1
    pub fn erase(&mut self) {
        *self = VbsArray::empty();
    }

    fn offset(&self, indices: &[Value]) -> RuntimeResult<usize> {
        if indices.len() != self.dimensions.len() {
            return Err(VbsError::subscript_out_of_range(format!(
                "{} indices for {} dimensions",
                indices.len(),
                self.dimensions.len()
            )));
        }
        let mut offset = 0usize;
        for (index, &len) in indices.iter().zip(&self.dimensions) {
            let i = round_index(index)?;
            if i < 0 || i as usize >= len {
                return Err(VbsError::subscript_out_of_range(format!("index {}", i)));
            }
            offset = offset * len + i as usize;
        }
        Ok(offset)
    }
}

fn element_count(dimensions: &[usize]) -> RuntimeResult<usize> {
    dimensions
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
        .ok_or(VbsError::OutOfStringSpace)
}

/// Coerce an array index: numbers and numeric strings round half to even
pub fn round_index(index: &Value) -> RuntimeResult<i64> {
    match convert::resolve(index)? {
        Value::Null => Err(VbsError::invalid_use_of_null("Null array index")),
        other => Ok(convert::to_long(&other)? as i64),
    }
}

// ========== Array helpers used by translated code ==========

fn upper_bounds(bounds: &[&Value]) -> RuntimeResult<Vec<i64>> {
    bounds.iter().map(|b| round_index(b)).collect()
}

/// `Dim a(n, m)` / `ReDim a(n, m)`
pub fn new_array(bounds: &[&Value]) -> RuntimeResult<Value> {
    Ok(Value::array(VbsArray::with_upper_bounds(&upper_bounds(bounds)?)?))
}

/// `ReDim [Preserve] a(n)`: resizes in place when the target already holds an
/// array, creates one otherwise
pub fn resize_array(target: &Value, bounds: &[&Value], preserve: bool) -> RuntimeResult<Value> {
    let bounds = upper_bounds(bounds)?;
    match target {
        Value::Array(array) => {
            array.borrow_mut().resize(&bounds, preserve)?;
            Ok(Value::Array(Rc::clone(array)))
        }
        _ => Ok(Value::Array(Rc::new(RefCell::new(
            VbsArray::with_upper_bounds(&bounds)?,
        )))),
    }
}

/// `Erase a`
pub fn erase(target: &Value) -> RuntimeResult<Value> {
    match target {
        Value::Array(array) => {
            array.borrow_mut().erase();
            Ok(target.clone())
        }
        other => Err(VbsError::type_mismatch(format!(
            "Erase on '{}'",
            other.type_name()
        ))),
    }
}

/// `LBound(a[, dimension])`: always zero
pub fn lbound(target: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
    let Value::Array(array) = convert::resolve(target)? else {
        return Err(VbsError::type_mismatch("LBound needs an array"));
    };
    let dimension = match dimension {
        Some(d) => round_index(d)?,
        None => 1,
    };
    if dimension < 1 || dimension as usize > array.borrow().dimension_count() {
        return Err(VbsError::subscript_out_of_range(format!("dimension {}", dimension)));
    }
    Ok(Value::Long(0))
}

/// `UBound(a[, dimension])`
pub fn ubound(target: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
    let Value::Array(array) = convert::resolve(target)? else {
        return Err(VbsError::type_mismatch("UBound needs an array"));
    };
    let dimension = match dimension {
        Some(d) => round_index(d)?,
        None => 1,
    };
    if dimension < 1 {
        return Err(VbsError::subscript_out_of_range(format!("dimension {}", dimension)));
    }
    let upper = array.borrow().upper_bound(dimension as usize)?;
    Ok(Value::Long(upper as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_array_bounds() {
        let array = VbsArray::with_upper_bounds(&[2, 3]).unwrap();
        assert_eq!(array.dimension_count(), 2);
        assert_eq!(array.upper_bound(1).unwrap(), 2);
        assert_eq!(array.upper_bound(2).unwrap(), 3);
        assert_eq!(array.elements().len(), 12);
        assert!(array.upper_bound(3).is_err());
    }

    #[test]
    fn test_get_set_row_major() {
        let mut array = VbsArray::with_upper_bounds(&[1, 2]).unwrap();
        array
            .set(&[Value::Long(1), Value::Long(0)], Value::from("x"))
            .unwrap();
        assert_eq!(array.elements()[3], Value::from("x"));
        assert_eq!(
            array.get(&[Value::Long(1), Value::Long(0)]).unwrap(),
            Value::from("x")
        );
    }

    #[test]
    fn test_index_rounding_is_bankers() {
        let mut array = VbsArray::with_upper_bounds(&[5]).unwrap();
        array.set(&[Value::Double(2.5)], Value::Long(25)).unwrap();
        array.set(&[Value::Double(3.5)], Value::Long(35)).unwrap();
        array.set(&[Value::from("0.5")], Value::Long(5)).unwrap();
        assert_eq!(array.elements()[2], Value::Long(25));
        assert_eq!(array.elements()[4], Value::Long(35));
        assert_eq!(array.elements()[0], Value::Long(5));
        assert_eq!(array.elements()[3], Value::Empty);
    }

    #[test]
    fn test_out_of_range() {
        let array = VbsArray::with_upper_bounds(&[1]).unwrap();
        assert_eq!(array.get(&[Value::Long(2)]).unwrap_err().number(), 9);
        assert_eq!(array.get(&[Value::Long(-1)]).unwrap_err().number(), 9);
        assert_eq!(
            array.get(&[Value::Long(0), Value::Long(0)]).unwrap_err().number(),
            9
        );
    }

    #[test]
    fn test_resize_preserve() {
        let mut array = VbsArray::with_upper_bounds(&[1, 1]).unwrap();
        array.set(&[Value::Long(1), Value::Long(1)], Value::Long(11)).unwrap();
        array.resize(&[1, 3], true).unwrap();
        assert_eq!(array.upper_bound(2).unwrap(), 3);
        assert_eq!(
            array.get(&[Value::Long(1), Value::Long(1)]).unwrap(),
            Value::Long(11)
        );
        assert!(array.resize(&[2, 3], true).is_err());
    }

    #[test]
    fn test_resize_array_shares_reference() {
        let original = new_array(&[&Value::Long(1)]).unwrap();
        let resized = resize_array(&original, &[&Value::Long(4)], false).unwrap();
        assert!(original.same_reference(&resized));
        assert_eq!(ubound(&original, None).unwrap(), Value::Long(4));
    }

    #[test]
    fn test_erase() {
        let array = new_array(&[&Value::Long(3)]).unwrap();
        erase(&array).unwrap();
        assert_eq!(ubound(&array, None).unwrap(), Value::Long(-1));
        assert_eq!(lbound(&array, None).unwrap(), Value::Long(0));
        assert_eq!(erase(&Value::Long(1)).unwrap_err().number(), 13);
    }
}
