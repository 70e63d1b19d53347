//! Argument lists for late-bound calls
//!
//! Translated code builds an `ArgumentProvider` per call:
//!
//! ```
//! use vbscript_translator_runtime::prelude::*;
//!
//! let x = Value::Long(1);
//! let mut args = ArgumentProvider::new().val(&x).by_ref(&Value::Empty);
//! assert_eq!(args.len(), 2);
//! ```
//!
//! By-ref slots receive the callee's writes; the caller copies them back into
//! its variables with `take`. Slots whose passing mode depends on whether the
//! target turns out to be an array (`ref_if_array`) are resolved during the
//! call and write straight back into the array element.

use crate::dispatch;
use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

#[derive(Debug, Clone)]
enum ArgumentSlot {
    ByVal(Value),
    ByRef(Value),
    /// `target(indices)`: array element by reference, otherwise a by-value call
    RefIfArray { target: Value, indices: Vec<Value> },
}

/// Arguments of one call
#[derive(Debug, Clone, Default)]
pub struct ArgumentProvider {
    slots: Vec<ArgumentSlot>,
    zero_argument_brackets: bool,
}

impl ArgumentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a by-value argument; arrays are copied so the callee cannot
    /// change the caller's
    pub fn val(mut self, value: &Value) -> Self {
        self.slots.push(ArgumentSlot::ByVal(value.copied()));
        self
    }

    /// Append a by-reference argument
    pub fn by_ref(mut self, value: &Value) -> Self {
        self.slots.push(ArgumentSlot::ByRef(value.clone()));
        self
    }

    /// Append `target(indices)`, passed by reference if `target` is an array
    pub fn ref_if_array(mut self, target: &Value, indices: &[&Value]) -> Self {
        self.slots.push(ArgumentSlot::RefIfArray {
            target: target.clone(),
            indices: indices.iter().map(|&v| v.clone()).collect(),
        });
        self
    }

    /// The call was written with empty brackets: `f()`
    pub fn with_zero_argument_brackets(mut self) -> Self {
        self.zero_argument_brackets = true;
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn has_zero_argument_brackets(&self) -> bool {
        self.zero_argument_brackets
    }

    /// Produce the values handed to the callee
    pub fn evaluate(&self, context: &Value) -> RuntimeResult<Vec<Value>> {
        self.slots
            .iter()
            .map(|slot| match slot {
                ArgumentSlot::ByVal(v) | ArgumentSlot::ByRef(v) => Ok(v.clone()),
                ArgumentSlot::RefIfArray { target, indices } => match target {
                    Value::Array(array) => array.borrow().get(indices),
                    _ => {
                        let mut args = indices
                            .iter()
                            .fold(ArgumentProvider::new(), |args, index| args.val(index));
                        dispatch::call(context, target, &[], &mut args)
                    }
                },
            })
            .collect()
    }

    /// Record the callee's writes to by-ref slots
    pub fn write_back(&mut self, values: Vec<Value>) -> RuntimeResult<()> {
        if values.len() != self.slots.len() {
            return Err(VbsError::internal(format!(
                "{} argument values for {} slots",
                values.len(),
                self.slots.len()
            )));
        }
        for (slot, value) in self.slots.iter_mut().zip(values) {
            match slot {
                ArgumentSlot::ByVal(_) => {}
                ArgumentSlot::ByRef(v) => *v = value,
                ArgumentSlot::RefIfArray { target, indices } => {
                    if let Value::Array(array) = target {
                        array.borrow_mut().set(indices, value)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Take the (possibly updated) value of a by-ref slot
    pub fn take(&mut self, index: usize) -> Value {
        match self.slots.get_mut(index) {
            Some(ArgumentSlot::ByRef(v)) | Some(ArgumentSlot::ByVal(v)) => std::mem::take(v),
            _ => Value::Empty,
        }
    }
}
