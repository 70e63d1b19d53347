//! Dynamic Value type for translated VBScript
//!
//! Every VBScript variable holds a `Value`. The split between Empty, Null and
//! everything else drives nearly every coercion in this crate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rust_decimal::Decimal;

use crate::array::VbsArray;
use crate::object::VbsObject;

/// Dynamic value type for translated code
#[derive(Debug, Clone, Default)]
pub enum Value {
    // ========== Sentinels ==========
    /// Uninitialized variable
    #[default]
    Empty,
    /// Explicit "no value" marker
    Null,

    // ========== Value Types ==========
    /// Boolean (True is -1 when used as a number)
    Bool(bool),
    /// 8-bit unsigned integer
    Byte(u8),
    /// 16-bit signed integer
    Integer(i16),
    /// 32-bit signed integer
    Long(i32),
    /// 32-bit floating point
    Single(f32),
    /// 64-bit floating point
    Double(f64),
    /// Fixed-point currency
    Currency(Decimal),
    /// OLE automation date (days since 1899-12-30, fraction is time of day)
    Date(f64),
    /// String
    Str(String),
    /// Array; `Clone` shares the storage, `copied` duplicates it
    Array(Rc<RefCell<VbsArray>>),

    // ========== Object References ==========
    /// Object reference
    Object(Rc<dyn VbsObject>),
    /// The empty object reference
    Nothing,
}

impl Value {
    /// Wrap an object implementation in a reference
    pub fn object<T: VbsObject + 'static>(object: T) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Wrap an array
    pub fn array(array: VbsArray) -> Self {
        Value::Array(Rc::new(RefCell::new(array)))
    }

    /// Get the VBScript `TypeName` of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::Empty => "Empty",
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Byte(_) => "Byte",
            Value::Integer(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Single(_) => "Single",
            Value::Double(_) => "Double",
            Value::Currency(_) => "Currency",
            Value::Date(_) => "Date",
            Value::Str(_) => "String",
            Value::Array(_) => "Variant()",
            Value::Object(obj) => obj.type_name(),
            Value::Nothing => "Nothing",
        }
    }

    /// Get the VBScript `VarType` code of this value
    pub fn var_type(&self) -> i32 {
        match self {
            Value::Empty => 0,
            Value::Null => 1,
            Value::Integer(_) => 2,
            Value::Long(_) => 3,
            Value::Single(_) => 4,
            Value::Double(_) => 5,
            Value::Currency(_) => 6,
            Value::Date(_) => 7,
            Value::Str(_) => 8,
            Value::Object(_) | Value::Nothing => 9,
            Value::Bool(_) => 11,
            Value::Byte(_) => 17,
            // vbArray | vbVariant
            Value::Array(_) => 8192 + 12,
        }
    }

    /// Check if this value is Empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Check if this value is Null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is the Nothing reference
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Check if this value is an object reference (including Nothing)
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Nothing)
    }

    /// Check if this value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if this is a numeric subtype (Boolean excluded)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Byte(_)
                | Value::Integer(_)
                | Value::Long(_)
                | Value::Single(_)
                | Value::Double(_)
                | Value::Currency(_)
        )
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract the object reference
    pub fn as_object(&self) -> Option<&Rc<dyn VbsObject>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Value-semantics copy: arrays get their own storage, everything else is
    /// cloned
    pub fn copied(&self) -> Value {
        match self {
            Value::Array(array) => Value::Array(Rc::new(RefCell::new(array.borrow().clone()))),
            other => other.clone(),
        }
    }

    /// Identity comparison for reference types (the `Is` operator)
    pub fn same_reference(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ========== From implementations ==========

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Single(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Currency(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<VbsArray> for Value {
    fn from(v: VbsArray) -> Self {
        Value::array(v)
    }
}

// ========== Display implementation ==========

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(_) => write!(f, "Variant()"),
            Value::Object(obj) => write!(f, "[object {}]", obj.type_name()),
            Value::Nothing => write!(f, "Nothing"),
            Value::Null => write!(f, "Null"),
            other => match crate::convert::scalar_to_string(other) {
                Some(s) => write!(f, "{}", s),
                None => write!(f, "{}", other.type_name()),
            },
        }
    }
}

// ========== PartialEq implementation ==========

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Single(a), Value::Single(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Currency(a), Value::Currency(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Arrays and objects are compared by reference
            (a, b) => a.same_reference(b),
        }
    }
}
