//! VBScript Translator Runtime Library
//!
//! This crate provides the runtime support that translated VBScript calls
//! into. It includes:
//!
//! - `Value` enum for VBScript's variant type
//! - `VbsError` with VBScript runtime error numbers
//! - Value coercions and default-member resolution
//! - Late-bound CALL/SET dispatch with cached member resolution
//! - Operators with VBScript type promotion
//! - Arrays, built-in functions and `On Error Resume Next` support
//! - `RuntimeProvider`, the per-request facade used by generated code

pub mod args;
pub mod arithmetic;
pub mod array;
pub mod cache;
pub mod comparison;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod error_trapping;
pub mod intrinsics;
pub mod logical;
pub mod object;
pub mod provider;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use vbscript_translator_runtime::prelude::*;
///
/// let provider = RuntimeProvider::new();
/// let sum = provider.add(&Value::Integer(1), &Value::from("2")).unwrap();
/// assert_eq!(sum, Value::Double(3.0));
/// ```
pub mod prelude {
    pub use super::args::ArgumentProvider;
    pub use super::array::VbsArray;
    pub use super::error::{RuntimeResult, VbsError};
    pub use super::error_trapping::ErrorTrappingToken;
    pub use super::object::{
        DispatchObject, InvokeKind, MemberDescriptor, MemberKind, VbsObject, DISPID_VALUE,
    };
    pub use super::provider::RuntimeProvider;
    pub use super::value::Value;
}

pub use prelude::*;
