//! Object capability interfaces
//!
//! Translated classes and host objects expose their members through
//! `VbsObject`: a static descriptor table plus index-based get/set. Objects
//! that behave like IDispatch instead implement `DispatchObject` and return it
//! from `VbsObject::as_dispatch`.

use std::fmt;

use crate::error::{RuntimeResult, VbsError};
use crate::value::Value;

/// Kind of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Function or Sub
    Method,
    /// Property Get
    PropertyGet,
    /// Property Let (value assignment)
    PropertyLet,
    /// Property Set (object assignment)
    PropertySet,
    /// Public variable, readable and writable without arguments
    Field,
}

impl MemberKind {
    /// Whether the member can produce a value
    pub fn is_readable(self) -> bool {
        matches!(
            self,
            MemberKind::Method | MemberKind::PropertyGet | MemberKind::Field
        )
    }

    /// Whether the member accepts a value-type assignment
    pub fn accepts_let(self) -> bool {
        matches!(self, MemberKind::PropertyLet | MemberKind::Field)
    }

    /// Whether the member accepts an object-reference assignment
    pub fn accepts_set(self) -> bool {
        matches!(self, MemberKind::PropertySet | MemberKind::Field)
    }
}

/// Static description of one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub kind: MemberKind,
    pub min_args: usize,
    pub max_args: usize,
    pub is_default: bool,
    pub is_public: bool,
}

impl MemberDescriptor {
    const fn new(name: &'static str, kind: MemberKind, min_args: usize, max_args: usize) -> Self {
        Self {
            name,
            kind,
            min_args,
            max_args,
            is_default: false,
            is_public: true,
        }
    }

    pub const fn method(name: &'static str, min_args: usize, max_args: usize) -> Self {
        Self::new(name, MemberKind::Method, min_args, max_args)
    }

    pub const fn property_get(name: &'static str, args: usize) -> Self {
        Self::new(name, MemberKind::PropertyGet, args, args)
    }

    pub const fn property_let(name: &'static str, args: usize) -> Self {
        Self::new(name, MemberKind::PropertyLet, args, args)
    }

    pub const fn property_set(name: &'static str, args: usize) -> Self {
        Self::new(name, MemberKind::PropertySet, args, args)
    }

    pub const fn field(name: &'static str) -> Self {
        Self::new(name, MemberKind::Field, 0, 0)
    }

    /// Mark as the type's default member
    pub const fn default_member(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Mark as accessible only from within the same class
    pub const fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Whether this member accepts `arity` arguments
    pub fn accepts(&self, arity: usize) -> bool {
        self.min_args <= arity && arity <= self.max_args
    }

    /// Case-insensitive name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An object reachable from translated code
///
/// `members` must return the same table for every instance sharing a
/// `type_name`: resolved member indices are cached per type name.
pub trait VbsObject: fmt::Debug {
    /// VBScript `TypeName` of the object
    fn type_name(&self) -> &str;

    /// Member table
    fn members(&self) -> &[MemberDescriptor] {
        &[]
    }

    /// Invoke a readable member. Arguments may be updated in place for by-ref
    /// parameters.
    fn get_member(&self, index: usize, args: &mut [Value]) -> RuntimeResult<Value> {
        let _ = args;
        Err(VbsError::member_not_supported(format!(
            "{} member #{}",
            self.type_name(),
            index
        )))
    }

    /// Assign through a writable member
    fn set_member(&self, index: usize, args: &[Value], value: Value) -> RuntimeResult<()> {
        let _ = (args, value);
        Err(VbsError::member_not_supported(format!(
            "{} member #{}",
            self.type_name(),
            index
        )))
    }

    /// IDispatch-style access, when the object offers it
    fn as_dispatch(&self) -> Option<&dyn DispatchObject> {
        None
    }

    /// Release native resources at the end of the request
    fn dispose(&self) {}
}

/// Member id of the default member
pub const DISPID_VALUE: i32 = 0;

/// Kind of a dispatch invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    /// Method call or property read
    Get,
    /// Value assignment (the value is the last argument)
    Put,
    /// Reference assignment (the value is the last argument)
    PutRef,
}

/// IDispatch-style late binding
pub trait DispatchObject {
    /// Name of the type descriptor class, used as the cache key
    fn type_info_name(&self) -> &str;

    /// Resolve a member name to a member id
    fn get_id_of_name(&self, name: &str) -> Option<i32>;

    /// Whether invoking `DISPID_VALUE` without arguments yields a value
    fn has_default_member(&self) -> bool;

    fn invoke(&self, dispid: i32, kind: InvokeKind, args: &mut [Value]) -> RuntimeResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builders() {
        let m = MemberDescriptor::property_get("Name", 0).default_member();
        assert!(m.is_default);
        assert!(m.is_public);
        assert!(m.accepts(0));
        assert!(!m.accepts(1));
        assert!(m.is_named("NAME"));

        let m = MemberDescriptor::method("Add", 1, 2).private();
        assert!(!m.is_public);
        assert!(m.accepts(2));
        assert!(!m.accepts(3));
    }

    #[test]
    fn test_member_kind_access() {
        assert!(MemberKind::Field.accepts_let());
        assert!(MemberKind::Field.accepts_set());
        assert!(!MemberKind::PropertyLet.accepts_set());
        assert!(!MemberKind::PropertySet.is_readable());
    }

    #[derive(Debug)]
    struct Bare;

    impl VbsObject for Bare {
        fn type_name(&self) -> &str {
            "Bare"
        }
    }

    #[test]
    fn test_default_get_member_is_not_supported() {
        let err = Bare.get_member(0, &mut []).unwrap_err();
        assert_eq!(err.number(), 438);
        assert!(Bare.as_dispatch().is_none());
    }
}
