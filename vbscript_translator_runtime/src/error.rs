//! Runtime error types for translated VBScript
//!
//! Every variant maps onto a VBScript runtime error number so that `Err.Number`
//! reports what the original script engine would have reported.

use thiserror::Error;

/// Runtime error type
///
/// Raised by the runtime library (never by the translator). Under an active
/// error-trapping token these are recorded rather than propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VbsError {
    /// Invalid procedure call or argument (5)
    #[error("Invalid procedure call or argument: {0}")]
    InvalidProcedureCallOrArgument(String),

    /// Overflow (6)
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Subscript out of range (9)
    #[error("Subscript out of range: {0}")]
    SubscriptOutOfRange(String),

    /// Division by zero (11)
    #[error("Division by zero")]
    DivisionByZero,

    /// Type mismatch (13)
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Out of string space (14)
    #[error("Out of string space")]
    OutOfStringSpace,

    /// Object variable not set (91)
    #[error("Object variable not set: {0}")]
    ObjectVariableNotSet(String),

    /// Invalid use of Null (94)
    #[error("Invalid use of Null: {0}")]
    InvalidUseOfNull(String),

    /// Object required (424)
    #[error("Object required: {0}")]
    ObjectRequired(String),

    /// Object doesn't support this property or method (438)
    #[error("Object doesn't support this property or method: {0}")]
    ObjectDoesNotSupportPropertyOrMember(String),

    /// Wrong number of arguments or invalid property assignment (450)
    #[error("Wrong number of arguments or invalid property assignment: {0}")]
    WrongNumberOfArguments(String),

    /// Illegal assignment (501)
    #[error("Illegal assignment: {0}")]
    IllegalAssignment(String),

    /// Class not defined (506)
    #[error("Class not defined: {0}")]
    ClassNotDefined(String),

    /// Error raised through `Err.Raise`
    #[error("{description}")]
    Custom {
        number: i32,
        origin: String,
        description: String,
    },

    /// A situation the translator guarantees cannot happen
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error source reported for errors raised by the runtime itself
pub const RUNTIME_ERROR_SOURCE: &str = "Microsoft VBScript runtime error";

impl VbsError {
    /// Create a type mismatch error
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        VbsError::TypeMismatch(msg.into())
    }

    /// Create an object required error
    pub fn object_required<S: Into<String>>(msg: S) -> Self {
        VbsError::ObjectRequired(msg.into())
    }

    /// Create an object variable not set error
    pub fn object_variable_not_set<S: Into<String>>(msg: S) -> Self {
        VbsError::ObjectVariableNotSet(msg.into())
    }

    /// Create a missing member error
    pub fn member_not_supported<S: Into<String>>(msg: S) -> Self {
        VbsError::ObjectDoesNotSupportPropertyOrMember(msg.into())
    }

    /// Create an invalid use of Null error
    pub fn invalid_use_of_null<S: Into<String>>(msg: S) -> Self {
        VbsError::InvalidUseOfNull(msg.into())
    }

    /// Create a subscript out of range error
    pub fn subscript_out_of_range<S: Into<String>>(msg: S) -> Self {
        VbsError::SubscriptOutOfRange(msg.into())
    }

    /// Create an invalid procedure call error
    pub fn invalid_procedure_call<S: Into<String>>(msg: S) -> Self {
        VbsError::InvalidProcedureCallOrArgument(msg.into())
    }

    /// Create an overflow error
    pub fn overflow<S: Into<String>>(msg: S) -> Self {
        VbsError::Overflow(msg.into())
    }

    /// Create a wrong number of arguments error
    pub fn wrong_number_of_arguments<S: Into<String>>(msg: S) -> Self {
        VbsError::WrongNumberOfArguments(msg.into())
    }

    /// Create an illegal assignment error
    pub fn illegal_assignment<S: Into<String>>(msg: S) -> Self {
        VbsError::IllegalAssignment(msg.into())
    }

    /// Create a class not defined error
    pub fn class_not_defined<S: Into<String>>(msg: S) -> Self {
        VbsError::ClassNotDefined(msg.into())
    }

    /// Create an internal (defect) error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        VbsError::Internal(msg.into())
    }

    /// Create an `Err.Raise`-style error
    pub fn custom<S1: Into<String>, S2: Into<String>>(
        number: i32,
        origin: S1,
        description: S2,
    ) -> Self {
        VbsError::Custom {
            number,
            origin: origin.into(),
            description: description.into(),
        }
    }

    /// VBScript error number
    pub fn number(&self) -> i32 {
        match self {
            VbsError::InvalidProcedureCallOrArgument(_) => 5,
            VbsError::Overflow(_) => 6,
            VbsError::SubscriptOutOfRange(_) => 9,
            VbsError::DivisionByZero => 11,
            VbsError::TypeMismatch(_) => 13,
            VbsError::OutOfStringSpace => 14,
            VbsError::ObjectVariableNotSet(_) => 91,
            VbsError::InvalidUseOfNull(_) => 94,
            VbsError::ObjectRequired(_) => 424,
            VbsError::ObjectDoesNotSupportPropertyOrMember(_) => 438,
            VbsError::WrongNumberOfArguments(_) => 450,
            VbsError::IllegalAssignment(_) => 501,
            VbsError::ClassNotDefined(_) => 506,
            VbsError::Custom { number, .. } => *number,
            // Unexpected error
            VbsError::Internal(_) => 51,
        }
    }

    /// Value reported by `Err.Source`
    pub fn error_source(&self) -> &str {
        match self {
            VbsError::Custom { origin, .. } => origin,
            _ => RUNTIME_ERROR_SOURCE,
        }
    }

    /// Value reported by `Err.Description` (the standard text, without detail)
    pub fn description(&self) -> String {
        match self {
            VbsError::Custom { description, .. } => description.clone(),
            other => standard_description(other.number())
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        }
    }
}

/// Standard VBScript description for a runtime error number
pub fn standard_description(number: i32) -> Option<&'static str> {
    let description = match number {
        5 => "Invalid procedure call or argument",
        6 => "Overflow",
        9 => "Subscript out of range",
        11 => "Division by zero",
        13 => "Type mismatch",
        14 => "Out of string space",
        51 => "Internal error",
        91 => "Object variable not set",
        94 => "Invalid use of Null",
        424 => "Object required",
        438 => "Object doesn't support this property or method",
        450 => "Wrong number of arguments or invalid property assignment",
        501 => "Illegal assignment",
        506 => "Class not defined",
        _ => return None,
    };
    Some(description)
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, VbsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VbsError::type_mismatch("'aa'");
        assert_eq!(format!("{}", err), "Type mismatch: 'aa'");

        let err = VbsError::DivisionByZero;
        assert_eq!(format!("{}", err), "Division by zero");
    }

    #[test]
    fn test_error_numbers() {
        assert_eq!(VbsError::type_mismatch("").number(), 13);
        assert_eq!(VbsError::object_variable_not_set("").number(), 91);
        assert_eq!(VbsError::member_not_supported("").number(), 438);
        assert_eq!(VbsError::illegal_assignment("").number(), 501);
        assert_eq!(VbsError::custom(1234, "src", "desc").number(), 1234);
    }

    #[test]
    fn test_error_source_and_description() {
        let err = VbsError::subscript_out_of_range("index 7");
        assert_eq!(err.error_source(), RUNTIME_ERROR_SOURCE);
        assert_eq!(err.description(), "Subscript out of range");

        let err = VbsError::custom(vbs_object_error(1), "MyClass", "Bad thing");
        assert_eq!(err.error_source(), "MyClass");
        assert_eq!(err.description(), "Bad thing");
    }

    fn vbs_object_error(offset: i32) -> i32 {
        -2147221504 + offset
    }
}
