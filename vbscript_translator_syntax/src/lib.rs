//! vbscript_translator_syntax
//!
//! The expression segment model that the VBScript statement parsers produce and
//! the translator consumes.
//!
//! Precedence is encoded by nesting: an expression holds at most three segments
//! (a single value, a unary operation or a binary operation) and anything more
//! complicated is wrapped in a [`BracketedSegment`].
//!
//! # Example
//!
//! ```
//! use vbscript_translator_syntax::{Expression, ExpressionShape, ExpressionSegment, NumericValueToken};
//!
//! let expr = Expression::single(ExpressionSegment::Numeric(NumericValueToken::new(1.0, "1", 0)));
//! assert!(matches!(expr.shape().unwrap(), ExpressionShape::Single(_)));
//! ```

pub mod error;
pub mod segment;
pub mod statement;
pub mod token;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports
pub use error::{SyntaxError, SyntaxResult};
pub use segment::{
    BracketedSegment, CallSegment, CallSetSegment, DeferredError, Expression, ExpressionSegment,
    ExpressionShape, NewInstanceSegment, RuntimeErrorSegment, ZeroArgumentBrackets,
};
pub use statement::{Statement, ValueSettingKind, ValueSettingStatement};
pub use token::{
    DateLiteralToken, NameKind, NameToken, NumericValueToken, Operator, OperatorToken, StringToken,
};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
