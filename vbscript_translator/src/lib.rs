// Library code reports through `tracing` and `TranslationError`, never stderr.
#![deny(clippy::print_stderr)]

//! vbscript_translator
//!
//! Translates parsed VBScript expressions and leaf statements into Rust
//! source that runs against `vbscript_translator_runtime`.
//!
//! # Example
//!
//! ```
//! use vbscript_translator::{ExpressionReturnType, ScopeAccessInformation, StatementTranslator};
//! use vbscript_translator_syntax::{Expression, ExpressionSegment, NumericValueToken};
//!
//! let translator = StatementTranslator::default_config();
//! let one = Expression::single(ExpressionSegment::Numeric(NumericValueToken::new(1.0, "1", 0)));
//! let translated = translator
//!     .translate(&one, &ScopeAccessInformation::outermost(), ExpressionReturnType::Value)
//!     .unwrap();
//! assert_eq!(translated.content, "vbs::Value::Integer(1)");
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod names;
pub mod scope;
pub mod translate;

// Re-exports
pub use config::TranslatorConfig;
pub use error::{TranslationError, TranslationResult};
pub use scope::{
    DeclaredKind, DeclaredName, Parameter, ParentRoutine, RoutineKind, ScopeAccessInformation,
    ScopeLocation,
};
pub use translate::{
    flatten_concatenations, ArgumentPassing, AssignmentTarget, ByRefAliasAnalyzer,
    ExpressionReturnType, FuncByRefMapping, NameSet, ResolvedAssignmentTarget,
    StatementTranslator, TranslatedExpression, TranslatedStatement,
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
