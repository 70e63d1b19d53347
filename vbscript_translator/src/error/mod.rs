//! Translation-time errors
//!
//! Everything here is a precondition failure: the segment tree or scope
//! information handed to the translator violates a guarantee of the upstream
//! parser. VBScript that is legal but bound to fail when executed never ends
//! up here; it is translated into code that raises the runtime error instead.

use thiserror::Error;
use vbscript_translator_syntax::SyntaxError;

/// Translation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The segment tree breaks the nesting invariant
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A segment shape the current position cannot hold
    #[error("unsupported segment at line {line_index}: {message}")]
    UnsupportedSegment { message: String, line_index: usize },

    /// Assignment whose left-hand side is not a call or call set
    #[error("invalid assignment target at line {line_index}: {message}")]
    InvalidAssignmentTarget { message: String, line_index: usize },

    /// `.Name` access outside of a WITH block
    #[error("member access on the WITH target outside of a WITH block (line {line_index})")]
    MissingWithTarget { line_index: usize },

    /// Error trapping statement in a scope without a registered token
    #[error("no error trapping token in scope (line {line_index})")]
    MissingErrorToken { line_index: usize },

    /// Configuration could not be loaded
    #[error("invalid translator configuration: {0}")]
    Config(String),
}

impl TranslationError {
    /// Create an unsupported segment error
    pub fn unsupported(message: impl Into<String>, line_index: usize) -> Self {
        TranslationError::UnsupportedSegment {
            message: message.into(),
            line_index,
        }
    }

    /// Create an invalid assignment target error
    pub fn invalid_target(message: impl Into<String>, line_index: usize) -> Self {
        TranslationError::InvalidAssignmentTarget {
            message: message.into(),
            line_index,
        }
    }

    /// Source line the error refers to, when there is one
    pub fn line_index(&self) -> Option<usize> {
        match self {
            TranslationError::Syntax(e) => Some(e.line_index()),
            TranslationError::UnsupportedSegment { line_index, .. }
            | TranslationError::InvalidAssignmentTarget { line_index, .. }
            | TranslationError::MissingWithTarget { line_index }
            | TranslationError::MissingErrorToken { line_index } => Some(*line_index),
            TranslationError::Config(_) => None,
        }
    }
}

/// Result type for translation
pub type TranslationResult<T> = Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_convert() {
        let err: TranslationError = SyntaxError::EmptyExpression { line_index: 4 }.into();
        assert_eq!(err.line_index(), Some(4));
        assert_eq!(err.to_string(), "empty expression at line 4");
    }

    #[test]
    fn test_unsupported_display() {
        let err = TranslationError::unsupported("operator in argument position", 2);
        assert_eq!(
            err.to_string(),
            "unsupported segment at line 2: operator in argument position"
        );
    }
}
