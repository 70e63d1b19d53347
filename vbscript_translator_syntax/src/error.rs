//! Segment model validation errors
//!
//! These describe shapes the upstream parser must never produce. They are
//! defects, not conditions a VBScript program can trigger.

use thiserror::Error;

/// Segment model error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// Expression with no segments
    #[error("empty expression at line {line_index}")]
    EmptyExpression { line_index: usize },

    /// Expression whose segment count/operator placement breaks the nesting invariant
    #[error("invalid expression shape at line {line_index}: {message}")]
    InvalidExpressionShape { message: String, line_index: usize },

    /// Call segment without any member access tokens
    #[error("call segment requires at least one member access token (line {line_index})")]
    MissingMemberAccessToken { line_index: usize },

    /// Member access token after the first that is not a plain name
    #[error("member access token '{content}' must be a plain name (line {line_index})")]
    InvalidMemberAccessToken { content: String, line_index: usize },

    /// Call set with fewer than two links
    #[error("call set requires at least two calls, got {count} (line {line_index})")]
    InvalidCallSet { count: usize, line_index: usize },

    /// Operator token that cannot appear in unary position
    #[error("operator '{operator}' is not a valid unary operator (line {line_index})")]
    InvalidUnaryOperator {
        operator: &'static str,
        line_index: usize,
    },
}

impl SyntaxError {
    /// Create an invalid shape error
    pub fn invalid_shape(message: impl Into<String>, line_index: usize) -> Self {
        SyntaxError::InvalidExpressionShape {
            message: message.into(),
            line_index,
        }
    }

    /// Get the line the error refers to
    pub fn line_index(&self) -> usize {
        match self {
            SyntaxError::EmptyExpression { line_index }
            | SyntaxError::InvalidExpressionShape { line_index, .. }
            | SyntaxError::MissingMemberAccessToken { line_index }
            | SyntaxError::InvalidMemberAccessToken { line_index, .. }
            | SyntaxError::InvalidCallSet { line_index, .. }
            | SyntaxError::InvalidUnaryOperator { line_index, .. } => *line_index,
        }
    }
}

/// Result type for segment model operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyntaxError::invalid_shape("segment 1 must be an operator", 3);
        assert_eq!(
            err.to_string(),
            "invalid expression shape at line 3: segment 1 must be an operator"
        );
        assert_eq!(err.line_index(), 3);
    }

    #[test]
    fn test_unary_operator_error() {
        let err = SyntaxError::InvalidUnaryOperator {
            operator: "*",
            line_index: 0,
        };
        assert!(err.to_string().contains("'*'"));
    }
}
