//! Expression segment model
//!
//! An [`Expression`] is a short list of [`ExpressionSegment`]s. The parser
//! guarantees one of three shapes:
//!
//! ```text
//! [value]                     single segment
//! [operator, value]           unary (negation or NOT)
//! [value, operator, value]    binary
//! ```
//!
//! Deeper nesting is expressed with [`BracketedSegment`]s, so operator
//! precedence never has to be re-derived downstream. The only exception is a
//! flattened concatenation chain (`a & b & c & ...`), which is produced by the
//! translator itself and never by the parser.

use serde::{Deserialize, Serialize};

use crate::error::{SyntaxError, SyntaxResult};
use crate::token::{
    DateLiteralToken, NameToken, NumericValueToken, Operator, OperatorToken, StringToken,
};

/// Whether an argument-less call was written with empty brackets
///
/// `a` and `a()` behave differently at run time when `a` is an array or a
/// class instance, so the distinction must survive parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZeroArgumentBrackets {
    #[default]
    Absent,
    Present,
}

/// Call segment: `a`, `a.b`, `a(1, 2)`, `a.b()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSegment {
    /// Member access chain; empty only for the non-first links of a call set
    pub member_access_tokens: Vec<NameToken>,
    /// Argument expressions
    pub arguments: Vec<Expression>,
    /// Only meaningful when `arguments` is empty
    pub zero_argument_brackets: ZeroArgumentBrackets,
    /// `.Name` inside a WITH block (the target is the WITH object)
    #[serde(default)]
    pub with_relative: bool,
}

impl CallSegment {
    /// Create a call segment; at least one member access token is required and
    /// every token after the first must be a plain name.
    pub fn new(
        member_access_tokens: Vec<NameToken>,
        arguments: Vec<Expression>,
        zero_argument_brackets: ZeroArgumentBrackets,
    ) -> SyntaxResult<Self> {
        let Some(first) = member_access_tokens.first() else {
            let line_index = arguments.first().map(Expression::line_index).unwrap_or(0);
            return Err(SyntaxError::MissingMemberAccessToken { line_index });
        };
        if let Some(bad) = member_access_tokens.iter().skip(1).find(|t| !t.is_plain()) {
            return Err(SyntaxError::InvalidMemberAccessToken {
                content: bad.content.clone(),
                line_index: first.line_index,
            });
        }
        Ok(Self::link(
            member_access_tokens,
            arguments,
            zero_argument_brackets,
        ))
    }

    /// Create a call set link (member access tokens may be empty: `a(0)(1)`)
    pub fn link(
        member_access_tokens: Vec<NameToken>,
        arguments: Vec<Expression>,
        zero_argument_brackets: ZeroArgumentBrackets,
    ) -> Self {
        let zero_argument_brackets = if arguments.is_empty() {
            zero_argument_brackets
        } else {
            ZeroArgumentBrackets::Absent
        };
        Self {
            member_access_tokens,
            arguments,
            zero_argument_brackets,
            with_relative: false,
        }
    }

    /// Mark as a WITH-relative access (`.Name`)
    pub fn with_relative(mut self) -> Self {
        self.with_relative = true;
        self
    }

    /// Source line of the call
    pub fn line_index(&self) -> usize {
        self.member_access_tokens
            .first()
            .map(|t| t.line_index)
            .or_else(|| self.arguments.first().map(Expression::line_index))
            .unwrap_or(0)
    }

    /// Check if empty brackets were written and there are no arguments
    pub fn has_zero_argument_brackets(&self) -> bool {
        self.arguments.is_empty() && self.zero_argument_brackets == ZeroArgumentBrackets::Present
    }

    /// A single name with no member access, no arguments and no brackets
    pub fn is_bare_name(&self) -> bool {
        !self.with_relative
            && self.member_access_tokens.len() == 1
            && self.arguments.is_empty()
            && self.zero_argument_brackets == ZeroArgumentBrackets::Absent
    }

    /// The first member access token, if any
    pub fn first_token(&self) -> Option<&NameToken> {
        self.member_access_tokens.first()
    }
}

/// Chained calls: `a.b(0).c(1)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSetSegment {
    pub calls: Vec<CallSegment>,
}

impl CallSetSegment {
    /// Create a call set; requires at least two links and a leading member
    /// access token on the first link.
    pub fn new(calls: Vec<CallSegment>) -> SyntaxResult<Self> {
        let line_index = calls.first().map(CallSegment::line_index).unwrap_or(0);
        if calls.len() < 2 {
            return Err(SyntaxError::InvalidCallSet {
                count: calls.len(),
                line_index,
            });
        }
        if calls[0].member_access_tokens.is_empty() {
            return Err(SyntaxError::MissingMemberAccessToken { line_index });
        }
        for call in &calls[1..] {
            if let Some(bad) = call.member_access_tokens.iter().find(|t| !t.is_plain()) {
                return Err(SyntaxError::InvalidMemberAccessToken {
                    content: bad.content.clone(),
                    line_index,
                });
            }
        }
        Ok(Self { calls })
    }

    pub fn line_index(&self) -> usize {
        self.calls.first().map(CallSegment::line_index).unwrap_or(0)
    }
}

/// Bracketed sub-expression; forces by-value evaluation of its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketedSegment {
    pub expression: Expression,
}

impl BracketedSegment {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    /// Strip redundant nesting: `((x))` yields the expression `x`
    pub fn innermost(&self) -> &Expression {
        let mut expression = &self.expression;
        while let [ExpressionSegment::Bracketed(inner)] = expression.segments.as_slice() {
            expression = &inner.expression;
        }
        expression
    }
}

/// `New ClassName`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInstanceSegment {
    pub class_name: NameToken,
}

/// Error kinds the parser may defer to run time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferredError {
    TypeMismatch,
    ObjectRequired,
    ObjectVariableNotSet,
    IllegalAssignment,
    InvalidProcedureCallOrArgument,
    SubscriptOutOfRange,
    Overflow,
    ClassNotDefined,
}

impl DeferredError {
    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            DeferredError::TypeMismatch => "TypeMismatch",
            DeferredError::ObjectRequired => "ObjectRequired",
            DeferredError::ObjectVariableNotSet => "ObjectVariableNotSet",
            DeferredError::IllegalAssignment => "IllegalAssignment",
            DeferredError::InvalidProcedureCallOrArgument => "InvalidProcedureCallOrArgument",
            DeferredError::SubscriptOutOfRange => "SubscriptOutOfRange",
            DeferredError::Overflow => "Overflow",
            DeferredError::ClassNotDefined => "ClassNotDefined",
        }
    }
}

/// Marker for source that is legal but guaranteed to fail when executed
/// (calling a numeric literal as a function, for example)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeErrorSegment {
    /// The source text that triggered the error
    pub rendered_content: String,
    pub error: DeferredError,
    pub message: String,
    pub line_index: usize,
}

impl RuntimeErrorSegment {
    pub fn new(
        rendered_content: impl Into<String>,
        error: DeferredError,
        message: impl Into<String>,
        line_index: usize,
    ) -> Self {
        Self {
            rendered_content: rendered_content.into(),
            error,
            message: message.into(),
            line_index,
        }
    }
}

/// One segment of an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionSegment {
    Numeric(NumericValueToken),
    Str(StringToken),
    Date(DateLiteralToken),
    BuiltInValue(NameToken),
    Operation(OperatorToken),
    Call(CallSegment),
    CallSet(CallSetSegment),
    Bracketed(BracketedSegment),
    NewInstance(NewInstanceSegment),
    RuntimeError(RuntimeErrorSegment),
}

impl ExpressionSegment {
    /// Source line of the segment
    pub fn line_index(&self) -> usize {
        match self {
            ExpressionSegment::Numeric(t) => t.line_index,
            ExpressionSegment::Str(t) => t.line_index,
            ExpressionSegment::Date(t) => t.line_index,
            ExpressionSegment::BuiltInValue(t) => t.line_index,
            ExpressionSegment::Operation(t) => t.line_index,
            ExpressionSegment::Call(c) => c.line_index(),
            ExpressionSegment::CallSet(c) => c.line_index(),
            ExpressionSegment::Bracketed(b) => b.expression.line_index(),
            ExpressionSegment::NewInstance(n) => n.class_name.line_index,
            ExpressionSegment::RuntimeError(r) => r.line_index,
        }
    }

    /// Get the operator if this is an operation segment
    pub fn operator(&self) -> Option<Operator> {
        match self {
            ExpressionSegment::Operation(t) => Some(t.operator),
            _ => None,
        }
    }

    /// Check if this is an operation segment
    pub fn is_operation(&self) -> bool {
        matches!(self, ExpressionSegment::Operation(_))
    }

    /// Numeric, string, date or built-in value literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExpressionSegment::Numeric(_)
                | ExpressionSegment::Str(_)
                | ExpressionSegment::Date(_)
                | ExpressionSegment::BuiltInValue(_)
        )
    }
}

/// The three shapes a (non-flattened) expression may take
#[derive(Debug, Clone, Copy)]
pub enum ExpressionShape<'a> {
    Single(&'a ExpressionSegment),
    Unary {
        operator: &'a OperatorToken,
        operand: &'a ExpressionSegment,
    },
    Binary {
        left: &'a ExpressionSegment,
        operator: &'a OperatorToken,
        right: &'a ExpressionSegment,
    },
}

/// An expression: one to three segments (see module docs)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expression {
    pub segments: Vec<ExpressionSegment>,
}

impl Expression {
    pub fn new(segments: Vec<ExpressionSegment>) -> Self {
        Self { segments }
    }

    /// Create a single-segment expression
    pub fn single(segment: ExpressionSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    /// Source line of the first segment
    pub fn line_index(&self) -> usize {
        self.segments
            .first()
            .map(ExpressionSegment::line_index)
            .unwrap_or(0)
    }

    /// The only segment, if there is exactly one
    pub fn single_segment(&self) -> Option<&ExpressionSegment> {
        match self.segments.as_slice() {
            [segment] => Some(segment),
            _ => None,
        }
    }

    /// Classify the expression, enforcing the nesting invariant
    pub fn shape(&self) -> SyntaxResult<ExpressionShape<'_>> {
        let line_index = self.line_index();
        match self.segments.as_slice() {
            [] => Err(SyntaxError::EmptyExpression { line_index }),
            [ExpressionSegment::Operation(_)] => Err(SyntaxError::invalid_shape(
                "an operator may not stand alone",
                line_index,
            )),
            [segment] => Ok(ExpressionShape::Single(segment)),
            [ExpressionSegment::Operation(operator), operand] => {
                if operand.is_operation() {
                    return Err(SyntaxError::invalid_shape(
                        "unary operand may not be an operator",
                        line_index,
                    ));
                }
                if !operator.operator.can_be_unary() {
                    return Err(SyntaxError::InvalidUnaryOperator {
                        operator: operator.operator.as_str(),
                        line_index,
                    });
                }
                Ok(ExpressionShape::Unary { operator, operand })
            }
            [_, _] => Err(SyntaxError::invalid_shape(
                "two-segment expression must start with an operator",
                line_index,
            )),
            [left, ExpressionSegment::Operation(operator), right] => {
                if left.is_operation() || right.is_operation() {
                    return Err(SyntaxError::invalid_shape(
                        "binary operands may not be operators",
                        line_index,
                    ));
                }
                if !operator.operator.can_be_binary() {
                    return Err(SyntaxError::invalid_shape(
                        format!("'{}' is not a binary operator", operator.operator.as_str()),
                        line_index,
                    ));
                }
                Ok(ExpressionShape::Binary {
                    left,
                    operator,
                    right,
                })
            }
            [_, _, _] => Err(SyntaxError::invalid_shape(
                "segment 1 of a three-segment expression must be an operator",
                line_index,
            )),
            _ => Err(SyntaxError::invalid_shape(
                format!("{} segments exceeds the limit of three", self.segments.len()),
                line_index,
            )),
        }
    }

    /// Check for a flattened concatenation chain: `v & v & v ...` with at
    /// least three operands and no other operators.
    pub fn is_flattened_concatenation(&self) -> bool {
        self.segments.len() > 3
            && self.segments.len() % 2 == 1
            && self.segments.iter().enumerate().all(|(i, s)| {
                if i % 2 == 0 {
                    !s.is_operation()
                } else {
                    s.operator() == Some(Operator::Concatenate)
                }
            })
    }
}
