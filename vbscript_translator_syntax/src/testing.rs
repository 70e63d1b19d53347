//! Builders for segment trees, for tests in this and dependent crates.
//!
//! Every builder places tokens on line 0. Binary and unary builders wrap
//! multi-segment operands in brackets, which is how the parser encodes
//! precedence.

use crate::segment::{
    BracketedSegment, CallSegment, CallSetSegment, DeferredError, Expression, ExpressionSegment,
    NewInstanceSegment, RuntimeErrorSegment, ZeroArgumentBrackets,
};
use crate::token::{
    DateLiteralToken, NameToken, NumericValueToken, Operator, OperatorToken, StringToken,
};

/// Plain name token
pub fn name(content: &str) -> NameToken {
    NameToken::new(content, 0)
}

/// Operation segment
pub fn op(operator: Operator) -> ExpressionSegment {
    ExpressionSegment::Operation(OperatorToken::new(operator, 0))
}

/// Bare variable reference: `a`
pub fn var(content: &str) -> Expression {
    call(&[content], vec![])
}

/// Call with member access chain and arguments: `a.b(1, 2)`
pub fn call(tokens: &[&str], arguments: Vec<Expression>) -> Expression {
    Expression::single(ExpressionSegment::Call(call_segment(tokens, arguments)))
}

/// Call segment with member access chain and arguments
pub fn call_segment(tokens: &[&str], arguments: Vec<Expression>) -> CallSegment {
    CallSegment::link(
        tokens.iter().map(|t| name(t)).collect(),
        arguments,
        ZeroArgumentBrackets::Absent,
    )
}

/// Argument-less call written with brackets: `a()`
pub fn call_with_brackets(tokens: &[&str]) -> Expression {
    Expression::single(ExpressionSegment::Call(CallSegment::link(
        tokens.iter().map(|t| name(t)).collect(),
        vec![],
        ZeroArgumentBrackets::Present,
    )))
}

/// WITH-relative access: `.Name`
pub fn with_member(tokens: &[&str], arguments: Vec<Expression>) -> Expression {
    Expression::single(ExpressionSegment::Call(
        call_segment(tokens, arguments).with_relative(),
    ))
}

/// Built-in function call: `LEN(x)`
pub fn built_in_function(content: &str, arguments: Vec<Expression>) -> Expression {
    Expression::single(ExpressionSegment::Call(CallSegment::link(
        vec![NameToken::built_in_function(content, 0)],
        arguments,
        ZeroArgumentBrackets::Absent,
    )))
}

/// Call on a built-in value: `Err.Raise 5`
pub fn built_in_value_call(tokens: &[&str], arguments: Vec<Expression>) -> Expression {
    let mut member_access_tokens = vec![NameToken::built_in_value(tokens[0], 0)];
    member_access_tokens.extend(tokens[1..].iter().map(|t| name(t)));
    Expression::single(ExpressionSegment::Call(CallSegment::link(
        member_access_tokens,
        arguments,
        ZeroArgumentBrackets::Absent,
    )))
}

/// Built-in value literal: `vbCrLf`
pub fn built_in_value(content: &str) -> Expression {
    Expression::single(ExpressionSegment::BuiltInValue(NameToken::built_in_value(
        content, 0,
    )))
}

/// Numeric literal
pub fn num(value: f64) -> Expression {
    Expression::single(ExpressionSegment::Numeric(NumericValueToken::from_value(
        value, 0,
    )))
}

/// String literal
pub fn string(content: &str) -> Expression {
    Expression::single(ExpressionSegment::Str(StringToken::new(content, 0)))
}

/// Date literal
pub fn date(content: &str) -> Expression {
    Expression::single(ExpressionSegment::Date(DateLiteralToken::new(content, 0)))
}

/// Wrap an expression in brackets
pub fn bracketed(expression: Expression) -> Expression {
    Expression::single(ExpressionSegment::Bracketed(BracketedSegment::new(
        expression,
    )))
}

/// `New ClassName`
pub fn new_instance(class_name: &str) -> Expression {
    Expression::single(ExpressionSegment::NewInstance(NewInstanceSegment {
        class_name: name(class_name),
    }))
}

/// Deferred runtime error marker
pub fn runtime_error(error: DeferredError, message: &str) -> Expression {
    Expression::single(ExpressionSegment::RuntimeError(RuntimeErrorSegment::new(
        message, error, message, 0,
    )))
}

/// Chained calls: `a.b(0).c(1)`
pub fn call_set(links: Vec<CallSegment>) -> Expression {
    match CallSetSegment::new(links) {
        Ok(set) => Expression::single(ExpressionSegment::CallSet(set)),
        Err(e) => panic!("invalid call set in test: {}", e),
    }
}

/// `left <op> right`
pub fn binary(left: Expression, operator: Operator, right: Expression) -> Expression {
    Expression::new(vec![operand(left), op(operator), operand(right)])
}

/// `<op> operand`
pub fn unary(operator: Operator, operand_expression: Expression) -> Expression {
    Expression::new(vec![op(operator), operand(operand_expression)])
}

fn operand(expression: Expression) -> ExpressionSegment {
    let Expression { mut segments } = expression;
    if segments.len() == 1 {
        segments.remove(0)
    } else {
        ExpressionSegment::Bracketed(BracketedSegment::new(Expression::new(segments)))
    }
}
