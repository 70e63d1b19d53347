//! Concatenation chain flattening
//!
//! The parser nests every binary operation, so `a & b & c & d` arrives as
//! `((a & b) & c) & d`. Concatenation is associative, which lets the chain be
//! emitted as one n-ary `concat` call instead of three nested ones.

use std::borrow::Cow;

use vbscript_translator_syntax::{Expression, ExpressionSegment, Operator, OperatorToken};

/// `v & v` with no other operator
fn is_concatenation_node(expression: &Expression) -> bool {
    matches!(
        expression.segments.as_slice(),
        [left, ExpressionSegment::Operation(op), right]
            if op.operator == Operator::Concatenate && !left.is_operation() && !right.is_operation()
    )
}

/// Collect the operands of a concatenation tree in source order
fn collect_operands<'a>(segment: &'a ExpressionSegment, operands: &mut Vec<&'a ExpressionSegment>) {
    if let ExpressionSegment::Bracketed(bracketed) = segment {
        let inner = &bracketed.expression;
        if is_concatenation_node(inner) || inner.is_flattened_concatenation() {
            for operand in inner.segments.iter().step_by(2) {
                collect_operands(operand, operands);
            }
            return;
        }
    }
    operands.push(segment);
}

/// Flatten nested binary concatenations into `v0 & v1 & ... & vn`
///
/// Anything that is not a concatenation node, or whose operands are not
/// themselves concatenations, comes back borrowed and unchanged. The result
/// is idempotent: flattening a flattened chain is a no-op.
pub fn flatten_concatenations(expression: &Expression) -> Cow<'_, Expression> {
    if !is_concatenation_node(expression) {
        return Cow::Borrowed(expression);
    }
    let [left, ExpressionSegment::Operation(operator), right] = expression.segments.as_slice()
    else {
        return Cow::Borrowed(expression);
    };

    let mut operands = Vec::new();
    collect_operands(left, &mut operands);
    collect_operands(right, &mut operands);
    if operands.len() <= 2 {
        return Cow::Borrowed(expression);
    }

    let separator = ExpressionSegment::Operation(OperatorToken::new(
        Operator::Concatenate,
        operator.line_index,
    ));
    let mut segments = Vec::with_capacity(operands.len() * 2 - 1);
    for (i, operand) in operands.into_iter().enumerate() {
        if i > 0 {
            segments.push(separator.clone());
        }
        segments.push(operand.clone());
    }
    Cow::Owned(Expression::new(segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vbscript_translator_syntax::testing::*;

    fn concat(left: Expression, right: Expression) -> Expression {
        binary(left, Operator::Concatenate, right)
    }

    #[test]
    fn test_left_and_right_nesting_flatten_identically() {
        let left_nested = concat(concat(var("a"), var("b")), var("c"));
        let right_nested = concat(var("a"), concat(var("b"), var("c")));

        let left_flat = flatten_concatenations(&left_nested);
        let right_flat = flatten_concatenations(&right_nested);
        assert_eq!(left_flat, right_flat);
        assert!(left_flat.is_flattened_concatenation());
        assert_eq!(left_flat.segments.len(), 5);
    }

    #[test]
    fn test_flattening_is_idempotent() {
        let expr = concat(concat(concat(var("a"), var("b")), var("c")), var("d"));
        let once = flatten_concatenations(&expr).into_owned();
        let twice = flatten_concatenations(&once);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(*twice, once);
        assert_eq!(once.segments.len(), 7);
    }

    #[test]
    fn test_two_operands_are_left_alone() {
        let expr = concat(var("a"), var("b"));
        assert!(matches!(flatten_concatenations(&expr), Cow::Borrowed(_)));
    }

    #[test]
    fn test_other_operators_stop_the_descent() {
        // a & (b + c) & d: the addition stays bracketed
        let expr = concat(concat(var("a"), binary(var("b"), Operator::Add, var("c"))), var("d"));
        let flat = flatten_concatenations(&expr);
        assert_eq!(flat.segments.len(), 5);
        assert!(matches!(flat.segments[2], ExpressionSegment::Bracketed(_)));
    }

    #[test]
    fn test_non_concatenation_is_unchanged() {
        let expr = binary(var("a"), Operator::Add, var("b"));
        assert!(matches!(flatten_concatenations(&expr), Cow::Borrowed(_)));
    }
}
