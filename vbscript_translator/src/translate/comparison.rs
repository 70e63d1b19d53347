//! Literal-driven coercion for comparisons
//!
//! VBScript compares a variable against a literal as if the variable had the
//! literal's type: `x > 0` converts `x` to a number (and fails on `"aa"`),
//! `x = "1"` compares strings. A non-negative numeric literal beats a date
//! literal, which beats a string literal.

use vbscript_translator_syntax::ExpressionSegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum HardLiteral {
    Str,
    Date,
    Numeric,
}

impl HardLiteral {
    fn of(segment: &ExpressionSegment) -> Option<Self> {
        match segment {
            ExpressionSegment::Numeric(token) if token.value >= 0.0 => Some(HardLiteral::Numeric),
            ExpressionSegment::Date(_) => Some(HardLiteral::Date),
            ExpressionSegment::Str(_) => Some(HardLiteral::Str),
            _ => None,
        }
    }

    /// Provider method converting to this literal's type
    fn coercion(self) -> &'static str {
        match self {
            HardLiteral::Numeric => "num",
            HardLiteral::Date => "date",
            HardLiteral::Str => "str",
        }
    }
}

/// Coercions to apply to the left and right operands of a comparison
pub(super) fn comparison_coercions(
    left: &ExpressionSegment,
    right: &ExpressionSegment,
) -> (Option<&'static str>, Option<&'static str>) {
    let left_kind = HardLiteral::of(left);
    let right_kind = HardLiteral::of(right);
    let Some(strongest) = left_kind.max(right_kind) else {
        return (None, None);
    };
    if left_kind == right_kind {
        return (None, None);
    }
    let coerce = |kind: Option<HardLiteral>| (kind != Some(strongest)).then(|| strongest.coercion());
    (coerce(left_kind), coerce(right_kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbscript_translator_syntax::testing::*;
    use vbscript_translator_syntax::Operator;

    fn segment(expression: vbscript_translator_syntax::Expression) -> ExpressionSegment {
        expression.segments.into_iter().next().unwrap()
    }

    #[test]
    fn test_numeric_literal_forces_num() {
        assert_eq!(
            comparison_coercions(&segment(string("aa")), &segment(num(0.0))),
            (Some("num"), None)
        );
        assert_eq!(
            comparison_coercions(&segment(num(0.0)), &segment(var("x"))),
            (None, Some("num"))
        );
    }

    #[test]
    fn test_date_beats_string() {
        assert_eq!(
            comparison_coercions(&segment(string("x")), &segment(date("2001-01-01"))),
            (Some("date"), None)
        );
    }

    #[test]
    fn test_string_literal_forces_str() {
        assert_eq!(
            comparison_coercions(&segment(var("x")), &segment(string("1"))),
            (Some("str"), None)
        );
    }

    #[test]
    fn test_same_kind_or_no_literal_is_uncoerced() {
        assert_eq!(
            comparison_coercions(&segment(num(1.0)), &segment(num(2.0))),
            (None, None)
        );
        assert_eq!(
            comparison_coercions(&segment(var("x")), &segment(var("y"))),
            (None, None)
        );
    }

    #[test]
    fn test_negative_and_negated_literals_do_not_count() {
        assert_eq!(
            comparison_coercions(&segment(var("x")), &segment(num(-1.0))),
            (None, None)
        );
        let negated = segment(bracketed(unary(Operator::Subtract, num(1.0))));
        assert_eq!(comparison_coercions(&segment(var("x")), &negated), (None, None));
    }
}
