//! Tokens referenced by the expression segment model
//!
//! The lexer lives upstream; these are the already-classified tokens it hands
//! over. Every token remembers the (zero-based) source line it came from.

use serde::{Deserialize, Serialize};

/// Classification of a name token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameKind {
    /// User-defined variable, function, property, class or constant name
    Plain,
    /// Built-in function such as `LEN` or `UCASE`
    BuiltInFunction,
    /// Built-in value such as `vbCrLf`, `Nothing` or `Err`
    BuiltInValue,
}

/// A name (identifier) token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameToken {
    /// Source text, case preserved
    pub content: String,
    /// Classification
    pub kind: NameKind,
    /// Source line
    pub line_index: usize,
}

impl NameToken {
    /// Create a plain name token
    pub fn new(content: impl Into<String>, line_index: usize) -> Self {
        Self {
            content: content.into(),
            kind: NameKind::Plain,
            line_index,
        }
    }

    /// Create a built-in function token
    pub fn built_in_function(content: impl Into<String>, line_index: usize) -> Self {
        Self {
            content: content.into(),
            kind: NameKind::BuiltInFunction,
            line_index,
        }
    }

    /// Create a built-in value token
    pub fn built_in_value(content: impl Into<String>, line_index: usize) -> Self {
        Self {
            content: content.into(),
            kind: NameKind::BuiltInValue,
            line_index,
        }
    }

    /// Check if this is a plain name
    pub fn is_plain(&self) -> bool {
        self.kind == NameKind::Plain
    }

    /// VBScript names are case-insensitive; this is the comparison key.
    pub fn key(&self) -> String {
        self.content.to_ascii_lowercase()
    }

    /// Case-insensitive name comparison
    pub fn matches(&self, name: &str) -> bool {
        self.content.eq_ignore_ascii_case(name)
    }
}

/// VBScript operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    /// Binary subtraction, or negation in unary position
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Power,
    Modulo,
    Concatenate,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Is,
    Not,
    And,
    Or,
    Xor,
    Eqv,
    Imp,
}

impl Operator {
    /// Recognise an operator from its source text (case-insensitive)
    pub fn from_source(text: &str) -> Option<Self> {
        let op = match text.to_ascii_uppercase().as_str() {
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "\\" => Operator::IntegerDivide,
            "^" => Operator::Power,
            "MOD" => Operator::Modulo,
            "&" => Operator::Concatenate,
            "=" => Operator::Equal,
            "<>" => Operator::NotEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanOrEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "IS" => Operator::Is,
            "NOT" => Operator::Not,
            "AND" => Operator::And,
            "OR" => Operator::Or,
            "XOR" => Operator::Xor,
            "EQV" => Operator::Eqv,
            "IMP" => Operator::Imp,
            _ => return None,
        };
        Some(op)
    }

    /// Get the VBScript operator text
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::IntegerDivide => "\\",
            Operator::Power => "^",
            Operator::Modulo => "MOD",
            Operator::Concatenate => "&",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Is => "IS",
            Operator::Not => "NOT",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
            Operator::Eqv => "EQV",
            Operator::Imp => "IMP",
        }
    }

    /// Value comparison operators (`IS` compares references and is excluded)
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqual
        )
    }

    /// Logical/bitwise operators
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            Operator::Not | Operator::And | Operator::Or | Operator::Xor | Operator::Eqv | Operator::Imp
        )
    }

    /// Only negation and NOT may appear at position 0
    pub fn can_be_unary(&self) -> bool {
        matches!(self, Operator::Subtract | Operator::Not)
    }

    /// NOT has no binary form
    pub fn can_be_binary(&self) -> bool {
        !matches!(self, Operator::Not)
    }
}

/// An operator token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorToken {
    pub operator: Operator,
    pub line_index: usize,
}

impl OperatorToken {
    pub fn new(operator: Operator, line_index: usize) -> Self {
        Self {
            operator,
            line_index,
        }
    }
}

/// A numeric literal
///
/// The parser may fold a leading minus sign into the value, so `value` can be
/// negative even though VBScript has no negative literal syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericValueToken {
    pub value: f64,
    /// Source text as written
    pub content: String,
    pub line_index: usize,
}

impl NumericValueToken {
    pub fn new(value: f64, content: impl Into<String>, line_index: usize) -> Self {
        Self {
            value,
            content: content.into(),
            line_index,
        }
    }

    /// Create a token from a value, rendering its content
    pub fn from_value(value: f64, line_index: usize) -> Self {
        Self::new(value, value.to_string(), line_index)
    }

    /// Check if the literal is an integer
    pub fn is_integral(&self) -> bool {
        self.value.is_finite() && self.value.fract() == 0.0
    }
}

/// A string literal (content unescaped, without surrounding quotes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringToken {
    pub content: String,
    pub line_index: usize,
}

impl StringToken {
    pub fn new(content: impl Into<String>, line_index: usize) -> Self {
        Self {
            content: content.into(),
            line_index,
        }
    }
}

/// A date literal (content between the `#` delimiters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateLiteralToken {
    pub content: String,
    pub line_index: usize,
}

impl DateLiteralToken {
    pub fn new(content: impl Into<String>, line_index: usize) -> Self {
        Self {
            content: content.into(),
            line_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_source() {
        assert_eq!(Operator::from_source("&"), Some(Operator::Concatenate));
        assert_eq!(Operator::from_source("mod"), Some(Operator::Modulo));
        assert_eq!(Operator::from_source("Not"), Some(Operator::Not));
        assert_eq!(Operator::from_source("<>"), Some(Operator::NotEqual));
        assert_eq!(Operator::from_source("=>"), None);
    }

    #[test]
    fn test_operator_round_trips_through_text() {
        for op in [Operator::IntegerDivide, Operator::Imp, Operator::GreaterThanOrEqual] {
            assert_eq!(Operator::from_source(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_operator_classification() {
        assert!(Operator::LessThan.is_comparison());
        assert!(!Operator::Is.is_comparison());
        assert!(Operator::Xor.is_logical());
        assert!(Operator::Subtract.can_be_unary());
        assert!(!Operator::Add.can_be_unary());
        assert!(!Operator::Not.can_be_binary());
    }

    #[test]
    fn test_name_token_matching_is_case_insensitive() {
        let token = NameToken::new("MyVar", 4);
        assert!(token.matches("myvar"));
        assert_eq!(token.key(), "myvar");
        assert!(token.is_plain());
        assert!(!NameToken::built_in_value("Err", 0).is_plain());
    }
}
