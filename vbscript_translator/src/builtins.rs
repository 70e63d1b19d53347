//! Built-in values
//!
//! Names the lexer classifies as built-in values (`True`, `Nothing`, `Err`,
//! `vbCrLf`, ...). Most become constant `Value`s in generated code; `Err` is
//! the runtime's error object.

/// Built-in value identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInValueId {
    True,
    False,
    Empty,
    Null,
    Nothing,
    Err,

    // String constants
    VbCr,
    VbLf,
    VbCrLf,
    VbNewLine,
    VbTab,
    VbNullString,
    VbNullChar,

    // Tristate / compare constants
    VbTrue,
    VbFalse,
    VbUseDefault,
    VbBinaryCompare,
    VbTextCompare,

    VbObjectError,

    // VarType results
    VbEmpty,
    VbNull,
    VbInteger,
    VbLong,
    VbSingle,
    VbDouble,
    VbCurrency,
    VbDate,
    VbString,
    VbObject,
    VbError,
    VbBoolean,
    VbVariant,
    VbByte,
    VbArray,
}

/// What a built-in value evaluates to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuiltInValueKind {
    Bool(bool),
    Empty,
    Null,
    Nothing,
    ErrObject,
    Str(&'static str),
    Integer(i16),
    Long(i32),
}

impl BuiltInValueId {
    /// Look up by VBScript name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let id = match name.to_ascii_lowercase().as_str() {
            "true" => Self::True,
            "false" => Self::False,
            "empty" => Self::Empty,
            "null" => Self::Null,
            "nothing" => Self::Nothing,
            "err" => Self::Err,
            "vbcr" => Self::VbCr,
            "vblf" => Self::VbLf,
            "vbcrlf" => Self::VbCrLf,
            "vbnewline" => Self::VbNewLine,
            "vbtab" => Self::VbTab,
            "vbnullstring" => Self::VbNullString,
            "vbnullchar" => Self::VbNullChar,
            "vbtrue" => Self::VbTrue,
            "vbfalse" => Self::VbFalse,
            "vbusedefault" => Self::VbUseDefault,
            "vbbinarycompare" => Self::VbBinaryCompare,
            "vbtextcompare" => Self::VbTextCompare,
            "vbobjecterror" => Self::VbObjectError,
            "vbempty" => Self::VbEmpty,
            "vbnull" => Self::VbNull,
            "vbinteger" => Self::VbInteger,
            "vblong" => Self::VbLong,
            "vbsingle" => Self::VbSingle,
            "vbdouble" => Self::VbDouble,
            "vbcurrency" => Self::VbCurrency,
            "vbdate" => Self::VbDate,
            "vbstring" => Self::VbString,
            "vbobject" => Self::VbObject,
            "vberror" => Self::VbError,
            "vbboolean" => Self::VbBoolean,
            "vbvariant" => Self::VbVariant,
            "vbbyte" => Self::VbByte,
            "vbarray" => Self::VbArray,
            _ => return None,
        };
        Some(id)
    }

    pub fn value(&self) -> BuiltInValueKind {
        use BuiltInValueKind as K;
        match self {
            Self::True => K::Bool(true),
            Self::False => K::Bool(false),
            Self::Empty => K::Empty,
            Self::Null => K::Null,
            Self::Nothing => K::Nothing,
            Self::Err => K::ErrObject,
            Self::VbCr => K::Str("\r"),
            Self::VbLf => K::Str("\n"),
            Self::VbCrLf | Self::VbNewLine => K::Str("\r\n"),
            Self::VbTab => K::Str("\t"),
            Self::VbNullString => K::Str(""),
            Self::VbNullChar => K::Str("\0"),
            Self::VbTrue => K::Integer(-1),
            Self::VbFalse => K::Integer(0),
            Self::VbUseDefault => K::Integer(-2),
            Self::VbBinaryCompare => K::Integer(0),
            Self::VbTextCompare => K::Integer(1),
            Self::VbObjectError => K::Long(-2147221504),
            Self::VbEmpty => K::Integer(0),
            Self::VbNull => K::Integer(1),
            Self::VbInteger => K::Integer(2),
            Self::VbLong => K::Integer(3),
            Self::VbSingle => K::Integer(4),
            Self::VbDouble => K::Integer(5),
            Self::VbCurrency => K::Integer(6),
            Self::VbDate => K::Integer(7),
            Self::VbString => K::Integer(8),
            Self::VbObject => K::Integer(9),
            Self::VbError => K::Integer(10),
            Self::VbBoolean => K::Integer(11),
            Self::VbVariant => K::Integer(12),
            Self::VbByte => K::Integer(17),
            Self::VbArray => K::Integer(8192),
        }
    }

    /// Evaluates to an object reference rather than a value
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Nothing | Self::Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(BuiltInValueId::from_name("vbCrLf"), Some(BuiltInValueId::VbCrLf));
        assert_eq!(BuiltInValueId::from_name("NOTHING"), Some(BuiltInValueId::Nothing));
        assert_eq!(BuiltInValueId::from_name("vbPurple"), None);
    }

    #[test]
    fn test_values() {
        assert_eq!(BuiltInValueId::VbNewLine.value(), BuiltInValueKind::Str("\r\n"));
        assert_eq!(BuiltInValueId::VbTrue.value(), BuiltInValueKind::Integer(-1));
        assert!(BuiltInValueId::Err.is_reference());
        assert!(!BuiltInValueId::Null.is_reference());
    }
}
