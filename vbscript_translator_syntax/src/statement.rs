//! Statements handed to the translator
//!
//! Block statements (IF, FOR, WITH, ...) are recognised upstream; what reaches
//! the expression translator are the two leaf statement forms below.

use serde::{Deserialize, Serialize};

use crate::segment::Expression;

/// An expression evaluated for its side effects: `F a, b`, `Call F(a)`, `o.Run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub expression: Expression,
}

impl Statement {
    pub fn new(expression: Expression) -> Self {
        Self { expression }
    }

    pub fn line_index(&self) -> usize {
        self.expression.line_index()
    }
}

/// LET (implicit) or SET assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueSettingKind {
    /// `a = b` (value assignment)
    Let,
    /// `Set a = b` (object reference assignment)
    Set,
}

/// `target = value` or `Set target = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSettingStatement {
    pub target: Expression,
    pub value: Expression,
    pub kind: ValueSettingKind,
}

impl ValueSettingStatement {
    pub fn new(target: Expression, value: Expression, kind: ValueSettingKind) -> Self {
        Self {
            target,
            value,
            kind,
        }
    }

    pub fn line_index(&self) -> usize {
        self.target.line_index()
    }
}
