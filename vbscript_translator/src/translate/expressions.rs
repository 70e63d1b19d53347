use vbscript_translator_syntax::{
    DateLiteralToken, DeferredError, Expression, ExpressionSegment, ExpressionShape,
    NewInstanceSegment, NameToken, NumericValueToken, Operator, OperatorToken,
};

use super::comparison::comparison_coercions;
use super::concat::flatten_concatenations;
use super::{ExpressionReturnType, NameSet, StatementTranslator, TranslatedExpression};
use crate::builtins::{BuiltInValueId, BuiltInValueKind};
use crate::error::{TranslationError, TranslationResult};
use crate::names::{rust_string_literal, rust_type_ident};
use crate::scope::{DeclaredKind, ScopeAccessInformation};

/// Provider method implementing an operator
fn operator_method(operator: Operator) -> &'static str {
    match operator {
        Operator::Add => "add",
        Operator::Subtract => "subt",
        Operator::Multiply => "mult",
        Operator::Divide => "div",
        Operator::IntegerDivide => "intdiv",
        Operator::Power => "pow",
        Operator::Modulo => "modulo",
        Operator::Concatenate => "concat",
        Operator::Equal => "eq",
        Operator::NotEqual => "noteq",
        Operator::LessThan => "lt",
        Operator::LessThanOrEqual => "lte",
        Operator::GreaterThan => "gt",
        Operator::GreaterThanOrEqual => "gte",
        Operator::Is => "is",
        Operator::Not => "not",
        Operator::And => "and",
        Operator::Or => "or",
        Operator::Xor => "xor",
        Operator::Eqv => "eqv",
        Operator::Imp => "imp",
    }
}

/// `VbsError` constructor for a deferred error
pub(super) fn error_constructor(error: DeferredError) -> &'static str {
    match error {
        DeferredError::TypeMismatch => "type_mismatch",
        DeferredError::ObjectRequired => "object_required",
        DeferredError::ObjectVariableNotSet => "object_variable_not_set",
        DeferredError::IllegalAssignment => "illegal_assignment",
        DeferredError::InvalidProcedureCallOrArgument => "invalid_procedure_call",
        DeferredError::SubscriptOutOfRange => "subscript_out_of_range",
        DeferredError::Overflow => "overflow",
        DeferredError::ClassNotDefined => "class_not_defined",
    }
}

impl StatementTranslator {
    /// Translate an expression into Rust source of the required shape
    pub fn translate(
        &self,
        expression: &Expression,
        scope: &ScopeAccessInformation,
        required: ExpressionReturnType,
    ) -> TranslationResult<TranslatedExpression> {
        let line_index = expression.line_index();
        let flattened = flatten_concatenations(expression);

        let translated = if flattened.is_flattened_concatenation() {
            let operands: Vec<&ExpressionSegment> = flattened.segments.iter().step_by(2).collect();
            self.translate_concatenation(&operands, scope)?
        } else {
            match flattened.shape()? {
                ExpressionShape::Single(segment) => self.translate_segment(segment, scope)?,
                ExpressionShape::Unary { operator, operand } => {
                    self.translate_unary(operator, operand, scope)?
                }
                ExpressionShape::Binary {
                    left,
                    operator,
                    right,
                } => self.translate_binary(left, operator, right, scope)?,
            }
        };
        Ok(self.apply_return_type_guarantee(translated, required, scope, line_index))
    }

    pub(super) fn translate_segment(
        &self,
        segment: &ExpressionSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        match segment {
            ExpressionSegment::Numeric(token) => Ok(TranslatedExpression::constant(
                self.numeric_literal(token),
                ExpressionReturnType::Value,
            )),
            ExpressionSegment::Str(token) => Ok(TranslatedExpression::constant(
                self.string_literal(&token.content),
                ExpressionReturnType::Value,
            )),
            ExpressionSegment::Date(token) => Ok(TranslatedExpression::constant(
                self.date_literal(token),
                ExpressionReturnType::Value,
            )),
            ExpressionSegment::BuiltInValue(token) => self.translate_built_in_value(token),
            ExpressionSegment::Operation(token) => Err(TranslationError::unsupported(
                format!("operator '{}' in operand position", token.operator.as_str()),
                token.line_index,
            )),
            ExpressionSegment::Call(call) => self.translate_call(call, scope),
            ExpressionSegment::CallSet(set) => self.translate_call_set(set, scope),
            ExpressionSegment::Bracketed(bracketed) => {
                self.translate(bracketed.innermost(), scope, ExpressionReturnType::Value)
            }
            ExpressionSegment::NewInstance(new_instance) => {
                Ok(self.translate_new_instance(new_instance, scope))
            }
            ExpressionSegment::RuntimeError(marker) => Ok(TranslatedExpression::constant(
                self.raise_deferred_error(marker.error, &marker.message, marker.line_index),
                ExpressionReturnType::Value,
            )),
        }
    }

    fn translate_unary(
        &self,
        operator: &OperatorToken,
        operand: &ExpressionSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let method = match operator.operator {
            Operator::Subtract => "neg",
            Operator::Not => "not",
            other => {
                return Err(TranslationError::unsupported(
                    format!("'{}' is not a unary operator", other.as_str()),
                    operator.line_index,
                ))
            }
        };
        let operand = self.translate_segment(operand, scope)?;
        let content = format!("{}(&{})?", self.rt(method), operand.content);
        Ok(operand.with_content(content, ExpressionReturnType::Value))
    }

    fn translate_binary(
        &self,
        left: &ExpressionSegment,
        operator: &OperatorToken,
        right: &ExpressionSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        match operator.operator {
            Operator::Concatenate => self.translate_concatenation(&[left, right], scope),
            Operator::Is => {
                let l = self.translate_operand(left, scope, ExpressionReturnType::Reference)?;
                let r = self.translate_operand(right, scope, ExpressionReturnType::Reference)?;
                Ok(self.binary_call("is", l, r))
            }
            op if op.is_comparison() => {
                let (left_coercion, right_coercion) = comparison_coercions(left, right);
                let l = self.translate_coerced(left, left_coercion, scope)?;
                let r = self.translate_coerced(right, right_coercion, scope)?;
                Ok(self.binary_call(operator_method(op), l, r))
            }
            op => {
                let l = self.translate_segment(left, scope)?;
                let r = self.translate_segment(right, scope)?;
                Ok(self.binary_call(operator_method(op), l, r))
            }
        }
    }

    fn translate_operand(
        &self,
        segment: &ExpressionSegment,
        scope: &ScopeAccessInformation,
        required: ExpressionReturnType,
    ) -> TranslationResult<TranslatedExpression> {
        let translated = self.translate_segment(segment, scope)?;
        Ok(self.apply_return_type_guarantee(translated, required, scope, segment.line_index()))
    }

    /// Comparison operand, converted to the other side's literal type
    fn translate_coerced(
        &self,
        segment: &ExpressionSegment,
        coercion: Option<&'static str>,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let translated = self.translate_segment(segment, scope)?;
        match coercion {
            Some(method) => {
                let content = format!("{}(&{})?", self.rt(method), translated.content);
                Ok(translated.with_content(content, ExpressionReturnType::Value))
            }
            None => Ok(translated),
        }
    }

    fn binary_call(
        &self,
        method: &str,
        left: TranslatedExpression,
        right: TranslatedExpression,
    ) -> TranslatedExpression {
        let content = format!("{}(&{}, &{})?", self.rt(method), left.content, right.content);
        let mut variables_accessed = left.variables_accessed;
        Self::merge(&mut variables_accessed, right.variables_accessed);
        TranslatedExpression::new(content, ExpressionReturnType::Value, variables_accessed)
    }

    /// `_rt.concat(&[&a, &b, &c])?`
    fn translate_concatenation(
        &self,
        segments: &[&ExpressionSegment],
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let mut variables_accessed = NameSet::new();
        let mut operands = Vec::with_capacity(segments.len());
        for segment in segments {
            let operand = self.translate_segment(segment, scope)?;
            Self::merge(&mut variables_accessed, operand.variables_accessed);
            operands.push(format!("&{}", operand.content));
        }
        Ok(TranslatedExpression::new(
            format!("{}(&[{}])?", self.rt("concat"), operands.join(", ")),
            ExpressionReturnType::Value,
            variables_accessed,
        ))
    }

    // ========== Literals ==========

    /// Smallest of Integer, Long and Double that holds the value
    fn numeric_literal(&self, token: &NumericValueToken) -> String {
        let value = token.value;
        if token.is_integral() && value >= f64::from(i16::MIN) && value <= f64::from(i16::MAX) {
            format!("{}({})", self.path("Value::Integer"), value as i16)
        } else if token.is_integral() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX)
        {
            format!("{}({})", self.path("Value::Long"), value as i32)
        } else {
            format!("{}({:?})", self.path("Value::Double"), value)
        }
    }

    fn string_literal(&self, content: &str) -> String {
        format!("{}({})", self.path("Value::from"), rust_string_literal(content))
    }

    fn date_literal(&self, token: &DateLiteralToken) -> String {
        format!("{}(&{})?", self.rt("date"), self.string_literal(&token.content))
    }

    pub(super) fn translate_built_in_value(
        &self,
        token: &NameToken,
    ) -> TranslationResult<TranslatedExpression> {
        let Some(id) = BuiltInValueId::from_name(&token.content) else {
            return Err(TranslationError::unsupported(
                format!("unknown built-in value '{}'", token.content),
                token.line_index,
            ));
        };
        let value = |item: String| TranslatedExpression::constant(item, ExpressionReturnType::Value);
        let translated = match id.value() {
            BuiltInValueKind::Bool(b) => value(format!("{}({})", self.path("Value::Bool"), b)),
            BuiltInValueKind::Empty => value(self.path("Value::Empty")),
            BuiltInValueKind::Null => value(self.path("Value::Null")),
            BuiltInValueKind::Nothing => TranslatedExpression::constant(
                self.path("Value::Nothing"),
                ExpressionReturnType::Reference,
            ),
            BuiltInValueKind::ErrObject => TranslatedExpression::constant(
                format!("{}()", self.rt("err")),
                ExpressionReturnType::Reference,
            ),
            BuiltInValueKind::Str(s) => value(self.string_literal(s)),
            BuiltInValueKind::Integer(n) => value(format!("{}({})", self.path("Value::Integer"), n)),
            BuiltInValueKind::Long(n) => value(format!("{}({})", self.path("Value::Long"), n)),
        };
        Ok(translated)
    }

    // ========== Objects and deferred errors ==========

    fn translate_new_instance(
        &self,
        segment: &NewInstanceSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslatedExpression {
        let class_name = &segment.class_name;
        if scope.kind_of(class_name) != Some(DeclaredKind::Class) {
            return TranslatedExpression::constant(
                self.raise_deferred_error(
                    DeferredError::ClassNotDefined,
                    &format!("'{}'", class_name.content),
                    class_name.line_index,
                ),
                ExpressionReturnType::Reference,
            );
        }
        let content = format!(
            "{}({}::new({}, {}, {})?)",
            self.rt("new_instance"),
            rust_type_ident(&declared_name(class_name, scope)),
            self.config.provider,
            self.config.env,
            self.config.outer,
        );
        TranslatedExpression::constant(content, ExpressionReturnType::Reference)
    }

    /// `_rt.raise_error(vbs::VbsError::type_mismatch("..."))?`
    pub(super) fn raise_deferred_error(
        &self,
        error: DeferredError,
        message: &str,
        line_index: usize,
    ) -> String {
        tracing::debug!(
            error = error.as_str(),
            line_index,
            detail = message,
            "emitting deferred runtime error"
        );
        format!(
            "{}({}({}))?",
            self.rt("raise_error"),
            self.path(&format!("VbsError::{}", error_constructor(error))),
            rust_string_literal(message)
        )
    }
}

/// Class names keep the case they were declared with
fn declared_name(token: &NameToken, scope: &ScopeAccessInformation) -> String {
    scope
        .lookup(&token.content)
        .map(|declared| declared.name.clone())
        .unwrap_or_else(|| token.content.clone())
}
