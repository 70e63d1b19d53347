//! Assignment targets
//!
//! The left-hand side of `a = 1`, `o.Name = 1`, `F(0).Name = 1` or
//! `arr(1, 2) = 1` is broken into the object being written to, an optional
//! member name and the argument list. Plain variables become ordinary Rust
//! assignments; everything else goes through `_rt.set`.

use vbscript_translator_syntax::{
    CallSegment, CallSetSegment, DeferredError, Expression, ExpressionSegment, NameToken,
    ZeroArgumentBrackets,
};

use super::calls::TranslatedArguments;
use super::expressions::error_constructor;
use super::{ExpressionReturnType, NameSet, StatementTranslator, TranslatedExpression};
use crate::config::TranslatorConfig;
use crate::error::{TranslationError, TranslationResult};
use crate::names::rust_string_literal;
use crate::scope::{DeclaredKind, ScopeAccessInformation};

/// How a value is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentTarget {
    /// `place = value;`
    Simple { place: String },
    /// Property LET/SET assigning to its own name: evaluate, store nothing
    NoOp,
    /// Legal syntax that must fail when executed
    DeferredError {
        error: DeferredError,
        message: String,
    },
    /// `_rt.set(value, &context, &target, member, &mut arguments)?;`
    Set {
        context: String,
        target: String,
        member: Option<String>,
        arguments: String,
    },
}

/// An assignment target and the variables its translation reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignmentTarget {
    pub target: AssignmentTarget,
    pub variables_accessed: NameSet,
}

impl ResolvedAssignmentTarget {
    fn new(target: AssignmentTarget, variables_accessed: NameSet) -> Self {
        Self {
            target,
            variables_accessed,
        }
    }

    /// Statement storing `value` (already translated to the right shape)
    pub fn render(&self, config: &TranslatorConfig, value: &str) -> String {
        match &self.target {
            AssignmentTarget::Simple { place } => format!("{} = {};", place, value),
            AssignmentTarget::NoOp => format!("let _ = {};", value),
            AssignmentTarget::DeferredError { error, message } => format!(
                "let _ = {};\n{}.raise_error({}::VbsError::{}({}))?;",
                value,
                config.provider,
                config.runtime_crate,
                error_constructor(*error),
                rust_string_literal(message)
            ),
            AssignmentTarget::Set {
                context,
                target,
                member,
                arguments,
            } => {
                let member = match member {
                    Some(name) => format!("Some({})", rust_string_literal(name)),
                    None => "None".to_string(),
                };
                format!(
                    "{}.set({}, &{}, &{}, {}, &mut {})?;",
                    config.provider, value, context, target, member, arguments
                )
            }
        }
    }
}

impl StatementTranslator {
    /// Resolve the left-hand side of a value-setting statement
    pub fn resolve_assignment_target(
        &self,
        target: &Expression,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        match target.single_segment() {
            Some(ExpressionSegment::Call(call)) => self.resolve_call_target(call, scope),
            Some(ExpressionSegment::CallSet(set)) => self.resolve_call_set_target(set, scope),
            _ => Err(TranslationError::invalid_target(
                "the left-hand side must be a call or a call set",
                target.line_index(),
            )),
        }
    }

    fn resolve_call_target(
        &self,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        let line_index = call.line_index();
        let tokens = &call.member_access_tokens;
        let Some((last, leading)) = tokens.split_last() else {
            return Err(TranslationError::invalid_target(
                "assignment to an empty member chain",
                line_index,
            ));
        };

        if call.with_relative {
            let with_target = scope
                .with_target()
                .ok_or(TranslationError::MissingWithTarget { line_index })?;
            let target = if leading.is_empty() {
                TranslatedExpression::constant(with_target, ExpressionReturnType::Reference)
            } else {
                let link = CallSegment::link(leading.to_vec(), vec![], ZeroArgumentBrackets::Absent)
                    .with_relative();
                self.translate_call(&link, scope)?
            };
            return self.set_target(target, Some(last), call, scope);
        }

        if !leading.is_empty() {
            let link = CallSegment::link(leading.to_vec(), vec![], ZeroArgumentBrackets::Absent);
            let target = self.translate_call(&link, scope)?;
            return self.set_target(target, Some(last), call, scope);
        }

        self.resolve_single_name_target(call, last, scope)
    }

    fn resolve_single_name_target(
        &self,
        call: &CallSegment,
        token: &NameToken,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        let names = self.names();
        let kind = scope.kind_of(token);
        let not_settable = matches!(
            kind,
            Some(DeclaredKind::Constant | DeclaredKind::Function | DeclaredKind::Class)
        );
        let mut variables_accessed = NameSet::new();

        if !token.is_plain() {
            return Ok(self.deferred(DeferredError::IllegalAssignment, token, variables_accessed));
        }

        if call.arguments.is_empty() && !call.has_zero_argument_brackets() {
            if scope.is_property_setter_self_reference(token) {
                return Ok(ResolvedAssignmentTarget::new(AssignmentTarget::NoOp, variables_accessed));
            }
            if scope.is_return_value_reference(token) {
                let place = names.render(token, scope);
                return Ok(ResolvedAssignmentTarget::new(
                    AssignmentTarget::Simple { place },
                    variables_accessed,
                ));
            }
            if not_settable {
                return Ok(self.deferred(DeferredError::IllegalAssignment, token, variables_accessed));
            }
            if kind == Some(DeclaredKind::Property) {
                return self.relocated_set(token, call, scope);
            }
            variables_accessed.insert(token.key());
            let place = names.render(token, scope);
            return Ok(ResolvedAssignmentTarget::new(
                AssignmentTarget::Simple { place },
                variables_accessed,
            ));
        }

        if call.arguments.is_empty() {
            // `a() = 1`
            if kind == Some(DeclaredKind::Property) {
                return self.relocated_set(token, call, scope);
            }
            if not_settable {
                return Ok(self.deferred(DeferredError::IllegalAssignment, token, variables_accessed));
            }
            variables_accessed.insert(token.key());
            return Ok(self.deferred(DeferredError::TypeMismatch, token, variables_accessed));
        }

        if scope.is_routine(token) {
            return self.relocated_set(token, call, scope);
        }
        variables_accessed.insert(token.key());
        let target = TranslatedExpression::new(
            names.render(token, scope),
            ExpressionReturnType::NotSpecified,
            variables_accessed,
        );
        self.set_target(target, None, call, scope)
    }

    fn resolve_call_set_target(
        &self,
        set: &CallSetSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        let Some((last, rest)) = set.calls.split_last() else {
            return Err(TranslationError::invalid_target("empty call set", set.line_index()));
        };
        let mut chain = rest.to_vec();
        let member = match last.member_access_tokens.split_last() {
            None => None,
            Some((member, leading)) => {
                if !leading.is_empty() {
                    chain.push(CallSegment::link(
                        leading.to_vec(),
                        vec![],
                        ZeroArgumentBrackets::Absent,
                    ));
                }
                Some(member)
            }
        };

        let target = match chain.as_slice() {
            [single] => self.translate_call(single, scope)?,
            _ => self.translate_call_set(&CallSetSegment::new(chain)?, scope)?,
        };
        self.set_target(target, member, last, scope)
    }

    /// Known property or function written through its container
    fn relocated_set(
        &self,
        token: &NameToken,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        let container = self.names().container(token, scope);
        tracing::debug!(
            name = %token.content,
            container = %container,
            "relocating assignment to its container"
        );
        let target = TranslatedExpression::constant(container, ExpressionReturnType::Reference);
        self.set_target(target, Some(token), call, scope)
    }

    /// `_rt.set` against `target`, with `call`'s arguments
    fn set_target(
        &self,
        target: TranslatedExpression,
        member: Option<&NameToken>,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<ResolvedAssignmentTarget> {
        let arguments: TranslatedArguments = self.translate_by_value_arguments(call, scope)?;
        let rendered_arguments = self.render_argument_provider(&arguments);
        let mut variables_accessed = target.variables_accessed;
        Self::merge(&mut variables_accessed, arguments.variables_accessed);
        Ok(ResolvedAssignmentTarget::new(
            AssignmentTarget::Set {
                context: self.names().context(scope),
                target: target.content,
                member: member.map(|m| m.content.clone()),
                arguments: rendered_arguments,
            },
            variables_accessed,
        ))
    }

    fn deferred(
        &self,
        error: DeferredError,
        token: &NameToken,
        variables_accessed: NameSet,
    ) -> ResolvedAssignmentTarget {
        tracing::debug!(
            error = error.as_str(),
            name = %token.content,
            line_index = token.line_index,
            "assignment target raises at run time"
        );
        ResolvedAssignmentTarget::new(
            AssignmentTarget::DeferredError {
                error,
                message: format!("'{}'", token.content),
            },
            variables_accessed,
        )
    }
}
