//! Call and call-set translation
//!
//! Every member access goes through `_rt.call(context, target, members, args)`
//! except for built-in functions whose argument count fits a direct
//! intrinsic. Arguments are passed in one of three ways:
//!
//! ```text
//! ByVal        f(a + 1), f((a)), f(1), f(o.x)    .val(&x)
//! ByRef        f(a)                               .by_ref(&a), written back after the call
//! RefIfArray   f(a(1))                            .ref_if_array(&a, &[&i])
//! ```

use vbscript_translator_runtime::intrinsics;
use vbscript_translator_syntax::{
    CallSegment, CallSetSegment, DeferredError, Expression, ExpressionSegment, NameKind,
    NameToken,
};

use super::{ExpressionReturnType, NameSet, StatementTranslator, TranslatedExpression};
use crate::error::{TranslationError, TranslationResult};
use crate::names::rust_string_literal;
use crate::scope::{DeclaredKind, ScopeAccessInformation};

/// How an argument reaches the callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentPassing {
    ByVal,
    ByRef,
    /// By reference if the call target turns out to be an array
    RefIfArray,
}

/// Decide how `argument` is passed
pub fn argument_passing(argument: &Expression, scope: &ScopeAccessInformation) -> ArgumentPassing {
    let Some(ExpressionSegment::Call(call)) = argument.single_segment() else {
        return ArgumentPassing::ByVal;
    };
    if call.with_relative {
        return ArgumentPassing::ByVal;
    }
    let [token] = call.member_access_tokens.as_slice() else {
        return ArgumentPassing::ByVal;
    };
    if !token.is_plain() {
        return ArgumentPassing::ByVal;
    }
    if call.is_bare_name() && scope.is_return_value_reference(token) {
        return ArgumentPassing::ByRef;
    }
    if matches!(
        scope.kind_of(token),
        Some(DeclaredKind::Constant | DeclaredKind::Function | DeclaredKind::Property | DeclaredKind::Class)
    ) {
        return ArgumentPassing::ByVal;
    }
    if call.has_zero_argument_brackets() {
        return ArgumentPassing::ByVal;
    }
    if call.arguments.is_empty() {
        ArgumentPassing::ByRef
    } else {
        ArgumentPassing::RefIfArray
    }
}

/// Single built-in function token whose intrinsic accepts the argument count
pub fn uses_direct_intrinsic(call: &CallSegment) -> bool {
    match call.member_access_tokens.as_slice() {
        [token] if token.kind == NameKind::BuiltInFunction && !call.with_relative => {
            intrinsics::lookup(&token.content).is_some_and(|i| i.accepts(call.arguments.len()))
        }
        _ => false,
    }
}

/// One argument of a generic call, already translated
#[derive(Debug, Clone, PartialEq, Eq)]
enum TranslatedArgument {
    ByVal(String),
    ByRef(String),
    RefIfArray { target: String, indices: Vec<String> },
}

/// Arguments of a generic call
#[derive(Debug, Default)]
pub(super) struct TranslatedArguments {
    arguments: Vec<TranslatedArgument>,
    zero_argument_brackets: bool,
    pub(super) variables_accessed: NameSet,
}

impl TranslatedArguments {
    fn has_by_ref(&self) -> bool {
        self.arguments
            .iter()
            .any(|a| matches!(a, TranslatedArgument::ByRef(_)))
    }
}

impl StatementTranslator {
    /// Translate a single call segment
    pub(super) fn translate_call(
        &self,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let line_index = call.line_index();
        let context = self.names().context(scope);

        if call.with_relative {
            let target = scope
                .with_target()
                .ok_or(TranslationError::MissingWithTarget { line_index })?
                .to_string();
            let arguments = self.translate_arguments(call, scope)?;
            return Ok(self.generic_call(
                &context,
                &target,
                &call.member_access_tokens,
                arguments,
                NameSet::new(),
            ));
        }

        let Some(first) = call.first_token() else {
            return Err(TranslationError::unsupported(
                "call without a member access token",
                line_index,
            ));
        };

        match first.kind {
            NameKind::BuiltInValue => {
                let literal = self.translate_built_in_value(first)?;
                if call.is_bare_name() {
                    return Ok(literal);
                }
                let arguments = self.translate_arguments(call, scope)?;
                Ok(self.generic_call(
                    &context,
                    &literal.content,
                    &call.member_access_tokens[1..],
                    arguments,
                    NameSet::new(),
                ))
            }
            NameKind::BuiltInFunction => {
                if uses_direct_intrinsic(call) {
                    return self.translate_intrinsic_call(first, &call.arguments, scope);
                }
                let arguments = self.translate_arguments(call, scope)?;
                Ok(self.generic_call(
                    &context,
                    &self.builtins_target(),
                    &call.member_access_tokens,
                    arguments,
                    NameSet::new(),
                ))
            }
            NameKind::Plain => self.translate_plain_call(call, first, &context, scope),
        }
    }

    fn translate_plain_call(
        &self,
        call: &CallSegment,
        first: &NameToken,
        context: &str,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let names = self.names();

        if call.is_bare_name() && scope.is_return_value_reference(first) {
            return Ok(TranslatedExpression::constant(
                names.render(first, scope),
                ExpressionReturnType::NotSpecified,
            ));
        }

        if scope.is_routine(first) {
            let container = names.container(first, scope);
            tracing::debug!(
                name = %first.content,
                container = %container,
                "relocating routine call to its container"
            );
            let arguments = self.translate_arguments(call, scope)?;
            return Ok(self.generic_call(
                context,
                &container,
                &call.member_access_tokens,
                arguments,
                NameSet::new(),
            ));
        }

        if scope.kind_of(first) == Some(DeclaredKind::Class) {
            return Ok(TranslatedExpression::constant(
                self.raise_deferred_error(
                    DeferredError::TypeMismatch,
                    &format!("'{}'", first.content),
                    first.line_index,
                ),
                ExpressionReturnType::Value,
            ));
        }

        let place = names.render(first, scope);
        let mut variables_accessed = NameSet::new();
        variables_accessed.insert(first.key());
        if call.is_bare_name() {
            return Ok(TranslatedExpression::new(
                place,
                ExpressionReturnType::NotSpecified,
                variables_accessed,
            ));
        }
        let arguments = self.translate_arguments(call, scope)?;
        Ok(self.generic_call(
            context,
            &place,
            &call.member_access_tokens[1..],
            arguments,
            variables_accessed,
        ))
    }

    /// Translate a call set: each link's result is the next link's target
    pub(super) fn translate_call_set(
        &self,
        set: &CallSetSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let Some((first, rest)) = set.calls.split_first() else {
            return Err(TranslationError::unsupported(
                "empty call set",
                set.line_index(),
            ));
        };
        let context = self.names().context(scope);
        let mut current = self.translate_call(first, scope)?;
        for link in rest {
            let arguments = self.translate_arguments(link, scope)?;
            current = self.generic_call(
                &context,
                &current.content,
                &link.member_access_tokens,
                arguments,
                current.variables_accessed,
            );
        }
        Ok(current)
    }

    /// `vbs::intrinsics::len(&[&x])?`
    fn translate_intrinsic_call(
        &self,
        token: &NameToken,
        arguments: &[Expression],
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedExpression> {
        let mut variables_accessed = NameSet::new();
        let mut rendered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let translated = self.translate(argument, scope, ExpressionReturnType::NotSpecified)?;
            Self::merge(&mut variables_accessed, translated.variables_accessed);
            rendered.push(format!("&{}", translated.content));
        }
        let function = format!("intrinsics::{}", token.content.to_ascii_lowercase());
        Ok(TranslatedExpression::new(
            format!("{}(&[{}])?", self.path(&function), rendered.join(", ")),
            ExpressionReturnType::Value,
            variables_accessed,
        ))
    }

    fn builtins_target(&self) -> String {
        format!("{}()", self.rt("builtins"))
    }

    /// Translate the arguments of a generic call
    pub(super) fn translate_arguments(
        &self,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedArguments> {
        let mut translated = TranslatedArguments {
            zero_argument_brackets: call.has_zero_argument_brackets(),
            ..TranslatedArguments::default()
        };
        for argument in &call.arguments {
            let passing = argument_passing(argument, scope);
            let entry = match (passing, argument.single_segment()) {
                (ArgumentPassing::RefIfArray, Some(ExpressionSegment::Call(inner))) => {
                    self.translate_ref_if_array(inner, scope, &mut translated.variables_accessed)?
                }
                (ArgumentPassing::ByRef, _) => {
                    let place = self.translate(argument, scope, ExpressionReturnType::NotSpecified)?;
                    Self::merge(&mut translated.variables_accessed, place.variables_accessed);
                    TranslatedArgument::ByRef(place.content)
                }
                _ => {
                    let value = self.translate(argument, scope, ExpressionReturnType::NotSpecified)?;
                    Self::merge(&mut translated.variables_accessed, value.variables_accessed);
                    TranslatedArgument::ByVal(value.content)
                }
            };
            translated.arguments.push(entry);
        }
        Ok(translated)
    }

    /// Translate arguments that are always passed by value (assignment targets)
    pub(super) fn translate_by_value_arguments(
        &self,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedArguments> {
        let mut translated = TranslatedArguments {
            zero_argument_brackets: call.has_zero_argument_brackets(),
            ..TranslatedArguments::default()
        };
        for argument in &call.arguments {
            let value = self.translate(argument, scope, ExpressionReturnType::NotSpecified)?;
            Self::merge(&mut translated.variables_accessed, value.variables_accessed);
            translated.arguments.push(TranslatedArgument::ByVal(value.content));
        }
        Ok(translated)
    }

    fn translate_ref_if_array(
        &self,
        call: &CallSegment,
        scope: &ScopeAccessInformation,
        variables_accessed: &mut NameSet,
    ) -> TranslationResult<TranslatedArgument> {
        let Some(token) = call.first_token() else {
            return Err(TranslationError::unsupported(
                "array argument without a name",
                call.line_index(),
            ));
        };
        variables_accessed.insert(token.key());
        let target = self.names().render(token, scope);
        let mut indices = Vec::with_capacity(call.arguments.len());
        for index in &call.arguments {
            let value = self.translate(index, scope, ExpressionReturnType::Value)?;
            Self::merge(variables_accessed, value.variables_accessed);
            indices.push(value.content);
        }
        Ok(TranslatedArgument::RefIfArray { target, indices })
    }

    /// `_rt.args().val(&a).by_ref(&b)`
    pub(super) fn render_argument_provider(&self, arguments: &TranslatedArguments) -> String {
        let mut provider = format!("{}()", self.rt("args"));
        for argument in &arguments.arguments {
            match argument {
                TranslatedArgument::ByVal(value) => {
                    provider.push_str(&format!(".val(&{})", value));
                }
                TranslatedArgument::ByRef(place) => {
                    provider.push_str(&format!(".by_ref(&{})", place));
                }
                TranslatedArgument::RefIfArray { target, indices } => {
                    let indices: Vec<String> = indices.iter().map(|i| format!("&{}", i)).collect();
                    provider.push_str(&format!(
                        ".ref_if_array(&{}, &[{}])",
                        target,
                        indices.join(", ")
                    ));
                }
            }
        }
        if arguments.zero_argument_brackets {
            provider.push_str(".with_zero_argument_brackets()");
        }
        provider
    }

    /// `&["A", "B"]`
    pub(super) fn render_members(members: &[NameToken]) -> String {
        let members: Vec<String> = members
            .iter()
            .map(|m| rust_string_literal(&m.content))
            .collect();
        format!("&[{}]", members.join(", "))
    }

    /// Late-bound call; by-ref arguments are copied back once it returns
    pub(super) fn generic_call(
        &self,
        context: &str,
        target: &str,
        members: &[NameToken],
        arguments: TranslatedArguments,
        mut variables_accessed: NameSet,
    ) -> TranslatedExpression {
        let provider = self.render_argument_provider(&arguments);
        let members = Self::render_members(members);
        let call = self.rt("call");

        let content = if arguments.has_by_ref() {
            let args_name = self.temp_names.next(&self.config.args_prefix);
            let result_name = self.temp_names.next(&self.config.result_prefix);
            let write_backs: String = arguments
                .arguments
                .iter()
                .enumerate()
                .filter_map(|(i, a)| match a {
                    TranslatedArgument::ByRef(place) => {
                        Some(format!(" {} = {}.take({});", place, args_name, i))
                    }
                    _ => None,
                })
                .collect();
            format!(
                "{{ let mut {args} = {provider}; let {result} = {call}(&{context}, &{target}, {members}, &mut {args})?;{write_backs} {result} }}",
                args = args_name,
                result = result_name,
            )
        } else {
            format!(
                "{}(&{}, &{}, {}, &mut {})?",
                call, context, target, members, provider
            )
        };

        Self::merge(&mut variables_accessed, arguments.variables_accessed);
        TranslatedExpression::new(content, ExpressionReturnType::Value, variables_accessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{Parameter, ParentRoutine, RoutineKind, ScopeLocation};
    use vbscript_translator_syntax::testing::*;
    use vbscript_translator_syntax::Operator;

    fn scope() -> ScopeAccessInformation {
        ScopeAccessInformation::for_routine(
            ParentRoutine::new("F", RoutineKind::Function, vec![Parameter::by_ref("p")]),
            Some("retval"),
        )
        .declare("x", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("K", DeclaredKind::Constant, ScopeLocation::Outermost)
        .declare("G", DeclaredKind::Function, ScopeLocation::Outermost)
    }

    #[test]
    fn test_argument_passing() {
        let scope = scope();
        assert_eq!(argument_passing(&var("x"), &scope), ArgumentPassing::ByRef);
        assert_eq!(argument_passing(&var("undeclared"), &scope), ArgumentPassing::ByRef);
        assert_eq!(argument_passing(&var("f"), &scope), ArgumentPassing::ByRef);
        assert_eq!(argument_passing(&call(&["x"], vec![num(1.0)]), &scope), ArgumentPassing::RefIfArray);
        assert_eq!(argument_passing(&call_with_brackets(&["x"]), &scope), ArgumentPassing::ByVal);
        assert_eq!(argument_passing(&call(&["x", "y"], vec![]), &scope), ArgumentPassing::ByVal);
        assert_eq!(argument_passing(&var("K"), &scope), ArgumentPassing::ByVal);
        assert_eq!(argument_passing(&var("G"), &scope), ArgumentPassing::ByVal);
        assert_eq!(argument_passing(&bracketed(var("x")), &scope), ArgumentPassing::ByVal);
        assert_eq!(argument_passing(&num(1.0), &scope), ArgumentPassing::ByVal);
        assert_eq!(
            argument_passing(&binary(var("x"), Operator::Add, num(1.0)), &scope),
            ArgumentPassing::ByVal
        );
        assert_eq!(argument_passing(&with_member(&["x"], vec![]), &scope), ArgumentPassing::ByVal);
    }

    #[test]
    fn test_direct_intrinsic_needs_matching_arity() {
        let len = |arguments| match built_in_function("LEN", arguments).segments.remove(0) {
            ExpressionSegment::Call(call) => call,
            _ => unreachable!(),
        };
        assert!(uses_direct_intrinsic(&len(vec![var("x")])));
        assert!(!uses_direct_intrinsic(&len(vec![var("x"), var("y")])));
    }
}
