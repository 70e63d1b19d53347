//! Leaf statements
//!
//! A statement is translated in three layers: the body itself, the
//! error-trapping wrapper when the scope has an active token, and the by-ref
//! alias block when the statement touches by-ref parameters that need one.
//!
//! ```text
//! {
//!     let mut byrefalias1 = (*a).clone();
//!     let result2 = (|| -> vbs::RuntimeResult<()> {
//!         _rt.handle_error(errortoken1, || {
//!             ...;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })();
//!     (*a) = byrefalias1;
//!     result2?;
//! }
//! ```

use vbscript_translator_syntax::{
    Expression, ExpressionSegment, Statement, ValueSettingKind, ValueSettingStatement,
};

use super::byref::{ByRefAliasAnalyzer, FuncByRefMapping};
use super::{indent, ExpressionReturnType, NameSet, StatementTranslator, TranslatedStatement};
use crate::error::{TranslationError, TranslationResult};
use crate::scope::{DeclaredKind, ScopeAccessInformation};

impl StatementTranslator {
    fn alias_analyzer<'a>(&'a self, scope: &'a ScopeAccessInformation) -> ByRefAliasAnalyzer<'a> {
        ByRefAliasAnalyzer::new(scope, &self.temp_names, &self.config.alias_prefix)
    }

    /// By-ref aliases `expression` needs when evaluated in `scope`
    pub fn by_ref_aliases(
        &self,
        expression: &Expression,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<Vec<FuncByRefMapping>> {
        self.alias_analyzer(scope).analyze_expression(expression)
    }

    /// Translate a call statement (`F a, b`, `o.Run`, `Call F(a)`)
    pub fn translate_statement(
        &self,
        statement: &Statement,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedStatement> {
        let mappings = self.by_ref_aliases(&statement.expression, scope)?;
        let inner_scope = scope.with_aliases(&mappings);
        let body = self.translate_statement_body(&statement.expression, &inner_scope)?;
        let content = self.wrap_error_trapping(body.content, &inner_scope);
        let content = self.wrap_aliases(content, &mappings, scope);
        Ok(TranslatedStatement::new(content, body.variables_accessed))
    }

    fn translate_statement_body(
        &self,
        expression: &Expression,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedStatement> {
        if let Some(ExpressionSegment::Call(call)) = expression.single_segment() {
            let plain_bare_name = call.is_bare_name()
                && call.first_token().is_some_and(|token| {
                    token.is_plain()
                        && !scope.is_routine(token)
                        && scope.kind_of(token) != Some(DeclaredKind::Class)
                });
            if plain_bare_name {
                // Evaluating a bare variable may still invoke its default member
                let place = self.translate_call(call, scope)?;
                return Ok(TranslatedStatement::new(
                    format!("{}(&{})?;", self.rt("val"), place.content),
                    place.variables_accessed,
                ));
            }
        }
        let translated = self.translate(expression, scope, ExpressionReturnType::None)?;
        Ok(TranslatedStatement::new(
            format!("{};", translated.content),
            translated.variables_accessed,
        ))
    }

    /// Translate `target = value` or `Set target = value`
    pub fn translate_value_setting_statement(
        &self,
        statement: &ValueSettingStatement,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<TranslatedStatement> {
        let mappings = self.alias_analyzer(scope).analyze_value_setting(statement)?;
        let inner_scope = scope.with_aliases(&mappings);

        let required = match statement.kind {
            ValueSettingKind::Let => ExpressionReturnType::Value,
            ValueSettingKind::Set => ExpressionReturnType::Reference,
        };
        let value = self.translate(&statement.value, &inner_scope, required)?;
        let target = self.resolve_assignment_target(&statement.target, &inner_scope)?;

        let mut variables_accessed = target.variables_accessed.clone();
        Self::merge(&mut variables_accessed, value.variables_accessed);

        let content = target.render(&self.config, &value.content);
        let content = self.wrap_error_trapping(content, &inner_scope);
        let content = self.wrap_aliases(content, &mappings, scope);
        Ok(TranslatedStatement::new(content, variables_accessed))
    }

    // ========== Error trapping ==========

    /// `let errortoken1 = _rt.get_error_trapping_token();`
    ///
    /// Returns the token's local name with the statement; the caller extends
    /// the scope of the trapped region with it.
    pub fn translate_error_token_acquisition(&self) -> (String, TranslatedStatement) {
        let token = self.temp_names.next(&self.config.error_token_prefix);
        let content = format!("let {} = {}();", token, self.rt("get_error_trapping_token"));
        (token, TranslatedStatement::new(content, NameSet::new()))
    }

    /// `_rt.release_error_trapping_token(errortoken1);`
    pub fn translate_error_token_release(
        &self,
        scope: &ScopeAccessInformation,
        line_index: usize,
    ) -> TranslationResult<TranslatedStatement> {
        let token = Self::required_token(scope, line_index)?;
        Ok(TranslatedStatement::new(
            format!("{}({});", self.rt("release_error_trapping_token"), token),
            NameSet::new(),
        ))
    }

    /// `On Error Resume Next`
    pub fn translate_on_error_resume_next(
        &self,
        scope: &ScopeAccessInformation,
        line_index: usize,
    ) -> TranslationResult<TranslatedStatement> {
        let token = Self::required_token(scope, line_index)?;
        Ok(TranslatedStatement::new(
            format!("{}({})?;", self.rt("start_error_trapping"), token),
            NameSet::new(),
        ))
    }

    /// `On Error Goto 0`
    pub fn translate_on_error_goto_0(
        &self,
        scope: &ScopeAccessInformation,
        line_index: usize,
    ) -> TranslationResult<TranslatedStatement> {
        let token = Self::required_token(scope, line_index)?;
        Ok(TranslatedStatement::new(
            format!("{}({})?;", self.rt("stop_error_trapping"), token),
            NameSet::new(),
        ))
    }

    fn required_token(scope: &ScopeAccessInformation, line_index: usize) -> TranslationResult<&str> {
        scope
            .error_token()
            .ok_or(TranslationError::MissingErrorToken { line_index })
    }

    // ========== WITH ==========

    /// Evaluate a WITH block's target into a local
    ///
    /// Returns the statement and the scope the block body is translated in.
    pub fn translate_with_target(
        &self,
        expression: &Expression,
        scope: &ScopeAccessInformation,
    ) -> TranslationResult<(TranslatedStatement, ScopeAccessInformation)> {
        let mappings = self.by_ref_aliases(expression, scope)?;
        let inner_scope = scope.with_aliases(&mappings);
        let target = self.translate(expression, &inner_scope, ExpressionReturnType::Reference)?;
        let local = self.temp_names.next(&self.config.with_prefix);

        let content = if mappings.is_empty() && inner_scope.error_token().is_none() {
            format!("let {} = {};", local, target.content)
        } else {
            let assignment = format!("{} = {};", local, target.content);
            let assignment = self.wrap_error_trapping(assignment, &inner_scope);
            format!(
                "let mut {} = {};\n{}",
                local,
                self.path("Value::Empty"),
                self.wrap_aliases(assignment, &mappings, scope)
            )
        };
        Ok((
            TranslatedStatement::new(content, target.variables_accessed),
            scope.with_redirected_target(local),
        ))
    }

    // ========== Wrappers ==========

    fn wrap_error_trapping(&self, content: String, scope: &ScopeAccessInformation) -> String {
        match scope.error_token() {
            Some(token) => format!(
                "{}({}, || {{\n{}\n    Ok(())\n}})?;",
                self.rt("handle_error"),
                token,
                indent(&content)
            ),
            None => content,
        }
    }

    /// Copy by-ref parameters into their aliases around `content`; read-write
    /// aliases are copied back whether or not `content` fails
    fn wrap_aliases(
        &self,
        content: String,
        mappings: &[FuncByRefMapping],
        outer_scope: &ScopeAccessInformation,
    ) -> String {
        if mappings.is_empty() {
            return content;
        }
        let names = self.names();
        let result = self.temp_names.next(&self.config.result_prefix);

        let mut lines = Vec::new();
        for mapping in mappings {
            let source = names.render(&mapping.from, outer_scope);
            let binding = if mapping.mapped_from_read_only { "let" } else { "let mut" };
            lines.push(format!("{} {} = {}.clone();", binding, mapping.to, source));
        }
        lines.push(format!(
            "let {} = (|| -> {} {{\n{}\n    Ok(())\n}})();",
            result,
            self.path("RuntimeResult<()>"),
            indent(&content)
        ));
        for mapping in mappings.iter().filter(|m| !m.mapped_from_read_only) {
            let source = names.render(&mapping.from, outer_scope);
            lines.push(format!("{} = {};", source, mapping.to));
        }
        lines.push(format!("{}?;", result));
        format!("{{\n{}\n}}", indent(&lines.join("\n")))
    }
}
