//! By-ref parameter aliasing
//!
//! Error-trapped statements run inside closures, and a by-ref parameter
//! (`&mut Value`) that is also handed on by reference must be copied into a
//! plain local for the duration of the statement. The analyzer finds those
//! references and decides whether the local has to be copied back.

use vbscript_translator_syntax::{
    CallSegment, Expression, ExpressionSegment, NameToken, ValueSettingStatement,
};

use super::calls::{argument_passing, uses_direct_intrinsic, ArgumentPassing};
use crate::error::TranslationResult;
use crate::names::TempNameGenerator;
use crate::scope::ScopeAccessInformation;

/// A by-ref parameter and the local standing in for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncByRefMapping {
    pub from: NameToken,
    pub to: String,
    /// The parameter is only read, so the local is never copied back
    pub mapped_from_read_only: bool,
}

impl FuncByRefMapping {
    pub fn new(from: NameToken, to: impl Into<String>, mapped_from_read_only: bool) -> Self {
        Self {
            from,
            to: to.into(),
            mapped_from_read_only,
        }
    }
}

/// Collects the alias mappings one statement needs
#[derive(Debug)]
pub struct ByRefAliasAnalyzer<'a> {
    scope: &'a ScopeAccessInformation,
    temp_names: &'a TempNameGenerator,
    alias_prefix: &'a str,
    mappings: Vec<FuncByRefMapping>,
}

impl<'a> ByRefAliasAnalyzer<'a> {
    pub fn new(
        scope: &'a ScopeAccessInformation,
        temp_names: &'a TempNameGenerator,
        alias_prefix: &'a str,
    ) -> Self {
        Self {
            scope,
            temp_names,
            alias_prefix,
            mappings: Vec::new(),
        }
    }

    fn applies(&self) -> bool {
        self.scope
            .parent()
            .is_some_and(|routine| routine.has_by_ref_parameters())
    }

    fn trapped(&self) -> bool {
        self.scope.error_token().is_some()
    }

    /// Mappings for an expression evaluated on its own
    pub fn analyze_expression(mut self, expression: &Expression) -> TranslationResult<Vec<FuncByRefMapping>> {
        if self.applies() {
            self.visit(expression)?;
        }
        Ok(self.mappings)
    }

    /// Mappings for an assignment; a by-ref parameter on the left is always
    /// written back
    pub fn analyze_value_setting(
        mut self,
        statement: &ValueSettingStatement,
    ) -> TranslationResult<Vec<FuncByRefMapping>> {
        if !self.applies() {
            return Ok(self.mappings);
        }
        if let Some(token) = self.bare_by_ref_parameter(&statement.target) {
            self.add(token, false);
        }
        self.visit(&statement.target)?;
        self.visit(&statement.value)?;
        Ok(self.mappings)
    }

    fn visit(&mut self, expression: &Expression) -> TranslationResult<()> {
        if !expression.is_flattened_concatenation() {
            expression.shape()?;
        }
        for segment in expression.segments.iter().filter(|s| !s.is_operation()) {
            self.visit_segment(segment)?;
        }
        Ok(())
    }

    fn visit_segment(&mut self, segment: &ExpressionSegment) -> TranslationResult<()> {
        match segment {
            ExpressionSegment::Call(call) => self.visit_call(call, true),
            ExpressionSegment::CallSet(set) => {
                for (i, call) in set.calls.iter().enumerate() {
                    self.visit_call(call, i == 0)?;
                }
                Ok(())
            }
            ExpressionSegment::Bracketed(bracketed) => self.visit(&bracketed.expression),
            _ => Ok(()),
        }
    }

    fn visit_call(&mut self, call: &CallSegment, first_link: bool) -> TranslationResult<()> {
        if first_link && !call.with_relative && self.trapped() {
            if let Some(token) = call.first_token().filter(|t| self.is_unaliased_parameter(t)) {
                self.add(token, true);
            }
        }

        let direct = uses_direct_intrinsic(call);
        for argument in &call.arguments {
            if !direct && argument_passing(argument, self.scope) == ArgumentPassing::ByRef {
                if let Some(token) = self.bare_by_ref_parameter(argument) {
                    self.add(token, false);
                }
            }
            self.visit(argument)?;
        }
        Ok(())
    }

    fn is_unaliased_parameter(&self, token: &NameToken) -> bool {
        token.is_plain()
            && self.scope.is_by_ref_parameter(token)
            && self.scope.alias_for(token).is_none()
    }

    fn bare_by_ref_parameter<'e>(&self, expression: &'e Expression) -> Option<&'e NameToken> {
        match expression.single_segment() {
            Some(ExpressionSegment::Call(call)) if call.is_bare_name() => call
                .first_token()
                .filter(|token| self.is_unaliased_parameter(token)),
            _ => None,
        }
    }

    fn add(&mut self, token: &NameToken, read_only: bool) {
        let existing = self
            .mappings
            .iter()
            .position(|m| m.from.matches(&token.content));
        match existing {
            Some(i) if self.mappings[i].mapped_from_read_only && !read_only => {
                let upgraded = self.mappings.remove(i);
                self.mappings
                    .push(FuncByRefMapping::new(upgraded.from, upgraded.to, false));
            }
            Some(_) => {}
            None => {
                let alias = self.temp_names.next(self.alias_prefix);
                self.mappings
                    .push(FuncByRefMapping::new(token.clone(), alias, read_only));
            }
        }
    }
}
