//! VBScript expression and statement translation.
//!
//! `StatementTranslator` turns segment trees into Rust source text that calls
//! into the runtime crate through the provider reference (`_rt` by default).
//! Every translated expression reports what kind of thing its content is:
//!
//! ```text
//! Value / Reference / NotSpecified    an expression of type `vbs::Value`
//! Boolean                             an expression of type `bool`
//! None                                evaluated for side effects only
//! ```
//!
//! `NotSpecified` content may be a place (`_outer.x`), so callers that need
//! an owned value ask for the `Value` or `Reference` shape instead.

mod assignment;
pub mod byref;
mod calls;
mod comparison;
pub mod concat;
mod expressions;
mod statements;

use std::collections::BTreeSet;

pub use assignment::{AssignmentTarget, ResolvedAssignmentTarget};
pub use byref::{ByRefAliasAnalyzer, FuncByRefMapping};
pub use calls::ArgumentPassing;
pub use concat::flatten_concatenations;

use crate::config::TranslatorConfig;
use crate::names::{NameRewriter, TempNameGenerator};
use crate::scope::ScopeAccessInformation;

/// Lowercase keys of the variables an expression reads or writes
pub type NameSet = BTreeSet<String>;

/// What the caller needs a translated expression to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionReturnType {
    /// Result discarded
    None,
    /// Owned value; object references resolved through their default member
    Value,
    /// Owned object reference
    Reference,
    /// Rust `bool`
    Boolean,
    /// Whatever the expression naturally produces
    NotSpecified,
}

/// Output of expression translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedExpression {
    pub content: String,
    pub return_type: ExpressionReturnType,
    pub variables_accessed: NameSet,
}

impl TranslatedExpression {
    pub fn new(
        content: impl Into<String>,
        return_type: ExpressionReturnType,
        variables_accessed: NameSet,
    ) -> Self {
        Self {
            content: content.into(),
            return_type,
            variables_accessed,
        }
    }

    /// Content with no variable references
    pub(crate) fn constant(content: impl Into<String>, return_type: ExpressionReturnType) -> Self {
        Self::new(content, return_type, NameSet::new())
    }

    pub(crate) fn with_content(self, content: impl Into<String>, return_type: ExpressionReturnType) -> Self {
        Self {
            content: content.into(),
            return_type,
            variables_accessed: self.variables_accessed,
        }
    }
}

/// Output of statement translation: one or more lines of Rust
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedStatement {
    pub content: String,
    pub variables_accessed: NameSet,
}

impl TranslatedStatement {
    pub fn new(content: impl Into<String>, variables_accessed: NameSet) -> Self {
        Self {
            content: content.into(),
            variables_accessed,
        }
    }
}

/// Translates expressions and leaf statements of one translation unit
///
/// The only mutable state is the temp-name counter, so one translator must
/// not be shared between units that are emitted into the same Rust scope
/// by different instances.
#[derive(Debug)]
pub struct StatementTranslator {
    pub(super) config: TranslatorConfig,
    pub(super) temp_names: TempNameGenerator,
}

impl StatementTranslator {
    /// Create a new translator
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            temp_names: TempNameGenerator::new(),
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(TranslatorConfig::default())
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub(super) fn names(&self) -> NameRewriter<'_> {
        NameRewriter::new(&self.config)
    }

    /// `_rt.method`
    pub(super) fn rt(&self, method: &str) -> String {
        format!("{}.{}", self.config.provider, method)
    }

    /// `vbs::item`
    pub(super) fn path(&self, item: &str) -> String {
        self.config.runtime_path(item)
    }

    /// Coerce a translated expression into the shape the caller asked for
    pub fn apply_return_type_guarantee(
        &self,
        translated: TranslatedExpression,
        required: ExpressionReturnType,
        scope: &ScopeAccessInformation,
        line_index: usize,
    ) -> TranslatedExpression {
        use ExpressionReturnType as R;

        match (required, translated.return_type) {
            (R::None | R::NotSpecified, _) => translated,

            (R::Boolean, R::Boolean) => translated,
            (R::Boolean, actual) => {
                let operand = if actual == R::NotSpecified {
                    format!("{}(&{})?", self.rt("val"), translated.content)
                } else {
                    translated.content.clone()
                };
                let content = match scope.error_token() {
                    Some(token) => format!(
                        "{}({}, || Ok({}))?",
                        self.rt("truthy_trapped"),
                        token,
                        operand
                    ),
                    None => format!("{}(&{})?", self.rt("truthy"), operand),
                };
                translated.with_content(content, R::Boolean)
            }

            (R::Reference, R::Reference) => translated,
            (R::Reference, R::Value) => {
                tracing::warn!(
                    line_index,
                    content = %translated.content,
                    "value result used where an object reference is required"
                );
                let content = format!("{}(&{})?", self.rt("obj"), translated.content);
                translated.with_content(content, R::Reference)
            }
            (R::Reference, R::Boolean) => {
                tracing::warn!(
                    line_index,
                    content = %translated.content,
                    "boolean result used where an object reference is required"
                );
                let content = format!(
                    "{}(&{}({}))?",
                    self.rt("obj"),
                    self.path("Value::Bool"),
                    translated.content
                );
                translated.with_content(content, R::Reference)
            }
            (R::Reference, _) => {
                let content = format!("{}(&{})?", self.rt("obj"), translated.content);
                translated.with_content(content, R::Reference)
            }

            (R::Value, R::Value) => translated,
            (R::Value, R::Boolean) => {
                let content = format!("{}({})", self.path("Value::Bool"), translated.content);
                translated.with_content(content, R::Value)
            }
            (R::Value, _) => {
                let content = format!("{}(&{})?", self.rt("val"), translated.content);
                translated.with_content(content, R::Value)
            }
        }
    }

    pub(super) fn merge(target: &mut NameSet, source: NameSet) {
        target.extend(source);
    }
}

/// Indent every non-empty line of `content` by one level
pub(super) fn indent(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
