//! Rendering VBScript names as Rust places
//!
//! VBScript names are case-insensitive, so every identifier is lowercased
//! before it is emitted. Where a name lives decides how it is reached:
//!
//! ```text
//! outermost declaration        _outer.name
//! class member                 self.name
//! routine local / by-val arg   name
//! by-ref parameter             (*name)
//! active by-ref alias          byrefalias1
//! external or undeclared       _env.name
//! ```

use std::cell::Cell;

use vbscript_translator_syntax::NameToken;

use crate::config::TranslatorConfig;
use crate::scope::{DeclaredKind, ScopeAccessInformation, ScopeLocation};

/// Rust strict and reserved keywords
const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "async",
    "await", "become", "box", "do", "dyn", "final", "macro", "override", "priv", "try", "typeof",
    "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "super"];

/// Turn a VBScript name into a Rust identifier
///
/// Lowercases, replaces characters Rust does not accept (VBScript allows
/// `[bracketed names]` with spaces) and escapes keywords.
pub fn rust_ident(name: &str) -> String {
    let mut ident: String = name
        .trim_matches(|c| c == '[' || c == ']')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Turn a class name into a Rust type name, keeping its declared case
pub fn rust_type_ident(name: &str) -> String {
    let mut ident: String = name
        .trim_matches(|c| c == '[' || c == ']')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else if ident == "Self" || NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Render a string as a Rust string literal
pub fn rust_string_literal(content: &str) -> String {
    format!("\"{}\"", content.escape_default())
}

/// Renders names for one configuration
#[derive(Debug, Clone, Copy)]
pub struct NameRewriter<'c> {
    config: &'c TranslatorConfig,
}

impl<'c> NameRewriter<'c> {
    pub fn new(config: &'c TranslatorConfig) -> Self {
        Self { config }
    }

    fn field(&self, holder: &str, name: &str) -> String {
        format!("{}.{}", holder, rust_ident(name))
    }

    /// The place a name token denotes
    pub fn render(&self, token: &NameToken, scope: &ScopeAccessInformation) -> String {
        if let Some(alias) = scope.alias_for(token) {
            return alias.to.clone();
        }
        if scope.is_return_value_reference(token) {
            if let Some(return_value) = scope.parent_return_value_name() {
                return return_value.to_string();
            }
        }
        if scope.is_by_ref_parameter(token) {
            return format!("(*{})", rust_ident(&token.content));
        }
        match scope.lookup(&token.content) {
            Some(declared) if declared.kind == DeclaredKind::ExternalDependency => {
                self.field(&self.config.env, &token.content)
            }
            Some(declared) => match declared.location {
                ScopeLocation::Outermost => self.field(&self.config.outer, &token.content),
                ScopeLocation::WithinClass => {
                    self.field(&self.config.self_reference, &token.content)
                }
                ScopeLocation::WithinFunctionOrProperty => rust_ident(&token.content),
            },
            None => self.field(&self.config.env, &token.content),
        }
    }

    /// The object a known function or property is a member of
    pub fn container(&self, token: &NameToken, scope: &ScopeAccessInformation) -> String {
        match scope.lookup(&token.content).map(|d| d.location) {
            Some(ScopeLocation::WithinClass) => self.me(&self.config.self_reference),
            _ => self.me(&self.config.outer),
        }
    }

    /// Calling context for member access (decides private visibility)
    pub fn context(&self, scope: &ScopeAccessInformation) -> String {
        if scope.is_in_class() {
            self.me(&self.config.self_reference)
        } else {
            self.me(&self.config.outer)
        }
    }

    fn me(&self, holder: &str) -> String {
        format!("{}.{}", holder, self.config.me_field)
    }
}

/// Per-translator counter for temporaries
#[derive(Debug, Default)]
pub struct TempNameGenerator {
    last: Cell<usize>,
}

impl TempNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused name with `prefix`
    pub fn next(&self, prefix: &str) -> String {
        let n = self.last.get() + 1;
        self.last.set(n);
        format!("{}{}", prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ParentRoutine, Parameter, RoutineKind};
    use crate::translate::byref::FuncByRefMapping;
    use vbscript_translator_syntax::testing::name;

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("MyVar"), "myvar");
        assert_eq!(rust_ident("Loop"), "r#loop");
        assert_eq!(rust_ident("Self"), "self_");
        assert_eq!(rust_ident("[my name]"), "my_name");
        assert_eq!(rust_ident("1st"), "_1st");
    }

    #[test]
    fn test_rust_type_ident_keeps_case() {
        assert_eq!(rust_type_ident("MyClass"), "MyClass");
        assert_eq!(rust_type_ident("Self"), "Self_");
        assert_eq!(rust_type_ident("[Order Line]"), "Order_Line");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(rust_string_literal("say \"hi\"\r\n"), r#""say \"hi\"\r\n""#);
    }

    #[test]
    fn test_render_by_location() {
        let config = TranslatorConfig::default();
        let names = NameRewriter::new(&config);
        let scope = ScopeAccessInformation::for_routine(
            ParentRoutine::new("F", RoutineKind::Function, vec![Parameter::by_ref("a")]),
            Some("retval"),
        )
        .declare("x", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("y", DeclaredKind::Variable, ScopeLocation::WithinClass)
        .declare("z", DeclaredKind::Variable, ScopeLocation::WithinFunctionOrProperty)
        .declare("wscript", DeclaredKind::ExternalDependency, ScopeLocation::Outermost);

        assert_eq!(names.render(&name("X"), &scope), "_outer.x");
        assert_eq!(names.render(&name("y"), &scope), "self.y");
        assert_eq!(names.render(&name("z"), &scope), "z");
        assert_eq!(names.render(&name("WScript"), &scope), "_env.wscript");
        assert_eq!(names.render(&name("undeclared"), &scope), "_env.undeclared");
        assert_eq!(names.render(&name("a"), &scope), "(*a)");
        assert_eq!(names.render(&name("f"), &scope), "retval");

        let aliased = scope.with_aliases(&[FuncByRefMapping::new(name("a"), "byrefalias1", true)]);
        assert_eq!(names.render(&name("A"), &aliased), "byrefalias1");
    }

    #[test]
    fn test_temp_names_are_instance_scoped() {
        let first = TempNameGenerator::new();
        let second = TempNameGenerator::new();
        assert_eq!(first.next("args"), "args1");
        assert_eq!(first.next("result"), "result2");
        assert_eq!(second.next("args"), "args1");
    }
}
