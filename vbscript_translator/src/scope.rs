//! Scope information threaded through translation
//!
//! A `ScopeAccessInformation` is built once per routine or block body by the
//! statement parsers and never mutated afterwards. Nested regions (a WITH
//! block, an error-trapping region, a statement that needs by-ref aliases)
//! derive an extended copy with the `with_*` methods.

use std::collections::HashMap;

use vbscript_translator_syntax::NameToken;

use crate::translate::byref::FuncByRefMapping;

/// Where a name was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLocation {
    Outermost,
    WithinClass,
    WithinFunctionOrProperty,
}

/// What a declared name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredKind {
    Variable,
    Constant,
    /// Function or Sub
    Function,
    Property,
    Class,
    /// Name supplied by the host environment
    ExternalDependency,
}

impl DeclaredKind {
    /// Functions and properties are members of their container, never values
    /// in their own right
    pub fn is_routine(self) -> bool {
        matches!(self, DeclaredKind::Function | DeclaredKind::Property)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredName {
    pub name: String,
    pub kind: DeclaredKind,
    pub location: ScopeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Function,
    Sub,
    PropertyGet,
    PropertyLet,
    PropertySet,
}

impl RoutineKind {
    /// Routines whose own name stands for their return value
    pub fn has_return_value(self) -> bool {
        matches!(self, RoutineKind::Function | RoutineKind::PropertyGet)
    }

    pub fn is_property_setter(self) -> bool {
        matches!(self, RoutineKind::PropertyLet | RoutineKind::PropertySet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub by_ref: bool,
}

impl Parameter {
    pub fn by_ref(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            by_ref: true,
        }
    }

    pub fn by_val(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            by_ref: false,
        }
    }
}

/// The routine whose body is being translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRoutine {
    pub name: String,
    pub kind: RoutineKind,
    pub parameters: Vec<Parameter>,
    /// Declared inside a CLASS block
    pub in_class: bool,
}

impl ParentRoutine {
    pub fn new(name: impl Into<String>, kind: RoutineKind, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters,
            in_class: false,
        }
    }

    pub fn in_class(mut self) -> Self {
        self.in_class = true;
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn has_by_ref_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.by_ref)
    }
}

/// Read-only view of the scope an expression is translated in
#[derive(Debug, Clone, Default)]
pub struct ScopeAccessInformation {
    parent: Option<ParentRoutine>,
    /// Rust local holding the active error trapping token
    error_token: Option<String>,
    /// Rust local holding the current WITH target
    with_target: Option<String>,
    /// Rust local standing for the routine's return value
    parent_return_value_name: Option<String>,
    declared: HashMap<String, DeclaredName>,
    aliases: Vec<FuncByRefMapping>,
}

impl ScopeAccessInformation {
    /// Scope of the outermost script body
    pub fn outermost() -> Self {
        Self::default()
    }

    /// Scope of a routine body; `return_value_name` is required for
    /// functions and property getters
    pub fn for_routine(routine: ParentRoutine, return_value_name: Option<&str>) -> Self {
        let mut scope = Self::default();
        for parameter in &routine.parameters {
            scope.insert(
                &parameter.name,
                DeclaredKind::Variable,
                ScopeLocation::WithinFunctionOrProperty,
            );
        }
        scope.parent_return_value_name = return_value_name.map(str::to_string);
        scope.parent = Some(routine);
        scope
    }

    fn insert(&mut self, name: &str, kind: DeclaredKind, location: ScopeLocation) {
        self.declared.insert(
            name.to_ascii_lowercase(),
            DeclaredName {
                name: name.to_string(),
                kind,
                location,
            },
        );
    }

    /// Add a declaration; later declarations shadow earlier ones
    pub fn declare(mut self, name: &str, kind: DeclaredKind, location: ScopeLocation) -> Self {
        self.insert(name, kind, location);
        self
    }

    /// Enter an `On Error Resume Next` capable region
    pub fn with_error_token(&self, token: impl Into<String>) -> Self {
        let mut scope = self.clone();
        scope.error_token = Some(token.into());
        scope
    }

    /// Enter a WITH block whose target is held in `target`
    pub fn with_redirected_target(&self, target: impl Into<String>) -> Self {
        let mut scope = self.clone();
        scope.with_target = Some(target.into());
        scope
    }

    /// Activate by-ref aliases; a mapping for an already aliased name replaces
    /// the earlier one
    pub fn with_aliases(&self, mappings: &[FuncByRefMapping]) -> Self {
        let mut scope = self.clone();
        for mapping in mappings {
            scope.aliases.retain(|m| !m.from.matches(&mapping.from.content));
            scope.aliases.push(mapping.clone());
        }
        scope
    }

    pub fn parent(&self) -> Option<&ParentRoutine> {
        self.parent.as_ref()
    }

    pub fn error_token(&self) -> Option<&str> {
        self.error_token.as_deref()
    }

    pub fn with_target(&self) -> Option<&str> {
        self.with_target.as_deref()
    }

    pub fn parent_return_value_name(&self) -> Option<&str> {
        self.parent_return_value_name.as_deref()
    }

    pub fn aliases(&self) -> &[FuncByRefMapping] {
        &self.aliases
    }

    /// Declaration for `name`, if any (case-insensitive)
    pub fn lookup(&self, name: &str) -> Option<&DeclaredName> {
        self.declared.get(&name.to_ascii_lowercase())
    }

    pub fn kind_of(&self, token: &NameToken) -> Option<DeclaredKind> {
        self.lookup(&token.content).map(|d| d.kind)
    }

    /// Known function or property
    pub fn is_routine(&self, token: &NameToken) -> bool {
        self.kind_of(token).is_some_and(DeclaredKind::is_routine)
    }

    /// The name refers to the enclosing function's (or property getter's)
    /// return value
    pub fn is_return_value_reference(&self, token: &NameToken) -> bool {
        self.parent.as_ref().is_some_and(|routine| {
            routine.kind.has_return_value() && token.matches(&routine.name)
        }) && self.parent_return_value_name.is_some()
    }

    /// Inside a property LET/SET body and `token` is that property's name
    pub fn is_property_setter_self_reference(&self, token: &NameToken) -> bool {
        self.parent
            .as_ref()
            .is_some_and(|routine| routine.kind.is_property_setter() && token.matches(&routine.name))
    }

    /// By-ref parameter of the enclosing routine
    pub fn is_by_ref_parameter(&self, token: &NameToken) -> bool {
        self.parent
            .as_ref()
            .and_then(|routine| routine.parameter(&token.content))
            .is_some_and(|p| p.by_ref)
    }

    /// Active alias for `token`
    pub fn alias_for(&self, token: &NameToken) -> Option<&FuncByRefMapping> {
        self.aliases.iter().find(|m| m.from.matches(&token.content))
    }

    /// Member code runs inside a class instance
    pub fn is_in_class(&self) -> bool {
        self.parent.as_ref().is_some_and(|routine| routine.in_class)
    }
}
