//! Process-wide member resolution caches
//!
//! Keys are structural (type name, member name, arity and access flags) and
//! values are pure functions of the key, so a racing duplicate insert is
//! harmless.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::object::MemberDescriptor;

/// Direction of a member access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberAccess {
    Get,
    Let,
    Set,
}

/// Cache key for a resolved member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvokerKey {
    pub type_name: String,
    /// Lowercased member name, `None` for the default member
    pub member: Option<String>,
    pub arity: usize,
    pub include_private: bool,
    pub access: MemberAccess,
}

/// Resolved member index per structural key (`None` = no such member)
static INVOKERS: Lazy<RwLock<HashMap<InvokerKey, Option<usize>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Parameterless default getter per type name
static DEFAULT_MEMBERS: Lazy<RwLock<HashMap<String, Option<usize>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Default member presence per dispatch type-info name
static DISPATCH_DEFAULT_MEMBERS: Lazy<RwLock<HashMap<String, bool>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn invokers_write() -> std::sync::RwLockWriteGuard<'static, HashMap<InvokerKey, Option<usize>>> {
    INVOKERS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn invokers_read() -> std::sync::RwLockReadGuard<'static, HashMap<InvokerKey, Option<usize>>> {
    INVOKERS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn default_members_write() -> std::sync::RwLockWriteGuard<'static, HashMap<String, Option<usize>>> {
    DEFAULT_MEMBERS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn default_members_read() -> std::sync::RwLockReadGuard<'static, HashMap<String, Option<usize>>> {
    DEFAULT_MEMBERS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn dispatch_defaults_write() -> std::sync::RwLockWriteGuard<'static, HashMap<String, bool>> {
    DISPATCH_DEFAULT_MEMBERS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn dispatch_defaults_read() -> std::sync::RwLockReadGuard<'static, HashMap<String, bool>> {
    DISPATCH_DEFAULT_MEMBERS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Find the member matching `key` in a descriptor table, using the cache
pub fn resolve_member(key: InvokerKey, members: &[MemberDescriptor]) -> Option<usize> {
    if let Some(cached) = invokers_read().get(&key) {
        return *cached;
    }
    let resolved = find_member(&key, members);
    tracing::trace!(?key, ?resolved, "caching member resolution");
    *invokers_write().entry(key).or_insert(resolved)
}

fn find_member(key: &InvokerKey, members: &[MemberDescriptor]) -> Option<usize> {
    members.iter().position(|m| {
        let name_matches = match &key.member {
            Some(name) => m.is_named(name),
            None => m.is_default,
        };
        let kind_matches = match key.access {
            MemberAccess::Get => m.kind.is_readable(),
            MemberAccess::Let => m.kind.accepts_let(),
            MemberAccess::Set => m.kind.accepts_set(),
        };
        name_matches
            && kind_matches
            && m.accepts(key.arity)
            && (m.is_public || key.include_private)
    })
}

/// Index of the parameterless default getter of a type, using the cache
pub fn default_member(type_name: &str, members: &[MemberDescriptor]) -> Option<usize> {
    if let Some(cached) = default_members_read().get(type_name) {
        return *cached;
    }
    let resolved = members
        .iter()
        .position(|m| m.is_default && m.kind.is_readable() && m.accepts(0));
    tracing::trace!(type_name, ?resolved, "caching default member");
    *default_members_write()
        .entry(type_name.to_string())
        .or_insert(resolved)
}

/// Whether a dispatch type has a default member, computing it on a miss
pub fn dispatch_has_default_member(type_info_name: &str, compute: impl FnOnce() -> bool) -> bool {
    if let Some(cached) = dispatch_defaults_read().get(type_info_name) {
        return *cached;
    }
    let present = compute();
    tracing::trace!(type_info_name, present, "caching dispatch default member");
    *dispatch_defaults_write()
        .entry(type_info_name.to_string())
        .or_insert(present)
}
