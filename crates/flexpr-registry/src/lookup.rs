//! Member resolution.
//!
//! Given a target type, a member name and the requested parameter types,
//! each function here returns exactly one member handle or fails.
//!
//! ## Algorithm
//!
//! 1. Select the candidates declared on the target type whose name matches
//!    and whose parameter types equal the requested ones position by position
//! 2. For interface targets with no match, recurse into the super-interfaces
//!    depth-first; the first interface yielding candidates wins
//! 3. Zero candidates is `MemberNotFound`, more than one is `AmbiguousMember`

use std::sync::Arc;

use rustc_hash::FxHashSet;

use flexpr_core::{
    BuildError, ConstructorEntry, DataType, FieldEntry, IndexerEntry, MemberKind, MethodEntry,
    PropertyEntry, TypeEntry, TypeHash,
};

use crate::TypeLookup;

/// Name reported for indexers in diagnostics.
const INDEXER_NAME: &str = "this";

/// Format parameter types as `int, string`.
pub fn format_signature<L: TypeLookup + ?Sized>(lookup: &L, params: &[DataType]) -> String {
    params
        .iter()
        .map(|p| lookup.type_name(*p))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve an instance method.
pub fn resolve_method<L: TypeLookup + ?Sized>(
    lookup: &L,
    target: DataType,
    name: &str,
    params: &[DataType],
) -> Result<Arc<MethodEntry>, BuildError> {
    let candidates = walk_hierarchy(lookup, target, |entry| {
        select(&entry.methods, |m| {
            !m.is_static() && m.name == name && m.params == params
        })
    });
    pick(lookup, candidates, MemberKind::Method, target, name, params)
}

/// Resolve a static method declared on `owner`.
pub fn resolve_static_method<L: TypeLookup + ?Sized>(
    lookup: &L,
    owner: DataType,
    name: &str,
    params: &[DataType],
) -> Result<Arc<MethodEntry>, BuildError> {
    let candidates = lookup
        .entry_of(owner)
        .map(|entry| {
            select(&entry.methods, |m| {
                m.is_static() && m.name == name && m.params == params
            })
        })
        .unwrap_or_default();
    pick(lookup, candidates, MemberKind::Method, owner, name, params)
}

/// Resolve a constructor. Interfaces have none.
pub fn resolve_constructor<L: TypeLookup + ?Sized>(
    lookup: &L,
    target: DataType,
    params: &[DataType],
) -> Result<Arc<ConstructorEntry>, BuildError> {
    let candidates = lookup
        .entry_of(target)
        .filter(|entry| !entry.is_interface())
        .map(|entry| select(&entry.constructors, |c| c.params == params))
        .unwrap_or_default();
    let name = lookup.type_name(target);
    pick(lookup, candidates, MemberKind::Constructor, target, &name, params)
}

/// Resolve an indexer by its exact index parameter types.
pub fn resolve_indexer<L: TypeLookup + ?Sized>(
    lookup: &L,
    target: DataType,
    index_types: &[DataType],
) -> Result<Arc<IndexerEntry>, BuildError> {
    if index_types.is_empty() {
        return Err(BuildError::EmptyIndexSignature);
    }
    let candidates = walk_hierarchy(lookup, target, |entry| {
        select(&entry.indexers, |i| i.params == index_types)
    });
    pick(
        lookup,
        candidates,
        MemberKind::Indexer,
        target,
        INDEXER_NAME,
        index_types,
    )
}

/// Resolve an instance field by name.
pub fn resolve_field<L: TypeLookup + ?Sized>(
    lookup: &L,
    target: DataType,
    name: &str,
) -> Result<Arc<FieldEntry>, BuildError> {
    let candidates = walk_hierarchy(lookup, target, |entry| {
        select(&entry.fields, |f| f.name == name)
    });
    pick(lookup, candidates, MemberKind::Field, target, name, &[])
}

/// Resolve a property by name.
pub fn resolve_property<L: TypeLookup + ?Sized>(
    lookup: &L,
    target: DataType,
    name: &str,
) -> Result<Arc<PropertyEntry>, BuildError> {
    let candidates = walk_hierarchy(lookup, target, |entry| {
        select(&entry.properties, |p| p.name == name)
    });
    pick(lookup, candidates, MemberKind::Property, target, name, &[])
}

fn select<T>(members: &[Arc<T>], matches: impl Fn(&T) -> bool) -> Vec<Arc<T>> {
    members.iter().filter(|m| matches(m)).cloned().collect()
}

/// Collect candidates from the target, walking super-interfaces for
/// interface targets.
fn walk_hierarchy<L, T, F>(lookup: &L, target: DataType, selector: F) -> Vec<Arc<T>>
where
    L: TypeLookup + ?Sized,
    F: Fn(&TypeEntry) -> Vec<Arc<T>>,
{
    let mut visited = FxHashSet::default();
    walk_from(lookup, target.lookup_hash(), &selector, &mut visited)
}

fn walk_from<L, T, F>(
    lookup: &L,
    hash: TypeHash,
    selector: &F,
    visited: &mut FxHashSet<TypeHash>,
) -> Vec<Arc<T>>
where
    L: TypeLookup + ?Sized,
    F: Fn(&TypeEntry) -> Vec<Arc<T>>,
{
    let Some(entry) = lookup.get(hash) else {
        return Vec::new();
    };
    visited.insert(hash);

    let found = selector(entry);
    if !found.is_empty() || !entry.is_interface() {
        return found;
    }

    for super_interface in &entry.interfaces {
        if visited.contains(super_interface) {
            continue;
        }
        let found = walk_from(lookup, *super_interface, selector, visited);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn pick<L: TypeLookup + ?Sized, T>(
    lookup: &L,
    mut candidates: Vec<Arc<T>>,
    kind: MemberKind,
    target: DataType,
    name: &str,
    params: &[DataType],
) -> Result<Arc<T>, BuildError> {
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(BuildError::MemberNotFound {
            kind,
            type_name: lookup.type_name(target),
            name: name.to_string(),
            signature: format_signature(lookup, params),
        }),
        count => Err(BuildError::AmbiguousMember {
            kind,
            type_name: lookup.type_name(target),
            name: name.to_string(),
            signature: format_signature(lookup, params),
            count,
        }),
    }
}
