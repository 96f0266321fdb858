//! TypeRegistry - the default host type system.
//!
//! The builder never talks to [`TypeRegistry`] directly: it asks a
//! [`TypeLookup`] for candidate lists, so a host with its own
//! introspection facility can implement the trait instead.
//!
//! # Thread Safety
//!
//! Registration takes `&mut self` and happens before any tree is built.
//! After that the registry is only read, and may be shared freely.
//!
//! # Example
//!
//! ```
//! use flexpr_core::{DataType, FieldEntry, TypeEntry};
//! use flexpr_registry::{TypeLookup, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let hash = registry
//!     .register(TypeEntry::class("Stuff").with_field(FieldEntry::new("SomeInt", DataType::Int32)))
//!     .unwrap();
//! assert_eq!(registry.type_name(DataType::Object(hash)), "Stuff");
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use flexpr_core::{
    DataType, MethodEntry, NativeFn, PropertyEntry, RegistrationError, RuntimeError, TypeEntry,
    TypeHash, Value,
};

/// Capability interface over a host type system.
///
/// Only [`TypeLookup::get`] is required; everything else is derived from
/// the entries it returns.
pub trait TypeLookup {
    /// Look up a type entry by hash.
    fn get(&self, hash: TypeHash) -> Option<&TypeEntry>;

    /// The entry holding the members of a data type, if registered.
    fn entry_of(&self, data_type: DataType) -> Option<&TypeEntry> {
        self.get(data_type.lookup_hash())
    }

    /// Human readable type name for diagnostics.
    fn type_name(&self, data_type: DataType) -> String {
        match data_type {
            DataType::Object(hash) => self
                .get(hash)
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| hash.to_string()),
            other => other.to_string(),
        }
    }

    /// Whether `ty` is, implements or extends `target`.
    fn implements(&self, ty: TypeHash, target: TypeHash) -> bool {
        let mut visited = FxHashSet::default();
        let mut pending = vec![ty];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(entry) = self.get(current) {
                pending.extend(entry.interfaces.iter().copied());
            }
        }
        false
    }

    /// Whether a value of type `from` can be stored where `to` is expected.
    fn is_assignable(&self, from: DataType, to: DataType) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (DataType::Null, target) => target.is_reference(),
            (DataType::Object(a), DataType::Object(b)) => self.implements(a, b),
            _ => false,
        }
    }

    /// Find a method declared directly on `ty` with exactly these
    /// parameter types. Used to dispatch interface calls to the receiver's
    /// concrete type.
    fn find_method_exact(
        &self,
        ty: TypeHash,
        name: &str,
        params: &[DataType],
    ) -> Option<Arc<MethodEntry>> {
        self.get(ty)?
            .methods
            .iter()
            .find(|m| m.name == name && m.params == params && m.native.is_some())
            .cloned()
    }
}

/// Type storage keyed by hash, with a name index.
#[derive(Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
    names: FxHashMap<String, TypeHash>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in members of primitive types
    /// (currently `string.Length`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let string = TypeEntry::primitive(DataType::String).with_property(
            PropertyEntry::new("Length", DataType::Int32).with_getter(NativeFn::new(
                |this, _| match this {
                    Value::String(s) => Ok(Value::Int32(s.chars().count() as i32)),
                    other => Err(RuntimeError::native(format!(
                        "Length expects a string receiver, got {:?}",
                        other
                    ))),
                },
            )),
        );
        registry.names.insert(string.name.clone(), string.type_hash);
        registry.types.insert(string.type_hash, string);
        registry
    }

    /// Register a type.
    ///
    /// Interfaces a type implements must be registered before it.
    pub fn register(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        if self.names.contains_key(&entry.name) || self.types.contains_key(&entry.type_hash) {
            return Err(RegistrationError::DuplicateType { name: entry.name });
        }
        if let Some(missing) = entry
            .interfaces
            .iter()
            .find(|hash| !self.types.contains_key(hash))
        {
            return Err(RegistrationError::UnknownInterface {
                name: entry.name,
                interface: *missing,
            });
        }

        let hash = entry.type_hash;
        self.names.insert(entry.name.clone(), hash);
        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// Look up a type by name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.names.get(name).and_then(|hash| self.types.get(hash))
    }

    /// The object data type registered under `name`.
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.get_by_name(name).map(TypeEntry::data_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeLookup for TypeRegistry {
    fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }
}
