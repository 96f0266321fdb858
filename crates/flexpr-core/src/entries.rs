//! Host type and member entries.
//!
//! A [`TypeEntry`] is the candidate list the member resolution walks: its
//! fields, properties, methods, constructors and indexers. Members are held
//! behind `Arc` so a resolved member can be stored in a tree node as a
//! cheap, immutable handle.

use std::sync::Arc;

use bitflags::bitflags;

use crate::{DataType, NativeFn, TypeHash};

bitflags! {
    /// Modifiers shared by member entries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u8 {
        /// Member belongs to the type, not to an instance.
        const STATIC = 0b0000_0001;
        /// Field cannot be assigned after construction.
        const READ_ONLY = 0b0000_0010;
    }
}

/// A data field stored in the object's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub name: String,
    pub data_type: DataType,
    pub flags: MemberFlags,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            flags: MemberFlags::empty(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.flags |= MemberFlags::READ_ONLY;
        self
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(MemberFlags::READ_ONLY)
    }
}

/// A virtual property backed by accessor functions.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    pub name: String,
    pub data_type: DataType,
    pub getter: Option<NativeFn>,
    pub setter: Option<NativeFn>,
}

impl PropertyEntry {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            getter: None,
            setter: None,
        }
    }

    pub fn with_getter(mut self, getter: NativeFn) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_setter(mut self, setter: NativeFn) -> Self {
        self.setter = Some(setter);
        self
    }
}

/// A method. Interface methods carry no native body and are dispatched to
/// the receiver's concrete type at evaluation time.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    pub flags: MemberFlags,
    pub native: Option<NativeFn>,
}

impl MethodEntry {
    pub fn new(name: impl Into<String>, params: Vec<DataType>, return_type: DataType) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            flags: MemberFlags::empty(),
            native: None,
        }
    }

    pub fn with_native(mut self, native: NativeFn) -> Self {
        self.native = Some(native);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.flags |= MemberFlags::STATIC;
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }
}

/// A constructor. The native function receives `Value::Null` as receiver
/// and returns the new object.
#[derive(Debug, Clone)]
pub struct ConstructorEntry {
    pub params: Vec<DataType>,
    pub native: NativeFn,
}

impl ConstructorEntry {
    pub fn new(params: Vec<DataType>, native: NativeFn) -> Self {
        Self { params, native }
    }
}

/// An indexer (`obj[a, b]`). The setter receives the index arguments
/// followed by the assigned value.
#[derive(Debug, Clone)]
pub struct IndexerEntry {
    pub params: Vec<DataType>,
    pub data_type: DataType,
    pub getter: Option<NativeFn>,
    pub setter: Option<NativeFn>,
}

impl IndexerEntry {
    pub fn new(params: Vec<DataType>, data_type: DataType) -> Self {
        Self {
            params,
            data_type,
            getter: None,
            setter: None,
        }
    }

    pub fn with_getter(mut self, getter: NativeFn) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn with_setter(mut self, setter: NativeFn) -> Self {
        self.setter = Some(setter);
        self
    }
}

/// Whether a type is a concrete class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Registry entry for a host type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    /// Type name.
    pub name: String,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    pub kind: TypeKind,

    // === Inheritance ===
    /// Implemented (for classes) or extended (for interfaces) interfaces.
    pub interfaces: Vec<TypeHash>,

    // === Members ===
    pub fields: Vec<Arc<FieldEntry>>,
    pub properties: Vec<Arc<PropertyEntry>>,
    pub methods: Vec<Arc<MethodEntry>>,
    pub constructors: Vec<Arc<ConstructorEntry>>,
    pub indexers: Vec<Arc<IndexerEntry>>,
}

impl TypeEntry {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            kind,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            indexers: Vec::new(),
        }
    }

    /// Create a class entry.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Create an interface entry.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Create an entry holding members of a primitive type such as `string`.
    pub fn primitive(data_type: DataType) -> Self {
        let mut entry = Self::new(data_type.to_string(), TypeKind::Class);
        entry.type_hash = data_type.lookup_hash();
        entry
    }

    /// The object type described by this entry.
    #[inline]
    pub fn data_type(&self) -> DataType {
        DataType::Object(self.type_hash)
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    // === Builder Methods ===

    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_field(mut self, field: FieldEntry) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    pub fn with_property(mut self, property: PropertyEntry) -> Self {
        self.properties.push(Arc::new(property));
        self
    }

    pub fn with_method(mut self, method: MethodEntry) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorEntry) -> Self {
        self.constructors.push(Arc::new(constructor));
        self
    }

    pub fn with_indexer(mut self, indexer: IndexerEntry) -> Self {
        self.indexers.push(Arc::new(indexer));
        self
    }
}
