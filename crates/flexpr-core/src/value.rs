//! Runtime values.
//!
//! [`Value`] is used both for constants embedded in a tree and for the
//! results of evaluating one. Host objects are [`ScriptObject`]s shared
//! through [`ObjectRef`]; their state lives behind locks so a finished tree
//! holding object constants stays `Send + Sync`.

use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{DataType, TypeHash};

/// Shared handle to a host object.
pub type ObjectRef = Arc<ScriptObject>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// Result of a void expression
    Void,
    /// A null reference
    Null,
    /// `bool`
    Bool(bool),
    /// `int`
    Int32(i32),
    /// `uint`
    UInt32(u32),
    /// `long`
    Int64(i64),
    /// `double`
    Double(OrderedFloat<f64>),
    /// `string`
    String(Arc<str>),
    /// Host object
    Object(ObjectRef),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Self::String(s.into())
    }

    /// Create a double value.
    pub fn double(d: f64) -> Self {
        Self::Double(OrderedFloat(d))
    }

    /// The static type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Void => DataType::Void,
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Int32(_) => DataType::Int32,
            Self::UInt32(_) => DataType::UInt32,
            Self::Int64(_) => DataType::Int64,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
            Self::Object(obj) => DataType::Object(obj.type_hash()),
        }
    }

    /// The default value of a type: zero, `false` or null.
    pub fn default_of(data_type: DataType) -> Self {
        match data_type {
            DataType::Void => Self::Void,
            DataType::Bool => Self::Bool(false),
            DataType::Int32 => Self::Int32(0),
            DataType::UInt32 => Self::UInt32(0),
            DataType::Int64 => Self::Int64(0),
            DataType::Double => Self::double(0.0),
            DataType::String | DataType::Null | DataType::Object(_) => Self::Null,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural for primitives and strings, identity for objects.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int32(i) => write!(f, "{}", i),
            Self::UInt32(i) => write!(f, "{}u", i),
            Self::Int64(i) => write!(f, "{}L", i),
            Self::Double(d) => write!(f, "{:?}", d.0),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Object(obj) => write!(f, "object@{}", obj.type_hash()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::UInt32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

/// A host object: named field slots plus an element list for
/// collection-like types.
pub struct ScriptObject {
    type_hash: TypeHash,
    fields: RwLock<FxHashMap<String, Value>>,
    elements: RwLock<Vec<Value>>,
}

impl ScriptObject {
    /// Create an empty object of the given registered type.
    pub fn new(type_hash: TypeHash) -> ObjectRef {
        Arc::new(Self {
            type_hash,
            fields: RwLock::new(FxHashMap::default()),
            elements: RwLock::new(Vec::new()),
        })
    }

    /// Create an object with initial field values.
    pub fn with_fields<I, K>(type_hash: TypeHash, fields: I) -> ObjectRef
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let obj = Self::new(type_hash);
        {
            let mut slots = obj.fields.write();
            for (name, value) in fields {
                slots.insert(name.into(), value);
            }
        }
        obj
    }

    #[inline]
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Read a field, `None` if it was never written.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.write().insert(name.to_string(), value);
    }

    /// Snapshot of the element list.
    pub fn elements(&self) -> Vec<Value> {
        self.elements.read().clone()
    }

    pub fn element(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    pub fn push_element(&self, value: Value) {
        self.elements.write().push(value);
    }

    pub fn clear_elements(&self) {
        self.elements.write().clear();
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject")
            .field("type_hash", &self.type_hash)
            .finish_non_exhaustive()
    }
}
