//! DataType - the static type carried by every node and value.
//!
//! Primitive types are enum variants; every registered class or interface is
//! an [`DataType::Object`] identified by its [`TypeHash`].
//!
//! # Example
//!
//! ```
//! use flexpr_core::{DataType, TypeHash};
//!
//! assert!(DataType::Int32.is_integral());
//! assert!(DataType::String.is_reference());
//! assert!(DataType::Object(TypeHash::from_name("Stuff")).is_reference());
//! ```

use std::fmt::{self, Display, Formatter};

use crate::TypeHash;

/// A complete static type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No value
    Void,
    /// `bool`
    Bool,
    /// `int` (32-bit signed)
    Int32,
    /// `uint` (32-bit unsigned)
    UInt32,
    /// `long` (64-bit signed)
    Int64,
    /// `double`
    Double,
    /// `string`
    String,
    /// The type of an untyped `null` constant
    Null,
    /// A registered class or interface
    Object(TypeHash),
}

impl DataType {
    /// Whether values of this type are references (and so may be null).
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::String | Self::Null | Self::Object(_))
    }

    /// Whether this is one of the integer types.
    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Int32 | Self::UInt32 | Self::Int64)
    }

    /// Whether this is an integer or floating point type.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, Self::Double)
    }

    /// Whether this is a numeric type that can be negated.
    #[inline]
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Double)
    }

    /// The built-in name of a primitive type, `None` for registered types.
    pub fn primitive_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Null => "null",
            Self::Object(_) => return None,
        })
    }

    /// The hash under which members of this type are registered.
    ///
    /// Primitives map to the hash of their built-in name, so a host may
    /// register members on `string` or `int` like on any class.
    pub fn lookup_hash(&self) -> TypeHash {
        match self {
            Self::Object(hash) => *hash,
            other => TypeHash::from_name(other.primitive_name().unwrap_or_default()),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.primitive_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.lookup_hash()),
        }
    }
}
