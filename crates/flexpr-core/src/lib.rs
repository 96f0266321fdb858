//! Core types shared by the flexpr crates.
//!
//! This crate provides:
//! - [`TypeHash`] - deterministic hash-based type identity
//! - [`DataType`] - the static type carried by every tree node
//! - [`Value`] / [`ScriptObject`] - runtime values and host objects
//! - Type and member entries ([`TypeEntry`], [`MethodEntry`], ...)
//! - [`NativeFn`] - host implementations of members
//! - Error types for registration, building and evaluation

mod data_type;
mod entries;
mod error;
mod native_fn;
mod type_hash;
mod value;

pub use data_type::DataType;
pub use entries::{
    ConstructorEntry, FieldEntry, IndexerEntry, MemberFlags, MethodEntry, PropertyEntry,
    TypeEntry, TypeKind,
};
pub use error::{BuildError, FlexprError, MemberKind, RegistrationError, RuntimeError};
pub use native_fn::NativeFn;
pub use type_hash::{TypeHash, hash_constants};
pub use value::{ObjectRef, ScriptObject, Value};
