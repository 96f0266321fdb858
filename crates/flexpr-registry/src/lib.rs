//! Type registry and member resolution.
//!
//! - [`TypeLookup`]: the capability a host type system must provide
//! - [`TypeRegistry`]: the default, map-backed implementation
//! - [`lookup`]: resolution of methods, constructors, indexers, fields and
//!   properties to a single member handle

pub mod lookup;
mod registry;

pub use lookup::{
    format_signature, resolve_constructor, resolve_field, resolve_indexer, resolve_method,
    resolve_property, resolve_static_method,
};
pub use registry::{TypeLookup, TypeRegistry};
