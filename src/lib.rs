//! Fluent, precedence-aware construction of typed expression trees.
//!
//! A host registers its types in a [`TypeRegistry`] (or implements
//! [`TypeLookup`] over its own type system), then feeds grammar steps to a
//! [`BodyBuilder`] or to the typestate surface started by [`Flex`]. The
//! builder groups operators by precedence, type-checks every node and
//! produces an immutable tree or a [`Lambda`], which the reference
//! [`Interpreter`] can evaluate.
//!
//! # Example
//!
//! ```
//! use flexpr::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! let signature = Signature::new(DataType::Int32, vec![DataType::Int32]);
//! let lambda = Flex::start_lambda(&registry, &signature, &["x"])
//!     .and_then(|s| s.var("x"))
//!     .and_then(|s| s.multiply())
//!     .and_then(|s| s.constant(2))
//!     .and_then(|s| s.add())
//!     .and_then(|s| s.constant(1))
//!     .and_then(|s| s.end_statement())
//!     .and_then(|s| s.complete_lambda())
//!     .unwrap();
//!
//! let result = Interpreter::new(&registry).invoke(&lambda, &[Value::Int32(20)]);
//! assert_eq!(result, Ok(Value::Int32(41)));
//! ```

mod interpreter;

pub use flexpr_builder as builder;
pub use flexpr_core as core;
pub use flexpr_registry as registry;

pub use flexpr_builder::{BodyBuilder, Flex, Lambda, NodeRef, Signature};
pub use flexpr_core::{BuildError, DataType, FlexprError, RuntimeError, Value};
pub use flexpr_registry::{TypeLookup, TypeRegistry};
pub use interpreter::Interpreter;

// Re-export main types
pub mod prelude {
    pub use crate::interpreter::Interpreter;
    pub use flexpr_builder::{
        ArgumentListStarter, BodyBuilder, ExpressionExpander, Flex, Lambda, Node, NodeKind,
        NodeRef, OperandStart, OperandStarter, Signature, StatementStarter,
    };
    pub use flexpr_core::{
        BuildError, ConstructorEntry, DataType, FieldEntry, FlexprError, IndexerEntry,
        MethodEntry, NativeFn, ObjectRef, PropertyEntry, RuntimeError, ScriptObject, TypeEntry,
        TypeHash, Value,
    };
    pub use flexpr_registry::{TypeLookup, TypeRegistry};
}
