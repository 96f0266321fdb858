//! Flexpr builder crate.
//!
//! Builds typed expression trees from a flat sequence of grammar steps,
//! grouping operators by precedence the way a parser would.
//! It includes:
//! - The typed tree and its type-checking factory ([`ast`])
//! - Per-context pending operations resolved by precedence ([`resolver`])
//! - Scopes and statement lists ([`block`])
//! - The step-by-step [`BodyBuilder`]
//! - A typestate fluent surface over it ([`fluent`])
//!
//! # Example
//!
//! ```
//! use flexpr_builder::BodyBuilder;
//! use flexpr_core::DataType;
//! use flexpr_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//! let mut builder = BodyBuilder::expression(&registry, DataType::Int32);
//! builder.constant(1).unwrap();
//! builder.add().unwrap();
//! builder.constant(2).unwrap();
//! builder.multiply().unwrap();
//! builder.constant(3).unwrap();
//! builder.end_statement().unwrap();
//!
//! let tree = builder.complete().unwrap();
//! assert_eq!(tree.to_string(), "(1 + (2 * 3))");
//! ```

pub mod ast;
pub mod block;
pub mod builder;
pub mod fluent;
pub mod lambda;
pub mod resolver;

// Re-export commonly used types at crate root
pub use ast::{
    AssignOp, BinaryOp, Node, NodeFactory, NodeKind, NodeRef, PostfixOp, Precedence, UnaryOp,
    Variable, VariableId,
};
pub use builder::BodyBuilder;
pub use fluent::{
    ArgumentListStarter, ExpressionExpander, Flex, OperandStart, OperandStarter, StatementStarter,
};
pub use lambda::{Lambda, Signature};
