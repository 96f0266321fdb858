//! Typed expression tree.
//!
//! - [`ops`]: operator enums and precedence layers
//! - [`node`]: the immutable [`Node`] graph
//! - [`factory`]: type-checked node construction

pub mod factory;
pub mod node;
pub mod ops;

pub use factory::NodeFactory;
pub use node::{Node, NodeKind, NodeRef, Variable, VariableId};
pub use ops::{AssignOp, BinaryOp, PostfixOp, Precedence, UnaryOp};
