//! Typed tree nodes.
//!
//! Nodes are immutable once constructed and shared through [`NodeRef`].
//! Every node carries the static [`DataType`] of the value it produces.
//!
//! Nodes are created through [`NodeFactory`](super::NodeFactory), which
//! validates operand types; the fields here are read-only views for
//! consumers such as an interpreter or a code generator.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use flexpr_core::{
    ConstructorEntry, DataType, FieldEntry, IndexerEntry, MethodEntry, PropertyEntry, Value,
};

use super::ops::{AssignOp, BinaryOp, PostfixOp, UnaryOp};

/// Shared handle to a node.
pub type NodeRef = Arc<Node>;

/// Identity of a parameter or block variable within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

/// A parameter or a declared block variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub data_type: DataType,
}

/// A typed tree node.
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    data_type: DataType,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, data_type: DataType) -> NodeRef {
        Arc::new(Self { kind, data_type })
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The static type of the value this node produces.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Whether this node denotes a location that can be written.
    pub fn is_writable(&self) -> bool {
        match &self.kind {
            NodeKind::Variable(_) => true,
            NodeKind::Field { field, .. } => !field.is_read_only(),
            NodeKind::Property { property, .. } => property.setter.is_some(),
            NodeKind::Index { indexer, .. } => indexer.setter.is_some(),
            _ => false,
        }
    }
}

/// The kind of node.
#[derive(Debug)]
pub enum NodeKind {
    /// A constant value (also typed nulls and default values)
    Constant(Value),
    /// A parameter or block variable
    Variable(Arc<Variable>),
    /// `target.field`
    Field {
        target: NodeRef,
        field: Arc<FieldEntry>,
    },
    /// `target.property`
    Property {
        target: NodeRef,
        property: Arc<PropertyEntry>,
    },
    /// Prefix operation
    Unary { op: UnaryOp, operand: NodeRef },
    /// Postfix increment or decrement
    Postfix { op: PostfixOp, operand: NodeRef },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: NodeRef,
        right: NodeRef,
    },
    /// `operand is T`
    TypeIs { operand: NodeRef, target: DataType },
    /// `operand as T`
    TypeAs { operand: NodeRef, target: DataType },
    /// Simple or compound assignment
    Assign {
        op: AssignOp,
        target: NodeRef,
        value: NodeRef,
    },
    /// `condition ? if_true : if_false`
    Conditional {
        condition: NodeRef,
        if_true: NodeRef,
        if_false: NodeRef,
    },
    /// Method call; `target` is `None` for static methods
    Call {
        target: Option<NodeRef>,
        method: Arc<MethodEntry>,
        args: Vec<NodeRef>,
    },
    /// Object construction
    New {
        constructor: Arc<ConstructorEntry>,
        args: Vec<NodeRef>,
    },
    /// `target[args]`
    Index {
        target: NodeRef,
        indexer: Arc<IndexerEntry>,
        args: Vec<NodeRef>,
    },
    /// Statement block with its declared variables
    Block {
        variables: Vec<Arc<Variable>>,
        statements: Vec<NodeRef>,
    },
    /// No operation
    Empty,
}

fn write_args(f: &mut Formatter<'_>, args: &[NodeRef]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

/// Fully bracketed rendering, so two trees print alike only if they group
/// alike.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Constant(value) => write!(f, "{:?}", value),
            NodeKind::Variable(var) => write!(f, "{}", var.name),
            NodeKind::Field { target, field } => write!(f, "{}.{}", target, field.name),
            NodeKind::Property { target, property } => write!(f, "{}.{}", target, property.name),
            NodeKind::Unary { op, operand } => write!(f, "({}{})", op, operand),
            NodeKind::Postfix { op, operand } => write!(f, "({}{})", operand, op),
            NodeKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            NodeKind::TypeIs { operand, target } => write!(f, "({} is {})", operand, target),
            NodeKind::TypeAs { operand, target } => write!(f, "({} as {})", operand, target),
            NodeKind::Assign { op, target, value } => write!(f, "({} {} {})", target, op, value),
            NodeKind::Conditional {
                condition,
                if_true,
                if_false,
            } => write!(f, "({} ? {} : {})", condition, if_true, if_false),
            NodeKind::Call {
                target,
                method,
                args,
            } => {
                if let Some(target) = target {
                    write!(f, "{}.", target)?;
                }
                write!(f, "{}(", method.name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            NodeKind::New { args, .. } => {
                write!(f, "new {}(", self.data_type)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            NodeKind::Index { target, args, .. } => {
                write!(f, "{}[", target)?;
                write_args(f, args)?;
                write!(f, "]")
            }
            NodeKind::Block { statements, .. } => {
                write!(f, "{{")?;
                for statement in statements {
                    write!(f, " {};", statement)?;
                }
                write!(f, " }}")
            }
            NodeKind::Empty => write!(f, "()"),
        }
    }
}
