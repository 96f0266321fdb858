//! Node construction with operand type checking.
//!
//! [`NodeFactory`] is the only way to create [`Node`]s. Each constructor
//! validates its operands against the operator or member it applies and
//! fails with `TypeMismatch` / `NotAssignable` instead of producing a tree
//! that could not be evaluated.

use std::sync::Arc;

use flexpr_core::{
    BuildError, ConstructorEntry, DataType, FieldEntry, IndexerEntry, MethodEntry, PropertyEntry,
    Value,
};
use flexpr_registry::TypeLookup;

use super::node::{Node, NodeKind, NodeRef, Variable};
use super::ops::{AssignOp, BinaryOp, PostfixOp, UnaryOp};

/// Creates type-checked nodes against a host type system.
#[derive(Clone, Copy)]
pub struct NodeFactory<'a> {
    lookup: &'a dyn TypeLookup,
}

impl<'a> NodeFactory<'a> {
    pub fn new(lookup: &'a dyn TypeLookup) -> Self {
        Self { lookup }
    }

    #[inline]
    pub fn lookup(&self) -> &'a dyn TypeLookup {
        self.lookup
    }

    fn name(&self, data_type: DataType) -> String {
        self.lookup.type_name(data_type)
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    /// A constant typed by its value.
    pub fn constant(&self, value: Value) -> NodeRef {
        let data_type = value.data_type();
        Node::new(NodeKind::Constant(value), data_type)
    }

    /// A constant with an explicit static type.
    pub fn typed_constant(&self, value: Value, data_type: DataType) -> Result<NodeRef, BuildError> {
        let value_type = value.data_type();
        if !self.lookup.is_assignable(value_type, data_type) {
            return Err(BuildError::type_mismatch(format!(
                "constant of type '{}' cannot be typed as '{}'",
                self.name(value_type),
                self.name(data_type)
            )));
        }
        Ok(Node::new(NodeKind::Constant(value), data_type))
    }

    /// The default value of a type: zero, `false` or a typed null.
    pub fn default_value(&self, data_type: DataType) -> Result<NodeRef, BuildError> {
        if data_type == DataType::Void {
            return Err(BuildError::type_mismatch("'void' has no default value"));
        }
        Ok(Node::new(
            NodeKind::Constant(Value::default_of(data_type)),
            data_type,
        ))
    }

    pub fn variable(&self, variable: Arc<Variable>) -> NodeRef {
        let data_type = variable.data_type;
        Node::new(NodeKind::Variable(variable), data_type)
    }

    pub fn empty(&self) -> NodeRef {
        Node::new(NodeKind::Empty, DataType::Void)
    }

    /// A block typed by its last statement.
    pub fn block(&self, variables: Vec<Arc<Variable>>, statements: Vec<NodeRef>) -> NodeRef {
        let data_type = statements
            .last()
            .map(|s| s.data_type())
            .unwrap_or(DataType::Void);
        Node::new(
            NodeKind::Block {
                variables,
                statements,
            },
            data_type,
        )
    }

    // =========================================================================
    // Member access
    // =========================================================================

    pub fn field(&self, target: NodeRef, field: Arc<FieldEntry>) -> NodeRef {
        let data_type = field.data_type;
        Node::new(NodeKind::Field { target, field }, data_type)
    }

    pub fn property(&self, target: NodeRef, property: Arc<PropertyEntry>) -> NodeRef {
        let data_type = property.data_type;
        Node::new(NodeKind::Property { target, property }, data_type)
    }

    /// Instance or static method call. Static methods take no target.
    pub fn call(
        &self,
        target: Option<NodeRef>,
        method: Arc<MethodEntry>,
        args: Vec<NodeRef>,
    ) -> Result<NodeRef, BuildError> {
        match (&target, method.is_static()) {
            (Some(_), true) => {
                return Err(BuildError::type_mismatch(format!(
                    "static method '{}' cannot be called on an instance",
                    method.name
                )));
            }
            (None, false) => {
                return Err(BuildError::type_mismatch(format!(
                    "instance method '{}' requires a target",
                    method.name
                )));
            }
            _ => {}
        }
        self.check_arguments(&method.name, &method.params, &args)?;
        let data_type = method.return_type;
        Ok(Node::new(
            NodeKind::Call {
                target,
                method,
                args,
            },
            data_type,
        ))
    }

    pub fn new_object(
        &self,
        data_type: DataType,
        constructor: Arc<ConstructorEntry>,
        args: Vec<NodeRef>,
    ) -> Result<NodeRef, BuildError> {
        self.check_arguments(&self.name(data_type), &constructor.params, &args)?;
        Ok(Node::new(NodeKind::New { constructor, args }, data_type))
    }

    pub fn index(
        &self,
        target: NodeRef,
        indexer: Arc<IndexerEntry>,
        args: Vec<NodeRef>,
    ) -> Result<NodeRef, BuildError> {
        self.check_arguments("this", &indexer.params, &args)?;
        let data_type = indexer.data_type;
        Ok(Node::new(
            NodeKind::Index {
                target,
                indexer,
                args,
            },
            data_type,
        ))
    }

    fn check_arguments(
        &self,
        member: &str,
        params: &[DataType],
        args: &[NodeRef],
    ) -> Result<(), BuildError> {
        if params.len() != args.len() {
            return Err(BuildError::type_mismatch(format!(
                "'{}' takes {} argument(s) but {} were supplied",
                member,
                params.len(),
                args.len()
            )));
        }
        for (position, (param, arg)) in params.iter().zip(args).enumerate() {
            if !self.lookup.is_assignable(arg.data_type(), *param) {
                return Err(BuildError::type_mismatch(format!(
                    "argument {} of '{}' expects '{}', found '{}'",
                    position + 1,
                    member,
                    self.name(*param),
                    self.name(arg.data_type())
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub fn unary(&self, op: UnaryOp, operand: NodeRef) -> Result<NodeRef, BuildError> {
        let ty = operand.data_type();
        let valid = match op {
            UnaryOp::Negate => ty.is_signed(),
            UnaryOp::LogicalNot => ty == DataType::Bool,
            UnaryOp::BitwiseNot => ty.is_integral(),
            UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                self.require_writable(&operand, &op.to_string())?;
                ty.is_numeric()
            }
            UnaryOp::Convert(target) => {
                return self.convert(operand, target);
            }
        };
        if !valid {
            return Err(BuildError::type_mismatch(format!(
                "operator '{}' cannot be applied to '{}'",
                op,
                self.name(ty)
            )));
        }
        Ok(Node::new(NodeKind::Unary { op, operand }, ty))
    }

    fn convert(&self, operand: NodeRef, target: DataType) -> Result<NodeRef, BuildError> {
        let from = operand.data_type();
        let valid = from == target
            || (from.is_numeric() && target.is_numeric())
            || (from.is_reference() && target.is_reference() && target != DataType::Null);
        if !valid {
            return Err(BuildError::type_mismatch(format!(
                "no conversion from '{}' to '{}'",
                self.name(from),
                self.name(target)
            )));
        }
        Ok(Node::new(
            NodeKind::Unary {
                op: UnaryOp::Convert(target),
                operand,
            },
            target,
        ))
    }

    pub fn postfix(&self, op: PostfixOp, operand: NodeRef) -> Result<NodeRef, BuildError> {
        self.require_writable(&operand, &op.to_string())?;
        let ty = operand.data_type();
        if !ty.is_numeric() {
            return Err(BuildError::type_mismatch(format!(
                "operator '{}' cannot be applied to '{}'",
                op,
                self.name(ty)
            )));
        }
        Ok(Node::new(NodeKind::Postfix { op, operand }, ty))
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        left: NodeRef,
        right: NodeRef,
    ) -> Result<NodeRef, BuildError> {
        let data_type = self.binary_result(op, left.data_type(), right.data_type())?;
        Ok(Node::new(NodeKind::Binary { op, left, right }, data_type))
    }

    /// The result type of `left op right`.
    fn binary_result(
        &self,
        op: BinaryOp,
        left: DataType,
        right: DataType,
    ) -> Result<DataType, BuildError> {
        use BinaryOp::*;
        let result = match op {
            Mul | Div | Mod | Add | Sub if left == right && left.is_numeric() => Some(left),
            ShiftLeft | ShiftRight if left.is_integral() && right == DataType::Int32 => Some(left),
            Less | LessEqual | Greater | GreaterEqual if left == right && left.is_numeric() => {
                Some(DataType::Bool)
            }
            Equal | NotEqual if self.comparable(left, right) => Some(DataType::Bool),
            BitwiseAnd | BitwiseXor | BitwiseOr
                if left == right && (left.is_integral() || left == DataType::Bool) =>
            {
                Some(left)
            }
            LogicalAnd | LogicalOr if left == DataType::Bool && right == DataType::Bool => {
                Some(DataType::Bool)
            }
            _ => None,
        };
        result.ok_or_else(|| {
            BuildError::type_mismatch(format!(
                "operator '{}' is not defined for '{}' and '{}'",
                op,
                self.name(left),
                self.name(right)
            ))
        })
    }

    fn comparable(&self, left: DataType, right: DataType) -> bool {
        left == right
            || (left.is_reference()
                && right.is_reference()
                && (self.lookup.is_assignable(left, right) || self.lookup.is_assignable(right, left)))
    }

    pub fn type_is(&self, operand: NodeRef, target: DataType) -> Result<NodeRef, BuildError> {
        if operand.data_type() == DataType::Void {
            return Err(BuildError::type_mismatch("'is' cannot test a void expression"));
        }
        Ok(Node::new(NodeKind::TypeIs { operand, target }, DataType::Bool))
    }

    pub fn type_as(&self, operand: NodeRef, target: DataType) -> Result<NodeRef, BuildError> {
        if !target.is_reference() || target == DataType::Null {
            return Err(BuildError::type_mismatch(format!(
                "'as' requires a reference type, found '{}'",
                self.name(target)
            )));
        }
        if operand.data_type() == DataType::Void {
            return Err(BuildError::type_mismatch("'as' cannot convert a void expression"));
        }
        Ok(Node::new(NodeKind::TypeAs { operand, target }, target))
    }

    /// `condition ? if_true : if_false`, typed by the branch the other
    /// converts to.
    pub fn conditional(
        &self,
        condition: NodeRef,
        if_true: NodeRef,
        if_false: NodeRef,
    ) -> Result<NodeRef, BuildError> {
        if condition.data_type() != DataType::Bool {
            return Err(BuildError::type_mismatch(format!(
                "condition must be 'bool', found '{}'",
                self.name(condition.data_type())
            )));
        }
        let then_type = if_true.data_type();
        let else_type = if_false.data_type();
        let data_type = if self.lookup.is_assignable(else_type, then_type) {
            then_type
        } else if self.lookup.is_assignable(then_type, else_type) {
            else_type
        } else {
            return Err(BuildError::type_mismatch(format!(
                "conditional branches have incompatible types: '{}' and '{}'",
                self.name(then_type),
                self.name(else_type)
            )));
        };
        Ok(Node::new(
            NodeKind::Conditional {
                condition,
                if_true,
                if_false,
            },
            data_type,
        ))
    }

    pub fn assign(
        &self,
        op: AssignOp,
        target: NodeRef,
        value: NodeRef,
    ) -> Result<NodeRef, BuildError> {
        self.require_writable(&target, &op.to_string())?;
        let target_type = target.data_type();
        let value_type = value.data_type();

        match op.binary_op() {
            None => {
                if !self.lookup.is_assignable(value_type, target_type) {
                    return Err(BuildError::type_mismatch(format!(
                        "cannot assign '{}' to '{}'",
                        self.name(value_type),
                        self.name(target_type)
                    )));
                }
            }
            Some(binary) => {
                if self.binary_result(binary, target_type, value_type)? != target_type {
                    return Err(BuildError::type_mismatch(format!(
                        "operator '{}' does not yield '{}'",
                        op,
                        self.name(target_type)
                    )));
                }
            }
        }
        Ok(Node::new(NodeKind::Assign { op, target, value }, target_type))
    }

    fn require_writable(&self, node: &NodeRef, op: &str) -> Result<(), BuildError> {
        if node.is_writable() {
            Ok(())
        } else {
            Err(BuildError::not_assignable(format!(
                "operand of '{}' must be a variable, writable field, property or indexer: {}",
                op, node
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::VariableId;
    use flexpr_registry::TypeRegistry;

    fn var(name: &str, data_type: DataType) -> Arc<Variable> {
        Arc::new(Variable {
            id: VariableId(0),
            name: name.into(),
            data_type,
        })
    }

    #[test]
    fn arithmetic_requires_matching_numeric_types() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);

        let sum = factory
            .binary(
                BinaryOp::Add,
                factory.constant(Value::Int32(1)),
                factory.constant(Value::Int32(2)),
            )
            .unwrap();
        assert_eq!(sum.data_type(), DataType::Int32);
        assert_eq!(sum.to_string(), "(1 + 2)");

        let err = factory
            .binary(
                BinaryOp::Add,
                factory.constant(Value::Int32(1)),
                factory.constant(Value::Int64(2)),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn relational_on_bool_fails() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let err = factory
            .binary(
                BinaryOp::Greater,
                factory.constant(Value::Int32(42)),
                factory.constant(Value::Bool(true)),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn shift_count_is_int() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let node = factory
            .binary(
                BinaryOp::ShiftLeft,
                factory.constant(Value::Int64(1)),
                factory.constant(Value::Int32(3)),
            )
            .unwrap();
        assert_eq!(node.data_type(), DataType::Int64);
    }

    #[test]
    fn assignment_requires_writable_target() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let x = factory.variable(var("x", DataType::Int32));
        let y = factory.variable(var("y", DataType::Int32));

        let inner = factory.assign(AssignOp::Assign, x, y).unwrap();
        let err = factory
            .assign(AssignOp::Assign, inner, factory.constant(Value::Int32(2)))
            .unwrap_err();
        assert!(matches!(err, BuildError::NotAssignable { .. }));

        let err = factory
            .unary(UnaryOp::PreIncrement, factory.constant(Value::Int32(2)))
            .unwrap_err();
        assert!(matches!(err, BuildError::NotAssignable { .. }));
    }

    #[test]
    fn compound_assignment_checks_operator() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let flag = factory.variable(var("flag", DataType::Bool));
        assert!(
            factory
                .assign(AssignOp::XorAssign, flag.clone(), factory.constant(Value::Bool(true)))
                .is_ok()
        );
        let err = factory
            .assign(AssignOp::AddAssign, flag, factory.constant(Value::Bool(true)))
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn conditional_unifies_null_branch() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let node = factory
            .conditional(
                factory.constant(Value::Bool(true)),
                factory.constant(Value::string("a")),
                factory.constant(Value::Null),
            )
            .unwrap();
        assert_eq!(node.data_type(), DataType::String);

        let err = factory
            .conditional(
                factory.constant(Value::Int32(1)),
                factory.constant(Value::Int32(1)),
                factory.constant(Value::Int32(2)),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn conversions() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        let node = factory
            .unary(
                UnaryOp::Convert(DataType::Int32),
                factory.constant(Value::UInt32(u32::MAX)),
            )
            .unwrap();
        assert_eq!(node.data_type(), DataType::Int32);
        assert!(
            factory
                .unary(
                    UnaryOp::Convert(DataType::Int32),
                    factory.constant(Value::string("s"))
                )
                .is_err()
        );
        assert!(
            factory
                .type_as(factory.constant(Value::string("s")), DataType::Int32)
                .is_err()
        );
    }

    #[test]
    fn typed_constants() {
        let registry = TypeRegistry::new();
        let factory = NodeFactory::new(&registry);
        assert_eq!(
            factory
                .typed_constant(Value::Null, DataType::String)
                .unwrap()
                .data_type(),
            DataType::String
        );
        assert!(factory.typed_constant(Value::Null, DataType::Int32).is_err());
        assert_eq!(
            factory.default_value(DataType::Int64).unwrap().to_string(),
            "0L"
        );
    }
}
