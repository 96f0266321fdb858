//! The builder orchestrator.
//!
//! [`BodyBuilder`] exposes one operation per grammar construct. It keeps a
//! single "current fragment" (the operand built so far) and routes every
//! operator to the innermost resolver context of the current block.
//!
//! ```text
//! 72 | 399 ^ 131 & 5 << 1 + 2 * 3
//!
//! constant(72) bitwise_or() constant(399) bitwise_xor() constant(131)
//! bitwise_and() constant(5) shift_left() constant(1) add() constant(2)
//! multiply() constant(3) end_statement()
//! ```
//!
//! Operators never need pre-grouped operands: each binary operator first
//! collapses everything pending up to its own layer, so the tree groups as a
//! precedence-climbing parser would group the equivalent source text.
//!
//! After any operation returns an error the builder is in an unspecified
//! state and must be dropped.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use flexpr_core::{BuildError, DataType, Value};
use flexpr_registry::{
    TypeLookup, resolve_constructor, resolve_field, resolve_indexer, resolve_method,
    resolve_property, resolve_static_method,
};

use crate::ast::{
    AssignOp, BinaryOp, NodeFactory, NodeRef, PostfixOp, Precedence, UnaryOp, Variable,
    VariableId,
};
use crate::block::{ContextKind, StatementBlock};
use crate::lambda::{Lambda, Signature};
use crate::resolver::{PrimaryAction, Resolved};

/// Builds the body of a lambda one grammar step at a time.
pub struct BodyBuilder<'a> {
    factory: NodeFactory<'a>,
    parameters: Vec<Arc<Variable>>,
    return_type: DataType,

    /// The innermost open block.
    current: StatementBlock,
    /// Enclosing blocks, innermost last.
    outer: Vec<StatementBlock>,

    fragment: Option<NodeRef>,
    /// A call, construction or indexing was just started and its argument
    /// list has not been entered yet.
    args_opened: bool,
    next_variable: u32,
}

impl<'a> BodyBuilder<'a> {
    /// Create a builder for a lambda with named parameters.
    pub fn new(
        lookup: &'a dyn TypeLookup,
        signature: &Signature,
        names: &[&str],
    ) -> Result<Self, BuildError> {
        let parameters = signature.bind(names)?;
        let mut known = FxHashMap::default();
        for parameter in &parameters {
            if known
                .insert(parameter.name.clone(), parameter.clone())
                .is_some()
            {
                return Err(BuildError::DuplicateDeclaration {
                    name: parameter.name.clone(),
                });
            }
        }

        Ok(Self {
            factory: NodeFactory::new(lookup),
            next_variable: parameters.len() as u32,
            parameters,
            return_type: signature.return_type,
            current: StatementBlock::new(known),
            outer: Vec::new(),
            fragment: None,
            args_opened: false,
        })
    }

    /// Create a builder for a parameterless lambda returning `return_type`.
    pub fn expression(lookup: &'a dyn TypeLookup, return_type: DataType) -> Self {
        Self {
            factory: NodeFactory::new(lookup),
            parameters: Vec::new(),
            return_type,
            current: StatementBlock::new(FxHashMap::default()),
            outer: Vec::new(),
            fragment: None,
            args_opened: false,
            next_variable: 0,
        }
    }

    /// Create a builder for a parameterless lambda returning nothing.
    pub fn action(lookup: &'a dyn TypeLookup) -> Self {
        Self::expression(lookup, DataType::Void)
    }

    pub fn parameters(&self) -> &[Arc<Variable>] {
        &self.parameters
    }

    pub fn return_type(&self) -> DataType {
        self.return_type
    }

    /// The operand built so far, if any.
    pub fn fragment(&self) -> Option<&NodeRef> {
        self.fragment.as_ref()
    }

    fn lookup(&self) -> &'a dyn TypeLookup {
        self.factory.lookup()
    }

    // =========================================================================
    // State checks
    // =========================================================================

    fn ensure_statement_start(&self, operation: &str) -> Result<(), BuildError> {
        if self.args_opened || self.fragment.is_some() || !self.current.is_idle() {
            return Err(BuildError::StatementInProgress {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_operand_start(&self, operation: &str) -> Result<(), BuildError> {
        if self.args_opened {
            return Err(BuildError::ArgumentListExpected {
                operation: operation.to_string(),
            });
        }
        if self.fragment.is_some() {
            return Err(BuildError::OperandAlreadyPresent {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn take_fragment(&mut self, operation: &str) -> Result<NodeRef, BuildError> {
        if self.args_opened {
            return Err(BuildError::ArgumentListExpected {
                operation: operation.to_string(),
            });
        }
        self.fragment
            .take()
            .ok_or_else(|| BuildError::missing_operand(operation))
    }

    fn set_leaf(&mut self, operation: &str, node: NodeRef) -> Result<(), BuildError> {
        self.ensure_operand_start(operation)?;
        self.fragment = Some(node);
        Ok(())
    }

    fn resolve(
        &mut self,
        fragment: Option<NodeRef>,
        layer: Precedence,
    ) -> Result<Resolved, BuildError> {
        self.current
            .current()
            .resolve_layer(fragment, layer, &self.factory)
    }

    /// Take the current operand and resolve it through `layer`.
    fn resolve_fragment(
        &mut self,
        operation: &str,
        layer: Precedence,
    ) -> Result<NodeRef, BuildError> {
        let fragment = self.take_fragment(operation)?;
        self.resolve(Some(fragment), layer)?.into_node(operation)
    }

    // =========================================================================
    // Statement start only
    // =========================================================================

    fn declare_variable(
        &mut self,
        data_type: DataType,
        name: &str,
    ) -> Result<Arc<Variable>, BuildError> {
        let variable = self
            .current
            .declare(VariableId(self.next_variable), data_type, name)?;
        self.next_variable += 1;
        Ok(variable)
    }

    /// Declare a variable in the current block.
    pub fn declare(&mut self, data_type: DataType, name: &str) -> Result<(), BuildError> {
        self.ensure_statement_start("declare")?;
        self.declare_variable(data_type, name)?;
        Ok(())
    }

    /// Declare a variable and start its initializing assignment; the
    /// initializer is the next operand.
    pub fn declare_and_assign(&mut self, data_type: DataType, name: &str) -> Result<(), BuildError> {
        self.ensure_statement_start("declare_and_assign")?;
        let variable = self.declare_variable(data_type, name)?;
        self.fragment = Some(self.factory.variable(variable));
        self.assign()
    }

    /// Declare a variable, assign it a constant and end the statement.
    pub fn declare_and_init(
        &mut self,
        data_type: DataType,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), BuildError> {
        self.declare_and_assign(data_type, name)?;
        self.constant_typed(value, data_type)?;
        self.end_statement()
    }

    /// Add an empty statement.
    pub fn do_nothing(&mut self) -> Result<(), BuildError> {
        self.ensure_statement_start("do_nothing")?;
        let empty = self.factory.empty();
        self.current.add_statement(empty);
        Ok(())
    }

    /// Open a nested block.
    pub fn begin_block(&mut self) -> Result<(), BuildError> {
        self.ensure_statement_start("begin_block")?;
        let child = self.current.nested();
        let parent = std::mem::replace(&mut self.current, child);
        self.outer.push(parent);
        debug!(depth = self.outer.len(), "block opened");
        Ok(())
    }

    /// Close the innermost nested block and add it to its parent as a
    /// statement.
    pub fn end_block(&mut self) -> Result<(), BuildError> {
        self.ensure_statement_start("end_block")?;
        let parent = self.outer.pop().ok_or(BuildError::Unmatched {
            token: "end_block",
            expected: "begin_block",
        })?;
        let child = std::mem::replace(&mut self.current, parent);
        let node = child.finish(&self.factory);
        self.current.add_statement(node);
        Ok(())
    }

    // =========================================================================
    // Starting the operand
    // =========================================================================

    /// An untyped null.
    pub fn null(&mut self) -> Result<(), BuildError> {
        let node = self.factory.constant(Value::Null);
        self.set_leaf("null", node)
    }

    /// A null of a reference type.
    pub fn null_of(&mut self, data_type: DataType) -> Result<(), BuildError> {
        let node = self.factory.typed_constant(Value::Null, data_type)?;
        self.set_leaf("null", node)
    }

    /// The default value of a type.
    pub fn default_of(&mut self, data_type: DataType) -> Result<(), BuildError> {
        let node = self.factory.default_value(data_type)?;
        self.set_leaf("default", node)
    }

    pub fn constant(&mut self, value: impl Into<Value>) -> Result<(), BuildError> {
        let node = self.factory.constant(value.into());
        self.set_leaf("constant", node)
    }

    pub fn constant_typed(
        &mut self,
        value: impl Into<Value>,
        data_type: DataType,
    ) -> Result<(), BuildError> {
        let node = self.factory.typed_constant(value.into(), data_type)?;
        self.set_leaf("constant", node)
    }

    /// A parameter or variable visible in the current block.
    pub fn var(&mut self, name: &str) -> Result<(), BuildError> {
        let variable = self.current.lookup(name)?;
        let node = self.factory.variable(variable);
        self.set_leaf("var", node)
    }

    /// Inject a prebuilt subtree as the operand.
    pub fn subexpression(&mut self, node: NodeRef) -> Result<(), BuildError> {
        self.set_leaf("subexpression", node)
    }

    // =========================================================================
    // Accessing members
    // =========================================================================

    pub fn field(&mut self, name: &str) -> Result<(), BuildError> {
        let target = self.take_fragment("field")?;
        let field = resolve_field(self.lookup(), target.data_type(), name)?;
        self.fragment = Some(self.factory.field(target, field));
        Ok(())
    }

    pub fn property(&mut self, name: &str) -> Result<(), BuildError> {
        let target = self.take_fragment("property")?;
        let property = resolve_property(self.lookup(), target.data_type(), name)?;
        self.fragment = Some(self.factory.property(target, property));
        Ok(())
    }

    pub fn post_increment(&mut self) -> Result<(), BuildError> {
        self.next_postfix(PostfixOp::PostIncrement)
    }

    pub fn post_decrement(&mut self) -> Result<(), BuildError> {
        self.next_postfix(PostfixOp::PostDecrement)
    }

    fn next_postfix(&mut self, op: PostfixOp) -> Result<(), BuildError> {
        let operand = self.take_fragment(&op.to_string())?;
        self.fragment = Some(self.factory.postfix(op, operand)?);
        Ok(())
    }

    // =========================================================================
    // Parameterized operations
    // =========================================================================

    fn schedule_action(
        &mut self,
        target: Option<NodeRef>,
        action: PrimaryAction,
    ) -> Result<(), BuildError> {
        self.current.current().schedule_parameterized(target, action)?;
        self.args_opened = true;
        Ok(())
    }

    /// Construct an object with the constructor taking `params`; an
    /// argument list follows.
    pub fn new_object(&mut self, data_type: DataType, params: &[DataType]) -> Result<(), BuildError> {
        self.ensure_operand_start("new")?;
        let constructor = resolve_constructor(self.lookup(), data_type, params)?;
        self.schedule_action(
            None,
            PrimaryAction::New {
                data_type,
                constructor,
            },
        )
    }

    /// Construct an object with its parameterless constructor.
    pub fn new_no_args(&mut self, data_type: DataType) -> Result<(), BuildError> {
        self.ensure_operand_start("new")?;
        let constructor = resolve_constructor(self.lookup(), data_type, &[])?;
        self.fragment = Some(self.factory.new_object(data_type, constructor, Vec::new())?);
        Ok(())
    }

    /// Call a method on the current operand; an argument list follows.
    pub fn call(&mut self, name: &str, params: &[DataType]) -> Result<(), BuildError> {
        let target = self.take_fragment("call")?;
        let method = resolve_method(self.lookup(), target.data_type(), name, params)?;
        self.schedule_action(Some(target), PrimaryAction::Call(method))
    }

    /// Call a parameterless method on the current operand.
    pub fn call_no_args(&mut self, name: &str) -> Result<(), BuildError> {
        let target = self.take_fragment("call")?;
        let method = resolve_method(self.lookup(), target.data_type(), name, &[])?;
        self.fragment = Some(self.factory.call(Some(target), method, Vec::new())?);
        Ok(())
    }

    /// Call a static method of `owner`; an argument list follows.
    pub fn call_static(
        &mut self,
        owner: DataType,
        name: &str,
        params: &[DataType],
    ) -> Result<(), BuildError> {
        self.ensure_operand_start("call_static")?;
        let method = resolve_static_method(self.lookup(), owner, name, params)?;
        self.schedule_action(None, PrimaryAction::Call(method))
    }

    /// Index the current operand with the indexer taking `index_types`; an
    /// argument list follows.
    pub fn index_by(&mut self, index_types: &[DataType]) -> Result<(), BuildError> {
        let target = self.take_fragment("index_by")?;
        let indexer = resolve_indexer(self.lookup(), target.data_type(), index_types)?;
        self.schedule_action(Some(target), PrimaryAction::Index(indexer))
    }

    /// Resolve the argument being built and hand it to the pending action
    /// of the enclosing context.
    fn close_argument(&mut self, token: &'static str) -> Result<(), BuildError> {
        if self.current.current_kind() != ContextKind::Argument {
            return Err(BuildError::Unmatched {
                token,
                expected: "call, new or index_by",
            });
        }
        let fragment = self.fragment.take();
        let argument = self.resolve(fragment, Precedence::Statement)?.into_node(token)?;
        self.current.end_subexpression(ContextKind::Argument)?;
        self.current.current().add_argument(argument)
    }

    /// Start the next argument.
    pub fn argument(&mut self) -> Result<(), BuildError> {
        if !self.args_opened {
            self.close_argument("argument")?;
        }
        self.current.begin_subexpression(ContextKind::Argument);
        self.fragment = None;
        self.args_opened = false;
        Ok(())
    }

    /// End the argument list and complete the pending action.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn end_args(&mut self) -> Result<(), BuildError> {
        if !self.args_opened {
            self.close_argument("end_args")?;
        }
        if !self.current.current().has_pending_action() {
            return Err(BuildError::Unmatched {
                token: "end_args",
                expected: "call, new or index_by",
            });
        }
        let node = self.resolve(None, Precedence::Primary)?.into_node("end_args")?;
        self.fragment = Some(node);
        self.args_opened = false;
        Ok(())
    }

    // =========================================================================
    // Unary operations
    // =========================================================================

    fn next_unary(&mut self, op: UnaryOp) -> Result<(), BuildError> {
        if self.args_opened {
            return Err(BuildError::ArgumentListExpected {
                operation: op.to_string(),
            });
        }
        if self.fragment.is_some() {
            return Err(BuildError::UnaryAfterOperand { op: op.to_string() });
        }
        self.current.current().schedule_unary(op);
        Ok(())
    }

    /// Unary plus. Checked like any prefix operator, builds nothing.
    pub fn plus(&mut self) -> Result<(), BuildError> {
        if self.args_opened {
            return Err(BuildError::ArgumentListExpected {
                operation: "+".into(),
            });
        }
        if self.fragment.is_some() {
            return Err(BuildError::UnaryAfterOperand { op: "+".into() });
        }
        Ok(())
    }

    pub fn minus(&mut self) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::Negate)
    }

    pub fn not(&mut self) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::LogicalNot)
    }

    pub fn bitwise_not(&mut self) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::BitwiseNot)
    }

    pub fn pre_increment(&mut self) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::PreIncrement)
    }

    pub fn pre_decrement(&mut self) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::PreDecrement)
    }

    /// Convert the following operand to `data_type`.
    pub fn convert(&mut self, data_type: DataType) -> Result<(), BuildError> {
        self.next_unary(UnaryOp::Convert(data_type))
    }

    // =========================================================================
    // Binary operations
    // =========================================================================

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn next_binary(&mut self, op: BinaryOp) -> Result<(), BuildError> {
        let left = self.resolve_fragment(&op.to_string(), op.precedence())?;
        self.current.current().schedule_binary(left, op);
        Ok(())
    }

    pub fn multiply(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Mul)
    }

    pub fn divide(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Div)
    }

    pub fn modulo(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Mod)
    }

    pub fn add(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Add)
    }

    pub fn subtract(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Sub)
    }

    pub fn shift_left(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::ShiftLeft)
    }

    pub fn shift_right(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::ShiftRight)
    }

    pub fn greater_than(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Greater)
    }

    pub fn greater_than_or_equal(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::GreaterEqual)
    }

    pub fn less_than(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Less)
    }

    pub fn less_than_or_equal(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::LessEqual)
    }

    pub fn equal(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::Equal)
    }

    pub fn not_equal(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::NotEqual)
    }

    pub fn bitwise_and(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::BitwiseAnd)
    }

    pub fn bitwise_xor(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::BitwiseXor)
    }

    pub fn bitwise_or(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::BitwiseOr)
    }

    /// Short-circuiting `&&`.
    pub fn and(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::LogicalAnd)
    }

    /// Short-circuiting `||`.
    pub fn or(&mut self) -> Result<(), BuildError> {
        self.next_binary(BinaryOp::LogicalOr)
    }

    /// `is`: binds on the relational layer and leaves no pending operator.
    pub fn type_is(&mut self, data_type: DataType) -> Result<(), BuildError> {
        let operand = self.resolve_fragment("is", Precedence::Relational)?;
        self.fragment = Some(self.factory.type_is(operand, data_type)?);
        Ok(())
    }

    /// `as`: binds on the relational layer and leaves no pending operator.
    pub fn type_as(&mut self, data_type: DataType) -> Result<(), BuildError> {
        let operand = self.resolve_fragment("as", Precedence::Relational)?;
        self.fragment = Some(self.factory.type_as(operand, data_type)?);
        Ok(())
    }

    // =========================================================================
    // Ternary conditional operator
    // =========================================================================

    /// `?`: the operand so far becomes the condition.
    pub fn inline_if(&mut self) -> Result<(), BuildError> {
        let condition = self.resolve_fragment("?", Precedence::ConditionalOr)?;
        self.current.current().schedule_conditional(condition);
        Ok(())
    }

    /// `:`: the operand so far becomes the true branch of the innermost
    /// open `?`.
    pub fn inline_else(&mut self) -> Result<(), BuildError> {
        let fragment = self.take_fragment(":")?;
        match self.resolve(Some(fragment), Precedence::ConditionalTernary)? {
            Resolved::AwaitingElse => Ok(()),
            Resolved::Node(_) => Err(BuildError::UnmatchedElse),
            Resolved::Empty => Err(BuildError::missing_operand(":")),
        }
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    fn next_assignment(&mut self, op: AssignOp) -> Result<(), BuildError> {
        let operation = op.to_string();
        let fragment = self.take_fragment(&operation)?;
        let target = match self.resolve(Some(fragment), Precedence::ConditionalTernary)? {
            Resolved::Node(target) => target,
            Resolved::AwaitingElse => {
                return Err(BuildError::not_assignable(
                    "the true branch of an open conditional; bracket the assignment",
                ));
            }
            Resolved::Empty => return Err(BuildError::missing_operand(operation)),
        };
        if !target.is_writable() {
            return Err(BuildError::not_assignable(format!(
                "left side of '{}' must be a variable, writable field, property or indexer: {}",
                operation, target
            )));
        }
        self.current.current().schedule_assignment(target, op);
        Ok(())
    }

    pub fn assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::Assign)
    }

    pub fn add_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::AddAssign)
    }

    pub fn subtract_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::SubAssign)
    }

    pub fn multiply_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::MulAssign)
    }

    pub fn divide_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::DivAssign)
    }

    pub fn modulo_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::ModAssign)
    }

    pub fn shift_left_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::ShiftLeftAssign)
    }

    pub fn shift_right_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::ShiftRightAssign)
    }

    pub fn bitwise_and_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::AndAssign)
    }

    pub fn bitwise_xor_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::XorAssign)
    }

    pub fn bitwise_or_assign(&mut self) -> Result<(), BuildError> {
        self.next_assignment(AssignOp::OrAssign)
    }

    // =========================================================================
    // Brackets and statements
    // =========================================================================

    /// `(`
    pub fn brace(&mut self) -> Result<(), BuildError> {
        self.ensure_operand_start("brace")?;
        self.current.begin_subexpression(ContextKind::Bracket);
        Ok(())
    }

    /// `)`: the bracketed subexpression becomes one opaque operand.
    pub fn unbrace(&mut self) -> Result<(), BuildError> {
        if self.current.current_kind() != ContextKind::Bracket {
            return Err(BuildError::Unmatched {
                token: "unbrace",
                expected: "brace",
            });
        }
        if self.args_opened {
            return Err(BuildError::ArgumentListExpected {
                operation: "unbrace".into(),
            });
        }
        let fragment = self.fragment.take();
        let node = self
            .resolve(fragment, Precedence::Statement)?
            .into_node("unbrace")?;
        self.current.end_subexpression(ContextKind::Bracket)?;
        self.fragment = Some(node);
        Ok(())
    }

    /// Resolve the statement and add it to the current block.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn end_statement(&mut self) -> Result<(), BuildError> {
        match self.current.current_kind() {
            ContextKind::Statement => {}
            ContextKind::Bracket => {
                return Err(BuildError::Unmatched {
                    token: "brace",
                    expected: "unbrace",
                });
            }
            ContextKind::Argument => {
                return Err(BuildError::Unmatched {
                    token: "argument",
                    expected: "end_args",
                });
            }
        }
        let statement = self.resolve_fragment("end_statement", Precedence::Statement)?;
        self.current.add_statement(statement);
        Ok(())
    }

    // =========================================================================
    // Completing
    // =========================================================================

    fn ensure_complete(&self) -> Result<(), BuildError> {
        let reason = if self.args_opened {
            "an argument list is open"
        } else if !self.outer.is_empty() {
            "a nested block was not ended"
        } else if self.fragment.is_some() || !self.current.is_idle() {
            "the current statement was not ended"
        } else {
            return Ok(());
        };
        Err(BuildError::IncompleteBuild {
            reason: reason.to_string(),
        })
    }

    /// Finish and return the root node.
    pub fn complete(self) -> Result<NodeRef, BuildError> {
        self.ensure_complete()?;
        let body = self.current.finish(&self.factory);
        debug!(body = %body, "tree completed");
        Ok(body)
    }

    /// Finish and return a lambda over the parameters.
    pub fn complete_lambda(self) -> Result<Lambda, BuildError> {
        self.ensure_complete()?;
        let Self {
            factory,
            parameters,
            return_type,
            current,
            ..
        } = self;

        let body = current.finish(&factory);
        if return_type != DataType::Void
            && !factory.lookup().is_assignable(body.data_type(), return_type)
        {
            return Err(BuildError::type_mismatch(format!(
                "body of type '{}' does not match return type '{}'",
                factory.lookup().type_name(body.data_type()),
                factory.lookup().type_name(return_type)
            )));
        }
        debug!(params = parameters.len(), body = %body, "lambda completed");
        Ok(Lambda::new(parameters, body, return_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexpr_registry::TypeRegistry;

    fn built(
        registry: &TypeRegistry,
        steps: impl FnOnce(&mut BodyBuilder<'_>) -> Result<(), BuildError>,
    ) -> Result<String, BuildError> {
        let mut builder = BodyBuilder::expression(registry, DataType::Void);
        steps(&mut builder)?;
        Ok(builder.complete()?.to_string())
    }

    #[test]
    fn precedence_of_mixed_operators() {
        let registry = TypeRegistry::new();
        let tree = built(&registry, |b| {
            b.constant(72)?;
            b.bitwise_or()?;
            b.constant(399)?;
            b.bitwise_xor()?;
            b.constant(131)?;
            b.bitwise_and()?;
            b.constant(5)?;
            b.shift_left()?;
            b.constant(1)?;
            b.add()?;
            b.constant(2)?;
            b.multiply()?;
            b.constant(3)?;
            b.end_statement()
        })
        .unwrap();
        assert_eq!(tree, "(72 | (399 ^ (131 & (5 << (1 + (2 * 3))))))");
    }

    #[test]
    fn brackets_are_opaque() {
        let registry = TypeRegistry::new();
        let tree = built(&registry, |b| {
            b.brace()?;
            b.constant(1)?;
            b.add()?;
            b.constant(2)?;
            b.unbrace()?;
            b.multiply()?;
            b.constant(3)?;
            b.end_statement()
        })
        .unwrap();
        assert_eq!(tree, "((1 + 2) * 3)");
    }

    #[test]
    fn conditional_condition_takes_logical_or() {
        let registry = TypeRegistry::new();
        let tree = built(&registry, |b| {
            b.constant(false)?;
            b.or()?;
            b.constant(true)?;
            b.inline_if()?;
            b.constant(1)?;
            b.inline_else()?;
            b.constant(2)?;
            b.end_statement()
        })
        .unwrap();
        assert_eq!(tree, "((false || true) ? 1 : 2)");
    }

    #[test]
    fn unary_after_operand_fails() {
        let registry = TypeRegistry::new();
        let err = built(&registry, |b| {
            b.constant(1)?;
            b.minus()
        })
        .unwrap_err();
        assert_eq!(err, BuildError::UnaryAfterOperand { op: "-".into() });
    }

    #[test]
    fn leaf_after_operand_fails() {
        let registry = TypeRegistry::new();
        let err = built(&registry, |b| {
            b.constant(1)?;
            b.constant(2)
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::OperandAlreadyPresent { .. }));
    }

    #[test]
    fn unbalanced_structure_fails() {
        let registry = TypeRegistry::new();
        let err = built(&registry, |b| {
            b.constant(1)?;
            b.unbrace()
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::Unmatched { token: "unbrace", .. }));

        let err = built(&registry, |b| {
            b.brace()?;
            b.constant(1)?;
            b.end_statement()
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::Unmatched { token: "brace", .. }));

        let err = built(&registry, |b| {
            b.constant(1)?;
            b.end_args()
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::Unmatched { token: "end_args", .. }));
    }

    #[test]
    fn incomplete_build_fails() {
        let registry = TypeRegistry::new();
        let mut builder = BodyBuilder::expression(&registry, DataType::Int32);
        builder.constant(1).unwrap();
        builder.add().unwrap();
        assert!(matches!(
            builder.complete().unwrap_err(),
            BuildError::IncompleteBuild { .. }
        ));

        let mut builder = BodyBuilder::action(&registry);
        builder.begin_block().unwrap();
        assert!(matches!(
            builder.complete().unwrap_err(),
            BuildError::IncompleteBuild { .. }
        ));
    }

    #[test]
    fn declarations_need_statement_start() {
        let registry = TypeRegistry::new();
        let err = built(&registry, |b| {
            b.constant(1)?;
            b.declare(DataType::Int32, "x")
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::StatementInProgress { .. }));
    }

    #[test]
    fn duplicate_parameter_names_fail() {
        let registry = TypeRegistry::new();
        let signature = Signature::action(vec![DataType::Int32, DataType::Int32]);
        let err = BodyBuilder::new(&registry, &signature, &["a", "a"]).err();
        assert_eq!(err, Some(BuildError::DuplicateDeclaration { name: "a".into() }));
    }

    #[test]
    fn lambda_return_type_is_checked() {
        let registry = TypeRegistry::new();
        let mut builder = BodyBuilder::expression(&registry, DataType::Bool);
        builder.constant(1).unwrap();
        builder.end_statement().unwrap();
        assert!(matches!(
            builder.complete_lambda().unwrap_err(),
            BuildError::TypeMismatch { .. }
        ));
    }
}
