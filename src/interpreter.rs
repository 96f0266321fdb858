//! Reference tree-walking interpreter.
//!
//! Evaluates finished trees directly. Locals live in a [`Frame`] indexed by
//! [`VariableId`]; parameters are bound on entry and block variables are
//! reset to their type's default value each time their block runs.

use std::sync::Arc;

use tracing::debug;

use flexpr_builder::{
    AssignOp, BinaryOp, Lambda, NodeKind, NodeRef, PostfixOp, UnaryOp, Variable, VariableId,
};
use flexpr_core::{
    DataType, FieldEntry, IndexerEntry, MethodEntry, NativeFn, ObjectRef, PropertyEntry,
    RuntimeError, Value,
};
use flexpr_registry::TypeLookup;

/// Local variable slots of one invocation.
#[derive(Debug, Default)]
struct Frame {
    locals: Vec<Option<Value>>,
}

impl Frame {
    fn get(&self, variable: &Variable) -> Result<Value, RuntimeError> {
        self.locals
            .get(variable.id.0 as usize)
            .cloned()
            .flatten()
            .ok_or_else(|| RuntimeError::UnsetVariable {
                name: variable.name.clone(),
            })
    }

    fn set(&mut self, id: VariableId, value: Value) {
        let index = id.0 as usize;
        if index >= self.locals.len() {
            self.locals.resize(index + 1, None);
        }
        self.locals[index] = Some(value);
    }
}

/// A writable location, with its receiver and index arguments already
/// evaluated.
enum Place {
    Variable(Arc<Variable>),
    Field {
        object: ObjectRef,
        field: Arc<FieldEntry>,
    },
    Property {
        receiver: Value,
        property: Arc<PropertyEntry>,
    },
    Index {
        receiver: Value,
        indexer: Arc<IndexerEntry>,
        args: Vec<Value>,
    },
}

/// Evaluates trees against a host type system.
#[derive(Clone, Copy)]
pub struct Interpreter<'a> {
    lookup: &'a dyn TypeLookup,
}

impl<'a> Interpreter<'a> {
    pub fn new(lookup: &'a dyn TypeLookup) -> Self {
        Self { lookup }
    }

    /// Invoke a lambda. Actions return `Value::Void`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&self, lambda: &Lambda, args: &[Value]) -> Result<Value, RuntimeError> {
        if args.len() != lambda.arity() {
            return Err(RuntimeError::ArgumentCount {
                expected: lambda.arity(),
                found: args.len(),
            });
        }
        debug!(arity = lambda.arity(), "invoking lambda");

        let mut frame = Frame::default();
        for (parameter, arg) in lambda.parameters().iter().zip(args) {
            frame.set(parameter.id, arg.clone());
        }
        let result = self.eval(lambda.body(), &mut frame)?;
        if lambda.return_type() == DataType::Void {
            Ok(Value::Void)
        } else {
            Ok(result)
        }
    }

    /// Evaluate a tree that refers to no parameters.
    pub fn evaluate(&self, node: &NodeRef) -> Result<Value, RuntimeError> {
        self.eval(node, &mut Frame::default())
    }

    fn eval(&self, node: &NodeRef, frame: &mut Frame) -> Result<Value, RuntimeError> {
        match node.kind() {
            NodeKind::Constant(value) => Ok(value.clone()),
            NodeKind::Variable(variable) => frame.get(variable),
            NodeKind::Empty => Ok(Value::Void),

            NodeKind::Field { .. } | NodeKind::Property { .. } | NodeKind::Index { .. } => {
                let place = self.place(node, frame)?;
                self.read(&place, frame)
            }

            NodeKind::Unary { op, operand } => self.unary(*op, operand, frame),
            NodeKind::Postfix { op, operand } => {
                let place = self.place(operand, frame)?;
                let old = self.read(&place, frame)?;
                let delta = match op {
                    PostfixOp::PostIncrement => 1,
                    PostfixOp::PostDecrement => -1,
                };
                self.write(&place, frame, step(&old, delta)?)?;
                Ok(old)
            }

            NodeKind::Binary { op, left, right } => match op {
                BinaryOp::LogicalAnd => {
                    if self.eval_bool(left, frame)? {
                        Ok(Value::Bool(self.eval_bool(right, frame)?))
                    } else {
                        Ok(Value::Bool(false))
                    }
                }
                BinaryOp::LogicalOr => {
                    if self.eval_bool(left, frame)? {
                        Ok(Value::Bool(true))
                    } else {
                        Ok(Value::Bool(self.eval_bool(right, frame)?))
                    }
                }
                _ => {
                    let left = self.eval(left, frame)?;
                    let right = self.eval(right, frame)?;
                    binary(*op, &left, &right)
                }
            },

            NodeKind::TypeIs { operand, target } => {
                let value = self.eval(operand, frame)?;
                Ok(Value::Bool(self.is_instance(&value, *target)))
            }
            NodeKind::TypeAs { operand, target } => {
                let value = self.eval(operand, frame)?;
                if self.is_instance(&value, *target) {
                    Ok(value)
                } else {
                    Ok(Value::Null)
                }
            }

            NodeKind::Assign { op, target, value } => self.assign(*op, target, value, frame),

            NodeKind::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                if self.eval_bool(condition, frame)? {
                    self.eval(if_true, frame)
                } else {
                    self.eval(if_false, frame)
                }
            }

            NodeKind::Call {
                target,
                method,
                args,
            } => {
                let receiver = match target {
                    Some(target) => self.receiver(target, &method.name, frame)?,
                    None => Value::Null,
                };
                let args = self.eval_all(args, frame)?;
                let native = self.dispatch(&receiver, method)?;
                native.call(&receiver, &args)
            }

            NodeKind::New { constructor, args } => {
                let args = self.eval_all(args, frame)?;
                constructor.native.call(&Value::Null, &args)
            }

            NodeKind::Block {
                variables,
                statements,
            } => {
                for variable in variables {
                    frame.set(variable.id, Value::default_of(variable.data_type));
                }
                let mut last = Value::Void;
                for statement in statements {
                    last = self.eval(statement, frame)?;
                }
                Ok(last)
            }
        }
    }

    fn eval_bool(&self, node: &NodeRef, frame: &mut Frame) -> Result<bool, RuntimeError> {
        let value = self.eval(node, frame)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::native(format!("expected a bool, found {:?}", value))
        })
    }

    fn eval_all(&self, nodes: &[NodeRef], frame: &mut Frame) -> Result<Vec<Value>, RuntimeError> {
        nodes.iter().map(|node| self.eval(node, frame)).collect()
    }

    /// Evaluate the target of a member access, rejecting null.
    fn receiver(
        &self,
        target: &NodeRef,
        member: &str,
        frame: &mut Frame,
    ) -> Result<Value, RuntimeError> {
        let value = self.eval(target, frame)?;
        if value.is_null() {
            return Err(RuntimeError::NullReference {
                member: member.to_string(),
            });
        }
        Ok(value)
    }

    /// The body to run for `method` on `receiver`. Abstract interface
    /// methods are looked up on the receiver's concrete type.
    fn dispatch(&self, receiver: &Value, method: &MethodEntry) -> Result<NativeFn, RuntimeError> {
        if let Some(native) = &method.native {
            return Ok(native.clone());
        }
        self.lookup
            .find_method_exact(
                receiver.data_type().lookup_hash(),
                &method.name,
                &method.params,
            )
            .and_then(|concrete| concrete.native.clone())
            .ok_or_else(|| RuntimeError::MissingImplementation {
                member: method.name.clone(),
            })
    }

    fn is_instance(&self, value: &Value, target: DataType) -> bool {
        match (value.data_type(), target) {
            (DataType::Null, _) => false,
            (actual, target) if actual == target => true,
            (DataType::Object(actual), DataType::Object(target)) => {
                self.lookup.implements(actual, target)
            }
            _ => false,
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn unary(&self, op: UnaryOp, operand: &NodeRef, frame: &mut Frame) -> Result<Value, RuntimeError> {
        if let UnaryOp::PreIncrement | UnaryOp::PreDecrement = op {
            let place = self.place(operand, frame)?;
            let old = self.read(&place, frame)?;
            let delta = if op == UnaryOp::PreIncrement { 1 } else { -1 };
            let new = step(&old, delta)?;
            self.write(&place, frame, new.clone())?;
            return Ok(new);
        }

        match (op, self.eval(operand, frame)?) {
            (UnaryOp::Negate, Value::Int32(v)) => Ok(Value::Int32(v.wrapping_neg())),
            (UnaryOp::Negate, Value::Int64(v)) => Ok(Value::Int64(v.wrapping_neg())),
            (UnaryOp::Negate, Value::Double(v)) => Ok(Value::Double(-v)),
            (UnaryOp::LogicalNot, Value::Bool(v)) => Ok(Value::Bool(!v)),
            (UnaryOp::BitwiseNot, Value::Int32(v)) => Ok(Value::Int32(!v)),
            (UnaryOp::BitwiseNot, Value::UInt32(v)) => Ok(Value::UInt32(!v)),
            (UnaryOp::BitwiseNot, Value::Int64(v)) => Ok(Value::Int64(!v)),
            (UnaryOp::Convert(target), value) => self.convert(value, target),
            (op, value) => Err(RuntimeError::native(format!(
                "operator '{}' cannot be applied to {:?}",
                op, value
            ))),
        }
    }

    fn convert(&self, value: Value, target: DataType) -> Result<Value, RuntimeError> {
        if value.data_type() == target {
            return Ok(value);
        }
        if target.is_numeric() {
            if let Some(converted) = number(&value).and_then(|n| n.convert(target)) {
                return Ok(converted);
            }
        } else if value.is_null() || self.is_instance(&value, target) {
            return Ok(value);
        }
        Err(RuntimeError::InvalidCast {
            from: self.lookup.type_name(value.data_type()),
            to: self.lookup.type_name(target),
        })
    }

    fn assign(
        &self,
        op: AssignOp,
        target: &NodeRef,
        value: &NodeRef,
        frame: &mut Frame,
    ) -> Result<Value, RuntimeError> {
        let place = self.place(target, frame)?;
        let new = match op.binary_op() {
            None => self.eval(value, frame)?,
            Some(binary_op) => {
                let old = self.read(&place, frame)?;
                let right = self.eval(value, frame)?;
                binary(binary_op, &old, &right)?
            }
        };
        self.write(&place, frame, new.clone())?;
        Ok(new)
    }

    // =========================================================================
    // Places
    // =========================================================================

    fn place(&self, node: &NodeRef, frame: &mut Frame) -> Result<Place, RuntimeError> {
        match node.kind() {
            NodeKind::Variable(variable) => Ok(Place::Variable(variable.clone())),
            NodeKind::Field { target, field } => {
                let receiver = self.receiver(target, &field.name, frame)?;
                match receiver {
                    Value::Object(object) => Ok(Place::Field {
                        object,
                        field: field.clone(),
                    }),
                    other => Err(RuntimeError::native(format!(
                        "field '{}' requires an object, found {:?}",
                        field.name, other
                    ))),
                }
            }
            NodeKind::Property { target, property } => Ok(Place::Property {
                receiver: self.receiver(target, &property.name, frame)?,
                property: property.clone(),
            }),
            NodeKind::Index {
                target,
                indexer,
                args,
            } => {
                let receiver = self.receiver(target, "this", frame)?;
                let args = self.eval_all(args, frame)?;
                Ok(Place::Index {
                    receiver,
                    indexer: indexer.clone(),
                    args,
                })
            }
            _ => Err(RuntimeError::native(format!("'{}' is not a writable location", node))),
        }
    }

    fn read(&self, place: &Place, frame: &Frame) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(variable) => frame.get(variable),
            Place::Field { object, field } => Ok(object
                .field(&field.name)
                .unwrap_or_else(|| Value::default_of(field.data_type))),
            Place::Property { receiver, property } => {
                accessor(&property.getter, &property.name, "get")?.call(receiver, &[])
            }
            Place::Index {
                receiver,
                indexer,
                args,
            } => accessor(&indexer.getter, "this", "get")?.call(receiver, args),
        }
    }

    fn write(&self, place: &Place, frame: &mut Frame, value: Value) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(variable) => frame.set(variable.id, value),
            Place::Field { object, field } => object.set_field(&field.name, value),
            Place::Property { receiver, property } => {
                accessor(&property.setter, &property.name, "set")?.call(receiver, &[value])?;
            }
            Place::Index {
                receiver,
                indexer,
                args,
            } => {
                let mut setter_args = args.clone();
                setter_args.push(value);
                accessor(&indexer.setter, "this", "set")?.call(receiver, &setter_args)?;
            }
        }
        Ok(())
    }
}

fn accessor<'n>(
    native: &'n Option<NativeFn>,
    member: &str,
    kind: &str,
) -> Result<&'n NativeFn, RuntimeError> {
    native
        .as_ref()
        .ok_or_else(|| RuntimeError::MissingImplementation {
            member: format!("{}.{}", member, kind),
        })
}

// =============================================================================
// Arithmetic
// =============================================================================

/// A numeric value widened for conversion.
#[derive(Clone, Copy)]
enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    fn convert(self, target: DataType) -> Option<Value> {
        Some(match (self, target) {
            (Number::Integer(i), DataType::Int32) => Value::Int32(i as i32),
            (Number::Integer(i), DataType::UInt32) => Value::UInt32(i as u32),
            (Number::Integer(i), DataType::Int64) => Value::Int64(i),
            (Number::Integer(i), DataType::Double) => Value::double(i as f64),
            (Number::Float(f), DataType::Int32) => Value::Int32(f as i32),
            (Number::Float(f), DataType::UInt32) => Value::UInt32(f as u32),
            (Number::Float(f), DataType::Int64) => Value::Int64(f as i64),
            (Number::Float(f), DataType::Double) => Value::double(f),
            _ => return None,
        })
    }
}

fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Int32(v) => Some(Number::Integer(i64::from(*v))),
        Value::UInt32(v) => Some(Number::Integer(i64::from(*v))),
        Value::Int64(v) => Some(Number::Integer(*v)),
        Value::Double(v) => Some(Number::Float(v.0)),
        _ => None,
    }
}

/// Add `delta` to a numeric value.
fn step(value: &Value, delta: i32) -> Result<Value, RuntimeError> {
    match value {
        Value::Int32(v) => Ok(Value::Int32(v.wrapping_add(delta))),
        Value::UInt32(v) => Ok(Value::UInt32(v.wrapping_add_signed(delta))),
        Value::Int64(v) => Ok(Value::Int64(v.wrapping_add(i64::from(delta)))),
        Value::Double(v) => Ok(Value::double(v.0 + f64::from(delta))),
        other => Err(RuntimeError::native(format!(
            "cannot increment or decrement {:?}",
            other
        ))),
    }
}

macro_rules! integral {
    ($op:expr, $a:expr, $b:expr, $variant:ident) => {{
        let (a, b) = ($a, $b);
        match $op {
            BinaryOp::Mul => Some(Value::$variant(a.wrapping_mul(b))),
            BinaryOp::Div if b == 0 => return Err(RuntimeError::DivideByZero),
            BinaryOp::Div => Some(Value::$variant(a.wrapping_div(b))),
            BinaryOp::Mod if b == 0 => return Err(RuntimeError::DivideByZero),
            BinaryOp::Mod => Some(Value::$variant(a.wrapping_rem(b))),
            BinaryOp::Add => Some(Value::$variant(a.wrapping_add(b))),
            BinaryOp::Sub => Some(Value::$variant(a.wrapping_sub(b))),
            BinaryOp::BitwiseAnd => Some(Value::$variant(a & b)),
            BinaryOp::BitwiseXor => Some(Value::$variant(a ^ b)),
            BinaryOp::BitwiseOr => Some(Value::$variant(a | b)),
            BinaryOp::Less => Some(Value::Bool(a < b)),
            BinaryOp::LessEqual => Some(Value::Bool(a <= b)),
            BinaryOp::Greater => Some(Value::Bool(a > b)),
            BinaryOp::GreaterEqual => Some(Value::Bool(a >= b)),
            BinaryOp::Equal => Some(Value::Bool(a == b)),
            BinaryOp::NotEqual => Some(Value::Bool(a != b)),
            _ => None,
        }
    }};
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let result = match (op, left, right) {
        // Shift counts are masked to the operand width.
        (BinaryOp::ShiftLeft, _, Value::Int32(count)) => shift(left, *count as u32, true),
        (BinaryOp::ShiftRight, _, Value::Int32(count)) => shift(left, *count as u32, false),

        (_, Value::Int32(a), Value::Int32(b)) => integral!(op, *a, *b, Int32),
        (_, Value::UInt32(a), Value::UInt32(b)) => integral!(op, *a, *b, UInt32),
        (_, Value::Int64(a), Value::Int64(b)) => integral!(op, *a, *b, Int64),
        (_, Value::Double(a), Value::Double(b)) => floating(op, a.0, b.0),

        (BinaryOp::BitwiseAnd | BinaryOp::LogicalAnd, Value::Bool(a), Value::Bool(b)) => {
            Some(Value::Bool(*a & *b))
        }
        (BinaryOp::BitwiseOr | BinaryOp::LogicalOr, Value::Bool(a), Value::Bool(b)) => {
            Some(Value::Bool(*a | *b))
        }
        (BinaryOp::BitwiseXor, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(*a ^ *b)),

        (BinaryOp::Equal, _, _) => Some(Value::Bool(left == right)),
        (BinaryOp::NotEqual, _, _) => Some(Value::Bool(left != right)),
        _ => None,
    };
    result.ok_or_else(|| {
        RuntimeError::native(format!(
            "operator '{}' cannot be applied to {:?} and {:?}",
            op, left, right
        ))
    })
}

fn shift(value: &Value, count: u32, left: bool) -> Option<Value> {
    Some(match (value, left) {
        (Value::Int32(v), true) => Value::Int32(v.wrapping_shl(count)),
        (Value::Int32(v), false) => Value::Int32(v.wrapping_shr(count)),
        (Value::UInt32(v), true) => Value::UInt32(v.wrapping_shl(count)),
        (Value::UInt32(v), false) => Value::UInt32(v.wrapping_shr(count)),
        (Value::Int64(v), true) => Value::Int64(v.wrapping_shl(count)),
        (Value::Int64(v), false) => Value::Int64(v.wrapping_shr(count)),
        _ => return None,
    })
}

fn floating(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    Some(match op {
        BinaryOp::Mul => Value::double(a * b),
        BinaryOp::Div => Value::double(a / b),
        BinaryOp::Mod => Value::double(a % b),
        BinaryOp::Add => Value::double(a + b),
        BinaryOp::Sub => Value::double(a - b),
        BinaryOp::Less => Value::Bool(a < b),
        BinaryOp::LessEqual => Value::Bool(a <= b),
        BinaryOp::Greater => Value::Bool(a > b),
        BinaryOp::GreaterEqual => Value::Bool(a >= b),
        BinaryOp::Equal => Value::Bool(a == b),
        BinaryOp::NotEqual => Value::Bool(a != b),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::Int32(i32::MAX), &Value::Int32(1)),
            Ok(Value::Int32(i32::MIN))
        );
        assert_eq!(
            binary(BinaryOp::Sub, &Value::UInt32(0), &Value::UInt32(1)),
            Ok(Value::UInt32(u32::MAX))
        );
    }

    #[test]
    fn integer_division_by_zero_fails() {
        assert_eq!(
            binary(BinaryOp::Div, &Value::Int32(1), &Value::Int32(0)),
            Err(RuntimeError::DivideByZero)
        );
        assert_eq!(
            binary(BinaryOp::Mod, &Value::Int64(1), &Value::Int64(0)),
            Err(RuntimeError::DivideByZero)
        );
        assert_eq!(
            binary(BinaryOp::Div, &Value::double(1.0), &Value::double(0.0)),
            Ok(Value::double(f64::INFINITY))
        );
    }

    #[test]
    fn shift_counts_are_masked() {
        assert_eq!(
            binary(BinaryOp::ShiftLeft, &Value::Int32(1), &Value::Int32(33)),
            Ok(Value::Int32(2))
        );
        assert_eq!(
            binary(BinaryOp::ShiftRight, &Value::Int32(-8), &Value::Int32(1)),
            Ok(Value::Int32(-4))
        );
        assert_eq!(
            binary(BinaryOp::ShiftRight, &Value::UInt32(u32::MAX), &Value::Int32(28)),
            Ok(Value::UInt32(15))
        );
    }

    #[test]
    fn numeric_conversion_truncates() {
        assert_eq!(
            Number::Integer(i64::from(u32::MAX)).convert(DataType::Int32),
            Some(Value::Int32(-1))
        );
        assert_eq!(
            Number::Float(2.9).convert(DataType::Int32),
            Some(Value::Int32(2))
        );
        assert_eq!(Number::Integer(1).convert(DataType::String), None);
    }

    #[test]
    fn equality_covers_references() {
        assert_eq!(
            binary(BinaryOp::Equal, &Value::string("a"), &Value::string("a")),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary(BinaryOp::NotEqual, &Value::Null, &Value::string("a")),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn increments_step_by_one() {
        assert_eq!(step(&Value::Int32(1), 1), Ok(Value::Int32(2)));
        assert_eq!(step(&Value::UInt32(0), -1), Ok(Value::UInt32(u32::MAX)));
        assert_eq!(step(&Value::double(0.5), -1), Ok(Value::double(-0.5)));
        assert!(step(&Value::Bool(true), 1).is_err());
    }
}
