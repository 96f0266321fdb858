//! Precedence resolution for one subexpression.
//!
//! A [`Resolver`] accumulates pending operators layer by layer while the
//! builder pushes operands and operators into it. Resolving a layer
//! collapses every pending operation from [`Precedence::Primary`] up to
//! that layer into a completed subtree; tighter layers always collapse
//! before looser ones, which is what encodes precedence.
//!
//! ## Pending state per layer
//!
//! | Layer | State |
//! |---|---|
//! | Primary | at most one call, construction or indexing awaiting its arguments |
//! | Unary | stack of prefix operators, applied last-scheduled first |
//! | Multiplicative..ConditionalOr | one `(left, op)` slot per layer |
//! | ConditionalTernary | stack of `(condition, if_true?)` entries |
//! | Assignment | stack of `(target, op)` entries, resolved right to left |

use std::sync::Arc;

use flexpr_core::{BuildError, ConstructorEntry, DataType, IndexerEntry, MethodEntry};
use tracing::trace;

use crate::ast::{AssignOp, BinaryOp, NodeFactory, NodeRef, Precedence, UnaryOp};

/// The member a pending primary action applies once its arguments are known.
#[derive(Debug, Clone)]
pub enum PrimaryAction {
    Call(Arc<MethodEntry>),
    New {
        data_type: DataType,
        constructor: Arc<ConstructorEntry>,
    },
    Index(Arc<IndexerEntry>),
}

#[derive(Debug)]
struct PendingPrimary {
    target: Option<NodeRef>,
    action: PrimaryAction,
    args: Vec<NodeRef>,
}

#[derive(Debug)]
struct PendingConditional {
    condition: NodeRef,
    /// `None` until the `:` arrives.
    if_true: Option<NodeRef>,
}

/// Outcome of resolving a layer.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// No operand was supplied and nothing pending produced one.
    Empty,
    /// A completed subtree.
    Node(NodeRef),
    /// The operand became the true branch of an open `?` and the false
    /// branch is still to come.
    AwaitingElse,
}

impl Resolved {
    /// The completed subtree, or the error describing why there is none.
    pub fn into_node(self, operation: &str) -> Result<NodeRef, BuildError> {
        match self {
            Resolved::Node(node) => Ok(node),
            Resolved::Empty => Err(BuildError::missing_operand(operation)),
            Resolved::AwaitingElse => Err(BuildError::IncompleteConditional),
        }
    }
}

/// Precedence resolution state of one statement, bracket or argument.
#[derive(Debug, Default)]
pub struct Resolver {
    primary: Option<PendingPrimary>,
    unary: Vec<UnaryOp>,
    binary: [Option<(NodeRef, BinaryOp)>; Precedence::COUNT],
    conditionals: Vec<PendingConditional>,
    assignments: Vec<(NodeRef, AssignOp)>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is pending on any layer.
    pub fn is_idle(&self) -> bool {
        self.primary.is_none()
            && self.unary.is_empty()
            && self.binary.iter().all(Option::is_none)
            && self.conditionals.is_empty()
            && self.assignments.is_empty()
    }

    #[inline]
    pub fn has_pending_action(&self) -> bool {
        self.primary.is_some()
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Start a call, construction or indexing whose arguments follow.
    pub fn schedule_parameterized(
        &mut self,
        target: Option<NodeRef>,
        action: PrimaryAction,
    ) -> Result<(), BuildError> {
        if self.primary.is_some() {
            return Err(BuildError::PendingActionExists);
        }
        self.primary = Some(PendingPrimary {
            target,
            action,
            args: Vec::new(),
        });
        Ok(())
    }

    /// Append a resolved argument to the pending action.
    pub fn add_argument(&mut self, argument: NodeRef) -> Result<(), BuildError> {
        let pending = self.primary.as_mut().ok_or(BuildError::Unmatched {
            token: "argument",
            expected: "call, new or index_by",
        })?;
        pending.args.push(argument);
        Ok(())
    }

    pub fn schedule_unary(&mut self, op: UnaryOp) {
        self.unary.push(op);
    }

    /// Record `left op _` on the operator's layer.
    ///
    /// The caller must have resolved `left` through that layer, so the slot
    /// is free.
    pub fn schedule_binary(&mut self, left: NodeRef, op: BinaryOp) {
        self.binary[op.precedence().index()] = Some((left, op));
    }

    pub fn schedule_conditional(&mut self, condition: NodeRef) {
        self.conditionals.push(PendingConditional {
            condition,
            if_true: None,
        });
    }

    pub fn schedule_assignment(&mut self, target: NodeRef, op: AssignOp) {
        self.assignments.push((target, op));
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Collapse every pending operation up to and including `layer`.
    ///
    /// Only [`Precedence::ConditionalTernary`] can answer
    /// [`Resolved::AwaitingElse`]; looser layers turn an open `?` into
    /// [`BuildError::IncompleteConditional`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_layer(
        &mut self,
        fragment: Option<NodeRef>,
        layer: Precedence,
        factory: &NodeFactory<'_>,
    ) -> Result<Resolved, BuildError> {
        if layer <= Precedence::ConditionalOr {
            let operand = self.resolve_operand(fragment, layer, factory)?;
            return Ok(operand.map_or(Resolved::Empty, Resolved::Node));
        }

        let operand = self.resolve_operand(fragment, Precedence::ConditionalOr, factory)?;
        let resolved = self.resolve_conditional(operand, factory)?;
        if layer == Precedence::ConditionalTernary {
            return Ok(resolved);
        }

        match resolved {
            Resolved::AwaitingElse => Err(BuildError::IncompleteConditional),
            Resolved::Empty if !self.assignments.is_empty() => {
                Err(BuildError::missing_operand("assignment"))
            }
            Resolved::Empty => Ok(Resolved::Empty),
            Resolved::Node(node) => Ok(Resolved::Node(self.resolve_assignment(node, factory)?)),
        }
    }

    /// Resolve a whole statement, bracket or argument.
    pub fn resolve_statement(
        &mut self,
        fragment: Option<NodeRef>,
        factory: &NodeFactory<'_>,
    ) -> Result<Resolved, BuildError> {
        self.resolve_layer(fragment, Precedence::Statement, factory)
    }

    /// Layers from Primary to ConditionalOr.
    fn resolve_operand(
        &mut self,
        fragment: Option<NodeRef>,
        layer: Precedence,
        factory: &NodeFactory<'_>,
    ) -> Result<Option<NodeRef>, BuildError> {
        let Some(tighter) = layer.tighter() else {
            return self.resolve_primary(fragment, factory);
        };
        let operand = self.resolve_operand(fragment, tighter, factory)?;
        if layer == Precedence::Unary {
            self.resolve_unary(operand, factory)
        } else {
            self.resolve_binary(operand, layer, factory)
        }
    }

    fn resolve_primary(
        &mut self,
        fragment: Option<NodeRef>,
        factory: &NodeFactory<'_>,
    ) -> Result<Option<NodeRef>, BuildError> {
        let Some(pending) = self.primary.take() else {
            return Ok(fragment);
        };
        if fragment.is_some() {
            return Err(BuildError::PendingActionExists);
        }

        trace!(args = pending.args.len(), "collapse primary action");
        let node = match pending.action {
            PrimaryAction::Call(method) => factory.call(pending.target, method, pending.args)?,
            PrimaryAction::New {
                data_type,
                constructor,
            } => factory.new_object(data_type, constructor, pending.args)?,
            PrimaryAction::Index(indexer) => {
                let target = pending
                    .target
                    .ok_or_else(|| BuildError::missing_operand("index_by"))?;
                factory.index(target, indexer, pending.args)?
            }
        };
        Ok(Some(node))
    }

    fn resolve_unary(
        &mut self,
        operand: Option<NodeRef>,
        factory: &NodeFactory<'_>,
    ) -> Result<Option<NodeRef>, BuildError> {
        if self.unary.is_empty() {
            return Ok(operand);
        }
        let mut node = operand.ok_or_else(|| {
            let op = self.unary.last().map(ToString::to_string).unwrap_or_default();
            BuildError::missing_operand(op)
        })?;
        while let Some(op) = self.unary.pop() {
            trace!(%op, "collapse unary");
            node = factory.unary(op, node)?;
        }
        Ok(Some(node))
    }

    fn resolve_binary(
        &mut self,
        operand: Option<NodeRef>,
        layer: Precedence,
        factory: &NodeFactory<'_>,
    ) -> Result<Option<NodeRef>, BuildError> {
        let Some((left, op)) = self.binary[layer.index()].take() else {
            return Ok(operand);
        };
        let right = operand.ok_or_else(|| BuildError::missing_operand(op.to_string()))?;
        trace!(?layer, %op, "collapse binary");
        factory.binary(op, left, right).map(Some)
    }

    fn resolve_conditional(
        &mut self,
        operand: Option<NodeRef>,
        factory: &NodeFactory<'_>,
    ) -> Result<Resolved, BuildError> {
        if self.conditionals.is_empty() {
            return Ok(operand.map_or(Resolved::Empty, Resolved::Node));
        }
        let mut node = operand.ok_or_else(|| BuildError::missing_operand("?:"))?;
        while let Some(pending) = self.conditionals.pop() {
            match pending.if_true {
                None => {
                    trace!("conditional awaits its false branch");
                    self.conditionals.push(PendingConditional {
                        condition: pending.condition,
                        if_true: Some(node),
                    });
                    return Ok(Resolved::AwaitingElse);
                }
                Some(if_true) => {
                    trace!("collapse conditional");
                    node = factory.conditional(pending.condition, if_true, node)?;
                }
            }
        }
        Ok(Resolved::Node(node))
    }

    fn resolve_assignment(
        &mut self,
        mut node: NodeRef,
        factory: &NodeFactory<'_>,
    ) -> Result<NodeRef, BuildError> {
        while let Some((target, op)) = self.assignments.pop() {
            trace!(%op, "collapse assignment");
            node = factory.assign(op, target, node)?;
        }
        Ok(node)
    }
}
