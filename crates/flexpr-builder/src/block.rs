//! Statement blocks.
//!
//! A [`StatementBlock`] owns the variable scope, the completed statements
//! and a stack of [`Resolver`] contexts. The bottom context is the
//! statement being built; brackets and argument slots push a fresh context
//! on top of it.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use flexpr_core::{BuildError, DataType};

use crate::ast::{NodeFactory, NodeRef, Variable, VariableId};
use crate::resolver::Resolver;

/// What opened a resolver context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The statement itself; never popped
    Statement,
    /// A bracketed subexpression
    Bracket,
    /// One argument of a call, construction or indexing
    Argument,
}

#[derive(Debug)]
struct Context {
    kind: ContextKind,
    resolver: Resolver,
}

impl Context {
    fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            resolver: Resolver::new(),
        }
    }
}

/// Scope, statements and resolver contexts of one block.
#[derive(Debug)]
pub struct StatementBlock {
    known: FxHashMap<String, Arc<Variable>>,
    declared: Vec<Arc<Variable>>,
    statements: Vec<NodeRef>,
    contexts: Vec<Context>,
}

impl StatementBlock {
    /// Create a block seeded with the names visible from outside it.
    pub fn new(known: FxHashMap<String, Arc<Variable>>) -> Self {
        Self {
            known,
            declared: Vec::new(),
            statements: Vec::new(),
            contexts: vec![Context::new(ContextKind::Statement)],
        }
    }

    /// Create a nested block that sees every name this block knows.
    pub fn nested(&self) -> Self {
        Self::new(self.known.clone())
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Declare a variable in this block.
    pub fn declare(
        &mut self,
        id: VariableId,
        data_type: DataType,
        name: &str,
    ) -> Result<Arc<Variable>, BuildError> {
        if self.known.contains_key(name) {
            return Err(BuildError::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        let variable = Arc::new(Variable {
            id,
            name: name.to_string(),
            data_type,
        });
        self.declared.push(variable.clone());
        self.known.insert(variable.name.clone(), variable.clone());
        debug!(name, %data_type, "declared variable");
        Ok(variable)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<Variable>, BuildError> {
        self.known
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownVariable {
                name: name.to_string(),
            })
    }

    // =========================================================================
    // Contexts
    // =========================================================================

    /// The innermost resolver context.
    pub fn current(&mut self) -> &mut Resolver {
        let last = self.contexts.len() - 1;
        &mut self.contexts[last].resolver
    }

    pub fn current_kind(&self) -> ContextKind {
        self.contexts
            .last()
            .map_or(ContextKind::Statement, |context| context.kind)
    }

    pub fn begin_subexpression(&mut self, kind: ContextKind) {
        self.contexts.push(Context::new(kind));
    }

    /// Pop the innermost context, which must be of `kind`. The caller has
    /// already resolved everything pending in it.
    pub fn end_subexpression(&mut self, kind: ContextKind) -> Result<(), BuildError> {
        if self.contexts.len() < 2 || self.current_kind() != kind {
            return Err(unmatched(kind));
        }
        self.contexts.pop();
        Ok(())
    }

    /// Whether the block sits between statements: only the statement
    /// context is open and nothing is pending in it.
    pub fn is_idle(&self) -> bool {
        self.contexts.len() == 1 && self.contexts.iter().all(|c| c.resolver.is_idle())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn add_statement(&mut self, statement: NodeRef) {
        debug!(statement = %statement, "statement added");
        self.statements.push(statement);
    }

    /// Wrap the statements into a single node.
    ///
    /// No statements yield an empty node. A single statement is returned
    /// unwrapped when the block declares no variables of its own.
    pub fn finish(self, factory: &NodeFactory<'_>) -> NodeRef {
        let statements = self.statements;
        if statements.is_empty() {
            return factory.empty();
        }
        if let ([], [statement]) = (self.declared.as_slice(), statements.as_slice()) {
            return statement.clone();
        }
        debug!(
            statements = statements.len(),
            variables = self.declared.len(),
            "block finished"
        );
        factory.block(self.declared, statements)
    }
}

fn unmatched(kind: ContextKind) -> BuildError {
    match kind {
        ContextKind::Bracket => BuildError::Unmatched {
            token: "unbrace",
            expected: "brace",
        },
        ContextKind::Argument => BuildError::Unmatched {
            token: "end of argument",
            expected: "argument",
        },
        ContextKind::Statement => BuildError::Unmatched {
            token: "end_statement",
            expected: "statement",
        },
    }
}
