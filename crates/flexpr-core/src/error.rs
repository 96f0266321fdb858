//! Unified error types.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FlexprError (top-level wrapper)
//! ├── RegistrationError - Host type registration errors
//! ├── BuildError        - Tree construction errors (reported at the offending builder call)
//! └── RuntimeError      - Evaluation errors
//! ```
//!
//! A builder that returned a `BuildError` is left in an unspecified state
//! and must not be reused.

use thiserror::Error;

use crate::TypeHash;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while registering host types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A type with the same name is already registered.
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    /// A type references an interface that has not been registered.
    #[error("type '{name}' implements unknown interface {interface}")]
    UnknownInterface { name: String, interface: TypeHash },
}

// ============================================================================
// Build Errors
// ============================================================================

/// The kind of member a lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    Indexer,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Indexer => "indexer",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised by a builder call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A name already known in the current scope was declared again.
    #[error("a variable named '{name}' is already defined in this scope")]
    DuplicateDeclaration { name: String },

    /// A variable reference names nothing in scope.
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// Member lookup found no candidate.
    #[error("no {kind} '{name}({signature})' found on type '{type_name}'")]
    MemberNotFound {
        kind: MemberKind,
        type_name: String,
        name: String,
        signature: String,
    },

    /// Member lookup found more than one candidate.
    #[error("{count} {kind}s '{name}({signature})' match on type '{type_name}'")]
    AmbiguousMember {
        kind: MemberKind,
        type_name: String,
        name: String,
        signature: String,
        count: usize,
    },

    /// An indexer lookup was requested with no index types.
    #[error("at least one type to index by must be provided")]
    EmptyIndexSignature,

    /// A unary operator arrived after its operand had started.
    #[error("unary operator '{op}' must be provided before its operand")]
    UnaryAfterOperand { op: String },

    /// A leaf arrived while an operand already exists.
    #[error("an operand already exists; '{operation}' needs an operator first")]
    OperandAlreadyPresent { operation: String },

    /// An operation needs an operand but none has been produced.
    #[error("'{operation}' requires an operand")]
    MissingOperand { operation: String },

    /// A call, construction or indexing was started while another one is
    /// still waiting for its argument list in the same context.
    #[error("a parameterized action is already pending in this context")]
    PendingActionExists,

    /// An argument list was opened and must be continued with `argument`
    /// or closed with `end_args`.
    #[error("'{operation}' cannot follow the start of an argument list")]
    ArgumentListExpected { operation: String },

    /// A statement-level operation arrived in the middle of a statement.
    #[error("'{operation}' must start a new statement")]
    StatementInProgress { operation: String },

    /// A closing structural token has no matching opening one.
    #[error("'{token}' has no matching '{expected}'")]
    Unmatched {
        token: &'static str,
        expected: &'static str,
    },

    /// An inline else resolved to a complete value instead of an open `?`.
    #[error("cannot add inline else (':') without matching inline if ('?')")]
    UnmatchedElse,

    /// A `?` was never followed by its `:`.
    #[error("inline if ('?') has no matching inline else (':')")]
    IncompleteConditional,

    /// Completion was requested with unfinished state.
    #[error("cannot complete: {reason}")]
    IncompleteBuild { reason: String },

    /// Operand types do not fit an operator or member.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// The target of an assignment cannot be written.
    #[error("not assignable: {message}")]
    NotAssignable { message: String },

    /// Parameter names do not match the signature arity.
    #[error("signature has {expected} parameter(s) but {found} name(s) were given")]
    SignatureArity { expected: usize, found: usize },
}

impl BuildError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        BuildError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn not_assignable(message: impl Into<String>) -> Self {
        BuildError::NotAssignable {
            message: message.into(),
        }
    }

    pub fn missing_operand(operation: impl Into<String>) -> Self {
        BuildError::MissingOperand {
            operation: operation.into(),
        }
    }
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised while evaluating a finished tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("attempted to divide by zero")]
    DivideByZero,

    #[error("member '{member}' accessed on a null reference")]
    NullReference { member: String },

    #[error("unable to cast value of type '{from}' to type '{to}'")]
    InvalidCast { from: String, to: String },

    #[error("lambda expects {expected} argument(s), got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("variable '{name}' read before it was assigned")]
    UnsetVariable { name: String },

    #[error("'{member}' has no implementation to invoke")]
    MissingImplementation { member: String },

    #[error("{message}")]
    Native { message: String },
}

impl RuntimeError {
    pub fn native(message: impl Into<String>) -> Self {
        RuntimeError::Native {
            message: message.into(),
        }
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Umbrella error for hosts that drive registration, building and evaluation
/// through a single `Result`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlexprError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
