//! Typestate fluent surface over [`BodyBuilder`].
//!
//! Every state only offers the operations that are legal at that point of a
//! statement, so most misuse fails to compile:
//!
//! - [`StatementStarter`]: between statements
//! - [`OperandStarter`]: an operand is expected
//! - [`ExpressionExpander`]: an operand was just completed
//! - [`ArgumentListStarter`]: a call, construction or indexing awaits its
//!   arguments
//!
//! ```
//! use flexpr_builder::{Flex, OperandStart, Signature};
//! use flexpr_core::{BuildError, DataType};
//! use flexpr_registry::TypeRegistry;
//!
//! # fn main() -> Result<(), BuildError> {
//! let registry = TypeRegistry::new();
//! let signature = Signature::new(DataType::Int32, vec![DataType::Int32]);
//! let lambda = Flex::start_lambda(&registry, &signature, &["x"])?
//!     .var("x")?
//!     .add()?
//!     .constant(1)?
//!     .end_statement()?
//!     .complete_lambda()?;
//! assert_eq!(lambda.body().to_string(), "(x + 1)");
//! # Ok(())
//! # }
//! ```

use flexpr_core::{BuildError, DataType, Value};
use flexpr_registry::TypeLookup;

use crate::ast::NodeRef;
use crate::builder::BodyBuilder;
use crate::lambda::{Lambda, Signature};

/// Entry points of the fluent surface.
pub struct Flex;

impl Flex {
    /// Start a parameterless lambda returning `return_type`.
    pub fn start_expression(lookup: &dyn TypeLookup, return_type: DataType) -> StatementStarter<'_> {
        StatementStarter(BodyBuilder::expression(lookup, return_type))
    }

    /// Start a parameterless lambda returning nothing.
    pub fn start_action(lookup: &dyn TypeLookup) -> StatementStarter<'_> {
        StatementStarter(BodyBuilder::action(lookup))
    }

    /// Start a lambda over named parameters.
    pub fn start_lambda<'a>(
        lookup: &'a dyn TypeLookup,
        signature: &Signature,
        names: &[&str],
    ) -> Result<StatementStarter<'a>, BuildError> {
        BodyBuilder::new(lookup, signature, names).map(StatementStarter)
    }
}

pub struct StatementStarter<'a>(BodyBuilder<'a>);

pub struct OperandStarter<'a>(BodyBuilder<'a>);

pub struct ExpressionExpander<'a>(BodyBuilder<'a>);

pub struct ArgumentListStarter<'a>(BodyBuilder<'a>);

/// Generate state transitions that forward to the builder operation of the
/// same name.
macro_rules! transitions {
    ($( $(#[$meta:meta])* $vis:vis fn $name:ident ( $($arg:ident : $ty:ty),* ) -> $next:ident; )*) => {
        $(
            $(#[$meta])*
            $vis fn $name(self, $($arg: $ty),*) -> Result<$next<'a>, BuildError> {
                let mut body = self.into_body();
                body.$name($($arg),*)?;
                Ok($next(body))
            }
        )*
    };
}

/// Operations that start an operand. Available wherever an operand may
/// begin: at a statement start and after any operator.
pub trait OperandStart<'a>: Sized {
    /// Give up the typestate and continue with the raw builder.
    fn into_body(self) -> BodyBuilder<'a>;

    transitions! {
        fn null() -> ExpressionExpander;
        fn null_of(data_type: DataType) -> ExpressionExpander;
        fn default_of(data_type: DataType) -> ExpressionExpander;
        fn constant(value: impl Into<Value>) -> ExpressionExpander;
        fn constant_typed(value: impl Into<Value>, data_type: DataType) -> ExpressionExpander;
        fn var(name: &str) -> ExpressionExpander;
        fn subexpression(node: NodeRef) -> ExpressionExpander;
        fn new_no_args(data_type: DataType) -> ExpressionExpander;
        fn new_object(data_type: DataType, params: &[DataType]) -> ArgumentListStarter;
        fn call_static(owner: DataType, name: &str, params: &[DataType]) -> ArgumentListStarter;
        fn plus() -> OperandStarter;
        fn minus() -> OperandStarter;
        fn not() -> OperandStarter;
        fn bitwise_not() -> OperandStarter;
        fn pre_increment() -> OperandStarter;
        fn pre_decrement() -> OperandStarter;
        fn convert(data_type: DataType) -> OperandStarter;
        fn brace() -> OperandStarter;
    }
}

impl<'a> OperandStart<'a> for StatementStarter<'a> {
    fn into_body(self) -> BodyBuilder<'a> {
        self.0
    }
}

impl<'a> OperandStart<'a> for OperandStarter<'a> {
    fn into_body(self) -> BodyBuilder<'a> {
        self.0
    }
}

impl<'a> StatementStarter<'a> {
    transitions! {
        pub fn declare(data_type: DataType, name: &str) -> StatementStarter;
        pub fn declare_and_assign(data_type: DataType, name: &str) -> OperandStarter;
        pub fn declare_and_init(data_type: DataType, name: &str, value: impl Into<Value>) -> StatementStarter;
        pub fn do_nothing() -> StatementStarter;
        pub fn begin_block() -> StatementStarter;
        pub fn end_block() -> StatementStarter;
    }

    pub fn complete(self) -> Result<NodeRef, BuildError> {
        self.0.complete()
    }

    pub fn complete_lambda(self) -> Result<Lambda, BuildError> {
        self.0.complete_lambda()
    }
}

impl<'a> ExpressionExpander<'a> {
    /// Give up the typestate and continue with the raw builder.
    pub fn into_body(self) -> BodyBuilder<'a> {
        self.0
    }

    transitions! {
        pub fn field(name: &str) -> ExpressionExpander;
        pub fn property(name: &str) -> ExpressionExpander;
        pub fn post_increment() -> ExpressionExpander;
        pub fn post_decrement() -> ExpressionExpander;
        pub fn call(name: &str, params: &[DataType]) -> ArgumentListStarter;
        pub fn call_no_args(name: &str) -> ExpressionExpander;
        pub fn index_by(index_types: &[DataType]) -> ArgumentListStarter;

        pub fn multiply() -> OperandStarter;
        pub fn divide() -> OperandStarter;
        pub fn modulo() -> OperandStarter;
        pub fn add() -> OperandStarter;
        pub fn subtract() -> OperandStarter;
        pub fn shift_left() -> OperandStarter;
        pub fn shift_right() -> OperandStarter;
        pub fn greater_than() -> OperandStarter;
        pub fn greater_than_or_equal() -> OperandStarter;
        pub fn less_than() -> OperandStarter;
        pub fn less_than_or_equal() -> OperandStarter;
        pub fn equal() -> OperandStarter;
        pub fn not_equal() -> OperandStarter;
        pub fn bitwise_and() -> OperandStarter;
        pub fn bitwise_xor() -> OperandStarter;
        pub fn bitwise_or() -> OperandStarter;
        pub fn and() -> OperandStarter;
        pub fn or() -> OperandStarter;
        pub fn type_is(data_type: DataType) -> ExpressionExpander;
        pub fn type_as(data_type: DataType) -> ExpressionExpander;

        pub fn inline_if() -> OperandStarter;
        pub fn inline_else() -> OperandStarter;

        pub fn assign() -> OperandStarter;
        pub fn add_assign() -> OperandStarter;
        pub fn subtract_assign() -> OperandStarter;
        pub fn multiply_assign() -> OperandStarter;
        pub fn divide_assign() -> OperandStarter;
        pub fn modulo_assign() -> OperandStarter;
        pub fn shift_left_assign() -> OperandStarter;
        pub fn shift_right_assign() -> OperandStarter;
        pub fn bitwise_and_assign() -> OperandStarter;
        pub fn bitwise_xor_assign() -> OperandStarter;
        pub fn bitwise_or_assign() -> OperandStarter;

        /// Close a bracket.
        pub fn unbrace() -> ExpressionExpander;
        /// Close the current argument and start the next one.
        pub fn argument() -> OperandStarter;
        /// Close the current argument and the argument list.
        pub fn end_args() -> ExpressionExpander;
        pub fn end_statement() -> StatementStarter;
    }

    /// The operand built so far.
    pub fn fragment(&self) -> Option<&NodeRef> {
        self.0.fragment()
    }
}

impl<'a> ArgumentListStarter<'a> {
    pub fn into_body(self) -> BodyBuilder<'a> {
        self.0
    }

    transitions! {
        /// Start the first argument.
        pub fn argument() -> OperandStarter;
        /// Close an empty argument list.
        pub fn end_args() -> ExpressionExpander;
    }
}
