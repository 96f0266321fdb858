//! Operator definitions.
//!
//! Provides enums for unary, postfix, binary and assignment operators along
//! with the precedence layer each binary operator lives on.

use std::fmt;

use flexpr_core::DataType;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Operator precedence layers, from tightest-binding to loosest.
///
/// The order is fixed and total: resolution always proceeds from a layer to
/// the next looser one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum Precedence {
    /// Calls, construction, indexing
    Primary = 0,
    /// Prefix operators and conversions
    Unary = 1,
    /// `*`, `/`, `%`
    Multiplicative = 2,
    /// `+`, `-`
    Additive = 3,
    /// `<<`, `>>`
    Shift = 4,
    /// `<`, `<=`, `>`, `>=`, `is`, `as`
    Relational = 5,
    /// `==`, `!=`
    Equality = 6,
    /// `&`
    BitwiseAnd = 7,
    /// `^`
    BitwiseXor = 8,
    /// `|`
    BitwiseOr = 9,
    /// `&&`
    ConditionalAnd = 10,
    /// `||`
    ConditionalOr = 11,
    /// `?:`
    ConditionalTernary = 12,
    /// `=`, `+=`, ...
    Assignment = 13,
    /// A whole statement or bracketed subexpression
    Statement = 14,
}

impl Precedence {
    /// Number of layers.
    pub const COUNT: usize = 15;

    /// The next tighter layer, `None` for [`Precedence::Primary`].
    #[inline]
    pub fn tighter(self) -> Option<Precedence> {
        let index = u8::from(self).checked_sub(1)?;
        Precedence::try_from(index).ok()
    }

    /// Slot index of this layer.
    #[inline]
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Multiplicative
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,

    // Additive
    /// `+`
    Add,
    /// `-`
    Sub,

    // Shift
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,

    // Relational
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Equality
    /// `==`
    Equal,
    /// `!=`
    NotEqual,

    /// `&`
    BitwiseAnd,
    /// `^`
    BitwiseXor,
    /// `|`
    BitwiseOr,

    /// `&&`, short-circuiting
    LogicalAnd,
    /// `||`, short-circuiting
    LogicalOr,
}

impl BinaryOp {
    /// The layer this operator binds on.
    pub fn precedence(self) -> Precedence {
        use BinaryOp::*;
        match self {
            Mul | Div | Mod => Precedence::Multiplicative,
            Add | Sub => Precedence::Additive,
            ShiftLeft | ShiftRight => Precedence::Shift,
            Less | LessEqual | Greater | GreaterEqual => Precedence::Relational,
            Equal | NotEqual => Precedence::Equality,
            BitwiseAnd => Precedence::BitwiseAnd,
            BitwiseXor => Precedence::BitwiseXor,
            BitwiseOr => Precedence::BitwiseOr,
            LogicalAnd => Precedence::ConditionalAnd,
            LogicalOr => Precedence::ConditionalOr,
        }
    }

    /// Check if this operator yields `bool` from non-boolean operands.
    pub fn is_comparison(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Add | BinaryOp::Sub
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Mul => "*",
            Div => "/",
            Mod => "%",
            Add => "+",
            Sub => "-",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            BitwiseAnd => "&",
            BitwiseXor => "^",
            BitwiseOr => "|",
            LogicalAnd => "&&",
            LogicalOr => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-` negation
    Negate,
    /// `!` logical NOT
    LogicalNot,
    /// `~` bitwise NOT
    BitwiseNot,
    /// `++` pre-increment
    PreIncrement,
    /// `--` pre-decrement
    PreDecrement,
    /// `(T)` conversion
    Convert(DataType),
}

impl UnaryOp {
    /// Whether the operator writes back to its operand.
    pub fn is_mutating(self) -> bool {
        matches!(self, UnaryOp::PreIncrement | UnaryOp::PreDecrement)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::LogicalNot => write!(f, "!"),
            UnaryOp::BitwiseNot => write!(f, "~"),
            UnaryOp::PreIncrement => write!(f, "++"),
            UnaryOp::PreDecrement => write!(f, "--"),
            UnaryOp::Convert(ty) => write!(f, "({})", ty),
        }
    }
}

/// Postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    /// `++` post-increment
    PostIncrement,
    /// `--` post-decrement
    PostDecrement,
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostfixOp::PostIncrement => "++",
            PostfixOp::PostDecrement => "--",
        };
        write!(f, "{}", s)
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
    /// `&=`
    AndAssign,
    /// `|=`
    OrAssign,
    /// `^=`
    XorAssign,
    /// `<<=`
    ShiftLeftAssign,
    /// `>>=`
    ShiftRightAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        use AssignOp::*;
        Some(match self {
            Assign => return None,
            AddAssign => BinaryOp::Add,
            SubAssign => BinaryOp::Sub,
            MulAssign => BinaryOp::Mul,
            DivAssign => BinaryOp::Div,
            ModAssign => BinaryOp::Mod,
            AndAssign => BinaryOp::BitwiseAnd,
            OrAssign => BinaryOp::BitwiseOr,
            XorAssign => BinaryOp::BitwiseXor,
            ShiftLeftAssign => BinaryOp::ShiftLeft,
            ShiftRightAssign => BinaryOp::ShiftRight,
        })
    }

    /// Check if this is a simple assignment (not compound).
    pub fn is_simple(self) -> bool {
        matches!(self, Self::Assign)
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binary_op() {
            Some(op) => write!(f, "{}=", op),
            None => write!(f, "="),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_ordered_tightest_first() {
        assert!(Precedence::Primary < Precedence::Unary);
        assert!(Precedence::Multiplicative < Precedence::Additive);
        assert!(Precedence::BitwiseOr < Precedence::ConditionalAnd);
        assert!(Precedence::Assignment < Precedence::Statement);
    }

    #[test]
    fn tighter_walks_down_to_primary() {
        assert_eq!(Precedence::Statement.tighter(), Some(Precedence::Assignment));
        assert_eq!(Precedence::Unary.tighter(), Some(Precedence::Primary));
        assert_eq!(Precedence::Primary.tighter(), None);

        let mut layer = Precedence::Statement;
        let mut steps = 0;
        while let Some(next) = layer.tighter() {
            layer = next;
            steps += 1;
        }
        assert_eq!(steps + 1, Precedence::COUNT);
    }

    #[test]
    fn binary_layers() {
        assert_eq!(BinaryOp::Mod.precedence(), Precedence::Multiplicative);
        assert_eq!(BinaryOp::BitwiseXor.precedence(), Precedence::BitwiseXor);
        assert_eq!(BinaryOp::LogicalOr.precedence(), Precedence::ConditionalOr);
        assert!(BinaryOp::LessEqual.is_comparison());
        assert!(!BinaryOp::BitwiseAnd.is_comparison());
    }

    #[test]
    fn compound_assignments_map_to_binary() {
        assert_eq!(AssignOp::Assign.binary_op(), None);
        assert_eq!(AssignOp::ModAssign.binary_op(), Some(BinaryOp::Mod));
        assert_eq!(AssignOp::ShiftRightAssign.binary_op(), Some(BinaryOp::ShiftRight));
        assert_eq!(AssignOp::XorAssign.to_string(), "^=");
        assert_eq!(AssignOp::Assign.to_string(), "=");
    }

    #[test]
    fn display() {
        assert_eq!(UnaryOp::Convert(DataType::Int32).to_string(), "(int)");
        assert_eq!(BinaryOp::ShiftLeft.to_string(), "<<");
        assert_eq!(PostfixOp::PostDecrement.to_string(), "--");
    }
}
