//! Expressions.

use crate::ast::ExprId;
use crate::Span;

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(u64),
    /// Bit pattern of the parsed `f64`, so `Expr` stays `Eq`-adjacent.
    Float(u64),
    /// A string literal, split into literal and interpolated pieces.
    Str(Vec<StringPiece>),
    Name(Span),
    /// `base.name`
    Member { base: ExprId, name: Span },
    /// `base.0`
    TupleIndex { base: ExprId, index: u32 },
    Call { callee: ExprId, args: Vec<CallArg> },
    Paren(ExprId),
    Tuple(Vec<CallArg>),
    Prefix { op: Span, operand: ExprId },
    Binary { op: Span, lhs: ExprId, rhs: ExprId },
    /// Produced where recovery consumed tokens without a parse.
    Error,
    /// Stands in for the expression under a completion marker.
    CodeComplete,
}

/// One piece of a string literal.
///
/// `Lit` spans cover raw literal text between delimiters and interpolation
/// markers. `Interp` holds the argument list of one `\(...)` segment.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPiece {
    Lit(Span),
    Interp(Vec<CallArg>),
}

/// A call argument, optionally labeled: `f(x: 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub label: Option<Span>,
    pub value: ExprId,
}

impl CallArg {
    pub fn unlabeled(value: ExprId) -> Self {
        CallArg { label: None, value }
    }
}
