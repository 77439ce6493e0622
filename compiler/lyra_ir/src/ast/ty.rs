//! Type annotations.

use crate::Span;

/// A parsed type annotation.
///
/// Types own their children directly rather than going through an arena;
/// annotation trees are shallow in practice.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `Name` or `Name<Args>`.
    Named { name: Span, args: Vec<TypeExpr> },
    /// The `Self` type.
    SelfType,
    /// `A & B`
    Composition(Vec<TypeExpr>),
    /// `(A, B)`, also `()`.
    Tuple(Vec<TypeExpr>),
    /// `(A, B) -> C`
    Fn {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    /// Produced where recovery gave up on a type.
    Error,
}

impl TypeExpr {
    pub fn error(span: Span) -> Self {
        TypeExpr {
            kind: TypeKind::Error,
            span,
        }
    }
}
