//! Minimal AST for the Lyra front end.
//!
//! Only the shapes the parsing engine itself needs: enough declaration
//! structure to re-attach delayed bodies, enough expression structure to
//! parse function bodies and interpolation segments, and enough type
//! structure to exercise generic-argument recovery. Nothing here is a
//! complete surface syntax.
//!
//! Declarations and expressions live in flat arenas and are addressed by
//! `u32` ids; types are small enough to own their children directly.

mod decl;
mod expr;
mod ty;

pub use decl::{
    BindingDecl, BindingKeyword, Block, Decl, DeclKind, ExtensionDecl, FnBody, FnDecl, Param,
    Stmt, StmtKind, StructDecl, TopLevelCode,
};
pub use expr::{CallArg, Expr, ExprKind, StringPiece};
pub use ty::{TypeExpr, TypeKind};

use crate::Span;

/// Index into a [`DeclArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct DeclId(u32);

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ExprId(u32);

macro_rules! arena_id {
    ($id:ident) => {
        impl $id {
            /// Create from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $id(index)
            }

            /// Index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

arena_id!(DeclId);
arena_id!(ExprId);

/// Push-only arena of declarations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        DeclArena::default()
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(u32::try_from(self.decls.len()).unwrap_or(u32::MAX));
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Push-only arena of expressions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// A parsed source buffer: top-level declarations in source order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceFile {
    pub items: Vec<DeclId>,
    pub span: Span,
}

impl SourceFile {
    pub fn new(span: Span) -> Self {
        SourceFile {
            items: Vec::new(),
            span,
        }
    }
}
