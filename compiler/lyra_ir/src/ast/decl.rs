//! Declarations and statements.

use crate::ast::{DeclId, ExprId, TypeExpr};
use crate::Span;

/// A declaration with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Fn(FnDecl),
    Struct(StructDecl),
    Extension(ExtensionDecl),
    Binding(BindingDecl),
    /// Executable statements at file scope, grouped into one declaration.
    TopLevel(TopLevelCode),
}

/// `fn name(params) -> Ret { ... }`
///
/// The name span covers an identifier or an operator token.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Span,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub body: FnBody,
}

/// A function parameter. `label` is present for `label name: Ty` forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub label: Option<Span>,
    pub name: Span,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// The body of a function declaration.
///
/// Bodies are skipped on the first pass when delayed parsing is enabled;
/// `Delayed` keeps the brace-to-brace span so a later pass can reparse it.
#[derive(Debug, Clone, PartialEq)]
pub enum FnBody {
    Parsed(Block),
    Delayed(Span),
    None,
}

/// `struct Name { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Span,
    pub members: Vec<DeclId>,
}

/// `extension Target { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDecl {
    pub target: TypeExpr,
    pub members: Vec<DeclId>,
}

/// `var name: Ty = init` or `let name: Ty = init`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDecl {
    pub keyword: BindingKeyword,
    pub name: Span,
    pub ty: Option<TypeExpr>,
    pub init: Option<ExprId>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingKeyword {
    Var,
    Let,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelCode {
    pub body: Block,
}

/// A braced (or file-scope) statement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(ExprId),
    Return(Option<ExprId>),
    Binding(BindingDecl),
}
