//! Lyra IR - data types shared across the front end.
//!
//! This crate contains the structures every other front-end crate builds on:
//! - Spans for source locations
//! - Tokens, token kinds, and per-token flags
//! - The minimal AST (declarations, expressions, types) with flat arenas
//!
//! # Design Philosophy
//!
//! - **Slice, don't copy**: tokens and names carry spans; text is always
//!   recovered from the source buffer, so nothing here owns a string.
//! - **Flatten everything**: no `Box<Expr>`, use `ExprId(u32)`/`DeclId(u32)`
//!   indices into push-only arenas.
//! - **Value semantics**: `Token`, `Span`, and ids are small `Copy` types so
//!   parser snapshots stay cheap.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod span;
mod token;

pub use span::{Span, SpanError};
pub use token::{Token, TokenFlags, TokenKind, TOKEN_KIND_COUNT};
