//! Token types for the Lyra lexer.
//!
//! A token is a kind plus a span; its text is always a slice of the source
//! buffer, so tokens never own strings. Literal metadata (multiline string,
//! custom delimiter length, attached comment) rides along in one byte of
//! flags plus two small fields, keeping the whole token at 16 bytes.

mod kind;

pub use kind::TokenKind;

use std::fmt;

use super::Span;

/// Number of [`TokenKind`] variants. Used for bitset sizing and test verification.
pub const TOKEN_KIND_COUNT: usize = 42;

/// Per-token metadata flags packed into a single byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TokenFlags(u8);

impl TokenFlags {
    /// Token is the first non-trivia token on its line.
    pub const AT_LINE_START: u8 = 1 << 0;
    /// A comment precedes this token; see [`Token::comment_start`].
    pub const HAS_COMMENT: u8 = 1 << 1;
    /// String literal delimited by `"""`.
    pub const MULTILINE_STRING: u8 = 1 << 2;
    /// String literal containing at least one `\(...)` segment.
    pub const HAS_INTERPOLATION: u8 = 1 << 3;
    /// Literal ran into the end of input before its closing delimiter.
    pub const UNTERMINATED: u8 = 1 << 4;

    /// Empty flags (no bits set).
    pub const EMPTY: Self = TokenFlags(0);

    /// Create flags from raw bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        TokenFlags(bits)
    }

    /// Get the raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if a specific flag is set.
    #[inline]
    pub const fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Return a copy with the given flag set.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: u8) -> Self {
        TokenFlags(self.0 | flag)
    }
}

/// A token with its span in the source.
///
/// Identity for deduplication purposes is `span.start`; two tokens produced
/// at the same start offset describe the same lexical unit, possibly with a
/// corrected kind.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub flags: TokenFlags,
    /// Number of `#` characters delimiting a raw string literal.
    pub delim_len: u8,
    /// Start of the attached comment range; only meaningful with
    /// [`TokenFlags::HAS_COMMENT`]. The range runs to `span.start`.
    pub comment_start: u32,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            flags: TokenFlags::EMPTY,
            delim_len: 0,
            comment_start: 0,
            span,
        }
    }

    /// Create a dummy token for testing/synthesized positions.
    pub fn dummy(kind: TokenKind) -> Self {
        Token::new(kind, Span::DUMMY)
    }

    /// Token text as a slice of the source buffer.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.to_range()]
    }

    /// Span of the attached comment, if any.
    #[inline]
    pub fn comment_span(&self) -> Option<Span> {
        if self.flags.has(TokenFlags::HAS_COMMENT) {
            Some(Span::new(self.comment_start, self.span.start))
        } else {
            None
        }
    }

    /// Whether the token was preceded by a newline.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.flags.has(TokenFlags::AT_LINE_START)
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

// Size assertions to prevent accidental regressions in frequently-allocated types.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Token, TokenFlags, TokenKind};
    // Token: kind (1) + flags (1) + delim_len (1) + pad (1) + comment_start (4)
    // + span (8) = 16 bytes
    crate::static_assert_size!(Token, 16);
    crate::static_assert_size!(TokenKind, 1);
    crate::static_assert_size!(TokenFlags, 1);
}
