//! Token kinds for Lyra.

use std::fmt;

/// Token kinds for Lyra.
///
/// Kinds carry no payload; a token's text is always a slice of the source
/// buffer identified by its span. This keeps the discriminant in one byte
/// and makes kind sets representable as a `u128` bitset.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    /// End of input. Also produced forever after the lexer is cut off.
    Eof,
    /// A byte sequence with no lexical interpretation.
    Unknown,
    /// Zero-width marker at the interactive-completion offset.
    CodeComplete,
    /// A comment, when the retention policy returns comments as tokens.
    Comment,

    Ident,
    IntLit,
    FloatLit,
    /// Whole string literal, quotes and delimiters included.
    StringLit,
    /// Quote padding emitted when an interpolated literal is decomposed.
    StringQuote,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Comma,
    Colon,
    Semi,
    Dot,
    Arrow,
    Eq,
    /// Maximal-munch operator (`+`, `==`, `>>`, `&`, ...).
    Oper,
    /// `<` confirmed as a generic-argument opener.
    LAngle,
    /// `>` confirmed as a generic-argument closer, possibly split off a
    /// longer operator.
    RAngle,

    PoundIf,
    PoundElse,
    PoundElseif,
    PoundEndif,

    KwFn,
    KwVar,
    KwLet,
    KwInout,
    KwStruct,
    KwExtension,
    KwReturn,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwBreak,
    KwContinue,
    /// `Self`, the type-self reference.
    KwSelfType,
}

impl TokenKind {
    /// Stable index of this kind, usable as a bit position in a kind set.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Look up the keyword kind for an identifier-shaped word.
    pub fn keyword_from_str(text: &str) -> Option<TokenKind> {
        Some(match text {
            "fn" => TokenKind::KwFn,
            "var" => TokenKind::KwVar,
            "let" => TokenKind::KwLet,
            "inout" => TokenKind::KwInout,
            "struct" => TokenKind::KwStruct,
            "extension" => TokenKind::KwExtension,
            "return" => TokenKind::KwReturn,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "for" => TokenKind::KwFor,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "Self" => TokenKind::KwSelfType,
            _ => return None,
        })
    }

    /// Whether this kind is a reserved word.
    #[inline]
    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (TokenKind::KwFn as u8)
    }

    /// Whether this kind is one of the conditional-compilation directives.
    ///
    /// These act as unconditional stop tokens for every skip loop.
    #[inline]
    pub const fn is_pound_directive(self) -> bool {
        matches!(
            self,
            TokenKind::PoundIf
                | TokenKind::PoundElse
                | TokenKind::PoundElseif
                | TokenKind::PoundEndif
        )
    }

    /// Whether tokens of this kind read as operators (including the
    /// corrected angle-bracket forms, which start life as operators).
    #[inline]
    pub const fn is_any_operator(self) -> bool {
        matches!(self, TokenKind::Oper | TokenKind::LAngle | TokenKind::RAngle)
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Unknown => "unknown token",
            TokenKind::CodeComplete => "completion marker",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::IntLit => "integer literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::StringLit => "string literal",
            TokenKind::StringQuote => "string quote",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Arrow => "'->'",
            TokenKind::Eq => "'='",
            TokenKind::Oper => "operator",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::PoundIf => "'#if'",
            TokenKind::PoundElse => "'#else'",
            TokenKind::PoundElseif => "'#elseif'",
            TokenKind::PoundEndif => "'#endif'",
            TokenKind::KwFn => "'fn'",
            TokenKind::KwVar => "'var'",
            TokenKind::KwLet => "'let'",
            TokenKind::KwInout => "'inout'",
            TokenKind::KwStruct => "'struct'",
            TokenKind::KwExtension => "'extension'",
            TokenKind::KwReturn => "'return'",
            TokenKind::KwIf => "'if'",
            TokenKind::KwElse => "'else'",
            TokenKind::KwWhile => "'while'",
            TokenKind::KwFor => "'for'",
            TokenKind::KwBreak => "'break'",
            TokenKind::KwContinue => "'continue'",
            TokenKind::KwSelfType => "'Self'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
