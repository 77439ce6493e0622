//! Token cursor over a resumable lexer.
//!
//! The parser holds exactly one token in hand; everything behind it is
//! reproducible from a [`LexerCheckpoint`]. Rewinding therefore never
//! copies token buffers: a checkpoint is restored and the current token
//! relexed. Because the lexer is deterministic for a fixed cut-off point,
//! the same checkpoint always yields the same token again.

use lyra_ir::{Span, Token, TokenKind};
use lyra_lexer::{Lexer, LexerCheckpoint};
use tracing::trace;

/// Cursor holding the current token and the state to relex it.
///
/// `checkpoint` is always the lexer state from just before `token` was
/// produced, so `restore(checkpoint, ..)` re-yields `token` itself.
pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    checkpoint: LexerCheckpoint,
    token: Token,
    prev_span: Span,
}

impl<'a> Cursor<'a> {
    /// Create a cursor and prime it with the first token.
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let checkpoint = lexer.checkpoint();
        let token = lexer.next_token();
        Cursor {
            lexer,
            checkpoint,
            token,
            prev_span: Span::point(checkpoint.offset()),
        }
    }

    /// Override the previous-token span.
    ///
    /// A resumed parse starts mid-buffer; the token before its range was
    /// consumed by the first pass and must still anchor diagnostics.
    #[must_use]
    #[allow(dead_code)]
    pub fn with_prev_span(mut self, prev_span: Span) -> Self {
        self.prev_span = prev_span;
        self
    }

    /// The source buffer under the lexer.
    #[inline]
    #[allow(dead_code)]
    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }

    /// The current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.token
    }

    /// Kind of the current token.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }

    /// Span of the current token.
    #[inline]
    pub fn span(&self) -> Span {
        self.token.span
    }

    /// Span of the most recently consumed token.
    ///
    /// Starts out as a zero-width span at the beginning of the lexed range.
    #[inline]
    pub fn prev_span(&self) -> Span {
        self.prev_span
    }

    /// Whether the current token is the first on its line.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.token.at_line_start()
    }

    /// Lexer state that relexes the current token.
    #[inline]
    pub fn checkpoint(&self) -> LexerCheckpoint {
        self.checkpoint
    }

    /// Consume the current token and return it.
    ///
    /// The caller must not advance past `Eof`; every loop checks the
    /// current kind before consuming.
    pub fn advance(&mut self) -> Token {
        debug_assert!(
            !self.token.is(TokenKind::Eof),
            "advance past end of input"
        );
        trace!(
            kind = %self.token.kind.display_name(),
            span_start = self.token.span.start,
            span_end = self.token.span.end,
            "advance"
        );
        let consumed = self.token;
        self.prev_span = consumed.span;
        self.checkpoint = self.lexer.checkpoint();
        self.token = self.lexer.next_token();
        consumed
    }

    /// Look at the token after the current one without consuming anything.
    ///
    /// Unaffected by and not affecting backtracking state: the lexer is
    /// wound forward one token and immediately wound back.
    pub fn peek(&mut self) -> Token {
        let mark = self.lexer.checkpoint();
        let token = self.lexer.next_token();
        self.lexer.restore(mark);
        token
    }

    /// Rewind (or fast-forward) to a checkpoint, relexing the token there.
    ///
    /// The lexer cut-off, if one was set in the meantime, is kept; tokens
    /// past the cut relex as `Eof` regardless of where the checkpoint
    /// points.
    pub fn restore(&mut self, checkpoint: LexerCheckpoint, prev_span: Span) {
        self.lexer.restore(checkpoint);
        self.checkpoint = checkpoint;
        self.token = self.lexer.next_token();
        self.prev_span = prev_span;
    }

    /// Resume lexing at an arbitrary byte offset.
    ///
    /// Used after splitting a token: the remainder of the split token is
    /// relexed as if it started at `offset`.
    pub fn reposition(&mut self, offset: u32, prev_span: Span) {
        let checkpoint = self.lexer.checkpoint_at(offset);
        self.restore(checkpoint, prev_span);
    }

    /// Replace the kind of the current token in place.
    ///
    /// The span is untouched; this is a reinterpretation, not a relex.
    pub fn set_kind(&mut self, kind: TokenKind) {
        self.token.kind = kind;
    }

    /// Stop the lexer at its current position.
    ///
    /// Everything past the cut relexes as `Eof`, even after a restore.
    pub fn cut_off_lexing(&mut self) {
        self.lexer.cut_off_lexing();
    }

    /// Where lexing was cut off, if it was.
    #[inline]
    pub fn lexing_cut_off(&self) -> Option<u32> {
        self.lexer.lexing_cut_off()
    }

    /// Whether the cursor sits on the `Eof` that ends a string
    /// interpolation segment.
    ///
    /// An interpolation segment is lexed as a sub-range that stops right
    /// before the closing `)` of `\(...)`, so its `Eof` lands on a `)`
    /// byte. A real end of buffer has no byte to land on.
    pub fn is_interpolation_eof(&self) -> bool {
        self.token.is(TokenKind::Eof)
            && self
                .lexer
                .source()
                .as_bytes()
                .get(self.token.span.start as usize)
                == Some(&b')')
    }
}
