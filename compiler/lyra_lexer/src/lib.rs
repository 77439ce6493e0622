//! Streaming lexer for Lyra source.
//!
//! The lexer walks a `&str` buffer byte-by-byte and hands out [`Token`]
//! values one at a time. All spans are absolute offsets into the buffer,
//! even when lexing restricts itself to a sub-range, so a token can always
//! be sliced back out of the original source.
//!
//! Three properties shape the interface:
//!
//! - **Resumable.** A [`LexerCheckpoint`] captures the full lexing state in
//!   eight bytes. Restoring one and lexing forward reproduces the token
//!   stream exactly, which is what the parser's backtracking relies on.
//! - **Cut-off.** [`Lexer::cut_off_lexing`] moves the end of input to the
//!   current position. The cut is one-way and survives checkpoint
//!   restores; it is how the parser bails out of pathologically nested
//!   input.
//! - **Completion marker.** When a completion offset is configured, a
//!   zero-width [`TokenKind::CodeComplete`] token is emitted at the first
//!   token boundary at or past that offset, exactly once per lex (restores
//!   rewind the once-ness along with the position).
//!
//! Comments are trivia. Depending on [`CommentRetention`] they are
//! discarded, attached to the following token via
//! [`Token::comment_span`], or surfaced as [`TokenKind::Comment`] tokens.

use lyra_ir::{Span, Token, TokenFlags, TokenKind};

mod scan;
mod strings;

pub use strings::{string_segments, StringSegment};

/// What the lexer does with comments.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CommentRetention {
    /// Skip comments entirely.
    Discard,
    /// Record the comment range on the next token.
    #[default]
    Attach,
    /// Emit comments as [`TokenKind::Comment`] tokens.
    ReturnAsTokens,
}

/// Resumable lexing state.
///
/// Restoring a checkpoint and lexing forward reproduces the same tokens.
/// The cut-off point is deliberately not part of the checkpoint: once
/// lexing is cut off it stays cut off.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LexerCheckpoint {
    pos: u32,
    completion_emitted: bool,
}

impl LexerCheckpoint {
    /// Byte offset the checkpoint resumes at.
    #[inline]
    pub fn offset(self) -> u32 {
        self.pos
    }
}

/// Streaming lexer over a source buffer or a sub-range of one.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Next byte to examine.
    pos: u32,
    /// End of the lexed range (exclusive).
    end: u32,
    retention: CommentRetention,
    /// Artificial end of input, set by [`Self::cut_off_lexing`].
    cut_off: Option<u32>,
    completion_offset: Option<u32>,
    completion_emitted: bool,
}

impl<'a> Lexer<'a> {
    /// Lex the whole buffer.
    pub fn new(source: &'a str) -> Self {
        let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
        Lexer {
            source,
            pos: 0,
            end,
            retention: CommentRetention::default(),
            cut_off: None,
            completion_offset: None,
            completion_emitted: false,
        }
    }

    /// Lex a sub-range of the buffer.
    ///
    /// Spans stay absolute. A zero-length range means the whole buffer.
    pub fn over_range(source: &'a str, range: Span) -> Self {
        let mut lexer = Lexer::new(source);
        if !range.is_empty() {
            lexer.pos = range.start.min(lexer.end);
            lexer.end = range.end.min(lexer.end);
        }
        lexer
    }

    /// Set the comment policy.
    #[must_use]
    pub fn with_retention(mut self, retention: CommentRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Arrange for a zero-width `CodeComplete` token at the first token
    /// boundary at or past `offset`.
    #[must_use]
    pub fn with_completion_offset(mut self, offset: Option<u32>) -> Self {
        self.completion_offset = offset;
        self
    }

    /// The underlying source buffer.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Capture the current lexing state.
    #[inline]
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: self.pos,
            completion_emitted: self.completion_emitted,
        }
    }

    /// Build a checkpoint resuming at an arbitrary offset.
    ///
    /// Used when the parser splits a token and needs to relex from the
    /// middle of it.
    #[inline]
    pub fn checkpoint_at(&self, offset: u32) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: offset,
            completion_emitted: self.completion_emitted,
        }
    }

    /// Rewind (or fast-forward) to a checkpoint.
    ///
    /// The cut-off point, if set, is kept.
    #[inline]
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.pos = checkpoint.pos;
        self.completion_emitted = checkpoint.completion_emitted;
    }

    /// Stop producing tokens past the current position.
    ///
    /// Every later call to [`Self::next_token`] returns `Eof` pinned at
    /// the cut, even after a checkpoint restore.
    pub fn cut_off_lexing(&mut self) {
        let cut = self.cut_off.map_or(self.pos, |c| c.min(self.pos));
        self.cut_off = Some(cut);
    }

    /// Where lexing was cut off, if it was.
    #[inline]
    pub fn lexing_cut_off(&self) -> Option<u32> {
        self.cut_off
    }

    /// End of input the lexer currently honors.
    #[inline]
    pub(crate) fn limit(&self) -> u32 {
        self.cut_off.map_or(self.end, |c| c.min(self.end))
    }

    #[inline]
    pub(crate) fn byte_at(&self, offset: u32) -> u8 {
        if offset < self.limit() {
            self.source.as_bytes()[offset as usize]
        } else {
            0
        }
    }

    /// Produce the next token.
    ///
    /// Returns an `Eof` token (zero width, pinned at the end of the lexed
    /// range or the cut-off) once input is exhausted; calling again keeps
    /// returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        let mut flags = if at_line_start_before(self.source, self.pos) {
            TokenFlags::from_bits(TokenFlags::AT_LINE_START)
        } else {
            TokenFlags::EMPTY
        };
        let mut comment_start: Option<u32> = None;

        // Trivia: whitespace and comments.
        loop {
            if self.pos >= self.limit() {
                break;
            }
            match self.byte_at(self.pos) {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    flags = flags.with(TokenFlags::AT_LINE_START);
                    self.pos += 1;
                }
                b'/' if self.byte_at(self.pos + 1) == b'/' => {
                    let start = self.pos;
                    self.skip_line_comment();
                    if let Some(token) = self.comment_token(start, flags, TokenFlags::EMPTY) {
                        return token;
                    }
                    if matches!(self.retention, CommentRetention::Attach) {
                        comment_start.get_or_insert(start);
                    }
                }
                b'/' if self.byte_at(self.pos + 1) == b'*' => {
                    let start = self.pos;
                    let terminated = self.skip_block_comment();
                    let extra = if terminated {
                        TokenFlags::EMPTY
                    } else {
                        TokenFlags::from_bits(TokenFlags::UNTERMINATED)
                    };
                    if let Some(token) = self.comment_token(start, flags, extra) {
                        return token;
                    }
                    if matches!(self.retention, CommentRetention::Attach) {
                        comment_start.get_or_insert(start);
                    }
                }
                _ => break,
            }
        }

        // Completion marker fires before anything else at its boundary.
        if let Some(offset) = self.completion_offset {
            if !self.completion_emitted && offset <= self.pos {
                self.completion_emitted = true;
                return self.make_token(TokenKind::CodeComplete, Span::point(self.pos), flags, comment_start);
            }
        }

        if self.pos >= self.limit() {
            let end = self.limit();
            return self.make_token(TokenKind::Eof, Span::point(end), flags, comment_start);
        }

        self.scan_token(flags, comment_start)
    }

    /// Lex every remaining token, ending with `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn comment_token(
        &mut self,
        start: u32,
        flags: TokenFlags,
        extra: TokenFlags,
    ) -> Option<Token> {
        if matches!(self.retention, CommentRetention::ReturnAsTokens) {
            let flags = TokenFlags::from_bits(flags.bits() | extra.bits());
            Some(self.make_token(TokenKind::Comment, Span::new(start, self.pos), flags, None))
        } else {
            None
        }
    }

    fn skip_line_comment(&mut self) {
        let limit = self.limit();
        let rest = &self.source.as_bytes()[self.pos as usize..limit as usize];
        self.pos = match memchr::memchr(b'\n', rest) {
            Some(offset) => self.pos + offset_u32(offset),
            None => limit,
        };
    }

    /// Skip a `/* ... */` comment, honoring nesting. Returns whether the
    /// comment was terminated.
    fn skip_block_comment(&mut self) -> bool {
        self.pos += 2;
        let mut depth = 1u32;
        while self.pos < self.limit() {
            match (self.byte_at(self.pos), self.byte_at(self.pos + 1)) {
                (b'/', b'*') => {
                    depth += 1;
                    self.pos += 2;
                }
                (b'*', b'/') => {
                    depth -= 1;
                    self.pos += 2;
                    if depth == 0 {
                        return true;
                    }
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.limit();
        false
    }

    pub(crate) fn make_token(
        &self,
        kind: TokenKind,
        span: Span,
        flags: TokenFlags,
        comment_start: Option<u32>,
    ) -> Token {
        let mut token = Token::new(kind, span);
        token.flags = flags;
        if let Some(start) = comment_start {
            token.flags = token.flags.with(TokenFlags::HAS_COMMENT);
            token.comment_start = start;
        }
        token
    }
}

/// Whether a token starting at `pos` sits at the start of its line,
/// looking only at horizontal whitespace before it.
fn at_line_start_before(source: &str, pos: u32) -> bool {
    let bytes = source.as_bytes();
    let mut i = pos as usize;
    loop {
        if i == 0 {
            return true;
        }
        match bytes.get(i - 1) {
            Some(b' ' | b'\t' | b'\r') => i -= 1,
            Some(b'\n') => return true,
            _ => return false,
        }
    }
}

/// Whether `text` is lexically a plain identifier.
///
/// Keywords count: this is a shape check, not a keyword check.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.as_bytes().iter();
    match chars.next() {
        Some(b) if is_ident_start(*b) => {}
        _ => return false,
    }
    chars.all(|b| is_ident_continue(*b))
}

/// Whether `text` is lexically an operator.
pub fn is_operator(text: &str) -> bool {
    !text.is_empty() && text.as_bytes().iter().all(|b| is_operator_byte(*b))
}

#[inline]
pub(crate) fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

#[inline]
pub(crate) fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Convert a slice offset to a source offset.
///
/// Buffers longer than `u32::MAX` are clamped at construction, so in
/// practice this never saturates.
#[inline]
pub(crate) fn offset_u32(offset: usize) -> u32 {
    u32::try_from(offset).unwrap_or(u32::MAX)
}

#[inline]
pub(crate) fn is_operator_byte(byte: u8) -> bool {
    matches!(
        byte,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'!' | b'=' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~' | b'?'
    )
}

#[cfg(test)]
mod tests;
