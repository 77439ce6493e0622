//! Token recording for exact lexical reconstruction.
//!
//! The parser feeds every consumed token to a [`TokenRecorder`]; at the
//! end of the parse the recorder yields the corrected token stream,
//! comments included, for tooling that needs to reconstruct the source's
//! lexical structure (formatters, syntax highlighters).
//!
//! Backtracking makes this more than an append log. A rolled-back
//! speculation records tokens the committed alternative records again, and
//! a committed inner scope can record tokens before an outer rollback
//! rewinds past them, so arrivals are not in final order. Tokens are
//! therefore keyed and ordered by start offset: insertion is a sorted
//! insert and the first writer at an offset wins. Kind corrections (an
//! operator re-lexed as `>` when a generic list is split) go through
//! [`TokenRecorder::register_kind_change`] so the recorded kind matches
//! what the parser decided, not what the lexer first saw.

use lyra_ir::{Span, Token, TokenFlags, TokenKind};
use lyra_lexer::{CommentRetention, Lexer};
use rustc_hash::FxHashMap;

/// Collects the corrected, location-ordered token stream for one parse.
pub(crate) struct TokenRecorder {
    tokens: Vec<Token>,
    /// Kind corrections registered before the token at that offset arrived.
    pending: FxHashMap<u32, TokenKind>,
    retention: CommentRetention,
}

impl TokenRecorder {
    pub(crate) fn new(retention: CommentRetention) -> Self {
        TokenRecorder {
            tokens: Vec::new(),
            pending: FxHashMap::default(),
            retention,
        }
    }

    /// Record one consumed token.
    ///
    /// Synthetic zero-width tokens (end-of-input, completion markers) are
    /// not part of the source's lexical structure and are ignored. In
    /// comment-returning mode an attached comment range is re-lexed and
    /// recorded as standalone comment tokens in front of the carrier.
    pub(crate) fn receive(&mut self, source: &str, token: Token) {
        if matches!(token.kind, TokenKind::Eof | TokenKind::CodeComplete) {
            return;
        }
        let mut token = token;
        if let Some(kind) = self.pending.remove(&token.span.start) {
            token.kind = kind;
        }
        if matches!(self.retention, CommentRetention::ReturnAsTokens) {
            if let Some(range) = token.comment_span() {
                self.insert_comments(source, range);
                token.flags = TokenFlags::from_bits(token.flags.bits() & !TokenFlags::HAS_COMMENT);
                token.comment_start = 0;
            }
        }
        self.insert(token);
    }

    /// Correct the kind recorded for the token starting at `start`.
    ///
    /// Applied in place if that token was already recorded, otherwise
    /// remembered and applied when it arrives.
    pub(crate) fn register_kind_change(&mut self, start: u32, kind: TokenKind) {
        match self.tokens.binary_search_by_key(&start, |t| t.span.start) {
            Ok(idx) => self.tokens[idx].kind = kind,
            Err(_) => {
                self.pending.insert(start, kind);
            }
        }
    }

    /// Close out the stream: catch comments trailing after the last
    /// recorded token (or the whole buffer, if nothing was recorded) and
    /// return the ordered tokens.
    ///
    /// `cut_off` bounds the trailing scan when lexing was cut off early.
    pub(crate) fn finalize(mut self, source: &str, cut_off: Option<u32>) -> Vec<Token> {
        let len = u32::try_from(source.len()).unwrap_or(u32::MAX);
        let from = self.tokens.last().map_or(0, |t| t.span.end);
        let limit = cut_off.map_or(len, |cut| cut.min(len));
        if from < limit {
            let mut lexer = Lexer::over_range(source, Span::new(from, limit))
                .with_retention(CommentRetention::ReturnAsTokens);
            loop {
                let token = lexer.next_token();
                if !token.is(TokenKind::Comment) {
                    break;
                }
                // Appending keeps order: the scan starts past every
                // recorded token.
                self.tokens.push(token);
            }
        }
        debug_assert!(
            self.tokens.windows(2).all(|w| w[0].span.start < w[1].span.start),
            "recorded tokens must be strictly ordered by start offset"
        );
        self.tokens
    }

    fn insert(&mut self, token: Token) {
        match self
            .tokens
            .binary_search_by_key(&token.span.start, |t| t.span.start)
        {
            // First writer wins: a committed alternative already recorded
            // this offset.
            Ok(_) => {}
            Err(idx) => self.tokens.insert(idx, token),
        }
    }

    /// Re-lex a comment range and record each comment in it.
    fn insert_comments(&mut self, source: &str, range: Span) {
        if range.is_empty() {
            return;
        }
        let mut lexer =
            Lexer::over_range(source, range).with_retention(CommentRetention::ReturnAsTokens);
        loop {
            let token = lexer.next_token();
            if !token.is(TokenKind::Comment) {
                break;
            }
            self.insert(token);
        }
    }
}

#[cfg(test)]
mod tests;
