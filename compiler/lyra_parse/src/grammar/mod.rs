//! Grammar productions.
//!
//! Split by syntactic category: [`item`] for declarations, statements
//! and blocks, [`expr`] for expressions, [`ty`] for type annotations.
//! Productions return a [`ParserStatus`] (plus whatever they built) and
//! callers fold child statuses into their own; recovery decisions stay
//! local to the production that hit the problem.

mod expr;
mod item;
mod ty;

use lyra_diagnostic::{expected_integer_literal, unexpected_token};
use lyra_ir::ast::SourceFile;
use lyra_ir::{Span, TokenKind};

use crate::{DelayedContext, Parser, ParserStatus};

impl<'a> Parser<'a> {
    /// Parse the whole buffer into a [`SourceFile`].
    pub(crate) fn parse_source_file(&mut self) -> (SourceFile, ParserStatus) {
        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        let mut file = SourceFile::new(Span::new(0, end));
        let mut status = ParserStatus::SUCCESS;
        while !self.check(TokenKind::Eof) {
            if self.consume_if(TokenKind::Semi).is_some() {
                continue;
            }
            if self.check(TokenKind::RBrace) {
                self.emit(unexpected_token(
                    self.span(),
                    "a declaration",
                    self.found_text(),
                ));
                let _ = self.consume();
                status.set_is_parse_error();
                continue;
            }
            let before = self.span().start;
            let item = self.parse_top_level_item(&mut file);
            status |= item;
            if item.has_code_completion() {
                // Interactive clients only need the prefix up to the
                // completion point.
                break;
            }
            if self.span().start == before && !self.check(TokenKind::Eof) {
                status |= self.skip_single();
                status.set_is_parse_error();
            }
        }
        (file, status)
    }

    fn parse_top_level_item(&mut self, file: &mut SourceFile) -> ParserStatus {
        if self.at_decl_start() {
            let decl = self.parse_decl_in(DelayedContext::File);
            if let Some(id) = decl.value {
                file.items.push(id);
            }
            return decl.status;
        }
        self.parse_top_level_code(file)
    }

    /// Current token text, or its kind name when the text is empty.
    pub(crate) fn found_text(&self) -> &'a str {
        let text = self.text();
        if text.is_empty() {
            self.kind().display_name()
        } else {
            text
        }
    }

    /// Parse an unsigned integer literal in any radix.
    pub(crate) fn parse_unsigned_integer(&mut self) -> (ParserStatus, u64) {
        if !self.check(TokenKind::IntLit) {
            self.emit(expected_integer_literal(self.span(), self.found_text()));
            return (ParserStatus::error(), 0);
        }
        let text = self.text();
        let parsed = parse_int_text(text);
        if parsed.is_none() {
            self.emit(expected_integer_literal(self.span(), text));
        }
        let _ = self.consume();
        match parsed {
            Some(value) => (ParserStatus::SUCCESS, value),
            None => (ParserStatus::error(), 0),
        }
    }
}

/// Decode an integer literal's text, honoring radix prefixes and `_`
/// digit separators.
pub(super) fn parse_int_text(text: &str) -> Option<u64> {
    let (digits, radix) = if let Some(rest) = strip_radix_prefix(text, 'x') {
        (rest, 16)
    } else if let Some(rest) = strip_radix_prefix(text, 'o') {
        (rest, 8)
    } else if let Some(rest) = strip_radix_prefix(text, 'b') {
        (rest, 2)
    } else {
        (text, 10)
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(&digits, radix).ok()
}

fn strip_radix_prefix(text: &str, marker: char) -> Option<&str> {
    let rest = text.strip_prefix('0')?;
    let mut chars = rest.chars();
    let found = chars.next()?;
    if found.eq_ignore_ascii_case(&marker) {
        Some(chars.as_str())
    } else {
        None
    }
}

/// Decode a float literal's text, ignoring `_` digit separators.
pub(super) fn parse_float_text(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    cleaned.parse().ok()
}
