//! Generic separator-delimited list parsing.
//!
//! One engine drives every parenthesized or braced list in the grammar:
//! call arguments, tuple elements, parameter lists. The element callback
//! parses one item and reports its status; the engine owns separator
//! handling, recovery between elements, and closing the list.
//!
//! Recovery decisions, in order, after each element: a stray closer ends
//! the list; a failed or stuck element skips ahead to the next separator
//! or closer; a separator continues the list; a new line that starts a
//! declaration or statement ends the list silently; end-of-input ends the
//! list and marks the parse incomplete. Only then is a missing separator
//! diagnosed.
//!
//! Interpolated expressions are parsed from a truncated sub-range of the
//! buffer, so their closing `)` is seen as an end-of-input token whose
//! source byte is `)`. The engine accepts that token as a successful,
//! silent close and leaves it for the caller.

use lyra_diagnostic::{expected_separator, unexpected_separator};
use lyra_ir::{Span, TokenKind};

use crate::recovery::TokenSet;
use crate::status::ParserStatus;
use crate::Parser;

/// How one element iteration left the loop.
enum SeriesItemResult {
    /// Separator consumed; parse another element.
    Continue,
    /// List is done; the shell closes it.
    Finished,
    /// Hit the artificial end of an interpolation segment; the span is
    /// the position of the implied `)`.
    FinishedInStringInterpolation(Span),
}

impl<'a> Parser<'a> {
    /// Parse a `right`-terminated, comma-separated list. The opening
    /// delimiter at `left` has already been consumed.
    ///
    /// Returns the merged element status and the span of the closing
    /// delimiter, synthesized at the previous token when the closer is
    /// missing.
    pub(crate) fn parse_series(
        &mut self,
        right: TokenKind,
        left: Span,
        allow_trailing_separator: bool,
        mut element: impl FnMut(&mut Self) -> ParserStatus,
    ) -> (ParserStatus, Span) {
        if let Some(span) = self.consume_if(right) {
            return (ParserStatus::SUCCESS, span);
        }
        if right == TokenKind::RParen && self.cursor.is_interpolation_eof() {
            return (ParserStatus::SUCCESS, self.span());
        }

        let mut status = ParserStatus::SUCCESS;
        loop {
            match self.parse_series_item(&mut status, right, left, allow_trailing_separator, &mut element)
            {
                SeriesItemResult::Continue => {}
                SeriesItemResult::Finished => break,
                SeriesItemResult::FinishedInStringInterpolation(span) => return (status, span),
            }
        }

        let right_span;
        if status.is_error_or_completion() {
            // Already in trouble; take a closer if present without piling
            // on a missing-delimiter diagnostic.
            if let Some(span) = self.consume_if(right) {
                right_span = span;
                if !status.has_code_completion() {
                    status = status.without_error();
                }
            } else {
                right_span = self.prev_span();
            }
        } else {
            match self.expect_matching(right, left) {
                Ok(span) => right_span = span,
                Err(span) => {
                    right_span = span;
                    status.set_is_parse_error();
                }
            }
        }
        (status, right_span)
    }

    fn parse_series_item(
        &mut self,
        status: &mut ParserStatus,
        right: TokenKind,
        left: Span,
        allow_trailing_separator: bool,
        element: &mut impl FnMut(&mut Self) -> ParserStatus,
    ) -> SeriesItemResult {
        while self.check(TokenKind::Comma) {
            self.emit(unexpected_separator(self.span(), ","));
            self.consume();
        }
        let start = self.span();

        *status |= element(self);

        if self.check(right) {
            return SeriesItemResult::Finished;
        }
        // The lexer stopped at an end-of-input token spelled ")": this is
        // the close of the interpolation segment being parsed.
        if right == TokenKind::RParen && self.cursor.is_interpolation_eof() {
            return SeriesItemResult::FinishedInStringInterpolation(self.span());
        }
        // A failed or stuck element: skip ahead before looking for the
        // separator.
        if self.span().start == start.start || status.is_error_or_completion() {
            debug_assert!(status.is_error_or_completion(), "no progress without error");
            *status |= self.skip_list_until_decl_boundary(
                left,
                TokenSet::single(right).with(TokenKind::Comma),
            );
            if self.check(right) || !self.check(TokenKind::Comma) {
                return SeriesItemResult::Finished;
            }
        }
        if self.consume_if(TokenKind::Comma).is_some() {
            if !self.check(right) {
                return SeriesItemResult::Continue;
            }
            if !allow_trailing_separator {
                self.emit(unexpected_separator(self.prev_span(), ","));
            }
            return SeriesItemResult::Finished;
        }
        // A token on a fresh line that opens a declaration or statement can
        // never continue the list; end it without a diagnostic.
        if self.at_line_start()
            && (self.check(TokenKind::RBrace) || self.at_decl_start() || self.at_stmt_start())
        {
            return SeriesItemResult::Finished;
        }
        if matches!(self.kind(), TokenKind::Eof | TokenKind::PoundEndif) {
            self.incomplete = true;
            *status |= ParserStatus::input_incomplete();
            return SeriesItemResult::Finished;
        }

        self.emit(expected_separator(Span::point(self.prev_span().end), ","));
        status.set_is_parse_error();
        SeriesItemResult::Continue
    }
}

#[cfg(test)]
mod tests;
