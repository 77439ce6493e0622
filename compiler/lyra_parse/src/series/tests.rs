use lyra_ir::{Span, TokenKind};
use lyra_lexer::Lexer;
use pretty_assertions::assert_eq;

use crate::cursor::Cursor;
use crate::status::ParserStatus;
use crate::{Parser, ParserOptions};

fn parser(source: &str) -> Parser<'_> {
    Parser::new(source, ParserOptions::default())
}

/// Element callback: consume one identifier or fail without progress.
fn ident_element(p: &mut Parser<'_>) -> ParserStatus {
    if p.check(TokenKind::Ident) {
        p.consume();
        ParserStatus::SUCCESS
    } else {
        ParserStatus::error()
    }
}

#[test]
fn parses_comma_separated_elements() {
    let mut p = parser("(a, b, c) x");
    let left = p.consume();
    let (status, right) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    assert!(status.is_success());
    assert_eq!(right.to_range(), 8..9);
    assert_eq!(p.text(), "x");
}

#[test]
fn empty_list_is_just_the_closer() {
    let mut p = parser("() x");
    let left = p.consume();
    let (status, right) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    assert!(status.is_success());
    assert_eq!(right.to_range(), 1..2);
    assert_eq!(p.diags.len(), 0);
}

#[test]
fn forbidden_trailing_separator_is_diagnosed() {
    let mut p = parser("(a, b,) x");
    let left = p.consume();
    let (status, _) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    // Diagnosed but not a parse error: the list closed fine.
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 1);
    assert_eq!(p.text(), "x");
}

#[test]
fn allowed_trailing_separator_is_silent() {
    let mut p = parser("(a, b,) x");
    let left = p.consume();
    let (status, _) = p.parse_series(TokenKind::RParen, left, true, ident_element);
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 0);
}

#[test]
fn stray_leading_separators_are_eaten() {
    let mut p = parser("(, , a) x");
    let left = p.consume();
    let (status, _) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 2);
    assert_eq!(p.text(), "x");
}

#[test]
fn missing_separator_is_diagnosed_and_list_continues() {
    let mut p = parser("(a b) x");
    let left = p.consume();
    let (status, right) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    // Recovered at the closer, so the error does not propagate.
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 1);
    assert_eq!(right.to_range(), 4..5);
    assert_eq!(p.text(), "x");
}

#[test]
fn failed_element_skips_to_next_separator() {
    let mut p = parser("(a, ?, c) x");
    let left = p.consume();
    let (status, _) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 0);
    assert_eq!(p.text(), "x");
}

#[test]
fn statement_on_fresh_line_ends_list_silently() {
    let mut p = parser("(a\nreturn x");
    let left = p.consume();
    let (status, right) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    // The list itself ends without complaint; the missing `)` is the only
    // diagnostic, synthesized at the last list token.
    assert!(status.is_error());
    assert_eq!(p.diags.len(), 1);
    assert_eq!(right.to_range(), 1..2);
    assert_eq!(p.kind(), TokenKind::KwReturn);
}

#[test]
fn end_of_input_marks_parse_incomplete() {
    let mut p = parser("(a, b");
    let left = p.consume();
    let (status, right) = p.parse_series(TokenKind::RParen, left, false, ident_element);
    assert!(status.is_input_incomplete());
    assert!(status.is_error());
    assert!(p.incomplete);
    // Missing closer is placed at the last consumed token.
    assert_eq!(right.to_range(), 4..5);
}

#[test]
fn interpolation_end_closes_list_silently() {
    let source = "\"\\(a, b)\"";
    let mut p = parser(source);
    p.cursor = Cursor::new(Lexer::over_range(source, Span::new(3, 7)));
    let (status, right) = p.parse_series(TokenKind::RParen, Span::point(3), false, ident_element);
    assert!(status.is_success());
    assert_eq!(p.diags.len(), 0);
    assert_eq!(right, Span::point(7));
    // The sentinel itself is left for the caller.
    assert_eq!(p.kind(), TokenKind::Eof);
}

#[test]
fn interpolation_end_on_empty_list_closes_immediately() {
    let source = "\"\\( )\"";
    let mut p = parser(source);
    p.cursor = Cursor::new(Lexer::over_range(source, Span::new(3, 4)));
    let (status, right) = p.parse_series(TokenKind::RParen, Span::point(3), false, ident_element);
    assert!(status.is_success());
    assert_eq!(right, Span::point(4));
}
