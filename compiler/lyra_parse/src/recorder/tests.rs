use lyra_ir::{Span, Token, TokenKind};
use lyra_lexer::{CommentRetention, Lexer};
use pretty_assertions::assert_eq;

use super::TokenRecorder;

fn recorder() -> TokenRecorder {
    TokenRecorder::new(CommentRetention::ReturnAsTokens)
}

#[test]
fn out_of_order_arrivals_are_sorted_by_start() {
    let source = "a b c";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(4, 5)));
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(0, 1)));
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(2, 3)));
    let tokens = rec.finalize(source, None);
    let starts: Vec<u32> = tokens.iter().map(|t| t.span.start).collect();
    assert_eq!(starts, vec![0, 2, 4]);
}

#[test]
fn first_writer_wins_at_same_start() {
    let source = "ab";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(0, 2)));
    rec.receive(source, Token::new(TokenKind::Oper, Span::new(0, 2)));
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
}

#[test]
fn synthetic_tokens_are_ignored() {
    let source = "a";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Eof, Span::point(1)));
    rec.receive(source, Token::new(TokenKind::CodeComplete, Span::point(0)));
    let tokens = rec.finalize(source, Some(0));
    assert!(tokens.is_empty());
}

#[test]
fn pending_kind_change_applies_on_arrival() {
    let source = ">>";
    let mut rec = recorder();
    rec.register_kind_change(0, TokenKind::RAngle);
    rec.receive(source, Token::new(TokenKind::Oper, Span::new(0, 2)));
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens[0].kind, TokenKind::RAngle);
}

#[test]
fn kind_change_mutates_recorded_token_in_place() {
    let source = "<";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Oper, Span::new(0, 1)));
    rec.register_kind_change(0, TokenKind::LAngle);
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens[0].kind, TokenKind::LAngle);
}

#[test]
fn attached_comment_becomes_its_own_token() {
    let source = "// c\nx";
    let mut lexer = Lexer::new(source);
    let x = lexer.next_token();
    assert!(x.comment_span().is_some());

    let mut rec = recorder();
    rec.receive(source, x);
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].span.to_range(), 0..4);
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].comment_span(), None);
}

#[test]
fn attach_mode_keeps_comment_on_carrier() {
    let source = "// c\nx";
    let mut lexer = Lexer::new(source);
    let x = lexer.next_token();

    let mut rec = TokenRecorder::new(CommentRetention::Attach);
    rec.receive(source, x);
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 1);
    // The attached range runs up to the carrier, newline included.
    assert_eq!(tokens[0].comment_span(), Some(Span::new(0, 5)));
}

#[test]
fn finalize_appends_trailing_comment() {
    let source = "x // tail";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(0, 1)));
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
    assert_eq!(tokens[1].span.to_range(), 2..9);
}

#[test]
fn finalize_trailing_scan_honors_cut_off() {
    let source = "x // tail";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(0, 1)));
    let tokens = rec.finalize(source, Some(1));
    assert_eq!(tokens.len(), 1);
}

#[test]
fn finalize_scans_from_buffer_start_when_nothing_recorded() {
    let source = "// only";
    let rec = recorder();
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].span.to_range(), 0..7);
}

#[test]
fn finalize_stops_at_first_non_comment() {
    // An unconsumed identifier ends the trailing scan; only comments
    // before it are kept.
    let source = "x // a\nz // b";
    let mut rec = recorder();
    rec.receive(source, Token::new(TokenKind::Ident, Span::new(0, 1)));
    let tokens = rec.finalize(source, None);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
    assert_eq!(tokens[1].span.to_range(), 2..6);
}
