use pretty_assertions::assert_eq;

use super::*;

fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

// === Basics ===

#[test]
fn empty_source_is_eof() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].span, Span::new(0, 0));
    assert!(tokens[0].at_line_start());
}

#[test]
fn spans_cover_tokens() {
    let source = "fn add(x)";
    let tokens = lex(source);
    let expected = [
        TokenKind::KwFn,
        TokenKind::Ident,
        TokenKind::LParen,
        TokenKind::Ident,
        TokenKind::RParen,
        TokenKind::Eof,
    ];
    assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), expected);
    assert_eq!(tokens[1].text(source), "add");
    assert_eq!(tokens[1].span, Span::new(3, 6));
    assert_eq!(tokens[4].span, Span::new(8, 9));
}

#[test]
fn keywords_lex_as_keywords() {
    assert_eq!(
        kinds("fn var let inout struct Self"),
        [
            TokenKind::KwFn,
            TokenKind::KwVar,
            TokenKind::KwLet,
            TokenKind::KwInout,
            TokenKind::KwStruct,
            TokenKind::KwSelfType,
            TokenKind::Eof,
        ]
    );
    // `self` is an ordinary identifier.
    assert_eq!(kinds("self"), [TokenKind::Ident, TokenKind::Eof]);
}

#[test]
fn backtick_identifier_covers_backticks() {
    let source = "`fn`";
    let tokens = lex(source);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text(source), "`fn`");
}

#[test]
fn unterminated_backtick_is_unknown() {
    let tokens = lex("`fn");
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert!(tokens[0].flags.has(TokenFlags::UNTERMINATED));
}

#[test]
fn punctuation() {
    assert_eq!(
        kinds("(){}[],:;."),
        [
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semi,
            TokenKind::Dot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unknown_bytes() {
    let tokens = lex("@");
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert_eq!(tokens[0].span, Span::new(0, 1));

    // Multi-byte characters are consumed whole.
    let tokens = lex("é");
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert_eq!(tokens[0].span, Span::new(0, 2));
    assert_eq!(tokens[1].kind, TokenKind::Eof);
}

// === Numbers ===

#[test]
fn integer_literals() {
    for source in ["42", "0xFF", "0b1010", "0o77", "1_000_000"] {
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, TokenKind::IntLit, "source: {source}");
        assert_eq!(tokens[0].text(source), source);
    }
}

#[test]
fn float_literals() {
    for source in ["3.14", "1e9", "2.5e-3", "10E+2"] {
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, TokenKind::FloatLit, "source: {source}");
        assert_eq!(tokens[0].text(source), source);
    }
}

#[test]
fn dot_after_integer_stays_member_access() {
    assert_eq!(
        kinds("1.foo"),
        [
            TokenKind::IntLit,
            TokenKind::Dot,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("1."),
        [TokenKind::IntLit, TokenKind::Dot, TokenKind::Eof]
    );
}

// === Operators ===

#[test]
fn operator_kinds() {
    assert_eq!(
        kinds("< > = -> == >> +"),
        [
            TokenKind::LAngle,
            TokenKind::RAngle,
            TokenKind::Eq,
            TokenKind::Arrow,
            TokenKind::Oper,
            TokenKind::Oper,
            TokenKind::Oper,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn shift_lexes_as_one_token() {
    let source = "a >> b";
    let tokens = lex(source);
    assert_eq!(tokens[1].kind, TokenKind::Oper);
    assert_eq!(tokens[1].text(source), ">>");
}

#[test]
fn operator_run_stops_before_comment() {
    let source = "a +// c";
    let tokens = lex(source);
    assert_eq!(tokens[1].kind, TokenKind::Oper);
    assert_eq!(tokens[1].text(source), "+");
    assert_eq!(tokens[2].kind, TokenKind::Eof);

    assert_eq!(
        kinds("a +/* x */ b"),
        [TokenKind::Ident, TokenKind::Oper, TokenKind::Ident, TokenKind::Eof]
    );
}

// === Directives ===

#[test]
fn pound_directives() {
    assert_eq!(
        kinds("#if #else #elseif #endif #bogus"),
        [
            TokenKind::PoundIf,
            TokenKind::PoundElse,
            TokenKind::PoundElseif,
            TokenKind::PoundEndif,
            TokenKind::Unknown,
            TokenKind::Eof,
        ]
    );
}

// === Comments ===

#[test]
fn line_comment_attaches_to_next_token() {
    let source = "// hi\nfoo";
    let tokens = lex(source);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert!(tokens[0].flags.has(TokenFlags::HAS_COMMENT));
    assert_eq!(tokens[0].comment_span(), Some(Span::new(0, 6)));
}

#[test]
fn comment_attaches_to_eof() {
    let tokens = lex("// only");
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].comment_span(), Some(Span::new(0, 7)));
}

#[test]
fn comments_discarded() {
    let tokens = Lexer::new("// hi\nfoo")
        .with_retention(CommentRetention::Discard)
        .tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert!(!tokens[0].flags.has(TokenFlags::HAS_COMMENT));
}

#[test]
fn comments_as_tokens() {
    let source = "// a\n/* b */ x";
    let tokens = Lexer::new(source)
        .with_retention(CommentRetention::ReturnAsTokens)
        .tokenize();
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [
            TokenKind::Comment,
            TokenKind::Comment,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[0].span, Span::new(0, 4));
    assert_eq!(tokens[1].span, Span::new(5, 12));
    assert!(tokens[1].at_line_start());
}

#[test]
fn unterminated_block_comment() {
    let tokens = Lexer::new("/* a")
        .with_retention(CommentRetention::ReturnAsTokens)
        .tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert!(tokens[0].flags.has(TokenFlags::UNTERMINATED));
    assert_eq!(tokens[0].span, Span::new(0, 4));
}

#[test]
fn block_comments_nest() {
    assert_eq!(
        kinds("/* a /* b */ c */ x"),
        [TokenKind::Ident, TokenKind::Eof]
    );
}

// === Line starts ===

#[test]
fn at_line_start_flag() {
    let tokens = lex("a b\n  c");
    assert!(tokens[0].at_line_start());
    assert!(!tokens[1].at_line_start());
    assert!(tokens[2].at_line_start());
}

// === Strings ===

#[test]
fn simple_string() {
    let tokens = lex("\"hi\"");
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[0].span, Span::new(0, 4));
    assert!(!tokens[0].flags.has(TokenFlags::UNTERMINATED));
}

#[test]
fn escaped_quote_does_not_close() {
    let source = r#""a\"b""#;
    let tokens = lex(source);
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[0].text(source), source);
    assert_eq!(tokens[1].kind, TokenKind::Eof);
}

#[test]
fn interpolation_sets_flag() {
    let tokens = lex(r#""a\(x)b""#);
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert!(tokens[0].flags.has(TokenFlags::HAS_INTERPOLATION));
    assert!(!tokens[0].flags.has(TokenFlags::UNTERMINATED));
}

#[test]
fn unterminated_string_stops_before_newline() {
    let tokens = lex("\"abc\ndef");
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert!(tokens[0].flags.has(TokenFlags::UNTERMINATED));
    assert_eq!(tokens[0].span, Span::new(0, 4));
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].span, Span::new(5, 8));
}

#[test]
fn multiline_string() {
    let tokens = lex("\"\"\"\na\n\"\"\"");
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert!(tokens[0].flags.has(TokenFlags::MULTILINE_STRING));
    assert!(!tokens[0].flags.has(TokenFlags::UNTERMINATED));
    assert_eq!(tokens[0].span, Span::new(0, 9));
}

#[test]
fn raw_string() {
    let tokens = lex(r##"#"a"#"##);
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert_eq!(tokens[0].delim_len, 1);
    assert_eq!(tokens[0].span, Span::new(0, 5));
}

#[test]
fn raw_string_missing_closing_pound() {
    let tokens = lex(r#"#"a""#);
    assert_eq!(tokens[0].kind, TokenKind::StringLit);
    assert!(tokens[0].flags.has(TokenFlags::UNTERMINATED));
}

#[test]
fn raw_string_escape_needs_pounds() {
    // Without the pound the backslash is literal text.
    let tokens = lex(r##"#"\(x)"#"##);
    assert!(!tokens[0].flags.has(TokenFlags::HAS_INTERPOLATION));

    let tokens = lex(r##"#"\#(x)"#"##);
    assert!(tokens[0].flags.has(TokenFlags::HAS_INTERPOLATION));
}

// === String segments ===

#[test]
fn segments_without_interpolation() {
    let source = "\"ab\"";
    let tokens = lex(source);
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(segments, [StringSegment::Literal(Span::new(1, 3))]);
}

#[test]
fn segments_split_interpolation() {
    let source = r#""a\(x)b""#;
    let tokens = lex(source);
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(
        segments,
        [
            StringSegment::Literal(Span::new(1, 2)),
            StringSegment::Interpolation(Span::new(4, 5)),
            StringSegment::Literal(Span::new(6, 7)),
        ]
    );
}

#[test]
fn segments_keep_empty_literals() {
    let source = r#""\(x)""#;
    let tokens = lex(source);
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(
        segments,
        [
            StringSegment::Literal(Span::new(1, 1)),
            StringSegment::Interpolation(Span::new(3, 4)),
            StringSegment::Literal(Span::new(5, 5)),
        ]
    );
}

#[test]
fn segments_escaped_backslash_is_not_interpolation() {
    let source = r#""\\(x)""#;
    let tokens = lex(source);
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(segments, [StringSegment::Literal(Span::new(1, 6))]);
}

#[test]
fn segments_skip_nested_string() {
    let source = r#""\(f(")"))x""#;
    let tokens = lex(source);
    assert_eq!(tokens[0].span, Span::new(0, 12));
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(
        segments,
        [
            StringSegment::Literal(Span::new(1, 1)),
            StringSegment::Interpolation(Span::new(3, 9)),
            StringSegment::Literal(Span::new(10, 11)),
        ]
    );
}

#[test]
fn segments_raw_string() {
    let source = r##"#"a\#(x)b"#"##;
    let tokens = lex(source);
    let segments = string_segments(source, &tokens[0]);
    assert_eq!(
        segments,
        [
            StringSegment::Literal(Span::new(2, 3)),
            StringSegment::Interpolation(Span::new(6, 7)),
            StringSegment::Literal(Span::new(8, 9)),
        ]
    );
}

// === Completion marker ===

#[test]
fn completion_marker_at_boundary() {
    let tokens = Lexer::new("ab cd")
        .with_completion_offset(Some(3))
        .tokenize();
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [
            TokenKind::Ident,
            TokenKind::CodeComplete,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].span, Span::new(3, 3));
}

#[test]
fn completion_marker_mid_token_surfaces_at_next_boundary() {
    let tokens = Lexer::new("ab cd")
        .with_completion_offset(Some(1))
        .tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[1].kind, TokenKind::CodeComplete);
    assert_eq!(tokens[1].span, Span::new(3, 3));
}

#[test]
fn completion_marker_at_eof() {
    let tokens = Lexer::new("ab").with_completion_offset(Some(2)).tokenize();
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        [TokenKind::Ident, TokenKind::CodeComplete, TokenKind::Eof]
    );
}

#[test]
fn restore_rewinds_completion_marker() {
    let mut lexer = Lexer::new("ab cd").with_completion_offset(Some(3));
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
    let checkpoint = lexer.checkpoint();
    assert_eq!(lexer.next_token().kind, TokenKind::CodeComplete);
    lexer.restore(checkpoint);
    assert_eq!(lexer.next_token().kind, TokenKind::CodeComplete);
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
}

// === Checkpoints ===

#[test]
fn checkpoint_restore_replays_tokens() {
    let mut lexer = Lexer::new("fn a() { b }");
    lexer.next_token();
    lexer.next_token();
    let checkpoint = lexer.checkpoint();
    let first: Vec<Token> = std::iter::from_fn(|| {
        let t = lexer.next_token();
        (!t.is(TokenKind::Eof)).then_some(t)
    })
    .collect();
    lexer.restore(checkpoint);
    let second: Vec<Token> = std::iter::from_fn(|| {
        let t = lexer.next_token();
        (!t.is(TokenKind::Eof)).then_some(t)
    })
    .collect();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn checkpoint_at_rescans_from_offset() {
    let source = "ab";
    let mut lexer = Lexer::new(source);
    assert_eq!(lexer.next_token().text(source), "ab");
    let checkpoint = lexer.checkpoint_at(1);
    lexer.restore(checkpoint);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.span, Span::new(1, 2));
}

// === Cut-off ===

#[test]
fn cut_off_pins_eof() {
    let mut lexer = Lexer::new("a b c");
    lexer.next_token();
    lexer.cut_off_lexing();
    assert_eq!(lexer.lexing_cut_off(), Some(1));
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Eof);
    assert_eq!(token.span, Span::new(1, 1));
}

#[test]
fn cut_off_survives_restore() {
    let mut lexer = Lexer::new("a b c");
    let start = lexer.checkpoint();
    lexer.next_token();
    lexer.cut_off_lexing();
    lexer.restore(start);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.span, Span::new(0, 1));
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

// === Ranged lexing ===

#[test]
fn zero_length_range_means_whole_buffer() {
    let source = "aa bb";
    let whole = Lexer::new(source).tokenize();
    let ranged = Lexer::over_range(source, Span::DUMMY).tokenize();
    assert_eq!(whole, ranged);
}

#[test]
fn subrange_lexes_with_absolute_spans() {
    let source = "aa bb cc";
    let tokens = Lexer::over_range(source, Span::new(3, 5)).tokenize();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].span, Span::new(3, 5));
    assert_eq!(tokens[0].text(source), "bb");
    assert_eq!(tokens[1].kind, TokenKind::Eof);
    assert_eq!(tokens[1].span, Span::new(5, 5));
}

// === Predicates ===

#[test]
fn identifier_predicate() {
    assert!(is_identifier("foo"));
    assert!(is_identifier("_a1"));
    assert!(is_identifier("fn"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("1a"));
    assert!(!is_identifier("a-b"));
}

#[test]
fn operator_predicate() {
    assert!(is_operator("+"));
    assert!(is_operator("=="));
    assert!(is_operator(">"));
    assert!(!is_operator(""));
    assert!(!is_operator("a"));
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod props {
    use proptest::prelude::*;

    use super::*;

    fn check_stream(source: &str) -> Result<(), TestCaseError> {
        let tokens = lex(source);
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens[tokens.len() - 1].kind, TokenKind::Eof);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start);
        }
        for token in &tokens {
            prop_assert!(token.span.end as usize <= source.len());
            if token.is(TokenKind::StringLit) {
                let segments = string_segments(source, token);
                prop_assert!(!segments.is_empty());
                let mut prev = token.span.start;
                for segment in segments {
                    let span = segment.span();
                    prop_assert!(prev <= span.start);
                    prop_assert!(span.end <= token.span.end);
                    prev = span.start;
                }
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn lexing_never_panics(source in ".*") {
            check_stream(&source)?;
        }

        #[test]
        fn lexing_source_like_input(source in "[a-zA-Z0-9_ \\n(){}<>,.:;\"\\\\/*+#-]*") {
            check_stream(&source)?;
        }
    }
}
