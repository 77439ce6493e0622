//! Standalone tokenization for tools that want the token stream rather
//! than a tree: syntax coloring, token-level diffing, format checkers.
//!
//! The driver wraps [`Lexer`] with two services the raw lexer does not
//! provide. *Reset tokens* let a caller splice previously corrected
//! tokens back into the stream: whenever the lexer reaches the start
//! location of a reset token, the reset token is emitted verbatim and
//! scanning resumes immediately past it. The parser uses this to replay
//! angle brackets it split off longer operators. *String splitting*
//! decomposes interpolated string literals into their visible parts:
//! a token for the opening quote, the literal pieces, the tokens of each
//! embedded expression, and a token for the closing quote.

use lyra_ir::{Span, Token, TokenFlags, TokenKind};
use lyra_lexer::{string_segments, CommentRetention, Lexer, StringSegment};

/// Options for [`tokenize`].
#[derive(Clone, Copy, Debug)]
pub struct TokenizeConfig<'a> {
    /// What to do with comments in the produced stream.
    pub retention: CommentRetention,
    /// Decompose interpolated string literals into quote, literal and
    /// expression tokens instead of one opaque literal token.
    pub split_strings: bool,
    /// Corrected tokens to emit in place of whatever the lexer would
    /// produce at their start location, sorted or not. Must be non-empty
    /// spans and must not be string literals.
    pub reset_tokens: &'a [Token],
}

impl Default for TokenizeConfig<'static> {
    fn default() -> Self {
        TokenizeConfig {
            retention: CommentRetention::ReturnAsTokens,
            split_strings: true,
            reset_tokens: &[],
        }
    }
}

/// Tokenize `range` of `source`. A zero-length range means the whole
/// buffer. The end-of-input token is not included in the result.
pub fn tokenize(source: &str, range: Span, config: &TokenizeConfig<'_>) -> Vec<Token> {
    let mut tokens = Vec::new();
    tokenize_into(source, range, config, &mut tokens);
    tokens
}

fn tokenize_into(source: &str, range: Span, config: &TokenizeConfig<'_>, out: &mut Vec<Token>) {
    let mut lexer = Lexer::over_range(source, range).with_retention(config.retention);
    loop {
        let token = lexer.next_token();
        let reset = config
            .reset_tokens
            .iter()
            .find(|reset| !reset.span.is_empty() && reset.span.start == token.span.start);
        if let Some(reset) = reset {
            debug_assert!(
                !reset.is(TokenKind::StringLit),
                "string literals cannot be replayed as reset tokens"
            );
            out.push(*reset);
            let past = lexer.checkpoint_at(reset.span.end);
            lexer.restore(past);
            continue;
        }
        if token.is(TokenKind::Eof) {
            return;
        }
        if config.split_strings
            && token.is(TokenKind::StringLit)
            && token.flags.has(TokenFlags::HAS_INTERPOLATION)
        {
            split_string(source, &token, out);
            continue;
        }
        out.push(token);
    }
}

/// Decompose one interpolated string literal.
///
/// The embedded expression ranges are tokenized by plain recursion with
/// comments retained; their interpolation delimiters `\(` and `)` do not
/// appear in the output, same as the quotes around a literal piece.
fn split_string(source: &str, token: &Token, out: &mut Vec<Token>) {
    let quotes = if token.flags.has(TokenFlags::MULTILINE_STRING) {
        3
    } else {
        1
    };
    let open_len = u32::from(token.delim_len) + quotes;
    let body_start = (token.span.start + open_len).min(token.span.end);

    // The opening quote stands where the whole literal stood, so it
    // inherits the literal's line position and attached comment.
    let mut open = Token::new(TokenKind::StringQuote, Span::new(token.span.start, body_start));
    open.flags = piece_flags(token, TokenFlags::AT_LINE_START | TokenFlags::HAS_COMMENT);
    open.comment_start = token.comment_start;
    open.delim_len = token.delim_len;
    out.push(open);

    let segments = string_segments(source, token);
    for segment in &segments {
        match *segment {
            StringSegment::Literal(span) if !span.is_empty() => {
                let mut piece = Token::new(TokenKind::StringLit, span);
                piece.flags = piece_flags(token, TokenFlags::EMPTY.bits());
                piece.delim_len = token.delim_len;
                out.push(piece);
            }
            StringSegment::Literal(_) => {}
            StringSegment::Interpolation(span) => {
                let nested = TokenizeConfig {
                    retention: CommentRetention::ReturnAsTokens,
                    split_strings: true,
                    reset_tokens: &[],
                };
                lyra_stack::ensure_sufficient_stack(|| {
                    tokenize_into(source, span, &nested, out);
                });
            }
        }
    }

    // The final segment is always a literal piece, so its end is the end
    // of the body. An unterminated literal has no closing quote to emit.
    let body_end = segments.last().map_or(body_start, |last| last.span().end);
    let close_span = Span::new(body_end, token.span.end);
    if !close_span.is_empty() {
        let mut close = Token::new(TokenKind::StringQuote, close_span);
        close.flags = piece_flags(token, TokenFlags::EMPTY.bits());
        close.delim_len = token.delim_len;
        out.push(close);
    }
}

/// Flags for a piece of a decomposed literal: the multiline bit is kept
/// on every piece, `extra` bits are copied from the original token, and
/// the whole-literal bits are dropped.
fn piece_flags(token: &Token, extra: u8) -> TokenFlags {
    let kept = TokenFlags::MULTILINE_STRING | extra;
    TokenFlags::from_bits(token.flags.bits() & kept)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|token| token.kind).collect()
    }

    fn whole(source: &str, config: &TokenizeConfig<'_>) -> Vec<Token> {
        tokenize(source, Span::new(0, 0), config)
    }

    #[test]
    fn zero_length_range_covers_the_whole_buffer() {
        let tokens = whole("fn main", &TokenizeConfig::default());
        assert_eq!(kinds(&tokens), [TokenKind::KwFn, TokenKind::Ident]);
    }

    #[test]
    fn end_of_input_token_is_stripped() {
        let tokens = whole("x", &TokenizeConfig::default());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
    }

    #[test]
    fn subrange_lexes_only_that_range() {
        let source = "aa bb cc";
        let tokens = tokenize(source, Span::new(3, 5), &TokenizeConfig::default());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(source), "bb");
    }

    #[test]
    fn discard_retention_drops_comments() {
        let config = TokenizeConfig {
            retention: CommentRetention::Discard,
            ..TokenizeConfig::default()
        };
        let tokens = whole("// note\nx", &config);
        assert_eq!(kinds(&tokens), [TokenKind::Ident]);
    }

    #[test]
    fn return_retention_keeps_comments_as_tokens() {
        let tokens = whole("// note\nx", &TokenizeConfig::default());
        assert_eq!(kinds(&tokens), [TokenKind::Comment, TokenKind::Ident]);
    }

    #[test]
    fn reset_token_is_emitted_verbatim_and_lexing_resumes_past_it() {
        let source = "x >> y";
        let reset = Token::new(TokenKind::RAngle, Span::new(2, 3));
        let config = TokenizeConfig {
            reset_tokens: std::slice::from_ref(&reset),
            ..TokenizeConfig::default()
        };
        let tokens = whole(source, &config);
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::Oper,
                TokenKind::Ident,
            ]
        );
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(3, 4));
        assert_eq!(tokens[2].text(source), ">");
    }

    #[test]
    fn interpolated_string_decomposes_into_quotes_pieces_and_expression() {
        let source = r#""abc\(x)def""#;
        let tokens = whole(source, &TokenizeConfig::default());
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::StringQuote,
                TokenKind::StringLit,
                TokenKind::Ident,
                TokenKind::StringLit,
                TokenKind::StringQuote,
            ]
        );
        assert_eq!(tokens[0].span, Span::new(0, 1));
        assert_eq!(tokens[1].text(source), "abc");
        assert_eq!(tokens[2].text(source), "x");
        assert_eq!(tokens[3].text(source), "def");
        assert_eq!(tokens[4].span, Span::new(11, 12));
    }

    #[test]
    fn empty_literal_pieces_are_not_emitted() {
        let source = r#""\(x)""#;
        let tokens = whole(source, &TokenizeConfig::default());
        assert_eq!(
            kinds(&tokens),
            [TokenKind::StringQuote, TokenKind::Ident, TokenKind::StringQuote]
        );
    }

    #[test]
    fn comments_inside_interpolations_are_retained() {
        let source = r#""\(x /*c*/)""#;
        let config = TokenizeConfig {
            retention: CommentRetention::Discard,
            ..TokenizeConfig::default()
        };
        let tokens = whole(source, &config);
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::StringQuote,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::StringQuote,
            ]
        );
    }

    #[test]
    fn unterminated_interpolated_string_has_no_closing_quote_token() {
        let source = r#""a\(x)"#;
        let tokens = whole(source, &TokenizeConfig::default());
        assert_eq!(
            kinds(&tokens),
            [TokenKind::StringQuote, TokenKind::StringLit, TokenKind::Ident]
        );
    }

    #[test]
    fn plain_strings_are_not_decomposed() {
        let tokens = whole(r#""abc""#, &TokenizeConfig::default());
        assert_eq!(kinds(&tokens), [TokenKind::StringLit]);
    }

    #[test]
    fn multiline_pieces_keep_the_multiline_flag() {
        let source = "\"\"\"\na\\(x)b\n\"\"\"";
        let tokens = whole(source, &TokenizeConfig::default());
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::StringQuote,
                TokenKind::StringLit,
                TokenKind::Ident,
                TokenKind::StringLit,
                TokenKind::StringQuote,
            ]
        );
        for piece in [&tokens[0], &tokens[1], &tokens[3], &tokens[4]] {
            assert!(piece.flags.has(TokenFlags::MULTILINE_STRING));
        }
        assert!(!tokens[2].flags.has(TokenFlags::MULTILINE_STRING));
    }
}
