//! The `tokens` command: print the corrected token stream for a file.

use lyra_ir::Token;
use lyra_lexer::CommentRetention;
use lyra_parse::{parse_source_with, ParserOptions};

use super::read_file;

/// Tokenize a file through the parser and print the recorded stream,
/// one token per line.
///
/// The recorded stream reflects every correction the parse applied: a
/// split `>>` closer comes back as two tokens, and regions the parser
/// visited twice appear once. With `keep_comments`, comments are
/// re-lexed into the stream as their own tokens.
pub fn tokens_file(path: &str, keep_comments: bool) {
    let content = read_file(path);
    let retention = if keep_comments {
        CommentRetention::ReturnAsTokens
    } else {
        CommentRetention::Attach
    };
    let output = parse_source_with(
        &content,
        ParserOptions {
            record_tokens: true,
            compute_hash: false,
            retention,
            ..ParserOptions::default()
        },
    );

    let tokens = output.tokens.unwrap_or_default();
    println!("Tokens for '{path}' ({} tokens):", tokens.len());
    for token in &tokens {
        println!("  {}", render_token(&content, token));
    }
}

/// One line per token: kind, span, and the source slice it covers.
fn render_token(source: &str, token: &Token) -> String {
    format!("{token:?} {:?}", token.text(source))
}
