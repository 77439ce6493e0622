//! Recursive descent parsing engine for Lyra.
//!
//! The engine is organized around a single [`Parser`] that owns the token
//! [`cursor`], a diagnostic queue, and the flat AST arenas from
//! [`lyra_ir`]. Grammar productions are plain methods returning a
//! [`ParserStatus`]; callers merge child statuses into their own and
//! decide locally whether to keep consuming. No error value ever crosses
//! a production boundary by unwinding.
//!
//! Besides the grammar the crate exposes three tooling surfaces:
//!
//! - [`tokenize`]: the standalone token stream with reset tokens and
//!   interpolated-string decomposition,
//! - [`ParseOutput::tokens`]: the corrected token stream recorded during
//!   a parse,
//! - [`parse_decl_name`]: the compact textual declaration-name format.
//!
//! Interactive clients can parse with [`ParserOptions::delay_bodies`] to
//! elide bodies far from a completion point and later resume exactly one
//! of them with [`resume_delayed`].

mod cursor;
mod decl_name;
mod delayed;
mod grammar;
mod recorder;
mod recovery;
mod series;
mod snapshot;
mod status;
mod tokenize;

pub use decl_name::{parse_decl_name, ParsedDeclName};
pub use delayed::{resume_delayed, DelayedBodyKind, DelayedContext, DelayedParseState};
pub use snapshot::{ParserSnapshot, Speculation};
pub use status::{ParserResult, ParserStatus};
pub use tokenize::{tokenize, TokenizeConfig};

use std::hash::Hasher;

use lyra_diagnostic::queue::too_many_errors;
use lyra_diagnostic::{unclosed_delimiter, Diagnostic, DiagnosticConfig, DiagnosticQueue};
use lyra_ir::ast::{DeclArena, ExprArena, SourceFile};
use lyra_ir::{Span, Token, TokenKind};
use lyra_lexer::{CommentRetention, Lexer};
use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::cursor::Cursor;
use crate::recorder::TokenRecorder;
use crate::recovery::StructureMarker;

/// Options controlling one parse.
#[derive(Clone, Copy, Debug)]
pub struct ParserOptions {
    /// Elide bodies on the first pass, recording resumable state for the
    /// body containing the completion offset. See [`resume_delayed`].
    pub delay_bodies: bool,
    /// Byte offset of an interactive completion cursor, if any.
    pub completion_offset: Option<u32>,
    /// Record the corrected token stream into [`ParseOutput::tokens`].
    pub record_tokens: bool,
    /// Hash consumed token text into [`ParseOutput::interface_hash`].
    /// Ignored when a completion offset is set.
    pub compute_hash: bool,
    /// Comment policy for the recorded token stream.
    pub retention: CommentRetention,
    /// Maximum number of errors to keep (0 = unlimited).
    pub error_limit: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            delay_bodies: false,
            completion_offset: None,
            record_tokens: false,
            compute_hash: true,
            retention: CommentRetention::Attach,
            error_limit: DiagnosticConfig::default().error_limit,
        }
    }
}

/// Everything one parse produces.
#[derive(Debug)]
pub struct ParseOutput {
    /// Top-level declarations in source order.
    pub file: SourceFile,
    pub decls: DeclArena,
    pub exprs: ExprArena,
    /// Diagnostics sorted by source position.
    pub diagnostics: Vec<Diagnostic>,
    /// The corrected token stream, when
    /// [`ParserOptions::record_tokens`] was set.
    pub tokens: Option<Vec<Token>>,
    /// Hash over consumed token text, when
    /// [`ParserOptions::compute_hash`] was set.
    pub interface_hash: Option<u64>,
    /// Resumable state for a body the first pass elided.
    pub delayed: Option<DelayedParseState>,
    pub status: ParserStatus,
}

/// Parse a whole source buffer with default options.
pub fn parse_source(source: &str) -> ParseOutput {
    parse_source_with(source, ParserOptions::default())
}

/// Parse a whole source buffer.
pub fn parse_source_with(source: &str, options: ParserOptions) -> ParseOutput {
    let mut parser = Parser::new(source, options);
    let (file, status) = parser.parse_source_file();
    parser.finish(file, status)
}

/// Parser state over one source buffer.
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) cursor: Cursor<'a>,
    pub(crate) diags: DiagnosticQueue,
    pub(crate) recorder: Option<TokenRecorder>,
    pub(crate) hasher: Option<FxHasher>,
    pub(crate) options: ParserOptions,
    pub(crate) decls: DeclArena,
    pub(crate) exprs: ExprArena,
    pub(crate) delayed: Option<DelayedParseState>,
    /// Set while resuming a delayed body; bodies then parse eagerly.
    pub(crate) second_pass: bool,
    pub(crate) markers: SmallVec<[StructureMarker; 8]>,
    pub(crate) overflow_diagnosed: bool,
    /// End of input was reached somewhere a construct was still open.
    pub(crate) incomplete: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        // The grammar never sees comment tokens: comments ride their
        // carrier token and only the recorder expands them.
        let retention = if options.retention == CommentRetention::Discard {
            CommentRetention::Discard
        } else {
            CommentRetention::Attach
        };
        let lexer = Lexer::new(source)
            .with_retention(retention)
            .with_completion_offset(options.completion_offset);
        Parser::over(source, Cursor::new(lexer), options)
    }

    pub(crate) fn over(source: &'a str, cursor: Cursor<'a>, options: ParserOptions) -> Self {
        Parser {
            source,
            cursor,
            diags: DiagnosticQueue::with_config(DiagnosticConfig {
                error_limit: options.error_limit,
                ..DiagnosticConfig::default()
            }),
            recorder: options
                .record_tokens
                .then(|| TokenRecorder::new(options.retention)),
            hasher: (options.compute_hash && options.completion_offset.is_none())
                .then(FxHasher::default),
            options,
            decls: DeclArena::new(),
            exprs: ExprArena::new(),
            delayed: None,
            second_pass: false,
            markers: SmallVec::new(),
            overflow_diagnosed: false,
            incomplete: false,
        }
    }

    /// The source buffer being parsed.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.cursor.kind()
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.cursor.span()
    }

    #[inline]
    pub(crate) fn prev_span(&self) -> Span {
        self.cursor.prev_span()
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.cursor.kind() == kind
    }

    #[inline]
    pub(crate) fn at_line_start(&self) -> bool {
        self.cursor.at_line_start()
    }

    /// Text of the current token.
    #[inline]
    pub(crate) fn text(&self) -> &'a str {
        self.cursor.current().text(self.source)
    }

    /// The token after the current one.
    #[inline]
    pub(crate) fn peek(&mut self) -> Token {
        self.cursor.peek()
    }

    /// Text covered by `span` in the source buffer.
    #[inline]
    pub(crate) fn span_text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// Span from `start` to the end of the last consumed token.
    ///
    /// Clamped to `start` so a production that consumed nothing still
    /// yields a well-formed empty span.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_span().end.max(start))
    }

    /// Consume the current token, feeding the recorder and the hash.
    pub(crate) fn consume(&mut self) -> Span {
        let token = *self.cursor.current();
        self.record(token);
        self.cursor.advance().span
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn consume_if(&mut self, kind: TokenKind) -> Option<Span> {
        if self.check(kind) {
            Some(self.consume())
        } else {
            None
        }
    }

    fn record(&mut self, token: Token) {
        if let Some(recorder) = &mut self.recorder {
            recorder.receive(self.source, token);
        }
        let text = token.text(self.source);
        if !text.is_empty() {
            if let Some(hasher) = &mut self.hasher {
                hasher.write(text.as_bytes());
                hasher.write_u8(0);
            }
        }
    }

    /// Queue a diagnostic.
    ///
    /// Diagnosing at end of input marks the parse incomplete, so
    /// enclosing list loops stop instead of piling on errors.
    pub(crate) fn emit(&mut self, diag: Diagnostic) {
        if self.check(TokenKind::Eof) {
            self.incomplete = true;
        }
        self.diags.add(diag);
    }

    /// Consume the closing delimiter of a bracketed region.
    ///
    /// On failure the missing closer is reported at the end of the last
    /// consumed token; no new source location is invented. `Err` carries
    /// that anchor span.
    pub(crate) fn expect_matching(&mut self, right: TokenKind, open: Span) -> Result<Span, Span> {
        if let Some(span) = self.consume_if(right) {
            return Ok(span);
        }
        let anchor = self.prev_span();
        self.emit(unclosed_delimiter(
            open,
            Span::point(anchor.end),
            open_delimiter_char(right),
        ));
        Err(anchor)
    }

    /// Whether the current token is an operator starting with `>`.
    #[inline]
    pub(crate) fn starts_with_greater(&self) -> bool {
        self.starts_with_byte(b'>')
    }

    /// Whether the current token is an operator starting with `<`.
    #[inline]
    pub(crate) fn starts_with_less(&self) -> bool {
        self.starts_with_byte(b'<')
    }

    fn starts_with_byte(&self, byte: u8) -> bool {
        self.kind().is_any_operator() && self.text().as_bytes().first() == Some(&byte)
    }

    /// Consume `>` off the front of the current operator token.
    pub(crate) fn consume_starting_greater(&mut self) -> Span {
        debug_assert!(self.starts_with_greater(), "no `>` to split off");
        self.consume_starting_prefix(TokenKind::RAngle, 1)
    }

    /// Consume `<` off the front of the current operator token.
    pub(crate) fn consume_starting_less(&mut self) -> Span {
        debug_assert!(self.starts_with_less(), "no `<` to split off");
        self.consume_starting_prefix(TokenKind::LAngle, 1)
    }

    /// Consume the first `len` bytes of the current token as a token of
    /// `kind`.
    ///
    /// If the current token is exactly that long it is re-kinded and
    /// consumed whole. Otherwise a synthetic prefix token is fed to the
    /// recorder and lexing resumes just past the prefix, so the remainder
    /// comes back as a fresh token.
    fn consume_starting_prefix(&mut self, kind: TokenKind, len: u32) -> Span {
        let token = *self.cursor.current();
        if token.span.len() == len {
            if let Some(recorder) = &mut self.recorder {
                recorder.register_kind_change(token.span.start, kind);
            }
            self.cursor.set_kind(kind);
            return self.consume();
        }

        debug_assert!(token.span.len() > len, "prefix longer than its token");
        let mut prefix = Token::new(kind, Span::new(token.span.start, token.span.start + len));
        prefix.flags = token.flags;
        prefix.comment_start = token.comment_start;
        if let Some(recorder) = &mut self.recorder {
            recorder.receive(self.source, prefix);
        }
        self.cursor.reposition(prefix.span.end, prefix.span);
        prefix.span
    }

    /// Assemble the output, folding parser-level flags into the status.
    pub(crate) fn finish(mut self, file: SourceFile, mut status: ParserStatus) -> ParseOutput {
        if self.incomplete {
            status |= ParserStatus::input_incomplete();
        }
        let cut_off = self.cursor.lexing_cut_off();
        let tokens = self
            .recorder
            .take()
            .map(|recorder| recorder.finalize(self.source, cut_off));

        let limit_hit = self.diags.limit_reached();
        let mut diagnostics = self.diags.flush();
        if limit_hit {
            diagnostics.push(too_many_errors(
                self.options.error_limit,
                self.prev_span(),
            ));
        }

        ParseOutput {
            file,
            decls: self.decls,
            exprs: self.exprs,
            diagnostics,
            tokens,
            interface_hash: self.hasher.map(|hasher| hasher.finish()),
            delayed: self.delayed,
            status,
        }
    }
}

fn open_delimiter_char(right: TokenKind) -> char {
    match right {
        TokenKind::RParen => '(',
        TokenKind::RBrace => '{',
        TokenKind::RBracket => '[',
        _ => {
            debug_assert!(false, "{right:?} is not a closing delimiter");
            '('
        }
    }
}
