//! Delayed body parsing and the second pass.
//!
//! With [`ParserOptions::delay_bodies`] set, the first pass skips every
//! function body instead of parsing it, and records at most one
//! [`DelayedParseState`] for the construct containing the completion
//! offset: the innermost declaration, or the top-level statement, or the
//! function body itself. [`resume_delayed`] later re-parses exactly that
//! construct over the same buffer and splices the result back into the
//! first pass's output, so interactive clients pay full parsing cost for
//! one body instead of the whole file.

use std::mem;

use tracing::debug;

use lyra_diagnostic::queue::QueueMark;
use lyra_diagnostic::unclosed_delimiter;
use lyra_ir::ast::{Block, DeclArena, DeclId, DeclKind, FnBody, SourceFile};
use lyra_ir::{Span, TokenKind};

use crate::recovery::{StructureMarkerKind, TokenSet};
use crate::snapshot::ParserSnapshot;
use crate::{ParseOutput, Parser, ParserOptions, ParserResult, ParserStatus};

/// Where a delayed declaration re-attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedContext {
    /// File scope.
    File,
    /// Member of the struct declaration with this id.
    Type(DeclId),
    /// Member of the extension declaration with this id.
    Extension(DeclId),
}

impl DelayedContext {
    /// Re-attach `member`, keeping siblings ordered by source position.
    pub(crate) fn attach(self, file: &mut SourceFile, decls: &mut DeclArena, member: DeclId) {
        let start = decls.get(member).span.start;
        match self {
            DelayedContext::File => {
                let at = insertion_point(&file.items, decls, start);
                file.items.insert(at, member);
            }
            DelayedContext::Type(parent) => {
                let at = match &decls.get(parent).kind {
                    DeclKind::Struct(struct_decl) => {
                        insertion_point(&struct_decl.members, decls, start)
                    }
                    _ => {
                        debug_assert!(false, "type context must be a struct declaration");
                        0
                    }
                };
                if let DeclKind::Struct(struct_decl) = &mut decls.get_mut(parent).kind {
                    struct_decl.members.insert(at, member);
                }
            }
            DelayedContext::Extension(parent) => {
                let at = match &decls.get(parent).kind {
                    DeclKind::Extension(ext) => insertion_point(&ext.members, decls, start),
                    _ => {
                        debug_assert!(false, "extension context must be an extension declaration");
                        0
                    }
                };
                if let DeclKind::Extension(ext) = &mut decls.get_mut(parent).kind {
                    ext.members.insert(at, member);
                }
            }
        }
    }
}

fn insertion_point(siblings: &[DeclId], decls: &DeclArena, start: u32) -> usize {
    siblings.partition_point(|&id| decls.get(id).span.start <= start)
}

/// Which production the second pass re-enters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedBodyKind {
    /// One top-level statement, wrapped back into this code declaration.
    TopLevelCode(DeclId),
    /// One declaration, re-attached to its context in sibling order.
    Decl(DelayedContext),
    /// The braced body of this function declaration.
    FunctionBody(DeclId),
}

/// Resumable state for the one body the first pass skipped over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayedParseState {
    pub kind: DelayedBodyKind,
    /// Source covered by the skipped body.
    pub body: Span,
    /// Span of the token consumed just before the body, if any.
    pub prev: Option<Span>,
    /// Completion offset active when the body was recorded.
    pub completion_offset: Option<u32>,
}

impl<'a> Parser<'a> {
    /// Whether bodies are being skipped rather than parsed.
    pub(crate) fn delaying_active(&self) -> bool {
        self.options.delay_bodies && !self.second_pass
    }

    pub(crate) fn completion_inside(&self, span: Span) -> bool {
        self.options
            .completion_offset
            .is_some_and(|offset| span.contains(offset))
    }

    /// Whether a completion-carrying status should turn the construct
    /// just parsed into the delayed body.
    pub(crate) fn should_capture_delayed(&self, status: ParserStatus) -> bool {
        status.has_code_completion() && self.delaying_active() && self.delayed.is_none()
    }

    /// Rewind to `begin`, drop the abandoned parse's diagnostics, and
    /// re-skip to `end` with the recovery primitives, so the cursor ends
    /// where a plain skip of the construct would.
    pub(crate) fn capture_delayed(
        &mut self,
        begin: ParserSnapshot,
        mark: QueueMark,
        end: u32,
    ) -> Span {
        self.diags.truncate(mark);
        self.restore(begin);
        let start = self.span().start;
        while self.span().start < end && !self.check(TokenKind::Eof) {
            let _ = self.skip_single();
        }
        self.span_from(start)
    }

    pub(crate) fn record_delayed(&mut self, kind: DelayedBodyKind, body: Span, prev: Span) {
        debug_assert!(self.delayed.is_none(), "at most one delayed body per parse");
        debug!(?kind, body_start = body.start, body_end = body.end, "delaying body");
        self.delayed = Some(DelayedParseState {
            kind,
            body,
            prev: (!prev.is_empty()).then_some(prev),
            completion_offset: self.options.completion_offset,
        });
    }

    /// [`Parser::parse_decl`], capturing the declaration as the delayed
    /// body when the completion point turns out to be inside it and no
    /// inner construct claimed it first.
    pub(crate) fn parse_decl_in(&mut self, context: DelayedContext) -> ParserResult<DeclId> {
        if !self.delaying_active() || self.options.completion_offset.is_none() {
            return self.parse_decl();
        }
        let begin = self.snapshot();
        let mark = self.diags.mark();
        let result = self.parse_decl();
        if self.should_capture_delayed(result.status) {
            // The parse stopped at the completion token. The member ends
            // at the next declaration boundary; push the cursor there
            // before measuring, so the enclosing loop resumes cleanly.
            while self.check(TokenKind::CodeComplete) {
                let _ = self.consume();
            }
            let _ = self.skip_until_decl_boundary(TokenSet::EMPTY);
            let end = self.span().start;
            let body = self.capture_delayed(begin, mark, end);
            self.record_delayed(DelayedBodyKind::Decl(context), body, begin.prev_span);
            return ParserResult::empty(result.status);
        }
        result
    }

    /// Skip a braced body without parsing it. Returns the brace-to-brace
    /// span; a missing closer is diagnosed at the last consumed token.
    pub(crate) fn skip_braced_block(&mut self) -> (ParserStatus, Span) {
        debug_assert!(self.check(TokenKind::LBrace), "a body starts at `{{`");
        let open = self.consume();
        self.with_structure_marker(open.start, StructureMarkerKind::OpenBrace, |p| {
            let mut status = ParserStatus::SUCCESS;
            loop {
                match p.kind() {
                    TokenKind::RBrace => {
                        let close = p.consume();
                        return (status, open.merge(close));
                    }
                    TokenKind::Eof => {
                        p.emit(unclosed_delimiter(open, Span::point(p.prev_span().end), '{'));
                        status.set_is_parse_error();
                        return (status, open.merge(p.prev_span()));
                    }
                    _ => status |= p.skip_single(),
                }
            }
        })
    }
}

/// Parse the one delayed body recorded in `output`, in place.
///
/// Restores the cursor to the recorded offsets over the same buffer,
/// parses eagerly (nested bodies are not delayed again), re-attaches the
/// result to its context, and merges the new diagnostics into the output.
/// Does nothing when no body was delayed.
pub fn resume_delayed(source: &str, output: &mut ParseOutput) {
    let Some(state) = output.delayed.take() else {
        return;
    };
    let options = ParserOptions {
        delay_bodies: false,
        completion_offset: state.completion_offset,
        record_tokens: false,
        compute_hash: false,
        ..ParserOptions::default()
    };
    let mut parser = Parser::new(source, options);
    parser.second_pass = true;
    parser.decls = mem::take(&mut output.decls);
    parser.exprs = mem::take(&mut output.exprs);
    let prev = state.prev.unwrap_or(Span::point(state.body.start));
    parser.cursor.reposition(state.body.start, prev);

    let status = match state.kind {
        DelayedBodyKind::FunctionBody(id) => {
            let (status, block) = parser.parse_block();
            if let DeclKind::Fn(fn_decl) = &mut parser.decls.get_mut(id).kind {
                fn_decl.body = FnBody::Parsed(block);
            }
            status
        }
        DelayedBodyKind::Decl(context) => {
            let result = parser.parse_decl();
            if let Some(member) = result.value {
                context.attach(&mut output.file, &mut parser.decls, member);
            }
            result.status
        }
        DelayedBodyKind::TopLevelCode(id) => {
            let (status, stmt) = parser.parse_stmt();
            let span = stmt.span;
            if let DeclKind::TopLevel(top) = &mut parser.decls.get_mut(id).kind {
                top.body = Block {
                    stmts: vec![stmt],
                    span,
                };
            }
            status
        }
    };
    debug_assert!(
        parser.delayed.is_none(),
        "second pass must not delay again"
    );
    debug!(kind = ?state.kind, ?status, "delayed body parsed");

    output.status |= status;
    let mut second = parser.diags.flush();
    output.diagnostics.append(&mut second);
    output
        .diagnostics
        .sort_by_key(|diag| diag.primary_span().map_or(0, |span| span.start));
    output.decls = parser.decls;
    output.exprs = parser.exprs;
}
