//! Error recovery for the parser.
//!
//! Skipping primitives walk the token stream in "logical units": an
//! opening bracket is skipped together with everything up to its matching
//! closer, and a conditional-compilation directive together with its whole
//! branch chain. None of the primitives diagnose on their own; they return
//! a [`ParserStatus`] the caller folds into its result. Interactive
//! completion markers short-circuit every loop through the status.
//!
//! Stop sets use a u128 bitset for O(1) membership, indexed by
//! [`TokenKind::discriminant_index`].

use lyra_diagnostic::nesting_too_deep;
use lyra_ir::{Span, TokenKind};
use tracing::debug;

use crate::snapshot::Speculation;
use crate::status::ParserStatus;
use crate::Parser;

const _: () = assert!(
    lyra_ir::TOKEN_KIND_COUNT <= 128,
    "TokenSet uses a u128 bitset; every discriminant index must be < 128"
);

/// A set of token kinds backed by a u128 bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TokenSet(u128);

impl TokenSet {
    /// The empty set.
    pub(crate) const EMPTY: TokenSet = TokenSet(0);

    /// Set containing a single kind.
    #[inline]
    pub(crate) const fn single(kind: TokenKind) -> Self {
        Self(1u128 << kind.discriminant_index())
    }

    /// Add a kind (builder form, usable in const initializers).
    #[inline]
    #[must_use]
    pub(crate) const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind.discriminant_index()))
    }

    /// Union of two sets.
    #[inline]
    #[must_use]
    #[allow(dead_code)]
    pub(crate) const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub(crate) const fn contains(self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind.discriminant_index())) != 0
    }

    #[inline]
    pub(crate) const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Tokens that introduce a declaration.
pub(crate) const DECL_START: TokenSet = TokenSet::single(TokenKind::KwFn)
    .with(TokenKind::KwStruct) // type declaration
    .with(TokenKind::KwExtension) // extension block
    .with(TokenKind::KwVar) // mutable binding
    .with(TokenKind::KwLet) // immutable binding
    .with(TokenKind::KwInout); // stray parameter modifier, diagnosed as a decl

/// Tokens that introduce a statement (other than an expression).
/// `else` is deliberately absent: it never opens a statement on its own.
pub(crate) const STMT_START: TokenSet = TokenSet::single(TokenKind::KwReturn)
    .with(TokenKind::KwIf)
    .with(TokenKind::KwWhile)
    .with(TokenKind::KwFor)
    .with(TokenKind::KwBreak)
    .with(TokenKind::KwContinue);

/// Conditional-compilation tokens that stop every skip loop unconditionally.
/// `#if` is not in the set: it opens a block that [`Parser::skip_single`]
/// can swallow whole.
pub(crate) const CONDITIONAL_BOUNDARY: TokenSet = TokenSet::single(TokenKind::PoundEndif)
    .with(TokenKind::PoundElse)
    .with(TokenKind::PoundElseif);

/// Binding keywords that can double as argument labels (`foo(var: 1)`).
const BINDING_INTRO: TokenSet = TokenSet::single(TokenKind::KwVar)
    .with(TokenKind::KwLet)
    .with(TokenKind::KwInout);

/// Whether a token of this kind can appear as an argument label.
pub(crate) fn can_be_argument_label(kind: TokenKind) -> bool {
    kind == TokenKind::Ident || kind.is_keyword()
}

/// Maximum bracket nesting depth before the parser refuses to recurse
/// further and forces the rest of the buffer to end-of-input.
pub(crate) const MAX_STRUCTURE_DEPTH: usize = 256;

/// Bracket kind recorded for an open structural delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StructureMarkerKind {
    OpenParen,
    OpenBrace,
}

/// One open structural delimiter on the marker stack.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StructureMarker {
    pub(crate) loc: u32,
    pub(crate) kind: StructureMarkerKind,
}

impl<'a> Parser<'a> {
    /// Whether the current token starts a declaration.
    #[inline]
    pub(crate) fn at_decl_start(&self) -> bool {
        DECL_START.contains(self.kind())
    }

    /// Whether the current token starts a non-expression statement.
    #[inline]
    pub(crate) fn at_stmt_start(&self) -> bool {
        STMT_START.contains(self.kind())
    }

    /// Run `f` with a structure marker pushed for the delimiter at `loc`.
    ///
    /// Exceeding [`MAX_STRUCTURE_DEPTH`] diagnoses once and cuts off
    /// lexing, so every enclosing production unwinds at end-of-input
    /// instead of recursing deeper.
    pub(crate) fn with_structure_marker<R>(
        &mut self,
        loc: u32,
        kind: StructureMarkerKind,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let marker = StructureMarker { loc, kind };
        self.markers.push(marker);
        if self.markers.len() > MAX_STRUCTURE_DEPTH && !self.overflow_diagnosed {
            self.overflow_diagnosed = true;
            debug!(
                offset = marker.loc,
                kind = ?marker.kind,
                "structure depth limit hit, cutting off lexing"
            );
            self.emit(nesting_too_deep(Span::point(marker.loc), MAX_STRUCTURE_DEPTH));
            // Cutting off lexing instead of overwriting the current token
            // keeps the production that pushed this marker able to consume
            // the delimiter it already saw.
            self.cursor.cut_off_lexing();
        }
        let result = f(self);
        self.markers.pop();
        result
    }

    /// Skip one logical unit of input.
    ///
    /// Open brackets are skipped with their contents up to the matching
    /// closer, stopping early at an unexpected `}`. A `#if`/`#elseif`/
    /// `#else` directive is skipped with its whole branch chain. Anything
    /// else is a single token. Crossing a completion marker is reported
    /// through the returned status.
    pub(crate) fn skip_single(&mut self) -> ParserStatus {
        lyra_stack::ensure_sufficient_stack(|| {
            let mut status = ParserStatus::SUCCESS;
            match self.kind() {
                TokenKind::Eof => {}
                TokenKind::LParen => {
                    self.consume();
                    status |= self.skip_until(
                        TokenSet::single(TokenKind::RParen).with(TokenKind::RBrace),
                    );
                    let _ = self.consume_if(TokenKind::RParen);
                }
                TokenKind::LBrace => {
                    self.consume();
                    status |= self.skip_until(TokenSet::single(TokenKind::RBrace));
                    let _ = self.consume_if(TokenKind::RBrace);
                }
                TokenKind::LBracket => {
                    self.consume();
                    status |= self.skip_until(
                        TokenSet::single(TokenKind::RBracket).with(TokenKind::RBrace),
                    );
                    let _ = self.consume_if(TokenKind::RBracket);
                }
                TokenKind::PoundIf | TokenKind::PoundElse | TokenKind::PoundElseif => {
                    self.consume();
                    // skip_until also stops at `#endif` unconditionally.
                    status |= self.skip_until(
                        TokenSet::single(TokenKind::PoundElse).with(TokenKind::PoundElseif),
                    );
                    if matches!(self.kind(), TokenKind::PoundElse | TokenKind::PoundElseif) {
                        status |= self.skip_single();
                    } else {
                        let _ = self.consume_if(TokenKind::PoundEndif);
                    }
                }
                TokenKind::CodeComplete => {
                    status |= ParserStatus::code_completion();
                    self.consume();
                }
                _ => {
                    self.consume();
                }
            }
            status
        })
    }

    /// Skip logical units until a token in `stop`, end-of-input, or a
    /// conditional-compilation boundary.
    pub(crate) fn skip_until(&mut self, stop: TokenSet) -> ParserStatus {
        let mut status = ParserStatus::SUCCESS;
        // An empty stop set means "skip nothing", not "skip everything".
        if stop.is_empty() {
            return status;
        }
        while !self.check(TokenKind::Eof)
            && !stop.contains(self.kind())
            && !CONDITIONAL_BOUNDARY.contains(self.kind())
        {
            status |= self.skip_single();
        }
        status
    }

    /// Skip until a token in `stop`, a `}`, or the start of a declaration.
    ///
    /// `var`, `let`, and `inout` only count as declaration starts when they
    /// are not being used as argument labels; see
    /// [`Parser::binding_keyword_is_label`].
    pub(crate) fn skip_until_decl_boundary(&mut self, stop: TokenSet) -> ParserStatus {
        let mut status = ParserStatus::SUCCESS;
        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof
                || kind == TokenKind::RBrace
                || kind == TokenKind::CodeComplete
                || stop.contains(kind)
                || CONDITIONAL_BOUNDARY.contains(kind)
            {
                break;
            }
            if self.at_decl_start() {
                if BINDING_INTRO.contains(kind) && self.binding_keyword_is_label() {
                    // The keyword was consumed as part of the label check.
                    continue;
                }
                break;
            }
            status |= self.skip_single();
        }
        status
    }

    /// List-aware variant of [`Parser::skip_until_decl_boundary`].
    ///
    /// Tracks whether the element being skipped was preceded by a list
    /// separator: a binding keyword that opens a fresh line with no
    /// separator before it is taken as the next declaration rather than a
    /// label, ending the scan.
    pub(crate) fn skip_list_until_decl_boundary(
        &mut self,
        left: Span,
        stop: TokenSet,
    ) -> ParserStatus {
        let mut status = ParserStatus::SUCCESS;
        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof
                || kind == TokenKind::RBrace
                || stop.contains(kind)
                || CONDITIONAL_BOUNDARY.contains(kind)
            {
                break;
            }
            let has_delimiter =
                self.span().start == left.start || self.consume_if(TokenKind::Comma).is_some();
            let starts_line = self.at_line_start();
            if self.at_decl_start() {
                // Could be `let foo:` or `var:` used as a label.
                if BINDING_INTRO.contains(self.kind()) {
                    if starts_line && !has_delimiter {
                        break;
                    }
                    if self.binding_keyword_is_label() {
                        continue;
                    }
                }
                break;
            }
            status |= self.skip_single();
        }
        status
    }

    /// Decide whether a `var`/`let`/`inout` at the cursor is an argument
    /// label rather than a declaration start.
    ///
    /// Speculatively consumes the keyword and looks for a label-shaped
    /// token immediately followed by `:`. On a label verdict the keyword
    /// stays consumed (the speculation commits); on a declaration verdict
    /// the cursor is rolled back to the keyword.
    fn binding_keyword_is_label(&mut self) -> bool {
        self.speculate(|p| {
            p.consume();
            let labelish =
                can_be_argument_label(p.kind()) && p.peek().is(TokenKind::Colon);
            if labelish {
                Speculation::Commit(true)
            } else {
                Speculation::Rollback(false)
            }
        })
    }

    /// Scan for the `>` that closes a generic argument or parameter list,
    /// consuming it if found.
    ///
    /// Heuristic scan used after the list itself failed to parse: bail out
    /// at anything that clearly ends the enclosing construct (braces,
    /// end-of-input, a completion marker, a keyword other than `Self`),
    /// and otherwise skip logical units until an operator starting with
    /// `>` turns up. That operator is split so exactly its leading `>` is
    /// consumed. In a protocol-composition list parens and brackets also
    /// end the scan; in ordinary generic lists they may legally appear
    /// inside nested types and are skipped.
    ///
    /// Returns the span of the last token consumed, the closing `>` if one
    /// was found.
    pub(crate) fn skip_until_greater_in_type_list(
        &mut self,
        protocol_composition: bool,
    ) -> (ParserStatus, Span) {
        let mut status = ParserStatus::SUCCESS;
        let mut last = self.prev_span();
        loop {
            let kind = self.kind();
            match kind {
                TokenKind::Eof
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::CodeComplete
                | TokenKind::PoundIf
                | TokenKind::PoundEndif => return (status, last),
                // `Self` can appear inside types; skip it.
                TokenKind::KwSelfType => {}
                k if k.is_keyword() => return (status, last),
                TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket => {
                    if protocol_composition {
                        return (status, last);
                    }
                }
                _ if self.starts_with_greater() => {
                    let close = self.consume_starting_greater();
                    return (status, close);
                }
                _ => {}
            }
            status |= self.skip_single();
            last = self.prev_span();
        }
    }
}
