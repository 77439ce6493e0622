//! Expression productions.
//!
//! Binary expressions use precedence climbing keyed on operator text;
//! the lexer only distinguishes operator shapes, not individual
//! operators. Interpolated strings re-enter the expression grammar over
//! each embedded segment with a temporary cursor; see
//! [`Parser::parse_interpolation`].

use std::mem;

use lyra_diagnostic::{
    expected_expression, expected_identifier, expected_integer_literal, unclosed_delimiter,
};
use lyra_ir::ast::{CallArg, Expr, ExprId, ExprKind, StringPiece};
use lyra_ir::{Span, TokenFlags, TokenKind};
use lyra_lexer::{string_segments, CommentRetention, Lexer, StringSegment};

use crate::cursor::Cursor;
use crate::grammar::{parse_float_text, parse_int_text};
use crate::recovery::{can_be_argument_label, StructureMarkerKind};
use crate::{Parser, ParserStatus};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> (ParserStatus, ExprId) {
        self.parse_binary_expr(0)
    }

    /// Precedence climbing over infix operators at or above `min_power`.
    fn parse_binary_expr(&mut self, min_power: u8) -> (ParserStatus, ExprId) {
        lyra_stack::ensure_sufficient_stack(|| {
            let start = self.span().start;
            let (mut status, mut lhs) = self.parse_unary_expr();
            loop {
                if self.at_line_start() {
                    // An operator opening a line starts a new statement.
                    break;
                }
                let kind = self.kind();
                if !kind.is_any_operator() && kind != TokenKind::Eq {
                    break;
                }
                let text = self.text();
                let power = binding_power(text);
                if power < min_power {
                    break;
                }
                let op = self.consume();
                // Assignment is right-associative; everything else binds
                // to the left.
                let next_min = if text == "=" { power } else { power + 1 };
                let (rhs_status, rhs) = self.parse_binary_expr(next_min);
                status |= rhs_status;
                lhs = self.exprs.alloc(Expr {
                    kind: ExprKind::Binary { op, lhs, rhs },
                    span: self.span_from(start),
                });
                if rhs_status.is_error_or_completion() {
                    break;
                }
            }
            (status, lhs)
        })
    }

    fn parse_unary_expr(&mut self) -> (ParserStatus, ExprId) {
        if self.kind().is_any_operator() {
            let start = self.span().start;
            let op = self.consume();
            let (status, operand) = self.parse_unary_expr();
            let id = self.exprs.alloc(Expr {
                kind: ExprKind::Prefix { op, operand },
                span: self.span_from(start),
            });
            return (status, id);
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> (ParserStatus, ExprId) {
        let start = self.span().start;
        let (mut status, mut expr) = self.parse_primary_expr();
        if status.is_error_or_completion() {
            return (status, expr);
        }
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    let _ = self.consume();
                    match self.kind() {
                        TokenKind::Ident => {
                            let name = self.consume();
                            expr = self.exprs.alloc(Expr {
                                kind: ExprKind::Member { base: expr, name },
                                span: self.span_from(start),
                            });
                        }
                        TokenKind::IntLit => {
                            let (index_status, value) = self.parse_unsigned_integer();
                            status |= index_status;
                            let index = u32::try_from(value).unwrap_or(u32::MAX);
                            expr = self.exprs.alloc(Expr {
                                kind: ExprKind::TupleIndex { base: expr, index },
                                span: self.span_from(start),
                            });
                        }
                        TokenKind::CodeComplete => {
                            let name = self.consume();
                            status |= ParserStatus::code_completion();
                            expr = self.exprs.alloc(Expr {
                                kind: ExprKind::Member { base: expr, name },
                                span: self.span_from(start),
                            });
                            return (status, expr);
                        }
                        _ => {
                            self.emit(expected_identifier(self.span(), self.found_text()));
                            status.set_is_parse_error();
                            return (status, expr);
                        }
                    }
                }
                // A `(` on a fresh line opens a new statement, not a call.
                TokenKind::LParen if !self.at_line_start() => {
                    let open = self.consume();
                    let (args_status, args) = self.parse_call_args(open);
                    status |= args_status;
                    expr = self.exprs.alloc(Expr {
                        kind: ExprKind::Call { callee: expr, args },
                        span: self.span_from(start),
                    });
                }
                _ => break,
            }
        }
        (status, expr)
    }

    fn parse_call_args(&mut self, open: Span) -> (ParserStatus, Vec<CallArg>) {
        let mut args = Vec::new();
        let (status, _close) =
            self.with_structure_marker(open.start, StructureMarkerKind::OpenParen, |p| {
                p.parse_series(TokenKind::RParen, open, false, |p| {
                    let (arg_status, arg) = p.parse_call_arg();
                    args.push(arg);
                    arg_status
                })
            });
        (status, args)
    }

    fn parse_call_arg(&mut self) -> (ParserStatus, CallArg) {
        let mut label = None;
        if can_be_argument_label(self.kind()) && self.peek().kind == TokenKind::Colon {
            label = Some(self.consume());
            let _ = self.consume();
        }
        let (status, value) = self.parse_expr();
        (status, CallArg { label, value })
    }

    fn parse_primary_expr(&mut self) -> (ParserStatus, ExprId) {
        match self.kind() {
            TokenKind::IntLit => {
                let text = self.text();
                let parsed = parse_int_text(text);
                if parsed.is_none() {
                    self.emit(expected_integer_literal(self.span(), text));
                }
                let span = self.consume();
                match parsed {
                    Some(value) => (
                        ParserStatus::SUCCESS,
                        self.exprs.alloc(Expr {
                            kind: ExprKind::Int(value),
                            span,
                        }),
                    ),
                    None => (
                        ParserStatus::error(),
                        self.exprs.alloc(Expr {
                            kind: ExprKind::Error,
                            span,
                        }),
                    ),
                }
            }
            TokenKind::FloatLit => {
                let text = self.text();
                let parsed = parse_float_text(text);
                if parsed.is_none() {
                    self.emit(expected_expression(self.span(), text));
                }
                let span = self.consume();
                match parsed {
                    Some(value) => (
                        ParserStatus::SUCCESS,
                        self.exprs.alloc(Expr {
                            kind: ExprKind::Float(value.to_bits()),
                            span,
                        }),
                    ),
                    None => (
                        ParserStatus::error(),
                        self.exprs.alloc(Expr {
                            kind: ExprKind::Error,
                            span,
                        }),
                    ),
                }
            }
            TokenKind::StringLit => self.parse_string_expr(),
            TokenKind::Ident | TokenKind::KwSelfType => {
                let span = self.consume();
                (
                    ParserStatus::SUCCESS,
                    self.exprs.alloc(Expr {
                        kind: ExprKind::Name(span),
                        span,
                    }),
                )
            }
            TokenKind::LParen => self.parse_paren_expr(),
            TokenKind::CodeComplete => {
                let span = self.consume();
                (
                    ParserStatus::code_completion(),
                    self.exprs.alloc(Expr {
                        kind: ExprKind::CodeComplete,
                        span,
                    }),
                )
            }
            _ => {
                // Nothing is consumed; the caller decides how to skip.
                let span = Span::point(self.span().start);
                self.emit(expected_expression(self.span(), self.found_text()));
                (
                    ParserStatus::error(),
                    self.exprs.alloc(Expr {
                        kind: ExprKind::Error,
                        span,
                    }),
                )
            }
        }
    }

    /// `( expr* )` as grouping or tuple literal.
    fn parse_paren_expr(&mut self) -> (ParserStatus, ExprId) {
        let open = self.consume();
        let mut args = Vec::new();
        let (status, close) =
            self.with_structure_marker(open.start, StructureMarkerKind::OpenParen, |p| {
                p.parse_series(TokenKind::RParen, open, false, |p| {
                    let (arg_status, arg) = p.parse_call_arg();
                    args.push(arg);
                    arg_status
                })
            });
        let span = open.merge(close);
        let kind = if args.len() == 1 && args[0].label.is_none() {
            args.pop()
                .map_or(ExprKind::Tuple(Vec::new()), |arg| ExprKind::Paren(arg.value))
        } else {
            ExprKind::Tuple(args)
        };
        (status, self.exprs.alloc(Expr { kind, span }))
    }

    /// A string literal, with `\(...)` segments parsed as argument lists.
    fn parse_string_expr(&mut self) -> (ParserStatus, ExprId) {
        let token = *self.cursor.current();
        let span = self.consume();
        let mut status = ParserStatus::SUCCESS;
        if token.flags.has(TokenFlags::UNTERMINATED) {
            self.emit(unclosed_delimiter(
                Span::point(span.start),
                Span::point(span.end),
                '"',
            ));
            status.set_is_parse_error();
        }

        let mut pieces = Vec::new();
        for segment in string_segments(self.source, &token) {
            match segment {
                StringSegment::Literal(lit) => {
                    if !lit.is_empty() {
                        pieces.push(StringPiece::Lit(lit));
                    }
                }
                StringSegment::Interpolation(interp) => {
                    let (interp_status, args) = self.parse_interpolation(interp);
                    status |= interp_status;
                    pieces.push(StringPiece::Interp(args));
                }
            }
        }
        (
            status,
            self.exprs.alloc(Expr {
                kind: ExprKind::Str(pieces),
                span,
            }),
        )
    }

    /// Parse one interpolation segment with a temporary cursor over just
    /// that range.
    ///
    /// The recorder and hash are suspended: the enclosing string literal
    /// was already recorded and hashed as one token, and the segment's
    /// tokens lie inside its span. The segment's artificial end of input
    /// reads as the closing `)`; see [`Cursor::is_interpolation_eof`].
    fn parse_interpolation(&mut self, segment: Span) -> (ParserStatus, Vec<CallArg>) {
        if segment.is_empty() {
            // An empty lexing range would mean the whole buffer.
            return (ParserStatus::SUCCESS, Vec::new());
        }
        let completion = self
            .options
            .completion_offset
            .filter(|&offset| segment.contains(offset));
        let lexer = Lexer::over_range(self.source, segment)
            .with_retention(CommentRetention::Attach)
            .with_completion_offset(completion);
        let saved = mem::replace(&mut self.cursor, Cursor::new(lexer));
        let recorder = self.recorder.take();
        let hasher = self.hasher.take();

        let mut args = Vec::new();
        let (status, _close) =
            self.with_structure_marker(segment.start, StructureMarkerKind::OpenParen, |p| {
                p.parse_series(TokenKind::RParen, Span::point(segment.start), false, |p| {
                    let (arg_status, arg) = p.parse_call_arg();
                    args.push(arg);
                    arg_status
                })
            });

        self.hasher = hasher;
        self.recorder = recorder;
        self.cursor = saved;
        (status, args)
    }
}

fn binding_power(op: &str) -> u8 {
    match op {
        "=" => 1,
        "||" => 2,
        "&&" => 3,
        "==" | "!=" => 4,
        "<" | ">" | "<=" | ">=" => 5,
        "|" | "^" => 6,
        "&" => 7,
        "<<" | ">>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        // Custom operators sit with the comparisons.
        _ => 4,
    }
}
