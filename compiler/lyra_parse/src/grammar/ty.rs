//! Type annotation productions.
//!
//! Generic argument lists are where `>` splitting matters: `Vec<Vec<Int>>`
//! lexes its closer as one `>>` operator, and [`Parser::consume_starting_greater`]
//! peels the outer `>` off it.

use lyra_diagnostic::{expected_type, unclosed_delimiter};
use lyra_ir::ast::{TypeExpr, TypeKind};
use lyra_ir::{Span, TokenKind};

use crate::recovery::StructureMarkerKind;
use crate::{Parser, ParserStatus};

impl<'a> Parser<'a> {
    /// Parse a type annotation.
    pub(crate) fn parse_type(&mut self) -> (ParserStatus, TypeExpr) {
        lyra_stack::ensure_sufficient_stack(|| {
            let start = self.span().start;
            let (mut status, first) = self.parse_primary_type();
            if status.is_error_or_completion() || !self.at_composition_amp() {
                return (status, first);
            }
            let mut parts = vec![first];
            while self.at_composition_amp() {
                let _ = self.consume();
                let (part_status, part) = self.parse_primary_type();
                status |= part_status;
                parts.push(part);
                if part_status.is_error_or_completion() {
                    break;
                }
            }
            let span = self.span_from(start);
            (
                status,
                TypeExpr {
                    kind: TypeKind::Composition(parts),
                    span,
                },
            )
        })
    }

    fn at_composition_amp(&self) -> bool {
        self.kind().is_any_operator() && self.text() == "&"
    }

    fn parse_primary_type(&mut self) -> (ParserStatus, TypeExpr) {
        let start = self.span().start;
        match self.kind() {
            TokenKind::Ident => {
                let name = self.consume();
                let mut status = ParserStatus::SUCCESS;
                let mut args = Vec::new();
                if self.starts_with_less() {
                    let (args_status, parsed) = self.parse_generic_args();
                    status |= args_status;
                    args = parsed;
                }
                let span = self.span_from(start);
                (
                    status,
                    TypeExpr {
                        kind: TypeKind::Named { name, args },
                        span,
                    },
                )
            }
            TokenKind::KwSelfType => {
                let span = self.consume();
                (
                    ParserStatus::SUCCESS,
                    TypeExpr {
                        kind: TypeKind::SelfType,
                        span,
                    },
                )
            }
            TokenKind::LParen => self.parse_paren_type(),
            TokenKind::CodeComplete => {
                let span = self.consume();
                (ParserStatus::code_completion(), TypeExpr::error(span))
            }
            _ => {
                // Nothing is consumed; the annotation's caller recovers.
                self.emit(expected_type(self.span(), self.found_text()));
                (
                    ParserStatus::error(),
                    TypeExpr::error(Span::point(self.span().start)),
                )
            }
        }
    }

    /// `(T, U)`, `()`, or `(T, U) -> R`.
    fn parse_paren_type(&mut self) -> (ParserStatus, TypeExpr) {
        let start = self.span().start;
        let open = self.consume();
        let mut params = Vec::new();
        let (mut status, _close) =
            self.with_structure_marker(open.start, StructureMarkerKind::OpenParen, |p| {
                p.parse_series(TokenKind::RParen, open, false, |p| {
                    let (elem_status, elem) = p.parse_type();
                    params.push(elem);
                    elem_status
                })
            });
        if self.check(TokenKind::Arrow) {
            let _ = self.consume();
            let (ret_status, ret) = self.parse_type();
            status |= ret_status;
            let span = self.span_from(start);
            return (
                status,
                TypeExpr {
                    kind: TypeKind::Fn {
                        params,
                        ret: Box::new(ret),
                    },
                    span,
                },
            );
        }
        let span = self.span_from(start);
        (
            status,
            TypeExpr {
                kind: TypeKind::Tuple(params),
                span,
            },
        )
    }

    /// `<T, U>` after a type name.
    ///
    /// A failed argument resynchronizes on the closing `>` so the
    /// enclosing construct keeps its footing. A missing closer is only
    /// diagnosed; whatever follows is likely the enclosing construct
    /// continuing and must not be skipped.
    fn parse_generic_args(&mut self) -> (ParserStatus, Vec<TypeExpr>) {
        let open = self.consume_starting_less();
        let mut status = ParserStatus::SUCCESS;
        let mut args = Vec::new();
        loop {
            let (arg_status, arg) = self.parse_type();
            status |= arg_status;
            args.push(arg);
            if arg_status.is_error_or_completion() {
                let (skip_status, _last) = self.skip_until_greater_in_type_list(false);
                status |= skip_status;
                return (status, args);
            }
            if self.consume_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        if self.starts_with_greater() {
            self.consume_starting_greater();
        } else {
            let anchor = self.prev_span();
            self.emit(unclosed_delimiter(open, Span::point(anchor.end), '<'));
            status.set_is_parse_error();
        }
        (status, args)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lyra_ir::ast::{DeclKind, TypeExpr, TypeKind};
    use lyra_ir::Span;

    use crate::{parse_source, ParseOutput};

    fn annotation(output: &ParseOutput) -> &TypeExpr {
        let Some(&item) = output.file.items.first() else {
            panic!("no top-level items");
        };
        let DeclKind::Binding(binding) = &output.decls.get(item).kind else {
            panic!("expected a binding");
        };
        let Some(ty) = &binding.ty else {
            panic!("binding has no type annotation");
        };
        ty
    }

    fn text(source: &str, span: Span) -> &str {
        &source[span.start as usize..span.end as usize]
    }

    #[test]
    fn named_type_with_generic_arguments() {
        let source = "var x: Map<Int, Str>";
        let output = parse_source(source);
        assert!(output.status.is_success());
        assert_eq!(output.diagnostics, vec![]);
        let TypeKind::Named { name, args } = &annotation(&output).kind else {
            panic!("expected a named type");
        };
        assert_eq!(text(source, *name), "Map");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn nested_generic_closers_split_a_shift_operator() {
        let source = "var x: Vec<Vec<Int>>";
        let output = parse_source(source);
        assert!(output.status.is_success());
        assert_eq!(output.diagnostics, vec![]);
        let TypeKind::Named { args, .. } = &annotation(&output).kind else {
            panic!("expected a named type");
        };
        assert_eq!(args.len(), 1);
        let TypeKind::Named { name, args: inner } = &args[0].kind else {
            panic!("argument should itself be generic");
        };
        assert_eq!(text(source, *name), "Vec");
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn ampersand_joins_a_composition() {
        let source = "var x: A & B & C";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let TypeKind::Composition(parts) = &annotation(&output).kind else {
            panic!("expected a composition");
        };
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn parenthesized_types_make_tuples_and_functions() {
        let source = "var f: (Int, Str) -> Bool";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let TypeKind::Fn { params, ret } = &annotation(&output).kind else {
            panic!("expected a function type");
        };
        assert_eq!(params.len(), 2);
        assert!(matches!(ret.kind, TypeKind::Named { .. }));

        let source = "var u: ()";
        let output = parse_source(source);
        let TypeKind::Tuple(elems) = &annotation(&output).kind else {
            panic!("expected the empty tuple type");
        };
        assert!(elems.is_empty());
    }

    #[test]
    fn self_type_annotation() {
        let output = parse_source("var s: Self");
        assert!(output.status.is_success());
        assert!(matches!(annotation(&output).kind, TypeKind::SelfType));
    }

    #[test]
    fn missing_generic_closer_leaves_the_initializer_alone() {
        let source = "var x: Vec<Int = 3";
        let output = parse_source(source);
        assert!(output.status.is_error());
        assert_eq!(output.diagnostics.len(), 1);
        let Some(&item) = output.file.items.first() else {
            panic!("no top-level items");
        };
        let DeclKind::Binding(binding) = &output.decls.get(item).kind else {
            panic!("expected a binding");
        };
        assert!(binding.init.is_some(), "initializer should still parse");
    }

    #[test]
    fn garbage_annotation_becomes_an_error_node() {
        let output = parse_source("var x: 42");
        assert!(output.status.is_error());
        assert!(matches!(annotation(&output).kind, TypeKind::Error));
    }
}
