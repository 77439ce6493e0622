//! Declaration, statement and block productions.
//!
//! Struct and fn declarations allocate their arena slot up front with
//! placeholder contents and patch it once parsed, so a delayed body can
//! name its declaration by id while the declaration is still being
//! built.

use lyra_diagnostic::{
    expected_declaration, expected_expression, expected_identifier, keyword_as_identifier,
    unexpected_token,
};
use lyra_ir::ast::{
    BindingDecl, BindingKeyword, Block, Decl, DeclId, DeclKind, Expr, ExprKind, ExtensionDecl,
    FnBody, FnDecl, Param, SourceFile, Stmt, StmtKind, StructDecl, TopLevelCode,
};
use lyra_ir::{Span, TokenKind};

use crate::recovery::{StructureMarkerKind, TokenSet};
use crate::{DelayedBodyKind, DelayedContext, Parser, ParserResult, ParserStatus};

impl<'a> Parser<'a> {
    /// Parse one declaration. The current token decides the production.
    pub(crate) fn parse_decl(&mut self) -> ParserResult<DeclId> {
        lyra_stack::ensure_sufficient_stack(|| match self.kind() {
            TokenKind::KwFn => self.parse_fn_decl(),
            TokenKind::KwStruct => self.parse_struct_decl(),
            TokenKind::KwExtension => self.parse_extension_decl(),
            TokenKind::KwVar | TokenKind::KwLet => {
                let start = self.span().start;
                let (status, binding) = self.parse_binding_decl();
                let id = self.decls.alloc(Decl {
                    kind: DeclKind::Binding(binding),
                    span: self.span_from(start),
                });
                ParserResult::new(status, id)
            }
            TokenKind::KwInout => {
                // A parameter modifier cannot open a declaration.
                self.emit(expected_declaration(self.span(), self.text()));
                let _ = self.consume();
                ParserResult::error()
            }
            _ => {
                self.emit(expected_declaration(self.span(), self.found_text()));
                ParserResult::error()
            }
        })
    }

    fn parse_fn_decl(&mut self) -> ParserResult<DeclId> {
        let start = self.span().start;
        let _ = self.consume();
        let mut status = ParserStatus::SUCCESS;

        let name = if self.kind().is_any_operator() {
            self.consume()
        } else {
            let (name_status, span) = self.parse_identifier();
            status |= name_status;
            span
        };

        // Placeholder slot; a delayed body refers to the declaration by id.
        let id = self.decls.alloc(Decl {
            kind: DeclKind::Fn(FnDecl {
                name,
                params: Vec::new(),
                ret: None,
                body: FnBody::None,
            }),
            span: Span::point(start),
        });

        let mut params = Vec::new();
        if let Some(open) = self.consume_if(TokenKind::LParen) {
            let (list_status, _close) =
                self.with_structure_marker(open.start, StructureMarkerKind::OpenParen, |p| {
                    p.parse_series(TokenKind::RParen, open, false, |p| {
                        let (param_status, param) = p.parse_param();
                        if !param.span.is_empty() {
                            params.push(param);
                        }
                        param_status
                    })
                });
            status |= list_status;
        } else {
            self.emit(unexpected_token(self.span(), "`(`", self.found_text()));
            status.set_is_parse_error();
        }

        let mut ret = None;
        if self.consume_if(TokenKind::Arrow).is_some() {
            let (ty_status, parsed) = self.parse_type();
            status |= ty_status;
            ret = Some(parsed);
        }

        let body = if self.check(TokenKind::LBrace) {
            let (body_status, body) = self.parse_fn_body(id);
            status |= body_status;
            body
        } else {
            FnBody::None
        };

        let span = self.span_from(start);
        let decl = self.decls.get_mut(id);
        decl.span = span;
        if let DeclKind::Fn(fn_decl) = &mut decl.kind {
            fn_decl.params = params;
            fn_decl.ret = ret;
            fn_decl.body = body;
        }
        ParserResult::new(status, id)
    }

    /// `label name: Ty`, `name: Ty`, or `_ name: Ty`.
    fn parse_param(&mut self) -> (ParserStatus, Param) {
        let start = self.span().start;
        let mut status = ParserStatus::SUCCESS;

        if self.check(TokenKind::CodeComplete) {
            let span = self.consume();
            status |= ParserStatus::code_completion();
            return (
                status,
                Param {
                    label: None,
                    name: span,
                    ty: None,
                    span,
                },
            );
        }

        let (first_status, first) = self.parse_identifier();
        status |= first_status;
        let mut label = None;
        let mut name = first;
        if self.check(TokenKind::Ident) {
            // Two identifiers: external label then internal name.
            name = self.consume();
            if self.span_text(first) != "_" {
                label = Some(first);
            }
        }

        let mut ty = None;
        if self.consume_if(TokenKind::Colon).is_some() {
            let _ = self.consume_if(TokenKind::KwInout);
            let (ty_status, parsed) = self.parse_type();
            status |= ty_status;
            ty = Some(parsed);
        }

        let span = self.span_from(start);
        (status, Param { label, name, ty, span })
    }

    /// Parse a function body, eagerly or as a recorded skip.
    ///
    /// Body tokens never feed the interface hash, so a declaration's hash
    /// does not depend on how its bodies were edited or whether they were
    /// delayed.
    fn parse_fn_body(&mut self, id: DeclId) -> (ParserStatus, FnBody) {
        let hasher = self.hasher.take();
        let result = if self.delaying_active() {
            let prev = self.prev_span();
            let (status, span) = self.skip_braced_block();
            if self.delayed.is_none() && self.completion_inside(span) {
                self.record_delayed(DelayedBodyKind::FunctionBody(id), span, prev);
            }
            (status, FnBody::Delayed(span))
        } else {
            let (status, block) = self.parse_block();
            (status, FnBody::Parsed(block))
        };
        self.hasher = hasher;
        result
    }

    fn parse_struct_decl(&mut self) -> ParserResult<DeclId> {
        let start = self.span().start;
        let _ = self.consume();
        let mut status = ParserStatus::SUCCESS;
        let (name_status, name) = self.parse_identifier();
        status |= name_status;

        let id = self.decls.alloc(Decl {
            kind: DeclKind::Struct(StructDecl {
                name,
                members: Vec::new(),
            }),
            span: Span::point(start),
        });
        let (body_status, members) = self.parse_member_block(DelayedContext::Type(id));
        status |= body_status;

        let span = self.span_from(start);
        let decl = self.decls.get_mut(id);
        decl.span = span;
        if let DeclKind::Struct(struct_decl) = &mut decl.kind {
            struct_decl.members = members;
        }
        ParserResult::new(status, id)
    }

    fn parse_extension_decl(&mut self) -> ParserResult<DeclId> {
        let start = self.span().start;
        let _ = self.consume();
        let mut status = ParserStatus::SUCCESS;
        let (ty_status, target) = self.parse_type();
        status |= ty_status;

        let id = self.decls.alloc(Decl {
            kind: DeclKind::Extension(ExtensionDecl {
                target,
                members: Vec::new(),
            }),
            span: Span::point(start),
        });
        let (body_status, members) = self.parse_member_block(DelayedContext::Extension(id));
        status |= body_status;

        let span = self.span_from(start);
        let decl = self.decls.get_mut(id);
        decl.span = span;
        if let DeclKind::Extension(ext) = &mut decl.kind {
            ext.members = members;
        }
        ParserResult::new(status, id)
    }

    /// `{ member* }` for struct and extension bodies.
    fn parse_member_block(&mut self, context: DelayedContext) -> (ParserStatus, Vec<DeclId>) {
        let mut status = ParserStatus::SUCCESS;
        let mut members = Vec::new();
        let Some(open) = self.consume_if(TokenKind::LBrace) else {
            self.emit(unexpected_token(self.span(), "`{`", self.found_text()));
            status.set_is_parse_error();
            return (status, members);
        };

        let inner =
            self.with_structure_marker(open.start, StructureMarkerKind::OpenBrace, |p| {
                let mut inner = ParserStatus::SUCCESS;
                loop {
                    if p.consume_if(TokenKind::Semi).is_some() {
                        continue;
                    }
                    if p.check(TokenKind::RBrace) || p.check(TokenKind::Eof) {
                        break;
                    }
                    if p.check(TokenKind::CodeComplete) {
                        let _ = p.consume();
                        inner |= ParserStatus::code_completion();
                        continue;
                    }
                    if !p.at_decl_start() {
                        p.emit(expected_declaration(p.span(), p.found_text()));
                        inner |= p.skip_until_decl_boundary(TokenSet::EMPTY);
                        inner.set_is_parse_error();
                        continue;
                    }
                    let decl = p.parse_decl_in(context);
                    inner |= decl.status;
                    if let Some(member) = decl.value {
                        members.push(member);
                    }
                }
                inner
            });
        status |= inner;

        if self.expect_matching(TokenKind::RBrace, open).is_err() {
            status.set_is_parse_error();
        }
        (status, members)
    }

    /// `{ stmt* }`.
    pub(crate) fn parse_block(&mut self) -> (ParserStatus, Block) {
        let mut status = ParserStatus::SUCCESS;
        let mut stmts = Vec::new();
        let start = self.span().start;
        let Some(open) = self.consume_if(TokenKind::LBrace) else {
            self.emit(unexpected_token(self.span(), "`{`", self.found_text()));
            status.set_is_parse_error();
            return (
                status,
                Block {
                    stmts,
                    span: Span::point(start),
                },
            );
        };

        let inner =
            self.with_structure_marker(open.start, StructureMarkerKind::OpenBrace, |p| {
                let mut inner = ParserStatus::SUCCESS;
                while !p.check(TokenKind::RBrace) && !p.check(TokenKind::Eof) {
                    if p.consume_if(TokenKind::Semi).is_some() {
                        continue;
                    }
                    let before = p.span().start;
                    let (stmt_status, stmt) = p.parse_stmt();
                    inner |= stmt_status;
                    stmts.push(stmt);
                    if p.span().start == before
                        && !p.check(TokenKind::RBrace)
                        && !p.check(TokenKind::Eof)
                    {
                        inner |= p.skip_single();
                        inner.set_is_parse_error();
                    }
                }
                inner
            });
        status |= inner;

        let close = match self.expect_matching(TokenKind::RBrace, open) {
            Ok(span) => span,
            Err(span) => {
                status.set_is_parse_error();
                span
            }
        };
        (
            status,
            Block {
                stmts,
                span: open.merge(close),
            },
        )
    }

    /// Parse one statement. Always consumes at least the tokens the
    /// statement recognized; a statement that could not even start
    /// produces an error expression spanning no input, and the caller's
    /// progress guard deals with the stuck token.
    pub(crate) fn parse_stmt(&mut self) -> (ParserStatus, Stmt) {
        let start = self.span().start;
        match self.kind() {
            TokenKind::KwReturn => {
                let _ = self.consume();
                let mut status = ParserStatus::SUCCESS;
                let mut value = None;
                if self.can_start_return_value() {
                    let (expr_status, id) = self.parse_expr();
                    status |= expr_status;
                    value = Some(id);
                }
                (
                    status,
                    Stmt {
                        kind: StmtKind::Return(value),
                        span: self.span_from(start),
                    },
                )
            }
            TokenKind::KwVar | TokenKind::KwLet => {
                let (status, binding) = self.parse_binding_decl();
                (
                    status,
                    Stmt {
                        kind: StmtKind::Binding(binding),
                        span: self.span_from(start),
                    },
                )
            }
            TokenKind::KwIf
            | TokenKind::KwElse
            | TokenKind::KwWhile
            | TokenKind::KwFor
            | TokenKind::KwBreak
            | TokenKind::KwContinue => {
                // Control flow is lexed but not in the statement grammar
                // yet; eat the keyword so recovery can resynchronize.
                self.emit(expected_expression(self.span(), self.text()));
                let mut status = ParserStatus::error();
                status |= self.skip_single();
                let span = self.span_from(start);
                let id = self.exprs.alloc(Expr {
                    kind: ExprKind::Error,
                    span,
                });
                (
                    status,
                    Stmt {
                        kind: StmtKind::Expr(id),
                        span,
                    },
                )
            }
            _ => {
                let (status, id) = self.parse_expr();
                (
                    status,
                    Stmt {
                        kind: StmtKind::Expr(id),
                        span: self.span_from(start),
                    },
                )
            }
        }
    }

    fn can_start_return_value(&self) -> bool {
        !(self.at_line_start()
            || self.at_decl_start()
            || self.at_stmt_start()
            || matches!(
                self.kind(),
                TokenKind::Eof | TokenKind::RBrace | TokenKind::Semi
            ))
    }

    /// `var name: Ty = init` / `let name: Ty = init`. The keyword is the
    /// current token.
    fn parse_binding_decl(&mut self) -> (ParserStatus, BindingDecl) {
        let keyword = if self.check(TokenKind::KwVar) {
            BindingKeyword::Var
        } else {
            debug_assert!(self.check(TokenKind::KwLet), "binding must start at var/let");
            BindingKeyword::Let
        };
        let _ = self.consume();

        let mut status = ParserStatus::SUCCESS;
        let (name_status, name) = self.parse_identifier();
        status |= name_status;

        let mut ty = None;
        if self.consume_if(TokenKind::Colon).is_some() {
            let (ty_status, parsed) = self.parse_type();
            status |= ty_status;
            ty = Some(parsed);
        }

        let mut init = None;
        if self.consume_if(TokenKind::Eq).is_some() {
            let (expr_status, id) = self.parse_expr();
            status |= expr_status;
            init = Some(id);
        }

        (
            status,
            BindingDecl {
                keyword,
                name,
                ty,
                init,
            },
        )
    }

    /// Parse a plain identifier, tolerating keywords with a diagnostic.
    pub(crate) fn parse_identifier(&mut self) -> (ParserStatus, Span) {
        if self.check(TokenKind::Ident) {
            return (ParserStatus::SUCCESS, self.consume());
        }
        if self.kind().is_keyword() {
            self.emit(keyword_as_identifier(self.span(), self.text()));
            return (ParserStatus::error(), self.consume());
        }
        self.emit(expected_identifier(self.span(), self.found_text()));
        (ParserStatus::error(), Span::point(self.span().start))
    }

    /// One top-level statement, wrapped in its own code declaration.
    pub(crate) fn parse_top_level_code(&mut self, file: &mut SourceFile) -> ParserStatus {
        let begin = self.snapshot();
        let mark = self.diags.mark();
        let (status, stmt) = self.parse_stmt();

        if self.should_capture_delayed(status) {
            let end = self.span().start;
            let span = self.capture_delayed(begin, mark, end);
            let id = self.decls.alloc(Decl {
                kind: DeclKind::TopLevel(TopLevelCode {
                    body: Block {
                        stmts: Vec::new(),
                        span,
                    },
                }),
                span,
            });
            file.items.push(id);
            self.record_delayed(DelayedBodyKind::TopLevelCode(id), span, begin.prev_span);
            return status;
        }

        let span = stmt.span;
        let id = self.decls.alloc(Decl {
            kind: DeclKind::TopLevel(TopLevelCode {
                body: Block {
                    stmts: vec![stmt],
                    span,
                },
            }),
            span,
        });
        file.items.push(id);
        status
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use lyra_ir::ast::{DeclKind, FnBody, StmtKind};
    use lyra_ir::Span;

    use crate::{parse_source, ParseOutput};

    fn item_kind(output: &ParseOutput, index: usize) -> &DeclKind {
        &output.decls.get(output.file.items[index]).kind
    }

    fn text(source: &str, span: Span) -> &str {
        &source[span.start as usize..span.end as usize]
    }

    #[test]
    fn fn_decl_with_params_and_return_type() {
        let source = "fn add(a: Int, b: Int) -> Int { return a + b }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        assert_eq!(output.diagnostics, vec![]);
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        assert_eq!(text(source, decl.name), "add");
        assert_eq!(decl.params.len(), 2);
        assert_eq!(text(source, decl.params[0].name), "a");
        assert!(decl.params[0].label.is_none());
        assert!(decl.params[0].ty.is_some());
        assert!(decl.ret.is_some());
        let FnBody::Parsed(block) = &decl.body else {
            panic!("body should parse eagerly by default");
        };
        assert_eq!(block.stmts.len(), 1);
        assert!(matches!(block.stmts[0].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn fn_params_take_external_labels() {
        let source = "fn shift(from a: Int, _ b: Int) {}";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        let Some(label) = decl.params[0].label else {
            panic!("first parameter should keep its external label");
        };
        assert_eq!(text(source, label), "from");
        assert_eq!(text(source, decl.params[0].name), "a");
        assert!(decl.params[1].label.is_none(), "`_` suppresses the label");
        assert_eq!(text(source, decl.params[1].name), "b");
    }

    #[test]
    fn operator_fn_name() {
        let source = "fn +(a: Int, b: Int) -> Int { return a }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        assert_eq!(text(source, decl.name), "+");
    }

    #[test]
    fn struct_members_stay_in_source_order() {
        let source = "struct P { var x: Int var y: Int }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        assert_eq!(output.diagnostics, vec![]);
        let DeclKind::Struct(decl) = item_kind(&output, 0) else {
            panic!("expected a struct declaration");
        };
        assert_eq!(text(source, decl.name), "P");
        assert_eq!(decl.members.len(), 2);
        let names: Vec<&str> = decl
            .members
            .iter()
            .map(|&member| match &output.decls.get(member).kind {
                DeclKind::Binding(binding) => text(source, binding.name),
                other => panic!("unexpected member {other:?}"),
            })
            .collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn extension_declares_members_for_its_target() {
        let source = "extension P { fn size() -> Int { return 0 } }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let DeclKind::Extension(decl) = item_kind(&output, 0) else {
            panic!("expected an extension declaration");
        };
        assert_eq!(decl.members.len(), 1);
        assert!(matches!(
            output.decls.get(decl.members[0]).kind,
            DeclKind::Fn(_)
        ));
    }

    #[test]
    fn each_top_level_statement_wraps_in_its_own_group() {
        let output = parse_source("x\ny");
        assert!(output.status.is_success());
        assert_eq!(output.file.items.len(), 2);
        for index in 0..2 {
            let DeclKind::TopLevel(code) = item_kind(&output, index) else {
                panic!("expected top-level code");
            };
            assert_eq!(code.body.stmts.len(), 1);
        }
    }

    #[test]
    fn junk_between_members_skips_to_the_next_declaration() {
        let source = "struct S { 42 fn ok() {} }";
        let output = parse_source(source);
        assert!(output.status.is_error());
        assert_eq!(output.diagnostics.len(), 1);
        let DeclKind::Struct(decl) = item_kind(&output, 0) else {
            panic!("expected a struct declaration");
        };
        assert_eq!(decl.members.len(), 1, "the fn after the junk survives");
    }

    #[test]
    fn missing_member_closer_marks_the_input_incomplete() {
        let output = parse_source("struct S { var x: Int");
        assert!(output.status.is_error());
        assert!(output.status.is_input_incomplete());
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[test]
    fn stray_inout_cannot_open_a_declaration() {
        let source = "struct S { inout }";
        let output = parse_source(source);
        assert!(output.status.is_error());
        assert_eq!(output.diagnostics.len(), 1);
        let DeclKind::Struct(decl) = item_kind(&output, 0) else {
            panic!("expected a struct declaration");
        };
        assert!(decl.members.is_empty());
    }

    #[test]
    fn return_value_must_start_on_the_same_line() {
        let source = "fn f() -> Int { return\n1 }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        let FnBody::Parsed(block) = &decl.body else {
            panic!("body should parse eagerly by default");
        };
        assert_eq!(block.stmts.len(), 2);
        assert!(matches!(block.stmts[0].kind, StmtKind::Return(None)));
        assert!(matches!(block.stmts[1].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn semicolons_separate_block_statements() {
        let source = "fn f() { a; b }";
        let output = parse_source(source);
        assert!(output.status.is_success());
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        let FnBody::Parsed(block) = &decl.body else {
            panic!("body should parse eagerly by default");
        };
        assert_eq!(block.stmts.len(), 2);
    }

    #[test]
    fn control_flow_keywords_are_not_statements_yet() {
        let source = "fn f() { if }";
        let output = parse_source(source);
        assert!(output.status.is_error());
        assert_eq!(output.diagnostics.len(), 1);
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        let FnBody::Parsed(block) = &decl.body else {
            panic!("body should parse eagerly by default");
        };
        assert_eq!(block.stmts.len(), 1);
    }

    #[test]
    fn keyword_fn_name_is_tolerated_with_a_diagnostic() {
        let source = "fn for() {}";
        let output = parse_source(source);
        assert!(output.status.is_error());
        assert_eq!(output.diagnostics.len(), 1);
        let DeclKind::Fn(decl) = item_kind(&output, 0) else {
            panic!("expected a fn declaration");
        };
        assert_eq!(text(source, decl.name), "for");
        assert!(matches!(decl.body, FnBody::Parsed(_)));
    }
}
