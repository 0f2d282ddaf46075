//! Statement productions.

use crate::{ParseResult, Parser};
use xshade_ast::*;
use xshade_lexer::TokenKind;

impl<'src, 'r, 'log> Parser<'src, 'r, 'log> {
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let attribs = if self.is(TokenKind::LBracket) {
            self.parse_attribute_list()?
        } else {
            Vec::new()
        };

        let mut stmt = match self.current.kind {
            TokenKind::Semicolon => self.parse_null_stmt()?,
            TokenKind::LBrace => self.parse_code_block_stmt()?,
            TokenKind::Return => self.parse_return_stmt()?,
            TokenKind::Ident => self.parse_var_decl_or_assign_or_call_stmt()?,
            TokenKind::For => self.parse_for_loop_stmt()?,
            TokenKind::While => self.parse_while_loop_stmt()?,
            TokenKind::Do => self.parse_do_while_loop_stmt()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::CtrlTransfer => self.parse_ctrl_transfer_stmt()?,
            TokenKind::Struct => self.parse_struct_decl_or_var_decl_stmt()?,
            TokenKind::Typedef => self.parse_alias_decl_stmt()?,
            TokenKind::Sampler | TokenKind::SamplerState => self.parse_sampler_decl_stmt()?,
            TokenKind::TypeModifier | TokenKind::StorageClass => self.parse_var_decl_stmt()?,
            _ if self.is_data_type() => self.parse_var_decl_stmt()?,
            _ => self.parse_expr_stmt(None)?,
        };

        stmt.attribs = attribs;
        Ok(stmt)
    }

    fn parse_null_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept_it()?;
        Ok(Stmt::new(StmtKind::Null, token.area))
    }

    fn parse_code_block_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.current.area;
        let block = self.parse_code_block()?;
        Ok(Stmt::new(StmtKind::CodeBlock(block), span))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::Return)?;
        let expr = if self.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.semi()?;
        Ok(Stmt::new(
            StmtKind::Return {
                expr,
                is_end_of_function: false,
            },
            token.area,
        ))
    }

    fn parse_ctrl_transfer_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::CtrlTransfer)?;
        let transfer = CtrlTransfer::from_spelling(&token.spell)
            .expect("token classified as control transfer");
        self.semi()?;
        Ok(Stmt::new(StmtKind::CtrlTransfer(transfer), token.area))
    }

    fn parse_for_loop_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::For)?;
        self.accept(TokenKind::LParen)?;

        let init = Box::new(self.parse_stmt()?);

        let condition = if self.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.semi()?;

        let iteration = if self.is(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.accept(TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                iteration,
                body,
            },
            token.area,
        ))
    }

    fn parse_while_loop_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::While)?;
        self.accept(TokenKind::LParen)?;
        let condition = self.parse_expr(true)?;
        self.accept(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::new(StmtKind::While { condition, body }, token.area))
    }

    fn parse_do_while_loop_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::Do)?;
        let body = Box::new(self.parse_stmt()?);
        self.accept(TokenKind::While)?;
        self.accept(TokenKind::LParen)?;
        let condition = self.parse_expr(true)?;
        self.accept(TokenKind::RParen)?;
        self.semi()?;
        Ok(Stmt::new(StmtKind::DoWhile { body, condition }, token.area))
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::If)?;
        self.accept(TokenKind::LParen)?;
        let condition = self.parse_expr(true)?;
        self.accept(TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);

        let else_body = if self.is(TokenKind::Else) {
            self.accept_it()?;
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                body,
                else_body,
            },
            token.area,
        ))
    }

    fn parse_switch_stmt(&mut self) -> ParseResult<Stmt> {
        let token = self.accept(TokenKind::Switch)?;
        self.accept(TokenKind::LParen)?;
        let selector = self.parse_expr(true)?;
        self.accept(TokenKind::RParen)?;

        self.accept(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while self.is(TokenKind::Case) || self.is(TokenKind::Default) {
            cases.push(self.parse_switch_case()?);
        }
        self.accept(TokenKind::RBrace)?;

        Ok(Stmt::new(StmtKind::Switch { selector, cases }, token.area))
    }

    fn parse_switch_case(&mut self) -> ParseResult<SwitchCase> {
        let span = self.current.area;
        let expr = if self.is(TokenKind::Case) {
            self.accept_it()?;
            Some(self.parse_expr(false)?)
        } else {
            self.accept(TokenKind::Default)?;
            None
        };
        self.accept(TokenKind::Colon)?;

        let mut stmts = Vec::new();
        while !self.is(TokenKind::Case)
            && !self.is(TokenKind::Default)
            && !self.is(TokenKind::RBrace)
        {
            if self.is(TokenKind::EndOfStream) {
                return Err(self.unexpected("'}'"));
            }
            let comment = self.take_comment();
            let mut stmt = self.parse_stmt()?;
            stmt.comment = comment;
            stmts.push(stmt);
        }

        Ok(SwitchCase { expr, stmts, span })
    }

    fn parse_expr_stmt(&mut self, init: Option<Expr>) -> ParseResult<Stmt> {
        let span = init
            .as_ref()
            .map(|e| e.span)
            .unwrap_or(self.current.area);
        let expr = self.parse_expr_with_init(true, init)?;
        self.semi()?;
        Ok(Stmt::new(StmtKind::Expr(expr), span))
    }

    /// `struct` at statement level: a declaration, optionally followed by
    /// variables of the struct type.
    fn parse_struct_decl_or_var_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.current.area;
        self.accept(TokenKind::Struct)?;

        let ident = if self.is(TokenKind::Ident) {
            Some(self.accept_it()?)
        } else {
            None
        };
        let struct_decl = self.parse_struct_decl_body(ident)?;

        if !self.is(TokenKind::Semicolon) {
            let denoter = struct_type_denoter(&struct_decl);
            let mut stmt = VarDeclStmt {
                input_modifier: None,
                storage_classes: Vec::new(),
                type_modifiers: Vec::new(),
                var_type: VarType {
                    denoter,
                    struct_decl: Some(struct_decl),
                    span,
                },
                var_decls: Vec::new(),
                span,
            };
            stmt.var_decls = self.parse_var_decl_list(None)?;
            self.semi()?;
            return Ok(Stmt::new(StmtKind::VarDecl(stmt), span));
        }

        self.semi()?;
        Ok(Stmt::new(StmtKind::StructDecl(struct_decl), span))
    }

    /// A statement starting with an identifier: a declaration with an
    /// alias type, an assignment, or a call.
    fn parse_var_decl_or_assign_or_call_stmt(&mut self) -> ParseResult<Stmt> {
        let var_ident = self.parse_var_ident()?;
        let span = var_ident.span;

        if self.is(TokenKind::LParen) {
            // Function call as an expression statement.
            let call = self.parse_function_call_expr(var_ident)?;
            return self.parse_expr_stmt(Some(call));
        }

        if self.is(TokenKind::AssignOp) {
            let access = self.parse_var_access_expr(var_ident)?;
            self.semi()?;
            return Ok(Stmt::new(StmtKind::Expr(access), span));
        }

        if self.is_spell(TokenKind::UnaryOp, "++") || self.is_spell(TokenKind::UnaryOp, "--") {
            let access = Expr::new(
                ExprKind::VarAccess {
                    var_ident,
                    assign_op: None,
                    assign_expr: None,
                },
                span,
            );
            return self.parse_expr_stmt(Some(access));
        }

        if var_ident.next.is_none() && self.is(TokenKind::Ident) {
            // The identifier names a type: a declaration statement with
            // an alias type denoter, possibly with array dimensions.
            let mut denoter = TypeDenoter::Alias(var_ident.ident);
            if !var_ident.array_indices.is_empty() {
                let dims = self.evaluate_array_index_dims(&var_ident.array_indices)?;
                denoter = TypeDenoter::array(denoter, dims);
            }

            let mut stmt = VarDeclStmt {
                input_modifier: None,
                storage_classes: Vec::new(),
                type_modifiers: Vec::new(),
                var_type: VarType::new(denoter, span),
                var_decls: Vec::new(),
                span,
            };
            stmt.var_decls = self.parse_var_decl_list(None)?;
            self.semi()?;
            return Ok(Stmt::new(StmtKind::VarDecl(stmt), span));
        }

        // Anything else is an expression statement starting with this
        // variable access.
        let access = Expr::new(
            ExprKind::VarAccess {
                var_ident,
                assign_op: None,
                assign_expr: None,
            },
            span,
        );
        self.parse_expr_stmt(Some(access))
    }

    /// Folds already-parsed array index expressions into constant array
    /// dimensions for an alias type denoter.
    fn evaluate_array_index_dims(&mut self, indices: &[Expr]) -> ParseResult<Vec<Option<u64>>> {
        let mut dims = Vec::new();
        for index in indices {
            let value = ConstExprEvaluator::new()
                .evaluate(index)
                .map_err(|err| crate::ParseError::syntax(err.message, err.area))?;
            dims.push(Some(value.to_int().max(0) as u64));
        }
        Ok(dims)
    }
}
