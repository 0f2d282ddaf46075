//! Expression productions.

use crate::{ParseResult, Parser, ParsingState};
use xshade_ast::*;
use xshade_lexer::TokenKind;

impl<'src, 'r, 'log> Parser<'src, 'r, 'log> {
    /// Parses an expression. `allow_comma` enables the list expression.
    pub(crate) fn parse_expr(&mut self, allow_comma: bool) -> ParseResult<Expr> {
        self.parse_expr_with_init(allow_comma, None)
    }

    pub(crate) fn parse_expr_with_init(
        &mut self,
        allow_comma: bool,
        init: Option<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = self.parse_ternary_expr(init)?;

        // Post-unary '++' / '--'.
        while self.is_spell(TokenKind::UnaryOp, "++") || self.is_spell(TokenKind::UnaryOp, "--") {
            let token = self.accept_it()?;
            let op = UnaryOp::from_spelling(&token.spell).unwrap();
            let span = expr.span;
            expr = Expr::new(
                ExprKind::PostUnary {
                    op,
                    expr: Box::new(expr),
                },
                span,
            );
        }

        if allow_comma && self.is(TokenKind::Comma) {
            self.accept_it()?;
            let next = self.parse_expr(true)?;
            let span = expr.span;
            expr = Expr::new(
                ExprKind::List {
                    first: Box::new(expr),
                    next: Box::new(next),
                },
                span,
            );
        }

        Ok(expr)
    }

    fn parse_generic_expr(&mut self) -> ParseResult<Expr> {
        self.parse_ternary_expr(None)
    }

    fn parse_ternary_expr(&mut self, init: Option<Expr>) -> ParseResult<Expr> {
        let condition = self.parse_binary_expr(0, init)?;
        if !self.is(TokenKind::TernaryOp) {
            return Ok(condition);
        }
        self.accept_it()?;
        let then_expr = self.parse_generic_expr()?;
        self.accept(TokenKind::Colon)?;
        let else_expr = self.parse_generic_expr()?;
        let span = condition.span;
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    fn parse_binary_expr(&mut self, min_prec: u8, init: Option<Expr>) -> ParseResult<Expr> {
        let mut lhs = match init {
            Some(expr) => expr,
            None => self.parse_primary_expr()?,
        };

        loop {
            if !self.is(TokenKind::BinaryOp) {
                break;
            }
            // Inside template arguments '<' and '>' are brackets, not
            // relational operators.
            if self.active_template()
                && (self.current.spell == "<" || self.current.spell == ">")
            {
                break;
            }
            let Some(op) = BinaryOp::from_spelling(&self.current.spell) else {
                break;
            };
            if op.precedence() < min_prec {
                break;
            }
            self.accept_it()?;
            let rhs = self.parse_binary_expr(op.precedence() + 1, None)?;
            let span = lhs.span;
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(lhs)
    }

    pub(crate) fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        if self.is_literal() {
            return self.parse_literal_or_suffix_expr();
        }
        if self.is_data_type() || self.is(TokenKind::Struct) {
            return self.parse_type_name_or_function_call_expr();
        }
        if self.is(TokenKind::UnaryOp) || self.is_arithmetic_unary() {
            return self.parse_unary_expr();
        }
        if self.is(TokenKind::LParen) {
            return self.parse_bracket_or_cast_expr();
        }
        if self.is(TokenKind::LBrace) {
            return self.parse_initializer_expr();
        }
        if self.is(TokenKind::Ident) {
            return self.parse_var_access_or_function_call_expr();
        }
        Err(self.unexpected("primary expression"))
    }

    /// Returns true if the current token can start a primary expression;
    /// used to commit to the cast interpretation of `(ident)`.
    fn starts_primary_expr(&self) -> bool {
        self.is_literal()
            || self.is_data_type()
            || self.is(TokenKind::Struct)
            || self.is(TokenKind::UnaryOp)
            || self.is_arithmetic_unary()
            || self.is(TokenKind::LParen)
            || self.is(TokenKind::LBrace)
            || self.is(TokenKind::Ident)
    }

    fn parse_literal_or_suffix_expr(&mut self) -> ParseResult<Expr> {
        let token = self.accept_it()?;
        let data_type = match token.kind {
            TokenKind::BoolLiteral => DataType::Scalar(ScalarType::Bool),
            TokenKind::IntLiteral => DataType::Scalar(ScalarType::Int),
            TokenKind::FloatLiteral => DataType::Scalar(ScalarType::Float),
            _ => DataType::String,
        };
        let mut expr = Expr::new(
            ExprKind::Literal {
                data_type,
                value: token.spell,
            },
            token.area,
        );

        if self.is(TokenKind::Dot) {
            expr = self.parse_suffix_expr(expr)?;
        }
        Ok(expr)
    }

    /// A data-type keyword either names a type (cast target) or starts a
    /// constructor call like `float4(...)`.
    fn parse_type_name_or_function_call_expr(&mut self) -> ParseResult<Expr> {
        let span = self.current.area;
        let denoter = self.parse_type_denoter(false)?;

        if self.is(TokenKind::LParen) {
            let args = self.parse_argument_list()?;
            let call = FunctionCall::constructor(denoter, args, span);
            let expr = Expr::new(ExprKind::Call(call), span);
            return self.parse_postfix_expr(expr);
        }

        Ok(Expr::new(ExprKind::TypeName(denoter), span))
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        let token = self.accept_it()?;
        let op = UnaryOp::from_spelling(&token.spell)
            .expect("token classified as unary operator");
        let expr = self.parse_primary_expr()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            token.area,
        ))
    }

    /// Parses `( ... )` as either a cast or a bracket expression. The
    /// decision needs the type-name table because HLSL casts are not
    /// context free.
    fn parse_bracket_or_cast_expr(&mut self) -> ParseResult<Expr> {
        let open = self.accept(TokenKind::LParen)?;

        // Inside brackets '<' and '>' revert to relational operators,
        // even while a template is being parsed.
        let inner = if self.active_template() {
            self.push_state(ParsingState {
                active_template: false,
            });
            let inner = self.parse_expr(true);
            self.pop_state();
            inner?
        } else {
            self.parse_expr(true)?
        };

        self.accept(TokenKind::RParen)?;

        if let Some(target) = self.cast_target_of(&inner) {
            // A type name in brackets followed by a primary expression is
            // a cast.
            let operand = self.parse_primary_expr()?;
            return Ok(Expr::new(
                ExprKind::Cast {
                    target,
                    expr: Box::new(operand),
                },
                open.area,
            ));
        }

        let expr = Expr::new(ExprKind::Bracket(Box::new(inner)), open.area);
        self.parse_postfix_expr(expr)
    }

    /// Decides whether a parenthesized expression is the left-hand side
    /// of a cast: type-name expressions always are; a bare identifier is
    /// when the type-name table knows it and a primary expression
    /// follows.
    fn cast_target_of(&self, inner: &Expr) -> Option<TypeDenoter> {
        match &inner.kind {
            ExprKind::TypeName(denoter) => Some(denoter.clone()),
            ExprKind::VarAccess {
                var_ident,
                assign_op: None,
                assign_expr: None,
            } if var_ident.next.is_none()
                && var_ident.array_indices.is_empty()
                && self.is_registered_type_name(&var_ident.ident)
                && self.starts_primary_expr() =>
            {
                Some(TypeDenoter::Alias(var_ident.ident.clone()))
            }
            _ => None,
        }
    }

    /// Optional array access and member suffix after a postfix-capable
    /// expression.
    fn parse_postfix_expr(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        if self.is(TokenKind::LBracket) {
            let indices = self.parse_array_dimension_list(false)?;
            let span = expr.span;
            expr = Expr::new(
                ExprKind::ArrayAccess {
                    expr: Box::new(expr),
                    indices,
                },
                span,
            );
        }
        if self.is(TokenKind::Dot) {
            expr = self.parse_suffix_expr(expr)?;
        }
        Ok(expr)
    }

    fn parse_suffix_expr(&mut self, expr: Expr) -> ParseResult<Expr> {
        self.accept(TokenKind::Dot)?;
        let var_ident = self.parse_var_ident()?;
        let span = expr.span;
        Ok(Expr::new(
            ExprKind::Suffix {
                expr: Box::new(expr),
                var_ident,
            },
            span,
        ))
    }

    fn parse_initializer_expr(&mut self) -> ParseResult<Expr> {
        let open = self.accept(TokenKind::LBrace)?;
        let mut exprs = Vec::new();
        if !self.is(TokenKind::RBrace) {
            loop {
                exprs.push(self.parse_expr(false)?);
                if self.is(TokenKind::Comma) {
                    self.accept_it()?;
                    // Trailing comma before the closing brace is legal.
                    if self.is(TokenKind::RBrace) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.accept(TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Initializer(exprs), open.area))
    }

    pub(crate) fn parse_var_access_or_function_call_expr(&mut self) -> ParseResult<Expr> {
        let var_ident = self.parse_var_ident()?;
        if self.is(TokenKind::LParen) {
            return self.parse_function_call_expr(var_ident);
        }
        self.parse_var_access_expr(var_ident)
    }

    pub(crate) fn parse_var_access_expr(&mut self, var_ident: VarIdent) -> ParseResult<Expr> {
        let span = var_ident.span;
        let mut assign_op = None;
        let mut assign_expr = None;

        if self.is(TokenKind::AssignOp) {
            let token = self.accept_it()?;
            assign_op = AssignOp::from_spelling(&token.spell);
            assign_expr = Some(Box::new(self.parse_expr(false)?));
        }

        Ok(Expr::new(
            ExprKind::VarAccess {
                var_ident,
                assign_op,
                assign_expr,
            },
            span,
        ))
    }

    pub(crate) fn parse_function_call_expr(&mut self, var_ident: VarIdent) -> ParseResult<Expr> {
        let span = var_ident.span;
        let args = self.parse_argument_list()?;
        let call = FunctionCall::named(var_ident, args, span);
        let expr = Expr::new(ExprKind::Call(call), span);
        self.parse_postfix_expr(expr)
    }

    pub(crate) fn parse_argument_list(&mut self) -> ParseResult<Vec<Expr>> {
        self.accept(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.is(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr(false)?);
                if self.is(TokenKind::Comma) {
                    self.accept_it()?;
                } else {
                    break;
                }
            }
        }
        self.accept(TokenKind::RParen)?;
        Ok(args)
    }

    /// `ident ('[' expr ']')* ('.' var_ident)?`
    pub(crate) fn parse_var_ident(&mut self) -> ParseResult<VarIdent> {
        let ident = self.accept(TokenKind::Ident)?;
        let mut var_ident = VarIdent::new(ident.spell, ident.area);
        var_ident.array_indices = self.parse_array_dimension_list(false)?;

        if self.is(TokenKind::Dot) {
            self.accept_it()?;
            var_ident.next = Some(Box::new(self.parse_var_ident()?));
        }

        Ok(var_ident)
    }
}
