//! Parsing of integer-constant expressions in `#if`/`#elif` directives.
//!
//! The condition grammar is the expression subset of HLSL without calls,
//! member access, and assignment. The parsed tree is handed to the shared
//! constant-expression evaluator so directives and the analyzer agree on
//! operator semantics.

use crate::{PreprocessError, PreprocessResult};
use xshade_ast::{BinaryOp, ConstExprEvaluator, DataType, Expr, ExprKind, ScalarType, UnaryOp};
use xshade_lexer::{Token, TokenKind};

/// Parses and evaluates a directive condition. Identifiers that survive
/// macro expansion evaluate to 0, like in C.
pub fn evaluate_condition(tokens: &[Token], directive: &str) -> PreprocessResult<bool> {
    let pos = tokens
        .first()
        .map(|t| t.pos())
        .unwrap_or_default();
    let mut parser = ConditionParser {
        tokens: tokens.iter().filter(|t| !t.is_trivia()).collect(),
        index: 0,
        directive,
    };
    let expr = parser.parse_expr()?;
    if !parser.at_end() {
        return Err(parser.error());
    }
    let mut zero_idents = |_: &xshade_ast::VarIdent| Some(xshade_ast::Variant::Int(0));
    let mut evaluator = ConstExprEvaluator::with_var_access(&mut zero_idents);
    match evaluator.evaluate(&expr) {
        Ok(value) => Ok(value.to_bool()),
        Err(err) => Err(PreprocessError::InvalidCondition {
            message: err.message,
            pos,
        }),
    }
}

struct ConditionParser<'a> {
    tokens: Vec<&'a Token>,
    index: usize,
    directive: &'a str,
}

impl<'a> ConditionParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index).copied()
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn error(&self) -> PreprocessError {
        PreprocessError::MalformedDirective {
            directive: self.directive.to_string(),
            pos: self
                .peek()
                .map(|t| t.pos())
                .or_else(|| self.tokens.last().map(|t| t.pos()))
                .unwrap_or_default(),
        }
    }

    fn parse_expr(&mut self) -> PreprocessResult<Expr> {
        let condition = self.parse_binary(0)?;
        if self.peek().is_some_and(|t| t.kind == TokenKind::TernaryOp) {
            self.advance();
            let then_expr = self.parse_expr()?;
            let colon = self.advance().ok_or_else(|| self.error())?;
            if colon.kind != TokenKind::Colon {
                return Err(self.error());
            }
            let else_expr = self.parse_expr()?;
            let span = condition.span;
            return Ok(Expr::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                },
                span,
            ));
        }
        Ok(condition)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PreprocessResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::BinaryOp {
                break;
            }
            let Some(op) = BinaryOp::from_spelling(&token.spell) else {
                break;
            };
            if op.precedence() < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(op.precedence() + 1)?;
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

    fn parse_unary(&mut self) -> PreprocessResult<Expr> {
        let token = self.peek().ok_or_else(|| self.error())?;
        let unary_spell = match token.kind {
            TokenKind::UnaryOp => Some(token.spell.as_str()),
            TokenKind::BinaryOp if token.spell == "+" || token.spell == "-" => {
                Some(token.spell.as_str())
            }
            _ => None,
        };
        if let Some(spell) = unary_spell {
            let op = UnaryOp::from_spelling(spell).ok_or_else(|| self.error())?;
            let span = token.area;
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PreprocessResult<Expr> {
        let token = self.advance().ok_or_else(|| self.error())?;
        match token.kind {
            TokenKind::IntLiteral => Ok(Expr::new(
                ExprKind::Literal {
                    data_type: DataType::Scalar(ScalarType::Int),
                    value: token.spell.clone(),
                },
                token.area,
            )),
            TokenKind::BoolLiteral => Ok(Expr::new(
                ExprKind::Literal {
                    data_type: DataType::Scalar(ScalarType::Bool),
                    value: token.spell.clone(),
                },
                token.area,
            )),
            // Surviving identifiers evaluate to 0 via the callback.
            TokenKind::Ident => Ok(Expr::new(
                ExprKind::VarAccess {
                    var_ident: xshade_ast::VarIdent::new(token.spell.clone(), token.area),
                    assign_op: None,
                    assign_expr: None,
                },
                token.area,
            )),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                let close = self.advance().ok_or_else(|| self.error())?;
                if close.kind != TokenKind::RParen {
                    return Err(self.error());
                }
                Ok(Expr::new(ExprKind::Bracket(Box::new(inner)), token.area))
            }
            _ => Err(self.error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_lexer::Scanner;

    fn tokens(source: &str) -> Vec<Token> {
        Scanner::new(source, "cond")
            .tokenize()
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::EndOfStream)
            .collect()
    }

    #[test]
    fn shift_condition() {
        assert!(evaluate_condition(&tokens("(1<<3) > 4"), "if").unwrap());
        assert!(!evaluate_condition(&tokens("(1<<3) > 40"), "if").unwrap());
    }

    #[test]
    fn undefined_identifiers_are_zero() {
        assert!(!evaluate_condition(&tokens("UNDEFINED_MACRO"), "if").unwrap());
        assert!(evaluate_condition(&tokens("!UNDEFINED_MACRO"), "if").unwrap());
    }

    #[test]
    fn ternary_condition() {
        assert!(evaluate_condition(&tokens("1 ? 2 : 0"), "if").unwrap());
        assert!(!evaluate_condition(&tokens("0 ? 2 : 0"), "if").unwrap());
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        assert!(evaluate_condition(&tokens("1 1"), "if").is_err());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(evaluate_condition(&tokens("1 / 0"), "if").is_err());
    }
}
