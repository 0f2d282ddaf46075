//! Constant-expression evaluation.
//!
//! A pure fold over an expression subtree. Variable accesses are only
//! legal through the supplied callback; function calls, initializer
//! lists, type names, and dynamic array dimensions are rejected. The
//! evaluator never consults a symbol table.

use crate::{
    BinaryOp, DataType, Expr, ExprKind, ScalarType, TypeDenoter, UnaryOp, VarIdent, Variant,
};
use thiserror::Error;
use xshade_common::SourceArea;

/// An evaluation failure, carrying the offending area.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
    pub area: SourceArea,
}

impl EvalError {
    fn new(message: impl Into<String>, area: SourceArea) -> Self {
        Self {
            message: message.into(),
            area,
        }
    }

    fn illegal(what: &str, area: SourceArea) -> Self {
        Self::new(format!("illegal {} in constant expression", what), area)
    }
}

/// Callback resolving a variable access to a constant, or None when the
/// variable is not a constant.
pub type OnVarAccess<'a> = dyn FnMut(&VarIdent) -> Option<Variant> + 'a;

/// Evaluates constant expressions.
pub struct ConstExprEvaluator<'a> {
    on_var_access: Option<&'a mut OnVarAccess<'a>>,
}

impl<'a> Default for ConstExprEvaluator<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ConstExprEvaluator<'a> {
    /// An evaluator that rejects all variable accesses.
    pub fn new() -> Self {
        Self {
            on_var_access: None,
        }
    }

    /// An evaluator that resolves variable accesses with `callback`.
    pub fn with_var_access(callback: &'a mut OnVarAccess<'a>) -> Self {
        Self {
            on_var_access: Some(callback),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Variant, EvalError> {
        let area = expr.span;
        match &expr.kind {
            ExprKind::Null => Err(EvalError::illegal("dynamic array dimension", area)),

            // Only the first sub-expression counts when a list is used as
            // a condition.
            ExprKind::List { first, .. } => self.evaluate(first),

            ExprKind::Literal { data_type, value } => {
                Variant::parse_literal(*data_type, value)
                    .map_err(|e| EvalError::new(e.to_string(), area))
            }

            ExprKind::TypeName(_) => Err(EvalError::illegal("type specifier", area)),

            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.evaluate(condition)?.to_bool() {
                    self.evaluate(then_expr)
                } else {
                    self.evaluate(else_expr)
                }
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                self.apply_binary(*op, lhs, rhs, area)
            }

            ExprKind::Unary { op, expr } => {
                let value = self.evaluate(expr)?;
                match op {
                    UnaryOp::LogicalNot => Ok(Variant::Bool(!value.to_bool())),
                    UnaryOp::Not => value.bit_not().map_err(|e| EvalError::new(e.to_string(), area)),
                    UnaryOp::Nop => Ok(value),
                    UnaryOp::Negate => Ok(value.negate()),
                    UnaryOp::Inc => value
                        .add(Variant::Int(1))
                        .map_err(|e| EvalError::new(e.to_string(), area)),
                    UnaryOp::Dec => value
                        .sub(Variant::Int(1))
                        .map_err(|e| EvalError::new(e.to_string(), area)),
                }
            }

            // Post inc/dec yield the value before the operation.
            ExprKind::PostUnary { op, expr } => match op {
                UnaryOp::Inc | UnaryOp::Dec => self.evaluate(expr),
                _ => Err(EvalError::illegal("unary operator", area)),
            },

            ExprKind::Call(_) => Err(EvalError::illegal("function call", area)),

            ExprKind::Bracket(inner) => self.evaluate(inner),

            ExprKind::Suffix { .. } => Err(EvalError::illegal("member access", area)),

            ExprKind::ArrayAccess { .. } => Err(EvalError::illegal("array access", area)),

            ExprKind::Cast { target, expr } => {
                let value = self.evaluate(expr)?;
                Ok(convert_to(target, value))
            }

            ExprKind::VarAccess {
                var_ident,
                assign_op,
                ..
            } => {
                if assign_op.is_some() {
                    return Err(EvalError::illegal("assignment", area));
                }
                match &mut self.on_var_access {
                    Some(callback) => callback(var_ident).ok_or_else(|| {
                        EvalError::new("expected constant expression", var_ident.span)
                    }),
                    None => Err(EvalError::new("expected constant expression", var_ident.span)),
                }
            }

            ExprKind::Initializer(_) => Err(EvalError::illegal("initializer list", area)),
        }
    }

    fn apply_binary(
        &self,
        op: BinaryOp,
        lhs: Variant,
        rhs: Variant,
        area: SourceArea,
    ) -> Result<Variant, EvalError> {
        use std::cmp::Ordering;
        let wrap = |r: Result<Variant, crate::VariantError>| {
            r.map_err(|e| EvalError::new(e.to_string(), area))
        };
        match op {
            BinaryOp::LogicalAnd => Ok(Variant::Bool(lhs.to_bool() && rhs.to_bool())),
            BinaryOp::LogicalOr => Ok(Variant::Bool(lhs.to_bool() || rhs.to_bool())),
            BinaryOp::Or => wrap(lhs.bit_or(rhs)),
            BinaryOp::Xor => wrap(lhs.bit_xor(rhs)),
            BinaryOp::And => wrap(lhs.bit_and(rhs)),
            BinaryOp::LShift => wrap(lhs.shl(rhs)),
            BinaryOp::RShift => wrap(lhs.shr(rhs)),
            BinaryOp::Add => wrap(lhs.add(rhs)),
            BinaryOp::Sub => wrap(lhs.sub(rhs)),
            BinaryOp::Mul => wrap(lhs.mul(rhs)),
            BinaryOp::Div => wrap(lhs.div(rhs)),
            BinaryOp::Mod => wrap(lhs.rem(rhs)),
            BinaryOp::Equal => Ok(Variant::Bool(lhs.equals(rhs))),
            BinaryOp::NotEqual => Ok(Variant::Bool(!lhs.equals(rhs))),
            BinaryOp::Less => Ok(Variant::Bool(lhs.compare(rhs) == Ordering::Less)),
            BinaryOp::Greater => Ok(Variant::Bool(lhs.compare(rhs) == Ordering::Greater)),
            BinaryOp::LessEqual => Ok(Variant::Bool(lhs.compare(rhs) != Ordering::Greater)),
            BinaryOp::GreaterEqual => Ok(Variant::Bool(lhs.compare(rhs) != Ordering::Less)),
        }
    }
}

/// Scalar conversion applied by cast expressions.
fn convert_to(target: &TypeDenoter, value: Variant) -> Variant {
    if let TypeDenoter::Base(DataType::Scalar(scalar)) = target {
        match scalar {
            ScalarType::Bool => Variant::Bool(value.to_bool()),
            ScalarType::Int | ScalarType::UInt => Variant::Int(value.to_int()),
            _ => Variant::Real(value.to_real()),
        }
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_common::SourcePosition;

    fn area() -> SourceArea {
        SourceArea::new(SourcePosition::new(1, 1), 1)
    }

    fn int(value: i64) -> Expr {
        Expr::new(
            ExprKind::Literal {
                data_type: DataType::Scalar(ScalarType::Int),
                value: value.to_string(),
            },
            area(),
        )
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            area(),
        )
    }

    #[test]
    fn shift_and_compare() {
        // (1 << 3) > 4
        let expr = binary(
            BinaryOp::Greater,
            Expr::new(
                ExprKind::Bracket(Box::new(binary(BinaryOp::LShift, int(1), int(3)))),
                area(),
            ),
            int(4),
        );
        let result = ConstExprEvaluator::new().evaluate(&expr).unwrap();
        assert_eq!(result, Variant::Bool(true));
    }

    #[test]
    fn evaluation_is_pure() {
        let expr = binary(BinaryOp::Mul, int(6), int(7));
        let mut evaluator = ConstExprEvaluator::new();
        let first = evaluator.evaluate(&expr).unwrap();
        let second = evaluator.evaluate(&expr).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Variant::Int(42));
    }

    #[test]
    fn var_access_without_callback_is_an_error() {
        let expr = Expr::new(
            ExprKind::VarAccess {
                var_ident: VarIdent::new("x", area()),
                assign_op: None,
                assign_expr: None,
            },
            area(),
        );
        let err = ConstExprEvaluator::new().evaluate(&expr).unwrap_err();
        assert_eq!(err.message, "expected constant expression");
    }

    #[test]
    fn var_access_with_callback() {
        let expr = Expr::new(
            ExprKind::VarAccess {
                var_ident: VarIdent::new("x", area()),
                assign_op: None,
                assign_expr: None,
            },
            area(),
        );
        let mut lookup = |ident: &VarIdent| {
            if ident.ident == "x" {
                Some(Variant::Int(5))
            } else {
                None
            }
        };
        let mut evaluator = ConstExprEvaluator::with_var_access(&mut lookup);
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Variant::Int(5));
    }

    #[test]
    fn function_call_is_illegal() {
        let expr = Expr::new(
            ExprKind::Call(crate::FunctionCall::named(
                VarIdent::new("f", area()),
                vec![],
                area(),
            )),
            area(),
        );
        let err = ConstExprEvaluator::new().evaluate(&expr).unwrap_err();
        assert!(err.message.contains("function call"));
    }
}
