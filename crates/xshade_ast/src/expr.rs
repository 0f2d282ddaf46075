//! Expression AST nodes.

use crate::{AssignOp, BinaryOp, DataType, Intrinsic, TypeDenoter, UnaryOp, VarIdent};
use xshade_common::SourceArea;

/// An expression with its decoration slots.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceArea,
    /// Computed type, set by the analyzer.
    pub ty: Option<TypeDenoter>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: SourceArea) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }
}

/// The kind of expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Placeholder for omitted expressions (dynamic array dimensions).
    Null,

    /// Comma expression: `first, next`.
    List { first: Box<Expr>, next: Box<Expr> },

    /// A literal, carrying its lexical category and spelling.
    Literal { data_type: DataType, value: String },

    /// A type name used as an expression (cast targets, constructors).
    TypeName(TypeDenoter),

    /// `condition ? then_expr : else_expr`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Prefix unary.
    Unary { op: UnaryOp, expr: Box<Expr> },

    /// Postfix `++` / `--`.
    PostUnary { op: UnaryOp, expr: Box<Expr> },

    Call(FunctionCall),

    /// Parenthesized expression.
    Bracket(Box<Expr>),

    /// Member access after an arbitrary sub-expression: `expr.ident...`.
    Suffix { expr: Box<Expr>, var_ident: VarIdent },

    /// `expr[index]...` on a non-identifier sub-expression.
    ArrayAccess { expr: Box<Expr>, indices: Vec<Expr> },

    /// `(type) expr`
    Cast {
        target: TypeDenoter,
        expr: Box<Expr>,
    },

    /// Variable access, optionally with an assignment.
    VarAccess {
        var_ident: VarIdent,
        assign_op: Option<AssignOp>,
        assign_expr: Option<Box<Expr>>,
    },

    /// `{ expr, ... }`
    Initializer(Vec<Expr>),
}

/// A function or constructor call.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    /// Callee for named calls, including texture-object method chains.
    pub name: Option<VarIdent>,
    /// Type constructor calls, e.g. `float4(...)`.
    pub type_ctor: Option<TypeDenoter>,
    pub args: Vec<Expr>,
    pub span: SourceArea,

    /// Resolved intrinsic, set by the analyzer.
    pub intrinsic: Option<Intrinsic>,
    /// Index into the callee's overload group, set by the analyzer.
    pub resolved_overload: Option<usize>,
    /// The wrapper emitted for this intrinsic may be inlined.
    pub can_inline_wrapper: bool,
}

impl FunctionCall {
    pub fn named(name: VarIdent, args: Vec<Expr>, span: SourceArea) -> Self {
        Self {
            name: Some(name),
            type_ctor: None,
            args,
            span,
            intrinsic: None,
            resolved_overload: None,
            can_inline_wrapper: false,
        }
    }

    pub fn constructor(ty: TypeDenoter, args: Vec<Expr>, span: SourceArea) -> Self {
        Self {
            name: None,
            type_ctor: Some(ty),
            args,
            span,
            intrinsic: None,
            resolved_overload: None,
            can_inline_wrapper: false,
        }
    }
}
