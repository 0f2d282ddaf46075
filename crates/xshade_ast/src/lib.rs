//! Abstract syntax tree for HLSL translation units.
//!
//! Nodes are created by the parser, decorated in place by the analyzer,
//! and consumed by the GLSL emitter. Decoration slots are `Option` fields
//! and plain flags; strong ownership runs parent to child, and every
//! cross-reference is an identifier resolved through the analyzer's
//! symbol table.

mod decl;
mod eval;
mod expr;
mod intrinsic;
mod op;
mod semantic;
mod stmt;
mod ty;
mod variant;

pub use decl::*;
pub use eval::*;
pub use expr::*;
pub use intrinsic::*;
pub use op::*;
pub use semantic::*;
pub use stmt::*;
pub use ty::*;
pub use variant::*;

use xshade_common::SourceArea;

/// The root of a translation unit.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub global_stmts: Vec<Stmt>,
    /// Identifier of the entry-point function, set by the analyzer.
    pub entry_point: Option<String>,
    /// Set when the fragment stage reads a position semantic, so the
    /// back-end can substitute `gl_FragCoord`.
    pub frag_coord_used: bool,
    /// Set for pre-SM4 fragment inputs; `VPOS` and `SV_Position` address
    /// slightly different screen spaces.
    pub sm3_screen_space: bool,
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeBlock {
    pub stmts: Vec<Stmt>,
    pub span: SourceArea,
}

/// A `[attribute(args)]` annotation on a statement or function.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub ident: String,
    pub args: Vec<Expr>,
    pub span: SourceArea,
}

/// One `case expr:` (or `default:` when `expr` is None) of a switch.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub expr: Option<Expr>,
    pub stmts: Vec<Stmt>,
    pub span: SourceArea,
}

/// A possibly dotted variable identifier: `ident[expr]*.next`.
#[derive(Clone, Debug, PartialEq)]
pub struct VarIdent {
    pub ident: String,
    pub array_indices: Vec<Expr>,
    pub next: Option<Box<VarIdent>>,
    pub span: SourceArea,
    /// Resolved symbol, set by the analyzer.
    pub symbol: Option<SymbolRef>,
}

impl VarIdent {
    pub fn new(ident: impl Into<String>, span: SourceArea) -> Self {
        Self {
            ident: ident.into(),
            array_indices: Vec::new(),
            next: None,
            span,
            symbol: None,
        }
    }

    /// The last identifier in the chain.
    pub fn last(&self) -> &VarIdent {
        match &self.next {
            Some(next) => next.last(),
            None => self,
        }
    }

    /// The full dotted spelling, for diagnostics.
    pub fn full_name(&self) -> String {
        match &self.next {
            Some(next) => format!("{}.{}", self.ident, next.full_name()),
            None => self.ident.clone(),
        }
    }
}

/// The resolved symbol a [`VarIdent`] refers to.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolRef {
    pub kind: SymbolKind,
    /// The symbol's type, when it has one.
    pub ty: Option<TypeDenoter>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Texture,
    Sampler,
    Struct,
    Alias,
    Function,
}

/// Either a plain type denoter or an inline struct declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct VarType {
    pub denoter: TypeDenoter,
    pub struct_decl: Option<StructDecl>,
    pub span: SourceArea,
}

impl VarType {
    pub fn new(denoter: TypeDenoter, span: SourceArea) -> Self {
        Self {
            denoter,
            struct_decl: None,
            span,
        }
    }
}
