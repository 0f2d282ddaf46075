//! Statement AST nodes.

use crate::{
    AliasDecl, Attribute, CodeBlock, CtrlTransfer, DataType, Expr, SamplerDecl, StructDecl,
    SwitchCase, TextureDecl, TextureType, UniformBufferType, VarDecl, VarType,
};
use std::fmt;
use xshade_common::SourceArea;

/// A statement with its optional leading comment and attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceArea,
    /// Commentary directly preceding the statement, for doc propagation.
    pub comment: Option<String>,
    pub attribs: Vec<Attribute>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: SourceArea) -> Self {
        Self {
            kind,
            span,
            comment: None,
            attribs: Vec::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, StmtKind::Null)
    }
}

/// The kind of statement.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Null,
    CodeBlock(CodeBlock),
    VarDecl(VarDeclStmt),
    BufferDecl(BufferDeclStmt),
    TextureDecl(TextureDeclStmt),
    SamplerDecl(SamplerDeclStmt),
    StructDecl(StructDecl),
    AliasDecl(AliasDeclStmt),
    FunctionDecl(crate::FunctionDecl),
    For {
        init: Box<Stmt>,
        condition: Option<Expr>,
        iteration: Option<Expr>,
        body: Box<Stmt>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    If {
        condition: Expr,
        body: Box<Stmt>,
        else_body: Option<Box<Stmt>>,
    },
    Switch {
        selector: Expr,
        cases: Vec<SwitchCase>,
    },
    Expr(Expr),
    Return {
        expr: Option<Expr>,
        /// Marked by end-of-scope analysis when this is the terminal
        /// statement of a function body.
        is_end_of_function: bool,
    },
    CtrlTransfer(CtrlTransfer),
}

/// `in`, `out`, `inout`, `uniform`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputModifier {
    In,
    Out,
    InOut,
    Uniform,
}

impl InputModifier {
    pub fn from_spelling(spell: &str) -> Option<InputModifier> {
        match spell {
            "in" => Some(InputModifier::In),
            "out" => Some(InputModifier::Out),
            "inout" => Some(InputModifier::InOut),
            "uniform" => Some(InputModifier::Uniform),
            _ => None,
        }
    }
}

/// HLSL storage classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageClass {
    Extern,
    NoInterpolation,
    Precise,
    Shared,
    GroupShared,
    Static,
    Volatile,
    Linear,
    Centroid,
    NoPerspective,
    Sample,
}

impl StorageClass {
    pub fn from_spelling(spell: &str) -> Option<StorageClass> {
        Some(match spell {
            "extern" => StorageClass::Extern,
            "nointerpolation" => StorageClass::NoInterpolation,
            "precise" => StorageClass::Precise,
            "shared" => StorageClass::Shared,
            "groupshared" => StorageClass::GroupShared,
            "static" => StorageClass::Static,
            "volatile" => StorageClass::Volatile,
            "linear" => StorageClass::Linear,
            "centroid" => StorageClass::Centroid,
            "noperspective" => StorageClass::NoPerspective,
            "sample" => StorageClass::Sample,
            _ => return None,
        })
    }
}

/// `const`, `row_major`, `column_major`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeModifier {
    Const,
    RowMajor,
    ColumnMajor,
}

impl TypeModifier {
    pub fn from_spelling(spell: &str) -> Option<TypeModifier> {
        match spell {
            "const" => Some(TypeModifier::Const),
            "row_major" => Some(TypeModifier::RowMajor),
            "column_major" => Some(TypeModifier::ColumnMajor),
            _ => None,
        }
    }
}

/// A variable declaration statement: modifiers, type, declarator list.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclStmt {
    pub input_modifier: Option<InputModifier>,
    pub storage_classes: Vec<StorageClass>,
    pub type_modifiers: Vec<TypeModifier>,
    pub var_type: VarType,
    pub var_decls: Vec<VarDecl>,
    pub span: SourceArea,
}

impl VarDeclStmt {
    /// An entry-point parameter is an input unless declared `out`.
    pub fn is_input(&self) -> bool {
        !matches!(self.input_modifier, Some(InputModifier::Out))
    }

    /// An entry-point parameter is an output when declared `out`/`inout`.
    pub fn is_output(&self) -> bool {
        matches!(
            self.input_modifier,
            Some(InputModifier::Out) | Some(InputModifier::InOut)
        )
    }
}

/// A `cbuffer`/`tbuffer` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferDeclStmt {
    pub buffer_type: UniformBufferType,
    pub ident: String,
    pub registers: Vec<crate::Register>,
    pub members: Vec<VarDeclStmt>,
    pub span: SourceArea,
}

impl fmt::Display for BufferDeclStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.buffer_type.as_str(), self.ident)
    }
}

/// A texture declaration statement, possibly with template arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDeclStmt {
    pub texture_type: TextureType,
    /// Generic color type from `Texture2D<float4>`.
    pub color_type: Option<DataType>,
    /// Sample count from `Texture2DMS<float4, N>`.
    pub num_samples: Option<u32>,
    pub decls: Vec<TextureDecl>,
    pub span: SourceArea,
}

/// A sampler declaration statement.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerDeclStmt {
    /// The sampler type keyword as written (`sampler2D`, `SamplerState`, ...).
    pub sampler_type: String,
    pub decls: Vec<SamplerDecl>,
    pub span: SourceArea,
}

/// A `typedef` statement; the declared type may be an inline struct.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasDeclStmt {
    pub struct_decl: Option<StructDecl>,
    pub aliases: Vec<AliasDecl>,
    pub span: SourceArea,
}
