//! Declaration AST nodes.

use crate::{Attribute, CodeBlock, Expr, IndexedSemantic, TypeDenoter, VarDeclStmt, VarType};
use std::collections::BTreeMap;
use xshade_common::{ShaderTarget, SourceArea};

/// A single variable declarator.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub ident: String,
    pub array_dims: Vec<Expr>,
    pub semantic: Option<IndexedSemantic>,
    pub pack_offset: Option<PackOffset>,
    pub initializer: Option<Expr>,
    pub span: SourceArea,

    // Decorations
    pub flags: VarDeclFlags,
    /// Name of the enclosing cbuffer/tbuffer, when declared inside one.
    pub buffer_ident: Option<String>,
}

impl VarDecl {
    pub fn new(ident: impl Into<String>, span: SourceArea) -> Self {
        Self {
            ident: ident.into(),
            array_dims: Vec::new(),
            semantic: None,
            pack_offset: None,
            initializer: None,
            span,
            flags: VarDeclFlags::default(),
            buffer_ident: None,
        }
    }
}

/// Analyzer flags on a variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VarDeclFlags {
    pub is_system_value: bool,
    pub is_shader_input: bool,
    pub is_shader_output: bool,
    /// The declaration is subsumed by an interface block; the back-end
    /// must not render it.
    pub disable_codegen: bool,
}

/// `: packoffset(cN.x)`
#[derive(Clone, Debug, PartialEq)]
pub struct PackOffset {
    pub register_name: String,
    pub vector_component: Option<String>,
    pub span: SourceArea,
}

/// `: register([profile,] type slot [(sub)])`
#[derive(Clone, Debug, PartialEq)]
pub struct Register {
    /// Shader profile prefix, e.g. `vs_5_0`.
    pub target: Option<ShaderTarget>,
    pub register_type: RegisterType,
    pub slot: i32,
    pub span: SourceArea,
}

/// The register-bank letter of a slot binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterType {
    /// `b` registers.
    ConstantBuffer,
    /// `t` registers.
    TextureOrBuffer,
    /// `s` registers.
    Sampler,
    /// `u` registers.
    UnorderedAccess,
    /// Legacy D3D9 `c` registers.
    ConstRegister,
}

impl RegisterType {
    pub fn from_char(c: char) -> Option<RegisterType> {
        match c {
            'b' => Some(RegisterType::ConstantBuffer),
            't' => Some(RegisterType::TextureOrBuffer),
            's' => Some(RegisterType::Sampler),
            'u' => Some(RegisterType::UnorderedAccess),
            'c' => Some(RegisterType::ConstRegister),
            _ => None,
        }
    }
}

/// A texture object declarator.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDecl {
    pub ident: String,
    pub array_dims: Vec<Expr>,
    pub registers: Vec<Register>,
    pub span: SourceArea,
}

/// A sampler declarator, optionally with an inline sampler state.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerDecl {
    pub ident: String,
    pub array_dims: Vec<Expr>,
    pub registers: Vec<Register>,
    /// Bound texture from the DX9 `texture = <ident>;` state entry.
    pub texture_ident: Option<String>,
    pub values: Vec<SamplerValue>,
    pub span: SourceArea,
}

/// One `Name = expr;` entry of a sampler state.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerValue {
    pub name: String,
    pub value: Expr,
    pub span: SourceArea,
}

/// A structure declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    /// None for anonymous structs.
    pub ident: Option<String>,
    /// Optional single-inheritance base.
    pub base_name: Option<String>,
    pub members: Vec<VarDeclStmt>,
    /// Declared inside another struct.
    pub is_nested: bool,
    pub span: SourceArea,

    // Decorations
    pub is_shader_input: bool,
    pub is_shader_output: bool,
    /// Variable name this struct is addressed by in the cross-stage
    /// interface block.
    pub alias_name: Option<String>,
    /// System-value semantic name -> member identifier, harvested over
    /// all nesting levels.
    pub system_values: BTreeMap<String, String>,
}

impl StructDecl {
    pub fn new(ident: Option<String>, span: SourceArea) -> Self {
        Self {
            ident,
            base_name: None,
            members: Vec::new(),
            is_nested: false,
            span,
            is_shader_input: false,
            is_shader_output: false,
            alias_name: None,
            system_values: BTreeMap::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.ident.is_none()
    }

    pub fn num_members(&self) -> usize {
        self.members.iter().map(|m| m.var_decls.len()).sum()
    }

    /// Signature for diagnostics context descriptions.
    pub fn signature(&self) -> String {
        match &self.ident {
            Some(ident) => format!("struct '{}'", ident),
            None => "anonymous struct".to_string(),
        }
    }
}

/// A single `typedef` alias.
#[derive(Clone, Debug, PartialEq)]
pub struct AliasDecl {
    pub ident: String,
    pub denoter: TypeDenoter,
    pub span: SourceArea,
}

/// A function declaration or definition.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub attribs: Vec<Attribute>,
    pub return_type: VarType,
    pub ident: String,
    pub params: Vec<VarDeclStmt>,
    pub semantic: Option<IndexedSemantic>,
    /// None for prototypes.
    pub body: Option<CodeBlock>,
    pub span: SourceArea,

    // Decorations
    pub is_entry_point: bool,
    /// Identifiers of flattened entry-point input variables.
    pub input_semantics: Vec<String>,
    /// Identifiers of flattened entry-point output variables.
    pub output_semantics: Vec<String>,
}

impl FunctionDecl {
    /// Signature for diagnostics context descriptions.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| p.var_type.denoter.to_string())
            .collect();
        format!(
            "function '{} {}({})'",
            self.return_type.denoter,
            self.ident,
            params.join(", ")
        )
    }
}
