//! Keyword classification tables.

use crate::TokenKind;

/// Returns the keyword class for an identifier, or None if it is a plain
/// identifier.
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "true" | "false" => TokenKind::BoolLiteral,

        "string" => TokenKind::StringType,

        "vector" => TokenKind::Vector,
        "matrix" => TokenKind::Matrix,
        "void" => TokenKind::Void,

        "sampler" | "sampler1D" | "sampler2D" | "sampler3D" | "samplerCUBE" => TokenKind::Sampler,
        "sampler_state" | "SamplerState" | "SamplerComparisonState" => TokenKind::SamplerState,

        "texture" | "Texture1D" | "Texture1DArray" | "Texture2D" | "Texture2DArray"
        | "Texture3D" | "TextureCube" | "TextureCubeArray" | "Texture2DMS"
        | "Texture2DMSArray" | "RWTexture1D" | "RWTexture1DArray" | "RWTexture2D"
        | "RWTexture2DArray" | "RWTexture3D" => TokenKind::Texture,

        "Buffer" | "ByteAddressBuffer" | "StructuredBuffer" | "AppendStructuredBuffer"
        | "ConsumeStructuredBuffer" | "RWBuffer" | "RWByteAddressBuffer"
        | "RWStructuredBuffer" => TokenKind::StorageBuffer,

        "cbuffer" | "tbuffer" => TokenKind::UniformBuffer,

        "do" => TokenKind::Do,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "typedef" => TokenKind::Typedef,
        "struct" => TokenKind::Struct,
        "register" => TokenKind::Register,
        "packoffset" => TokenKind::PackOffset,
        "return" => TokenKind::Return,
        "inline" => TokenKind::Inline,

        "break" | "continue" | "discard" => TokenKind::CtrlTransfer,

        "in" | "out" | "inout" | "uniform" => TokenKind::InputModifier,

        "extern" | "nointerpolation" | "precise" | "shared" | "groupshared" | "static"
        | "volatile" | "linear" | "centroid" | "noperspective" | "sample" => {
            TokenKind::StorageClass
        }

        "const" | "row_major" | "column_major" => TokenKind::TypeModifier,

        "technique" => TokenKind::Technique,
        "pass" => TokenKind::Pass,
        "compile" => TokenKind::Compile,

        _ => return scalar_shaped_kind(ident),
    };
    Some(kind)
}

/// Classifies `float`, `float3`, `float4x4` and friends.
fn scalar_shaped_kind(ident: &str) -> Option<TokenKind> {
    let suffix = strip_scalar_prefix(ident)?;
    let mut chars = suffix.chars();
    match (chars.next(), chars.next(), chars.next(), chars.next()) {
        (None, ..) => Some(TokenKind::ScalarType),
        (Some(n), None, ..) if is_dim(n) => Some(TokenKind::VectorType),
        (Some(m), Some('x'), Some(n), None) if is_dim(m) && is_dim(n) => {
            Some(TokenKind::MatrixType)
        }
        _ => None,
    }
}

/// Strips a scalar-type name prefix, returning the remaining suffix.
pub fn strip_scalar_prefix(ident: &str) -> Option<&str> {
    for name in ["bool", "int", "uint", "dword", "half", "float", "double"] {
        if let Some(rest) = ident.strip_prefix(name) {
            return Some(rest);
        }
    }
    None
}

fn is_dim(c: char) -> bool {
    ('1'..='4').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_vector_matrix_kinds() {
        assert_eq!(keyword_kind("float"), Some(TokenKind::ScalarType));
        assert_eq!(keyword_kind("float3"), Some(TokenKind::VectorType));
        assert_eq!(keyword_kind("float4x4"), Some(TokenKind::MatrixType));
        assert_eq!(keyword_kind("int2x3"), Some(TokenKind::MatrixType));
        assert_eq!(keyword_kind("dword"), Some(TokenKind::ScalarType));
        assert_eq!(keyword_kind("float5"), None);
        assert_eq!(keyword_kind("floaty"), None);
        assert_eq!(keyword_kind("float4x5"), None);
    }

    #[test]
    fn object_kinds() {
        assert_eq!(keyword_kind("Texture2D"), Some(TokenKind::Texture));
        assert_eq!(keyword_kind("samplerCUBE"), Some(TokenKind::Sampler));
        assert_eq!(keyword_kind("SamplerState"), Some(TokenKind::SamplerState));
        assert_eq!(keyword_kind("cbuffer"), Some(TokenKind::UniformBuffer));
        assert_eq!(keyword_kind("StructuredBuffer"), Some(TokenKind::StorageBuffer));
    }

    #[test]
    fn plain_identifiers() {
        assert_eq!(keyword_kind("main"), None);
        assert_eq!(keyword_kind("colour"), None);
        assert_eq!(keyword_kind("Position"), None);
    }
}
