//! HLSL to GLSL keyword mapping.

use xshade_ast::{
    DataType, IndexedSemantic, Intrinsic, ScalarType, Semantic, TextureType, TypeDenoter,
};

/// The GLSL spelling of a data type.
pub fn data_type_to_glsl(data_type: DataType) -> String {
    match data_type {
        DataType::String => "string".to_string(),
        DataType::Scalar(scalar) => scalar_to_glsl(scalar).to_string(),
        DataType::Vector(scalar, 1) => scalar_to_glsl(scalar).to_string(),
        DataType::Vector(scalar, n) => format!("{}vec{}", vector_prefix(scalar), n),
        DataType::Matrix(scalar, 1, 1) => scalar_to_glsl(scalar).to_string(),
        DataType::Matrix(_, m, n) if m == n => format!("mat{}", m),
        DataType::Matrix(_, m, n) => format!("mat{}x{}", m, n),
    }
}

fn scalar_to_glsl(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "bool",
        ScalarType::Int => "int",
        ScalarType::UInt => "uint",
        ScalarType::Half | ScalarType::Float => "float",
        ScalarType::Double => "double",
    }
}

fn vector_prefix(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "b",
        ScalarType::Int => "i",
        ScalarType::UInt => "u",
        ScalarType::Half | ScalarType::Float => "",
        ScalarType::Double => "d",
    }
}

/// The GLSL sampler type for an HLSL texture object.
pub fn texture_type_to_glsl(texture_type: TextureType) -> &'static str {
    use TextureType as T;
    match texture_type {
        T::Texture1D => "sampler1D",
        T::Texture1DArray => "sampler1DArray",
        T::Texture2D | T::Generic => "sampler2D",
        T::Texture2DArray => "sampler2DArray",
        T::Texture3D => "sampler3D",
        T::TextureCube => "samplerCube",
        T::TextureCubeArray => "samplerCubeArray",
        T::Texture2DMS => "sampler2DMS",
        T::Texture2DMSArray => "sampler2DMSArray",
        T::RwTexture1D => "image1D",
        T::RwTexture1DArray => "image1DArray",
        T::RwTexture2D => "image2D",
        T::RwTexture2DArray => "image2DArray",
        T::RwTexture3D => "image3D",
    }
}

/// Renders a type denoter in GLSL. Unresolved aliases keep their name so
/// partially analyzed programs stay printable.
pub fn type_denoter_to_glsl(denoter: &TypeDenoter) -> String {
    match denoter {
        TypeDenoter::Void => "void".to_string(),
        TypeDenoter::Base(data_type) => data_type_to_glsl(*data_type),
        TypeDenoter::Array { base, .. } => type_denoter_to_glsl(base),
        TypeDenoter::Struct(Some(name)) => rename_reserved(name),
        TypeDenoter::Struct(None) => "struct".to_string(),
        TypeDenoter::Alias(name) => rename_reserved(name),
        TypeDenoter::Texture(texture_type) => texture_type_to_glsl(*texture_type).to_string(),
        TypeDenoter::Sampler => "sampler2D".to_string(),
        TypeDenoter::Unknown => "void".to_string(),
    }
}

/// The GLSL built-in variable for a system-value semantic, if any.
pub fn semantic_to_glsl(semantic: &IndexedSemantic) -> Option<&'static str> {
    Some(match semantic.semantic {
        Semantic::VertexPosition => "gl_Position",
        Semantic::Position => "gl_FragCoord",
        Semantic::Depth => "gl_FragDepth",
        Semantic::VertexId => "gl_VertexID",
        Semantic::InstanceId => "gl_InstanceID",
        Semantic::PrimitiveId => "gl_PrimitiveID",
        Semantic::IsFrontFace => "gl_FrontFacing",
        Semantic::SampleIndex => "gl_SampleID",
        Semantic::DispatchThreadId => "gl_GlobalInvocationID",
        Semantic::GroupId => "gl_WorkGroupID",
        Semantic::GroupIndex => "gl_LocalInvocationIndex",
        Semantic::GroupThreadId => "gl_LocalInvocationID",
        Semantic::ClipDistance => "gl_ClipDistance",
        Semantic::CullDistance => "gl_CullDistance",
        Semantic::OutputControlPointId => "gl_InvocationID",
        Semantic::DomainLocation => "gl_TessCoord",
        Semantic::GsInstanceId => "gl_InvocationID",
        Semantic::Coverage => "gl_SampleMask",
        Semantic::ViewportArrayIndex => "gl_ViewportIndex",
        Semantic::RenderTargetArrayIndex => "gl_Layer",
        _ => return None,
    })
}

/// GLSL spelling of an intrinsic, when the call can be renamed directly.
/// Returns None for intrinsics that need structural rewriting.
pub fn intrinsic_to_glsl(intrinsic: Intrinsic) -> Option<&'static str> {
    use Intrinsic as I;
    Some(match intrinsic {
        I::Abs => "abs",
        I::Acos => "acos",
        I::All => "all",
        I::Any => "any",
        I::AsFloat => "intBitsToFloat",
        I::AsInt => "floatBitsToInt",
        I::AsUint1 => "floatBitsToUint",
        I::Asin => "asin",
        I::Atan => "atan",
        I::Atan2 => "atan",
        I::Ceil => "ceil",
        I::Clamp => "clamp",
        I::Cos => "cos",
        I::Cosh => "cosh",
        I::CountBits => "bitCount",
        I::Cross => "cross",
        I::Ddx => "dFdx",
        I::DdxCoarse => "dFdxCoarse",
        I::DdxFine => "dFdxFine",
        I::Ddy => "dFdy",
        I::DdyCoarse => "dFdyCoarse",
        I::DdyFine => "dFdyFine",
        I::Degrees => "degrees",
        I::Determinant => "determinant",
        I::Distance => "distance",
        I::Dot => "dot",
        I::Exp => "exp",
        I::Exp2 => "exp2",
        I::FaceForward => "faceforward",
        I::FirstBitHigh => "findMSB",
        I::FirstBitLow => "findLSB",
        I::Floor => "floor",
        I::Fma => "fma",
        I::Fmod => "mod",
        I::Frac => "fract",
        I::Frexp => "frexp",
        I::Fwidth => "fwidth",
        I::GroupMemoryBarrier => "groupMemoryBarrier",
        I::InterlockedAdd => "atomicAdd",
        I::InterlockedAnd => "atomicAnd",
        I::InterlockedCompareExchange => "atomicCompSwap",
        I::InterlockedExchange => "atomicExchange",
        I::InterlockedMax => "atomicMax",
        I::InterlockedMin => "atomicMin",
        I::InterlockedOr => "atomicOr",
        I::InterlockedXor => "atomicXor",
        I::IsInf => "isinf",
        I::IsNan => "isnan",
        I::Ldexp => "ldexp",
        I::Length => "length",
        I::Lerp => "mix",
        I::Log => "log",
        I::Log2 => "log2",
        I::Max => "max",
        I::Min => "min",
        I::Modf => "modf",
        I::Normalize => "normalize",
        I::Pow => "pow",
        I::Radians => "radians",
        I::Reflect => "reflect",
        I::Refract => "refract",
        I::Round => "round",
        I::Rsqrt => "inversesqrt",
        I::Sign => "sign",
        I::Sin => "sin",
        I::Sinh => "sinh",
        I::SmoothStep => "smoothstep",
        I::Sqrt => "sqrt",
        I::Step => "step",
        I::Tan => "tan",
        I::Tanh => "tanh",
        I::Transpose => "transpose",
        I::Trunc => "trunc",

        I::Tex1D2 => "texture",
        I::Tex1DLod => "textureLod",
        I::Tex1DProj => "textureProj",
        I::Tex2D2 => "texture",
        I::Tex2DLod => "textureLod",
        I::Tex2DProj => "textureProj",
        I::Tex3D2 => "texture",
        I::Tex3DLod => "textureLod",
        I::Tex3DProj => "textureProj",
        I::TexCube2 => "texture",
        I::TexCubeLod => "textureLod",

        I::TextureSample2 | I::TextureSample3 => "texture",
        I::TextureSampleLevel3 => "textureLod",
        I::TextureSampleGrad4 => "textureGrad",
        I::TextureLoad1 | I::TextureLoad2 | I::TextureLoad3 => "texelFetch",

        _ => return None,
    })
}

/// Reserved GLSL identifiers that HLSL code may use freely.
pub fn is_glsl_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "input"
            | "output"
            | "attribute"
            | "varying"
            | "uniform"
            | "buffer"
            | "layout"
            | "flat"
            | "smooth"
            | "centroid"
            | "precision"
            | "lowp"
            | "mediump"
            | "highp"
            | "texture"
            | "main"
    )
}

/// Escapes an identifier that collides with a reserved GLSL name. The
/// emitter applies this to every user identifier, at declaration and use
/// sites alike, so the renaming stays consistent.
pub fn rename_reserved(ident: &str) -> String {
    if is_glsl_keyword(ident) {
        format!("xsh_{}", ident)
    } else {
        ident.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_and_matrix_names() {
        assert_eq!(
            data_type_to_glsl(DataType::Vector(ScalarType::Float, 4)),
            "vec4"
        );
        assert_eq!(
            data_type_to_glsl(DataType::Vector(ScalarType::Int, 3)),
            "ivec3"
        );
        assert_eq!(
            data_type_to_glsl(DataType::Matrix(ScalarType::Float, 4, 4)),
            "mat4"
        );
        assert_eq!(
            data_type_to_glsl(DataType::Matrix(ScalarType::Float, 3, 2)),
            "mat3x2"
        );
    }

    #[test]
    fn semantics_map_to_builtins() {
        let sem = IndexedSemantic::new(Semantic::VertexPosition, 0);
        assert_eq!(semantic_to_glsl(&sem), Some("gl_Position"));
        let user = IndexedSemantic::new(Semantic::User("TEXCOORD".into()), 0);
        assert_eq!(semantic_to_glsl(&user), None);
    }

    #[test]
    fn intrinsic_renames() {
        assert_eq!(intrinsic_to_glsl(Intrinsic::Frac), Some("fract"));
        assert_eq!(intrinsic_to_glsl(Intrinsic::Lerp), Some("mix"));
        assert_eq!(intrinsic_to_glsl(Intrinsic::Rsqrt), Some("inversesqrt"));
        // saturate needs a clamp rewrite, not a rename.
        assert_eq!(intrinsic_to_glsl(Intrinsic::Saturate), None);
    }

    #[test]
    fn reserved_identifiers_are_escaped() {
        assert_eq!(rename_reserved("input"), "xsh_input");
        assert_eq!(rename_reserved("layout"), "xsh_layout");
        assert_eq!(rename_reserved("color"), "color");
        assert_eq!(
            type_denoter_to_glsl(&TypeDenoter::Struct(Some("buffer".into()))),
            "xsh_buffer"
        );
    }
}
