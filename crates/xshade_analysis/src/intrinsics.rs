//! Static intrinsic tables.
//!
//! Two pure mappings: call spelling to base intrinsic with its minimum
//! shader model, and `(base, argument count)` to the argc-specialized
//! intrinsic for the overload-sensitive ones.

use xshade_ast::Intrinsic;
use xshade_common::ShaderModel;

/// A table entry for a recognized intrinsic name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntrinsicEntry {
    pub intrinsic: Intrinsic,
    pub min_shader_model: ShaderModel,
}

const SM1: ShaderModel = ShaderModel::new(1, 1);
const SM2: ShaderModel = ShaderModel::new(2, 0);
const SM3: ShaderModel = ShaderModel::new(3, 0);
const SM4: ShaderModel = ShaderModel::new(4, 0);
const SM5: ShaderModel = ShaderModel::new(5, 0);

/// Looks up an intrinsic by its call spelling. Texture-object methods
/// are listed under their member name (`Sample`, `Load`, ...).
pub fn lookup_intrinsic(name: &str) -> Option<IntrinsicEntry> {
    use Intrinsic as I;
    let (intrinsic, min_shader_model) = match name {
        "abs" => (I::Abs, SM1),
        "acos" => (I::Acos, SM1),
        "all" => (I::All, SM1),
        "any" => (I::Any, SM1),
        "asdouble" => (I::AsDouble, SM5),
        "asfloat" => (I::AsFloat, SM4),
        "asin" => (I::Asin, SM1),
        "asint" => (I::AsInt, SM4),
        "asuint" => (I::AsUint1, SM4),
        "atan" => (I::Atan, SM1),
        "atan2" => (I::Atan2, SM1),
        "ceil" => (I::Ceil, SM1),
        "clamp" => (I::Clamp, SM1),
        "clip" => (I::Clip, SM1),
        "cos" => (I::Cos, SM1),
        "cosh" => (I::Cosh, SM1),
        "countbits" => (I::CountBits, SM5),
        "cross" => (I::Cross, SM1),
        "ddx" => (I::Ddx, SM2),
        "ddx_coarse" => (I::DdxCoarse, SM5),
        "ddx_fine" => (I::DdxFine, SM5),
        "ddy" => (I::Ddy, SM2),
        "ddy_coarse" => (I::DdyCoarse, SM5),
        "ddy_fine" => (I::DdyFine, SM5),
        "degrees" => (I::Degrees, SM1),
        "determinant" => (I::Determinant, SM1),
        "distance" => (I::Distance, SM1),
        "dot" => (I::Dot, SM1),
        "exp" => (I::Exp, SM1),
        "exp2" => (I::Exp2, SM1),
        "f16tof32" => (I::F16ToF32, SM5),
        "f32tof16" => (I::F32ToF16, SM5),
        "faceforward" => (I::FaceForward, SM1),
        "firstbithigh" => (I::FirstBitHigh, SM5),
        "firstbitlow" => (I::FirstBitLow, SM5),
        "floor" => (I::Floor, SM1),
        "fma" => (I::Fma, SM5),
        "fmod" => (I::Fmod, SM1),
        "frac" => (I::Frac, SM1),
        "frexp" => (I::Frexp, SM2),
        "fwidth" => (I::Fwidth, SM2),
        "GroupMemoryBarrier" => (I::GroupMemoryBarrier, SM5),
        "GroupMemoryBarrierWithGroupSync" => (I::GroupMemoryBarrierWithGroupSync, SM5),
        "InterlockedAdd" => (I::InterlockedAdd, SM5),
        "InterlockedAnd" => (I::InterlockedAnd, SM5),
        "InterlockedCompareExchange" => (I::InterlockedCompareExchange, SM5),
        "InterlockedCompareStore" => (I::InterlockedCompareStore, SM5),
        "InterlockedExchange" => (I::InterlockedExchange, SM5),
        "InterlockedMax" => (I::InterlockedMax, SM5),
        "InterlockedMin" => (I::InterlockedMin, SM5),
        "InterlockedOr" => (I::InterlockedOr, SM5),
        "InterlockedXor" => (I::InterlockedXor, SM5),
        "isfinite" => (I::IsFinite, SM1),
        "isinf" => (I::IsInf, SM1),
        "isnan" => (I::IsNan, SM1),
        "ldexp" => (I::Ldexp, SM2),
        "length" => (I::Length, SM1),
        "lerp" => (I::Lerp, SM1),
        "lit" => (I::Lit, SM1),
        "log" => (I::Log, SM1),
        "log10" => (I::Log10, SM1),
        "log2" => (I::Log2, SM1),
        "mad" => (I::Mad, SM1),
        "max" => (I::Max, SM1),
        "min" => (I::Min, SM1),
        "modf" => (I::Modf, SM1),
        "mul" => (I::Mul, SM1),
        "noise" => (I::Noise, SM1),
        "normalize" => (I::Normalize, SM1),
        "pow" => (I::Pow, SM1),
        "radians" => (I::Radians, SM1),
        "rcp" => (I::Rcp, SM5),
        "reflect" => (I::Reflect, SM1),
        "refract" => (I::Refract, SM1),
        "round" => (I::Round, SM1),
        "rsqrt" => (I::Rsqrt, SM1),
        "saturate" => (I::Saturate, SM1),
        "sign" => (I::Sign, SM1),
        "sin" => (I::Sin, SM1),
        "sincos" => (I::SinCos, SM1),
        "sinh" => (I::Sinh, SM1),
        "smoothstep" => (I::SmoothStep, SM1),
        "sqrt" => (I::Sqrt, SM1),
        "step" => (I::Step, SM1),
        "tan" => (I::Tan, SM1),
        "tanh" => (I::Tanh, SM1),
        "transpose" => (I::Transpose, SM1),
        "trunc" => (I::Trunc, SM1),

        "tex1D" => (I::Tex1D2, SM2),
        "tex1Dbias" => (I::Tex1DBias, SM2),
        "tex1Dgrad" => (I::Tex1DGrad, SM3),
        "tex1Dlod" => (I::Tex1DLod, SM3),
        "tex1Dproj" => (I::Tex1DProj, SM2),
        "tex2D" => (I::Tex2D2, SM2),
        "tex2Dbias" => (I::Tex2DBias, SM2),
        "tex2Dgrad" => (I::Tex2DGrad, SM3),
        "tex2Dlod" => (I::Tex2DLod, SM3),
        "tex2Dproj" => (I::Tex2DProj, SM2),
        "tex3D" => (I::Tex3D2, SM2),
        "tex3Dbias" => (I::Tex3DBias, SM2),
        "tex3Dgrad" => (I::Tex3DGrad, SM3),
        "tex3Dlod" => (I::Tex3DLod, SM3),
        "tex3Dproj" => (I::Tex3DProj, SM2),
        "texCUBE" => (I::TexCube2, SM2),
        "texCUBEbias" => (I::TexCubeBias, SM2),
        "texCUBEgrad" => (I::TexCubeGrad, SM3),
        "texCUBElod" => (I::TexCubeLod, SM3),
        "texCUBEproj" => (I::TexCubeProj, SM2),

        "GetDimensions" => (I::TextureGetDimensions, SM4),
        "Load" => (I::TextureLoad1, SM4),
        "Sample" => (I::TextureSample2, SM4),
        "SampleBias" => (I::TextureSampleBias3, SM4),
        "SampleCmp" => (I::TextureSampleCmp3, SM4),
        "SampleGrad" => (I::TextureSampleGrad4, SM4),
        "SampleLevel" => (I::TextureSampleLevel3, SM4),

        _ => return None,
    };
    Some(IntrinsicEntry {
        intrinsic,
        min_shader_model,
    })
}

/// Refines an overload-sensitive intrinsic by its argument count. For
/// all other intrinsics this is the identity.
pub fn refine_by_argument_count(intrinsic: Intrinsic, argc: usize) -> Intrinsic {
    use Intrinsic as I;
    match (intrinsic, argc) {
        (I::AsUint1, 3) => I::AsUint3,

        (I::Tex1D2, 4) => I::Tex1D4,
        (I::Tex2D2, 4) => I::Tex2D4,
        (I::Tex3D2, 4) => I::Tex3D4,
        (I::TexCube2, 4) => I::TexCube4,

        (I::TextureLoad1, 2) => I::TextureLoad2,
        (I::TextureLoad1, 3) => I::TextureLoad3,

        (I::TextureSample2, 3) => I::TextureSample3,
        (I::TextureSample2, 4) => I::TextureSample4,
        (I::TextureSample2, 5) => I::TextureSample5,

        (I::TextureSampleBias3, 4) => I::TextureSampleBias4,
        (I::TextureSampleBias3, 5) => I::TextureSampleBias5,
        (I::TextureSampleBias3, 6) => I::TextureSampleBias6,

        (I::TextureSampleCmp3, 4) => I::TextureSampleCmp4,
        (I::TextureSampleCmp3, 5) => I::TextureSampleCmp5,
        (I::TextureSampleCmp3, 6) => I::TextureSampleCmp6,

        (I::TextureSampleGrad4, 5) => I::TextureSampleGrad5,
        (I::TextureSampleGrad4, 6) => I::TextureSampleGrad6,
        (I::TextureSampleGrad4, 7) => I::TextureSampleGrad7,

        (I::TextureSampleLevel3, 4) => I::TextureSampleLevel4,
        (I::TextureSampleLevel3, 5) => I::TextureSampleLevel5,

        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_ast::Intrinsic;

    #[test]
    fn dot_resolves() {
        let entry = lookup_intrinsic("dot").unwrap();
        assert_eq!(entry.intrinsic, Intrinsic::Dot);
        assert!(entry.min_shader_model <= ShaderModel::new(3, 0));
    }

    #[test]
    fn asuint_refines_by_argc() {
        let entry = lookup_intrinsic("asuint").unwrap();
        assert_eq!(
            refine_by_argument_count(entry.intrinsic, 3),
            Intrinsic::AsUint3
        );
        assert_eq!(
            refine_by_argument_count(entry.intrinsic, 1),
            Intrinsic::AsUint1
        );
    }

    #[test]
    fn sample_refines_by_argc() {
        let entry = lookup_intrinsic("Sample").unwrap();
        assert!(entry.intrinsic.is_texture_method());
        assert_eq!(
            refine_by_argument_count(entry.intrinsic, 4),
            Intrinsic::TextureSample4
        );
    }

    #[test]
    fn unknown_names_miss() {
        assert!(lookup_intrinsic("definitely_not_an_intrinsic").is_none());
    }

    #[test]
    fn refinement_is_pure() {
        let entry = lookup_intrinsic("tex2D").unwrap();
        let a = refine_by_argument_count(entry.intrinsic, 4);
        let b = refine_by_argument_count(entry.intrinsic, 4);
        assert_eq!(a, b);
        assert_eq!(a, Intrinsic::Tex2D4);
    }
}
