//! Intrinsic identifiers.
//!
//! The name tables that map call spellings onto these identifiers live in
//! the analysis crate; this enum is the vocabulary the AST is decorated
//! with. Overload-sensitive intrinsics carry their argument count as a
//! numeric suffix, matching the D3D overload sets.

/// A language-defined function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Abs,
    Acos,
    All,
    Any,
    AsDouble,
    AsFloat,
    AsInt,
    AsUint1,
    AsUint3,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Clamp,
    Clip,
    Cos,
    Cosh,
    CountBits,
    Cross,
    Ddx,
    DdxCoarse,
    DdxFine,
    Ddy,
    DdyCoarse,
    DdyFine,
    Degrees,
    Determinant,
    Distance,
    Dot,
    Exp,
    Exp2,
    F16ToF32,
    F32ToF16,
    FaceForward,
    FirstBitHigh,
    FirstBitLow,
    Floor,
    Fma,
    Fmod,
    Frac,
    Frexp,
    Fwidth,
    GroupMemoryBarrier,
    GroupMemoryBarrierWithGroupSync,
    InterlockedAdd,
    InterlockedAnd,
    InterlockedCompareExchange,
    InterlockedCompareStore,
    InterlockedExchange,
    InterlockedMax,
    InterlockedMin,
    InterlockedOr,
    InterlockedXor,
    IsFinite,
    IsInf,
    IsNan,
    Ldexp,
    Length,
    Lerp,
    Lit,
    Log,
    Log10,
    Log2,
    Mad,
    Max,
    Min,
    Modf,
    Mul,
    Noise,
    Normalize,
    Pow,
    Radians,
    Rcp,
    Reflect,
    Refract,
    Round,
    Rsqrt,
    Saturate,
    Sign,
    Sin,
    SinCos,
    Sinh,
    SmoothStep,
    Sqrt,
    Step,
    Tan,
    Tanh,
    Transpose,
    Trunc,

    // Legacy D3D9 texture functions; the suffix is the argument count.
    Tex1D2,
    Tex1D4,
    Tex1DBias,
    Tex1DGrad,
    Tex1DLod,
    Tex1DProj,
    Tex2D2,
    Tex2D4,
    Tex2DBias,
    Tex2DGrad,
    Tex2DLod,
    Tex2DProj,
    Tex3D2,
    Tex3D4,
    Tex3DBias,
    Tex3DGrad,
    Tex3DLod,
    Tex3DProj,
    TexCube2,
    TexCube4,
    TexCubeBias,
    TexCubeGrad,
    TexCubeLod,
    TexCubeProj,

    // Texture-object methods; the suffix is the argument count.
    TextureGetDimensions,
    TextureLoad1,
    TextureLoad2,
    TextureLoad3,
    TextureSample2,
    TextureSample3,
    TextureSample4,
    TextureSample5,
    TextureSampleBias3,
    TextureSampleBias4,
    TextureSampleBias5,
    TextureSampleBias6,
    TextureSampleCmp3,
    TextureSampleCmp4,
    TextureSampleCmp5,
    TextureSampleCmp6,
    TextureSampleGrad4,
    TextureSampleGrad5,
    TextureSampleGrad6,
    TextureSampleGrad7,
    TextureSampleLevel3,
    TextureSampleLevel4,
    TextureSampleLevel5,
}

impl Intrinsic {
    /// True for methods that must be invoked on a texture object.
    pub fn is_texture_method(&self) -> bool {
        use Intrinsic::*;
        matches!(
            self,
            TextureGetDimensions
                | TextureLoad1
                | TextureLoad2
                | TextureLoad3
                | TextureSample2
                | TextureSample3
                | TextureSample4
                | TextureSample5
                | TextureSampleBias3
                | TextureSampleBias4
                | TextureSampleBias5
                | TextureSampleBias6
                | TextureSampleCmp3
                | TextureSampleCmp4
                | TextureSampleCmp5
                | TextureSampleCmp6
                | TextureSampleGrad4
                | TextureSampleGrad5
                | TextureSampleGrad6
                | TextureSampleGrad7
                | TextureSampleLevel3
                | TextureSampleLevel4
                | TextureSampleLevel5
        )
    }
}
