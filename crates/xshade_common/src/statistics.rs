//! Compile-time statistics collected for the caller.

use indexmap::IndexMap;

/// A named resource bound to a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub slot: i32,
}

/// Statistics sink filled during compilation.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    /// Identifiers of all macros defined during preprocessing.
    pub macros: Vec<String>,
    pub textures: Vec<Binding>,
    pub constant_buffers: Vec<Binding>,
    pub fragment_targets: Vec<Binding>,
    /// Sampler-state records, keyed by sampler identifier in definition
    /// order.
    pub sampler_states: IndexMap<String, SamplerState>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts all binding lists by slot.
    pub fn sort_bindings(&mut self) {
        self.textures.sort_by_key(|b| b.slot);
        self.constant_buffers.sort_by_key(|b| b.slot);
        self.fragment_targets.sort_by_key(|b| b.slot);
    }
}

/// D3D sampler-state description harvested from `sampler_state { ... }`
/// initializers.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerState {
    pub filter: Filter,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            filter: Filter::MinMagMipLinear,
            address_u: TextureAddressMode::Clamp,
            address_v: TextureAddressMode::Clamp,
            address_w: TextureAddressMode::Clamp,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            comparison_func: ComparisonFunc::Never,
            border_color: [0.0; 4],
            min_lod: f32::MIN,
            max_lod: f32::MAX,
        }
    }
}

/// D3D `D3D11_FILTER` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    MinMagMipPoint,
    MinMagPointMipLinear,
    MinPointMagLinearMipPoint,
    MinPointMagMipLinear,
    MinLinearMagMipPoint,
    MinLinearMagPointMipLinear,
    MinMagLinearMipPoint,
    MinMagMipLinear,
    Anisotropic,
    ComparisonMinMagMipPoint,
    ComparisonMinMagPointMipLinear,
    ComparisonMinPointMagLinearMipPoint,
    ComparisonMinPointMagMipLinear,
    ComparisonMinLinearMagMipPoint,
    ComparisonMinLinearMagPointMipLinear,
    ComparisonMinMagLinearMipPoint,
    ComparisonMinMagMipLinear,
    ComparisonAnisotropic,
    MinimumMinMagMipPoint,
    MinimumMinMagPointMipLinear,
    MinimumMinPointMagLinearMipPoint,
    MinimumMinPointMagMipLinear,
    MinimumMinLinearMagMipPoint,
    MinimumMinLinearMagPointMipLinear,
    MinimumMinMagLinearMipPoint,
    MinimumMinMagMipLinear,
    MinimumAnisotropic,
    MaximumMinMagMipPoint,
    MaximumMinMagPointMipLinear,
    MaximumMinPointMagLinearMipPoint,
    MaximumMinPointMagMipLinear,
    MaximumMinLinearMagMipPoint,
    MaximumMinLinearMagPointMipLinear,
    MaximumMinMagLinearMipPoint,
    MaximumMinMagMipLinear,
    MaximumAnisotropic,
}

/// D3D `D3D11_TEXTURE_ADDRESS_MODE` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
    MirrorOnce,
}

/// D3D `D3D11_COMPARISON_FUNC` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparisonFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}
