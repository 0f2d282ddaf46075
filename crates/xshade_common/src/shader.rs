//! Shader pipeline stages and language versions.

use std::fmt;

/// The pipeline stage a translation unit is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderTarget {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

impl ShaderTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderTarget::Vertex => "vertex shader",
            ShaderTarget::Fragment => "fragment shader",
            ShaderTarget::Geometry => "geometry shader",
            ShaderTarget::TessControl => "tessellation-control shader",
            ShaderTarget::TessEval => "tessellation-evaluation shader",
            ShaderTarget::Compute => "compute shader",
        }
    }
}

impl fmt::Display for ShaderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HLSL feature level of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputShaderVersion {
    Hlsl3,
    Hlsl4,
    Hlsl5,
}

impl InputShaderVersion {
    pub fn shader_model(&self) -> ShaderModel {
        match self {
            InputShaderVersion::Hlsl3 => ShaderModel::new(3, 0),
            InputShaderVersion::Hlsl4 => ShaderModel::new(4, 0),
            InputShaderVersion::Hlsl5 => ShaderModel::new(5, 0),
        }
    }
}

impl fmt::Display for InputShaderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputShaderVersion::Hlsl3 => f.write_str("HLSL 3.0"),
            InputShaderVersion::Hlsl4 => f.write_str("HLSL 4.0"),
            InputShaderVersion::Hlsl5 => f.write_str("HLSL 5.0"),
        }
    }
}

/// GLSL version of the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputShaderVersion {
    Glsl130,
    Glsl140,
    Glsl150,
    Glsl330,
    Glsl400,
    Glsl410,
    Glsl420,
    Glsl430,
    Glsl440,
    Glsl450,
    /// No explicit `#version` directive.
    Glsl,
}

impl OutputShaderVersion {
    /// The number used in the `#version` directive, if any.
    pub fn version_number(&self) -> Option<u32> {
        match self {
            OutputShaderVersion::Glsl130 => Some(130),
            OutputShaderVersion::Glsl140 => Some(140),
            OutputShaderVersion::Glsl150 => Some(150),
            OutputShaderVersion::Glsl330 => Some(330),
            OutputShaderVersion::Glsl400 => Some(400),
            OutputShaderVersion::Glsl410 => Some(410),
            OutputShaderVersion::Glsl420 => Some(420),
            OutputShaderVersion::Glsl430 => Some(430),
            OutputShaderVersion::Glsl440 => Some(440),
            OutputShaderVersion::Glsl450 => Some(450),
            OutputShaderVersion::Glsl => None,
        }
    }
}

impl fmt::Display for OutputShaderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version_number() {
            Some(n) => write!(f, "GLSL {}.{:02}", n / 100, n % 100),
            None => f.write_str("GLSL"),
        }
    }
}

/// HLSL shader-model version number, used for intrinsic availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShaderModel {
    pub major: u32,
    pub minor: u32,
}

impl ShaderModel {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ShaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_models_order() {
        assert!(ShaderModel::new(4, 0) < ShaderModel::new(5, 0));
        assert!(ShaderModel::new(4, 0) < ShaderModel::new(4, 1));
        assert!(InputShaderVersion::Hlsl3.shader_model() < ShaderModel::new(4, 0));
    }

    #[test]
    fn glsl_display() {
        assert_eq!(OutputShaderVersion::Glsl330.to_string(), "GLSL 3.30");
        assert_eq!(OutputShaderVersion::Glsl.to_string(), "GLSL");
    }
}
