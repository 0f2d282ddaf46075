//! Data types and type denoters.

use crate::StructDecl;
use std::fmt;
use xshade_lexer::strip_scalar_prefix;

/// The scalar element types of HLSL arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarType {
    Bool,
    Int,
    UInt,
    Half,
    Float,
    Double,
}

impl ScalarType {
    pub fn from_keyword(s: &str) -> Option<ScalarType> {
        Some(match s {
            "bool" => ScalarType::Bool,
            "int" => ScalarType::Int,
            "dword" => ScalarType::Int,
            "uint" => ScalarType::UInt,
            "half" => ScalarType::Half,
            "float" => ScalarType::Float,
            "double" => ScalarType::Double,
            _ => return None,
        })
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, ScalarType::Bool | ScalarType::Int | ScalarType::UInt)
    }

    pub fn is_real(&self) -> bool {
        matches!(
            self,
            ScalarType::Half | ScalarType::Float | ScalarType::Double
        )
    }

    /// The wider of two scalar types under the usual arithmetic
    /// conversions; the derived `Ord` matches the widening order.
    pub fn widened(self, other: ScalarType) -> ScalarType {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Half => "half",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An arithmetic or string data type, carrying its full shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Scalar(ScalarType),
    /// 1 to 4 components.
    Vector(ScalarType, u8),
    /// Rows x columns, each 1 to 4.
    Matrix(ScalarType, u8, u8),
}

impl DataType {
    /// Parses a type keyword like `float`, `int3`, or `half4x4`.
    pub fn from_keyword(keyword: &str) -> Option<DataType> {
        if keyword == "string" {
            return Some(DataType::String);
        }
        let suffix = strip_scalar_prefix(keyword)?;
        let prefix_len = keyword.len() - suffix.len();
        let scalar = ScalarType::from_keyword(&keyword[..prefix_len])?;
        if suffix.is_empty() {
            return Some(DataType::Scalar(scalar));
        }
        let dims: Vec<u8> = suffix
            .split('x')
            .map(|part| part.parse::<u8>().ok())
            .collect::<Option<_>>()?;
        match dims.as_slice() {
            [n] if (1..=4).contains(n) => Some(DataType::Vector(scalar, *n)),
            [m, n] if (1..=4).contains(m) && (1..=4).contains(n) => {
                Some(DataType::Matrix(scalar, *m, *n))
            }
            _ => None,
        }
    }

    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            DataType::String => None,
            DataType::Scalar(s) | DataType::Vector(s, _) | DataType::Matrix(s, _, _) => Some(*s),
        }
    }

    /// (rows, columns); scalars are 1x1 and vectors 1xN.
    pub fn dimensions(&self) -> (u8, u8) {
        match self {
            DataType::String | DataType::Scalar(_) => (1, 1),
            DataType::Vector(_, n) => (1, *n),
            DataType::Matrix(_, m, n) => (*m, *n),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DataType::Scalar(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, DataType::Vector(..))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, DataType::Matrix(..))
    }

    /// Total number of scalar components.
    pub fn component_count(&self) -> u8 {
        let (m, n) = self.dimensions();
        m * n
    }

    /// The HLSL keyword for this type.
    pub fn to_keyword(&self) -> String {
        match self {
            DataType::String => "string".into(),
            DataType::Scalar(s) => s.as_str().into(),
            DataType::Vector(s, n) => format!("{}{}", s, n),
            DataType::Matrix(s, m, n) => format!("{}{}x{}", s, m, n),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_keyword())
    }
}

/// The result of the usual arithmetic conversions on two data types.
///
/// Returns the common type and whether one operand had to be truncated
/// (HLSL permits shape truncation with a warning).
pub fn common_data_type(lhs: DataType, rhs: DataType) -> Option<(DataType, bool)> {
    let ls = lhs.scalar_type()?;
    let rs = rhs.scalar_type()?;
    let scalar = ls.widened(rs);
    let (lm, ln) = lhs.dimensions();
    let (rm, rn) = rhs.dimensions();

    // Scalars broadcast to any shape.
    if lhs.is_scalar() {
        return Some((with_scalar(rhs, scalar), false));
    }
    if rhs.is_scalar() {
        return Some((with_scalar(lhs, scalar), false));
    }

    if lhs.is_vector() != rhs.is_vector() {
        return None;
    }

    let truncated = lm != rm || ln != rn;
    let (m, n) = (lm.min(rm), ln.min(rn));
    let shape = if m == 1 && lhs.is_vector() {
        DataType::Vector(scalar, n)
    } else {
        DataType::Matrix(scalar, m, n)
    };
    Some((shape, truncated))
}

fn with_scalar(ty: DataType, scalar: ScalarType) -> DataType {
    match ty {
        DataType::String => DataType::String,
        DataType::Scalar(_) => DataType::Scalar(scalar),
        DataType::Vector(_, n) => DataType::Vector(scalar, n),
        DataType::Matrix(_, m, n) => DataType::Matrix(scalar, m, n),
    }
}

/// HLSL texture object kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureType {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    Texture2DMS,
    Texture2DMSArray,
    RwTexture1D,
    RwTexture1DArray,
    RwTexture2D,
    RwTexture2DArray,
    RwTexture3D,
    /// The DX9 `texture` keyword.
    Generic,
}

impl TextureType {
    pub fn from_keyword(keyword: &str) -> Option<TextureType> {
        Some(match keyword {
            "texture" => TextureType::Generic,
            "Texture1D" => TextureType::Texture1D,
            "Texture1DArray" => TextureType::Texture1DArray,
            "Texture2D" => TextureType::Texture2D,
            "Texture2DArray" => TextureType::Texture2DArray,
            "Texture3D" => TextureType::Texture3D,
            "TextureCube" => TextureType::TextureCube,
            "TextureCubeArray" => TextureType::TextureCubeArray,
            "Texture2DMS" => TextureType::Texture2DMS,
            "Texture2DMSArray" => TextureType::Texture2DMSArray,
            "RWTexture1D" => TextureType::RwTexture1D,
            "RWTexture1DArray" => TextureType::RwTexture1DArray,
            "RWTexture2D" => TextureType::RwTexture2D,
            "RWTexture2DArray" => TextureType::RwTexture2DArray,
            "RWTexture3D" => TextureType::RwTexture3D,
            _ => return None,
        })
    }
}

/// `cbuffer` or `tbuffer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformBufferType {
    ConstantBuffer,
    TextureBuffer,
}

impl UniformBufferType {
    pub fn from_keyword(keyword: &str) -> Option<UniformBufferType> {
        match keyword {
            "cbuffer" => Some(UniformBufferType::ConstantBuffer),
            "tbuffer" => Some(UniformBufferType::TextureBuffer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UniformBufferType::ConstantBuffer => "cbuffer",
            UniformBufferType::TextureBuffer => "tbuffer",
        }
    }
}

/// The type of an expression, declaration, or cast target.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDenoter {
    Void,
    Base(DataType),
    Array {
        base: Box<TypeDenoter>,
        /// One entry per dimension; None is a dynamic dimension.
        dims: Vec<Option<u64>>,
    },
    /// A named struct; None names the enclosing anonymous declaration.
    Struct(Option<String>),
    /// An unresolved type alias.
    Alias(String),
    Texture(TextureType),
    Sampler,
    /// Error sentinel assigned to subtrees whose type could not be
    /// computed, to suppress cascading diagnostics.
    Unknown,
}

impl TypeDenoter {
    pub fn array(base: TypeDenoter, dims: Vec<Option<u64>>) -> TypeDenoter {
        if dims.is_empty() {
            base
        } else {
            TypeDenoter::Array {
                base: Box::new(base),
                dims,
            }
        }
    }

    pub fn base_data_type(&self) -> Option<DataType> {
        match self {
            TypeDenoter::Base(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDenoter::Void)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeDenoter::Unknown)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDenoter::Array { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, TypeDenoter::Base(ty) if ty.is_vector())
    }

    /// Peels `n` array dimensions. Returns None when peeling past the
    /// rank, which is a type error at the call site.
    pub fn peel_arrays(&self, n: usize) -> Option<TypeDenoter> {
        if n == 0 {
            return Some(self.clone());
        }
        match self {
            TypeDenoter::Array { base, dims } => {
                if n < dims.len() {
                    Some(TypeDenoter::Array {
                        base: base.clone(),
                        dims: dims[n..].to_vec(),
                    })
                } else if n == dims.len() {
                    Some((**base).clone())
                } else {
                    base.peel_arrays(n - dims.len())
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeDenoter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDenoter::Void => f.write_str("void"),
            TypeDenoter::Base(ty) => write!(f, "{}", ty),
            TypeDenoter::Array { base, dims } => {
                write!(f, "{}", base)?;
                for dim in dims {
                    match dim {
                        Some(n) => write!(f, "[{}]", n)?,
                        None => f.write_str("[]")?,
                    }
                }
                Ok(())
            }
            TypeDenoter::Struct(Some(name)) => write!(f, "struct {}", name),
            TypeDenoter::Struct(None) => f.write_str("struct <anonymous>"),
            TypeDenoter::Alias(name) => f.write_str(name),
            TypeDenoter::Texture(_) => f.write_str("texture"),
            TypeDenoter::Sampler => f.write_str("sampler"),
            TypeDenoter::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// Convenience constructor used by the parser for inline struct types.
pub fn struct_type_denoter(decl: &StructDecl) -> TypeDenoter {
    TypeDenoter::Struct(decl.ident.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_parsing() {
        assert_eq!(
            DataType::from_keyword("float3"),
            Some(DataType::Vector(ScalarType::Float, 3))
        );
        assert_eq!(
            DataType::from_keyword("half4x2"),
            Some(DataType::Matrix(ScalarType::Half, 4, 2))
        );
        assert_eq!(
            DataType::from_keyword("dword"),
            Some(DataType::Scalar(ScalarType::Int))
        );
        assert_eq!(DataType::from_keyword("float0"), None);
        assert_eq!(DataType::from_keyword("vec3"), None);
    }

    #[test]
    fn widening() {
        let (ty, truncated) = common_data_type(
            DataType::Scalar(ScalarType::Int),
            DataType::Vector(ScalarType::Float, 4),
        )
        .unwrap();
        assert_eq!(ty, DataType::Vector(ScalarType::Float, 4));
        assert!(!truncated);

        let (ty, truncated) = common_data_type(
            DataType::Vector(ScalarType::Float, 4),
            DataType::Vector(ScalarType::Float, 2),
        )
        .unwrap();
        assert_eq!(ty, DataType::Vector(ScalarType::Float, 2));
        assert!(truncated);
    }

    #[test]
    fn peel_arrays() {
        let ty = TypeDenoter::array(
            TypeDenoter::Base(DataType::Scalar(ScalarType::Float)),
            vec![Some(4), Some(2)],
        );
        assert_eq!(
            ty.peel_arrays(1),
            Some(TypeDenoter::Array {
                base: Box::new(TypeDenoter::Base(DataType::Scalar(ScalarType::Float))),
                dims: vec![Some(2)],
            })
        );
        assert_eq!(
            ty.peel_arrays(2),
            Some(TypeDenoter::Base(DataType::Scalar(ScalarType::Float)))
        );
        assert_eq!(ty.peel_arrays(3), None);
    }
}
