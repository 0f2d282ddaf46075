//! HLSL semantics (binding tags on parameters and return values).

use std::fmt;

/// A semantic, distinguishing system values from user semantics.
///
/// Legacy D3D9 names (`POSITION`, `VPOS`, `COLOR` and `DEPTH` outputs)
/// are folded onto their system-value counterparts; everything else is a
/// user semantic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Semantic {
    ClipDistance,
    CullDistance,
    Coverage,
    Depth,
    DepthGreaterEqual,
    DepthLessEqual,
    DispatchThreadId,
    DomainLocation,
    GroupId,
    GroupIndex,
    GroupThreadId,
    GsInstanceId,
    InnerCoverage,
    InsideTessFactor,
    InstanceId,
    IsFrontFace,
    OutputControlPointId,
    Position,
    PrimitiveId,
    RenderTargetArrayIndex,
    SampleIndex,
    StencilRef,
    Target,
    TessFactor,
    VertexId,
    ViewportArrayIndex,
    /// Internal rewrite of `Position` on the vertex stage so the back-end
    /// picks `gl_Position`.
    VertexPosition,
    /// A user-defined semantic, stored without its trailing index.
    User(String),
}

impl Semantic {
    pub fn is_system_value(&self) -> bool {
        !matches!(self, Semantic::User(_))
    }

    /// Canonical upper-case name, without index.
    pub fn name(&self) -> &str {
        match self {
            Semantic::ClipDistance => "CLIPDISTANCE",
            Semantic::CullDistance => "CULLDISTANCE",
            Semantic::Coverage => "COVERAGE",
            Semantic::Depth => "DEPTH",
            Semantic::DepthGreaterEqual => "DEPTHGREATEREQUAL",
            Semantic::DepthLessEqual => "DEPTHLESSEQUAL",
            Semantic::DispatchThreadId => "DISPATCHTHREADID",
            Semantic::DomainLocation => "DOMAINLOCATION",
            Semantic::GroupId => "GROUPID",
            Semantic::GroupIndex => "GROUPINDEX",
            Semantic::GroupThreadId => "GROUPTHREADID",
            Semantic::GsInstanceId => "GSINSTANCEID",
            Semantic::InnerCoverage => "INNERCOVERAGE",
            Semantic::InsideTessFactor => "INSIDETESSFACTOR",
            Semantic::InstanceId => "INSTANCEID",
            Semantic::IsFrontFace => "ISFRONTFACE",
            Semantic::OutputControlPointId => "OUTPUTCONTROLPOINTID",
            Semantic::Position => "POSITION",
            Semantic::PrimitiveId => "PRIMITIVEID",
            Semantic::RenderTargetArrayIndex => "RENDERTARGETARRAYINDEX",
            Semantic::SampleIndex => "SAMPLEINDEX",
            Semantic::StencilRef => "STENCILREF",
            Semantic::Target => "TARGET",
            Semantic::TessFactor => "TESSFACTOR",
            Semantic::VertexId => "VERTEXID",
            Semantic::ViewportArrayIndex => "VIEWPORTARRAYINDEX",
            Semantic::VertexPosition => "POSITION",
            Semantic::User(name) => name,
        }
    }
}

/// A semantic plus its index, e.g. `COLOR1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexedSemantic {
    pub semantic: Semantic,
    pub index: u32,
}

impl IndexedSemantic {
    pub fn new(semantic: Semantic, index: u32) -> Self {
        Self { semantic, index }
    }

    /// Parses a semantic identifier. Semantic names are case-insensitive;
    /// trailing digits form the index.
    pub fn parse(ident: &str) -> IndexedSemantic {
        let trimmed = ident.trim_end_matches(|c: char| c.is_ascii_digit());
        let index = ident[trimmed.len()..].parse::<u32>().unwrap_or(0);

        let upper = trimmed.to_ascii_uppercase();
        let base = upper.strip_prefix("SV_").unwrap_or(&upper);
        let semantic = match base {
            "CLIPDISTANCE" => Semantic::ClipDistance,
            "CULLDISTANCE" => Semantic::CullDistance,
            "COVERAGE" => Semantic::Coverage,
            "DEPTH" => Semantic::Depth,
            "DEPTHGREATEREQUAL" => Semantic::DepthGreaterEqual,
            "DEPTHLESSEQUAL" => Semantic::DepthLessEqual,
            "DISPATCHTHREADID" => Semantic::DispatchThreadId,
            "DOMAINLOCATION" => Semantic::DomainLocation,
            "GROUPID" => Semantic::GroupId,
            "GROUPINDEX" => Semantic::GroupIndex,
            "GROUPTHREADID" => Semantic::GroupThreadId,
            "GSINSTANCEID" => Semantic::GsInstanceId,
            "INNERCOVERAGE" => Semantic::InnerCoverage,
            "INSIDETESSFACTOR" => Semantic::InsideTessFactor,
            "INSTANCEID" => Semantic::InstanceId,
            "ISFRONTFACE" => Semantic::IsFrontFace,
            "OUTPUTCONTROLPOINTID" => Semantic::OutputControlPointId,
            "POSITION" | "VPOS" => Semantic::Position,
            "PRIMITIVEID" => Semantic::PrimitiveId,
            "RENDERTARGETARRAYINDEX" => Semantic::RenderTargetArrayIndex,
            "SAMPLEINDEX" => Semantic::SampleIndex,
            "STENCILREF" => Semantic::StencilRef,
            "TARGET" => Semantic::Target,
            "COLOR" if upper.starts_with("SV_") => Semantic::Target,
            "TESSFACTOR" if upper.starts_with("SV_") => Semantic::TessFactor,
            "VERTEXID" => Semantic::VertexId,
            "VIEWPORTARRAYINDEX" => Semantic::ViewportArrayIndex,
            _ => Semantic::User(trimmed.to_string()),
        };
        IndexedSemantic::new(semantic, index)
    }

    pub fn is_system_value(&self) -> bool {
        self.semantic.is_system_value()
    }
}

impl fmt::Display for IndexedSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index > 0 {
            write!(f, "{}{}", self.semantic.name(), self.index)
        } else {
            f.write_str(self.semantic.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_values_parse_case_insensitively() {
        assert_eq!(
            IndexedSemantic::parse("SV_Position").semantic,
            Semantic::Position
        );
        assert_eq!(
            IndexedSemantic::parse("POSITION").semantic,
            Semantic::Position
        );
        assert_eq!(IndexedSemantic::parse("VPOS").semantic, Semantic::Position);
        assert_eq!(
            IndexedSemantic::parse("sv_target0").semantic,
            Semantic::Target
        );
    }

    #[test]
    fn user_semantics_keep_name_and_index() {
        let sem = IndexedSemantic::parse("TEXCOORD3");
        assert_eq!(sem.semantic, Semantic::User("TEXCOORD".into()));
        assert_eq!(sem.index, 3);
        assert!(!sem.is_system_value());
    }

    #[test]
    fn indexed_system_value() {
        let sem = IndexedSemantic::parse("SV_Target2");
        assert_eq!(sem.semantic, Semantic::Target);
        assert_eq!(sem.index, 2);
        assert!(sem.is_system_value());
    }
}
