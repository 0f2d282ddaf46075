//! End-to-end compilation tests.

use xshade_driver::{
    compile_shader, CollectingLog, InputShaderVersion, Options, OutputShaderVersion, Severity,
    ShaderInput, ShaderOutput, ShaderTarget, Statistics,
};

struct Compiled {
    ok: bool,
    glsl: String,
    statistics: Statistics,
    log: CollectingLog,
}

fn compile_with(source: &str, target: ShaderTarget, options: Options) -> Compiled {
    let mut reader = source.as_bytes();
    let mut writer: Vec<u8> = Vec::new();
    let mut statistics = Statistics::new();
    let mut log = CollectingLog::new();

    let ok = compile_shader(
        ShaderInput {
            source_code: &mut reader,
            filename: "test.hlsl",
            entry_point: "main",
            shader_target: target,
            shader_version: InputShaderVersion::Hlsl5,
            include_handler: None,
            defines: Vec::new(),
        },
        ShaderOutput {
            source_code: &mut writer,
            shader_version: OutputShaderVersion::Glsl330,
            options,
            statistics: Some(&mut statistics),
        },
        &mut log,
    );

    Compiled {
        ok,
        glsl: String::from_utf8(writer).unwrap(),
        statistics,
        log,
    }
}

fn compile(source: &str, target: ShaderTarget) -> Compiled {
    compile_with(source, target, Options::default())
}

fn error_messages(log: &CollectingLog) -> Vec<&str> {
    log.reports
        .iter()
        .filter(|r| r.severity >= Severity::Error)
        .map(|r| r.message.as_str())
        .collect()
}

#[test]
fn vertex_shader_end_to_end() {
    let result = compile(
        "struct VS_IN { float4 p : POSITION; };\n\
         float4 main(VS_IN i) : SV_Position { return i.p; }\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.starts_with("#version 330"));
    assert!(result.glsl.contains("void main()"));
    assert!(result.glsl.contains("gl_Position"));
    assert!(result.glsl.contains("in vec4 p;"));
}

#[test]
fn fragment_shader_with_texture() {
    let result = compile(
        "Texture2D colorMap : register(t0);\n\
         SamplerState colorSampler : register(s0);\n\
         float4 main(float2 uv : TEXCOORD0) : SV_Target\n\
         { return colorMap.Sample(colorSampler, uv); }\n",
        ShaderTarget::Fragment,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("uniform sampler2D colorMap;"));
    assert!(result.glsl.contains("texture(colorMap, uv)"));
    assert_eq!(result.statistics.textures.len(), 1);
    assert_eq!(result.statistics.textures[0].name, "colorMap");
    assert_eq!(result.statistics.textures[0].slot, 0);
}

#[test]
fn intrinsics_are_renamed() {
    let result = compile(
        "float4 main(float2 uv : TEXCOORD0) : SV_Target\n\
         {\n\
             float a = frac(uv.x);\n\
             float b = lerp(a, 1.0, 0.5);\n\
             float c = rsqrt(b);\n\
             float d = saturate(c);\n\
             return float4(a, b, c, d);\n\
         }\n",
        ShaderTarget::Fragment,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("fract(uv.x)"));
    assert!(result.glsl.contains("mix(a, 1.0, 0.5)"));
    assert!(result.glsl.contains("inversesqrt(b)"));
    assert!(result.glsl.contains("clamp(c, 0.0, 1.0)"));
}

#[test]
fn dot_and_asuint_overloads() {
    let result = compile(
        "float4 c;\n\
         void main() { float s = dot(c, c); uint3 u = asuint(1.0, 2.0, 3.0); }\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("dot(c, c)"));
}

#[test]
fn unknown_identifier_is_a_single_error() {
    let result = compile("void main(){ q + 1; }", ShaderTarget::Vertex);
    assert!(!result.ok);
    let undeclared = error_messages(&result.log)
        .iter()
        .filter(|m| m.contains("undeclared identifier 'q'"))
        .count();
    assert_eq!(undeclared, 1);
}

#[test]
fn sampler_state_statistics() {
    let result = compile(
        "sampler S = sampler_state{ Filter = MIN_MAG_MIP_LINEAR; AddressU = WRAP;\n\
         BorderColor = float4(1, 0, 0, 1); };\n\
         void main() {}\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    let state = result.statistics.sampler_states.get("S").unwrap();
    assert_eq!(state.border_color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn preprocessor_conditions_gate_declarations() {
    let present = compile_with(
        "#if (1<<3) > 4\nint x;\n#endif\nvoid main() {}\n",
        ShaderTarget::Vertex,
        Options {
            preprocess_only: true,
            ..Options::default()
        },
    );
    assert!(present.ok);
    assert!(present.glsl.contains('x'));

    let absent = compile_with(
        "#if (1<<3) > 40\nint x;\n#endif\nvoid main() {}\n",
        ShaderTarget::Vertex,
        Options {
            preprocess_only: true,
            ..Options::default()
        },
    );
    assert!(absent.ok);
    assert!(!absent.glsl.contains("int x"));
}

#[test]
fn macros_reach_statistics() {
    let result = compile(
        "#define SCALE 2.0\n#define BIAS 0.5\nvoid main() {}\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok);
    assert_eq!(result.statistics.macros, vec!["SCALE", "BIAS"]);
}

#[test]
fn constant_buffers_are_emitted_and_sorted() {
    let result = compile(
        "cbuffer PerFrame : register(b1) { float4x4 view; };\n\
         cbuffer PerObject : register(b0) { float4x4 world; };\n\
         void main() {}\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("layout(std140) uniform PerFrame"));
    // Bindings are sorted by slot.
    let slots: Vec<i32> = result
        .statistics
        .constant_buffers
        .iter()
        .map(|b| b.slot)
        .collect();
    assert_eq!(slots, vec![0, 1]);
    assert_eq!(result.statistics.constant_buffers[0].name, "PerObject");
}

#[test]
fn validate_only_discards_output() {
    let result = compile_with(
        "void main() {}",
        ShaderTarget::Vertex,
        Options::default().with_validate_only(),
    );
    assert!(result.ok);
    assert!(result.glsl.is_empty());
}

#[test]
fn show_times_emits_info_reports() {
    let result = compile_with(
        "void main() {}",
        ShaderTarget::Vertex,
        Options {
            show_times: true,
            ..Options::default()
        },
    );
    assert!(result.ok);
    let timings: Vec<&str> = result
        .log
        .reports
        .iter()
        .filter(|r| r.severity == Severity::Info && r.message.starts_with("timing"))
        .map(|r| r.message.as_str())
        .collect();
    assert_eq!(timings.len(), 5);
}

#[test]
fn optimizer_drops_unreachable_code() {
    let result = compile_with(
        "float f() { return 1.0; int unreachable = 0; }\n\
         void main() { float x = f(); }\n",
        ShaderTarget::Vertex,
        Options::default().with_optimize(),
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(!result.glsl.contains("unreachable"));
}

#[test]
fn includes_resolve_through_the_handler() {
    use xshade_driver::MemoryIncludeHandler;

    let mut handler = MemoryIncludeHandler::new();
    handler.insert("common.hlsl", "float4 tint;\n");

    let mut reader = "#include \"common.hlsl\"\nfloat4 main() : SV_Position { return tint; }\n"
        .as_bytes();
    let mut writer: Vec<u8> = Vec::new();
    let mut log = CollectingLog::new();

    let ok = compile_shader(
        ShaderInput {
            source_code: &mut reader,
            filename: "main.hlsl",
            entry_point: "main",
            shader_target: ShaderTarget::Vertex,
            shader_version: InputShaderVersion::Hlsl5,
            include_handler: Some(&mut handler),
            defines: Vec::new(),
        },
        ShaderOutput {
            source_code: &mut writer,
            shader_version: OutputShaderVersion::Glsl330,
            options: Options::default(),
            statistics: None,
        },
        &mut log,
    );
    assert!(ok, "reports: {:?}", log.reports);
    assert!(String::from_utf8(writer).unwrap().contains("tint"));
}

#[test]
fn missing_include_fails_compilation() {
    let result = compile(
        "#include \"not_there.hlsl\"\nvoid main() {}\n",
        ShaderTarget::Vertex,
    );
    assert!(!result.ok);
    assert!(error_messages(&result.log)
        .iter()
        .any(|m| m.contains("not_there.hlsl")));
}

#[test]
fn predefines_reach_the_preprocessor() {
    let mut reader = "#if QUALITY > 1\nfloat detail;\n#endif\nvoid main() {}\n".as_bytes();
    let mut writer: Vec<u8> = Vec::new();
    let mut log = CollectingLog::new();

    let ok = compile_shader(
        ShaderInput {
            source_code: &mut reader,
            filename: "main.hlsl",
            entry_point: "main",
            shader_target: ShaderTarget::Vertex,
            shader_version: InputShaderVersion::Hlsl5,
            include_handler: None,
            defines: vec![("QUALITY".to_string(), "2".to_string())],
        },
        ShaderOutput {
            source_code: &mut writer,
            shader_version: OutputShaderVersion::Glsl330,
            options: Options::default(),
            statistics: None,
        },
        &mut log,
    );
    assert!(ok, "reports: {:?}", log.reports);
    assert!(String::from_utf8(writer).unwrap().contains("detail"));
}

#[test]
fn warnings_do_not_gate_success() {
    let result = compile(
        "technique T { pass P { } }\nvoid main() {}\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok);
    assert!(result.log.has_severity(Severity::Warning));
}

#[test]
fn reserved_glsl_names_are_renamed() {
    // 'input' is a free identifier in HLSL but reserved in GLSL.
    let result = compile(
        "float4 input;\nvoid main() { float4 v = input; }\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("uniform vec4 xsh_input;"));
    assert!(result.glsl.contains("vec4 v = xsh_input;"));
    assert!(!result.glsl.contains("vec4 input;"));
}

#[test]
fn struct_output_flattens_to_interface() {
    let result = compile(
        "struct VS_OUT { float4 p : SV_Position; float2 uv : TEXCOORD0; };\n\
         VS_OUT main() { VS_OUT o; o.p = float4(0, 0, 0, 1); o.uv = float2(0, 0); return o; }\n",
        ShaderTarget::Vertex,
    );
    assert!(result.ok, "reports: {:?}", result.log.reports);
    assert!(result.glsl.contains("out vec2 uv;"));
    // The local is promoted to the output interface: its declaration
    // disappears and accesses rename onto the flattened outputs.
    assert!(!result.glsl.contains("VS_OUT o;"));
    assert!(result.glsl.contains("gl_Position = vec4(0, 0, 0, 1);"));
    assert!(result.glsl.contains("uv = vec2(0, 0);"));
}
