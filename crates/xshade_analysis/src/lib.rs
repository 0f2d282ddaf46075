//! Semantic analysis: symbol resolution, type computation, entry-point
//! decoration, and intrinsic classification.

mod analyzer;
mod end_of_scope;
mod intrinsics;
mod sampler;
mod symbol_table;
mod typing;

pub use analyzer::*;
pub use intrinsics::*;
pub use symbol_table::*;

#[cfg(test)]
mod tests {
    use crate::{decorate_program, ShaderContext};
    use xshade_ast::*;
    use xshade_common::{
        CollectingLog, Filter, InputShaderVersion, ReportHandler, Severity, ShaderTarget,
        Statistics, TextureAddressMode,
    };
    use xshade_parser::Parser;

    fn vertex_ctx<'a>(entry_point: &'a str) -> ShaderContext<'a> {
        ShaderContext {
            entry_point,
            target: ShaderTarget::Vertex,
            input_version: InputShaderVersion::Hlsl5,
            prefer_wrappers: false,
        }
    }

    fn analyze_with(
        source: &str,
        ctx: &ShaderContext,
    ) -> (Program, Statistics, CollectingLog) {
        let mut log = CollectingLog::new();
        let mut statistics = Statistics::new();
        let program = {
            let mut reports = ReportHandler::new(&mut log);
            let mut parser = Parser::new(source, "test.hlsl", &mut reports).unwrap();
            let mut program = parser.parse_program().unwrap();
            decorate_program(&mut program, ctx, Some(&mut statistics), &mut reports);
            program
        };
        (program, statistics, log)
    }

    fn analyze(source: &str) -> (Program, Statistics, CollectingLog) {
        analyze_with(source, &vertex_ctx("main"))
    }

    fn errors(log: &CollectingLog) -> Vec<&str> {
        log.reports
            .iter()
            .filter(|r| r.severity >= Severity::Error)
            .map(|r| r.message.as_str())
            .collect()
    }

    fn function<'a>(program: &'a Program, name: &str) -> &'a FunctionDecl {
        program
            .global_stmts
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::FunctionDecl(f) if f.ident == name => Some(f),
                _ => None,
            })
            .unwrap_or_else(|| panic!("function '{}' not found", name))
    }

    fn struct_decl<'a>(program: &'a Program, name: &str) -> &'a StructDecl {
        program
            .global_stmts
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::StructDecl(d) if d.ident.as_deref() == Some(name) => Some(d),
                _ => None,
            })
            .unwrap_or_else(|| panic!("struct '{}' not found", name))
    }

    #[test]
    fn entry_point_semantics_are_harvested() {
        let (program, _, log) = analyze(
            "struct VS_IN { float4 p : POSITION; }; \
             float4 main(VS_IN i) : SV_Position { return i.p; }",
        );
        assert_eq!(errors(&log), Vec::<&str>::new());

        let decl = struct_decl(&program, "VS_IN");
        assert!(decl.is_shader_input);
        assert!(!decl.is_shader_output);
        assert_eq!(decl.system_values.get("POSITION").map(String::as_str), Some("p"));

        let main = function(&program, "main");
        assert!(main.is_entry_point);
        assert_eq!(main.input_semantics, vec!["p".to_string()]);
        // SV_Position is rewritten for the vertex stage.
        assert_eq!(
            main.semantic.as_ref().unwrap().semantic,
            Semantic::VertexPosition
        );
        assert_eq!(program.entry_point.as_deref(), Some("main"));
    }

    #[test]
    fn analysis_is_idempotent() {
        let source = "struct VS_IN { float4 p : POSITION; }; \
                      float4 main(VS_IN i) : SV_Position { return i.p; }";
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let mut parser = Parser::new(source, "test.hlsl", &mut reports).unwrap();
        let mut program = parser.parse_program().unwrap();

        decorate_program(&mut program, &vertex_ctx("main"), None, &mut reports);
        let once = format!("{:?}", program);
        decorate_program(&mut program, &vertex_ctx("main"), None, &mut reports);
        let twice = format!("{:?}", program);
        assert_eq!(once, twice);
    }

    #[test]
    fn intrinsic_overloads_resolve() {
        let (program, _, log) = analyze(
            "float4 c; \
             void main() { float s = dot(c, c); uint3 u = asuint(1.0, 2.0, 3.0); }",
        );
        assert_eq!(errors(&log), Vec::<&str>::new());

        let main = function(&program, "main");
        let body = main.body.as_ref().unwrap();
        let intrinsic_of = |stmt: &Stmt| -> Intrinsic {
            match &stmt.kind {
                StmtKind::VarDecl(decl) => {
                    match &decl.var_decls[0].initializer.as_ref().unwrap().kind {
                        ExprKind::Call(call) => call.intrinsic.unwrap(),
                        other => panic!("expected call initializer, got {:?}", other),
                    }
                }
                other => panic!("expected var decl, got {:?}", other),
            }
        };
        assert_eq!(intrinsic_of(&body.stmts[0]), Intrinsic::Dot);
        assert_eq!(intrinsic_of(&body.stmts[1]), Intrinsic::AsUint3);
    }

    #[test]
    fn unknown_identifier_reports_exactly_once() {
        let (_, _, log) = analyze("void f(){ q + 1; }");
        let errors = errors(&log);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("undeclared identifier 'q'"));
    }

    #[test]
    fn undeclared_identifier_in_call_context() {
        let (_, _, log) = analyze("float g(float v) { return v; } void f(){ g(q); }");
        let errors = errors(&log);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "undeclared identifier 'q' in call to 'g'");
    }

    #[test]
    fn sampler_state_is_harvested() {
        let (_, statistics, log) = analyze(
            "sampler S = sampler_state{ Filter = MIN_MAG_MIP_LINEAR; AddressU = WRAP; \
             BorderColor = float4(1, 0, 0, 1); };",
        );
        assert_eq!(errors(&log), Vec::<&str>::new());

        let state = statistics.sampler_states.get("S").expect("sampler state");
        assert_eq!(state.filter, Filter::MinMagMipLinear);
        assert_eq!(state.address_u, TextureAddressMode::Wrap);
        assert_eq!(state.border_color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn overload_resolution_is_deterministic() {
        let source = "float f(float v) { return v; } \
                      float f(float v, float w) { return v + w; } \
                      void main() { f(1.0); f(1.0, 2.0); }";
        let resolve = || {
            let (program, _, log) = analyze(source);
            assert_eq!(errors(&log), Vec::<&str>::new());
            let main = function(&program, "main");
            let body = main.body.as_ref().unwrap();
            body.stmts
                .iter()
                .map(|stmt| match &stmt.kind {
                    StmtKind::Expr(expr) => match &expr.kind {
                        ExprKind::Call(call) => call.resolved_overload.unwrap(),
                        other => panic!("expected call, got {:?}", other),
                    },
                    other => panic!("expected expression statement, got {:?}", other),
                })
                .collect::<Vec<_>>()
        };
        let first = resolve();
        let second = resolve();
        assert_eq!(first, second);
        assert_eq!(first, vec![0, 1]);
    }

    #[test]
    fn texture_method_misuse_is_reported() {
        let (_, _, log) = analyze(
            "Texture2D tex; void main() { tex.dot(1.0, 2.0); }",
        );
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("invalid intrinsic 'dot' for a texture object")));
    }

    #[test]
    fn unknown_texture_method_passes_through() {
        let (_, _, log) = analyze(
            "Texture2D tex; void main() { tex.FancyNewMethod(1.0); }",
        );
        assert_eq!(errors(&log), Vec::<&str>::new());
    }

    #[test]
    fn texture_sample_resolves_with_refinement() {
        let ctx = ShaderContext {
            entry_point: "main",
            target: ShaderTarget::Fragment,
            input_version: InputShaderVersion::Hlsl5,
            prefer_wrappers: false,
        };
        let (program, _, log) = analyze_with(
            "Texture2D tex; SamplerState smp; \
             float4 main(float2 uv : TEXCOORD0) : SV_Target \
             { return tex.Sample(smp, uv); }",
            &ctx,
        );
        assert_eq!(errors(&log), Vec::<&str>::new());

        let main = function(&program, "main");
        match &main.body.as_ref().unwrap().stmts[0].kind {
            StmtKind::Return { expr: Some(expr), .. } => match &expr.kind {
                ExprKind::Call(call) => {
                    assert_eq!(call.intrinsic, Some(Intrinsic::TextureSample2));
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn pre_sm4_fragment_position_sets_screen_space_flag() {
        let ctx = ShaderContext {
            entry_point: "main",
            target: ShaderTarget::Fragment,
            input_version: InputShaderVersion::Hlsl3,
            prefer_wrappers: false,
        };
        let (program, _, _) = analyze_with(
            "float4 main(float4 pos : VPOS) : COLOR0 { return pos; }",
            &ctx,
        );
        assert!(program.sm3_screen_space);
        assert!(program.frag_coord_used);
    }

    #[test]
    fn missing_entry_point_parameter_semantic_is_an_error() {
        let (_, _, log) = analyze("float4 main(float4 p) : SV_Position { return p; }");
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("missing semantic in parameter 'p' of entry point")));
    }

    #[test]
    fn buffer_slot_validation() {
        let (_, _, log) = analyze(
            "cbuffer B : register(b0) : register(b1) { float x; };",
        );
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("buffers can only be bound to one slot")));
    }

    #[test]
    fn packoffset_outside_cbuffer_is_an_error() {
        let (_, _, log) = analyze("float4 c : packoffset(c0); void main() {}");
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("packoffset is only allowed in a constant buffer")));
    }

    #[test]
    fn shader_model_warnings() {
        let ctx = ShaderContext {
            entry_point: "main",
            target: ShaderTarget::Fragment,
            input_version: InputShaderVersion::Hlsl3,
            prefer_wrappers: false,
        };
        let (_, _, log) = analyze_with(
            "void main() { uint bits = countbits(3u); }",
            &ctx,
        );
        assert!(log
            .messages()
            .iter()
            .any(|m| m.contains("requires shader model 5.0")));
    }

    #[test]
    fn truncation_warns_but_mismatch_errors() {
        let (_, _, log) = analyze("float4 v4; void main() { float2 v2 = v4; }");
        assert!(log
            .messages()
            .iter()
            .any(|m| m.contains("implicit truncation")));
        assert!(!log.has_severity(Severity::Error));

        let (_, _, log) = analyze("float2 v2; void main() { float4 v4 = v2; }");
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("cannot implicitly convert")));
    }

    #[test]
    fn struct_casts_require_exact_match() {
        let (_, _, log) = analyze(
            "struct A { float x; }; struct B { float x; }; \
             void main() { A a; B b = (B)a; }",
        );
        assert!(errors(&log).iter().any(|m| m.contains("cannot cast")));
    }

    #[test]
    fn nested_named_structs_are_diagnosed() {
        let (_, _, log) = analyze("struct Outer { struct Inner { float x; } member; };");
        assert!(errors(&log)
            .iter()
            .any(|m| m.contains("nested structures must be anonymous")));
    }

    #[test]
    fn returning_local_struct_records_interface_alias() {
        let (program, _, log) = analyze(
            "struct VS_OUT { float4 p : SV_Position; }; \
             VS_OUT main() { VS_OUT o; o.p = float4(0, 0, 0, 1); return o; }",
        );
        assert_eq!(errors(&log), Vec::<&str>::new());

        let decl = struct_decl(&program, "VS_OUT");
        assert!(decl.is_shader_output);
        assert_eq!(decl.alias_name.as_deref(), Some("o"));

        // The local is subsumed by the interface block.
        let main = function(&program, "main");
        let body = main.body.as_ref().unwrap();
        match &body.stmts[0].kind {
            StmtKind::VarDecl(var_stmt) => {
                assert!(var_stmt.var_decls[0].flags.disable_codegen);
            }
            other => panic!("expected var decl, got {:?}", other),
        }
    }
}
