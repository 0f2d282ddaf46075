//! Recursive-descent parser for HLSL.
//!
//! HLSL is not context free: `(X) - 1` is a binary expression when `X` is
//! a variable but a cast when `X` names a type. The parser therefore
//! keeps a scoped table of identifiers known to be type names (from
//! `typedef`, struct declarations, and the built-in aliases) and consults
//! it when a parenthesized expression could be a cast target.

mod error;
mod expr;
mod parser;
mod stmt;
mod types;

pub use error::*;
pub use parser::*;

#[cfg(test)]
mod tests {
    use crate::Parser;
    use xshade_ast::*;
    use xshade_common::{CollectingLog, ReportHandler, Severity};

    fn parse(source: &str) -> (Program, CollectingLog) {
        let mut log = CollectingLog::new();
        let program = {
            let mut reports = ReportHandler::new(&mut log);
            let mut parser = Parser::new(source, "test.hlsl", &mut reports).unwrap();
            parser.parse_program().unwrap()
        };
        (program, log)
    }

    /// Skips the pre-defined alias statements.
    fn user_stmts(program: &Program) -> Vec<&Stmt> {
        program.global_stmts.iter().filter(|s| s.span.is_valid()).collect()
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

    fn first_body_expr<'a>(func: &'a FunctionDecl) -> &'a Expr {
        match &func.body.as_ref().unwrap().stmts[0].kind {
            StmtKind::Expr(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn typedef_makes_bracket_a_cast() {
        let (program, log) = parse("typedef int X; void f(){ (X)-1; }");
        assert!(!log.has_severity(Severity::Error));

        let expr = first_body_expr(function(&program, "f"));
        match &expr.kind {
            ExprKind::Cast { target, expr } => {
                assert_eq!(*target, TypeDenoter::Alias("X".into()));
                match &expr.kind {
                    ExprKind::Unary { op, expr } => {
                        assert_eq!(*op, UnaryOp::Negate);
                        assert!(matches!(&expr.kind, ExprKind::Literal { value, .. } if value == "1"));
                    }
                    other => panic!("expected unary operand, got {:?}", other),
                }
            }
            other => panic!("expected cast expression, got {:?}", other),
        }
    }

    #[test]
    fn variable_makes_bracket_a_binary_expr() {
        let (program, log) = parse("int X = 0; void f(){ (X)-1; }");
        assert!(!log.has_severity(Severity::Error));

        let expr = first_body_expr(function(&program, "f"));
        match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(*op, BinaryOp::Sub);
                match &lhs.kind {
                    ExprKind::Bracket(inner) => {
                        assert!(matches!(
                            &inner.kind,
                            ExprKind::VarAccess { var_ident, .. } if var_ident.ident == "X"
                        ));
                    }
                    other => panic!("expected bracket, got {:?}", other),
                }
                assert!(matches!(&rhs.kind, ExprKind::Literal { value, .. } if value == "1"));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn typedef_visibility_is_scoped() {
        // X is a typedef only inside f's body.
        let (program, log) = parse("void f(){ typedef int X; (X)-1; } void g(){ int X = 0; (X)-1; }");
        assert!(!log.has_severity(Severity::Error));

        let in_scope = &function(&program, "f").body.as_ref().unwrap().stmts[1];
        assert!(matches!(
            &in_scope.kind,
            StmtKind::Expr(expr) if matches!(expr.kind, ExprKind::Cast { .. })
        ));

        let out_of_scope = first_body_expr(function(&program, "g"));
        assert!(matches!(out_of_scope.kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn struct_member_semantics() {
        let (program, log) = parse(
            "struct VS_IN { float4 p : POSITION; }; \
             float4 main(VS_IN i) : SV_Position { return i.p; }",
        );
        assert!(!log.has_severity(Severity::Error));

        let stmts = user_stmts(&program);
        let decl = match &stmts[0].kind {
            StmtKind::StructDecl(decl) => decl,
            other => panic!("expected struct declaration, got {:?}", other),
        };
        assert_eq!(decl.ident.as_deref(), Some("VS_IN"));
        let member = &decl.members[0].var_decls[0];
        assert_eq!(
            member.semantic.as_ref().unwrap().semantic,
            Semantic::Position
        );

        let func = function(&program, "main");
        assert_eq!(func.semantic.as_ref().unwrap().semantic, Semantic::Position);
        assert_eq!(func.params.len(), 1);
        assert_eq!(
            func.params[0].var_type.denoter,
            TypeDenoter::Struct(Some("VS_IN".into()))
        );
    }

    #[test]
    fn generic_vector_and_matrix_types() {
        let (program, log) = parse("vector<float, 3> v; matrix<int, 2, 2> m;");
        assert!(!log.has_severity(Severity::Error));

        let stmts = user_stmts(&program);
        match &stmts[0].kind {
            StmtKind::VarDecl(decl) => assert_eq!(
                decl.var_type.denoter,
                TypeDenoter::Base(DataType::Vector(ScalarType::Float, 3))
            ),
            other => panic!("expected var decl, got {:?}", other),
        }
        match &stmts[1].kind {
            StmtKind::VarDecl(decl) => assert_eq!(
                decl.var_type.denoter,
                TypeDenoter::Base(DataType::Matrix(ScalarType::Int, 2, 2))
            ),
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn cbuffer_with_register() {
        let (program, log) = parse("cbuffer Scene : register(b2) { float4x4 wvp; };");
        assert!(!log.has_severity(Severity::Error));

        let stmts = user_stmts(&program);
        match &stmts[0].kind {
            StmtKind::BufferDecl(decl) => {
                assert_eq!(decl.ident, "Scene");
                assert_eq!(decl.registers.len(), 1);
                assert_eq!(decl.registers[0].slot, 2);
                assert_eq!(
                    decl.registers[0].register_type,
                    RegisterType::ConstantBuffer
                );
                assert_eq!(decl.members.len(), 1);
            }
            other => panic!("expected buffer decl, got {:?}", other),
        }
    }

    #[test]
    fn texture_with_template_args() {
        let (program, log) = parse("Texture2D<float4> tex : register(t0);");
        assert!(!log.has_severity(Severity::Error));

        let stmts = user_stmts(&program);
        match &stmts[0].kind {
            StmtKind::TextureDecl(decl) => {
                assert_eq!(decl.texture_type, TextureType::Texture2D);
                assert_eq!(decl.color_type, Some(DataType::Vector(ScalarType::Float, 4)));
                assert_eq!(decl.decls[0].ident, "tex");
                assert_eq!(decl.decls[0].registers[0].slot, 0);
            }
            other => panic!("expected texture decl, got {:?}", other),
        }
    }

    #[test]
    fn techniques_are_skipped_with_warning() {
        let (program, log) = parse("technique T0 { pass P0 { } } float x;");
        assert!(!log.has_severity(Severity::Error));
        assert!(log
            .messages()
            .iter()
            .any(|m| m.contains("techniques are ignored")));
        assert_eq!(user_stmts(&program).len(), 1);
    }

    #[test]
    fn local_register_is_an_error() {
        let (_, log) = parse("void f(){ float4 c : register(c0); }");
        assert!(log
            .reports
            .iter()
            .any(|r| r.severity == Severity::Error
                && r.message.contains("semantics are not allowed in local scope")));
    }

    #[test]
    fn global_register_is_ignored_with_warning() {
        let (_, log) = parse("float4 c : register(c0);");
        assert!(!log.has_severity(Severity::Error));
        assert!(log
            .messages()
            .iter()
            .any(|m| m.contains("register is ignored for variable declarations")));
    }

    #[test]
    fn syntax_errors_recover_at_statement_boundaries() {
        let (program, log) = parse("float4 broken broken2 broken3 $; float ok;");
        assert!(log.has_severity(Severity::Error));
        // The following declaration still parses.
        let stmts = user_stmts(&program);
        assert!(stmts.iter().any(|s| matches!(
            &s.kind,
            StmtKind::VarDecl(decl) if decl.var_decls.iter().any(|v| v.ident == "ok")
        )));
    }

    #[test]
    fn texture_sample_call_parses() {
        let (program, log) = parse(
            "Texture2D tex; SamplerState smp; \
             float4 main(float2 uv : TEXCOORD0) : SV_Target { return tex.Sample(smp, uv); }",
        );
        assert!(!log.has_severity(Severity::Error));

        let func = function(&program, "main");
        let body = func.body.as_ref().unwrap();
        match &body.stmts[0].kind {
            StmtKind::Return { expr: Some(expr), .. } => match &expr.kind {
                ExprKind::Call(call) => {
                    let name = call.name.as_ref().unwrap();
                    assert_eq!(name.ident, "tex");
                    assert_eq!(name.next.as_ref().unwrap().ident, "Sample");
                    assert_eq!(call.args.len(), 2);
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected return statement, got {:?}", other),
        }
    }

    #[test]
    fn for_loop_with_attributes() {
        let (program, log) = parse("void f(){ [unroll] for (int i = 0; i < 4; i++) { } }");
        assert!(!log.has_severity(Severity::Error));

        let func = function(&program, "f");
        let stmt = &func.body.as_ref().unwrap().stmts[0];
        assert_eq!(stmt.attribs.len(), 1);
        assert_eq!(stmt.attribs[0].ident, "unroll");
        assert!(matches!(stmt.kind, StmtKind::For { .. }));
    }
}
