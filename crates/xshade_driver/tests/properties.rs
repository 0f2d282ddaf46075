//! Property tests for the universal invariants of the front-end.

use proptest::prelude::*;
use xshade_ast::{
    BinaryOp, ConstExprEvaluator, DataType, Expr, ExprKind, Program, ScalarType, StmtKind,
};
use xshade_common::{CollectingLog, ReportHandler, SourceArea};
use xshade_lexer::{Scanner, TokenKind};
use xshade_parser::Parser;

fn parse(source: &str) -> Option<Program> {
    let mut log = CollectingLog::new();
    let mut reports = ReportHandler::new(&mut log);
    let mut parser = Parser::new(source, "prop.hlsl", &mut reports).ok()?;
    let program = parser.parse_program().ok()?;
    if log
        .reports
        .iter()
        .any(|r| r.severity >= xshade_common::Severity::Error)
    {
        return None;
    }
    Some(program)
}

// -- Strategies --

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("not a keyword", |s| {
        xshade_lexer::keyword_kind(s).is_none() && s != "defined" && s != "main"
    })
}

/// Spellings that survive the spaced round-trip: identifiers, literals,
/// operators, punctuation.
fn token_spelling() -> impl Strategy<Value = String> {
    prop_oneof![
        ident(),
        (0u32..100000).prop_map(|n| n.to_string()),
        (0u32..1000, 1u32..1000).prop_map(|(a, b)| format!("{}.{}", a, b)),
        Just("float4".to_string()),
        Just("struct".to_string()),
        Just("return".to_string()),
        prop::sample::select(vec![
            "+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "<<", ">>",
            "=", "+=", "-=", "<<=", "(", ")", "[", "]", "{", "}", ",", ";", ":", ".", "?", "~",
            "!", "++", "--",
        ])
        .prop_map(str::to_string),
    ]
}

/// A small integer constant expression with its expected operator
/// structure left to the evaluator.
fn const_expr(depth: u32) -> BoxedStrategy<Expr> {
    let leaf = (1i64..64).prop_map(|value| {
        Expr::new(
            ExprKind::Literal {
                data_type: DataType::Scalar(ScalarType::Int),
                value: value.to_string(),
            },
            SourceArea::dummy(),
        )
    });
    if depth == 0 {
        return leaf.boxed();
    }
    let op = prop::sample::select(vec![
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::LShift,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
    ]);
    prop_oneof![
        3 => leaf,
        2 => (op, const_expr(depth - 1), const_expr(depth - 1)).prop_map(|(op, lhs, rhs)| {
            Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                SourceArea::dummy(),
            )
        }),
    ]
    .boxed()
}

proptest! {
    /// Token round-trip: joining spellings with spaces re-tokenizes to
    /// the same kind/spelling sequence.
    #[test]
    fn token_round_trip(spellings in prop::collection::vec(token_spelling(), 0..40)) {
        let source = spellings.join(" ");
        let tokenize = |text: &str| -> Option<Vec<(TokenKind, String)>> {
            Scanner::new(text, "prop")
                .tokenize()
                .ok()
                .map(|tokens| {
                    tokens
                        .into_iter()
                        .filter(|t| !t.is_trivia() && t.kind != TokenKind::EndOfStream)
                        .map(|t| (t.kind, t.spell))
                        .collect()
                })
        };
        let first = tokenize(&source);
        prop_assume!(first.is_some());
        let first = first.unwrap();
        let rejoined = first
            .iter()
            .map(|(_, spell)| spell.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = tokenize(&rejoined).expect("re-tokenization failed");
        prop_assert_eq!(first, second);
    }

    /// Constant-expression purity: evaluating twice yields identical
    /// variants, with no environment involved.
    #[test]
    fn const_expr_evaluation_is_pure(expr in const_expr(4)) {
        let first = ConstExprEvaluator::new().evaluate(&expr);
        let second = ConstExprEvaluator::new().evaluate(&expr);
        prop_assert_eq!(first, second);
    }

    /// Typedef visibility: inside the scope of a typedef the name parses
    /// as a cast target; as a plain variable it does not.
    #[test]
    fn typedef_visibility(name in ident()) {
        let cast_source = format!("typedef int {n}; void f() {{ ({n})-1; }}", n = name);
        let program = parse(&cast_source).expect("typedef program must parse");
        let func = program
            .global_stmts
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::FunctionDecl(f) if f.ident == "f" => Some(f),
                _ => None,
            })
            .unwrap();
        let body = func.body.as_ref().unwrap();
        match &body.stmts[0].kind {
            StmtKind::Expr(expr) => prop_assert!(
                matches!(expr.kind, ExprKind::Cast { .. }),
                "expected cast expression"
            ),
            other => prop_assert!(false, "expected expression statement, got {:?}", other),
        }

        let var_source = format!("int {n} = 0; void f() {{ ({n})-1; }}", n = name);
        let program = parse(&var_source).expect("variable program must parse");
        let func = program
            .global_stmts
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::FunctionDecl(f) if f.ident == "f" => Some(f),
                _ => None,
            })
            .unwrap();
        let body = func.body.as_ref().unwrap();
        match &body.stmts[0].kind {
            StmtKind::Expr(expr) => prop_assert!(
                matches!(expr.kind, ExprKind::Binary { .. }),
                "expected binary expression"
            ),
            other => prop_assert!(false, "expected expression statement, got {:?}", other),
        }
    }

    /// Scope balance: arbitrarily nested blocks parse and analyze with
    /// balanced scopes (the analyzer asserts depth 0 internally).
    #[test]
    fn nested_blocks_balance_scopes(depth in 0usize..12) {
        let mut body = String::from("int x = 0;");
        for _ in 0..depth {
            body = format!("{{ {} }}", body);
        }
        let source = format!("void f() {{ {} }}", body);
        let mut program = parse(&source).expect("nested blocks must parse");

        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let ctx = xshade_analysis::ShaderContext {
            entry_point: "f",
            target: xshade_common::ShaderTarget::Vertex,
            input_version: xshade_common::InputShaderVersion::Hlsl5,
            prefer_wrappers: false,
        };
        xshade_analysis::decorate_program(&mut program, &ctx, None, &mut reports);
        prop_assert!(!reports.has_errors());
    }

    /// Preprocessor-free programs with random declaration names keep
    /// parsing after a trip through the preprocessor.
    #[test]
    fn preprocessor_is_transparent_without_directives(names in prop::collection::vec(ident(), 1..6)) {
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        let source: String = unique
            .iter()
            .map(|n| format!("float {};\n", n))
            .collect();

        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let processed = xshade_preprocessor::Preprocessor::new()
            .process(&source, "prop.hlsl", &mut reports)
            .expect("preprocessing failed");

        let original = parse(&source).expect("original must parse");
        let roundtripped = parse(&processed).expect("preprocessed must parse");
        prop_assert_eq!(
            original.global_stmts.len(),
            roundtripped.global_stmts.len()
        );
    }
}
