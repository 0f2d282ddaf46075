//! Marks the terminal statement of function bodies so the back-end can
//! elide a trailing `return;` on void functions.

use xshade_ast::{CodeBlock, FunctionDecl, Stmt, StmtKind};

pub(crate) fn mark_end_of_scopes(decl: &mut FunctionDecl) {
    if let Some(body) = &mut decl.body {
        mark_block(body);
    }
}

fn mark_block(block: &mut CodeBlock) {
    if let Some(last) = block.stmts.last_mut() {
        mark_stmt(last);
    }
}

fn mark_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Return {
            is_end_of_function, ..
        } => *is_end_of_function = true,
        StmtKind::CodeBlock(block) => mark_block(block),
        // Both branches end the function when the conditional is last.
        StmtKind::If {
            body, else_body, ..
        } => {
            mark_stmt(body);
            if let Some(else_body) = else_body {
                mark_stmt(else_body);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_ast::*;
    use xshade_common::SourceArea;

    fn return_stmt() -> Stmt {
        Stmt::new(
            StmtKind::Return {
                expr: None,
                is_end_of_function: false,
            },
            SourceArea::dummy(),
        )
    }

    fn function_with(stmts: Vec<Stmt>) -> FunctionDecl {
        FunctionDecl {
            attribs: Vec::new(),
            return_type: VarType::new(TypeDenoter::Void, SourceArea::dummy()),
            ident: "f".into(),
            params: Vec::new(),
            semantic: None,
            body: Some(CodeBlock {
                stmts,
                span: SourceArea::dummy(),
            }),
            span: SourceArea::dummy(),
            is_entry_point: false,
            input_semantics: Vec::new(),
            output_semantics: Vec::new(),
        }
    }

    #[test]
    fn trailing_return_is_marked() {
        let mut func = function_with(vec![
            Stmt::new(StmtKind::Null, SourceArea::dummy()),
            return_stmt(),
        ]);
        mark_end_of_scopes(&mut func);
        let last = func.body.as_ref().unwrap().stmts.last().unwrap();
        assert!(matches!(
            last.kind,
            StmtKind::Return {
                is_end_of_function: true,
                ..
            }
        ));
    }

    #[test]
    fn non_trailing_return_is_not_marked() {
        let mut func = function_with(vec![
            return_stmt(),
            Stmt::new(StmtKind::Null, SourceArea::dummy()),
        ]);
        mark_end_of_scopes(&mut func);
        let first = &func.body.as_ref().unwrap().stmts[0];
        assert!(matches!(
            first.kind,
            StmtKind::Return {
                is_end_of_function: false,
                ..
            }
        ));
    }

    #[test]
    fn both_if_branches_are_marked() {
        let body = Stmt::new(
            StmtKind::If {
                condition: Expr::new(
                    ExprKind::Literal {
                        data_type: DataType::Scalar(ScalarType::Bool),
                        value: "true".into(),
                    },
                    SourceArea::dummy(),
                ),
                body: Box::new(return_stmt()),
                else_body: Some(Box::new(return_stmt())),
            },
            SourceArea::dummy(),
        );
        let mut func = function_with(vec![body]);
        mark_end_of_scopes(&mut func);
        match &func.body.as_ref().unwrap().stmts[0].kind {
            StmtKind::If {
                body, else_body, ..
            } => {
                assert!(matches!(
                    body.kind,
                    StmtKind::Return {
                        is_end_of_function: true,
                        ..
                    }
                ));
                assert!(matches!(
                    else_body.as_ref().unwrap().kind,
                    StmtKind::Return {
                        is_end_of_function: true,
                        ..
                    }
                ));
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }
}
