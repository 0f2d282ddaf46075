//! Opt-in AST cleanup pass.
//!
//! The optimizer may only delete nodes or flip enable/disable flags:
//! null statements disappear, and statements after a marked terminal
//! return are unreachable and dropped.

use xshade_ast::{CodeBlock, Program, Stmt, StmtKind};

pub fn optimize(program: &mut Program) {
    for stmt in &mut program.global_stmts {
        optimize_stmt(stmt);
    }
}

fn optimize_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::FunctionDecl(decl) => {
            if let Some(body) = &mut decl.body {
                optimize_block(body);
            }
        }
        StmtKind::CodeBlock(block) => optimize_block(block),
        StmtKind::If {
            body, else_body, ..
        } => {
            optimize_stmt(body);
            if let Some(else_body) = else_body {
                optimize_stmt(else_body);
            }
        }
        StmtKind::For { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. } => optimize_stmt(body),
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                for stmt in &mut case.stmts {
                    optimize_stmt(stmt);
                }
            }
        }
        _ => {}
    }
}

fn optimize_block(block: &mut CodeBlock) {
    block.stmts.retain(|stmt| !stmt.is_null());

    // Drop unreachable statements after a terminal return.
    if let Some(position) = block.stmts.iter().position(is_terminal_return) {
        block.stmts.truncate(position + 1);
    }

    for stmt in &mut block.stmts {
        optimize_stmt(stmt);
    }
}

fn is_terminal_return(stmt: &Stmt) -> bool {
    matches!(stmt.kind, StmtKind::Return { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_common::SourceArea;

    fn null_stmt() -> Stmt {
        Stmt::new(StmtKind::Null, SourceArea::dummy())
    }

    fn return_stmt() -> Stmt {
        Stmt::new(
            StmtKind::Return {
                expr: None,
                is_end_of_function: false,
            },
            SourceArea::dummy(),
        )
    }

    #[test]
    fn null_statements_are_removed() {
        let mut block = CodeBlock {
            stmts: vec![null_stmt(), return_stmt(), ],
            span: SourceArea::dummy(),
        };
        optimize_block(&mut block);
        assert_eq!(block.stmts.len(), 1);
    }

    #[test]
    fn unreachable_statements_are_removed() {
        let mut block = CodeBlock {
            stmts: vec![return_stmt(), return_stmt(), return_stmt()],
            span: SourceArea::dummy(),
        };
        optimize_block(&mut block);
        assert_eq!(block.stmts.len(), 1);
    }
}
