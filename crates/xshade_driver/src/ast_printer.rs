//! Indented AST dump, submitted as Info reports.

use xshade_ast::*;
use xshade_common::ReportHandler;

pub fn print_ast(program: &Program, reports: &mut ReportHandler) {
    let mut printer = AstPrinter {
        lines: Vec::new(),
        depth: 0,
    };
    for stmt in &program.global_stmts {
        printer.print_stmt(stmt);
    }
    for line in printer.lines {
        reports.info(line);
    }
}

struct AstPrinter {
    lines: Vec<String>,
    depth: usize,
}

impl AstPrinter {
    fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", "  ".repeat(self.depth), text.as_ref()));
    }

    fn nested(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.line(header);
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Null => self.line("NullStmt"),
            StmtKind::CodeBlock(block) => {
                self.nested("CodeBlockStmt", |p| {
                    for stmt in &block.stmts {
                        p.print_stmt(stmt);
                    }
                });
            }
            StmtKind::VarDecl(var_stmt) => {
                let names: Vec<&str> =
                    var_stmt.var_decls.iter().map(|d| d.ident.as_str()).collect();
                self.nested(
                    format!(
                        "VarDeclStmt '{}' : {}",
                        names.join(", "),
                        var_stmt.var_type.denoter
                    ),
                    |p| {
                        for decl in &var_stmt.var_decls {
                            if let Some(init) = &decl.initializer {
                                p.print_expr(init);
                            }
                        }
                    },
                );
            }
            StmtKind::BufferDecl(buffer) => {
                self.nested(format!("BufferDeclStmt '{}'", buffer.ident), |p| {
                    for member in &buffer.members {
                        let names: Vec<&str> =
                            member.var_decls.iter().map(|d| d.ident.as_str()).collect();
                        p.line(format!("Member '{}'", names.join(", ")));
                    }
                });
            }
            StmtKind::TextureDecl(texture) => {
                for decl in &texture.decls {
                    self.line(format!("TextureDecl '{}'", decl.ident));
                }
            }
            StmtKind::SamplerDecl(sampler) => {
                for decl in &sampler.decls {
                    self.line(format!("SamplerDecl '{}'", decl.ident));
                }
            }
            StmtKind::StructDecl(decl) => self.print_struct(decl),
            StmtKind::AliasDecl(alias_stmt) => {
                for alias in &alias_stmt.aliases {
                    self.line(format!("AliasDecl '{}' = {}", alias.ident, alias.denoter));
                }
            }
            StmtKind::FunctionDecl(decl) => {
                let mut header = format!("FunctionDecl '{}'", decl.ident);
                if decl.is_entry_point {
                    header.push_str(" (entry point)");
                }
                self.nested(header, |p| {
                    if let Some(body) = &decl.body {
                        for stmt in &body.stmts {
                            p.print_stmt(stmt);
                        }
                    }
                });
            }
            StmtKind::For { body, .. } => self.nested("ForLoopStmt", |p| p.print_stmt(body)),
            StmtKind::While { body, .. } => self.nested("WhileLoopStmt", |p| p.print_stmt(body)),
            StmtKind::DoWhile { body, .. } => {
                self.nested("DoWhileLoopStmt", |p| p.print_stmt(body))
            }
            StmtKind::If {
                body, else_body, ..
            } => {
                self.nested("IfStmt", |p| {
                    p.print_stmt(body);
                    if let Some(else_body) = else_body {
                        p.nested("ElseStmt", |p| p.print_stmt(else_body));
                    }
                });
            }
            StmtKind::Switch { cases, .. } => {
                self.nested("SwitchStmt", |p| {
                    for case in cases {
                        p.nested("SwitchCase", |p| {
                            for stmt in &case.stmts {
                                p.print_stmt(stmt);
                            }
                        });
                    }
                });
            }
            StmtKind::Expr(expr) => self.nested("ExprStmt", |p| p.print_expr(expr)),
            StmtKind::Return { expr, .. } => {
                self.nested("ReturnStmt", |p| {
                    if let Some(expr) = expr {
                        p.print_expr(expr);
                    }
                });
            }
            StmtKind::CtrlTransfer(transfer) => {
                self.line(format!("CtrlTransferStmt '{}'", transfer.as_str()))
            }
        }
    }

    fn print_struct(&mut self, decl: &StructDecl) {
        self.nested(decl.signature(), |p| {
            for member in &decl.members {
                for var in &member.var_decls {
                    let semantic = var
                        .semantic
                        .as_ref()
                        .map(|s| format!(" : {}", s))
                        .unwrap_or_default();
                    p.line(format!(
                        "Member '{}' : {}{}",
                        var.ident, member.var_type.denoter, semantic
                    ));
                }
            }
        });
    }

    fn print_expr(&mut self, expr: &Expr) {
        let ty = expr
            .ty
            .as_ref()
            .map(|t| format!(" <{}>", t))
            .unwrap_or_default();
        match &expr.kind {
            ExprKind::Null => self.line("NullExpr"),
            ExprKind::List { first, next } => {
                self.nested("ListExpr", |p| {
                    p.print_expr(first);
                    p.print_expr(next);
                });
            }
            ExprKind::Literal { value, .. } => {
                self.line(format!("LiteralExpr '{}'{}", value, ty))
            }
            ExprKind::TypeName(denoter) => self.line(format!("TypeNameExpr '{}'", denoter)),
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.nested("TernaryExpr", |p| {
                    p.print_expr(condition);
                    p.print_expr(then_expr);
                    p.print_expr(else_expr);
                });
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.nested(format!("BinaryExpr '{}'{}", op, ty), |p| {
                    p.print_expr(lhs);
                    p.print_expr(rhs);
                });
            }
            ExprKind::Unary { op, expr } => {
                self.nested(format!("UnaryExpr '{}'", op), |p| p.print_expr(expr));
            }
            ExprKind::PostUnary { op, expr } => {
                self.nested(format!("PostUnaryExpr '{}'", op), |p| p.print_expr(expr));
            }
            ExprKind::Call(call) => {
                let name = call
                    .name
                    .as_ref()
                    .map(|n| n.full_name())
                    .or_else(|| call.type_ctor.as_ref().map(|t| t.to_string()))
                    .unwrap_or_default();
                let intrinsic = call
                    .intrinsic
                    .map(|i| format!(" [{:?}]", i))
                    .unwrap_or_default();
                self.nested(format!("FunctionCallExpr '{}'{}", name, intrinsic), |p| {
                    for arg in &call.args {
                        p.print_expr(arg);
                    }
                });
            }
            ExprKind::Bracket(inner) => self.nested("BracketExpr", |p| p.print_expr(inner)),
            ExprKind::Suffix { expr, var_ident } => {
                self.nested(format!("SuffixExpr '{}'", var_ident.full_name()), |p| {
                    p.print_expr(expr)
                });
            }
            ExprKind::ArrayAccess { expr, indices } => {
                self.nested("ArrayAccessExpr", |p| {
                    p.print_expr(expr);
                    for index in indices {
                        p.print_expr(index);
                    }
                });
            }
            ExprKind::Cast { target, expr } => {
                self.nested(format!("CastExpr '{}'", target), |p| p.print_expr(expr));
            }
            ExprKind::VarAccess {
                var_ident,
                assign_expr,
                ..
            } => {
                self.nested(
                    format!("VarAccessExpr '{}'{}", var_ident.full_name(), ty),
                    |p| {
                        if let Some(assign) = assign_expr {
                            p.print_expr(assign);
                        }
                    },
                );
            }
            ExprKind::Initializer(exprs) => {
                self.nested("InitializerExpr", |p| {
                    for expr in exprs {
                        p.print_expr(expr);
                    }
                });
            }
        }
    }
}
