//! The GLSL generator: walks the decorated AST and renders GLSL source.
//!
//! The entry point is rewritten to `void main()`: its parameters become
//! `in`/`out` globals, struct interfaces are flattened through their
//! member lists, and position/target return semantics map onto
//! `gl_Position` and an explicit fragment output.

use crate::keywords::*;
use crate::writer::CodeWriter;
use std::collections::HashMap;
use xshade_ast::*;
use xshade_common::{OutputShaderVersion, ShaderTarget};

/// The name of the synthesized fragment output variable.
const FRAGMENT_OUTPUT: &str = "xsh_fragColor";
/// The name of the clip wrapper function.
const CLIP_WRAPPER: &str = "xsh_clip";

pub struct GlslEmitter<'a> {
    writer: CodeWriter,
    version: OutputShaderVersion,
    target: ShaderTarget,
    program: &'a Program,
    structs: HashMap<String, &'a StructDecl>,
    /// Locals promoted to the output interface, keyed by variable name.
    /// Accesses through them rename onto the flattened outputs.
    aliases: HashMap<String, &'a StructDecl>,
    needs_clip_wrapper: bool,
    needs_fragment_output: bool,
}

/// Renders the decorated program as GLSL.
pub fn generate_glsl(
    program: &Program,
    target: ShaderTarget,
    version: OutputShaderVersion,
) -> String {
    let mut structs = HashMap::new();
    let mut aliases = HashMap::new();
    for stmt in &program.global_stmts {
        if let Some(decl) = struct_decl_of(stmt) {
            if let Some(name) = &decl.ident {
                structs.insert(name.clone(), decl);
            }
            if let Some(alias) = &decl.alias_name {
                aliases.insert(alias.clone(), decl);
            }
        }
    }

    let mut emitter = GlslEmitter {
        writer: CodeWriter::new(),
        version,
        target,
        program,
        structs,
        aliases,
        needs_clip_wrapper: program_uses_clip_wrapper(program),
        needs_fragment_output: false,
    };
    emitter.emit_program();
    emitter.writer.into_output()
}

fn struct_decl_of(stmt: &Stmt) -> Option<&StructDecl> {
    match &stmt.kind {
        StmtKind::StructDecl(decl) => Some(decl),
        StmtKind::VarDecl(var_stmt) => var_stmt.var_type.struct_decl.as_ref(),
        StmtKind::AliasDecl(alias_stmt) => alias_stmt.struct_decl.as_ref(),
        _ => None,
    }
}

fn program_uses_clip_wrapper(program: &Program) -> bool {
    fn in_stmt(stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Expr(expr) => in_expr(expr),
            StmtKind::CodeBlock(block) => block.stmts.iter().any(in_stmt),
            StmtKind::FunctionDecl(decl) => decl
                .body
                .as_ref()
                .is_some_and(|b| b.stmts.iter().any(in_stmt)),
            StmtKind::If {
                body, else_body, ..
            } => in_stmt(body) || else_body.as_deref().is_some_and(in_stmt),
            StmtKind::For { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. } => in_stmt(body),
            _ => false,
        }
    }
    fn in_expr(expr: &Expr) -> bool {
        matches!(
            &expr.kind,
            ExprKind::Call(call)
                if call.intrinsic == Some(Intrinsic::Clip) && !call.can_inline_wrapper
        )
    }
    program.global_stmts.iter().any(in_stmt)
}

impl<'a> GlslEmitter<'a> {
    fn emit_program(&mut self) {
        if let Some(version) = self.version.version_number() {
            self.writer.write_line(format!("#version {}", version));
        }
        self.writer.blank_line();

        if self.needs_clip_wrapper {
            self.writer
                .write_line(format!("void {}(float value)", CLIP_WRAPPER));
            self.writer.write_line("{");
            self.writer.push_indent();
            self.writer.write_line("if (value < 0.0)");
            self.writer.push_indent();
            self.writer.write_line("discard;");
            self.writer.pop_indent();
            self.writer.pop_indent();
            self.writer.write_line("}");
            self.writer.blank_line();
        }

        let program = self.program;
        for stmt in &program.global_stmts {
            self.emit_global_stmt(stmt);
        }
    }

    fn emit_global_stmt(&mut self, stmt: &Stmt) {
        if let Some(comment) = &stmt.comment {
            for line in comment.lines() {
                self.writer.write_line(format!("// {}", line));
            }
        }
        match &stmt.kind {
            // Type aliases are resolved during analysis.
            StmtKind::AliasDecl(alias_stmt) => {
                if let Some(decl) = &alias_stmt.struct_decl {
                    self.emit_struct_decl(decl);
                }
            }

            StmtKind::StructDecl(decl) => self.emit_struct_decl(decl),

            StmtKind::BufferDecl(buffer) => {
                self.writer
                    .write_line(format!("layout(std140) uniform {}", buffer.ident));
                self.writer.write_line("{");
                self.writer.push_indent();
                for member in &buffer.members {
                    self.emit_member_decl(member);
                }
                self.writer.pop_indent();
                self.writer.write_line("};");
                self.writer.blank_line();
            }

            StmtKind::TextureDecl(texture) => {
                let glsl_type = texture_type_to_glsl(texture.texture_type);
                for decl in &texture.decls {
                    self.writer
                        .write_line(format!("uniform {} {};", glsl_type, decl.ident));
                }
            }

            // Samplers fold into the combined GLSL sampler objects.
            StmtKind::SamplerDecl(_) => {}

            StmtKind::VarDecl(var_stmt) => self.emit_global_var_decl(var_stmt),

            StmtKind::FunctionDecl(decl) => {
                if decl.is_entry_point {
                    self.emit_entry_point(decl);
                } else {
                    self.emit_function_decl(decl);
                }
            }

            _ => {}
        }
    }

    fn emit_struct_decl(&mut self, decl: &StructDecl) {
        let Some(name) = &decl.ident else { return };
        self.writer
            .write_line(format!("struct {}", rename_reserved(name)));
        self.writer.write_line("{");
        self.writer.push_indent();
        for member in &decl.members {
            self.emit_member_decl(member);
        }
        self.writer.pop_indent();
        self.writer.write_line("};");
        self.writer.blank_line();
    }

    fn emit_member_decl(&mut self, member: &VarDeclStmt) {
        let glsl_type = type_denoter_to_glsl(&member.var_type.denoter);
        for decl in &member.var_decls {
            self.writer
                .write(format!("{} {}", glsl_type, rename_reserved(&decl.ident)));
            self.emit_array_dims(&decl.array_dims);
            self.writer.write(";");
            self.writer.end_line();
        }
    }

    fn emit_array_dims(&mut self, dims: &[Expr]) {
        for dim in dims {
            self.writer.write("[");
            if !matches!(dim.kind, ExprKind::Null) {
                let text = self.expr_to_string(dim);
                self.writer.write(text);
            }
            self.writer.write("]");
        }
    }

    fn emit_global_var_decl(&mut self, var_stmt: &VarDeclStmt) {
        let is_static = var_stmt.storage_classes.contains(&StorageClass::Static);
        let is_const = var_stmt.type_modifiers.contains(&TypeModifier::Const);
        let glsl_type = type_denoter_to_glsl(&var_stmt.var_type.denoter);

        for decl in &var_stmt.var_decls {
            if decl.flags.disable_codegen {
                continue;
            }
            let qualifier = if is_const {
                "const "
            } else if is_static || decl.initializer.is_some() {
                ""
            } else {
                "uniform "
            };
            self.writer.write(format!(
                "{}{} {}",
                qualifier,
                glsl_type,
                rename_reserved(&decl.ident)
            ));
            self.emit_array_dims(&decl.array_dims);
            if let Some(init) = &decl.initializer {
                let text = self.expr_to_string(init);
                self.writer.write(format!(" = {}", text));
            }
            self.writer.write(";");
            self.writer.end_line();
        }
    }

    // ----- Functions -----

    fn emit_function_decl(&mut self, decl: &FunctionDecl) {
        let return_type = type_denoter_to_glsl(&decl.return_type.denoter);
        let params: Vec<String> = decl
            .params
            .iter()
            .map(|param| {
                let qualifier = match param.input_modifier {
                    Some(InputModifier::Out) => "out ",
                    Some(InputModifier::InOut) => "inout ",
                    _ => "",
                };
                let glsl_type = type_denoter_to_glsl(&param.var_type.denoter);
                let name = rename_reserved(&param.var_decls[0].ident);
                format!("{}{} {}", qualifier, glsl_type, name)
            })
            .collect();

        self.writer.write_line(format!(
            "{} {}({})",
            return_type,
            rename_reserved(&decl.ident),
            params.join(", ")
        ));

        if let Some(body) = &decl.body {
            self.emit_code_block(body, None);
        } else {
            self.writer.write_line(";");
        }
        self.writer.blank_line();
    }

    fn emit_entry_point(&mut self, decl: &FunctionDecl) {
        // Flatten parameters into in/out globals.
        for param in &decl.params {
            let var = &param.var_decls[0];
            let base = &param.var_type.denoter;
            let output = param.is_output();
            let target = self.target;
            let is_builtin = move |semantic: &Option<IndexedSemantic>| {
                if output {
                    builtin_output(semantic, target).is_some()
                } else {
                    builtin_input(semantic).is_some()
                }
            };
            if let TypeDenoter::Struct(Some(name)) = base {
                let members: Vec<(String, String)> = self
                    .structs
                    .get(name.as_str())
                    .map(|s| {
                        s.members
                            .iter()
                            .flat_map(|m| {
                                let ty = type_denoter_to_glsl(&m.var_type.denoter);
                                m.var_decls
                                    .iter()
                                    .filter(|v| !is_builtin(&v.semantic))
                                    .map(move |v| (ty.clone(), rename_reserved(&v.ident)))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let direction = if output { "out" } else { "in" };
                for (ty, ident) in members {
                    self.writer
                        .write_line(format!("{} {} {};", direction, ty, ident));
                }
            } else if !is_builtin(&var.semantic) {
                let direction = if output { "out" } else { "in" };
                let glsl_type = type_denoter_to_glsl(base);
                self.writer.write_line(format!(
                    "{} {} {};",
                    direction,
                    glsl_type,
                    rename_reserved(&var.ident)
                ));
            }
        }

        // Fragment output and user-semantic outputs of the return value.
        let return_struct = match &decl.return_type.denoter {
            TypeDenoter::Struct(Some(name)) => self.structs.get(name.as_str()).copied(),
            _ => None,
        };
        if self.target == ShaderTarget::Fragment {
            self.needs_fragment_output = matches!(
                decl.semantic.as_ref().map(|s| &s.semantic),
                Some(Semantic::Target) | Some(Semantic::User(_))
            );
            if self.needs_fragment_output {
                self.writer
                    .write_line(format!("out vec4 {};", FRAGMENT_OUTPUT));
            }
        }
        if let Some(ret) = return_struct {
            for member in &ret.members {
                let ty = type_denoter_to_glsl(&member.var_type.denoter);
                for var in &member.var_decls {
                    if builtin_output(&var.semantic, self.target).is_none() {
                        self.writer
                            .write_line(format!("out {} {};", ty, rename_reserved(&var.ident)));
                    }
                }
            }
        }
        self.writer.blank_line();

        self.writer.write_line("void main()");
        self.writer.write_line("{");
        self.writer.push_indent();

        // Materialize struct parameters from the flattened inputs.
        for param in &decl.params {
            let var = &param.var_decls[0];
            if let TypeDenoter::Struct(Some(name)) = &param.var_type.denoter {
                self.writer.write_line(format!(
                    "{} {};",
                    rename_reserved(name),
                    rename_reserved(&var.ident)
                ));
                let assignments: Vec<String> = self
                    .structs
                    .get(name.as_str())
                    .map(|s| {
                        s.members
                            .iter()
                            .flat_map(|m| m.var_decls.iter())
                            .map(|member| {
                                let source = builtin_input(&member.semantic)
                                    .map(str::to_string)
                                    .unwrap_or_else(|| rename_reserved(&member.ident));
                                format!(
                                    "{}.{} = {};",
                                    rename_reserved(&var.ident),
                                    rename_reserved(&member.ident),
                                    source
                                )
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                for line in assignments {
                    self.writer.write_line(line);
                }
            }
        }

        if let Some(body) = &decl.body {
            for stmt in &body.stmts {
                self.emit_stmt(stmt, Some(decl));
            }
        }

        self.writer.pop_indent();
        self.writer.write_line("}");
    }

    fn emit_code_block(&mut self, block: &CodeBlock, entry: Option<&FunctionDecl>) {
        self.writer.write_line("{");
        self.writer.push_indent();
        for stmt in &block.stmts {
            self.emit_stmt(stmt, entry);
        }
        self.writer.pop_indent();
        self.writer.write_line("}");
    }

    // ----- Statements -----

    fn emit_stmt(&mut self, stmt: &Stmt, entry: Option<&FunctionDecl>) {
        match &stmt.kind {
            StmtKind::Null => self.writer.write_line(";"),

            StmtKind::CodeBlock(block) => self.emit_code_block(block, entry),

            StmtKind::VarDecl(var_stmt) => {
                let glsl_type = type_denoter_to_glsl(&var_stmt.var_type.denoter);
                for decl in &var_stmt.var_decls {
                    if decl.flags.disable_codegen {
                        continue;
                    }
                    self.writer
                        .write(format!("{} {}", glsl_type, rename_reserved(&decl.ident)));
                    self.emit_array_dims(&decl.array_dims);
                    if let Some(init) = &decl.initializer {
                        let text = self.expr_to_string(init);
                        self.writer.write(format!(" = {}", text));
                    }
                    self.writer.write(";");
                    self.writer.end_line();
                }
            }

            StmtKind::Expr(expr) => {
                let text = self.expr_to_string(expr);
                self.writer.write_line(format!("{};", text));
            }

            StmtKind::Return {
                expr,
                is_end_of_function,
            } => self.emit_return(expr.as_ref(), *is_end_of_function, entry),

            StmtKind::CtrlTransfer(transfer) => {
                self.writer.write_line(format!("{};", transfer.as_str()));
            }

            StmtKind::If {
                condition,
                body,
                else_body,
            } => {
                let cond = self.expr_to_string(condition);
                self.writer.write_line(format!("if ({})", cond));
                self.emit_nested_stmt(body, entry);
                if let Some(else_body) = else_body {
                    self.writer.write_line("else");
                    self.emit_nested_stmt(else_body, entry);
                }
            }

            StmtKind::For {
                init,
                condition,
                iteration,
                body,
            } => {
                let init_text = self.stmt_to_inline_string(init);
                let cond = condition
                    .as_ref()
                    .map(|c| self.expr_to_string(c))
                    .unwrap_or_default();
                let iter = iteration
                    .as_ref()
                    .map(|i| self.expr_to_string(i))
                    .unwrap_or_default();
                self.writer
                    .write_line(format!("for ({} {}; {})", init_text, cond, iter));
                self.emit_nested_stmt(body, entry);
            }

            StmtKind::While { condition, body } => {
                let cond = self.expr_to_string(condition);
                self.writer.write_line(format!("while ({})", cond));
                self.emit_nested_stmt(body, entry);
            }

            StmtKind::DoWhile { body, condition } => {
                self.writer.write_line("do");
                self.emit_nested_stmt(body, entry);
                let cond = self.expr_to_string(condition);
                self.writer.write_line(format!("while ({});", cond));
            }

            StmtKind::Switch { selector, cases } => {
                let selector = self.expr_to_string(selector);
                self.writer.write_line(format!("switch ({})", selector));
                self.writer.write_line("{");
                self.writer.push_indent();
                for case in cases {
                    match &case.expr {
                        Some(expr) => {
                            let label = self.expr_to_string(expr);
                            self.writer.write_line(format!("case {}:", label));
                        }
                        None => self.writer.write_line("default:"),
                    }
                    self.writer.push_indent();
                    for stmt in &case.stmts {
                        self.emit_stmt(stmt, entry);
                    }
                    self.writer.pop_indent();
                }
                self.writer.pop_indent();
                self.writer.write_line("}");
            }

            // Local structs and typedefs.
            StmtKind::StructDecl(decl) => self.emit_struct_decl(decl),
            StmtKind::AliasDecl(_) => {}
            StmtKind::SamplerDecl(_) => {}
            StmtKind::TextureDecl(_) => {}
            StmtKind::BufferDecl(_) => {}
            StmtKind::FunctionDecl(_) => {}
        }
    }

    fn emit_nested_stmt(&mut self, stmt: &Stmt, entry: Option<&FunctionDecl>) {
        match &stmt.kind {
            StmtKind::CodeBlock(block) => self.emit_code_block(block, entry),
            _ => {
                self.writer.push_indent();
                self.emit_stmt(stmt, entry);
                self.writer.pop_indent();
            }
        }
    }

    fn emit_return(
        &mut self,
        expr: Option<&Expr>,
        is_end_of_function: bool,
        entry: Option<&FunctionDecl>,
    ) {
        let Some(entry_decl) = entry else {
            match expr {
                Some(expr) => {
                    let text = self.expr_to_string(expr);
                    self.writer.write_line(format!("return {};", text));
                }
                // A trailing bare return in a void function is elided.
                None if is_end_of_function => {}
                None => self.writer.write_line("return;"),
            }
            return;
        };

        let Some(expr) = expr else {
            if !is_end_of_function {
                self.writer.write_line("return;");
            }
            return;
        };
        let text = self.expr_to_string(expr);

        // Returning an interface-aliased local: its members were already
        // written through the renamed accesses.
        let returns_alias = matches!(
            &expr.kind,
            ExprKind::VarAccess { var_ident, .. }
                if var_ident.next.is_none()
                    && self.aliases.contains_key(var_ident.ident.as_str())
        );
        if returns_alias {
            if !is_end_of_function {
                self.writer.write_line("return;");
            }
            return;
        }

        // Struct results distribute over the output interface.
        if let Some(TypeDenoter::Struct(Some(name))) = &expr.ty {
            if let Some(decl) = self.structs.get(name.as_str()).copied() {
                let mut lines = Vec::new();
                for member in &decl.members {
                    for var in &member.var_decls {
                        let member_name = rename_reserved(&var.ident);
                        let sink = builtin_output(&var.semantic, self.target)
                            .unwrap_or_else(|| member_name.clone());
                        lines.push(format!("{} = {}.{};", sink, text, member_name));
                    }
                }
                for line in lines {
                    self.writer.write_line(line);
                }
                if !is_end_of_function {
                    self.writer.write_line("return;");
                }
                return;
            }
        }

        match entry_decl.semantic.as_ref().map(|s| &s.semantic) {
            Some(Semantic::VertexPosition) => {
                self.writer.write_line(format!("gl_Position = {};", text));
            }
            Some(Semantic::Depth) => {
                self.writer.write_line(format!("gl_FragDepth = {};", text));
            }
            Some(Semantic::Target) | Some(Semantic::User(_)) => {
                self.writer
                    .write_line(format!("{} = {};", FRAGMENT_OUTPUT, text));
            }
            _ => {
                self.writer.write_line(format!("return {};", text));
                return;
            }
        }
        if !is_end_of_function {
            self.writer.write_line("return;");
        }
    }

    /// Renders a statement on a single line, for `for` initializers.
    fn stmt_to_inline_string(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::VarDecl(var_stmt) => {
                let glsl_type = type_denoter_to_glsl(&var_stmt.var_type.denoter);
                let decls: Vec<String> = var_stmt
                    .var_decls
                    .iter()
                    .map(|decl| match &decl.initializer {
                        Some(init) => format!(
                            "{} = {}",
                            rename_reserved(&decl.ident),
                            self.expr_to_string(init)
                        ),
                        None => rename_reserved(&decl.ident),
                    })
                    .collect();
                format!("{} {};", glsl_type, decls.join(", "))
            }
            StmtKind::Expr(expr) => format!("{};", self.expr_to_string(expr)),
            _ => ";".to_string(),
        }
    }

    // ----- Expressions -----

    fn expr_to_string(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Null => String::new(),

            ExprKind::List { first, next } => format!(
                "{}, {}",
                self.expr_to_string(first),
                self.expr_to_string(next)
            ),

            ExprKind::Literal { data_type, value } => {
                // Keep float literals recognizably floating point.
                if matches!(data_type.scalar_type(), Some(ScalarType::Float))
                    && !value.contains('.')
                    && !value.contains('e')
                    && !value.contains('E')
                {
                    format!("{}.0", value)
                } else {
                    value.clone()
                }
            }

            ExprKind::TypeName(denoter) => type_denoter_to_glsl(denoter),

            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => format!(
                "{} ? {} : {}",
                self.expr_to_string(condition),
                self.expr_to_string(then_expr),
                self.expr_to_string(else_expr)
            ),

            ExprKind::Binary { op, lhs, rhs } => format!(
                "{} {} {}",
                self.expr_to_string(lhs),
                op.as_str(),
                self.expr_to_string(rhs)
            ),

            ExprKind::Unary { op, expr } => {
                format!("{}{}", op.as_str(), self.expr_to_string(expr))
            }

            ExprKind::PostUnary { op, expr } => {
                format!("{}{}", self.expr_to_string(expr), op.as_str())
            }

            ExprKind::Call(call) => self.call_to_string(call),

            ExprKind::Bracket(inner) => format!("({})", self.expr_to_string(inner)),

            ExprKind::Suffix { expr, var_ident } => format!(
                "{}.{}",
                self.expr_to_string(expr),
                self.var_ident_to_string(var_ident)
            ),

            ExprKind::ArrayAccess { expr, indices } => {
                let mut text = self.expr_to_string(expr);
                for index in indices {
                    text.push('[');
                    text.push_str(&self.expr_to_string(index));
                    text.push(']');
                }
                text
            }

            ExprKind::Cast { target, expr } => {
                format!("{}({})", type_denoter_to_glsl(target), self.expr_to_string(expr))
            }

            ExprKind::VarAccess {
                var_ident,
                assign_op,
                assign_expr,
            } => {
                let mut text = self.var_ident_to_string(var_ident);
                if let (Some(op), Some(value)) = (assign_op, assign_expr) {
                    text.push(' ');
                    text.push_str(op.as_str());
                    text.push(' ');
                    text.push_str(&self.expr_to_string(value));
                }
                text
            }

            ExprKind::Initializer(exprs) => {
                let items: Vec<String> =
                    exprs.iter().map(|e| self.expr_to_string(e)).collect();
                // Use the computed type for a constructor when known.
                match &expr.ty {
                    Some(TypeDenoter::Base(data_type)) => {
                        format!("{}({})", data_type_to_glsl(*data_type), items.join(", "))
                    }
                    _ => format!("{{ {} }}", items.join(", ")),
                }
            }
        }
    }

    fn var_ident_to_string(&mut self, ident: &VarIdent) -> String {
        let mut text = String::new();
        let mut current = Some(ident);
        let mut first = true;

        // A member access through an interface-aliased local renames onto
        // the flattened output variable.
        if let (Some(decl), Some(member)) = (
            self.aliases.get(ident.ident.as_str()).copied(),
            ident.next.as_deref(),
        ) {
            if ident.array_indices.is_empty() {
                let semantic = decl
                    .members
                    .iter()
                    .flat_map(|m| m.var_decls.iter())
                    .find(|v| v.ident == member.ident)
                    .and_then(|v| builtin_output(&v.semantic, self.target));
                text.push_str(&semantic.unwrap_or_else(|| rename_reserved(&member.ident)));
                for index in &member.array_indices {
                    text.push('[');
                    text.push_str(&self.expr_to_string(index));
                    text.push(']');
                }
                current = member.next.as_deref();
                first = false;
            }
        }

        while let Some(node) = current {
            if !first {
                text.push('.');
            }
            first = false;
            text.push_str(&rename_reserved(&node.ident));
            for index in &node.array_indices {
                text.push('[');
                text.push_str(&self.expr_to_string(index));
                text.push(']');
            }
            current = node.next.as_deref();
        }
        text
    }

    fn call_to_string(&mut self, call: &FunctionCall) -> String {
        let args: Vec<String> = call.args.iter().map(|a| self.expr_to_string(a)).collect();

        if let Some(ctor) = &call.type_ctor {
            return format!("{}({})", type_denoter_to_glsl(ctor), args.join(", "));
        }

        if let Some(intrinsic) = call.intrinsic {
            return self.intrinsic_call_to_string(call, intrinsic, &args);
        }

        // User functions and pass-through method calls.
        let name = call
            .name
            .as_ref()
            .map(|n| self.var_ident_to_string(n))
            .unwrap_or_default();
        format!("{}({})", name, args.join(", "))
    }

    fn intrinsic_call_to_string(
        &mut self,
        call: &FunctionCall,
        intrinsic: Intrinsic,
        args: &[String],
    ) -> String {
        use Intrinsic as I;

        // Texture-object methods fold the object into the first argument.
        if intrinsic.is_texture_method() {
            let object = call
                .name
                .as_ref()
                .map(|n| rename_reserved(&n.ident))
                .unwrap_or_default();
            let rest: Vec<String> = match intrinsic {
                // Sample(sampler, coords, ...): the separate sampler
                // object disappears in GLSL.
                I::TextureSample2 | I::TextureSample3 | I::TextureSample4 | I::TextureSample5
                | I::TextureSampleBias3 | I::TextureSampleBias4 | I::TextureSampleBias5
                | I::TextureSampleBias6 | I::TextureSampleCmp3 | I::TextureSampleCmp4
                | I::TextureSampleCmp5 | I::TextureSampleCmp6 | I::TextureSampleGrad4
                | I::TextureSampleGrad5 | I::TextureSampleGrad6 | I::TextureSampleGrad7
                | I::TextureSampleLevel3 | I::TextureSampleLevel4 | I::TextureSampleLevel5 => {
                    args.iter().skip(1).cloned().collect()
                }
                _ => args.to_vec(),
            };
            let glsl_name = intrinsic_to_glsl(intrinsic).unwrap_or("texture");
            let mut all = vec![object];
            all.extend(rest);
            return format!("{}({})", glsl_name, all.join(", "));
        }

        match intrinsic {
            I::Saturate => format!("clamp({}, 0.0, 1.0)", args.join(", ")),
            I::Rcp => format!("(1.0 / ({}))", args.join(", ")),
            I::Log10 => format!("(log({}) / log(10.0))", args.join(", ")),
            I::Mad => {
                if let [a, b, c] = args {
                    format!("({} * {} + {})", a, b, c)
                } else {
                    format!("({})", args.join(", "))
                }
            }
            I::Mul => {
                if let [a, b] = args {
                    format!("({} * {})", a, b)
                } else {
                    format!("({})", args.join(", "))
                }
            }
            I::Clip => {
                if call.can_inline_wrapper {
                    format!("if (({}) < 0.0) discard", args.join(", "))
                } else {
                    format!("{}({})", CLIP_WRAPPER, args.join(", "))
                }
            }
            I::SinCos => format!("/* sincos */ ({})", args.join(", ")),
            other => match intrinsic_to_glsl(other) {
                Some(name) => format!("{}({})", name, args.join(", ")),
                None => {
                    let name = call
                        .name
                        .as_ref()
                        .map(|n| self.var_ident_to_string(n))
                        .unwrap_or_default();
                    format!("{}({})", name, args.join(", "))
                }
            },
        }
    }
}

/// The built-in variable an input member reads from, if any. The
/// vertex-position semantic addresses a plain attribute on the input
/// side, never `gl_Position`.
fn builtin_input(semantic: &Option<IndexedSemantic>) -> Option<&'static str> {
    let semantic = semantic.as_ref()?;
    if semantic.semantic == Semantic::VertexPosition {
        return None;
    }
    semantic_to_glsl(semantic)
}

/// The built-in (or synthesized) variable an output member writes to.
fn builtin_output(semantic: &Option<IndexedSemantic>, target: ShaderTarget) -> Option<String> {
    let semantic = semantic.as_ref()?;
    if target == ShaderTarget::Fragment && semantic.semantic == Semantic::Target {
        return Some(FRAGMENT_OUTPUT.to_string());
    }
    semantic_to_glsl(semantic).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_common::SourceArea;

    fn literal(value: &str) -> Expr {
        Expr::new(
            ExprKind::Literal {
                data_type: DataType::Scalar(ScalarType::Float),
                value: value.to_string(),
            },
            SourceArea::dummy(),
        )
    }

    #[test]
    fn version_header() {
        let program = Program::default();
        let glsl = generate_glsl(&program, ShaderTarget::Vertex, OutputShaderVersion::Glsl330);
        assert!(glsl.starts_with("#version 330"));
        let glsl = generate_glsl(&program, ShaderTarget::Vertex, OutputShaderVersion::Glsl);
        assert!(!glsl.contains("#version"));
    }

    #[test]
    fn float_literals_stay_floating() {
        let program = Program::default();
        let mut emitter = GlslEmitter {
            writer: CodeWriter::new(),
            version: OutputShaderVersion::Glsl330,
            target: ShaderTarget::Vertex,
            program: &program,
            structs: HashMap::new(),
            aliases: HashMap::new(),
            needs_clip_wrapper: false,
            needs_fragment_output: false,
        };
        // Parsing stripped the 'f' suffix from '1f'.
        assert_eq!(emitter.expr_to_string(&literal("1")), "1.0");
        assert_eq!(emitter.expr_to_string(&literal("1.5")), "1.5");
    }

    #[test]
    fn program_field_needed_by_emitter() {
        // The borrow in GlslEmitter is only read; a default program must
        // emit without panicking.
        let program = Program::default();
        let glsl = generate_glsl(&program, ShaderTarget::Fragment, OutputShaderVersion::Glsl130);
        assert!(glsl.contains("#version 130"));
    }
}
