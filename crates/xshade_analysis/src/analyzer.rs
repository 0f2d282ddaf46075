//! The analyzer: walks the program in tree order, decorates the AST, and
//! reports errors and warnings through the shared report handler.

use crate::end_of_scope::mark_end_of_scopes;
use crate::sampler::harvest_sampler_state;
use crate::symbol_table::{Registered, Symbol, SymbolTable};
use std::collections::{BTreeMap, HashMap};
use xshade_ast::*;
use xshade_common::{
    codes, Binding, InputShaderVersion, ReportHandler, ShaderModel, ShaderTarget, Statistics,
};

/// Compilation parameters the analyzer depends on.
#[derive(Clone, Copy, Debug)]
pub struct ShaderContext<'a> {
    pub entry_point: &'a str,
    pub target: ShaderTarget,
    pub input_version: InputShaderVersion,
    pub prefer_wrappers: bool,
}

/// Struct layout captured while visiting declarations, used for member
/// lookup and cross-stage interface marking.
#[derive(Clone, Debug, Default)]
pub(crate) struct StructInfo {
    pub members: Vec<MemberInfo>,
    pub base: Option<String>,
    pub is_shader_input: bool,
    pub is_shader_output: bool,
    pub alias_name: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct MemberInfo {
    pub ident: String,
    pub ty: TypeDenoter,
    pub semantic: Option<IndexedSemantic>,
}

/// Decorates a parsed program for the given shader context. Diagnostics
/// go through `reports`; the run is successful iff no errors were added.
pub fn decorate_program(
    program: &mut Program,
    ctx: &ShaderContext,
    statistics: Option<&mut Statistics>,
    reports: &mut ReportHandler,
) {
    let mut analyzer = Analyzer {
        reports,
        symbols: SymbolTable::new(),
        structs: HashMap::new(),
        struct_stack: Vec::new(),
        call_stack: Vec::new(),
        func_decl_level: 0,
        entry_point_level: None,
        entry_point: ctx.entry_point.to_string(),
        target: ctx.target,
        shader_model: ctx.input_version.shader_model(),
        input_version: ctx.input_version,
        prefer_wrappers: ctx.prefer_wrappers,
        statistics,
        frag_coord_used: false,
        sm3_screen_space: false,
        entry_point_found: false,
        interface_alias_vars: Vec::new(),
        anonymous_counter: 0,
    };

    analyzer.symbols.open_scope();
    for stmt in &mut program.global_stmts {
        analyzer.visit_stmt(stmt);
    }
    analyzer.symbols.close_scope();

    debug_assert_eq!(analyzer.symbols.depth(), 0);

    // Write interface decorations gathered in the registry back onto the
    // struct nodes.
    let structs = analyzer.structs;
    for stmt in &mut program.global_stmts {
        copy_struct_decorations(stmt, &structs);
    }

    program.frag_coord_used = analyzer.frag_coord_used;
    program.sm3_screen_space = analyzer.sm3_screen_space;
    if analyzer.entry_point_found {
        program.entry_point = Some(ctx.entry_point.to_string());
    }
}

fn copy_struct_decorations(stmt: &mut Stmt, structs: &HashMap<String, StructInfo>) {
    let apply = |decl: &mut StructDecl| {
        if let Some(info) = decl.ident.as_ref().and_then(|name| structs.get(name)) {
            decl.is_shader_input = info.is_shader_input;
            decl.is_shader_output = info.is_shader_output;
            decl.alias_name = info.alias_name.clone();
        }
    };
    match &mut stmt.kind {
        StmtKind::StructDecl(decl) => apply(decl),
        StmtKind::VarDecl(var_stmt) => {
            if let Some(decl) = &mut var_stmt.var_type.struct_decl {
                apply(decl);
            }
        }
        StmtKind::AliasDecl(alias_stmt) => {
            if let Some(decl) = &mut alias_stmt.struct_decl {
                apply(decl);
            }
        }
        _ => {}
    }
}

pub(crate) struct Analyzer<'r, 'log, 's> {
    pub(crate) reports: &'r mut ReportHandler<'log>,
    pub(crate) symbols: SymbolTable,
    pub(crate) structs: HashMap<String, StructInfo>,
    /// One frame per enclosing struct declaration; system-value members
    /// are recorded in every frame.
    pub(crate) struct_stack: Vec<BTreeMap<String, String>>,
    /// Names of the function calls currently being analyzed.
    pub(crate) call_stack: Vec<String>,
    pub(crate) func_decl_level: usize,
    pub(crate) entry_point_level: Option<usize>,
    pub(crate) entry_point: String,
    pub(crate) target: ShaderTarget,
    pub(crate) shader_model: ShaderModel,
    pub(crate) input_version: InputShaderVersion,
    pub(crate) prefer_wrappers: bool,
    pub(crate) statistics: Option<&'s mut Statistics>,
    pub(crate) frag_coord_used: bool,
    pub(crate) sm3_screen_space: bool,
    pub(crate) entry_point_found: bool,
    /// Locals subsumed by an interface block in the entry point.
    pub(crate) interface_alias_vars: Vec<String>,
    anonymous_counter: u32,
}

impl<'r, 'log, 's> Analyzer<'r, 'log, 's> {
    pub(crate) fn inside_entry_point(&self) -> bool {
        self.entry_point_level == Some(self.func_decl_level)
    }

    // ----- Statements -----

    pub(crate) fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Null | StmtKind::CtrlTransfer(_) => {}

            StmtKind::CodeBlock(block) => self.visit_code_block(block),

            StmtKind::VarDecl(var_stmt) => self.visit_var_decl_stmt(var_stmt, None),

            StmtKind::BufferDecl(buffer) => self.visit_buffer_decl_stmt(buffer),

            StmtKind::TextureDecl(texture) => self.visit_texture_decl_stmt(texture),

            StmtKind::SamplerDecl(sampler) => self.visit_sampler_decl_stmt(sampler),

            StmtKind::StructDecl(decl) => {
                self.visit_struct_decl(decl);
            }

            StmtKind::AliasDecl(alias_stmt) => self.visit_alias_decl_stmt(alias_stmt),

            StmtKind::FunctionDecl(decl) => self.visit_function_decl(decl),

            StmtKind::For {
                init,
                condition,
                iteration,
                body,
            } => {
                self.warn_on_null_stmt(body, "for loop");
                self.symbols.open_scope();
                self.visit_stmt(init);
                if let Some(condition) = condition {
                    self.type_of_expr(condition);
                }
                if let Some(iteration) = iteration {
                    self.type_of_expr(iteration);
                }
                self.symbols.open_scope();
                self.visit_stmt(body);
                self.symbols.close_scope();
                self.symbols.close_scope();
            }

            StmtKind::While { condition, body } => {
                self.warn_on_null_stmt(body, "while loop");
                self.symbols.open_scope();
                self.type_of_expr(condition);
                self.visit_stmt(body);
                self.symbols.close_scope();
            }

            StmtKind::DoWhile { body, condition } => {
                self.warn_on_null_stmt(body, "do-while loop");
                self.symbols.open_scope();
                self.visit_stmt(body);
                self.type_of_expr(condition);
                self.symbols.close_scope();
            }

            StmtKind::If {
                condition,
                body,
                else_body,
            } => {
                self.warn_on_null_stmt(body, "if");
                self.symbols.open_scope();
                self.type_of_expr(condition);
                self.visit_stmt(body);
                self.symbols.close_scope();
                if let Some(else_body) = else_body {
                    self.warn_on_null_stmt(else_body, "else");
                    self.symbols.open_scope();
                    self.visit_stmt(else_body);
                    self.symbols.close_scope();
                }
            }

            StmtKind::Switch { selector, cases } => {
                self.symbols.open_scope();
                self.type_of_expr(selector);
                for case in cases.iter_mut() {
                    if let Some(expr) = &mut case.expr {
                        self.type_of_expr(expr);
                        self.require_constant(expr, "case label");
                    }
                    for stmt in &mut case.stmts {
                        self.visit_stmt(stmt);
                    }
                }
                self.symbols.close_scope();
            }

            StmtKind::Expr(expr) => {
                self.type_of_expr(expr);
                if !self.prefer_wrappers {
                    if let ExprKind::Call(call) = &mut expr.kind {
                        // The wrapper for 'clip' is trivially inlinable.
                        if call.intrinsic == Some(Intrinsic::Clip) {
                            call.can_inline_wrapper = true;
                        }
                    }
                }
            }

            StmtKind::Return { expr, .. } => {
                if let Some(expr) = expr {
                    self.type_of_expr(expr);
                    if self.inside_entry_point() {
                        self.analyze_entry_point_return(expr);
                    }
                }
            }
        }
    }

    pub(crate) fn visit_code_block(&mut self, block: &mut CodeBlock) {
        self.symbols.open_scope();
        for stmt in &mut block.stmts {
            self.visit_stmt(stmt);
        }
        self.symbols.close_scope();
    }

    fn warn_on_null_stmt(&mut self, stmt: &Stmt, construct: &str) {
        if stmt.is_null() {
            self.reports.warning(
                format!("<{}> statement with empty body", construct),
                Some(stmt.span),
            );
        }
    }

    /// Reports an error when the expression is not a compile-time
    /// constant.
    fn require_constant(&mut self, expr: &Expr, what: &str) {
        if let Err(err) = ConstExprEvaluator::new().evaluate(expr) {
            self.reports.error(
                format!("{} must be a constant expression ({})", what, err.message),
                Some(expr.span),
            );
        }
    }

    // ----- Declarations -----

    pub(crate) fn visit_var_decl_stmt(
        &mut self,
        stmt: &mut VarDeclStmt,
        buffer_ident: Option<&str>,
    ) {
        if let Some(struct_decl) = &mut stmt.var_type.struct_decl {
            let name = self.visit_struct_decl(struct_decl);
            // Anonymous inline structs receive a synthesized name so
            // variables of their type stay resolvable.
            if matches!(stmt.var_type.denoter, TypeDenoter::Struct(None)) {
                stmt.var_type.denoter = TypeDenoter::Struct(Some(name));
            }
        }

        let base_ty = self.resolve_denoter(&stmt.var_type.denoter, stmt.var_type.span);
        for decl in &mut stmt.var_decls {
            self.visit_var_decl(decl, &base_ty, buffer_ident);
        }
    }

    fn visit_var_decl(&mut self, decl: &mut VarDecl, base_ty: &TypeDenoter, buffer_ident: Option<&str>) {
        let dims = self.evaluate_array_dims(&mut decl.array_dims);
        let ty = TypeDenoter::array(base_ty.clone(), dims);

        if let Some(semantic) = &mut decl.semantic {
            Self::normalize_semantic(semantic, self.target);
            if semantic.is_system_value() {
                decl.flags.is_system_value = true;
                // Record the member in every enclosing structure.
                let name = semantic.semantic.name().to_string();
                for frame in &mut self.struct_stack {
                    frame.insert(name.clone(), decl.ident.clone());
                }
            }
        }

        if decl.pack_offset.is_some() && buffer_ident.is_none() {
            self.reports.error_with_code(
                "packoffset is only allowed in a constant buffer",
                Some(decl.span),
                codes::ERR_PACK_OFFSET_IN_INVALID_SCOPE,
            );
        }
        decl.buffer_ident = buffer_ident.map(str::to_string);

        match self.symbols.register(
            &decl.ident,
            Symbol::Variable {
                ty: ty.clone(),
                semantic: decl.semantic.clone(),
                buffer_ident: decl.buffer_ident.clone(),
            },
        ) {
            Ok(Registered::Shadowing) => self.reports.warning(
                format!("declaration of '{}' shadows a previous declaration", decl.ident),
                Some(decl.span),
            ),
            Ok(_) => {}
            Err(err) => {
                self.reports
                    .error_with_code(err.to_string(), Some(decl.span), codes::ERR_REDEFINITION)
            }
        }

        if let Some(init) = &mut decl.initializer {
            let init_ty = self.type_of_expr(init);
            let area = init.span;
            self.validate_type_cast(&init_ty, &ty, area);
        }
    }

    /// Evaluates declarator array dimensions; a null expression is a
    /// dynamic dimension.
    fn evaluate_array_dims(&mut self, dims: &mut [Expr]) -> Vec<Option<u64>> {
        let mut out = Vec::with_capacity(dims.len());
        for dim in dims.iter_mut() {
            if matches!(dim.kind, ExprKind::Null) {
                out.push(None);
                continue;
            }
            self.type_of_expr(dim);
            match ConstExprEvaluator::new().evaluate(dim) {
                Ok(value) => out.push(Some(value.to_int().max(0) as u64)),
                Err(err) => {
                    self.reports.error(
                        format!("array dimension must be constant ({})", err.message),
                        Some(dim.span),
                    );
                    out.push(None);
                }
            }
        }
        out
    }

    /// On the vertex stage a position semantic is rewritten so the
    /// back-end picks `gl_Position`.
    pub(crate) fn normalize_semantic(semantic: &mut IndexedSemantic, target: ShaderTarget) {
        if semantic.semantic == Semantic::Position && target == ShaderTarget::Vertex {
            semantic.semantic = Semantic::VertexPosition;
        }
    }

    /// Returns the struct's (possibly synthesized) name.
    pub(crate) fn visit_struct_decl(&mut self, decl: &mut StructDecl) -> String {
        if decl.is_nested && !decl.is_anonymous() {
            self.reports
                .error("nested structures must be anonymous", Some(decl.span));
        }

        if decl.ident.is_none() {
            self.anonymous_counter += 1;
            decl.ident = Some(format!("anonymous{}", self.anonymous_counter));
        }
        let name = decl.ident.clone().unwrap();

        if let Some(base) = &decl.base_name {
            if !self.structs.contains_key(base) {
                self.reports.error(
                    format!("undeclared base structure '{}'", base),
                    Some(decl.span),
                );
            } else if self.struct_base_chain_contains(base, &name) {
                self.reports.error(
                    format!("recursive inheritance in structure '{}'", name),
                    Some(decl.span),
                );
            }
        }

        if let Err(err) = self.symbols.register(&name, Symbol::Struct) {
            self.reports
                .error_with_code(err.to_string(), Some(decl.span), codes::ERR_REDEFINITION);
        }

        self.reports.push_context(decl.signature());
        self.struct_stack.push(BTreeMap::new());
        self.symbols.open_scope();
        for member in &mut decl.members {
            self.visit_var_decl_stmt(member, None);
        }
        self.symbols.close_scope();
        decl.system_values = self.struct_stack.pop().unwrap_or_default();
        self.reports.pop_context();

        if decl.num_members() == 0 {
            self.reports.warning(
                format!("'{}' is completely empty", decl.signature()),
                Some(decl.span),
            );
        }

        // Capture the layout for member lookup.
        let mut members = Vec::new();
        for member in &decl.members {
            let base_ty = self.resolve_denoter(&member.var_type.denoter, member.var_type.span);
            for var in &member.var_decls {
                members.push(MemberInfo {
                    ident: var.ident.clone(),
                    ty: base_ty.clone(),
                    semantic: var.semantic.clone(),
                });
            }
        }
        self.structs.insert(
            name.clone(),
            StructInfo {
                members,
                base: decl.base_name.clone(),
                ..StructInfo::default()
            },
        );

        name
    }

    fn struct_base_chain_contains(&self, start: &str, needle: &str) -> bool {
        let mut current = Some(start.to_string());
        let mut steps = 0;
        while let Some(name) = current {
            if name == needle {
                return true;
            }
            steps += 1;
            if steps > 64 {
                return true;
            }
            current = self.structs.get(&name).and_then(|info| info.base.clone());
        }
        false
    }

    fn visit_alias_decl_stmt(&mut self, stmt: &mut AliasDeclStmt) {
        if let Some(struct_decl) = &mut stmt.struct_decl {
            self.visit_struct_decl(struct_decl);
        }
        for alias in &mut stmt.aliases {
            let ty = self.resolve_denoter(&alias.denoter, alias.span);
            if let Err(err) = self.symbols.register(&alias.ident, Symbol::Alias { ty }) {
                self.reports
                    .error_with_code(err.to_string(), Some(alias.span), codes::ERR_REDEFINITION);
            }
        }
    }

    fn visit_buffer_decl_stmt(&mut self, buffer: &mut BufferDeclStmt) {
        if buffer.registers.len() > 1 {
            self.reports.error_with_code(
                "buffers can only be bound to one slot",
                Some(buffer.registers[1].span),
                codes::ERR_BIND_INVALID,
            );
        }
        for register in &buffer.registers {
            if register.target.is_some() {
                self.reports.error_with_code(
                    "user-defined constant buffer slots can not be target specific",
                    Some(register.span),
                    codes::ERR_TARGET_INVALID,
                );
            }
        }

        if let Some(statistics) = self.statistics.as_deref_mut() {
            let slot = buffer
                .registers
                .first()
                .map(|r| r.slot)
                .unwrap_or(-1);
            statistics.constant_buffers.push(Binding {
                name: buffer.ident.clone(),
                slot,
            });
        }

        self.reports.push_context(buffer.to_string());
        let buffer_ident = buffer.ident.clone();
        for member in &mut buffer.members {
            self.visit_var_decl_stmt(member, Some(&buffer_ident));
        }
        self.reports.pop_context();
    }

    fn visit_texture_decl_stmt(&mut self, stmt: &mut TextureDeclStmt) {
        for decl in &mut stmt.decls {
            if let Err(err) = self.symbols.register(
                &decl.ident,
                Symbol::Texture {
                    texture_type: stmt.texture_type,
                    color_type: stmt.color_type,
                },
            ) {
                self.reports
                    .error_with_code(err.to_string(), Some(decl.span), codes::ERR_REDEFINITION);
            }

            if let Some(statistics) = self.statistics.as_deref_mut() {
                let slot = decl.registers.first().map(|r| r.slot).unwrap_or(-1);
                statistics.textures.push(Binding {
                    name: decl.ident.clone(),
                    slot,
                });
            }
        }
    }

    fn visit_sampler_decl_stmt(&mut self, stmt: &mut SamplerDeclStmt) {
        for decl in &mut stmt.decls {
            if let Err(err) = self.symbols.register(&decl.ident, Symbol::Sampler) {
                self.reports
                    .error_with_code(err.to_string(), Some(decl.span), codes::ERR_REDEFINITION);
            }

            if !decl.values.is_empty() {
                let state = harvest_sampler_state(self, decl);
                if let Some(statistics) = self.statistics.as_deref_mut() {
                    statistics.sampler_states.insert(decl.ident.clone(), state);
                }
            }
        }
    }

    // ----- Functions -----

    fn visit_function_decl(&mut self, decl: &mut FunctionDecl) {
        self.reports.push_context(decl.signature());

        let is_entry_point = decl.ident == self.entry_point;

        if let Some(semantic) = &mut decl.semantic {
            Self::normalize_semantic(semantic, self.target);
        }

        if let Some(struct_decl) = &mut decl.return_type.struct_decl {
            let name = self.visit_struct_decl(struct_decl);
            if matches!(decl.return_type.denoter, TypeDenoter::Struct(None)) {
                decl.return_type.denoter = TypeDenoter::Struct(Some(name));
            }
        }
        let return_type = self.resolve_denoter(&decl.return_type.denoter, decl.return_type.span);

        let params: Vec<TypeDenoter> = decl
            .params
            .iter()
            .map(|p| self.resolve_denoter(&p.var_type.denoter, p.var_type.span))
            .collect();

        match self.symbols.register(
            &decl.ident,
            Symbol::Functions(vec![crate::symbol_table::FunctionSig {
                params,
                return_type,
                has_body: decl.body.is_some(),
            }]),
        ) {
            Ok(_) => {}
            Err(err) => self.reports.error_with_code(
                err.to_string(),
                Some(decl.span),
                codes::ERR_REDEFINITION,
            ),
        }

        self.symbols.open_scope();

        for param in &mut decl.params {
            self.visit_var_decl_stmt(param, None);
        }

        if is_entry_point {
            self.analyze_entry_point(decl);
        }

        self.func_decl_level += 1;
        if is_entry_point {
            self.entry_point_level = Some(self.func_decl_level);
        }
        if let Some(body) = &mut decl.body {
            self.visit_code_block(body);
        }
        if is_entry_point {
            self.entry_point_level = None;
        }
        self.func_decl_level -= 1;

        // Locals promoted to interface blocks must not be rendered.
        let aliased: Vec<String> = self.interface_alias_vars.drain(..).collect();
        if let Some(body) = &mut decl.body {
            for name in &aliased {
                disable_local_codegen(body, name);
            }
        }

        mark_end_of_scopes(decl);

        self.symbols.close_scope();
        self.reports.pop_context();
    }

    fn analyze_entry_point(&mut self, decl: &mut FunctionDecl) {
        self.entry_point_found = true;
        decl.is_entry_point = true;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        let params: Vec<(bool, bool)> = decl
            .params
            .iter()
            .map(|p| (p.is_input(), p.is_output()))
            .collect();

        for (param, (input, output)) in decl.params.iter_mut().zip(params) {
            if param.var_decls.len() != 1 {
                self.reports.error(
                    "invalid number of variable declarations in function parameter",
                    Some(param.span),
                );
                continue;
            }
            let base_ty = self.resolve_denoter(&param.var_type.denoter, param.var_type.span);
            let var = &mut param.var_decls[0];
            if input {
                self.analyze_entry_point_param(var, &base_ty, true, &mut inputs, &mut outputs);
            }
            if output {
                self.analyze_entry_point_param(var, &base_ty, false, &mut inputs, &mut outputs);
            }
        }

        // A struct return type marks that struct as shader output.
        let return_type = self.resolve_denoter(&decl.return_type.denoter, decl.return_type.span);
        if let TypeDenoter::Struct(Some(name)) = &return_type {
            self.mark_struct_io(name, "", false, &mut inputs, &mut outputs);
        } else if let Some(semantic) = &decl.semantic {
            if self.target == ShaderTarget::Fragment && semantic.semantic == Semantic::Target {
                if let Some(statistics) = self.statistics.as_deref_mut() {
                    statistics.fragment_targets.push(Binding {
                        name: decl.ident.clone(),
                        slot: semantic.index as i32,
                    });
                }
            }
        }

        decl.input_semantics = inputs;
        decl.output_semantics = outputs;

        // Pre-SM4 fragment inputs use the VPOS screen space.
        if self.target == ShaderTarget::Fragment && self.input_version <= InputShaderVersion::Hlsl3
        {
            self.sm3_screen_space = true;
        }
    }

    fn analyze_entry_point_param(
        &mut self,
        var: &mut VarDecl,
        ty: &TypeDenoter,
        input: bool,
        inputs: &mut Vec<String>,
        outputs: &mut Vec<String>,
    ) {
        if let TypeDenoter::Struct(Some(name)) = ty {
            let name = name.clone();
            let alias = var.ident.clone();
            self.mark_struct_io(&name, &alias, input, inputs, outputs);
            return;
        }

        match &var.semantic {
            Some(semantic) => {
                if semantic.is_system_value() {
                    var.flags.is_system_value = true;
                }
                if !input
                    && self.target == ShaderTarget::Fragment
                    && semantic.semantic == Semantic::Target
                {
                    if let Some(statistics) = self.statistics.as_deref_mut() {
                        statistics.fragment_targets.push(Binding {
                            name: var.ident.clone(),
                            slot: semantic.index as i32,
                        });
                    }
                }
            }
            None => {
                self.reports.error(
                    format!("missing semantic in parameter '{}' of entry point", var.ident),
                    Some(var.span),
                );
            }
        }

        if input {
            var.flags.is_shader_input = true;
            inputs.push(var.ident.clone());
        } else {
            var.flags.is_shader_output = true;
            outputs.push(var.ident.clone());
        }
    }

    /// Recursively marks a struct (and nested struct members) as shader
    /// input and/or output, flattening member names into the interface
    /// lists.
    fn mark_struct_io(
        &mut self,
        name: &str,
        alias: &str,
        input: bool,
        inputs: &mut Vec<String>,
        outputs: &mut Vec<String>,
    ) {
        let members = match self.structs.get_mut(name) {
            Some(info) => {
                if input {
                    info.is_shader_input = true;
                } else {
                    info.is_shader_output = true;
                }
                if !alias.is_empty() {
                    info.alias_name = Some(alias.to_string());
                }
                info.members.clone()
            }
            None => {
                self.reports.error(
                    format!("undeclared structure '{}' in entry point interface", name),
                    None,
                );
                return;
            }
        };

        for member in members {
            if let TypeDenoter::Struct(Some(nested)) = &member.ty {
                let nested = nested.clone();
                self.mark_struct_io(&nested, "", input, inputs, outputs);
                continue;
            }
            if input {
                inputs.push(member.ident.clone());
            } else {
                outputs.push(member.ident.clone());
                if self.target == ShaderTarget::Fragment {
                    if let Some(semantic) = &member.semantic {
                        if semantic.semantic == Semantic::Target {
                            if let Some(statistics) = self.statistics.as_deref_mut() {
                                statistics.fragment_targets.push(Binding {
                                    name: member.ident.clone(),
                                    slot: semantic.index as i32,
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    /// Returning a local struct variable from the entry point promotes
    /// that variable to the output interface block.
    fn analyze_entry_point_return(&mut self, expr: &mut Expr) {
        let ExprKind::VarAccess { var_ident, .. } = &expr.kind else {
            return;
        };
        if var_ident.next.is_some() {
            return;
        }
        let Some(symbol) = &var_ident.symbol else {
            return;
        };
        if symbol.kind != SymbolKind::Variable {
            return;
        }
        if let Some(TypeDenoter::Struct(Some(name))) = &symbol.ty {
            let name = name.clone();
            let alias = var_ident.ident.clone();
            if let Some(info) = self.structs.get_mut(&name) {
                info.alias_name = Some(alias.clone());
            }
            self.interface_alias_vars.push(alias);
        }
    }
}

/// Flags a local declaration so the back-end skips it.
fn disable_local_codegen(block: &mut CodeBlock, name: &str) {
    for stmt in &mut block.stmts {
        match &mut stmt.kind {
            StmtKind::VarDecl(var_stmt) => {
                for decl in &mut var_stmt.var_decls {
                    if decl.ident == name {
                        decl.flags.disable_codegen = true;
                    }
                }
            }
            StmtKind::CodeBlock(inner) => disable_local_codegen(inner, name),
            _ => {}
        }
    }
}
