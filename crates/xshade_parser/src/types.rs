//! Type denoters, struct declarations, resource declaration statements,
//! and register/packoffset bindings.

use crate::{ParseError, ParseResult, Parser, ParsingState};
use xshade_ast::*;
use xshade_common::{ShaderTarget, SourceArea};
use xshade_lexer::TokenKind;

// https://msdn.microsoft.com/en-us/library/windows/desktop/bb509709#Profiles
fn shader_profile_to_target(profile: &str) -> Option<ShaderTarget> {
    match profile.get(..2)? {
        "vs" => Some(ShaderTarget::Vertex),
        "ps" => Some(ShaderTarget::Fragment),
        "gs" => Some(ShaderTarget::Geometry),
        "hs" => Some(ShaderTarget::TessControl),
        "ds" => Some(ShaderTarget::TessEval),
        "cs" => Some(ShaderTarget::Compute),
        _ => None,
    }
}

impl<'src, 'r, 'log> Parser<'src, 'r, 'log> {
    // ----- Type denoters -----

    pub(crate) fn parse_var_type(&mut self, allow_void: bool) -> ParseResult<VarType> {
        let span = self.current.area;
        let mut struct_decl = None;
        let denoter = self.parse_type_denoter_with_struct_decl(&mut struct_decl, allow_void)?;
        Ok(VarType {
            denoter,
            struct_decl,
            span,
        })
    }

    pub(crate) fn parse_type_denoter_with_struct_decl(
        &mut self,
        struct_decl: &mut Option<StructDecl>,
        allow_void: bool,
    ) -> ParseResult<TypeDenoter> {
        if self.is(TokenKind::Struct) {
            self.accept_it()?;

            if self.is(TokenKind::LBrace) {
                let decl = self.parse_struct_decl_body(None)?;
                let denoter = struct_type_denoter(&decl);
                *struct_decl = Some(decl);
                return Ok(denoter);
            }

            let ident = self.accept(TokenKind::Ident)?;
            if self.is(TokenKind::LBrace) || self.is(TokenKind::Colon) {
                let decl = self.parse_struct_decl_body(Some(ident))?;
                let denoter = struct_type_denoter(&decl);
                *struct_decl = Some(decl);
                Ok(denoter)
            } else {
                Ok(TypeDenoter::Struct(Some(ident.spell)))
            }
        } else {
            self.parse_type_denoter(allow_void)
        }
    }

    pub(crate) fn parse_type_denoter(&mut self, allow_void: bool) -> ParseResult<TypeDenoter> {
        if self.is(TokenKind::Void) {
            if !allow_void {
                return Err(ParseError::syntax(
                    "'void' type not allowed in this context",
                    self.current.area,
                ));
            }
            self.accept_it()?;
            return Ok(TypeDenoter::Void);
        }

        let primary = self.parse_type_denoter_primary()?;

        if self.is(TokenKind::LBracket) {
            let dims = self.parse_evaluated_array_dims()?;
            return Ok(TypeDenoter::array(primary, dims));
        }
        Ok(primary)
    }

    fn parse_type_denoter_primary(&mut self) -> ParseResult<TypeDenoter> {
        match self.current.kind {
            TokenKind::ScalarType
            | TokenKind::VectorType
            | TokenKind::MatrixType
            | TokenKind::StringType => self.parse_base_type_denoter(),
            TokenKind::Vector => self.parse_generic_vector_type_denoter(),
            TokenKind::Matrix => self.parse_generic_matrix_type_denoter(),
            TokenKind::Ident => {
                let ident = self.accept_it()?;
                Ok(TypeDenoter::Alias(ident.spell))
            }
            TokenKind::Struct => {
                self.accept_it()?;
                let ident = self.accept(TokenKind::Ident)?;
                Ok(TypeDenoter::Struct(Some(ident.spell)))
            }
            TokenKind::Texture => {
                let token = self.accept_it()?;
                let texture_type = TextureType::from_keyword(&token.spell)
                    .ok_or_else(|| ParseError::syntax("unknown texture type", token.area))?;
                Ok(TypeDenoter::Texture(texture_type))
            }
            TokenKind::Sampler | TokenKind::SamplerState => {
                self.accept_it()?;
                Ok(TypeDenoter::Sampler)
            }
            _ => Err(self.unexpected("type denoter")),
        }
    }

    pub(crate) fn parse_base_type_denoter(&mut self) -> ParseResult<TypeDenoter> {
        let token = self.accept_it()?;
        self.parse_data_type(&token.spell, token.area)
            .map(TypeDenoter::Base)
    }

    pub(crate) fn parse_data_type(
        &mut self,
        keyword: &str,
        area: SourceArea,
    ) -> ParseResult<DataType> {
        DataType::from_keyword(keyword)
            .ok_or_else(|| ParseError::syntax(format!("unknown data type '{}'", keyword), area))
    }

    // vector '<' ScalarType ',' DIM '>'
    fn parse_generic_vector_type_denoter(&mut self) -> ParseResult<TypeDenoter> {
        self.accept(TokenKind::Vector)?;

        if !self.is_spell(TokenKind::BinaryOp, "<") {
            // Bare 'vector' defaults to float4.
            return Ok(TypeDenoter::Base(DataType::Vector(ScalarType::Float, 4)));
        }
        self.accept_it()?;

        self.push_state(ParsingState {
            active_template: true,
        });
        let result = (|| {
            let scalar_token = self.accept(TokenKind::ScalarType)?;
            let scalar = self
                .parse_data_type(&scalar_token.spell, scalar_token.area)?
                .scalar_type()
                .expect("scalar keyword");
            self.accept(TokenKind::Comma)?;
            let dim = self.parse_and_evaluate_vector_dimension()?;
            Ok(TypeDenoter::Base(DataType::Vector(scalar, dim)))
        })();
        self.pop_state();
        let denoter = result?;

        self.accept_spell(TokenKind::BinaryOp, ">")?;
        Ok(denoter)
    }

    // matrix '<' ScalarType ',' DIM ',' DIM '>'
    fn parse_generic_matrix_type_denoter(&mut self) -> ParseResult<TypeDenoter> {
        self.accept(TokenKind::Matrix)?;

        if !self.is_spell(TokenKind::BinaryOp, "<") {
            return Ok(TypeDenoter::Base(DataType::Matrix(ScalarType::Float, 4, 4)));
        }
        self.accept_it()?;

        self.push_state(ParsingState {
            active_template: true,
        });
        let result = (|| {
            let scalar_token = self.accept(TokenKind::ScalarType)?;
            let scalar = self
                .parse_data_type(&scalar_token.spell, scalar_token.area)?
                .scalar_type()
                .expect("scalar keyword");
            self.accept(TokenKind::Comma)?;
            let rows = self.parse_and_evaluate_vector_dimension()?;
            self.accept(TokenKind::Comma)?;
            let cols = self.parse_and_evaluate_vector_dimension()?;
            Ok(TypeDenoter::Base(DataType::Matrix(scalar, rows, cols)))
        })();
        self.pop_state();
        let denoter = result?;

        self.accept_spell(TokenKind::BinaryOp, ">")?;
        Ok(denoter)
    }

    // ----- Constant-expression helpers -----

    pub(crate) fn parse_and_evaluate_const_expr(&mut self) -> ParseResult<Variant> {
        let area = self.current.area;
        let expr = self.parse_expr(false)?;
        ConstExprEvaluator::new()
            .evaluate(&expr)
            .map_err(|err| ParseError::syntax(err.message, if err.area.is_valid() { err.area } else { area }))
    }

    pub(crate) fn parse_and_evaluate_const_expr_int(&mut self) -> ParseResult<i64> {
        let area = self.current.area;
        let value = self.parse_and_evaluate_const_expr()?;
        match value {
            Variant::Int(value) => Ok(value),
            Variant::Bool(value) => Ok(value as i64),
            Variant::Real(_) => Err(ParseError::syntax(
                "expected integral constant expression",
                area,
            )),
        }
    }

    fn parse_and_evaluate_vector_dimension(&mut self) -> ParseResult<u8> {
        let area = self.current.area;
        let value = self.parse_and_evaluate_const_expr_int()?;
        if !(1..=4).contains(&value) {
            return Err(ParseError::syntax(
                "vector and matrix dimensions must be between 1 and 4",
                area,
            ));
        }
        Ok(value as u8)
    }

    /// Array dimensions on a type denoter; each must be constant.
    fn parse_evaluated_array_dims(&mut self) -> ParseResult<Vec<Option<u64>>> {
        let mut dims = Vec::new();
        while self.is(TokenKind::LBracket) {
            let open = self.accept_it()?;
            if self.is(TokenKind::RBracket) {
                return Err(ParseError::syntax(
                    "explicit array dimension expected",
                    open.area,
                ));
            }
            let value = self.parse_and_evaluate_const_expr_int()?;
            if value < 0 {
                return Err(ParseError::syntax(
                    "array dimension must not be negative",
                    open.area,
                ));
            }
            dims.push(Some(value as u64));
            self.accept(TokenKind::RBracket)?;
        }
        Ok(dims)
    }

    /// Array dimensions on a declarator, kept as expressions. An empty
    /// `[]` yields a null expression when dynamic dimensions are allowed.
    pub(crate) fn parse_array_dimension_list(
        &mut self,
        allow_dynamic: bool,
    ) -> ParseResult<Vec<Expr>> {
        let mut dims = Vec::new();
        while self.is(TokenKind::LBracket) {
            let open = self.accept_it()?;
            if self.is(TokenKind::RBracket) {
                if !allow_dynamic {
                    return Err(ParseError::syntax(
                        "explicit array dimension expected",
                        open.area,
                    ));
                }
                self.accept_it()?;
                dims.push(Expr::new(ExprKind::Null, open.area));
            } else {
                let expr = self.parse_expr(false)?;
                self.accept(TokenKind::RBracket)?;
                dims.push(expr);
            }
        }
        Ok(dims)
    }

    // ----- Struct declarations -----

    /// Parses a struct declaration; the `struct` keyword (and possibly
    /// the name) have been consumed by the caller.
    pub(crate) fn parse_struct_decl_body(
        &mut self,
        ident: Option<xshade_lexer::Token>,
    ) -> ParseResult<StructDecl> {
        let span = ident
            .as_ref()
            .map(|t| t.area)
            .unwrap_or(self.current.area);
        let mut decl = StructDecl::new(ident.map(|t| t.spell), span);
        decl.is_nested = self.struct_nesting > 0;

        if let Some(name) = &decl.ident {
            // A struct name becomes a type name as soon as it is parsed.
            self.register_type_name(name);

            // Optional single inheritance.
            if self.is(TokenKind::Colon) {
                self.accept_it()?;
                let base = self.accept(TokenKind::Ident)?;
                if base.spell == *name {
                    return Err(ParseError::syntax(
                        "recursive inheritance is not allowed",
                        base.area,
                    ));
                }
                decl.base_name = Some(base.spell);
                if self.is(TokenKind::Comma) {
                    return Err(ParseError::syntax(
                        "multiple inheritance is not allowed",
                        self.current.area,
                    ));
                }
            }
        }

        self.reports.push_context(decl.signature());
        self.struct_nesting += 1;
        let members = self.parse_var_decl_stmt_list();
        self.struct_nesting -= 1;
        self.reports.pop_context();
        decl.members = members?;

        Ok(decl)
    }

    pub(crate) fn parse_var_decl_stmt_list(&mut self) -> ParseResult<Vec<VarDeclStmt>> {
        let mut members = Vec::new();
        self.accept(TokenKind::LBrace)?;
        while !self.is(TokenKind::RBrace) {
            if self.is(TokenKind::EndOfStream) {
                return Err(self.unexpected("'}'"));
            }
            let stmt = self.parse_var_decl_stmt()?;
            match stmt.kind {
                StmtKind::VarDecl(decl) => members.push(decl),
                _ => unreachable!("parse_var_decl_stmt yields var-decl statements"),
            }
        }
        self.accept_it()?;
        Ok(members)
    }

    pub(crate) fn parse_var_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.current.area;
        let mut stmt = VarDeclStmt {
            input_modifier: None,
            storage_classes: Vec::new(),
            type_modifiers: Vec::new(),
            var_type: VarType::new(TypeDenoter::Unknown, span),
            var_decls: Vec::new(),
            span,
        };

        loop {
            match self.current.kind {
                TokenKind::StorageClass => {
                    let token = self.accept_it()?;
                    if let Some(class) = StorageClass::from_spelling(&token.spell) {
                        stmt.storage_classes.push(class);
                    }
                }
                TokenKind::TypeModifier => {
                    let token = self.accept_it()?;
                    if let Some(modifier) = TypeModifier::from_spelling(&token.spell) {
                        stmt.type_modifiers.push(modifier);
                    }
                }
                TokenKind::Struct => {
                    let mut struct_decl = None;
                    let denoter =
                        self.parse_type_denoter_with_struct_decl(&mut struct_decl, false)?;
                    stmt.var_type = VarType {
                        denoter,
                        struct_decl,
                        span,
                    };
                    break;
                }
                _ if self.is(TokenKind::Ident) || self.is_data_type() => {
                    stmt.var_type = VarType::new(self.parse_type_denoter(false)?, span);
                    break;
                }
                _ => return Err(self.unexpected("variable declaration")),
            }
        }

        stmt.var_decls = self.parse_var_decl_list(None)?;
        self.semi()?;
        Ok(Stmt::new(StmtKind::VarDecl(stmt), span))
    }

    // ----- typedef -----

    // 'typedef' type_denoter IDENT (',' IDENT)* ';'
    pub(crate) fn parse_alias_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let typedef = self.accept(TokenKind::Typedef)?;

        let mut struct_decl = None;
        let denoter = self.parse_type_denoter_with_struct_decl(&mut struct_decl, false)?;

        let mut aliases = Vec::new();
        loop {
            aliases.push(self.parse_alias_decl(denoter.clone())?);
            if self.is(TokenKind::Comma) {
                self.accept_it()?;
            } else {
                break;
            }
        }
        self.semi()?;

        Ok(Stmt::new(
            StmtKind::AliasDecl(AliasDeclStmt {
                struct_decl,
                aliases,
                span: typedef.area,
            }),
            typedef.area,
        ))
    }

    fn parse_alias_decl(&mut self, mut denoter: TypeDenoter) -> ParseResult<AliasDecl> {
        let ident = self.accept(TokenKind::Ident)?;
        self.register_type_name(&ident.spell);

        if self.is(TokenKind::LBracket) {
            let dims = self.parse_evaluated_array_dims()?;
            denoter = TypeDenoter::array(denoter, dims);
        }

        Ok(AliasDecl {
            ident: ident.spell,
            denoter,
            span: ident.area,
        })
    }

    // ----- Buffers, textures, samplers -----

    pub(crate) fn parse_buffer_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.accept(TokenKind::UniformBuffer)?;
        let buffer_type = UniformBufferType::from_keyword(&keyword.spell)
            .ok_or_else(|| ParseError::syntax("unknown uniform buffer type", keyword.area))?;
        let ident = self.accept(TokenKind::Ident)?;

        let mut stmt = BufferDeclStmt {
            buffer_type,
            ident: ident.spell,
            registers: Vec::new(),
            members: Vec::new(),
            span: keyword.area,
        };

        stmt.registers = self.parse_register_list(true)?;

        self.reports.push_context(stmt.to_string());
        let members = self.parse_var_decl_stmt_list();
        self.reports.pop_context();
        stmt.members = members?;

        // The trailing semicolon is optional for cbuffer and tbuffer.
        if self.is(TokenKind::Semicolon) {
            self.semi()?;
        }

        let span = stmt.span;
        Ok(Stmt::new(StmtKind::BufferDecl(stmt), span))
    }

    pub(crate) fn parse_texture_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.accept(TokenKind::Texture)?;
        let texture_type = TextureType::from_keyword(&keyword.spell)
            .ok_or_else(|| ParseError::syntax("unknown texture type", keyword.area))?;

        let mut stmt = TextureDeclStmt {
            texture_type,
            color_type: None,
            num_samples: None,
            decls: Vec::new(),
            span: keyword.area,
        };

        // Optional template arguments: '<' colorType (',' numSamples)? '>'
        if self.is_spell(TokenKind::BinaryOp, "<") {
            self.accept_it()?;
            self.push_state(ParsingState {
                active_template: true,
            });
            let result = (|| {
                if !matches!(
                    self.current.kind,
                    TokenKind::ScalarType | TokenKind::VectorType
                ) {
                    return Err(self.unexpected("scalar or vector type denoter"));
                }
                let color = self.accept_it()?;
                stmt.color_type = Some(self.parse_data_type(&color.spell, color.area)?);

                if self.is(TokenKind::Comma) {
                    self.accept_it()?;
                    let samples = self.parse_and_evaluate_const_expr_int()?;
                    if !(1..128).contains(&samples) {
                        self.reports.warning(
                            format!(
                                "number of samples in texture must be in the range [1, 128), but got {}",
                                samples
                            ),
                            Some(keyword.area),
                        );
                    }
                    stmt.num_samples = Some(samples.max(0) as u32);
                }
                Ok(())
            })();
            self.pop_state();
            result?;
            self.accept_spell(TokenKind::BinaryOp, ">")?;
        }

        loop {
            stmt.decls.push(self.parse_texture_decl()?);
            if self.is(TokenKind::Comma) {
                self.accept_it()?;
            } else {
                break;
            }
        }
        self.semi()?;

        let span = stmt.span;
        Ok(Stmt::new(StmtKind::TextureDecl(stmt), span))
    }

    fn parse_texture_decl(&mut self) -> ParseResult<TextureDecl> {
        let ident = self.accept(TokenKind::Ident)?;
        let mut decl = TextureDecl {
            ident: ident.spell,
            array_dims: Vec::new(),
            registers: Vec::new(),
            span: ident.area,
        };
        decl.array_dims = self.parse_array_dimension_list(false)?;
        decl.registers = self.parse_register_list(false)?;
        Ok(decl)
    }

    pub(crate) fn parse_sampler_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = if self.is(TokenKind::Sampler) || self.is(TokenKind::SamplerState) {
            self.accept_it()?
        } else {
            return Err(self.unexpected("sampler type denoter or sampler state"));
        };

        let mut stmt = SamplerDeclStmt {
            sampler_type: keyword.spell,
            decls: Vec::new(),
            span: keyword.area,
        };

        loop {
            stmt.decls.push(self.parse_sampler_decl()?);
            if self.is(TokenKind::Comma) {
                self.accept_it()?;
            } else {
                break;
            }
        }
        self.semi()?;

        let span = stmt.span;
        Ok(Stmt::new(StmtKind::SamplerDecl(stmt), span))
    }

    fn parse_sampler_decl(&mut self) -> ParseResult<SamplerDecl> {
        let ident = self.accept(TokenKind::Ident)?;
        let mut decl = SamplerDecl {
            ident: ident.spell,
            array_dims: Vec::new(),
            registers: Vec::new(),
            texture_ident: None,
            values: Vec::new(),
            span: ident.area,
        };
        decl.array_dims = self.parse_array_dimension_list(false)?;
        decl.registers = self.parse_register_list(false)?;

        // Static sampler state, in the D3D9 or D3D10+ form.
        if self.is_spell(TokenKind::AssignOp, "=") {
            self.accept_it()?;
            self.accept_spell(TokenKind::SamplerState, "sampler_state")?;
            self.accept(TokenKind::LBrace)?;
            if self.is_spell(TokenKind::Texture, "texture") {
                decl.texture_ident = Some(self.parse_sampler_state_texture_ident()?);
            }
            decl.values = self.parse_sampler_value_list()?;
            self.accept(TokenKind::RBrace)?;
        } else if self.is(TokenKind::LBrace) {
            self.accept_it()?;
            decl.values = self.parse_sampler_value_list()?;
            self.accept(TokenKind::RBrace)?;
        }

        Ok(decl)
    }

    // 'texture' '=' ('<' IDENT '>' | '(' IDENT ')') ';'
    fn parse_sampler_state_texture_ident(&mut self) -> ParseResult<String> {
        self.accept_spell(TokenKind::Texture, "texture")?;
        self.accept_spell(TokenKind::AssignOp, "=")?;

        let ident = if self.is(TokenKind::LParen) {
            self.accept_it()?;
            let ident = self.accept(TokenKind::Ident)?;
            self.accept(TokenKind::RParen)?;
            ident
        } else if self.is_spell(TokenKind::BinaryOp, "<") {
            self.accept_it()?;
            let ident = self.accept(TokenKind::Ident)?;
            self.accept_spell(TokenKind::BinaryOp, ">")?;
            ident
        } else {
            return Err(self.unexpected("'<' or '('"));
        };

        self.semi()?;
        Ok(ident.spell)
    }

    fn parse_sampler_value_list(&mut self) -> ParseResult<Vec<SamplerValue>> {
        let mut values = Vec::new();
        while !self.is(TokenKind::RBrace) {
            if self.is(TokenKind::EndOfStream) {
                return Err(self.unexpected("'}'"));
            }
            values.push(self.parse_sampler_value()?);
        }
        Ok(values)
    }

    // IDENT '=' expr ';'
    fn parse_sampler_value(&mut self) -> ParseResult<SamplerValue> {
        let name = self.accept(TokenKind::Ident)?;
        self.accept_spell(TokenKind::AssignOp, "=")?;
        let value = self.parse_expr(false)?;
        self.semi()?;
        Ok(SamplerValue {
            name: name.spell,
            value,
            span: name.area,
        })
    }

    // ----- Registers and packoffset -----

    pub(crate) fn parse_register_list(&mut self, check_first: bool) -> ParseResult<Vec<Register>> {
        let mut registers = Vec::new();
        if check_first && self.is(TokenKind::Register) {
            registers.push(self.parse_register(false)?);
        }
        while self.is(TokenKind::Colon) {
            registers.push(self.parse_register(true)?);
        }
        Ok(registers)
    }

    // ':' 'register' '(' (PROFILE ',')? IDENT ('[' INT ']')? ')'
    pub(crate) fn parse_register(&mut self, parse_colon: bool) -> ParseResult<Register> {
        if parse_colon {
            self.accept(TokenKind::Colon)?;
        }

        let keyword = self.accept(TokenKind::Register)?;
        self.accept(TokenKind::LParen)?;

        let mut target = None;
        let mut slot_ident = self.accept(TokenKind::Ident)?;

        // Optional shader-profile prefix, e.g. 'vs_5_0'.
        if self.is(TokenKind::Comma) {
            target = shader_profile_to_target(&slot_ident.spell);
            self.accept_it()?;
            slot_ident = self.accept(TokenKind::Ident)?;
        }

        let mut chars = slot_ident.spell.chars();
        let type_char = chars.next().unwrap_or('\0');
        let register_type = match RegisterType::from_char(type_char) {
            Some(register_type) => register_type,
            None => {
                self.reports.warning(
                    format!("unknown slot register: '{}'", type_char),
                    Some(slot_ident.area),
                );
                RegisterType::ConstRegister
            }
        };
        let mut slot: i32 = chars.as_str().parse().unwrap_or(0);

        // Optional sub-component, added onto the slot index.
        if self.is(TokenKind::LBracket) {
            self.accept_it()?;
            let sub = self.accept(TokenKind::IntLiteral)?;
            slot += sub.spell.parse::<i32>().unwrap_or(0);
            self.accept(TokenKind::RBracket)?;
        }

        self.accept(TokenKind::RParen)?;

        Ok(Register {
            target,
            register_type,
            slot,
            span: keyword.area,
        })
    }

    // ':' 'packoffset' '(' IDENT ('.' COMPONENT)? ')'
    pub(crate) fn parse_pack_offset(&mut self, parse_colon: bool) -> ParseResult<PackOffset> {
        if parse_colon {
            self.accept(TokenKind::Colon)?;
        }

        let keyword = self.accept(TokenKind::PackOffset)?;
        self.accept(TokenKind::LParen)?;

        let register_name = self.accept(TokenKind::Ident)?;
        let mut vector_component = None;
        if self.is(TokenKind::Dot) {
            self.accept_it()?;
            vector_component = Some(self.accept(TokenKind::Ident)?.spell);
        }

        self.accept(TokenKind::RParen)?;

        Ok(PackOffset {
            register_name: register_name.spell,
            vector_component,
            span: keyword.area,
        })
    }
}
