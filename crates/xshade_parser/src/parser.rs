//! Parser core: token pump, scoped type-name table, program and
//! declaration productions.

use crate::{ParseError, ParseResult};
use std::collections::HashSet;
use xshade_ast::*;
use xshade_common::{codes, ReportHandler, SourceArea};
use xshade_lexer::{Scanner, Token, TokenKind};

/// Immutable parsing state pushed around template-argument lists. While
/// `active_template` is set, `<` and `>` are argument brackets rather
/// than relational operators.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ParsingState {
    pub active_template: bool,
}

/// The HLSL parser.
pub struct Parser<'src, 'r, 'log> {
    pub(crate) scanner: Scanner<'src>,
    pub(crate) current: Token,
    pub(crate) prev_area: SourceArea,
    pub(crate) comment: Option<String>,
    /// Scoped set of identifiers known to name types.
    pub(crate) type_names: Vec<HashSet<String>>,
    pub(crate) states: Vec<ParsingState>,
    /// Inside a function body; binding semantics are not allowed here.
    pub(crate) local_scope: bool,
    pub(crate) struct_nesting: usize,
    pub(crate) reports: &'r mut ReportHandler<'log>,
}

impl<'src, 'r, 'log> Parser<'src, 'r, 'log> {
    pub fn new(
        source: &'src str,
        filename: &str,
        reports: &'r mut ReportHandler<'log>,
    ) -> ParseResult<Self> {
        let scanner = Scanner::new(source, filename);
        let mut parser = Self {
            scanner,
            current: Token::new(TokenKind::EndOfStream, "", Default::default()),
            prev_area: SourceArea::dummy(),
            comment: None,
            type_names: Vec::new(),
            states: Vec::new(),
            local_scope: false,
            struct_nesting: 0,
            reports,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    /// Parses the whole translation unit. Recoverable syntax errors are
    /// reported and resynchronized; Err is returned only for fatal ones.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::default();

        self.open_scope();
        self.generate_predefined_type_aliases(&mut program);

        loop {
            // Null statements and techniques are ignored wholesale.
            while self.is(TokenKind::Semicolon) || self.is(TokenKind::Technique) {
                if self.is(TokenKind::Technique) {
                    self.parse_and_ignore_technique()?;
                } else {
                    self.accept_it()?;
                }
            }
            if self.is(TokenKind::EndOfStream) {
                break;
            }

            let comment = self.take_comment();
            match self.parse_global_stmt() {
                Ok(mut stmt) => {
                    stmt.comment = comment;
                    program.global_stmts.push(stmt);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.reports.error(err.to_string(), Some(err.area()));
                    self.resync_stmt()?;
                    if self.is(TokenKind::RBrace) {
                        self.accept_it()?;
                    }
                }
            }
        }

        self.close_scope();
        Ok(program)
    }

    // ----- Token pump -----

    pub(crate) fn advance_token(&mut self) -> ParseResult<()> {
        loop {
            match self.scanner.next_token() {
                Ok(token) => match token.kind {
                    TokenKind::WhiteSpace | TokenKind::NewLine | TokenKind::LineBreak => {}
                    TokenKind::Comment => self.append_comment(&token),
                    TokenKind::Directive => self.process_directive(&token)?,
                    _ => {
                        self.prev_area = self.current.area;
                        self.current = token;
                        return Ok(());
                    }
                },
                Err(err) => {
                    if err.is_fatal() {
                        self.reports.fatal(err.to_string(), Some(err.area()));
                        return Err(ParseError::Fatal {
                            message: err.to_string(),
                            area: err.area(),
                        });
                    }
                    self.reports.error(err.to_string(), Some(err.area()));
                }
            }
        }
    }

    fn append_comment(&mut self, token: &Token) {
        let text = clean_comment(&token.spell);
        if text.is_empty() {
            return;
        }
        match &mut self.comment {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(&text);
            }
            None => self.comment = Some(text),
        }
    }

    /// Handles `#line`, the only directive that survives preprocessing.
    fn process_directive(&mut self, directive: &Token) -> ParseResult<()> {
        if directive.spell != "line" {
            self.reports.error(
                "only '#line' directives are allowed after preprocessing",
                Some(directive.area),
            );
        }
        let mut row: Option<u32> = None;
        let mut filename: Option<String> = None;
        loop {
            match self.scanner.next_token() {
                Ok(token) => match token.kind {
                    TokenKind::WhiteSpace | TokenKind::Comment => {}
                    TokenKind::NewLine | TokenKind::EndOfStream => break,
                    TokenKind::IntLiteral if row.is_none() => {
                        row = token.spell.parse().ok();
                    }
                    TokenKind::StringLiteral if filename.is_none() => {
                        filename = Some(token.spell_content().to_string());
                    }
                    _ => {
                        self.reports
                            .error("malformed '#line' directive", Some(token.area));
                    }
                },
                Err(err) => {
                    if err.is_fatal() {
                        self.reports.fatal(err.to_string(), Some(err.area()));
                        return Err(ParseError::Fatal {
                            message: err.to_string(),
                            area: err.area(),
                        });
                    }
                    self.reports.error(err.to_string(), Some(err.area()));
                }
            }
        }
        if directive.spell == "line" {
            match row {
                Some(row) => self.scanner.set_source_origin(row, filename),
                None => self
                    .reports
                    .error("malformed '#line' directive", Some(directive.area)),
            }
        }
        Ok(())
    }

    pub(crate) fn is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn is_spell(&self, kind: TokenKind, spell: &str) -> bool {
        self.current.kind == kind && self.current.spell == spell
    }

    pub(crate) fn accept_it(&mut self) -> ParseResult<Token> {
        let token = self.current.clone();
        self.advance_token()?;
        Ok(token)
    }

    pub(crate) fn accept(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.is(kind) {
            self.accept_it()
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub(crate) fn accept_spell(&mut self, kind: TokenKind, spell: &str) -> ParseResult<Token> {
        if self.is_spell(kind, spell) {
            self.accept_it()
        } else {
            Err(self.unexpected(&format!("'{}'", spell)))
        }
    }

    pub(crate) fn semi(&mut self) -> ParseResult<()> {
        self.accept(TokenKind::Semicolon)?;
        Ok(())
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: if self.current.spell.is_empty() {
                self.current.kind.describe().to_string()
            } else {
                format!("'{}'", self.current.spell)
            },
            area: self.current.area,
        }
    }

    pub(crate) fn take_comment(&mut self) -> Option<String> {
        self.comment.take()
    }

    /// Skips ahead to the next statement boundary: past a `;`, or up to
    /// (not consuming) a `}` closing the enclosing block.
    pub(crate) fn resync_stmt(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::EndOfStream => return Ok(()),
                TokenKind::Semicolon if depth == 0 => {
                    self.accept_it()?;
                    return Ok(());
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.accept_it()?;
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                    self.accept_it()?;
                }
                _ => {
                    self.accept_it()?;
                }
            }
        }
    }

    // ----- Type-name table and parsing states -----

    pub(crate) fn open_scope(&mut self) {
        self.type_names.push(HashSet::new());
    }

    pub(crate) fn close_scope(&mut self) {
        self.type_names.pop();
    }

    pub(crate) fn register_type_name(&mut self, ident: &str) {
        if let Some(scope) = self.type_names.last_mut() {
            scope.insert(ident.to_string());
        }
    }

    pub(crate) fn is_registered_type_name(&self, ident: &str) -> bool {
        self.type_names.iter().rev().any(|scope| scope.contains(ident))
    }

    pub(crate) fn push_state(&mut self, state: ParsingState) {
        self.states.push(state);
    }

    pub(crate) fn pop_state(&mut self) {
        self.states.pop();
    }

    pub(crate) fn active_template(&self) -> bool {
        self.states.last().map(|s| s.active_template).unwrap_or(false)
    }

    // ----- Classification helpers -----

    pub(crate) fn is_data_type(&self) -> bool {
        self.is_base_data_type()
            || matches!(
                self.current.kind,
                TokenKind::Vector
                    | TokenKind::Matrix
                    | TokenKind::Texture
                    | TokenKind::Sampler
                    | TokenKind::SamplerState
            )
    }

    pub(crate) fn is_base_data_type(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::ScalarType
                | TokenKind::VectorType
                | TokenKind::MatrixType
                | TokenKind::StringType
        )
    }

    pub(crate) fn is_literal(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::BoolLiteral
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
        )
    }

    pub(crate) fn is_arithmetic_unary(&self) -> bool {
        self.is_spell(TokenKind::BinaryOp, "-") || self.is_spell(TokenKind::BinaryOp, "+")
    }

    // ----- Pre-defined type aliases -----

    /// Seeds the legacy D3D type aliases as alias-decl statements.
    fn generate_predefined_type_aliases(&mut self, program: &mut Program) {
        let pre_defined: [(DataType, &str); 5] = [
            (DataType::Scalar(ScalarType::Int), "DWORD"),
            (DataType::Scalar(ScalarType::Float), "FLOAT"),
            (DataType::Vector(ScalarType::Float, 4), "VECTOR"),
            (DataType::Matrix(ScalarType::Float, 4, 4), "MATRIX"),
            (DataType::String, "STRING"),
        ];
        for (data_type, ident) in pre_defined {
            self.register_type_name(ident);
            let alias = AliasDecl {
                ident: ident.to_string(),
                denoter: TypeDenoter::Base(data_type),
                span: SourceArea::dummy(),
            };
            program.global_stmts.push(Stmt::new(
                StmtKind::AliasDecl(AliasDeclStmt {
                    struct_decl: None,
                    aliases: vec![alias],
                    span: SourceArea::dummy(),
                }),
                SourceArea::dummy(),
            ));
        }
    }

    // ----- Global declarations -----

    pub(crate) fn parse_global_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current.kind {
            TokenKind::Sampler | TokenKind::SamplerState => self.parse_sampler_decl_stmt(),
            TokenKind::Texture => self.parse_texture_decl_stmt(),
            TokenKind::UniformBuffer => self.parse_buffer_decl_stmt(),
            TokenKind::Typedef => self.parse_alias_decl_stmt(),
            TokenKind::TypeModifier | TokenKind::StorageClass => self.parse_var_decl_stmt(),
            TokenKind::LBracket | TokenKind::Void | TokenKind::Inline => {
                self.parse_function_decl(None, None)
            }
            _ => self.parse_struct_or_var_or_function_decl_stmt(),
        }
    }

    /// Global fallback: parse a type, then commit on the next token
    /// (`(` means function, `;`/`,`/ident means variables).
    fn parse_struct_or_var_or_function_decl_stmt(&mut self) -> ParseResult<Stmt> {
        let var_type = self.parse_var_type(false)?;
        let span = var_type.span;

        if var_type.struct_decl.is_some() && self.is(TokenKind::Semicolon) {
            let struct_decl = var_type.struct_decl.unwrap();
            self.semi()?;
            return Ok(Stmt::new(StmtKind::StructDecl(struct_decl), span));
        }

        let ident = self.accept(TokenKind::Ident)?;

        if self.is(TokenKind::LParen) {
            return self.parse_function_decl(Some(var_type), Some(ident));
        }

        let mut stmt = VarDeclStmt {
            input_modifier: None,
            storage_classes: Vec::new(),
            type_modifiers: Vec::new(),
            var_type,
            var_decls: Vec::new(),
            span,
        };
        stmt.var_decls = self.parse_var_decl_list(Some(ident))?;
        self.semi()?;
        Ok(Stmt::new(StmtKind::VarDecl(stmt), span))
    }

    pub(crate) fn parse_function_decl(
        &mut self,
        return_type: Option<VarType>,
        ident: Option<Token>,
    ) -> ParseResult<Stmt> {
        let (attribs, return_type) = match return_type {
            Some(ty) => (Vec::new(), ty),
            None => {
                if self.is(TokenKind::Inline) {
                    self.accept_it()?;
                }
                let attribs = self.parse_attribute_list()?;
                let ty = self.parse_var_type(true)?;
                (attribs, ty)
            }
        };

        let ident = match ident {
            Some(token) => token,
            None => self.accept(TokenKind::Ident)?,
        };
        let span = ident.area;

        let mut decl = FunctionDecl {
            attribs,
            return_type,
            ident: ident.spell,
            params: Vec::new(),
            semantic: None,
            body: None,
            span,
            is_entry_point: false,
            input_semantics: Vec::new(),
            output_semantics: Vec::new(),
        };

        decl.params = self.parse_parameter_list()?;
        self.parse_function_decl_semantic(&mut decl)?;
        self.parse_annotation_list()?;

        if self.is(TokenKind::Semicolon) {
            self.accept_it()?;
        } else {
            self.reports.push_context(decl.signature());
            self.local_scope = true;
            let body = self.parse_code_block();
            self.local_scope = false;
            self.reports.pop_context();
            decl.body = Some(body?);
        }

        Ok(Stmt::new(StmtKind::FunctionDecl(decl), span))
    }

    pub(crate) fn parse_parameter_list(&mut self) -> ParseResult<Vec<VarDeclStmt>> {
        let mut params = Vec::new();
        self.accept(TokenKind::LParen)?;
        if !self.is(TokenKind::RParen) {
            loop {
                params.push(self.parse_parameter()?);
                if self.is(TokenKind::Comma) {
                    self.accept_it()?;
                } else {
                    break;
                }
            }
        }
        self.accept(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<VarDeclStmt> {
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
                TokenKind::InputModifier => {
                    let token = self.accept_it()?;
                    stmt.input_modifier = InputModifier::from_spelling(&token.spell);
                }
                TokenKind::TypeModifier => {
                    let token = self.accept_it()?;
                    if let Some(modifier) = TypeModifier::from_spelling(&token.spell) {
                        stmt.type_modifiers.push(modifier);
                    }
                }
                TokenKind::StorageClass => {
                    let token = self.accept_it()?;
                    if let Some(class) = StorageClass::from_spelling(&token.spell) {
                        stmt.storage_classes.push(class);
                    }
                }
                _ => break,
            }
        }

        stmt.var_type = self.parse_var_type(false)?;
        let decl = self.parse_var_decl(None)?;
        stmt.var_decls.push(decl);
        Ok(stmt)
    }

    pub(crate) fn parse_var_decl_list(
        &mut self,
        mut first_ident: Option<Token>,
    ) -> ParseResult<Vec<VarDecl>> {
        let mut decls = Vec::new();
        loop {
            decls.push(self.parse_var_decl(first_ident.take())?);
            if self.is(TokenKind::Comma) {
                self.accept_it()?;
            } else {
                break;
            }
        }
        Ok(decls)
    }

    pub(crate) fn parse_var_decl(&mut self, ident: Option<Token>) -> ParseResult<VarDecl> {
        let ident = match ident {
            Some(token) => token,
            None => self.accept(TokenKind::Ident)?,
        };
        let mut decl = VarDecl::new(ident.spell, ident.area);
        decl.array_dims = self.parse_array_dimension_list(true)?;
        self.parse_var_decl_semantic(&mut decl)?;
        self.parse_annotation_list()?;
        if self.is_spell(TokenKind::AssignOp, "=") {
            self.accept_it()?;
            decl.initializer = Some(self.parse_expr(false)?);
        }
        Ok(decl)
    }

    fn parse_var_decl_semantic(&mut self, decl: &mut VarDecl) -> ParseResult<()> {
        while self.is(TokenKind::Colon) {
            self.accept_it()?;
            if self.is(TokenKind::Register) {
                if self.local_scope {
                    self.reports.error_with_code(
                        "semantics are not allowed in local scope",
                        Some(self.current.area),
                        codes::ERR_SEMANTICS,
                    );
                } else {
                    self.reports.warning(
                        "register is ignored for variable declarations",
                        Some(self.current.area),
                    );
                }
                self.parse_register(false)?;
            } else if self.is(TokenKind::PackOffset) {
                decl.pack_offset = Some(self.parse_pack_offset(false)?);
            } else {
                decl.semantic = Some(self.parse_semantic()?);
            }
        }
        Ok(())
    }

    fn parse_function_decl_semantic(&mut self, decl: &mut FunctionDecl) -> ParseResult<()> {
        while self.is(TokenKind::Colon) {
            self.accept_it()?;
            if self.is(TokenKind::Register) {
                self.reports.warning(
                    "register is ignored for function declarations",
                    Some(self.current.area),
                );
                self.parse_register(false)?;
            } else if self.is(TokenKind::PackOffset) {
                self.reports.error_with_code(
                    "packoffset is only allowed in a constant buffer",
                    Some(self.current.area),
                    codes::ERR_PACK_OFFSET_IN_INVALID_SCOPE,
                );
                self.parse_pack_offset(false)?;
            } else {
                decl.semantic = Some(self.parse_semantic()?);
            }
        }
        Ok(())
    }

    pub(crate) fn parse_semantic(&mut self) -> ParseResult<IndexedSemantic> {
        let ident = self.accept(TokenKind::Ident)?;
        Ok(IndexedSemantic::parse(&ident.spell))
    }

    pub(crate) fn parse_attribute_list(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attribs = Vec::new();
        while self.is(TokenKind::LBracket) {
            attribs.push(self.parse_attribute()?);
        }
        Ok(attribs)
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let open = self.accept(TokenKind::LBracket)?;
        let ident = self.accept(TokenKind::Ident)?;
        let mut attrib = Attribute {
            ident: ident.spell,
            args: Vec::new(),
            span: open.area,
        };
        if self.is(TokenKind::LParen) {
            self.accept_it()?;
            if !self.is(TokenKind::RParen) {
                loop {
                    attrib.args.push(self.parse_expr(false)?);
                    if self.is(TokenKind::Comma) {
                        self.accept_it()?;
                    } else {
                        break;
                    }
                }
            }
            self.accept(TokenKind::RParen)?;
        }
        self.accept(TokenKind::RBracket)?;
        Ok(attrib)
    }

    /// Annotation blocks `< ... >` are parsed and discarded.
    pub(crate) fn parse_annotation_list(&mut self) -> ParseResult<()> {
        if self.is_spell(TokenKind::BinaryOp, "<") {
            self.accept_it()?;
            while !self.is_spell(TokenKind::BinaryOp, ">") {
                if self.is(TokenKind::EndOfStream) {
                    return Err(self.unexpected("'>'"));
                }
                self.parse_var_decl_stmt()?;
            }
            self.accept_it()?;
        }
        Ok(())
    }

    pub(crate) fn parse_code_block(&mut self) -> ParseResult<CodeBlock> {
        let open = self.accept(TokenKind::LBrace)?;
        self.open_scope();
        let stmts = self.parse_stmt_list();
        self.close_scope();
        let stmts = stmts?;
        self.accept(TokenKind::RBrace)?;
        Ok(CodeBlock {
            stmts,
            span: open.area,
        })
    }

    pub(crate) fn parse_stmt_list(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::EndOfStream) {
            let comment = self.take_comment();
            match self.parse_stmt() {
                Ok(mut stmt) => {
                    stmt.comment = comment;
                    stmts.push(stmt);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.reports.error(err.to_string(), Some(err.area()));
                    self.resync_stmt()?;
                }
            }
        }
        Ok(stmts)
    }

    /// Skips a whole `technique` block by matching braces.
    fn parse_and_ignore_technique(&mut self) -> ParseResult<()> {
        let technique = self.accept(TokenKind::Technique)?;
        self.reports
            .warning("techniques are ignored", Some(technique.area));

        while !self.is(TokenKind::LBrace) {
            if self.is(TokenKind::EndOfStream) {
                return Err(self.unexpected("'{'"));
            }
            self.accept_it()?;
        }
        self.accept_it()?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.current.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::EndOfStream => {
                    return Err(ParseError::syntax(
                        "missing closing brace '}' for technique block",
                        technique.area,
                    ));
                }
                _ => {}
            }
            self.accept_it()?;
        }
        Ok(())
    }
}

/// Strips comment delimiters and leading asterisks from a comment token
/// spelling.
fn clean_comment(spell: &str) -> String {
    if let Some(text) = spell.strip_prefix("//") {
        text.trim().to_string()
    } else if let Some(text) = spell.strip_prefix("/*") {
        text.strip_suffix("*/")
            .unwrap_or(text)
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    } else {
        spell.to_string()
    }
}
