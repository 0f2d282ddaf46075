//! Directive evaluation and macro expansion.

use crate::condition::evaluate_condition;
use crate::{PreprocessError, PreprocessResult};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use xshade_common::{IncludeHandler, ReportHandler, SourcePosition};
use xshade_lexer::{ScanError, Scanner, Token, TokenKind};

const MAX_INCLUDE_DEPTH: usize = 32;

/// An object-like or function-like macro. The body is stored without
/// trivia tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct Macro {
    pub params: Option<Vec<String>>,
    pub body: Vec<Token>,
}

impl Macro {
    fn is_function_like(&self) -> bool {
        self.params.is_some()
    }
}

/// One level of `#if`/`#ifdef` nesting.
struct CondScope {
    /// Tokens in this scope are kept.
    active: bool,
    /// A branch of this conditional has been taken already.
    taken: bool,
    /// An `#else` has been seen.
    in_else: bool,
}

/// Pull-based token source with pushback, so macro-call detection can
/// look ahead without committing.
struct TokenSource<'s> {
    scanner: Scanner<'s>,
    pending: VecDeque<Token>,
}

impl<'s> TokenSource<'s> {
    fn new(source: &'s str, filename: &str) -> Self {
        Self {
            scanner: Scanner::new(source, filename),
            pending: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Result<Token, ScanError> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }
        self.scanner.next_token()
    }

    fn push_back(&mut self, token: Token) {
        self.pending.push_front(token);
    }
}

/// The preprocessor.
pub struct Preprocessor<'a> {
    include_handler: Option<&'a mut dyn IncludeHandler>,
    macros: IndexMap<String, Macro>,
}

impl<'a> Default for Preprocessor<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Preprocessor<'a> {
    pub fn new() -> Self {
        Self {
            include_handler: None,
            macros: IndexMap::new(),
        }
    }

    pub fn with_include_handler(handler: &'a mut dyn IncludeHandler) -> Self {
        Self {
            include_handler: Some(handler),
            macros: IndexMap::new(),
        }
    }

    /// Defines an object-like macro before processing starts, e.g. from
    /// `-D NAME=VALUE` command-line options.
    pub fn predefine(&mut self, name: &str, value: &str) {
        let body = Scanner::new(value, "<predefined>")
            .tokenize()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| !t.is_trivia() && t.kind != TokenKind::EndOfStream)
            .collect();
        self.macros
            .insert(name.to_string(), Macro { params: None, body });
    }

    /// Identifiers of all macros defined so far, in definition order.
    pub fn defined_macro_idents(&self) -> Vec<String> {
        self.macros.keys().cloned().collect()
    }

    /// Preprocesses a translation unit into clean HLSL text plus `#line`
    /// markers. Errors have already been reported to `reports` when this
    /// returns Err.
    pub fn process(
        &mut self,
        source: &str,
        filename: &str,
        reports: &mut ReportHandler,
    ) -> PreprocessResult<String> {
        let mut output = String::new();
        self.process_into(source, filename, reports, &mut output, 0)
            .map_err(|err| {
                reports.fatal(
                    err.to_string(),
                    Some(xshade_common::SourceArea::new(err.pos(), 1)),
                );
                err
            })?;
        Ok(output)
    }

    fn process_into(
        &mut self,
        source: &str,
        filename: &str,
        reports: &mut ReportHandler,
        output: &mut String,
        depth: usize,
    ) -> PreprocessResult<()> {
        let mut src = TokenSource::new(source, filename);
        let mut scopes: Vec<CondScope> = Vec::new();
        let mut at_line_start = true;
        let mut last_pos = SourcePosition::default();

        loop {
            let active = scopes.iter().all(|s| s.active);
            let token = match src.next() {
                Ok(token) => token,
                Err(err) => {
                    if err.is_fatal() {
                        return Err(err.into());
                    }
                    // Recoverable junk only matters in live code.
                    if active {
                        reports.error(err.to_string(), Some(err.area()));
                    }
                    continue;
                }
            };
            last_pos = token.pos();

            match token.kind {
                TokenKind::EndOfStream => break,
                TokenKind::NewLine => {
                    output.push('\n');
                    at_line_start = true;
                }
                TokenKind::LineBreak => {
                    // The splice consumed its newline; keep rows aligned.
                    output.push('\n');
                }
                TokenKind::WhiteSpace => {
                    if active {
                        output.push_str(&token.spell);
                    }
                }
                TokenKind::Comment => {
                    if active {
                        output.push_str(&token.spell);
                    }
                }
                TokenKind::Directive => {
                    if !at_line_start {
                        return Err(PreprocessError::MalformedDirective {
                            directive: token.spell.clone(),
                            pos: token.pos(),
                        });
                    }
                    at_line_start = true;
                    self.handle_directive(
                        &token, filename, &mut src, &mut scopes, reports, output, depth,
                    )?;
                }
                TokenKind::Ident if active && self.macros.contains_key(&token.spell) => {
                    at_line_start = false;
                    match self.expand_from_source(&token, &mut src, reports)? {
                        Some((text, newlines)) => {
                            output.push_str(&text);
                            for _ in 0..newlines {
                                output.push('\n');
                            }
                        }
                        None => output.push_str(&token.spell),
                    }
                }
                _ => {
                    at_line_start = false;
                    if active {
                        output.push_str(&token.spell);
                    }
                }
            }
        }

        if !scopes.is_empty() {
            return Err(PreprocessError::MissingEndif { pos: last_pos });
        }
        Ok(())
    }

    /// Collects the remaining tokens of a directive line. Line breaks
    /// continue the directive. Returns the tokens (trivia included, final
    /// newline excluded) and the number of physical line ends consumed.
    fn read_directive_line(src: &mut TokenSource) -> PreprocessResult<(Vec<Token>, usize)> {
        let mut tokens = Vec::new();
        let mut newlines = 0;
        loop {
            match src.next() {
                Ok(token) => match token.kind {
                    TokenKind::NewLine => {
                        newlines += 1;
                        return Ok((tokens, newlines));
                    }
                    TokenKind::EndOfStream => return Ok((tokens, newlines)),
                    TokenKind::LineBreak => newlines += 1,
                    _ => tokens.push(token),
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_directive(
        &mut self,
        directive: &Token,
        filename: &str,
        src: &mut TokenSource,
        scopes: &mut Vec<CondScope>,
        reports: &mut ReportHandler,
        output: &mut String,
        depth: usize,
    ) -> PreprocessResult<()> {
        let (line, newlines) = Self::read_directive_line(src)?;
        let active = scopes.iter().all(|s| s.active);
        let name = directive.spell.as_str();
        let pos = directive.pos();
        let malformed = || PreprocessError::MalformedDirective {
            directive: name.to_string(),
            pos,
        };

        match name {
            "define" if active => self.handle_define(&line, pos)?,
            "undef" if active => {
                let ident = first_ident(&line).ok_or_else(malformed)?;
                self.macros.shift_remove(&ident);
            }
            "ifdef" | "ifndef" => {
                let entered = if active {
                    let ident = first_ident(&line).ok_or_else(malformed)?;
                    let defined = self.macros.contains_key(&ident);
                    if name == "ifdef" {
                        defined
                    } else {
                        !defined
                    }
                } else {
                    // Nested inside a dead branch; never activates.
                    true
                };
                scopes.push(CondScope {
                    active: active && entered,
                    taken: !active || entered,
                    in_else: false,
                });
            }
            "if" => {
                let entered = if active {
                    self.evaluate_if_condition(&line, name)?
                } else {
                    true
                };
                scopes.push(CondScope {
                    active: active && entered,
                    taken: !active || entered,
                    in_else: false,
                });
            }
            "elif" => {
                let scope = scopes.last_mut().ok_or(PreprocessError::UnbalancedConditional {
                    directive: name.to_string(),
                    pos,
                })?;
                if scope.in_else {
                    return Err(PreprocessError::UnbalancedConditional {
                        directive: name.to_string(),
                        pos,
                    });
                }
                let parent_active = scopes[..scopes.len() - 1].iter().all(|s| s.active);
                let scope = scopes.last_mut().unwrap();
                if parent_active && !scope.taken {
                    let entered = self.evaluate_if_condition(&line, name)?;
                    scope.active = entered;
                    scope.taken = entered;
                } else {
                    scope.active = false;
                }
            }
            "else" => {
                let scope = scopes.last_mut().ok_or(PreprocessError::UnbalancedConditional {
                    directive: name.to_string(),
                    pos,
                })?;
                if scope.in_else {
                    return Err(PreprocessError::UnbalancedConditional {
                        directive: name.to_string(),
                        pos,
                    });
                }
                let parent_active = scopes[..scopes.len() - 1].iter().all(|s| s.active);
                let scope = scopes.last_mut().unwrap();
                scope.in_else = true;
                scope.active = parent_active && !scope.taken;
                scope.taken = true;
            }
            "endif" => {
                if scopes.pop().is_none() {
                    return Err(PreprocessError::UnbalancedConditional {
                        directive: name.to_string(),
                        pos,
                    });
                }
            }
            "include" if active => {
                self.handle_include(&line, pos, filename, reports, output, depth)?;
                // Row alignment after the block is restored by the
                // closing #line marker; the directive's newline is
                // dropped.
                return Ok(());
            }
            "line" if active => {
                let mut cursor = line.iter().filter(|t| !t.is_trivia());
                let number = cursor
                    .next()
                    .filter(|t| t.kind == TokenKind::IntLiteral)
                    .ok_or_else(malformed)?;
                match cursor.next() {
                    Some(file) if file.kind == TokenKind::StringLiteral => {
                        output.push_str(&format!("#line {} {}", number.spell, file.spell));
                    }
                    None => output.push_str(&format!("#line {}", number.spell)),
                    Some(_) => return Err(malformed()),
                }
            }
            "pragma" if active => {
                let text = join_tokens(line.iter().filter(|t| !t.is_trivia()));
                reports.warning(
                    format!("ignored '#pragma {}'", text),
                    Some(directive.area),
                );
            }
            "error" if active => {
                let message = join_tokens(line.iter().filter(|t| !t.is_trivia()));
                return Err(PreprocessError::UserError { message, pos });
            }
            "define" | "undef" | "include" | "line" | "pragma" | "error" => {
                // Inside a dead branch; parsed and dropped.
            }
            _ => {
                if active {
                    return Err(PreprocessError::UnknownDirective {
                        directive: name.to_string(),
                        pos,
                    });
                }
            }
        }

        for _ in 0..newlines {
            output.push('\n');
        }
        Ok(())
    }

    fn handle_define(&mut self, line: &[Token], pos: SourcePosition) -> PreprocessResult<()> {
        let malformed = || PreprocessError::MalformedDirective {
            directive: "define".to_string(),
            pos,
        };

        let mut index = 0;
        while index < line.len() && line[index].is_trivia() {
            index += 1;
        }
        let name = match line.get(index) {
            Some(token) if token.kind == TokenKind::Ident => token.spell.clone(),
            _ => return Err(malformed()),
        };
        index += 1;

        // A parameter list only counts when the parenthesis follows the
        // name with no whitespace in between.
        let params = if line.get(index).is_some_and(|t| t.kind == TokenKind::LParen) {
            index += 1;
            let mut params = Vec::new();
            loop {
                while line.get(index).is_some_and(|t| t.is_trivia()) {
                    index += 1;
                }
                match line.get(index) {
                    Some(token) if token.kind == TokenKind::RParen => {
                        index += 1;
                        break;
                    }
                    Some(token) if token.kind == TokenKind::Ident => {
                        params.push(token.spell.clone());
                        index += 1;
                        while line.get(index).is_some_and(|t| t.is_trivia()) {
                            index += 1;
                        }
                        match line.get(index) {
                            Some(token) if token.kind == TokenKind::Comma => index += 1,
                            Some(token) if token.kind == TokenKind::RParen => {}
                            _ => return Err(malformed()),
                        }
                    }
                    Some(token) if token.kind == TokenKind::VarArg => {
                        params.push("...".to_string());
                        index += 1;
                    }
                    _ => return Err(malformed()),
                }
            }
            Some(params)
        } else {
            None
        };

        let body: Vec<Token> = line[index..]
            .iter()
            .filter(|t| !t.is_trivia())
            .cloned()
            .collect();

        let replacement = Macro { params, body };

        if let Some(existing) = self.macros.get(&name) {
            let arity = |m: &Macro| m.params.as_ref().map(Vec::len);
            if existing.is_function_like()
                && replacement.is_function_like()
                && arity(existing) != arity(&replacement)
            {
                return Err(PreprocessError::MacroRedefinition { name, pos });
            }
        }
        self.macros.insert(name, replacement);
        Ok(())
    }

    fn handle_include(
        &mut self,
        line: &[Token],
        pos: SourcePosition,
        filename: &str,
        reports: &mut ReportHandler,
        output: &mut String,
        depth: usize,
    ) -> PreprocessResult<()> {
        let malformed = || PreprocessError::MalformedDirective {
            directive: "include".to_string(),
            pos,
        };

        let meaningful: Vec<&Token> = line.iter().filter(|t| !t.is_trivia()).collect();
        let (name, is_system) = match meaningful.first() {
            Some(token) if token.kind == TokenKind::StringLiteral => {
                (token.spell_content().to_string(), false)
            }
            Some(token) if token.is(TokenKind::BinaryOp, "<") => {
                let mut name = String::new();
                let mut closed = false;
                for token in &meaningful[1..] {
                    if token.is(TokenKind::BinaryOp, ">") {
                        closed = true;
                        break;
                    }
                    name.push_str(&token.spell);
                }
                if !closed || name.is_empty() {
                    return Err(malformed());
                }
                (name, true)
            }
            _ => return Err(malformed()),
        };

        if depth >= MAX_INCLUDE_DEPTH {
            return Err(PreprocessError::IncludeNestingTooDeep { name, pos });
        }

        let handler = self
            .include_handler
            .as_mut()
            .ok_or_else(|| PreprocessError::MissingInclude {
                name: name.clone(),
                message: "no include handler installed".to_string(),
                pos,
            })?;
        let text = handler
            .include(&name, is_system)
            .map_err(|err| PreprocessError::MissingInclude {
                name: name.clone(),
                message: err.to_string(),
                pos,
            })?;

        output.push_str(&format!("#line 1 \"{}\"\n", name));
        self.process_into(&text, &name, reports, output, depth + 1)?;
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&format!("#line {} \"{}\"\n", pos.row + 1, filename));
        Ok(())
    }

    /// Evaluates a `#if`/`#elif` condition: `defined` is resolved first,
    /// macros are expanded, and the shared evaluator folds the rest.
    fn evaluate_if_condition(&mut self, line: &[Token], directive: &str) -> PreprocessResult<bool> {
        let meaningful: Vec<Token> = line.iter().filter(|t| !t.is_trivia()).cloned().collect();
        let resolved = self.resolve_defined(&meaningful, directive)?;
        let mut in_progress = HashSet::new();
        let expanded = self.expand_token_list(resolved, &mut in_progress)?;
        evaluate_condition(&expanded, directive)
    }

    /// Replaces `defined X` and `defined(X)` with integer literals.
    fn resolve_defined(&self, tokens: &[Token], directive: &str) -> PreprocessResult<Vec<Token>> {
        let mut out = Vec::new();
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            if token.kind == TokenKind::Ident && token.spell == "defined" {
                let pos = token.pos();
                let malformed = || PreprocessError::MalformedDirective {
                    directive: directive.to_string(),
                    pos,
                };
                index += 1;
                let parenthesized = tokens
                    .get(index)
                    .is_some_and(|t| t.kind == TokenKind::LParen);
                if parenthesized {
                    index += 1;
                }
                let ident = tokens
                    .get(index)
                    .filter(|t| t.kind == TokenKind::Ident)
                    .ok_or_else(malformed)?;
                let defined = self.macros.contains_key(&ident.spell);
                index += 1;
                if parenthesized {
                    match tokens.get(index) {
                        Some(t) if t.kind == TokenKind::RParen => index += 1,
                        _ => return Err(malformed()),
                    }
                }
                out.push(Token::new(
                    TokenKind::IntLiteral,
                    if defined { "1" } else { "0" },
                    pos,
                ));
            } else {
                out.push(token.clone());
                index += 1;
            }
        }
        Ok(out)
    }

    /// Expands a macro occurrence in the main token stream. Returns None
    /// when a function-like macro name is not followed by an argument
    /// list (the identifier stays as-is).
    fn expand_from_source(
        &mut self,
        name_token: &Token,
        src: &mut TokenSource,
        _reports: &mut ReportHandler,
    ) -> PreprocessResult<Option<(String, usize)>> {
        let mac = self.macros[&name_token.spell].clone();
        let mut newlines = 0;

        let args = if mac.is_function_like() {
            // Look for the opening parenthesis, buffering what we skip.
            let mut skipped = Vec::new();
            let opening = loop {
                let token = src.next()?;
                match token.kind {
                    TokenKind::WhiteSpace | TokenKind::Comment => skipped.push(token),
                    TokenKind::LParen => break Some(token),
                    _ => {
                        src.push_back(token);
                        break None;
                    }
                }
            };
            if opening.is_none() {
                for token in skipped.into_iter().rev() {
                    src.push_back(token);
                }
                return Ok(None);
            }

            let mut args: Vec<Vec<Token>> = vec![Vec::new()];
            let mut paren_depth = 0usize;
            loop {
                let token = src.next()?;
                match token.kind {
                    TokenKind::EndOfStream => {
                        return Err(PreprocessError::MalformedDirective {
                            directive: format!("macro call '{}'", name_token.spell),
                            pos: name_token.pos(),
                        });
                    }
                    TokenKind::NewLine => newlines += 1,
                    TokenKind::LineBreak => newlines += 1,
                    TokenKind::WhiteSpace | TokenKind::Comment => {}
                    TokenKind::LParen => {
                        paren_depth += 1;
                        args.last_mut().unwrap().push(token);
                    }
                    TokenKind::RParen => {
                        if paren_depth == 0 {
                            break;
                        }
                        paren_depth -= 1;
                        args.last_mut().unwrap().push(token);
                    }
                    TokenKind::Comma if paren_depth == 0 => args.push(Vec::new()),
                    _ => args.last_mut().unwrap().push(token),
                }
            }
            if args.len() == 1 && args[0].is_empty() {
                args.clear();
            }
            args
        } else {
            Vec::new()
        };

        let substituted = self.substitute(&mac, &args)?;
        let mut in_progress: HashSet<String> = HashSet::new();
        in_progress.insert(name_token.spell.clone());
        let expanded = self.expand_token_list(substituted, &mut in_progress)?;
        Ok(Some((join_tokens(expanded.iter()), newlines)))
    }

    /// Parameter substitution, stringize, and token pasting.
    fn substitute(&self, mac: &Macro, args: &[Vec<Token>]) -> PreprocessResult<Vec<Token>> {
        let empty: Vec<String> = Vec::new();
        let params = mac.params.as_ref().unwrap_or(&empty);
        let arg_for = |name: &str| -> Option<&Vec<Token>> {
            params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i))
        };

        let mut out: Vec<Token> = Vec::new();
        let mut pending_paste = false;
        for token in &mac.body {
            if token.kind == TokenKind::DirectiveConcat {
                pending_paste = true;
                continue;
            }

            let mut emitted: Vec<Token> = match token.kind {
                TokenKind::Ident => match arg_for(&token.spell) {
                    Some(arg) => arg.clone(),
                    None => vec![token.clone()],
                },
                // '#param' scans to a Directive token whose spelling is
                // the parameter name: the stringize operator.
                TokenKind::Directive => match arg_for(&token.spell) {
                    Some(arg) => {
                        let text = join_tokens(arg.iter()).replace('\\', "\\\\").replace('"', "\\\"");
                        vec![Token::new(
                            TokenKind::StringLiteral,
                            format!("\"{}\"", text),
                            token.pos(),
                        )]
                    }
                    None => vec![token.clone()],
                },
                _ => vec![token.clone()],
            };

            if pending_paste {
                pending_paste = false;
                if let Some(prev) = out.pop() {
                    if let Some(first) = emitted.first().cloned() {
                        emitted.remove(0);
                        out.push(paste_tokens(&prev, &first));
                    } else {
                        out.push(prev);
                    }
                }
            }
            out.append(&mut emitted);
        }
        Ok(out)
    }

    /// Re-expands a substituted token list, honoring the set of macros
    /// already in progress to stop recursion.
    fn expand_token_list(
        &self,
        tokens: Vec<Token>,
        in_progress: &mut HashSet<String>,
    ) -> PreprocessResult<Vec<Token>> {
        let mut out = Vec::new();
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            if token.kind == TokenKind::Ident && !in_progress.contains(&token.spell) {
                if let Some(mac) = self.macros.get(&token.spell).cloned() {
                    if mac.is_function_like() {
                        // Function-like: the argument list must follow in
                        // this token list.
                        let mut next = index + 1;
                        while tokens.get(next).is_some_and(|t| t.is_trivia()) {
                            next += 1;
                        }
                        if tokens.get(next).is_some_and(|t| t.kind == TokenKind::LParen) {
                            let (args, end) = collect_args(&tokens, next, &token.spell)?;
                            let substituted = self.substitute(&mac, &args)?;
                            in_progress.insert(token.spell.clone());
                            let expanded = self.expand_token_list(substituted, in_progress)?;
                            in_progress.remove(&token.spell);
                            out.extend(expanded);
                            index = end + 1;
                            continue;
                        }
                    } else {
                        in_progress.insert(token.spell.clone());
                        let expanded = self.expand_token_list(mac.body.clone(), in_progress)?;
                        in_progress.remove(&token.spell);
                        out.extend(expanded);
                        index += 1;
                        continue;
                    }
                }
            }
            out.push(token.clone());
            index += 1;
        }
        Ok(out)
    }
}

/// Collects call arguments from a token list; `open` indexes the opening
/// parenthesis. Returns the arguments and the index of the closing one.
fn collect_args(
    tokens: &[Token],
    open: usize,
    macro_name: &str,
) -> PreprocessResult<(Vec<Vec<Token>>, usize)> {
    let mut args: Vec<Vec<Token>> = vec![Vec::new()];
    let mut depth = 0usize;
    let mut index = open + 1;
    while let Some(token) = tokens.get(index) {
        match token.kind {
            TokenKind::LParen => {
                depth += 1;
                args.last_mut().unwrap().push(token.clone());
            }
            TokenKind::RParen => {
                if depth == 0 {
                    if args.len() == 1 && args[0].is_empty() {
                        args.clear();
                    }
                    return Ok((args, index));
                }
                depth -= 1;
                args.last_mut().unwrap().push(token.clone());
            }
            TokenKind::Comma if depth == 0 => args.push(Vec::new()),
            _ if token.is_trivia() => {}
            _ => args.last_mut().unwrap().push(token.clone()),
        }
        index += 1;
    }
    Err(PreprocessError::MalformedDirective {
        directive: format!("macro call '{}'", macro_name),
        pos: tokens[open].pos(),
    })
}

/// Pastes two tokens into one, re-scanning the concatenated spelling.
fn paste_tokens(lhs: &Token, rhs: &Token) -> Token {
    let spell = format!("{}{}", lhs.spell, rhs.spell);
    let rescanned = Scanner::new(&spell, "<paste>").tokenize().ok().and_then(|tokens| {
        let mut meaningful = tokens
            .into_iter()
            .filter(|t| !t.is_trivia() && t.kind != TokenKind::EndOfStream);
        let first = meaningful.next()?;
        meaningful.next().is_none().then_some(first)
    });
    match rescanned {
        Some(token) => Token::new(token.kind, spell, lhs.pos()),
        None => Token::new(TokenKind::Ident, spell, lhs.pos()),
    }
}

fn first_ident(line: &[Token]) -> Option<String> {
    line.iter()
        .find(|t| !t.is_trivia())
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.spell.clone())
}

fn join_tokens<'t>(tokens: impl Iterator<Item = &'t Token>) -> String {
    tokens
        .map(|t| t.spell.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use xshade_common::{CollectingLog, MemoryIncludeHandler};

    fn preprocess(source: &str) -> String {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        Preprocessor::new()
            .process(source, "test.hlsl", &mut reports)
            .expect("preprocessing failed")
    }

    fn contains_token(output: &str, spell: &str) -> bool {
        Scanner::new(output, "check")
            .tokenize()
            .unwrap()
            .iter()
            .any(|t| t.spell == spell)
    }

    #[test]
    fn object_macro_expansion() {
        let output = preprocess("#define SIZE 16\nint a[SIZE];\n");
        assert!(contains_token(&output, "16"));
        assert!(!contains_token(&output, "SIZE"));
    }

    #[test]
    fn function_macro_expansion() {
        let output = preprocess("#define SQR(x) ((x) * (x))\nfloat y = SQR(3.0);\n");
        assert!(output.contains("( 3.0 ) * ( 3.0 )"));
    }

    #[test]
    fn function_macro_without_call_stays() {
        let output = preprocess("#define F(x) x\nint F;\n");
        assert!(contains_token(&output, "F"));
    }

    #[test]
    fn conditional_compilation() {
        let output = preprocess("#define A\n#ifdef A\nint x;\n#else\nint y;\n#endif\n");
        assert!(contains_token(&output, "x"));
        assert!(!contains_token(&output, "y"));
    }

    #[test]
    fn if_with_shift_condition() {
        let output = preprocess("#if (1<<3) > 4\nint x;\n#endif\n");
        assert!(contains_token(&output, "x"));
        let output = preprocess("#if (1<<3) > 40\nint x;\n#endif\n");
        assert!(!contains_token(&output, "x"));
    }

    #[test]
    fn elif_chains() {
        let output = preprocess("#if 0\nint a;\n#elif 1\nint b;\n#else\nint c;\n#endif\n");
        assert!(!contains_token(&output, "a"));
        assert!(contains_token(&output, "b"));
        assert!(!contains_token(&output, "c"));
    }

    #[test]
    fn defined_operator() {
        let output = preprocess("#define A 0\n#if defined(A) && !defined(B)\nint x;\n#endif\n");
        assert!(contains_token(&output, "x"));
    }

    #[test]
    fn token_paste() {
        let output = preprocess("#define GLUE(a, b) a##b\nint GLUE(my, Var) = 1;\n");
        assert!(contains_token(&output, "myVar"));
    }

    #[test]
    fn stringize() {
        let output = preprocess("#define STR(x) #x\nstring s = STR(hello);\n");
        assert!(output.contains("\"hello\""));
    }

    #[test]
    fn line_alignment_is_preserved() {
        let output = preprocess("#define A 1\nint x;\n");
        // The define line collapses to a blank line; 'int x;' stays on
        // row 2.
        let tokens = Scanner::new(&output, "check").tokenize().unwrap();
        let x = tokens.iter().find(|t| t.spell == "x").unwrap();
        assert_eq!(x.pos().row, 2);
    }

    #[test]
    fn include_emits_line_markers() {
        let mut handler = MemoryIncludeHandler::new();
        handler.insert("common.hlsl", "float shared_value;\n");
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let output = Preprocessor::with_include_handler(&mut handler)
            .process("#include \"common.hlsl\"\nint x;\n", "main.hlsl", &mut reports)
            .unwrap();
        assert!(output.contains("#line 1 \"common.hlsl\""));
        assert!(output.contains("#line 2 \"main.hlsl\""));
        assert!(contains_token(&output, "shared_value"));
    }

    #[test]
    fn missing_include_is_fatal() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let result =
            Preprocessor::new().process("#include \"nope.hlsl\"\n", "main.hlsl", &mut reports);
        assert!(matches!(
            result,
            Err(PreprocessError::MissingInclude { .. })
        ));
        assert!(reports.has_errors());
    }

    #[test]
    fn unbalanced_endif_is_an_error() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let result = Preprocessor::new().process("#endif\n", "main.hlsl", &mut reports);
        assert!(matches!(
            result,
            Err(PreprocessError::UnbalancedConditional { .. })
        ));
    }

    #[test]
    fn missing_endif_is_an_error() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let result = Preprocessor::new().process("#if 1\nint x;\n", "main.hlsl", &mut reports);
        assert!(matches!(result, Err(PreprocessError::MissingEndif { .. })));
    }

    #[test]
    fn function_macro_arity_redefinition_is_an_error() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let result = Preprocessor::new().process(
            "#define F(a) a\n#define F(a, b) a\n",
            "main.hlsl",
            &mut reports,
        );
        assert!(matches!(
            result,
            Err(PreprocessError::MacroRedefinition { .. })
        ));
    }

    #[test]
    fn error_directive() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let result =
            Preprocessor::new().process("#error unsupported target\n", "main.hlsl", &mut reports);
        match result {
            Err(PreprocessError::UserError { message, .. }) => {
                assert_eq!(message, "unsupported target");
            }
            other => panic!("expected user error, got {:?}", other),
        }
    }

    #[test]
    fn pragma_is_ignored_with_warning() {
        let mut log = CollectingLog::new();
        {
            let mut reports = ReportHandler::new(&mut log);
            Preprocessor::new()
                .process("#pragma pack_matrix(row_major)\nint x;\n", "main.hlsl", &mut reports)
                .unwrap();
            assert_eq!(reports.warning_count(), 1);
        }
        assert!(log.reports[0].message.contains("pragma"));
    }

    #[test]
    fn macro_list_for_statistics() {
        let mut log = CollectingLog::new();
        let mut reports = ReportHandler::new(&mut log);
        let mut pp = Preprocessor::new();
        pp.process("#define FIRST 1\n#define SECOND 2\n", "main.hlsl", &mut reports)
            .unwrap();
        assert_eq!(pp.defined_macro_idents(), vec!["FIRST", "SECOND"]);
    }

    #[test]
    fn recursive_macro_does_not_loop() {
        let output = preprocess("#define LOOP LOOP\nint LOOP;\n");
        assert!(contains_token(&output, "LOOP"));
    }
}
