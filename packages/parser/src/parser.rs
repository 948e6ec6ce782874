use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IDGenerator;
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

/// Reserved words the lexer reads as identifiers
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "await", "break", "continue", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "nonlocal",
    "not", "or", "raise", "return", "try", "while", "with", "yield",
];

/// Parser for the class outline of a Python module
///
/// Classes, methods, decorators, class-level bindings and receiver
/// assignments are parsed structurally. Any other statement is skipped as
/// an opaque run of tokens (with its indented block, if it opens one), so
/// the parser accepts ordinary Python modules without modelling them.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    id_generator: IDGenerator,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, id_generator: IDGenerator) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
            id_generator,
        })
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let span = self.span(0, self.source.len());
        let mut module = Module::new(span);
        module.docstring = self.parse_docstring();

        while !self.is_at_end() {
            match self.peek_token() {
                Some(Token::Newline) | Some(Token::Dedent) => {
                    self.advance();
                }
                Some(Token::Indent) => {
                    return Err(ParseError::invalid_syntax(
                        self.peek_span(),
                        "unexpected indent",
                    ));
                }
                Some(Token::At) => {
                    let decorators = self.parse_decorators()?;
                    if self.check(Token::Class) {
                        module.classes.push(self.parse_class(decorators)?);
                    } else {
                        module.functions.push(self.parse_function(decorators)?);
                    }
                }
                Some(Token::Class) => {
                    module.classes.push(self.parse_class(Vec::new())?);
                }
                _ if self.is_function_start() => {
                    module.functions.push(self.parse_function(Vec::new())?);
                }
                _ => self.skip_statement(),
            }
        }

        Ok(module)
    }

    /// Parse `@decorator` lines
    fn parse_decorators(&mut self) -> ParseResult<Vec<Decorator>> {
        let mut decorators = Vec::new();

        while self.check(Token::At) {
            let start = self.peek_span().start;
            self.advance();
            let expression = self.parse_expression()?;
            let end = self.previous_end();
            self.expect(Token::Newline)?;
            decorators.push(Decorator {
                expression,
                span: self.span(start, end),
            });
        }

        if !self.check(Token::Class) && !self.is_function_start() {
            return Err(ParseError::unexpected_token(
                self.peek_span(),
                "'class' or 'def' after decorator",
                Self::format_token(self.peek()),
            ));
        }

        Ok(decorators)
    }

    /// Parse a class definition
    fn parse_class(&mut self, decorators: Vec<Decorator>) -> ParseResult<ClassDef> {
        let start = self.peek_span().start;
        self.expect(Token::Class)?;
        let name = self.expect_ident()?;

        let mut bases = Vec::new();
        let mut keywords = Vec::new();
        if self.match_token(Token::LParen) {
            for argument in self.parse_arguments()? {
                let is_keyword = argument.name.is_some();
                match (argument.unpack, is_keyword) {
                    (Unpack::None, false) => bases.push(argument.value),
                    (Unpack::Iterable, _) => {
                        // `*bases` is only known at runtime
                        let span = argument.value.span().clone();
                        bases.push(Expression::Other {
                            text: format!("*{}", argument.value),
                            span,
                        });
                    }
                    _ => keywords.push(argument),
                }
            }
        }
        self.expect(Token::Colon)?;

        let mut class = ClassDef {
            name,
            bases,
            keywords,
            decorators,
            docstring: None,
            methods: Vec::new(),
            attributes: Vec::new(),
            classes: Vec::new(),
            span: Span::new(start, start, String::new()),
        };

        if self.match_token(Token::Newline) {
            self.expect(Token::Indent)?;
            class.docstring = self.parse_docstring();
            while !self.is_at_end() {
                if self.match_token(Token::Dedent) {
                    break;
                }
                self.parse_class_statement(&mut class)?;
            }
        } else {
            // Single-line suite: `class A: pass`
            class.docstring = self.parse_docstring();
            while !self.previous_is(Token::Newline)
                && !self.check(Token::Dedent)
                && !self.is_at_end()
            {
                self.parse_class_statement(&mut class)?;
            }
        }

        let end = self.previous_end();
        class.span = self.span(start, end);
        Ok(class)
    }

    /// Parse one statement of a class body
    fn parse_class_statement(&mut self, class: &mut ClassDef) -> ParseResult<()> {
        match self.peek_token() {
            Some(Token::Newline) => {
                self.advance();
            }
            Some(Token::Indent) => {
                return Err(ParseError::invalid_syntax(
                    self.peek_span(),
                    "unexpected indent",
                ));
            }
            Some(Token::At) => {
                let decorators = self.parse_decorators()?;
                if self.check(Token::Class) {
                    class.classes.push(self.parse_class(decorators)?);
                } else {
                    class.methods.push(self.parse_function(decorators)?);
                }
            }
            Some(Token::Class) => {
                class.classes.push(self.parse_class(Vec::new())?);
            }
            _ if self.is_function_start() => {
                class.methods.push(self.parse_function(Vec::new())?);
            }
            Some(Token::Ident(_)) if self.is_assignment_start() => {
                let assignments = self.parse_assignment()?;
                class.attributes.extend(assignments);
            }
            _ => self.skip_statement(),
        }
        Ok(())
    }

    /// Parse a function or method definition
    fn parse_function(&mut self, decorators: Vec<Decorator>) -> ParseResult<FunctionDef> {
        let start = self.peek_span().start;
        let is_async = self.match_token(Token::Async);
        self.expect(Token::Def)?;
        let name = self.expect_ident()?;

        self.expect(Token::LParen)?;
        let parameters = self.parse_parameters()?;
        let returns = if self.match_token(Token::Arrow) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(Token::Colon)?;

        let mut function = FunctionDef {
            name,
            parameters,
            decorators,
            returns,
            docstring: None,
            is_async,
            receiver_assignments: Vec::new(),
            span: Span::new(start, start, String::new()),
        };
        let receiver = function.receiver().map(str::to_string);
        let mut assignments = Vec::new();

        if self.match_token(Token::Newline) {
            self.expect(Token::Indent)?;
            function.docstring = self.parse_docstring();
            self.scan_function_body(receiver.as_deref(), &mut assignments);
        } else {
            function.docstring = self.parse_docstring();
            if !self.previous_is(Token::Newline) {
                self.scan_logical_line(receiver.as_deref(), &mut assignments);
            }
        }

        function.receiver_assignments = assignments;
        let end = self.previous_end();
        function.span = self.span(start, end);
        Ok(function)
    }

    /// Parse a parameter list; the opening paren is already consumed
    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut keyword_only = false;

        while !self.check(Token::RParen) {
            let (name, kind) = match self.peek_token() {
                Some(Token::Op("/")) => {
                    self.advance();
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                    continue;
                }
                Some(Token::Op("*")) => {
                    self.advance();
                    keyword_only = true;
                    if !matches!(self.peek_token(), Some(Token::Ident(_))) {
                        if !self.match_token(Token::Comma) {
                            break;
                        }
                        continue;
                    }
                    (self.expect_ident()?, ParameterKind::VarPositional)
                }
                Some(Token::Op("**")) => {
                    self.advance();
                    (self.expect_ident()?, ParameterKind::VarKeyword)
                }
                Some(Token::Ident(_)) => {
                    let kind = if keyword_only {
                        ParameterKind::KeywordOnly
                    } else {
                        ParameterKind::Positional
                    };
                    (self.expect_ident()?, kind)
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "parameter",
                        Self::format_token(self.peek()),
                    ));
                }
            };

            let annotation = if self.match_token(Token::Colon) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let default = if self.match_token(Token::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };

            parameters.push(Parameter {
                name,
                kind,
                annotation,
                default,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RParen)?;
        Ok(parameters)
    }

    /// Walk a function body collecting receiver assignments.
    ///
    /// Runs after the body's `Indent` and consumes through its `Dedent`.
    /// Nested blocks are walked; nested `def`/`class` are skipped since they
    /// open a new scope.
    fn scan_function_body(&mut self, receiver: Option<&str>, out: &mut Vec<Assignment>) {
        let mut level = 1usize;

        while let Some(token) = self.peek_token().cloned() {
            match token {
                Token::Indent => {
                    level += 1;
                    self.advance();
                }
                Token::Dedent => {
                    self.advance();
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                }
                Token::Def | Token::Class | Token::At => self.skip_statement(),
                _ if self.is_function_start() => self.skip_statement(),
                _ => self.scan_logical_line(receiver, out),
            }
        }
    }

    /// Scan one logical line for `receiver.attr = value` statements
    fn scan_logical_line(&mut self, receiver: Option<&str>, out: &mut Vec<Assignment>) {
        let mut depth = 0usize;
        let mut at_statement_start = true;

        while let Some(token) = self.peek_token().cloned() {
            match token {
                Token::Newline => {
                    self.advance();
                    break;
                }
                Token::Indent | Token::Dedent => break,
                _ => {}
            }

            if depth == 0 && at_statement_start {
                let checkpoint = self.pos;
                match self.try_receiver_assignment(receiver) {
                    Ok(Some(assignments)) => {
                        out.extend(assignments);
                        at_statement_start = false;
                        continue;
                    }
                    Ok(None) => {}
                    // Body statements are not modelled; a value we cannot
                    // parse only loses that one binding
                    Err(_) => self.pos = checkpoint,
                }
            }

            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            at_statement_start =
                depth == 0 && matches!(token, Token::Colon | Token::Semi | Token::Comma);
            self.advance();
        }
    }

    /// `recv.a = v`, `recv.a, recv.b = v`, `recv.a: T = v`, `recv.a = recv.b = v`
    fn try_receiver_assignment(
        &mut self,
        receiver: Option<&str>,
    ) -> ParseResult<Option<Vec<Assignment>>> {
        let Some(receiver) = receiver else {
            return Ok(None);
        };
        let checkpoint = self.pos;
        let start = self.peek_span().start;

        let targets = match self.parse_receiver_targets(receiver) {
            Some(targets) => targets,
            None => {
                self.pos = checkpoint;
                return Ok(None);
            }
        };

        let mut groups = vec![targets];
        let mut annotation = None;
        let value;
        if groups[0].len() == 1 && self.match_token(Token::Colon) {
            annotation = Some(self.parse_expression()?);
            value = if self.match_token(Token::Eq) {
                Some(self.parse_expression_list()?)
            } else {
                None
            };
        } else if self.match_token(Token::Eq) {
            let mut current = self.parse_expression_list()?;
            while self.match_token(Token::Eq) {
                if let Expression::Attribute {
                    value: object,
                    attr,
                    ..
                } = &current
                {
                    if object.is_name(receiver) {
                        groups.push(vec![attr.clone()]);
                    }
                }
                current = self.parse_expression_list()?;
            }
            value = Some(current);
        } else {
            self.pos = checkpoint;
            return Ok(None);
        }

        let end = self.previous_end();
        Ok(Some(self.bind_groups(groups, value, annotation, start, end)))
    }

    fn parse_receiver_targets(&mut self, receiver: &str) -> Option<Vec<String>> {
        let mut targets = Vec::new();
        loop {
            match (
                self.peek_token(),
                self.peek_ahead_token(1),
                self.peek_ahead_token(2),
            ) {
                (Some(Token::Ident(name)), Some(Token::Dot), Some(Token::Ident(attr)))
                    if *name == receiver =>
                {
                    targets.push(attr.to_string());
                    self.pos += 3;
                }
                _ => return None,
            }
            if !self.check(Token::Comma) {
                break;
            }
            self.advance();
        }
        Some(targets)
    }

    /// Parse a class-level assignment statement
    fn parse_assignment(&mut self) -> ParseResult<Vec<Assignment>> {
        let start = self.peek_span().start;

        if matches!(self.peek_ahead_token(1), Some(Token::Colon)) {
            let target = self.expect_ident()?;
            self.expect(Token::Colon)?;
            let annotation = Some(self.parse_expression()?);
            let value = if self.match_token(Token::Eq) {
                Some(self.parse_expression_list()?)
            } else {
                None
            };
            let end = self.previous_end();
            let assignments = self.bind_groups(vec![vec![target]], value, annotation, start, end);
            self.finish_simple_statement();
            return Ok(assignments);
        }

        let mut targets = Vec::new();
        loop {
            targets.push(self.expect_ident()?);
            if !self.match_token(Token::Comma) || self.check(Token::Eq) {
                break;
            }
        }
        self.expect(Token::Eq)?;

        let mut groups = vec![targets];
        let mut value = self.parse_expression_list()?;
        while self.match_token(Token::Eq) {
            // `a = b = value`: everything left of the last `=` is a target
            match &value {
                Expression::Name { id, .. } => groups.push(vec![id.clone()]),
                Expression::Tuple { elements, .. } => {
                    groups.push(elements.iter().filter_map(|e| e.dotted_name()).collect());
                }
                _ => {}
            }
            value = self.parse_expression_list()?;
        }

        let end = self.previous_end();
        let assignments = self.bind_groups(groups, Some(value), None, start, end);
        self.finish_simple_statement();
        Ok(assignments)
    }

    /// Bind each target list of a (possibly chained) assignment to the same value
    fn bind_groups(
        &mut self,
        groups: Vec<Vec<String>>,
        value: Option<Expression>,
        annotation: Option<Expression>,
        start: usize,
        end: usize,
    ) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        for targets in groups {
            let bound = self.bind_targets(targets, value.clone(), annotation.clone(), start, end);
            assignments.extend(bound);
        }
        assignments
    }

    /// One assignment per target; unpacking pairs targets with tuple elements
    fn bind_targets(
        &mut self,
        targets: Vec<String>,
        value: Option<Expression>,
        annotation: Option<Expression>,
        start: usize,
        end: usize,
    ) -> Vec<Assignment> {
        let unpacked: Option<Vec<Expression>> = match &value {
            Some(v) if targets.len() > 1 => v
                .elements()
                .filter(|elements| elements.len() == targets.len())
                .map(|elements| elements.to_vec()),
            _ => None,
        };
        let single = targets.len() == 1;

        targets
            .into_iter()
            .enumerate()
            .map(|(i, target)| {
                let value = match &unpacked {
                    Some(elements) => Some(elements[i].clone()),
                    None if single => value.clone(),
                    None => None,
                };
                Assignment {
                    target,
                    value,
                    annotation: annotation.clone(),
                    span: self.span(start, end),
                }
            })
            .collect()
    }

    /// Parse a docstring if the next statement is a bare string literal
    fn parse_docstring(&mut self) -> Option<String> {
        let mut offset = 0;
        while matches!(self.peek_ahead_token(offset), Some(Token::String(_))) {
            offset += 1;
        }
        if offset == 0
            || !matches!(
                self.peek_ahead_token(offset),
                None | Some(Token::Newline) | Some(Token::Dedent)
            )
        {
            return None;
        }

        let mut value = String::new();
        for _ in 0..offset {
            if let Some((Token::String(literal), _)) = self.advance() {
                value.push_str(&unquote(literal));
            }
        }
        self.match_token(Token::Newline);
        Some(value)
    }

    /// Parse `a, b, c` into a tuple, or a single expression
    fn parse_expression_list(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span().start;
        let first = self.parse_expression()?;
        if !self.check(Token::Comma) {
            return Ok(first);
        }

        let mut elements = vec![first];
        while self.match_token(Token::Comma) {
            if self.at_expression_end() {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        let end = self.previous_end();
        Ok(Expression::Tuple {
            elements,
            span: self.span(start, end),
        })
    }

    /// Parse one expression; anything beyond a postfix chain becomes `Other`
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span().start;
        if self.check(Token::Lambda) {
            return Ok(self.parse_opaque(start));
        }

        let primary = self.parse_postfix_expression()?;
        if self.at_expression_end() {
            return Ok(primary);
        }

        // Operators, conditional expressions, comprehensions
        Ok(self.parse_opaque(start))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span().start;
        let mut expr = self.parse_primary_expression()?;

        loop {
            if self.check(Token::Dot) {
                let Some(Token::Ident(attr)) = self.peek_ahead_token(1).cloned() else {
                    break;
                };
                self.pos += 2;
                let end = self.previous_end();
                expr = Expression::Attribute {
                    value: Box::new(expr),
                    attr: attr.to_string(),
                    span: self.span(start, end),
                };
            } else if self.match_token(Token::LParen) {
                let arguments = self.parse_arguments()?;
                let end = self.previous_end();
                expr = Expression::Call {
                    func: Box::new(expr),
                    arguments,
                    span: self.span(start, end),
                };
            } else if self.check(Token::LBracket) {
                let inner = self.skip_balanced();
                let end = self.previous_end();
                expr = Expression::Subscript {
                    value: Box::new(expr),
                    slice: self.source[inner].trim().to_string(),
                    span: self.span(start, end),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        let start = self.peek_span().start;

        match self.peek_token().cloned() {
            Some(Token::Ident(id)) => {
                self.advance();
                let end = self.previous_end();
                Ok(Expression::Name {
                    id: id.to_string(),
                    span: self.span(start, end),
                })
            }
            Some(Token::String(_)) => {
                // Adjacent literals concatenate
                let mut value = String::new();
                while let Some(Token::String(literal)) = self.peek_token().cloned() {
                    value.push_str(&unquote(literal));
                    self.advance();
                }
                let end = self.previous_end();
                Ok(Expression::Str {
                    value,
                    span: self.span(start, end),
                })
            }
            Some(Token::Number(value)) => {
                self.advance();
                let end = self.previous_end();
                Ok(Expression::Number {
                    value: value.to_string(),
                    span: self.span(start, end),
                })
            }
            Some(Token::LParen) => {
                self.advance();
                if self.match_token(Token::RParen) {
                    let end = self.previous_end();
                    return Ok(Expression::Tuple {
                        elements: Vec::new(),
                        span: self.span(start, end),
                    });
                }
                let first = self.parse_expression()?;
                if !self.check(Token::Comma) {
                    self.expect(Token::RParen)?;
                    return Ok(first);
                }
                let mut elements = vec![first];
                while self.match_token(Token::Comma) {
                    if self.check(Token::RParen) {
                        break;
                    }
                    elements.push(self.parse_expression()?);
                }
                self.expect(Token::RParen)?;
                let end = self.previous_end();
                Ok(Expression::Tuple {
                    elements,
                    span: self.span(start, end),
                })
            }
            Some(Token::LBracket) => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(Token::RBracket) {
                    elements.push(self.parse_expression()?);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket)?;
                let end = self.previous_end();
                Ok(Expression::List {
                    elements,
                    span: self.span(start, end),
                })
            }
            Some(Token::LBrace) => {
                self.skip_balanced();
                let end = self.previous_end();
                Ok(Expression::Other {
                    text: self.source[start..end].to_string(),
                    span: self.span(start, end),
                })
            }
            None => Err(ParseError::unexpected_eof(start, "expression")),
            Some(_) if self.at_expression_end() => Err(ParseError::unexpected_token(
                self.peek_span(),
                "expression",
                Self::format_token(self.peek()),
            )),
            Some(_) => Ok(self.parse_opaque(start)),
        }
    }

    /// Parse call arguments; the opening paren is already consumed
    fn parse_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        let mut arguments = Vec::new();

        while !self.check(Token::RParen) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_eof(self.peek_span().start, "')'"));
            }

            let unpack = match self.peek_token() {
                Some(Token::Op("*")) => Unpack::Iterable,
                Some(Token::Op("**")) => Unpack::Mapping,
                _ => Unpack::None,
            };
            if unpack != Unpack::None {
                self.advance();
            }

            let name = match (unpack, self.peek_token(), self.peek_ahead_token(1)) {
                (Unpack::None, Some(Token::Ident(name)), Some(Token::Eq)) => {
                    let name = name.to_string();
                    self.pos += 2;
                    Some(name)
                }
                _ => None,
            };

            let value = self.parse_expression()?;
            arguments.push(Argument {
                name,
                value,
                unpack,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RParen)?;
        Ok(arguments)
    }

    /// Consume tokens up to the end of the current expression and keep the source text
    fn parse_opaque(&mut self, start: usize) -> Expression {
        let mut depth = 0usize;
        let mut in_lambda = false;

        while let Some(token) = self.peek_token().cloned() {
            if matches!(token, Token::Newline | Token::Indent | Token::Dedent) {
                break;
            }
            if depth == 0 {
                if matches!(token, Token::Lambda) {
                    in_lambda = true;
                } else if in_lambda {
                    // Parameter commas and defaults belong to the lambda
                    if matches!(token, Token::Colon) {
                        in_lambda = false;
                    }
                    self.advance();
                    continue;
                } else if self.at_expression_end() {
                    break;
                }
            }
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        let end = self.previous_end().max(start);
        Expression::Other {
            text: self.source[start..end].to_string(),
            span: self.span(start, end),
        }
    }

    /// Skip a bracketed group starting at the current open bracket; returns the inner source range
    fn skip_balanced(&mut self) -> Range<usize> {
        let inner_start = self.peek_span().end;
        let mut depth = 0usize;

        while let Some(token) = self.peek_token().cloned() {
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let inner_end = self.peek_span().start;
                        self.advance();
                        return inner_start..inner_end;
                    }
                }
                Token::Newline | Token::Indent | Token::Dedent => break,
                _ => {}
            }
            self.advance();
        }

        inner_start..self.previous_end().max(inner_start)
    }

    /// Skip the rest of a statement, including the block it opens
    fn skip_statement(&mut self) {
        let mut opens_block = false;

        while let Some(token) = self.peek_token().cloned() {
            match token {
                Token::Newline => {
                    self.advance();
                    break;
                }
                Token::Indent | Token::Dedent => break,
                _ => {
                    opens_block = matches!(token, Token::Colon);
                    self.advance();
                }
            }
        }

        if opens_block && self.check(Token::Indent) {
            self.skip_block();
        }
    }

    fn skip_block(&mut self) {
        let mut level = 0usize;
        while let Some(token) = self.peek_token().cloned() {
            match token {
                Token::Indent => level += 1,
                Token::Dedent => {
                    level -= 1;
                    if level == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// End a simple statement; trailing tokens the outline does not model are skipped
    fn finish_simple_statement(&mut self) {
        if self.match_token(Token::Semi) {
            self.match_token(Token::Newline);
            return;
        }
        self.skip_statement();
    }

    fn is_function_start(&self) -> bool {
        match self.peek_token() {
            Some(Token::Def) => true,
            Some(Token::Async) => matches!(self.peek_ahead_token(1), Some(Token::Def)),
            _ => false,
        }
    }

    /// `name =`, `name: T`, or `a, b = ...` at statement start
    fn is_assignment_start(&self) -> bool {
        if matches!(self.peek_token(), Some(Token::Ident(name)) if KEYWORDS.contains(name)) {
            return false;
        }
        match self.peek_ahead_token(1) {
            Some(Token::Eq) | Some(Token::Colon) => true,
            Some(Token::Comma) => {
                let mut offset = 0;
                loop {
                    match (self.peek_ahead_token(offset), self.peek_ahead_token(offset + 1)) {
                        (Some(Token::Ident(_)), Some(Token::Comma)) => offset += 2,
                        (Some(Token::Ident(_)), Some(Token::Eq)) => return true,
                        (Some(Token::Eq), _) => return offset > 0,
                        _ => return false,
                    }
                }
            }
            _ => false,
        }
    }

    fn at_expression_end(&self) -> bool {
        matches!(
            self.peek_token(),
            None | Some(Token::Newline)
                | Some(Token::Indent)
                | Some(Token::Dedent)
                | Some(Token::Comma)
                | Some(Token::RParen)
                | Some(Token::RBracket)
                | Some(Token::RBrace)
                | Some(Token::Eq)
                | Some(Token::Colon)
                | Some(Token::Semi)
                | Some(Token::Arrow)
                | Some(Token::AugAssign(_))
        )
    }

    // Helper methods

    fn span(&mut self, start: usize, end: usize) -> Span {
        Span::new(start, end, self.id_generator.new_id())
    }

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token<'src>> {
        self.peek().map(|(token, _)| token)
    }

    fn peek_ahead_token(&self, offset: usize) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some(t) = self.peek_token() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn previous_is(&self, token: Token) -> bool {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(t, _)| std::mem::discriminant(t) == std::mem::discriminant(&token))
            .unwrap_or(false)
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(ParseError::unexpected_eof(
                self.source.len(),
                Self::format_expected_token(&token),
            ))
        } else {
            Err(ParseError::unexpected_token(
                self.peek_span(),
                Self::format_expected_token(&token),
                Self::format_token(self.peek()),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::Ident(s)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_span(),
                "identifier",
                Self::format_token(self.peek()),
            )),
        }
    }

    /// End offset of the last consumed token that carries source text
    fn previous_end(&self) -> usize {
        self.tokens[..self.pos.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|(token, _)| !matches!(token, Token::Indent | Token::Dedent | Token::Newline))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Get the span of the next token (the one we're about to consume)
    fn peek_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or_else(|| {
                let end = self.source.len();
                end..end
            })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&(Token, Range<usize>)>) -> String {
        match token {
            None => "end of file".to_string(),
            Some((Token::Ident(s), _)) => format!("identifier '{}'", s),
            Some((Token::String(s), _)) => format!("string {}", s),
            Some((Token::Number(n), _)) => format!("number {}", n),
            Some((Token::Op(op), _)) | Some((Token::AugAssign(op), _)) => format!("'{}'", op),
            Some((Token::Newline, _)) => "end of line".to_string(),
            Some((Token::Indent, _)) => "indent".to_string(),
            Some((Token::Dedent, _)) => "dedent".to_string(),
            Some((token, _)) => Self::format_expected_token(token),
        }
    }

    fn format_expected_token(token: &Token) -> String {
        match token {
            Token::Class => "keyword 'class'".to_string(),
            Token::Def => "keyword 'def'".to_string(),
            Token::Async => "keyword 'async'".to_string(),
            Token::Pass => "keyword 'pass'".to_string(),
            Token::Lambda => "keyword 'lambda'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Semi => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::At => "'@'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::Indent => "indented block".to_string(),
            token => format!("{:?}", token),
        }
    }
}

pub fn parse(source: &str) -> ParseResult<Module> {
    parse_with_path(source, "<anonymous>")
}

pub fn parse_with_path(source: &str, path: &str) -> ParseResult<Module> {
    let id_generator = IDGenerator::new(path);
    let mut parser = Parser::new(source, id_generator)?;
    parser.parse_module()
}
