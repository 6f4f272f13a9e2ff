//! hrw4u Parser
//!
//! Recursive descent parser that converts tokens into an AST. Errors do
//! not stop the parse: the parser records them and resynchronises at the
//! next statement or section boundary, so one pass reports every syntax
//! error and still yields a best-effort tree.

use crate::parser::ast::*;
use crate::parser::lexer::{tokenize_lossy, LexError, Location, Spanned, Token};
use thiserror::Error;
use tracing::trace;

/// Parser error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        span: Location,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { position: usize, expected: String },

    #[error("{message}")]
    InvalidSyntax { span: Location, message: String },
}

impl ParseError {
    pub fn span(&self) -> Location {
        match self {
            ParseError::Lex(e) => e.span(),
            ParseError::UnexpectedToken { span, .. } | ParseError::InvalidSyntax { span, .. } => *span,
            ParseError::UnexpectedEof { position, .. } => Location::new(*position, *position),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    eof: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> Self {
        let (tokens, lex_errors) = tokenize_lossy(source);
        Self {
            tokens,
            pos: 0,
            eof: source.len(),
            errors: lex_errors.into_iter().map(ParseError::from).collect(),
        }
    }

    /// Parse the entire file
    pub fn parse(&mut self) -> Program {
        let mut program = Program::default();

        while !self.is_eof() {
            match self.parse_section() {
                Ok(section) => program.sections.push(section),
                Err(e) => {
                    self.errors.push(e);
                    self.recover_section();
                }
            }
        }

        program
    }

    /// Errors in source order
    pub fn into_errors(self) -> Vec<ParseError> {
        let mut errors = self.errors;
        errors.sort_by_key(|e| e.span().start);
        errors
    }

    // ========================================
    // Sections
    // ========================================

    fn parse_section(&mut self) -> ParseResult<Node<Section>> {
        let start = self.current_span();
        let name = self.expect_identifier("section name")?;
        self.expect(Token::BraceOpen)?;

        let body = if name.inner == "VARS" {
            SectionBody::Vars(self.parse_vars()?)
        } else {
            SectionBody::Items(self.parse_items()?)
        };

        let end = self.current_span();
        self.expect(Token::BraceClose)?;
        trace!("section `{}' parsed", name.inner);

        Ok(Node::new(Section { name, body }, start.join(end)))
    }

    fn parse_vars(&mut self) -> ParseResult<Vec<Node<VarDecl>>> {
        let mut decls = Vec::new();
        while !self.check(&Token::BraceClose) && !self.is_eof() {
            match self.parse_var_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    self.errors.push(e);
                    self.recover_statement();
                }
            }
        }
        Ok(decls)
    }

    fn parse_var_decl(&mut self) -> ParseResult<Node<VarDecl>> {
        let name = self.expect_identifier("variable name")?;
        self.expect(Token::Colon)?;
        let ty = self.expect_identifier("variable type")?;

        let slot = if self.check(&Token::At) {
            self.advance();
            let (text, span) = self.expect_number()?;
            let slot = text.parse::<usize>().map_err(|_| ParseError::InvalidSyntax {
                span,
                message: format!("invalid slot number '{}'", text),
            })?;
            Some(slot)
        } else {
            None
        };

        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        let span = name.span.join(end);
        Ok(Node::new(VarDecl { name, ty, slot }, span))
    }

    fn parse_items(&mut self) -> ParseResult<Vec<Node<SectionItem>>> {
        let mut items = Vec::new();
        while !self.check(&Token::BraceClose) && !self.is_eof() {
            let item = if self.check(&Token::If) {
                self.parse_conditional()
                    .map(|c| Node::new(SectionItem::Conditional(c.inner), c.span))
            } else {
                self.parse_statement()
                    .map(|s| Node::new(SectionItem::Statement(s.inner), s.span))
            };
            match item {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.recover_statement();
                }
            }
        }
        Ok(items)
    }

    // ========================================
    // Conditionals
    // ========================================

    fn parse_conditional(&mut self) -> ParseResult<Node<Conditional>> {
        let start = self.current_span();
        self.expect(Token::If)?;

        let mut branches = vec![self.parse_branch()?];
        while self.check(&Token::Elif) {
            self.advance();
            branches.push(self.parse_branch()?);
        }

        let otherwise = if self.check(&Token::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = otherwise
            .as_ref()
            .map(|b| b.span)
            .or_else(|| branches.last().map(|b| b.block.span))
            .unwrap_or(start);
        Ok(Node::new(Conditional { branches, otherwise }, start.join(end)))
    }

    fn parse_branch(&mut self) -> ParseResult<Branch> {
        let condition = self.parse_expr()?;
        let block = self.parse_block()?;
        Ok(Branch { condition, block })
    }

    fn parse_block(&mut self) -> ParseResult<Node<Block>> {
        let start = self.current_span();
        self.expect(Token::BraceOpen)?;

        let mut statements = Vec::new();
        while !self.check(&Token::BraceClose) && !self.is_eof() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(e) => {
                    self.errors.push(e);
                    self.recover_statement();
                }
            }
        }

        let end = self.current_span();
        self.expect(Token::BraceClose)?;
        Ok(Node::new(statements, start.join(end)))
    }

    // ========================================
    // Statements
    // ========================================

    fn parse_statement(&mut self) -> ParseResult<Node<Statement>> {
        let start = self.current_span();

        let statement = match self.peek().cloned() {
            Some(Token::Break) => {
                self.advance();
                Statement::Break
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_identifier("statement")?;
                match self.peek() {
                    Some(Token::ParenOpen) => {
                        let call = self.parse_call_rest(name)?;
                        let modifiers = self.parse_modifiers()?;
                        Statement::Call { call, modifiers }
                    }
                    Some(Token::Assign) | Some(Token::PlusAssign) => {
                        let op = match self.advance() {
                            Some(Token::PlusAssign) => AssignOp::Append,
                            _ => AssignOp::Set,
                        };
                        let value = self.parse_value()?;
                        let modifiers = self.parse_modifiers()?;
                        Statement::Assign {
                            target: name,
                            op,
                            value,
                            modifiers,
                        }
                    }
                    Some(Token::Semicolon) => Statement::Bare { name },
                    _ => return Err(self.unexpected("'(', '=', '+=' or ';'")),
                }
            }
            _ => return Err(self.unexpected("statement")),
        };

        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        Ok(Node::new(statement, start.join(end)))
    }

    fn parse_call_rest(&mut self, name: Node<String>) -> ParseResult<Call> {
        self.expect(Token::ParenOpen)?;
        let mut args = Vec::new();
        while !self.check(&Token::ParenClose) {
            args.push(self.parse_value()?);
            if !self.check(&Token::ParenClose) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::ParenClose)?;
        Ok(Call { name, args })
    }

    /// Optional `with A, B`
    fn parse_modifiers(&mut self) -> ParseResult<Vec<Node<String>>> {
        let mut modifiers = Vec::new();
        if !self.check(&Token::With) {
            return Ok(modifiers);
        }
        self.advance();
        modifiers.push(self.expect_identifier("modifier")?);
        while self.check(&Token::Comma) {
            self.advance();
            modifiers.push(self.expect_identifier("modifier")?);
        }
        Ok(modifiers)
    }

    // ========================================
    // Expressions
    // ========================================

    fn parse_expr(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_term()?;
        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_term()?;
            let span = left.span.join(right.span);
            left = Node::new(Expr::Or(Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_factor()?;
        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_factor()?;
            let span = left.span.join(right.span);
            left = Node::new(Expr::And(Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_span();
        match self.peek().cloned() {
            Some(Token::Not) => {
                self.advance();
                let inner = self.parse_factor()?;
                let span = start.join(inner.span);
                Ok(Node::new(Expr::Not(Box::new(inner)), span))
            }
            Some(Token::ParenOpen) => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.current_span();
                self.expect(Token::ParenClose)?;
                Ok(Node::new(Expr::Group(Box::new(inner)), start.join(end)))
            }
            Some(Token::True) => {
                self.advance();
                Ok(Node::new(Expr::Bool(true), start))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Node::new(Expr::Bool(false), start))
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_identifier("condition")?;
                let operand = if self.check(&Token::ParenOpen) {
                    let call = self.parse_call_rest(name)?;
                    let span = start.join(self.previous_span());
                    Node::new(Operand::Call(call), span)
                } else {
                    Node::new(Operand::Ident(name.inner), name.span)
                };

                if self.at_comparison() {
                    let comparison = self.parse_comparison_rest(operand)?;
                    let span = start.join(self.previous_span());
                    return Ok(Node::new(Expr::Compare(comparison), span));
                }

                let span = operand.span;
                Ok(match operand.inner {
                    Operand::Call(call) => Node::new(Expr::Call(call), span),
                    Operand::Ident(name) => Node::new(Expr::Ident(name), span),
                })
            }
            _ => Err(self.unexpected("condition")),
        }
    }

    fn at_comparison(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Eq
                    | Token::Ne
                    | Token::Gt
                    | Token::Lt
                    | Token::Match
                    | Token::NotMatch
                    | Token::In
            )
        )
    }

    fn parse_comparison_rest(&mut self, lhs: Node<Operand>) -> ParseResult<Comparison> {
        let op_span = self.current_span();
        let op = match self.advance() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Match) => CompareOp::Match,
            Some(Token::NotMatch) => CompareOp::NotMatch,
            Some(Token::In) => CompareOp::In,
            _ => {
                return Err(ParseError::InvalidSyntax {
                    span: op_span,
                    message: "expected a comparison operator".to_string(),
                });
            }
        };

        let start = self.current_span();
        let rhs = match op {
            CompareOp::Match | CompareOp::NotMatch => match self.peek().cloned() {
                Some(Token::Regex(re)) => {
                    self.advance();
                    Rhs::Regex(re)
                }
                _ => return Err(self.unexpected("regular expression")),
            },
            CompareOp::In if self.check(&Token::BracketOpen) => Rhs::Set(self.parse_set()?),
            CompareOp::In if self.check(&Token::BraceOpen) => Rhs::IpRange(self.parse_ip_range()?),
            CompareOp::In => return Err(self.unexpected("'[' or '{'")),
            _ => Rhs::Value(self.parse_value()?.inner),
        };
        let rhs = Node::new(rhs, start.join(self.previous_span()));
        let modifiers = self.parse_modifiers()?;

        Ok(Comparison {
            lhs,
            op,
            rhs,
            modifiers,
        })
    }

    fn parse_set(&mut self) -> ParseResult<Vec<Node<Value>>> {
        self.expect(Token::BracketOpen)?;
        let mut values = vec![self.parse_value()?];
        while self.check(&Token::Comma) {
            self.advance();
            values.push(self.parse_value()?);
        }
        self.expect(Token::BracketClose)?;
        Ok(values)
    }

    fn parse_ip_range(&mut self) -> ParseResult<Vec<Node<String>>> {
        self.expect(Token::BraceOpen)?;
        let mut ranges = Vec::new();
        loop {
            let span = self.current_span();
            match self.peek().cloned() {
                Some(Token::Ip(ip)) => {
                    self.advance();
                    ranges.push(Node::new(ip, span));
                }
                _ => return Err(self.unexpected("IP address or network")),
            }
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(Token::BraceClose)?;
        Ok(ranges)
    }

    fn parse_value(&mut self) -> ParseResult<Node<Value>> {
        let span = self.current_span();
        let value = match self.peek().cloned() {
            Some(Token::Str(s)) => Value::Str(s),
            Some(Token::Number(n)) => Value::Number(n),
            Some(Token::Ident(i)) => Value::Ident(i),
            Some(Token::Ip(ip)) => Value::Ip(ip),
            Some(Token::True) => Value::Bool(true),
            Some(Token::False) => Value::Bool(false),
            _ => return Err(self.unexpected("value")),
        };
        self.advance();
        Ok(Node::new(value, span))
    }

    // ========================================
    // Recovery
    // ========================================

    /// Skip to just past the next `;`, or to the `}` closing the
    /// enclosing block, skipping over any nested block on the way
    fn recover_statement(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                Token::BraceClose if depth == 0 => return,
                Token::BraceClose => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                    continue;
                }
                Token::BraceOpen => depth += 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip past the current section
    fn recover_section(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::BraceOpen => depth += 1,
                Token::BraceClose => {
                    self.advance();
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                    continue;
                }
                Token::Ident(_)
                    if depth == 0
                        && self.pos > start
                        && matches!(self.peek_at(1), Some(Token::BraceOpen)) =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // ========================================
    // Token utilities
    // ========================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.value)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.value)
    }

    fn advance(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].value.clone();
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn check(&self, token: &Token) -> bool {
        match self.peek() {
            Some(a) => std::mem::discriminant(a) == std::mem::discriminant(token),
            None => false,
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<Node<String>> {
        let span = self.current_span();
        if let Some(Token::Ident(s)) = self.peek().cloned() {
            self.advance();
            Ok(Node::new(s, span))
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_number(&mut self) -> ParseResult<(String, Location)> {
        let span = self.current_span();
        if let Some(Token::Number(n)) = self.peek().cloned() {
            self.advance();
            Ok((n, span))
        } else {
            Err(self.unexpected("number"))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::UnexpectedToken {
                span: token.span,
                expected: expected.to_string(),
                found: format!("'{}'", token.value),
            },
            None => ParseError::UnexpectedEof {
                position: self.eof,
                expected: expected.to_string(),
            },
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_span(&self) -> Location {
        self.tokens
            .get(self.pos)
            .map(|s| s.span)
            .unwrap_or(Location::new(self.eof, self.eof))
    }

    fn previous_span(&self) -> Location {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|s| s.span)
            .unwrap_or_default()
    }
}

/// Parse a source string, returning the best-effort tree and every error
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse();
    (program, parser.into_errors())
}
