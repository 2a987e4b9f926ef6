//! Recursive-descent parser producing [`Stmt`] lists.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! statement  := "let" IDENT "=" expr
//!             | "print" expr
//!             | expr ( "=" expr )?          // target must be `expr.NAME`
//! expr       := addition ( "==" addition )*
//! addition   := postfix ( "+" postfix )*
//! postfix    := primary ( "." IDENT | "(" args ")" )*
//! primary    := INT | STRING | IDENT | "nil" | "true" | "false" | "self"
//!             | "{" "}" | "(" expr ")" | "super" "(" args ")"
//!             | "fn" "(" params ")" ( "do" statement* "end" | expr )
//! ```
//!
//! Statements may be separated by optional semicolons. Expressions nest at
//! most [`MAX_NESTING`] deep.

use crate::error::ScriptError;
use crate::script::ast::{BinaryOp, Expr, ScriptFunction, Stmt};
use crate::token::Token;
use logos::Logos;
use std::ops::Range;
use std::rc::Rc;

type ParseResult<T> = Result<T, ScriptError>;

/// Deepest expression nesting the parser accepts.
pub const MAX_NESTING: usize = 128;

/// Parses a complete source text.
pub fn parse(source: &str) -> ParseResult<Vec<Stmt>> {
    Parser::new(source)?.parse_program()
}

pub struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    position: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    /// Lexes `source` up front, failing on the first unrecognized input.
    pub fn new(source: &str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for (token, span) in Token::lexer(source).spanned() {
            match token {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(ScriptError::Lex {
                        offset: span.start,
                        text: source[span].to_string(),
                    })
                }
            }
        }
        Ok(Parser {
            tokens,
            position: 0,
            end: source.len(),
            depth: 0,
        })
    }

    pub fn parse_program(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek().is_none() {
                return Ok(statements);
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek() {
            Some(Token::Let) => {
                self.advance();
                let name = self.expect_identifier()?;
                self.expect(&Token::Assign, "'=' after variable name")?;
                let value = self.parse_expression()?;
                Ok(Stmt::Let { name, value })
            }
            Some(Token::Print) => {
                self.advance();
                Ok(Stmt::Print(self.parse_expression()?))
            }
            _ => {
                let target_offset = self.offset();
                let expr = self.parse_expression()?;
                if !self.matches(&Token::Assign) {
                    return Ok(Stmt::Expression(expr));
                }
                let value = self.parse_expression()?;
                match expr {
                    Expr::Get { object, name } => Ok(Stmt::SetAttr {
                        object: *object,
                        name,
                        value,
                    }),
                    Expr::Variable(name) => Err(self.error_at(
                        target_offset,
                        format!("use 'let {} = ...' to bind a variable", name),
                    )),
                    _ => Err(self.error_at(target_offset, "invalid assignment target")),
                }
            }
        }
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(self.offset(), "expression nested too deeply"));
        }
        self.depth += 1;
        let expr = self.parse_equality();
        self.depth -= 1;
        expr
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_addition()?;
        while self.matches(&Token::EqualEqual) {
            let right = self.parse_addition()?;
            expr = Expr::Binary {
                op: BinaryOp::Equal,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_addition(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_postfix()?;
        while self.matches(&Token::Plus) {
            let right = self.parse_postfix()?;
            expr = Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(&Token::Dot) {
                let name = self.expect_identifier()?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else if self.matches(&Token::LParen) {
                let args = self.parse_arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let offset = self.offset();
        let token = match self.advance() {
            Some(token) => token,
            None => return Err(self.error_at(offset, "unexpected end of input")),
        };

        match token {
            Token::Integer(value) => Ok(Expr::Integer(value)),
            Token::String(value) => Ok(Expr::String(value)),
            Token::Identifier(name) => Ok(Expr::Variable(name)),
            Token::Nil => Ok(Expr::Nil),
            Token::True => Ok(Expr::Boolean(true)),
            Token::False => Ok(Expr::Boolean(false)),
            Token::SelfKw => Ok(Expr::SelfRef),
            Token::LBrace => {
                self.expect(&Token::RBrace, "'}' after '{'")?;
                Ok(Expr::NewObject)
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen, "')' after expression")?;
                Ok(expr)
            }
            Token::Super => {
                self.expect(&Token::LParen, "'(' after 'super'")?;
                let args = self.parse_arguments()?;
                if !matches!(args.len(), 0 | 1 | 3) {
                    return Err(self.error_at(
                        offset,
                        "super takes (), (name) or (receiver, owner, name)",
                    ));
                }
                Ok(Expr::Super(args))
            }
            Token::Fn => self.parse_function(),
            other => Err(self.error_at(offset, format!("unexpected token {:?}", other))),
        }
    }

    /// Parses what follows `fn`: a parameter list and a body.
    fn parse_function(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::LParen, "'(' after 'fn'")?;
        let mut params = Vec::new();
        if !self.matches(&Token::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if self.matches(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma, "',' or ')' in parameter list")?;
            }
        }

        let body = if self.matches(&Token::Do) {
            let mut body = Vec::new();
            loop {
                self.skip_semicolons();
                if self.matches(&Token::End) {
                    break;
                }
                if self.peek().is_none() {
                    return Err(self.error_at(self.end, "expected 'end' to close function body"));
                }
                body.push(self.parse_statement()?);
            }
            body
        } else if self.peek().is_some_and(Token::starts_expression) {
            vec![Stmt::Expression(self.parse_expression()?)]
        } else {
            return Err(self.error_at(self.offset(), "expected function body"));
        };

        Ok(Expr::Function(Rc::new(ScriptFunction { params, body })))
    }

    /// Parses call arguments after the opening parenthesis.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.matches(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.matches(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma, "',' or ')' in argument list")?;
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|(token, _)| token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn matches(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn skip_semicolons(&mut self) {
        while self.matches(&Token::Semicolon) {}
    }

    fn expect(&mut self, expected: &Token, what: &str) -> ParseResult<()> {
        if self.matches(expected) {
            Ok(())
        } else {
            Err(self.error_at(self.offset(), format!("expected {}", what)))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        let offset = self.offset();
        match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.position += 1;
                Ok(name)
            }
            _ => Err(self.error_at(offset, "expected identifier")),
        }
    }

    /// Byte offset of the next token, or the end of input.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(self.end, |(_, span)| span.start)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ScriptError {
        ScriptError::Parse {
            offset,
            message: message.into(),
        }
    }
}
