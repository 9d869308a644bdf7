//! Pratt parser for JMESPath expressions.
//!
//! Projections are rewired during parsing: when a projection-forming token
//! (`[*]`, `[]`, `[?`, a slice, or object `*`) is reduced, the right-hand
//! side is parsed with a reduced binding power so that low-precedence
//! operators (pipe, comparators, boolean connectives) terminate the
//! projection instead of being applied per element.

use crate::compiler::ast::{Comparator, Node};
use crate::compiler::tokens::{Token, TokenKind};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found} at line {line}, col {col}; expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("unexpected end of expression; expected {expected}")]
    UnexpectedEof {
        expected: String,
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("too many colons in slice at line {line}, col {col}")]
    InvalidSlice {
        offset: usize,
        line: usize,
        col: usize,
    },
}

impl ParseError {
    /// Byte offset of the failure in the expression text.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Unexpected { offset, .. }
            | ParseError::UnexpectedEof { offset, .. }
            | ParseError::InvalidSlice { offset, .. } => *offset,
        }
    }

    /// 1-based line and column of the failure.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Unexpected { line, col, .. }
            | ParseError::UnexpectedEof { line, col, .. }
            | ParseError::InvalidSlice { line, col, .. } => (*line, *col),
        }
    }
}

/// Binding power below which a follow-on token terminates a projection.
const PROJECTION_STOP: u8 = 10;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

enum Bracketed {
    Index(i64),
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let root = self.parse_expr(0)?;
        if !matches!(self.peek_kind(), TokenKind::Eof) {
            return Err(self.unexpected("end of expression"));
        }
        Ok(root)
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_kind_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if matches!(token.kind, TokenKind::Eof) {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                offset: token.span.start,
                line: token.span.line,
                col: token.span.col,
            }
        } else {
            ParseError::Unexpected {
                found: token.kind.to_string(),
                expected: expected.to_string(),
                offset: token.span.start,
                line: token.span.line,
                col: token.span.col,
            }
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek_kind() == &kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Left binding power of a token when it follows a complete expression.
    fn lbp(kind: &TokenKind) -> u8 {
        match kind {
            TokenKind::Pipe => 1,
            TokenKind::Or => 2,
            TokenKind::And => 3,
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => 5,
            TokenKind::Flatten => 9,
            TokenKind::Star => 20,
            TokenKind::Filter => 21,
            TokenKind::Dot => 40,
            TokenKind::Not => 45,
            TokenKind::Lbrace => 50,
            TokenKind::Lbracket => 55,
            TokenKind::Lparen => 60,
            _ => 0,
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_prefix()?;
        while min_bp < Self::lbp(self.peek_kind()) {
            left = self.parse_infix(left)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                if matches!(self.peek_kind(), TokenKind::Lparen) {
                    self.parse_function_call(name)
                } else {
                    Ok(Node::Field(name))
                }
            }
            TokenKind::QuotedIdentifier(name) => {
                self.advance();
                // A quoted identifier is never a function name.
                if matches!(self.peek_kind(), TokenKind::Lparen) {
                    return Err(self.unexpected("'.', an operator, or end of expression"));
                }
                Ok(Node::Field(name))
            }
            TokenKind::RawString(s) => {
                self.advance();
                Ok(Node::RawString(s))
            }
            TokenKind::Literal(value) => {
                self.advance();
                Ok(Node::Literal(value))
            }
            TokenKind::At => {
                self.advance();
                Ok(Node::Current)
            }
            TokenKind::Star => {
                self.advance();
                let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                Ok(Node::Projection {
                    left: Box::new(Node::ObjectValues(Box::new(Node::Current))),
                    right: Box::new(right),
                })
            }
            TokenKind::Flatten => {
                self.advance();
                let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Flatten))?;
                Ok(Node::Projection {
                    left: Box::new(Node::Flatten(Box::new(Node::Current))),
                    right: Box::new(right),
                })
            }
            TokenKind::Filter => {
                self.advance();
                self.parse_filter(Node::Current)
            }
            TokenKind::Lbracket => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Number(_) | TokenKind::Colon => {
                        match self.parse_bracketed()? {
                            Bracketed::Index(i) => Ok(Node::Index(i)),
                            Bracketed::Slice { start, stop, step } => {
                                let right =
                                    self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                                Ok(Node::Projection {
                                    left: Box::new(Node::Slice { start, stop, step }),
                                    right: Box::new(right),
                                })
                            }
                        }
                    }
                    TokenKind::Star
                        if self.peek_kind_at(1) == Some(&TokenKind::Rbracket) =>
                    {
                        self.advance();
                        self.advance();
                        let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                        Ok(Node::Projection {
                            left: Box::new(Node::Current),
                            right: Box::new(right),
                        })
                    }
                    _ => self.parse_multi_select_list(),
                }
            }
            TokenKind::Lbrace => {
                self.advance();
                self.parse_multi_select_hash()
            }
            TokenKind::Not => {
                self.advance();
                let inner = self.parse_expr(Self::lbp(&TokenKind::Not))?;
                Ok(Node::Not(Box::new(inner)))
            }
            TokenKind::Ampersand => {
                self.advance();
                let inner = self.parse_expr(0)?;
                Ok(Node::ExpressionRef(Arc::new(inner)))
            }
            TokenKind::Lparen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::Rparen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_infix(&mut self, left: Node) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Dot => {
                self.advance();
                if matches!(self.peek_kind(), TokenKind::Star) {
                    self.advance();
                    let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                    Ok(Node::Projection {
                        left: Box::new(Node::ObjectValues(Box::new(left))),
                        right: Box::new(right),
                    })
                } else {
                    let right = self.parse_dot_rhs(Self::lbp(&TokenKind::Dot))?;
                    Ok(Node::Subexpression {
                        left: Box::new(left),
                        right: Box::new(right),
                    })
                }
            }
            TokenKind::Flatten => {
                self.advance();
                let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Flatten))?;
                Ok(Node::Projection {
                    left: Box::new(Node::Flatten(Box::new(left))),
                    right: Box::new(right),
                })
            }
            TokenKind::Filter => {
                self.advance();
                self.parse_filter(left)
            }
            TokenKind::Lbracket => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Number(_) | TokenKind::Colon => {
                        match self.parse_bracketed()? {
                            Bracketed::Index(i) => Ok(Node::Subexpression {
                                left: Box::new(left),
                                right: Box::new(Node::Index(i)),
                            }),
                            Bracketed::Slice { start, stop, step } => {
                                let right =
                                    self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                                Ok(Node::Projection {
                                    left: Box::new(Node::Subexpression {
                                        left: Box::new(left),
                                        right: Box::new(Node::Slice { start, stop, step }),
                                    }),
                                    right: Box::new(right),
                                })
                            }
                        }
                    }
                    TokenKind::Star => {
                        self.advance();
                        self.expect(TokenKind::Rbracket, "']'")?;
                        let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Star))?;
                        Ok(Node::Projection {
                            left: Box::new(left),
                            right: Box::new(right),
                        })
                    }
                    _ => Err(self.unexpected("a number, ':', or '*'")),
                }
            }
            TokenKind::Pipe => {
                self.advance();
                let right = self.parse_expr(Self::lbp(&TokenKind::Pipe))?;
                Ok(Node::Pipe {
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenKind::Or => {
                self.advance();
                let right = self.parse_expr(Self::lbp(&TokenKind::Or))?;
                Ok(Node::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenKind::And => {
                self.advance();
                let right = self.parse_expr(Self::lbp(&TokenKind::And))?;
                Ok(Node::And {
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => {
                let op = match self.advance().kind {
                    TokenKind::Eq => Comparator::Eq,
                    TokenKind::NotEq => Comparator::NotEq,
                    TokenKind::Lt => Comparator::Lt,
                    TokenKind::LtEq => Comparator::LtEq,
                    TokenKind::Gt => Comparator::Gt,
                    TokenKind::GtEq => Comparator::GtEq,
                    _ => unreachable!("comparator token"),
                };
                let right = self.parse_expr(5)?;
                Ok(Node::Comparison {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            _ => Err(self.unexpected("an operator")),
        }
    }

    /// Parse the right-hand side of a projection. A follow-on token whose
    /// binding power is below the stop threshold ends the projection; the
    /// element expression defaults to the identity.
    fn parse_projection_rhs(&mut self, bp: u8) -> Result<Node, ParseError> {
        if Self::lbp(self.peek_kind()) < PROJECTION_STOP {
            return Ok(Node::Current);
        }
        match self.peek_kind() {
            TokenKind::Lbracket | TokenKind::Filter => self.parse_expr(bp),
            TokenKind::Dot => {
                self.advance();
                self.parse_dot_rhs(bp)
            }
            _ => Err(self.unexpected("'.', '[', or '[?' after a projection")),
        }
    }

    /// Parse what may follow a `.`: an identifier, `*`, a multi-select
    /// list, or a multi-select hash.
    fn parse_dot_rhs(&mut self, bp: u8) -> Result<Node, ParseError> {
        match self.peek_kind() {
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) | TokenKind::Star => {
                self.parse_expr(bp)
            }
            TokenKind::Lbracket => {
                self.advance();
                self.parse_multi_select_list()
            }
            TokenKind::Lbrace => {
                self.advance();
                self.parse_multi_select_hash()
            }
            _ => Err(self.unexpected("an identifier, '*', '[', or '{' after '.'")),
        }
    }

    /// Parse `[?predicate]` plus the projection right-hand side.
    fn parse_filter(&mut self, left: Node) -> Result<Node, ParseError> {
        let predicate = self.parse_expr(0)?;
        self.expect(TokenKind::Rbracket, "']'")?;
        let right = self.parse_projection_rhs(Self::lbp(&TokenKind::Filter))?;
        Ok(Node::FilterProjection {
            left: Box::new(left),
            predicate: Box::new(predicate),
            right: Box::new(right),
        })
    }

    /// Parse the contents of `[...]` holding an index or a slice; the
    /// opening bracket is already consumed.
    fn parse_bracketed(&mut self) -> Result<Bracketed, ParseError> {
        let mut parts = [None, None, None];
        let mut colons = 0;
        loop {
            match self.peek_kind().clone() {
                TokenKind::Colon => {
                    colons += 1;
                    if colons > 2 {
                        let token = self.peek();
                        return Err(ParseError::InvalidSlice {
                            offset: token.span.start,
                            line: token.span.line,
                            col: token.span.col,
                        });
                    }
                    self.advance();
                }
                TokenKind::Number(n) => {
                    if parts[colons].is_some() {
                        return Err(self.unexpected("':' or ']'"));
                    }
                    parts[colons] = Some(n);
                    self.advance();
                }
                TokenKind::Rbracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("a number, ':', or ']'")),
            }
        }
        if colons == 0 {
            match parts[0] {
                Some(i) => Ok(Bracketed::Index(i)),
                None => Err(self.unexpected("a number")),
            }
        } else {
            Ok(Bracketed::Slice {
                start: parts[0],
                stop: parts[1],
                step: parts[2],
            })
        }
    }

    /// Parse `[a, b, c]`; the opening bracket is already consumed.
    fn parse_multi_select_list(&mut self) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expr(0)?);
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Rbracket => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
        Ok(Node::MultiSelectList(items))
    }

    /// Parse `{k1: e1, k2: e2}`; the opening brace is already consumed.
    fn parse_multi_select_hash(&mut self) -> Result<Node, ParseError> {
        let mut entries = Vec::new();
        loop {
            let key = match self.peek_kind().clone() {
                TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => {
                    self.advance();
                    name
                }
                _ => return Err(self.unexpected("an identifier key")),
            };
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expr(0)?;
            entries.push((key, value));
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Rbrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
        Ok(Node::MultiSelectHash(entries))
    }

    /// Parse `name(arg, ...)`; the name is already consumed and the
    /// current token is the opening parenthesis.
    fn parse_function_call(&mut self, name: String) -> Result<Node, ParseError> {
        self.expect(TokenKind::Lparen, "'('")?;
        let mut args = Vec::new();
        if matches!(self.peek_kind(), TokenKind::Rparen) {
            self.advance();
            return Ok(Node::FunctionCall { name, args });
        }
        loop {
            args.push(self.parse_expr(0)?);
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Rparen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok(Node::FunctionCall { name, args })
    }
}
