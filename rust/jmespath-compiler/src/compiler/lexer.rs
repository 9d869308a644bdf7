//! Lexer for JMESPath expressions.

use crate::compiler::tokens::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, col {col}")]
    UnexpectedChar {
        ch: char,
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("unterminated {delimiter} string at line {line}, col {col}")]
    UnterminatedString {
        delimiter: char,
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("invalid number at line {line}, col {col}")]
    InvalidNumber {
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("invalid escape sequence at line {line}, col {col}")]
    InvalidEscape {
        offset: usize,
        line: usize,
        col: usize,
    },
    #[error("invalid JSON literal at line {line}, col {col}: {message}")]
    InvalidLiteral {
        message: String,
        offset: usize,
        line: usize,
        col: usize,
    },
}

impl LexError {
    /// Byte offset of the failure in the expression text.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. }
            | LexError::UnterminatedString { offset, .. }
            | LexError::InvalidNumber { offset, .. }
            | LexError::InvalidEscape { offset, .. }
            | LexError::InvalidLiteral { offset, .. } => *offset,
        }
    }

    /// 1-based line and column of the failure.
    pub fn position(&self) -> (usize, usize) {
        match self {
            LexError::UnexpectedChar { line, col, .. }
            | LexError::UnterminatedString { line, col, .. }
            | LexError::InvalidNumber { line, col, .. }
            | LexError::InvalidEscape { line, col, .. }
            | LexError::InvalidLiteral { line, col, .. } => (*line, *col),
        }
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    byte_offset: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            byte_offset: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn span_from(&self, start_offset: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start_offset, self.byte_offset, start_line, start_col)
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.byte_offset, self.line, self.col)
    }

    /// Consume the next character and pick between a two-character operator
    /// and a one-character fallback.
    fn alt(&mut self, expected: char, matched: TokenKind, fallback: TokenKind) -> TokenKind {
        if self.current() == Some(expected) {
            self.advance();
            matched
        } else {
            fallback
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.current() {
            let (so, sl, sc) = self.mark();
            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    self.advance();
                    continue;
                }
                'a'..='z' | 'A'..='Z' | '_' => {
                    let kind = self.read_identifier();
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                '0'..='9' | '-' => {
                    let kind = self.read_number()?;
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                '"' => {
                    let kind = self.read_quoted_identifier()?;
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                '\'' => {
                    let kind = self.read_raw_string()?;
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                '`' => {
                    let kind = self.read_literal()?;
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
                _ => {
                    self.advance();
                    let kind = match ch {
                        '.' => TokenKind::Dot,
                        '*' => TokenKind::Star,
                        '[' => match self.current() {
                            Some(']') => {
                                self.advance();
                                TokenKind::Flatten
                            }
                            Some('?') => {
                                self.advance();
                                TokenKind::Filter
                            }
                            _ => TokenKind::Lbracket,
                        },
                        ']' => TokenKind::Rbracket,
                        '{' => TokenKind::Lbrace,
                        '}' => TokenKind::Rbrace,
                        '(' => TokenKind::Lparen,
                        ')' => TokenKind::Rparen,
                        ',' => TokenKind::Comma,
                        ':' => TokenKind::Colon,
                        '@' => TokenKind::At,
                        '|' => self.alt('|', TokenKind::Or, TokenKind::Pipe),
                        '&' => self.alt('&', TokenKind::And, TokenKind::Ampersand),
                        '!' => self.alt('=', TokenKind::NotEq, TokenKind::Not),
                        '<' => self.alt('=', TokenKind::LtEq, TokenKind::Lt),
                        '>' => self.alt('=', TokenKind::GtEq, TokenKind::Gt),
                        '=' => {
                            if self.current() == Some('=') {
                                self.advance();
                                TokenKind::Eq
                            } else {
                                return Err(LexError::UnexpectedChar {
                                    ch: '=',
                                    offset: so,
                                    line: sl,
                                    col: sc,
                                });
                            }
                        }
                        other => {
                            return Err(LexError::UnexpectedChar {
                                ch: other,
                                offset: so,
                                line: sl,
                                col: sc,
                            });
                        }
                    };
                    tokens.push(Token::new(kind, self.span_from(so, sl, sc)));
                }
            }
        }
        let eof = Span::new(self.byte_offset, self.byte_offset, self.line, self.col);
        tokens.push(Token::new(TokenKind::Eof, eof));
        Ok(tokens)
    }

    fn read_identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.current() {
            match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => {
                    name.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        TokenKind::Identifier(name)
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let (so, sl, sc) = self.mark();
        let negative = self.current() == Some('-');
        if negative {
            self.advance();
        }
        if !matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            return Err(LexError::InvalidNumber {
                offset: so,
                line: sl,
                col: sc,
            });
        }
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let value: i64 = text.parse().map_err(|_| LexError::InvalidNumber {
            offset: so,
            line: sl,
            col: sc,
        })?;
        Ok(TokenKind::Number(value))
    }

    /// Quoted identifiers use the full set of JSON string escapes,
    /// including \uXXXX with surrogate pairs.
    fn read_quoted_identifier(&mut self) -> Result<TokenKind, LexError> {
        let (so, sl, sc) = self.mark();
        self.advance(); // skip opening "
        let mut name = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedString {
                        delimiter: '"',
                        offset: so,
                        line: sl,
                        col: sc,
                    });
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::QuotedIdentifier(name));
                }
                Some('\\') => {
                    self.advance();
                    let decoded = self.read_json_escape()?;
                    name.push(decoded);
                }
                Some(c) => {
                    name.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_json_escape(&mut self) -> Result<char, LexError> {
        let (eo, el, ec) = self.mark();
        let invalid = || LexError::InvalidEscape {
            offset: eo,
            line: el,
            col: ec,
        };
        let ch = self.advance().ok_or_else(invalid)?;
        let decoded = match ch {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let first = self.read_hex4().ok_or_else(invalid)?;
                if (0xD800..0xDC00).contains(&first) {
                    // High surrogate: a low surrogate must follow.
                    if self.advance() != Some('\\') || self.advance() != Some('u') {
                        return Err(invalid());
                    }
                    let second = self.read_hex4().ok_or_else(invalid)?;
                    if !(0xDC00..0xE000).contains(&second) {
                        return Err(invalid());
                    }
                    let combined =
                        0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    char::from_u32(combined).ok_or_else(invalid)?
                } else {
                    char::from_u32(first).ok_or_else(invalid)?
                }
            }
            _ => return Err(invalid()),
        };
        Ok(decoded)
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let c = self.advance()?;
            value = value * 16 + c.to_digit(16)?;
        }
        Some(value)
    }

    /// Raw strings keep their contents verbatim; only \' and \\ collapse.
    fn read_raw_string(&mut self) -> Result<TokenKind, LexError> {
        let (so, sl, sc) = self.mark();
        self.advance(); // skip opening '
        let mut contents = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedString {
                        delimiter: '\'',
                        offset: so,
                        line: sl,
                        col: sc,
                    });
                }
                Some('\'') => {
                    self.advance();
                    return Ok(TokenKind::RawString(contents));
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('\'') => {
                            contents.push('\'');
                            self.advance();
                        }
                        Some('\\') => {
                            contents.push('\\');
                            self.advance();
                        }
                        // Any other backslash is preserved literally.
                        _ => contents.push('\\'),
                    }
                }
                Some(c) => {
                    contents.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Backtick literals hold an entire JSON value; \` escapes a backtick
    /// inside the payload.
    fn read_literal(&mut self) -> Result<TokenKind, LexError> {
        let (so, sl, sc) = self.mark();
        self.advance(); // skip opening `
        let mut payload = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedString {
                        delimiter: '`',
                        offset: so,
                        line: sl,
                        col: sc,
                    });
                }
                Some('`') => {
                    self.advance();
                    break;
                }
                Some('\\') if self.peek() == Some('`') => {
                    self.advance();
                    payload.push('`');
                    self.advance();
                }
                Some(c) => {
                    payload.push(c);
                    self.advance();
                }
            }
        }
        match serde_json::from_str(&payload) {
            Ok(value) => Ok(TokenKind::Literal(value)),
            Err(err) => Err(LexError::InvalidLiteral {
                message: err.to_string(),
                offset: so,
                line: sl,
                col: sc,
            }),
        }
    }
}
