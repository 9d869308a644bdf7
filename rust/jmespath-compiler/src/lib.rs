//! JMESPath Compiler
//!
//! Transforms JMESPath expression text into an abstract syntax tree:
//! text → tokens → AST. Evaluation lives in `jmespath-rt`; the two phases
//! are independent and a parsed AST is immutable and shareable.

pub mod compiler;
pub mod diagnostics;

use compiler::ast::Node;
use compiler::lexer::Lexer;
use compiler::parser::Parser;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] compiler::lexer::LexError),
    #[error("parse error: {0}")]
    Parse(#[from] compiler::parser::ParseError),
}

impl CompileError {
    /// Byte offset of the failure in the expression text.
    pub fn offset(&self) -> usize {
        match self {
            CompileError::Lex(err) => err.offset(),
            CompileError::Parse(err) => err.offset(),
        }
    }

    /// 1-based line and column of the failure.
    pub fn position(&self) -> (usize, usize) {
        match self {
            CompileError::Lex(err) => err.position(),
            CompileError::Parse(err) => err.position(),
        }
    }
}

/// Compile a JMESPath expression into its AST root.
pub fn compile(expression: &str) -> Result<Node, CompileError> {
    let tokens = Lexer::new(expression).tokenize()?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}
