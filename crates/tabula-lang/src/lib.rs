pub mod ast;
pub mod lexer;
pub mod lower;
pub mod parser;

pub use ast::*;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use lower::{LowerError, lower};
pub use parser::{ParseError, Parser};

use tabula_solver::LpProblem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Invalid problem: {0}")]
    Lower(#[from] LowerError),
}

/// Parses and lowers a problem written in the text format.
pub fn parse_problem(source: &str) -> Result<LpProblem, SourceError> {
    let program = Parser::parse(source)?;
    Ok(lower(&program)?)
}
