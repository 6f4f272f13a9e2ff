//! Parser module for hrw4u source
//!
//! This module provides the lexer, AST, and parser for the hrw4u DSL.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::*;
pub use lexer::{tokenize, tokenize_lossy, LexError, Location, Spanned, Token};
pub use parser::{parse, ParseError, ParseResult, Parser};

use crate::source::{Parsed, SourceParser, SyntaxError};

/// The hrw4u front end
#[derive(Debug, Clone, Copy, Default)]
pub struct DslParser;

impl SourceParser for DslParser {
    type Tree = Program;

    fn parse(&self, source: &str) -> Parsed<Program> {
        let (tree, errors) = parse(source);
        Parsed {
            tree,
            errors: errors
                .iter()
                .map(|e| SyntaxError::new(e.span().range(), e.to_string()))
                .collect(),
        }
    }
}
