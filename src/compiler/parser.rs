//! # Parser Module
//!
//! This module serves as the primary interface for the syntactic analysis
//! (parsing) phase of the Lyn compiler. It orchestrates the process of
//! converting source text into a hierarchical Abstract Syntax Tree (AST) via
//! recursive descent over an incrementally-driven [`Lexer`].

// Sub-modules containing the core parsing logic.
pub mod common;
pub mod expression_parser;
pub mod statement_parser;

use crate::ast::nodes::Program;
use crate::compiler::error::CompileError;

/// The main entry point for the parsing phase.
///
/// Drives the lexer and the recursive-descent rules directly over `source`;
/// the parser keeps its own [`crate::compiler::lexer::Lexer`] so that the
/// lambda lookahead (see [`common::Parser::is_lambda_lookahead`]) can
/// checkpoint and restore scan position without the caller needing to know
/// about it.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    use common::Parser;

    let mut parser = Parser::new(source)?;
    parser.parse_program()
}
