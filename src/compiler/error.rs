//! # Compiler Error Definitions
//!
//! This module centralizes all custom error types that can occur during the
//! entire compilation process of Lyn programs: lexing, parsing, semantic
//! analysis, constant folding, and code generation.
//!
//! It leverages the `thiserror` crate to simplify error reporting and provide
//! clear, descriptive messages to the user.

use thiserror::Error;

/// The primary error enumeration for the Lyn compiler.
///
/// Every variant is fatal: the pipeline has no error-recovery path, matching
/// the reference implementation's "print diagnostic, exit" policy.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Wrapper for standard I/O errors (e.g., file reading/writing).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised when the compiler cannot find any source files to process.
    #[error("No .lyn source files found in current directory")]
    NoSourceFiles,

    /// Lexical error: unterminated string literal, unterminated block
    /// comment, or an unrecognized character sequence.
    #[error("Lex error at line {line}, col {col}: {message}")]
    LexError {
        line: usize,
        col: usize,
        message: String,
    },

    /// Parse error: unexpected token, missing delimiter, malformed
    /// signature. Carries the offending token's lexeme for diagnostics.
    #[error("Parse error at line {line}, col {col}: {message} (found '{found}')")]
    ParseError {
        line: usize,
        col: usize,
        message: String,
        found: String,
    },

    /// Semantic error: redeclaration in the same scope, undeclared
    /// identifier, or incompatible operand types.
    #[error("Semantic error: {message}")]
    SemanticError { message: String },

    /// Division by zero encountered while constant-folding a binary
    /// expression.
    #[error("Fold error: division by zero")]
    DivisionByZero,

    /// The fixed-block memory pool has no free slots left.
    #[error("Resource error: memory pool exhausted")]
    PoolExhausted,
}

impl CompileError {
    /// Constructs a `LexError` at the given source position.
    pub fn lex(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::LexError {
            line,
            col,
            message: message.into(),
        }
    }

    /// Constructs a `ParseError` carrying the offending token for context.
    pub fn parse(line: usize, col: usize, message: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            col,
            message: message.into(),
            found: found.into(),
        }
    }

    /// Constructs a general semantic-analysis error.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::SemanticError {
            message: message.into(),
        }
    }

    /// Constructs a redeclaration-in-same-scope semantic error.
    pub fn redeclaration(name: impl std::fmt::Display) -> Self {
        Self::SemanticError {
            message: format!("'{}' redeclared in the same scope", name),
        }
    }

    /// Constructs an undeclared-identifier semantic error.
    pub fn undeclared(name: impl std::fmt::Display) -> Self {
        Self::SemanticError {
            message: format!("undeclared identifier '{}'", name),
        }
    }

    /// Constructs an incompatible-operand-types semantic error.
    pub fn type_mismatch(details: impl Into<String>) -> Self {
        Self::SemanticError {
            message: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display_carries_position_and_message() {
        let err = CompileError::lex(3, 7, "unterminated string literal");
        assert_eq!(err.to_string(), "Lex error at line 3, col 7: unterminated string literal");
    }

    #[test]
    fn parse_error_display_carries_the_offending_token() {
        let err = CompileError::parse(1, 1, "expected '('", "end");
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, col 1: expected '(' (found 'end')"
        );
    }

    #[test]
    fn semantic_error_display_names_the_identifier() {
        let err = CompileError::redeclaration("x");
        assert!(err.to_string().contains('x'));
        assert!(err.to_string().contains("same scope"));
    }

    #[test]
    fn fold_error_display_is_fixed() {
        assert_eq!(CompileError::DivisionByZero.to_string(), "Fold error: division by zero");
    }

    #[test]
    fn resource_error_display_is_fixed() {
        assert_eq!(
            CompileError::PoolExhausted.to_string(),
            "Resource error: memory pool exhausted"
        );
    }
}
