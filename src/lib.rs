//! # Lyn Compiler Crate
//!
//! This crate contains the core implementation of the Lyn ahead-of-time
//! compiler: lexer, recursive-descent parser, constant-folding optimizer,
//! scoped semantic analyzer, and a retargetable assembly code generator
//! (x86_64, ARM32, RISC-V64, WebAssembly text). It exposes the `Compiler`
//! struct used by the `lync` CLI binary, plus a standalone fixed-block
//! memory pool (`memory`) kept independent of AST node ownership.

/// Defines the Abstract Syntax Tree (AST) node structures and related types.
pub mod ast;
/// Contains the code generation phase logic: the retargetable `Backend`
/// trait and its per-architecture implementations.
pub mod codegen;
/// The core compiler logic, encompassing all phases and the main `Compiler` struct.
pub mod compiler;
/// Utilities for debugging and introspection of compiler stages.
pub mod debug;
/// A standalone, independently-allocated fixed-block memory pool.
pub mod memory;

// --- Public Re-exports (The Compiler API) ---
pub use compiler::Compiler;
pub use compiler::analyze;
pub use compiler::compile_source;
pub use compiler::optimize;
pub use compiler::parse;
pub use compiler::tokenize;

// --- Convenience Functions ---

/// A simple, end-to-end compilation pipeline for a given source string:
/// tokenize, parse, optimize, and semantically analyze, stopping short of
/// code generation (callers that need assembly should use
/// [`compile_source`], which also requires choosing a [`codegen::backend::Target`]).
pub fn compile(source: &str) -> Result<ast::nodes::Program, compiler::error::CompileError> {
    let mut ast = parse(source)?;
    ast.statements = optimize(ast.statements)?;
    analyze(&ast)?;
    Ok(ast)
}
