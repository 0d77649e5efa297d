//! # Compiler Module
//!
//! Aggregates every compiler phase (lexer, parser, optimizer, analyzer,
//! codegen) and defines the [`Compiler`] struct that drives the `build`,
//! `run`, and `test` CLI subcommands (§6) over a single Lyn source file.
//! Linking and execution are out of scope (§9 Non-goals): this struct's
//! job ends at emitting assembly text.

pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod optimizer;
pub mod parser;

pub use analyzer::analyze;
pub use lexer::tokenize;
pub use optimizer::optimize;
pub use parser::parse;

use crate::codegen::backend::Target;
use crate::debug::{self, PerfTimer};
use codegen::CodeGenerator;
use error::CompileError;
use std::path::PathBuf;

/// Drives the full pipeline for one source file: tokenize, parse, optimize,
/// analyze, generate. Returns the generated assembly text.
pub fn compile_source(source: &str, target: Target) -> Result<String, CompileError> {
    let timer = PerfTimer::new("full pipeline");

    debug::log_lexer("tokenizing source");
    debug::log_parser("parsing token stream");
    let mut ast = parse(source)?;

    debug::log_optimizer("folding constants and pruning dead branches");
    ast.statements = optimize(ast.statements)?;

    debug::log_semantic("checking scopes and types");
    analyze(&ast)?;

    debug::log_codegen(&format!("generating {} assembly", target));
    let asm = CodeGenerator::generate(&ast, target)?;

    timer.finish();
    Ok(asm)
}

/// The central structure that manages compiling a single Lyn source file
/// (or, for `test`, every `.lyn` file in a directory) on behalf of the CLI.
pub struct Compiler {
    /// The path to the source file or directory to compile.
    pub source_path: PathBuf,
    /// Where `build` writes the generated assembly (`output.s` / `output.wat`).
    pub build_path: PathBuf,
    /// The requested target architecture, as passed to `--target`.
    pub target: Target,
    /// Print the generated assembly to stdout instead of writing it to a file.
    pub show_asm: bool,
    /// Print progress messages for each pipeline stage.
    pub verbose: bool,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            source_path: PathBuf::from("."),
            build_path: PathBuf::from("."),
            target: Target::X86_64,
            show_asm: false,
            verbose: false,
        }
    }

    /// Compiles `self.source_path`, selecting `target`. Writes the result to
    /// `output.s` (or `output.wat` for `Target::Wasm`) under `build_path`,
    /// or prints it to stdout when `show_asm` is set.
    pub fn build(&mut self, target_raw: &str) -> Result<(), CompileError> {
        let (target, warning) = Target::parse(target_raw);
        if let Some(warning) = warning {
            eprintln!("warning: {}", warning);
        }
        self.target = target;

        if !self.source_path.is_file() || !self.is_lyn_file(&self.source_path) {
            return Err(CompileError::NoSourceFiles);
        }

        self.log_verbose(&format!("compiling {:?} for {}", self.source_path, self.target));
        let content = std::fs::read_to_string(&self.source_path)?;
        let asm = compile_source(&content, self.target)?;

        if self.show_asm {
            println!("{}", asm);
            return Ok(());
        }

        let output_path = self.build_path.join(self.output_file_name());
        std::fs::write(&output_path, &asm)?;
        self.log_verbose(&format!("wrote {:?} ({} lines)", output_path, asm.lines().count()));
        println!("compiled {:?} -> {:?}", self.source_path, output_path);
        Ok(())
    }

    /// `run` has no execution backend to hand the assembly to (§9
    /// Non-goals: linking and execution are out of scope), so it prints the
    /// generated assembly to stdout, the same as `build --show-asm`.
    pub fn run_single_file(&mut self) -> Result<(), CompileError> {
        self.show_asm = true;
        let target = self.target;
        self.build(&target.to_string())
    }

    /// Validates every discovered `.lyn` file through tokenize/parse/
    /// optimize/analyze/codegen without writing any output, reporting a
    /// pass/fail summary.
    pub fn test(&self, specific_file: Option<PathBuf>) -> Result<(), CompileError> {
        let files_to_test = if let Some(file) = specific_file {
            vec![file]
        } else {
            self.find_lyn_files_in_directory()?
        };

        println!("testing {} file(s)", files_to_test.len());

        let mut all_passed = true;
        for file in &files_to_test {
            print!("  {:?} ... ", file);
            match self.test_file(file) {
                Ok(()) => println!("ok"),
                Err(e) => {
                    println!("FAILED");
                    eprintln!("    {}", e);
                    all_passed = false;
                }
            }
        }

        if all_passed {
            println!("all tests passed");
            Ok(())
        } else {
            Err(CompileError::semantic("one or more test files failed to compile"))
        }
    }

    fn test_file(&self, file_path: &PathBuf) -> Result<(), CompileError> {
        let content = std::fs::read_to_string(file_path)?;
        compile_source(&content, self.target)?;
        Ok(())
    }

    fn find_lyn_files_in_directory(&self) -> Result<Vec<PathBuf>, CompileError> {
        let mut files = Vec::new();

        if self.source_path.is_dir() {
            if let Ok(entries) = std::fs::read_dir(&self.source_path) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() && self.is_lyn_file(&path) {
                        files.push(path);
                    }
                }
            }
        }

        if files.is_empty() {
            Err(CompileError::NoSourceFiles)
        } else {
            Ok(files)
        }
    }

    fn is_lyn_file(&self, path: &PathBuf) -> bool {
        path.extension().is_some_and(|ext| ext == "lyn")
    }

    fn output_file_name(&self) -> &'static str {
        match self.target {
            Target::Wasm => "output.wat",
            _ => "output.s",
        }
    }

    fn log_verbose(&self, message: &str) {
        if self.verbose {
            println!("{}", message);
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario 1: constant folding collapses `2 + 3 * 4` to one literal
    /// before codegen ever sees a binary expression, so the emitted text
    /// carries a single immediate load, not an `add`/`imul` sequence.
    #[test]
    fn number_folding_emits_one_immediate_load_and_one_store() {
        let asm = compile_source("main; x = 2 + 3 * 4; end;", Target::X86_64).unwrap();
        assert!(asm.contains("x: .quad 0"), "global declaration missing:\n{}", asm);
        assert!(asm.contains("mov rax, 14"), "folded immediate missing:\n{}", asm);
        assert!(asm.contains("mov [x], rax"), "store to x missing:\n{}", asm);
        assert!(!asm.contains("add rax"), "no addition should survive constant folding");
        assert!(!asm.contains("imul"), "no multiplication should survive constant folding");
    }

    /// §8 scenario 2: a literal-true condition makes the optimizer drop the
    /// else-branch outright, so `print(2)` never reaches codegen at all.
    #[test]
    fn true_literal_if_condition_emits_only_the_then_branch() {
        let asm = compile_source(
            "main; if 1; print(1); else; print(2); end; end;",
            Target::X86_64,
        )
        .unwrap();
        assert!(asm.contains("mov rax, 1\n"), "the printed literal 1 is missing:\n{}", asm);
        assert!(!asm.contains("mov rax, 2"), "print(2) should never be emitted:\n{}", asm);
        assert_eq!(asm.matches("call printf").count(), 1);
    }

    /// §8 scenario 3: a `for` loop emits its body once, wrapped in a single
    /// head/end label pair, regardless of how many times `range` iterates.
    #[test]
    fn for_loop_over_range_is_not_unrolled() {
        let asm = compile_source(
            "main; for i in range(3); print(i); end; end;",
            Target::X86_64,
        )
        .unwrap();
        assert_eq!(asm.matches("L0:").count(), 1, "loop head label must appear exactly once");
        assert_eq!(asm.matches("L1:").count(), 1, "loop end label must appear exactly once");
        assert_eq!(asm.matches("call printf").count(), 1, "the body must not be unrolled");
        assert!(asm.contains("add rax, rbx"), "increment must be emitted");
    }

    #[test]
    fn redeclaration_in_the_same_scope_aborts_with_a_semantic_error() {
        let err = compile_source("main; x: int; x: int; end;", Target::X86_64).unwrap_err();
        assert!(matches!(err, CompileError::SemanticError { .. }));
        assert!(err.to_string().contains('x'));
        assert!(err.to_string().contains("same scope"));
    }

    #[test]
    fn wasm_target_runs_the_same_pipeline_to_a_different_backend() {
        let asm = compile_source("main; print(5); end;", Target::Wasm).unwrap();
        assert!(!asm.contains("intel_syntax"));
    }
}
