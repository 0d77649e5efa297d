//! # Code Generation Interface
//!
//! High-level entry point for the final compiler phase: turning an
//! optimized, analyzed [`Program`] into target assembly text (§4.7, §4.8).
//! The heavy lifting lives in `crate::codegen`'s [`Backend`] trait and its
//! per-architecture implementations; this module only drives the fixed
//! emission order (pre-scan globals, header, global declarations, entry
//! prologue, statement walk, entry epilogue) that is the same regardless of
//! target.

use crate::ast::nodes::{Program, Stmt};
use crate::codegen::arm32::Arm32Backend;
use crate::codegen::backend::{Backend, Target};
use crate::codegen::common::CodegenContext;
use crate::codegen::riscv64::RiscV64Backend;
use crate::codegen::statement_generator::StatementGenerator;
use crate::codegen::wasm::WasmBackend;
use crate::codegen::x86_64::X86_64Backend;
use crate::compiler::error::CompileError;

/// The structure responsible for orchestrating the final phase of
/// compilation: translating the AST into target assembly text.
pub struct CodeGenerator;

impl CodeGenerator {
    /// Generates the target assembly for `ast`, selecting the backend named
    /// by `target`.
    pub fn generate(ast: &Program, target: Target) -> Result<String, CompileError> {
        let backend: &dyn Backend = match target {
            Target::X86_64 => &X86_64Backend,
            Target::Arm32 => &Arm32Backend,
            Target::RiscV64 => &RiscV64Backend,
            Target::Wasm => &WasmBackend,
        };

        let mut ctx = CodegenContext::new();
        prescan_globals(&mut ctx, &ast.statements);

        let mut out = backend.file_header();
        for name in ctx.globals().cloned().collect::<Vec<_>>() {
            backend.emit_global_declaration(&mut out, &name);
        }

        backend.emit_entry_prologue(&mut out);
        out.push_str(&StatementGenerator::generate_all(&mut ctx, backend, &ast.statements)?);
        backend.emit_entry_epilogue(&mut out);

        Ok(out)
    }
}

/// Walks the full statement tree (not just the top level) registering every
/// name a `VarAssign`/`VarDecl`/`For` iterator introduces, so that nested
/// assignments inside `if`/`for`/`func` bodies still have a global slot
/// declared before the statement walk reaches them. Lyn has no stack frames
/// in this model — every binding is a flat global — so a literal
/// top-level-only scan would leave `load_global`/`store_global` targeting
/// undeclared symbols for anything declared inside a nested block (see
/// DESIGN.md).
fn prescan_globals(ctx: &mut CodegenContext, statements: &[Stmt]) {
    for stmt in statements {
        match stmt {
            Stmt::VarAssign { name, .. } => ctx.register_global(name),
            Stmt::VarDecl { name, .. } => ctx.register_global(name),
            Stmt::FuncDef { body, .. } => prescan_globals(ctx, body),
            Stmt::ClassDef { members, .. } => prescan_globals(ctx, members),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                prescan_globals(ctx, then_branch);
                prescan_globals(ctx, else_branch);
            }
            Stmt::For { iterator, body, .. } => {
                ctx.register_global(iterator);
                prescan_globals(ctx, body);
            }
            Stmt::FuncCall { .. } | Stmt::Return(_) | Stmt::Print(_) | Stmt::Import { .. } | Stmt::ExprStmt(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::{Expr, OrderedF64};

    #[test]
    fn nested_assignment_gets_a_declared_global() {
        let program = Program {
            statements: vec![Stmt::If {
                condition: Expr::NumberLit(OrderedF64(1.0)),
                then_branch: vec![Stmt::VarAssign {
                    name: "x".into(),
                    initializer: Expr::NumberLit(OrderedF64(2.0)),
                }],
                else_branch: vec![],
            }],
        };
        let asm = CodeGenerator::generate(&program, Target::X86_64).unwrap();
        assert!(asm.contains("x: .quad 0"));
    }

    #[test]
    fn wasm_target_emits_no_intel_syntax_header() {
        let program = Program { statements: vec![] };
        let asm = CodeGenerator::generate(&program, Target::Wasm).unwrap();
        assert!(!asm.contains("intel_syntax"));
    }
}
