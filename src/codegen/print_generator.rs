//! # Print statement generator
//!
//! `print(expr)` (§4.8): evaluate the expression into the main accumulator,
//! then hand off to the active backend's `emit_print_int`, which knows
//! whether this target has a hosted `printf` to call.

use super::backend::Backend;
use super::common::CodegenContext;
use super::expression_generator::ExpressionGenerator;
use crate::ast::nodes::Expr;
use crate::compiler::error::CompileError;

pub struct PrintGenerator;

impl PrintGenerator {
    pub fn generate(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        expr: &Expr,
    ) -> Result<String, CompileError> {
        let mut out = ExpressionGenerator::generate(ctx, backend, expr)?;
        backend.emit_print_int(&mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::OrderedF64;
    use crate::codegen::wasm::WasmBackend;
    use crate::codegen::x86_64::X86_64Backend;

    #[test]
    fn native_print_evaluates_then_calls_printf() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let asm = PrintGenerator::generate(&mut ctx, &backend, &Expr::NumberLit(OrderedF64(7.0))).unwrap();
        assert!(asm.contains("mov rax, 7"));
        assert!(asm.contains("call printf"));
    }

    #[test]
    fn wasm_print_is_a_documented_stub() {
        let mut ctx = CodegenContext::new();
        let backend = WasmBackend;
        let asm = PrintGenerator::generate(&mut ctx, &backend, &Expr::NumberLit(OrderedF64(7.0))).unwrap();
        assert!(asm.contains("no-op"));
    }
}
