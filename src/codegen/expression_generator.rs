//! # Expression code generator
//!
//! Translates AST expressions into assembly text through the active
//! [`Backend`] (§4.8). Literals and identifiers become a single emission;
//! binary operations evaluate the left operand, save it, evaluate the
//! right, then apply the backend's operator — except when the right
//! operand is itself a literal, in which case the save/restore round-trip
//! is skipped and the immediate is folded directly into the operator
//! emission, the one peephole the optimizer's Non-goals still permit.

use super::backend::Backend;
use super::common::CodegenContext;
use crate::ast::nodes::{BinOp, Expr};
use crate::compiler::error::CompileError;

pub struct ExpressionGenerator;

impl ExpressionGenerator {
    pub fn generate(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        expr: &Expr,
    ) -> Result<String, CompileError> {
        match expr {
            Expr::NumberLit(value) => {
                let mut out = String::new();
                backend.emit_load_imm_int(&mut out, value.0 as i64);
                Ok(out)
            }
            Expr::Identifier(name) => {
                if !ctx.is_known_global(name) {
                    return Err(CompileError::undeclared(name));
                }
                let mut out = String::new();
                backend.emit_load_global(&mut out, name);
                Ok(out)
            }
            Expr::Binary { left, op, right } => Self::generate_binary(ctx, backend, left, *op, right),
            Expr::FuncCall { name, args } => Self::generate_call(ctx, backend, name, args),
            // Strings, lambdas, member/method access, and array literals have
            // no runtime representation in this generator's model (§4.8,
            // §9 Open Questions); they are accepted by earlier phases but
            // contribute no code here beyond a documented stub comment.
            Expr::StringLit(_) | Expr::Lambda { .. } | Expr::ArrayLiteral(_) => {
                Ok(String::from("    ; <expression without runtime representation>\n"))
            }
            Expr::MemberAccess { .. } | Expr::MethodCall { .. } => {
                Ok(String::from("    ; <member/method access: no code generated>\n"))
            }
        }
    }

    fn generate_binary(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        left: &Expr,
        op: BinOp,
        right: &Expr,
    ) -> Result<String, CompileError> {
        let mut out = Self::generate(ctx, backend, left)?;

        if let Expr::NumberLit(value) = right {
            // Immediate-operand folding: the left operand stays in the main
            // register/stack slot it already occupies, and `emit_op_imm`
            // applies the operator against the literal directly, skipping
            // the push/pop round trip the general case below needs.
            backend.emit_op_imm(&mut out, op, value.0 as i64);
            return Ok(out);
        }

        backend.emit_save_left(&mut out);
        out.push_str(&Self::generate(ctx, backend, right)?);
        backend.emit_restore_left(&mut out);
        Self::emit_op(backend, &mut out, op);
        Ok(out)
    }

    fn emit_op(backend: &dyn Backend, out: &mut String, op: BinOp) {
        match op {
            BinOp::Add => backend.emit_add(out),
            BinOp::Sub => backend.emit_sub(out),
            BinOp::Mul => backend.emit_imul(out),
            BinOp::Div => backend.emit_idiv(out),
            BinOp::Gt | BinOp::Lt | BinOp::Gte | BinOp::Lte | BinOp::Eq | BinOp::Neq => {
                backend.emit_compare(out, op)
            }
        }
    }

    /// Arguments are evaluated left-to-right, each pushed, then the target
    /// is called by name (§4.8). Lyn has no user-defined-function calling
    /// convention beyond this generator's reach, so the call itself is
    /// emitted as a bare `call name` the way the reference generator does.
    fn generate_call(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        name: &str,
        args: &[Expr],
    ) -> Result<String, CompileError> {
        let mut out = String::new();
        for arg in args {
            out.push_str(&Self::generate(ctx, backend, arg)?);
            backend.emit_save_left(&mut out);
        }
        backend.emit_call(&mut out, name);
        Ok(out)
    }

    /// Entry point for `Stmt::FuncCall` (a call used for side effects, its
    /// result discarded): identical emission to an expression-position call.
    pub fn generate_statement_call(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        name: &str,
        args: &[Expr],
    ) -> Result<String, CompileError> {
        Self::generate_call(ctx, backend, name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::OrderedF64;
    use crate::codegen::x86_64::X86_64Backend;

    #[test]
    fn literal_addition_folds_the_immediate() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let expr = Expr::Binary {
            left: Box::new(Expr::NumberLit(OrderedF64(2.0))),
            op: BinOp::Add,
            right: Box::new(Expr::NumberLit(OrderedF64(3.0))),
        };
        let asm = ExpressionGenerator::generate(&mut ctx, &backend, &expr).unwrap();
        assert!(!asm.contains("push"), "immediate RHS should skip the push/pop path");
        assert!(asm.contains("add rax, 3"), "right literal should fold directly into the add");
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let expr = Expr::Identifier("missing".into());
        assert!(ExpressionGenerator::generate(&mut ctx, &backend, &expr).is_err());
    }
}
