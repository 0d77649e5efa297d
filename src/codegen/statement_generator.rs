//! # Statement code generator
//!
//! Translates every [`Stmt`] variant into assembly text through the active
//! [`Backend`] (§4.8). Labels for `if`/`for` come from [`CodegenContext`]'s
//! monotonic counter, guaranteeing uniqueness across the whole compilation.

use super::backend::Backend;
use super::common::CodegenContext;
use super::expression_generator::ExpressionGenerator;
use super::print_generator::PrintGenerator;
use crate::ast::nodes::{Expr, Stmt};
use crate::compiler::error::CompileError;

pub struct StatementGenerator;

impl StatementGenerator {
    pub fn generate(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        stmt: &Stmt,
    ) -> Result<String, CompileError> {
        match stmt {
            Stmt::VarAssign { name, initializer } => Self::generate_store(ctx, backend, name, initializer),
            Stmt::VarDecl {
                name, initializer, ..
            } => match initializer {
                Some(expr) => Self::generate_store(ctx, backend, name, expr.as_ref()),
                None => {
                    ctx.register_global(name);
                    Ok(String::new())
                }
            },
            Stmt::FuncDef { name, body, .. } => Self::generate_func_def(ctx, backend, name, body),
            Stmt::FuncCall { name, args } => ExpressionGenerator::generate_statement_call(ctx, backend, name, args),
            Stmt::Return(expr) => Self::generate_return(ctx, backend, expr),
            Stmt::Print(expr) => PrintGenerator::generate(ctx, backend, expr),
            Stmt::ClassDef { .. } => Ok(String::from("    ; <class definition: method dispatch not generated>\n")),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => Self::generate_if(ctx, backend, condition, then_branch, else_branch),
            Stmt::For {
                iterator,
                range_start,
                range_end,
                body,
            } => Self::generate_for(ctx, backend, iterator, range_start, range_end, body),
            Stmt::Import { .. } => Ok(String::from("    ; <import: no runtime effect>\n")),
            Stmt::ExprStmt(expr) => ExpressionGenerator::generate(ctx, backend, expr),
        }
    }

    pub fn generate_all(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        statements: &[Stmt],
    ) -> Result<String, CompileError> {
        let mut out = String::new();
        for stmt in statements {
            out.push_str(&Self::generate(ctx, backend, stmt)?);
        }
        Ok(out)
    }

    /// Shared by `VarAssign` and an initialized `VarDecl`: evaluate the
    /// expression into the accumulator, then store it to the named global.
    fn generate_store(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        name: &str,
        initializer: &Expr,
    ) -> Result<String, CompileError> {
        ctx.register_global(name);
        let mut out = ExpressionGenerator::generate(ctx, backend, initializer)?;
        backend.emit_store_global(&mut out, name);
        Ok(out)
    }

    fn generate_func_def(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        name: &str,
        body: &[Stmt],
    ) -> Result<String, CompileError> {
        let mut out = String::new();
        backend.emit_function_prologue(&mut out, name);
        out.push_str(&Self::generate_all(ctx, backend, body)?);
        backend.emit_function_epilogue(&mut out);
        Ok(out)
    }

    fn generate_return(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        expr: &Expr,
    ) -> Result<String, CompileError> {
        let mut out = ExpressionGenerator::generate(ctx, backend, expr)?;
        backend.emit_function_epilogue(&mut out);
        Ok(out)
    }

    /// `if cond; then...; [else; else...]; end` (§4.8): evaluate the
    /// condition, branch to `else` (or straight to `end` with no else
    /// branch) when it's zero, fall through to `then`, then skip over
    /// `else` once `then` completes.
    fn generate_if(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        condition: &Expr,
        then_branch: &[Stmt],
        else_branch: &[Stmt],
    ) -> Result<String, CompileError> {
        let else_label = ctx.next_label();
        let end_label = ctx.next_label();

        let mut out = ExpressionGenerator::generate(ctx, backend, condition)?;
        backend.emit_jump_if_zero(&mut out, &else_label);
        out.push_str(&Self::generate_all(ctx, backend, then_branch)?);
        backend.emit_jump(&mut out, &end_label);
        backend.emit_set_label(&mut out, &else_label);
        out.push_str(&Self::generate_all(ctx, backend, else_branch)?);
        backend.emit_set_label(&mut out, &end_label);
        Ok(out)
    }

    /// `for iterator in range(start, end); body; end` (§4.8): the iterator
    /// lives in the same flat global slot space as every other variable in
    /// this generator's model, matching the reference's single, stack-frame
    /// free storage class.
    fn generate_for(
        ctx: &mut CodegenContext,
        backend: &dyn Backend,
        iterator: &str,
        range_start: &Expr,
        range_end: &Expr,
        body: &[Stmt],
    ) -> Result<String, CompileError> {
        ctx.register_global(iterator);
        let head_label = ctx.next_label();
        let end_label = ctx.next_label();

        let mut out = ExpressionGenerator::generate(ctx, backend, range_start)?;
        backend.emit_store_global(&mut out, iterator);

        backend.emit_set_label(&mut out, &head_label);
        // left = iterator, right = range end, matching the save/evaluate/
        // restore order `generate_binary` uses for every other binary op;
        // `Lt` then yields "iterator < end", the loop's continue condition.
        backend.emit_load_global(&mut out, iterator);
        backend.emit_save_left(&mut out);
        out.push_str(&ExpressionGenerator::generate(ctx, backend, range_end)?);
        backend.emit_restore_left(&mut out);
        backend.emit_compare(&mut out, crate::ast::nodes::BinOp::Lt);
        backend.emit_jump_if_zero(&mut out, &end_label);

        out.push_str(&Self::generate_all(ctx, backend, body)?);

        // iterator = iterator + 1, same save/evaluate/restore order.
        backend.emit_load_global(&mut out, iterator);
        backend.emit_save_left(&mut out);
        backend.emit_load_imm_int(&mut out, 1);
        backend.emit_restore_left(&mut out);
        backend.emit_add(&mut out);
        backend.emit_store_global(&mut out, iterator);
        backend.emit_jump(&mut out, &head_label);
        backend.emit_set_label(&mut out, &end_label);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::nodes::OrderedF64;
    use crate::codegen::x86_64::X86_64Backend;

    fn num(value: f64) -> Expr {
        Expr::NumberLit(OrderedF64(value))
    }

    #[test]
    fn generate_store_registers_the_global_and_stores_after_evaluating() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let asm = StatementGenerator::generate_store(&mut ctx, &backend, "x", &num(14.0)).unwrap();
        assert!(ctx.is_known_global("x"));
        let load_pos = asm.find("mov rax, 14").unwrap();
        let store_pos = asm.find("mov [x], rax").unwrap();
        assert!(load_pos < store_pos, "value must be evaluated before it is stored");
    }

    #[test]
    fn generate_func_def_wraps_body_in_prologue_and_epilogue() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let body = vec![Stmt::Return(num(1.0))];
        let asm = StatementGenerator::generate_func_def(&mut ctx, &backend, "f", &body).unwrap();
        assert!(asm.starts_with("\n.global f\nf:\n"));
        assert!(asm.trim_end().ends_with("ret"));
    }

    /// §4.8: evaluate condition, jump to else when zero, fall through to
    /// `then`, jump past `else`, then the else/end labels in that order.
    #[test]
    fn generate_if_emits_condition_then_else_end_in_order() {
        let backend = X86_64Backend;
        let then_branch = vec![Stmt::Print(num(1.0))];
        let else_branch = vec![Stmt::Print(num(2.0))];

        // "flag" is undeclared in a fresh context, so this should fail fast
        // rather than silently emit a load of an undeclared name.
        let mut err_ctx = CodegenContext::new();
        let err = StatementGenerator::generate_if(&mut err_ctx, &backend, &Expr::Identifier("flag".into()), &then_branch, &else_branch);
        assert!(err.is_err());

        let mut ctx = CodegenContext::new();
        ctx.register_global("flag");
        let asm = StatementGenerator::generate_if(&mut ctx, &backend, &Expr::Identifier("flag".into()), &then_branch, &else_branch)
            .unwrap();

        let cond_pos = asm.find("mov rax, [flag]").unwrap();
        let jz_pos = asm.find("je L0").unwrap();
        let then_pos = asm.find("mov rax, 1").unwrap();
        let jmp_end_pos = asm.find("jmp L1").unwrap();
        let else_label_pos = asm.find("L0:").unwrap();
        let else_pos = asm.find("mov rax, 2").unwrap();
        let end_label_pos = asm.find("L1:").unwrap();

        assert!(cond_pos < jz_pos);
        assert!(jz_pos < then_pos);
        assert!(then_pos < jmp_end_pos);
        assert!(jmp_end_pos < else_label_pos);
        assert!(else_label_pos < else_pos);
        assert!(else_pos < end_label_pos);
    }

    #[test]
    fn generate_for_follows_save_evaluate_restore_order_for_both_binary_ops() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let body = vec![Stmt::Print(Expr::Identifier("i".into()))];
        let asm = StatementGenerator::generate_for(
            &mut ctx,
            &backend,
            "i",
            &num(0.0),
            &num(3.0),
            &body,
        )
        .unwrap();

        // Continue check: load iterator -> save -> evaluate end -> restore -> compare.
        let load_iter_pos = asm.find("mov rax, [i]").expect("loads the iterator");
        let first_push_pos = asm[load_iter_pos..].find("push rax").map(|p| p + load_iter_pos).unwrap();
        let load_end_pos = asm[first_push_pos..].find("mov rax, 3").map(|p| p + first_push_pos).unwrap();
        let first_pop_pos = asm[load_end_pos..].find("pop rbx").map(|p| p + load_end_pos).unwrap();
        let cmp_pos = asm[first_pop_pos..].find("cmp rbx, rax").map(|p| p + first_pop_pos).unwrap();
        assert!(load_iter_pos < first_push_pos);
        assert!(first_push_pos < load_end_pos);
        assert!(load_end_pos < first_pop_pos);
        assert!(first_pop_pos < cmp_pos);

        // Increment: load iterator -> save -> load literal 1 -> restore -> add -> store.
        let second_load_iter_pos = asm[cmp_pos..].find("mov rax, [i]").map(|p| p + cmp_pos).unwrap();
        let second_push_pos = asm[second_load_iter_pos..]
            .find("push rax")
            .map(|p| p + second_load_iter_pos)
            .unwrap();
        let load_one_pos = asm[second_push_pos..].find("mov rax, 1").map(|p| p + second_push_pos).unwrap();
        let second_pop_pos = asm[load_one_pos..].find("pop rbx").map(|p| p + load_one_pos).unwrap();
        let add_pos = asm[second_pop_pos..].find("add rax, rbx").map(|p| p + second_pop_pos).unwrap();
        let store_pos = asm[add_pos..].find("mov [i], rax").map(|p| p + add_pos).unwrap();
        assert!(second_load_iter_pos < second_push_pos);
        assert!(second_push_pos < load_one_pos);
        assert!(load_one_pos < second_pop_pos);
        assert!(second_pop_pos < add_pos);
        assert!(add_pos < store_pos);

        assert_eq!(asm.matches("L0:").count(), 1, "loop head label must be unique");
        assert_eq!(asm.matches("L1:").count(), 1, "loop end label must be unique");
    }

    #[test]
    fn class_def_and_import_emit_documented_stub_comments_only() {
        let mut ctx = CodegenContext::new();
        let backend = X86_64Backend;
        let class_asm = StatementGenerator::generate(
            &mut ctx,
            &backend,
            &Stmt::ClassDef {
                name: "Foo".into(),
                members: vec![],
            },
        )
        .unwrap();
        assert!(class_asm.trim_start().starts_with(';'));

        let import_asm = StatementGenerator::generate(
            &mut ctx,
            &backend,
            &Stmt::Import {
                kind: crate::ast::nodes::ImportKind::Ui,
                name: "home".into(),
            },
        )
        .unwrap();
        assert!(import_asm.trim_start().starts_with(';'));
    }
}
