//! # x86_64 backend
//!
//! Intel-syntax assembly (`.intel_syntax noprefix`) for a bare Linux ELF
//! target. `rax` is the main accumulator; binary operations assume the left
//! operand has been pushed and is recovered into `rbx` (§4.7), mirroring the
//! reference `arch_x86_64.c` backend.

use super::backend::{Backend, Target};
use crate::ast::nodes::BinOp;

pub struct X86_64Backend;

impl Backend for X86_64Backend {
    fn target(&self) -> Target {
        Target::X86_64
    }

    fn emit_load_imm_int(&self, out: &mut String, value: i64) {
        out.push_str(&format!("    mov rax, {}\n", value));
    }

    fn emit_load_global(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    mov rax, [{}]\n", name));
    }

    fn emit_store_global(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    mov [{}], rax\n", name));
    }

    fn emit_save_left(&self, out: &mut String) {
        out.push_str("    push rax\n");
    }

    fn emit_restore_left(&self, out: &mut String) {
        out.push_str("    pop rbx\n");
    }

    fn emit_add(&self, out: &mut String) {
        out.push_str("    add rax, rbx\n");
    }

    fn emit_sub(&self, out: &mut String) {
        out.push_str("    sub rbx, rax\n    mov rax, rbx\n");
    }

    fn emit_imul(&self, out: &mut String) {
        out.push_str("    imul rax, rbx\n");
    }

    fn emit_idiv(&self, out: &mut String) {
        out.push_str("    mov rcx, rax\n    mov rax, rbx\n    xor rdx, rdx\n    idiv rcx\n");
    }

    fn emit_compare(&self, out: &mut String, op: BinOp) {
        // cmp rbx, rax compares L (rbx) against R (rax); setX picks off the
        // flags the reference cmpGreater relies on for Gt, generalized to
        // the rest of the comparison family.
        let set = match op {
            BinOp::Gt => "setg",
            BinOp::Lt => "setl",
            BinOp::Gte => "setge",
            BinOp::Lte => "setle",
            BinOp::Eq => "sete",
            BinOp::Neq => "setne",
            _ => unreachable!("emit_compare only receives comparison operators"),
        };
        out.push_str("    cmp rbx, rax\n");
        out.push_str(&format!("    {} al\n", set));
        out.push_str("    movzx rax, al\n");
    }

    fn emit_op_imm(&self, out: &mut String, op: BinOp, value: i64) {
        match op {
            BinOp::Add => out.push_str(&format!("    add rax, {}\n", value)),
            BinOp::Sub => out.push_str(&format!("    sub rax, {}\n", value)),
            BinOp::Mul => out.push_str(&format!("    imul rax, rax, {}\n", value)),
            BinOp::Div => {
                out.push_str(&format!("    mov rcx, {}\n", value));
                out.push_str("    xor rdx, rdx\n    idiv rcx\n");
            }
            BinOp::Gt | BinOp::Lt | BinOp::Gte | BinOp::Lte | BinOp::Eq | BinOp::Neq => {
                let set = match op {
                    BinOp::Gt => "setg",
                    BinOp::Lt => "setl",
                    BinOp::Gte => "setge",
                    BinOp::Lte => "setle",
                    BinOp::Eq => "sete",
                    BinOp::Neq => "setne",
                    _ => unreachable!(),
                };
                out.push_str(&format!("    cmp rax, {}\n", value));
                out.push_str(&format!("    {} al\n", set));
                out.push_str("    movzx rax, al\n");
            }
        }
    }

    fn emit_set_label(&self, out: &mut String, label: &str) {
        out.push_str(&format!("{}:\n", label));
    }

    fn emit_jump(&self, out: &mut String, label: &str) {
        out.push_str(&format!("    jmp {}\n", label));
    }

    fn emit_jump_if_zero(&self, out: &mut String, label: &str) {
        out.push_str(&format!("    cmp rax, 0\n    je {}\n", label));
    }

    fn file_header(&self) -> String {
        let mut header = String::new();
        header.push_str(".intel_syntax noprefix\n");
        header.push_str(".data\n");
        header.push_str("fmt: .asciz \"Result: %ld\\n\"\n");
        header
    }

    fn emit_global_declaration(&self, out: &mut String, name: &str) {
        out.push_str(&format!("{}: .quad 0\n", name));
    }

    fn emit_entry_prologue(&self, out: &mut String) {
        out.push_str("\n.text\n.global main\nmain:\n");
    }

    fn emit_entry_epilogue(&self, out: &mut String) {
        out.push_str("    mov rax, 60\n    xor rdi, rdi\n    syscall\n");
    }

    fn emit_print_int(&self, out: &mut String) {
        out.push_str("    mov rsi, rax\n");
        out.push_str("    lea rdi, [rip+fmt]\n");
        out.push_str("    xor eax, eax\n");
        out.push_str("    call printf\n");
    }

    fn emit_function_prologue(&self, out: &mut String, name: &str) {
        out.push_str(&format!("\n.global {}\n{}:\n", name, name));
    }

    fn emit_function_epilogue(&self, out: &mut String) {
        out.push_str("    ret\n");
    }

    fn emit_call(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    call {}\n", name));
    }
}
