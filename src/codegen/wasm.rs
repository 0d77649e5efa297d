//! # WebAssembly text backend
//!
//! Stack-based: there are no named registers, so every "register" operation
//! in the [`Backend`] trait simply pushes or pops the implicit value stack.
//! Labels become comments (`;; label L`) rather than WAT's structured
//! `block`/`loop` constructs — the flat label/jump model this generator
//! shares with the other three backends doesn't map onto canonical
//! structured WAT, so `jump`/`jump_if_zero` emit `br`/`br_if` against the
//! label name as a bare placeholder rather than a real enclosing block
//! target (§4.7). This keeps one code generator driving four backends
//! uniformly, at the cost of the emitted `.wat` not being directly
//! assemblable without a block-structuring pass this toy compiler does not
//! perform.

use super::backend::{Backend, Target};
use crate::ast::nodes::BinOp;

pub struct WasmBackend;

impl Backend for WasmBackend {
    fn target(&self) -> Target {
        Target::Wasm
    }

    fn emit_load_imm_int(&self, out: &mut String, value: i64) {
        out.push_str(&format!("    i32.const {}\n", value));
    }

    fn emit_load_global(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    global.get ${}\n", name));
    }

    fn emit_store_global(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    global.set ${}\n", name));
    }

    /// No-ops: WAT is a genuine stack machine, so the left operand already
    /// sits below the right operand on the implicit value stack once both
    /// have been pushed in order, with nothing further to stash.
    fn emit_save_left(&self, _out: &mut String) {}

    fn emit_restore_left(&self, _out: &mut String) {}

    fn emit_add(&self, out: &mut String) {
        out.push_str("    i32.add\n");
    }

    fn emit_sub(&self, out: &mut String) {
        out.push_str("    i32.sub\n");
    }

    fn emit_imul(&self, out: &mut String) {
        out.push_str("    i32.mul\n");
    }

    fn emit_idiv(&self, out: &mut String) {
        out.push_str("    i32.div_s\n");
    }

    fn emit_compare(&self, out: &mut String, op: BinOp) {
        let instr = match op {
            BinOp::Gt => "i32.gt_s",
            BinOp::Lt => "i32.lt_s",
            BinOp::Gte => "i32.ge_s",
            BinOp::Lte => "i32.le_s",
            BinOp::Eq => "i32.eq",
            BinOp::Neq => "i32.ne",
            _ => unreachable!("emit_compare only receives comparison operators"),
        };
        out.push_str(&format!("    {}\n", instr));
    }

    /// Pushes `value` then applies `op`, the same instruction each would
    /// get if the right operand had been evaluated normally — the wasm
    /// value stack makes this peephole free even without a dedicated
    /// immediate form of any of these instructions.
    fn emit_op_imm(&self, out: &mut String, op: BinOp, value: i64) {
        out.push_str(&format!("    i32.const {}\n", value));
        match op {
            BinOp::Add => out.push_str("    i32.add\n"),
            BinOp::Sub => out.push_str("    i32.sub\n"),
            BinOp::Mul => out.push_str("    i32.mul\n"),
            BinOp::Div => out.push_str("    i32.div_s\n"),
            BinOp::Gt | BinOp::Lt | BinOp::Gte | BinOp::Lte | BinOp::Eq | BinOp::Neq => {
                self.emit_compare(out, op);
            }
        }
    }

    fn emit_set_label(&self, out: &mut String, label: &str) {
        out.push_str(&format!("    ;; label {}\n", label));
    }

    fn emit_jump(&self, out: &mut String, label: &str) {
        out.push_str(&format!("    br {}\n", label));
    }

    fn emit_jump_if_zero(&self, out: &mut String, label: &str) {
        out.push_str("    i32.eqz\n");
        out.push_str(&format!("    br_if {}\n", label));
    }

    fn file_header(&self) -> String {
        String::from("(module\n")
    }

    fn emit_global_declaration(&self, out: &mut String, name: &str) {
        out.push_str(&format!("  (global ${} (mut i32) (i32.const 0))\n", name));
    }

    fn emit_entry_prologue(&self, out: &mut String) {
        out.push_str("  (func $main (export \"main\")\n");
    }

    fn emit_entry_epilogue(&self, out: &mut String) {
        out.push_str("  )\n)\n");
    }

    /// No hosted libc under wasm; printing is a documented stub (§4.8).
    fn emit_print_int(&self, out: &mut String) {
        out.push_str("    ;; print: no-op under the wasm target (no hosted libc)\n");
        out.push_str("    drop\n");
    }

    fn emit_function_prologue(&self, out: &mut String, name: &str) {
        out.push_str(&format!("  (func ${}\n", name));
    }

    fn emit_function_epilogue(&self, out: &mut String) {
        out.push_str("  )\n");
    }

    fn emit_call(&self, out: &mut String, name: &str) {
        out.push_str(&format!("    call ${}\n", name));
    }
}
