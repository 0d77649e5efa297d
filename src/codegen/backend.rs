//! # Retargetable backend interface
//!
//! `Backend` is the Rust trait equivalent of the reference compiler's
//! `ArchBackend` function-pointer vtable (§4.7): one small set of emission
//! primitives that every architecture implements against its own register
//! convention, so the code generator can walk the AST once and call the
//! same method names regardless of target.

use crate::ast::nodes::BinOp;
use std::fmt;

/// The architectures the code generator can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    X86_64,
    Arm32,
    RiscV64,
    Wasm,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::X86_64 => "x86_64",
            Target::Arm32 => "arm32",
            Target::RiscV64 => "riscv64",
            Target::Wasm => "wasm",
        };
        f.write_str(name)
    }
}

impl Target {
    /// Parses a `--target=` value. Unrecognized spellings degrade to
    /// `X86_64` with a warning message rather than failing the build,
    /// per §6's CLI contract. Accepts both the short aliases
    /// (`x86`/`arm`/`riscv`/`wasm`) and full `target-lexicon` triples,
    /// matching on architecture only.
    pub fn parse(raw: &str) -> (Target, Option<String>) {
        match raw {
            "x86" | "x86_64" | "x86-64" => (Target::X86_64, None),
            "arm" | "arm32" => (Target::Arm32, None),
            "riscv" | "riscv64" => (Target::RiscV64, None),
            "wasm" | "wasm32" | "wat" => (Target::Wasm, None),
            other => match other.parse::<target_lexicon::Triple>() {
                Ok(triple) => match triple.architecture {
                    target_lexicon::Architecture::X86_64 => (Target::X86_64, None),
                    target_lexicon::Architecture::Arm(_) => (Target::Arm32, None),
                    target_lexicon::Architecture::Riscv64(_) => (Target::RiscV64, None),
                    target_lexicon::Architecture::Wasm32 => (Target::Wasm, None),
                    _ => (
                        Target::X86_64,
                        Some(format!("unsupported triple '{}', defaulting to x86_64", other)),
                    ),
                },
                Err(_) => (
                    Target::X86_64,
                    Some(format!("unrecognized target '{}', defaulting to x86_64", other)),
                ),
            },
        }
    }
}

/// Architecture-specific emission of the operations the code generator
/// issues in a fixed order (§4.7, §4.8). Every method appends text to
/// `out`; none of them carry register-allocation state beyond what the
/// fixed calling convention in each implementation's module doc describes.
pub trait Backend {
    fn target(&self) -> Target;

    fn emit_load_imm_int(&self, out: &mut String, value: i64);
    fn emit_load_global(&self, out: &mut String, name: &str);
    fn emit_store_global(&self, out: &mut String, name: &str);

    /// Stashes the just-evaluated left operand somewhere that survives
    /// evaluating the right operand (which may itself clobber any scratch
    /// register this backend otherwise uses). Every implementation uses a
    /// real stack slot rather than a second named register, so nested
    /// binary expressions evaluate correctly regardless of what registers
    /// the right-hand subtree touches.
    fn emit_save_left(&self, out: &mut String);

    /// Recovers the value [`Backend::emit_save_left`] stashed, depositing it
    /// into whatever register this backend's `emit_add`/`emit_sub`/etc.
    /// expect the left operand to sit in.
    fn emit_restore_left(&self, out: &mut String);

    fn emit_add(&self, out: &mut String);
    fn emit_sub(&self, out: &mut String);
    fn emit_imul(&self, out: &mut String);
    fn emit_idiv(&self, out: &mut String);

    /// Emits a comparison between the two most recently evaluated operands,
    /// leaving a 1/0 result in the main register/stack slot.
    fn emit_compare(&self, out: &mut String, op: BinOp);

    /// Applies `op` against the immediate `value` as the right operand,
    /// given the left operand already sits in this backend's main
    /// register (or, for the wasm backend, on top of the value stack).
    /// Used by the expression generator's immediate-fold peephole so a
    /// literal right-hand operand never needs `emit_save_left`/
    /// `emit_restore_left` at all.
    fn emit_op_imm(&self, out: &mut String, op: BinOp, value: i64);

    fn emit_set_label(&self, out: &mut String, label: &str);
    fn emit_jump(&self, out: &mut String, label: &str);
    fn emit_jump_if_zero(&self, out: &mut String, label: &str);

    /// Prologue text preceding the `.data`/global-declarations section
    /// (e.g. `.intel_syntax noprefix` on native targets, nothing on wasm).
    fn file_header(&self) -> String;

    /// One declaration line per known global, given its current name.
    fn emit_global_declaration(&self, out: &mut String, name: &str);

    /// Opens the text/code section and the `main` entry point.
    fn emit_entry_prologue(&self, out: &mut String);

    /// Emits the program's exit sequence; wasm has no OS exit convention
    /// and instead just closes the `main` function body.
    fn emit_entry_epilogue(&self, out: &mut String);

    /// Moves the evaluated expression into the platform's `printf` argument
    /// register and calls it. The wasm target has no hosted libc, so its
    /// implementation emits a documented no-op comment instead (§4.8).
    fn emit_print_int(&self, out: &mut String);

    fn emit_function_prologue(&self, out: &mut String, name: &str);
    fn emit_function_epilogue(&self, out: &mut String);

    /// Calls a function by name, using whatever call mnemonic this target's
    /// assembler expects (`call`, `bl`, `call $name`, ...).
    fn emit_call(&self, out: &mut String, name: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_aliases_parse_without_warning() {
        for (raw, expected) in [
            ("x86", Target::X86_64),
            ("x86_64", Target::X86_64),
            ("arm", Target::Arm32),
            ("arm32", Target::Arm32),
            ("riscv", Target::RiscV64),
            ("riscv64", Target::RiscV64),
            ("wasm", Target::Wasm),
            ("wasm32", Target::Wasm),
        ] {
            let (target, warning) = Target::parse(raw);
            assert_eq!(target, expected, "parsing '{}'", raw);
            assert!(warning.is_none(), "'{}' should not warn", raw);
        }
    }

    #[test]
    fn target_lexicon_triples_match_by_architecture() {
        let (target, warning) = Target::parse("x86_64-unknown-linux-gnu");
        assert_eq!(target, Target::X86_64);
        assert!(warning.is_none());

        let (target, warning) = Target::parse("riscv64gc-unknown-linux-gnu");
        assert_eq!(target, Target::RiscV64);
        assert!(warning.is_none());
    }

    #[test]
    fn unrecognized_target_degrades_to_x86_64_with_warning() {
        let (target, warning) = Target::parse("not-a-real-target");
        assert_eq!(target, Target::X86_64);
        assert!(warning.unwrap().contains("not-a-real-target"));
    }

    #[test]
    fn unsupported_triple_architecture_degrades_to_x86_64_with_warning() {
        let (target, warning) = Target::parse("mips-unknown-linux-gnu");
        assert_eq!(target, Target::X86_64);
        assert!(warning.is_some());
    }
}
