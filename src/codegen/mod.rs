//! # Code Generation Module
//!
//! Translates the analyzed, optimized Abstract Syntax Tree into target
//! assembly text, retargetable across four architectures via the
//! [`Backend`](backend::Backend) trait (§4.7, §4.8).
//!
//! Key components:
//! - **`backend`**: the `Target` enum and the `Backend` trait every
//!   architecture module implements.
//! - **`x86_64` / `arm32` / `riscv64` / `wasm`**: one `Backend` impl each.
//! - **`common`**: [`common::CodegenContext`], the shared global-symbol
//!   table and label counter threaded through every generator.
//! - **Generators**: `expression_generator`, `statement_generator`, and
//!   `print_generator` walk the AST and call into the active `Backend`.

pub mod arm32;
pub mod backend;
pub mod common;
pub mod expression_generator;
pub mod print_generator;
pub mod riscv64;
pub mod statement_generator;
pub mod wasm;
pub mod x86_64;
