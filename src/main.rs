//! # Lyn Compiler (`lync`) Executable
//!
//! Command-line entry point. Uses `clap` to parse `build`/`run`/`test`
//! subcommands and drives `compiler::Compiler` to turn Lyn source into
//! retargetable assembly text (§6).

use clap::{Arg, Command};
use std::path::PathBuf;
use std::process;

mod ast;
mod codegen;
mod compiler;
mod debug;
mod memory;

use compiler::Compiler;

fn main() {
    let matches = Command::new("lync")
        .version("0.1.0")
        .about("Lyn ahead-of-time compiler")
        .subcommand(
            Command::new("build")
                .about("Compile a Lyn source file to assembly")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .help("Lyn source file to compile"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_name("TARGET")
                        .default_value("x86")
                        .help("Target architecture: x86, arm, riscv, or wasm"),
                )
                .arg(
                    Arg::new("show-asm")
                        .long("show-asm")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the generated assembly to stdout instead of writing a file"),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .action(clap::ArgAction::SetTrue)
                        .help("Show step-by-step compilation progress"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Compile a Lyn source file and print its generated assembly")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .help("Lyn source file to run"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_name("TARGET")
                        .default_value("x86")
                        .help("Target architecture: x86, arm, riscv, or wasm"),
                ),
        )
        .subcommand(
            Command::new("test")
                .about("Validate Lyn source files through the full pipeline")
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .help("Specific file to test; defaults to every .lyn file in the current directory"),
                )
                .arg(
                    Arg::new("dump-ast")
                        .long("dump-ast")
                        .action(clap::ArgAction::SetTrue)
                        .help("Print the parsed AST as JSON alongside the pass/fail result"),
                ),
        )
        .get_matches();

    let mut compiler = Compiler::new();

    match matches.subcommand() {
        Some(("build", sub_matches)) => {
            let file = sub_matches.get_one::<String>("file").unwrap();
            compiler.source_path = PathBuf::from(file);
            let target = sub_matches.get_one::<String>("target").map(|s| s.as_str()).unwrap_or("x86");
            compiler.show_asm = sub_matches.get_flag("show-asm");
            compiler.verbose = sub_matches.get_flag("verbose");

            if let Err(e) = compiler.build(target) {
                eprintln!("build failed: {}", e);
                process::exit(1);
            }
        }
        Some(("run", sub_matches)) => {
            let file = sub_matches.get_one::<String>("file").unwrap();
            compiler.source_path = PathBuf::from(file);
            let target = sub_matches.get_one::<String>("target").map(|s| s.as_str()).unwrap_or("x86");
            let (target, warning) = codegen::backend::Target::parse(target);
            if let Some(warning) = warning {
                eprintln!("warning: {}", warning);
            }
            compiler.target = target;

            if let Err(e) = compiler.run_single_file() {
                eprintln!("run failed: {}", e);
                process::exit(1);
            }
        }
        Some(("test", sub_matches)) => {
            let file = sub_matches.get_one::<String>("file").map(PathBuf::from);
            if sub_matches.get_flag("dump-ast") {
                if let Some(path) = &file {
                    dump_ast(path);
                }
            }

            if let Err(e) = compiler.test(file) {
                eprintln!("test failed: {}", e);
                process::exit(1);
            }
        }
        _ => {
            println!("Lyn ahead-of-time compiler (lync)");
            println!("Use 'lync --help' for usage information");
        }
    }
}

/// Dumps the token stream and AST for `path` as JSON, for diagnosing parser
/// output without a debugger (§0). Failures here are printed but never
/// override the `test` subcommand's own exit status.
fn dump_ast(path: &PathBuf) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    if let Ok(tokens) = compiler::tokenize(&content) {
        if let Ok(json) = serde_json::to_string_pretty(&tokens) {
            println!("{}", json);
        }
    }
    if let Ok(ast) = compiler::parse(&content) {
        if let Ok(json) = serde_json::to_string_pretty(&ast) {
            println!("{}", json);
        }
    }
}
