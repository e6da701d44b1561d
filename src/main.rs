//! # minicc
//!
//! Whole-program compiler driver for the accepted C subset: parse, resolve
//! names, type check, lower to the IR, optimize, and print the textual IR to
//! stdout. The first failing phase aborts the pipeline with a non-zero exit
//! code; diagnostics go to stderr.
use std::{fs, path::PathBuf, process::exit};

use clap::Parser;
use log::{error, info};

use minicc::{
    ast::{Ast, CParser},
    binder::Binder,
    codegen::Codegen,
    optimizer,
    typechecker::{self, Typechecker},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the source file.
    file: PathBuf,

    /// Dump the parsed AST, list all global types and report each phase.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose {
        log::Level::Info
    } else {
        log::Level::Error
    };
    simple_logger::init_with_level(level).unwrap();

    let file = args.file.to_string_lossy().to_string();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(error) => {
            error!("could not read '{file}': {error}");
            exit(-1);
        }
    };

    let program = match CParser::parse_program(&source) {
        Ok(program) => program,
        Err(error) => {
            error!("failed to parse '{file}' ({error})");
            exit(-1);
        }
    };

    let ast = Ast::from_program(program, &file);

    if args.verbose {
        info!("Parsed AST:\n{ast:#?}");
    }

    if let Err(errors) = Binder::new().check(&ast) {
        for error in errors {
            error!("{error}");
        }
        exit(-1);
    }
    info!("Name resolution OK");

    let typed = match Typechecker::new().check(&ast) {
        Ok(typed) => typed,
        Err(errors) => {
            for error in errors {
                error!("{error}");
            }
            exit(-1);
        }
    };
    info!("Type checking OK");

    if args.verbose {
        for (name, ctype) in typechecker::global_bindings(&typed) {
            info!("{name}: {ctype}");
        }
    }

    let mut module = match Codegen::new().lower(&typed) {
        Ok(module) => module,
        Err(error) => {
            error!("{error}");
            exit(-1);
        }
    };
    info!("Code generation OK");

    if let Err(error) = optimizer::optimize(&mut module) {
        error!("{error}");
        exit(-1);
    }
    info!("Optimization OK");

    print!("{module}");
}
