//! Compiler-compiler demo CLI.
//!
//! Builds the example arithmetic/assignment language, parses a file (or a
//! snippet given on the command line) against it, and prints diagnostics
//! from the traversal.

use gramlr::demo::lang;
use gramlr::{Parser, generate_parse_table};
use std::env;
use std::process;

fn run() -> gramlr::Result<()> {
    let grammar = lang::build()?;
    // Shift-wins is the correct resolution for this grammar's classic
    // left-associative-operator shift/reduce ambiguity.
    let table = generate_parse_table(&grammar, true)?;
    let mut parser = Parser::new(&grammar, &table)
        .on_next_parse(|symbol, op| log::trace!("symbol {symbol} -> {op:?}"));

    let args: Vec<String> = env::args().skip(1).collect();
    if let Some(path) = args.first() {
        parser.parse_file(path)?;
    } else {
        let mut source = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut source)?;
        parser.parse_str(&source, "stdin")?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{e}");
        process::exit(1);
    }
}
