#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! MinangScript runtime and command-line front end.
//!
//! The functions at the crate root are the embedding surface: lex, parse,
//! transpile, or run a source string without going through the binary.

pub mod config;
pub mod eval;
pub mod host;
pub mod logger;
pub mod repl;

use log::debug;
use minang_ast::ast::Program;

pub use eval::{EvalOptions, Evaluator, FunctionRef, RuntimeError, Scoping, Value};
pub use host::{CaptureSink, Channel, PrintSink, StdioSink};
pub use minang_codegen::transpile;
pub use minang_parse::tokenize;

/// Parse a source string into a program.
pub fn parse(src: &str) -> anyhow::Result<Program> {
    minang_parse::parse_str("<input>", src)
}

/// Run an already parsed program on a fresh evaluator.
pub fn execute<S: PrintSink>(
    program: &Program,
    sink: S,
    options: EvalOptions,
) -> Result<Value, RuntimeError> {
    Evaluator::with_sink(sink, options).execute(program)
}

/// Parse and run `src` on a fresh evaluator.
pub fn run_source<S: PrintSink>(src: &str, sink: S, options: EvalOptions) -> anyhow::Result<Value> {
    let mut evaluator = Evaluator::with_sink(sink, options);
    run_with(src, &mut evaluator)
}

/// Parse `src` and run it on an existing evaluator, keeping its state.
pub fn run_with<S: PrintSink>(src: &str, evaluator: &mut Evaluator<S>) -> anyhow::Result<Value> {
    let program = parse(src)?;
    let value = evaluator.execute(&program)?;
    debug!(target: "minang::eval", "result: {}", value);
    Ok(value)
}
