#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! JavaScript back end for MinangScript.
//!
//! Generation is a single stateless pass over the AST. Output is plain
//! JavaScript with every binary and unary operation parenthesised, so no
//! precedence information is needed at emission time.

mod emit;
mod error;
mod wrap;

pub use emit::generate;
pub use error::UnsupportedNodeError;
pub use wrap::{generate_module, generate_with_runtime, DEFAULT_MODULE_NAME, RUNTIME_PRELUDE};

use log::debug;

/// Parse `src` and emit JavaScript for it.
pub fn transpile(src: &str) -> anyhow::Result<String> {
    let program = minang_parse::parse_str("<transpile>", src)?;
    let js = generate(&program)?;
    debug!(
        target: "minang::codegen",
        "emitted {} statements, {} bytes",
        program.body.len(),
        js.len()
    );
    Ok(js)
}
