//! Crate root: wires together the compilation pipeline.
//!
//! A run goes through three stages that share one [`Context`]:
//! - `tokenizer` turns source text into a flat token stream.
//! - `parser` builds the typed AST, declaring symbols and inserting
//!   conversions as it goes.
//! - `codegen` lowers the tree into x86-64 AT&T assembly.
//!
//! The first error from any stage ends the run.

pub mod ast;
pub mod codegen;
pub mod coerce;
pub mod context;
pub mod error;
pub mod parser;
pub mod symbols;
pub mod tokenizer;
pub mod ty;

use std::path::Path;

use snafu::ResultExt;

pub use ast::Program;
pub use context::Context;
pub use error::{CompileError, CompileResult, ErrorKind};

use error::IoSnafu;

/// Tokenize and parse `source`, returning the tree together with the
/// context that holds its symbols.
pub fn parse_program(source: &str) -> CompileResult<(Program, Context)> {
  let mut ctx = Context::new();
  let tokens = tokenizer::tokenize(source)?;
  let program = parser::parse(tokens, source, &mut ctx)?;
  Ok((program, ctx))
}

/// Compile a whole source file's text into AT&T assembly.
pub fn compile(source: &str) -> CompileResult<String> {
  let (program, mut ctx) = parse_program(source)?;
  codegen::generate(&program, &mut ctx)
}

pub fn read_source(path: &Path) -> CompileResult<String> {
  std::fs::read_to_string(path).context(IoSnafu { path })
}

pub fn write_output(path: &Path, asm: &str) -> CompileResult<()> {
  std::fs::write(path, asm).context(IoSnafu { path })
}
