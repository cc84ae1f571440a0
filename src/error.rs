//! Shared error type used across the compilation pipeline.
//!
//! Every stage stops at the first problem it finds and hands a single
//! `CompileError` back to the caller. The variants follow the classes of
//! failure a run can hit, so hosts can tell a bad token from a bad type
//! without parsing the message.

use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Coarse classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Lexical,
  Syntax,
  Semantic,
  Resource,
  Internal,
  Io,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  /// A character the scanner does not recognise.
  #[snafu(display("[line {line}] {message}"))]
  Lexical { line: usize, message: String },

  /// An expected token was absent.
  #[snafu(display("[line {line}] {message}"))]
  Syntax { line: usize, message: String },

  /// Unresolved names, duplicate declarations and type mismatches.
  #[snafu(display("[line {line}] {message}"))]
  Semantic { line: usize, message: String },

  /// The register pool ran dry during code generation.
  #[snafu(display("[line {line}] {message}"))]
  Resource { line: usize, message: String },

  /// A broken invariant inside the compiler itself; never tied to a line.
  #[snafu(display("internal compiler error: {message}"))]
  Internal { message: String },

  /// Reading the source or writing the assembly failed.
  #[snafu(display("{}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
}

impl CompileError {
  pub fn lexical(line: usize, message: impl Into<String>) -> Self {
    Self::Lexical {
      line,
      message: message.into(),
    }
  }

  pub fn syntax(line: usize, message: impl Into<String>) -> Self {
    Self::Syntax {
      line,
      message: message.into(),
    }
  }

  pub fn semantic(line: usize, message: impl Into<String>) -> Self {
    Self::Semantic {
      line,
      message: message.into(),
    }
  }

  pub fn resource(line: usize, message: impl Into<String>) -> Self {
    Self::Resource {
      line,
      message: message.into(),
    }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal {
      message: message.into(),
    }
  }

  /// Source line the error was detected on, when there is one.
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::Lexical { line, .. }
      | Self::Syntax { line, .. }
      | Self::Semantic { line, .. }
      | Self::Resource { line, .. } => Some(*line),
      Self::Internal { .. } | Self::Io { .. } => None,
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Lexical { .. } => ErrorKind::Lexical,
      Self::Syntax { .. } => ErrorKind::Syntax,
      Self::Semantic { .. } => ErrorKind::Semantic,
      Self::Resource { .. } => ErrorKind::Resource,
      Self::Internal { .. } => ErrorKind::Internal,
      Self::Io { .. } => ErrorKind::Io,
    }
  }
}
