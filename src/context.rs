//! State owned by a single compilation run.
//!
//! The parser and the code generator both borrow the same `Context`, so the
//! symbol table they see is the same one and label ids drawn by either side
//! never collide.

use crate::symbols::SymbolTable;

#[derive(Debug, Default)]
pub struct Context {
  pub symbols: SymbolTable,
  next_label: usize,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Draw a fresh label id. Ids strictly increase over the whole run.
  pub fn new_label(&mut self) -> usize {
    let label = self.next_label;
    self.next_label += 1;
    label
  }
}
