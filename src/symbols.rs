//! Two-tier symbol table: one global namespace plus one namespace per
//! function holding its parameters and locals.
//!
//! Nothing is ever removed. The only reset is `create_function_namespace`,
//! which replaces a function's namespace wholesale when its definition
//! starts after a prototype.

use indexmap::IndexMap;

use crate::error::{CompileError, CompileResult};
use crate::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  Global,
  Local,
  Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
  Variable,
  Function,
  Array,
}

#[derive(Debug, Clone)]
pub struct Symbol {
  pub name: String,
  pub scope: Scope,
  pub kind: SymbolKind,
  pub ty: Type,
  /// Return label for functions.
  pub label: Option<usize>,
  /// Element count for arrays, 1 otherwise.
  pub count: i64,
  /// Frame-pointer offset, filled in by the code generator.
  pub position: Option<i64>,
  /// Set once a function has been given a body.
  pub defined: bool,
}

impl Symbol {
  fn new(name: &str, scope: Scope, kind: SymbolKind, ty: Type) -> Self {
    Self {
      name: name.to_string(),
      scope,
      kind,
      ty,
      label: None,
      count: 1,
      position: None,
      defined: false,
    }
  }

  /// Bytes of storage the symbol occupies.
  pub fn storage_size(&self) -> i64 {
    match self.kind {
      SymbolKind::Array => self.ty.value_at().map_or(0, Type::size) * self.count,
      _ => self.ty.size(),
    }
  }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
  globals: IndexMap<String, Symbol>,
  functions: IndexMap<String, IndexMap<String, Symbol>>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start `function` over with an empty namespace.
  pub fn create_function_namespace(&mut self, function: &str) {
    self.functions.insert(function.to_string(), IndexMap::new());
  }

  pub fn declare_global(
    &mut self,
    name: &str,
    kind: SymbolKind,
    ty: Type,
    label: Option<usize>,
    count: i64,
    line: usize,
  ) -> CompileResult<&Symbol> {
    if self.globals.contains_key(name) {
      return Err(CompileError::semantic(
        line,
        format!("duplicate global declaration of '{name}'"),
      ));
    }
    let mut symbol = Symbol::new(name, Scope::Global, kind, ty);
    symbol.label = label;
    symbol.count = count;
    Ok(self.globals.entry(name.to_string()).or_insert(symbol))
  }

  pub fn declare_local(
    &mut self,
    function: &str,
    name: &str,
    kind: SymbolKind,
    ty: Type,
    count: i64,
    line: usize,
  ) -> CompileResult<&Symbol> {
    let mut symbol = Symbol::new(name, Scope::Local, kind, ty);
    symbol.count = count;
    self.insert_into(function, symbol, line)
  }

  pub fn declare_parameter(
    &mut self,
    function: &str,
    name: &str,
    ty: Type,
    line: usize,
  ) -> CompileResult<&Symbol> {
    let symbol = Symbol::new(name, Scope::Parameter, SymbolKind::Variable, ty);
    self.insert_into(function, symbol, line)
  }

  fn insert_into(&mut self, function: &str, symbol: Symbol, line: usize) -> CompileResult<&Symbol> {
    let Some(namespace) = self.functions.get_mut(function) else {
      return Err(CompileError::semantic(
        line,
        format!("no namespace for function '{function}'"),
      ));
    };
    if namespace.contains_key(&symbol.name) {
      return Err(CompileError::semantic(
        line,
        format!("'{}' is already declared in '{function}'", symbol.name),
      ));
    }
    Ok(namespace.entry(symbol.name.clone()).or_insert(symbol))
  }

  /// Look `name` up in the current function first, then globally.
  pub fn resolve(&self, name: &str, function: Option<&str>, line: usize) -> CompileResult<&Symbol> {
    function
      .and_then(|f| self.functions.get(f))
      .and_then(|namespace| namespace.get(name))
      .or_else(|| self.globals.get(name))
      .ok_or_else(|| CompileError::semantic(line, format!("unknown symbol '{name}'")))
  }

  pub fn global(&self, name: &str) -> Option<&Symbol> {
    self.globals.get(name)
  }

  pub fn global_mut(&mut self, name: &str) -> Option<&mut Symbol> {
    self.globals.get_mut(name)
  }

  pub fn local(&self, function: &str, name: &str) -> Option<&Symbol> {
    self.functions.get(function)?.get(name)
  }

  /// Every parameter and local of `function`, in declaration order.
  pub fn namespace(&self, function: &str) -> impl Iterator<Item = &Symbol> {
    self.functions.get(function).into_iter().flat_map(|ns| ns.values())
  }

  pub fn params(&self, function: &str) -> Vec<&Symbol> {
    self
      .namespace(function)
      .filter(|s| s.scope == Scope::Parameter)
      .collect()
  }

  pub fn set_position(&mut self, function: &str, name: &str, position: i64) {
    if let Some(symbol) = self
      .functions
      .get_mut(function)
      .and_then(|ns| ns.get_mut(name))
    {
      symbol.position = Some(position);
    }
  }
}
