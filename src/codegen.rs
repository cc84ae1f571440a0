//! Code generation: lower the typed AST into AT&T x86-64 assembly.
//!
//! Expressions are evaluated into a pool of four scratch registers. Every
//! leaf allocates a register, every binary operator consumes two and hands
//! one back, and statements release whatever is left. Nothing is spilled:
//! an expression that needs a fifth live value is rejected. Locals live in
//! the stack frame and are addressed relative to `%rbp`; globals relative to
//! `%rip`.

use crate::ast::{BinaryOp, Expr, ExprKind, PrefixOp, Program, Stmt, TypeChange};
use crate::context::Context;
use crate::error::{CompileError, CompileResult};
use crate::parser::MAX_PARAMS;
use crate::symbols::{Scope, SymbolKind};
use crate::ty::Type;

const POOL_SIZE: usize = 4;

const REGS64: [&str; POOL_SIZE] = ["%r10", "%r11", "%r12", "%r13"];
const REGS32: [&str; POOL_SIZE] = ["%r10d", "%r11d", "%r12d", "%r13d"];
const REGS8: [&str; POOL_SIZE] = ["%r10b", "%r11b", "%r12b", "%r13b"];

/// Argument registers in System V order, by width.
const ARGS64: [&str; MAX_PARAMS] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];
const ARGS32: [&str; MAX_PARAMS] = ["%edi", "%esi", "%edx", "%ecx", "%r8d", "%r9d"];
const ARGS8: [&str; MAX_PARAMS] = ["%dil", "%sil", "%dl", "%cl", "%r8b", "%r9b"];

/// Index of a register in the scratch pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(usize);

impl Reg {
  fn name(self, ty: Type) -> &'static str {
    match ty.size() {
      1 => REGS8[self.0],
      4 => REGS32[self.0],
      _ => REGS64[self.0],
    }
  }

  fn q(self) -> &'static str {
    REGS64[self.0]
  }

  fn b(self) -> &'static str {
    REGS8[self.0]
  }
}

/// Free-list over the scratch registers, one bit per register.
#[derive(Debug)]
pub struct RegisterPool {
  free: u8,
}

impl Default for RegisterPool {
  fn default() -> Self {
    Self {
      free: (1 << POOL_SIZE) - 1,
    }
  }
}

impl RegisterPool {
  pub fn alloc(&mut self, line: usize) -> CompileResult<Reg> {
    if self.free == 0 {
      return Err(CompileError::resource(
        line,
        "out of registers: expression needs more than 4 live temporaries",
      ));
    }
    let index = self.free.trailing_zeros() as usize;
    self.free &= !(1 << index);
    Ok(Reg(index))
  }

  pub fn free(&mut self, reg: Reg) {
    debug_assert!(self.free & (1 << reg.0) == 0, "double free of {}", reg.q());
    self.free |= 1 << reg.0;
  }

  pub fn free_all(&mut self) {
    *self = Self::default();
  }

  /// Registers currently holding a value, lowest first.
  pub fn live(&self) -> Vec<Reg> {
    (0..POOL_SIZE)
      .filter(|i| self.free & (1 << i) == 0)
      .map(Reg)
      .collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
  Text,
  Data,
}

/// Emit assembly for a whole program.
pub fn generate(program: &Program, ctx: &mut Context) -> CompileResult<String> {
  let mut codegen = CodeGen {
    ctx,
    regs: RegisterPool::default(),
    asm: String::new(),
    section: None,
    function: None,
    pushed: 0,
    strings: Vec::new(),
  };
  for item in &program.items {
    codegen.gen_stmt(item)?;
  }
  codegen.gen_strings();
  codegen.emit(".section\t.note.GNU-stack,\"\",@progbits");
  Ok(codegen.asm)
}

struct CodeGen<'a> {
  ctx: &'a mut Context,
  regs: RegisterPool,
  asm: String,
  section: Option<Section>,
  /// Function whose body is being emitted.
  function: Option<String>,
  /// Eight-byte pushes currently outstanding below the frame.
  pushed: usize,
  /// String literals met so far, emitted after all code.
  strings: Vec<(usize, Vec<u8>)>,
}

impl CodeGen<'_> {
  fn emit(&mut self, line: impl AsRef<str>) {
    self.asm.push('\t');
    self.asm.push_str(line.as_ref());
    self.asm.push('\n');
  }

  fn label(&mut self, label: usize) {
    self.asm.push_str(&format!(".L{label}:\n"));
  }

  fn section(&mut self, section: Section) {
    if self.section != Some(section) {
      self.emit(match section {
        Section::Text => ".text",
        Section::Data => ".data",
      });
      self.section = Some(section);
    }
  }

  fn alloc(&mut self, line: usize) -> CompileResult<Reg> {
    self.regs.alloc(line)
  }

  fn gen_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
    match stmt {
      Stmt::Return(value) => self.gen_return(value.as_ref()),
      Stmt::Expression(expr) => {
        self.gen_expr(expr)?;
        self.regs.free_all();
        Ok(())
      }
      Stmt::VarDecl(_) => Ok(()),
      Stmt::GlobalDecl(name) => self.gen_global(name),
      Stmt::Block(stmts) => {
        for stmt in stmts {
          self.gen_stmt(stmt)?;
        }
        Ok(())
      }
      Stmt::FunctionLiteral {
        name,
        body: Some(body),
      } => self.gen_function(name, body),
      Stmt::FunctionLiteral { body: None, .. } => Ok(()),
    }
  }

  fn gen_global(&mut self, name: &str) -> CompileResult<()> {
    let Some(symbol) = self.ctx.symbols.global(name) else {
      return Err(CompileError::internal(format!("no symbol for global '{name}'")));
    };
    let element = match symbol.kind {
      SymbolKind::Array => symbol.ty.value_at().unwrap_or(Type::Char),
      _ => symbol.ty,
    };
    let count = symbol.count;

    self.section(Section::Data);
    self.emit(format!(".globl\t{name}"));
    self.emit(format!(".align\t{}", element.size()));
    self.asm.push_str(&format!("{name}:\n"));
    for _ in 0..count {
      self.emit(format!("{}\t0", element.directive()));
    }
    if self.function.is_some() {
      self.section(Section::Text);
    }
    Ok(())
  }

  /// Give every parameter and local a slot below `%rbp` and return the frame
  /// size, rounded up to 16 bytes.
  fn layout_frame(&mut self, function: &str) -> i64 {
    let slots: Vec<(String, i64, i64)> = self
      .ctx
      .symbols
      .namespace(function)
      .map(|symbol| {
        let (width, align) = match symbol.kind {
          SymbolKind::Array => (round_up(symbol.storage_size(), 8), 8),
          _ if symbol.ty.size() > 4 => (8, 8),
          _ => (4, 4),
        };
        (symbol.name.clone(), width, align)
      })
      .collect();

    let mut offset = 0;
    for (name, width, align) in slots {
      offset = round_up(offset + width, align);
      self.ctx.symbols.set_position(function, &name, -offset);
    }
    round_up(offset, 16)
  }

  fn gen_function(&mut self, name: &str, body: &Stmt) -> CompileResult<()> {
    let Some(ret_label) = self.ctx.symbols.global(name).and_then(|s| s.label) else {
      return Err(CompileError::internal(format!("no symbol for function '{name}'")));
    };
    self.function = Some(name.to_string());
    self.regs.free_all();
    self.pushed = 0;
    let frame = self.layout_frame(name);

    self.section(Section::Text);
    self.emit(format!(".globl\t{name}"));
    self.emit(format!(".type\t{name}, @function"));
    self.asm.push_str(&format!("{name}:\n"));
    self.emit("pushq\t%rbp");
    self.emit("movq\t%rsp, %rbp");
    if frame > 0 {
      self.emit(format!("subq\t${frame}, %rsp"));
    }
    self.emit("pushq\t%r12");
    self.emit("pushq\t%r13");

    let params: Vec<(Type, i64)> = self
      .ctx
      .symbols
      .params(name)
      .iter()
      .map(|p| (p.ty, p.position.unwrap_or_default()))
      .collect();
    for (i, (ty, position)) in params.into_iter().enumerate() {
      let (suffix, reg) = match ty.size() {
        1 => ('b', ARGS8[i]),
        4 => ('l', ARGS32[i]),
        _ => ('q', ARGS64[i]),
      };
      self.emit(format!("mov{suffix}\t{reg}, {position}(%rbp)"));
    }

    self.gen_stmt(body)?;

    self.label(ret_label);
    self.emit("popq\t%r13");
    self.emit("popq\t%r12");
    self.emit("movq\t%rbp, %rsp");
    self.emit("popq\t%rbp");
    self.emit("ret");
    self.function = None;
    Ok(())
  }

  fn gen_return(&mut self, value: Option<&Expr>) -> CompileResult<()> {
    let Some(function) = self.function.clone() else {
      return Err(CompileError::internal("return outside of a function"));
    };
    let Some((ty, label)) = self
      .ctx
      .symbols
      .global(&function)
      .and_then(|s| Some((s.ty, s.label?)))
    else {
      return Err(CompileError::internal(format!("no symbol for function '{function}'")));
    };

    if let Some(value) = value {
      let reg = self.value(value)?;
      match ty.size() {
        1 => self.emit(format!("movzbl\t{}, %eax", reg.b())),
        4 => self.emit(format!("movl\t{}, %eax", reg.name(ty))),
        _ => self.emit(format!("movq\t{}, %rax", reg.q())),
      }
    }
    self.emit(format!("jmp\t.L{label}"));
    self.regs.free_all();
    Ok(())
  }

  /// Evaluate an expression that must produce a value.
  fn value(&mut self, expr: &Expr) -> CompileResult<Reg> {
    self.gen_expr(expr)?.ok_or_else(|| {
      CompileError::semantic(expr.line, "expression has no value")
    })
  }

  fn gen_expr(&mut self, expr: &Expr) -> CompileResult<Option<Reg>> {
    let reg = match &expr.kind {
      ExprKind::IntegerLiteral(value) => {
        let reg = self.alloc(expr.line)?;
        self.emit(format!("movq\t${value}, {}", reg.q()));
        reg
      }
      ExprKind::StringLiteral { label, bytes } => {
        self.strings.push((*label, bytes.clone()));
        let reg = self.alloc(expr.line)?;
        self.emit(format!("leaq\t.L{label}(%rip), {}", reg.q()));
        reg
      }
      ExprKind::Identifier { name, scope } => {
        let location = self.location(name, *scope, expr.line)?;
        let reg = self.alloc(expr.line)?;
        if self.is_array(name, *scope) {
          self.emit(format!("leaq\t{location}, {}", reg.q()));
        } else {
          self.load(expr.ty, &location, reg);
        }
        reg
      }
      ExprKind::Prefix { op, operand } => self.gen_prefix(expr, *op, operand)?,
      ExprKind::Infix { op, lhs, rhs } => self.gen_infix(*op, lhs, rhs)?,
      ExprKind::TypeChange { action, operand } => {
        let reg = self.value(operand)?;
        if let TypeChange::Scale(size) = action {
          self.scale(reg, *size);
        }
        reg
      }
      ExprKind::Call { name, args } => return self.gen_call(expr, name, args),
      ExprKind::If {
        cond,
        then,
        otherwise,
      } => {
        self.gen_if(cond, then, otherwise.as_deref())?;
        return Ok(None);
      }
      ExprKind::While { cond, body } => {
        self.gen_loop(None, Some(cond.as_ref()), None, body)?;
        return Ok(None);
      }
      ExprKind::For {
        init,
        cond,
        post,
        body,
      } => {
        self.gen_loop(init.as_deref(), cond.as_deref(), post.as_deref(), body)?;
        return Ok(None);
      }
    };
    Ok(Some(reg))
  }

  fn gen_prefix(&mut self, expr: &Expr, op: PrefixOp, operand: &Expr) -> CompileResult<Reg> {
    match op {
      PrefixOp::AddressOf => {
        let ExprKind::Identifier { name, scope } = &operand.kind else {
          return Err(CompileError::semantic(expr.line, "cannot take this address"));
        };
        let location = self.location(name, *scope, expr.line)?;
        let reg = self.alloc(expr.line)?;
        self.emit(format!("leaq\t{location}, {}", reg.q()));
        Ok(reg)
      }
      PrefixOp::Deref => {
        let reg = self.value(operand)?;
        self.load(expr.ty, &format!("({})", reg.q()), reg);
        Ok(reg)
      }
      PrefixOp::Negate => {
        let reg = self.value(operand)?;
        self.emit(format!("negq\t{}", reg.q()));
        Ok(reg)
      }
      PrefixOp::Not => {
        let reg = self.value(operand)?;
        self.emit(format!("cmpq\t$0, {}", reg.q()));
        self.emit(format!("sete\t{}", reg.b()));
        self.emit(format!("movzbq\t{}, {}", reg.b(), reg.q()));
        Ok(reg)
      }
      PrefixOp::PreIncrement
      | PrefixOp::PreDecrement
      | PrefixOp::PostIncrement
      | PrefixOp::PostDecrement => {
        let ExprKind::Identifier { name, scope } = &operand.kind else {
          return Err(CompileError::semantic(
            expr.line,
            "'++' and '--' need an identifier",
          ));
        };
        let location = self.location(name, *scope, expr.line)?;
        let ty = operand.ty;
        let step = ty.value_at().map_or(1, Type::size);
        let mnemonic = match op {
          PrefixOp::PreIncrement | PrefixOp::PostIncrement => "add",
          _ => "sub",
        };
        let update = format!("{mnemonic}{}\t${step}, {location}", suffix(ty));
        let reg = self.alloc(expr.line)?;
        if matches!(op, PrefixOp::PreIncrement | PrefixOp::PreDecrement) {
          self.emit(update);
          self.load(ty, &location, reg);
        } else {
          self.load(ty, &location, reg);
          self.emit(update);
        }
        Ok(reg)
      }
    }
  }

  fn gen_infix(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> CompileResult<Reg> {
    if op == BinaryOp::Assign {
      return self.gen_assign(lhs, rhs);
    }

    let left = self.value(lhs)?;
    let right = self.value(rhs)?;
    let (l, r) = (left.q(), right.q());

    if let Some(set) = set_instruction(op) {
      self.emit(format!("cmpq\t{r}, {l}"));
      self.emit(format!("{set}\t{}", left.b()));
      self.emit(format!("movzbq\t{}, {l}", left.b()));
      self.regs.free(right);
      return Ok(left);
    }

    match op {
      BinaryOp::Add | BinaryOp::Mul | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
        let mnemonic = match op {
          BinaryOp::Add => "addq",
          BinaryOp::Mul => "imulq",
          BinaryOp::BitAnd => "andq",
          BinaryOp::BitOr => "orq",
          _ => "xorq",
        };
        self.emit(format!("{mnemonic}\t{l}, {r}"));
        self.regs.free(left);
        Ok(right)
      }
      BinaryOp::Sub => {
        self.emit(format!("subq\t{r}, {l}"));
        self.regs.free(right);
        Ok(left)
      }
      BinaryOp::Div | BinaryOp::Mod => {
        let result = if op == BinaryOp::Div { "%rax" } else { "%rdx" };
        self.emit(format!("movq\t{l}, %rax"));
        self.emit("cqo");
        self.emit(format!("idivq\t{r}"));
        self.emit(format!("movq\t{result}, {l}"));
        self.regs.free(right);
        Ok(left)
      }
      BinaryOp::Shl | BinaryOp::Shr => {
        let mnemonic = if op == BinaryOp::Shl { "salq" } else { "sarq" };
        self.emit(format!("movq\t{r}, %rcx"));
        self.emit(format!("{mnemonic}\t%cl, {l}"));
        self.regs.free(right);
        Ok(left)
      }
      _ => Err(CompileError::semantic(
        lhs.line,
        format!("no instruction for {op:?}"),
      )),
    }
  }

  fn gen_assign(&mut self, lhs: &Expr, rhs: &Expr) -> CompileResult<Reg> {
    if lhs.rvalue {
      return Err(CompileError::semantic(
        lhs.line,
        "assignment target was not marked as a location",
      ));
    }
    let value = self.value(rhs)?;
    match &lhs.kind {
      ExprKind::Identifier { name, scope } => {
        let location = self.location(name, *scope, lhs.line)?;
        self.store(lhs.ty, value, &location);
      }
      ExprKind::Prefix {
        op: PrefixOp::Deref,
        operand,
      } => {
        let address = self.value(operand)?;
        self.store(lhs.ty, value, &format!("({})", address.q()));
        self.regs.free(address);
      }
      _ => {
        return Err(CompileError::semantic(
          lhs.line,
          "left side of assignment is not an addressable location",
        ));
      }
    }
    Ok(value)
  }

  /// Multiply `reg` by a pointee size, by shifting when it is a power of two.
  fn scale(&mut self, reg: Reg, size: i64) {
    match size {
      1 => {}
      2 | 4 | 8 => self.emit(format!("salq\t${}, {}", size.trailing_zeros(), reg.q())),
      _ => self.emit(format!("imulq\t${size}, {}", reg.q())),
    }
  }

  /// Evaluate a controlling condition and jump to `target` when it is false.
  /// Every register is free afterwards.
  fn gen_branch(&mut self, cond: &Expr, target: usize) -> CompileResult<()> {
    if let ExprKind::Infix { op, lhs, rhs } = &cond.kind
      && let Some(jump) = inverted_jump(*op)
    {
      let left = self.value(lhs)?;
      let right = self.value(rhs)?;
      self.emit(format!("cmpq\t{}, {}", right.q(), left.q()));
      self.emit(format!("{jump}\t.L{target}"));
    } else {
      let reg = self.value(cond)?;
      self.emit(format!("cmpq\t$0, {}", reg.q()));
      self.emit(format!("je\t.L{target}"));
    }
    self.regs.free_all();
    Ok(())
  }

  fn gen_if(&mut self, cond: &Expr, then: &Stmt, otherwise: Option<&Stmt>) -> CompileResult<()> {
    let false_label = self.ctx.new_label();
    let end_label = otherwise.map(|_| self.ctx.new_label());

    self.gen_branch(cond, false_label)?;
    self.gen_stmt(then)?;

    match (otherwise, end_label) {
      (Some(otherwise), Some(end_label)) => {
        self.emit(format!("jmp\t.L{end_label}"));
        self.label(false_label);
        self.gen_stmt(otherwise)?;
        self.label(end_label);
      }
      _ => self.label(false_label),
    }
    Ok(())
  }

  /// `while` is a `for` without an initialiser or step.
  fn gen_loop(
    &mut self,
    init: Option<&Expr>,
    cond: Option<&Expr>,
    post: Option<&Expr>,
    body: &Stmt,
  ) -> CompileResult<()> {
    let start_label = self.ctx.new_label();
    let end_label = self.ctx.new_label();

    if let Some(init) = init {
      self.gen_expr(init)?;
      self.regs.free_all();
    }
    self.label(start_label);
    if let Some(cond) = cond {
      self.gen_branch(cond, end_label)?;
    }
    self.gen_stmt(body)?;
    if let Some(post) = post {
      self.gen_expr(post)?;
      self.regs.free_all();
    }
    self.emit(format!("jmp\t.L{start_label}"));
    self.label(end_label);
    Ok(())
  }

  fn gen_call(&mut self, expr: &Expr, name: &str, args: &[Expr]) -> CompileResult<Option<Reg>> {
    let live = self.regs.live();
    for reg in &live {
      self.emit(format!("pushq\t{}", reg.q()));
      self.pushed += 1;
    }

    for arg in args {
      let reg = self.value(arg)?;
      self.emit(format!("pushq\t{}", reg.q()));
      self.pushed += 1;
      self.regs.free(reg);
    }
    for target in ARGS64[..args.len()].iter().rev() {
      self.emit(format!("popq\t{target}"));
      self.pushed -= 1;
    }

    let pad = self.pushed % 2 == 1;
    if pad {
      self.emit("subq\t$8, %rsp");
    }
    self.emit(format!("call\t{name}"));
    if pad {
      self.emit("addq\t$8, %rsp");
    }

    for reg in live.iter().rev() {
      self.emit(format!("popq\t{}", reg.q()));
      self.pushed -= 1;
    }

    if expr.ty == Type::Void {
      return Ok(None);
    }
    let reg = self.alloc(expr.line)?;
    match expr.ty.size() {
      1 => self.emit(format!("movzbq\t%al, {}", reg.q())),
      4 => self.emit(format!("movslq\t%eax, {}", reg.q())),
      _ => self.emit(format!("movq\t%rax, {}", reg.q())),
    }
    Ok(Some(reg))
  }

  fn gen_strings(&mut self) {
    if self.strings.is_empty() {
      return;
    }
    let strings = std::mem::take(&mut self.strings);
    self.emit(".section\t.rodata");
    for (label, bytes) in strings {
      self.label(label);
      for byte in bytes.iter().chain(std::iter::once(&0)) {
        self.emit(format!(".byte\t{byte}"));
      }
    }
  }

  /// Memory operand naming a variable's storage.
  fn location(&self, name: &str, scope: Scope, line: usize) -> CompileResult<String> {
    if scope == Scope::Global {
      return Ok(format!("{name}(%rip)"));
    }
    self
      .function
      .as_deref()
      .and_then(|function| self.ctx.symbols.local(function, name))
      .and_then(|symbol| symbol.position)
      .map(|position| format!("{position}(%rbp)"))
      .ok_or_else(|| CompileError::semantic(line, format!("no stack slot for '{name}'")))
  }

  fn is_array(&self, name: &str, scope: Scope) -> bool {
    let symbol = match scope {
      Scope::Global => self.ctx.symbols.global(name),
      _ => self
        .function
        .as_deref()
        .and_then(|function| self.ctx.symbols.local(function, name)),
    };
    symbol.is_some_and(|symbol| symbol.kind == SymbolKind::Array)
  }

  /// Load a value of type `ty` from memory, widening it to 64 bits.
  fn load(&mut self, ty: Type, src: &str, reg: Reg) {
    let mnemonic = match ty.size() {
      1 => "movzbq",
      4 => "movslq",
      _ => "movq",
    };
    self.emit(format!("{mnemonic}\t{src}, {}", reg.q()));
  }

  fn store(&mut self, ty: Type, reg: Reg, dst: &str) {
    self.emit(format!("mov{}\t{}, {dst}", suffix(ty), reg.name(ty)));
  }
}

fn suffix(ty: Type) -> char {
  match ty.size() {
    1 => 'b',
    4 => 'l',
    _ => 'q',
  }
}

fn set_instruction(op: BinaryOp) -> Option<&'static str> {
  Some(match op {
    BinaryOp::Eq => "sete",
    BinaryOp::Ne => "setne",
    BinaryOp::Lt => "setl",
    BinaryOp::Le => "setle",
    BinaryOp::Gt => "setg",
    BinaryOp::Ge => "setge",
    _ => return None,
  })
}

/// Jump taken when the comparison `op` is false.
fn inverted_jump(op: BinaryOp) -> Option<&'static str> {
  Some(match op {
    BinaryOp::Eq => "jne",
    BinaryOp::Ne => "je",
    BinaryOp::Lt => "jge",
    BinaryOp::Le => "jg",
    BinaryOp::Gt => "jle",
    BinaryOp::Ge => "jl",
    _ => return None,
  })
}

fn round_up(value: i64, align: i64) -> i64 {
  (value + align - 1) / align * align
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorKind;
  use crate::parser::parse;
  use crate::tokenizer::tokenize;

  fn compile(src: &str) -> CompileResult<String> {
    let mut ctx = Context::new();
    let program = parse(tokenize(src)?, src, &mut ctx)?;
    generate(&program, &mut ctx)
  }

  #[test]
  fn pool_hands_out_four_registers_then_fails() {
    let mut pool = RegisterPool::default();
    let regs: Vec<Reg> = (0..4).map(|_| pool.alloc(1).unwrap()).collect();
    assert_eq!(regs[0].q(), "%r10");
    assert_eq!(regs[3].q(), "%r13");
    let err = pool.alloc(9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(err.line(), Some(9));

    pool.free(regs[1]);
    assert_eq!(pool.alloc(1).unwrap(), Reg(1));
    assert_eq!(pool.live().len(), 4);
    pool.free_all();
    assert!(pool.live().is_empty());
  }

  #[test]
  fn emits_prologue_and_return_label() {
    let asm = compile("func main() -> int { return 7; }").unwrap();
    assert!(asm.contains("\t.globl\tmain\n\t.type\tmain, @function\nmain:\n"));
    assert!(asm.contains("\tpushq\t%rbp\n\tmovq\t%rsp, %rbp\n"));
    assert!(asm.contains("\tmovq\t$7, %r10\n"));
    assert!(asm.contains("\tmovl\t%r10d, %eax\n\tjmp\t.L0\n"));
    assert!(asm.contains(".L0:\n\tpopq\t%r13\n\tpopq\t%r12\n"));
  }

  #[test]
  fn frame_is_rounded_to_sixteen_bytes() {
    let asm = compile("func main() -> int { var int a; var long b; var char c; return 0; }").unwrap();
    // a at -4, b at -16, c at -20: 20 bytes rounded to 32.
    assert!(asm.contains("\tsubq\t$32, %rsp\n"));
  }

  #[test]
  fn locals_use_frame_relative_slots() {
    let asm = compile("func main() -> int { var int a; var long b; a = 1; b = 2; return a; }").unwrap();
    assert!(asm.contains("\tmovl\t%r10d, -4(%rbp)\n"));
    assert!(asm.contains("\tmovq\t%r10, -16(%rbp)\n"));
    assert!(asm.contains("\tmovslq\t-4(%rbp), %r10\n"));
  }

  #[test]
  fn globals_are_sized_by_type() {
    let asm = compile("global char c; global long l; global int arr[3];").unwrap();
    assert!(asm.contains("c:\n\t.byte\t0\n"));
    assert!(asm.contains("l:\n\t.quad\t0\n"));
    assert!(asm.contains("arr:\n\t.long\t0\n\t.long\t0\n\t.long\t0\n"));
  }

  #[test]
  fn array_index_is_scaled_without_bounds_check() {
    let asm = compile("global long big[2]; func main() -> int { big[5] = 1; return 0; }").unwrap();
    assert!(asm.contains("\tleaq\tbig(%rip), %r11\n"));
    assert!(asm.contains("\tsalq\t$3, %r12\n"));
    assert!(!asm.contains("cmpq"));
  }

  #[test]
  fn conditions_branch_on_the_inverted_comparison() {
    let asm = compile(
      "func main() -> int { var int i; i = 0; while (i < 5) { i = i + 1; } return i; }",
    )
    .unwrap();
    assert!(asm.contains("\tcmpq\t%r11, %r10\n\tjge\t.L2\n"));
    assert!(asm.contains("\tjmp\t.L1\n.L2:\n"));
  }

  #[test]
  fn comparisons_as_values_materialise_zero_or_one() {
    let asm = compile("func main() -> int { var int a; a = 3 == 4; return a; }").unwrap();
    assert!(asm.contains("\tsete\t%r10b\n\tmovzbq\t%r10b, %r10\n"));
  }

  #[test]
  fn calls_move_arguments_into_convention_registers() {
    let src = "func add(int a, int b) -> int { return a + b; } func main() -> int { return add(1, 2); }";
    let asm = compile(src).unwrap();
    assert!(asm.contains("\tmovl\t%edi, -4(%rbp)\n\tmovl\t%esi, -8(%rbp)\n"));
    assert!(asm.contains("\tpopq\t%rsi\n\tpopq\t%rdi\n\tcall\tadd\n"));
    assert!(asm.contains("\tmovslq\t%eax, %r10\n"));
  }

  #[test]
  fn live_registers_survive_a_call() {
    let src = "func one() -> int { return 1; } func main() -> int { return 2 + one(); }";
    let asm = compile(src).unwrap();
    assert!(asm.contains("\tpushq\t%r10\n\tsubq\t$8, %rsp\n\tcall\tone\n\taddq\t$8, %rsp\n\tpopq\t%r10\n"));
  }

  #[test]
  fn five_live_temporaries_exhaust_the_pool() {
    let err = compile("func main() -> int {\n  return 1 + (2 + (3 + (4 + 5)));\n}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert_eq!(err.line(), Some(2));
  }

  #[test]
  fn missing_symbols_are_internal_errors_without_a_line() {
    let program = Program {
      items: vec![Stmt::GlobalDecl("ghost".to_string())],
    };
    let err = generate(&program, &mut Context::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.line(), None);
    assert!(!err.to_string().contains("[line"));

    let program = Program {
      items: vec![Stmt::Return(None)],
    };
    let err = generate(&program, &mut Context::new()).unwrap_err();
    assert_eq!(err.to_string(), "internal compiler error: return outside of a function");
  }

  #[test]
  fn bitwise_operators_keep_the_right_register() {
    let asm = compile("func main() -> int { return (5 ^ 3) | 8; }").unwrap();
    assert!(asm.contains("\txorq\t%r10, %r11\n"));
    assert!(asm.contains("\torq\t%r11, %r10\n"));
  }

  #[test]
  fn pointer_increment_steps_by_the_pointee_size() {
    let asm = compile("func main() -> int { var long *p; p++; --p; return 0; }").unwrap();
    assert!(asm.contains("\taddq\t$8, -8(%rbp)\n"));
    assert!(asm.contains("\tsubq\t$8, -8(%rbp)\n"));
  }

  #[test]
  fn strings_are_emitted_as_bytes() {
    let asm = compile("global char *s; func main() -> int { s = \"ok\"; return 0; }").unwrap();
    assert!(asm.contains("\t.section\t.rodata\n.L1:\n\t.byte\t111\n\t.byte\t107\n\t.byte\t0\n"));
  }
}
