//! Recursive-descent parser producing a typed AST.
//!
//! Statements dispatch on their leading token; expressions use precedence
//! climbing over the table in `BinaryOp::precedence`. Symbol resolution and
//! implicit coercions happen as nodes are built, so every `Expr` leaves this
//! module with its final type. The first problem found ends the parse.

use crate::ast::{BinaryOp, Expr, ExprKind, PrefixOp, Program, Stmt};
use crate::coerce::coerce;
use crate::context::Context;
use crate::error::{CompileError, CompileResult};
use crate::symbols::SymbolKind;
use crate::tokenizer::{Token, TokenKind, describe_token, string_bytes, token_text};
use crate::ty::Type;

/// Registers available for arguments under the System V convention.
pub const MAX_PARAMS: usize = 6;

/// Parse a whole translation unit, filling `ctx.symbols` on the way.
pub fn parse(tokens: Vec<Token>, source: &str, ctx: &mut Context) -> CompileResult<Program> {
  let mut parser = Parser {
    stream: TokenStream::new(tokens, source),
    ctx,
    function: None,
  };
  parser.parse_program()
}

struct Parser<'src, 'ctx> {
  stream: TokenStream<'src>,
  ctx: &'ctx mut Context,
  /// Name of the function whose body is being parsed.
  function: Option<String>,
}

impl Parser<'_, '_> {
  fn parse_program(&mut self) -> CompileResult<Program> {
    let mut items = Vec::new();
    while !self.stream.is_eof() {
      let item = if self.stream.is_keyword("func") {
        self.parse_function()?
      } else if self.stream.is_keyword("global") || self.stream.is_keyword("var") {
        self.parse_declaration()?
      } else {
        let got = self.stream.describe();
        return Err(CompileError::syntax(
          self.stream.line(),
          format!("expected a declaration or function, but got \"{got}\""),
        ));
      };
      items.push(item);
    }
    Ok(Program { items })
  }

  fn parse_stmt(&mut self) -> CompileResult<Stmt> {
    let line = self.stream.line();
    if self.stream.is_keyword("func") {
      return Err(CompileError::syntax(
        line,
        "functions cannot be declared inside another function",
      ));
    }
    if self.stream.is_keyword("return") {
      return self.parse_return();
    }
    if self.stream.is_keyword("global") || self.stream.is_keyword("var") {
      return self.parse_declaration();
    }
    if self.stream.is_keyword("if") {
      return Ok(Stmt::Expression(self.parse_if()?));
    }
    if self.stream.is_keyword("while") {
      return Ok(Stmt::Expression(self.parse_while()?));
    }
    if self.stream.is_keyword("for") {
      return Ok(Stmt::Expression(self.parse_for()?));
    }
    if self.stream.is_punct("{") {
      return self.parse_block();
    }

    let expr = self.parse_expr()?;
    self.stream.skip(";")?;
    Ok(Stmt::Expression(expr))
  }

  fn parse_block(&mut self) -> CompileResult<Stmt> {
    self.stream.skip("{")?;
    let mut stmts = Vec::new();
    while !self.stream.equal("}") {
      if self.stream.is_eof() {
        return Err(CompileError::syntax(
          self.stream.line(),
          "expected \"}\", but reached end of input",
        ));
      }
      stmts.push(self.parse_stmt()?);
    }
    Ok(Stmt::Block(stmts))
  }

  /// `void`, `char`, `int` or `long`, optionally followed by a single `*`.
  fn parse_type(&mut self) -> CompileResult<Type> {
    let line = self.stream.line();
    let base = if self.stream.keyword("void") {
      Type::Void
    } else if self.stream.keyword("char") {
      Type::Char
    } else if self.stream.keyword("int") {
      Type::Int
    } else if self.stream.keyword("long") {
      Type::Long
    } else {
      let got = self.stream.describe();
      return Err(CompileError::syntax(
        line,
        format!("expected a type, but got \"{got}\""),
      ));
    };

    if self.stream.equal("*") {
      // Every base type has a pointer form.
      return base
        .pointer_to()
        .ok_or_else(|| CompileError::semantic(line, "pointer to pointer is not supported"));
    }
    Ok(base)
  }

  /// `global T name ([N])? ;` or `var T name ([N])? ;`. A `var` outside any
  /// function is a global as well.
  fn parse_declaration(&mut self) -> CompileResult<Stmt> {
    let is_global = self.stream.keyword("global");
    if !is_global {
      self.stream.expect_keyword("var")?;
    }

    let ty = self.parse_type()?;
    let (name, line) = self.stream.get_ident()?;

    let (kind, ty, count) = if self.stream.equal("[") {
      let (count, _) = self.stream.get_number()?;
      self.stream.skip("]")?;
      if count <= 0 {
        return Err(CompileError::semantic(
          line,
          format!("array '{name}' must have a positive size"),
        ));
      }
      let element = ty
        .pointer_to()
        .filter(|_| ty != Type::Void)
        .ok_or_else(|| {
          CompileError::semantic(line, format!("invalid element type {ty} for array '{name}'"))
        })?;
      (SymbolKind::Array, element, count)
    } else {
      (SymbolKind::Variable, ty, 1)
    };
    self.stream.skip(";")?;

    if ty == Type::Void {
      return Err(CompileError::semantic(
        line,
        format!("variable '{name}' cannot have type void"),
      ));
    }

    match self.function.clone() {
      Some(function) if !is_global => {
        self
          .ctx
          .symbols
          .declare_local(&function, &name, kind, ty, count, line)?;
        Ok(Stmt::VarDecl(name))
      }
      _ => {
        self
          .ctx
          .symbols
          .declare_global(&name, kind, ty, None, count, line)?;
        Ok(Stmt::GlobalDecl(name))
      }
    }
  }

  /// `func name(T a, T b) -> T` followed by `;` (prototype) or a body.
  fn parse_function(&mut self) -> CompileResult<Stmt> {
    self.stream.expect_keyword("func")?;
    let (name, line) = self.stream.get_ident()?;

    self.stream.skip("(")?;
    let mut params = Vec::new();
    if !self.stream.equal(")") {
      loop {
        let ty = self.parse_type()?;
        let (param, param_line) = self.stream.get_ident()?;
        if ty == Type::Void {
          return Err(CompileError::semantic(
            param_line,
            format!("parameter '{param}' cannot have type void"),
          ));
        }
        params.push((param, ty, param_line));
        if !self.stream.equal(",") {
          break;
        }
      }
      self.stream.skip(")")?;
    }
    if params.len() > MAX_PARAMS {
      return Err(CompileError::semantic(
        line,
        format!("function '{name}' has more than {MAX_PARAMS} parameters"),
      ));
    }

    self.stream.skip("->")?;
    let ret = self.parse_type()?;
    let has_body = !self.stream.equal(";");

    let existing = self
      .ctx
      .symbols
      .global(&name)
      .map(|s| (s.kind, s.ty, s.defined));
    match existing {
      Some((SymbolKind::Function, declared_ret, defined)) => {
        let declared = self.ctx.symbols.params(&name).len();
        if declared != params.len() {
          return Err(CompileError::semantic(
            line,
            format!(
              "parameter count mismatch for '{name}': declared with {declared}, now {}",
              params.len()
            ),
          ));
        }
        if declared_ret != ret {
          return Err(CompileError::semantic(
            line,
            format!("return type mismatch for '{name}': declared {declared_ret}, now {ret}"),
          ));
        }
        if defined && has_body {
          return Err(CompileError::semantic(
            line,
            format!("function '{name}' is already defined"),
          ));
        }
      }
      Some(_) => {
        return Err(CompileError::semantic(
          line,
          format!("duplicate global declaration of '{name}'"),
        ));
      }
      None => {
        let label = self.ctx.new_label();
        self
          .ctx
          .symbols
          .declare_global(&name, SymbolKind::Function, ret, Some(label), 1, line)?;
      }
    }

    // A repeated prototype leaves the namespace of an earlier declaration alone.
    if existing.is_none() || has_body {
      self.ctx.symbols.create_function_namespace(&name);
      for (param, ty, param_line) in &params {
        self
          .ctx
          .symbols
          .declare_parameter(&name, param, *ty, *param_line)?;
      }
    }

    if !has_body {
      return Ok(Stmt::FunctionLiteral { name, body: None });
    }

    if let Some(symbol) = self.ctx.symbols.global_mut(&name) {
      symbol.defined = true;
    }
    self.function = Some(name.clone());
    let body = self.parse_block();
    self.function = None;

    Ok(Stmt::FunctionLiteral {
      name,
      body: Some(Box::new(body?)),
    })
  }

  fn parse_return(&mut self) -> CompileResult<Stmt> {
    self.stream.expect_keyword("return")?;
    let line = self.stream.line();
    let function = self
      .function
      .clone()
      .ok_or_else(|| CompileError::syntax(line, "return outside of a function"))?;
    let ret = self.ctx.symbols.resolve(&function, None, line)?.ty;

    if self.stream.equal(";") {
      if ret != Type::Void {
        return Err(CompileError::semantic(
          line,
          format!("function '{function}' must return a value of type {ret}"),
        ));
      }
      return Ok(Stmt::Return(None));
    }

    let value = self.parse_expr()?;
    self.stream.skip(";")?;
    if ret == Type::Void {
      return Err(CompileError::semantic(
        line,
        format!("void function '{function}' cannot return a value"),
      ));
    }
    let value = coerce(value, ret, None).map_err(|value| {
      CompileError::semantic(
        line,
        format!("cannot return {} from function '{function}' returning {ret}", value.ty),
      )
    })?;
    Ok(Stmt::Return(Some(value)))
  }

  fn parse_if(&mut self) -> CompileResult<Expr> {
    let line = self.stream.line();
    self.stream.expect_keyword("if")?;
    self.stream.skip("(")?;
    let cond = self.parse_condition()?;
    self.stream.skip(")")?;
    let then = self.parse_stmt()?;
    let otherwise = if self.stream.keyword("else") {
      Some(Box::new(self.parse_stmt()?))
    } else {
      None
    };
    Ok(Expr::control(
      ExprKind::If {
        cond: Box::new(cond),
        then: Box::new(then),
        otherwise,
      },
      line,
    ))
  }

  fn parse_while(&mut self) -> CompileResult<Expr> {
    let line = self.stream.line();
    self.stream.expect_keyword("while")?;
    self.stream.skip("(")?;
    let cond = self.parse_condition()?;
    self.stream.skip(")")?;
    let body = self.parse_stmt()?;
    Ok(Expr::control(
      ExprKind::While {
        cond: Box::new(cond),
        body: Box::new(body),
      },
      line,
    ))
  }

  fn parse_for(&mut self) -> CompileResult<Expr> {
    let line = self.stream.line();
    self.stream.expect_keyword("for")?;
    self.stream.skip("(")?;
    let init = if self.stream.equal(";") {
      None
    } else {
      let init = self.parse_expr()?;
      self.stream.skip(";")?;
      Some(Box::new(init))
    };
    let cond = if self.stream.equal(";") {
      None
    } else {
      let cond = self.parse_condition()?;
      self.stream.skip(";")?;
      Some(Box::new(cond))
    };
    let post = if self.stream.equal(")") {
      None
    } else {
      let post = self.parse_expr()?;
      self.stream.skip(")")?;
      Some(Box::new(post))
    };
    let body = self.parse_stmt()?;
    Ok(Expr::control(
      ExprKind::For {
        init,
        cond,
        post,
        body: Box::new(body),
      },
      line,
    ))
  }

  fn parse_condition(&mut self) -> CompileResult<Expr> {
    let cond = self.parse_expr()?;
    if !cond.ty.is_integer() && !cond.ty.is_pointer() {
      return Err(CompileError::semantic(
        cond.line,
        format!("condition of type {} has no truth value", cond.ty),
      ));
    }
    Ok(cond)
  }

  fn parse_expr(&mut self) -> CompileResult<Expr> {
    self.parse_binary(0)
  }

  /// Precedence climbing: keep folding operators that bind tighter than
  /// `floor`, or as tight when they associate to the right.
  fn parse_binary(&mut self, floor: u8) -> CompileResult<Expr> {
    let mut lhs = self.parse_prefix()?;

    while let Some(op) = self.stream.peek_binary_op() {
      let prec = op.precedence();
      if prec < floor || (prec == floor && !op.is_right_assoc()) {
        break;
      }
      let line = self.stream.line();
      self.stream.advance();
      let rhs = self.parse_binary(prec)?;
      lhs = self.build_infix(op, lhs, rhs, line)?;
    }

    Ok(lhs)
  }

  fn build_infix(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr, line: usize) -> CompileResult<Expr> {
    if op == BinaryOp::Assign {
      return self.build_assign(lhs, rhs, line);
    }

    if lhs.ty == Type::Void || rhs.ty == Type::Void {
      return Err(CompileError::semantic(line, "void value used in an expression"));
    }
    let pointer_ok = op.is_comparison() || matches!(op, BinaryOp::Add | BinaryOp::Sub);
    if !pointer_ok && (lhs.ty.is_pointer() || rhs.ty.is_pointer()) {
      return Err(CompileError::semantic(
        line,
        format!("invalid operands {} and {} for {op:?}", lhs.ty, rhs.ty),
      ));
    }

    let (lty, rty) = (lhs.ty, rhs.ty);
    let (lhs, lhs_ok) = match coerce(lhs, rty, Some(op)) {
      Ok(expr) => (expr, true),
      Err(expr) => (expr, false),
    };
    let (rhs, rhs_ok) = match coerce(rhs, lty, Some(op)) {
      Ok(expr) => (expr, true),
      Err(expr) => (expr, false),
    };
    if !lhs_ok && !rhs_ok {
      return Err(CompileError::semantic(
        line,
        format!("incompatible types {lty} and {rty} for {op:?}"),
      ));
    }

    let ty = if op.is_comparison() { Type::Int } else { lhs.ty };
    let mut expr = Expr::infix(op, lhs, rhs, ty);
    expr.line = line;
    Ok(expr)
  }

  fn build_assign(&mut self, mut lhs: Expr, rhs: Expr, line: usize) -> CompileResult<Expr> {
    if !lhs.is_addressable() {
      return Err(CompileError::semantic(
        line,
        "left side of assignment is not an addressable location",
      ));
    }
    if let ExprKind::Identifier { name, .. } = &lhs.kind
      && self.symbol_kind(name, line)? == SymbolKind::Array
    {
      return Err(CompileError::semantic(
        line,
        format!("cannot assign to array '{name}'"),
      ));
    }

    let target = lhs.ty;
    let rhs = coerce(rhs, target, None).map_err(|rhs| {
      CompileError::semantic(line, format!("cannot assign {} to {target}", rhs.ty))
    })?;
    lhs.rvalue = false;
    let mut expr = Expr::infix(BinaryOp::Assign, lhs, rhs, target);
    expr.line = line;
    Ok(expr)
  }

  fn parse_prefix(&mut self) -> CompileResult<Expr> {
    let line = self.stream.line();

    if self.stream.equal("-") {
      let operand = self.parse_prefix()?;
      if !operand.ty.is_integer() {
        return Err(CompileError::semantic(
          line,
          format!("cannot negate a value of type {}", operand.ty),
        ));
      }
      let ty = if operand.ty == Type::Char {
        Type::Int
      } else {
        operand.ty
      };
      return Ok(Expr::prefix(PrefixOp::Negate, operand, ty));
    }

    if self.stream.equal("!") {
      let operand = self.parse_prefix()?;
      if !operand.ty.is_integer() && !operand.ty.is_pointer() {
        return Err(CompileError::semantic(
          line,
          format!("cannot apply '!' to a value of type {}", operand.ty),
        ));
      }
      return Ok(Expr::prefix(PrefixOp::Not, operand, Type::Int));
    }

    if self.stream.equal("&") {
      let operand = self.parse_prefix()?;
      let ExprKind::Identifier { name, .. } = &operand.kind else {
        return Err(CompileError::semantic(
          line,
          "'&' can only be applied to an identifier",
        ));
      };
      let ty = if self.symbol_kind(name, line)? == SymbolKind::Array {
        operand.ty
      } else {
        operand
          .ty
          .pointer_to()
          .ok_or_else(|| CompileError::semantic(line, "pointer to pointer is not supported"))?
      };
      return Ok(Expr::prefix(PrefixOp::AddressOf, operand, ty));
    }

    if self.stream.equal("*") {
      let operand = self.parse_prefix()?;
      let ty = operand
        .ty
        .value_at()
        .filter(|ty| *ty != Type::Void)
        .ok_or_else(|| {
          CompileError::semantic(
            line,
            format!("cannot dereference a value of type {}", operand.ty),
          )
        })?;
      return Ok(Expr::prefix(PrefixOp::Deref, operand, ty));
    }

    if self.stream.equal("++") {
      let operand = self.parse_prefix()?;
      return self.build_step(PrefixOp::PreIncrement, operand, line);
    }
    if self.stream.equal("--") {
      let operand = self.parse_prefix()?;
      return self.build_step(PrefixOp::PreDecrement, operand, line);
    }

    self.parse_primary()
  }

  /// `++`/`--` in either position; the operand must name a scalar variable.
  fn build_step(&mut self, op: PrefixOp, operand: Expr, line: usize) -> CompileResult<Expr> {
    let ExprKind::Identifier { name, .. } = &operand.kind else {
      return Err(CompileError::semantic(
        line,
        "'++' and '--' can only be applied to an identifier",
      ));
    };
    if self.symbol_kind(name, line)? == SymbolKind::Array || operand.ty == Type::VoidPtr {
      return Err(CompileError::semantic(
        line,
        format!("cannot increment or decrement '{name}'"),
      ));
    }
    let ty = operand.ty;
    Ok(Expr::prefix(op, operand, ty))
  }

  fn parse_primary(&mut self) -> CompileResult<Expr> {
    let line = self.stream.line();

    if self.stream.equal("(") {
      let expr = self.parse_expr()?;
      self.stream.skip(")")?;
      return Ok(expr);
    }

    match self.stream.peek().map(|token| token.kind) {
      Some(TokenKind::Num) => {
        let (value, _) = self.stream.get_number()?;
        Ok(Expr::number(value, line))
      }
      Some(TokenKind::Str) => {
        let bytes = self.stream.get_string()?;
        let label = self.ctx.new_label();
        Ok(Expr::new(
          ExprKind::StringLiteral { label, bytes },
          Type::CharPtr,
          line,
        ))
      }
      Some(TokenKind::Ident) => {
        let (name, line) = self.stream.get_ident()?;
        if self.stream.is_punct("(") {
          return self.parse_call(name, line);
        }
        let ident = self.identifier(&name, line)?;
        if self.stream.equal("[") {
          return self.parse_index(ident, line);
        }
        if self.stream.equal("++") {
          return self.build_step(PrefixOp::PostIncrement, ident, line);
        }
        if self.stream.equal("--") {
          return self.build_step(PrefixOp::PostDecrement, ident, line);
        }
        Ok(ident)
      }
      _ => {
        let got = self.stream.describe();
        Err(CompileError::syntax(
          line,
          format!("expected an expression, but got \"{got}\""),
        ))
      }
    }
  }

  fn identifier(&self, name: &str, line: usize) -> CompileResult<Expr> {
    let symbol = self
      .ctx
      .symbols
      .resolve(name, self.function.as_deref(), line)?;
    if symbol.kind == SymbolKind::Function {
      return Err(CompileError::semantic(
        line,
        format!("function '{name}' used as a value"),
      ));
    }
    Ok(Expr::new(
      ExprKind::Identifier {
        name: name.to_string(),
        scope: symbol.scope,
      },
      symbol.ty,
      line,
    ))
  }

  fn symbol_kind(&self, name: &str, line: usize) -> CompileResult<SymbolKind> {
    Ok(
      self
        .ctx
        .symbols
        .resolve(name, self.function.as_deref(), line)?
        .kind,
    )
  }

  /// `base[index]` becomes `*(base + index * sizeof(element))`.
  fn parse_index(&mut self, base: Expr, line: usize) -> CompileResult<Expr> {
    let index = self.parse_expr()?;
    self.stream.skip("]")?;

    let ExprKind::Identifier { name, .. } = &base.kind else {
      return Err(CompileError::semantic(line, "only identifiers can be indexed"));
    };
    let element = base
      .ty
      .value_at()
      .filter(|ty| *ty != Type::Void)
      .ok_or_else(|| CompileError::semantic(line, format!("'{name}' cannot be indexed")))?;
    if !index.ty.is_integer() {
      return Err(CompileError::semantic(
        line,
        format!("array index must be an integer, not {}", index.ty),
      ));
    }

    let ty = base.ty;
    let offset = coerce(index, ty, Some(BinaryOp::Add)).map_err(|index| {
      CompileError::semantic(line, format!("cannot index {ty} with {}", index.ty))
    })?;
    let address = Expr::infix(BinaryOp::Add, base, offset, ty);
    Ok(Expr::prefix(PrefixOp::Deref, address, element))
  }

  fn parse_call(&mut self, name: String, line: usize) -> CompileResult<Expr> {
    let symbol = self
      .ctx
      .symbols
      .resolve(&name, self.function.as_deref(), line)?;
    if symbol.kind != SymbolKind::Function {
      return Err(CompileError::semantic(
        line,
        format!("'{name}' is not a function"),
      ));
    }
    let ret = symbol.ty;
    let params: Vec<Type> = self
      .ctx
      .symbols
      .params(&name)
      .into_iter()
      .map(|param| param.ty)
      .collect();

    self.stream.skip("(")?;
    let mut args = Vec::new();
    if !self.stream.equal(")") {
      loop {
        args.push(self.parse_expr()?);
        if !self.stream.equal(",") {
          break;
        }
      }
      self.stream.skip(")")?;
    }

    if args.len() != params.len() {
      return Err(CompileError::semantic(
        line,
        format!(
          "'{name}' expects {} argument(s), but {} were given",
          params.len(),
          args.len()
        ),
      ));
    }

    let args = args
      .into_iter()
      .zip(params)
      .enumerate()
      .map(|(i, (arg, ty))| {
        coerce(arg, ty, None).map_err(|arg| {
          CompileError::semantic(
            line,
            format!("argument {} of '{name}' has type {}, expected {ty}", i + 1, arg.ty),
          )
        })
      })
      .collect::<CompileResult<Vec<_>>>()?;

    Ok(Expr::new(ExprKind::Call { name, args }, ret, line))
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
}

impl<'a> TokenStream<'a> {
  /// Take ownership of the token stream; the parser will advance `pos` as it consumes input.
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn advance(&mut self) {
    if self.pos < self.tokens.len() {
      self.pos += 1;
    }
  }

  /// Line of the current token, or of the last one once input is exhausted.
  fn line(&self) -> usize {
    self
      .peek()
      .or_else(|| self.tokens.last())
      .map_or(1, |token| token.line)
  }

  fn describe(&self) -> String {
    describe_token(self.peek(), self.source)
  }

  fn is(&self, kind: TokenKind, text: &str) -> bool {
    self
      .peek()
      .is_some_and(|token| token.kind == kind && token_text(token, self.source) == text)
  }

  fn is_punct(&self, op: &str) -> bool {
    self.is(TokenKind::Punctuator, op)
  }

  fn is_keyword(&self, keyword: &str) -> bool {
    self.is(TokenKind::Keyword, keyword)
  }

  /// Consume the current token if it matches the provided punctuator.
  fn equal(&mut self, op: &str) -> bool {
    if self.is_punct(op) {
      self.pos += 1;
      return true;
    }
    false
  }

  /// Consume the current token if it is the given keyword.
  fn keyword(&mut self, keyword: &str) -> bool {
    if self.is_keyword(keyword) {
      self.pos += 1;
      return true;
    }
    false
  }

  fn skip(&mut self, s: &str) -> CompileResult<()> {
    if self.equal(s) {
      Ok(())
    } else {
      let got = self.describe();
      Err(CompileError::syntax(
        self.line(),
        format!("expected \"{s}\", but got \"{got}\""),
      ))
    }
  }

  fn expect_keyword(&mut self, keyword: &str) -> CompileResult<()> {
    if self.keyword(keyword) {
      Ok(())
    } else {
      let got = self.describe();
      Err(CompileError::syntax(
        self.line(),
        format!("expected \"{keyword}\", but got \"{got}\""),
      ))
    }
  }

  fn peek_binary_op(&self) -> Option<BinaryOp> {
    self
      .peek()
      .filter(|token| token.kind == TokenKind::Punctuator)
      .and_then(|token| BinaryOp::from_punct(token_text(token, self.source)))
  }

  /// Parse the current token as an integer literal returning its value and line.
  fn get_number(&mut self) -> CompileResult<(i64, usize)> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Num
      && let Some(value) = token.value
    {
      let line = token.line;
      self.pos += 1;
      return Ok((value, line));
    }

    let got = self.describe();
    Err(CompileError::syntax(
      self.line(),
      format!("expected a number, but got \"{got}\""),
    ))
  }

  /// Parse the current token as an identifier.
  fn get_ident(&mut self) -> CompileResult<(String, usize)> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Ident
    {
      let ident = token_text(token, self.source).to_string();
      let line = token.line;
      self.pos += 1;
      return Ok((ident, line));
    }

    let got = self.describe();
    Err(CompileError::syntax(
      self.line(),
      format!("expected an identifier, but got \"{got}\""),
    ))
  }

  fn get_string(&mut self) -> CompileResult<Vec<u8>> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Str
    {
      let bytes = string_bytes(token, self.source)?;
      self.pos += 1;
      return Ok(bytes);
    }

    let got = self.describe();
    Err(CompileError::syntax(
      self.line(),
      format!("expected a string, but got \"{got}\""),
    ))
  }

  fn is_eof(&self) -> bool {
    matches!(self.peek().map(|token| token.kind), Some(TokenKind::Eof) | None)
  }
}
