//! Typed abstract syntax tree.
//!
//! Statements and expressions are two closed enums. Every `Expr` carries its
//! value type and an rvalue flag from the moment it is built; the code
//! generator never has to infer either.

use crate::symbols::Scope;
use crate::ty::Type;

#[derive(Debug, Clone)]
pub struct Program {
  pub items: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
  Return(Option<Expr>),
  Expression(Expr),
  VarDecl(String),
  GlobalDecl(String),
  Block(Vec<Stmt>),
  FunctionLiteral {
    name: String,
    body: Option<Box<Stmt>>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
  AddressOf,
  Deref,
  Negate,
  Not,
  PreIncrement,
  PreDecrement,
  PostIncrement,
  PostDecrement,
}

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Assign,
  BitOr,
  BitXor,
  BitAnd,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  Shl,
  Shr,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
}

impl BinaryOp {
  /// Binding strength used by the precedence-climbing loop.
  pub fn precedence(self) -> u8 {
    match self {
      BinaryOp::Assign => 10,
      BinaryOp::Eq | BinaryOp::Ne => 50,
      BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 60,
      BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => 70,
      BinaryOp::Add | BinaryOp::Sub => 80,
      BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 90,
    }
  }

  pub fn is_right_assoc(self) -> bool {
    self == BinaryOp::Assign
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
    )
  }

  pub fn from_punct(text: &str) -> Option<Self> {
    Some(match text {
      "=" => BinaryOp::Assign,
      "|" => BinaryOp::BitOr,
      "^" => BinaryOp::BitXor,
      "&" => BinaryOp::BitAnd,
      "==" => BinaryOp::Eq,
      "!=" => BinaryOp::Ne,
      "<" => BinaryOp::Lt,
      "<=" => BinaryOp::Le,
      ">" => BinaryOp::Gt,
      ">=" => BinaryOp::Ge,
      "<<" => BinaryOp::Shl,
      ">>" => BinaryOp::Shr,
      "+" => BinaryOp::Add,
      "-" => BinaryOp::Sub,
      "*" => BinaryOp::Mul,
      "/" => BinaryOp::Div,
      "%" => BinaryOp::Mod,
      _ => return None,
    })
  }
}

/// Implicit conversion inserted by the coercion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChange {
  /// Reinterpret a narrower integer as a wider type; no instruction needed.
  Widen,
  /// Multiply by the pointee size before pointer arithmetic.
  Scale(i64),
}

#[derive(Debug, Clone)]
pub struct Expr {
  pub kind: ExprKind,
  pub ty: Type,
  pub rvalue: bool,
  pub line: usize,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
  Identifier {
    name: String,
    scope: Scope,
  },
  IntegerLiteral(i64),
  StringLiteral {
    label: usize,
    bytes: Vec<u8>,
  },
  Prefix {
    op: PrefixOp,
    operand: Box<Expr>,
  },
  Infix {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
  If {
    cond: Box<Expr>,
    then: Box<Stmt>,
    otherwise: Option<Box<Stmt>>,
  },
  While {
    cond: Box<Expr>,
    body: Box<Stmt>,
  },
  For {
    init: Option<Box<Expr>>,
    cond: Option<Box<Expr>>,
    post: Option<Box<Expr>>,
    body: Box<Stmt>,
  },
  Call {
    name: String,
    args: Vec<Expr>,
  },
  TypeChange {
    action: TypeChange,
    operand: Box<Expr>,
  },
}

impl Expr {
  pub fn new(kind: ExprKind, ty: Type, line: usize) -> Self {
    Self {
      kind,
      ty,
      rvalue: true,
      line,
    }
  }

  pub fn number(value: i64, line: usize) -> Self {
    let ty = if (0..=255).contains(&value) {
      Type::Char
    } else if i32::try_from(value).is_ok() {
      Type::Int
    } else {
      Type::Long
    };
    Self::new(ExprKind::IntegerLiteral(value), ty, line)
  }

  pub fn prefix(op: PrefixOp, operand: Expr, ty: Type) -> Self {
    let line = operand.line;
    Self::new(
      ExprKind::Prefix {
        op,
        operand: Box::new(operand),
      },
      ty,
      line,
    )
  }

  pub fn infix(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Type) -> Self {
    let line = lhs.line;
    Self::new(
      ExprKind::Infix {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
      },
      ty,
      line,
    )
  }

  pub fn type_change(action: TypeChange, operand: Expr, ty: Type) -> Self {
    let line = operand.line;
    Self::new(
      ExprKind::TypeChange {
        action,
        operand: Box::new(operand),
      },
      ty,
      line,
    )
  }

  /// Control-flow constructs are expressions without a value.
  pub fn control(kind: ExprKind, line: usize) -> Self {
    Self::new(kind, Type::Void, line)
  }

  /// Whether this node denotes a storage location `=` may write to.
  pub fn is_addressable(&self) -> bool {
    match &self.kind {
      ExprKind::Identifier { .. } => true,
      ExprKind::Prefix { op, .. } => *op == PrefixOp::Deref,
      _ => false,
    }
  }
}
