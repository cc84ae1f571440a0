//! Implicit conversions between value types.
//!
//! `classify` decides what, if anything, has to happen for an expression of
//! one type to be used where another is wanted. `coerce` applies that
//! decision to a tree, wrapping it in a `TypeChange` node when required.

use crate::ast::{BinaryOp, Expr, TypeChange};
use crate::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
  /// Types already match; use the expression unchanged.
  Identical,
  /// A narrower integer used as a wider type.
  Widen,
  /// An integer offset added to a pointer, multiplied by the pointee size.
  Scale(i64),
  Incompatible,
}

/// Decide how a value of type `from` can become a `to`. `op` is the operator
/// the value takes part in, if any; only `+` and `-` unlock pointer scaling.
pub fn classify(from: Type, to: Type, op: Option<BinaryOp>) -> Coercion {
  if from == to {
    return Coercion::Identical;
  }

  if from.is_integer() && to.is_integer() {
    return if from.size() < to.size() {
      Coercion::Widen
    } else {
      Coercion::Incompatible
    };
  }

  if from.is_integer()
    && to.is_pointer()
    && matches!(op, Some(BinaryOp::Add | BinaryOp::Sub))
  {
    return match to.value_at().map_or(0, Type::size) {
      0 => Coercion::Incompatible,
      1 => Coercion::Widen,
      size => Coercion::Scale(size),
    };
  }

  Coercion::Incompatible
}

/// Convert `expr` towards `to`. When no conversion exists the untouched
/// expression comes back as the error so the caller can still use it.
pub fn coerce(expr: Expr, to: Type, op: Option<BinaryOp>) -> Result<Expr, Expr> {
  match classify(expr.ty, to, op) {
    Coercion::Identical => Ok(expr),
    Coercion::Widen => Ok(Expr::type_change(TypeChange::Widen, expr, to)),
    Coercion::Scale(size) => Ok(Expr::type_change(TypeChange::Scale(size), expr, to)),
    Coercion::Incompatible => Err(expr),
  }
}
