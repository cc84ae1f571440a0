//! Value types of the language.
//!
//! The set is closed: three integer widths, `void`, and one level of pointer
//! to each of them. Pointer-to-pointer does not exist, so `pointer_to` and
//! `value_at` are partial.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
  Void,
  Char,
  Int,
  Long,
  VoidPtr,
  CharPtr,
  IntPtr,
  LongPtr,
}

impl Type {
  /// Size in bytes of a value of this type.
  pub fn size(self) -> i64 {
    match self {
      Type::Void => 0,
      Type::Char => 1,
      Type::Int => 4,
      Type::Long | Type::VoidPtr | Type::CharPtr | Type::IntPtr | Type::LongPtr => 8,
    }
  }

  pub fn is_integer(self) -> bool {
    matches!(self, Type::Char | Type::Int | Type::Long)
  }

  pub fn is_pointer(self) -> bool {
    matches!(
      self,
      Type::VoidPtr | Type::CharPtr | Type::IntPtr | Type::LongPtr
    )
  }

  pub fn pointer_to(self) -> Option<Type> {
    match self {
      Type::Void => Some(Type::VoidPtr),
      Type::Char => Some(Type::CharPtr),
      Type::Int => Some(Type::IntPtr),
      Type::Long => Some(Type::LongPtr),
      _ => None,
    }
  }

  /// The pointee of a pointer type.
  pub fn value_at(self) -> Option<Type> {
    match self {
      Type::VoidPtr => Some(Type::Void),
      Type::CharPtr => Some(Type::Char),
      Type::IntPtr => Some(Type::Int),
      Type::LongPtr => Some(Type::Long),
      _ => None,
    }
  }

  /// Data directive reserving one value of this type.
  pub fn directive(self) -> &'static str {
    match self.size() {
      1 => ".byte",
      4 => ".long",
      _ => ".quad",
    }
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Type::Void => "void",
      Type::Char => "char",
      Type::Int => "int",
      Type::Long => "long",
      Type::VoidPtr => "void*",
      Type::CharPtr => "char*",
      Type::IntPtr => "int*",
      Type::LongPtr => "long*",
    };
    f.write_str(name)
  }
}
