//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about semantics beyond recognising keywords,
//! operators and literals. Multi-character punctuators are matched before
//! single-character ones to avoid ambiguity. Every token remembers the line
//! it started on so later stages can report `[line N]` diagnostics.

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Ident,
  Keyword,
  Punctuator,
  Num,
  Str,
  Eof,
}

/// Thin wrapper for lexical information needed by later stages.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub value: Option<i64>,
  pub loc: usize,
  pub len: usize,
  pub line: usize,
}

impl Token {
  pub fn new(kind: TokenKind, loc: usize, len: usize, line: usize, value: Option<i64>) -> Self {
    Self {
      kind,
      value,
      loc,
      len,
      line,
    }
  }
}

const KEYWORDS: [&str; 12] = [
  "func", "return", "global", "var", "if", "else", "while", "for", "void", "char", "int", "long",
];

const PUNCTUATORS: [&str; 29] = [
  "<<", ">>", "==", "!=", "<=", ">=", "->", "++", "--", "+", "-", "*", "/", "%", "&", "|", "^",
  "!", "<", ">", "=", "(", ")", "{", "}", "[", "]", ";", ",",
];

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut line = 1;
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c == b'\n' {
      line += 1;
      i += 1;
      continue;
    }
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if input[i..].starts_with("//") {
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    if input[i..].starts_with("/*") {
      let Some(end) = input[i + 2..].find("*/") else {
        return Err(CompileError::lexical(line, "unclosed block comment"));
      };
      line += input[i..i + 2 + end].matches('\n').count();
      i += end + 4;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      let text = &input[start..i];
      let value = text
        .parse::<i64>()
        .map_err(|err| CompileError::lexical(line, format!("invalid number '{text}': {err}")))?;
      tokens.push(Token::new(TokenKind::Num, start, i - start, line, Some(value)));
      continue;
    }

    if c.is_ascii_alphabetic() || c == b'_' {
      let start = i;
      while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
      }
      let kind = if KEYWORDS.contains(&&input[start..i]) {
        TokenKind::Keyword
      } else {
        TokenKind::Ident
      };
      tokens.push(Token::new(kind, start, i - start, line, None));
      continue;
    }

    if c == b'\'' {
      let start = i;
      let (value, next) = read_char(bytes, i + 1, line)?;
      if bytes.get(next) != Some(&b'\'') {
        return Err(CompileError::lexical(line, "unclosed character literal"));
      }
      i = next + 1;
      tokens.push(Token::new(TokenKind::Num, start, i - start, line, Some(i64::from(value))));
      continue;
    }

    if c == b'"' {
      let start = i;
      i += 1;
      loop {
        match bytes.get(i) {
          None | Some(b'\n') => {
            return Err(CompileError::lexical(line, "unterminated string literal"));
          }
          Some(b'"') => break,
          Some(_) => i = read_char(bytes, i, line)?.1,
        }
      }
      i += 1;
      tokens.push(Token::new(TokenKind::Str, start, i - start, line, None));
      continue;
    }

    if let Some(op) = PUNCTUATORS
      .into_iter()
      .find(|op| input[i..].starts_with(op))
    {
      tokens.push(Token::new(TokenKind::Punctuator, i, op.len(), line, None));
      i += op.len();
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::lexical(
      line,
      format!("unrecognised character '{invalid_char}'"),
    ));
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0, line, None));
  Ok(tokens)
}

/// Read one possibly escaped character starting at `i`, returning the byte
/// and the index just past it.
fn read_char(bytes: &[u8], i: usize, line: usize) -> CompileResult<(u8, usize)> {
  match bytes.get(i) {
    None | Some(b'\n') => Err(CompileError::lexical(line, "unexpected end of literal")),
    Some(b'\\') => {
      let value = match bytes.get(i + 1) {
        Some(b'n') => b'\n',
        Some(b't') => b'\t',
        Some(b'r') => b'\r',
        Some(b'0') => 0,
        Some(b'\\') => b'\\',
        Some(b'\'') => b'\'',
        Some(b'"') => b'"',
        Some(other) => {
          return Err(CompileError::lexical(
            line,
            format!("unknown escape sequence '\\{}'", *other as char),
          ));
        }
        None => return Err(CompileError::lexical(line, "unexpected end of literal")),
      };
      Ok((value, i + 2))
    }
    Some(b) => Ok((*b, i + 1)),
  }
}

/// Decode the body of a string literal token, escapes resolved, without the
/// surrounding quotes.
pub fn string_bytes(token: &Token, source: &str) -> CompileResult<Vec<u8>> {
  let raw = token_text(token, source).as_bytes();
  let mut out = Vec::with_capacity(raw.len());
  let mut i = 1;
  while i + 1 < raw.len() {
    let (value, next) = read_char(raw, i, token.line)?;
    out.push(value);
    i = next;
  }
  Ok(out)
}

/// Return the slice from the source that produced this token.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  let end = token.loc + token.len;
  &source[token.loc..end]
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>, source: &str) -> String {
  match token {
    Some(t) => match t.kind {
      TokenKind::Eof => "end of input".to_string(),
      _ => token_text(t, source).to_string(),
    },
    None => "end of input".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src).unwrap().iter().map(|t| t.kind).collect()
  }

  #[test]
  fn splits_keywords_identifiers_and_punctuators() {
    let src = "func main() -> int { return x1 <= 10; }";
    let tokens = tokenize(src).unwrap();
    let texts: Vec<&str> = tokens.iter().map(|t| token_text(t, src)).collect();
    assert_eq!(
      texts,
      [
        "func", "main", "(", ")", "->", "int", "{", "return", "x1", "<=", "10", ";", "}", ""
      ]
    );
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[10].value, Some(10));
  }

  #[test]
  fn tracks_line_numbers_through_comments() {
    let src = "a\n// note\n/* two\nlines */ b\nc";
    let tokens = tokenize(src).unwrap();
    let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, [1, 4, 5, 5]);
  }

  #[test]
  fn character_literals_become_numbers() {
    let tokens = tokenize("'a' '\\n'").unwrap();
    assert_eq!(tokens[0].value, Some(97));
    assert_eq!(tokens[1].value, Some(10));
  }

  #[test]
  fn decodes_string_escapes() {
    let src = "\"hi\\n\\\"x\\\"\"";
    let tokens = tokenize(src).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Str);
    assert_eq!(string_bytes(&tokens[0], src).unwrap(), b"hi\n\"x\"");
  }

  #[test]
  fn rejects_unknown_characters() {
    let err = tokenize("x = 1;\ny @ 2;").unwrap_err();
    assert_eq!(err.to_string(), "[line 2] unrecognised character '@'");
  }

  #[test]
  fn ends_with_eof() {
    assert_eq!(kinds(""), [TokenKind::Eof]);
    assert_eq!(kinds("1"), [TokenKind::Num, TokenKind::Eof]);
  }
}
