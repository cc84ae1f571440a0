use std::path::PathBuf;
use std::process::Command;

/// Assemble and link `asm` with the system C compiler, run the result and
/// return its exit status. `None` when no usable toolchain is around.
fn run_asm(name: &str, asm: &str) -> Option<i32> {
  if !cfg!(all(target_arch = "x86_64", target_os = "linux")) {
    return None;
  }
  let dir = std::env::temp_dir().join(format!("wkcc-{}-{name}", std::process::id()));
  std::fs::create_dir_all(&dir).ok()?;
  let asm_path = dir.join("out.s");
  let exe_path: PathBuf = dir.join("out");
  std::fs::write(&asm_path, asm).expect("write assembly");

  let built = Command::new("cc")
    .arg("-o")
    .arg(&exe_path)
    .arg(&asm_path)
    .status()
    .ok()?;
  assert!(built.success(), "cc rejected the assembly:\n{asm}");

  let status = Command::new(&exe_path).status().expect("run compiled program");
  let _ = std::fs::remove_dir_all(&dir);
  status.code()
}

fn exit_code(name: &str, source: &str) -> Option<i32> {
  let asm = wkcc::compile(source).expect("compile should succeed");
  run_asm(name, &asm)
}

fn check(name: &str, source: &str, expected: i32) {
  if let Some(code) = exit_code(name, source) {
    assert_eq!(code, expected, "{source}");
  }
}

#[test]
fn returns_arithmetic_with_precedence() {
  check("precedence", "func main() -> int { return 1 + 2 * 3; }", 7);
}

#[test]
fn reads_back_a_global() {
  check(
    "global",
    "global int x; func main() -> int { x = 10; return x + 1; }",
    11,
  );
}

#[test]
fn passes_an_argument() {
  check(
    "call",
    "func id(int a) -> int { return a; } func main() -> int { return id(42); }",
    42,
  );
}

#[test]
fn stores_into_a_global_array() {
  check(
    "array",
    "global int arr[3]; func main() -> int { arr[0] = 7; return arr[0]; }",
    7,
  );
}

#[test]
fn counts_in_a_while_loop() {
  check(
    "while",
    "func main() -> int { var int i; i = 0; while (i < 5) { i = i + 1; } return i; }",
    5,
  );
}

#[test]
fn sums_with_a_for_loop_and_locals_array() {
  check(
    "for",
    "func main() -> int {\n\
       var int a[4];\n\
       var int i;\n\
       var int sum;\n\
       for (i = 0; i < 4; i++) { a[i] = i * 2; }\n\
       sum = 0;\n\
       for (i = 0; i < 4; i++) { sum = sum + a[i]; }\n\
       return sum;\n\
     }",
    12,
  );
}

#[test]
fn recursion_and_else_branches() {
  check(
    "fib",
    "func fib(int n) -> int;\n\
     func main() -> int { return fib(10); }\n\
     func fib(int n) -> int {\n\
       if (n < 2) { return n; } else { return fib(n - 1) + fib(n - 2); }\n\
     }",
    55,
  );
}

#[test]
fn six_arguments_reach_the_callee() {
  check(
    "six",
    "func f(int a, int b, int c, int d, int e, int g) -> int { return a - b + c - d + e - g + 20; }\n\
     func main() -> int { return f(6, 5, 4, 3, 2, 1); }",
    23,
  );
}

#[test]
fn pointers_read_and_write_through() {
  check(
    "pointer",
    "func main() -> int {\n\
       var int x;\n\
       var int *p;\n\
       p = &x;\n\
       *p = 9;\n\
       return x + *p;\n\
     }",
    18,
  );
}

#[test]
fn division_modulo_and_shifts() {
  check(
    "divmod",
    "func main() -> int { return 17 / 5 + 17 % 5 + (1 << 3) + (64 >> 4); }",
    17,
  );
}

#[test]
fn char_strings_are_readable() {
  check(
    "string",
    "global char *s;\n\
     func main() -> int { s = \"hey\"; return *(s + 1); }",
    101,
  );
}

#[test]
fn bitwise_operators_bind_tighter_than_equality() {
  check("bitprec", "func main() -> int { return 6 & 3 == 2; }", 1);
  check("bitops", "func main() -> int { return (5 ^ 3) | 8; }", 14);
  check("bitand", "func main() -> int { return 12 & 10; }", 8);
}

#[test]
fn negation_and_logical_not() {
  check(
    "negate",
    "func main() -> int { var int x; x = 3; return -x + 10; }",
    7,
  );
  check("not", "func main() -> int { return !0 + !7; }", 1);
}

#[test]
fn prefix_and_postfix_steps() {
  check(
    "steps",
    "func main() -> int {\n\
       var int x;\n\
       var int y;\n\
       x = 5;\n\
       --x;\n\
       ++x;\n\
       ++x;\n\
       y = x--;\n\
       return y * 10 + x;\n\
     }",
    65,
  );
}

#[test]
fn pointer_steps_move_by_whole_elements() {
  check(
    "ptrstep",
    "func main() -> int {\n\
       var int a[3];\n\
       var int *p;\n\
       a[0] = 1;\n\
       a[1] = 2;\n\
       a[2] = 3;\n\
       p = &a;\n\
       p++;\n\
       p++;\n\
       p--;\n\
       return *p * 10 + *(p + 1) + *(p - 1) * 100;\n\
     }",
    123,
  );
}

#[test]
fn long_pointer_offsets_are_scaled() {
  check(
    "longptr",
    "func main() -> long {\n\
       var long a[3];\n\
       var long *p;\n\
       a[2] = 40;\n\
       p = &a;\n\
       return *(p + 2) + 2;\n\
     }",
    42,
  );
}

#[test]
fn comparisons_produce_zero_or_one() {
  check(
    "compare",
    "func main() -> int {\n\
       return (3 > 2) + (2 >= 2) * 2 + (1 != 1) * 4 + (1 != 2) * 8 + (2 > 3) * 16 + (1 >= 2) * 32;\n\
     }",
    11,
  );
}
