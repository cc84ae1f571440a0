use std::collections::BTreeSet;
use std::process::Command;

use wkcc::ErrorKind;

fn compile(source: &str) -> String {
  wkcc::compile(source).expect("compile should succeed")
}

fn error(source: &str) -> wkcc::CompileError {
  wkcc::compile(source).expect_err("compile should fail")
}

/// Numeric ids of every `.L<n>:` definition, in emission order.
fn label_definitions(asm: &str) -> Vec<usize> {
  asm
    .lines()
    .filter_map(|line| line.strip_prefix(".L")?.strip_suffix(':')?.parse().ok())
    .collect()
}

#[test]
fn prototype_and_definition_must_agree_on_parameters() {
  let err = error("func f(int a) -> int;\nfunc f(int a, int b) -> int { return a; }");
  assert_eq!(err.kind(), ErrorKind::Semantic);
  assert_eq!(err.line(), Some(2));
}

#[test]
fn prototype_then_matching_definition_compiles() {
  let asm = compile(
    "func f(int a) -> int;\n\
     func main() -> int { return f(3); }\n\
     func f(int a) -> int { return a; }",
  );
  assert!(asm.contains("\tcall\tf\n"));
  assert!(asm.contains("f:\n"));
}

#[test]
fn every_label_is_defined_once() {
  let asm = compile(
    "func a() -> int { var int i; i = 0; while (i < 3) { i = i + 1; } return i; }\n\
     func main() -> int { var int j; for (j = 0; j < 3; j++) { if (j == 1) { return j; } } return 0; }",
  );
  let labels = label_definitions(&asm);
  let unique: BTreeSet<usize> = labels.iter().copied().collect();
  assert_eq!(unique.len(), labels.len(), "duplicate label in\n{asm}");
  // Two function labels from parsing, then loop, loop and if labels.
  assert_eq!(unique, (0..7).collect());
}

#[test]
fn labels_drawn_later_get_larger_ids() {
  let asm = compile(
    "func a() -> int { if (1) { return 1; } return 0; }\n\
     func b() -> int { if (1) { return 1; } return 0; }",
  );
  let control: Vec<usize> = label_definitions(&asm)
    .into_iter()
    .filter(|label| *label >= 2)
    .collect();
  assert_eq!(control, vec![2, 3]);
}

#[test]
fn array_indexing_scales_by_element_size() {
  let asm = compile("global int arr[3]; func main() -> int { arr[2] = 7; return arr[2]; }");
  assert!(asm.contains("\tsalq\t$2, "), "{asm}");
}

#[test]
fn char_arrays_need_no_scaling() {
  let asm = compile("global char buf[4]; func main() -> int { buf[1] = 65; return buf[1]; }");
  assert!(!asm.contains("salq"), "{asm}");
  assert!(asm.contains("\tmovb\t"), "{asm}");
}

#[test]
fn deep_right_nesting_runs_out_of_registers() {
  let err = error("func main() -> int { return 1 + (2 + (3 + (4 + 5))); }");
  assert_eq!(err.kind(), ErrorKind::Resource);
  assert!(err.to_string().starts_with("[line 1] out of registers"));
}

#[test]
fn left_nesting_fits_in_two_registers() {
  let asm = compile("func main() -> int { return 1 + 2 + 3 + 4 + 5 + 6; }");
  assert!(!asm.contains("%r12,") && !asm.contains(", %r12"), "{asm}");
}

#[test]
fn errors_carry_their_class() {
  assert_eq!(error("func main() -> int { return 1 @ 2; }").kind(), ErrorKind::Lexical);
  assert_eq!(error("func main() -> int { return 1 }").kind(), ErrorKind::Syntax);
  assert_eq!(error("func main() -> int { return y; }").kind(), ErrorKind::Semantic);
  assert_eq!(error("global int x; global long x;").kind(), ErrorKind::Semantic);
  assert_eq!(error("func main() -> int { 3 = 4; return 0; }").kind(), ErrorKind::Semantic);
}

#[test]
fn parse_program_exposes_the_symbols() {
  let (program, ctx) = wkcc::parse_program("global long n; func main() -> int { return 0; }").unwrap();
  assert_eq!(program.items.len(), 2);
  assert!(ctx.symbols.global("n").is_some());
  assert!(ctx.symbols.global("main").is_some());
}

#[test]
fn cli_reports_the_first_error_and_fails() {
  let dir = std::env::temp_dir().join(format!("wkcc-cli-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let input = dir.join("bad.wk");
  std::fs::write(&input, "func main() -> int {\n  return x;\n}\n").unwrap();

  let output = Command::new(env!("CARGO_BIN_EXE_wkcc"))
    .arg(&input)
    .output()
    .unwrap();
  let _ = std::fs::remove_dir_all(&dir);

  assert!(!output.status.success());
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.starts_with("[line 2] "), "{stderr}");
}

#[test]
fn cli_writes_assembly_to_the_output_file() {
  let dir = std::env::temp_dir().join(format!("wkcc-cli-out-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let input = dir.join("ok.wk");
  let out = dir.join("ok.s");
  std::fs::write(&input, "func main() -> int { return 7; }\n").unwrap();

  let status = Command::new(env!("CARGO_BIN_EXE_wkcc"))
    .arg(&input)
    .arg("-o")
    .arg(&out)
    .status()
    .unwrap();
  let asm = std::fs::read_to_string(&out).unwrap();
  let _ = std::fs::remove_dir_all(&dir);

  assert!(status.success());
  assert!(asm.contains("main:\n"));
}

#[test]
fn cli_without_arguments_fails() {
  let output = Command::new(env!("CARGO_BIN_EXE_wkcc")).output().unwrap();
  assert!(!output.status.success());
}
