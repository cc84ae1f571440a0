use std::path::PathBuf;
use std::process;

use clap::Parser;
use wkcc::CompileResult;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
  /// Source file to compile
  input: PathBuf,

  /// Write the assembly here instead of standard output
  #[clap(short, long)]
  output: Option<PathBuf>,

  /// Print the parsed tree to standard error before generating code
  #[clap(long)]
  dump_ast: bool,
}

fn run(args: &Args) -> CompileResult<()> {
  let source = wkcc::read_source(&args.input)?;
  let (program, mut ctx) = wkcc::parse_program(&source)?;
  if args.dump_ast {
    eprintln!("{program:#?}");
  }
  let asm = wkcc::codegen::generate(&program, &mut ctx)?;

  match &args.output {
    Some(path) => wkcc::write_output(path, &asm),
    None => {
      print!("{asm}");
      Ok(())
    }
  }
}

fn main() {
  let args = Args::parse();
  if let Err(err) = run(&args) {
    eprintln!("{err}");
    process::exit(1);
  }
}
