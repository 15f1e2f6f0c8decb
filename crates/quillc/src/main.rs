//! Terminal driver for the Quill front end.
//!
//! `quillc <path>` reads a source file (`-` for stdin), runs the
//! pipeline — tokenize, parse, type check — and pretty-prints the token
//! stream, the AST, and the typed AST on stdout. Diagnostics go to
//! stderr; the exit status is non-zero when any were emitted.
//!
//! `QUILL_LOG` controls tracing output (e.g.
//! `QUILL_LOG=quill_typeck=trace`).

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use quill_lexer::tokenize;
use quill_parser::parse;
use quill_symbols::prelude;
use quill_typeck::type_check;
use tracing_subscriber::EnvFilter;

const TITLE: &str = r#"
            _ __ __
  ___ ___  (_) / / /
 / _ `/ // / / / / /
 \_, /\_,_/_/_/_/_/
  /_/
"#;

#[derive(Debug)]
struct Args {
    input: Input,
    quiet: bool,
}

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut input = None;
        let mut quiet = false;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--quiet" | "-q" => quiet = true,
                "--help" | "-h" => {
                    return Err("usage: quillc [--quiet] <path | ->".to_string());
                }
                "-" => input = Some(Input::Stdin),
                flag if flag.starts_with('-') => {
                    return Err(format!("unknown option: {flag}"));
                }
                path => input = Some(Input::File(PathBuf::from(path))),
            }
        }
        match input {
            Some(input) => Ok(Args { input, quiet }),
            None => Err("usage: quillc [--quiet] <path | ->".to_string()),
        }
    }
}

fn read_source(input: &Input) -> std::io::Result<String> {
    match input {
        Input::File(path) => fs::read_to_string(path),
        Input::Stdin => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("QUILL_LOG"))
        .with_writer(std::io::stderr)
        .try_init();

    let args = match Args::parse() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    if !args.quiet {
        println!("{}", TITLE.blue().bold());
        println!(
            "  {} {} {}\n",
            "small.".green().bold(),
            "layered.".blue().bold(),
            "typed.".red().bold()
        );
    }

    let source = match read_source(&args.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: cannot read input: {error}");
            return ExitCode::FAILURE;
        }
    };

    let lexed = match tokenize(&source) {
        Ok(lexed) => lexed,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let rendered: Vec<String> = lexed.tokens.iter().map(|t| t.token.to_string()).collect();
    println!("[{}]", rendered.join(", "));
    println!();

    let ast = match parse(&lexed) {
        Ok(ast) => ast,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };
    println!("{}", ast.to_sexp());
    println!();

    let (typed, diagnostics) = type_check(&ast, &prelude());
    println!("{}", typed.to_sexp_with(&|ty| Some(ty.to_string())));

    for diagnostic in &diagnostics {
        eprintln!("error: {diagnostic}");
    }

    if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
