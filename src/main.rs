mod ast;
mod builtins;
mod config;
mod control;
mod diagnostic;
mod env;
mod error;
mod eval;
mod lexer;
mod module_info;
mod ops;
mod parser;
mod token;
mod value;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use ast::Stmt;
use env::Environment;
use module_info::ModuleInfo;
use value::Value;

/// A tree-walking interpreter for the Cocktail programming language
#[derive(Parser, Debug)]
#[command(name = "cocktail", version = config::VERSION, about = "A tree-walking interpreter for the Cocktail programming language")]
#[command(disable_help_flag = true, disable_version_flag = true, override_usage = config::USAGE)]
struct CliArgs {
    /// Script file to execute (reads standard input if omitted and no -c is given)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Execute a one-line program
    #[arg(short = 'c', value_name = "CMD")]
    command: Option<String>,

    /// Print the parsed AST instead of executing
    #[arg(short = 'a', long = "ast")]
    ast: bool,

    /// Emit the token stream instead of executing
    #[arg(short = 'l', long = "lex")]
    lex: bool,

    /// Redirect --ast / --lex output to a file
    #[arg(short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(short = 'h', long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() {
    let args = CliArgs::parse();
    std::process::exit(run(args));
}

fn run(args: CliArgs) -> i32 {
    if args.command.is_some() && args.file.is_some() {
        eprintln!("cocktail: argument -c: not allowed with a script file");
        return 2;
    }
    if args.output.is_some() && !args.ast && !args.lex {
        eprintln!("cocktail: -o requires -a/--ast or -l/--lex");
        return 2;
    }
    if let Some(path) = &args.output {
        if path.is_dir() {
            eprintln!("cocktail: -o path '{}' is a directory", path.display());
            return 2;
        }
    }

    let (source, path) = match load_source(&args) {
        Ok(pair) => pair,
        Err(message) => {
            eprintln!("cocktail: {}", message);
            return 1;
        }
    };

    let info = ModuleInfo::new(source, path);
    let tokens = match lexer::tokenize(info.clone()) {
        Ok(tokens) => tokens,
        Err(err) => return diagnostic::report(&err),
    };

    if args.lex {
        return emit(&args.output, &render_tokens(&tokens));
    }

    let module = match parser::parse(tokens) {
        Ok(module) => module,
        Err(err) => return diagnostic::report(&err),
    };

    if args.ast {
        return emit(&args.output, &render_ast(&module));
    }

    let env = Environment::new();
    builtins::register(&env);
    match eval::eval_module(&module, &env) {
        Ok(Some(value)) => exit_code_from_value(&value),
        Ok(None) => 0,
        Err(err) => diagnostic::report(&err),
    }
}

/// `-c <cmd>` takes priority over a positional file; with neither,
/// the program is read from standard input.
fn load_source(args: &CliArgs) -> Result<(String, String), String> {
    if let Some(cmd) = &args.command {
        return Ok((cmd.clone(), "<command line>".to_string()));
    }
    if let Some(path) = &args.file {
        let source = std::fs::read_to_string(path).map_err(|e| format!("can't open file '{}': {}", path.display(), e))?;
        return Ok((source, path.display().to_string()));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("failed to read standard input: {}", e))?;
    Ok((source, "<stdin>".to_string()))
}

fn render_tokens(tokens: &[token::Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!("{:?} {:?}\n", token.kind, token.lexeme));
    }
    out
}

fn render_ast(module: &[Stmt]) -> String {
    format!("{:#?}\n", module)
}

fn emit(output: &Option<PathBuf>, rendered: &str) -> i32 {
    match output {
        Some(path) => match std::fs::write(path, rendered) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("cocktail: can't write to '{}': {}", path.display(), e);
                1
            }
        },
        None => {
            print!("{}", rendered);
            0
        }
    }
}

/// `exit(x)` always prints `x` (done by the builtin itself) and
/// terminates cleanly — per §8's seed scenario 9, `exit("bye")` exits
/// zero, so the argument is never reinterpreted as a process status.
fn exit_code_from_value(_value: &Value) -> i32 {
    0
}
