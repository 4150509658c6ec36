use clap::Parser;
use std::path::PathBuf;
use std::process;

use rusp::object::Object;
use rusp::parser::parse_expr;
use rusp::repl;
use rusp::scope::Scope;

#[derive(Parser)]
#[command(name = "rusp", version, about = "An s-expression functional language")]
struct Cli {
    /// Script file to run; starts the interactive prompt when omitted
    file: Option<PathBuf>,

    /// Evaluate one expression and exit
    #[arg(short, long, value_name = "EXPR")]
    eval: Option<String>,

    /// Dump the parsed syntax tree before evaluating
    #[arg(long)]
    print_ast: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Some(code) = cli.eval {
        run_one(&code, cli.print_ast);
    } else if let Some(file) = cli.file {
        let src = match std::fs::read_to_string(&file) {
            Ok(src) => src,
            Err(err) => {
                eprintln!("error: can't read {}: {}", file.display(), err);
                process::exit(1);
            }
        };
        let result = repl::run_source(&src, cli.print_ast);
        println!("{}", result);
    } else if let Err(err) = repl::start(cli.print_ast) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run_one(code: &str, print_ast: bool) {
    let expr = match parse_expr(code.as_bytes()) {
        Ok(expr) => expr,
        Err(err) => {
            eprintln!("syntax error: {}", err);
            process::exit(1);
        }
    };
    if print_ast {
        println!("{:#?}", expr);
    }
    let sc = Scope::new(None);
    match expr.eval(&sc) {
        Ok(obj) => {
            if !matches!(obj, Object::Nil) {
                println!("{}", obj);
            }
        }
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}
