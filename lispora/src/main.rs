//! Lispora CLI

use clap::{Parser, Subcommand};
use lispora::error::report_error;
use lispora::interp::Interpreter;
use lispora::repl::Repl;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lispora", version, about = "Lispora - a small Lisp")]
struct Cli {
    /// Start without the standard prelude
    #[arg(long, global = true)]
    no_prelude: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive REPL (default)
    Repl,
    /// Evaluate source files in order, sharing one global environment
    Run {
        /// Source files to evaluate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse and dump the expression tree as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => run_repl(cli.no_prelude),
        Command::Run { files } => run_files(&files, cli.no_prelude),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log level comes from `LISPORA_LOG`, e.g. `LISPORA_LOG=lispora=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LISPORA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn interpreter(no_prelude: bool) -> Interpreter {
    let output = Box::new(io::stdout());
    if no_prelude {
        Interpreter::bare(output)
    } else {
        Interpreter::with_output(output)
    }
}

fn run_repl(no_prelude: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = Repl::new(interpreter(no_prelude))?;
    repl.run()?;
    Ok(())
}

fn run_files(files: &[PathBuf], no_prelude: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut interp = interpreter(no_prelude);

    for path in files {
        let source = std::fs::read_to_string(path)?;
        let filename = path.display().to_string();

        match interp.eval_source(&filename, &source) {
            Ok(values) => {
                for value in values.iter().filter(|v| v.is_error()) {
                    eprintln!("{value}");
                }
            }
            Err(err) => {
                report_error(&filename, &source, &err);
                return Err(format!("could not load {filename}").into());
            }
        }
    }

    Ok(())
}

fn parse_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let nodes = match lispora::parser::parse_source(&filename, &source) {
        Ok(nodes) => nodes,
        Err(err) => {
            report_error(&filename, &source, &err);
            return Err(err.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = lispora::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{tok:?} @ {span}");
    }

    Ok(())
}
