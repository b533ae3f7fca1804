//! Kaleido driver - tokenize and parse a file, or explore interactively.

use kaleido::syntax::{lex, parse, FunctionDef, Lexed};
use kaleido::{KaleidoError, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Install the log subscriber. `RUST_LOG` overrides the default `warn`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();

    // If a file argument is provided, dump its tokens and AST
    if args.len() > 1 {
        let file_path = &args[1];
        if let Err(e) = load_file(file_path, true) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    println!("Kaleido v0.1.0 - tokenizer and parser explorer");
    println!("Type :help for commands, :quit to exit\n");

    if let Err(e) = run_repl() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_repl() -> std::result::Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    let mut show_tokens = false;

    loop {
        match rl.readline("kaleido> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with(':') {
                    if !handle_command(trimmed, &mut show_tokens) {
                        break;
                    }
                } else if let Err(e) = run_source(trimmed, show_tokens) {
                    println!("Error: {}", e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Handle REPL commands (starting with :)
/// Returns false if the REPL should exit
fn handle_command(cmd: &str, show_tokens: &mut bool) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts[0] {
        ":quit" | ":q" | ":exit" => {
            println!("Bye!");
            return false;
        }

        ":help" | ":h" | ":?" => print_help(),

        ":tokens" | ":t" => {
            *show_tokens = !*show_tokens;
            println!("Token dump {}", if *show_tokens { "on" } else { "off" });
        }

        ":load" | ":l" => match parts.get(1) {
            Some(path) => {
                if let Err(e) = load_file(path, *show_tokens) {
                    println!("Error: {}", e);
                }
            }
            None => println!("Usage: :load <file>"),
        },

        other => println!("Unknown command: {} (try :help)", other),
    }

    true
}

fn print_help() {
    println!(
        r#"Kaleido Commands:
  :help, :h, :?     Show this help
  :quit, :q         Exit the REPL
  :tokens, :t       Toggle printing the token stream
  :load, :l <file>  Tokenize and parse a file

Kaleido Syntax:
  def f(x, y) {{ var z = x * y return z }}    Function definition
  var t<2,2> = [[1,2],[3,4]]                 Shaped tensor declaration
  x = g(x, [1, 2])                           Assignment with a call
  # comment                                  Line comment

Command line:
  kaleido                 Start interactive mode
  kaleido <file>          Print the tokens and AST of a file
"#
    );
}

/// Read a file and run it through the front end.
fn load_file(path: &str, show_tokens: bool) -> Result<Vec<FunctionDef>> {
    let path = Path::new(path);
    let contents = fs::read_to_string(path).map_err(|source| KaleidoError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    run_source(&contents, show_tokens)
}

/// Tokenize and parse `source`, printing what the front end produced.
fn run_source(source: &str, show_tokens: bool) -> Result<Vec<FunctionDef>> {
    let Lexed { tokens, skipped } = lex(source);

    if show_tokens {
        for token in &tokens {
            println!("{}", token);
        }
    }
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "discarded unrecognized characters");
    }

    let defs = parse(&tokens)?;
    for def in &defs {
        if let Some(param) = def.proto.duplicate_param() {
            warn!(function = %def.proto.name, param, "duplicate parameter name");
        }
        println!("{}", def);
    }

    Ok(defs)
}
