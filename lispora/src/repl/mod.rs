//! REPL (Read-Eval-Print Loop) for Lispora

use crate::error::report_error;
use crate::interp::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "lispora> ";
const CONTINUATION_PROMPT: &str = "     ... ";
const HISTORY_FILE: &str = ".lispora_history";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
    /// Input collected while delimiters are still open
    pending: String,
}

impl Repl {
    /// Create a new REPL around an interpreter
    pub fn new(interpreter: Interpreter) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;

        // Try to find history file in home directory
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter,
            history_path,
            pending: String::new(),
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Lispora {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            let prompt = if self.pending.is_empty() {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if self.pending.is_empty() {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        let _ = self.editor.add_history_entry(trimmed);
                        if trimmed.starts_with(':') {
                            if self.handle_command(trimmed) {
                                break;
                            }
                            continue;
                        }
                    } else {
                        let _ = self.editor.add_history_entry(line.trim());
                    }

                    if let Some(input) = self.feed(&line) {
                        self.eval_input(&input);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    self.pending.clear();
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Add a line of input. Returns the complete input once every opened
    /// delimiter has been closed.
    fn feed(&mut self, line: &str) -> Option<String> {
        if !self.pending.is_empty() {
            self.pending.push('\n');
        }
        self.pending.push_str(line);

        if delimiter_depth(&self.pending) > 0 {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!("Lispora REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :clear          Clear the screen");
        println!();
        println!("A line is evaluated as one S-expression, so `+ 1 2` prints 3.");
        println!();
        println!("Builtins:");
        println!("  list head tail eval join     Q-expression operations");
        println!("  + - * /  > < >= <=  == !=    arithmetic and comparison");
        println!("  def =                        global / local definition");
        println!("  \\ {{args}} {{body}}             lambda");
        println!("  if print error import");
    }

    /// Evaluate one complete input and print its result
    fn eval_input(&mut self, input: &str) {
        match self.interpreter.eval_line(input) {
            Ok(value) => println!("{value}"),
            Err(err) => report_error("<repl>", input, &err),
        }
    }
}

/// Net number of unclosed `(` and `{`, ignoring strings and comments
fn delimiter_depth(source: &str) -> i64 {
    let mut depth = 0;
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    depth
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
