//! Ember is a small dynamically typed scripting language with lexical
//! scoping, closures and single-inheritance classes. It is implemented as a
//! tree-walk interpreter with a hand-written recursive descent parser.
//!
//! ## Scanning
//! The [`scanner`] module turns source text into a flat list of
//! [`Token`](token::Token)s, reporting lexical problems (an unterminated
//! string, a stray character) as [`ScanError`](error::ScanError)s. Scanning
//! never stops at the first error: it keeps going so a single run can
//! surface every lexical mistake in the file at once.
//!
//! ## Parsing
//! The [`parser`] module is a recursive descent parser that turns the token
//! list into a tree of [`Expr`](expr::Expr)s and [`Stmt`](stmt::Stmt)s.
//! Expressions produce a [`Value`](value::Value); statements perform an
//! effect (binding a variable, printing, looping) and produce nothing.
//! Syntax errors are reported as [`ParseError`](error::ParseError)s and
//! recovered from by synchronizing to the next statement boundary, so
//! parsing too can report more than one mistake per run.
//!
//! ## Resolving
//! The [`resolver`] module walks the parsed tree once before evaluation to
//! compute, for every variable reference, how many enclosing scopes away
//! its binding lives. This lets the interpreter resolve closures correctly
//! without re-walking the scope chain from the top on every lookup. It also
//! catches errors that are syntactically fine but semantically broken —
//! `return` outside a function, `this` outside a class, a variable reading
//! itself in its own initializer — as [`ResolveError`](error::ResolveError)s.
//!
//! ## Interpreting
//! The [`interpreter`] module walks the resolved tree and evaluates it.
//! [`Environment`](environment::Environment)s form the run-time scope
//! chain; [`Function`](function::Function) and [`Class`](class::Class)
//! close over them to implement closures and methods. Errors that can only
//! be caught while running — dividing by zero, calling something that
//! isn't callable, reading an undefined property — are reported as
//! [`RuntimeError`](error::RuntimeError)s.

use std::fs;
use std::io::{self, Write};
use std::process;

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use error::Session;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Exit code for a source file that failed to scan, parse or resolve.
pub const EXIT_STATIC_ERROR: i32 = 65;
/// Exit code for a program that raised a runtime error.
pub const EXIT_RUNTIME_ERROR: i32 = 70;
/// Exit code for an I/O failure (the script file couldn't be read).
pub const EXIT_IO_ERROR: i32 = 74;

/// A running interpreter instance. Its `Interpreter` persists across an
/// entire REPL session so that globals and closures defined on one line
/// stay alive for the next, even though each line gets its own freshly
/// reset [`Session`].
pub struct Ember {
    interpreter: Interpreter,
}

impl Ember {
    pub fn new() -> Self {
        Ember { interpreter: Interpreter::new() }
    }

    /// Runs a script file to completion and returns the process exit code.
    pub fn run_file(&mut self, path: &str) -> i32 {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("Couldn't read '{path}': {err}");
                return EXIT_IO_ERROR;
            }
        };

        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut out = stdout.lock();
        let mut err = stderr.lock();
        let mut session = Session::new(&mut out, &mut err, false);

        self.run(&contents, &mut session);

        if session.had_runtime_error() {
            EXIT_RUNTIME_ERROR
        } else if session.had_error() {
            EXIT_STATIC_ERROR
        } else {
            0
        }
    }

    /// Runs an interactive read-eval-print loop against stdin/stdout,
    /// persisting line history in `~/.ember_history` across sessions.
    pub fn run_prompt(&mut self) -> i32 {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(err) => {
                eprintln!("Couldn't start the line editor: {err}");
                return EXIT_IO_ERROR;
            }
        };

        let history_path = home::home_dir().map(|home| home.join(".ember_history"));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line.as_str());
                    let line = ensure_trailing_semicolon(&line);

                    let stdout = io::stdout();
                    let stderr = io::stderr();
                    let mut out = stdout.lock();
                    let mut err = stderr.lock();
                    let mut session = Session::new(&mut out, &mut err, true);
                    self.run(&line, &mut session);
                }
                Err(rustyline::error::ReadlineError::Interrupted) => break,
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Readline error: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }

        0
    }

    fn run(&mut self, source: &str, session: &mut Session<'_>) {
        let tokens = Scanner::new(source).scan_tokens(session);
        if session.had_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse(session);
        if session.had_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter, session);
        resolver.resolve(&statements);
        if session.had_error() {
            return;
        }

        self.interpreter.interpret(&statements, session);
    }
}

impl Default for Ember {
    fn default() -> Self {
        Self::new()
    }
}

/// A REPL line ending in `;` or `}` already terminates its statement; anything
/// else is a bare expression the user expects to type without the semicolon.
fn ensure_trailing_semicolon(line: &str) -> String {
    let trimmed = line.trim_end();
    if trimmed.ends_with(';') || trimmed.ends_with('}') {
        trimmed.to_string()
    } else {
        format!("{trimmed};")
    }
}
