use std::io::Write;

use crate::token::{Kind, Token};

/// Threaded explicitly through scanner/parser/resolver/interpreter instead
/// of process-wide statics: owns the output writers and the two error
/// flags that the driver consults to pick an exit code, plus whether the
/// session is running as a REPL (which suppresses unused-variable warnings
/// and resets the error flags between lines).
pub struct Session<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub repl: bool,
    had_error: bool,
    had_runtime_error: bool,
}

impl<'a> Session<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write, repl: bool) -> Self {
        Session { out, err, repl, had_error: false, had_runtime_error: false }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    fn mark_error(&mut self) {
        self.had_error = true;
    }

    fn mark_runtime_error(&mut self) {
        self.had_runtime_error = true;
    }

    pub fn report(&mut self, diagnostic: &dyn Diagnostic) {
        diagnostic.report(self);
    }
}

/// Anything that can describe itself to the diagnostic sink.
pub trait Diagnostic {
    fn report(&self, session: &mut Session);
}

#[derive(Debug, Clone)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl ScanError {
    pub fn new(line: usize, message: String) -> Self {
        ScanError { line, message }
    }
}

impl Diagnostic for ScanError {
    fn report(&self, session: &mut Session) {
        let _ = writeln!(session.err, "[line {}] Error: {}", self.line, self.message);
        session.mark_error();
    }
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Token, message: String) -> Self {
        ParseError { token, message }
    }
}

impl Diagnostic for ParseError {
    fn report(&self, session: &mut Session) {
        let _ = if self.token.kind == Kind::Eof {
            writeln!(session.err, "[line {}] Error at end: {}", self.token.location.line, self.message)
        } else {
            writeln!(
                session.err,
                "[line {}] Error at '{}': {}",
                self.token.location.line, self.token.lexeme, self.message
            )
        };
        session.mark_error();
    }
}

#[derive(Debug, Clone)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl ResolveError {
    pub fn new(token: Token, message: String) -> Self {
        ResolveError { token, message }
    }
}

impl Diagnostic for ResolveError {
    fn report(&self, session: &mut Session) {
        let _ = if self.token.kind == Kind::Eof {
            writeln!(session.err, "[line {}] Error at end: {}", self.token.location.line, self.message)
        } else {
            writeln!(
                session.err,
                "[line {}] Error at '{}': {}",
                self.token.location.line, self.token.lexeme, self.message
            )
        };
        session.mark_error();
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: String) -> Self {
        RuntimeError { token, message }
    }
}

impl Diagnostic for RuntimeError {
    fn report(&self, session: &mut Session) {
        let _ = writeln!(session.err, "[line {}] {}", self.token.location.line, self.message);
        session.mark_runtime_error();
    }
}

/// Resolver's unused-variable diagnosis: never sets the error flag.
#[derive(Debug, Clone)]
pub struct Warning {
    pub token: Token,
    pub message: String,
}

impl Warning {
    pub fn new(token: Token, message: String) -> Self {
        Warning { token, message }
    }
}

impl Diagnostic for Warning {
    fn report(&self, session: &mut Session) {
        let _ = writeln!(
            session.err,
            "[line {}] Warning at '{}': {}",
            self.token.location.line, self.token.lexeme, self.message
        );
    }
}
