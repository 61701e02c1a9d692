use ember_lang::error::Session;
use ember_lang::interpreter::Interpreter;
use ember_lang::parser::Parser;
use ember_lang::resolver::Resolver;
use ember_lang::scanner::Scanner;

/// Captured output of a full scan-parse-resolve-interpret run.
pub struct Run {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a snippet of source through the whole pipeline and captures what it
/// wrote. Stops early at whichever stage first reports an error, same as
/// the real driver in `lib.rs`.
pub fn run(source: &str) -> Run {
    let mut out = Vec::new();
    let mut err = Vec::new();
    {
        let mut interpreter = Interpreter::new();
        let mut session = Session::new(&mut out, &mut err, false);

        let tokens = Scanner::new(source).scan_tokens(&mut session);
        if !session.had_error() {
            let mut parser = Parser::new(tokens);
            let statements = parser.parse(&mut session);
            if !session.had_error() {
                let mut resolver = Resolver::new(&mut interpreter, &mut session);
                resolver.resolve(&statements);
                if !session.had_error() {
                    interpreter.interpret(&statements, &mut session);
                }
            }
        }
    }
    Run { stdout: String::from_utf8(out).unwrap(), stderr: String::from_utf8(err).unwrap() }
}

/// Declares a test that runs `$source` and checks its stdout line-by-line,
/// in the teacher's "one test per behavior" style, against inline source
/// rather than a fixture file on disk.
#[macro_export]
macro_rules! ok_test {
    ($name:ident, $source:expr, [$($expected:expr),* $(,)?]) => {
        #[test]
        fn $name() {
            let expected: Vec<&str> = vec![$($expected),*];
            let expected = if expected.is_empty() { String::new() } else { format!("{}\n", expected.join("\n")) };
            let run = crate::common::run($source);
            assert_eq!(run.stdout, expected, "unexpected stderr: {}", run.stderr);
        }
    };
}

/// Declares a test that runs `$source` and expects the given substring to
/// appear somewhere in its diagnostic output.
#[macro_export]
macro_rules! err_test {
    ($name:ident, $source:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let run = crate::common::run($source);
            assert!(
                run.stderr.contains($expected),
                "expected stderr to contain {:?}, got {:?}",
                $expected,
                run.stderr
            );
        }
    };
}
