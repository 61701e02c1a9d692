use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{ScanError, Session};
use crate::token::{Kind, Location, Token};
use crate::value::Literal;

const KEYWORDS: &[(&str, Kind)] = &[
    ("break", Kind::Break),
    ("class", Kind::Class),
    ("continue", Kind::Continue),
    ("else", Kind::Else),
    ("false", Kind::False),
    ("for", Kind::For),
    ("fn", Kind::Fn),
    ("if", Kind::If),
    ("nil", Kind::Nil),
    ("return", Kind::Return),
    ("super", Kind::Super),
    ("this", Kind::This),
    ("true", Kind::True),
    ("var", Kind::Var),
    ("while", Kind::While),
];

/// Converts source text into a token stream terminated by `EOF`.
///
/// `print`, `and`, and `or` are deliberately absent from `KEYWORDS`:
/// `print` is a plain builtin identifier, and the logical operators are
/// produced only from the `&&`/`||` lexemes, never from spelled-out words.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start_column: usize,
    column: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            start_column: 0,
            column: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, session: &mut Session) -> Vec<Token> {
        while !self.is_at_end() {
            self.start_column = self.column;
            self.scan_token(session);
        }

        self.tokens.push(Token::new(
            Kind::Eof,
            String::new(),
            None,
            Location::new(self.line, self.column),
        ));

        self.tokens
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn advance(&mut self) -> char {
        let c = self.source.next().expect("advance past end of source");
        self.column += 1;
        c
    }

    fn peek(&mut self) -> char {
        *self.source.peek().unwrap_or(&'\0')
    }

    /// Looks `n` characters beyond the cursor without consuming anything.
    fn peek_at(&mut self, n: usize) -> char {
        let c = self.source.peek_nth(n).copied().unwrap_or('\0');
        self.source.reset_cursor();
        c
    }

    /// Consumes the upcoming character if it equals `expected`.
    fn check(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: Kind, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(kind, lexeme, literal, Location::new(self.line, self.start_column)));
    }

    fn scan_token(&mut self, session: &mut Session) {
        let c = self.advance();
        match c {
            '(' => self.single(Kind::LeftParen, c),
            ')' => self.single(Kind::RightParen, c),
            '{' => self.single(Kind::LeftBrace, c),
            '}' => self.single(Kind::RightBrace, c),
            ',' => self.single(Kind::Comma, c),
            '.' => self.single(Kind::Dot, c),
            ';' => self.single(Kind::Semicolon, c),
            '?' => self.single(Kind::Question, c),
            ':' => self.single(Kind::Colon, c),
            '~' => self.single(Kind::Tilde, c),

            '-' => {
                if self.check('=') {
                    self.add_token(Kind::MinusEqual, "-=".into(), None);
                } else if self.check('-') {
                    self.add_token(Kind::MinusMinus, "--".into(), None);
                } else {
                    self.single(Kind::Minus, c);
                }
            }
            '+' => {
                if self.check('=') {
                    self.add_token(Kind::PlusEqual, "+=".into(), None);
                } else if self.check('+') {
                    self.add_token(Kind::PlusPlus, "++".into(), None);
                } else {
                    self.single(Kind::Plus, c);
                }
            }
            '*' => {
                if self.check('=') {
                    self.add_token(Kind::StarEqual, "*=".into(), None);
                } else if self.check('*') {
                    if self.check('=') {
                        self.add_token(Kind::StarStarEqual, "**=".into(), None);
                    } else {
                        self.add_token(Kind::StarStar, "**".into(), None);
                    }
                } else {
                    self.single(Kind::Star, c);
                }
            }
            '!' => {
                if self.check('=') {
                    self.add_token(Kind::BangEqual, "!=".into(), None);
                } else {
                    self.single(Kind::Bang, c);
                }
            }
            '=' => {
                if self.check('=') {
                    self.add_token(Kind::EqualEqual, "==".into(), None);
                } else {
                    self.single(Kind::Equal, c);
                }
            }
            '<' => {
                if self.check('<') {
                    if self.check('=') {
                        self.add_token(Kind::LessLessEqual, "<<=".into(), None);
                    } else {
                        self.add_token(Kind::LessLess, "<<".into(), None);
                    }
                } else if self.check('=') {
                    self.add_token(Kind::LessEqual, "<=".into(), None);
                } else {
                    self.single(Kind::Less, c);
                }
            }
            '>' => {
                if self.check('>') {
                    if self.check('=') {
                        self.add_token(Kind::GreaterGreaterEqual, ">>=".into(), None);
                    } else {
                        self.add_token(Kind::GreaterGreater, ">>".into(), None);
                    }
                } else if self.check('=') {
                    self.add_token(Kind::GreaterEqual, ">=".into(), None);
                } else {
                    self.single(Kind::Greater, c);
                }
            }
            '&' => {
                if self.check('&') {
                    self.add_token(Kind::AmpAmp, "&&".into(), None);
                } else if self.check('=') {
                    self.add_token(Kind::AmpEqual, "&=".into(), None);
                } else {
                    self.single(Kind::Ampersand, c);
                }
            }
            '|' => {
                if self.check('|') {
                    self.add_token(Kind::PipePipe, "||".into(), None);
                } else if self.check('=') {
                    self.add_token(Kind::PipeEqual, "|=".into(), None);
                } else {
                    self.single(Kind::Pipe, c);
                }
            }
            '^' => {
                if self.check('=') {
                    self.add_token(Kind::CaretEqual, "^=".into(), None);
                } else {
                    self.single(Kind::Caret, c);
                }
            }
            '%' => {
                if self.check('=') {
                    self.add_token(Kind::PercentEqual, "%=".into(), None);
                } else {
                    self.single(Kind::Percent, c);
                }
            }
            '/' => {
                if self.check('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.check('*') {
                    self.block_comment();
                } else if self.check('=') {
                    self.add_token(Kind::SlashEqual, "/=".into(), None);
                } else {
                    self.single(Kind::Slash, c);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.line += 1;
                self.column = 0;
            }

            '"' => self.string(session),
            c if c.is_ascii_digit() => self.number(c),
            c if c.is_alphabetic() || c == '_' => self.identifier(c),

            other => {
                session.report(&ScanError::new(self.line, format!("Unexpected character '{other}'.")));
            }
        }
    }

    fn single(&mut self, kind: Kind, c: char) {
        self.add_token(kind, c.to_string(), None);
    }

    fn block_comment(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }
            if self.peek() == '*' {
                // Lookahead for the closing slash without consuming the star
                // unless it really is the terminator — mirrors the source's
                // non-nesting, first-match semantics exactly.
                let star = self.advance();
                if self.peek() == '/' {
                    self.advance();
                    return;
                }
                if star == '\n' {
                    self.line += 1;
                }
                continue;
            }
            if self.advance() == '\n' {
                self.line += 1;
            }
        }
    }

    fn string(&mut self, session: &mut Session) {
        let start_line = self.line;
        let mut value = String::new();

        while self.peek() != '"' && !self.is_at_end() {
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
            }
            value.push(c);
        }

        if self.is_at_end() {
            session.report(&ScanError::new(start_line, "Unterminated string.".to_string()));
            return;
        }

        self.advance(); // closing quote

        self.add_token(Kind::String, value.clone(), Some(Literal::String(value)));
    }

    fn number(&mut self, first: char) {
        let mut value = String::new();
        value.push(first);

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            value.push(self.advance()); // the dot
            while self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        let number: f64 = value.parse().expect("scanner produced a malformed number literal");
        self.add_token(Kind::Number, value, Some(Literal::Number(number)));
    }

    fn identifier(&mut self, first: char) {
        let mut value = String::new();
        value.push(first);

        while matches!(self.peek(), c if c.is_alphanumeric() || c == '_') {
            value.push(self.advance());
        }

        let kind = KEYWORDS
            .iter()
            .find(|(text, _)| *text == value)
            .map(|(_, kind)| *kind)
            .unwrap_or(Kind::Identifier);

        self.add_token(kind, value, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Kind> {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut session = Session::new(&mut out, &mut err, false);
        Scanner::new(source).scan_tokens(&mut session).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_extended_operators() {
        let kinds = scan("+= -- ** <<= >>= && || ~ ?:");
        assert_eq!(
            kinds,
            vec![
                Kind::PlusEqual,
                Kind::MinusMinus,
                Kind::StarStar,
                Kind::LessLessEqual,
                Kind::GreaterGreaterEqual,
                Kind::AmpAmp,
                Kind::PipePipe,
                Kind::Tilde,
                Kind::Question,
                Kind::Colon,
                Kind::Eof,
            ]
        );
    }

    #[test]
    fn print_and_or_are_not_keywords() {
        let kinds = scan("print and or");
        assert_eq!(kinds, vec![Kind::Identifier, Kind::Identifier, Kind::Identifier, Kind::Eof]);
    }

    #[test]
    fn block_comment_terminates_on_first_close() {
        let kinds = scan("/* a */ */ 1");
        // the second `*/` is dangling text after the comment already closed
        assert_eq!(kinds, vec![Kind::Star, Kind::Slash, Kind::Number, Kind::Eof]);
    }

    #[test]
    fn number_literal() {
        let kinds = scan("3.14");
        assert_eq!(kinds, vec![Kind::Number, Kind::Eof]);
    }

    #[test]
    fn unterminated_string_reports_error() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut session = Session::new(&mut out, &mut err, false);
        Scanner::new("\"unterminated").scan_tokens(&mut session);
        assert!(session.had_error());
    }
}
