use ember_lang::token::{Kind, Location, Token};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(token: &Token) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn create_token() {
    let token = Token::new(Kind::LeftParen, "(".to_string(), None, Location::new(1, 3));

    assert_eq!(token.kind, Kind::LeftParen);
    assert_eq!(token.lexeme, "(");
    assert!(token.literal.is_none());
    assert_eq!(token.location.line, 1);
    assert_eq!(token.location.column, 3);
}

#[test]
fn synthetic_token_has_zero_location() {
    let token = Token::synthetic(Kind::This, "this");

    assert_eq!(token.kind, Kind::This);
    assert_eq!(token.lexeme, "this");
    assert_eq!(token.location, Location::new(0, 0));
}

#[test]
fn equality_ignores_location() {
    let a = Token::new(Kind::Identifier, "x".to_string(), None, Location::new(1, 1));
    let b = Token::new(Kind::Identifier, "x".to_string(), None, Location::new(5, 9));

    assert_eq!(a, b);
}

#[test]
fn equality_considers_kind() {
    let a = Token::new(Kind::Semicolon, ";".to_string(), None, Location::new(1, 1));
    let b = Token::new(Kind::Identifier, ";".to_string(), None, Location::new(1, 1));

    assert_ne!(a, b);
}

#[test]
fn same_hash_for_equal_tokens() {
    let a = Token::new(Kind::Identifier, "init".to_string(), None, Location::new(1, 1));
    let b = Token::new(Kind::Identifier, "init".to_string(), None, Location::new(9, 9));

    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn different_hash_for_different_lexeme() {
    let a = Token::new(Kind::Identifier, "init".to_string(), None, Location::new(1, 1));
    let b = Token::new(Kind::Identifier, "init2".to_string(), None, Location::new(1, 1));

    assert_ne!(hash_of(&a), hash_of(&b));
}

#[test]
fn display_includes_kind_lexeme_and_location() {
    let token = Token::new(Kind::LeftParen, "(".to_string(), None, Location::new(1, 3));

    assert_eq!(format!("{token}"), "LeftParen ( @ 1:3");
}
