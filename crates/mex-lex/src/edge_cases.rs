//! Edge-case and property tests for the lexer as a whole.

use proptest::prelude::*;

use crate::token::TokenKind;
use crate::{tokenize, Scanner};
use mex_reg::Registries;
use mex_util::EngineConfig;

fn lex(source: &str) -> Result<Vec<crate::Token>, crate::LexError> {
    let registries = Registries::default();
    let config = EngineConfig::default();
    tokenize(source, &registries, &config)
}

#[test]
fn test_adjacent_ranges_and_decimals() {
    // Mixed: a decimal start of a range.
    let tokens = lex("1.5..4").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Decimal,
            TokenKind::Op(crate::Op::Range),
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_deeply_mixed_expression() {
    let tokens = lex("f(x) := 2x^2 + sin(pi/4) - {1,2}[0]").unwrap();
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    // The definition target stays an identifier.
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
}

#[test]
fn test_multiline_statement_sequence() {
    let tokens = lex("x := 1;\ny := 2;\nx + y").unwrap();
    let lines: Vec<_> = tokens.iter().map(|t| t.span.line).collect();
    assert_eq!(*lines.last().unwrap(), 3);
}

#[test]
fn test_reference_chain() {
    let tokens = lex("$x + #pi + @feet").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TokenKind::VarRef));
    assert!(kinds.contains(&TokenKind::ConstRef));
    assert!(kinds.contains(&TokenKind::UnitRef));
}

#[test]
fn test_percent_then_percent() {
    // `50%%` is percent-of-percent, two postfix tokens.
    let tokens = lex("50%%").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Integer,
            TokenKind::Op(crate::Op::Percent),
            TokenKind::Op(crate::Op::Percent),
            TokenKind::Eof,
        ]
    );
}

proptest! {
    /// The scanner always terminates and, on success, ends with Eof.
    #[test]
    fn prop_scanner_terminates(source in "[ -~]{0,64}") {
        let config = EngineConfig::default();
        if let Ok(tokens) = Scanner::new(&source, &config).tokenize() {
            prop_assert!(!tokens.is_empty());
            prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        }
    }

    /// Lexing is deterministic.
    #[test]
    fn prop_lexing_deterministic(source in "[ -~]{0,64}") {
        let a = lex(&source);
        let b = lex(&source);
        prop_assert_eq!(a, b);
    }

    /// Integer literals survive the pipeline with their exact value.
    #[test]
    fn prop_integers_roundtrip(value in 0u64..1_000_000_000u64) {
        let tokens = lex(&value.to_string()).unwrap();
        prop_assert_eq!(tokens[0].kind, TokenKind::Integer);
        match &tokens[0].literal {
            Some(crate::LexLiteral::Number(r)) => {
                prop_assert_eq!(r.to_string(), value.to_string());
            }
            other => prop_assert!(false, "unexpected literal {:?}", other),
        }
    }

    /// Whitespace between tokens never changes the token kinds.
    #[test]
    fn prop_whitespace_insensitive(pad in " {0,4}") {
        let tight = lex("1+2*3").unwrap();
        let spaced = lex(&format!("1{pad}+{pad}2{pad}*{pad}3")).unwrap();
        let tight_kinds: Vec<_> = tight.iter().map(|t| t.kind).collect();
        let spaced_kinds: Vec<_> = spaced.iter().map(|t| t.kind).collect();
        prop_assert_eq!(tight_kinds, spaced_kinds);
    }
}
