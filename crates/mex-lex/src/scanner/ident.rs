//! Identifier and explicit-reference scanning.
//!
//! Identifiers match `[A-Za-z_][A-Za-z0-9_]*`, bounded by the configured
//! maximum length. Sigils force resolution in a specific namespace:
//! `@unit` (or `@"unit name"`), `$variable`, `#constant`. An `@` followed
//! by neither a name nor a quote is the matrix-multiplication operator.

use mex_util::Symbol;

use super::core::{is_ident_continue, is_ident_start};
use crate::error::{LexError, LexErrorKind};
use crate::token::{Op, Token, TokenKind};
use crate::Scanner;

impl<'a> Scanner<'a> {
    /// Scans an identifier starting at a letter or underscore.
    pub(crate) fn scan_identifier(&mut self) -> Result<Token, LexError> {
        let name = self.read_name()?;
        Ok(Token::new(TokenKind::Identifier, name, self.span()))
    }

    /// Scans an explicit reference starting at `@`, `$`, or `#`.
    pub(crate) fn scan_reference(&mut self) -> Result<Token, LexError> {
        let sigil = self.cursor.current_char();
        self.cursor.advance();

        let kind = match sigil {
            '@' => TokenKind::UnitRef,
            '$' => TokenKind::VarRef,
            '#' => TokenKind::ConstRef,
            _ => unreachable!("scan_reference called on a non-sigil"),
        };

        let c = self.cursor.current_char();
        if sigil == '@' && (c == '"' || c == '\'') {
            let name = self.read_quoted_name(c)?;
            return Ok(Token::new(kind, name, self.span()));
        }
        if is_ident_start(c) {
            let name = self.read_name()?;
            return Ok(Token::new(kind, name, self.span()));
        }

        // A bare `@` is the matrix-multiplication operator; the other
        // sigils have no operator reading.
        if sigil == '@' {
            return Ok(self.make(TokenKind::Op(Op::MatMul)));
        }
        Err(self.error_token(LexErrorKind::MalformedReference(sigil)))
    }

    /// Consume an identifier and intern it, enforcing the length bound.
    fn read_name(&mut self) -> Result<Symbol, LexError> {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        if text.len() > self.config.max_identifier_length {
            return Err(self.error_token(LexErrorKind::IdentifierTooLong {
                limit: self.config.max_identifier_length,
            }));
        }
        Ok(Symbol::intern(text))
    }

    /// Consume a quoted unit name after `@`, without escape processing.
    fn read_quoted_name(&mut self, quote: char) -> Result<Symbol, LexError> {
        self.cursor.advance();
        let start = self.cursor.position();
        loop {
            let c = self.cursor.current_char();
            if self.cursor.is_at_end() || c == '\n' {
                return Err(self.error_token(LexErrorKind::UnterminatedString));
            }
            if c == quote {
                break;
            }
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        if text.len() > self.config.max_identifier_length {
            return Err(self.error_token(LexErrorKind::IdentifierTooLong {
                limit: self.config.max_identifier_length,
            }));
        }
        let name = Symbol::intern(text);
        self.cursor.advance();
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_util::EngineConfig;

    fn scan(source: &str) -> Vec<Token> {
        let config = EngineConfig::default();
        Scanner::new(source, &config).tokenize().unwrap()
    }

    #[test]
    fn test_identifier() {
        let tokens = scan("total_2");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].lexeme.eq_str("total_2"));
    }

    #[test]
    fn test_unit_reference() {
        let tokens = scan("@meters");
        assert_eq!(tokens[0].kind, TokenKind::UnitRef);
        assert!(tokens[0].lexeme.eq_str("meters"));
    }

    #[test]
    fn test_quoted_unit_reference() {
        let tokens = scan("@\"light year\"");
        assert_eq!(tokens[0].kind, TokenKind::UnitRef);
        assert!(tokens[0].lexeme.eq_str("light year"));
    }

    #[test]
    fn test_var_and_const_references() {
        let tokens = scan("$x #pi");
        assert_eq!(tokens[0].kind, TokenKind::VarRef);
        assert!(tokens[0].lexeme.eq_str("x"));
        assert_eq!(tokens[1].kind, TokenKind::ConstRef);
        assert!(tokens[1].lexeme.eq_str("pi"));
    }

    #[test]
    fn test_bare_at_is_matrix_multiplication() {
        let tokens = scan("a @ b");
        assert_eq!(tokens[1].kind, TokenKind::Op(Op::MatMul));
    }

    #[test]
    fn test_bare_dollar_is_malformed() {
        let config = EngineConfig::default();
        let err = Scanner::new("$ 1", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedReference('$'));
    }

    #[test]
    fn test_bare_hash_is_malformed() {
        let config = EngineConfig::default();
        let err = Scanner::new("# 1", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedReference('#'));
    }

    #[test]
    fn test_identifier_length_bound() {
        let mut config = EngineConfig::default();
        config.max_identifier_length = 8;
        let err = Scanner::new("extremely_long_name", &config)
            .tokenize()
            .unwrap_err();
        assert_eq!(
            err.kind,
            LexErrorKind::IdentifierTooLong { limit: 8 }
        );
    }
}
