//! Numeric literal scanning.
//!
//! The interesting part of Pass 1. After one or more digits the scanner
//! must disambiguate between several continuations:
//!
//! - `1..5` - the digits are an integer, the dots belong to a range
//! - `1.5` - decimal
//! - `1/3` - exact rational literal (only when a digit follows the slash)
//! - `1.5e-3` - scientific (only when digits follow the `e`, so that `2e`
//!   stays `2 * e` under implicit multiplication)
//! - `3d` - a `d`/`D` suffix not followed by a letter forces a Double
//!
//! `1.2.3` is malformed and reported at the second dot.

use num_bigint::BigInt;
use std::str::FromStr;

use mex_util::Rational;

use crate::error::{LexError, LexErrorKind};
use crate::token::{LexLiteral, Token, TokenKind};
use crate::Scanner;

impl<'a> Scanner<'a> {
    /// Scans a numeric literal starting at a digit.
    pub(crate) fn scan_number(&mut self) -> Result<Token, LexError> {
        self.consume_digits();

        let c = self.cursor.current_char();

        // digit `..` : emit the integer, the dots start a range token.
        if c == '.' && self.cursor.peek_char(1) == '.' {
            return self.finish_exact(TokenKind::Integer);
        }

        // digit `.` digit : decimal.
        if c == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            self.consume_digits();
            if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
                return Err(self.error_here(LexErrorKind::MalformedNumber(
                    self.cursor.slice_from(self.token_start).to_string(),
                )));
            }
            return self.finish_with_exponent(TokenKind::Decimal);
        }

        // digit `/` digit : exact rational literal.
        if c == '/' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            self.consume_digits();
            return self.finish_rational();
        }

        self.finish_with_exponent(TokenKind::Integer)
    }

    fn consume_digits(&mut self) {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
    }

    /// Consume an optional exponent and `d` suffix, then build the token.
    ///
    /// An `e`/`E` counts as an exponent only when digits follow, optionally
    /// signed. A sign without digits is malformed; a letter after the `e`
    /// means the `e` belongs to the next identifier instead.
    fn finish_with_exponent(&mut self, base_kind: TokenKind) -> Result<Token, LexError> {
        let mut kind = base_kind;

        let c = self.cursor.current_char();
        if c == 'e' || c == 'E' {
            let next = self.cursor.peek_char(1);
            if next.is_ascii_digit() {
                self.cursor.advance();
                self.consume_digits();
                kind = TokenKind::Scientific;
            } else if (next == '+' || next == '-') && self.cursor.peek_char(2).is_ascii_digit() {
                self.cursor.advance();
                self.cursor.advance();
                self.consume_digits();
                kind = TokenKind::Scientific;
            } else if next == '+' || next == '-' {
                self.cursor.advance();
                self.cursor.advance();
                return Err(self.error_here(LexErrorKind::MalformedNumber(
                    self.cursor.slice_from(self.token_start).to_string(),
                )));
            }
        }

        self.finish_exact(kind)
    }

    /// Build the token for the scanned text, honoring a `d`/`D` suffix.
    fn finish_exact(&mut self, mut kind: TokenKind) -> Result<Token, LexError> {
        let mut text = self.cursor.slice_from(self.token_start);

        let c = self.cursor.current_char();
        let forced_double = (c == 'd' || c == 'D')
            && !super::core::is_ident_continue(self.cursor.peek_char(1));
        if forced_double {
            self.cursor.advance();
            if kind == TokenKind::Integer {
                kind = TokenKind::Decimal;
            }
        }

        let value = Rational::from_str(text).map_err(|_| {
            self.error_token(LexErrorKind::MalformedNumber(text.to_string()))
        })?;
        let literal = if forced_double {
            text = self.cursor.slice_from(self.token_start);
            LexLiteral::Double(value.to_f64())
        } else {
            LexLiteral::Number(value)
        };
        Ok(Token::with_literal(
            kind,
            mex_util::Symbol::intern(text),
            literal,
            self.span(),
        ))
    }

    /// Build a rational literal token from `a/b` text.
    ///
    /// A zero denominator is not representable as a rational; per IEEE
    /// fallback it becomes an infinite or NaN double.
    fn finish_rational(&mut self) -> Result<Token, LexError> {
        let text = self.cursor.slice_from(self.token_start);
        let (numer_text, denom_text) = text
            .split_once('/')
            .expect("rational literal always contains a slash");
        let numer = BigInt::from_str(numer_text)
            .map_err(|_| self.error_token(LexErrorKind::MalformedNumber(text.to_string())))?;
        let denom = BigInt::from_str(denom_text)
            .map_err(|_| self.error_token(LexErrorKind::MalformedNumber(text.to_string())))?;

        let literal = match Rational::new(numer.clone(), denom) {
            Some(value) => LexLiteral::Number(value),
            None if numer == BigInt::from(0) => LexLiteral::Double(f64::NAN),
            None => LexLiteral::Double(f64::INFINITY),
        };
        Ok(Token::with_literal(
            TokenKind::Rational,
            mex_util::Symbol::intern(text),
            literal,
            self.span(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_util::EngineConfig;

    fn scan_one(source: &str) -> Token {
        let config = EngineConfig::default();
        let tokens = Scanner::new(source, &config).tokenize().unwrap();
        tokens.into_iter().next().unwrap()
    }

    fn number(token: &Token) -> Rational {
        match &token.literal {
            Some(LexLiteral::Number(r)) => r.clone(),
            other => panic!("expected exact number literal, got {:?}", other),
        }
    }

    #[test]
    fn test_integer() {
        let token = scan_one("42");
        assert_eq!(token.kind, TokenKind::Integer);
        assert_eq!(number(&token), Rational::from(42));
    }

    #[test]
    fn test_decimal() {
        let token = scan_one("1.5");
        assert_eq!(token.kind, TokenKind::Decimal);
        assert_eq!(number(&token), "1.5".parse().unwrap());
    }

    #[test]
    fn test_scientific() {
        let token = scan_one("2.5e-3");
        assert_eq!(token.kind, TokenKind::Scientific);
        assert_eq!(number(&token), "2.5e-3".parse().unwrap());

        let token = scan_one("1E6");
        assert_eq!(token.kind, TokenKind::Scientific);
        assert_eq!(number(&token), Rational::from(1_000_000));
    }

    #[test]
    fn test_rational_literal() {
        let token = scan_one("1/3");
        assert_eq!(token.kind, TokenKind::Rational);
        assert_eq!(
            number(&token),
            Rational::new(1.into(), 3.into()).unwrap()
        );
    }

    #[test]
    fn test_rational_only_before_digit() {
        // `2/x` is a division, not a rational literal.
        let config = EngineConfig::default();
        let tokens = Scanner::new("2/x", &config).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Op(crate::token::Op::Slash));
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_rational_zero_denominator_degrades_to_double() {
        let token = scan_one("1/0");
        assert_eq!(token.kind, TokenKind::Rational);
        assert_eq!(token.literal, Some(LexLiteral::Double(f64::INFINITY)));

        let token = scan_one("0/0");
        match token.literal {
            Some(LexLiteral::Double(d)) => assert!(d.is_nan()),
            other => panic!("expected NaN double, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_before_range() {
        let config = EngineConfig::default();
        let tokens = Scanner::new("1..5", &config).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Op(crate::token::Op::Range));
        assert_eq!(tokens[2].kind, TokenKind::Integer);
    }

    #[test]
    fn test_double_suffix() {
        let token = scan_one("3d");
        assert_eq!(token.kind, TokenKind::Decimal);
        assert_eq!(token.literal, Some(LexLiteral::Double(3.0)));

        // `3dx` is 3 * dx, not a suffixed double.
        let config = EngineConfig::default();
        let tokens = Scanner::new("3dx", &config).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_exponent_without_digits_stays_identifier() {
        // `2e` lexes as the integer 2 followed by the identifier `e`.
        let config = EngineConfig::default();
        let tokens = Scanner::new("2e", &config).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert!(tokens[1].lexeme.eq_str("e"));
    }

    #[test]
    fn test_exponent_sign_without_digits_is_malformed() {
        let config = EngineConfig::default();
        let err = Scanner::new("2e+", &config).tokenize().unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::MalformedNumber(_)));
    }

    #[test]
    fn test_double_decimal_point_is_malformed() {
        let config = EngineConfig::default();
        let err = Scanner::new("1.2.3", &config).tokenize().unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::MalformedNumber(_)));
        assert_eq!(err.span.column, 4);
    }
}
