//! String literal scanning.

use mex_util::Symbol;

use crate::error::{LexError, LexErrorKind};
use crate::token::{LexLiteral, Token, TokenKind};
use crate::Scanner;

impl<'a> Scanner<'a> {
    /// Scans a string literal opened by `"` or `'`.
    ///
    /// The literal must close with the matching quote on the same line.
    /// Supported escapes: `\n \t \r \\ \" \'`.
    pub(crate) fn scan_string(&mut self) -> Result<Token, LexError> {
        let quote = self.cursor.current_char();
        self.cursor.advance();

        let mut value = String::new();
        loop {
            let c = self.cursor.current_char();
            if self.cursor.is_at_end() || c == '\n' {
                return Err(self.error_token(LexErrorKind::UnterminatedString));
            }
            if c == quote {
                self.cursor.advance();
                break;
            }
            if c == '\\' {
                self.cursor.advance();
                let escaped = match self.cursor.current_char() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    other => {
                        return Err(self.error_here(LexErrorKind::UnexpectedChar(other)));
                    }
                };
                value.push(escaped);
                self.cursor.advance();
                continue;
            }
            value.push(c);
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        Ok(Token::with_literal(
            TokenKind::Str,
            Symbol::intern(text),
            LexLiteral::Str(value),
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

    fn cooked(token: &Token) -> String {
        match &token.literal {
            Some(LexLiteral::Str(s)) => s.clone(),
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_double_quoted() {
        let token = scan_one("\"hello world\"");
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(cooked(&token), "hello world");
    }

    #[test]
    fn test_single_quoted() {
        let token = scan_one("'abc'");
        assert_eq!(cooked(&token), "abc");
    }

    #[test]
    fn test_escapes() {
        let token = scan_one(r#""a\tb\n\\\"""#);
        assert_eq!(cooked(&token), "a\tb\n\\\"");
    }

    #[test]
    fn test_quote_kinds_do_not_close_each_other() {
        let token = scan_one("\"it's fine\"");
        assert_eq!(cooked(&token), "it's fine");
    }

    #[test]
    fn test_unterminated_at_eof() {
        let config = EngineConfig::default();
        let err = Scanner::new("\"oops", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unterminated_at_newline() {
        let config = EngineConfig::default();
        let err = Scanner::new("\"oops\nmore\"", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unknown_escape() {
        let config = EngineConfig::default();
        let err = Scanner::new(r#""bad \q""#, &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('q'));
    }
}
