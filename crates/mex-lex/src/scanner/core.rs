//! Core scanner implementation.
//!
//! The scanner is greedy: multi-character operators win over their prefixes
//! (`==` over `=`, `!!` over `!`, `->` over `-`, `:=` over `:`).

use mex_util::{EngineConfig, Span, Symbol};

use crate::cursor::Cursor;
use crate::error::{LexError, LexErrorKind};
use crate::token::{Op, Token, TokenKind};

/// Pass-1 scanner producing raw tokens.
pub struct Scanner<'a> {
    /// Character cursor over the source.
    pub(crate) cursor: Cursor<'a>,

    /// Engine limits consulted while scanning.
    pub(crate) config: &'a EngineConfig,

    /// Starting byte offset of the current token.
    pub(crate) token_start: usize,

    /// Line where the current token starts (1-based).
    token_start_line: u32,

    /// Column where the current token starts (1-based).
    token_start_column: u32,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner over `source`.
    pub fn new(source: &'a str, config: &'a EngineConfig) -> Self {
        Self {
            cursor: Cursor::new(source),
            config,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Scans the whole source, returning the raw token stream.
    ///
    /// The stream always ends with an `Eof` token. The first lexical error
    /// aborts the scan.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Returns the next raw token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.cursor.skip_whitespace();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, Symbol::intern(""), self.span()));
        }

        match self.cursor.current_char() {
            '(' => Ok(self.single(TokenKind::LParen)),
            ')' => Ok(self.single(TokenKind::RParen)),
            '{' => Ok(self.single(TokenKind::LBrace)),
            '}' => Ok(self.single(TokenKind::RBrace)),
            '[' => Ok(self.single(TokenKind::LBracket)),
            ']' => Ok(self.single(TokenKind::RBracket)),
            ',' => Ok(self.single(TokenKind::Comma)),
            ';' => Ok(self.single(TokenKind::Semicolon)),
            '+' => Ok(self.single(TokenKind::Op(Op::Plus))),
            '*' => Ok(self.single(TokenKind::Op(Op::Star))),
            '/' => Ok(self.single(TokenKind::Op(Op::Slash))),
            '^' => Ok(self.single(TokenKind::Op(Op::Caret))),
            '%' => Ok(self.single(TokenKind::Op(Op::Percent))),
            ':' => Ok(self.lex_colon()),
            '-' => Ok(self.lex_minus()),
            '!' => Ok(self.lex_bang()),
            '=' => self.lex_equals(),
            '<' => Ok(self.lex_less()),
            '>' => Ok(self.lex_greater()),
            '&' => self.lex_ampersand(),
            '|' => self.lex_pipe(),
            '.' => self.lex_dot(),
            '"' | '\'' => self.scan_string(),
            '@' | '$' | '#' => self.scan_reference(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_ident_start(c) => self.scan_identifier(),
            c => Err(self.error_here(LexErrorKind::UnexpectedChar(c))),
        }
    }

    /// Consume one character and emit a token of `kind`.
    pub(crate) fn single(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.make(kind)
    }

    /// Build a token of `kind` spanning from the token start to the cursor.
    pub(crate) fn make(&self, kind: TokenKind) -> Token {
        let text = self.cursor.slice_from(self.token_start);
        Token::new(kind, Symbol::intern(text), self.span())
    }

    /// Span from the token start to the current cursor position.
    pub(crate) fn span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// An error covering the whole current token.
    pub(crate) fn error_token(&self, kind: LexErrorKind) -> LexError {
        LexError::new(kind, self.span())
    }

    /// An error pointing at the character under the cursor.
    pub(crate) fn error_here(&self, kind: LexErrorKind) -> LexError {
        let at = self.cursor.position();
        let width = self.cursor.current_char().len_utf8().max(1);
        LexError::new(
            kind,
            Span::new(at, at + width, self.cursor.line(), self.cursor.column()),
        )
    }
}

/// True for characters that may start an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// True for characters that may continue an identifier.
pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        let config = EngineConfig::default();
        Scanner::new(source, &config).tokenize().unwrap()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_structural_tokens() {
        assert_eq!(
            kinds("( ) { } [ ] , ;"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_greedy_operators() {
        assert_eq!(
            kinds(":= -> == != <= >= && || !!"),
            vec![
                TokenKind::Op(Op::Assign),
                TokenKind::Op(Op::Arrow),
                TokenKind::Op(Op::Eq),
                TokenKind::Op(Op::Ne),
                TokenKind::Op(Op::Le),
                TokenKind::Op(Op::Ge),
                TokenKind::Op(Op::And),
                TokenKind::Op(Op::Or),
                TokenKind::Op(Op::DoubleFactorial),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_operators() {
        assert_eq!(
            kinds("+ - * / ^ % ! < > : .."),
            vec![
                TokenKind::Op(Op::Plus),
                TokenKind::Op(Op::Minus),
                TokenKind::Op(Op::Star),
                TokenKind::Op(Op::Slash),
                TokenKind::Op(Op::Caret),
                TokenKind::Op(Op::Percent),
                TokenKind::Op(Op::Factorial),
                TokenKind::Op(Op::Lt),
                TokenKind::Op(Op::Gt),
                TokenKind::Colon,
                TokenKind::Op(Op::Range),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = scan("1 +\n2");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 1);
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 1);
    }

    #[test]
    fn test_lone_equals_is_an_error() {
        let config = EngineConfig::default();
        let err = Scanner::new("x = 1", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('='));
    }

    #[test]
    fn test_lone_ampersand_is_an_error() {
        let config = EngineConfig::default();
        let err = Scanner::new("a & b", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('&'));
    }

    #[test]
    fn test_unexpected_character() {
        let config = EngineConfig::default();
        let err = Scanner::new("2 ? 3", &config).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('?'));
        assert_eq!(err.span.column, 3);
    }

    #[test]
    fn test_empty_source_yields_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
    }
}
