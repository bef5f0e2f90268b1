//! Multi-character operator scanning.

use crate::error::{LexError, LexErrorKind};
use crate::token::{Op, Token, TokenKind};
use crate::Scanner;

impl<'a> Scanner<'a> {
    /// `:` or `:=`
    pub(crate) fn lex_colon(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::Op(Op::Assign))
        } else {
            self.make(TokenKind::Colon)
        }
    }

    /// `-` or `->`
    pub(crate) fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('>') {
            self.make(TokenKind::Op(Op::Arrow))
        } else {
            self.make(TokenKind::Op(Op::Minus))
        }
    }

    /// `!`, `!!`, or `!=`
    pub(crate) fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::Op(Op::Ne))
        } else if self.cursor.match_char('!') {
            self.make(TokenKind::Op(Op::DoubleFactorial))
        } else {
            self.make(TokenKind::Op(Op::Factorial))
        }
    }

    /// `==`; a lone `=` is not an operator in this language.
    pub(crate) fn lex_equals(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Ok(self.make(TokenKind::Op(Op::Eq)))
        } else {
            Err(self.error_token(LexErrorKind::UnexpectedChar('=')))
        }
    }

    /// `<` or `<=`
    pub(crate) fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::Op(Op::Le))
        } else {
            self.make(TokenKind::Op(Op::Lt))
        }
    }

    /// `>` or `>=`
    pub(crate) fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make(TokenKind::Op(Op::Ge))
        } else {
            self.make(TokenKind::Op(Op::Gt))
        }
    }

    /// `&&`; a lone `&` is an error.
    pub(crate) fn lex_ampersand(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            Ok(self.make(TokenKind::Op(Op::And)))
        } else {
            Err(self.error_token(LexErrorKind::UnexpectedChar('&')))
        }
    }

    /// `||`; a lone `|` is an error.
    pub(crate) fn lex_pipe(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            Ok(self.make(TokenKind::Op(Op::Or)))
        } else {
            Err(self.error_token(LexErrorKind::UnexpectedChar('|')))
        }
    }

    /// `..`; a lone `.` is an error (decimals are scanned from the digits).
    pub(crate) fn lex_dot(&mut self) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.match_char('.') {
            Ok(self.make(TokenKind::Op(Op::Range)))
        } else {
            Err(self.error_token(LexErrorKind::UnexpectedChar('.')))
        }
    }
}
