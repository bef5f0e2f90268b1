//! mex-par - Parser for the Mex expression engine.
//!
//! A hand-written recursive-descent parser over the processed token stream.
//! The grammar is an explicit precedence chain (see [`expr`]) with bounded
//! lookahead for the two ambiguous spots: assignment/function-definition
//! targets and multi-parameter lambdas. Savepoints make the lookahead
//! cheap, since tokens are already materialized in a vector.
//!
//! The parser produces the immutable AST defined in [`ast`]; collection
//! forms (vectors, matrices, comprehensions, slices) live in [`collect`].

pub mod ast;
pub mod collect;
pub mod error;
pub mod expr;
pub mod value;

pub use ast::{BinOp, Expr, Literal, RefKind, SliceArg, UnaryOp};
pub use error::{ParseError, ParseErrorKind};
pub use value::{
    Bindings, FunctionValue, LambdaValue, Matrix, RangeValue, UnitValue, Value,
};

use mex_lex::{Op, Token, TokenKind};
use mex_reg::Keyword;
use mex_util::{EngineConfig, Span, Symbol};

/// Parse a processed token stream into an AST.
///
/// Multiple semicolon-separated statements become a `Sequence` node; a
/// single statement is returned bare.
pub fn parse(tokens: Vec<Token>, config: &EngineConfig) -> Result<Expr, ParseError> {
    Parser::new(tokens, config).parse_program()
}

/// Recursive-descent parser with explicit precedence chain.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    /// Current bracket nesting depth, bounded by the config.
    depth: usize,
    config: &'a EngineConfig,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, config: &'a EngineConfig) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)),
            "token stream must end with Eof"
        );
        Self {
            tokens,
            pos: 0,
            depth: 0,
            config,
        }
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    /// The current token.
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The token `n` positions ahead.
    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_op(&self, op: Op) -> bool {
        self.peek().kind == TokenKind::Op(op)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_op(&mut self, op: Op) -> bool {
        self.match_kind(TokenKind::Op(op))
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        self.match_kind(TokenKind::Keyword(keyword))
    }

    /// Consume a token of `kind` or fail with a caret at the found token.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Position savepoint for bounded lookahead.
    pub(crate) fn savepoint(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, savepoint: usize) {
        self.pos = savepoint;
    }

    /// An error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let kind = if token.kind == TokenKind::Eof {
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.describe(),
            }
        };
        ParseError::new(kind, token.span)
    }

    // =========================================================================
    // Nesting guard
    // =========================================================================

    /// Enter one level of bracket nesting; adversarial inputs hit the
    /// configured ceiling before they can overflow the host stack.
    pub(crate) fn enter_nesting(&mut self, at: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.config.max_expression_depth {
            return Err(ParseError::new(
                ParseErrorKind::DepthExceeded {
                    limit: self.config.max_expression_depth,
                },
                at,
            ));
        }
        Ok(())
    }

    pub(crate) fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Program structure
    // =========================================================================

    /// Parse the whole token stream as a statement sequence.
    pub fn parse_program(&mut self) -> Result<Expr, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.match_kind(TokenKind::Semicolon) {}
            if self.check(TokenKind::Eof) {
                break;
            }
            statements.push(self.parse_expression()?);
            if !self.match_kind(TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(TokenKind::Eof, "';' or end of input")?;

        match statements.len() {
            0 => Err(ParseError::new(
                ParseErrorKind::UnexpectedEof {
                    expected: "an expression".to_string(),
                },
                self.peek().span,
            )),
            1 => Ok(statements.pop().expect("len checked")),
            _ => {
                let span = statements
                    .first()
                    .expect("len checked")
                    .span()
                    .merge(statements.last().expect("len checked").span());
                Ok(Expr::Sequence { statements, span })
            }
        }
    }

    // =========================================================================
    // Assignment and lambda lookahead
    // =========================================================================

    /// Index of the `)` matching the `(` at token index `open`, if any.
    pub(crate) fn find_matched_paren(&self, open: usize) -> Option<usize> {
        debug_assert_eq!(self.tokens.get(open).map(|t| t.kind), Some(TokenKind::LParen));
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// A parameter or binder name: a plain identifier, or a name the
    /// processor classified as a function (shadowing is allowed).
    pub(crate) fn name_token(&mut self, what: &str) -> Result<Symbol, ParseError> {
        match self.peek().kind {
            TokenKind::Identifier | TokenKind::Function => Ok(self.advance().lexeme),
            _ => Err(self.unexpected(what)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_reg::Registries;

    fn parse_source(source: &str) -> Result<Expr, ParseError> {
        let registries = Registries::default();
        let config = EngineConfig::default();
        let tokens = mex_lex::tokenize(source, &registries, &config).unwrap();
        parse(tokens, &config)
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = parse_source("").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn test_single_statement() {
        let expr = parse_source("1 + 2").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_statement_sequence() {
        let expr = parse_source("x := 1; x + 1").unwrap();
        match expr {
            Expr::Sequence { statements, .. } => assert_eq!(statements.len(), 2),
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        let expr = parse_source("1 + 2;").unwrap();
        assert!(matches!(expr, Expr::Binary { .. }));
    }

    #[test]
    fn test_leftover_tokens_are_an_error() {
        let err = parse_source("1 2").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_incomplete_expression_reports_eof() {
        let err = parse_source("2 +").unwrap_err();
        match err.kind {
            ParseErrorKind::UnexpectedEof { expected } => {
                assert_eq!(expected, "an expression");
            }
            other => panic!("expected eof error, got {:?}", other),
        }
        // Caret lands one past the last character.
        assert_eq!(err.span.column, 4);
    }
}
