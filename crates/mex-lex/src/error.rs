//! Lexical error types.

use mex_util::{SourceSnippet, Span};
use thiserror::Error;

/// The kinds of lexical failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("identifier exceeds {limit} characters")]
    IdentifierTooLong { limit: usize },

    #[error("malformed explicit reference '{0}'")]
    MalformedReference(char),
}

/// A lexical error with its source location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The source excerpt for this error's span.
    pub fn snippet(&self, source: &str) -> SourceSnippet {
        SourceSnippet::from_source(source, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = LexError::new(LexErrorKind::UnexpectedChar('~'), Span::new(4, 5, 1, 5));
        assert_eq!(err.to_string(), "unexpected character '~' at 1:5");
    }

    #[test]
    fn test_snippet() {
        let err = LexError::new(LexErrorKind::UnexpectedChar('~'), Span::new(4, 5, 1, 5));
        let snippet = err.snippet("2 + ~3");
        assert_eq!(snippet.start_column, 5);
    }
}
