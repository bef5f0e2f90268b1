//! Parse error types.

use mex_util::{SourceSnippet, Span};
use thiserror::Error;

/// The kinds of parse failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },

    #[error("unmatched '{open}'")]
    UnmatchedBracket { open: char },

    #[error("empty parentheses")]
    EmptyParens,

    #[error("matrix rows must have equal length (expected {expected}, found {found})")]
    MatrixShape { expected: usize, found: usize },

    #[error("expression nesting exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// A parse error with its source location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
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
    fn test_display() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "an expression".to_string(),
                found: "','".to_string(),
            },
            Span::new(3, 4, 1, 4),
        );
        assert_eq!(err.to_string(), "expected an expression, found ',' at 1:4");
    }

    #[test]
    fn test_eof_display() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedEof {
                expected: "an expression".to_string(),
            },
            Span::point(3, 1, 4),
        );
        assert!(err.to_string().contains("end of input"));
    }
}
