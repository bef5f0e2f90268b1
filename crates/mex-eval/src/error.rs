//! Evaluation error types.

use mex_util::{SourceSnippet, Span, Symbol};
use mex_val::ValueError;
use thiserror::Error;

/// The kinds of evaluation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    /// Wrong operand kind, mismatched shapes, incompatible units
    #[error("{0}")]
    Type(String),

    /// Mathematically undefined operation
    #[error("{0}")]
    Domain(String),

    #[error("undefined variable '{0}'")]
    UndefinedVariable(Symbol),

    #[error("{name} expects {expected} argument(s), found {actual}")]
    Arity {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("recursion depth exceeded the limit of {limit}")]
    StackOverflow {
        limit: usize,
        /// Most recent call frames, innermost last
        trace: Vec<String>,
    },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

/// An evaluation error with its source location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Wrap a value-layer error with the span of the failing expression.
    pub fn from_value(err: ValueError, span: Span) -> Self {
        let kind = match err {
            ValueError::Type(message) => EvalErrorKind::Type(message),
            ValueError::Domain(message) => EvalErrorKind::Domain(message),
            ValueError::UnknownUnit(name) => EvalErrorKind::UnknownUnit(name),
        };
        Self { kind, span }
    }

    /// The source excerpt for this error's span.
    pub fn snippet(&self, source: &str) -> SourceSnippet {
        SourceSnippet::from_source(source, self.span)
    }

    /// The appended stack trace for recursion overflows, empty otherwise.
    pub fn stack_trace(&self) -> &[String] {
        match &self.kind {
            EvalErrorKind::StackOverflow { trace, .. } => trace,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EvalError::new(
            EvalErrorKind::UndefinedVariable(Symbol::intern("zq")),
            Span::new(0, 2, 1, 1),
        );
        assert_eq!(err.to_string(), "undefined variable 'zq' at 1:1");
    }

    #[test]
    fn test_from_value() {
        let err = EvalError::from_value(
            ValueError::domain("log of non-positive number"),
            Span::new(0, 1, 1, 1),
        );
        assert!(matches!(err.kind, EvalErrorKind::Domain(_)));
    }
}
