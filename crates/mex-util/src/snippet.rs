//! Source excerpt rendering.
//!
//! Errors surfaced to the user carry a [`SourceSnippet`]: the offending
//! source line with a caret run underneath marking the exact range. The
//! snippet is built once from the original source text and a [`Span`], then
//! formatted by the driver when the error is displayed.

use crate::span::Span;

/// A one-line source excerpt with a highlighted range.
///
/// # Examples
///
/// ```
/// use mex_util::snippet::SourceSnippet;
/// use mex_util::span::Span;
///
/// let snippet = SourceSnippet::from_source("2 +", Span::new(3, 3, 1, 4));
/// let rendered = snippet.to_string();
/// assert!(rendered.contains("2 +"));
/// assert!(rendered.contains('^'));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSnippet {
    /// The source line content
    pub line: String,
    /// Line number (1-based)
    pub line_number: u32,
    /// Column where the highlight starts (1-based)
    pub start_column: u32,
    /// Width of the highlight in characters (at least 1)
    pub width: usize,
}

impl SourceSnippet {
    /// Extract the snippet for `span` out of `source`.
    ///
    /// The line is located by scanning for the newline boundaries around
    /// `span.start`. A zero-width span (end-of-input errors) still renders
    /// a single caret one column past the last character.
    pub fn from_source(source: &str, span: Span) -> Self {
        let start = span.start.min(source.len());
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |i| line_start + i);
        let line = &source[line_start..line_end];

        let start_column = source[line_start..start].chars().count() as u32 + 1;
        let end = span.end.clamp(start, line_end);
        let width = source[start..end].chars().count().max(1);

        Self {
            line: line.to_string(),
            line_number: span.line.max(1),
            start_column,
            width,
        }
    }
}

impl std::fmt::Display for SourceSnippet {
    /// Render the excerpt in the conventional two-line gutter format:
    ///
    /// ```text
    ///  1 | 2 +
    ///    |    ^
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let gutter = self.line_number.to_string();
        writeln!(f, "{} | {}", gutter, self.line)?;
        write!(
            f,
            "{} | {}{}",
            " ".repeat(gutter.len()),
            " ".repeat(self.start_column.saturating_sub(1) as usize),
            "^".repeat(self.width)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_single_line() {
        let source = "1 + $";
        let snippet = SourceSnippet::from_source(source, Span::new(4, 5, 1, 5));
        assert_eq!(snippet.line, "1 + $");
        assert_eq!(snippet.start_column, 5);
        assert_eq!(snippet.width, 1);
    }

    #[test]
    fn test_snippet_second_line() {
        let source = "1 + 2;\n3 * oops!";
        let snippet = SourceSnippet::from_source(source, Span::new(11, 15, 2, 5));
        assert_eq!(snippet.line, "3 * oops!");
        assert_eq!(snippet.line_number, 2);
        assert_eq!(snippet.start_column, 5);
        assert_eq!(snippet.width, 4);
    }

    #[test]
    fn test_snippet_at_end_of_input() {
        let source = "2 +";
        let snippet = SourceSnippet::from_source(source, Span::point(3, 1, 4));
        assert_eq!(snippet.start_column, 4);
        assert_eq!(snippet.width, 1);
        let rendered = snippet.to_string();
        assert_eq!(rendered, "1 | 2 +\n  |    ^");
    }

    #[test]
    fn test_snippet_render_gutter_alignment() {
        let snippet = SourceSnippet {
            line: "x".to_string(),
            line_number: 12,
            start_column: 1,
            width: 1,
        };
        assert_eq!(snippet.to_string(), "12 | x\n   | ^");
    }
}
