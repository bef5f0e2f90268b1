//! Collection parsing: vectors, comprehensions, matrices, and slices.
//!
//! Braces open either a vector literal `{1, 2, 3}` or a comprehension
//! `{e for v in iterable (if cond)?}`; the `for` keyword after the first
//! expression decides. Brackets open a matrix literal, rows separated by
//! `;`, with the nested-vector form `[[1,2],[3,4]]` flattened into the
//! same rectangular shape. Subscript brackets parse slice arguments.

use mex_lex::TokenKind;
use mex_reg::Keyword;

use crate::ast::{Expr, SliceArg};
use crate::error::{ParseError, ParseErrorKind};
use crate::Parser;

impl<'a> Parser<'a> {
    /// `{ ... }` - vector literal or comprehension.
    pub(crate) fn parse_brace_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.peek().span;
        self.enter_nesting(open)?;
        self.advance(); // {

        if self.check(TokenKind::RBrace) {
            let close = self.advance().span;
            self.exit_nesting();
            return Ok(Expr::Vector {
                items: Vec::new(),
                span: open.merge(close),
            });
        }

        let first = self.parse_expression()?;

        let expr = if self.check_keyword(Keyword::For) {
            self.parse_comprehension_tail(open, first)?
        } else {
            let mut items = vec![first];
            while self.match_kind(TokenKind::Comma) {
                items.push(self.parse_expression()?);
            }
            let close = self.close_bracket(TokenKind::RBrace, '{')?;
            Expr::Vector {
                items,
                span: open.merge(close),
            }
        };
        self.exit_nesting();
        Ok(expr)
    }

    /// The `for v in iterable ... (if cond)? }` part of a comprehension.
    fn parse_comprehension_tail(
        &mut self,
        open: mex_util::Span,
        element: Expr,
    ) -> Result<Expr, ParseError> {
        let mut iterators = Vec::new();
        while self.match_keyword(Keyword::For) {
            let name = self.name_token("an iteration variable")?;
            self.expect(TokenKind::Keyword(Keyword::In), "'in'")?;
            let iterable = self.parse_expression()?;
            iterators.push((name, iterable));
        }
        let predicate = if self.match_keyword(Keyword::If) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let close = self.close_bracket(TokenKind::RBrace, '{')?;
        Ok(Expr::Comprehension {
            expr: Box::new(element),
            iterators,
            predicate,
            span: open.merge(close),
        })
    }

    /// `[ ... ]` - matrix literal.
    pub(crate) fn parse_bracket_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.peek().span;
        self.enter_nesting(open)?;
        self.advance(); // [

        if self.check(TokenKind::RBracket) {
            return Err(self.unexpected("an expression"));
        }

        let mut rows: Vec<Vec<Expr>> = Vec::new();
        let mut row: Vec<Expr> = Vec::new();
        loop {
            row.push(self.parse_expression()?);
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            if self.match_kind(TokenKind::Semicolon) {
                rows.push(std::mem::take(&mut row));
                continue;
            }
            break;
        }
        let close = self.close_bracket(TokenKind::RBracket, '[')?;
        rows.push(row);
        self.exit_nesting();

        let rows = flatten_nested(rows);
        check_rectangular(&rows, open)?;
        Ok(Expr::Matrix {
            rows,
            span: open.merge(close),
        })
    }

    /// Slice arguments of a subscript, after the `[` has been consumed.
    ///
    /// Each argument is a single index or `start? : end? : step?`; a bare
    /// `:` selects the entire dimension. Returns the arguments and the
    /// span of the closing bracket.
    pub(crate) fn parse_slice_args(
        &mut self,
    ) -> Result<(Vec<SliceArg>, mex_util::Span), ParseError> {
        let mut args = Vec::new();
        loop {
            args.push(self.parse_slice_arg()?);
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            break;
        }
        let close = self.close_bracket(TokenKind::RBracket, '[')?;
        Ok((args, close))
    }

    fn parse_slice_arg(&mut self) -> Result<SliceArg, ParseError> {
        if self.check(TokenKind::Colon) {
            self.advance();
            let (end, step) = self.parse_slice_tail()?;
            return Ok(SliceArg::Slice {
                start: None,
                end,
                step,
            });
        }

        let first = self.parse_expression()?;
        if self.match_kind(TokenKind::Colon) {
            let (end, step) = self.parse_slice_tail()?;
            Ok(SliceArg::Slice {
                start: Some(first),
                end,
                step,
            })
        } else {
            Ok(SliceArg::Index(first))
        }
    }

    /// The `end? (: step?)?` part after the first colon of a slice.
    fn parse_slice_tail(&mut self) -> Result<(Option<Expr>, Option<Expr>), ParseError> {
        let end = if self.at_slice_boundary() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let step = if self.match_kind(TokenKind::Colon) {
            if self.at_slice_boundary() {
                None
            } else {
                Some(self.parse_expression()?)
            }
        } else {
            None
        };
        Ok((end, step))
    }

    fn at_slice_boundary(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket
        )
    }
}

/// Flatten `[[1,2],[3,4]]` into row form. The nested shape is a single
/// parsed row whose items are all bracketed rows or brace vectors.
fn flatten_nested(rows: Vec<Vec<Expr>>) -> Vec<Vec<Expr>> {
    if rows.len() != 1 {
        return rows;
    }
    let all_nested = !rows[0].is_empty()
        && rows[0].iter().all(|item| {
            matches!(item, Expr::Matrix { rows, .. } if rows.len() == 1)
                || matches!(item, Expr::Vector { .. })
        });
    if !all_nested {
        return rows;
    }
    rows.into_iter()
        .next()
        .expect("len checked")
        .into_iter()
        .map(|item| match item {
            Expr::Matrix { mut rows, .. } => rows.pop().expect("single row checked"),
            Expr::Vector { items, .. } => items,
            _ => unreachable!("all_nested checked"),
        })
        .collect()
}

/// Matrix rows must have uniform width.
fn check_rectangular(rows: &[Vec<Expr>], at: mex_util::Span) -> Result<(), ParseError> {
    let expected = rows.first().map_or(0, Vec::len);
    for row in rows {
        if row.len() != expected {
            return Err(ParseError::new(
                ParseErrorKind::MatrixShape {
                    expected,
                    found: row.len(),
                },
                at,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::parse;
    use mex_reg::Registries;
    use mex_util::EngineConfig;

    fn parse_source(source: &str) -> Result<Expr, ParseError> {
        let registries = Registries::default();
        let config = EngineConfig::default();
        let tokens = mex_lex::tokenize(source, &registries, &config).unwrap();
        parse(tokens, &config)
    }

    #[test]
    fn test_vector_literal() {
        let expr = parse_source("{1, 2, 3}").unwrap();
        match expr {
            Expr::Vector { items, .. } => assert_eq!(items.len(), 3),
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_vector() {
        let expr = parse_source("{}").unwrap();
        assert!(matches!(expr, Expr::Vector { ref items, .. } if items.is_empty()));
    }

    #[test]
    fn test_comprehension() {
        let expr = parse_source("{x^2 for x in 1..5}").unwrap();
        match expr {
            Expr::Comprehension {
                iterators,
                predicate,
                ..
            } => {
                assert_eq!(iterators.len(), 1);
                assert!(iterators[0].0.eq_str("x"));
                assert!(predicate.is_none());
            }
            other => panic!("expected comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_comprehension_with_predicate() {
        let expr = parse_source("{x for x in 1..10 if x mod 2 == 0}").unwrap();
        match expr {
            Expr::Comprehension { predicate, .. } => assert!(predicate.is_some()),
            other => panic!("expected comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_comprehension_with_two_iterators() {
        let expr = parse_source("{x * y for x in 1..3 for y in 1..3}").unwrap();
        match expr {
            Expr::Comprehension { iterators, .. } => assert_eq!(iterators.len(), 2),
            other => panic!("expected comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_semicolon_rows() {
        let expr = parse_source("[1, 2; 3, 4]").unwrap();
        match expr {
            Expr::Matrix { rows, .. } => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].len(), 2);
            }
            other => panic!("expected matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_nested_form_flattens() {
        let semicolons = parse_source("[1, 2; 3, 4]").unwrap();
        let nested = parse_source("[[1, 2], [3, 4]]").unwrap();
        match (semicolons, nested) {
            (Expr::Matrix { rows: a, .. }, Expr::Matrix { rows: b, .. }) => {
                assert_eq!(a.len(), b.len());
                assert_eq!(a[0].len(), b[0].len());
            }
            other => panic!("expected two matrices, got {:?}", other),
        }
    }

    #[test]
    fn test_single_row_matrix() {
        let expr = parse_source("[1, 2, 3]").unwrap();
        match expr {
            Expr::Matrix { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].len(), 3);
            }
            other => panic!("expected matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_matrix_is_an_error() {
        let err = parse_source("[1, 2; 3]").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::MatrixShape {
                expected: 2,
                found: 1
            }
        );
        let err = parse_source("[[1, 2], [3]]").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MatrixShape { .. }));
    }

    #[test]
    fn test_subscript_single_index() {
        let expr = parse_source("v[0]").unwrap();
        match expr {
            Expr::Subscript { args, .. } => {
                assert_eq!(args.len(), 1);
                assert!(matches!(args[0], SliceArg::Index(_)));
            }
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_subscript_full_slice() {
        let expr = parse_source("v[1:3:2]").unwrap();
        match expr {
            Expr::Subscript { args, .. } => match &args[0] {
                SliceArg::Slice { start, end, step } => {
                    assert!(start.is_some());
                    assert!(end.is_some());
                    assert!(step.is_some());
                }
                other => panic!("expected slice, got {:?}", other),
            },
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_subscript_bare_colon() {
        let expr = parse_source("m[:, 1]").unwrap();
        match expr {
            Expr::Subscript { args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(
                    args[0],
                    SliceArg::Slice {
                        start: None,
                        end: None,
                        step: None
                    }
                ));
                assert!(matches!(args[1], SliceArg::Index(_)));
            }
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_subscript_open_ended_slices() {
        let expr = parse_source("v[2:]").unwrap();
        match expr {
            Expr::Subscript { args, .. } => match &args[0] {
                SliceArg::Slice { start, end, step } => {
                    assert!(start.is_some());
                    assert!(end.is_none());
                    assert!(step.is_none());
                }
                other => panic!("expected slice, got {:?}", other),
            },
            other => panic!("expected subscript, got {:?}", other),
        }

        let expr = parse_source("v[:2]").unwrap();
        match expr {
            Expr::Subscript { args, .. } => {
                assert!(matches!(
                    &args[0],
                    SliceArg::Slice {
                        start: None,
                        end: Some(_),
                        step: None
                    }
                ));
            }
            other => panic!("expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_vector_of_vectors_stays_nested_in_braces() {
        let expr = parse_source("{{1, 2}, {3, 4}}").unwrap();
        match expr {
            Expr::Vector { items, .. } => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Expr::Vector { .. }));
            }
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_literal_values() {
        let expr = parse_source("[7]").unwrap();
        match expr {
            Expr::Matrix { rows, .. } => match &rows[0][0] {
                Expr::Literal {
                    value: Literal::Integer(n),
                    ..
                } => assert_eq!(n.to_string(), "7"),
                other => panic!("expected literal, got {:?}", other),
            },
            other => panic!("expected matrix, got {:?}", other),
        }
    }
}
