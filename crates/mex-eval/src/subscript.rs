//! Subscript and slice evaluation.
//!
//! Integer indices accept negatives (counted from the end). Slices with
//! omitted bounds default to the whole dimension with step 1; a negative
//! step walks backward with the defaults flipped; a zero step is a domain
//! error. A matrix takes one subscript argument (row selection) or two
//! (row, column); `:` in one of two slots selects the entire dimension.

use mex_par::{Matrix, SliceArg, Value};
use mex_util::Span;

use crate::context::EvalContext;
use crate::error::{EvalError, EvalErrorKind};
use crate::interp::Evaluator;

/// A subscript argument resolved against a dimension length.
enum Resolved {
    Index(usize),
    Select(Vec<usize>),
}

impl<'a> Evaluator<'a> {
    pub(crate) fn subscript(
        &self,
        target: Value,
        args: &[SliceArg],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        match target {
            Value::Vector(items) => {
                if args.len() != 1 {
                    return Err(EvalError::new(
                        EvalErrorKind::Type(format!(
                            "vector subscript takes one argument, found {}",
                            args.len()
                        )),
                        span,
                    ));
                }
                match self.resolve_arg(&args[0], items.len(), span, ctx)? {
                    Resolved::Index(i) => Ok(items[i].clone()),
                    Resolved::Select(indices) => Ok(Value::Vector(
                        indices.into_iter().map(|i| items[i].clone()).collect(),
                    )),
                }
            }
            Value::Matrix(m) => self.subscript_matrix(&m, args, span, ctx),
            Value::Range(range) => {
                let items = mex_val::range::materialize(&range, &self.arith_cx(ctx))
                    .map_err(|e| EvalError::from_value(e, span))?;
                self.subscript(Value::Vector(items), args, span, ctx)
            }
            other => Err(EvalError::new(
                EvalErrorKind::Type(format!("cannot subscript {}", other.kind_name())),
                span,
            )),
        }
    }

    fn subscript_matrix(
        &self,
        m: &Matrix,
        args: &[SliceArg],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        match args.len() {
            1 => match self.resolve_arg(&args[0], m.rows(), span, ctx)? {
                Resolved::Index(r) => Ok(Value::Vector(m.row(r))),
                Resolved::Select(rows) => {
                    let selected: Vec<Vec<Value>> = rows.into_iter().map(|r| m.row(r)).collect();
                    Matrix::from_rows(selected).map(Value::Matrix).ok_or_else(|| {
                        EvalError::new(
                            EvalErrorKind::Domain("matrix slice selected no rows".to_string()),
                            span,
                        )
                    })
                }
            },
            2 => {
                let row_sel = self.resolve_arg(&args[0], m.rows(), span, ctx)?;
                let col_sel = self.resolve_arg(&args[1], m.cols(), span, ctx)?;
                match (row_sel, col_sel) {
                    (Resolved::Index(r), Resolved::Index(c)) => Ok(m.get(r, c).clone()),
                    (Resolved::Index(r), Resolved::Select(cols)) => Ok(Value::Vector(
                        cols.into_iter().map(|c| m.get(r, c).clone()).collect(),
                    )),
                    (Resolved::Select(rows), Resolved::Index(c)) => Ok(Value::Vector(
                        rows.into_iter().map(|r| m.get(r, c).clone()).collect(),
                    )),
                    (Resolved::Select(rows), Resolved::Select(cols)) => {
                        let grid: Vec<Vec<Value>> = rows
                            .into_iter()
                            .map(|r| cols.iter().map(|&c| m.get(r, c).clone()).collect())
                            .collect();
                        Matrix::from_rows(grid).map(Value::Matrix).ok_or_else(|| {
                            EvalError::new(
                                EvalErrorKind::Domain(
                                    "matrix slice selected no elements".to_string(),
                                ),
                                span,
                            )
                        })
                    }
                }
            }
            n => Err(EvalError::new(
                EvalErrorKind::Type(format!(
                    "matrix subscript takes one or two arguments, found {}",
                    n
                )),
                span,
            )),
        }
    }

    fn resolve_arg(
        &self,
        arg: &SliceArg,
        len: usize,
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Resolved, EvalError> {
        match arg {
            SliceArg::Index(expr) => {
                let value = self.eval(expr, ctx)?;
                let index = self.index_of(&value, expr.span())?;
                let normalized = if index < 0 { index + len as i64 } else { index };
                if normalized < 0 || normalized >= len as i64 {
                    return Err(EvalError::new(
                        EvalErrorKind::Domain(format!(
                            "index {} out of range for length {}",
                            index, len
                        )),
                        expr.span(),
                    ));
                }
                Ok(Resolved::Index(normalized as usize))
            }
            SliceArg::Slice { start, end, step } => {
                let step = match step {
                    Some(expr) => {
                        let value = self.eval(expr, ctx)?;
                        self.index_of(&value, expr.span())?
                    }
                    None => 1,
                };
                if step == 0 {
                    return Err(EvalError::new(
                        EvalErrorKind::Domain("slice step cannot be zero".to_string()),
                        span,
                    ));
                }
                let start = self.slice_bound(start.as_ref(), len, ctx)?;
                let end = self.slice_bound(end.as_ref(), len, ctx)?;
                Ok(Resolved::Select(slice_indices(start, end, step, len)))
            }
        }
    }

    fn slice_bound(
        &self,
        bound: Option<&mex_par::Expr>,
        len: usize,
        ctx: &mut EvalContext,
    ) -> Result<Option<i64>, EvalError> {
        match bound {
            None => Ok(None),
            Some(expr) => {
                let value = self.eval(expr, ctx)?;
                let index = self.index_of(&value, expr.span())?;
                Ok(Some(if index < 0 { index + len as i64 } else { index }))
            }
        }
    }

    fn index_of(&self, value: &Value, span: Span) -> Result<i64, EvalError> {
        value.as_index().ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::Type(format!(
                    "subscript index must be an integer, found {}",
                    value.kind_name()
                )),
                span,
            )
        })
    }
}

/// Expand slice bounds into a concrete index list.
fn slice_indices(start: Option<i64>, end: Option<i64>, step: i64, len: usize) -> Vec<usize> {
    let len = len as i64;
    let mut indices = Vec::new();
    if step > 0 {
        let mut i = start.unwrap_or(0).max(0);
        let end = end.unwrap_or(len).min(len);
        while i < end {
            indices.push(i as usize);
            i += step;
        }
    } else {
        let mut i = start.unwrap_or(len - 1).min(len - 1);
        let end = end.unwrap_or(-1).max(-1);
        while i > end {
            if i >= 0 {
                indices.push(i as usize);
            }
            i += step;
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_indices_forward() {
        assert_eq!(slice_indices(None, None, 1, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(slice_indices(Some(1), Some(4), 1, 5), vec![1, 2, 3]);
        assert_eq!(slice_indices(None, None, 2, 5), vec![0, 2, 4]);
        assert_eq!(slice_indices(Some(2), Some(100), 1, 5), vec![2, 3, 4]);
    }

    #[test]
    fn test_slice_indices_backward() {
        assert_eq!(slice_indices(None, None, -1, 4), vec![3, 2, 1, 0]);
        assert_eq!(slice_indices(Some(3), Some(0), -1, 5), vec![3, 2, 1]);
        assert_eq!(slice_indices(None, None, -2, 5), vec![4, 2, 0]);
    }

    #[test]
    fn test_slice_indices_empty() {
        assert_eq!(slice_indices(Some(3), Some(3), 1, 5), Vec::<usize>::new());
        assert_eq!(slice_indices(Some(4), Some(1), 1, 5), Vec::<usize>::new());
    }
}
