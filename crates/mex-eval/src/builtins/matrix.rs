//! Vector and matrix built-ins.

use mex_par::{BinOp, Value};
use mex_util::Span;
use mex_val::{broadcast, linalg};

use super::{domain, type_error};
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::interp::Evaluator;

fn matrix_arg<'v>(value: &'v Value, what: &str, span: Span) -> Result<&'v mex_par::Matrix, EvalError> {
    match value {
        Value::Matrix(m) => Ok(m),
        other => Err(type_error(
            format!("{} expects a matrix, found {}", what, other.kind_name()),
            span,
        )),
    }
}

pub(super) fn det(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let m = matrix_arg(&args[0], "det", span)?;
    linalg::determinant(m, &ev.arith_cx(ctx)).map_err(|e| EvalError::from_value(e, span))
}

pub(super) fn transpose(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let m = matrix_arg(&args[0], "transpose", span)?;
    Ok(Value::Matrix(linalg::transpose(m)))
}

pub(super) fn identity(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let n = args[0]
        .as_index()
        .filter(|&n| n >= 0)
        .ok_or_else(|| domain("identity expects a non-negative integer size", span))?;
    if n == 0 {
        return Err(domain("identity matrix must have at least one row", span));
    }
    Ok(Value::Matrix(linalg::identity(n as usize)))
}

pub(super) fn inv(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let m = matrix_arg(&args[0], "inv", span)?;
    linalg::inverse(m, &ev.arith_cx(ctx))
        .map(Value::Matrix)
        .map_err(|e| EvalError::from_value(e, span))
}

/// `dot(a, b)` over two equal-length vectors.
pub(super) fn dot(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let a = ev.iterate(args[0].clone(), span, ctx)?;
    let b = ev.iterate(args[1].clone(), span, ctx)?;
    if a.len() != b.len() {
        return Err(type_error(
            format!(
                "dot product needs equal lengths, found {} and {}",
                a.len(),
                b.len()
            ),
            span,
        ));
    }
    if a.is_empty() {
        return Err(domain("dot product of empty vectors", span));
    }
    let cx = ev.arith_cx(ctx);
    let mut acc: Option<Value> = None;
    for (x, y) in a.iter().zip(b.iter()) {
        let term = broadcast::binary(BinOp::Mul, x, y, &cx)
            .map_err(|e| EvalError::from_value(e, span))?;
        acc = Some(match acc {
            None => term,
            Some(total) => broadcast::binary(BinOp::Add, &total, &term, &cx)
                .map_err(|e| EvalError::from_value(e, span))?,
        });
    }
    Ok(acc.expect("nonempty checked"))
}
