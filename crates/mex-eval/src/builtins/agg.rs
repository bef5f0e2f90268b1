//! Aggregation and sequence built-ins.
//!
//! The aggregates accept either one container argument (vector, range,
//! matrix) or a spread of scalar arguments: `sum({1,2,3})`, `sum(1..10)`,
//! and `sum(1, 2, 3)` all work.

use std::cmp::Ordering;

use mex_par::{BinOp, Value};
use mex_util::Span;
use mex_val::{arith, broadcast};

use super::domain;
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::interp::Evaluator;

/// The element list an aggregate works over.
fn spread(
    ev: &Evaluator,
    ctx: &EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Vec<Value>, EvalError> {
    if args.len() == 1 {
        match &args[0] {
            Value::Vector(items) => return Ok(items.clone()),
            Value::Range(range) => {
                return mex_val::range::materialize(range, &ev.arith_cx(ctx))
                    .map_err(|e| EvalError::from_value(e, span));
            }
            Value::Matrix(m) => return Ok(m.as_slice().to_vec()),
            _ => {}
        }
    }
    Ok(args.to_vec())
}

fn fold(
    ev: &Evaluator,
    ctx: &EvalContext,
    op: BinOp,
    items: Vec<Value>,
    empty: Value,
    span: Span,
) -> Result<Value, EvalError> {
    let cx = ev.arith_cx(ctx);
    let mut iter = items.into_iter();
    let mut acc = match iter.next() {
        Some(first) => first,
        None => return Ok(empty),
    };
    for item in iter {
        acc = broadcast::binary(op, &acc, &item, &cx)
            .map_err(|e| EvalError::from_value(e, span))?;
    }
    Ok(acc)
}

pub(super) fn sum(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    fold(ev, ctx, BinOp::Add, items, Value::integer(0), span)
}

pub(super) fn prod(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    fold(ev, ctx, BinOp::Mul, items, Value::integer(1), span)
}

fn extreme(
    ev: &Evaluator,
    ctx: &EvalContext,
    args: &[Value],
    span: Span,
    keep: Ordering,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    let cx = ev.arith_cx(ctx);
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| domain("empty collection has no extreme", span))?;
    for item in iter {
        let ordering = arith::compare(&item, &best, &cx)
            .map_err(|e| EvalError::from_value(e, span))?;
        if ordering == Some(keep) {
            best = item;
        }
    }
    Ok(best)
}

pub(super) fn min(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    extreme(ev, ctx, args, span, Ordering::Less)
}

pub(super) fn max(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    extreme(ev, ctx, args, span, Ordering::Greater)
}

pub(super) fn mean(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    if items.is_empty() {
        return Err(domain("empty collection has no mean", span));
    }
    let count = Value::integer(items.len() as i64);
    let total = fold(ev, ctx, BinOp::Add, items, Value::integer(0), span)?;
    broadcast::binary(BinOp::Div, &total, &count, &ev.arith_cx(ctx))
        .map_err(|e| EvalError::from_value(e, span))
}

pub(super) fn median(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    if items.is_empty() {
        return Err(domain("empty collection has no median", span));
    }
    let sorted = sorted_values(ev, ctx, items, span)?;
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid].clone())
    } else {
        let pair_sum = broadcast::binary(
            BinOp::Add,
            &sorted[mid - 1],
            &sorted[mid],
            &ev.arith_cx(ctx),
        )
        .map_err(|e| EvalError::from_value(e, span))?;
        broadcast::binary(
            BinOp::Div,
            &pair_sum,
            &Value::integer(2),
            &ev.arith_cx(ctx),
        )
        .map_err(|e| EvalError::from_value(e, span))
    }
}

pub(super) fn count(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::integer(s.chars().count() as i64)),
        _ => {
            let items = spread(ev, ctx, args, span)?;
            Ok(Value::integer(items.len() as i64))
        }
    }
}

pub(super) fn sort(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    Ok(Value::Vector(sorted_values(ev, ctx, items, span)?))
}

/// Sort by the value ordering, failing on incomparable elements.
fn sorted_values(
    ev: &Evaluator,
    ctx: &EvalContext,
    mut items: Vec<Value>,
    span: Span,
) -> Result<Vec<Value>, EvalError> {
    let cx = ev.arith_cx(ctx);
    // Validate comparability up front; sort_by cannot fail midway.
    for window in items.windows(2) {
        arith::compare(&window[0], &window[1], &cx)
            .map_err(|e| EvalError::from_value(e, span))?;
    }
    items.sort_by(|a, b| {
        arith::compare(a, b, &cx)
            .ok()
            .flatten()
            .unwrap_or(Ordering::Equal)
    });
    Ok(items)
}

pub(super) fn reverse(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Str(s.chars().rev().collect())),
        _ => {
            let mut items = spread(ev, ctx, args, span)?;
            items.reverse();
            Ok(Value::Vector(items))
        }
    }
}

pub(super) fn first(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    items
        .into_iter()
        .next()
        .ok_or_else(|| domain("empty collection has no first element", span))
}

pub(super) fn last(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let items = spread(ev, ctx, args, span)?;
    items
        .into_iter()
        .next_back()
        .ok_or_else(|| domain("empty collection has no last element", span))
}
