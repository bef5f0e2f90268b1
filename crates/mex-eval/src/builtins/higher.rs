//! Higher-order built-ins and lazy control flow.

use mex_par::{Expr, Value};
use mex_util::Span;

use super::{domain, type_error};
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::interp::Evaluator;

/// `if(cond, then, else)`: only the chosen branch is evaluated.
pub(super) fn lazy_if(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Expr],
    _span: Span,
) -> Result<Value, EvalError> {
    let cond = ev.eval(&args[0], ctx)?;
    match cond.as_bool() {
        Some(true) => ev.eval(&args[1], ctx),
        Some(false) => ev.eval(&args[2], ctx),
        None => Err(type_error(
            format!("if condition must be a boolean, found {}", cond.kind_name()),
            args[0].span(),
        )),
    }
}

fn callable_arg(value: &Value, span: Span) -> Result<(), EvalError> {
    match value {
        Value::Lambda(_) | Value::Function(_) => Ok(()),
        other => Err(type_error(
            format!("expected a function, found {}", other.kind_name()),
            span,
        )),
    }
}

/// `map(f, collection)`.
pub(super) fn map(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    callable_arg(&args[0], span)?;
    let items = ev.iterate(args[1].clone(), span, ctx)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(ev.call_value(&args[0], vec![item], span, ctx)?);
    }
    Ok(Value::Vector(out))
}

/// `filter(pred, collection)`: keeps elements whose predicate is true.
pub(super) fn filter(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    callable_arg(&args[0], span)?;
    let items = ev.iterate(args[1].clone(), span, ctx)?;
    let mut out = Vec::new();
    for item in items {
        let keep = ev.call_value(&args[0], vec![item.clone()], span, ctx)?;
        match keep.as_bool() {
            Some(true) => out.push(item),
            Some(false) => {}
            None => {
                return Err(type_error(
                    format!(
                        "filter predicate must return a boolean, found {}",
                        keep.kind_name()
                    ),
                    span,
                ))
            }
        }
    }
    Ok(Value::Vector(out))
}

/// `reduce(f, collection)` or `reduce(f, collection, initial)`.
pub(super) fn reduce(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    callable_arg(&args[0], span)?;
    let items = ev.iterate(args[1].clone(), span, ctx)?;
    let mut iter = items.into_iter();
    let mut acc = match args.get(2) {
        Some(initial) => initial.clone(),
        None => iter
            .next()
            .ok_or_else(|| domain("cannot reduce an empty collection", span))?,
    };
    for item in iter {
        acc = ev.call_value(&args[0], vec![acc, item], span, ctx)?;
    }
    Ok(acc)
}
