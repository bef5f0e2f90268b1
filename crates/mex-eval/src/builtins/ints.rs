//! Integer math built-ins.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

use mex_par::{UnaryOp, Value};
use mex_util::{Rational, Span};
use mex_val::arith;

use super::domain;
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::interp::Evaluator;

/// The argument as an exact integer.
fn integer_arg(value: &Value, span: Span) -> Result<BigInt, EvalError> {
    if let Value::Rational(r) = value {
        if r.is_integer() {
            return Ok(r.numer().clone());
        }
    }
    if let Value::Double(d) = value {
        if d.fract() == 0.0 && d.is_finite() {
            return Ok(BigInt::from(*d as i64));
        }
    }
    Err(domain(
        format!("expected an integer, found {}", value.kind_name()),
        span,
    ))
}

pub(super) fn gcd(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let a = integer_arg(&args[0], span)?;
    let b = integer_arg(&args[1], span)?;
    Ok(Value::Rational(Rational::from_integer(a.gcd(&b))))
}

pub(super) fn lcm(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let a = integer_arg(&args[0], span)?;
    let b = integer_arg(&args[1], span)?;
    if a.is_zero() || b.is_zero() {
        return Ok(Value::integer(0));
    }
    Ok(Value::Rational(Rational::from_integer(a.lcm(&b))))
}

/// `fact(n)`, same semantics as the postfix `!`.
pub(super) fn fact(
    ev: &Evaluator,
    ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    arith::unary(UnaryOp::Factorial, &args[0], &ev.arith_cx(ctx))
        .map_err(|e| EvalError::from_value(e, span))
}
