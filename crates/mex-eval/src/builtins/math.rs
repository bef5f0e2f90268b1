//! Scalar math built-ins: trigonometry, exponentials, rounding.
//!
//! Trigonometric functions consult the context's angle unit; an argument
//! already tagged with an angle unit overrides it. Domain failures raise
//! errors rather than returning NaN.

use mex_par::Value;
use mex_reg::Dimension;
use mex_util::{Rational, Span};

use super::{domain, f64_arg, type_error};
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::interp::Evaluator;

/// The argument of a trig function, in radians.
///
/// Plain numbers are interpreted per the configured angle unit; a value
/// tagged with an angle unit converts explicitly.
fn angle_in_radians(
    ev: &Evaluator,
    ctx: &EvalContext,
    value: &Value,
    span: Span,
) -> Result<f64, EvalError> {
    if let Value::Unit(u) = value {
        let name = u.unit.as_str();
        if ev.registries().units.dimension_of(name) == Some(Dimension::Angle) {
            let magnitude = f64_arg(&u.magnitude, span)?;
            return ev
                .registries()
                .units
                .convert(magnitude, name, "radians")
                .map_err(|e| EvalError::from_value(e.into(), span));
        }
        return Err(type_error(
            format!("trigonometry needs an angle, found {} unit", name),
            span,
        ));
    }
    Ok(ctx.config.angle_unit.to_radians(f64_arg(value, span)?))
}

macro_rules! trig_fn {
    ($name:ident) => {
        pub(super) fn $name(
            ev: &Evaluator,
            ctx: &mut EvalContext,
            args: &[Value],
            span: Span,
        ) -> Result<Value, EvalError> {
            let radians = angle_in_radians(ev, ctx, &args[0], span)?;
            Ok(Value::Double(radians.$name()))
        }
    };
}

trig_fn!(sin);
trig_fn!(cos);
trig_fn!(tan);

macro_rules! inverse_trig_fn {
    ($name:ident, $check_range:expr) => {
        pub(super) fn $name(
            _ev: &Evaluator,
            ctx: &mut EvalContext,
            args: &[Value],
            span: Span,
        ) -> Result<Value, EvalError> {
            let x = f64_arg(&args[0], span)?;
            if $check_range && !(-1.0..=1.0).contains(&x) {
                return Err(domain(
                    format!("{} is defined on [-1, 1]", stringify!($name)),
                    span,
                ));
            }
            Ok(Value::Double(ctx.config.angle_unit.from_radians(x.$name())))
        }
    };
}

inverse_trig_fn!(asin, true);
inverse_trig_fn!(acos, true);
inverse_trig_fn!(atan, false);

macro_rules! hyperbolic_fn {
    ($name:ident) => {
        pub(super) fn $name(
            _ev: &Evaluator,
            _ctx: &mut EvalContext,
            args: &[Value],
            span: Span,
        ) -> Result<Value, EvalError> {
            Ok(Value::Double(f64_arg(&args[0], span)?.$name()))
        }
    };
}

hyperbolic_fn!(sinh);
hyperbolic_fn!(cosh);
hyperbolic_fn!(tanh);

pub(super) fn sqrt(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let x = f64_arg(&args[0], span)?;
    if x < 0.0 {
        return Err(domain("even root of a negative number", span));
    }
    Ok(Value::Double(x.sqrt()))
}

pub(super) fn cbrt(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    Ok(Value::Double(f64_arg(&args[0], span)?.cbrt()))
}

pub(super) fn exp(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    Ok(Value::Double(f64_arg(&args[0], span)?.exp()))
}

fn checked_log(x: f64, span: Span) -> Result<f64, EvalError> {
    if x <= 0.0 {
        return Err(domain("logarithm of a non-positive number", span));
    }
    Ok(x)
}

pub(super) fn ln(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    Ok(Value::Double(checked_log(f64_arg(&args[0], span)?, span)?.ln()))
}

/// `log(x)` is base 10; `log(x, b)` uses base `b`.
pub(super) fn log(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let x = checked_log(f64_arg(&args[0], span)?, span)?;
    match args.get(1) {
        None => Ok(Value::Double(x.log10())),
        Some(base) => {
            let base = checked_log(f64_arg(base, span)?, span)?;
            Ok(Value::Double(x.log(base)))
        }
    }
}

pub(super) fn log2(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    Ok(Value::Double(checked_log(f64_arg(&args[0], span)?, span)?.log2()))
}

pub(super) fn log10(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    Ok(Value::Double(checked_log(f64_arg(&args[0], span)?, span)?.log10()))
}

pub(super) fn abs(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Rational(r) => Ok(Value::Rational(r.abs())),
        Value::Double(d) => Ok(Value::Double(d.abs())),
        Value::Percent(p) => Ok(Value::Percent(p.abs())),
        Value::Unit(u) => {
            let magnitude = abs(_ev, _ctx, &[(*u.magnitude).clone()], span)?;
            Ok(Value::Unit(mex_par::UnitValue::new(magnitude, u.unit)))
        }
        other => Err(type_error(
            format!("abs expects a number, found {}", other.kind_name()),
            span,
        )),
    }
}

pub(super) fn sign(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    let x = f64_arg(&args[0], span)?;
    let sign = if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    };
    Ok(Value::integer(sign))
}

/// Rounding family: exact on rationals, IEEE on doubles.
fn rounding(
    args: &[Value],
    span: Span,
    exact: impl Fn(&Rational) -> Rational,
    inexact: impl Fn(f64) -> f64,
) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Rational(r) => Ok(Value::Rational(exact(r))),
        Value::Double(d) => Ok(Value::Double(inexact(*d))),
        Value::Percent(p) => Ok(Value::Double(inexact(*p))),
        other => Err(type_error(
            format!("expected a number, found {}", other.kind_name()),
            span,
        )),
    }
}

pub(super) fn floor(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    rounding(args, span, Rational::floor, f64::floor)
}

pub(super) fn ceil(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    rounding(args, span, Rational::ceil, f64::ceil)
}

pub(super) fn round(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    rounding(args, span, Rational::round, f64::round)
}

pub(super) fn trunc(
    _ev: &Evaluator,
    _ctx: &mut EvalContext,
    args: &[Value],
    span: Span,
) -> Result<Value, EvalError> {
    rounding(args, span, Rational::trunc, f64::trunc)
}
