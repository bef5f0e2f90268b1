//! Universal scalar arithmetic dispatch.
//!
//! Every numeric operation funnels through [`binary`], [`unary`], and
//! [`compare`], which own the full type-preservation table:
//!
//! - Unit and Percent preserve their wrapper when combined with plain
//!   scalars; they degrade only where the table says so (`unit / unit`
//!   and `percent / percent` are plain ratios, `number + percent` applies
//!   the percentage).
//! - Rational arithmetic stays exact until an operation leaves the
//!   rationals (division by zero, fractional powers) or a double is
//!   involved; then the result falls through to IEEE-754.
//! - Strings concatenate with `+` (stringifying the other side) and
//!   repeat with an integer `*`.
//!
//! Operations that cannot be expressed exactly report failure by value
//! (`None` from the rational layer) and fall through to the double path;
//! no control-flow exceptions are involved.
//!
//! Containers never reach this module; the broadcasting engine peels them
//! off first.

use std::cmp::Ordering;

use num_bigint::BigInt;

use mex_par::{BinOp, UnaryOp, UnitValue, Value};
use mex_util::Rational;

use crate::error::ValueError;
use crate::ArithCx;

/// Apply a scalar binary operation.
pub fn binary(op: BinOp, lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    debug_assert!(!lhs.is_container() && !rhs.is_container());
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            arithmetic(op, lhs, rhs, cx)
        }
        BinOp::Of => apply_of(lhs, rhs, cx),
        BinOp::MatMul => Err(ValueError::type_error(format!(
            "'@' requires matrices, found {} and {}",
            lhs.kind_name(),
            rhs.kind_name()
        ))),
        BinOp::Eq => Ok(Value::Bool(values_equal(lhs, rhs, cx))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(lhs, rhs, cx))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = compare(lhs, rhs, cx)?;
            Ok(Value::Bool(match (op, ordering) {
                // NaN orderings are all false.
                (_, None) => false,
                (BinOp::Lt, Some(o)) => o == Ordering::Less,
                (BinOp::Le, Some(o)) => o != Ordering::Greater,
                (BinOp::Gt, Some(o)) => o == Ordering::Greater,
                (BinOp::Ge, Some(o)) => o != Ordering::Less,
                _ => unreachable!("op checked"),
            }))
        }
        BinOp::And | BinOp::Or | BinOp::Xor => logical(op, lhs, rhs),
    }
}

/// The additive/multiplicative/power table.
fn arithmetic(op: BinOp, lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    // Strings first: `+` concatenates, `*` repeats.
    if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
        return string_arithmetic(op, lhs, rhs);
    }

    match (lhs, rhs) {
        // Unit (+) Unit: convert the right operand into the left's unit,
        // apply on magnitudes. Same-dimension division is a plain ratio.
        (Value::Unit(a), Value::Unit(b)) => {
            let converted = convert_magnitude(b, a.unit.as_str(), cx)?;
            let magnitude = arithmetic(op, &a.magnitude, &converted, cx)?;
            if op == BinOp::Div {
                Ok(magnitude)
            } else {
                Ok(Value::Unit(UnitValue::new(magnitude, a.unit)))
            }
        }

        // Unit (+) scalar and scalar (+) Unit: apply on the magnitude,
        // keep the unit.
        (Value::Unit(a), _) => {
            let magnitude = arithmetic(op, &a.magnitude, rhs, cx)?;
            Ok(Value::Unit(UnitValue::new(magnitude, a.unit)))
        }
        (_, Value::Unit(b)) => {
            let magnitude = arithmetic(op, lhs, &b.magnitude, cx)?;
            Ok(Value::Unit(UnitValue::new(magnitude, b.unit)))
        }

        // Percent (+) Percent: apply on fractions; division is a ratio.
        (Value::Percent(a), Value::Percent(b)) => {
            if op == BinOp::Div {
                return double_arithmetic(op, *a, *b);
            }
            match double_arithmetic(op, *a, *b)? {
                Value::Double(d) => Ok(Value::Percent(d)),
                other => Ok(other),
            }
        }

        // number + percent / number - percent: apply the percentage.
        (_, Value::Percent(p)) if matches!(op, BinOp::Add | BinOp::Sub) => {
            let n = number_as_f64(lhs)?;
            let delta = n * p;
            Ok(Value::Double(if op == BinOp::Add {
                n + delta
            } else {
                n - delta
            }))
        }

        // Percent (+) scalar preserves the wrapper; scalar * percent is
        // a scaled percent; everything else degrades to a double.
        (Value::Percent(p), _) => {
            let s = number_as_f64(rhs)?;
            match double_arithmetic(op, *p, s)? {
                Value::Double(d) => Ok(Value::Percent(d)),
                other => Ok(other),
            }
        }
        (_, Value::Percent(p)) if op == BinOp::Mul => {
            let s = number_as_f64(lhs)?;
            Ok(Value::Percent(s * p))
        }
        (_, Value::Percent(p)) => {
            let n = number_as_f64(lhs)?;
            double_arithmetic(op, n, *p)
        }

        // The exact core.
        (Value::Rational(a), Value::Rational(b)) if !cx.force_double => {
            rational_arithmetic(op, a, b)
        }
        (Value::Rational(_) | Value::Double(_), Value::Rational(_) | Value::Double(_)) => {
            double_arithmetic(op, number_as_f64(lhs)?, number_as_f64(rhs)?)
        }

        _ => Err(ValueError::type_error(format!(
            "cannot apply '{}' to {} and {}",
            op.as_str(),
            lhs.kind_name(),
            rhs.kind_name()
        ))),
    }
}

/// Exact rational path; falls through to doubles where the operation
/// leaves the rationals.
fn rational_arithmetic(op: BinOp, a: &Rational, b: &Rational) -> Result<Value, ValueError> {
    match op {
        BinOp::Add => Ok(Value::Rational(a.clone() + b.clone())),
        BinOp::Sub => Ok(Value::Rational(a.clone() - b.clone())),
        BinOp::Mul => Ok(Value::Rational(a.clone() * b.clone())),
        BinOp::Div => match a.checked_div(b) {
            Some(q) => Ok(Value::Rational(q)),
            None => double_arithmetic(op, a.to_f64(), b.to_f64()),
        },
        BinOp::Mod => match a.checked_rem(b) {
            Some(r) => Ok(Value::Rational(r)),
            None => double_arithmetic(op, a.to_f64(), b.to_f64()),
        },
        BinOp::Pow => match b.to_i64().and_then(|e| a.checked_pow(e)) {
            Some(p) => Ok(Value::Rational(p)),
            None => double_arithmetic(op, a.to_f64(), b.to_f64()),
        },
        _ => unreachable!("arithmetic op checked"),
    }
}

/// IEEE-754 path.
fn double_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, ValueError> {
    Ok(Value::Double(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        BinOp::Pow => a.powf(b),
        _ => unreachable!("arithmetic op checked"),
    }))
}

/// `a of b`: a percentage (or plain multiplier) applied to `b`, always
/// unwrapping the percent. `10% of 50` is `5`, not `500%`.
fn apply_of(lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    match lhs {
        Value::Percent(p) => arithmetic(BinOp::Mul, &Value::Double(*p), rhs, cx),
        _ => arithmetic(BinOp::Mul, lhs, rhs, cx),
    }
}

fn string_arithmetic(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, ValueError> {
    match (op, lhs, rhs) {
        (BinOp::Add, Value::Str(a), _) => Ok(Value::Str(format!("{}{}", a, stringify(rhs)))),
        (BinOp::Add, _, Value::Str(b)) => Ok(Value::Str(format!("{}{}", stringify(lhs), b))),
        (BinOp::Mul, Value::Str(s), count) | (BinOp::Mul, count, Value::Str(s)) => {
            let n = count.as_index().ok_or_else(|| {
                ValueError::type_error(format!(
                    "string repetition needs an integer count, found {}",
                    count.kind_name()
                ))
            })?;
            if n < 0 {
                return Err(ValueError::domain("string repetition count is negative"));
            }
            Ok(Value::Str(s.repeat(n as usize)))
        }
        _ => Err(ValueError::type_error(format!(
            "cannot apply '{}' to {} and {}",
            op.as_str(),
            lhs.kind_name(),
            rhs.kind_name()
        ))),
    }
}

/// The content of a value for string concatenation: strings contribute
/// their text, everything else its canonical form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Non-short-circuit logical operators (xor always needs both sides; and
/// and or reach here only when the evaluator already has both).
fn logical(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, ValueError> {
    let (a, b) = match (lhs.as_bool(), rhs.as_bool()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(ValueError::type_error(format!(
                "'{}' requires booleans, found {} and {}",
                op.as_str(),
                lhs.kind_name(),
                rhs.kind_name()
            )))
        }
    };
    Ok(Value::Bool(match op {
        BinOp::And => a && b,
        BinOp::Or => a || b,
        BinOp::Xor => a ^ b,
        _ => unreachable!("logical op checked"),
    }))
}

/// Apply a scalar unary operation.
pub fn unary(op: UnaryOp, value: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    match op {
        UnaryOp::Neg => match value {
            Value::Rational(r) if !cx.force_double => Ok(Value::Rational(-r.clone())),
            Value::Rational(r) => Ok(Value::Double(-r.to_f64())),
            Value::Double(d) => Ok(Value::Double(-d)),
            Value::Percent(p) => Ok(Value::Percent(-p)),
            Value::Unit(u) => Ok(Value::Unit(UnitValue::new(
                unary(op, &u.magnitude, cx)?,
                u.unit,
            ))),
            other => Err(ValueError::type_error(format!(
                "cannot negate {}",
                other.kind_name()
            ))),
        },
        UnaryOp::Not => match value.as_bool() {
            Some(b) => Ok(Value::Bool(!b)),
            None => Err(ValueError::type_error(format!(
                "'not' requires a boolean, found {}",
                value.kind_name()
            ))),
        },
        UnaryOp::Factorial => factorial(value, 1),
        UnaryOp::DoubleFactorial => factorial(value, 2),
        UnaryOp::Percent => match value {
            Value::Rational(r) => Ok(Value::Percent(r.to_f64() / 100.0)),
            Value::Double(d) => Ok(Value::Percent(d / 100.0)),
            Value::Percent(p) => Ok(Value::Percent(p / 100.0)),
            other => Err(ValueError::type_error(format!(
                "'%' requires a number, found {}",
                other.kind_name()
            ))),
        },
    }
}

/// Upper bound keeping factorial results to something printable.
const MAX_FACTORIAL: i64 = 65_535;

/// `n!` (stride 1) and `n!!` (stride 2) on non-negative integers.
fn factorial(value: &Value, stride: i64) -> Result<Value, ValueError> {
    let n = value.as_index().ok_or_else(|| {
        ValueError::domain(format!(
            "factorial requires a non-negative integer, found {}",
            value.kind_name()
        ))
    })?;
    if n < 0 {
        return Err(ValueError::domain(
            "factorial requires a non-negative integer",
        ));
    }
    if n > MAX_FACTORIAL {
        return Err(ValueError::domain(format!(
            "factorial argument exceeds {}",
            MAX_FACTORIAL
        )));
    }
    let mut acc = BigInt::from(1);
    let mut k = n;
    while k > 1 {
        acc *= k;
        k -= stride;
    }
    Ok(Value::Rational(Rational::from_integer(acc)))
}

/// Numeric ordering. `None` means unordered (a NaN was involved); every
/// relational operator maps that to false.
pub fn compare(lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Option<Ordering>, ValueError> {
    match (lhs, rhs) {
        (Value::Rational(a), Value::Rational(b)) => Ok(Some(a.cmp(b))),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        (Value::Unit(a), Value::Unit(b)) => {
            let converted = convert_magnitude(b, a.unit.as_str(), cx)?;
            compare(&a.magnitude, &converted, cx)
        }
        _ => {
            let (a, b) = (number_as_f64(lhs)?, number_as_f64(rhs)?);
            Ok(a.partial_cmp(&b))
        }
    }
}

/// Structural equality with numeric cross-kind comparison. NaN is never
/// equal to anything, including itself.
pub fn values_equal(lhs: &Value, rhs: &Value, cx: &ArithCx) -> bool {
    match (lhs, rhs) {
        (Value::Vector(a), Value::Vector(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| values_equal(x, y, cx))
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            a.rows() == b.rows()
                && a.cols() == b.cols()
                && a.as_slice()
                    .iter()
                    .zip(b.as_slice().iter())
                    .all(|(x, y)| values_equal(x, y, cx))
        }
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => matches!(compare(lhs, rhs, cx), Ok(Some(Ordering::Equal))),
    }
}

/// The double content of a plain numeric scalar (not a unit).
fn number_as_f64(value: &Value) -> Result<f64, ValueError> {
    match value {
        Value::Rational(r) => Ok(r.to_f64()),
        Value::Double(d) => Ok(*d),
        Value::Percent(p) => Ok(*p),
        other => Err(ValueError::type_error(format!(
            "expected a number, found {}",
            other.kind_name()
        ))),
    }
}

/// Convert a unit value's magnitude into `target` units, as a double.
fn convert_magnitude(
    unit: &UnitValue,
    target: &str,
    cx: &ArithCx,
) -> Result<Value, ValueError> {
    let magnitude = unit.magnitude.as_f64().ok_or_else(|| {
        ValueError::type_error(format!(
            "unit magnitude must be numeric, found {}",
            unit.magnitude.kind_name()
        ))
    })?;
    let converted = cx
        .units
        .convert(magnitude, unit.unit.as_str(), target)?;
    Ok(Value::Double(converted))
}
