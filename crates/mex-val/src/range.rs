//! Range materialization.
//!
//! A range never materializes until iterated. The element count is
//! `max(0, floor((end - start) / step) + 1)`, the sign of the step
//! determining the direction. Rational endpoints iterate exactly.

use mex_par::{BinOp, RangeValue, Value};

use crate::arith;
use crate::error::ValueError;
use crate::ArithCx;

/// Safety ceiling on materialized elements.
const MAX_RANGE_LEN: i64 = 10_000_000;

/// Number of elements the range produces.
pub fn length(range: &RangeValue, cx: &ArithCx) -> Result<i64, ValueError> {
    if arith::values_equal(&range.step, &Value::integer(0), cx) {
        return Err(ValueError::domain("range step cannot be zero"));
    }
    let distance = arith::binary(BinOp::Sub, &range.end, &range.start, cx)?;
    let quotient = arith::binary(BinOp::Div, &distance, &range.step, cx)?;
    let floored = match quotient {
        Value::Rational(r) => r.floor().to_i64(),
        Value::Double(d) if d.is_finite() => Some(d.floor() as i64),
        _ => None,
    };
    let floored = floored.ok_or_else(|| ValueError::domain("range bounds are not finite"))?;
    Ok((floored + 1).max(0))
}

/// Materialize the range into a vector of values.
pub fn materialize(range: &RangeValue, cx: &ArithCx) -> Result<Vec<Value>, ValueError> {
    let count = length(range, cx)?;
    if count > MAX_RANGE_LEN {
        return Err(ValueError::domain(format!(
            "range has {} elements, more than the limit of {}",
            count, MAX_RANGE_LEN
        )));
    }
    let mut items = Vec::with_capacity(count as usize);
    let mut current = (*range.start).clone();
    for _ in 0..count {
        items.push(current.clone());
        current = arith::binary(BinOp::Add, &current, &range.step, cx)?;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_reg::UnitRegistry;
    use mex_util::Rational;

    fn cx(units: &UnitRegistry) -> ArithCx<'_> {
        ArithCx {
            force_double: false,
            units,
        }
    }

    fn range(start: i64, end: i64, step: i64) -> RangeValue {
        RangeValue::new(
            Value::integer(start),
            Value::integer(end),
            Value::integer(step),
        )
    }

    #[test]
    fn test_forward_range() {
        let units = UnitRegistry::default();
        let items = materialize(&range(1, 5, 1), &cx(&units)).unwrap();
        assert_eq!(
            items,
            (1..=5).map(Value::integer).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_stepped_range_stops_at_bound() {
        let units = UnitRegistry::default();
        let items = materialize(&range(0, 7, 2), &cx(&units)).unwrap();
        assert_eq!(
            items,
            vec![
                Value::integer(0),
                Value::integer(2),
                Value::integer(4),
                Value::integer(6)
            ]
        );
    }

    #[test]
    fn test_descending_range() {
        let units = UnitRegistry::default();
        let items = materialize(&range(5, 1, -2), &cx(&units)).unwrap();
        assert_eq!(
            items,
            vec![Value::integer(5), Value::integer(3), Value::integer(1)]
        );
    }

    #[test]
    fn test_empty_range() {
        let units = UnitRegistry::default();
        assert!(materialize(&range(5, 1, 1), &cx(&units)).unwrap().is_empty());
        assert!(materialize(&range(1, 5, -1), &cx(&units)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_step_is_domain_error() {
        let units = UnitRegistry::default();
        assert!(matches!(
            materialize(&range(1, 5, 0), &cx(&units)),
            Err(ValueError::Domain(_))
        ));
    }

    #[test]
    fn test_rational_steps_stay_exact() {
        let units = UnitRegistry::default();
        let half = Value::Rational(Rational::new(1.into(), 2.into()).unwrap());
        let r = RangeValue::new(Value::integer(0), Value::integer(1), half);
        let items = materialize(&r, &cx(&units)).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].to_string(), "1/2");
        assert_eq!(items[2], Value::integer(1));
    }
}
